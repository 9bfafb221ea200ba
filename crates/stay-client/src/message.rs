//! Guest-facing text: money, phone links and the WhatsApp message templates.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use stay_engine::{Booking, BookingStatus, PricingQuote};

/// Display-only stay details included in guest messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayNotes {
    pub checkin_time: String,
    pub checkout_time: String,
    pub reminder: String,
}

impl Default for StayNotes {
    fn default() -> Self {
        Self {
            checkin_time: "12:00".to_string(),
            checkout_time: "09:00".to_string(),
            reminder: "Llevar ropa blanca (sábanas y toallas).".to_string(),
        }
    }
}

/// Format a peso amount as `$ 85.000` (rounded, dot thousands separator).
pub fn format_money(amount: f64) -> String {
    let rounded = if amount.is_finite() { amount.round() as i64 } else { 0 };
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("$ -{}", grouped)
    } else {
        format!("$ {}", grouped)
    }
}

/// Normalize an Argentine phone number to the international mobile form
/// (`549` + area code + number) used by WhatsApp links.
pub fn normalize_ar_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_start_matches('0');

    if digits.starts_with("549") {
        digits.to_string()
    } else if let Some(rest) = digits.strip_prefix("54") {
        format!("549{}", rest)
    } else {
        format!("549{}", digits)
    }
}

/// `https://wa.me/<phone>?text=<message>` link for a guest.
pub fn whatsapp_url(phone: &str, text: &str) -> String {
    let base = format!("https://wa.me/{}", normalize_ar_phone(phone));
    match Url::parse_with_params(&base, &[("text", text)]) {
        Ok(url) => url.to_string(),
        Err(_) => base,
    }
}

/// Deposit share as a whole percentage (`0.5` -> `50`).
fn deposit_percent(deposit_fraction: f64) -> f64 {
    (deposit_fraction * 100.0).round()
}

/// Hint shown next to a price quote.
pub fn price_hint(notes: &StayNotes, deposit_fraction: f64) -> String {
    format!(
        "Recordatorio: {} Para reservar: seña del {}% del total.",
        notes.reminder,
        deposit_percent(deposit_fraction)
    )
}

/// The message the owner sends a guest, chosen by booking status.
///
/// `quote` is `None` when the booking's dates do not describe a stay; the
/// price lines then show zero. The deposit share is spelled out from
/// `deposit_fraction`.
pub fn guest_message(
    booking: &Booking,
    quote: Option<&PricingQuote>,
    notes: &StayNotes,
    deposit_fraction: f64,
) -> String {
    let (nights, rate, total, deposit) = match quote {
        Some(q) => (q.nights, q.nightly_rate as f64, q.total as f64, q.deposit_due),
        None => (0, 0.0, 0.0, 0.0),
    };

    let details = format!(
        "Cabaña: {cabana}\n\
         Personas: {personas}\n\
         Ingreso: {checkin} (desde {checkin_time})\n\
         Salida: {checkout} (hasta {checkout_time})\n\
         Noches: {nights}\n\
         Tarifa por noche: {rate}\n\
         Total: {total}\n\
         Seña ({percent}%): {deposit}\n\
         Recordatorio: {reminder}\n",
        cabana = booking.cabana,
        personas = booking.personas,
        checkin = booking.checkin,
        checkin_time = notes.checkin_time,
        checkout = booking.checkout,
        checkout_time = notes.checkout_time,
        nights = nights,
        rate = format_money(rate),
        total = format_money(total),
        deposit = format_money(deposit),
        percent = deposit_percent(deposit_fraction),
        reminder = notes.reminder,
    );

    let deposit_note = format!(
        "Para reservar se solicita seña del {}% del total.",
        deposit_percent(deposit_fraction)
    );

    match booking.estado {
        BookingStatus::Confirmada => format!(
            "Hola {}, tu reserva quedó CONFIRMADA.\n\n{}{}\n\
             Cualquier consulta, respondé este mensaje.",
            booking.nombre, details, deposit_note
        ),
        BookingStatus::Rechazada | BookingStatus::Cancelada => format!(
            "Hola {}, gracias por tu solicitud.\n\
             Por el momento no hay disponibilidad para {} a {} ({}).\n\
             Si querés, decime otras fechas y lo revisamos.",
            booking.nombre, booking.checkin, booking.checkout, booking.cabana
        ),
        BookingStatus::Pendiente => format!(
            "Hola {}, recibimos tu solicitud.\n\n{}\
             En breve te confirmamos disponibilidad. {}",
            booking.nombre, details, deposit_note
        ),
    }
}
