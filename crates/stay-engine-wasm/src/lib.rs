//! WASM bindings for stay-engine.
//!
//! Exposes the occupancy predicate, the date picker rules and pricing to the
//! booking page via `wasm-bindgen`. Ranges, bookings and policies cross the
//! boundary as JSON strings; dates are `YYYY-MM-DD` strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p stay-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir site/wasm/ \
//!   target/wasm32-unknown-unknown/release/stay_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stay_engine::{Booking, DateRange, DayStatus, PricingPolicy, UnitId};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Input format for occupied ranges passed from JavaScript.
#[derive(Deserialize)]
struct RangeInput {
    checkin: String,
    checkout: String,
}

#[derive(Serialize)]
struct RangeDto {
    checkin: String,
    checkout: String,
    nights: i64,
}

impl From<&DateRange> for RangeDto {
    fn from(r: &DateRange) -> Self {
        Self {
            checkin: r.checkin.to_string(),
            checkout: r.checkout.to_string(),
            nights: r.nights(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers: parse boundary inputs
// ---------------------------------------------------------------------------

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    stay_engine::parse_iso_date(s).map_err(|e| e.to_string())
}

/// Convert a JSON array of `{checkin, checkout}` objects into ranges.
fn parse_ranges_json(json: &str) -> Result<Vec<DateRange>, String> {
    let inputs: Vec<RangeInput> =
        serde_json::from_str(json).map_err(|e| format!("Invalid ranges JSON: {}", e))?;

    inputs
        .iter()
        .map(|r| DateRange::parse(&r.checkin, &r.checkout).map_err(|e| e.to_string()))
        .collect()
}

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

// ---------------------------------------------------------------------------
// Boundary-free implementations
// ---------------------------------------------------------------------------

fn day_status_impl(day: &str, today: &str, ranges_json: &str) -> Result<DayStatus, String> {
    let ranges = parse_ranges_json(ranges_json)?;
    Ok(stay_engine::day_status(
        parse_day(day)?,
        parse_day(today)?,
        &ranges,
    ))
}

fn can_select_departure_impl(
    day: &str,
    today: &str,
    arrival: Option<&str>,
    ranges_json: &str,
) -> Result<bool, String> {
    let ranges = parse_ranges_json(ranges_json)?;
    let arrival = arrival.map(parse_day).transpose()?;
    Ok(stay_engine::can_select_departure(
        parse_day(day)?,
        parse_day(today)?,
        arrival,
        &ranges,
    ))
}

fn quote_impl(checkin: &str, checkout: &str, policy_json: &str) -> Result<String, String> {
    let policy: PricingPolicy =
        serde_json::from_str(policy_json).map_err(|e| format!("Invalid policy JSON: {}", e))?;
    policy.validate().map_err(|e| e.to_string())?;

    let quote = policy.quote(checkin, checkout).map_err(|e| e.to_string())?;

    serde_json::to_string(&quote).map_err(|e| format!("Serialization error: {}", e))
}

fn ranges_for_unit_impl(bookings_json: &str, unit: &str) -> Result<String, String> {
    let bookings: Vec<Booking> =
        serde_json::from_str(bookings_json).map_err(|e| format!("Invalid bookings JSON: {}", e))?;
    let ranges = stay_engine::ranges_for_unit(&bookings, &UnitId::normalize(unit))
        .map_err(|e| e.to_string())?;

    let dtos: Vec<RangeDto> = ranges.iter().map(RangeDto::from).collect();
    serde_json::to_string(&dtos).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Normalized unit id of a free-form label ("Cabaña 2" -> "2").
#[wasm_bindgen(js_name = "cabanaId")]
pub fn cabana_id(label: &str) -> String {
    UnitId::normalize(label).as_str().to_string()
}

/// Whether the night starting on `day` is taken by any of the ranges.
///
/// `ranges_json` is a JSON array of `{checkin, checkout}` objects.
#[wasm_bindgen(js_name = "isOccupied")]
pub fn is_occupied(day: &str, ranges_json: &str) -> Result<bool, JsValue> {
    let ranges = parse_ranges_json(ranges_json).map_err(js_err)?;
    let day = parse_day(day).map_err(js_err)?;
    Ok(stay_engine::is_occupied(day, &ranges))
}

/// Arrival picker predicate.
#[wasm_bindgen(js_name = "canSelectArrival")]
pub fn can_select_arrival(day: &str, today: &str, ranges_json: &str) -> Result<bool, JsValue> {
    let ranges = parse_ranges_json(ranges_json).map_err(js_err)?;
    Ok(stay_engine::can_select_arrival(
        parse_day(day).map_err(js_err)?,
        parse_day(today).map_err(js_err)?,
        &ranges,
    ))
}

/// Departure picker predicate. With no `arrival` every day is rejected.
#[wasm_bindgen(js_name = "canSelectDeparture")]
pub fn can_select_departure(
    day: &str,
    today: &str,
    arrival: Option<String>,
    ranges_json: &str,
) -> Result<bool, JsValue> {
    can_select_departure_impl(day, today, arrival.as_deref(), ranges_json).map_err(js_err)
}

/// Paint state of a day cell: `"past"`, `"booked"` or `"free"`.
#[wasm_bindgen(js_name = "dayStatus")]
pub fn day_status(day: &str, today: &str, ranges_json: &str) -> Result<String, JsValue> {
    let status = day_status_impl(day, today, ranges_json).map_err(js_err)?;
    let json = serde_json::to_value(status)
        .map_err(|e| js_err(format!("Serialization error: {}", e)))?;
    Ok(json.as_str().unwrap_or_default().to_string())
}

/// Price a stay. Returns JSON `{nights, nightlyRate, total, depositDue}`, or
/// `null` for a stay without nights.
///
/// `policy_json` is `{longStayFromNights, shortRate, longRate, depositFraction}`.
#[wasm_bindgen(js_name = "quote")]
pub fn quote(checkin: &str, checkout: &str, policy_json: &str) -> Result<String, JsValue> {
    quote_impl(checkin, checkout, policy_json).map_err(js_err)
}

/// Occupied ranges of one unit from the availability feed, sorted by check-in.
///
/// Returns a JSON array of `{checkin, checkout, nights}` objects.
#[wasm_bindgen(js_name = "rangesForUnit")]
pub fn ranges_for_unit(bookings_json: &str, unit: &str) -> Result<String, JsValue> {
    ranges_for_unit_impl(bookings_json, unit).map_err(js_err)
}
