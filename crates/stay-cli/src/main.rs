//! `cabins` CLI: quotes, availability checks and reservation moderation.
//!
//! ## Usage
//!
//! ```sh
//! # Price a stay with the configured rates
//! cabins quote --checkin 2025-01-10 --checkout 2025-01-14
//!
//! # Check dates against a saved availability feed (exit 1 if not selectable)
//! cabins check --bookings feed.json --unit 2 --arrival 2025-01-10 --departure 2025-01-14
//!
//! # Month view of a unit: `.` free, `x` booked, `-` past
//! cabins calendar --bookings feed.json --unit 2 --month 2025-01
//!
//! # Online commands need CABINS_API_BASE or --api-base
//! cabins availability --unit 2
//! cabins request --unit 2 --guests 4 --name Ana --phone 3515555555 \
//!     --checkin 2025-01-10 --checkout 2025-01-14
//! cabins owner --pin 1234 list --status PENDIENTE
//! cabins owner --pin 1234 confirm ROW_ID
//! ```

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use std::process;
use stay_client::{
    format_money, price_hint, BookingApi, BookingController, Decision, MemorySessionStore,
    OwnerFilter, OwnerPanel, OwnerRow, ReservationForm, SiteConfig,
};
use stay_engine::date::{parse_timezone, today_in};
use stay_engine::{
    bookings_for_unit, can_select_arrival, can_select_departure, is_occupied, month_days,
    parse_iso_date, ranges_for_unit, Booking, BookingStatus, DayStatus, PricingPolicy, UnitId,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cabins",
    version,
    about = "Cabin availability, pricing and reservation moderation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reservation API endpoint (overrides CABINS_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Nightly rate for short stays (overrides CABINS_SHORT_RATE)
    #[arg(long, global = true)]
    short_rate: Option<u64>,

    /// Nightly rate for long stays (overrides CABINS_LONG_RATE)
    #[arg(long, global = true)]
    long_rate: Option<u64>,

    /// Nights from which the long-stay rate applies (overrides CABINS_LONG_FROM_NIGHTS)
    #[arg(long, global = true)]
    long_from_nights: Option<u32>,

    /// Deposit as a fraction of the total (overrides CABINS_DEPOSIT_FRACTION)
    #[arg(long, global = true)]
    deposit_fraction: Option<f64>,

    /// IANA zone that decides what "today" is (overrides CABINS_TIMEZONE)
    #[arg(long, global = true)]
    timezone: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a stay
    Quote {
        #[arg(long)]
        checkin: String,
        #[arg(long)]
        checkout: String,
    },
    /// Check whether dates can be picked for a unit, using a saved feed
    Check {
        /// JSON file with the confirmed bookings feed
        #[arg(long)]
        bookings: String,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        arrival: String,
        #[arg(long)]
        departure: Option<String>,
        /// Pretend today is this date
        #[arg(long)]
        today: Option<String>,
    },
    /// Print a month of a unit's calendar from a saved feed
    Calendar {
        #[arg(long)]
        bookings: String,
        #[arg(long)]
        unit: String,
        /// Month as YYYY-MM
        #[arg(long)]
        month: String,
        #[arg(long)]
        today: Option<String>,
    },
    /// List a unit's confirmed stays from a saved feed
    Bookings {
        #[arg(long)]
        bookings: String,
        #[arg(long)]
        unit: String,
    },
    /// Fetch and list a unit's confirmed stays
    Availability {
        #[arg(long)]
        unit: String,
    },
    /// Validate and send a reservation request
    Request {
        #[arg(long)]
        unit: String,
        #[arg(long)]
        guests: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        checkin: String,
        #[arg(long)]
        checkout: String,
    },
    /// Owner moderation actions
    Owner {
        #[arg(long)]
        pin: String,
        #[command(subcommand)]
        action: OwnerAction,
    },
}

#[derive(Subcommand)]
enum OwnerAction {
    /// List reservations of any status
    List {
        #[arg(long)]
        unit: Option<String>,
        /// PENDIENTE, CONFIRMADA, RECHAZADA or CANCELADA
        #[arg(long)]
        status: Option<String>,
        /// Case-insensitive text search
        #[arg(long)]
        search: Option<String>,
    },
    /// Confirm a pending reservation
    Confirm { id: String },
    /// Reject a pending reservation
    Reject { id: String },
    /// Delete a reservation
    Delete { id: String },
    /// Delete every reservation
    Reset {
        /// Required; there is no undo
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Quote { checkin, checkout } => {
            match config.policy.quote(&checkin, &checkout)? {
                Some(q) => {
                    println!("nights:        {}", q.nights);
                    println!("nightly rate:  {}", format_money(q.nightly_rate as f64));
                    println!("total:         {}", format_money(q.total as f64));
                    println!("deposit:       {}", format_money(q.deposit_due));
                    println!("{}", price_hint(&config.notes, config.policy.deposit_fraction));
                }
                None => println!("no nights selected"),
            }
        }
        Commands::Check {
            bookings,
            unit,
            arrival,
            departure,
            today,
        } => {
            let feed = read_feed(&bookings)?;
            let today = resolve_today(today.as_deref(), &config)?;
            let arrival = parse_iso_date(&arrival)?;
            let departure = departure.as_deref().map(parse_iso_date).transpose()?;
            let ranges = ranges_for_unit(&feed, &UnitId::normalize(&unit))?;

            match check_stay(arrival, departure, today, &ranges) {
                Ok(summary) => println!("available: {}", summary),
                Err(reason) => {
                    println!("not available: {}", reason);
                    process::exit(1);
                }
            }
        }
        Commands::Calendar {
            bookings,
            unit,
            month,
            today,
        } => {
            let feed = read_feed(&bookings)?;
            let today = resolve_today(today.as_deref(), &config)?;
            let (year, month) = parse_month(&month)?;
            let ranges = ranges_for_unit(&feed, &UnitId::normalize(&unit))?;
            let days = month_days(year, month, today, &ranges)?;
            print!("{}", render_month(&unit, year, month, &days));
        }
        Commands::Bookings { bookings, unit } => {
            let feed = read_feed(&bookings)?;
            print_stays(&bookings_for_unit(&feed, &UnitId::normalize(&unit)));
        }
        Commands::Availability { unit } => {
            let api = BookingApi::new(config.transport()?);
            let feed = api.availability().await?;
            print_stays(&bookings_for_unit(&feed, &UnitId::normalize(&unit)));
        }
        Commands::Request {
            unit,
            guests,
            name,
            phone,
            checkin,
            checkout,
        } => {
            let controller = BookingController::new(
                BookingApi::new(config.transport()?),
                config.policy,
                config.timezone,
            );
            controller
                .reload()
                .await
                .context("loading availability before sending the request")?;
            let form = ReservationForm {
                unit,
                guests,
                name,
                phone,
                checkin,
                checkout,
            };
            let request = controller.submit(&form).await?;
            println!(
                "request sent for unit {}: {} -> {} ({} nights), awaiting confirmation",
                request.unit, request.stay.checkin, request.stay.checkout, request.nights()
            );
            let quote = config
                .policy
                .quote_dates(request.stay.checkin, request.stay.checkout);
            if let Some(q) = quote {
                println!(
                    "total {}, deposit {}",
                    format_money(q.total as f64),
                    format_money(q.deposit_due)
                );
            }
        }
        Commands::Owner { pin, action } => {
            if let OwnerAction::Reset { yes: false } = action {
                bail!("reset deletes every reservation; pass --yes to confirm");
            }

            let api = BookingApi::new(config.transport()?).with_version(config.version.clone());
            let mut panel = OwnerPanel::new(
                api,
                MemorySessionStore::default(),
                config.policy,
                config.notes.clone(),
            );
            panel.login(&pin).await.context("owner login failed")?;

            let filter = match action {
                OwnerAction::List {
                    unit,
                    status,
                    search,
                } => OwnerFilter {
                    unit,
                    status: status.as_deref().map(str::parse::<BookingStatus>).transpose()?,
                    term: search,
                },
                OwnerAction::Confirm { id } => {
                    panel.decide(&id, Decision::Confirm).await?;
                    println!("confirmed {}", id);
                    OwnerFilter::default()
                }
                OwnerAction::Reject { id } => {
                    panel.decide(&id, Decision::Reject).await?;
                    println!("rejected {}", id);
                    OwnerFilter::default()
                }
                OwnerAction::Delete { id } => {
                    panel.delete(&id).await?;
                    println!("deleted {}", id);
                    OwnerFilter::default()
                }
                OwnerAction::Reset { .. } => {
                    panel.reset().await?;
                    println!("all reservations deleted");
                    OwnerFilter::default()
                }
            };

            for row in panel.rows(&filter) {
                println!("{}", render_row(&row));
            }
            println!("{}", panel.status_line(&filter));
        }
    }

    Ok(())
}

/// Environment first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let mut config = SiteConfig::from_env()?;

    if let Some(base) = &cli.api_base {
        config.api_base = Some(base.clone());
    }
    if let Some(tz) = &cli.timezone {
        config.timezone = parse_timezone(tz)?;
    }

    let p = config.policy;
    config.policy = PricingPolicy::new(
        cli.long_from_nights.unwrap_or(p.long_stay_from_nights),
        cli.short_rate.unwrap_or(p.short_rate),
        cli.long_rate.unwrap_or(p.long_rate),
        cli.deposit_fraction.unwrap_or(p.deposit_fraction),
    )?;

    Ok(config)
}

fn read_feed(path: &str) -> Result<Vec<Booking>> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse bookings in {}", path))
}

fn resolve_today(flag: Option<&str>, config: &SiteConfig) -> Result<NaiveDate> {
    match flag {
        Some(s) => Ok(parse_iso_date(s)?),
        None => Ok(today_in(config.timezone)),
    }
}

fn parse_month(s: &str) -> Result<(i32, u32)> {
    let first = parse_iso_date(&format!("{}-01", s.trim()))
        .with_context(|| format!("'{}' is not a YYYY-MM month", s))?;
    Ok((first.year(), first.month()))
}

/// Summary of a selectable stay, or the reason it cannot be picked.
fn check_stay(
    arrival: NaiveDate,
    departure: Option<NaiveDate>,
    today: NaiveDate,
    ranges: &[stay_engine::DateRange],
) -> std::result::Result<String, String> {
    if !can_select_arrival(arrival, today, ranges) {
        return Err(if arrival < today {
            format!("arrival {} is in the past", arrival)
        } else if is_occupied(arrival, ranges) {
            format!("the night of {} is already booked", arrival)
        } else {
            format!("arrival {} cannot be selected", arrival)
        });
    }

    let Some(departure) = departure else {
        return Ok(format!("arrival {}", arrival));
    };
    if !can_select_departure(departure, today, Some(arrival), ranges) {
        return Err(if departure <= arrival {
            format!("departure {} must be after arrival {}", departure, arrival)
        } else {
            format!(
                "{} -> {} includes a night that is already booked",
                arrival, departure
            )
        });
    }

    let nights = (departure - arrival).num_days();
    Ok(format!("{} -> {} ({} nights)", arrival, departure, nights))
}

fn render_month(unit: &str, year: i32, month: u32, days: &[stay_engine::CalendarDay]) -> String {
    let mut out = format!("{}-{:02}  unit {}\n", year, month, unit);
    out.push_str(" Mo  Tu  We  Th  Fr  Sa  Su\n");

    let lead = days
        .first()
        .map(|d| d.date.weekday().num_days_from_monday() as usize)
        .unwrap_or(0);
    let mut cells: Vec<String> = vec!["   ".to_string(); lead];
    cells.extend(days.iter().map(|d| {
        let mark = match d.status {
            DayStatus::Free => '.',
            DayStatus::Booked => 'x',
            DayStatus::Past => '-',
        };
        format!("{:>2}{}", d.date.day(), mark)
    }));

    for week in cells.chunks(7) {
        out.push_str(week.join(" ").trim_end());
        out.push('\n');
    }
    out
}

fn print_stays(stays: &[&Booking]) {
    if stays.is_empty() {
        println!("no confirmed stays");
        return;
    }
    for b in stays {
        println!("{} -> {}  ({} guests)", b.checkin, b.checkout, b.personas);
    }
}

fn render_row(row: &OwnerRow) -> String {
    let b = &row.booking;
    let total = row
        .quote
        .map(|q| format_money(q.total as f64))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<10} {:<10} unit {:<8} {} -> {}  {:<20} {:<15} {}  {}",
        b.id,
        b.estado.as_str(),
        b.cabana,
        b.checkin,
        b.checkout,
        b.nombre,
        b.telefono,
        total,
        row.whatsapp_url
    )
}
