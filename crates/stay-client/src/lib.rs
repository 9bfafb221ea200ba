//! # stay-client
//!
//! Headless client for a cabin booking site whose reservations live behind a
//! spreadsheet-backed API reachable only through callback-wrapped GET
//! requests.
//!
//! ## Modules
//!
//! - [`callback`]: One-shot callback registry with deadlines
//! - [`transport`]: The `Transport` seam and its HTTP implementation
//! - [`api`]: Typed API actions (availability, create, owner actions)
//! - [`reservation`]: Reservation form validation
//! - [`controller`]: Guest booking page state and handlers
//! - [`owner`]: Owner moderation panel
//! - [`message`]: Money formatting, WhatsApp links, guest messages
//! - [`config`]: Site configuration from the environment
//! - [`error`]: Error types

pub mod api;
pub mod callback;
pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod owner;
pub mod reservation;
pub mod transport;

pub use api::{Ack, BookingApi, Decision};
pub use callback::{CallbackRegistry, PendingCall};
pub use config::SiteConfig;
pub use controller::{BookingController, ViewState};
pub use error::ClientError;
pub use message::{format_money, guest_message, price_hint, whatsapp_url, StayNotes};
pub use owner::{MemorySessionStore, OwnerFilter, OwnerPanel, OwnerRow, SessionStore};
pub use reservation::{sanitize_phone, ReservationForm, ReservationRequest};
pub use transport::{JsonpTransport, Transport};
