//! Core business logic abstractions

pub mod clock;
pub mod config;
pub mod currency;
pub mod error;
pub mod flight;
pub mod log;
pub mod quote;
pub mod rate;
pub mod store;

// Re-export main types for cleaner imports
pub use clock::{Clock, SystemClock};
pub use currency::{CurrencyCode, Pair};
pub use error::QuoteError;
pub use quote::{Quote, QuoteId};
pub use rate::RateSource;
pub use store::QuoteStore;
