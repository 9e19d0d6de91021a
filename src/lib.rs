//! Installed-price quoting engine for LED display projects.
//!
//! The core is [`calculator::compute_quote`]: a pure function that turns a
//! [`models::ProjectInput`] into eighteen ordered cost lines and a final
//! sell price. Everything around it (rate catalog, CLI) is plumbing.

pub mod calculator;
pub mod db;
pub mod error;
pub mod models;
pub mod rates;

pub use calculator::{compute_quote, compute_quote_default, format_breakdown};
pub use error::QuoteError;
pub use models::{CostLine, ProjectInput, QuoteResult, QuoteSnapshot};
pub use rates::{CostConfig, RateCard};
