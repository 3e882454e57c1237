// Core business logic lives here - the brain of the operation
pub mod aggregator;
pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod notify;
pub mod pages;
pub mod support;

pub use aggregator::{DashboardAggregator, DashboardState, RefreshOutcome};
pub use backend::{CrmBackend, DemoBackend, HttpBackend};
pub use config::Config;
pub use error::Error;
pub use filter::{BookingFilters, DateRange};
pub use notify::{Notifier, TracingNotifier};
pub use pages::BookingsPage;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
