// API client for the freightdeck CRM backend, plus the demo/mock backend
pub mod client;
pub mod mock;
pub mod wire;

// Re-export common types
pub use client::{ApiError, CrmClient, Result};
pub use mock::MockCrm;
pub use wire::{
    BookingDto, BookingPatch, CustomerDto, DashboardStatsDto, FinancialSummaryDto, NewBookingDto,
};
