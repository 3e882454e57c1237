// Wire-level payloads as the backend sends them. Dates and enums stay raw
// strings here; freightdeck-core owns the lenient conversion into typed
// models so a sloppy backend row never fails a whole page load.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: i64,
    pub company_name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDto {
    pub id: i64,
    pub booking_number: String,
    /// Loosely typed on the backend - may be absent for walk-in quotes.
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub transport_mode: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub container_size: Option<String>,
    #[serde(default)]
    pub cargo_type: String,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub volume_cbm: Option<f64>,
    #[serde(default)]
    pub ready_date: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub quote_amount: Option<f64>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Payload for creating a booking. The backend assigns id, booking number
/// and created_at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookingDto {
    pub customer_id: Option<i64>,
    pub origin: String,
    pub destination: String,
    pub transport_mode: Option<String>,
    pub container_size: Option<String>,
    pub cargo_type: String,
    pub quantity: Option<u32>,
    pub weight_kg: Option<f64>,
    pub volume_cbm: Option<f64>,
    pub ready_date: Option<String>,
    pub delivery_date: Option<String>,
    pub quote_amount: Option<f64>,
    pub special_instructions: Option<String>,
}

/// Partial update; `None` fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStatsDto {
    pub total_customers: u32,
    pub active_customers: u32,
    pub total_bookings: u32,
    pub pending_bookings: u32,
    /// Passed through verbatim; the backend owns this computation.
    #[serde(default)]
    pub customers_change_pct: Option<f64>,
    #[serde(default)]
    pub bookings_change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummaryDto {
    pub total_revenue: f64,
    pub outstanding_amount: f64,
    pub invoices_sent: u32,
    pub invoices_paid: u32,
    #[serde(default)]
    pub revenue_change_pct: Option<f64>,
}
