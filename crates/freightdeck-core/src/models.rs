use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Customer record - the people we move freight for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<CustomerStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

/// Booking model - the star of the show
///
/// Date and enum fields arrive as free-form strings from the backend, so
/// anything unparseable lands as `None` here rather than failing the load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub booking_number: String,
    /// Loosely typed on the wire - absent for walk-in quotes.
    pub customer_id: Option<i64>,
    pub origin: String,
    pub destination: String,
    pub mode: Option<TransportMode>,
    pub status: Option<BookingStatus>,
    pub container_size: Option<String>,
    pub cargo_type: String,
    pub quantity: Option<u32>,
    pub weight_kg: Option<f64>,
    pub volume_cbm: Option<f64>,
    pub ready_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub quote_amount: Option<f64>,
    pub special_instructions: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Sea,
    Air,
    Road,
    Rail,
}

impl TransportMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sea" => Some(TransportMode::Sea),
            "air" => Some(TransportMode::Air),
            "road" => Some(TransportMode::Road),
            "rail" => Some(TransportMode::Rail),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Sea => write!(f, "Sea"),
            TransportMode::Air => write!(f, "Air"),
            TransportMode::Road => write!(f, "Road"),
            TransportMode::Rail => write!(f, "Rail"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Lost,
}

impl BookingStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "lost" => Some(BookingStatus::Lost),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "Pending"),
            BookingStatus::Confirmed => write!(f, "Confirmed"),
            BookingStatus::InProgress => write!(f, "In Progress"),
            BookingStatus::Completed => write!(f, "Completed"),
            BookingStatus::Lost => write!(f, "Lost"),
        }
    }
}

/// New booking as entered in the quote form.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: Option<i64>,
    pub origin: String,
    pub destination: String,
    pub mode: Option<TransportMode>,
    pub container_size: Option<String>,
    pub cargo_type: String,
    pub quantity: Option<u32>,
    pub weight_kg: Option<f64>,
    pub volume_cbm: Option<f64>,
    pub ready_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub quote_amount: Option<f64>,
    pub special_instructions: Option<String>,
}

/// Partial booking update; unset fields are left alone by the backend.
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub status: Option<BookingStatus>,
    pub quote_amount: Option<f64>,
    pub delivery_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
}

/// Headline dashboard counters, replaced wholesale on every fetch.
///
/// The change percentages are whatever the backend sent. The old frontend
/// fabricated "last month" client-side from a constant; that was a
/// placeholder, not business logic, so nothing here recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_customers: u32,
    pub active_customers: u32,
    pub total_bookings: u32,
    pub pending_bookings: u32,
    pub customers_change_pct: Option<f64>,
    pub bookings_change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_revenue: f64,
    pub outstanding_amount: f64,
    pub invoices_sent: u32,
    pub invoices_paid: u32,
    pub revenue_change_pct: Option<f64>,
}

/// Lenient timestamp parse: RFC 3339 first, then a bare date at midnight
/// UTC. Anything else is `None` - a malformed date must never sink a page.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|ndt| ndt.and_utc())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
