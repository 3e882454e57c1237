// In-memory stand-in for the CRM backend. The real service is thin enough
// that demos and tests run against this instead; latency is simulated so
// the slow-refresh signalling has something to observe.
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};

use crate::client::{ApiError, Result};
use crate::wire::{
    BookingDto, BookingPatch, CustomerDto, DashboardStatsDto, FinancialSummaryDto, NewBookingDto,
};

/// Mock CRM backend with per-endpoint failure and cancellation knobs.
pub struct MockCrm {
    latency: Duration,
    bookings: Mutex<Vec<BookingDto>>,
    customers: Vec<CustomerDto>,
    failing: Mutex<HashSet<&'static str>>,
    cancel_next: Mutex<HashSet<&'static str>>,
    next_id: Mutex<i64>,
}

impl MockCrm {
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(150))
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            bookings: Mutex::new(sample_bookings()),
            customers: sample_customers(),
            failing: Mutex::new(HashSet::new()),
            cancel_next: Mutex::new(HashSet::new()),
            next_id: Mutex::new(100),
        }
    }

    /// Make an endpoint fail until [`MockCrm::heal`] is called.
    /// Endpoint keys: "stats", "customers", "bookings", "financial".
    pub fn fail(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn heal(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().remove(endpoint);
    }

    /// Make the next call to an endpoint report a cancellation.
    pub fn cancel_next(&self, endpoint: &'static str) {
        self.cancel_next.lock().unwrap().insert(endpoint);
    }

    async fn gate(&self, endpoint: &'static str) -> Result<()> {
        tokio::time::sleep(self.latency).await;
        if self.cancel_next.lock().unwrap().remove(endpoint) {
            return Err(ApiError::Cancelled);
        }
        if self.failing.lock().unwrap().contains(endpoint) {
            return Err(ApiError::RequestFailed(format!(
                "Status 500: simulated {} outage",
                endpoint
            )));
        }
        Ok(())
    }

    pub async fn get_bookings(&self) -> Result<Vec<BookingDto>> {
        self.gate("bookings").await?;
        Ok(self.bookings.lock().unwrap().clone())
    }

    pub async fn get_all_customers(&self) -> Result<Vec<CustomerDto>> {
        self.gate("customers").await?;
        Ok(self.customers.clone())
    }

    pub async fn get_dashboard_stats(&self) -> Result<DashboardStatsDto> {
        self.gate("stats").await?;
        let bookings = self.bookings.lock().unwrap();
        let pending = bookings
            .iter()
            .filter(|b| b.status.as_deref() == Some("pending"))
            .count() as u32;
        Ok(DashboardStatsDto {
            total_customers: self.customers.len() as u32,
            active_customers: self
                .customers
                .iter()
                .filter(|c| c.status.as_deref() == Some("active"))
                .count() as u32,
            total_bookings: bookings.len() as u32,
            pending_bookings: pending,
            customers_change_pct: Some(4.2),
            bookings_change_pct: Some(-1.8),
        })
    }

    pub async fn get_dashboard_recent_customers(&self) -> Result<Vec<CustomerDto>> {
        self.gate("customers").await?;
        Ok(self.customers.iter().take(5).cloned().collect())
    }

    pub async fn get_dashboard_recent_bookings(&self) -> Result<Vec<BookingDto>> {
        self.gate("bookings").await?;
        Ok(self.bookings.lock().unwrap().iter().take(5).cloned().collect())
    }

    pub async fn get_dashboard_financial_summary(&self) -> Result<FinancialSummaryDto> {
        self.gate("financial").await?;
        let bookings = self.bookings.lock().unwrap();
        let total: f64 = bookings.iter().filter_map(|b| b.quote_amount).sum();
        Ok(FinancialSummaryDto {
            total_revenue: total,
            outstanding_amount: total * 0.35,
            invoices_sent: 18,
            invoices_paid: 11,
            revenue_change_pct: Some(7.5),
        })
    }

    pub async fn create_booking(&self, data: &NewBookingDto) -> Result<BookingDto> {
        self.gate("bookings").await?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = *next_id;
        let dto = BookingDto {
            id,
            booking_number: format!("BK-{:04}", id),
            customer_id: data.customer_id,
            origin: data.origin.clone(),
            destination: data.destination.clone(),
            transport_mode: data.transport_mode.clone(),
            status: Some("pending".into()),
            container_size: data.container_size.clone(),
            cargo_type: data.cargo_type.clone(),
            quantity: data.quantity,
            weight_kg: data.weight_kg,
            volume_cbm: data.volume_cbm,
            ready_date: data.ready_date.clone(),
            delivery_date: data.delivery_date.clone(),
            quote_amount: data.quote_amount,
            special_instructions: data.special_instructions.clone(),
            created_at: Some(Utc::now().to_rfc3339()),
        };
        self.bookings.lock().unwrap().push(dto.clone());
        Ok(dto)
    }

    pub async fn update_booking(&self, id: i64, data: &BookingPatch) -> Result<BookingDto> {
        self.gate("bookings").await?;
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("bookings/{}", id)))?;
        if let Some(status) = &data.status {
            booking.status = Some(status.clone());
        }
        if let Some(amount) = data.quote_amount {
            booking.quote_amount = Some(amount);
        }
        if let Some(date) = &data.delivery_date {
            booking.delivery_date = Some(date.clone());
        }
        if let Some(notes) = &data.special_instructions {
            booking.special_instructions = Some(notes.clone());
        }
        Ok(booking.clone())
    }

    pub async fn delete_booking(&self, id: i64) -> Result<()> {
        self.gate("bookings").await?;
        let mut bookings = self.bookings.lock().unwrap();
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        if bookings.len() == before {
            return Err(ApiError::NotFound(format!("bookings/{}", id)));
        }
        Ok(())
    }
}

impl Default for MockCrm {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_customers() -> Vec<CustomerDto> {
    vec![
        CustomerDto {
            id: 1,
            company_name: "Meridian Textiles Ltd".into(),
            contact_name: Some("Anita Rao".into()),
            email: Some("anita@meridiantex.example".into()),
            phone: Some("+94 11 234 5678".into()),
            status: Some("active".into()),
        },
        CustomerDto {
            id: 2,
            company_name: "Baltic Machine Parts OÜ".into(),
            contact_name: Some("Kristjan Tamm".into()),
            email: Some("kristjan@balticparts.example".into()),
            phone: None,
            status: Some("active".into()),
        },
        CustomerDto {
            id: 3,
            company_name: "Southbound Produce Co".into(),
            contact_name: None,
            email: Some("ops@southbound.example".into()),
            phone: Some("+61 2 9000 1122".into()),
            status: Some("inactive".into()),
        },
    ]
}

fn sample_bookings() -> Vec<BookingDto> {
    let now = Utc::now();
    let days_ago = |d: i64| Some((now - ChronoDuration::days(d)).to_rfc3339());
    vec![
        BookingDto {
            id: 11,
            booking_number: "BK-0011".into(),
            customer_id: Some(1),
            origin: "Colombo".into(),
            destination: "Rotterdam".into(),
            transport_mode: Some("sea".into()),
            status: Some("confirmed".into()),
            container_size: Some("40HC".into()),
            cargo_type: "Garments".into(),
            quantity: Some(420),
            weight_kg: Some(8600.0),
            volume_cbm: Some(62.0),
            ready_date: Some("2026-09-04".into()),
            delivery_date: Some("2026-10-02".into()),
            quote_amount: Some(3150.0),
            special_instructions: Some("Fumigation certificate required".into()),
            created_at: days_ago(2),
        },
        BookingDto {
            id: 12,
            booking_number: "BK-0012".into(),
            customer_id: Some(2),
            origin: "Tallinn".into(),
            destination: "Hamburg".into(),
            transport_mode: Some("road".into()),
            status: Some("pending".into()),
            container_size: None,
            cargo_type: "Machine spares".into(),
            quantity: Some(12),
            weight_kg: Some(940.0),
            volume_cbm: Some(4.5),
            ready_date: Some("2026-09-01".into()),
            delivery_date: None,
            quote_amount: Some(780.0),
            special_instructions: None,
            created_at: days_ago(5),
        },
        BookingDto {
            id: 13,
            booking_number: "BK-0013".into(),
            customer_id: Some(3),
            origin: "Melbourne".into(),
            destination: "Singapore".into(),
            transport_mode: Some("air".into()),
            status: Some("completed".into()),
            container_size: None,
            cargo_type: "Chilled produce".into(),
            quantity: Some(60),
            weight_kg: Some(1800.0),
            volume_cbm: Some(9.2),
            ready_date: None,
            delivery_date: Some("2026-07-28".into()),
            quote_amount: Some(5400.0),
            special_instructions: Some("Keep below 4C".into()),
            created_at: days_ago(40),
        },
        BookingDto {
            id: 14,
            booking_number: "BK-0014".into(),
            customer_id: None,
            origin: "Gdansk".into(),
            destination: "Oslo".into(),
            transport_mode: Some("rail".into()),
            status: Some("in_progress".into()),
            container_size: Some("20GP".into()),
            cargo_type: "Steel coils".into(),
            quantity: Some(8),
            weight_kg: Some(15400.0),
            volume_cbm: Some(11.0),
            ready_date: Some("2026-08-20".into()),
            delivery_date: Some("2026-09-10".into()),
            quote_amount: Some(2200.0),
            special_instructions: None,
            // Deliberately malformed; the core conversion must shrug this off
            created_at: Some("not-a-date".into()),
        },
    ]
}
