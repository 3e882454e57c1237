// Backend trait - makes testing easier and keeps things flexible
//
// The aggregator and export engine only ever see this seam, so they run
// unchanged against the HTTP client, the demo backend, or a test mock.
use async_trait::async_trait;

use freightdeck_api::{ApiError, CrmClient, MockCrm};

use crate::models::{
    Booking, BookingUpdate, Customer, CustomerStatus, DashboardStats, FinancialSummary,
    NewBooking, parse_date, parse_datetime,
};
use crate::{Error, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmBackend: Send + Sync {
    async fn get_bookings(&self) -> Result<Vec<Booking>>;
    async fn get_all_customers(&self) -> Result<Vec<Customer>>;
    async fn create_booking(&self, data: NewBooking) -> Result<Booking>;
    async fn update_booking(&self, id: i64, data: BookingUpdate) -> Result<Booking>;
    async fn delete_booking(&self, id: i64) -> Result<()>;
    async fn get_dashboard_stats(&self) -> Result<DashboardStats>;
    async fn get_dashboard_recent_customers(&self) -> Result<Vec<Customer>>;
    async fn get_dashboard_recent_bookings(&self) -> Result<Vec<Booking>>;
    async fn get_dashboard_financial_summary(&self) -> Result<FinancialSummary>;
}

/// Wrapper around [`CrmClient`] that implements [`CrmBackend`].
pub struct HttpBackend {
    client: CrmClient,
}

impl HttpBackend {
    pub fn new(client: CrmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CrmBackend for HttpBackend {
    async fn get_bookings(&self) -> Result<Vec<Booking>> {
        let dtos = self.client.get_bookings().await.map_err(map_api)?;
        Ok(dtos.into_iter().map(booking_from_wire).collect())
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>> {
        let dtos = self.client.get_all_customers().await.map_err(map_api)?;
        Ok(dtos.into_iter().map(customer_from_wire).collect())
    }

    async fn create_booking(&self, data: NewBooking) -> Result<Booking> {
        let dto = self
            .client
            .create_booking(&new_booking_to_wire(&data))
            .await
            .map_err(map_api)?;
        Ok(booking_from_wire(dto))
    }

    async fn update_booking(&self, id: i64, data: BookingUpdate) -> Result<Booking> {
        let dto = self
            .client
            .update_booking(id, &update_to_wire(&data))
            .await
            .map_err(map_api)?;
        Ok(booking_from_wire(dto))
    }

    async fn delete_booking(&self, id: i64) -> Result<()> {
        self.client.delete_booking(id).await.map_err(map_api)
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        let dto = self.client.get_dashboard_stats().await.map_err(map_api)?;
        Ok(stats_from_wire(dto))
    }

    async fn get_dashboard_recent_customers(&self) -> Result<Vec<Customer>> {
        let dtos = self
            .client
            .get_dashboard_recent_customers()
            .await
            .map_err(map_api)?;
        Ok(dtos.into_iter().map(customer_from_wire).collect())
    }

    async fn get_dashboard_recent_bookings(&self) -> Result<Vec<Booking>> {
        let dtos = self
            .client
            .get_dashboard_recent_bookings()
            .await
            .map_err(map_api)?;
        Ok(dtos.into_iter().map(booking_from_wire).collect())
    }

    async fn get_dashboard_financial_summary(&self) -> Result<FinancialSummary> {
        let dto = self
            .client
            .get_dashboard_financial_summary()
            .await
            .map_err(map_api)?;
        Ok(financial_from_wire(dto))
    }
}

/// Backend over the in-memory mock CRM, for demos and tests.
pub struct DemoBackend {
    mock: MockCrm,
}

impl DemoBackend {
    pub fn new() -> Self {
        Self {
            mock: MockCrm::new(),
        }
    }

    pub fn with_mock(mock: MockCrm) -> Self {
        Self { mock }
    }

    /// Access to the failure/latency knobs.
    pub fn mock(&self) -> &MockCrm {
        &self.mock
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrmBackend for DemoBackend {
    async fn get_bookings(&self) -> Result<Vec<Booking>> {
        let dtos = self.mock.get_bookings().await.map_err(map_api)?;
        Ok(dtos.into_iter().map(booking_from_wire).collect())
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>> {
        let dtos = self.mock.get_all_customers().await.map_err(map_api)?;
        Ok(dtos.into_iter().map(customer_from_wire).collect())
    }

    async fn create_booking(&self, data: NewBooking) -> Result<Booking> {
        let dto = self
            .mock
            .create_booking(&new_booking_to_wire(&data))
            .await
            .map_err(map_api)?;
        Ok(booking_from_wire(dto))
    }

    async fn update_booking(&self, id: i64, data: BookingUpdate) -> Result<Booking> {
        let dto = self
            .mock
            .update_booking(id, &update_to_wire(&data))
            .await
            .map_err(map_api)?;
        Ok(booking_from_wire(dto))
    }

    async fn delete_booking(&self, id: i64) -> Result<()> {
        self.mock.delete_booking(id).await.map_err(map_api)
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        let dto = self.mock.get_dashboard_stats().await.map_err(map_api)?;
        Ok(stats_from_wire(dto))
    }

    async fn get_dashboard_recent_customers(&self) -> Result<Vec<Customer>> {
        let dtos = self
            .mock
            .get_dashboard_recent_customers()
            .await
            .map_err(map_api)?;
        Ok(dtos.into_iter().map(customer_from_wire).collect())
    }

    async fn get_dashboard_recent_bookings(&self) -> Result<Vec<Booking>> {
        let dtos = self
            .mock
            .get_dashboard_recent_bookings()
            .await
            .map_err(map_api)?;
        Ok(dtos.into_iter().map(booking_from_wire).collect())
    }

    async fn get_dashboard_financial_summary(&self) -> Result<FinancialSummary> {
        let dto = self
            .mock
            .get_dashboard_financial_summary()
            .await
            .map_err(map_api)?;
        Ok(financial_from_wire(dto))
    }
}

fn map_api(err: ApiError) -> Error {
    if err.is_cancellation() {
        Error::Cancelled
    } else {
        Error::Backend(err.to_string())
    }
}

/// Convert a wire booking to the typed model. Total by construction:
/// unparseable dates and enum strings become `None`.
fn booking_from_wire(dto: freightdeck_api::BookingDto) -> Booking {
    Booking {
        id: dto.id,
        booking_number: dto.booking_number,
        customer_id: dto.customer_id,
        origin: dto.origin,
        destination: dto.destination,
        mode: dto.transport_mode.as_deref().and_then(crate::models::TransportMode::parse),
        status: dto.status.as_deref().and_then(crate::models::BookingStatus::parse),
        container_size: dto.container_size,
        cargo_type: dto.cargo_type,
        quantity: dto.quantity,
        weight_kg: dto.weight_kg,
        volume_cbm: dto.volume_cbm,
        ready_date: dto.ready_date.as_deref().and_then(parse_date),
        delivery_date: dto.delivery_date.as_deref().and_then(parse_date),
        quote_amount: dto.quote_amount,
        special_instructions: dto.special_instructions,
        created_at: dto.created_at.as_deref().and_then(parse_datetime),
    }
}

fn customer_from_wire(dto: freightdeck_api::CustomerDto) -> Customer {
    let status = dto.status.as_deref().and_then(|raw| match raw {
        "active" => Some(CustomerStatus::Active),
        "inactive" => Some(CustomerStatus::Inactive),
        _ => None,
    });
    Customer {
        id: dto.id,
        company_name: dto.company_name,
        contact_name: dto.contact_name,
        email: dto.email,
        phone: dto.phone,
        status,
    }
}

fn stats_from_wire(dto: freightdeck_api::DashboardStatsDto) -> DashboardStats {
    DashboardStats {
        total_customers: dto.total_customers,
        active_customers: dto.active_customers,
        total_bookings: dto.total_bookings,
        pending_bookings: dto.pending_bookings,
        customers_change_pct: dto.customers_change_pct,
        bookings_change_pct: dto.bookings_change_pct,
    }
}

fn financial_from_wire(dto: freightdeck_api::FinancialSummaryDto) -> FinancialSummary {
    FinancialSummary {
        total_revenue: dto.total_revenue,
        outstanding_amount: dto.outstanding_amount,
        invoices_sent: dto.invoices_sent,
        invoices_paid: dto.invoices_paid,
        revenue_change_pct: dto.revenue_change_pct,
    }
}

fn new_booking_to_wire(data: &NewBooking) -> freightdeck_api::NewBookingDto {
    freightdeck_api::NewBookingDto {
        customer_id: data.customer_id,
        origin: data.origin.clone(),
        destination: data.destination.clone(),
        transport_mode: data.mode.map(|m| m.to_string().to_lowercase()),
        container_size: data.container_size.clone(),
        cargo_type: data.cargo_type.clone(),
        quantity: data.quantity,
        weight_kg: data.weight_kg,
        volume_cbm: data.volume_cbm,
        ready_date: data.ready_date.map(|d| d.to_string()),
        delivery_date: data.delivery_date.map(|d| d.to_string()),
        quote_amount: data.quote_amount,
        special_instructions: data.special_instructions.clone(),
    }
}

fn update_to_wire(data: &BookingUpdate) -> freightdeck_api::BookingPatch {
    freightdeck_api::BookingPatch {
        status: data.status.map(wire_status),
        quote_amount: data.quote_amount,
        delivery_date: data.delivery_date.map(|d| d.to_string()),
        special_instructions: data.special_instructions.clone(),
    }
}

fn wire_status(status: crate::models::BookingStatus) -> String {
    use crate::models::BookingStatus::*;
    match status {
        Pending => "pending",
        Confirmed => "confirmed",
        InProgress => "in_progress",
        Completed => "completed",
        Lost => "lost",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightdeck_api::BookingDto;

    fn bare_dto() -> BookingDto {
        BookingDto {
            id: 1,
            booking_number: "BK-0001".into(),
            customer_id: None,
            origin: "A".into(),
            destination: "B".into(),
            transport_mode: None,
            status: None,
            container_size: None,
            cargo_type: "General".into(),
            quantity: None,
            weight_kg: None,
            volume_cbm: None,
            ready_date: None,
            delivery_date: None,
            quote_amount: None,
            special_instructions: None,
            created_at: None,
        }
    }

    #[test]
    fn test_malformed_wire_fields_become_none() {
        let mut dto = bare_dto();
        dto.transport_mode = Some("hovercraft".into());
        dto.status = Some("???".into());
        dto.created_at = Some("yesterday-ish".into());
        dto.ready_date = Some("31/12/2026".into());

        let booking = booking_from_wire(dto);
        assert!(booking.mode.is_none());
        assert!(booking.status.is_none());
        assert!(booking.created_at.is_none());
        assert!(booking.ready_date.is_none());
    }

    #[test]
    fn test_well_formed_wire_fields_convert() {
        let mut dto = bare_dto();
        dto.transport_mode = Some("sea".into());
        dto.status = Some("in_progress".into());
        dto.created_at = Some("2026-08-15T08:00:00Z".into());
        dto.delivery_date = Some("2026-09-10".into());

        let booking = booking_from_wire(dto);
        assert_eq!(booking.mode, Some(crate::models::TransportMode::Sea));
        assert_eq!(booking.status, Some(crate::models::BookingStatus::InProgress));
        assert!(booking.created_at.is_some());
        assert!(booking.delivery_date.is_some());
    }

    #[test]
    fn test_cancellation_maps_to_cancelled() {
        let err = map_api(ApiError::Cancelled);
        assert!(err.is_cancellation());
        let err = map_api(ApiError::RequestFailed("500".into()));
        assert!(!err.is_cancellation());
    }

    #[tokio::test]
    async fn test_demo_backend_round_trip() {
        let backend = DemoBackend::with_mock(MockCrm::with_latency(std::time::Duration::ZERO));
        let bookings = backend.get_bookings().await.unwrap();
        assert!(!bookings.is_empty());
        // The deliberately malformed seed row comes through with created_at = None
        assert!(bookings.iter().any(|b| b.created_at.is_none()));
    }
}
