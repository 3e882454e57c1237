// Page-level state for the bookings screen, modeled as an explicit
// snapshot plus transition methods instead of callback spaghetti. The
// dashboard page's state lives with its aggregator.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::backend::CrmBackend;
use crate::filter::BookingFilters;
use crate::models::{Booking, Customer};
use crate::Error;

/// In-memory state of the bookings page. Rebuilt from scratch on every
/// page mount; nothing is shared across pages.
pub struct BookingsPage {
    pub bookings: Vec<Booking>,
    pub customers: Vec<Customer>,
    pub filters: BookingFilters,
    pub loading: bool,
    pub bookings_error: Option<String>,
    pub customers_error: Option<String>,
    exporting: Arc<AtomicBool>,
}

impl BookingsPage {
    pub fn new() -> Self {
        Self {
            bookings: Vec::new(),
            customers: Vec::new(),
            filters: BookingFilters::default(),
            loading: false,
            bookings_error: None,
            customers_error: None,
            exporting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load both sources, tolerating partial failure: a dead customers
    /// endpoint still leaves the bookings table usable and vice versa.
    pub async fn load(&mut self, backend: &dyn CrmBackend) {
        self.loading = true;

        let (bookings, customers) =
            tokio::join!(backend.get_bookings(), backend.get_all_customers());

        match bookings {
            Ok(list) => {
                self.bookings = list;
                self.bookings_error = None;
            }
            // Cancellations leave no trace, not even a log line
            Err(e) if e.is_cancellation() => {}
            Err(e) => {
                let msg = Error::BookingsFetchFailed(e.to_string()).to_string();
                warn!("{}", msg);
                self.bookings_error = Some(msg);
            }
        }

        match customers {
            Ok(list) => {
                self.customers = list;
                self.customers_error = None;
            }
            Err(e) if e.is_cancellation() => {}
            Err(e) => {
                let msg = Error::CustomersFetchFailed(e.to_string()).to_string();
                warn!("{}", msg);
                self.customers_error = Some(msg);
            }
        }

        self.loading = false;
    }

    /// The derived display list for the active filters.
    pub fn filtered(&self, now: DateTime<Utc>) -> Vec<Booking> {
        self.filters.apply(&self.bookings, now)
    }

    /// Resolve a customer reference to a display name. "Unknown" only after
    /// the directory is loaded and genuinely misses the id.
    pub fn customer_name(&self, customer_id: Option<i64>) -> String {
        customer_id
            .and_then(|id| self.customers.iter().find(|c| c.id == id))
            .map(|c| c.company_name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Optimistic array updates, called only after the backend round-trip
    /// confirmed the change.
    pub fn apply_created(&mut self, booking: Booking) {
        self.bookings.push(booking);
    }

    pub fn apply_updated(&mut self, booking: Booking) {
        if let Some(slot) = self.bookings.iter_mut().find(|b| b.id == booking.id) {
            *slot = booking;
        }
    }

    pub fn apply_deleted(&mut self, id: i64) {
        self.bookings.retain(|b| b.id != id);
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    /// Mark an export as in progress. The returned guard clears the flag
    /// when dropped, on every exit path including panics, so the page can
    /// never get stuck in "exporting".
    pub fn begin_export(&self) -> ExportInProgress {
        self.exporting.store(true, Ordering::SeqCst);
        ExportInProgress {
            flag: Arc::clone(&self.exporting),
        }
    }
}

impl Default for BookingsPage {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ExportInProgress {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportInProgress {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DemoBackend, MockCrmBackend};
    use freightdeck_api::MockCrm;
    use std::time::Duration;

    #[tokio::test]
    async fn test_load_populates_both_sources() {
        let backend = DemoBackend::with_mock(MockCrm::with_latency(Duration::ZERO));
        let mut page = BookingsPage::new();
        page.load(&backend).await;

        assert!(!page.bookings.is_empty());
        assert!(!page.customers.is_empty());
        assert!(!page.loading);
        assert!(page.bookings_error.is_none());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_working_source() {
        let backend = DemoBackend::with_mock(MockCrm::with_latency(Duration::ZERO));
        backend.mock().fail("customers");

        let mut page = BookingsPage::new();
        page.load(&backend).await;

        assert!(!page.bookings.is_empty());
        assert!(page.customers.is_empty());
        assert!(page.customers_error.is_some());
        assert!(page.bookings_error.is_none());
    }

    #[tokio::test]
    async fn test_retry_clears_previous_error() {
        let backend = DemoBackend::with_mock(MockCrm::with_latency(Duration::ZERO));
        backend.mock().fail("customers");

        let mut page = BookingsPage::new();
        page.load(&backend).await;
        assert!(page.customers_error.is_some());

        backend.mock().heal("customers");
        page.load(&backend).await;
        assert!(page.customers_error.is_none());
        assert!(!page.customers.is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_crud_mirrors_backend() {
        use crate::models::{BookingStatus, BookingUpdate, NewBooking};

        let backend = DemoBackend::with_mock(MockCrm::with_latency(Duration::ZERO));
        let mut page = BookingsPage::new();
        page.load(&backend).await;
        let before = page.bookings.len();

        let created = backend
            .create_booking(NewBooking {
                customer_id: Some(1),
                origin: "Colombo".into(),
                destination: "Felixstowe".into(),
                mode: None,
                container_size: None,
                cargo_type: "Tea".into(),
                quantity: None,
                weight_kg: None,
                volume_cbm: None,
                ready_date: None,
                delivery_date: None,
                quote_amount: None,
                special_instructions: None,
            })
            .await
            .unwrap();
        page.apply_created(created.clone());
        assert_eq!(page.bookings.len(), before + 1);

        let updated = backend
            .update_booking(
                created.id,
                BookingUpdate {
                    status: Some(BookingStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        page.apply_updated(updated);
        let slot = page.bookings.iter().find(|b| b.id == created.id).unwrap();
        assert_eq!(slot.status, Some(BookingStatus::Confirmed));

        backend.delete_booking(created.id).await.unwrap();
        page.apply_deleted(created.id);
        assert_eq!(page.bookings.len(), before);
    }

    #[test]
    fn test_customer_name_degrades_to_unknown() {
        let mut page = BookingsPage::new();
        page.customers = vec![Customer {
            id: 1,
            company_name: "Meridian Textiles Ltd".into(),
            contact_name: None,
            email: None,
            phone: None,
            status: None,
        }];

        assert_eq!(page.customer_name(Some(1)), "Meridian Textiles Ltd");
        assert_eq!(page.customer_name(Some(99)), "Unknown");
        assert_eq!(page.customer_name(None), "Unknown");
    }

    #[test]
    fn test_export_flag_cleared_on_drop() {
        let page = BookingsPage::new();
        {
            let _guard = page.begin_export();
            assert!(page.is_exporting());
        }
        assert!(!page.is_exporting());
    }

    #[test]
    fn test_export_flag_cleared_even_on_panic() {
        let page = BookingsPage::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = page.begin_export();
            panic!("export blew up");
        }));
        assert!(result.is_err());
        assert!(!page.is_exporting());
    }

    #[tokio::test]
    async fn test_cancelled_load_is_silent() {
        let mut mock = MockCrmBackend::new();
        mock.expect_get_bookings().returning(|| Err(Error::Cancelled));
        mock.expect_get_all_customers().returning(|| Ok(vec![]));

        let mut page = BookingsPage::new();
        page.load(&mock).await;
        assert!(page.bookings_error.is_none());
    }

    /// Collects everything a tracing layer writes, for assertions about
    /// what did (not) get logged.
    #[derive(Clone, Default)]
    struct LogCapture(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
        type Writer = LogCapture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_cancelled_load_emits_no_log_lines() {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::level_filters::LevelFilter::TRACE)
            .with_writer(capture.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut mock = MockCrmBackend::new();
        mock.expect_get_bookings().returning(|| Err(Error::Cancelled));
        mock.expect_get_all_customers()
            .returning(|| Err(Error::Cancelled));

        let mut page = BookingsPage::new();
        page.load(&mock).await;

        let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(
            logged.is_empty(),
            "cancelled fetches must not log, got: {}",
            logged
        );
    }
}
