// Dashboard data aggregation: four independent sources, one usable page.
//
// The contract is allow-partial-failure: every fetch settles, each source
// applies its own outcome, and a single dead endpoint never blanks the
// parts that loaded fine.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::CrmBackend;
use crate::models::{Booking, Customer, DashboardStats, FinancialSummary};
use crate::Error;

/// Everything the dashboard page renders, replaced slice-by-slice on each
/// refresh. A source that failed keeps its previous data alongside the
/// error message so the page can show stale numbers plus a retry banner.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub stats: Option<DashboardStats>,
    pub recent_customers: Vec<Customer>,
    pub recent_bookings: Vec<Booking>,
    pub financial: Option<FinancialSummary>,

    pub stats_error: Option<String>,
    pub customers_error: Option<String>,
    pub bookings_error: Option<String>,
    pub financial_error: Option<String>,

    pub loading: bool,
    /// Advisory "taking longer than expected" signal. Raised by a timer,
    /// cancels nothing.
    pub taking_long: bool,
}

impl DashboardState {
    pub fn failed_sources(&self) -> usize {
        [
            &self.stats_error,
            &self.customers_error,
            &self.bookings_error,
            &self.financial_error,
        ]
        .iter()
        .filter(|e| e.is_some())
        .count()
    }
}

/// What a single refresh invocation amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Results were applied; `failed_sources` of the four fetches errored.
    Applied { failed_sources: usize },
    /// A newer refresh started before this one settled. Nothing was
    /// applied and nothing is reported as an error.
    Superseded,
}

pub struct DashboardAggregator {
    backend: Arc<dyn CrmBackend>,
    state: Arc<RwLock<DashboardState>>,
    generation: Arc<AtomicU64>,
    slow_after: Duration,
}

impl DashboardAggregator {
    pub fn new(backend: Arc<dyn CrmBackend>) -> Self {
        Self::with_slow_threshold(backend, Duration::from_secs(5))
    }

    pub fn with_slow_threshold(backend: Arc<dyn CrmBackend>, slow_after: Duration) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(DashboardState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            slow_after,
        }
    }

    /// Snapshot of the current page state.
    pub fn state(&self) -> DashboardState {
        self.state.read().expect("state lock poisoned").clone()
    }

    /// Fetch all four dashboard sources concurrently and apply whatever
    /// settled. Safe to call any number of times; a newer call supersedes
    /// any still in flight, and the superseded run applies nothing.
    ///
    /// This is also the retry path: there are no automatic retries, a
    /// user-triggered retry just runs the whole aggregation again.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("dashboard refresh generation {} started", generation);

        {
            let mut state = self.state.write().expect("state lock poisoned");
            state.loading = true;
            state.taking_long = false;
        }

        self.spawn_slow_timer(generation);

        let (stats, customers, bookings, financial) = tokio::join!(
            self.backend.get_dashboard_stats(),
            self.backend.get_dashboard_recent_customers(),
            self.backend.get_dashboard_recent_bookings(),
            self.backend.get_dashboard_financial_summary(),
        );

        let mut failed = 0;
        let mut state = self.state.write().expect("state lock poisoned");

        // Checked under the write lock: a newer run bumps the counter before
        // it can take this lock, so a stale run can never apply after a
        // newer one has already finished.
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("dashboard refresh generation {} superseded, dropping results", generation);
            return RefreshOutcome::Superseded;
        }

        match stats.map_err(|e| wrap(Error::StatsFetchFailed, e)) {
            Ok(v) => {
                state.stats = Some(v);
                state.stats_error = None;
            }
            // Cancellations leave no trace, not even a log line
            Err(SourceFailure::Cancelled) => {}
            Err(SourceFailure::Failed(msg)) => {
                warn!("{}", msg);
                state.stats_error = Some(msg);
                failed += 1;
            }
        }

        match customers.map_err(|e| wrap(Error::CustomersFetchFailed, e)) {
            Ok(v) => {
                state.recent_customers = v;
                state.customers_error = None;
            }
            Err(SourceFailure::Cancelled) => {}
            Err(SourceFailure::Failed(msg)) => {
                warn!("{}", msg);
                state.customers_error = Some(msg);
                failed += 1;
            }
        }

        match bookings.map_err(|e| wrap(Error::BookingsFetchFailed, e)) {
            Ok(v) => {
                state.recent_bookings = v;
                state.bookings_error = None;
            }
            Err(SourceFailure::Cancelled) => {}
            Err(SourceFailure::Failed(msg)) => {
                warn!("{}", msg);
                state.bookings_error = Some(msg);
                failed += 1;
            }
        }

        match financial.map_err(|e| wrap(Error::FinancialFetchFailed, e)) {
            Ok(v) => {
                state.financial = Some(v);
                state.financial_error = None;
            }
            Err(SourceFailure::Cancelled) => {}
            Err(SourceFailure::Failed(msg)) => {
                warn!("{}", msg);
                state.financial_error = Some(msg);
                failed += 1;
            }
        }

        state.loading = false;
        state.taking_long = false;

        RefreshOutcome::Applied {
            failed_sources: failed,
        }
    }

    fn spawn_slow_timer(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let slow_after = self.slow_after;
        tokio::spawn(async move {
            tokio::time::sleep(slow_after).await;
            let mut state = state.write().expect("state lock poisoned");
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            if state.loading {
                warn!("dashboard refresh running longer than {:?}", slow_after);
                state.taking_long = true;
            }
        });
    }
}

/// Per-source failure, with cancellation split out so it can be suppressed
/// instead of surfaced.
enum SourceFailure {
    Cancelled,
    Failed(String),
}

fn wrap(variant: fn(String) -> Error, err: Error) -> SourceFailure {
    if err.is_cancellation() {
        SourceFailure::Cancelled
    } else {
        SourceFailure::Failed(variant(err.to_string()).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockCrmBackend;
    use crate::models::{DashboardStats, FinancialSummary};

    fn stats() -> DashboardStats {
        DashboardStats {
            total_customers: 10,
            active_customers: 8,
            total_bookings: 25,
            pending_bookings: 4,
            customers_change_pct: None,
            bookings_change_pct: None,
        }
    }

    fn financial() -> FinancialSummary {
        FinancialSummary {
            total_revenue: 12000.0,
            outstanding_amount: 3000.0,
            invoices_sent: 9,
            invoices_paid: 6,
            revenue_change_pct: None,
        }
    }

    fn happy_mock() -> MockCrmBackend {
        let mut mock = MockCrmBackend::new();
        mock.expect_get_dashboard_stats().returning(|| Ok(stats()));
        mock.expect_get_dashboard_recent_customers()
            .returning(|| Ok(vec![]));
        mock.expect_get_dashboard_recent_bookings()
            .returning(|| Ok(vec![]));
        mock.expect_get_dashboard_financial_summary()
            .returning(|| Ok(financial()));
        mock
    }

    #[tokio::test]
    async fn test_all_sources_applied() {
        let aggregator = DashboardAggregator::new(Arc::new(happy_mock()));
        let outcome = aggregator.refresh().await;

        assert_eq!(outcome, RefreshOutcome::Applied { failed_sources: 0 });
        let state = aggregator.state();
        assert!(state.stats.is_some());
        assert!(state.financial.is_some());
        assert!(!state.loading);
        assert_eq!(state.failed_sources(), 0);
    }

    #[tokio::test]
    async fn test_one_failed_source_does_not_block_the_rest() {
        let mut mock = MockCrmBackend::new();
        mock.expect_get_dashboard_stats()
            .returning(|| Err(Error::Backend("Status 500: boom".into())));
        mock.expect_get_dashboard_recent_customers()
            .returning(|| Ok(vec![]));
        mock.expect_get_dashboard_recent_bookings()
            .returning(|| Ok(vec![]));
        mock.expect_get_dashboard_financial_summary()
            .returning(|| Ok(financial()));

        let aggregator = DashboardAggregator::new(Arc::new(mock));
        let outcome = aggregator.refresh().await;

        assert_eq!(outcome, RefreshOutcome::Applied { failed_sources: 1 });
        let state = aggregator.state();
        assert!(state.stats.is_none());
        assert!(state.stats_error.as_deref().unwrap().contains("dashboard stats"));
        // The three that succeeded rendered normally
        assert!(state.financial.is_some());
        assert!(state.customers_error.is_none());
        assert!(state.bookings_error.is_none());
    }

    #[tokio::test]
    async fn test_failed_source_keeps_previous_data() {
        use std::sync::atomic::AtomicU32;

        let mut mock = MockCrmBackend::new();
        let calls = AtomicU32::new(0);
        mock.expect_get_dashboard_stats().returning(move || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(stats())
            } else {
                Err(Error::Backend("outage".into()))
            }
        });
        mock.expect_get_dashboard_recent_customers()
            .returning(|| Ok(vec![]));
        mock.expect_get_dashboard_recent_bookings()
            .returning(|| Ok(vec![]));
        mock.expect_get_dashboard_financial_summary()
            .returning(|| Ok(financial()));

        let aggregator = DashboardAggregator::new(Arc::new(mock));
        aggregator.refresh().await;
        assert!(aggregator.state().stats.is_some());

        aggregator.refresh().await;
        let state = aggregator.state();
        // Stale stats stay visible next to the error banner
        assert!(state.stats.is_some());
        assert!(state.stats_error.is_some());
    }

    #[tokio::test]
    async fn test_cancelled_source_is_not_an_error() {
        let mut mock = MockCrmBackend::new();
        mock.expect_get_dashboard_stats()
            .returning(|| Err(Error::Cancelled));
        mock.expect_get_dashboard_recent_customers()
            .returning(|| Ok(vec![]));
        mock.expect_get_dashboard_recent_bookings()
            .returning(|| Ok(vec![]));
        mock.expect_get_dashboard_financial_summary()
            .returning(|| Ok(financial()));

        let aggregator = DashboardAggregator::new(Arc::new(mock));
        let outcome = aggregator.refresh().await;

        assert_eq!(outcome, RefreshOutcome::Applied { failed_sources: 0 });
        let state = aggregator.state();
        assert!(state.stats_error.is_none());
        assert!(state.stats.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_refresh_applies_nothing() {
        use crate::backend::DemoBackend;
        use freightdeck_api::MockCrm;

        let backend = DemoBackend::with_mock(MockCrm::with_latency(Duration::from_secs(10)));
        let aggregator = Arc::new(DashboardAggregator::new(Arc::new(backend)));

        let first = {
            let aggregator = Arc::clone(&aggregator);
            tokio::spawn(async move { aggregator.refresh().await })
        };
        // Let the first refresh get underway before superseding it
        tokio::time::sleep(Duration::from_secs(1)).await;
        let second = aggregator.refresh().await;

        assert!(matches!(second, RefreshOutcome::Applied { .. }));
        assert_eq!(first.await.unwrap(), RefreshOutcome::Superseded);
        assert!(aggregator.state().stats.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_run_cannot_overwrite_newer_results() {
        use std::sync::atomic::AtomicU32;

        use async_trait::async_trait;
        use crate::models::{BookingUpdate, NewBooking};

        // First stats fetch is slow, later ones are instant, and each one
        // returns a distinguishable total so the test can tell whose
        // results ended up applied.
        struct StaggeredBackend {
            stats_calls: AtomicU32,
        }

        #[async_trait]
        impl CrmBackend for StaggeredBackend {
            async fn get_dashboard_stats(&self) -> crate::Result<DashboardStats> {
                let call = self.stats_calls.fetch_add(1, Ordering::SeqCst);
                if call == 0 {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
                let mut s = stats();
                s.total_customers = call + 1;
                Ok(s)
            }
            async fn get_dashboard_recent_customers(&self) -> crate::Result<Vec<Customer>> {
                Ok(vec![])
            }
            async fn get_dashboard_recent_bookings(&self) -> crate::Result<Vec<Booking>> {
                Ok(vec![])
            }
            async fn get_dashboard_financial_summary(&self) -> crate::Result<FinancialSummary> {
                Ok(financial())
            }
            async fn get_bookings(&self) -> crate::Result<Vec<Booking>> {
                Ok(vec![])
            }
            async fn get_all_customers(&self) -> crate::Result<Vec<Customer>> {
                Ok(vec![])
            }
            async fn create_booking(&self, _data: NewBooking) -> crate::Result<Booking> {
                Err(Error::Backend("not part of this scenario".into()))
            }
            async fn update_booking(&self, _id: i64, _data: BookingUpdate) -> crate::Result<Booking> {
                Err(Error::Backend("not part of this scenario".into()))
            }
            async fn delete_booking(&self, _id: i64) -> crate::Result<()> {
                Err(Error::Backend("not part of this scenario".into()))
            }
        }

        let backend = StaggeredBackend {
            stats_calls: AtomicU32::new(0),
        };
        let aggregator = Arc::new(DashboardAggregator::new(Arc::new(backend)));

        let stale = {
            let aggregator = Arc::clone(&aggregator);
            tokio::spawn(async move { aggregator.refresh().await })
        };
        // Let the stale run issue its fetches before superseding it
        tokio::time::sleep(Duration::from_millis(1)).await;

        // The newer run finishes immediately, long before the stale one
        let newer = aggregator.refresh().await;
        assert_eq!(newer, RefreshOutcome::Applied { failed_sources: 0 });
        assert_eq!(aggregator.state().stats.unwrap().total_customers, 2);

        // When the stale run finally settles it must apply nothing, even
        // though its fetches completed after the newer run's did
        assert_eq!(stale.await.unwrap(), RefreshOutcome::Superseded);
        let state = aggregator.state();
        assert_eq!(state.stats.unwrap().total_customers, 2);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_taking_long_flag_is_advisory() {
        use crate::backend::DemoBackend;
        use freightdeck_api::MockCrm;

        let backend = DemoBackend::with_mock(MockCrm::with_latency(Duration::from_secs(10)));
        let aggregator = Arc::new(DashboardAggregator::with_slow_threshold(
            Arc::new(backend),
            Duration::from_secs(5),
        ));

        let refresh = {
            let aggregator = Arc::clone(&aggregator);
            tokio::spawn(async move { aggregator.refresh().await })
        };

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(aggregator.state().taking_long);
        assert!(aggregator.state().loading);

        // The flag cancelled nothing; the refresh still completes and clears it
        let outcome = refresh.await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Applied { failed_sources: 0 });
        assert!(!aggregator.state().taking_long);
        assert!(aggregator.state().stats.is_some());
    }
}
