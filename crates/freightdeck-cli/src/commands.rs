// Command handlers. These are thin: load state through the core types,
// then print. All the interesting behavior lives in freightdeck-core.
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use freightdeck_core::{
    BookingFilters, BookingsPage, Config, CrmBackend, DashboardAggregator, Notifier,
    RefreshOutcome, TracingNotifier,
};
use freightdeck_export::{format_currency, ExportOptions, ExportOutput, Exporter};

pub async fn dashboard(backend: Arc<dyn CrmBackend>, config: &Config) -> anyhow::Result<()> {
    let aggregator = DashboardAggregator::with_slow_threshold(
        backend,
        Duration::from_secs(config.dashboard.slow_after_secs),
    );

    let outcome = aggregator.refresh().await;
    if matches!(outcome, RefreshOutcome::Superseded) {
        // Single-shot CLI refresh can't actually be superseded, but the
        // contract says don't print stale data, so honor it.
        return Ok(());
    }

    let state = aggregator.state();

    println!("Dashboard");
    println!("=========");

    match &state.stats {
        Some(stats) => {
            println!(
                "Customers: {} total, {} active{}",
                stats.total_customers,
                stats.active_customers,
                change_suffix(stats.customers_change_pct)
            );
            println!(
                "Bookings:  {} total, {} pending{}",
                stats.total_bookings,
                stats.pending_bookings,
                change_suffix(stats.bookings_change_pct)
            );
        }
        None => print_source_error("Stats", state.stats_error.as_deref()),
    }

    println!();
    println!("Recent customers");
    if state.recent_customers.is_empty() {
        print_source_error("Recent customers", state.customers_error.as_deref());
    }
    for customer in state.recent_customers.iter().take(config.dashboard.recent_limit) {
        println!(
            "  {} ({})",
            customer.company_name,
            customer.contact_name.as_deref().unwrap_or("no contact")
        );
    }

    println!();
    println!("Recent bookings");
    if state.recent_bookings.is_empty() {
        print_source_error("Recent bookings", state.bookings_error.as_deref());
    }
    for booking in state.recent_bookings.iter().take(config.dashboard.recent_limit) {
        println!(
            "  {}  {} -> {}  [{}]",
            booking.booking_number,
            booking.origin,
            booking.destination,
            booking
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into())
        );
    }

    println!();
    match &state.financial {
        Some(fin) => {
            println!(
                "Revenue: {}{}  Outstanding: {}",
                format_currency(fin.total_revenue),
                change_suffix(fin.revenue_change_pct),
                format_currency(fin.outstanding_amount)
            );
            println!(
                "Invoices: {} sent, {} paid",
                fin.invoices_sent, fin.invoices_paid
            );
        }
        None => print_source_error("Financial summary", state.financial_error.as_deref()),
    }

    let failed = state.failed_sources();
    if failed > 0 {
        println!();
        println!(
            "{} of 4 dashboard sources failed; rerun to retry them.",
            failed
        );
    }

    Ok(())
}

pub async fn bookings(backend: &dyn CrmBackend, filters: BookingFilters) -> anyhow::Result<()> {
    let mut page = BookingsPage::new();
    page.load(backend).await;
    page.filters = filters;

    if let Some(err) = &page.bookings_error {
        anyhow::bail!("{}", err);
    }
    if let Some(err) = &page.customers_error {
        // Names degrade to "Unknown"; the table itself is still usable.
        tracing::warn!("{}", err);
    }

    let visible = page.filtered(Utc::now());
    if visible.is_empty() {
        println!("No bookings match the current filters.");
        return Ok(());
    }

    println!(
        "{:<10} {:<24} {:<18} {:<18} {:<6} {:<12}",
        "Number", "Customer", "Origin", "Destination", "Mode", "Status"
    );
    for booking in &visible {
        println!(
            "{:<10} {:<24} {:<18} {:<18} {:<6} {:<12}",
            booking.booking_number,
            page.customer_name(booking.customer_id),
            booking.origin,
            booking.destination,
            booking
                .mode
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".into()),
            booking
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into()),
        );
    }
    println!();
    println!("{} of {} bookings shown", visible.len(), page.bookings.len());

    Ok(())
}

pub async fn export(
    backend: &dyn CrmBackend,
    filters: BookingFilters,
    options: ExportOptions,
) -> anyhow::Result<()> {
    let notifier = TracingNotifier;

    let mut page = BookingsPage::new();
    page.load(backend).await;
    page.filters = filters;

    if let Some(err) = &page.bookings_error {
        anyhow::bail!("{}", err);
    }

    let records = page.filtered(Utc::now());

    // The flag guards against overlapping exports; the guard clears it
    // even if the export path panics.
    let _guard = page.begin_export();

    // A failed customers fetch leaves the page directory empty, so hand
    // the exporter nothing and let it fetch names on demand.
    let directory = if page.customers_error.is_none() {
        Some(page.customers.as_slice())
    } else {
        None
    };

    let exporter = Exporter::new(backend);
    match exporter.export(&records, directory, &options).await {
        Ok(report) => {
            match &report.output {
                ExportOutput::Saved(path) => notifier.success(&format!(
                    "Exported {} booking(s) to {}",
                    report.records_exported,
                    path.display()
                )),
                ExportOutput::Buffer(bytes) => {
                    // Disk write failed but the bytes survived; dump them to
                    // stdout so a shell redirect can still capture the export.
                    use std::io::Write;
                    std::io::stdout().write_all(bytes)?;
                    notifier.success(&format!(
                        "Exported {} booking(s) to stdout (file write failed)",
                        report.records_exported
                    ));
                }
            }
            Ok(())
        }
        Err(e) if e.is_notice() => {
            notifier.success(&e.to_string());
            Ok(())
        }
        Err(e) => {
            notifier.error(&e.to_string());
            Err(e.into())
        }
    }
}

fn change_suffix(pct: Option<f64>) -> String {
    match pct {
        Some(pct) => format!(" ({:+.1}% vs last month)", pct),
        None => String::new(),
    }
}

fn print_source_error(label: &str, error: Option<&str>) {
    match error {
        Some(err) => println!("  {} unavailable: {}", label, err),
        None => println!("  {}: no data", label),
    }
}
