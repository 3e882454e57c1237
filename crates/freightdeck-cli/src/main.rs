mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use freightdeck_api::CrmClient;
use freightdeck_core::models::{BookingStatus, TransportMode};
use freightdeck_core::{BookingFilters, Config, CrmBackend, DateRange, DemoBackend, HttpBackend};
use freightdeck_export::{DateWindow, ExportFormat};

#[derive(Parser)]
#[command(name = "freightdeck")]
#[command(version, about = "Freight CRM dashboard and export tooling", long_about = None)]
struct Cli {
    /// Use the built-in demo backend instead of the HTTP API
    #[arg(long, global = true)]
    demo: bool,

    /// Override the CRM API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show the dashboard summary
    Dashboard,
    /// List bookings with optional filters
    Bookings {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Export bookings to CSV, Excel or PDF
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,

        #[arg(long, value_enum, default_value_t = WindowArg::AllTime)]
        window: WindowArg,

        /// Start date for a custom window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date for a custom window (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output file path
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Free-text search over booking number, origin, destination and cargo type
    #[arg(long)]
    search: Option<String>,

    #[arg(long, value_enum)]
    status: Option<StatusArg>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    #[arg(long, value_enum, default_value_t = RangeArg::All)]
    range: RangeArg,
}

impl FilterArgs {
    fn into_filters(self) -> BookingFilters {
        BookingFilters {
            search: self.search.unwrap_or_default(),
            status: self.status.map(StatusArg::into_status),
            mode: self.mode.map(ModeArg::into_mode),
            date_range: self.range.into_range(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Lost,
}

impl StatusArg {
    fn into_status(self) -> BookingStatus {
        match self {
            StatusArg::Pending => BookingStatus::Pending,
            StatusArg::Confirmed => BookingStatus::Confirmed,
            StatusArg::InProgress => BookingStatus::InProgress,
            StatusArg::Completed => BookingStatus::Completed,
            StatusArg::Lost => BookingStatus::Lost,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Sea,
    Air,
    Road,
    Rail,
}

impl ModeArg {
    fn into_mode(self) -> TransportMode {
        match self {
            ModeArg::Sea => TransportMode::Sea,
            ModeArg::Air => TransportMode::Air,
            ModeArg::Road => TransportMode::Road,
            ModeArg::Rail => TransportMode::Rail,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RangeArg {
    All,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl RangeArg {
    fn into_range(self) -> DateRange {
        match self {
            RangeArg::All => DateRange::All,
            RangeArg::Last7Days => DateRange::Last7Days,
            RangeArg::Last30Days => DateRange::Last30Days,
            RangeArg::Last90Days => DateRange::Last90Days,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Excel,
    Pdf,
}

impl FormatArg {
    fn into_format(self) -> ExportFormat {
        match self {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Excel => ExportFormat::Excel,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WindowArg {
    AllTime,
    CurrentMonth,
    PreviousMonth,
    Custom,
}

impl WindowArg {
    fn into_window(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateWindow {
        match self {
            WindowArg::AllTime => DateWindow::AllTime,
            WindowArg::CurrentMonth => DateWindow::CurrentMonth,
            WindowArg::PreviousMonth => DateWindow::PreviousMonth,
            WindowArg::Custom => DateWindow::Custom { start, end },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "freightdeck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(api_url) = cli.api_url {
        config.backend.api_url = api_url;
    }
    if cli.demo {
        config.backend.demo = true;
    }

    let backend: Arc<dyn CrmBackend> = if config.backend.demo {
        tracing::info!("using the built-in demo backend");
        Arc::new(DemoBackend::new())
    } else {
        Arc::new(HttpBackend::new(CrmClient::with_base_url(
            config.backend.api_url.clone(),
        )))
    };

    match cli.command {
        Commands::Dashboard => commands::dashboard(backend, &config).await,
        Commands::Bookings { filters } => {
            commands::bookings(backend.as_ref(), filters.into_filters()).await
        }
        Commands::Export {
            filters,
            format,
            window,
            start,
            end,
            out,
        } => {
            let mut options = freightdeck_export::ExportOptions::new(format.into_format());
            options.window = window.into_window(start, end);
            options.output_path = out.or_else(|| {
                config
                    .export
                    .output_dir
                    .as_ref()
                    .map(|dir| dir.join(default_file_name(format.into_format())))
            });
            commands::export(backend.as_ref(), filters.into_filters(), options).await
        }
    }
}

fn default_file_name(format: ExportFormat) -> String {
    format!(
        "bookings-export-{}.{}",
        chrono::Utc::now().format("%Y%m%d"),
        format.extension()
    )
}
