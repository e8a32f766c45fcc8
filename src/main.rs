use analytics::{BusinessReport, MetricsEngine};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{Config, LogFormat, init_tracing, load_config};
use core_types::{OrderStatus, SalesFilter};
use dashboard::AppState;
use dashboard::format::{Trend, format_count, format_currency, format_percentage, month_label};
use loader::DataLoader;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;

/// The main entry point for the Shoplens dashboard.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load SHOPLENS__* overrides from a .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Report(args) => handle_report(args, &config),
        Commands::Filters(args) => handle_filters(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// An e-commerce KPI dashboard over six CSV exports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to `shoplens.toml` in the working directory, if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard web server.
    Serve(ServeArgs),
    /// Print the KPI report for one period.
    Report(ReportArgs),
    /// List the years and months present in the data.
    Filters(FiltersArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Listen address (e.g., "127.0.0.1:8501"). Defaults to the configured host and port.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Directory holding the six CSV files.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct ReportArgs {
    #[arg(long)]
    year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Order status to keep (e.g., "delivered"). All statuses when omitted.
    #[arg(long)]
    status: Option<OrderStatus>,

    /// Compare against the same period one year earlier. Requires --year.
    #[arg(long)]
    compare: bool,

    /// Number of categories to list. Defaults to the configured dashboard value.
    #[arg(long)]
    top: Option<usize>,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Directory holding the six CSV files.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct FiltersArgs {
    /// Only list the months of this year.
    #[arg(long)]
    year: Option<i32>,

    /// Directory holding the six CSV files.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn loader_for(config: &Config, data_dir: Option<PathBuf>) -> DataLoader {
    let mut settings = config.data.clone();
    if let Some(dir) = data_dir {
        settings.dir = dir;
    }
    DataLoader::from_settings(&settings)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(dir) = args.data_dir {
        config.data.dir = dir;
    }
    let addr = match args.addr {
        Some(addr) => addr,
        None => config.server.socket_addr()?,
    };
    dashboard::run_server(addr, AppState::from_config(&config)).await
}

fn handle_report(args: ReportArgs, config: &Config) -> anyhow::Result<()> {
    let dataset = loader_for(config, args.data_dir).load()?;
    let filter = SalesFilter::new(args.year, args.month, args.status)?;
    let current = dataset.sales(&filter);

    let previous = if args.compare {
        let previous = filter.previous_year().map(|f| dataset.sales(&f));
        if previous.is_none() {
            tracing::warn!("--compare needs --year; printing the report without a comparison.");
        }
        previous
    } else {
        None
    };

    let top = args.top.unwrap_or(config.dashboard.top_categories);
    let report = MetricsEngine::new().report(&filter, &current, previous.as_deref(), top);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn handle_filters(args: FiltersArgs, config: &Config) -> anyhow::Result<()> {
    let dataset = loader_for(config, args.data_dir).load()?;
    let years = match args.year {
        Some(year) => vec![year],
        None => dataset.available_years(),
    };

    let mut table = new_table(vec!["Year", "Months"]);
    for year in years {
        let months: Vec<String> = dataset
            .available_months(Some(year))
            .into_iter()
            .map(month_label)
            .collect();
        table.add_row(vec![year.to_string(), months.join(", ")]);
    }
    println!("{table}");
    println!(
        "Statuses: {}",
        OrderStatus::ALL.map(|s| s.as_str()).join(", ")
    );
    Ok(())
}

// ==============================================================================
// Report Tables
// ==============================================================================

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn or_na(value: Option<Decimal>, render: impl Fn(Decimal) -> String) -> String {
    value.map(render).unwrap_or_else(|| "N/A".to_string())
}

fn change(value: Option<Decimal>, lower_is_better: bool) -> String {
    Trend::from_change(value, lower_is_better).text
}

fn print_report(report: &BusinessReport) {
    match &report.comparison_period {
        Some(previous) => println!("Period: {} (vs {previous})", report.analysis_period),
        None => println!("Period: {}", report.analysis_period),
    }

    let s = &report.summary;
    let days = |d: Decimal| format!("{:.1} days", d.round_dp(1));
    let score = |d: Decimal| format!("{:.2}", d.round_dp(2));
    let mut rows = vec![
        ("Total Revenue", format_currency(s.total_revenue)),
        ("Total Orders", format_count(s.total_orders)),
        ("Items Sold", format_count(s.total_items_sold)),
        ("Average Order Value", or_na(s.average_order_value, format_currency)),
        ("Average Review Score", or_na(s.average_review_score, score)),
        ("Average Delivery Time", or_na(s.average_delivery_days, days)),
        ("Total Freight", format_currency(s.total_freight)),
        ("Total Payments", format_currency(s.total_payments)),
    ]
    .into_iter()
    .map(|(metric, value)| vec![metric.to_string(), value])
    .collect::<Vec<_>>();

    let mut header = vec!["Metric", "Value"];
    if let Some(c) = &report.comparison {
        header.push("Change");
        let changes = [
            change(c.revenue_change_pct, false),
            change(c.orders_change_pct, false),
            change(c.items_change_pct, false),
            change(c.average_order_value_change_pct, false),
            change(c.review_score_change_pct, false),
            change(c.delivery_days_change_pct, true),
            String::new(),
            String::new(),
        ];
        for (row, delta) in rows.iter_mut().zip(changes) {
            row.push(delta);
        }
    }
    let mut summary = new_table(header);
    for row in rows {
        summary.add_row(row);
    }
    println!("{summary}");

    let mut monthly = new_table(vec!["Month", "Revenue", "Orders", "Growth"]);
    for m in &report.monthly_trends {
        monthly.add_row(vec![
            format!("{}-{:02}", m.year, m.month),
            format_currency(m.revenue),
            format_count(m.orders),
            or_na(m.revenue_growth_pct, |p| format_percentage(p, 2)),
        ]);
    }
    println!("{monthly}");

    let mut categories = new_table(vec!["Category", "Revenue", "Share", "Orders", "Avg Price"]);
    for c in &report.top_categories {
        categories.add_row(vec![
            c.category.clone(),
            format_currency(c.revenue),
            or_na(c.revenue_share_pct, |p| format_percentage(p, 1)),
            format_count(c.orders),
            format_currency(c.average_price),
        ]);
    }
    println!("{categories}");

    let mut states = new_table(vec!["State", "Revenue", "Orders", "AOV"]);
    for st in &report.states {
        states.add_row(vec![
            st.state.clone(),
            format_currency(st.revenue),
            format_count(st.orders),
            format_currency(st.average_order_value),
        ]);
    }
    println!("{states}");

    let sat = &report.satisfaction;
    let mut satisfaction = new_table(vec!["Score", "Reviews"]);
    for bucket in &sat.distribution {
        satisfaction.add_row(vec![bucket.score.to_string(), format_count(bucket.count)]);
    }
    println!("{satisfaction}");
    println!(
        "5-star: {}  4+: {}  1-2: {}",
        or_na(sat.five_star_pct, |p| format_percentage(p, 1)),
        or_na(sat.four_plus_pct, |p| format_percentage(p, 1)),
        or_na(sat.one_two_pct, |p| format_percentage(p, 1)),
    );

    let d = &report.delivery;
    let mut delivery = new_table(vec!["Delivery Time", "Items", "Avg Review"]);
    for bucket in &d.by_speed {
        delivery.add_row(vec![
            bucket.speed.label().to_string(),
            format_count(bucket.rows),
            or_na(bucket.average_review_score, score),
        ]);
    }
    println!("{delivery}");
    println!(
        "Median delivery: {}  Fast (<= 3 days): {}  Slow (> 7 days): {}",
        or_na(d.median_days, days),
        or_na(d.fast_delivery_pct, |p| format_percentage(p, 1)),
        or_na(d.slow_delivery_pct, |p| format_percentage(p, 1)),
    );
}
