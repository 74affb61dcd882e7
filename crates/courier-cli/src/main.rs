use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courier_cli::{run_day, summary_line, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Delivery date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// Orders file (JSON array)
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Web server URL, e.g. http://localhost:9898
    #[arg(long)]
    server_url: Option<String>,

    /// Local data directory, used when no server is given
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for result files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Moves available for the whole day
    #[arg(long)]
    move_budget: Option<u32>,

    /// JSON file overriding flight parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("courier=info".parse()?)
        .add_directive("courier_core=info".parse()?)
        .add_directive("courier_cli=info".parse()?);

    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs)?;

    let mut config = Config::from_env();
    if let Some(path) = &args.config {
        config.load_flight_file(path)?;
    }
    if let Some(url) = args.server_url {
        config.server_url = Some(url);
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(path) = args.orders {
        config.orders_file = path;
    }
    if let Some(budget) = args.move_budget {
        config.flight.move_budget = budget;
    }

    tracing::info!("Starting delivery run for {}", args.date);
    let (report, files) = run_day(&config, args.date)?;

    println!("{}", summary_line(args.date, &report));
    println!("Deliveries: {}", files.deliveries.display());
    println!("Flight path: {}", files.flightpath.display());
    println!("Track: {}", files.geojson.display());
    Ok(())
}
