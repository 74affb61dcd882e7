//! Courier CLI - run driver for one day of drone deliveries.
//!
//! Loads buildings and menus from a directory or web server, reads the day's
//! orders, flies them with `courier-core` and writes the results.

pub mod config;
pub mod output;
pub mod sources;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use courier_core::{Catalog, DeliveryRun, NoFlyIndex, RunReport};

pub use config::Config;
pub use output::{flight_geojson, summary_line, write_outputs, OutputFiles};
pub use sources::{DataSource, DirSource, WebSource, WordsResolver};

/// Fly every order due on `date` and write the result files.
pub fn run_day(config: &Config, date: NaiveDate) -> Result<(RunReport, OutputFiles)> {
    let source = config.source()?;

    let zones = sources::load_no_fly_zones(&source)?;
    let zones = NoFlyIndex::new(zones).context("Invalid no-fly zones")?;
    let shops = sources::load_shops(&source)?;
    let catalog = Catalog::new(shops, config.flight.delivery_charge_pence)
        .context("Invalid shop catalog")?;
    let orders = sources::load_orders(&config.orders_file, date)?;

    let run = DeliveryRun::new(config.flight.clone(), zones, catalog)
        .context("Cannot start delivery run")?;
    let mut resolver = WordsResolver::new(source);
    let report = run.run(&orders, &mut resolver);

    let files = write_outputs(&config.output_dir, date, &report)?;
    Ok((report, files))
}
