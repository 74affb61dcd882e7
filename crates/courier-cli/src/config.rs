//! Run configuration from environment, flags and an optional JSON file.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use courier_core::FlightConfig;

use crate::sources::{DataSource, DirSource, WebSource};

#[derive(Debug, Clone)]
pub struct Config {
    /// Web server holding menus, buildings and words; wins over `data_dir`
    pub server_url: Option<String>,
    /// Local mirror of the web server layout
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub orders_file: PathBuf,
    pub flight: FlightConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            orders_file: PathBuf::from("orders.json"),
            flight: FlightConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut flight = defaults.flight;
        if let Some(budget) = env::var("COURIER_MOVE_BUDGET")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            flight.move_budget = budget;
        }

        Self {
            server_url: env::var("COURIER_SERVER_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            data_dir: env::var("COURIER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            output_dir: env::var("COURIER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            orders_file: env::var("COURIER_ORDERS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.orders_file),
            flight,
        }
    }

    /// Replace the flight parameters with those in a JSON file. Fields the
    /// file leaves out keep their defaults.
    pub fn load_flight_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read flight config {}", path.display()))?;
        self.flight = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid flight config {}", path.display()))?;
        Ok(())
    }

    /// Where menus, buildings and words are read from.
    pub fn source(&self) -> Result<Box<dyn DataSource>> {
        match &self.server_url {
            Some(url) => Ok(Box::new(WebSource::new(url.clone())?)),
            None => Ok(Box::new(DirSource::new(self.data_dir.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight.json");
        std::fs::write(&path, r#"{"move_budget": 300, "delivery_charge_pence": 0}"#).unwrap();

        let mut config = Config::default();
        config.load_flight_file(&path).unwrap();
        assert_eq!(config.flight.move_budget, 300);
        assert_eq!(config.flight.delivery_charge_pence, 0);
        assert_eq!(config.flight.step_distance, 0.00015);
    }

    #[test]
    fn missing_flight_file_is_an_error() {
        let mut config = Config::default();
        let err = config
            .load_flight_file(Path::new("/definitely/not/here.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read flight config"));
    }
}
