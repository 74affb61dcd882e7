//! Data loading: buildings, menus, three-word locations and orders.
//!
//! The web server and a local directory share one layout:
//! `buildings/no-fly-zones.geojson`, `menus/menus.json` and
//! `words/<w1>/<w2>/<w3>/details.json`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use courier_core::{CatalogError, Coordinate, LocationResolver, NoFlyZone, Order, Shop};

pub const NO_FLY_ZONES_PATH: &str = "buildings/no-fly-zones.geojson";
pub const MENUS_PATH: &str = "menus/menus.json";

/// Read-only access to the shared data layout.
pub trait DataSource {
    fn fetch(&self, relative_path: &str) -> Result<String>;
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn fetch(&self, relative_path: &str) -> Result<String> {
        (**self).fetch(relative_path)
    }
}

/// Files under a local directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataSource for DirSource {
    fn fetch(&self, relative_path: &str) -> Result<String> {
        let path = self.root.join(relative_path);
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Files served over HTTP.
pub struct WebSource {
    client: Client,
    base_url: String,
}

impl WebSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl DataSource for WebSource {
    fn fetch(&self, relative_path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, relative_path);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Request to {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {} returned {}", url, status);
        }
        response
            .text()
            .with_context(|| format!("Failed to read body of {}", url))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
    #[serde(other)]
    Unsupported,
}

fn ring_to_zone(name: Option<String>, ring: &[[f64; 2]]) -> NoFlyZone {
    let vertices = ring
        .iter()
        .map(|[lng, lat]| Coordinate::new(*lng, *lat))
        .collect();
    NoFlyZone::new(name, vertices)
}

/// Parse a GeoJSON FeatureCollection of building outlines. Only the outer
/// ring of each polygon is used.
pub fn parse_no_fly_zones(geojson: &str) -> Result<Vec<NoFlyZone>> {
    let collection: FeatureCollection =
        serde_json::from_str(geojson).context("Invalid no-fly-zone GeoJSON")?;

    let mut zones = Vec::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(|value| value.as_str())
            .map(str::to_string);
        match feature.geometry {
            Geometry::Polygon { coordinates } => {
                if let Some(outer) = coordinates.first() {
                    zones.push(ring_to_zone(name, outer));
                }
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in &coordinates {
                    if let Some(outer) = polygon.first() {
                        zones.push(ring_to_zone(name.clone(), outer));
                    }
                }
            }
            Geometry::Unsupported => {
                tracing::warn!("Skipping feature {} with non-polygon geometry", index);
            }
        }
    }
    Ok(zones)
}

pub fn load_no_fly_zones(source: &dyn DataSource) -> Result<Vec<NoFlyZone>> {
    let raw = source.fetch(NO_FLY_ZONES_PATH)?;
    let zones = parse_no_fly_zones(&raw)?;
    tracing::info!("Loaded {} no-fly zones", zones.len());
    Ok(zones)
}

pub fn load_shops(source: &dyn DataSource) -> Result<Vec<Shop>> {
    let raw = source.fetch(MENUS_PATH)?;
    serde_json::from_str(&raw).context("Invalid menus JSON")
}

/// Orders in `path` due on `date`, in file order.
pub fn load_orders(path: &Path, date: NaiveDate) -> Result<Vec<Order>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read orders {}", path.display()))?;
    let orders: Vec<Order> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid orders file {}", path.display()))?;
    let due: Vec<Order> = orders
        .into_iter()
        .filter(|order| order.delivery_date == date)
        .collect();
    tracing::info!("Loaded {} orders for {}", due.len(), date);
    Ok(due)
}

#[derive(Debug, Deserialize)]
struct WordsDetails {
    coordinates: Coordinate,
}

/// Relative path of the details file for a three-word token.
pub fn words_path(words: &str) -> Option<String> {
    let parts: Vec<&str> = words.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|part| part.trim().is_empty()) {
        return None;
    }
    Some(format!("words/{}/{}/{}/details.json", parts[0], parts[1], parts[2]))
}

/// Resolves three-word tokens through a [`DataSource`], remembering answers.
pub struct WordsResolver<S> {
    source: S,
    cache: HashMap<String, Coordinate>,
}

impl<S: DataSource> WordsResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn lookup(&self, words: &str) -> Result<Coordinate> {
        let path = match words_path(words) {
            Some(path) => path,
            None => bail!("'{}' is not a three-word location", words),
        };
        let raw = self.source.fetch(&path)?;
        let details: WordsDetails = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid location details for '{}'", words))?;
        Ok(details.coordinates)
    }
}

impl<S: DataSource> LocationResolver for WordsResolver<S> {
    fn resolve(&mut self, words: &str) -> Result<Coordinate, CatalogError> {
        if let Some(coordinate) = self.cache.get(words) {
            return Ok(*coordinate);
        }
        match self.lookup(words) {
            Ok(coordinate) => {
                self.cache.insert(words.to_string(), coordinate);
                Ok(coordinate)
            }
            Err(e) => {
                tracing::warn!("Could not resolve '{}': {:#}", words, e);
                Err(CatalogError::UnknownLocation(words.to_string()))
            }
        }
    }
}
