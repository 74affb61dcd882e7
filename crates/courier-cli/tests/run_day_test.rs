//! End-to-end runs against a local data directory.
//!
//! Run with: cargo test -p courier-cli --test run_day_test

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use courier_cli::{run_day, sources, Config, DirSource, WordsResolver};
use courier_core::{Coordinate, Delivery, LocationResolver};
use serde_json::{json, Value};

fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn write_words(root: &Path, words: &str, lng: f64, lat: f64) {
    let relative = format!("words/{}/details.json", words.replace('.', "/"));
    let body = json!({
        "country": "GB",
        "words": words,
        "coordinates": {"lng": lng, "lat": lat},
    });
    write(root, &relative, &body.to_string());
}

/// Data directory with one building, two shops and three addresses.
fn seed_data(root: &Path) {
    let buildings = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "Library"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-3.1895, 55.9435],
                    [-3.1875, 55.9435],
                    [-3.1875, 55.9451],
                    [-3.1895, 55.9451],
                    [-3.1895, 55.9435]
                ]]
            }
        }]
    });
    write(root, sources::NO_FLY_ZONES_PATH, &buildings.to_string());

    let menus = json!([
        {
            "name": "Soup Shop",
            "location": "blocks.found.civic",
            "menu": [{"item": "Soup", "pence": 500}, {"item": "Roll", "pence": 100}]
        },
        {
            "name": "Bakery",
            "location": "sketch.spill.puzzle",
            "menu": [{"item": "Bread", "pence": 200}]
        }
    ]);
    write(root, sources::MENUS_PATH, &menus.to_string());

    write_words(root, "blocks.found.civic", -3.1910, 55.9455);
    write_words(root, "sketch.spill.puzzle", -3.1860, 55.9436);
    write_words(root, "pest.round.peanut", -3.1915, 55.9430);
    write_words(root, "milky.chin.boat", -3.1850, 55.9450);
}

fn write_orders(path: &Path) {
    let orders = json!([
        {
            "orderNo": "1ad5f1ff",
            "deliveryDate": "2023-01-02",
            "customer": "s2310000",
            "deliverTo": "pest.round.peanut",
            "items": ["Soup", "Bread"]
        },
        {
            "order_no": "24a7b9c1",
            "delivery_date": "2023-01-02",
            "deliver_to": "nowhere.at.all",
            "items": ["Roll"]
        },
        {
            "order_no": "3f00aa21",
            "delivery_date": "2023-01-02",
            "deliver_to": "milky.chin.boat",
            "items": ["Bread"]
        },
        {
            "order_no": "99999999",
            "delivery_date": "2023-01-03",
            "deliver_to": "milky.chin.boat",
            "items": ["Soup"]
        }
    ]);
    fs::write(path, orders.to_string()).unwrap();
}

#[test]
fn test_orders_are_filtered_by_date() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.json");
    write_orders(&path);

    let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let orders = sources::load_orders(&path, date).unwrap();
    let numbers: Vec<&str> = orders.iter().map(|o| o.order_no.as_str()).collect();
    assert_eq!(numbers, vec!["1ad5f1ff", "24a7b9c1", "3f00aa21"]);
    assert_eq!(orders[0].customer.as_deref(), Some("s2310000"));
}

#[test]
fn test_words_resolver_caches_and_reports_unknown() {
    let dir = tempfile::tempdir().unwrap();
    seed_data(dir.path());
    let mut resolver = WordsResolver::new(DirSource::new(dir.path()));

    let first = resolver.resolve("milky.chin.boat").unwrap();
    assert_eq!(first, Coordinate::new(-3.1850, 55.9450));
    assert_eq!(resolver.cached(), 1);
    assert_eq!(resolver.resolve("milky.chin.boat").unwrap(), first);
    assert_eq!(resolver.cached(), 1);

    assert!(resolver.resolve("nowhere.at.all").is_err());
    assert!(resolver.resolve("not-three-words").is_err());
}

#[test]
fn test_data_directory_loads() {
    let dir = tempfile::tempdir().unwrap();
    seed_data(dir.path());
    let source = DirSource::new(dir.path());

    let zones = sources::load_no_fly_zones(&source).unwrap();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].vertices.len(), 4, "closing vertex should be dropped");

    let shops = sources::load_shops(&source).unwrap();
    assert_eq!(shops.len(), 2);
    assert_eq!(shops[0].menu[1].pence, 100);
}

#[test]
fn test_run_day_writes_all_outputs() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_data(data.path());
    let orders_file = data.path().join("orders.json");
    write_orders(&orders_file);

    let config = Config {
        data_dir: data.path().to_path_buf(),
        output_dir: out.path().join("results"),
        orders_file,
        ..Config::default()
    };
    let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let (report, files) = run_day(&config, date).unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.delivered, 2, "outcomes: {:?}", report.outcomes);
    assert!(report.returned_to_base);

    let deliveries: Vec<Delivery> =
        serde_json::from_str(&fs::read_to_string(&files.deliveries).unwrap()).unwrap();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0].order_no, "1ad5f1ff");
    assert_eq!(deliveries[0].cost_in_pence, 750);
    assert_eq!(deliveries[1].delivered_to, "milky.chin.boat");

    let flightpath: Vec<Value> =
        serde_json::from_str(&fs::read_to_string(&files.flightpath).unwrap()).unwrap();
    assert_eq!(flightpath.len(), report.flight_log.len());
    assert!(flightpath.iter().any(|row| row["angle"] == -999));
    assert!(flightpath[0]["from_longitude"].is_f64());

    let geojson: Value = serde_json::from_str(&fs::read_to_string(&files.geojson).unwrap()).unwrap();
    let line = &geojson["features"][0]["geometry"];
    assert_eq!(line["type"], "LineString");
    assert_eq!(
        line["coordinates"].as_array().unwrap().len(),
        report.flight_log.len() + 1
    );
    assert!(files
        .geojson
        .to_string_lossy()
        .ends_with("drone-02-01-2023.geojson"));
}

#[test]
fn test_missing_buildings_file_fails_the_run() {
    let data = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: data.path().to_path_buf(),
        output_dir: data.path().to_path_buf(),
        ..Config::default()
    };
    let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let err = run_day(&config, date).unwrap_err();
    assert!(format!("{:#}", err).contains("no-fly-zones.geojson"));
}
