//! Reference coordinates and GeoJSON fixtures for Arizona.

use serde_json::{json, Value};

/// Arizona State Capitol, Phoenix (lon, lat).
pub const PHOENIX: (f64, f64) = (-112.0969, 33.4483);

/// Downtown Tucson (lon, lat).
pub const TUCSON: (f64, f64) = (-110.9747, 32.2226);

/// Downtown Flagstaff (lon, lat).
pub const FLAGSTAFF: (f64, f64) = (-111.6513, 35.1983);

/// Closed square ring centred on `(lon, lat)` with the given half size.
pub fn square_ring(center: (f64, f64), half_size: f64) -> Vec<[f64; 2]> {
    let (x, y) = center;
    vec![
        [x - half_size, y - half_size],
        [x + half_size, y - half_size],
        [x + half_size, y + half_size],
        [x - half_size, y + half_size],
        [x - half_size, y - half_size],
    ]
}

/// GeoJSON Feature with a single-ring Polygon geometry.
pub fn polygon_feature(properties: Value, ring: &[[f64; 2]]) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {
            "type": "Polygon",
            "coordinates": [ring],
        }
    })
}

/// GeoJSON Feature with a Point geometry.
pub fn point_feature(properties: Value, point: (f64, f64)) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {
            "type": "Point",
            "coordinates": [point.0, point.1],
        }
    })
}

/// Serialize features as a GeoJSON FeatureCollection string.
pub fn feature_collection(features: Vec<Value>) -> String {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
    .to_string()
}

/// Place layer with `count` square cities spread across Arizona.
///
/// City `i` is named `City{i}` and has `ALAND = (i + 1) * 1_000_000`, so
/// the largest cities are the last ones generated.
pub fn synthetic_places(count: usize) -> String {
    let features = (0..count)
        .map(|i| {
            let center = (-114.5 + (i % 10) as f64 * 0.5, 31.5 + (i / 10) as f64 * 0.75);
            polygon_feature(
                json!({ "NAME": format!("City{}", i), "ALAND": (i as u64 + 1) * 1_000_000 }),
                &square_ring(center, 0.02),
            )
        })
        .collect();
    feature_collection(features)
}

/// Prison layer with one square facility per `(name, center)` pair.
pub fn synthetic_prisons(facilities: &[(&str, (f64, f64))]) -> String {
    let features = facilities
        .iter()
        .map(|(name, center)| polygon_feature(json!({ "NAME": name }), &square_ring(*center, 0.005)))
        .collect();
    feature_collection(features)
}

/// Lookup table CSV text for `(tile, year, file_id)` rows.
pub fn lookup_csv(rows: &[(&str, i32, &str)]) -> String {
    let mut out = String::from("tile,year,file_id\n");
    for (tile, year, file_id) in rows {
        out.push_str(&format!("{},{},{}\n", tile, year, file_id));
    }
    out
}
