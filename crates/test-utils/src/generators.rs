//! Synthetic datasets shaped like Daymet tiles.
//!
//! Rows run north to south, so latitude decreases with the row index and
//! longitude increases with the column index.

use viewer_common::{GriddedDataset, SENTINEL};

/// Build a one-time-step dataset from explicit rows of values.
///
/// Cell (row, col) sits at `(lat0 - row * step, lon0 + col * step)`.
pub fn dataset_from_rows(rows: &[&[f32]], lat0: f64, lon0: f64, step: f64) -> GriddedDataset {
    let ny = rows.len();
    let nx = rows.first().map(|r| r.len()).unwrap_or(0);
    let values: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();

    let lat_axis: Vec<f64> = (0..ny).map(|row| lat0 - row as f64 * step).collect();
    let lon_axis: Vec<f64> = (0..nx).map(|col| lon0 + col as f64 * step).collect();

    GriddedDataset::from_axes(values, (1, ny, nx), &lat_axis, &lon_axis)
        .expect("rows must be rectangular")
}

/// The 2×2 grid `[[10, -9999], [20, 30]]` at 34/33°N, 112/111°W.
pub fn two_by_two_dataset() -> GriddedDataset {
    dataset_from_rows(
        &[&[10.0, SENTINEL], &[20.0, 30.0]],
        34.0,
        -112.0,
        1.0,
    )
}

/// A `ny`×`nx` temperature field with every `sentinel_every`-th cell
/// (row-major, starting at index 0) set to the sentinel.
///
/// Valid values run from 10°C in the north-west corner upwards by
/// 0.5°C per column and 0.25°C per row. `sentinel_every == 0` disables
/// sentinels.
pub fn temperature_dataset(
    ny: usize,
    nx: usize,
    lat0: f64,
    lon0: f64,
    step: f64,
    sentinel_every: usize,
) -> GriddedDataset {
    let mut values = Vec::with_capacity(ny * nx);
    for row in 0..ny {
        for col in 0..nx {
            let idx = row * nx + col;
            if sentinel_every > 0 && idx % sentinel_every == 0 {
                values.push(SENTINEL);
            } else {
                values.push(10.0 + col as f32 * 0.5 + row as f32 * 0.25);
            }
        }
    }

    let lat_axis: Vec<f64> = (0..ny).map(|row| lat0 - row as f64 * step).collect();
    let lon_axis: Vec<f64> = (0..nx).map(|col| lon0 + col as f64 * step).collect();

    GriddedDataset::from_axes(values, (1, ny, nx), &lat_axis, &lon_axis)
        .expect("generated shape is consistent")
}

/// Number of non-sentinel cells in the first time slice.
pub fn count_valid(dataset: &GriddedDataset) -> usize {
    dataset
        .time_slice(0)
        .map(|slice| slice.iter().filter(|&&v| v != SENTINEL).count())
        .unwrap_or(0)
}
