//! Fixed-radius buffers around facility footprints.
//!
//! Buffers are the Minkowski sum of each footprint with a disc, computed by
//! geo's `Buffer` with round joins. Notches narrower than twice the radius
//! close up; wider ones stay open. Overlapping part buffers come back merged.

use geo::{Buffer, MultiPolygon};

/// Buffer `footprint` by `radius` planar units.
///
/// A non-positive radius returns the footprint unchanged.
pub fn buffer_footprint(footprint: &MultiPolygon<f64>, radius: f64) -> MultiPolygon<f64> {
    if !(radius > 0.0) {
        return footprint.clone();
    }
    if footprint.0.is_empty() {
        return MultiPolygon::new(Vec::new());
    }

    footprint.buffer(radius)
}
