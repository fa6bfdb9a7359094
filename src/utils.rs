//! Conversion of distance scans to planar points, with URG-04LX geometry.

use log::trace;

/// Minimum valid distance in millimeters; shorter readings are error codes.
pub const DMIN: u32 = 20;
/// Maximum measurable distance in millimeters.
pub const DMAX: u32 = 5600;
/// Steps per full revolution.
pub const ARES: u32 = 1024;
/// First step of the measurement area.
pub const AMIN: u32 = 44;
/// Last step of the measurement area.
pub const AMAX: u32 = 725;
/// Step pointing straight ahead.
pub const AFRT: u32 = 384;

/// Angular span of the measurement area in degrees.
pub fn angle_range() -> f64 {
    360.0 / ARES as f64 * AMAX as f64
}

/// Angle of the first sample in degrees.
pub fn default_angle_min() -> f64 {
    -angle_range() / 2.0
}

/// Angle between two reported samples in degrees.
///
/// # Arguments
///
/// * `cluster_count` - Steps merged into one sample. 0 behaves as 1.
/// * `scan_interval` - The scan interval the scan was started with.
pub fn angular_step(cluster_count: u32, scan_interval: u32) -> f64 {
    let step = 360.0 / (f64::from(ARES) * f64::from(cluster_count.max(1)));
    step * (scan_interval as f64 + 1.0)
}

/// A point in the sensor plane, in the unit of the distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Maps each distance to a point at `angle_min + i * angular_step` degrees.
///
/// Distances below `DMIN` are placed at the origin.
pub fn to_cartesian(distances: &[u32], angular_step: f64, angle_min: f64) -> Vec<Point> {
    trace!(
        "to_cartesian: {} samples, step {:.4} deg, min {:.4} deg",
        distances.len(),
        angular_step,
        angle_min
    );
    distances
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let d = if d < DMIN { 0.0 } else { d as f64 };
            let theta = (angle_min + i as f64 * angular_step).to_radians();
            Point {
                x: d * theta.cos(),
                y: d * theta.sin(),
            }
        })
        .collect()
}
