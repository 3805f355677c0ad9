//! Geometry text handling

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DawaError, Result};

const NUMBER: &str = r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?";

static POINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Optional EWKT SRID prefix, optional Z/M ordinates after x and y
    let pattern = format!(
        r"(?i)^\s*(?:SRID=\d+\s*;\s*)?POINT\s*(?:ZM|Z|M)?\s*\(\s*({NUMBER})\s+({NUMBER})(?:\s+{NUMBER}){{0,2}}\s*\)\s*$"
    );
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid point pattern: {e}"))
});

/// Projected plane coordinates of a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Easting
    pub x: f64,
    /// Northing
    pub y: f64,
}

/// Read a WKT point, e.g. `POINT (725025.18 6166264.37)`
///
/// Anything but a point is rejected.
pub fn parse_point(wkt: &str) -> Result<Point> {
    let captures = POINT_PATTERN
        .captures(wkt)
        .ok_or_else(|| DawaError::Geometry(format!("not a WKT point: '{wkt}'")))?;

    let ordinate = |index: usize| -> Result<f64> {
        captures[index]
            .parse::<f64>()
            .map_err(|e| DawaError::Geometry(format!("bad ordinate in '{wkt}': {e}")))
    };

    Ok(Point {
        x: ordinate(1)?,
        y: ordinate(2)?,
    })
}

/// Road code from a composite road-centre id such as `0101-0512`
///
/// The last `-` separated segment is the road code.
#[must_use]
pub fn road_code_from_centerline(road_center: &str) -> String {
    road_center
        .rsplit('-')
        .next()
        .unwrap_or(road_center)
        .trim()
        .to_string()
}
