//! Coordinates and distance metrics.
//!
//! A `Point` is a plain `(x, y)` pair in `f64`.  Its meaning depends on the
//! analysis [`CoordSystem`]:
//!
//! | System       | `x`        | `y`       | Distance unit            |
//! |--------------|------------|-----------|--------------------------|
//! | `Planar`     | easting    | northing  | coordinate units (metres)|
//! | `Geographic` | longitude  | latitude  | haversine metres         |

/// Mean Earth radius, metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of latitude (and of longitude at the equator).
pub const METRES_PER_DEGREE: f64 = 111_320.0;

/// Coordinate reference the network and all points share.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CoordSystem {
    /// Projected coordinates; Euclidean distances.
    #[default]
    Planar,
    /// WGS-84 longitude/latitude in degrees; great-circle distances.
    Geographic,
}

/// A 2-D coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `false` if either component is NaN or infinite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Straight-line distance in coordinate units.
    #[inline]
    pub fn planar_distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Haversine great-circle distance in metres, treating `x` as longitude
    /// and `y` as latitude.
    pub fn haversine_m(self, other: Point) -> f64 {
        let d_lat = (other.y - self.y).to_radians();
        let d_lon = (other.x - self.x).to_radians();

        let lat1 = self.y.to_radians();
        let lat2 = other.y.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Distance under the given coordinate system.
    #[inline]
    pub fn distance(self, other: Point, crs: CoordSystem) -> f64 {
        match crs {
            CoordSystem::Planar => self.planar_distance(other),
            CoordSystem::Geographic => self.haversine_m(other),
        }
    }

    /// Half-extents `(dx, dy)` in coordinate units of a box that contains
    /// every point within `radius` distance of `self`.
    ///
    /// For geographic coordinates the longitude extent widens with latitude;
    /// near the poles it is clamped to the full 360°.
    pub fn search_extent(self, radius: f64, crs: CoordSystem) -> (f64, f64) {
        match crs {
            CoordSystem::Planar => (radius, radius),
            CoordSystem::Geographic => {
                let dy = radius / METRES_PER_DEGREE;
                let cos_lat = self.y.to_radians().cos().abs();
                let dx = if cos_lat < 1e-6 {
                    360.0
                } else {
                    (dy / cos_lat).min(360.0)
                };
                // Slack covers the spherical vs. equirectangular mismatch.
                (dx * 1.01, dy * 1.01)
            }
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
