use serde::Deserialize;
use std::f64::consts::PI;
use strum_macros::{Display, EnumCount, EnumIter};

/// Number of envelope surfaces: eight facades and the roof
pub const SURFACE_COUNT: usize = 9;
/// Number of vertical facades (all surfaces except the roof)
pub const FACADE_COUNT: usize = 8;

/// One value per envelope surface, in [`Surface`] order.
pub type PerSurface<T> = [T; SURFACE_COUNT];

/// Envelope surfaces in the order used by every per-surface array in this crate.
///
/// The discriminant is the array index.
#[derive(Clone, Copy, Debug, Display, EnumCount, EnumIter, Eq, Hash, PartialEq)]
pub enum Surface {
    South = 0,
    SouthEast,
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    Roof,
}

impl Surface {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Azimuth of the outward normal, in radians from south, east negative.
    /// The roof has no azimuth.
    pub fn azimuth(self) -> Option<f64> {
        match self {
            Surface::South => Some(0.),
            Surface::SouthEast => Some(-PI / 4.),
            Surface::East => Some(-PI / 2.),
            Surface::NorthEast => Some(-3. * PI / 4.),
            Surface::North => Some(PI),
            Surface::NorthWest => Some(3. * PI / 4.),
            Surface::West => Some(PI / 2.),
            Surface::SouthWest => Some(PI / 4.),
            Surface::Roof => None,
        }
    }
}

/// Order in which per-surface arrays are written in an input document.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceOrder {
    /// S, SE, E, NE, N, NW, W, SW, Roof
    #[default]
    SouthFirst,
    /// N, NE, E, SE, S, SW, W, NW, Roof
    NorthFirst,
}

impl SurfaceOrder {
    /// Rearrange values given in this order into [`Surface`] order.
    pub fn to_surface_order<T: Copy>(self, values: PerSurface<T>) -> PerSurface<T> {
        match self {
            SurfaceOrder::SouthFirst => values,
            SurfaceOrder::NorthFirst => {
                let mut reordered = values;
                reordered.swap(0, 4);
                reordered.swap(1, 3);
                reordered.swap(5, 7);
                reordered
            }
        }
    }
}
