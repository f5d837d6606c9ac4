//! Navigation goals understood by the agent runtime.

use std::fmt;

use super::Position;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Get within `range` blocks of a point.
    Near { x: i64, y: i64, z: i64, range: i64 },
    /// Get within `range` blocks of a column, at any height.
    NearXz { x: i64, z: i64, range: i64 },
    /// Reach a height.
    Y { y: i64 },
}


impl Goal {
    /// Whether an agent standing at `pos` has reached this goal.
    /// Compared on block coordinates.
    pub fn is_satisfied(&self, pos: &Position) -> bool {
        let (bx, by, bz) = pos.block();
        match *self {
            Goal::Near { x, y, z, range } => {
                let dist = squared(x.abs_diff(bx))
                    .saturating_add(squared(y.abs_diff(by)))
                    .saturating_add(squared(z.abs_diff(bz)));
                dist <= squared(range.unsigned_abs())
            }
            Goal::NearXz { x, z, range } => {
                let dist = squared(x.abs_diff(bx)).saturating_add(squared(z.abs_diff(bz)));
                dist <= squared(range.unsigned_abs())
            }
            Goal::Y { y } => by == y,
        }
    }

    /// The point the agent should head for from `pos`: the center of the
    /// target block, keeping whichever axes the goal does not constrain.
    pub fn target(&self, pos: &Position) -> Position {
        match *self {
            Goal::Near { x, y, z, .. } => Position::new(x as f64 + 0.5, y as f64, z as f64 + 0.5),
            Goal::NearXz { x, z, .. } => Position::new(x as f64 + 0.5, pos.y, z as f64 + 0.5),
            Goal::Y { y } => Position::new(pos.x, y as f64, pos.z),
        }
    }

    /// The height the goal requires, if it constrains height at all.
    pub fn height(&self) -> Option<i64> {
        match *self {
            Goal::Near { y, .. } | Goal::Y { y } => Some(y),
            Goal::NearXz { .. } => None,
        }
    }
}


/// Exact for any `u64`. Sums of squares saturate, which only ever makes a
/// distance compare as farther than every range.
fn squared(d: u64) -> u128 {
    u128::from(d) * u128::from(d)
}


impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Near { x, y, z, range } => write!(f, "near {} {} {} (range {})", x, y, z, range),
            Goal::NearXz { x, z, range } => write!(f, "near xz {} {} (range {})", x, z, range),
            Goal::Y { y } => write!(f, "y {}", y),
        }
    }
}
