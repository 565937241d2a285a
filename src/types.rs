//! Newtype wrappers for grid coordinates, movement and perceived state.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A cell on the grid, `0 <= x < width`, `0 <= y < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Create a position, validating it lies inside a `width`×`height` grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if either coordinate is outside the grid.
    pub fn checked(x: i64, y: i64, width: usize, height: usize) -> Result<Self, Error> {
        if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
            Ok(Self::new(x as usize, y as usize))
        } else {
            Err(Error::PositionOutOfBounds {
                x,
                y,
                width,
                height,
            })
        }
    }

    /// Raw coordinates of the neighbor in `direction`, without wrap-around.
    ///
    /// Used to read odor, where cells past the edge read as zero.
    pub fn neighbor(&self, direction: Direction) -> (i64, i64) {
        let (dx, dy) = direction.offset();
        (self.x as i64 + dx, self.y as i64 + dy)
    }

    /// Position after one step in `direction` on a toroidal grid.
    ///
    /// Leaving through one edge re-enters at the opposite edge.
    pub fn stepped(&self, direction: Direction, width: usize, height: usize) -> Self {
        let (nx, ny) = self.neighbor(direction);
        Self::new(wrap_axis(nx, width), wrap_axis(ny, height))
    }

    /// Euclidean distance between two cells.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

fn wrap_axis(value: i64, extent: usize) -> usize {
    if value < 0 {
        extent.saturating_sub(1)
    } else if value as usize >= extent {
        0
    } else {
        value as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in the order used by [`State`] components.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid offset; `y` grows downward.
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Index into [`Direction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(Error::UnknownDirection {
                name: s.to_string(),
            }),
        }
    }
}

/// Odor-gradient signs perceived by an agent: `(up, down, left, right)`.
///
/// Each component is `-1`, `0` or `1`: whether the neighbor in that
/// direction smells weaker, equal or stronger than the current cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State([i8; 4]);

impl State {
    pub const ZERO: State = State([0; 4]);

    /// Build a state from raw differences; only their signs are kept.
    pub fn from_differences(up: i64, down: i64, left: i64, right: i64) -> Self {
        Self([
            up.signum() as i8,
            down.signum() as i8,
            left.signum() as i8,
            right.signum() as i8,
        ])
    }

    pub fn components(&self) -> [i8; 4] {
        self.0
    }

    pub fn sign(&self, direction: Direction) -> i8 {
        self.0[direction.index()]
    }

    /// Components as perceptron inputs.
    pub fn inputs(&self) -> [f64; 4] {
        self.0.map(f64::from)
    }

    /// Colon-joined persistence key, e.g. `-1:0:1:0`.
    pub fn key(&self) -> String {
        let [a, b, c, d] = self.0;
        format!("{a}:{b}:{c}:{d}")
    }

    /// Parse a colon-joined key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateKey`] unless the key holds exactly four
    /// integers in `-1..=1`.
    pub fn parse(key: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidStateKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = key.trim().split(':').collect();
        if parts.len() != 4 {
            return Err(invalid("expected four colon-separated components"));
        }

        let mut signs = [0i8; 4];
        for (slot, part) in signs.iter_mut().zip(parts) {
            let value: i8 = part
                .trim()
                .parse()
                .map_err(|_| invalid("component is not an integer"))?;
            if !(-1..=1).contains(&value) {
                return Err(invalid("component must be -1, 0 or 1"));
            }
            *slot = value;
        }
        Ok(Self(signs))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "({a}, {b}, {c}, {d})")
    }
}

impl FromStr for State {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Display color handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const ORANGE: Rgb = Rgb(255, 140, 0);
    pub const PURPLE: Rgb = Rgb(128, 0, 160);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
}
