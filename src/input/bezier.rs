//! Bézier curve geometry for pointer paths
//!
//! Curves are evaluated in floating point ([`Point`]) and rounded to
//! integer screen coordinates ([`Position`]) only when a path step is
//! emitted.
//!
//! # Example
//!
//! ```rust
//! use human_input::input::bezier::{BezierCurve, Point};
//!
//! let curve = BezierCurve::new(
//!     Point::new(0.0, 0.0),
//!     Point::new(25.0, 50.0),
//!     Point::new(75.0, 50.0),
//!     Point::new(100.0, 0.0),
//! );
//! let end = curve.evaluate_at(1.0);
//! assert_eq!(end, Point::new(100.0, 0.0));
//! ```

use serde::{Deserialize, Serialize};

/// Integer screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in pixels
    pub x: i32,
    /// Y coordinate in pixels
    pub y: i32,
}

impl Position {
    /// Creates a new position
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position
    ///
    /// # Example
    ///
    /// ```rust
    /// use human_input::input::bezier::Position;
    ///
    /// let a = Position::new(0, 0);
    /// assert_eq!(a.distance_to(&Position::new(3, 4)), 5.0);
    /// ```
    pub fn distance_to(&self, other: &Position) -> f64 {
        Point::from(*self).distance_to(&Point::from(*other))
    }

    /// Displaces the position by a pixel offset
    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Position {
            x: p.x.round() as i32,
            y: p.y.round() as i32,
        }
    }
}

/// A 2D point with f64 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Creates a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation between this point and another
    ///
    /// `t = 0.0` yields this point, `t = 1.0` yields `other`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Returns the magnitude if treated as a vector from the origin
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn normalized(&self) -> Point {
        let mag = self.magnitude();
        if mag > 0.0 {
            Point {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            *self
        }
    }

    /// The vector rotated a quarter turn counter-clockwise
    pub fn perpendicular(&self) -> Point {
        Point {
            x: -self.y,
            y: self.x,
        }
    }
}

impl From<Position> for Point {
    fn from(p: Position) -> Self {
        Point {
            x: p.x as f64,
            y: p.y as f64,
        }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Point;

    fn mul(self, scalar: f64) -> Point {
        Point {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// A cubic Bézier curve defined by four control points
///
/// The curve starts at `p0`, ends at `p3`, and is shaped by the
/// intermediate control points `p1` and `p2`.
#[derive(Debug, Clone)]
pub struct BezierCurve {
    /// Start point
    pub p0: Point,
    /// First control point
    pub p1: Point,
    /// Second control point
    pub p2: Point,
    /// End point
    pub p3: Point,
}

impl BezierCurve {
    /// Creates a new cubic Bézier curve
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluates the curve at parameter `t`, clamped to `[0, 1]`
    pub fn evaluate_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        // B(t) = (1-t)³P₀ + 3(1-t)²tP₁ + 3(1-t)t²P₂ + t³P₃
        Point {
            x: mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x,
            y: mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y,
        }
    }
}
