/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A 2-D point in the planar coordinates of a vector layer.
#[derive(Default, Copy, Clone, Debug)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x: {}, y: {})", self.x, self.y)
    }
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    /// Euclidean distance between the point and another.
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        (self.x - other.x) * (self.x - other.x) + (self.y - other.y) * (self.y - other.y)
    }

    /// Point found a fraction `t` of the way from this point to `other`.
    pub fn lerp(&self, other: &Self, t: f64) -> Point2D {
        *self + (*other - *self) * t
    }

    pub fn nearly_equals(&self, other: &Self, precision: f64) -> bool {
        self.distance_squared(other) <= precision * precision
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl Eq for Point2D {}

impl PartialEq for Point2D {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Self) -> Point2D {
        Point2D {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Self) -> Point2D {
        Point2D {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

// scaling
impl Mul<f64> for Point2D {
    type Output = Point2D;
    fn mul(self, rhs: f64) -> Point2D {
        Point2D {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Point2D;

    #[test]
    fn test_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert_eq!(p1.distance(&p2), 5.0);
        assert_eq!(p1.distance_squared(&p2), 25.0);
    }

    #[test]
    fn test_lerp() {
        let p1 = Point2D::new(2.0, 2.0);
        let p2 = Point2D::new(6.0, 10.0);
        assert_eq!(p1.lerp(&p2, 0.0), p1);
        assert_eq!(p1.lerp(&p2, 1.0), p2);
        assert_eq!(p1.lerp(&p2, 0.5), Point2D::new(4.0, 6.0));
    }
}
