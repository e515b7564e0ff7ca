/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/

use super::Point2D;

/// A single connected sequence of vertices, e.g. one part of a pipe feature.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Polyline {
    pub vertices: Vec<Point2D>,
    pub id: usize,
}

impl Polyline {
    /// Creates a new Polyline from vertices
    pub fn new(vertices: &[Point2D], id: usize) -> Polyline {
        Polyline {
            vertices: vertices.to_vec(),
            id,
        }
    }

    /// returns the number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the feature geometric length.
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }

    pub fn first_vertex(&self) -> Option<Point2D> {
        self.vertices.first().copied()
    }

    pub fn last_vertex(&self) -> Option<Point2D> {
        self.vertices.last().copied()
    }

    /// Returns the point found `distance` units along the line, measured from
    /// the first vertex. Distances outside of `[0, length]` are clamped to the
    /// line's end points. Returns `None` for a line without vertices.
    pub fn interpolate(&self, distance: f64) -> Option<Point2D> {
        let first = self.first_vertex()?;
        if distance <= 0f64 {
            return Some(first);
        }
        let mut travelled = 0f64;
        for w in self.vertices.windows(2) {
            let seg_len = w[0].distance(&w[1]);
            if seg_len > 0f64 && travelled + seg_len >= distance {
                let t = (distance - travelled) / seg_len;
                if t >= 1f64 {
                    return Some(w[1]);
                }
                return Some(w[0].lerp(&w[1], t));
            }
            travelled += seg_len;
        }
        self.last_vertex()
    }
}
