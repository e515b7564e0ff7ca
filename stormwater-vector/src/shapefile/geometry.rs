/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/
use std::f64;
use std::fmt;
use stormwater_common::structures::{Point2D, Polyline};

/// The Shapefile shape types handled by this library. Polygon, MultiPoint and
/// MultiPatch layers are not needed by the stormwater tools and are rejected
/// when read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    PointZ,
    PolyLineZ,
    PointM,
    PolyLineM,
}

impl Default for ShapeType {
    fn default() -> ShapeType {
        ShapeType::Null
    }
}

impl ShapeType {
    pub fn from_int(value: i32) -> Option<ShapeType> {
        match value {
            0 => Some(ShapeType::Null),
            1 => Some(ShapeType::Point),
            3 => Some(ShapeType::PolyLine),
            11 => Some(ShapeType::PointZ),
            13 => Some(ShapeType::PolyLineZ),
            21 => Some(ShapeType::PointM),
            23 => Some(ShapeType::PolyLineM),
            _ => None,
        }
    }

    pub fn to_int(&self) -> i32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
        }
    }

    /// Strips the z/m dimension, e.g. `PolyLineZ` -> `PolyLine`.
    pub fn base_shape_type(&self) -> ShapeType {
        match self {
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
                ShapeType::PolyLine
            }
            ShapeType::Null => ShapeType::Null,
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ShapeType::Null => "Null",
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "PolyLine",
            ShapeType::PointZ => "PointZ",
            ShapeType::PolyLineZ => "PolyLineZ",
            ShapeType::PointM => "PointM",
            ShapeType::PolyLineM => "PolyLineM",
        };
        write!(f, "{}", s)
    }
}

/// A single feature geometry. Multi-part lines store the index of the first
/// vertex of each part in `parts`.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapefileGeometry {
    pub shape_type: ShapeType,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub parts: Vec<i32>,
    pub points: Vec<Point2D>,
    pub z_min: f64,
    pub z_max: f64,
    pub z_array: Vec<f64>,
    pub m_min: f64,
    pub m_max: f64,
    pub m_array: Vec<f64>,
}

impl Default for ShapefileGeometry {
    fn default() -> ShapefileGeometry {
        ShapefileGeometry::new(ShapeType::Null)
    }
}

impl ShapefileGeometry {
    pub fn new(shape_type: ShapeType) -> ShapefileGeometry {
        ShapefileGeometry {
            shape_type,
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
            parts: vec![],
            points: vec![],
            z_min: f64::INFINITY,
            z_max: f64::NEG_INFINITY,
            z_array: vec![],
            m_min: f64::INFINITY,
            m_max: f64::NEG_INFINITY,
            m_array: vec![],
        }
    }

    /// Creates a Point geometry.
    pub fn new_point(p: Point2D) -> ShapefileGeometry {
        let mut sfg = ShapefileGeometry::new(ShapeType::Point);
        sfg.add_point(p);
        sfg
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn is_null(&self) -> bool {
        self.shape_type == ShapeType::Null || self.points.is_empty()
    }

    pub fn has_m_data(&self) -> bool {
        !self.m_array.is_empty()
    }

    fn expand_extent(&mut self, p: &Point2D) {
        self.x_min = self.x_min.min(p.x);
        self.x_max = self.x_max.max(p.x);
        self.y_min = self.y_min.min(p.y);
        self.y_max = self.y_max.max(p.y);
    }

    /// Adds a single Point2D to the ShapefileGeometry's points array.
    pub fn add_point(&mut self, p: Point2D) {
        self.expand_extent(&p);
        self.points.push(p);
    }

    /// Adds a part of Point2Ds to the ShapefileGeometry.
    pub fn add_part(&mut self, points: &[Point2D]) {
        self.parts.push(self.points.len() as i32);
        for p in points {
            self.add_point(*p);
        }
    }

    /// Adds a part of Point2Ds with their z-values.
    pub fn add_partz(&mut self, points: &[Point2D], z_values: &[f64]) {
        self.add_part(points);
        for z in z_values {
            self.z_min = self.z_min.min(*z);
            self.z_max = self.z_max.max(*z);
            self.z_array.push(*z);
        }
    }

    /// Adds a part of Point2Ds with their measures.
    pub fn add_partm(&mut self, points: &[Point2D], measures: &[f64]) {
        self.add_part(points);
        for m in measures {
            self.m_min = self.m_min.min(*m);
            self.m_max = self.m_max.max(*m);
            self.m_array.push(*m);
        }
    }

    /// Vertex range `[start, end)` of a part.
    fn part_range(&self, part: usize) -> (usize, usize) {
        let start = self.parts[part] as usize;
        let end = if part < self.parts.len() - 1 {
            self.parts[part + 1] as usize
        } else {
            self.points.len()
        };
        (start.min(self.points.len()), end.min(self.points.len()))
    }

    /// Splits the geometry into one Polyline per part. Point geometries have
    /// no parts and yield a single one-vertex line.
    pub fn polylines(&self, id: usize) -> Vec<Polyline> {
        if self.parts.is_empty() {
            if self.points.is_empty() {
                return vec![];
            }
            return vec![Polyline::new(&self.points, id)];
        }
        (0..self.parts.len())
            .map(|part| {
                let (start, end) = self.part_range(part);
                Polyline::new(&self.points[start..end], id)
            })
            .collect()
    }

    /// Returns the planar length summed over all parts.
    pub fn length(&self) -> f64 {
        self.polylines(0).iter().map(|pl| pl.length()).sum()
    }

    /// Returns the point lying `distance` units along the geometry. Parts are
    /// walked in storage order, so 0 gives the first vertex of the first part
    /// and `length()` the last vertex of the last part.
    pub fn interpolate(&self, distance: f64) -> Option<Point2D> {
        let lines = self.polylines(0);
        let mut remaining = distance;
        for (i, line) in lines.iter().enumerate() {
            let len = line.length();
            if remaining <= len || i == lines.len() - 1 {
                return line.interpolate(remaining);
            }
            remaining -= len;
        }
        None
    }

    /// Record content length in bytes, excluding the 8-byte record header.
    pub fn get_length(&self) -> i32 {
        if self.is_null() {
            return 4;
        }
        let num_parts = self.num_parts() as i32;
        let num_points = self.num_points() as i32;
        match self.shape_type {
            ShapeType::Null => 4,
            ShapeType::Point => 20,
            ShapeType::PointM => 28,
            ShapeType::PointZ => {
                if self.has_m_data() {
                    36
                } else {
                    28
                }
            }
            ShapeType::PolyLine => 44 + 4 * num_parts + 16 * num_points,
            ShapeType::PolyLineM => 44 + 4 * num_parts + 16 * num_points + 16 + 8 * num_points,
            ShapeType::PolyLineZ => {
                let mut ret = 44 + 4 * num_parts + 16 * num_points + 16 + 8 * num_points;
                if self.has_m_data() {
                    ret += 16 + 8 * num_points;
                }
                ret
            }
        }
    }
}
