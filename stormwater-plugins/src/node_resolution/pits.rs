/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/

use super::error::NodeResolutionError;
use super::NodeFieldNames;
use stormwater_common::structures::Point2D;
use stormwater_vector::{ShapeType, Shapefile, MAX_TEXT_FIELD_LENGTH};

#[derive(Debug, Clone, PartialEq)]
pub struct PitRecord {
    pub fid: usize,
    pub asset_id: String,
    pub elevation: f64,
    pub point: Point2D,
}

/// The validated pits of a run, in feature ID order. Pits without a geometry
/// have no location and are left out.
#[derive(Debug, Default, Clone)]
pub struct PitTable {
    records: Vec<PitRecord>,
}

impl PitTable {
    pub fn load(pits: &Shapefile, fields: &NodeFieldNames) -> Result<PitTable, NodeResolutionError> {
        if pits.header.shape_type.base_shape_type() != ShapeType::Point {
            return Err(NodeResolutionError::WrongShapeType {
                layer: pits.get_short_filename(),
                expected: ShapeType::Point,
                found: pits.header.shape_type,
            });
        }
        if pits.num_records() == 0 {
            return Err(NodeResolutionError::EmptyPitLayer);
        }
        let missing = |field: &str| NodeResolutionError::MissingField {
            layer: pits.get_short_filename(),
            field: field.to_string(),
        };
        let id_field = pits
            .attributes
            .get_field_num(&fields.asset_id)
            .ok_or_else(|| missing(&fields.asset_id))?;
        let elev_field = pits
            .attributes
            .get_field_num(&fields.elevation)
            .ok_or_else(|| missing(&fields.elevation))?;

        let mut records = Vec::with_capacity(pits.num_records());
        for fid in 0..pits.num_records() {
            let point = match pits.get_record(fid) {
                Some(g) if !g.is_null() => g.points[0],
                _ => continue,
            };
            let asset_id = pits
                .attributes
                .get_value(fid, id_field)
                .and_then(|v| v.as_string())
                .ok_or(NodeResolutionError::MissingAssetId { fid })?;
            // longer IDs could only be stored truncated
            if asset_id.len() > MAX_TEXT_FIELD_LENGTH {
                return Err(NodeResolutionError::AssetIdTooLong {
                    fid,
                    length: asset_id.len(),
                });
            }
            let elevation = pits
                .attributes
                .get_value(fid, elev_field)
                .and_then(|v| v.as_f64())
                .filter(|z| z.is_finite())
                .ok_or(NodeResolutionError::InvalidElevation { fid })?;
            records.push(PitRecord {
                fid,
                asset_id,
                elevation,
                point,
            });
        }

        if records.is_empty() {
            return Err(NodeResolutionError::EmptyPitLayer);
        }
        Ok(PitTable { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PitRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PitRecord> {
        self.records.iter()
    }

    /// Length, in bytes, of the longest asset ID.
    pub fn longest_asset_id(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.asset_id.len())
            .max()
            .unwrap_or(0)
    }
}
