/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT

Notes: Pipes are directed using the ground elevation of the pits nearest to
their two ends. The end whose pit sits higher, or level, is upstream.
*/

// private sub-module defined in other files
mod error;
mod index;
mod pits;
mod schema;

// exports identifiers from private sub-modules in the current module namespace
pub use self::error::NodeResolutionError;
pub use self::index::{NearestNeighborIndex, PitIndex};
pub use self::pits::{PitRecord, PitTable};
pub use self::schema::{ensure_node_fields, ensure_text_field, node_field_width};

use stormwater_common::structures::Point2D;
use stormwater_vector::{
    FieldData, ShapeType, Shapefile, ShapefileGeometry, MAX_FIELD_NAME_LENGTH,
};

/// Names of the pit attributes read and the pipe attributes written.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFieldNames {
    pub asset_id: String,
    pub elevation: String,
    pub upstream: String,
    pub downstream: String,
}

impl Default for NodeFieldNames {
    fn default() -> NodeFieldNames {
        NodeFieldNames {
            asset_id: String::from("AssetID"),
            elevation: String::from("DEM value1"),
            upstream: String::from("US_NODE_ID"),
            downstream: String::from("DS_NODE_ID"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolutionOptions {
    pub fields: NodeFieldNames,
    /// Endpoints farther than this from their nearest pit are counted in the
    /// summary. They are still assigned.
    pub snap_tolerance: Option<f64>,
    /// Leave pipes without a usable geometry untouched instead of failing.
    pub skip_invalid_pipes: bool,
    pub verbose: bool,
}

/// A pit as seen from one end of a pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct PitRef {
    pub fid: usize,
    pub asset_id: String,
    pub elevation: f64,
    /// Distance from the pipe end to the pit.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeAssignment {
    pub pipe_fid: usize,
    pub upstream: PitRef,
    pub downstream: PitRef,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionSummary {
    pub num_pipes: usize,
    pub num_assigned: usize,
    /// Feature IDs of the pipes left untouched in skip mode.
    pub skipped: Vec<usize>,
    /// Number of pipe ends beyond the snap tolerance.
    pub num_beyond_snap: usize,
}

/// Start and end points of a pipe, taken at arc-length zero and at its full
/// length.
pub fn pipe_endpoints(
    fid: usize,
    geometry: &ShapefileGeometry,
) -> Result<(Point2D, Point2D), NodeResolutionError> {
    if geometry.is_null() {
        return Err(NodeResolutionError::NullPipeGeometry { fid });
    }
    let length = geometry.length();
    if length <= 0f64 {
        return Err(NodeResolutionError::ZeroLengthPipe { fid });
    }
    match (geometry.interpolate(0f64), geometry.interpolate(length)) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(NodeResolutionError::NullPipeGeometry { fid }),
    }
}

fn nearest_pit<I: NearestNeighborIndex>(
    point: &Point2D,
    table: &PitTable,
    index: &I,
) -> Result<PitRef, NodeResolutionError> {
    let (i, distance) = index
        .nearest(point)
        .ok_or(NodeResolutionError::EmptyPitLayer)?;
    let pit = table.get(i).ok_or(NodeResolutionError::EmptyPitLayer)?;
    Ok(PitRef {
        fid: pit.fid,
        asset_id: pit.asset_id.clone(),
        elevation: pit.elevation,
        distance,
    })
}

/// Resolves the upstream and downstream pits of a single pipe.
pub fn resolve_pipe<I: NearestNeighborIndex>(
    fid: usize,
    geometry: &ShapefileGeometry,
    table: &PitTable,
    index: &I,
) -> Result<NodeAssignment, NodeResolutionError> {
    let (start, end) = pipe_endpoints(fid, geometry)?;
    let start_pit = nearest_pit(&start, table, index)?;
    let end_pit = nearest_pit(&end, table, index)?;
    let (upstream, downstream) = if start_pit.elevation >= end_pit.elevation {
        (start_pit, end_pit)
    } else {
        (end_pit, start_pit)
    };
    Ok(NodeAssignment {
        pipe_fid: fid,
        upstream,
        downstream,
    })
}

/// Resolves every pipe without touching the layer. In skip mode, pipes whose
/// geometry can't be resolved are reported in the summary instead.
pub fn resolve_pipes<I: NearestNeighborIndex>(
    pipes: &Shapefile,
    table: &PitTable,
    index: &I,
    options: &ResolutionOptions,
) -> Result<(Vec<NodeAssignment>, ResolutionSummary), NodeResolutionError> {
    let num_pipes = pipes.num_records();
    let mut summary = ResolutionSummary {
        num_pipes,
        ..Default::default()
    };
    let mut assignments = Vec::with_capacity(num_pipes);
    let mut progress: usize;
    let mut old_progress: usize = 1;
    for fid in 0..num_pipes {
        let geometry = pipes
            .get_record(fid)
            .ok_or(NodeResolutionError::NullPipeGeometry { fid })?;
        match resolve_pipe(fid, geometry, table, index) {
            Ok(assignment) => {
                if let Some(tolerance) = options.snap_tolerance {
                    for pit in [&assignment.upstream, &assignment.downstream] {
                        if pit.distance > tolerance {
                            summary.num_beyond_snap += 1;
                        }
                    }
                }
                assignments.push(assignment);
            }
            Err(NodeResolutionError::NullPipeGeometry { fid })
            | Err(NodeResolutionError::ZeroLengthPipe { fid })
                if options.skip_invalid_pipes =>
            {
                summary.skipped.push(fid);
            }
            Err(e) => return Err(e),
        }
        if options.verbose {
            progress = (100.0_f64 * (fid + 1) as f64 / num_pipes as f64) as usize;
            if progress != old_progress {
                println!("Resolving pipe nodes: {}%", progress);
                old_progress = progress;
            }
        }
    }
    summary.num_assigned = assignments.len();
    Ok((assignments, summary))
}

/// Labels each pipe with the asset IDs of its upstream and downstream pits.
///
/// All resolution happens before the pipe layer is edited, so any error
/// leaves the layer, and its files, unchanged. The edits are committed in a
/// single step, to `output` when given and otherwise to the pipe layer's own
/// file.
pub fn assign_pipe_nodes(
    pipes: &mut Shapefile,
    pits: &Shapefile,
    options: &ResolutionOptions,
    output: Option<&str>,
) -> Result<ResolutionSummary, NodeResolutionError> {
    if pipes.header.shape_type.base_shape_type() != ShapeType::PolyLine {
        return Err(NodeResolutionError::WrongShapeType {
            layer: pipes.get_short_filename(),
            expected: ShapeType::PolyLine,
            found: pipes.header.shape_type,
        });
    }
    for name in [&options.fields.upstream, &options.fields.downstream] {
        if name.is_empty() || name.len() > MAX_FIELD_NAME_LENGTH {
            return Err(NodeResolutionError::InvalidFieldName {
                field: name.to_string(),
            });
        }
    }
    let table = PitTable::load(pits, &options.fields)?;
    let index = PitIndex::new(&table);
    let (assignments, summary) = resolve_pipes(pipes, &table, &index, options)?;

    let width = node_field_width(table.longest_asset_id());
    let mut session = pipes.start_editing();
    let (us_field, ds_field) = ensure_node_fields(
        &mut session,
        &options.fields.upstream,
        &options.fields.downstream,
        width,
    )?;
    for assignment in assignments {
        session.change_attribute_value(
            assignment.pipe_fid,
            us_field,
            FieldData::Text(assignment.upstream.asset_id),
        )?;
        session.change_attribute_value(
            assignment.pipe_fid,
            ds_field,
            FieldData::Text(assignment.downstream.asset_id),
        )?;
    }
    match output {
        Some(file_name) => session.commit_changes_to(file_name)?,
        None => session.commit_changes()?,
    }
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use stormwater_vector::{AttributeField, FieldDataType};

    fn pit_table(pits: &[(f64, f64, &str, f64)]) -> PitTable {
        let mut sf = Shapefile::new("pits.shp", ShapeType::Point);
        sf.attributes
            .add_field(&AttributeField::new("AssetID", FieldDataType::Text, 12, 0));
        sf.attributes
            .add_field(&AttributeField::new("DEM value1", FieldDataType::Real, 10, 2));
        for (x, y, id, z) in pits {
            sf.add_record(
                ShapefileGeometry::new_point(Point2D::new(*x, *y)),
                vec![FieldData::Text(id.to_string()), FieldData::Real(*z)],
            )
            .unwrap();
        }
        PitTable::load(&sf, &NodeFieldNames::default()).unwrap()
    }

    fn line(points: &[(f64, f64)]) -> ShapefileGeometry {
        let pts: Vec<Point2D> = points.iter().map(|(x, y)| Point2D::new(*x, *y)).collect();
        let mut g = ShapefileGeometry::new(ShapeType::PolyLine);
        g.add_part(&pts);
        g
    }

    #[test]
    fn test_upstream_is_higher_pit() {
        let table = pit_table(&[(0.0, 0.0, "A", 5.0), (10.0, 0.0, "B", 10.0)]);
        let index = PitIndex::new(&table);
        let a = resolve_pipe(0, &line(&[(0.2, 0.1), (9.9, 0.0)]), &table, &index).unwrap();
        assert_eq!(a.upstream.asset_id, "B");
        assert_eq!(a.downstream.asset_id, "A");
        assert!(a.upstream.elevation >= a.downstream.elevation);
    }

    #[test]
    fn test_level_pits_keep_digitized_direction() {
        let table = pit_table(&[(0.0, 0.0, "A", 7.0), (10.0, 0.0, "B", 7.0)]);
        let index = PitIndex::new(&table);
        let a = resolve_pipe(0, &line(&[(10.0, 0.0), (0.0, 0.0)]), &table, &index).unwrap();
        assert_eq!(a.upstream.asset_id, "B");
        assert_eq!(a.downstream.asset_id, "A");
        assert_eq!(a.upstream.distance, 0.0);
    }

    #[test]
    fn test_invalid_pipes() {
        let table = pit_table(&[(0.0, 0.0, "A", 1.0)]);
        let index = PitIndex::new(&table);
        assert!(matches!(
            resolve_pipe(3, &ShapefileGeometry::new(ShapeType::PolyLine), &table, &index),
            Err(NodeResolutionError::NullPipeGeometry { fid: 3 })
        ));
        assert!(matches!(
            resolve_pipe(4, &line(&[(1.0, 1.0), (1.0, 1.0)]), &table, &index),
            Err(NodeResolutionError::ZeroLengthPipe { fid: 4 })
        ));
    }

    #[test]
    fn test_skip_and_snap_summary() {
        let table = pit_table(&[(0.0, 0.0, "A", 2.0), (10.0, 0.0, "B", 1.0)]);
        let index = PitIndex::new(&table);
        let mut sf = Shapefile::new("pipes.shp", ShapeType::PolyLine);
        sf.add_record(line(&[(0.0, 0.0), (10.0, 0.0)]), vec![]).unwrap();
        sf.add_record(line(&[(5.0, 5.0), (5.0, 5.0)]), vec![]).unwrap();
        sf.add_record(line(&[(0.0, 3.0), (10.0, 0.5)]), vec![]).unwrap();

        let options = ResolutionOptions::default();
        assert!(resolve_pipes(&sf, &table, &index, &options).is_err());

        let options = ResolutionOptions {
            skip_invalid_pipes: true,
            snap_tolerance: Some(1.0),
            ..Default::default()
        };
        let (assignments, summary) = resolve_pipes(&sf, &table, &index, &options).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(summary.num_pipes, 3);
        assert_eq!(summary.num_assigned, 2);
        assert_eq!(summary.skipped, vec![1]);
        assert_eq!(summary.num_beyond_snap, 1);
    }
}
