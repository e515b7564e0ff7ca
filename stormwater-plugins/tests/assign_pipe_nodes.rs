use std::fs;
use std::path::Path;
use stormwater_common::structures::Point2D;
use stormwater_plugins::node_resolution::{
    assign_pipe_nodes, NodeFieldNames, NodeResolutionError, ResolutionOptions,
};
use stormwater_vector::*;

fn path_str(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().to_string()
}

fn write_pits(dir: &Path, pits: &[(f64, f64, &str, f64)]) -> String {
    let file_name = path_str(dir, "Merged SW points.shp");
    let mut sf = Shapefile::new(&file_name, ShapeType::Point);
    sf.attributes
        .add_field(&AttributeField::new("AssetID", FieldDataType::Text, 16, 0));
    sf.attributes
        .add_field(&AttributeField::new("DEM value1", FieldDataType::Real, 12, 3));
    for (x, y, id, z) in pits {
        sf.add_record(
            ShapefileGeometry::new_point(Point2D::new(*x, *y)),
            vec![FieldData::Text(id.to_string()), FieldData::Real(*z)],
        )
        .unwrap();
    }
    sf.write().unwrap();
    file_name
}

fn write_pipes(dir: &Path, pipes: &[Vec<Vec<(f64, f64)>>]) -> String {
    let file_name = path_str(dir, "Merged SW Lines.shp");
    let mut sf = Shapefile::new(&file_name, ShapeType::PolyLine);
    sf.attributes
        .add_field(&AttributeField::new("PIPE_ID", FieldDataType::Int, 6, 0));
    for (i, parts) in pipes.iter().enumerate() {
        let mut g = ShapefileGeometry::new(ShapeType::PolyLine);
        for part in parts {
            let pts: Vec<Point2D> = part.iter().map(|(x, y)| Point2D::new(*x, *y)).collect();
            g.add_part(&pts);
        }
        sf.add_record(g, vec![FieldData::Int(i as i32 + 100)]).unwrap();
    }
    sf.write().unwrap();
    file_name
}

fn node_ids(file_name: &str) -> Vec<(Option<String>, Option<String>)> {
    let sf = Shapefile::read(file_name).unwrap();
    let us = sf.attributes.get_field_num("US_NODE_ID").unwrap();
    let ds = sf.attributes.get_field_num("DS_NODE_ID").unwrap();
    (0..sf.num_records())
        .map(|fid| {
            (
                sf.attributes.get_value(fid, us).and_then(|v| v.as_string()),
                sf.attributes.get_value(fid, ds).and_then(|v| v.as_string()),
            )
        })
        .collect()
}

fn ids(us: &str, ds: &str) -> (Option<String>, Option<String>) {
    (Some(us.to_string()), Some(ds.to_string()))
}

fn run(pipes_file: &str, pits_file: &str, options: &ResolutionOptions) -> Result<(), NodeResolutionError> {
    let mut pipes = Shapefile::read(pipes_file)?;
    let pits = Shapefile::read(pits_file)?;
    assign_pipe_nodes(&mut pipes, &pits, options, None).map(|_| ())
}

#[test]
fn upstream_is_the_higher_pit() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(dir.path(), &[(0.0, 0.0, "SW-A", 10.0), (20.0, 0.0, "SW-B", 5.0)]);
    let pipes = write_pipes(
        dir.path(),
        &[
            vec![vec![(0.3, 0.2), (19.8, -0.1)]],
            // digitized against the fall
            vec![vec![(20.0, 0.5), (10.0, 3.0), (0.0, 0.5)]],
        ],
    );

    run(&pipes, &pits, &ResolutionOptions::default()).unwrap();

    assert_eq!(
        node_ids(&pipes),
        vec![ids("SW-A", "SW-B"), ids("SW-A", "SW-B")]
    );
    // other attributes survive the edit
    let sf = Shapefile::read(&pipes).unwrap();
    assert_eq!(sf.attributes.get_value(1, 0), Some(&FieldData::Int(101)));
    assert_eq!(sf.get_record(1).unwrap().num_points(), 3);
}

#[test]
fn level_pits_keep_the_digitized_direction() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(dir.path(), &[(0.0, 0.0, "A", 3.5), (0.0, 10.0, "B", 3.5)]);
    let pipes = write_pipes(
        dir.path(),
        &[
            vec![vec![(0.0, 0.0), (0.0, 10.0)]],
            vec![vec![(0.0, 10.0), (0.0, 0.0)]],
        ],
    );

    run(&pipes, &pits, &ResolutionOptions::default()).unwrap();

    assert_eq!(node_ids(&pipes), vec![ids("A", "B"), ids("B", "A")]);
}

#[test]
fn empty_pit_layer_leaves_pipes_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(dir.path(), &[]);
    let pipes = write_pipes(dir.path(), &[vec![vec![(0.0, 0.0), (1.0, 0.0)]]]);
    let before = fs::read(dir.path().join("Merged SW Lines.dbf")).unwrap();

    let err = run(&pipes, &pits, &ResolutionOptions::default()).unwrap_err();

    assert!(matches!(err, NodeResolutionError::EmptyPitLayer));
    assert_eq!(fs::read(dir.path().join("Merged SW Lines.dbf")).unwrap(), before);
    let sf = Shapefile::read(&pipes).unwrap();
    assert_eq!(sf.attributes.get_field_num("US_NODE_ID"), None);
}

#[test]
fn second_run_gives_the_same_result() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(
        dir.path(),
        &[(0.0, 0.0, "P1", 12.0), (10.0, 0.0, "P2", 11.0), (20.0, 0.0, "P3", 11.5)],
    );
    let pipes = write_pipes(
        dir.path(),
        &[
            vec![vec![(0.0, 0.0), (10.0, 0.0)]],
            vec![vec![(10.0, 0.0), (20.0, 0.0)]],
        ],
    );

    run(&pipes, &pits, &ResolutionOptions::default()).unwrap();
    let first = node_ids(&pipes);
    run(&pipes, &pits, &ResolutionOptions::default()).unwrap();

    assert_eq!(first, vec![ids("P1", "P2"), ids("P3", "P2")]);
    assert_eq!(node_ids(&pipes), first);
    let sf = Shapefile::read(&pipes).unwrap();
    assert_eq!(sf.attributes.num_fields(), 3);
}

#[test]
fn existing_node_fields_are_reused_and_widened() {
    let dir = tempfile::tempdir().unwrap();
    let long_id = "NORTH-CATCHMENT-0042";
    let pits = write_pits(dir.path(), &[(0.0, 0.0, long_id, 2.0), (5.0, 0.0, "S-1", 1.0)]);
    let file_name = path_str(dir.path(), "Merged SW Lines.shp");
    let mut sf = Shapefile::new(&file_name, ShapeType::PolyLine);
    sf.attributes
        .add_field(&AttributeField::new("US_NODE_ID", FieldDataType::Text, 8, 0));
    sf.attributes
        .add_field(&AttributeField::new("NOTES", FieldDataType::Text, 10, 0));
    let mut g = ShapefileGeometry::new(ShapeType::PolyLine);
    g.add_part(&[Point2D::new(0.0, 0.0), Point2D::new(5.0, 0.0)]);
    sf.add_record(g, vec![FieldData::Text("stale".to_string()), FieldData::Text("keep".to_string())])
        .unwrap();
    sf.write().unwrap();

    run(&file_name, &pits, &ResolutionOptions::default()).unwrap();

    let sf = Shapefile::read(&file_name).unwrap();
    assert_eq!(sf.attributes.num_fields(), 3);
    assert_eq!(sf.attributes.get_field_num("US_NODE_ID"), Some(0));
    assert_eq!(sf.attributes.get_field(0).unwrap().field_length as usize, long_id.len());
    assert_eq!(
        sf.attributes.get_value(0, 1),
        Some(&FieldData::Text("keep".to_string()))
    );
    assert_eq!(node_ids(&file_name), vec![ids(long_id, "S-1")]);
}

#[test]
fn zero_length_pipe_fails_unless_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(dir.path(), &[(0.0, 0.0, "A", 2.0), (5.0, 0.0, "B", 1.0)]);
    let pipes = write_pipes(
        dir.path(),
        &[
            vec![vec![(0.0, 0.0), (5.0, 0.0)]],
            vec![vec![(2.0, 2.0), (2.0, 2.0)]],
        ],
    );

    let err = run(&pipes, &pits, &ResolutionOptions::default()).unwrap_err();
    assert!(matches!(err, NodeResolutionError::ZeroLengthPipe { fid: 1 }));

    let options = ResolutionOptions {
        skip_invalid_pipes: true,
        ..Default::default()
    };
    let mut pipe_layer = Shapefile::read(&pipes).unwrap();
    let pit_layer = Shapefile::read(&pits).unwrap();
    let summary = assign_pipe_nodes(&mut pipe_layer, &pit_layer, &options, None).unwrap();
    assert_eq!(summary.skipped, vec![1]);
    assert_eq!(node_ids(&pipes), vec![ids("A", "B"), (None, None)]);
}

#[test]
fn missing_elevation_field_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(dir.path(), &[(0.0, 0.0, "A", 2.0)]);
    let pipes = write_pipes(dir.path(), &[vec![vec![(0.0, 0.0), (5.0, 0.0)]]]);
    let options = ResolutionOptions {
        fields: NodeFieldNames {
            elevation: "ELEV".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };

    match run(&pipes, &pits, &options) {
        Err(NodeResolutionError::MissingField { field, .. }) => assert_eq!(field, "ELEV"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn multipart_pipes_use_first_and_last_parts() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(
        dir.path(),
        &[(0.0, 0.0, "TOP", 9.0), (50.0, 50.0, "MID", 20.0), (30.0, 0.0, "END", 4.0)],
    );
    let pipes = write_pipes(
        dir.path(),
        &[vec![
            vec![(0.0, 0.0), (10.0, 0.0)],
            vec![(20.0, 0.0), (30.0, 0.0)],
        ]],
    );

    run(&pipes, &pits, &ResolutionOptions::default()).unwrap();

    assert_eq!(node_ids(&pipes), vec![ids("TOP", "END")]);
}

#[test]
fn output_file_leaves_input_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(dir.path(), &[(0.0, 0.0, "A", 1.0), (5.0, 0.0, "B", 2.0)]);
    let pipes = write_pipes(dir.path(), &[vec![vec![(0.0, 0.0), (5.0, 0.0)]]]);
    let before = fs::read(dir.path().join("Merged SW Lines.dbf")).unwrap();
    let output = path_str(dir.path(), "pipes_with_nodes.shp");

    let mut pipe_layer = Shapefile::read(&pipes).unwrap();
    let pit_layer = Shapefile::read(&pits).unwrap();
    let summary = assign_pipe_nodes(
        &mut pipe_layer,
        &pit_layer,
        &ResolutionOptions {
            snap_tolerance: Some(0.5),
            ..Default::default()
        },
        Some(&output),
    )
    .unwrap();

    assert_eq!(summary.num_assigned, 1);
    assert_eq!(summary.num_beyond_snap, 0);
    assert_eq!(fs::read(dir.path().join("Merged SW Lines.dbf")).unwrap(), before);
    assert_eq!(node_ids(&output), vec![ids("B", "A")]);
    assert!(dir.path().join("pipes_with_nodes.shx").exists());
}

#[test]
fn custom_node_field_names_must_fit_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let pits = write_pits(dir.path(), &[(0.0, 0.0, "A", 2.0), (5.0, 0.0, "B", 1.0)]);
    let pipes = write_pipes(dir.path(), &[vec![vec![(0.0, 0.0), (5.0, 0.0)]]]);
    let before = fs::read(dir.path().join("Merged SW Lines.dbf")).unwrap();

    let long_names = ResolutionOptions {
        fields: NodeFieldNames {
            upstream: "UPSTREAM_NODE".to_string(),
            downstream: "DOWNSTREAM_NODE".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    match run(&pipes, &pits, &long_names) {
        Err(NodeResolutionError::InvalidFieldName { field }) => assert_eq!(field, "UPSTREAM_NODE"),
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(fs::read(dir.path().join("Merged SW Lines.dbf")).unwrap(), before);

    // ten-byte names are kept whole, so a second run finds them
    let short_names = ResolutionOptions {
        fields: NodeFieldNames {
            upstream: "UPSTREAM_N".to_string(),
            downstream: "DNSTREAM_N".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    run(&pipes, &pits, &short_names).unwrap();
    run(&pipes, &pits, &short_names).unwrap();
    let sf = Shapefile::read(&pipes).unwrap();
    let names: Vec<&str> = sf.attributes.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["PIPE_ID", "UPSTREAM_N", "DNSTREAM_N"]);
    assert_eq!(
        sf.attributes.get_value(0, 1),
        Some(&FieldData::Text("A".to_string()))
    );
}
