/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/

use std::env;
use std::io::{Error, ErrorKind};
use std::path;
use std::time::Instant;
use stormwater_common::utils::{
    get_formatted_elapsed_time,
    print_welcome,
    resolve_file_name,
    wrapped_print,
};
use stormwater_plugins::node_resolution::{assign_pipe_nodes, ResolutionOptions};
use stormwater_vector::Shapefile;

/// This tool labels every pipe in a stormwater network with the asset IDs of
/// the pits at its upstream and downstream ends. Each end of a pipe
/// (`--pipes`) is matched to its nearest pit (`--pits`), and the pit with the
/// higher ground elevation (read from the DEM-sampled `--elev_field`) is taken
/// as upstream. When both pits sit at the same elevation, the pit at the start
/// of the pipe, as digitized, is upstream.
///
/// The asset IDs (`--asset_field`) are written to two text fields of the pipe
/// layer, `US_NODE_ID` and `DS_NODE_ID` by default. The fields are added when
/// missing. Existing fields are reused and widened if an asset ID would not
/// fit. The pipe layer is updated in place unless an output file (`--output`)
/// is given.
///
/// An optional snap distance (`--snap`), in the layers' x-y units, reports how
/// many pipe ends lie farther than that from their nearest pit. Those ends are
/// still assigned. Pipes without a geometry, or with zero length, stop the
/// tool unless `--skip_invalid` is specified, in which case they are left
/// untouched.
fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() <= 1 || args[1].trim() == "help" {
        // print help
        help();
        return;
    }

    if args[1].trim() == "run" {
        match run(&args) {
            Ok(_) => {}
            Err(e) => panic!("{:?}", e),
        }
    }

    if args[1].trim() == "version" {
        // print version information
        version();
    }
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("assign_pipe_nodes{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = r#"
    This tool assigns upstream and downstream node IDs to stormwater pipes using pit elevations.

    The following commands are recognized:
    help       Prints help information.
    run        Runs the tool.
    version    Prints the tool version information.

    The following flags can be used with the 'run' command:
    --pipes         Name of the input pipes (PolyLine) vector file.
    --pits          Name of the input pits (Point) vector file.
    -o, --output    Optional output file; the pipes file is updated in place when omitted.
    --asset_field   Pit field holding the node ID (default AssetID).
    --elev_field    Pit field holding the ground elevation (default 'DEM value1').
    --us_field      Pipe field receiving the upstream node ID (default US_NODE_ID).
    --ds_field      Pipe field receiving the downstream node ID (default DS_NODE_ID).
    --snap          Optional distance used to report pipe ends far from any pit.
    --skip_invalid  Leave null or zero-length pipes untouched rather than failing.
    --wd            Optional working directory, overriding settings.json.
    -v              Verbose mode.

    Input/output file names can be fully qualified, or can rely on the
    working directory contained in the Stormwater Tools settings.json file.

    Example Usage:
    >> .*EXE_NAME run --pipes='Merged SW Lines.shp' --pits='Merged SW points.shp' --snap=0.5
    "#
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "assign_pipe_nodes v{} by the Stormwater Tools contributors (c) 2026.",
        VERSION.unwrap_or("Unknown version")
    );
}

fn get_tool_name() -> String {
    String::from("AssignPipeNodes") // This should be camel case and is a reference to the tool name.
}

/// The value of a flag given either as `--flag=value` or `--flag value`.
fn flag_value(args: &[String], i: usize, vec: &[&str], flag: &str) -> Result<String, Error> {
    if vec.len() > 1 {
        return Ok(vec[1..].join("="));
    }
    args.get(i + 1).map(|s| s.to_string()).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("No value was given for the {} flag.", flag),
        )
    })
}

fn run(args: &Vec<String>) -> Result<(), Error> {
    let tool_name = get_tool_name();

    // Read in the environment variables and get the necessary values
    let configurations = stormwater_common::configs::get_configs()?;
    let mut working_directory = configurations.working_directory.clone();
    let mut verbose = configurations.verbose_mode;

    // read the arguments
    let mut pipes_file = String::from("Merged SW Lines.shp");
    let mut pits_file = String::from("Merged SW points.shp");
    let mut output_file = String::new();
    let mut options = ResolutionOptions::default();
    if args.len() <= 1 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Tool run with too few parameters.",
        ));
    }
    for i in 0..args.len() {
        let mut arg = args[i].replace("\"", "");
        arg = arg.replace("\'", "");
        let cmd = arg.split("="); // in case an equals sign was used
        let vec = cmd.collect::<Vec<&str>>();
        let flag_val = vec[0].to_lowercase().replace("--", "-");
        if flag_val == "-pipes" || flag_val == "-i" || flag_val == "-input" {
            pipes_file = flag_value(args, i, &vec, &flag_val)?;
        } else if flag_val == "-pits" {
            pits_file = flag_value(args, i, &vec, &flag_val)?;
        } else if flag_val == "-o" || flag_val == "-output" {
            output_file = flag_value(args, i, &vec, &flag_val)?;
        } else if flag_val == "-asset_field" {
            options.fields.asset_id = flag_value(args, i, &vec, &flag_val)?;
        } else if flag_val == "-elev_field" {
            options.fields.elevation = flag_value(args, i, &vec, &flag_val)?;
        } else if flag_val == "-us_field" {
            options.fields.upstream = flag_value(args, i, &vec, &flag_val)?;
        } else if flag_val == "-ds_field" {
            options.fields.downstream = flag_value(args, i, &vec, &flag_val)?;
        } else if flag_val == "-snap" {
            let val = flag_value(args, i, &vec, &flag_val)?;
            let snap = val.trim().parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing {}: '{}' is not a number.", flag_val, val),
                )
            })?;
            options.snap_tolerance = Some(snap);
        } else if flag_val == "-skip_invalid" {
            options.skip_invalid_pipes = vec.len() == 1 || !vec[1].to_lowercase().contains("false");
        } else if flag_val == "-wd" {
            working_directory = flag_value(args, i, &vec, &flag_val)?;
        } else if flag_val == "-v" {
            verbose = vec.len() == 1 || !vec[1].to_lowercase().contains("false");
        }
    }
    options.verbose = verbose;

    if verbose {
        print_welcome(&tool_name);
    }

    let start = Instant::now();

    let pipes_file = resolve_file_name(&pipes_file, &working_directory);
    let pits_file = resolve_file_name(&pits_file, &working_directory);
    let output_file = if output_file.is_empty() {
        None
    } else {
        Some(resolve_file_name(&output_file, &working_directory))
    };

    if let Some(snap) = options.snap_tolerance {
        if snap <= 0f64 && verbose {
            wrapped_print("Warning: The snap distance should be greater than 0.0.", 50);
        }
    }

    if verbose {
        println!("Reading data...");
    }
    let mut pipes = Shapefile::read(&pipes_file)?;
    let pits = Shapefile::read(&pits_file)?;

    let summary = assign_pipe_nodes(&mut pipes, &pits, &options, output_file.as_deref())?;

    if verbose {
        println!(
            "Assigned {} of {} pipes.",
            summary.num_assigned, summary.num_pipes
        );
        if !summary.skipped.is_empty() {
            let fids: Vec<String> = summary.skipped.iter().map(|f| f.to_string()).collect();
            wrapped_print(
                &format!(
                    "Warning: {} invalid pipes were left unassigned (FIDs {}).",
                    summary.skipped.len(),
                    fids.join(", ")
                ),
                50,
            );
        }
        if let Some(snap) = options.snap_tolerance {
            if summary.num_beyond_snap > 0 {
                wrapped_print(
                    &format!(
                        "Warning: {} pipe ends are farther than {} from their nearest pit.",
                        summary.num_beyond_snap, snap
                    ),
                    50,
                );
            }
        }
        let elapsed_time = get_formatted_elapsed_time(start);
        println!("{}", &format!("Elapsed Time (Including I/O): {}", elapsed_time));
    }

    println!("Upstream and downstream node IDs assigned successfully based on DEM elevations.");

    Ok(())
}
