use clap::Parser;
use colored::Colorize;
use osmlens::args::Args;
use osmlens::bounds::Bounds;
use osmlens::coalesce::complexity::ComplexityError;
use osmlens::element_pipeline::{parse_elements, ParseOptions};
use osmlens::geojson::to_feature_collection;
use osmlens::retrieve_data;
use std::fs;

fn main() {
    let args: Args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    // Fetch data
    println!("{} Fetching data...", "[1/3]".bold());
    let data = match (&args.file, args.bbox) {
        (Some(file), _) => retrieve_data::fetch_data_from_file(file)?,
        (None, Some(bbox)) => {
            let query = args
                .query
                .clone()
                .unwrap_or_else(|| retrieve_data::build_query(bbox, args.timeout));
            retrieve_data::fetch_data_from_overpass(&query, args.timeout)?
        }
        (None, None) => unreachable!("clap enforces --bbox or --file"),
    };

    if args.debug {
        println!("Total elements: {}", data.elements.len());
    }

    // Normalize geometries
    println!("{} Parsing data...", "[2/3]".bold());
    let options = ParseOptions {
        group_by_tag: args.group_by_tag.clone(),
    };
    let outcome = match parse_elements(&data.elements, &options) {
        Ok(outcome) => outcome,
        Err(e) => {
            print_complexity_error(&e);
            std::process::exit(2);
        }
    };

    for warning in &outcome.warnings {
        match (warning.osm_type, warning.osm_id) {
            (Some(osm_type), Some(id)) => eprintln!(
                "{} {} ({osm_type:?} {id})",
                "Warning:".yellow().bold(),
                warning.message
            ),
            _ => eprintln!("{} {}", "Warning:".yellow().bold(), warning.message),
        }
    }

    if args.debug {
        if let Some(bounds) = Bounds::aggregate(outcome.geometries.iter().map(|g| g.bounds)) {
            println!(
                "Covered area: {:.6} x {:.6} degrees",
                bounds.width, bounds.height
            );
        }
    }

    // Write result
    println!("{} Writing GeoJSON...", "[3/3]".bold());
    let collection = to_feature_collection(&outcome);
    let rendered = serde_json::to_string_pretty(&collection)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            println!(
                "Wrote {} geometries to {}",
                outcome.geometries.len(),
                path.display()
            );
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn print_complexity_error(error: &ComplexityError) {
    eprintln!("{} {}", "Error:".red().bold(), error.message);
    eprintln!(
        "{} node(s) exceed the limit of {} connected ways:",
        error.details.complex_node_count, error.details.threshold
    );
    for node in &error.details.top_complex_nodes {
        eprintln!(
            "  [{:.7}, {:.7}] touched by {} ways: {:?}",
            node.coords[0], node.coords[1], node.connection_count, node.way_ids
        );
    }
    eprintln!("{}", error.details.suggestion.yellow());
}
