use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// A checked query bounding box in `min_lat,min_lng,max_lat,max_lng` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryBBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl QueryBBox {
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Result<Self, String> {
        if !(min_lat < max_lat && min_lng < max_lng) {
            return Err("Invalid bounding box: min values must be below max values".to_string());
        }
        if !(-90.0..=90.0).contains(&min_lat) || !(-90.0..=90.0).contains(&max_lat) {
            return Err("Latitude out of range [-90, 90]".to_string());
        }
        if !(-180.0..=180.0).contains(&min_lng) || !(-180.0..=180.0).contains(&max_lng) {
            return Err("Longitude out of range [-180, 180]".to_string());
        }
        Ok(Self {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        })
    }

    /// Parses `"min_lat,min_lng,max_lat,max_lng"` (comma or space separated).
    pub fn from_str(s: &str) -> Result<Self, String> {
        let values: Vec<f64> = s
            .split([',', ' '])
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid coordinate \"{part}\""))
            })
            .collect::<Result<_, _>>()?;

        let [min_lat, min_lng, max_lat, max_lng]: [f64; 4] = values
            .try_into()
            .map_err(|_| "Expected exactly four comma-separated values".to_string())?;

        Self::new(min_lat, min_lng, max_lat, max_lng)
    }
}

/// Command-line arguments parser
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["bbox", "file"])))]
pub struct Args {
    /// Bounding box of the area (min_lat,min_lng,max_lat,max_lng)
    #[arg(long, allow_hyphen_values = true, value_parser = QueryBBox::from_str)]
    pub bbox: Option<QueryBBox>,

    /// JSON file containing a pre-downloaded Overpass response (optional)
    #[arg(long)]
    pub file: Option<String>,

    /// Custom Overpass QL query to run instead of the generated one (optional)
    #[arg(long)]
    pub query: Option<String>,

    /// Partition open ways by this tag before merging; disables the
    /// network-density guard (optional)
    #[arg(long)]
    pub group_by_tag: Option<String>,

    /// Write the GeoJSON FeatureCollection here instead of stdout (optional)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Overpass request timeout in seconds (optional)
    #[arg(long, default_value = "180", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Enable debug mode (optional)
    #[arg(long)]
    pub debug: bool,
}

fn parse_duration(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let seconds = arg.parse()?;
    Ok(Duration::from_secs(seconds))
}
