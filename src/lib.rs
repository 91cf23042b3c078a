//! Normalizes raw OpenStreetMap elements (Overpass API style) into
//! renderable geometric features.
//!
//! The core is [`parse_elements`]: it classifies raw way/relation elements,
//! merges fragmented way segments into closed rings or continuous paths,
//! assembles multipolygons, groups connected ways into components and guards
//! against pathologically dense inputs. Fetching elements and rendering the
//! output are the surrounding application's job; see `main.rs` for the
//! bundled CLI.

pub mod area_classifier;
pub mod args;
pub mod bounds;
pub mod coalesce;
pub mod element_pipeline;
pub mod geojson;
pub mod geometry;
pub mod osm_parser;
pub mod relation_parser;
pub mod retrieve_data;
pub mod ring_merger;

pub use bounds::Bounds;
pub use coalesce::complexity::ComplexityError;
pub use element_pipeline::{parse_elements, ParseOptions, ParseOutcome};
pub use geometry::{Geometry, GeometryId, NormalizedGeometry, SourceKind, Warning};
