use crate::geometry::Coord;
use serde::Serialize;

/// Axis-aligned bounding box of a set of `[lon, lat]` coordinates.
///
/// Always derived from coordinates, never constructed from free values, so
/// `width`/`height` stay consistent with the min/max fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Computes the exact bounding box of a coordinate sequence.
    /// Errors on empty input; a bound of nothing is meaningless.
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Result<Self, String> {
        let mut iter = coords.into_iter();
        let Some(first) = iter.next() else {
            return Err("Cannot calculate bounds of empty coordinates".to_string());
        };

        let mut min_lon = first[0];
        let mut max_lon = first[0];
        let mut min_lat = first[1];
        let mut max_lat = first[1];

        for &[lon, lat] in iter {
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
        }

        Ok(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            width: max_lon - min_lon,
            height: max_lat - min_lat,
        })
    }

    /// Smallest bounds covering both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let min_lat = self.min_lat.min(other.min_lat);
        let max_lat = self.max_lat.max(other.max_lat);
        let min_lon = self.min_lon.min(other.min_lon);
        let max_lon = self.max_lon.max(other.max_lon);
        Bounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            width: max_lon - min_lon,
            height: max_lat - min_lat,
        }
    }

    /// Aggregates bounds across a geometry set. `None` for an empty set.
    pub fn aggregate(all: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
        all.into_iter().reduce(|acc, b| acc.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_coordinate() {
        let bounds = Bounds::from_coords(&[[9.93, 54.63]]).unwrap();
        assert_eq!(bounds.min_lon, 9.93);
        assert_eq!(bounds.max_lon, 9.93);
        assert_eq!(bounds.width, 0.0);
        assert_eq!(bounds.height, 0.0);
    }

    #[test]
    fn test_spread_coordinates() {
        // Arnis, Germany
        let coords = [[9.927928, 54.627053], [9.937563, 54.634902]];
        let bounds = Bounds::from_coords(&coords).unwrap();
        assert_eq!(bounds.min_lat, 54.627053);
        assert_eq!(bounds.max_lat, 54.634902);
        assert!((bounds.width - 0.009635).abs() < 1e-12);
        assert!((bounds.height - 0.007849).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(Bounds::from_coords(&[]).is_err());
    }

    #[test]
    fn test_negative_coordinates() {
        // Santa Monica, Los Angeles, US
        let coords = [[-118.51226, 34.00348], [-118.47600, 34.02033]];
        let bounds = Bounds::from_coords(&coords).unwrap();
        assert_eq!(bounds.min_lon, -118.51226);
        assert_eq!(bounds.max_lon, -118.47600);
        assert!(bounds.width > 0.0);
    }

    #[test]
    fn test_union_and_aggregate() {
        let a = Bounds::from_coords(&[[0.0, 0.0], [1.0, 1.0]]).unwrap();
        let b = Bounds::from_coords(&[[2.0, -1.0], [3.0, 0.5]]).unwrap();

        let merged = a.union(&b);
        assert_eq!(merged.min_lon, 0.0);
        assert_eq!(merged.max_lon, 3.0);
        assert_eq!(merged.min_lat, -1.0);
        assert_eq!(merged.max_lat, 1.0);
        assert_eq!(merged.width, 3.0);
        assert_eq!(merged.height, 2.0);

        assert_eq!(Bounds::aggregate([a, b]), Some(merged));
        assert_eq!(Bounds::aggregate(Vec::new()), None);
    }
}
