//! Normalized highlight regions.

use serde::{Deserialize, Serialize};

/// One highlighted quadrilateral in normalized page space (0.0–1.0 per axis).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// A decoded highlight: the page it belongs to and its quads.
///
/// The coordinate list is kept flat in the same order the viewer's
/// active-selection representation uses; its length is always a multiple of
/// four. A region with no quads is valid but draws nothing.
///
/// Deserializing goes through [`RegionDescriptor::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRegion")]
pub struct RegionDescriptor {
    page: u32,
    coordinates: Vec<f64>,
}

#[derive(Deserialize)]
struct RawRegion {
    page: u32,
    coordinates: Vec<f64>,
}

impl TryFrom<RawRegion> for RegionDescriptor {
    type Error = String;

    fn try_from(raw: RawRegion) -> Result<Self, Self::Error> {
        let count = raw.coordinates.len();
        Self::new(raw.page, raw.coordinates).ok_or_else(|| {
            format!(
                "invalid region: page {}, {} coordinates (need page >= 1, finite values in groups of 4)",
                raw.page, count
            )
        })
    }
}

impl RegionDescriptor {
    /// Build a region, returning `None` if `page` is zero, the coordinate
    /// count is not a multiple of four, or a coordinate is NaN or infinite.
    pub fn new(page: u32, coordinates: Vec<f64>) -> Option<Self> {
        if page == 0 || coordinates.len() % 4 != 0 {
            return None;
        }
        if !coordinates.iter().all(|c| c.is_finite()) {
            return None;
        }
        Some(Self { page, coordinates })
    }

    /// 1-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn quad_count(&self) -> usize {
        self.coordinates.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        self.coordinates.chunks_exact(4).map(|c| Quad {
            x1: c[0],
            y1: c[1],
            x2: c[2],
            y2: c[3],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_page_and_partial_quads() {
        assert!(RegionDescriptor::new(0, vec![]).is_none());
        assert!(RegionDescriptor::new(1, vec![0.1, 0.2, 0.3]).is_none());
        assert!(RegionDescriptor::new(1, vec![]).is_some());
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        assert!(RegionDescriptor::new(1, vec![f64::NAN, 0.1, 0.2, 0.3]).is_none());
        assert!(RegionDescriptor::new(1, vec![0.1, f64::INFINITY, 0.2, 0.3]).is_none());
        assert!(RegionDescriptor::new(1, vec![0.1, 0.2, 0.3, f64::NEG_INFINITY]).is_none());
    }

    #[test]
    fn deserialize_checks_invariants() {
        let ok: RegionDescriptor =
            serde_json::from_str(r#"{"page":2,"coordinates":[0.1,0.2,0.3,0.4]}"#).unwrap();
        assert_eq!(ok, RegionDescriptor::new(2, vec![0.1, 0.2, 0.3, 0.4]).unwrap());

        for bad in [
            r#"{"page":0,"coordinates":[]}"#,
            r#"{"page":1,"coordinates":[0.1,0.2,0.3]}"#,
            r#"{"page":0,"coordinates":[0.1,0.2,0.3]}"#,
        ] {
            assert!(
                serde_json::from_str::<RegionDescriptor>(bad).is_err(),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn serialize_round_trips_through_validation() {
        let r = RegionDescriptor::new(7, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(serde_json::from_str::<RegionDescriptor>(&json).unwrap(), r);
    }

    #[test]
    fn quads_group_by_four() {
        let r = RegionDescriptor::new(3, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]).unwrap();
        let quads: Vec<Quad> = r.quads().collect();
        assert_eq!(r.quad_count(), 2);
        assert_eq!(quads[1], Quad { x1: 0.5, y1: 0.6, x2: 0.7, y2: 0.8 });
    }
}
