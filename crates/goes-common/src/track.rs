//! Flight track overlays.

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// An ordered path of longitude/latitude samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrack")]
pub struct FlightTrack {
    lons: Vec<f64>,
    lats: Vec<f64>,
}

#[derive(Deserialize)]
struct RawTrack {
    lons: Vec<f64>,
    lats: Vec<f64>,
}

impl TryFrom<RawTrack> for FlightTrack {
    type Error = FieldError;

    fn try_from(raw: RawTrack) -> Result<Self, Self::Error> {
        FlightTrack::new(raw.lons, raw.lats)
    }
}

impl FlightTrack {
    /// Pair up longitudes and latitudes; both must have the same length.
    pub fn new(lons: Vec<f64>, lats: Vec<f64>) -> FieldResult<Self> {
        if lons.len() != lats.len() {
            return Err(FieldError::TrackLengthMismatch {
                lons: lons.len(),
                lats: lats.len(),
            });
        }
        Ok(Self { lons, lats })
    }

    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (lons, lats) = points.into_iter().unzip();
        Self { lons, lats }
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn len(&self) -> usize {
        self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    /// `(lon, lat)` pairs in track order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lons.iter().copied().zip(self.lats.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_requires_equal_lengths() {
        assert!(FlightTrack::new(vec![-80.0, -79.0], vec![-1.0]).is_err());
        let track = FlightTrack::new(vec![-80.0, -79.0], vec![-1.0, 0.0]).unwrap();
        assert_eq!(track.points().collect::<Vec<_>>(), vec![(-80.0, -1.0), (-79.0, 0.0)]);
    }

    #[test]
    fn test_track_deserialize_validates() {
        let ok: FlightTrack =
            serde_json::from_str(r#"{"lons": [-80.0, -79.5], "lats": [-0.2, 0.1]}"#).unwrap();
        assert_eq!(ok.len(), 2);

        let bad: Result<FlightTrack, _> =
            serde_json::from_str(r#"{"lons": [-80.0], "lats": [-0.2, 0.1]}"#);
        assert!(bad.is_err());
    }
}
