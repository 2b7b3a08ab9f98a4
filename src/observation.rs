use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// One geotagged mood record as fed to the clusterer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodObservation {
    pub id: String,
    pub mood: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Epoch milliseconds. Only used for display ordering.
    pub timestamp: i64,
    #[serde(default)]
    pub note: Option<String>,
}

impl MoodObservation {
    pub fn new(
        id: impl Into<String>,
        mood: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            mood: mood.into(),
            latitude,
            longitude,
            timestamp,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
