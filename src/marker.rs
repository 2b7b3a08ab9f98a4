use serde::Serialize;

use crate::cluster::MoodCluster;
use crate::mood::{Mood, RgbColor};
use crate::observation::MoodObservation;

/// What the map view needs to draw one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub mood: Mood,
    pub color: RgbColor,
    pub emoji: &'static str,
    pub count: usize,
    pub label: String,
    /// Newest first.
    pub members: Vec<MoodObservation>,
}

impl MapMarker {
    pub fn from_cluster(cluster: &MoodCluster) -> Self {
        let mood = Mood::from_label(&cluster.dominant_mood);
        let count = cluster.members.len();

        let label = if cluster.is_singleton() {
            mood.emoji().to_string()
        } else {
            count.to_string()
        };

        let mut members = cluster.members.clone();
        members.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Self {
            latitude: cluster.latitude,
            longitude: cluster.longitude,
            mood,
            color: mood.color(),
            emoji: mood.emoji(),
            count,
            label,
            members,
        }
    }
}

pub fn markers(clusters: &[MoodCluster]) -> Vec<MapMarker> {
    clusters.iter().map(MapMarker::from_cluster).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::cluster;
    use crate::param::ClusterParams;

    fn observations() -> Vec<MoodObservation> {
        let mut observations = (0..5)
            .map(|i| {
                MoodObservation::new(
                    format!("park-{}", i),
                    "anxious",
                    52.52 + i as f64 * 0.00001,
                    13.405,
                    1_700_000_000_000 + (i * 37 % 5) * 1000,
                )
            })
            .collect::<Vec<_>>();
        observations.push(MoodObservation::new("home", "Happy", 48.1, 11.6, 1_700_000_000_000));
        observations
    }

    #[test]
    fn cluster_marker_shows_count_and_newest_first() {
        let clusters = cluster(&observations(), &ClusterParams::default()).unwrap();
        let markers = markers(&clusters);

        assert_eq!(markers.len(), 2);

        let park = &markers[0];
        assert_eq!(park.count, 5);
        assert_eq!(park.label, "5");
        assert_eq!(park.mood, Mood::Stressed);
        assert_eq!(park.color, Mood::Stressed.color());
        assert!(park
            .members
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }

    #[test]
    fn singleton_marker_shows_emoji() {
        let clusters = cluster(&observations(), &ClusterParams::default()).unwrap();
        let home = MapMarker::from_cluster(&clusters[1]);

        assert_eq!(home.count, 1);
        assert_eq!(home.mood, Mood::Happy);
        assert_eq!(home.label, Mood::Happy.emoji());
        assert_eq!(home.latitude, 48.1);
    }
}
