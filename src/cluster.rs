use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::mood::NEUTRAL_MOOD;
use crate::observation::MoodObservation;
use crate::param::ClusterParams;
use crate::result::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodCluster {
    pub latitude: f64,
    pub longitude: f64,
    pub members: Vec<MoodObservation>,
    pub dominant_mood: String,
}

impl MoodCluster {
    fn from_members(members: Vec<MoodObservation>) -> Self {
        let count = members.len() as f64;
        let latitude = members.iter().map(|m| m.latitude).sum::<f64>() / count;
        let longitude = members.iter().map(|m| m.longitude).sum::<f64>() / count;
        let dominant_mood = dominant_mood(&members);

        Self {
            latitude,
            longitude,
            members,
            dominant_mood,
        }
    }

    fn singleton(observation: MoodObservation) -> Self {
        Self {
            latitude: observation.latitude,
            longitude: observation.longitude,
            dominant_mood: observation.mood.clone(),
            members: vec![observation],
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// Groups observations around fixed anchors.
///
/// Observations are visited in input order. Each unprocessed observation becomes an
/// anchor, and every unprocessed observation within `radius_km` of that anchor (the
/// anchor included) is a candidate. Neighbours of candidates are not followed. When at
/// least `min_members` candidates are found they form one cluster, otherwise the anchor
/// alone is emitted as a singleton and the other candidates stay available.
///
/// Runs in O(n²): every anchor rescans the whole input. This is fine for a single
/// user's journal but is the limit for larger data sets. A spatial index would change
/// which observations become anchors and therefore the output.
///
/// Input coordinates are expected to be real fixes; `(0.0, 0.0)` entries must be
/// removed by the caller.
pub fn cluster(
    observations: &[MoodObservation],
    params: &ClusterParams,
) -> Result<Vec<MoodCluster>> {
    params.validate()?;

    if let Some(bad) = observations
        .iter()
        .find(|o| !o.latitude.is_finite() || !o.longitude.is_finite())
    {
        return Err(Error::invalid(format!(
            "observation {} has a non-finite coordinate ({}, {})",
            bad.id, bad.latitude, bad.longitude
        )));
    }

    let mut processed: HashSet<&str> = HashSet::new();
    let mut clusters = Vec::new();

    for anchor in observations {
        if processed.contains(anchor.id.as_str()) {
            continue;
        }

        let origin = anchor.coordinate();
        let mut seen: HashSet<&str> = HashSet::new();
        let neighbors = observations
            .iter()
            .filter(|candidate| !processed.contains(candidate.id.as_str()))
            .filter(|candidate| origin.distance_km(&candidate.coordinate()) <= params.radius_km)
            .filter(|candidate| seen.insert(candidate.id.as_str()))
            .collect::<Vec<_>>();

        if neighbors.len() >= params.min_members {
            processed.extend(neighbors.iter().copied().map(|n| n.id.as_str()));
            clusters.push(MoodCluster::from_members(
                neighbors.into_iter().cloned().collect(),
            ));
        } else {
            processed.insert(anchor.id.as_str());
            clusters.push(MoodCluster::singleton(anchor.clone()));
        }
    }

    Ok(clusters)
}

/// Re-clusters from scratch over the observations matching `mood` (case-insensitive).
/// `None` clusters everything.
pub fn filter_by_mood(
    observations: &[MoodObservation],
    mood: Option<&str>,
    params: &ClusterParams,
) -> Result<Vec<MoodCluster>> {
    match mood {
        None => cluster(observations, params),
        Some(mood) => {
            let wanted = mood.to_lowercase();
            let filtered = observations
                .iter()
                .filter(|o| o.mood.to_lowercase() == wanted)
                .cloned()
                .collect::<Vec<_>>();
            cluster(&filtered, params)
        }
    }
}

/// Most frequent mood among `members`. Ties go to the label seen first.
pub fn dominant_mood(members: &[MoodObservation]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for member in members {
        match counts.iter_mut().find(|(mood, _)| *mood == member.mood) {
            Some((_, count)) => *count += 1,
            None => counts.push((member.mood.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (mood, count) in counts {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((mood, count)),
        }
    }

    best.map_or_else(|| NEUTRAL_MOOD.to_string(), |(mood, _)| mood.to_string())
}
