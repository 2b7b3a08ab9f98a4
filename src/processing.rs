use std::time::Instant;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::cluster::{filter_by_mood, MoodCluster};
use crate::observation::MoodObservation;
use crate::param::ClusterParams;
use crate::result::{Error, Result};
use crate::state::{lock, SharedState};

/// Marks a new clustering request as the current one and returns its generation.
pub fn begin_request(state: &SharedState) -> u64 {
    let mut state = lock(state);
    state.generation += 1;
    state.processing = true;
    state.generation
}

/// Clusters on the blocking pool and replaces the displayed clusters in one step.
/// Resolves to `false` when a newer request was started in the meantime and the
/// result was thrown away.
pub fn cluster_in_background(
    observations: Vec<MoodObservation>,
    params: ClusterParams,
    mood: Option<String>,
    state: SharedState,
) -> JoinHandle<Result<bool>> {
    let generation = begin_request(&state);

    tokio::spawn(async move {
        let start = Instant::now();
        let count = observations.len();

        info!(generation, observations = count, "Clustering observations...");
        let joined = tokio::task::spawn_blocking(move || {
            filter_by_mood(&observations, mood.as_deref(), &params)
        })
        .await;

        debug!(
            generation,
            observations = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Clustering finished."
        );

        publish(&state, generation, joined_outcome(joined))
    })
}

/// A panicked clustering task is reported like any other failure so that
/// `publish` still settles the request.
fn joined_outcome(
    joined: std::result::Result<Result<Vec<MoodCluster>>, JoinError>,
) -> Result<Vec<MoodCluster>> {
    joined.map_err(Error::from).and_then(|outcome| outcome)
}

/// Fire-and-forget variant for callers that only watch the shared state.
pub fn do_cluster_and_publish(
    observations: Vec<MoodObservation>,
    params: ClusterParams,
    mood: Option<String>,
    state: SharedState,
) {
    let handle = cluster_in_background(observations, params, mood, state);
    tokio::spawn(async move {
        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => error!(error = %err, "Clustering failed."),
            Err(err) => error!(error = %err, "Clustering task panicked."),
        }
    });
}

pub fn publish(
    state: &SharedState,
    generation: u64,
    outcome: Result<Vec<MoodCluster>>,
) -> Result<bool> {
    let mut state = lock(state);

    if state.generation != generation {
        debug!(
            generation,
            current = state.generation,
            "Discarding superseded clustering result."
        );
        return Ok(false);
    }

    state.processing = false;
    let clusters = outcome?;
    info!(generation, clusters = clusters.len(), "Published clusters.");
    state.clusters = Some(clusters);

    Ok(true)
}
