use std::sync::{Arc, Mutex, MutexGuard};

use crate::cluster::MoodCluster;

/// What the map view shows. `generation` identifies the newest clustering request.
#[derive(Debug, Default)]
pub struct State {
    pub processing: bool,
    pub generation: u64,
    pub clusters: Option<Vec<MoodCluster>>,
}

pub type SharedState = Arc<Mutex<State>>;

pub fn shared_state() -> SharedState {
    Arc::new(Mutex::new(State::default()))
}

pub fn lock(state: &SharedState) -> MutexGuard<'_, State> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
