pub mod cluster;
pub mod config;
pub mod data;
pub mod geo;
pub mod journal;
pub mod marker;
pub mod mood;
pub mod observation;
pub mod param;
pub mod processing;
pub mod result;
pub mod session;
pub mod state;
pub mod sync;

pub use cluster::{cluster, dominant_mood, filter_by_mood, MoodCluster};
pub use journal::Journal;
pub use marker::{markers, MapMarker};
pub use observation::MoodObservation;
pub use param::ClusterParams;
pub use result::{Error, Result};
pub use session::Session;
