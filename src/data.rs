use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::journal::{located, read_snapshot};
use crate::observation::MoodObservation;
use crate::result::Result;

/// Reads every observation from a JSON array or, for `.bin` files, a journal snapshot.
pub fn read_observations(path: impl AsRef<Path>) -> Result<Vec<MoodObservation>> {
    let path = path.as_ref();

    if path.extension().map_or(false, |ext| ext == "bin") {
        read_snapshot(path)
    } else {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str::<Vec<MoodObservation>>(&contents)?)
    }
}

/// Like `read_observations`, but drops entries without a usable location.
pub fn load_observations(path: impl AsRef<Path>) -> Result<Vec<MoodObservation>> {
    let path = path.as_ref();
    let load_start = Instant::now();

    let all = read_observations(path)?;
    let observations = located(&all);
    info!(
        total = all.len(),
        located = observations.len(),
        load_ms = load_start.elapsed().as_millis() as u64,
        "Loaded observations from {}.",
        path.display()
    );

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::Journal;
    use std::sync::Arc;

    #[test]
    fn reads_json_and_drops_unlocated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moods.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "1", "mood": "happy", "latitude": 41.6, "longitude": -93.6,
                 "timestamp": 1},
                {"id": "2", "mood": "sad", "latitude": 0.0, "longitude": 0.0,
                 "timestamp": 2, "note": "indoors"}
            ]"#,
        )
        .unwrap();

        let observations = load_observations(&path).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].id, "1");
        assert_eq!(observations[0].note, None);
    }

    #[test]
    fn reads_journal_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");

        let mut journal = Journal::new(Arc::new(Session::anonymous()), None);
        let lake = crate::geo::Coordinate::new(1.0, 2.0);
        journal.record("calm", Some(lake), Some("lake".to_string()), Some(5));
        journal.record("tired", None, None, Some(6));
        journal.save_snapshot(&path).unwrap();

        let observations = load_observations(&path).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].note.as_deref(), Some("lake"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moods.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            load_observations(&path),
            Err(crate::result::Error::JSONError(_))
        ));
    }
}
