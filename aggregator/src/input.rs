//! Snapshot file loading

use ampere_shared::types::profile::ComponentKind;
use ampere_shared::types::snapshot::ComponentActivity;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::error::{LoadError, Result};

/// Load the activity of a single component from a JSON file.
pub fn load_activity(path: &Path) -> Result<ComponentActivity> {
    let activity: ComponentActivity = read_json(path)?;
    info!(
        "Loaded {} consumer snapshots from {}",
        activity.consumers.len(),
        path.display()
    );
    Ok(activity)
}

/// Load activities for several components, keyed by component name.
pub fn load_activities(path: &Path) -> Result<BTreeMap<ComponentKind, ComponentActivity>> {
    let activities: BTreeMap<ComponentKind, ComponentActivity> = read_json(path)?;
    info!(
        "Loaded activity for {} components from {}",
        activities.len(),
        path.display()
    );
    Ok(activities)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
