//! Status snapshot output

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Where the final snapshot is written on shutdown (and after every
    /// tick, when set)
    pub snapshot_path: Option<PathBuf>,
}
