//! Simulation capacities and timing, loadable from JSON.
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_TILE_SIZE, MAX_FRAME_DELTA};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid simulation config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fixed budgets for every container the simulation preallocates.
///
/// Missing JSON fields fall back to [`SimulationConfig::default`].
///
/// # Examples
///
/// ```
/// use ledge::SimulationConfig;
///
/// let config = SimulationConfig::from_json_str(r#"{ "max_game_objects": 16 }"#)?;
/// assert_eq!(config.max_game_objects, 16);
/// assert_eq!(config.max_components_per_object, SimulationConfig::default().max_components_per_object);
/// # Ok::<(), ledge::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_game_objects: usize,
    pub max_components_per_object: usize,
    pub max_collision_records: usize,
    /// Attack and vulnerability volumes kept per registration, each.
    pub max_volumes_per_record: usize,
    pub max_temporary_surfaces: usize,
    pub render_queue_capacity: usize,
    pub max_spawn_requests: usize,
    pub max_destroy_requests: usize,
    /// Edge length of a background tile in world units.
    pub tile_size: f32,
    /// Upper bound on the time step fed to the simulation, in seconds.
    pub max_frame_delta: f32,
    /// Frame period the game thread aims for, in seconds.
    pub target_frame_time: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_game_objects: 384,
            max_components_per_object: 16,
            max_collision_records: 256,
            max_volumes_per_record: 8,
            max_temporary_surfaces: 128,
            render_queue_capacity: 512,
            max_spawn_requests: 32,
            max_destroy_requests: 64,
            tile_size: DEFAULT_TILE_SIZE,
            max_frame_delta: MAX_FRAME_DELTA,
            target_frame_time: 1.0 / 60.0,
        }
    }
}

impl SimulationConfig {
    /// Parses a config from JSON text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON or mistyped fields.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the JSON config at `path`.
    ///
    /// # Errors
    /// Fails when the file cannot be read or does not parse.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Square tile extent as a vector.
    #[must_use]
    pub const fn tile_extent(&self) -> Vec2 {
        Vec2::splat(self.tile_size)
    }
}
