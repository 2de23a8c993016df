//! Per-simulation services handed to every component update.
use glam::Vec2;
use log::warn;

use crate::camera::Camera;
use crate::collision::GameObjectCollisionSystem;
use crate::config::SimulationConfig;
use crate::factory::SpawnKind;
use crate::fixed_array::{CapacityError, FixedSizeArray};
use crate::game_object::GameObjectId;
use crate::render::RenderSystem;
use crate::time::TimeSystem;
use crate::world::{CollisionSystem, LevelSystem};

/// An object components want created after the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub kind: SpawnKind,
    pub position: Vec2,
    pub flip_horizontal: bool,
}

/// Spawn and destroy requests raised while objects update.
///
/// Both queues are drained by the simulation once the phase passes finish,
/// so nothing is created or released mid-pass.
#[derive(Debug)]
pub struct LifecycleRequests {
    spawns: FixedSizeArray<SpawnRequest>,
    destroys: FixedSizeArray<GameObjectId>,
}

impl LifecycleRequests {
    #[must_use]
    pub fn new(max_spawns: usize, max_destroys: usize) -> Self {
        Self {
            spawns: FixedSizeArray::new(max_spawns),
            destroys: FixedSizeArray::new(max_destroys),
        }
    }

    /// Queues a spawn.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the spawn queue is full.
    pub fn request_spawn(&mut self, request: SpawnRequest) -> Result<(), CapacityError> {
        self.spawns.add(request)
    }

    /// Queues `object` for destruction; repeated requests collapse to one.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the destroy queue is full.
    pub fn request_destroy(&mut self, object: GameObjectId) -> Result<(), CapacityError> {
        if self.destroys.find(&object, true).is_some() {
            return Ok(());
        }
        self.destroys.add(object).inspect_err(|_| {
            warn!("destroy queue full; {object:?} survives this frame");
        })
    }

    pub fn drain_spawns(&mut self) -> std::vec::Drain<'_, SpawnRequest> {
        self.spawns.drain()
    }

    pub fn drain_destroys(&mut self) -> std::vec::Drain<'_, GameObjectId> {
        self.destroys.drain()
    }

    #[must_use]
    pub fn pending_spawns(&self) -> &[SpawnRequest] {
        self.spawns.as_slice()
    }

    #[must_use]
    pub fn pending_destroys(&self) -> &[GameObjectId] {
        self.destroys.as_slice()
    }
}

/// Services shared by all game objects for one simulation.
///
/// Optional collaborators are `None` until installed; components skip the
/// work that needs them.
#[derive(Debug)]
pub struct SimContext {
    pub time: TimeSystem,
    pub background: Option<CollisionSystem>,
    pub collision: GameObjectCollisionSystem,
    pub camera: Option<Box<dyn Camera>>,
    pub level: Option<Box<dyn LevelSystem>>,
    pub render: Option<RenderSystem>,
    pub lifecycle: LifecycleRequests,
}

impl SimContext {
    /// A context sized by `config`, with no optional collaborators.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            time: TimeSystem::new(),
            background: None,
            collision: GameObjectCollisionSystem::new(
                config.max_collision_records,
                config.max_volumes_per_record,
            ),
            camera: None,
            level: None,
            render: None,
            lifecycle: LifecycleRequests::new(config.max_spawn_requests, config.max_destroy_requests),
        }
    }

    /// Camera focus, when a camera is installed.
    #[must_use]
    pub fn camera_focus(&self) -> Option<Vec2> {
        self.camera.as_ref().map(|camera| camera.focus())
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FixedCamera;
    use rstest::rstest;

    #[rstest]
    fn duplicate_destroys_collapse() {
        let mut requests = LifecycleRequests::new(1, 2);
        let id = GameObjectId::from_raw(3, 1);
        requests.request_destroy(id).expect("room");
        requests.request_destroy(id).expect("duplicate is accepted");
        assert_eq!(requests.pending_destroys(), &[id]);
        assert_eq!(requests.drain_destroys().count(), 1);
        assert!(requests.pending_destroys().is_empty());
    }

    #[rstest]
    fn full_spawn_queue_rejects() {
        let mut requests = LifecycleRequests::new(1, 1);
        let request = SpawnRequest {
            kind: SpawnKind(1),
            position: Vec2::ZERO,
            flip_horizontal: false,
        };
        assert!(requests.request_spawn(request).is_ok());
        assert!(requests.request_spawn(request).is_err());
    }

    #[rstest]
    fn focus_follows_installed_camera() {
        let mut ctx = SimContext::default();
        assert_eq!(ctx.camera_focus(), None);
        ctx.camera = Some(Box::new(FixedCamera::new(Vec2::new(4.0, 2.0), Vec2::splat(10.0))));
        assert_eq!(ctx.camera_focus(), Some(Vec2::new(4.0, 2.0)));
    }
}
