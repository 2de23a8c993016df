//! Builds game objects from logical type tags.
use glam::Vec2;
use hashbrown::HashMap;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::fixed_array::CapacityError;
use crate::game_object::{GameObject, GameObjectId, GameObjectManager, GameObjectState};

/// Logical object type, as stored in level spawn layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnKind(pub u16);

/// Creates and activates objects on request.
pub trait GameObjectFactory: Send + std::fmt::Debug {
    /// Allocates an object of `kind` at `position` and queues it for
    /// activation. Returns `None` when the kind is unknown or the pool is
    /// exhausted.
    fn spawn(
        &mut self,
        kind: SpawnKind,
        position: Vec2,
        flip_horizontal: bool,
        objects: &mut GameObjectManager,
    ) -> Option<GameObjectId>;
}

/// Fills in a freshly allocated object: its state and its components.
pub type Blueprint = fn(&mut GameObject) -> Result<(), CapacityError>;

/// A factory driven by a table of [`Blueprint`]s.
///
/// # Examples
///
/// ```
/// use glam::Vec2;
/// use ledge::factory::{BlueprintFactory, GameObjectFactory, SpawnKind};
/// use ledge::game_object::{GameObject, GameObjectManager};
///
/// fn crate_box(object: &mut GameObject) -> Result<(), ledge::CapacityError> {
///     object.state_mut().width = 32.0;
///     Ok(())
/// }
///
/// let mut factory = BlueprintFactory::default();
/// factory.register(SpawnKind(7), crate_box);
/// let mut objects = GameObjectManager::new(4, 4);
/// let id = factory.spawn(SpawnKind(7), Vec2::new(64.0, 0.0), false, &mut objects);
/// assert!(id.is_some());
/// assert!(factory.spawn(SpawnKind(8), Vec2::ZERO, false, &mut objects).is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct BlueprintFactory {
    blueprints: HashMap<SpawnKind, Blueprint>,
    /// State each kind's blueprint produced, applied to reused objects.
    templates: HashMap<SpawnKind, GameObjectState>,
}

impl BlueprintFactory {
    /// Associates `blueprint` with `kind`, replacing any earlier entry.
    pub fn register(&mut self, kind: SpawnKind, blueprint: Blueprint) {
        if self.blueprints.insert(kind, blueprint).is_some() {
            self.templates.remove(&kind);
            debug!("blueprint for {kind:?} replaced");
        }
    }

    /// Whether `kind` has a blueprint.
    #[must_use]
    pub fn contains(&self, kind: SpawnKind) -> bool {
        self.blueprints.contains_key(&kind)
    }

    /// Number of registered blueprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    /// Whether no blueprint is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Runs `blueprint` on the freshly allocated `id` and remembers the
    /// state it produced, so later objects of `kind` built from stocked
    /// components start out the same.
    fn build(
        &mut self,
        kind: SpawnKind,
        blueprint: Blueprint,
        id: GameObjectId,
        objects: &mut GameObjectManager,
        place: impl Fn(&mut GameObjectState),
    ) -> Result<(), CapacityError> {
        let Some(object) = objects.get_mut(id) else {
            return Ok(());
        };
        place(object.state_mut());
        blueprint(object)?;
        self.templates.insert(kind, *object.state());
        Ok(())
    }
}

impl GameObjectFactory for BlueprintFactory {
    fn spawn(
        &mut self,
        kind: SpawnKind,
        position: Vec2,
        flip_horizontal: bool,
        objects: &mut GameObjectManager,
    ) -> Option<GameObjectId> {
        let Some(blueprint) = self.blueprints.get(&kind).copied() else {
            warn!("no blueprint for {kind:?}");
            return None;
        };
        let id = objects.allocate()?;
        let place = |state: &mut GameObjectState| {
            state.position = position;
            state.facing = if flip_horizontal { Vec2::NEG_X } else { Vec2::X };
            state.spawn_kind = Some(kind);
        };
        let reused = match self.templates.get(&kind) {
            Some(template) => objects.reuse_components(id, kind, template),
            None => Ok(false),
        };
        let built = match reused {
            Ok(true) => {
                if let Some(object) = objects.get_mut(id) {
                    place(object.state_mut());
                }
                trace!("{kind:?} rebuilt from stocked components");
                Ok(())
            }
            Ok(false) => self.build(kind, blueprint, id, objects, place),
            Err(error) => Err(error),
        };
        if let Err(error) = built {
            warn!("{kind:?} blueprint failed: {error}");
            objects.discard(id);
            return None;
        }
        if let Err(error) = objects.add(id) {
            warn!("{kind:?} not activated: {error}");
            objects.discard(id);
            return None;
        }
        debug!("spawned {kind:?} as {id:?} at {position}");
        Some(id)
    }
}
