//! One frame of the game, end to end.
//!
//! A [`Simulation`] owns the objects and the services they share. Each
//! [`Simulation::step`] advances the clocks, runs every phase over the
//! active objects, resolves hits between them, applies the lifecycle
//! requests raised along the way and publishes the frame's draw calls.

use std::sync::Arc;

use glam::Vec2;
use log::{debug, info, warn};

use crate::camera::Camera;
use crate::config::SimulationConfig;
use crate::context::SimContext;
use crate::factory::{GameObjectFactory, SpawnKind};
use crate::game_object::{GameObjectId, GameObjectManager};
use crate::render::{FrameExchange, RenderSystem};
use crate::world::{CollisionSystem, CollisionTileSet, Level, LevelSystem};

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Game time that elapsed; zero while time is frozen.
    pub game_delta: f32,
    /// Attack-vulnerability overlaps found.
    pub hits: usize,
    pub spawned: usize,
    pub active_objects: usize,
}

#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    objects: GameObjectManager,
    ctx: SimContext,
    factory: Option<Box<dyn GameObjectFactory>>,
    frame: u64,
}

impl Simulation {
    /// An empty simulation sized by `config`.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let objects =
            GameObjectManager::new(config.max_game_objects, config.max_components_per_object);
        let ctx = SimContext::new(&config);
        Self {
            config,
            objects,
            ctx,
            factory: None,
            frame: 0,
        }
    }

    pub fn set_factory(&mut self, factory: Box<dyn GameObjectFactory>) {
        self.factory = Some(factory);
    }

    pub fn set_camera(&mut self, camera: Box<dyn Camera>) {
        self.ctx.camera = Some(camera);
    }

    /// Installs bounds without loading a level file.
    pub fn set_level(&mut self, level: Box<dyn LevelSystem>) {
        self.ctx.level = Some(level);
    }

    /// Installs a background to collide against.
    pub fn set_background(&mut self, background: CollisionSystem) {
        self.ctx.background = Some(background);
    }

    /// Makes `level` current: its collision layer becomes the background,
    /// its spawn markers become objects and its size bounds movement.
    /// Returns the number of objects spawned.
    pub fn load_level(&mut self, level: Level, tiles: CollisionTileSet) -> usize {
        self.objects.destroy_all();
        self.objects.commit_updates();
        self.ctx.background = level.collision_world().map(|world| {
            CollisionSystem::new(
                world.clone(),
                tiles,
                level.tile_size(),
                self.config.max_temporary_surfaces,
            )
        });
        if self.ctx.background.is_none() {
            warn!("level has no collision layer");
        }
        let spawned = match self.factory.as_deref_mut() {
            Some(factory) => level.spawn_objects(factory, &mut self.objects),
            None => {
                warn!("no factory installed; level objects skipped");
                0
            }
        };
        self.ctx.level = Some(Box::new(level));
        spawned
    }

    /// Turns on draw-call collection and returns the exchange a renderer
    /// reads frames from.
    pub fn enable_rendering(&mut self) -> Arc<FrameExchange> {
        let capacity = self.config.render_queue_capacity;
        self.ctx
            .render
            .get_or_insert_with(|| RenderSystem::new(capacity))
            .exchange()
    }

    /// Spawns an object right away through the installed factory.
    pub fn spawn(&mut self, kind: SpawnKind, position: Vec2, flip_horizontal: bool) -> Option<GameObjectId> {
        let factory = self.factory.as_deref_mut()?;
        factory.spawn(kind, position, flip_horizontal, &mut self.objects)
    }

    /// Advances the simulation by `time_delta` seconds of real time.
    pub fn step(&mut self, time_delta: f32) -> FrameReport {
        let real_delta = time_delta.clamp(0.0, self.config.max_frame_delta);
        let game_delta = self.ctx.time.update(real_delta);
        if let Some(background) = self.ctx.background.as_mut() {
            background.begin_frame();
        }

        self.objects.update(game_delta, &mut self.ctx);

        let hits = {
            let SimContext {
                collision,
                time,
                lifecycle,
                ..
            } = &mut self.ctx;
            collision.update(&mut self.objects.hit_router(time, lifecycle))
        };

        for id in self.ctx.lifecycle.drain_destroys() {
            self.objects.destroy(id);
        }
        let spawned = self.apply_spawns();

        if let Some(render) = self.ctx.render.as_mut() {
            render.publish();
        }
        self.frame += 1;
        FrameReport {
            game_delta,
            hits,
            spawned,
            active_objects: self.objects.active_count(),
        }
    }

    fn apply_spawns(&mut self) -> usize {
        let Some(factory) = self.factory.as_deref_mut() else {
            let dropped = self.ctx.lifecycle.drain_spawns().count();
            if dropped > 0 {
                warn!("{dropped} spawn requests dropped; no factory installed");
            }
            return 0;
        };
        self.ctx
            .lifecycle
            .drain_spawns()
            .filter_map(|request| {
                factory.spawn(
                    request.kind,
                    request.position,
                    request.flip_horizontal,
                    &mut self.objects,
                )
            })
            .count()
    }

    /// Releases every object and closes the render exchange.
    pub fn shutdown(&mut self) {
        self.objects.destroy_all();
        self.objects.commit_updates();
        if let Some(render) = self.ctx.render.as_ref() {
            render.exchange().close();
        }
        info!("simulation stopped after {} frames", self.frame);
    }

    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub const fn objects(&self) -> &GameObjectManager {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut GameObjectManager {
        &mut self.objects
    }

    #[must_use]
    pub const fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    /// Frames stepped so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for Simulation {
    fn default() -> Self {
        debug!("simulation with default config");
        Self::new(SimulationConfig::default())
    }
}
