//! Runs a [`Simulation`] on its own thread at a steady frame rate.
//!
//! The thread measures real time between frames and steps the simulation
//! by it, then sleeps out the rest of the configured frame period. A shared
//! [`ThreadControl`] pauses, resumes and stops the loop from any thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info};
use thiserror::Error;

use crate::simulation::Simulation;

#[derive(Debug, Error)]
pub enum GameThreadError {
    #[error("could not start the game thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("the game thread panicked")]
    Panicked,
}

#[derive(Debug, Default)]
struct RunState {
    paused: bool,
    stopped: bool,
}

/// What the loop should do at the top of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Checkpoint {
    Run,
    /// Run, but the clock must restart because the loop was paused.
    Resumed,
    Stop,
}

/// Pause and stop switches shared between the game thread and its owner.
#[derive(Debug, Default)]
pub struct ThreadControl {
    state: Mutex<RunState>,
    changed: Condvar,
    frames: AtomicU64,
}

impl ThreadControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Holds the loop before its next frame.
    pub fn pause(&self) {
        self.lock().paused = true;
        debug!("game thread pausing");
    }

    pub fn resume(&self) {
        self.lock().paused = false;
        self.changed.notify_all();
        debug!("game thread resuming");
    }

    /// Ends the loop after the frame in progress, even while paused.
    pub fn stop(&self) {
        self.lock().stopped = true;
        self.changed.notify_all();
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Frames completed so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    fn checkpoint(&self) -> Checkpoint {
        let guard = self.lock();
        let was_paused = guard.paused;
        let state = self
            .changed
            .wait_while(guard, |run| run.paused && !run.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        if state.stopped {
            Checkpoint::Stop
        } else if was_paused {
            Checkpoint::Resumed
        } else {
            Checkpoint::Run
        }
    }

    fn frame_done(&self) -> u64 {
        self.frames.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Handle to a running game thread.
#[derive(Debug)]
pub struct GameThread {
    control: Arc<ThreadControl>,
    handle: JoinHandle<Simulation>,
}

impl GameThread {
    /// Starts stepping `simulation` on a new thread. The loop ends after
    /// `frame_limit` frames, if given, or when stopped.
    ///
    /// # Errors
    /// Returns [`GameThreadError::Spawn`] when the OS refuses the thread.
    pub fn spawn(simulation: Simulation, frame_limit: Option<u64>) -> Result<Self, GameThreadError> {
        let control = Arc::new(ThreadControl::new());
        let shared = Arc::clone(&control);
        let handle = thread::Builder::new()
            .name("game".to_owned())
            .spawn(move || run(simulation, &shared, frame_limit))?;
        Ok(Self { control, handle })
    }

    /// Switches for the running loop.
    #[must_use]
    pub fn control(&self) -> Arc<ThreadControl> {
        Arc::clone(&self.control)
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the loop to end and hands back the simulation.
    ///
    /// # Errors
    /// Returns [`GameThreadError::Panicked`] when the loop panicked.
    pub fn join(self) -> Result<Simulation, GameThreadError> {
        self.handle.join().map_err(|_| GameThreadError::Panicked)
    }
}

fn run(mut simulation: Simulation, control: &ThreadControl, frame_limit: Option<u64>) -> Simulation {
    let period = Duration::from_secs_f32(simulation.config().target_frame_time.max(0.0));
    info!("game thread started, frame period {period:?}");
    let mut last = Instant::now();
    loop {
        match control.checkpoint() {
            Checkpoint::Stop => break,
            Checkpoint::Resumed => last = Instant::now(),
            Checkpoint::Run => {}
        }
        let start = Instant::now();
        let delta = start.duration_since(last).as_secs_f32();
        last = start;
        simulation.step(delta);
        let frames = control.frame_done();
        if frame_limit.is_some_and(|limit| frames >= limit) {
            break;
        }
        if let Some(remaining) = period.checked_sub(start.elapsed()) {
            thread::sleep(remaining);
        }
    }
    simulation.shutdown();
    simulation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use rstest::{fixture, rstest};
    use static_assertions::assert_impl_all;

    assert_impl_all!(Simulation: Send);
    assert_impl_all!(ThreadControl: Send, Sync);

    #[fixture]
    fn simulation() -> Simulation {
        Simulation::new(SimulationConfig {
            max_game_objects: 4,
            target_frame_time: 0.001,
            ..SimulationConfig::default()
        })
    }

    fn wait_for(control: &ThreadControl, frames: u64) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while control.frame_count() < frames {
            if Instant::now() > deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    #[rstest]
    fn frame_limit_ends_the_loop(simulation: Simulation) {
        let game = GameThread::spawn(simulation, Some(3)).expect("thread starts");
        let finished = game.join().expect("loop exits cleanly");
        assert_eq!(finished.frame(), 3);
    }

    #[rstest]
    fn pause_holds_and_stop_releases(simulation: Simulation) {
        let game = GameThread::spawn(simulation, None).expect("thread starts");
        let control = game.control();
        assert!(wait_for(&control, 1));

        game.pause();
        thread::sleep(Duration::from_millis(20));
        let held = control.frame_count();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(control.frame_count(), held);

        game.resume();
        assert!(wait_for(&control, held + 2));

        game.pause();
        game.stop();
        let finished = game.join().expect("loop exits cleanly");
        assert_eq!(finished.frame(), control.frame_count());
    }
}
