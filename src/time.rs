//! Game and real clocks advanced once per frame.

/// Tracks elapsed game time, which can be frozen, and real time, which
/// cannot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeSystem {
    game_time: f32,
    real_time: f32,
    frame_delta: f32,
    real_frame_delta: f32,
    freeze_remaining: f32,
}

impl TimeSystem {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            game_time: 0.0,
            real_time: 0.0,
            frame_delta: 0.0,
            real_frame_delta: 0.0,
            freeze_remaining: 0.0,
        }
    }

    /// Advances both clocks by `time_delta` and returns the game delta.
    ///
    /// While frozen the game clock stands still and the returned delta is
    /// zero.
    pub fn update(&mut self, time_delta: f32) -> f32 {
        let delta = time_delta.max(0.0);
        self.real_time += delta;
        self.real_frame_delta = delta;
        if self.freeze_remaining > 0.0 {
            self.freeze_remaining = (self.freeze_remaining - delta).max(0.0);
            self.frame_delta = 0.0;
        } else {
            self.game_time += delta;
            self.frame_delta = delta;
        }
        self.frame_delta
    }

    /// Stops the game clock for `seconds` of real time.
    pub fn freeze(&mut self, seconds: f32) {
        self.freeze_remaining = self.freeze_remaining.max(seconds);
    }

    #[must_use]
    pub const fn game_time(&self) -> f32 {
        self.game_time
    }

    #[must_use]
    pub const fn real_time(&self) -> f32 {
        self.real_time
    }

    /// Game-time delta of the last frame.
    #[must_use]
    pub const fn frame_delta(&self) -> f32 {
        self.frame_delta
    }

    #[must_use]
    pub const fn real_frame_delta(&self) -> f32 {
        self.real_frame_delta
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.freeze_remaining > 0.0
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
