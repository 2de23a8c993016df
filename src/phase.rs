//! Ordered update phases for components.

/// Stage of the frame in which a component runs.
///
/// Variants are declared in execution order, so the derived `Ord` is the
/// schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Phase {
    /// Decision making: AI, player intent, timers.
    #[default]
    Think,
    /// Forces and impulses are resolved into velocity.
    Physics,
    /// Adjustments that depend on the new velocity.
    PostPhysics,
    /// Velocity is integrated into position.
    Movement,
    /// Collision volumes are registered and queried.
    CollisionDetection,
    /// Movement is corrected against the background.
    CollisionResponse,
    /// Reactions to the corrected position.
    PostCollision,
    /// Animation state selection.
    Animation,
    /// Last state changes before drawing.
    PreDraw,
    /// Draw calls are scheduled.
    Draw,
    /// End-of-frame bookkeeping.
    FrameEnd,
}

impl Phase {
    /// Every phase in execution order.
    pub const ALL: [Self; 11] = [
        Self::Think,
        Self::Physics,
        Self::PostPhysics,
        Self::Movement,
        Self::CollisionDetection,
        Self::CollisionResponse,
        Self::PostCollision,
        Self::Animation,
        Self::PreDraw,
        Self::Draw,
        Self::FrameEnd,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_schedule_order() {
        assert!(Phase::ALL.windows(2).all(|pair| matches!(pair, [a, b] if a < b)));
        assert_eq!(Phase::ALL.first(), Some(&Phase::Think));
        assert_eq!(Phase::ALL.last(), Some(&Phase::FrameEnd));
    }
}
