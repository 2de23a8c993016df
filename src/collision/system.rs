//! Per-frame attack/vulnerability tests between game objects.
//!
//! Objects register their volumes during the frame. [`GameObjectCollisionSystem::update`]
//! sorts the registrations by the left edge of their bounding volume and
//! sweeps along X, so only pairs whose bounds overlap on X are examined.

use glam::Vec2;
use log::{trace, warn};
use ordered_float::OrderedFloat;

use super::volume::{CollisionVolume, FlipInfo, HitType};
use crate::fixed_array::FixedSizeArray;
use crate::game_object::{GameObjectId, GameObjectState};
use crate::pool::{ObjectPool, PoolHandle, Poolable};

/// Receives the outcome of each detected hit.
#[cfg_attr(test, mockall::automock)]
pub trait HitReactionDispatcher {
    /// Offers `victim` a hit from `attacker`; returns whether it was accepted.
    fn received_hit(&mut self, victim: GameObjectId, attacker: GameObjectId, hit_type: HitType) -> bool;

    /// Tells `attacker` it hit `victim`.
    fn hit_victim(&mut self, attacker: GameObjectId, victim: GameObjectId, hit_type: HitType, accepted: bool);
}

/// One object's volumes for the current frame.
#[derive(Debug)]
pub struct CollisionRecord {
    object: Option<GameObjectId>,
    reacts: bool,
    position: Vec2,
    flip: FlipInfo,
    bounding: CollisionVolume,
    attack: FixedSizeArray<CollisionVolume>,
    vulnerability: FixedSizeArray<CollisionVolume>,
}

impl CollisionRecord {
    fn new(max_volumes: usize) -> Self {
        Self {
            object: None,
            reacts: false,
            position: Vec2::ZERO,
            flip: FlipInfo::default(),
            bounding: CollisionVolume::aabox(Vec2::ZERO, Vec2::ZERO, HitType::Invalid),
            attack: FixedSizeArray::new(max_volumes),
            vulnerability: FixedSizeArray::new(max_volumes),
        }
    }

    fn min_x(&self) -> f32 {
        self.position.x + self.bounding.min_x(self.flip)
    }

    fn max_x(&self) -> f32 {
        self.position.x + self.bounding.max_x(self.flip)
    }

    /// First attack volume of `self` that meets a vulnerability of `victim`
    /// accepting its type.
    fn first_hit_on(&self, victim: &Self) -> Option<HitType> {
        self.attack
            .iter()
            .filter(|attack| attack.hit_type != HitType::Invalid)
            .find_map(|attack| {
                victim
                    .vulnerability
                    .iter()
                    .filter(|vulnerable| vulnerable.hit_type.accepts(attack.hit_type))
                    .any(|vulnerable| {
                        attack.intersects(self.position, self.flip, vulnerable, victim.position, victim.flip)
                    })
                    .then_some(attack.hit_type)
            })
    }

    /// Whether either side could hit the other at all.
    fn may_interact(&self, other: &Self) -> bool {
        (!self.attack.is_empty() && !other.vulnerability.is_empty())
            || (!self.vulnerability.is_empty() && !other.attack.is_empty())
    }
}

impl Poolable for CollisionRecord {
    fn reset(&mut self) {
        self.object = None;
        self.reacts = false;
        self.attack.clear();
        self.vulnerability.clear();
    }
}

/// Sweep-and-prune hit detection between registered objects.
#[derive(Debug)]
pub struct GameObjectCollisionSystem {
    records: ObjectPool<CollisionRecord>,
    registered: FixedSizeArray<PoolHandle<CollisionRecord>>,
}

impl GameObjectCollisionSystem {
    /// Room for `max_records` registrations per frame, each carrying up to
    /// `max_volumes` attack and `max_volumes` vulnerability volumes.
    #[must_use]
    pub fn new(max_records: usize, max_volumes: usize) -> Self {
        Self {
            records: ObjectPool::new(max_records, || CollisionRecord::new(max_volumes)),
            registered: FixedSizeArray::new(max_records),
        }
    }

    /// Registers `owner`'s volumes for this frame.
    ///
    /// `reacts` selects whether `owner` is told about hits it gives or
    /// receives. Owners without any volume, or without an id, are ignored.
    /// Returns whether a record was stored.
    pub fn register_for_collisions(
        &mut self,
        owner: &GameObjectState,
        reacts: bool,
        bounding: CollisionVolume,
        attack: &[CollisionVolume],
        vulnerability: &[CollisionVolume],
    ) -> bool {
        if attack.is_empty() && vulnerability.is_empty() {
            return false;
        }
        let Some(object) = owner.id else {
            return false;
        };
        let Some(handle) = self.records.allocate() else {
            warn!("collision records exhausted; {object:?} skipped this frame");
            return false;
        };
        let Some(record) = self.records.get_mut(handle) else {
            return false;
        };
        record.object = Some(object);
        record.reacts = reacts;
        record.position = owner.position;
        record.flip = FlipInfo::from_facing(owner.facing, owner.width, owner.height);
        record.bounding = bounding;
        for volume in attack {
            if record.attack.add(*volume).is_err() {
                break;
            }
        }
        for volume in vulnerability {
            if record.vulnerability.add(*volume).is_err() {
                break;
            }
        }
        if self.registered.add(handle).is_err() {
            self.records.release(handle);
            return false;
        }
        true
    }

    /// Number of registrations waiting for the next [`Self::update`].
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Tests every plausible pair, reports hits to `dispatcher`, then drops
    /// all registrations. Returns the number of hits found.
    pub fn update<D>(&mut self, dispatcher: &mut D) -> usize
    where
        D: HitReactionDispatcher + ?Sized,
    {
        let Self { records, registered } = self;
        let left_edge = |handle: &PoolHandle<CollisionRecord>| {
            OrderedFloat(records.get(*handle).map_or(f32::INFINITY, CollisionRecord::min_x))
        };
        registered.sort_by(false, |a, b| left_edge(a).cmp(&left_edge(b)));

        let mut hits = 0;
        for (index, handle) in registered.iter().enumerate() {
            let Some(record) = records.get(*handle) else {
                continue;
            };
            let right_edge = record.max_x();
            for other_handle in registered.iter().skip(index + 1) {
                let Some(other) = records.get(*other_handle) else {
                    continue;
                };
                if other.min_x() > right_edge {
                    break;
                }
                if !record.may_interact(other)
                    || !record
                        .bounding
                        .intersects(record.position, record.flip, &other.bounding, other.position, other.flip)
                {
                    continue;
                }
                if let Some(hit_type) = record.first_hit_on(other) {
                    hits += 1;
                    dispatch(dispatcher, record, other, hit_type);
                }
                if let Some(hit_type) = other.first_hit_on(record) {
                    hits += 1;
                    dispatch(dispatcher, other, record, hit_type);
                }
            }
        }
        self.clear();
        hits
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        for handle in self.registered.drain() {
            self.records.release(handle);
        }
    }
}

fn dispatch<D>(dispatcher: &mut D, attacker: &CollisionRecord, victim: &CollisionRecord, hit_type: HitType)
where
    D: HitReactionDispatcher + ?Sized,
{
    let (Some(attacker_id), Some(victim_id)) = (attacker.object, victim.object) else {
        return;
    };
    trace!("{attacker_id:?} hits {victim_id:?} with {hit_type:?}");
    let accepted = victim.reacts && dispatcher.received_hit(victim_id, attacker_id, hit_type);
    if attacker.reacts {
        dispatcher.hit_victim(attacker_id, victim_id, hit_type, accepted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use rstest::{fixture, rstest};

    fn body() -> CollisionVolume {
        CollisionVolume::aabox(Vec2::ZERO, Vec2::splat(10.0), HitType::Hit)
    }

    fn bounds() -> CollisionVolume {
        CollisionVolume::aabox(Vec2::ZERO, Vec2::splat(10.0), HitType::Invalid)
    }

    fn owner(index: u32, x: f32) -> GameObjectState {
        GameObjectState {
            id: Some(GameObjectId::from_raw(index, 0)),
            position: Vec2::new(x, 0.0),
            width: 10.0,
            height: 10.0,
            ..GameObjectState::default()
        }
    }

    #[fixture]
    fn system() -> GameObjectCollisionSystem {
        GameObjectCollisionSystem::new(8, 4)
    }

    #[rstest]
    fn overlapping_attack_reaches_vulnerability(mut system: GameObjectCollisionSystem) {
        let attacker = owner(0, 0.0);
        let victim = owner(1, 5.0);
        let (a, b) = (attacker.id.expect("id"), victim.id.expect("id"));
        system.register_for_collisions(&attacker, true, bounds(), &[body()], &[]);
        system.register_for_collisions(&victim, true, bounds(), &[], &[body()]);

        let mut dispatcher = MockHitReactionDispatcher::new();
        let mut sequence = Sequence::new();
        dispatcher
            .expect_received_hit()
            .with(eq(b), eq(a), eq(HitType::Hit))
            .times(1)
            .in_sequence(&mut sequence)
            .return_const(true);
        dispatcher
            .expect_hit_victim()
            .with(eq(a), eq(b), eq(HitType::Hit), eq(true))
            .times(1)
            .in_sequence(&mut sequence)
            .return_const(());

        assert_eq!(system.update(&mut dispatcher), 1);
        assert_eq!(system.registered_count(), 0);
    }

    #[rstest]
    fn separated_objects_are_never_tested(mut system: GameObjectCollisionSystem) {
        system.register_for_collisions(&owner(0, 0.0), true, bounds(), &[body()], &[body()]);
        system.register_for_collisions(&owner(1, 50.0), true, bounds(), &[body()], &[body()]);
        let mut dispatcher = MockHitReactionDispatcher::new();
        assert_eq!(system.update(&mut dispatcher), 0);
    }

    #[rstest]
    fn mutual_attacks_report_both_directions(mut system: GameObjectCollisionSystem) {
        system.register_for_collisions(&owner(1, 5.0), true, bounds(), &[body()], &[body()]);
        system.register_for_collisions(&owner(0, 0.0), true, bounds(), &[body()], &[body()]);
        let mut dispatcher = MockHitReactionDispatcher::new();
        dispatcher.expect_received_hit().times(2).return_const(false);
        dispatcher
            .expect_hit_victim()
            .with(mockall::predicate::always(), mockall::predicate::always(), eq(HitType::Hit), eq(false))
            .times(2)
            .return_const(());
        assert_eq!(system.update(&mut dispatcher), 2);
    }

    #[rstest]
    fn mismatched_vulnerability_ignores_attack(mut system: GameObjectCollisionSystem) {
        let collectable = CollisionVolume::aabox(Vec2::ZERO, Vec2::splat(10.0), HitType::Collect);
        system.register_for_collisions(&owner(0, 0.0), true, bounds(), &[body()], &[]);
        system.register_for_collisions(&owner(1, 5.0), true, bounds(), &[], &[collectable]);
        let mut dispatcher = MockHitReactionDispatcher::new();
        assert_eq!(system.update(&mut dispatcher), 0);
    }

    fn attack(hit_type: HitType) -> CollisionVolume {
        CollisionVolume::aabox(Vec2::ZERO, Vec2::splat(10.0), hit_type)
    }

    #[rstest]
    #[case::skips_unaccepted_attacks(&[HitType::Collect, HitType::Hit], HitType::Hit)]
    #[case::catch_all_takes_the_first(&[HitType::Hit, HitType::Death], HitType::Invalid)]
    fn only_the_first_matching_attack_lands(
        mut system: GameObjectCollisionSystem,
        #[case] attacks: &[HitType],
        #[case] vulnerable_to: HitType,
    ) {
        let attacker = owner(0, 0.0);
        let victim = owner(1, 5.0);
        let (a, b) = (attacker.id.expect("id"), victim.id.expect("id"));
        let volumes: Vec<CollisionVolume> = attacks.iter().copied().map(attack).collect();
        system.register_for_collisions(&attacker, true, bounds(), &volumes, &[]);
        system.register_for_collisions(&victim, true, bounds(), &[], &[attack(vulnerable_to)]);

        let mut dispatcher = MockHitReactionDispatcher::new();
        dispatcher
            .expect_received_hit()
            .with(eq(b), eq(a), eq(HitType::Hit))
            .times(1)
            .return_const(true);
        dispatcher
            .expect_hit_victim()
            .with(eq(a), eq(b), eq(HitType::Hit), eq(true))
            .times(1)
            .return_const(());

        assert_eq!(system.update(&mut dispatcher), 1);
    }

    #[rstest]
    fn non_reacting_victim_refuses_silently(mut system: GameObjectCollisionSystem) {
        let attacker = owner(0, 0.0);
        system.register_for_collisions(&attacker, true, bounds(), &[body()], &[]);
        system.register_for_collisions(&owner(1, 5.0), false, bounds(), &[], &[body()]);
        let mut dispatcher = MockHitReactionDispatcher::new();
        dispatcher
            .expect_hit_victim()
            .with(eq(attacker.id.expect("id")), mockall::predicate::always(), eq(HitType::Hit), eq(false))
            .times(1)
            .return_const(());
        assert_eq!(system.update(&mut dispatcher), 1);
    }

    #[rstest]
    fn objects_without_volumes_are_not_registered(mut system: GameObjectCollisionSystem) {
        assert!(!system.register_for_collisions(&owner(0, 0.0), true, bounds(), &[], &[]));
        assert!(!system.register_for_collisions(&GameObjectState::default(), true, bounds(), &[body()], &[]));
        assert_eq!(system.registered_count(), 0);
    }

    #[rstest]
    fn registrations_beyond_capacity_are_dropped() {
        let mut system = GameObjectCollisionSystem::new(1, 1);
        assert!(system.register_for_collisions(&owner(0, 0.0), true, bounds(), &[body()], &[]));
        assert!(!system.register_for_collisions(&owner(1, 0.0), true, bounds(), &[body()], &[]));
        system.clear();
        assert!(system.register_for_collisions(&owner(1, 0.0), true, bounds(), &[body()], &[]));
    }
}
