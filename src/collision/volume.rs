//! Attack, vulnerability and bounding volumes.
//!
//! Volumes are stored relative to their owner's bottom-left corner and
//! mirrored inside the owner's width/height when the owner faces left or
//! down.

use glam::Vec2;

/// Kind of interaction an attack delivers.
///
/// On a vulnerability volume, [`HitType::Invalid`] accepts any attack; on
/// an attack volume it delivers nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitType {
    #[default]
    Invalid,
    Hit,
    Death,
    Collect,
    Launch,
    Depress,
    Possess,
}

impl HitType {
    /// Whether a vulnerability of this type accepts `attack`.
    #[must_use]
    pub fn accepts(self, attack: Self) -> bool {
        self == Self::Invalid || self == attack
    }
}

/// How an owner's volumes are mirrored this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlipInfo {
    pub flip_x: bool,
    pub flip_y: bool,
    pub parent_width: f32,
    pub parent_height: f32,
}

impl FlipInfo {
    /// Flip state for an owner facing `facing` with the given extent.
    #[must_use]
    pub fn from_facing(facing: Vec2, parent_width: f32, parent_height: f32) -> Self {
        Self {
            flip_x: facing.x < 0.0,
            flip_y: facing.y < 0.0,
            parent_width,
            parent_height,
        }
    }
}

/// Geometry of a [`CollisionVolume`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeShape {
    AaBox { bottom_left: Vec2, size: Vec2 },
    Sphere { center: Vec2, radius: f32 },
}

/// A shape tagged with the hit type it delivers or accepts.
///
/// # Examples
///
/// ```
/// use glam::Vec2;
/// use ledge::collision::{CollisionVolume, FlipInfo, HitType};
///
/// let fist = CollisionVolume::aabox(Vec2::ZERO, Vec2::new(10.0, 10.0), HitType::Hit);
/// let body = CollisionVolume::aabox(Vec2::new(5.0, 0.0), Vec2::new(10.0, 10.0), HitType::Hit);
/// let still = FlipInfo::default();
/// assert!(fist.intersects(Vec2::ZERO, still, &body, Vec2::ZERO, still));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionVolume {
    pub shape: VolumeShape,
    pub hit_type: HitType,
}

impl CollisionVolume {
    /// Axis-aligned box with its lower-left corner at `bottom_left`.
    #[must_use]
    pub const fn aabox(bottom_left: Vec2, size: Vec2, hit_type: HitType) -> Self {
        Self {
            shape: VolumeShape::AaBox { bottom_left, size },
            hit_type,
        }
    }

    /// Circle of `radius` around `center`.
    #[must_use]
    pub const fn sphere(center: Vec2, radius: f32, hit_type: HitType) -> Self {
        Self {
            shape: VolumeShape::Sphere { center, radius },
            hit_type,
        }
    }

    /// Owner-relative minimum corner after flipping.
    #[must_use]
    pub fn min(&self, flip: FlipInfo) -> Vec2 {
        match self.shape {
            VolumeShape::AaBox { bottom_left, size } => Vec2::new(
                mirrored_low(bottom_left.x, size.x, flip.flip_x, flip.parent_width),
                mirrored_low(bottom_left.y, size.y, flip.flip_y, flip.parent_height),
            ),
            VolumeShape::Sphere { radius, .. } => self.center(flip) - Vec2::splat(radius),
        }
    }

    /// Owner-relative maximum corner after flipping.
    #[must_use]
    pub fn max(&self, flip: FlipInfo) -> Vec2 {
        match self.shape {
            VolumeShape::AaBox { bottom_left, size } => Vec2::new(
                mirrored_low(bottom_left.x, size.x, flip.flip_x, flip.parent_width) + size.x,
                mirrored_low(bottom_left.y, size.y, flip.flip_y, flip.parent_height) + size.y,
            ),
            VolumeShape::Sphere { radius, .. } => self.center(flip) + Vec2::splat(radius),
        }
    }

    /// Left edge after flipping.
    #[must_use]
    pub fn min_x(&self, flip: FlipInfo) -> f32 {
        self.min(flip).x
    }

    /// Right edge after flipping.
    #[must_use]
    pub fn max_x(&self, flip: FlipInfo) -> f32 {
        self.max(flip).x
    }

    /// Owner-relative centre after flipping.
    #[must_use]
    pub fn center(&self, flip: FlipInfo) -> Vec2 {
        match self.shape {
            VolumeShape::AaBox { .. } => (self.min(flip) + self.max(flip)) * 0.5,
            VolumeShape::Sphere { center, .. } => Vec2::new(
                if flip.flip_x {
                    flip.parent_width - center.x
                } else {
                    center.x
                },
                if flip.flip_y {
                    flip.parent_height - center.y
                } else {
                    center.y
                },
            ),
        }
    }

    /// Whether this volume at `position` overlaps `other` at
    /// `other_position`. Touching edges do not count.
    #[must_use]
    pub fn intersects(
        &self,
        position: Vec2,
        flip: FlipInfo,
        other: &Self,
        other_position: Vec2,
        other_flip: FlipInfo,
    ) -> bool {
        match (self.shape, other.shape) {
            (VolumeShape::Sphere { radius, .. }, VolumeShape::Sphere { radius: other_radius, .. }) => {
                let reach = radius + other_radius;
                (self.center(flip) + position).distance_squared(other.center(other_flip) + other_position)
                    < reach * reach
            }
            // Sphere against box is answered by the box.
            (VolumeShape::Sphere { .. }, VolumeShape::AaBox { .. }) => {
                other.intersects(other_position, other_flip, self, position, flip)
            }
            (VolumeShape::AaBox { .. }, VolumeShape::Sphere { radius, .. }) => {
                let min = self.min(flip) + position;
                let max = self.max(flip) + position;
                let center = other.center(other_flip) + other_position;
                center.clamp(min, max).distance_squared(center) < radius * radius
            }
            (VolumeShape::AaBox { .. }, VolumeShape::AaBox { .. }) => {
                let min = self.min(flip) + position;
                let max = self.max(flip) + position;
                let other_min = other.min(other_flip) + other_position;
                let other_max = other.max(other_flip) + other_position;
                min.x < other_max.x && other_min.x < max.x && min.y < other_max.y && other_min.y < max.y
            }
        }
    }
}

/// Lower edge of a span, mirrored inside `parent` when `flipped`.
fn mirrored_low(low: f32, extent: f32, flipped: bool, parent: f32) -> f32 {
    if flipped {
        parent - (low + extent)
    } else {
        low
    }
}

/// Smallest box containing every volume in both facings, tagged
/// [`HitType::Invalid`].
///
/// The result is symmetric inside the owner's extent, so mirroring it for
/// a flipped owner leaves it unchanged.
#[must_use]
pub fn bounding_box(volumes: &[CollisionVolume], parent_width: f32, parent_height: f32) -> Option<CollisionVolume> {
    let unflipped = FlipInfo {
        parent_width,
        parent_height,
        ..FlipInfo::default()
    };
    let mirrored = FlipInfo {
        flip_x: true,
        flip_y: true,
        ..unflipped
    };
    let (min, max) = volumes.iter().fold(None, |bounds: Option<(Vec2, Vec2)>, volume| {
        let low = volume.min(unflipped).min(volume.min(mirrored));
        let high = volume.max(unflipped).max(volume.max(mirrored));
        Some(match bounds {
            Some((min, max)) => (min.min(low), max.max(high)),
            None => (low, high),
        })
    })?;
    Some(CollisionVolume::aabox(min, max - min, HitType::Invalid))
}
