use glam::{Quat, Vec3};

/// A relative transform: rotation, scale, translation.
///
/// The unit animation blending operates on. Pure data; blending two values
/// never touches anything but its operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformData {
    pub rotation: Quat,
    pub scale: Vec3,
    pub translation: Vec3,
}

impl TransformData {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        translation: Vec3::ZERO,
    };

    #[must_use]
    pub fn new(rotation: Quat, scale: Vec3, translation: Vec3) -> Self {
        Self {
            rotation,
            scale,
            translation,
        }
    }

    /// Weighted blend toward `other`.
    ///
    /// Rotation slerps, scale and translation lerp. Exact at the endpoints:
    /// weight 0 returns `self` bit-for-bit, weight 1 returns `other`.
    #[must_use]
    pub fn blend(&self, other: &Self, weight: f32) -> Self {
        if weight <= 0.0 {
            return *self;
        }
        if weight >= 1.0 {
            return *other;
        }
        Self {
            rotation: self.rotation.slerp(other.rotation, weight),
            scale: self.scale.lerp(other.scale, weight),
            translation: self.translation.lerp(other.translation, weight),
        }
    }
}

impl Default for TransformData {
    fn default() -> Self {
        Self::IDENTITY
    }
}
