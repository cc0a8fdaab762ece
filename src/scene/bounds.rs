use glam::Vec3;

/// World-space bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Distance from a point to the surface of the sphere.
    ///
    /// Negative when the point is inside the sphere.
    #[must_use]
    pub fn distance_to_edge(&self, point: Vec3) -> f32 {
        self.center.distance(point) - self.radius
    }

    /// A bound with a non-finite center or a non-finite/negative radius
    /// cannot be used for distance sorting.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius >= 0.0
    }
}
