use crate::Vec3;

/// Axis-Aligned Bounding Box used for culling, overlap tests and the BVH.
///
/// An AABB is defined by its minimum and maximum corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from its two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create the minimal AABB that encloses two other AABBs.
    ///
    /// Per-axis min of the minimums and max of the maximums.
    pub fn union(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Grow this box to also enclose a point.
    pub fn include_point(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Returns true if `other` lies entirely inside this box (inclusive).
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Returns true if the point lies inside this box (inclusive).
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && self.max.cmpge(p).all()
    }

    /// Returns true if min <= max on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Size of the box on each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Test if a ray intersects this AABB closer than `max_dist`.
    ///
    /// Uses the slab method. `inv_direction` is the component-wise
    /// reciprocal of the ray direction (infinities are fine).
    pub fn hit(&self, origin: Vec3, inv_direction: Vec3, max_dist: f32) -> bool {
        let mut t_min = 0.0f32;
        let mut t_max = max_dist;

        for axis in 0..3 {
            let inv = inv_direction[axis];
            let mut t0 = (self.min[axis] - origin[axis]) * inv;
            let mut t1 = (self.max[axis] - origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // NaN (0 * inf) leaves the bounds untouched
            t_min = if t0 > t_min { t0 } else { t_min };
            t_max = if t1 < t_max { t1 } else { t_max };
            if t_max < t_min {
                return false;
            }
        }

        true
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.extent();

        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// An empty AABB (contains nothing, identity for [`Aabb::union`]).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
