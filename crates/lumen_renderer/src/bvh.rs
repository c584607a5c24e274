//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes store indices into the scene's primitive list, so the tree borrows
//! nothing and can be rebuilt without touching the scene. Unbounded
//! primitives (planes) are kept outside the tree and tested on every query.

use lumen_core::{Intersection, Ray, Scene};
use lumen_math::{Aabb, Vec3};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Subtrees larger than this are built on the rayon pool.
const PARALLEL_BUILD_THRESHOLD: usize = 1024;

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitive indices.
    Leaf { primitives: Vec<usize>, bbox: Aabb },
    /// Empty node (no bounded geometry).
    Empty,
}

/// Primitive index with its cached bounds, used during construction.
#[derive(Debug, Clone, Copy)]
struct BuildItem {
    index: usize,
    bbox: Aabb,
    centroid: Vec3,
}

impl BvhNode {
    fn build(mut items: Vec<BuildItem>) -> Self {
        if items.is_empty() {
            return BvhNode::Empty;
        }

        let bounds = items
            .iter()
            .fold(Aabb::EMPTY, |acc, item| Aabb::union(&acc, &item.bbox));

        if items.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                primitives: items.iter().map(|item| item.index).collect(),
                bbox: bounds,
            };
        }

        // Split on the axis with the largest centroid spread
        let axis = items
            .iter()
            .fold(Aabb::EMPTY, |acc, item| acc.include_point(item.centroid))
            .longest_axis();

        items.sort_unstable_by(|a, b| {
            a.centroid[axis]
                .partial_cmp(&b.centroid[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let right_items = items.split_off(items.len() / 2);
        let left_items = items;

        let (left, right) = if left_items.len() + right_items.len() > PARALLEL_BUILD_THRESHOLD {
            rayon::join(|| Self::build(left_items), || Self::build(right_items))
        } else {
            (Self::build(left_items), Self::build(right_items))
        };

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn trace(&self, scene: &Scene, ray: &Ray, inv_direction: Vec3, hit: &mut Intersection) -> bool {
        match self {
            BvhNode::Empty => false,

            BvhNode::Leaf { primitives, bbox } => {
                if !bbox.hit(ray.origin(), inv_direction, hit.length) {
                    return false;
                }
                let mut found = false;
                for &index in primitives {
                    found |= scene.intersect_primitive(index, ray, hit);
                }
                found
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray.origin(), inv_direction, hit.length) {
                    return false;
                }
                // hit.length shrinks after a left hit, pruning the right side
                let hit_left = left.trace(scene, ray, inv_direction, hit);
                let hit_right = right.trace(scene, ray, inv_direction, hit);
                hit_left || hit_right
            }
        }
    }

    fn occluded(&self, scene: &Scene, ray: &Ray, inv_direction: Vec3, max_dist: f32) -> bool {
        match self {
            BvhNode::Empty => false,

            BvhNode::Leaf { primitives, bbox } => {
                bbox.hit(ray.origin(), inv_direction, max_dist)
                    && primitives.iter().any(|&index| {
                        let mut hit = Intersection::new(max_dist);
                        scene.intersect_primitive(index, ray, &mut hit)
                    })
            }

            BvhNode::Branch { left, right, bbox } => {
                bbox.hit(ray.origin(), inv_direction, max_dist)
                    && (left.occluded(scene, ray, inv_direction, max_dist)
                        || right.occluded(scene, ray, inv_direction, max_dist))
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
            BvhNode::Leaf { .. } => 1,
            BvhNode::Empty => 0,
        }
    }
}

/// BVH over the bounded primitives of a scene.
#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
    unbounded: Vec<usize>,
}

impl Bvh {
    /// Build a BVH over the primitives of `scene`.
    pub fn new(scene: &Scene) -> Self {
        let mut items = Vec::with_capacity(scene.primitive_count());
        let mut unbounded = Vec::new();

        for (index, primitive) in scene.primitives().iter().enumerate() {
            if primitive.is_bounded() {
                let bbox = primitive.bounding_box();
                items.push(BuildItem {
                    index,
                    bbox,
                    centroid: bbox.centroid(),
                });
            } else {
                unbounded.push(index);
            }
        }

        let bounded = items.len();
        let root = BvhNode::build(items);
        log::info!(
            "Built BVH: {} primitives, {} unbounded, depth {}",
            bounded,
            unbounded.len(),
            root.depth()
        );

        Self { root, unbounded }
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    /// Nearest hit along `ray`, updating `hit` if anything is closer.
    pub fn trace(&self, scene: &Scene, ray: &Ray, hit: &mut Intersection) -> bool {
        let mut found = false;
        for &index in &self.unbounded {
            found |= scene.intersect_primitive(index, ray, hit);
        }
        let inv_direction = ray.direction().recip();
        found | self.root.trace(scene, ray, inv_direction, hit)
    }

    /// Returns true if any primitive blocks `ray` closer than `max_dist`.
    pub fn shadow_trace(&self, scene: &Scene, ray: &Ray, max_dist: f32) -> bool {
        let blocked = self.unbounded.iter().any(|&index| {
            let mut hit = Intersection::new(max_dist);
            scene.intersect_primitive(index, ray, &mut hit)
        });
        blocked || self.root.occluded(scene, ray, ray.direction().recip(), max_dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Material, Plane, Sphere, Triangle};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_scene(count: usize) -> Scene {
        let mut rng = StdRng::seed_from_u64(7);
        let mut scene = Scene::new();
        let m = scene.add_material(Material::default());
        scene.add_primitive(Plane::new(Vec3::new(0.0, -3.0, 0.0), Vec3::Y, m));
        for i in 0..count {
            let center = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-15.0..-5.0),
            );
            if i % 2 == 0 {
                scene.add_primitive(Sphere::new(center, rng.gen_range(0.1..0.6), m));
            } else {
                scene.add_primitive(Triangle::new(
                    center,
                    center + Vec3::new(0.8, 0.0, 0.1),
                    center + Vec3::new(0.0, 0.8, -0.1),
                    m,
                ));
            }
        }
        scene
    }

    #[test]
    fn test_bvh_empty() {
        let scene = Scene::new();
        let bvh = Bvh::new(&scene);
        assert!(matches!(bvh.root(), BvhNode::Empty));

        let ray = Ray::primary(Vec3::ZERO, Vec3::Z).unwrap();
        let mut hit = Intersection::default();
        assert!(!bvh.trace(&scene, &ray, &mut hit));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let mut scene = Scene::new();
        scene.add_primitive(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 0));
        let bvh = Bvh::new(&scene);
        assert!(matches!(bvh.root(), BvhNode::Leaf { .. }));

        let ray = Ray::primary(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let mut hit = Intersection::default();
        assert!(bvh.trace(&scene, &ray, &mut hit));
        assert!((hit.point.z - (-0.5)).abs() < 1.0e-4);
    }

    #[test]
    fn test_bvh_matches_naive_trace() {
        let scene = random_scene(200);
        let bvh = Bvh::new(&scene);
        assert!(matches!(bvh.root(), BvhNode::Branch { .. }));

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let direction = Vec3::new(
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                -1.0,
            );
            let ray = Ray::primary(Vec3::ZERO, direction).unwrap();

            let mut expected = Intersection::default();
            let mut actual = Intersection::default();
            let naive = scene.trace(&ray, &mut expected);
            let fast = bvh.trace(&scene, &ray, &mut actual);

            assert_eq!(naive, fast);
            assert_eq!(expected.primitive, actual.primitive);
            assert_eq!(expected.length, actual.length);

            for max_dist in [2.0, 8.0, 50.0] {
                assert_eq!(
                    scene.shadow_trace(&ray, max_dist),
                    bvh.shadow_trace(&scene, &ray, max_dist)
                );
            }
        }
    }

    #[test]
    fn test_bvh_bounds_cover_bounded_primitives() {
        let scene = random_scene(64);
        let bvh = Bvh::new(&scene);
        let bounds = bvh.root().bounding_box();
        for primitive in scene.primitives().iter().filter(|p| p.is_bounded()) {
            assert!(bounds.contains(&primitive.bounding_box()));
        }
    }
}
