//! Headless ray-cast world made of convex polygons.
//!
//! [`SegmentWorld`] answers [`RaycastQuery`] without any physics engine. It
//! backs the headless backend and doubles as scripted geometry for tests.

use bevy::prelude::*;

use crate::backend::{RayFilter, RaycastQuery};
use crate::config::layers;
use crate::detection::{RayHit, SurfaceTag};

/// Tolerance used when checking whether a ray crosses an edge inside its extent.
const EDGE_EPSILON: f32 = 1e-5;

/// A convex polygon in counter-clockwise order.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentShape {
    vertices: Vec<Vec2>,
    /// Collision layers this shape belongs to.
    pub layers: u32,
    /// Surface behavior reported on hits.
    pub tag: SurfaceTag,
    /// Entity reported on hits.
    pub entity: Option<Entity>,
}

impl SegmentShape {
    /// Convex polygon from its vertices, in either winding order.
    pub fn polygon(vertices: impl IntoIterator<Item = Vec2>) -> Self {
        let mut vertices: Vec<Vec2> = vertices.into_iter().collect();
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        Self {
            vertices,
            layers: layers::WORLD,
            tag: SurfaceTag::Solid,
            entity: None,
        }
    }

    /// Axis-aligned box.
    pub fn rectangle(rect: Rect) -> Self {
        Self::polygon([
            rect.min,
            Vec2::new(rect.max.x, rect.min.y),
            rect.max,
            Vec2::new(rect.min.x, rect.max.y),
        ])
    }

    /// Set the collision layers.
    #[must_use]
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// Set the surface tag.
    #[must_use]
    pub fn with_tag(mut self, tag: SurfaceTag) -> Self {
        self.tag = tag;
        self
    }

    /// Set the entity reported on hits.
    #[must_use]
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Copy of this shape moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| *v + offset).collect(),
            ..self.clone()
        }
    }

    /// Vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Axis-aligned bounding box.
    pub fn aabb(&self) -> Rect {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            min = min.min(*v);
            max = max.max(*v);
        }
        Rect { min, max }
    }

    /// Whether `point` lies strictly inside the polygon.
    pub fn contains(&self, point: Vec2) -> bool {
        self.vertices.len() >= 3
            && self
                .edges()
                .all(|(a, b)| outward_normal(a, b).dot(point - a) < 0.0)
    }

    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.vertices
            .iter()
            .copied()
            .zip(self.vertices.iter().copied().cycle().skip(1))
    }

    /// Closest front-facing edge crossed by the ray, as `(distance, normal)`.
    fn cast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
        if self.contains(origin) {
            return Some((0.0, -direction));
        }

        let mut closest: Option<(f32, Vec2)> = None;
        for (a, b) in self.edges() {
            let edge = b - a;
            let normal = outward_normal(a, b);
            let facing = direction.dot(normal);
            if facing >= 0.0 {
                continue;
            }

            let distance = (a - origin).dot(normal) / facing;
            if distance < 0.0 || distance > max_distance {
                continue;
            }

            let along = (origin + direction * distance - a).dot(edge) / edge.length_squared();
            if !(-EDGE_EPSILON..=1.0 + EDGE_EPSILON).contains(&along) {
                continue;
            }

            if closest.map_or(true, |(best, _)| distance < best) {
                closest = Some((distance, normal));
            }
        }
        closest
    }
}

fn outward_normal(a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    Vec2::new(edge.y, -edge.x).normalize_or_zero()
}

fn signed_area(vertices: &[Vec2]) -> f32 {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum::<f32>()
        * 0.5
}

/// A set of convex shapes answering ray casts.
#[derive(Resource, Debug, Clone, Default)]
pub struct SegmentWorld {
    shapes: Vec<SegmentShape>,
}

impl SegmentWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape.
    pub fn insert(&mut self, shape: SegmentShape) {
        self.shapes.push(shape);
    }

    /// Add a shape, builder style.
    #[must_use]
    pub fn with(mut self, shape: SegmentShape) -> Self {
        self.insert(shape);
        self
    }

    /// Remove every shape.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// All shapes.
    pub fn shapes(&self) -> &[SegmentShape] {
        &self.shapes
    }
}

impl RaycastQuery for SegmentWorld {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        filter: RayFilter,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        self.shapes
            .iter()
            .filter(|shape| shape.layers & filter.mask != 0)
            .filter(|shape| filter.allows(shape.entity))
            .filter_map(|shape| {
                shape
                    .cast(origin, direction, max_distance)
                    .map(|(distance, normal)| (shape, distance, normal))
            })
            .min_by(|(_, a, _), (_, b, _)| a.total_cmp(b))
            .map(|(shape, distance, normal)| {
                RayHit::new(distance, normal, origin + direction * distance, shape.entity)
                    .with_tag(shape.tag)
            })
    }
}
