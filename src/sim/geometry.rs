//! Geometry kernel
//!
//! Plain value shapes and the intersection tests the simulation and the
//! autopilot build on: circle overlap for collisions, ray casts for line of
//! sight, and separating-axis polygon tests for swept movement regions.

use glam::Vec2;

/// A circle collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Overlap test; touching circles count as overlapping
    #[inline]
    pub fn overlaps(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }
}

/// A half-line from `origin` along a unit `direction`
///
/// A zero direction is kept as zero and never hits anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    pub direction: Vec2,
}

impl Ray {
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// Check whether a ray passes through the interior of a circle
///
/// Uses the quadratic discriminant of the ray/circle system. An origin strictly
/// inside the circle always hits. Otherwise the circle must lie ahead of the
/// origin and the line must cross it at two distinct points: grazing
/// tangents and origins sitting exactly on the circumference are misses.
pub fn ray_intersects_circle(ray: &Ray, circle: &Circle) -> bool {
    let d = ray.direction;
    if d == Vec2::ZERO {
        return false;
    }

    let o = ray.origin - circle.center;
    let r_sq = circle.radius * circle.radius;

    // Origin strictly inside
    if o.length_squared() < r_sq {
        return true;
    }

    let cross = d.perp_dot(o);
    let discriminant = r_sq * d.length_squared() - cross * cross;
    if discriminant <= 0.0 {
        return false;
    }

    // Circle must be in front of the origin
    d.dot(o) < 0.0
}

/// A convex polygon given by its vertices in winding order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub points: Vec<Vec2>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Edge normals used as candidate separating axes (degenerate edges skipped)
    fn axes(&self) -> impl Iterator<Item = Vec2> + '_ {
        let n = self.points.len();
        (0..n).filter_map(move |i| {
            let edge = self.points[(i + 1) % n] - self.points[i];
            let normal = edge.perp();
            (normal != Vec2::ZERO).then_some(normal)
        })
    }

    /// Project onto an axis, returning (min, max)
    fn project(&self, axis: Vec2) -> (f32, f32) {
        self.points
            .iter()
            .map(|p| p.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Separating-axis overlap test for convex polygons
    ///
    /// Polygons that merely share an edge or a vertex do not overlap.
    pub fn overlaps(&self, other: &Polygon) -> bool {
        if self.points.is_empty() || other.points.is_empty() {
            return false;
        }

        for axis in self.axes().chain(other.axes()) {
            let (a_min, a_max) = self.project(axis);
            let (b_min, b_max) = other.project(axis);
            if a_max <= b_min || b_max <= a_min {
                return false;
            }
        }

        true
    }
}

/// An oriented rectangle
///
/// `width` runs along the local x axis and `height` along the local y axis
/// before `rotation` (radians, counter-clockwise) is applied about `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatableBox {
    pub center: Vec2,
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
}

impl RotatableBox {
    pub fn new(center: Vec2, rotation: f32, width: f32, height: f32) -> Self {
        Self {
            center,
            rotation,
            width,
            height,
        }
    }

    /// Box swept by a circle of the given diameter moving from `start` to `end`
    ///
    /// The long axis follows the travel direction and covers both end circles.
    pub fn sweep(start: Vec2, end: Vec2, diameter: f32) -> Self {
        let travel = end - start;
        let rotation = if travel == Vec2::ZERO {
            0.0
        } else {
            travel.y.atan2(travel.x)
        };

        Self {
            center: (start + end) * 0.5,
            rotation,
            width: travel.length() + diameter,
            height: diameter,
        }
    }

    /// Corner points in counter-clockwise order
    pub fn to_polygon(&self) -> Polygon {
        let half = Vec2::new(self.width, self.height) * 0.5;
        let rotor = Vec2::from_angle(self.rotation);
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ];

        Polygon::new(
            corners
                .iter()
                .map(|c| self.center + rotor.rotate(*c))
                .collect(),
        )
    }
}
