//! Level-set functions describing the geometric interface
//!
//! A level set maps a point to a real value: negative inside the target
//! region, positive outside and zero on the interface. Any closure
//! `Fn(DVec2) -> f64` is a level set; the shapes below are exact signed
//! distances and compose through CSG combinators.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Scalar field whose sign encodes inside (negative) and outside (positive)
pub trait LevelSet {
    fn eval(&self, p: DVec2) -> f64;
}

impl<F> LevelSet for F
where
    F: Fn(DVec2) -> f64,
{
    #[inline]
    fn eval(&self, p: DVec2) -> f64 {
        self(p)
    }
}

/// Disc of the given radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl LevelSet for Circle {
    fn eval(&self, p: DVec2) -> f64 {
        p.distance(self.center) - self.radius
    }
}

/// Axis-aligned filled rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rectangle {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }
}

impl LevelSet for Rectangle {
    fn eval(&self, p: DVec2) -> f64 {
        let center = (self.min + self.max) * 0.5;
        let half = (self.max - self.min) * 0.5;
        let d = (p - center).abs() - half;
        d.max(DVec2::ZERO).length() + d.x.max(d.y).min(0.0)
    }
}

/// Half plane `{ p : (p - point) . normal <= 0 }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfPlane {
    pub point: DVec2,
    pub normal: DVec2,
}

impl HalfPlane {
    /// `normal` is normalised; it points out of the region
    pub fn new(point: DVec2, normal: DVec2) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }
}

impl LevelSet for HalfPlane {
    fn eval(&self, p: DVec2) -> f64 {
        (p - self.point).dot(self.normal)
    }
}

/// Union of two regions (minimum of the fields)
#[derive(Debug, Clone, Copy)]
pub struct Union<A, B>(pub A, pub B);

impl<A: LevelSet, B: LevelSet> LevelSet for Union<A, B> {
    fn eval(&self, p: DVec2) -> f64 {
        self.0.eval(p).min(self.1.eval(p))
    }
}

/// Intersection of two regions (maximum of the fields)
#[derive(Debug, Clone, Copy)]
pub struct Intersection<A, B>(pub A, pub B);

impl<A: LevelSet, B: LevelSet> LevelSet for Intersection<A, B> {
    fn eval(&self, p: DVec2) -> f64 {
        self.0.eval(p).max(self.1.eval(p))
    }
}

/// Complement of a region (negated field)
#[derive(Debug, Clone, Copy)]
pub struct Complement<A>(pub A);

impl<A: LevelSet> LevelSet for Complement<A> {
    fn eval(&self, p: DVec2) -> f64 {
        -self.0.eval(p)
    }
}

/// Field sampled at the nodes of a uniform grid, bilinearly interpolated.
///
/// `values` is row-major with `nx * ny` entries; points outside the sampled
/// region are clamped to its border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledField {
    pub origin: DVec2,
    pub spacing: DVec2,
    pub nx: usize,
    pub ny: usize,
    pub values: Vec<f64>,
}

impl SampledField {
    /// Returns `None` unless `values` holds `nx * ny >= 1` samples
    pub fn new(
        origin: DVec2,
        spacing: DVec2,
        nx: usize,
        ny: usize,
        values: Vec<f64>,
    ) -> Option<Self> {
        (nx >= 1 && ny >= 1 && values.len() == nx * ny).then_some(Self {
            origin,
            spacing,
            nx,
            ny,
            values,
        })
    }

    /// Sample another level set at `nx * ny` nodes
    pub fn sample<L: LevelSet + ?Sized>(
        level_set: &L,
        origin: DVec2,
        spacing: DVec2,
        nx: usize,
        ny: usize,
    ) -> Self {
        let mut values = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                values.push(level_set.eval(origin + spacing * DVec2::new(i as f64, j as f64)));
            }
        }
        Self {
            origin,
            spacing,
            nx,
            ny,
            values,
        }
    }

    #[inline]
    fn value(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.nx + i]
    }

    /// Cell index and local coordinate along one axis
    fn locate_axis(t: f64, n: usize) -> (usize, f64) {
        if n < 2 {
            return (0, 0.0);
        }
        let t = t.clamp(0.0, (n - 1) as f64);
        let i = (t.floor() as usize).min(n - 2);
        (i, t - i as f64)
    }
}

impl LevelSet for SampledField {
    fn eval(&self, p: DVec2) -> f64 {
        let t = (p - self.origin) / self.spacing;
        let (i, fx) = Self::locate_axis(t.x, self.nx);
        let (j, fy) = Self::locate_axis(t.y, self.ny);
        let i1 = (i + 1).min(self.nx - 1);
        let j1 = (j + 1).min(self.ny - 1);

        let bottom = self.value(i, j) * (1.0 - fx) + self.value(i1, j) * fx;
        let top = self.value(i, j1) * (1.0 - fx) + self.value(i1, j1) * fx;
        bottom * (1.0 - fy) + top * fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_level_set() {
        let f = |p: DVec2| p.x - 0.5;
        assert_eq!(f.eval(DVec2::new(0.25, 0.0)), -0.25);
    }

    #[test]
    fn test_circle_sign() {
        let c = Circle::new(DVec2::splat(0.5), 0.25);
        assert!(c.eval(DVec2::splat(0.5)) < 0.0);
        assert!(c.eval(DVec2::ZERO) > 0.0);
        assert!(c.eval(DVec2::new(0.75, 0.5)).abs() < 1e-15);
    }

    #[test]
    fn test_rectangle_distance() {
        let r = Rectangle::new(DVec2::ZERO, DVec2::ONE);
        assert!((r.eval(DVec2::splat(0.5)) + 0.5).abs() < 1e-12);
        assert!((r.eval(DVec2::new(2.0, 0.5)) - 1.0).abs() < 1e-12);
        assert!((r.eval(DVec2::new(2.0, 2.0)) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_csg() {
        let a = Circle::new(DVec2::new(0.0, 0.0), 1.0);
        let b = Circle::new(DVec2::new(1.5, 0.0), 1.0);
        let p = DVec2::new(0.75, 0.0);
        assert!(Union(a, b).eval(p) < 0.0);
        assert!(Intersection(a, b).eval(p) < 0.0);
        assert!(Intersection(a, Complement(b)).eval(p) > 0.0);
        assert!(Union(a, b).eval(DVec2::new(-0.9, 0.0)) < 0.0);
        assert!(Intersection(a, b).eval(DVec2::new(-0.9, 0.0)) > 0.0);
    }

    #[test]
    fn test_half_plane() {
        let h = HalfPlane::new(DVec2::new(0.5, 0.0), DVec2::new(2.0, 0.0));
        assert_eq!(h.eval(DVec2::new(0.25, 7.0)), -0.25);
        assert_eq!(h.eval(DVec2::new(1.0, -3.0)), 0.5);
    }

    #[test]
    fn test_sampled_field_reproduces_linear_function() {
        let linear = |p: DVec2| 2.0 * p.x - p.y + 0.1;
        let field = SampledField::sample(&linear, DVec2::ZERO, DVec2::splat(0.25), 5, 5);
        for p in [DVec2::new(0.1, 0.7), DVec2::new(0.99, 0.01), DVec2::splat(0.5)] {
            assert!((field.eval(p) - linear(p)).abs() < 1e-12);
        }
        // Clamped outside the sampled region
        assert!((field.eval(DVec2::new(2.0, 0.0)) - linear(DVec2::new(1.0, 0.0))).abs() < 1e-12);
    }

    #[test]
    fn test_sampled_field_rejects_bad_shape() {
        assert!(SampledField::new(DVec2::ZERO, DVec2::ONE, 2, 2, vec![0.0; 3]).is_none());
        assert!(SampledField::new(DVec2::ZERO, DVec2::ONE, 1, 1, vec![0.0]).is_some());
    }
}
