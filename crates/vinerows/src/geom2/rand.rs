//! Random block boundaries (radial jitter + replay tokens).
//!
//! Model
//! - Start from `n` equally spaced angles on [0, 2π), add bounded angular and
//!   radial jitter, and connect the vertices in angle order. The result is
//!   star-shaped about the origin, hence a simple (non-self-intersecting) ring,
//!   and usually concave. `draw_convex_block` returns its hull instead.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.
//!
//! Used by property tests and benchmarks; boundaries are planar.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::Ring;
use super::util::convex_hull;
use crate::error::Result;

/// Vertex count distribution.
#[derive(Clone, Copy, Debug)]
pub enum VertexCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}
impl VertexCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            VertexCount::Fixed(n) => n.max(3),
            VertexCount::Uniform { min, max } => {
                let lo = min.max(3);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

/// Radial-jitter sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct BlockCfg {
    pub vertex_count: VertexCount,
    /// Angular jitter as a fraction of the base spacing Δ=2π/n. Clamped to [0, 0.49].
    pub angle_jitter_frac: f64,
    /// Radii = `base_radius * (1 + u)`, with `u∈[-radial_jitter, radial_jitter]`.
    pub radial_jitter: f64,
    /// Base radius, in planar units (meters for realistic blocks).
    pub base_radius: f64,
    /// Block center.
    pub center: Vector2<f64>,
    pub random_phase: bool,
}
impl Default for BlockCfg {
    fn default() -> Self {
        Self {
            vertex_count: VertexCount::Fixed(12),
            angle_jitter_frac: 0.3,
            radial_jitter: 0.25,
            base_radius: 100.0,
            center: Vector2::zeros(),
            random_phase: true,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}
impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw a star-shaped block boundary.
pub fn draw_block_radial(cfg: BlockCfg, tok: ReplayToken) -> Result<Ring> {
    let mut rng = tok.to_std_rng();
    let n = cfg.vertex_count.sample(&mut rng);
    let aj = cfg.angle_jitter_frac.clamp(0.0, 0.49);
    let rj = cfg.radial_jitter.clamp(0.0, 0.95);
    let r0 = cfg.base_radius.max(1e-9);
    let delta = std::f64::consts::TAU / (n as f64);
    let phase = if cfg.random_phase {
        rng.gen::<f64>() * std::f64::consts::TAU
    } else {
        0.0
    };
    let mut angles: Vec<f64> = (0..n)
        .map(|k| {
            let base = phase + (k as f64) * delta;
            let jitter = (rng.gen::<f64>() * 2.0 - 1.0) * aj * delta;
            base + jitter
        })
        .collect();
    angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pts: Vec<Vector2<f64>> = angles
        .into_iter()
        .map(|th| {
            let u = (rng.gen::<f64>() * 2.0 - 1.0) * rj;
            let r = (1.0 + u) * r0;
            cfg.center + Vector2::new(th.cos() * r, th.sin() * r)
        })
        .collect();
    Ring::new(pts)
}

/// Convex hull of `draw_block_radial`.
pub fn draw_convex_block(cfg: BlockCfg, tok: ReplayToken) -> Result<Ring> {
    let ring = draw_block_radial(cfg, tok)?;
    Ring::new(convex_hull(ring.vertices(), 1e-12)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2::signed_area;

    #[test]
    fn reproducible_draw() {
        let cfg = BlockCfg {
            vertex_count: VertexCount::Fixed(10),
            angle_jitter_frac: 0.2,
            radial_jitter: 0.1,
            ..BlockCfg::default()
        };
        let tok = ReplayToken { seed: 42, index: 7 };
        let a = draw_block_radial(cfg, tok).unwrap();
        let b = draw_block_radial(cfg, tok).unwrap();
        assert_eq!(a, b);
        let c = draw_block_radial(cfg, ReplayToken { seed: 42, index: 8 }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn radial_ring_is_ccw_and_sized() {
        let cfg = BlockCfg {
            vertex_count: VertexCount::Uniform { min: 5, max: 20 },
            center: Vector2::new(500.0, -200.0),
            ..BlockCfg::default()
        };
        for index in 0..20 {
            let ring = draw_block_radial(cfg, ReplayToken { seed: 3, index }).unwrap();
            assert!((5..=20).contains(&ring.vertices().len()));
            assert!(signed_area(ring.vertices()) > 0.0);
            for p in ring.vertices() {
                let r = (p - cfg.center).norm();
                assert!(r <= cfg.base_radius * (1.0 + cfg.radial_jitter) + 1e-9);
            }
        }
    }

    #[test]
    fn convex_block_is_hull() {
        let tok = ReplayToken { seed: 9, index: 1 };
        let ring = draw_block_radial(BlockCfg::default(), tok).unwrap();
        let hull = draw_convex_block(BlockCfg::default(), tok).unwrap();
        assert!(hull.vertices().len() <= ring.vertices().len());
        assert!(signed_area(hull.vertices()) >= signed_area(ring.vertices()) - 1e-9);
    }
}
