#![allow(dead_code)]

use std::f64::consts::PI;

use geo::{Coordinate, LineString, MultiLineString, Rect};

use rand::Rng;
use rand_distr::Standard;

#[inline]
pub fn uniform_point<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Coordinate<f64> {
    let coords: [f64; 2] = rng.sample(Standard);
    let dims = bounds.max() - bounds.min();
    Coordinate {
        x: bounds.min().x + dims.x * coords[0],
        y: bounds.min().y + dims.y * coords[1],
    }
}

/// A line-string through `num_points` uniformly sampled points.
pub fn uniform_line_string<R: Rng>(
    rng: &mut R,
    bounds: Rect<f64>,
    num_points: usize,
) -> LineString<f64> {
    (0..num_points).map(|_| uniform_point(rng, bounds)).collect()
}

/// A random walk of `num_steps` steps of length `step`, starting at a
/// uniform point. The walk may leave `bounds`.
pub fn random_walk<R: Rng>(
    rng: &mut R,
    bounds: Rect<f64>,
    num_steps: usize,
    step: f64,
) -> LineString<f64> {
    let mut pt = uniform_point(rng, bounds);
    let mut coords = Vec::with_capacity(num_steps + 1);
    coords.push(pt);
    for _ in 0..num_steps {
        let angle = rng.sample::<f64, _>(Standard) * 2. * PI;
        pt = pt + Coordinate {
            x: step * angle.cos(),
            y: step * angle.sin(),
        };
        coords.push(pt);
    }
    LineString(coords)
}

pub fn random_walks<R: Rng>(
    rng: &mut R,
    bounds: Rect<f64>,
    num_walks: usize,
    num_steps: usize,
    step: f64,
) -> MultiLineString<f64> {
    MultiLineString(
        (0..num_walks)
            .map(|_| random_walk(rng, bounds, num_steps, step))
            .collect(),
    )
}

/// A line-string of `num_points` points on the integer grid
/// `[0, size) x [0, size)`. Consecutive points are distinct, so every
/// segment has positive length.
pub fn grid_line_string<R: Rng>(rng: &mut R, size: u32, num_points: usize) -> LineString<f64> {
    debug_assert!(size > 1);
    let mut coords: Vec<Coordinate<f64>> = Vec::with_capacity(num_points);
    while coords.len() < num_points {
        let pt = Coordinate {
            x: rng.gen_range(0..size) as f64,
            y: rng.gen_range(0..size) as f64,
        };
        if coords.last() != Some(&pt) {
            coords.push(pt);
        }
    }
    LineString(coords)
}

/// A multi-line-string of `num_curves` grid line-strings, each with
/// 2 to `max_points` points.
pub fn grid_multi_line_string<R: Rng>(
    rng: &mut R,
    size: u32,
    num_curves: usize,
    max_points: usize,
) -> MultiLineString<f64> {
    MultiLineString(
        (0..num_curves)
            .map(|_| {
                let n = rng.gen_range(2..=max_points);
                grid_line_string(rng, size, n)
            })
            .collect(),
    )
}
