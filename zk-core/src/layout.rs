//! 2-D node placement for the interactive plot.
//!
//! Kamada–Kawai gives the nicest pictures but needs all-pairs distances and is
//! quadratic in the node count, so large graphs fall back to a random layout.

use crate::graph::ZettelGraph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::f64::consts::PI;

/// Node count at which [`compute_layout`] switches to the random layout.
///
/// Kamada–Kawai needs O(n²) memory and O(n²) work per sweep of `n` node
/// moves. Just below this size a layout takes a few seconds in a release
/// build, mostly when the energy stalls late and every sweep is spent.
pub const LAYOUT_THRESHOLD: usize = 1000;

/// Stop moving a node once its energy gradient is below this.
const EPSILON: f64 = 1e-4;

/// Node moves per node before giving up on convergence.
const MOVES_PER_NODE: usize = 50;

/// Stop once a sweep of `n` moves lowers the energy by less than this fraction.
const ENERGY_TOLERANCE: f64 = 1e-3;

/// Newton steps on a single node before picking the next one.
const INNER_STEPS: usize = 10;

/// Positions for every node of `graph`, in `node_ids()` order.
pub fn compute_layout(graph: &ZettelGraph, threshold: usize, seed: Option<u64>) -> Vec<(f64, f64)> {
    let n = graph.node_count();
    if n < threshold {
        tracing::debug!("Kamada-Kawai layout for {} nodes", n);
        kamada_kawai(graph)
    } else {
        tracing::debug!("Random layout for {} nodes (threshold {})", n, threshold);
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        random_layout(n, &mut rng)
    }
}

/// Uniform positions in `[0, 1)²`.
pub fn random_layout<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<(f64, f64)> {
    (0..n).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect()
}

/// Hop distances between all node pairs. Unreachable pairs get the longest
/// finite distance plus one, so separate components sit near each other.
fn all_pairs_distances(adjacency: &[Vec<usize>]) -> Vec<Vec<f64>> {
    let n = adjacency.len();
    let mut dist = vec![vec![f64::INFINITY; n]; n];
    let mut max_finite: f64 = 1.0;

    for (start, row) in dist.iter_mut().enumerate() {
        row[start] = 0.0;
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let d = row[current] + 1.0;
            for &next in &adjacency[current] {
                if row[next].is_infinite() {
                    row[next] = d;
                    max_finite = max_finite.max(d);
                    queue.push_back(next);
                }
            }
        }
    }

    for row in &mut dist {
        for d in row.iter_mut().filter(|d| d.is_infinite()) {
            *d = max_finite + 1.0;
        }
    }
    dist
}

/// Evenly spaced points on the unit circle.
fn circular_layout(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / n as f64;
            (theta.cos(), theta.sin())
        })
        .collect()
}

/// Centre on the origin and scale so the largest coordinate is 1.
pub fn rescale(positions: &mut [(f64, f64)]) {
    if positions.is_empty() {
        return;
    }
    let n = positions.len() as f64;
    let cx = positions.iter().map(|p| p.0).sum::<f64>() / n;
    let cy = positions.iter().map(|p| p.1).sum::<f64>() / n;

    let mut lim: f64 = 0.0;
    for p in positions.iter_mut() {
        p.0 -= cx;
        p.1 -= cy;
        lim = lim.max(p.0.abs()).max(p.1.abs());
    }
    if lim > 0.0 {
        for p in positions.iter_mut() {
            p.0 /= lim;
            p.1 /= lim;
        }
    }
}

/// Spring energy model: ideal lengths and stiffness per pair.
struct Springs {
    length: Vec<Vec<f64>>,
    strength: Vec<Vec<f64>>,
}

impl Springs {
    fn new(dist: &[Vec<f64>]) -> Self {
        let max_dist = dist
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(1.0_f64, f64::max);
        // Ideal edge length so the longest path spans the unit square.
        let unit = 2.0 / max_dist;

        let length = dist
            .iter()
            .map(|row| row.iter().map(|&d| unit * d).collect())
            .collect();
        let strength = dist
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&d| if d > 0.0 { 1.0 / (d * d) } else { 0.0 })
                    .collect()
            })
            .collect();
        Self { length, strength }
    }

    /// Energy of the spring between `m` at `pm` and `i` at `pi`.
    fn energy(&self, m: usize, i: usize, pm: (f64, f64), pi: (f64, f64)) -> f64 {
        let d = ((pm.0 - pi.0).powi(2) + (pm.1 - pi.1).powi(2)).sqrt();
        0.5 * self.strength[m][i] * (d - self.length[m][i]).powi(2)
    }

    fn total_energy(&self, pos: &[(f64, f64)]) -> f64 {
        (0..pos.len())
            .flat_map(|m| (m + 1..pos.len()).map(move |i| (m, i)))
            .map(|(m, i)| self.energy(m, i, pos[m], pos[i]))
            .sum()
    }

    /// Contribution of node `i` at `pi` to the energy gradient of node `m` at `pm`.
    fn pull(&self, m: usize, i: usize, pm: (f64, f64), pi: (f64, f64)) -> (f64, f64) {
        let dx = pm.0 - pi.0;
        let dy = pm.1 - pi.1;
        let d = (dx * dx + dy * dy).sqrt().max(1e-9);
        let k = self.strength[m][i];
        let l = self.length[m][i];
        (k * (dx - l * dx / d), k * (dy - l * dy / d))
    }

    fn gradient(&self, m: usize, pos: &[(f64, f64)]) -> (f64, f64) {
        (0..pos.len())
            .filter(|&i| i != m)
            .map(|i| self.pull(m, i, pos[m], pos[i]))
            .fold((0.0, 0.0), |acc, g| (acc.0 + g.0, acc.1 + g.1))
    }

    /// Newton step for node `m` holding all others fixed.
    fn step(&self, m: usize, pos: &[(f64, f64)], grad: (f64, f64)) -> Option<(f64, f64)> {
        let (mut hxx, mut hxy, mut hyy) = (0.0, 0.0, 0.0);
        for i in (0..pos.len()).filter(|&i| i != m) {
            let dx = pos[m].0 - pos[i].0;
            let dy = pos[m].1 - pos[i].1;
            let d = (dx * dx + dy * dy).sqrt().max(1e-9);
            let d3 = d * d * d;
            let k = self.strength[m][i];
            let l = self.length[m][i];
            hxx += k * (1.0 - l * dy * dy / d3);
            hxy += k * l * dx * dy / d3;
            hyy += k * (1.0 - l * dx * dx / d3);
        }

        let det = hxx * hyy - hxy * hxy;
        if det.abs() < 1e-12 {
            return None;
        }
        let sx = (-grad.0 * hyy + grad.1 * hxy) / det;
        let sy = (grad.0 * hxy - grad.1 * hxx) / det;
        Some((sx, sy))
    }
}

/// Kamada–Kawai force-directed layout, rescaled into `[-1, 1]`.
///
/// Repeatedly moves the node with the largest energy gradient with a
/// Newton–Raphson step. Stops when every gradient is below a tolerance, when a
/// sweep of `n` moves barely lowers the total energy, or when the move budget
/// runs out.
pub fn kamada_kawai(graph: &ZettelGraph) -> Vec<(f64, f64)> {
    let adjacency = graph.adjacency();
    let n = adjacency.len();
    match n {
        0 => return vec![],
        1 => return vec![(0.0, 0.0)],
        _ => {}
    }

    let springs = Springs::new(&all_pairs_distances(&adjacency));
    let mut pos = circular_layout(n);
    let (moves, energy) = relax(&springs, &mut pos, ENERGY_TOLERANCE);
    tracing::debug!("Kamada-Kawai stopped after {} moves, energy {:.4}", moves, energy);

    if pos.iter().any(|p| !p.0.is_finite() || !p.1.is_finite()) {
        tracing::warn!("Kamada-Kawai diverged, falling back to a circular layout");
        pos = circular_layout(n);
    }
    rescale(&mut pos);
    pos
}

/// Move nodes until converged. Returns the number of moves and the final energy.
fn relax(springs: &Springs, pos: &mut [(f64, f64)], tolerance: f64) -> (usize, f64) {
    let n = pos.len();
    let mut grads: Vec<(f64, f64)> = (0..n).map(|m| springs.gradient(m, pos)).collect();
    let norm = |g: (f64, f64)| (g.0 * g.0 + g.1 * g.1).sqrt();
    let mut energy = springs.total_energy(pos);
    let mut sweep_start = energy;
    let mut moves = 0;

    while moves < MOVES_PER_NODE * n {
        let (m, delta) = grads
            .iter()
            .enumerate()
            .map(|(i, &g)| (i, norm(g)))
            .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if delta < EPSILON {
            break;
        }

        let old = pos[m];
        for _ in 0..INNER_STEPS {
            let Some((sx, sy)) = springs.step(m, pos, grads[m]) else {
                break;
            };
            pos[m].0 += sx;
            pos[m].1 += sy;
            grads[m] = springs.gradient(m, pos);
            if norm(grads[m]) < EPSILON {
                break;
            }
        }

        // Patch the other gradients and the energy for m's move instead of
        // recomputing them all.
        let moved = pos[m];
        for i in (0..n).filter(|&i| i != m) {
            let before = springs.pull(i, m, pos[i], old);
            let after = springs.pull(i, m, pos[i], moved);
            grads[i].0 += after.0 - before.0;
            grads[i].1 += after.1 - before.1;
            energy += springs.energy(m, i, moved, pos[i]) - springs.energy(m, i, old, pos[i]);
        }

        moves += 1;
        if moves % n == 0 {
            if sweep_start - energy < tolerance * sweep_start {
                break;
            }
            sweep_start = energy;
        }
    }

    (moves, energy)
}
