//! Longest-chain fallback.
//!
//! When the edge graph is not a simple cycle, the edges are cut into
//! chunks at their corner intersections and the longest walkable chain of
//! chunks becomes the outline. Finding the longest path is NP-hard in
//! general; this is the original production heuristic: a breadth-first
//! sweep that prefers poorly connected chunks, then a backwalk along the
//! highest step counts.

use roofline_core::{Pt3, Real};

use crate::config::ClosureConfig;

use super::adjust::record_corners;
use super::ring::validate_ring;
use super::{Deadline, Workspace};

const SHARED_ENDPOINT_EPSILON: Real = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Chunk {
    p1: Pt3,
    p2: Pt3,
}

impl Chunk {
    fn has_point(&self, p: &Pt3) -> bool {
        (self.p1 - p).norm() < SHARED_ENDPOINT_EPSILON
            || (self.p2 - p).norm() < SHARED_ENDPOINT_EPSILON
    }

    fn other_point(&self, p: &Pt3) -> Option<Pt3> {
        if (self.p1 - p).norm() < SHARED_ENDPOINT_EPSILON {
            Some(self.p2)
        } else if (self.p2 - p).norm() < SHARED_ENDPOINT_EPSILON {
            Some(self.p1)
        } else {
            None
        }
    }

    fn touches(&self, other: &Chunk) -> bool {
        self.has_point(&other.p1) || self.has_point(&other.p2)
    }
}

/// Cut every live edge into chunks between its sorted corner
/// intersections.
fn build_chunks(ws: &Workspace) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for i in ws.active() {
        let edge = &ws.edges[i];
        let u = edge.p2 - edge.p1;
        let mut corners: Vec<(Real, Pt3)> = edge
            .intersections
            .iter()
            .map(|&p| ((p - edge.p1).dot(&u), p))
            .collect();
        corners.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in corners.windows(2) {
            chunks.push(Chunk {
                p1: pair[0].1,
                p2: pair[1].1,
            });
        }
    }
    chunks
}

fn chunk_adjacency(chunks: &[Chunk]) -> Vec<Vec<usize>> {
    let mut neighbors = vec![Vec::new(); chunks.len()];
    for i in 0..chunks.len() {
        for j in i + 1..chunks.len() {
            if chunks[i].touches(&chunks[j]) {
                neighbors[i].push(j);
                neighbors[j].push(i);
            }
        }
    }
    neighbors
}

/// One heuristic walk from `start`, returning the chain's point list.
fn walk_from(chunks: &[Chunk], neighbors: &[Vec<usize>], start: usize) -> Vec<Pt3> {
    let n = chunks.len();
    let mut count: Vec<Option<usize>> = vec![None; n];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];

    // Sweep in one direction only: the walk back to the start closes the
    // loop.
    count[start] = Some(0);
    let first = neighbors[start][0];
    count[first] = Some(1);
    predecessors[first].push(start);
    let mut queue = vec![first];
    while !queue.is_empty() {
        // Poorly connected chunks first, deeper ones breaking ties.
        queue.sort_by_key(|&i| {
            1000 * neighbors[i].len() as i64 - count[i].unwrap_or(0) as i64
        });
        let current = queue.remove(0);
        let depth = count[current].unwrap_or(0);
        for &next in &neighbors[current] {
            if predecessors[current].contains(&next) {
                continue;
            }
            match count[next] {
                None => {
                    count[next] = Some(depth + 1);
                    predecessors[next].push(current);
                    queue.push(next);
                }
                Some(c) if c < depth => predecessors[next].push(current),
                Some(_) => {}
            }
        }
    }

    // Backwalk from the deepest neighbor of the start, always towards the
    // deepest predecessor.
    let mut sequence = vec![start];
    let Some(mut current) = neighbors[start]
        .iter()
        .copied()
        .filter(|&i| count[i].is_some())
        .max_by_key(|&i| count[i].unwrap_or(0))
    else {
        return Vec::new();
    };
    let mut prev = start;
    while current != start && !sequence.contains(&current) {
        sequence.push(current);
        let next = predecessors[current]
            .iter()
            .copied()
            .filter(|&p| p != prev)
            .max_by_key(|&p| count[p].unwrap_or(0));
        prev = current;
        match next {
            Some(next) => current = next,
            None => break,
        }
    }
    if sequence.len() < 2 {
        return Vec::new();
    }

    // Chain the chunk endpoints, oriented so consecutive chunks share a
    // point.
    let mut points = Vec::with_capacity(sequence.len() + 1);
    let head = chunks[sequence[0]];
    if chunks[sequence[1]].has_point(&head.p1) {
        points.push(head.p2);
        points.push(head.p1);
    } else {
        points.push(head.p1);
        points.push(head.p2);
    }
    for &s in &sequence[1..] {
        let Some(&last) = points.last() else {
            break;
        };
        match chunks[s].other_point(&last) {
            Some(p) => points.push(p),
            None => break,
        }
    }
    points
}

/// Close the component by its longest chain of inter-corner chunks.
pub(super) fn longest_chain_ring(
    ws: &mut Workspace,
    config: &ClosureConfig,
    deadline: &Deadline,
) -> Option<Vec<Pt3>> {
    record_corners(ws, config);
    let chunks = build_chunks(ws);
    let neighbors = chunk_adjacency(&chunks);

    let mut best: Vec<Pt3> = Vec::new();
    for start in (0..chunks.len()).filter(|&i| neighbors[i].len() == 2) {
        if deadline.exceeded() {
            break;
        }
        let points = walk_from(&chunks, &neighbors, start);
        if points.len() > best.len() {
            best = points;
        }
    }
    validate_ring(best, config.max_corner_gap)
}
