use log2::debug;

use crate::page_graph::PageGraph;

/// Default per-score tolerance between two consecutive snapshots
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Compares the scores of a graph against the snapshot taken on the previous call.
///
/// A snapshot is every authority followed by every hub, in address order.
///
/// NOTE: the first call on a fresh detector has nothing to compare against,
/// stores the snapshot and returns `true`. A `true` from that call says nothing
/// about the scores; prime the detector before iterating (as [`crate::hits::HitsEngine`] does).
#[derive(Debug, Clone)]
pub struct ConvergenceDetector {
    epsilon: f64,
    previous: Option<Vec<f64>>,
}

impl Default for ConvergenceDetector {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl ConvergenceDetector {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon, previous: None }
    }

    pub fn has_history(&self) -> bool {
        self.previous.is_some()
    }

    /// Snapshots `graph` and reports whether every score moved by at most epsilon
    pub fn check(&mut self, graph: &PageGraph) -> bool {
        self.observe(snapshot(graph))
    }

    /// Same as [`ConvergenceDetector::check`] for an already flattened snapshot.
    /// The snapshot always replaces the stored one.
    pub fn observe(&mut self, current: Vec<f64>) -> bool {
        let converged = match &self.previous {
            None => true,
            Some(previous) if previous.len() != current.len() => false,
            Some(previous) => {
                let max_delta = previous
                    .iter()
                    .zip(&current)
                    .map(|(before, now)| (before - now).abs())
                    .fold(0.0_f64, f64::max);
                debug!("Largest score change {:.6} (epsilon {})", max_delta, self.epsilon);
                max_delta <= self.epsilon
            }
        };
        self.previous = Some(current);
        converged
    }
}

/// Authorities then hubs of every page, in address order
pub fn snapshot(graph: &PageGraph) -> Vec<f64> {
    graph
        .pages()
        .map(|page| page.authority)
        .chain(graph.pages().map(|page| page.hub))
        .collect()
}
