use std::collections::BTreeSet;

use log2::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::content::ContentIndex;
use crate::convergence::{ConvergenceDetector, DEFAULT_EPSILON};
use crate::page_graph::{Page, PageGraph};

/// Configuration of a HITS run
#[derive(Debug, Clone, PartialEq)]
pub struct HitsConfig {
    pub epsilon: f64,
    /// `None` iterates until the detector reports convergence
    pub max_iterations: Option<usize>,
    /// Update steps before the detector's answer is honoured
    pub min_iterations: usize,
    pub expansion_passes: usize,
}

impl Default for HitsConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_iterations: None,
            min_iterations: 1,
            expansion_passes: 1,
        }
    }
}

impl HitsConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_min_iterations(mut self, min_iterations: usize) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    pub fn with_expansion_passes(mut self, passes: usize) -> Self {
        self.expansion_passes = passes;
        self
    }
}

/// Final scores of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPage {
    pub address: String,
    pub authority: f64,
    pub hub: f64,
}

/// Outcome of a run: pages by descending authority, ties by address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub pages: Vec<RankedPage>,
    pub iterations: usize,
    pub converged: bool,
}

pub struct HitsEngine<'a> {
    content: &'a ContentIndex,
    config: HitsConfig,
}

impl<'a> HitsEngine<'a> {
    pub fn new(content: &'a ContentIndex, config: HitsConfig) -> Self {
        Self { content, config }
    }

    /// Pages relevant to `query`, grown by the configured number of expansion passes
    pub fn working_set(&self, graph: &PageGraph, query: &str) -> BTreeSet<String> {
        let base: BTreeSet<String> = self
            .content
            .relevant_pages(query)
            .into_iter()
            .filter(|address| graph.contains(address))
            .collect();
        info!("Base set for {:?} has {} pages", query, base.len());

        let mut working = base;
        for pass in 0..self.config.expansion_passes {
            working = graph.expand_pages(&working, self.content);
            debug!("Expansion pass {} grew working set to {} pages", pass + 1, working.len());
        }
        working
    }

    /// Runs HITS for `query` over `graph`, which is borrowed exclusively for the whole run.
    /// Hitting the iteration cap is not an error; the last scores are returned.
    pub fn run(&self, graph: &mut PageGraph, query: &str) -> Ranking {
        let working: Vec<String> = self.working_set(graph, query).into_iter().collect();
        info!("Working set has {} pages", working.len());

        graph.reset_scores(1.0);
        let mut detector = ConvergenceDetector::new(self.config.epsilon);
        // first call only records the all-ones starting point
        detector.check(graph);

        let mut iterations = 0;
        let mut converged = false;
        loop {
            if let Some(max) = self.config.max_iterations {
                if iterations >= max {
                    warn!("No convergence after {} iterations, keeping last scores", iterations);
                    break;
                }
            }

            update_step(graph, &working);
            iterations += 1;

            let stable = detector.check(graph);
            debug!("Iteration {}: stable = {}", iterations, stable);
            if stable && iterations >= self.config.min_iterations {
                converged = true;
                break;
            }
        }
        info!("HITS finished after {} iterations (converged: {})", iterations, converged);

        Ranking {
            pages: rank(graph, &working),
            iterations,
            converged,
        }
    }
}

/// One authority pass, one hub pass and a normalization over `working`.
/// Neighbours outside `working` are ignored. The hub pass reads the authorities
/// written by the authority pass of the same step.
pub fn update_step(graph: &mut PageGraph, working: &[String]) {
    let members: BTreeSet<&str> = working.iter().map(String::as_str).collect();

    let authorities: Vec<f64> = {
        let graph: &PageGraph = graph;
        working
            .iter()
            .map(|address| neighbour_sum(graph, graph.inlinks_within(address), &members, |page| page.hub))
            .collect()
    };
    for (address, authority) in working.iter().zip(authorities) {
        if let Some(page) = graph.get_mut(address) {
            page.authority = authority;
        }
    }

    let hubs: Vec<f64> = {
        let graph: &PageGraph = graph;
        working
            .iter()
            .map(|address| neighbour_sum(graph, graph.outlinks_within(address), &members, |page| page.authority))
            .collect()
    };
    for (address, hub) in working.iter().zip(hubs) {
        if let Some(page) = graph.get_mut(address) {
            page.hub = hub;
        }
    }

    normalize(graph, working);
}

fn neighbour_sum(graph: &PageGraph, links: Vec<&str>, members: &BTreeSet<&str>, score: fn(&Page) -> f64) -> f64 {
    links
        .into_iter()
        .filter(|link| members.contains(link))
        .filter_map(|link| graph.get(link))
        .map(score)
        .sum()
}

/// Divides authorities and hubs of `pages` by the L2 norm of their respective vectors.
/// A zero norm leaves every score of that vector at zero.
pub fn normalize(graph: &mut PageGraph, pages: &[String]) {
    let norm = |score: fn(&Page) -> f64| -> f64 {
        pages
            .iter()
            .filter_map(|address| graph.get(address))
            .map(|page| score(page).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    let hub_norm = norm(|page| page.hub);
    let authority_norm = norm(|page| page.authority);

    for address in pages {
        if let Some(page) = graph.get_mut(address) {
            page.hub = scale(page.hub, hub_norm);
            page.authority = scale(page.authority, authority_norm);
        }
    }
}

fn scale(score: f64, norm: f64) -> f64 {
    if norm > 0.0 { score / norm } else { 0.0 }
}

fn rank(graph: &PageGraph, working: &[String]) -> Vec<RankedPage> {
    let mut ranked: Vec<RankedPage> = working
        .iter()
        .filter_map(|address| graph.get(address))
        .map(|page| RankedPage {
            address: page.address.clone(),
            authority: page.authority,
            hub: page.hub,
        })
        .collect();
    ranked.sort_by(|a, b| b.authority.total_cmp(&a.authority).then_with(|| a.address.cmp(&b.address)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn links(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(|a| a.to_string()).collect()
    }

    fn setup_graph() -> PageGraph {
        [
            Page::new("A", 1, links(&["D"])),
            Page::new("B", 2, links(&["A", "C", "D"])),
            Page::new("C", 3, links(&["A", "D"])),
            Page::new("D", 4, links(&[])),
            Page::new("E", 5, links(&["A", "B", "C", "D", "F"])),
            Page::new("F", 6, links(&[])),
        ]
        .into_iter()
        .collect()
    }

    fn setup_content() -> ContentIndex {
        let long = "A man inherits an X from his mom and a Y from his dad.";
        let short = "a mom and a dad";
        [("A", long), ("B", short), ("C", long), ("D", short), ("E", long), ("F", short)]
            .iter()
            .map(|(address, raw)| (address.to_string(), raw.to_string()))
            .collect()
    }

    fn all_pages() -> Vec<String> {
        links(&["A", "B", "C", "D", "E", "F"])
    }

    #[test]
    fn test_normalize() {
        let mut graph = setup_graph();
        for (i, address) in all_pages().iter().enumerate() {
            let page = graph.get_mut(address).unwrap();
            page.hub = (i + 1) as f64;
            page.authority = (6 - i) as f64;
        }
        normalize(&mut graph, &all_pages());

        let root = 91f64.sqrt();
        for (i, page) in graph.pages().enumerate() {
            assert!((page.hub - (i + 1) as f64 / root).abs() < TOLERANCE);
            assert!((page.authority - (6 - i) as f64 / root).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut graph = setup_graph();
        graph.reset_scores(0.0);
        normalize(&mut graph, &all_pages());
        assert!(graph.pages().all(|p| p.hub == 0.0 && p.authority == 0.0));
    }

    #[test]
    fn test_update_step_yields_unit_vectors() {
        let mut graph = setup_graph();
        update_step(&mut graph, &all_pages());
        let hub_norm: f64 = graph.pages().map(|p| p.hub * p.hub).sum::<f64>().sqrt();
        let authority_norm: f64 = graph.pages().map(|p| p.authority * p.authority).sum::<f64>().sqrt();
        assert!((hub_norm - 1.0).abs() < TOLERANCE);
        assert!((authority_norm - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_hub_pass_reads_fresh_authorities() {
        let mut graph = setup_graph();
        update_step(&mut graph, &all_pages());
        // authorities from all-ones hubs are in-degrees 3,1,2,4,0,1; hub(E) sums A,B,C,D,F
        let raw_hub_e = 3.0 + 1.0 + 2.0 + 4.0 + 1.0;
        let raw_hub_b = 3.0 + 2.0 + 4.0;
        let e = graph.get("E").unwrap().hub;
        let b = graph.get("B").unwrap().hub;
        assert!((e / b - raw_hub_e / raw_hub_b).abs() < TOLERANCE);
    }

    #[test]
    fn test_hits_ranks_most_linked_pages() {
        let mut graph = setup_graph();
        let content = setup_content();
        let engine = HitsEngine::new(&content, HitsConfig::default());
        let ranking = engine.run(&mut graph, "inherit");

        assert!(ranking.converged);
        assert_eq!(ranking.pages.len(), 6);
        assert_eq!(ranking.pages[0].address, "D");

        let max_hub = ranking.pages.iter().map(|p| p.hub).fold(f64::MIN, f64::max);
        assert_eq!(max_hub, graph.get("E").unwrap().hub);
        let max_authority = graph.pages().map(|p| p.authority).fold(f64::MIN, f64::max);
        assert_eq!(max_authority, graph.get("D").unwrap().authority);
    }

    #[test]
    fn test_run_sees_edited_outlinks() {
        let mut graph = setup_graph();
        graph.set_outlinks("F", links(&["A"]));
        let content = setup_content();
        let config = HitsConfig::default().with_max_iterations(Some(1));
        HitsEngine::new(&content, config).run(&mut graph, "dad");

        // A gained F as inlink, so A and D both have four
        let a = graph.get("A").unwrap().authority;
        let d = graph.get("D").unwrap().authority;
        assert!((a - d).abs() < TOLERANCE);
        assert!(graph.get("F").unwrap().hub > 0.0);
    }

    #[test]
    fn test_ties_broken_by_address() {
        let mut graph = setup_graph();
        let content = setup_content();
        let ranking = HitsEngine::new(&content, HitsConfig::default()).run(&mut graph, "dad");
        let b = ranking.pages.iter().position(|p| p.address == "B").unwrap();
        let f = ranking.pages.iter().position(|p| p.address == "F").unwrap();
        // B and F are both linked only by E
        assert_eq!(ranking.pages[b].authority, ranking.pages[f].authority);
        assert!(b < f);
    }

    #[test]
    fn test_iteration_cap_returns_scores() {
        let mut graph = setup_graph();
        let content = setup_content();
        let config = HitsConfig::default().with_epsilon(0.0).with_max_iterations(Some(2));
        let ranking = HitsEngine::new(&content, config).run(&mut graph, "inherit");
        assert_eq!(ranking.iterations, 2);
        assert!(!ranking.converged);
        assert_eq!(ranking.pages.len(), 6);
    }

    #[test]
    fn test_min_iterations_honoured() {
        let mut graph = setup_graph();
        let content = setup_content();
        let config = HitsConfig::default().with_min_iterations(10);
        let ranking = HitsEngine::new(&content, config).run(&mut graph, "inherit");
        assert!(ranking.converged);
        assert!(ranking.iterations >= 10);
    }

    #[test]
    fn test_unmatched_query_is_empty() {
        let mut graph = setup_graph();
        let content = setup_content();
        let ranking = HitsEngine::new(&content, HitsConfig::default()).run(&mut graph, "philosophy");
        assert!(ranking.pages.is_empty());
        assert!(ranking.converged);
    }

    #[test]
    fn test_working_set_without_expansion() {
        let graph = setup_graph();
        let content = setup_content();
        let config = HitsConfig::default().with_expansion_passes(0);
        let working = HitsEngine::new(&content, config).working_set(&graph, "inherit");
        assert_eq!(working, links(&["A", "C", "E"]).into_iter().collect());
    }
}
