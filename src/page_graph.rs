use std::collections::{BTreeMap, BTreeSet};

use log2::debug;
use url::Url;

use crate::content::ContentIndex;
use crate::links::{LinkPolicy, find_outlinks};

/// One page of the link graph
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub address: String,
    /// Ordinal assigned by whoever built the graph; not used for scoring
    pub rank: usize,
    /// Sorted, no duplicates. Changed only through [`PageGraph::set_outlinks`]
    outlinks: Vec<String>,
    /// Sorted, no duplicates. Derived from every page's outlinks
    inlinks: Vec<String>,
    pub hub: f64,
    pub authority: f64,
}

impl Page {
    pub fn new(address: impl Into<String>, rank: usize, outlinks: Vec<String>) -> Self {
        Self {
            address: address.into(),
            rank,
            outlinks: sorted_unique(outlinks),
            inlinks: Vec::new(),
            hub: 1.0,
            authority: 1.0,
        }
    }

    pub fn outlinks(&self) -> &[String] {
        &self.outlinks
    }

    pub fn inlinks(&self) -> &[String] {
        &self.inlinks
    }
}

/// Directed graph of pages keyed by address.
///
/// Links of a page are read-only outside this module. Every way of changing them
/// ([`PageGraph::insert`], [`PageGraph::set_outlinks`], building the graph) recomputes
/// inlinks for the whole graph, so inlinks always match the outlink relation.
#[derive(Debug, Clone, Default)]
pub struct PageGraph {
    pages: BTreeMap<String, Page>,
}

impl PageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from a content index by extracting the outlinks of every page.
    /// Each page's own address serves as base for relative links.
    pub fn from_content(content: &ContentIndex, policy: LinkPolicy) -> Self {
        let mut pages = BTreeMap::new();
        for (rank, (address, raw)) in content.iter().enumerate() {
            let base = Url::parse(address).ok();
            let outlinks = find_outlinks(raw, base.as_ref(), policy);
            debug!("Page {} has {} outlinks", address, outlinks.len());
            pages.insert(address.to_string(), Page::new(address, rank + 1, outlinks));
        }

        let mut graph = Self { pages };
        graph.refresh_inlinks();
        graph
    }

    pub fn insert(&mut self, page: Page) {
        self.pages.insert(page.address.clone(), page);
        self.refresh_inlinks();
    }

    pub fn set_outlinks(&mut self, address: &str, outlinks: Vec<String>) {
        if let Some(page) = self.pages.get_mut(address) {
            page.outlinks = sorted_unique(outlinks);
            self.refresh_inlinks();
        }
    }

    pub fn get(&self, address: &str) -> Option<&Page> {
        self.pages.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut Page> {
        self.pages.get_mut(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.pages.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates in address order
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Addresses of every page listing `address` among its outlinks, sorted.
    /// Scans the whole graph on every call.
    pub fn determine_inlinks(&self, address: &str) -> Vec<String> {
        self.pages
            .values()
            .filter(|page| page.outlinks.iter().any(|link| link == address))
            .map(|page| page.address.clone())
            .collect()
    }

    /// Recomputes the inlinks of every page from the current outlinks
    pub fn refresh_inlinks(&mut self) {
        let inlinks: Vec<(String, Vec<String>)> = self
            .pages
            .keys()
            .map(|address| (address.clone(), self.determine_inlinks(address)))
            .collect();
        for (address, links) in inlinks {
            if let Some(page) = self.pages.get_mut(&address) {
                page.inlinks = links;
            }
        }
    }

    /// Inlinks of `address` that are pages of this graph
    pub fn inlinks_within(&self, address: &str) -> Vec<&str> {
        self.neighbours_within(address, |page| &page.inlinks)
    }

    /// Outlinks of `address` that are pages of this graph
    pub fn outlinks_within(&self, address: &str) -> Vec<&str> {
        self.neighbours_within(address, |page| &page.outlinks)
    }

    fn neighbours_within<'a>(&'a self, address: &str, links: impl Fn(&'a Page) -> &'a Vec<String>) -> Vec<&'a str> {
        match self.pages.get(address) {
            Some(page) => links(page)
                .iter()
                .filter(|link| self.pages.contains_key(link.as_str()))
                .map(String::as_str)
                .collect(),
            None => Vec::new(),
        }
    }

    /// The seed pages plus every page one outbound or inbound hop away.
    /// Seeds are kept whenever they are in the graph; neighbours are added only
    /// when they are in the graph and have content.
    pub fn expand_pages(&self, seed: &BTreeSet<String>, content: &ContentIndex) -> BTreeSet<String> {
        let eligible = |address: &str| self.pages.contains_key(address) && content.contains(address);

        let mut expanded = BTreeSet::new();
        for address in seed {
            let Some(page) = self.pages.get(address) else {
                debug!("Seed page {} is not in the graph", address);
                continue;
            };
            expanded.insert(address.clone());
            for neighbour in page.outlinks.iter().chain(page.inlinks.iter()) {
                if eligible(neighbour) {
                    expanded.insert(neighbour.clone());
                } else {
                    debug!("Skipping {} while expanding {}: no content", neighbour, address);
                }
            }
        }
        expanded
    }

    /// Sets hub and authority of every page to `value`
    pub fn reset_scores(&mut self, value: f64) {
        for page in self.pages.values_mut() {
            page.hub = value;
            page.authority = value;
        }
    }
}

impl FromIterator<Page> for PageGraph {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        let mut graph = Self {
            pages: iter.into_iter().map(|page| (page.address.clone(), page)).collect(),
        };
        graph.refresh_inlinks();
        graph
    }
}

fn sorted_unique(mut links: Vec<String>) -> Vec<String> {
    links.sort();
    links.dedup();
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(|a| a.to_string()).collect()
    }

    fn set(addresses: &[&str]) -> BTreeSet<String> {
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
        ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|a| (a.to_string(), format!("content of {}", a)))
            .collect()
    }

    #[test]
    fn test_determine_inlinks() {
        let graph = setup_graph();
        assert_eq!(graph.determine_inlinks("A"), links(&["B", "C", "E"]));
        assert!(graph.determine_inlinks("E").is_empty());
        assert_eq!(graph.determine_inlinks("F"), links(&["E"]));
    }

    #[test]
    fn test_inlinks_match_outlink_relation() {
        let graph = setup_graph();
        for page in graph.pages() {
            let expected: Vec<String> = graph
                .pages()
                .filter(|other| other.outlinks().contains(&page.address))
                .map(|other| other.address.clone())
                .collect();
            assert_eq!(page.inlinks(), expected.as_slice(), "inlinks of {}", page.address);
        }
    }

    #[test]
    fn test_set_outlinks_refreshes_inlinks() {
        let mut graph = setup_graph();
        graph.set_outlinks("F", links(&["A", "A"]));
        assert_eq!(graph.get("F").unwrap().outlinks(), links(&["A"]).as_slice());
        assert_eq!(graph.get("A").unwrap().inlinks(), links(&["B", "C", "E", "F"]).as_slice());
    }

    #[test]
    fn test_neighbours_within_graph() {
        let mut graph = setup_graph();
        graph.set_outlinks("A", links(&["D", "https://elsewhere.org"]));
        assert_eq!(graph.outlinks_within("A"), vec!["D"]);
        assert_eq!(graph.inlinks_within("A"), vec!["B", "C", "E"]);
        assert!(graph.inlinks_within("missing").is_empty());
    }

    #[test]
    fn test_expand_single_page() {
        let graph = setup_graph();
        let expanded = graph.expand_pages(&set(&["F"]), &setup_content());
        assert_eq!(expanded, set(&["E", "F"]));
    }

    #[test]
    fn test_expand_reaches_whole_graph() {
        let graph = setup_graph();
        let expanded = graph.expand_pages(&set(&["A", "E"]), &setup_content());
        assert_eq!(expanded, set(&["A", "B", "C", "D", "E", "F"]));
    }

    #[test]
    fn test_expand_skips_pages_without_content() {
        let graph = setup_graph();
        let mut content = ContentIndex::new();
        content.insert("F", "only F is loaded");
        let expanded = graph.expand_pages(&set(&["F"]), &content);
        assert_eq!(expanded, set(&["F"]));
    }

    #[test]
    fn test_expand_keeps_seed_without_content() {
        let graph = setup_graph();
        let mut content = ContentIndex::new();
        content.insert("E", "only E is loaded");
        let expanded = graph.expand_pages(&set(&["F"]), &content);
        assert_eq!(expanded, set(&["E", "F"]));
    }

    #[test]
    fn test_insert_refreshes_inlinks() {
        let mut graph = setup_graph();
        graph.insert(Page::new("G", 7, links(&["D", "F"])));
        assert_eq!(graph.len(), 7);
        assert_eq!(graph.get("D").unwrap().inlinks(), links(&["A", "B", "C", "E", "G"]).as_slice());
        assert_eq!(graph.get("F").unwrap().inlinks(), links(&["E", "G"]).as_slice());
        assert!(graph.get("G").unwrap().inlinks().is_empty());
    }

    #[test]
    fn test_expand_unknown_seed() {
        let graph = setup_graph();
        assert!(graph.expand_pages(&set(&["Z"]), &setup_content()).is_empty());
    }

    #[test]
    fn test_from_content() {
        let mut content = ContentIndex::new();
        content.insert("https://example.com/a", r#"<a href="/b">b</a> <a href="https://other.org/x">x</a>"#);
        content.insert("https://example.com/b", r#"<a href="/a/">a</a>"#);

        let graph = PageGraph::from_content(&content, LinkPolicy::SameHost);
        let a = graph.get("https://example.com/a").unwrap();
        assert_eq!(a.rank, 1);
        assert_eq!(a.outlinks(), links(&["https://example.com/b"]).as_slice());
        assert_eq!(a.inlinks(), links(&["https://example.com/b"]).as_slice());
        assert_eq!(graph.get("https://example.com/b").unwrap().rank, 2);
    }

    #[test]
    fn test_reset_scores() {
        let mut graph = setup_graph();
        graph.get_mut("A").unwrap().hub = 0.25;
        graph.reset_scores(1.0);
        assert!(graph.pages().all(|p| p.hub == 1.0 && p.authority == 1.0));
    }
}
