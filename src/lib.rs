pub mod config;
pub mod content;
pub mod convergence;
pub mod fetch;
pub mod hits;
pub mod links;
pub mod page_graph;

pub use content::ContentIndex;
pub use convergence::ConvergenceDetector;
pub use hits::{HitsConfig, HitsEngine, RankedPage, Ranking};
pub use links::{LinkPolicy, find_outlinks, resolve, strip_markup};
pub use page_graph::{Page, PageGraph};
