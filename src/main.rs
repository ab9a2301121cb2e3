use log2::*;
use anyhow::Result;
use url::Url;
use std::sync::Arc;
use std::time::Instant;

use wiki_hits::config::Config;
use wiki_hits::{fetch, ContentIndex, HitsEngine, PageGraph, Ranking};

/// Indicates start time of a project, lazily initialized
pub static START_TIME: once_cell::sync::Lazy<Instant> = once_cell::sync::Lazy::new(Instant::now);

#[tokio::main]
async fn main() -> Result<()> {
    let _ = *START_TIME;
    let cfg = Config::new();
    cfg.validate()?;
    let _log2 = stdout()
        .module(true) // include module name
        .module_with_line(true) // include line number from module
        .module_filter(|module| module.starts_with("wiki_hits")) // include only modules having this pattern
        .compress(false)
        .level(cfg.log_level.to_string())
        .start();

    let content = match &cfg.content_file {
        Some(path) => ContentIndex::from_json_file(path)?,
        None => {
            let addresses = cfg
                .addresses
                .iter()
                .map(|address| Url::parse(address))
                .collect::<Result<Vec<Url>, _>>()?;
            fetch::load_pages(addresses, Arc::new(cfg.fetch_config())).await?
        }
    };
    info!("Content index holds {} pages", content.len());

    let mut graph = PageGraph::from_content(&content, cfg.link_policy.into());
    let engine = HitsEngine::new(&content, cfg.hits_config());
    let ranking = engine.run(&mut graph, &cfg.query);

    print_ranking(&ranking, cfg.top);
    if let Some(path) = &cfg.output_file {
        std::fs::write(path, serde_json::to_string_pretty(&ranking)?)?;
        info!("Ranking written to {:?}", path);
    }

    info!("Done in {:?}", START_TIME.elapsed());
    Ok(())
}

/// Print the ranking in a readable format
fn print_ranking(ranking: &Ranking, top: Option<usize>) {
    if ranking.pages.is_empty() {
        println!("No relevant pages found");
        return;
    }
    println!(
        "{} pages after {} iterations{}:",
        ranking.pages.len(),
        ranking.iterations,
        if ranking.converged { "" } else { " (not converged)" }
    );
    let shown = top.unwrap_or(ranking.pages.len());
    for (i, page) in ranking.pages.iter().take(shown).enumerate() {
        println!("  {:>3}. authority {:.4}  hub {:.4}  {}", i + 1, page.authority, page.hub, page.address);
    }
}
