use log2::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Base every Wikipedia article link is resolved against
pub const WIKIPEDIA_BASE: &str = "https://en.wikipedia.org";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href=['"]?([^'" >]+)"#).expect("href pattern is valid"));

/// Which of the links found on a page are kept as outlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Every link that resolves to an absolute URL
    #[default]
    All,
    /// Only links pointing at the same host as the page itself
    SameHost,
    /// Only `/wiki/` article links, resolved against [`WIKIPEDIA_BASE`]
    Wikipedia,
}

/// Removes everything between `<` and `>` (inclusive) and returns the rest verbatim.
pub fn strip_markup(raw: &str) -> String {
    TAG_RE.replace_all(raw, "").into_owned()
}

/// If `raw_href` is a full URL, returns it normalized. Otherwise joins it onto `base`.
/// Fragments and trailing slashes are dropped so the same page always gets the same address.
/// Returns `None` when the target can't be turned into an absolute http(s) URL.
pub fn resolve(raw_href: &str, base: Option<&Url>) -> Option<String> {
    let mut url = match Url::parse(raw_href) {
        Ok(parsed) if parsed.host().is_some() => parsed,
        _ => base?.join(raw_href).ok()?,
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let trimmed_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed_path);
    url.set_fragment(None);

    Some(url.to_string())
}

/// Scans raw page content for `href=` targets and returns the resolved links
/// allowed by `policy`, first occurrence order, duplicates removed.
///
/// `base` is the address of the page itself; relative targets are dropped when it's unknown.
pub fn find_outlinks(raw: &str, base: Option<&Url>, policy: LinkPolicy) -> Vec<String> {
    let wiki_base = Url::parse(WIKIPEDIA_BASE).ok();
    let mut found: Vec<String> = Vec::new();

    for capture in HREF_RE.captures_iter(raw) {
        let href = &capture[1];
        let resolved = match policy {
            LinkPolicy::Wikipedia => resolve(href, wiki_base.as_ref()).filter(|link| is_wikipedia_article(link)),
            LinkPolicy::All => resolve(href, base),
            LinkPolicy::SameHost => resolve(href, base).filter(|link| same_host(link, base)),
        };

        match resolved {
            Some(link) if !found.contains(&link) => found.push(link),
            Some(_) => {}
            None => debug!("Dropped link target {}", href),
        }
    }

    found
}

fn is_wikipedia_article(link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => url.host_str() == Some("en.wikipedia.org") && url.path().starts_with("/wiki/"),
        Err(_) => false,
    }
}

fn same_host(link: &str, base: Option<&Url>) -> bool {
    let Some(base_host) = base.and_then(|b| b.host_str()) else {
        return false;
    };
    match Url::parse(link) {
        Ok(url) => url.host_str() == Some(base_host),
        Err(_) => false,
    }
}
