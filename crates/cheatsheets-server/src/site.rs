use std::path::Path;
use std::sync::Arc;

use cheatsheets::SiteConfig;

use crate::error::Result;
use crate::handler::{
    Catalog, CheatsheetPages, ContentHandler, DirHandler, FilesHandler, INDEX_URL, IndexPages,
};

/// Extensions that never get the `.html` clean-URL fallback.
const COMMON_EXTENSIONS: [&str; 5] = [".html", ".js", ".css", ".txt", ".xml"];
const NOT_FOUND_PAGE: &str = "404.html";

/// Content resolved for a request URI.
#[derive(Debug)]
pub struct Found {
    /// URI of the handler entry that produced the content.
    pub uri: String,
    pub not_found: bool,
    pub body: Result<Vec<u8>>,
}

/// Ordered set of handlers; the first handler that serves a URI wins.
pub struct Site {
    handlers: Vec<Box<dyn ContentHandler>>,
    clean_urls: bool,
}

impl Site {
    pub fn new(handlers: Vec<Box<dyn ContentHandler>>) -> Self {
        Self {
            handlers,
            clean_urls: true,
        }
    }

    pub fn with_clean_urls(mut self, clean_urls: bool) -> Self {
        self.clean_urls = clean_urls;
        self
    }

    /// Every URL served by every handler, in handler order.
    pub fn urls(&self) -> Vec<String> {
        self.handlers.iter().flat_map(|h| h.urls()).collect()
    }

    pub fn find_exact(&self, uri: &str) -> Option<Result<Vec<u8>>> {
        self.handlers.iter().find_map(|h| h.get(uri))
    }

    /// Looks `uri` up: exact match, then `uri.html` for clean URLs, then the
    /// closest `404.html` from the deepest directory up to the root.
    pub fn find(&self, uri: &str) -> Option<Found> {
        let uri = if uri.ends_with('/') { INDEX_URL } else { uri };

        let mut candidates = vec![uri.to_string()];
        if self.clean_urls && !has_common_extension(uri) {
            candidates.push(format!("{uri}.html"));
        }
        candidates.extend(not_found_candidates(uri));

        candidates.into_iter().find_map(|candidate| {
            let body = self.find_exact(&candidate)?;
            Some(Found {
                not_found: is_not_found_page(&candidate),
                uri: candidate,
                body,
            })
        })
    }
}

fn has_common_extension(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    let file = lower.rsplit('/').next().unwrap_or(&lower);
    COMMON_EXTENSIONS.iter().any(|ext| file.ends_with(ext))
}

fn is_not_found_page(uri: &str) -> bool {
    uri.rsplit('/').next() == Some(NOT_FOUND_PAGE)
}

/// `404.html` candidates from the deepest directory of `uri` to the root.
pub fn not_found_candidates(uri: &str) -> Vec<String> {
    let mut parts: Vec<&str> = uri.trim_end_matches('/').split('/').collect();
    let mut candidates = Vec::new();
    while !parts.is_empty() {
        let candidate = format!("{}/{NOT_FOUND_PAGE}", parts.join("/"));
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
        parts.pop();
    }
    let root = format!("/{NOT_FOUND_PAGE}");
    if !candidates.contains(&root) {
        candidates.push(root);
    }
    candidates
}

/// Static files plus pages rendered from markdown on every request.
pub fn build_dynamic_site(config: &SiteConfig) -> Result<Site> {
    let files = FilesHandler::from_config(config)?;
    let catalog = Arc::new(Catalog::load(config)?);
    let handlers: Vec<Box<dyn ContentHandler>> = vec![
        Box::new(files),
        Box::new(IndexPages::new(catalog.clone())),
        Box::new(CheatsheetPages::new(catalog)),
    ];
    Ok(Site::new(handlers))
}

/// Serves a previously generated directory as is.
pub fn build_prod_site(dir: &Path) -> Site {
    Site::new(vec![Box::new(DirHandler::new(dir, "/"))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;

    struct Fixed(Vec<(&'static str, &'static str)>);

    impl ContentHandler for Fixed {
        fn urls(&self) -> Vec<String> {
            self.0.iter().map(|(url, _)| url.to_string()).collect()
        }

        fn get(&self, uri: &str) -> Option<Result<Vec<u8>>> {
            self.0
                .iter()
                .find(|(url, _)| *url == uri)
                .map(|(_, body)| Ok(body.as_bytes().to_vec()))
        }
    }

    fn site() -> Site {
        Site::new(vec![
            Box::new(Fixed(vec![("/index.html", "home"), ("/about.html", "about")])),
            Box::new(Fixed(vec![
                ("/404.html", "root 404"),
                ("/docs/404.html", "docs 404"),
            ])),
        ])
    }

    fn body(found: Found) -> String {
        String::from_utf8(found.body.unwrap()).unwrap()
    }

    #[test]
    fn candidates_walk_up_to_root() {
        assert_eq!(
            not_found_candidates("/docs/guide/x.html"),
            vec![
                "/docs/guide/x.html/404.html",
                "/docs/guide/404.html",
                "/docs/404.html",
                "/404.html",
            ]
        );
        assert_eq!(not_found_candidates("/"), vec!["/404.html"]);
    }

    #[test]
    fn exact_and_clean_urls() {
        let site = site();
        assert_eq!(body(site.find("/about.html").unwrap()), "about");
        assert_eq!(body(site.find("/about").unwrap()), "about");
        assert!(!site.find("/about").unwrap().not_found);
    }

    #[test]
    fn trailing_slash_serves_index() {
        let site = site();
        assert_eq!(body(site.find("/").unwrap()), "home");
        assert_eq!(body(site.find("/docs/").unwrap()), "home");
    }

    #[test]
    fn missing_pages_use_closest_404() {
        let site = site();
        let found = site.find("/docs/missing.html").unwrap();
        assert!(found.not_found);
        assert_eq!(body(found), "docs 404");

        let found = site.find("/other/missing.css").unwrap();
        assert_eq!(found.uri, "/404.html");
    }

    #[test]
    fn common_extensions_skip_clean_url_fallback() {
        let site = Site::new(vec![Box::new(Fixed(vec![("/app.js.html", "x")]))]);
        assert!(site.find("/app.js").is_none());
        let site = site.with_clean_urls(false);
        assert!(site.find("/app.js.html").is_some());
    }

    #[test]
    fn urls_are_listed_in_handler_order() {
        assert_eq!(
            site().urls(),
            vec!["/index.html", "/about.html", "/404.html", "/docs/404.html"]
        );
    }

    #[test]
    fn handler_errors_are_returned() {
        struct Failing;
        impl ContentHandler for Failing {
            fn urls(&self) -> Vec<String> {
                vec!["/x.html".into()]
            }
            fn get(&self, _: &str) -> Option<Result<Vec<u8>>> {
                Some(Err(ServerError::UnknownCheatsheet("x".into())))
            }
        }
        let site = Site::new(vec![Box::new(Failing)]);
        assert!(site.find("/x.html").unwrap().body.is_err());
    }
}
