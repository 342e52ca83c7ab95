//! Rendered-page cache keyed by dashboard route.
//!
//! A cached page is served until a mutation revalidates its route; the next
//! request then fetches fresh data and re-renders. Anonymous and signed-in
//! renders of the same route are cached separately because they differ in
//! the edit controls they show.
//!
//! Each route carries a generation that `revalidate` bumps. A page is only
//! stored if no revalidation of its route, or of a route above it, happened
//! between reading the generation and inserting.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PageKey {
    route: String,
    signed_in: bool,
}

#[derive(Debug, Default)]
struct Pages {
    html: HashMap<PageKey, String>,
    /// Bumped by every `revalidate` of the route.
    generations: HashMap<String, u64>,
}

impl Pages {
    /// Sum of the generations of `route` and all of its ancestors, so a
    /// revalidation anywhere above the route changes it too.
    fn generation(&self, route: &str) -> u64 {
        ancestors(route)
            .filter_map(|r| self.generations.get(r))
            .sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageCache {
    pages: Arc<RwLock<Pages>>,
}

fn normalize(route: &str) -> String {
    route.trim_matches('/').to_string()
}

/// `a/b/c` -> `a`, `a/b`, `a/b/c`.
fn ancestors(route: &str) -> impl Iterator<Item = &str> {
    route
        .match_indices('/')
        .map(move |(i, _)| &route[..i])
        .chain(std::iter::once(route))
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, route: &str, signed_in: bool) -> Option<String> {
        let key = PageKey {
            route: normalize(route),
            signed_in,
        };
        self.pages.read().await.html.get(&key).cloned()
    }

    /// Current generation of `route`. Read it before fetching the data a
    /// page is rendered from and hand it back to `insert`.
    pub async fn generation(&self, route: &str) -> u64 {
        self.pages.read().await.generation(&normalize(route))
    }

    /// Store `html` unless `route` was revalidated since `generation` was
    /// read. Returns whether the page was stored.
    pub async fn insert(
        &self,
        route: &str,
        signed_in: bool,
        html: String,
        generation: u64,
    ) -> bool {
        let route = normalize(route);
        let mut pages = self.pages.write().await;
        if pages.generation(&route) != generation {
            tracing::debug!(%route, "discarding page rendered before revalidation");
            return false;
        }
        pages.html.insert(PageKey { route, signed_in }, html);
        true
    }

    /// Mark `route` and every route below it stale.
    pub async fn revalidate(&self, route: &str) {
        let route = normalize(route);
        let prefix = format!("{route}/");
        let mut pages = self.pages.write().await;
        let before = pages.html.len();
        pages
            .html
            .retain(|key, _| key.route != route && !key.route.starts_with(&prefix));
        let evicted = before - pages.html.len();
        *pages.generations.entry(route.clone()).or_default() += 1;
        tracing::debug!(%route, evicted, "route revalidated");
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.html.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
