//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled route templates in registration order
//! - Look up the first template matching a path
//! - Return the matched route with its captured parameters, or explicit no-match
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards (shared via Arc without locks)
//! - First match wins; no specificity ranking
//! - Generic over the bound handler so matching stays independent of HTTP

use std::collections::HashMap;

use super::matcher::{PathMatcher, PatternError};

/// A compiled template bound to its handler.
#[derive(Debug)]
pub struct RouteTemplate<H> {
    matcher: PathMatcher,
    handler: H,
}

impl<H> RouteTemplate<H> {
    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    /// Declared parameter names, in order of appearance.
    pub fn param_names(&self) -> &[String] {
        self.matcher.names()
    }

    /// Number of parameters the template declares.
    pub fn param_count(&self) -> usize {
        self.matcher.names().len()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

/// Result of matching a path against the table.
#[derive(Debug)]
pub struct ResolvedRoute<'a, H> {
    pub route: &'a RouteTemplate<H>,
    pub params: HashMap<String, String>,
}

impl<H> ResolvedRoute<'_, H> {
    /// Number of parameters actually captured from the path.
    pub fn captured(&self) -> usize {
        self.params.len()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Ordered set of route templates.
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: Vec<RouteTemplate<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template` and append it after previously registered routes.
    pub fn register(&mut self, template: &str, handler: H) -> Result<(), PatternError> {
        let matcher = PathMatcher::compile(template)?;
        tracing::debug!(template, params = ?matcher.names(), "Route registered");
        self.routes.push(RouteTemplate { matcher, handler });
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn route(mut self, template: &str, handler: H) -> Result<Self, PatternError> {
        self.register(template, handler)?;
        Ok(self)
    }

    /// Find the first route whose template matches `path`.
    pub fn match_path(&self, path: &str) -> Option<ResolvedRoute<'_, H>> {
        self.routes.iter().find_map(|route| {
            route
                .matcher
                .captures(path)
                .map(|params| ResolvedRoute { route, params })
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteTemplate<H>> {
        self.routes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registered_match_wins() {
        let table = RouteTable::new()
            .route("/a/{x}", "param")
            .unwrap()
            .route("/a/b", "literal")
            .unwrap();

        let resolved = table.match_path("/a/b").unwrap();
        assert_eq!(*resolved.route.handler(), "param");
        assert_eq!(resolved.param("x"), Some("b"));
    }

    #[test]
    fn unmatched_path_is_none() {
        let table = RouteTable::new().route("/users/{id}", ()).unwrap();
        assert!(table.match_path("/accounts/1").is_none());
    }

    #[test]
    fn arity_reflects_captured_parameters() {
        let table = RouteTable::new().route("/users/{id}", ()).unwrap();

        let collection = table.match_path("/users").unwrap();
        assert_eq!(collection.captured(), 0);
        assert_eq!(collection.route.param_count(), 1);

        let item = table.match_path("/users/42").unwrap();
        assert_eq!(item.captured(), 1);
        assert_eq!(item.param("id"), Some("42"));
    }

    #[test]
    fn register_propagates_pattern_errors() {
        let mut table: RouteTable<()> = RouteTable::new();
        assert!(table.register("/users/{id", ()).is_err());
        assert!(table.is_empty());
    }
}
