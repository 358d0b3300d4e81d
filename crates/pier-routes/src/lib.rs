//! Route assembly for Pier.
//!
//! Plugins contribute route subtrees independently. This crate merges them
//! into one sorted tree, checks for paths claimed more than once, assigns a
//! chunk name to every component and data module, and renders the route
//! config module consumed by the bundler.

mod chunk;
mod code;

use std::collections::BTreeMap;
use std::fmt::Write;

use pier_config::ReportingSeverity;
use serde::{Deserialize, Serialize};

pub use chunk::{COMPONENT_PREFIX, CONTENT_PREFIX};
pub use code::{COMPONENT_KEY, ChunkNames, route_key};

/// Component rendered for URLs no route matches.
pub const NOT_FOUND_COMPONENT: &str = "@theme/NotFound";

/// Path of the catch-all route.
pub const CATCH_ALL_PATH: &str = "*";

/// One node of the route tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// URL path, absolute and including the base URL.
    pub path: String,
    /// Module path of the component rendered for this route.
    pub component: String,
    /// Whether only the exact path matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
    /// Data modules passed to the component, keyed by prop name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, String>,
    /// Child routes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteConfig>,
    /// Higher priority routes are matched first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl RouteConfig {
    /// Route with a path and component, everything else unset.
    pub fn new(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            component: component.into(),
            exact: None,
            modules: BTreeMap::new(),
            routes: Vec::new(),
            priority: None,
        }
    }

    /// Mark the route as exact.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact = Some(true);
        self
    }

    /// Attach a data module under `prop`.
    #[must_use]
    pub fn with_module(mut self, prop: impl Into<String>, module: impl Into<String>) -> Self {
        self.modules.insert(prop.into(), module.into());
        self
    }

    fn is_exact(&self) -> bool {
        self.exact.unwrap_or(false)
    }
}

/// Routes contributed by one plugin instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteSet {
    /// Owning plugin, as `name@id`.
    pub owner: String,
    /// Top-level routes in contribution order.
    pub routes: Vec<RouteConfig>,
}

/// A path claimed by more than one leaf route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateRoute {
    /// Duplicated path.
    pub path: String,
    /// Owners of every route with this path, one entry per route.
    pub owners: Vec<String>,
}

/// Route assembly error.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Paths claimed more than once under the `throw` policy.
    #[error("{}", duplicate_routes_message(.0))]
    DuplicateRoutes(Vec<DuplicateRoute>),
}

/// Everything the emitter needs to know about routes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledRoutes {
    /// Sorted route tree contributed by plugins.
    pub routes: Vec<RouteConfig>,
    /// Every concrete route path, starting with the 404 page.
    pub routes_paths: Vec<String>,
    /// Chunk name to module path.
    pub registry: BTreeMap<String, String>,
    /// Route key to the chunk names of that route.
    pub routes_chunk_names: BTreeMap<String, ChunkNames>,
    /// Text of the route config module.
    pub routes_config_code: String,
}

/// Merge route subtrees into one tree and derive chunk data from it.
///
/// Duplicate leaf paths are reported according to `policy`; every other
/// severity than `throw` keeps all routes.
///
/// # Errors
///
/// Returns [`RouteError::DuplicateRoutes`] naming every duplicated path when
/// duplicates exist and `policy` is [`ReportingSeverity::Throw`].
pub fn assemble_routes(
    sets: &[RouteSet],
    base_url: &str,
    policy: ReportingSeverity,
) -> Result<AssembledRoutes, RouteError> {
    let duplicates = find_duplicate_routes(sets);
    report_duplicates(&duplicates, policy)?;

    let mut routes: Vec<RouteConfig> = sets.iter().flat_map(|s| s.routes.iter().cloned()).collect();
    sort_routes(&mut routes, base_url);

    let mut routes_paths = vec![format!("{base_url}404.html")];
    routes_paths.extend(flatten_routes(&routes).map(|r| r.path.clone()));

    let mut with_catch_all = routes.clone();
    with_catch_all.push(RouteConfig::new(CATCH_ALL_PATH, NOT_FOUND_COMPONENT));
    let generated = code::generate(&with_catch_all);

    Ok(AssembledRoutes {
        routes,
        routes_paths,
        registry: generated.registry,
        routes_chunk_names: generated.chunk_names,
        routes_config_code: generated.code,
    })
}

/// Sort routes the way they should be matched, recursively.
///
/// The home route (`base_url`) goes last, exact routes come before
/// non-exact ones, then higher priority first, then by path. The sort is
/// stable so duplicates keep contribution order.
pub fn sort_routes(routes: &mut [RouteConfig], base_url: &str) {
    routes.sort_by(|a, b| {
        let a_home = a.path == base_url;
        let b_home = b.path == base_url;
        a_home
            .cmp(&b_home)
            .then_with(|| b.is_exact().cmp(&a.is_exact()))
            .then_with(|| b.priority.unwrap_or(0).cmp(&a.priority.unwrap_or(0)))
            .then_with(|| a.path.cmp(&b.path))
    });
    for route in routes.iter_mut() {
        sort_routes(&mut route.routes, base_url);
    }
}

/// Leaf routes of a tree, depth first.
pub fn flatten_routes(routes: &[RouteConfig]) -> impl Iterator<Item = &RouteConfig> {
    let mut stack: Vec<&RouteConfig> = routes.iter().rev().collect();
    std::iter::from_fn(move || {
        while let Some(route) = stack.pop() {
            if route.routes.is_empty() {
                return Some(route);
            }
            stack.extend(route.routes.iter().rev());
        }
        None
    })
}

/// Paths claimed by more than one leaf route, in order of first appearance.
pub fn find_duplicate_routes(sets: &[RouteSet]) -> Vec<DuplicateRoute> {
    let mut owners_by_path: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    let mut order = Vec::new();
    for set in sets {
        for route in flatten_routes(&set.routes) {
            let owners = owners_by_path.entry(route.path.as_str()).or_insert_with(|| {
                order.push(route.path.as_str());
                Vec::new()
            });
            owners.push(set.owner.clone());
        }
    }

    order
        .into_iter()
        .filter_map(|path| {
            let owners = owners_by_path.remove(path)?;
            (owners.len() > 1).then(|| DuplicateRoute {
                path: path.to_owned(),
                owners,
            })
        })
        .collect()
}

/// Human-readable report of duplicate routes.
pub fn duplicate_routes_message(duplicates: &[DuplicateRoute]) -> String {
    let mut message = String::from("Duplicate routes found!\n");
    for duplicate in duplicates {
        let _ = writeln!(
            message,
            "- Attempting to create page at {}, but a page already exists at this route (created by {}).",
            duplicate.path,
            duplicate.owners.join(", ")
        );
    }
    message.push_str("This could lead to non-deterministic routing behavior.");
    message
}

fn report_duplicates(
    duplicates: &[DuplicateRoute],
    policy: ReportingSeverity,
) -> Result<(), RouteError> {
    if duplicates.is_empty() {
        return Ok(());
    }
    match policy {
        ReportingSeverity::Ignore => {}
        ReportingSeverity::Log => tracing::info!("{}", duplicate_routes_message(duplicates)),
        ReportingSeverity::Warn => tracing::warn!("{}", duplicate_routes_message(duplicates)),
        ReportingSeverity::Error => tracing::error!("{}", duplicate_routes_message(duplicates)),
        ReportingSeverity::Throw => return Err(RouteError::DuplicateRoutes(duplicates.to_vec())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn set(owner: &str, routes: Vec<RouteConfig>) -> RouteSet {
        RouteSet {
            owner: owner.to_owned(),
            routes,
        }
    }

    fn home() -> RouteConfig {
        RouteConfig::new("/", "@theme/Home").exact()
    }

    #[test]
    fn test_duplicate_home_throws() {
        let sets = vec![set("pages@default", vec![home()]), set("blog@default", vec![home()])];

        let err = assemble_routes(&sets, "/", ReportingSeverity::Throw).unwrap_err();

        let RouteError::DuplicateRoutes(duplicates) = &err;
        assert_eq!(
            duplicates,
            &vec![DuplicateRoute {
                path: "/".to_owned(),
                owners: vec!["pages@default".to_owned(), "blog@default".to_owned()],
            }]
        );
        let msg = err.to_string();
        assert!(msg.contains("Attempting to create page at /, but a page already exists at this route"));
        assert!(msg.contains("pages@default, blog@default"));
    }

    #[test]
    fn test_duplicate_home_ignored_keeps_both() {
        let sets = vec![set("pages@default", vec![home(), home()])];

        let assembled = assemble_routes(&sets, "/", ReportingSeverity::Ignore).unwrap();

        assert_eq!(assembled.routes.len(), 2);
        assert_eq!(assembled.routes_paths, vec!["/404.html", "/", "/"]);
    }

    #[test]
    fn test_non_throw_policies_succeed() {
        let sets = vec![set("a@default", vec![home()]), set("b@default", vec![home()])];

        for policy in [ReportingSeverity::Log, ReportingSeverity::Warn, ReportingSeverity::Error] {
            assert!(assemble_routes(&sets, "/", policy).is_ok());
        }
    }

    #[test]
    fn test_parent_routes_are_not_duplicates() {
        let mut first = RouteConfig::new("/docs", "@theme/DocPage");
        first.routes.push(RouteConfig::new("/docs/a", "@theme/DocItem").exact());
        let mut second = RouteConfig::new("/docs", "@theme/DocPage");
        second.routes.push(RouteConfig::new("/docs/b", "@theme/DocItem").exact());

        let duplicates = find_duplicate_routes(&[set("docs@a", vec![first]), set("docs@b", vec![second])]);

        assert!(duplicates.is_empty());
    }

    #[test]
    fn test_sort_order() {
        let mut routes = vec![
            RouteConfig::new("/", "@theme/Home").exact(),
            RouteConfig::new("/docs", "@theme/DocPage"),
            RouteConfig::new("/blog", "@theme/Blog").exact(),
            RouteConfig::new("/about", "@theme/About").exact(),
            RouteConfig {
                priority: Some(5),
                ..RouteConfig::new("/zeta", "@theme/Zeta").exact()
            },
        ];

        sort_routes(&mut routes, "/");

        let paths: Vec<_> = routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/zeta", "/about", "/blog", "/docs", "/"]);
    }

    #[test]
    fn test_sort_is_recursive() {
        let mut docs = RouteConfig::new("/docs", "@theme/DocPage");
        docs.routes = vec![
            RouteConfig::new("/docs/b", "@theme/DocItem").exact(),
            RouteConfig::new("/docs/a", "@theme/DocItem").exact(),
        ];
        let mut routes = vec![docs];

        sort_routes(&mut routes, "/");

        assert_eq!(routes[0].routes[0].path, "/docs/a");
    }

    #[test]
    fn test_routes_paths_are_leaves() {
        let mut docs = RouteConfig::new("/base/docs", "@theme/DocPage");
        docs.routes = vec![
            RouteConfig::new("/base/docs/a", "@theme/DocItem").exact(),
            RouteConfig::new("/base/docs/b", "@theme/DocItem").exact(),
        ];
        let sets = vec![set("docs@default", vec![docs])];

        let assembled = assemble_routes(&sets, "/base/", ReportingSeverity::Warn).unwrap();

        assert_eq!(
            assembled.routes_paths,
            vec!["/base/404.html", "/base/docs/a", "/base/docs/b"]
        );
    }

    #[test]
    fn test_catch_all_route_is_generated() {
        let sets = vec![set("pages@default", vec![home()])];

        let assembled = assemble_routes(&sets, "/", ReportingSeverity::Warn).unwrap();

        assert!(assembled.routes_config_code.contains("path: \"*\""));
        assert!(assembled.registry.values().any(|m| m == NOT_FOUND_COMPONENT));
        assert!(!assembled.routes_paths.contains(&"*".to_owned()));
        assert_eq!(assembled.routes_chunk_names.len(), 2);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let sets = vec![
            set("a@default", vec![RouteConfig::new("/x", "@theme/X").with_module("data", "@generated/x.json")]),
            set("b@default", vec![home()]),
        ];

        let first = assemble_routes(&sets, "/", ReportingSeverity::Warn).unwrap();
        let second = assemble_routes(&sets, "/", ReportingSeverity::Warn).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_route_config_from_json() {
        let route: RouteConfig = serde_json::from_str(
            r#"{"path": "/x", "component": "@theme/X", "exact": true, "modules": {"data": "./x.json"}}"#,
        )
        .unwrap();

        assert_eq!(
            route,
            RouteConfig::new("/x", "@theme/X")
                .exact()
                .with_module("data", "./x.json")
        );
    }
}
