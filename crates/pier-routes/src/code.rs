//! Route config module text and route chunk names.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::RouteConfig;
use crate::chunk::{COMPONENT_PREFIX, CONTENT_PREFIX, ChunkRegistry, short_hash};

/// Chunk-name key for a route's component.
pub const COMPONENT_KEY: &str = "__comp";

/// Module the generated route config imports its component factory from.
const COMPONENT_CREATOR: &str = "@pier/ComponentCreator";

/// Chunk names of one route, keyed by prop (`__comp` for the component).
pub type ChunkNames = BTreeMap<String, String>;

/// Output of [`generate`].
pub(crate) struct GeneratedRoutes {
    pub registry: BTreeMap<String, String>,
    pub chunk_names: BTreeMap<String, ChunkNames>,
    pub code: String,
}

/// Render the route config module and collect chunk names for every route.
pub(crate) fn generate(routes: &[RouteConfig]) -> GeneratedRoutes {
    let mut generator = Generator::default();
    let mut code = String::new();
    code.push_str("import React from 'react';\n");
    let _ = writeln!(code, "import ComponentCreator from {};", js_string(COMPONENT_CREATOR));
    code.push_str("\nexport default [\n");
    for route in routes {
        generator.route(route, 1, &mut code);
    }
    code.push_str("];\n");

    GeneratedRoutes {
        registry: generator.chunks.into_modules(),
        chunk_names: generator.chunk_names,
        code,
    }
}

/// Key under which a route's chunk names are stored: `<path>-<hash>`.
pub fn route_key(route: &RouteConfig) -> String {
    format!("{}-{}", route.path, route_hash(route))
}

fn route_hash(route: &RouteConfig) -> String {
    // RouteConfig holds only strings, maps and vectors, so serialization cannot fail
    let serialized = serde_json::to_string(route).unwrap_or_default();
    short_hash(&serialized)
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

#[derive(Default)]
struct Generator {
    chunks: ChunkRegistry,
    chunk_names: BTreeMap<String, ChunkNames>,
}

impl Generator {
    fn route(&mut self, route: &RouteConfig, depth: usize, out: &mut String) {
        let hash = route_hash(route);
        self.register_chunks(route, &hash);

        let pad = "  ".repeat(depth);
        let mut props = vec![
            format!("{pad}  path: {}", js_string(&route.path)),
            format!(
                "{pad}  component: ComponentCreator({}, {})",
                js_string(&route.path),
                js_string(&hash)
            ),
        ];
        if let Some(exact) = route.exact {
            props.push(format!("{pad}  exact: {exact}"));
        }
        if !route.routes.is_empty() {
            let mut children = String::new();
            for child in &route.routes {
                self.route(child, depth + 2, &mut children);
            }
            props.push(format!("{pad}  routes: [\n{children}{pad}  ]"));
        }

        let _ = writeln!(out, "{pad}{{\n{}\n{pad}}},", props.join(",\n"));
    }

    fn register_chunks(&mut self, route: &RouteConfig, hash: &str) {
        let mut names = ChunkNames::new();
        names.insert(
            COMPONENT_KEY.to_owned(),
            self.chunks.chunk_name(&route.component, COMPONENT_PREFIX),
        );
        for (prop, module) in &route.modules {
            names.insert(prop.clone(), self.chunks.chunk_name(module, CONTENT_PREFIX));
        }
        self.chunk_names
            .insert(format!("{}-{hash}", route.path), names);
    }
}
