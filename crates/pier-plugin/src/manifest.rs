//! Local plugins declared by a `plugin.toml` manifest.
//!
//! A site references a local plugin by path (`./plugins/banner`). The path is
//! either a manifest file or a directory containing one:
//!
//! ```toml
//! name = "banner"
//! client_modules = ["./banner.js"]
//!
//! [package]
//! name = "@acme/pier-plugin-banner"
//! version = "1.2.0"
//!
//! [[routes]]
//! path = "/banner"
//! component = "./Banner.jsx"
//!
//! [html_tags]
//! head = ["<meta name=\"banner\" content=\"on\">"]
//!
//! [global_data]
//! enabled = true
//!
//! [translations]
//! "banner.close" = "Close"
//! ```
//!
//! Route paths are relative to the site base URL. Component and module
//! references starting with `./` or `../` resolve against the manifest's
//! directory.

use std::collections::BTreeMap;
use std::path::Path;

use pier_routes::RouteConfig;
use serde::Deserialize;
use serde_json::Value;

use crate::actions::RouteActions;
use crate::context::LoadContext;
use crate::error::PluginError;
use crate::html_tags::HtmlTags;
use crate::versions::PluginVersion;
use crate::{
    ClientModulesProvider, GlobalDataProvider, HtmlTagsProvider, Plugin, RouteProvider,
    TranslationsProvider,
};

/// File name of a local plugin manifest.
pub const MANIFEST_FILENAME: &str = "plugin.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    name: String,
    package: Option<PackageInfo>,
    #[serde(default)]
    routes: Vec<RouteConfig>,
    #[serde(default)]
    client_modules: Vec<String>,
    #[serde(default)]
    html_tags: HtmlTags,
    global_data: Option<Value>,
    #[serde(default)]
    translations: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageInfo {
    name: String,
    version: Option<String>,
}

/// Plugin whose contributions are all declared in a manifest.
#[derive(Debug)]
pub struct ManifestPlugin {
    name: String,
    version: PluginVersion,
    routes: Vec<RouteConfig>,
    client_modules: Vec<String>,
    html_tags: HtmlTags,
    global_data: Option<Value>,
    translations: BTreeMap<String, String>,
}

impl ManifestPlugin {
    /// Load the manifest at `path`, or `path/plugin.toml` for a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or does not parse.
    pub fn load(path: &Path, ctx: &LoadContext) -> Result<Self, PluginError> {
        let manifest_path = if path.is_dir() {
            path.join(MANIFEST_FILENAME)
        } else {
            path.to_path_buf()
        };
        let content = std::fs::read_to_string(&manifest_path).map_err(|e| PluginError::Io {
            path: manifest_path.clone(),
            source: e,
        })?;
        let manifest: Manifest = toml::from_str(&content).map_err(|e| PluginError::Manifest {
            path: manifest_path.clone(),
            message: e.to_string(),
        })?;
        if manifest.name.trim().is_empty() {
            return Err(PluginError::Manifest {
                path: manifest_path,
                message: "`name` must not be empty".to_owned(),
            });
        }

        let dir = manifest_path.parent().unwrap_or(Path::new("."));
        let version = match manifest.package {
            Some(package) => PluginVersion::Package {
                name: package.name,
                version: package.version,
            },
            None if dir.starts_with(&ctx.site_dir) => PluginVersion::Project,
            None => PluginVersion::Local,
        };

        Ok(Self {
            name: manifest.name,
            version,
            routes: manifest
                .routes
                .into_iter()
                .map(|route| resolve_route(route, dir, &ctx.base_url))
                .collect(),
            client_modules: manifest
                .client_modules
                .iter()
                .map(|module| resolve_module(module, dir))
                .collect(),
            html_tags: manifest.html_tags,
            global_data: manifest.global_data,
            translations: manifest.translations,
        })
    }
}

fn resolve_route(mut route: RouteConfig, dir: &Path, base_url: &str) -> RouteConfig {
    route.path = join_url(base_url, &route.path);
    route.component = resolve_module(&route.component, dir);
    for module in route.modules.values_mut() {
        *module = resolve_module(module, dir);
    }
    route.routes = route
        .routes
        .into_iter()
        .map(|child| resolve_route(child, dir, base_url))
        .collect();
    route
}

fn resolve_module(module: &str, dir: &Path) -> String {
    if module.starts_with("./") || module.starts_with("../") {
        dir.join(module).display().to_string()
    } else {
        module.to_owned()
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl Plugin for ManifestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> PluginVersion {
        self.version.clone()
    }

    fn route_provider(&self) -> Option<&dyn RouteProvider> {
        (!self.routes.is_empty()).then_some(self as &dyn RouteProvider)
    }

    fn global_data_provider(&self) -> Option<&dyn GlobalDataProvider> {
        self.global_data
            .is_some()
            .then_some(self as &dyn GlobalDataProvider)
    }

    fn client_modules_provider(&self) -> Option<&dyn ClientModulesProvider> {
        (!self.client_modules.is_empty()).then_some(self as &dyn ClientModulesProvider)
    }

    fn html_tags_provider(&self) -> Option<&dyn HtmlTagsProvider> {
        Some(self)
    }

    fn translations_provider(&self) -> Option<&dyn TranslationsProvider> {
        (!self.translations.is_empty()).then_some(self as &dyn TranslationsProvider)
    }
}

impl RouteProvider for ManifestPlugin {
    fn contribute_routes(
        &self,
        _ctx: &LoadContext,
        actions: &mut RouteActions,
    ) -> Result<(), PluginError> {
        for route in &self.routes {
            actions.add_route(route.clone());
        }
        Ok(())
    }
}

impl GlobalDataProvider for ManifestPlugin {
    fn global_data(&self) -> Value {
        self.global_data.clone().unwrap_or(Value::Null)
    }
}

impl ClientModulesProvider for ManifestPlugin {
    fn client_modules(&self) -> Vec<String> {
        self.client_modules.clone()
    }
}

impl HtmlTagsProvider for ManifestPlugin {
    fn html_tags(&self) -> HtmlTags {
        self.html_tags.clone()
    }
}

impl TranslationsProvider for ManifestPlugin {
    fn default_code_translations(&self) -> BTreeMap<String, String> {
        self.translations.clone()
    }
}
