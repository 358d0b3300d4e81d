//! Plugin instantiation, content loading and contribution aggregation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use pier_config::{DEFAULT_PLUGIN_ID, PluginDescriptor};
use pier_routes::RouteSet;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::Plugin;
use crate::actions::{DataFile, RouteActions};
use crate::context::LoadContext;
use crate::error::PluginError;
use crate::html_tags::RenderedHtmlTags;
use crate::ids::ensure_unique_plugin_ids;
use crate::registry::PluginRegistry;
use crate::synthetic::{
    BOOTSTRAP_PLUGIN_NAME, BootstrapPlugin, MDX_FALLBACK_PLUGIN_NAME, MdxFallbackPlugin,
};
use crate::versions::PluginVersion;

/// A created plugin together with where it came from.
pub struct PluginInstance {
    name: String,
    instance_id: Option<String>,
    module: String,
    version: PluginVersion,
    plugin: Box<dyn Plugin>,
}

impl PluginInstance {
    pub fn new(
        module: impl Into<String>,
        instance_id: Option<String>,
        plugin: Box<dyn Plugin>,
    ) -> Self {
        Self {
            name: plugin.name().to_owned(),
            version: plugin.version(),
            instance_id,
            module: module.into(),
            plugin,
        }
    }

    /// Name the plugin reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance id, `default` when none was given.
    pub fn id(&self) -> &str {
        self.instance_id.as_deref().unwrap_or(DEFAULT_PLUGIN_ID)
    }

    /// `name@id`, used to attribute routes and errors.
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.id())
    }

    /// Resolved module the instance was created from.
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> &PluginVersion {
        &self.version
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }

    fn summary(&self) -> PluginSummary {
        PluginSummary {
            name: self.name.clone(),
            id: self.id().to_owned(),
            module: self.module.clone(),
            version: self.version.clone(),
        }
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("name", &self.name)
            .field("instance_id", &self.instance_id)
            .field("module", &self.module)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Identity of a loaded plugin instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub name: String,
    pub id: String,
    pub module: String,
    pub version: PluginVersion,
}

/// Everything the plugins contributed, in plugin order.
#[derive(Debug, Default)]
pub struct LoadedPlugins {
    /// Every instance, declared ones first, then the synthetic ones.
    pub plugins: Vec<PluginSummary>,
    /// Route subtrees, one set per instance that provides routes.
    pub route_sets: Vec<RouteSet>,
    /// Data files created while contributing routes.
    pub data_files: Vec<DataFile>,
    /// Plugin name to instance id to global data.
    pub global_data: BTreeMap<String, BTreeMap<String, Value>>,
    /// Client modules in plugin order.
    pub client_modules: Vec<String>,
    /// Rendered HTML tags of all plugins.
    pub html_tags: RenderedHtmlTags,
    /// Default code translations; later plugins override earlier ones.
    pub default_code_translations: BTreeMap<String, String>,
}

/// Create an instance for every descriptor, then the synthetic plugins.
///
/// Instances are created in parallel but keep descriptor order. Instance ids
/// are checked before any plugin loads content.
///
/// # Errors
///
/// Returns the first creation error in descriptor order, or
/// [`PluginError::DuplicatePluginId`] if instance ids conflict.
pub fn init_plugins(
    registry: &PluginRegistry,
    ctx: &LoadContext,
    descriptors: &[PluginDescriptor],
) -> Result<Vec<PluginInstance>, PluginError> {
    let start = Instant::now();

    let mut instances = descriptors
        .par_iter()
        .map(|descriptor| {
            registry.create(ctx, descriptor).map(|plugin| {
                PluginInstance::new(&descriptor.module, descriptor.instance_id.clone(), plugin)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let content_paths: Vec<PathBuf> = instances
        .iter()
        .flat_map(|instance| instance.plugin.content_paths())
        .collect();
    instances.push(PluginInstance::new(
        BOOTSTRAP_PLUGIN_NAME,
        None,
        Box::new(BootstrapPlugin::new(&ctx.site_config)),
    ));
    instances.push(PluginInstance::new(
        MDX_FALLBACK_PLUGIN_NAME,
        None,
        Box::new(MdxFallbackPlugin::new(content_paths)),
    ));

    ensure_unique_plugin_ids(
        instances
            .iter()
            .map(|instance| (instance.name.as_str(), instance.instance_id.as_deref())),
    )?;

    tracing::info!(
        plugins = instances.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Plugins initialized"
    );
    Ok(instances)
}

/// Load every instance's content in parallel, then collect contributions.
///
/// Contributions are aggregated sequentially in instance order so the
/// result does not depend on scheduling.
///
/// # Errors
///
/// Returns [`PluginError::Lifecycle`] naming the failing instance and step.
pub fn load_plugins(
    instances: &mut [PluginInstance],
    ctx: &LoadContext,
) -> Result<LoadedPlugins, PluginError> {
    let start = Instant::now();

    instances.par_iter_mut().try_for_each(|instance| {
        let plugin_start = Instant::now();
        instance
            .plugin
            .load_content(ctx)
            .map_err(|e| lifecycle(instance, "load_content", e))?;
        tracing::debug!(
            plugin = %instance.key(),
            elapsed_ms = plugin_start.elapsed().as_secs_f64() * 1000.0,
            "Content loaded"
        );
        Ok(())
    })?;

    let mut loaded = LoadedPlugins::default();
    for instance in instances.iter() {
        collect_contributions(instance, ctx, &mut loaded)?;
    }

    tracing::info!(
        plugins = instances.len(),
        route_sets = loaded.route_sets.len(),
        data_files = loaded.data_files.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Plugins loaded"
    );
    Ok(loaded)
}

fn collect_contributions(
    instance: &PluginInstance,
    ctx: &LoadContext,
    loaded: &mut LoadedPlugins,
) -> Result<(), PluginError> {
    let plugin = instance.plugin();
    loaded.plugins.push(instance.summary());

    if let Some(provider) = plugin.route_provider() {
        let mut actions = RouteActions::new(&instance.name, instance.id());
        provider
            .contribute_routes(ctx, &mut actions)
            .map_err(|e| lifecycle(instance, "contribute_routes", e))?;
        let (routes, data_files) = actions.into_parts();
        tracing::debug!(
            plugin = %instance.key(),
            routes = routes.len(),
            data_files = data_files.len(),
            "Routes contributed"
        );
        loaded.route_sets.push(RouteSet {
            owner: instance.key(),
            routes,
        });
        loaded.data_files.extend(data_files);
    }

    if let Some(provider) = plugin.global_data_provider() {
        loaded
            .global_data
            .entry(instance.name.clone())
            .or_default()
            .insert(instance.id().to_owned(), provider.global_data());
    }

    if let Some(provider) = plugin.client_modules_provider() {
        loaded.client_modules.extend(provider.client_modules());
    }

    if let Some(provider) = plugin.html_tags_provider() {
        loaded
            .html_tags
            .append(&provider.html_tags())
            .map_err(|message| PluginError::InvalidHtmlTag {
                plugin: instance.key(),
                message,
            })?;
    }

    if let Some(provider) = plugin.translations_provider() {
        loaded
            .default_code_translations
            .extend(provider.default_code_translations());
    }

    Ok(())
}

fn lifecycle(instance: &PluginInstance, stage: &'static str, source: PluginError) -> PluginError {
    PluginError::Lifecycle {
        plugin: instance.key(),
        stage,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use pier_config::ModuleKind;
    use pier_routes::RouteConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::html_tags::HtmlTag;
    use crate::testing::{StaticPlugin, context};

    fn descriptor(module: &str, id: Option<&str>, options: Value) -> PluginDescriptor {
        PluginDescriptor {
            module: module.to_owned(),
            kind: ModuleKind::Plugin,
            instance_id: id.map(str::to_owned),
            options,
        }
    }

    /// Registry whose `static` plugin reads its contributions from options.
    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry.register_plugin("static", |_, descriptor| {
            let options = &descriptor.options;
            let mut plugin = StaticPlugin::new(options["name"].as_str().unwrap_or("static"));
            if let Some(path) = options["route"].as_str() {
                plugin.routes.push(RouteConfig::new(path, "@theme/Page").exact());
            }
            plugin.global_data = options.get("data").cloned();
            plugin.client_modules = options["client"]
                .as_array()
                .map(|modules| {
                    modules
                        .iter()
                        .filter_map(|m| m.as_str().map(str::to_owned))
                        .collect()
                })
                .unwrap_or_default();
            if let Some(tag) = options["head"].as_str() {
                plugin.tags.head.push(HtmlTag::Raw(tag.to_owned()));
            }
            if let Some(text) = options["close"].as_str() {
                plugin
                    .translations
                    .insert("theme.close".to_owned(), text.to_owned());
            }
            if let Some(path) = options["content"].as_str() {
                plugin.content_paths.push(PathBuf::from(path));
            }
            plugin.fail_load = options["fail"].as_bool().unwrap_or(false);
            Ok(Box::new(plugin))
        });
        registry
    }

    #[test]
    fn test_synthetic_plugins_appended() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");

        let instances = init_plugins(
            &registry(),
            &ctx,
            &[descriptor("static", None, json!({"name": "a"}))],
        )
        .unwrap();

        let names: Vec<&str> = instances.iter().map(PluginInstance::name).collect();
        assert_eq!(
            names,
            vec!["a", BOOTSTRAP_PLUGIN_NAME, MDX_FALLBACK_PLUGIN_NAME]
        );
        assert_eq!(instances[0].key(), "a@default");
        assert_eq!(instances[1].version(), &PluginVersion::Synthetic);
    }

    #[test]
    fn test_instance_order_follows_descriptors() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");
        let descriptors: Vec<PluginDescriptor> = (0..16)
            .map(|i| descriptor("static", None, json!({"name": format!("p{i}")})))
            .collect();

        let instances = init_plugins(&registry(), &ctx, &descriptors).unwrap();

        for (i, instance) in instances.iter().take(16).enumerate() {
            assert_eq!(instance.name(), format!("p{i}"));
        }
    }

    #[test]
    fn test_duplicate_ids_fail_before_loading() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");
        let descriptors = [
            descriptor("static", Some("one"), json!({"name": "docs"})),
            descriptor("static", None, json!({"name": "docs"})),
        ];

        let err = init_plugins(&registry(), &ctx, &descriptors).unwrap_err();

        assert!(matches!(err, PluginError::DuplicatePluginId { .. }));
    }

    #[test]
    fn test_unknown_module_fails() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");

        let err = init_plugins(&registry(), &ctx, &[descriptor("missing", None, json!({}))])
            .unwrap_err();

        assert!(matches!(err, PluginError::UnknownModule { .. }));
    }

    #[test]
    fn test_contributions_aggregated_in_order() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");
        let descriptors = [
            descriptor(
                "static",
                Some("first"),
                json!({"name": "docs", "route": "/a", "data": {"n": 1}, "client": ["./a.js"], "head": "<meta a>", "close": "Close", "content": "/site/docs"}),
            ),
            descriptor(
                "static",
                Some("second"),
                json!({"name": "docs", "route": "/b", "data": {"n": 2}, "client": ["./b.js"], "head": "<meta b>", "close": "Fermer"}),
            ),
        ];
        let mut instances = init_plugins(&registry(), &ctx, &descriptors).unwrap();

        let loaded = load_plugins(&mut instances, &ctx).unwrap();

        let owners: Vec<&str> = loaded.route_sets.iter().map(|s| s.owner.as_str()).collect();
        assert_eq!(
            owners,
            vec![
                "docs@first",
                "docs@second",
                "pier-mdx-fallback-plugin@default"
            ]
        );
        assert_eq!(loaded.route_sets[0].routes[0].path, "/a");
        assert_eq!(
            loaded.global_data["docs"],
            BTreeMap::from([
                ("first".to_owned(), json!({"n": 1})),
                ("second".to_owned(), json!({"n": 2})),
            ])
        );
        assert_eq!(loaded.client_modules, vec!["./a.js", "./b.js"]);
        assert_eq!(loaded.html_tags.head_tags, "<meta a>\n<meta b>");
        assert_eq!(loaded.default_code_translations["theme.close"], "Fermer");
        assert_eq!(loaded.plugins.len(), 4);

        let loaded_flag = loaded
            .data_files
            .iter()
            .find(|f| f.path == PathBuf::from("docs/first/loaded.json"))
            .unwrap();
        assert_eq!(loaded_flag.content, "true");
        let fallback = loaded
            .data_files
            .iter()
            .find(|f| f.path.ends_with("fallback-transform.json"))
            .unwrap();
        assert!(fallback.content.contains("/site/docs"));
    }

    #[test]
    fn test_load_failure_names_instance() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");
        let descriptors = [descriptor(
            "static",
            Some("api"),
            json!({"name": "docs", "fail": true}),
        )];
        let mut instances = init_plugins(&registry(), &ctx, &descriptors).unwrap();

        let err = load_plugins(&mut instances, &ctx).unwrap_err();

        match err {
            PluginError::Lifecycle { plugin, stage, .. } => {
                assert_eq!(plugin, "docs@api");
                assert_eq!(stage, "load_content");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_tag_fails() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");
        let mut instances = vec![PluginInstance::new(
            "static",
            None,
            Box::new(StaticPlugin {
                tags: crate::html_tags::HtmlTags {
                    head: vec![HtmlTag::Element(crate::html_tags::HtmlTagObject::new(
                        "bad tag",
                        std::iter::empty(),
                    ))],
                    ..Default::default()
                },
                ..StaticPlugin::new("tags")
            }),
        )];

        let err = load_plugins(&mut instances, &ctx).unwrap_err();

        assert!(matches!(err, PluginError::InvalidHtmlTag { ref plugin, .. } if plugin == "tags@default"));
    }
}
