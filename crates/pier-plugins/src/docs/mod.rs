//! `@pier/plugin-content-docs`: Markdown documentation with sidebars.
//!
//! Loading scans the content folder, reads front matter and titles, then
//! loads sidebars through `pier-sidebar`. Routes are one `DocPage` layout
//! route at the plugin's base path wrapping a `DocItem` route per document
//! and a page per generated-index category.

mod error;
mod options;
mod scanner;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use pier_plugin::{
    GlobalDataProvider, LoadContext, Plugin, PluginError, PluginVersion, RouteActions,
    RouteProvider,
};
use pier_routes::RouteConfig;
use pier_sidebar::{
    CategoryLink, DefaultNumberPrefixParser, DefaultSidebarItemsGenerator,
    DisabledNumberPrefixParser, LoadedSidebars, NumberPrefixParser, SidebarDoc, SidebarItem,
    SidebarProcessorParams, Sidebars, load_sidebars, slugify,
};
use serde::Serialize;
use serde_json::Value;

pub use error::DocsError;
pub use options::{DocsOptions, SidebarPathOption};
pub use scanner::DocMetadata;
use scanner::{ScanContext, join_url, scan_docs};

use crate::DOCS_PLUGIN_MODULE;

const PLUGIN_NAME: &str = "pier-plugin-content-docs";
const DOC_PAGE_COMPONENT: &str = "@theme/DocPage";
const DOC_ITEM_COMPONENT: &str = "@theme/DocItem";
const GENERATED_INDEX_COMPONENT: &str = "@theme/DocCategoryGeneratedIndexPage";

/// One instance of the documentation plugin.
#[derive(Debug)]
pub struct DocsPlugin {
    plugin_id: String,
    options: DocsOptions,
    content_dir: PathBuf,
    base_path: String,
    content: Option<DocsContent>,
}

#[derive(Debug)]
struct DocsContent {
    docs: Vec<DocMetadata>,
    sidebars: Option<Sidebars>,
}

/// Category page listing the items of a generated-index category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedIndex<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    slug: String,
    permalink: String,
    sidebar: &'a str,
    items: &'a [SidebarItem],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionMetadata<'a> {
    plugin_id: &'a str,
    path: &'a str,
    sidebars: &'a Sidebars,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GlobalData<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    main_doc_id: Option<&'a str>,
    docs: Vec<GlobalDoc<'a>>,
}

#[derive(Serialize)]
struct GlobalDoc<'a> {
    id: &'a str,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sidebar: Option<&'a str>,
}

impl DocsPlugin {
    pub fn new(ctx: &LoadContext, plugin_id: &str, options: DocsOptions) -> Self {
        Self {
            plugin_id: plugin_id.to_owned(),
            content_dir: ctx.site_dir.join(&options.path),
            base_path: join_url(&ctx.base_url, &[&options.route_base_path]),
            options,
            content: None,
        }
    }

    /// Documents, once content is loaded.
    pub fn docs(&self) -> &[DocMetadata] {
        self.content.as_ref().map_or(&[], |c| c.docs.as_slice())
    }

    /// Sidebars, once content is loaded and if enabled.
    pub fn sidebars(&self) -> Option<&Sidebars> {
        self.content.as_ref().and_then(|c| c.sidebars.as_ref())
    }

    fn content_error(
        &self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> PluginError {
        PluginError::Content {
            plugin: format!("{PLUGIN_NAME}@{}", self.plugin_id),
            source: source.into(),
        }
    }

    fn main_doc_id<'a>(&self, content: &'a DocsContent) -> Option<&'a str> {
        content
            .docs
            .iter()
            .find(|doc| doc.slug == "/")
            .map(|doc| doc.id.as_str())
            .or_else(|| {
                content
                    .sidebars
                    .as_ref()
                    .and_then(|sidebars| sidebars.values().next())
                    .and_then(|items| first_doc_id(items))
            })
            .or_else(|| content.docs.first().map(|doc| doc.id.as_str()))
    }
}

impl Plugin for DocsPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> PluginVersion {
        PluginVersion::first_party(DOCS_PLUGIN_MODULE)
    }

    fn content_paths(&self) -> Vec<PathBuf> {
        vec![self.content_dir.clone()]
    }

    fn load_content(&mut self, ctx: &LoadContext) -> Result<(), PluginError> {
        let start = Instant::now();
        let parser: &dyn NumberPrefixParser = if self.options.number_prefix_parser {
            &DefaultNumberPrefixParser
        } else {
            &DisabledNumberPrefixParser
        };

        let mut docs = scan_docs(&ScanContext {
            site_dir: &ctx.site_dir,
            content_dir: &self.content_dir,
            base_path: &self.base_path,
            number_prefix_parser: parser,
        })
        .map_err(|e| self.content_error(e))?;

        let sidebar_docs: Vec<SidebarDoc> = docs.iter().map(DocMetadata::sidebar_doc).collect();
        let loaded = load_sidebars(
            &self.options.sidebar_source(&ctx.site_dir),
            &SidebarProcessorParams {
                generator: &DefaultSidebarItemsGenerator,
                number_prefix_parser: parser,
                docs: &sidebar_docs,
                content_path: &self.content_dir,
                category_label_slugger: slugify,
                options: self.options.sidebar_options(),
            },
        )
        .map_err(|e| self.content_error(DocsError::from(e)))?;

        let sidebars = match loaded {
            LoadedSidebars::Enabled(sidebars) => {
                assign_sidebars(&mut docs, &sidebars);
                Some(sidebars)
            }
            LoadedSidebars::Disabled => None,
        };

        tracing::info!(
            plugin = %PLUGIN_NAME,
            id = %self.plugin_id,
            docs = docs.len(),
            sidebars = sidebars.as_ref().map_or(0, Sidebars::len),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Docs loaded"
        );
        self.content = Some(DocsContent { docs, sidebars });
        Ok(())
    }

    fn route_provider(&self) -> Option<&dyn RouteProvider> {
        Some(self)
    }

    fn global_data_provider(&self) -> Option<&dyn GlobalDataProvider> {
        Some(self)
    }
}

impl RouteProvider for DocsPlugin {
    fn contribute_routes(
        &self,
        _ctx: &LoadContext,
        actions: &mut RouteActions,
    ) -> Result<(), PluginError> {
        let Some(content) = &self.content else {
            return Ok(());
        };

        let mut routes = Vec::with_capacity(content.docs.len());
        for doc in &content.docs {
            let metadata = serde_json::to_string_pretty(doc).map_err(|e| self.content_error(e))?;
            let module = actions.create_data(&format!("docs/{}.json", doc.id), metadata);
            routes.push(
                RouteConfig::new(&doc.permalink, DOC_ITEM_COMPONENT)
                    .exact()
                    .with_module("content", &doc.source)
                    .with_module("metadata", module),
            );
        }

        let empty = Sidebars::new();
        let sidebars = content.sidebars.as_ref().unwrap_or(&empty);
        for (sidebar, items) in sidebars {
            let mut indexes = Vec::new();
            collect_generated_indexes(sidebar, items, &self.base_path, &mut indexes);
            for index in indexes {
                let data = serde_json::to_string_pretty(&index).map_err(|e| self.content_error(e))?;
                let module = actions.create_data(&format!("categories{}.json", index.slug), data);
                routes.push(
                    RouteConfig::new(&index.permalink, GENERATED_INDEX_COMPONENT)
                        .exact()
                        .with_module("categoryGeneratedIndex", module),
                );
            }
        }

        let version = serde_json::to_string_pretty(&VersionMetadata {
            plugin_id: &self.plugin_id,
            path: &self.base_path,
            sidebars,
        })
        .map_err(|e| self.content_error(e))?;
        let version_module = actions.create_data("version.json", version);

        let mut root = RouteConfig::new(&self.base_path, DOC_PAGE_COMPONENT)
            .with_module("versionMetadata", version_module);
        root.routes = routes;
        actions.add_route(root);
        Ok(())
    }
}

impl GlobalDataProvider for DocsPlugin {
    fn global_data(&self) -> Value {
        let Some(content) = &self.content else {
            return Value::Null;
        };
        let data = GlobalData {
            path: &self.base_path,
            main_doc_id: self.main_doc_id(content),
            docs: content
                .docs
                .iter()
                .map(|doc| GlobalDoc {
                    id: &doc.id,
                    path: &doc.permalink,
                    sidebar: doc.sidebar.as_deref(),
                })
                .collect(),
        };
        serde_json::to_value(data).unwrap_or(Value::Null)
    }
}

/// Record on each document the first sidebar (in name order) referencing it.
fn assign_sidebars(docs: &mut [DocMetadata], sidebars: &Sidebars) {
    fn visit<'a>(sidebar: &'a str, items: &'a [SidebarItem], found: &mut HashMap<&'a str, &'a str>) {
        for item in items {
            match item {
                SidebarItem::Doc(doc) => {
                    found.entry(&doc.id).or_insert(sidebar);
                }
                SidebarItem::Category(category) => {
                    if let Some(CategoryLink::Doc { id }) = &category.link {
                        found.entry(id).or_insert(sidebar);
                    }
                    visit(sidebar, &category.items, found);
                }
                SidebarItem::Ref(_) | SidebarItem::Link(_) => {}
            }
        }
    }

    let mut found = HashMap::new();
    for (name, items) in sidebars {
        visit(name, items, &mut found);
    }
    for doc in docs {
        doc.sidebar = found.get(doc.id.as_str()).map(|name| (*name).to_owned());
    }
}

fn first_doc_id(items: &[SidebarItem]) -> Option<&str> {
    items.iter().find_map(|item| match item {
        SidebarItem::Doc(doc) => Some(doc.id.as_str()),
        SidebarItem::Category(category) => match &category.link {
            Some(CategoryLink::Doc { id }) => Some(id.as_str()),
            _ => first_doc_id(&category.items),
        },
        SidebarItem::Ref(_) | SidebarItem::Link(_) => None,
    })
}

fn collect_generated_indexes<'a>(
    sidebar: &'a str,
    items: &'a [SidebarItem],
    base_path: &str,
    out: &mut Vec<GeneratedIndex<'a>>,
) {
    for item in items {
        let SidebarItem::Category(category) = item else {
            continue;
        };
        if let Some(CategoryLink::GeneratedIndex {
            slug: Some(slug),
            title,
            description,
        }) = &category.link
        {
            let slug = format!("/{}", slug.trim_matches('/'));
            out.push(GeneratedIndex {
                title: title.as_deref().unwrap_or(&category.label),
                description: description.as_deref(),
                permalink: join_url(base_path, &[&slug]),
                slug,
                sidebar,
                items: &category.items,
            });
        }
        collect_generated_indexes(sidebar, &category.items, base_path, out);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pier_config::SiteConfig;
    use pier_plugin::{I18n, LoadedPlugins, PluginInstance, load_plugins};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn context(site: &Path, base_url: &str) -> LoadContext {
        let config = SiteConfig {
            base_url: base_url.to_owned(),
            ..SiteConfig::default()
        };
        let i18n = I18n::new(&config.i18n, "en");
        LoadContext::new(site, config, site.join("pier.toml"), i18n, None)
    }

    fn load(ctx: &LoadContext, id: Option<&str>, options: DocsOptions) -> LoadedPlugins {
        let plugin = DocsPlugin::new(ctx, id.unwrap_or("default"), options);
        let mut instances = [PluginInstance::new(
            DOCS_PLUGIN_MODULE,
            id.map(str::to_owned),
            Box::new(plugin),
        )];
        load_plugins(&mut instances, ctx).unwrap()
    }

    fn site() -> TempDir {
        let temp = TempDir::new().unwrap();
        let site = temp.path();
        write(site, "docs/intro.md", "---\nsidebar_position: 1\n---\n# Intro\n");
        write(site, "docs/02-guides/first.md", "# First guide\n");
        write(site, "docs/02-guides/second.md", "# Second guide\n");
        write(
            site,
            "docs/02-guides/_category_.json",
            r#"{"label": "All guides", "link": {"type": "generated-index"}}"#,
        );
        temp
    }

    #[test]
    fn test_autogenerated_sidebar_routes() {
        let temp = site();
        let ctx = context(temp.path(), "/");

        let loaded = load(&ctx, None, DocsOptions::default());

        let set = &loaded.route_sets[0];
        assert_eq!(set.owner, "pier-plugin-content-docs@default");
        let root = &set.routes[0];
        assert_eq!(root.path, "/docs");
        assert_eq!(root.component, DOC_PAGE_COMPONENT);
        let paths: Vec<&str> = root.routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/docs/guides/first",
                "/docs/guides/second",
                "/docs/intro",
                "/docs/category/all-guides",
            ]
        );
        assert_eq!(root.routes[2].modules["content"], "@site/docs/intro.md");
        assert_eq!(
            root.routes[2].modules["metadata"],
            "@generated/pier-plugin-content-docs/default/docs/intro.json"
        );
        assert_eq!(root.routes[3].component, GENERATED_INDEX_COMPONENT);

        let version = loaded
            .data_files
            .iter()
            .find(|f| f.path.ends_with("version.json"))
            .unwrap();
        let version: Value = serde_json::from_str(&version.content).unwrap();
        assert_eq!(
            version["sidebars"]["defaultSidebar"][0],
            json!({"type": "doc", "id": "intro"})
        );
        assert_eq!(version["sidebars"]["defaultSidebar"][1]["label"], "All guides");
    }

    #[test]
    fn test_global_data() {
        let temp = site();
        let ctx = context(temp.path(), "/");

        let loaded = load(&ctx, Some("guides"), DocsOptions::default());

        let data = &loaded.global_data[PLUGIN_NAME]["guides"];
        assert_eq!(data["path"], "/docs");
        assert_eq!(data["mainDocId"], "intro");
        assert_eq!(
            data["docs"][0],
            json!({"id": "guides/first", "path": "/docs/guides/first", "sidebar": "defaultSidebar"})
        );
    }

    #[test]
    fn test_sidebar_file_and_base_url() {
        let temp = site();
        write(
            temp.path(),
            "sidebars.yaml",
            "docs:\n  - intro\n  - type: category\n    label: Guides\n    items: [guides/first]\n",
        );
        let ctx = context(temp.path(), "/site/");
        let options = DocsOptions {
            sidebar_path: Some(SidebarPathOption::Path("sidebars.yaml".to_owned())),
            route_base_path: "handbook".to_owned(),
            ..DocsOptions::default()
        };

        let loaded = load(&ctx, None, options);

        let root = &loaded.route_sets[0].routes[0];
        assert_eq!(root.path, "/site/handbook");
        assert_eq!(root.routes.len(), 3);
        let data = &loaded.global_data[PLUGIN_NAME]["default"];
        assert_eq!(data["docs"][1]["sidebar"], Value::Null);
        assert_eq!(data["docs"][2]["sidebar"], "docs");
    }

    #[test]
    fn test_unknown_sidebar_doc_fails() {
        let temp = site();
        write(temp.path(), "sidebars.json", r#"{"docs": ["missing"]}"#);
        let ctx = context(temp.path(), "/");
        let options = DocsOptions {
            sidebar_path: Some(SidebarPathOption::Path("sidebars.json".to_owned())),
            ..DocsOptions::default()
        };
        let mut instances = [PluginInstance::new(
            DOCS_PLUGIN_MODULE,
            None,
            Box::new(DocsPlugin::new(&ctx, "default", options)),
        )];

        let err = load_plugins(&mut instances, &ctx).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("pier-plugin-content-docs@default"), "{message}");
        assert!(message.contains("missing"), "{message}");
    }

    #[test]
    fn test_disabled_sidebars() {
        let temp = site();
        let ctx = context(temp.path(), "/");
        let options = DocsOptions {
            sidebar_path: Some(SidebarPathOption::Enabled(false)),
            ..DocsOptions::default()
        };

        let loaded = load(&ctx, None, options);

        assert_eq!(loaded.route_sets[0].routes[0].routes.len(), 3);
        assert_eq!(loaded.global_data[PLUGIN_NAME]["default"]["mainDocId"], "guides/first");
    }
}
