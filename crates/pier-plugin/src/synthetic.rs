//! Plugins the runtime adds after every declared one.

use std::path::PathBuf;

use pier_config::{AssetEntry, SiteConfig};
use serde_json::json;

use crate::actions::RouteActions;
use crate::context::LoadContext;
use crate::error::PluginError;
use crate::html_tags::{AttributeValue, HtmlTag, HtmlTagObject, HtmlTags};
use crate::versions::PluginVersion;
use crate::{ClientModulesProvider, HtmlTagsProvider, Plugin, RouteProvider};

/// Name of the plugin carrying site-level stylesheets, scripts and client modules.
pub const BOOTSTRAP_PLUGIN_NAME: &str = "pier-bootstrap-plugin";

/// Name of the plugin configuring the fallback Markdown transform.
pub const MDX_FALLBACK_PLUGIN_NAME: &str = "pier-mdx-fallback-plugin";

/// Data file written by the fallback plugin.
pub const FALLBACK_TRANSFORM_FILE: &str = "fallback-transform.json";

/// Turns the site's own stylesheets, scripts and client modules into plugin
/// contributions.
#[derive(Debug)]
pub struct BootstrapPlugin {
    client_modules: Vec<String>,
    tags: HtmlTags,
}

impl BootstrapPlugin {
    pub fn new(site_config: &SiteConfig) -> Self {
        let stylesheets = site_config.stylesheets.iter().map(|entry| match entry {
            AssetEntry::Url(href) => HtmlTagObject::new(
                "link",
                [("rel", "stylesheet".into()), ("href", href.as_str().into())],
            ),
            AssetEntry::Attributes(attributes) => {
                let mut tag = HtmlTagObject::new("link", [("rel", "stylesheet".into())]);
                tag.attributes.extend(text_attributes(attributes));
                tag
            }
        });
        let scripts = site_config.scripts.iter().map(|entry| match entry {
            AssetEntry::Url(src) => HtmlTagObject::new("script", [("src", src.as_str().into())]),
            AssetEntry::Attributes(attributes) => {
                let mut tag = HtmlTagObject::new("script", std::iter::empty());
                tag.attributes.extend(text_attributes(attributes));
                tag
            }
        });

        Self {
            client_modules: site_config.client_modules.clone(),
            tags: HtmlTags {
                head: stylesheets.chain(scripts).map(HtmlTag::Element).collect(),
                ..HtmlTags::default()
            },
        }
    }
}

fn text_attributes(
    attributes: &std::collections::BTreeMap<String, String>,
) -> impl Iterator<Item = (String, AttributeValue)> + '_ {
    attributes
        .iter()
        .map(|(k, v)| (k.clone(), AttributeValue::Text(v.clone())))
}

impl Plugin for BootstrapPlugin {
    fn name(&self) -> &str {
        BOOTSTRAP_PLUGIN_NAME
    }

    fn version(&self) -> PluginVersion {
        PluginVersion::Synthetic
    }

    fn client_modules_provider(&self) -> Option<&dyn ClientModulesProvider> {
        Some(self)
    }

    fn html_tags_provider(&self) -> Option<&dyn HtmlTagsProvider> {
        Some(self)
    }
}

impl ClientModulesProvider for BootstrapPlugin {
    fn client_modules(&self) -> Vec<String> {
        self.client_modules.clone()
    }
}

impl HtmlTagsProvider for BootstrapPlugin {
    fn html_tags(&self) -> HtmlTags {
        self.tags.clone()
    }
}

/// Applies the default Markdown transform to files no content plugin owns.
///
/// Writes the content paths of every other plugin so the bundler can exclude
/// them from the fallback rule.
#[derive(Debug)]
pub struct MdxFallbackPlugin {
    excluded: Vec<PathBuf>,
}

impl MdxFallbackPlugin {
    pub fn new(excluded: Vec<PathBuf>) -> Self {
        Self { excluded }
    }
}

impl Plugin for MdxFallbackPlugin {
    fn name(&self) -> &str {
        MDX_FALLBACK_PLUGIN_NAME
    }

    fn version(&self) -> PluginVersion {
        PluginVersion::Synthetic
    }

    fn route_provider(&self) -> Option<&dyn RouteProvider> {
        Some(self)
    }
}

impl RouteProvider for MdxFallbackPlugin {
    fn contribute_routes(
        &self,
        _ctx: &LoadContext,
        actions: &mut RouteActions,
    ) -> Result<(), PluginError> {
        let exclude: Vec<String> = self
            .excluded
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        actions.create_data(
            FALLBACK_TRANSFORM_FILE,
            serde_json::to_string_pretty(&json!({ "exclude": exclude }))
                .unwrap_or_else(|_| "{}".to_owned()),
        );
        Ok(())
    }
}
