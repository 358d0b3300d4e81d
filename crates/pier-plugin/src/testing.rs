//! Fixtures shared by the unit tests of this crate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pier_config::SiteConfig;
use pier_routes::RouteConfig;
use serde_json::Value;

use crate::actions::RouteActions;
use crate::context::LoadContext;
use crate::error::PluginError;
use crate::html_tags::HtmlTags;
use crate::i18n::I18n;
use crate::{
    ClientModulesProvider, GlobalDataProvider, HtmlTagsProvider, Plugin, RouteProvider,
    TranslationsProvider,
};

pub(crate) fn context(site_dir: &Path, base_url: &str) -> LoadContext {
    let site_config = SiteConfig {
        base_url: base_url.to_owned(),
        ..SiteConfig::default()
    };
    let i18n = I18n::new(&site_config.i18n, "en");
    LoadContext::new(
        site_dir,
        site_config,
        site_dir.join("pier.toml"),
        i18n,
        None,
    )
}

/// Plugin returning fixed contributions.
#[derive(Debug, Default)]
pub(crate) struct StaticPlugin {
    pub name: String,
    pub routes: Vec<RouteConfig>,
    pub global_data: Option<Value>,
    pub client_modules: Vec<String>,
    pub tags: HtmlTags,
    pub translations: BTreeMap<String, String>,
    pub content_paths: Vec<PathBuf>,
    pub fail_load: bool,
    pub loaded: bool,
}

impl StaticPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
}

impl Plugin for StaticPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_paths(&self) -> Vec<PathBuf> {
        self.content_paths.clone()
    }

    fn load_content(&mut self, _ctx: &LoadContext) -> Result<(), PluginError> {
        if self.fail_load {
            return Err(PluginError::Content {
                plugin: self.name.clone(),
                source: "content folder is missing".into(),
            });
        }
        self.loaded = true;
        Ok(())
    }

    fn route_provider(&self) -> Option<&dyn RouteProvider> {
        Some(self)
    }

    fn global_data_provider(&self) -> Option<&dyn GlobalDataProvider> {
        self.global_data
            .is_some()
            .then_some(self as &dyn GlobalDataProvider)
    }

    fn client_modules_provider(&self) -> Option<&dyn ClientModulesProvider> {
        Some(self)
    }

    fn html_tags_provider(&self) -> Option<&dyn HtmlTagsProvider> {
        Some(self)
    }

    fn translations_provider(&self) -> Option<&dyn TranslationsProvider> {
        Some(self)
    }
}

impl RouteProvider for StaticPlugin {
    fn contribute_routes(
        &self,
        _ctx: &LoadContext,
        actions: &mut RouteActions,
    ) -> Result<(), PluginError> {
        actions.create_data("loaded.json", self.loaded.to_string());
        for route in &self.routes {
            actions.add_route(route.clone());
        }
        Ok(())
    }
}

impl GlobalDataProvider for StaticPlugin {
    fn global_data(&self) -> Value {
        self.global_data.clone().unwrap_or(Value::Null)
    }
}

impl ClientModulesProvider for StaticPlugin {
    fn client_modules(&self) -> Vec<String> {
        self.client_modules.clone()
    }
}

impl HtmlTagsProvider for StaticPlugin {
    fn html_tags(&self) -> HtmlTags {
        self.tags.clone()
    }
}

impl TranslationsProvider for StaticPlugin {
    fn default_code_translations(&self) -> BTreeMap<String, String> {
        self.translations.clone()
    }
}
