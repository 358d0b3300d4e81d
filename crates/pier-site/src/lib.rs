//! Site assembly pipeline for Pier.
//!
//! [`load`] runs one build pass over a site directory:
//!
//! 1. read `pier.toml` and resolve the locale being built
//! 2. expand presets and normalize every plugin and theme entry
//! 3. create plugin instances, check their ids and load their content
//! 4. check first-party plugin versions
//! 5. merge route subtrees and assign chunk names
//! 6. write the generated files directory
//!
//! Stages run in this order and any failure aborts the pass. Nothing is
//! written before the last stage, so a failed load leaves the generated files
//! of the previous build in place.

mod error;
mod translations;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use pier_codegen::{CodegenInput, WriteSummary};
use pier_config::{
    CliSettings, ModuleKind, PluginDescriptor, PluginLists, ShorthandResolver, SiteConfig,
    resolve_plugin_configs,
};
use pier_plugin::{
    GENERATED_FILES_DIR_NAME, I18n, LoadContext, PluginRegistry, PluginSummary, RenderedHtmlTags,
    SiteMetadata, VersionMismatch, check_plugin_versions, init_plugins, load_plugins,
};
use pier_routes::{RouteConfig, assemble_routes};
use serde_json::Value;

pub use error::LoadError;
pub use translations::CODE_TRANSLATIONS_FILENAME;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Settings of one build pass that do not come from `pier.toml`.
#[derive(Debug, Default)]
pub struct LoadOptions {
    /// Config file, relative to the site directory. Discovered when absent.
    pub config: Option<PathBuf>,
    /// Locale to build. The default locale when absent.
    pub locale: Option<String>,
    /// Output directory. `<site>/build` when absent.
    pub out_dir: Option<PathBuf>,
    /// Overrides of configuration values.
    pub cli_settings: CliSettings,
}

/// Everything a build pass resolved.
#[derive(Debug)]
pub struct Props {
    /// Site root directory, canonicalized.
    pub site_dir: PathBuf,
    /// Effective site configuration.
    pub site_config: SiteConfig,
    /// Path the configuration was read from.
    pub site_config_path: PathBuf,
    /// Directory the generated files were written to.
    pub generated_files_dir: PathBuf,
    /// Output directory, localized for non-default locales.
    pub out_dir: PathBuf,
    /// Base URL, localized for non-default locales.
    pub base_url: String,
    pub i18n: I18n,
    /// Every plugin instance, synthetic ones last.
    pub plugins: Vec<PluginSummary>,
    /// Sorted route tree.
    pub routes: Vec<RouteConfig>,
    /// Every concrete route path.
    pub routes_paths: Vec<String>,
    pub client_modules: Vec<String>,
    pub html_tags: RenderedHtmlTags,
    /// Plugin name to instance id to global data.
    pub global_data: BTreeMap<String, BTreeMap<String, Value>>,
    /// Plugin defaults merged with the site's translations.
    pub code_translations: BTreeMap<String, String>,
    pub site_metadata: SiteMetadata,
    /// First-party plugins whose version differs from the core.
    pub version_mismatches: Vec<VersionMismatch>,
    /// What the generated files pass wrote.
    pub codegen: WriteSummary,
}

/// Registry holding every first-party plugin, theme and preset.
pub fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    pier_plugins::register_builtins(&mut registry);
    registry
}

/// Load the site in `site_dir` with the first-party modules available.
///
/// # Errors
///
/// Returns the error of the first stage that fails.
pub fn load(site_dir: &Path, options: &LoadOptions) -> Result<Props, LoadError> {
    load_with_registry(site_dir, options, &default_registry())
}

/// Load the site in `site_dir`, resolving modules against `registry`.
///
/// # Errors
///
/// Returns the error of the first stage that fails.
pub fn load_with_registry(
    site_dir: &Path,
    options: &LoadOptions,
    registry: &PluginRegistry,
) -> Result<Props, LoadError> {
    let start = Instant::now();

    let stage = Instant::now();
    let ctx = load_context(site_dir, options)?;
    let config_ms = elapsed_ms(stage);

    let stage = Instant::now();
    let descriptors = resolve_descriptors(registry, &ctx)?;
    let mut instances = init_plugins(registry, &ctx, &descriptors)?;
    let loaded = load_plugins(&mut instances, &ctx)?;
    let plugins_ms = elapsed_ms(stage);

    let code_translations =
        translations::merge_code_translations(&loaded.default_code_translations, &ctx.code_translations);
    let site_metadata = SiteMetadata::new(
        ctx.site_config.version.as_deref(),
        instances.iter().map(|i| (i.name(), i.version())),
    );
    let version_mismatches = check_plugin_versions(&site_metadata);

    let stage = Instant::now();
    let routes = assemble_routes(
        &loaded.route_sets,
        &ctx.base_url,
        ctx.site_config.on_duplicate_routes,
    )?;
    let routes_ms = elapsed_ms(stage);

    let stage = Instant::now();
    let codegen = pier_codegen::generate(
        &ctx.generated_files_dir,
        &CodegenInput {
            site_config: &ctx.site_config,
            client_modules: &loaded.client_modules,
            routes: &routes,
            global_data: &loaded.global_data,
            i18n: &ctx.i18n,
            code_translations: &code_translations,
            site_metadata: &site_metadata,
            data_files: &loaded.data_files,
        },
    )?;
    let codegen_ms = elapsed_ms(stage);

    tracing::info!(
        locale = %ctx.i18n.current_locale,
        plugins = instances.len(),
        routes = routes.routes_paths.len(),
        config_ms,
        plugins_ms,
        routes_ms,
        codegen_ms,
        elapsed_ms = elapsed_ms(start),
        "Site loaded"
    );

    Ok(Props {
        site_dir: ctx.site_dir,
        site_config: ctx.site_config,
        site_config_path: ctx.site_config_path,
        generated_files_dir: ctx.generated_files_dir,
        out_dir: ctx.out_dir,
        base_url: ctx.base_url,
        i18n: ctx.i18n,
        plugins: loaded.plugins,
        routes: routes.routes,
        routes_paths: routes.routes_paths,
        client_modules: loaded.client_modules,
        html_tags: loaded.html_tags,
        global_data: loaded.global_data,
        code_translations,
        site_metadata,
        version_mismatches,
        codegen,
    })
}

/// Remove the generated files directory of the site in `site_dir`.
///
/// Returns `false` when there was nothing to remove.
///
/// # Errors
///
/// Returns [`LoadError::Codegen`] if the directory cannot be removed.
pub fn clear(site_dir: &Path) -> Result<bool, LoadError> {
    Ok(pier_codegen::clear(&site_dir.join(GENERATED_FILES_DIR_NAME))?)
}

fn load_context(site_dir: &Path, options: &LoadOptions) -> Result<LoadContext, LoadError> {
    let site_dir = site_dir
        .canonicalize()
        .map_err(|source| LoadError::SiteDir {
            path: site_dir.to_path_buf(),
            source,
        })?;
    let (site_config, site_config_path) = SiteConfig::load(
        &site_dir,
        options.config.as_deref(),
        Some(&options.cli_settings),
    )?;

    let locale = options
        .locale
        .clone()
        .unwrap_or_else(|| site_config.i18n.default_locale.clone());
    if !site_config.i18n.locales.contains(&locale) {
        return Err(LoadError::UnknownLocale {
            locale,
            locales: site_config.i18n.locales.clone(),
        });
    }
    let i18n = I18n::new(&site_config.i18n, &locale);

    let mut ctx = LoadContext::new(
        &site_dir,
        site_config,
        site_config_path,
        i18n,
        options.out_dir.clone(),
    );
    ctx.code_translations = translations::read_code_translations(&ctx.localization_dir())?;
    tracing::debug!(
        site_dir = %ctx.site_dir.display(),
        config = %ctx.site_config_path.display(),
        locale = %locale,
        base_url = %ctx.base_url,
        "Load context ready"
    );
    Ok(ctx)
}

/// Expand presets, then normalize preset and site entries into one list.
fn resolve_descriptors(
    registry: &PluginRegistry,
    ctx: &LoadContext,
) -> Result<Vec<PluginDescriptor>, LoadError> {
    let resolver = ShorthandResolver::new(&ctx.site_dir, registry);
    let mut presets = PluginLists::default();
    for entry in &ctx.site_config.presets {
        let descriptor = resolver.normalize(entry, ModuleKind::Preset)?;
        let lists = registry.preset(ctx, &descriptor)?;
        tracing::debug!(
            preset = %descriptor.module,
            plugins = lists.plugins.len(),
            themes = lists.themes.len(),
            "Preset expanded"
        );
        presets.plugins.extend(lists.plugins);
        presets.themes.extend(lists.themes);
    }
    Ok(resolve_plugin_configs(&presets, &ctx.site_config, &resolver)?)
}
