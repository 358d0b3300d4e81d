//! Rendering of the in-memory site model into file contents.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

use pier_config::SiteConfig;
use pier_plugin::{DataFile, I18n, SiteMetadata};
use pier_routes::AssembledRoutes;
use serde::Serialize;
use serde_json::Value;

use crate::error::CodegenError;

/// Marker file telling people not to edit the folder.
pub const MARKER_FILE: &str = "DONT-EDIT-THIS-FOLDER";
/// Effective site configuration module.
pub const SITE_CONFIG_FILE: &str = "pier.config.js";
/// Client modules loaded before any page.
pub const CLIENT_MODULES_FILE: &str = "client-modules.js";
/// Chunk name to lazy module loader.
pub const REGISTRY_FILE: &str = "registry.js";
/// Route key to chunk names.
pub const ROUTES_CHUNK_NAMES_FILE: &str = "routesChunkNames.json";
/// Route config module.
pub const ROUTES_FILE: &str = "routes.js";
/// Global data of every plugin instance.
pub const GLOBAL_DATA_FILE: &str = "globalData.json";
/// Locale settings.
pub const I18N_FILE: &str = "i18n.json";
/// Code translations of the current locale.
pub const CODE_TRANSLATIONS_FILE: &str = "codeTranslations.json";
/// Core, site and plugin versions.
pub const SITE_METADATA_FILE: &str = "site-metadata.json";

const MARKER_CONTENT: &str = "This folder stores temp files that Pier's client bundler accesses.

DO NOT hand-modify files in this folder because they will be overwritten in the
next build. You can clear all build artifacts (including this folder) with the
`pier clear` command.
";

/// Everything written to the generated files directory.
#[derive(Clone, Copy, Debug)]
pub struct CodegenInput<'a> {
    pub site_config: &'a SiteConfig,
    pub client_modules: &'a [String],
    pub routes: &'a AssembledRoutes,
    /// Plugin name to instance id to data.
    pub global_data: &'a BTreeMap<String, BTreeMap<String, Value>>,
    pub i18n: &'a I18n,
    pub code_translations: &'a BTreeMap<String, String>,
    pub site_metadata: &'a SiteMetadata,
    /// Files created by plugins, relative to the generated files directory.
    pub data_files: &'a [DataFile],
}

/// One file to write, relative to the generated files directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    fn new(path: &str, content: String) -> Self {
        Self {
            path: PathBuf::from(path),
            content,
        }
    }
}

/// Render every generated file.
///
/// Output depends only on the input: maps are ordered and arrays keep their
/// order, so an unchanged model renders byte-identical files.
///
/// # Errors
///
/// Fails if a document cannot be serialized, or if a plugin data file has an
/// unsafe or duplicated path.
pub fn render(input: &CodegenInput<'_>) -> Result<Vec<GeneratedFile>, CodegenError> {
    let mut files = vec![
        GeneratedFile::new(MARKER_FILE, MARKER_CONTENT.to_owned()),
        GeneratedFile::new(
            SITE_CONFIG_FILE,
            format!(
                "export default {};\n",
                to_json(SITE_CONFIG_FILE, input.site_config)?
            ),
        ),
        GeneratedFile::new(CLIENT_MODULES_FILE, client_modules_code(input.client_modules)),
        GeneratedFile::new(REGISTRY_FILE, registry_code(&input.routes.registry)),
        GeneratedFile::new(
            ROUTES_CHUNK_NAMES_FILE,
            to_json(ROUTES_CHUNK_NAMES_FILE, &input.routes.routes_chunk_names)?,
        ),
        GeneratedFile::new(ROUTES_FILE, input.routes.routes_config_code.clone()),
        GeneratedFile::new(GLOBAL_DATA_FILE, to_json(GLOBAL_DATA_FILE, input.global_data)?),
        GeneratedFile::new(I18N_FILE, to_json(I18N_FILE, input.i18n)?),
        GeneratedFile::new(
            CODE_TRANSLATIONS_FILE,
            to_json(CODE_TRANSLATIONS_FILE, input.code_translations)?,
        ),
        GeneratedFile::new(
            SITE_METADATA_FILE,
            to_json(SITE_METADATA_FILE, input.site_metadata)?,
        ),
    ];

    let mut seen: HashSet<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    for data_file in input.data_files {
        if !is_safe_relative(&data_file.path) {
            return Err(CodegenError::InvalidPath {
                path: data_file.path.clone(),
            });
        }
        if !seen.insert(data_file.path.clone()) {
            return Err(CodegenError::DuplicateFile {
                path: data_file.path.clone(),
            });
        }
        files.push(GeneratedFile {
            path: data_file.path.clone(),
            content: data_file.content.clone(),
        });
    }
    Ok(files)
}

fn to_json(file: &str, value: &impl Serialize) -> Result<String, CodegenError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|source| CodegenError::Serialize {
        file: file.to_owned(),
        source,
    })?;
    json.push('\n');
    Ok(json)
}

fn js_string(value: &str) -> String {
    Value::String(value.to_owned()).to_string()
}

fn client_modules_code(modules: &[String]) -> String {
    let mut code = String::from("export default [\n");
    for module in modules {
        let _ = writeln!(code, "  require({}),", js_string(module));
    }
    code.push_str("];\n");
    code
}

fn registry_code(registry: &BTreeMap<String, String>) -> String {
    let mut code = String::from("export default {\n");
    for (chunk, module) in registry {
        let module = js_string(module);
        let _ = writeln!(
            code,
            "  {}: [() => import(/* webpackChunkName: {} */ {module}), {module}, require.resolveWeak({module})],",
            js_string(chunk),
            js_string(chunk),
        );
    }
    code.push_str("};\n");
    code
}

fn is_safe_relative(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
