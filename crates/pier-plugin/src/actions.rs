//! Actions available to plugins while contributing routes.

use std::path::PathBuf;

use pier_routes::RouteConfig;

/// Module alias of the generated files directory.
pub const GENERATED_ALIAS: &str = "@generated";

/// A data file produced by a plugin, relative to the generated files directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFile {
    /// Path relative to the generated files directory.
    pub path: PathBuf,
    /// File content.
    pub content: String,
}

/// Collects the routes and data files of one plugin instance.
#[derive(Debug)]
pub struct RouteActions {
    data_dir: String,
    routes: Vec<RouteConfig>,
    data_files: Vec<DataFile>,
}

impl RouteActions {
    /// Actions for the instance `id` of plugin `name`.
    pub fn new(name: &str, id: &str) -> Self {
        Self {
            data_dir: format!("{}/{id}", plugin_dir_name(name)),
            routes: Vec::new(),
            data_files: Vec::new(),
        }
    }

    /// Contribute a top-level route.
    pub fn add_route(&mut self, route: RouteConfig) {
        self.routes.push(route);
    }

    /// Write `content` to a data file owned by this instance.
    ///
    /// Returns the module path routes use to reference the file.
    pub fn create_data(&mut self, file_name: &str, content: impl Into<String>) -> String {
        let relative = format!("{}/{file_name}", self.data_dir);
        self.data_files.push(DataFile {
            path: PathBuf::from(&relative),
            content: content.into(),
        });
        format!("{GENERATED_ALIAS}/{relative}")
    }

    pub(crate) fn into_parts(self) -> (Vec<RouteConfig>, Vec<DataFile>) {
        (self.routes, self.data_files)
    }
}

/// Folder name for a plugin's data files: `@scope/name` becomes `scope-name`.
pub fn plugin_dir_name(name: &str) -> String {
    name.trim_start_matches('@').replace('/', "-")
}
