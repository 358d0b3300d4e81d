//! Options of the documentation plugin.

use std::path::Path;

use pier_sidebar::{SidebarOptions, SidebarSource};
use serde::Deserialize;

/// `sidebar_path` option: a file path, `"auto"`, or `false`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SidebarPathOption {
    /// `false` disables sidebars, `true` generates one.
    Enabled(bool),
    Path(String),
}

/// Options of `@pier/plugin-content-docs`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsOptions {
    /// Content folder, relative to the site directory.
    pub path: String,
    /// URL segment all docs are served under.
    pub route_base_path: String,
    /// Sidebar declarations. Unset means one sidebar generated from the
    /// content folder.
    pub sidebar_path: Option<SidebarPathOption>,
    /// Default collapsed state of sidebar categories.
    pub sidebar_collapsed: bool,
    /// Default collapsible flag of sidebar categories.
    pub sidebar_collapsible: bool,
    /// Strip `01-` style ordering prefixes from file and folder names.
    pub number_prefix_parser: bool,
}

impl Default for DocsOptions {
    fn default() -> Self {
        Self {
            path: "docs".to_owned(),
            route_base_path: "docs".to_owned(),
            sidebar_path: None,
            sidebar_collapsed: true,
            sidebar_collapsible: true,
            number_prefix_parser: true,
        }
    }
}

impl DocsOptions {
    pub(crate) fn sidebar_source(&self, site_dir: &Path) -> SidebarSource {
        match &self.sidebar_path {
            None | Some(SidebarPathOption::Enabled(true)) => SidebarSource::Autogenerated,
            Some(SidebarPathOption::Enabled(false)) => SidebarSource::Disabled,
            Some(SidebarPathOption::Path(path)) => SidebarSource::from_option(Some(path), site_dir),
        }
    }

    pub(crate) fn sidebar_options(&self) -> SidebarOptions {
        SidebarOptions {
            collapsed: self.sidebar_collapsed,
            collapsible: self.sidebar_collapsible,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn options(value: serde_json::Value) -> DocsOptions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sidebar_source_variants() {
        let site = Path::new("/site");

        assert_eq!(
            DocsOptions::default().sidebar_source(site),
            SidebarSource::Autogenerated
        );
        assert_eq!(
            options(serde_json::json!({"sidebar_path": false})).sidebar_source(site),
            SidebarSource::Disabled
        );
        assert_eq!(
            options(serde_json::json!({"sidebar_path": "sidebars.yaml"})).sidebar_source(site),
            SidebarSource::File(PathBuf::from("/site/sidebars.yaml"))
        );
    }

    #[test]
    fn test_collapse_defaults() {
        let opts = options(serde_json::json!({"sidebar_collapsed": false}));

        assert_eq!(
            opts.sidebar_options(),
            SidebarOptions {
                collapsed: false,
                collapsible: true,
            }
        );
    }
}
