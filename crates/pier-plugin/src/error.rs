//! Plugin runtime errors.

use std::path::PathBuf;

use pier_config::ModuleKind;

/// Error raised while creating, checking or running plugins.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// No factory is registered for a resolved module.
    #[error("No {kind} named \"{module}\" is registered")]
    UnknownModule {
        /// Module name.
        module: String,
        /// Expected module kind.
        kind: ModuleKind,
    },

    /// Plugin options were rejected by the plugin.
    #[error("Invalid options for plugin \"{plugin}\": {message}")]
    InvalidOptions {
        /// Plugin module or name.
        plugin: String,
        /// Validation message.
        message: String,
    },

    /// A local plugin manifest could not be loaded.
    #[error("Invalid plugin manifest {}: {message}", path.display())]
    Manifest {
        /// Manifest file.
        path: PathBuf,
        /// Reason.
        message: String,
    },

    /// Filesystem error while loading plugin content.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A plugin used more than once has missing or conflicting instance ids.
    #[error(
        "Plugin \"{plugin}\" is used {count} times, so every instance needs a unique, non-default `id`. Offending instances: {}",
        .instances.join(", ")
    )]
    DuplicatePluginId {
        /// Plugin name.
        plugin: String,
        /// Number of instances of the plugin.
        count: usize,
        /// Description of every offending instance.
        instances: Vec<String>,
    },

    /// A plugin contributed an invalid HTML tag.
    #[error("Error loading {plugin}: {message}")]
    InvalidHtmlTag {
        /// Plugin key (`name@id`).
        plugin: String,
        /// Reason.
        message: String,
    },

    /// A plugin failed while loading its content.
    #[error("Plugin {plugin} failed to load its content: {source}")]
    Content {
        /// Plugin name.
        plugin: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A lifecycle step of a specific instance failed.
    #[error("Plugin {plugin} failed in {stage}: {source}")]
    Lifecycle {
        /// Plugin key (`name@id`).
        plugin: String,
        /// Lifecycle step.
        stage: &'static str,
        /// Underlying error.
        #[source]
        source: Box<PluginError>,
    },
}
