//! Plugin version reporting and the first-party version check.

use std::collections::BTreeMap;

use pier_config::FIRST_PARTY_SCOPE;
use serde::Serialize;

/// Version of the Pier core.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where a plugin comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PluginVersion {
    /// An installed package.
    Package {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    /// Part of the site project itself.
    Project,
    /// A local module outside any package.
    Local,
    /// Created by the runtime, not declared by the site.
    Synthetic,
}

impl PluginVersion {
    /// Package version carrying the core version, for first-party plugins.
    pub fn first_party(name: &str) -> Self {
        Self::Package {
            name: name.to_owned(),
            version: Some(CORE_VERSION.to_owned()),
        }
    }
}

/// Versions of the core, the site and every non-synthetic plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    pub pier_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_version: Option<String>,
    /// Plugin name to version.
    pub plugin_versions: BTreeMap<String, PluginVersion>,
}

impl SiteMetadata {
    /// Collect versions from `(name, version)` pairs, skipping synthetic plugins.
    pub fn new<'a>(
        site_version: Option<&str>,
        plugins: impl IntoIterator<Item = (&'a str, &'a PluginVersion)>,
    ) -> Self {
        let plugin_versions = plugins
            .into_iter()
            .filter(|(_, version)| **version != PluginVersion::Synthetic)
            .map(|(name, version)| (name.to_owned(), version.clone()))
            .collect();
        Self {
            pier_version: CORE_VERSION.to_owned(),
            site_version: site_version.map(str::to_owned),
            plugin_versions,
        }
    }
}

/// A first-party plugin whose version differs from the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionMismatch {
    /// Plugin name.
    pub plugin: String,
    /// Package name.
    pub package: String,
    /// Reported version.
    pub version: String,
    /// Core version.
    pub expected: String,
}

/// Check that every first-party package plugin shares the core version.
///
/// Mismatches are logged as errors and returned; they never fail the load.
pub fn check_plugin_versions(metadata: &SiteMetadata) -> Vec<VersionMismatch> {
    let scope = format!("{FIRST_PARTY_SCOPE}/");
    let mut mismatches = Vec::new();

    for (plugin, version) in &metadata.plugin_versions {
        let PluginVersion::Package {
            name,
            version: Some(version),
        } = version
        else {
            continue;
        };
        if !name.starts_with(&scope) || *version == metadata.pier_version {
            continue;
        }

        tracing::error!(
            plugin = %plugin,
            version = %version,
            expected = %metadata.pier_version,
            "Invalid name={name} version number={version}. All official {scope}* packages should have the exact same version as @pier/core (number={}). Maybe you want to check, or regenerate your lockfile?",
            metadata.pier_version
        );
        mismatches.push(VersionMismatch {
            plugin: plugin.clone(),
            package: name.clone(),
            version: version.clone(),
            expected: metadata.pier_version.clone(),
        });
    }
    mismatches
}
