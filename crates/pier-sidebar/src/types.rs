//! Sidebar item types.
//!
//! Two shapes exist. [`NormalizedItem`] is what declarations are normalized
//! into: every shorthand expanded, but autogenerated placeholders and
//! unresolved collapse settings still present. [`SidebarItem`] is the final
//! shape handed to plugins, with every default resolved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Final sidebars, keyed by sidebar name.
pub type Sidebars = BTreeMap<String, Vec<SidebarItem>>;

/// A link to a single document.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DocItem {
    /// Document id.
    pub id: String,
    /// Label override; the document title is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Extra CSS class.
    #[serde(default, alias = "class_name", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Opaque data passed through to the theme.
    #[serde(default, alias = "custom_props", skip_serializing_if = "Option::is_none")]
    pub custom_props: Option<Value>,
}

impl DocItem {
    /// Doc item with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            class_name: None,
            custom_props: None,
        }
    }
}

/// A reference to a document that does not make it the active sidebar entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RefItem {
    /// Document id.
    pub id: String,
    /// Label override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// An arbitrary hyperlink.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LinkItem {
    /// Target URL.
    pub href: String,
    /// Text shown in the sidebar.
    pub label: String,
    /// Extra CSS class.
    #[serde(default, alias = "class_name", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Opaque data passed through to the theme.
    #[serde(default, alias = "custom_props", skip_serializing_if = "Option::is_none")]
    pub custom_props: Option<Value>,
}

/// Where a category label points to when clicked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CategoryLink {
    /// The category opens a document.
    Doc {
        /// Document id.
        id: String,
    },
    /// The category opens a generated page listing its items.
    #[serde(rename_all = "camelCase")]
    GeneratedIndex {
        /// URL slug; derived from the label when absent.
        #[serde(skip_serializing_if = "Option::is_none")]
        slug: Option<String>,
        /// Page title; the category label when absent.
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Page description.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// A category after normalization, before defaults are resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedCategory {
    /// Text shown in the sidebar.
    pub label: String,
    /// Child items.
    pub items: Vec<NormalizedItem>,
    /// Explicit collapsed state.
    pub collapsed: Option<bool>,
    /// Explicit collapsible flag.
    pub collapsible: Option<bool>,
    /// Category link.
    pub link: Option<CategoryLink>,
    /// Extra CSS class.
    pub class_name: Option<String>,
    /// Opaque data passed through to the theme.
    pub custom_props: Option<Value>,
    /// Content folder backing this category, relative to the content root.
    ///
    /// Set for generated categories and for declared categories whose only
    /// item is an autogenerated placeholder. Metadata of this folder is
    /// consulted when resolving collapse settings.
    pub dir: Option<String>,
}

impl NormalizedCategory {
    /// Category with a label and items, every setting left unresolved.
    pub fn new(label: impl Into<String>, items: Vec<NormalizedItem>) -> Self {
        Self {
            label: label.into(),
            items,
            collapsed: None,
            collapsible: None,
            link: None,
            class_name: None,
            custom_props: None,
            dir: None,
        }
    }
}

/// A sidebar item after shorthand expansion.
#[derive(Clone, Debug, PartialEq)]
pub enum NormalizedItem {
    Doc(DocItem),
    Ref(RefItem),
    Link(LinkItem),
    Category(NormalizedCategory),
    /// Placeholder replaced by generated items for a content folder.
    Autogenerated {
        /// Folder relative to the content root; `.` is the root itself.
        dir_name: String,
    },
}

/// A category with every setting resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarCategory {
    /// Text shown in the sidebar.
    pub label: String,
    /// Child items.
    pub items: Vec<SidebarItem>,
    /// Whether the category starts collapsed.
    pub collapsed: bool,
    /// Whether the category can be collapsed at all.
    pub collapsible: bool,
    /// Category link, with generated-index slugs filled in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<CategoryLink>,
    /// Extra CSS class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Opaque data passed through to the theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_props: Option<Value>,
}

/// A fully processed sidebar item.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarItem {
    Doc(DocItem),
    Ref(RefItem),
    Link(LinkItem),
    Category(SidebarCategory),
}

/// Collapse defaults applied to categories that do not set their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SidebarOptions {
    /// Default collapsed state.
    pub collapsed: bool,
    /// Default collapsible flag.
    pub collapsible: bool,
}

impl Default for SidebarOptions {
    fn default() -> Self {
        Self {
            collapsed: true,
            collapsible: true,
        }
    }
}

/// What the sidebar processor needs to know about a document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SidebarDoc {
    /// Document id.
    pub id: String,
    /// Folder containing the document, relative to the content root and
    /// `/`-separated. `.` for documents at the root.
    pub source_dir: String,
    /// File name without extension, number prefix included.
    pub file_stem: String,
    /// `sidebar_label` front matter.
    pub sidebar_label: Option<String>,
    /// `sidebar_position` front matter.
    pub sidebar_position: Option<f64>,
}
