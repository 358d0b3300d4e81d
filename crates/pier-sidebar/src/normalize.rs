//! Normalization of declared sidebars.
//!
//! Declarations are parsed into untyped YAML values first (JSON files go
//! through the same value type) so mapping order is kept, then validated
//! and expanded item by item:
//!
//! - `"doc-id"` becomes a doc item
//! - `{ "Label": [...] }` (no `type` key) becomes one category per key
//! - `{ label, items }` without a `type` is a category as well
//! - typed items are checked against their schema

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_yaml::{Mapping, Value};

use crate::error::SidebarError;
use crate::types::{CategoryLink, DocItem, LinkItem, NormalizedCategory, NormalizedItem, RefItem};

/// Declared sidebars after normalization, keyed by sidebar name.
pub type NormalizedSidebars = BTreeMap<String, Vec<NormalizedItem>>;

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CategoryConfig {
    label: String,
    items: Value,
    collapsed: Option<bool>,
    collapsible: Option<bool>,
    link: Option<Value>,
    #[serde(alias = "class_name")]
    class_name: Option<String>,
    #[serde(alias = "custom_props")]
    custom_props: Option<JsonValue>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct AutogeneratedConfig {
    #[serde(alias = "dir_name")]
    dir_name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DocLinkConfig {
    id: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GeneratedIndexConfig {
    slug: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

/// Render a value as compact JSON for error messages.
pub(crate) fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

/// Deserialize a typed mapping, ignoring its `type` key.
fn from_tagged<T: DeserializeOwned>(map: &Mapping) -> Result<T, serde_yaml::Error> {
    let mut fields = map.clone();
    fields.remove("type");
    serde_yaml::from_value(Value::Mapping(fields))
}

/// Parse a category link declaration.
pub(crate) fn parse_category_link(value: &Value) -> Result<CategoryLink, String> {
    let Some(map) = value.as_mapping() else {
        return Err(format!("category link must be a mapping, got `{}`", render(value)));
    };
    match map.get("type").and_then(Value::as_str) {
        Some("doc") => from_tagged::<DocLinkConfig>(map)
            .map(|c| CategoryLink::Doc { id: c.id })
            .map_err(|e| format!("invalid doc link: {e}")),
        Some("generated-index") => from_tagged::<GeneratedIndexConfig>(map)
            .map(|c| CategoryLink::GeneratedIndex {
                slug: c.slug,
                title: c.title,
                description: c.description,
            })
            .map_err(|e| format!("invalid generated-index link: {e}")),
        Some(other) => Err(format!(
            "unknown category link type \"{other}\", expected \"doc\" or \"generated-index\""
        )),
        None => Err("category link is missing a `type`".to_owned()),
    }
}

/// Normalize a whole sidebars declaration.
///
/// Returns `None` for a `false` or empty declaration, which disables
/// sidebars.
pub(crate) fn normalize_sidebars(raw: &Value) -> Result<Option<NormalizedSidebars>, SidebarError> {
    let map = match raw {
        Value::Null | Value::Bool(false) => return Ok(None),
        Value::Mapping(map) => map,
        other => {
            return Err(SidebarError::InvalidSidebars {
                value: render(other),
            });
        }
    };

    let mut sidebars = BTreeMap::new();
    for (key, value) in map {
        let Some(name) = key.as_str() else {
            return Err(SidebarError::InvalidSidebars { value: render(key) });
        };
        sidebars.insert(name.to_owned(), normalize_sidebar(name, value)?);
    }
    Ok(Some(sidebars))
}

fn normalize_sidebar(sidebar: &str, value: &Value) -> Result<Vec<NormalizedItem>, SidebarError> {
    match value {
        Value::Sequence(items) => normalize_items(sidebar, items),
        Value::Mapping(map) if !map.contains_key("type") => normalize_shorthand(sidebar, map),
        other => Err(SidebarError::InvalidSidebar {
            sidebar: sidebar.to_owned(),
            value: render(other),
        }),
    }
}

fn normalize_items(sidebar: &str, items: &[Value]) -> Result<Vec<NormalizedItem>, SidebarError> {
    let mut normalized = Vec::with_capacity(items.len());
    for item in items {
        normalized.extend(normalize_item(sidebar, item)?);
    }
    Ok(normalized)
}

/// Expand `{ "Label": items, ... }` into categories, keeping key order.
fn normalize_shorthand(sidebar: &str, map: &Mapping) -> Result<Vec<NormalizedItem>, SidebarError> {
    let mut categories = Vec::with_capacity(map.len());
    for (key, items) in map {
        let Some(label) = key.as_str() else {
            return Err(invalid_item(sidebar, key, "category label must be a string"));
        };
        let items = normalize_category_items(sidebar, label, items)?;
        categories.push(NormalizedItem::Category(NormalizedCategory::new(label, items)));
    }
    Ok(categories)
}

fn normalize_category_items(
    sidebar: &str,
    label: &str,
    items: &Value,
) -> Result<Vec<NormalizedItem>, SidebarError> {
    match items {
        Value::Sequence(items) => normalize_items(sidebar, items),
        Value::Mapping(map) if !map.contains_key("type") => normalize_shorthand(sidebar, map),
        other => Err(SidebarError::InvalidSidebarItems {
            value: render(other),
            label: label.to_owned(),
        }),
    }
}

/// An untyped mapping shaped like a category: a string `label` plus `items`.
fn is_untyped_category(map: &Mapping) -> bool {
    map.get("label").is_some_and(Value::is_string) && map.contains_key("items")
}

fn normalize_item(sidebar: &str, item: &Value) -> Result<Vec<NormalizedItem>, SidebarError> {
    let map = match item {
        Value::String(id) => return Ok(vec![NormalizedItem::Doc(DocItem::new(id.as_str()))]),
        Value::Mapping(map) => map,
        other => {
            return Err(invalid_item(
                sidebar,
                other,
                "an item must be a doc id, a shorthand category or a typed item",
            ));
        }
    };

    let item_type = match map.get("type") {
        None if is_untyped_category(map) => "category",
        None => return normalize_shorthand(sidebar, map),
        Some(Value::String(t)) => t.as_str(),
        Some(other) => {
            return Err(invalid_item(sidebar, other, "`type` must be a string"));
        }
    };

    let typed = match item_type {
        "doc" => NormalizedItem::Doc(typed_item(sidebar, item, map)?),
        "ref" => NormalizedItem::Ref(typed_item::<RefItem>(sidebar, item, map)?),
        "link" => NormalizedItem::Link(typed_item::<LinkItem>(sidebar, item, map)?),
        "autogenerated" => {
            let config: AutogeneratedConfig = typed_item(sidebar, item, map)?;
            NormalizedItem::Autogenerated {
                dir_name: config.dir_name,
            }
        }
        "category" => NormalizedItem::Category(normalize_category(sidebar, item, map)?),
        other => {
            return Err(SidebarError::UnknownItemType {
                sidebar: sidebar.to_owned(),
                item_type: other.to_owned(),
            });
        }
    };
    Ok(vec![typed])
}

fn normalize_category(
    sidebar: &str,
    item: &Value,
    map: &Mapping,
) -> Result<NormalizedCategory, SidebarError> {
    let config: CategoryConfig = typed_item(sidebar, item, map)?;
    let items = normalize_category_items(sidebar, &config.label, &config.items)?;
    let link = config
        .link
        .as_ref()
        .map(parse_category_link)
        .transpose()
        .map_err(|message| invalid_item(sidebar, item, &message))?;

    Ok(NormalizedCategory {
        label: config.label,
        items,
        collapsed: config.collapsed,
        collapsible: config.collapsible,
        link,
        class_name: config.class_name,
        custom_props: config.custom_props,
        dir: None,
    })
}

fn typed_item<T: DeserializeOwned>(
    sidebar: &str,
    item: &Value,
    map: &Mapping,
) -> Result<T, SidebarError> {
    from_tagged(map).map_err(|e| invalid_item(sidebar, item, &e.to_string()))
}

fn invalid_item(sidebar: &str, value: &Value, message: &str) -> SidebarError {
    SidebarError::InvalidItem {
        sidebar: sidebar.to_owned(),
        value: render(value),
        message: message.to_owned(),
    }
}
