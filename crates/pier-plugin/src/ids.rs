//! Instance id uniqueness across plugins.

use std::collections::HashMap;

use pier_config::DEFAULT_PLUGIN_ID;

use crate::error::PluginError;

/// Check instance ids before any plugin runs.
///
/// A plugin used once needs no id. A plugin used several times needs an
/// explicit, distinct, non-default id on every instance. The error names the
/// first plugin (in declaration order) that breaks the rule and every one of
/// its offending instances.
pub fn ensure_unique_plugin_ids<'a>(
    plugins: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> Result<(), PluginError> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<Option<&str>>> = HashMap::new();
    for (name, id) in plugins {
        groups
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(id);
    }

    for name in order {
        let ids = &groups[name];
        if ids.len() < 2 {
            continue;
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for id in ids.iter().flatten() {
            *counts.entry(id).or_default() += 1;
        }

        let offending: Vec<String> = ids
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let n = index + 1;
                match id {
                    None => Some(format!("#{n} without an explicit id")),
                    Some(id) if *id == DEFAULT_PLUGIN_ID => {
                        Some(format!("#{n} with the default id \"{id}\""))
                    }
                    Some(id) if counts[id] > 1 => Some(format!("#{n} with duplicate id \"{id}\"")),
                    Some(_) => None,
                }
            })
            .collect();

        if !offending.is_empty() {
            return Err(PluginError::DuplicatePluginId {
                plugin: name.to_owned(),
                count: ids.len(),
                instances: offending,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offending(err: PluginError) -> (String, Vec<String>) {
        match err {
            PluginError::DuplicatePluginId {
                plugin, instances, ..
            } => (plugin, instances),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_instance_needs_no_id() {
        let plugins = [("docs", None), ("blog", None), ("pages", Some("default"))];

        assert!(ensure_unique_plugin_ids(plugins).is_ok());
    }

    #[test]
    fn test_distinct_explicit_ids_pass() {
        let plugins = [("docs", Some("guides")), ("docs", Some("api")), ("blog", None)];

        assert!(ensure_unique_plugin_ids(plugins).is_ok());
    }

    #[test]
    fn test_missing_id_in_group_fails() {
        let plugins = [("docs", None), ("docs", Some("api"))];

        let (plugin, instances) = offending(ensure_unique_plugin_ids(plugins).unwrap_err());

        assert_eq!(plugin, "docs");
        assert_eq!(instances, vec!["#1 without an explicit id"]);
    }

    #[test]
    fn test_shared_id_names_every_instance() {
        let plugins = [
            ("docs", Some("api")),
            ("docs", Some("guides")),
            ("docs", Some("api")),
        ];

        let err = ensure_unique_plugin_ids(plugins).unwrap_err();
        let msg = err.to_string();
        let (_, instances) = offending(err);

        assert_eq!(
            instances,
            vec!["#1 with duplicate id \"api\"", "#3 with duplicate id \"api\""]
        );
        assert!(msg.contains("used 3 times"));
    }

    #[test]
    fn test_explicit_default_in_group_fails() {
        let plugins = [("docs", Some("default")), ("docs", Some("api")), ("docs", None)];

        let (_, instances) = offending(ensure_unique_plugin_ids(plugins).unwrap_err());

        assert_eq!(
            instances,
            vec!["#1 with the default id \"default\"", "#3 without an explicit id"]
        );
    }
}
