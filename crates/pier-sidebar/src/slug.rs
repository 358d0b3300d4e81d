//! Category label slugs for generated index pages.

use std::collections::HashMap;

/// Convert a label to a URL slug.
///
/// Lowercases, drops punctuation and turns whitespace into `-`.
pub fn slugify(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Hands out unique slugs, suffixing repeats with `-1`, `-2`, ...
pub(crate) struct Slugger {
    slugify: fn(&str) -> String,
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub(crate) fn new(slugify: fn(&str) -> String) -> Self {
        Self {
            slugify,
            seen: HashMap::new(),
        }
    }

    pub(crate) fn slug(&mut self, label: &str) -> String {
        let base = (self.slugify)(label);
        let mut slug = base.clone();
        while let Some(count) = self.seen.get_mut(&slug) {
            *count += 1;
            slug = format!("{base}-{count}");
        }
        self.seen.insert(slug.clone(), 0);
        slug
    }
}
