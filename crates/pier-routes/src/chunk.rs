//! Deterministic chunk names for route components and modules.
//!
//! A chunk name is derived from the module path alone, so the same module
//! always lands in the same chunk across builds.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Hex characters of the SHA-256 digest kept in chunk names and route keys.
const SHORT_HASH_LEN: usize = 3;

/// Longest module-path slug kept in a chunk name.
const MAX_SLUG_LEN: usize = 48;

/// Chunk name prefix for route components.
pub const COMPONENT_PREFIX: &str = "component";

/// Chunk name prefix for route data modules.
pub const CONTENT_PREFIX: &str = "content";

/// First `len` hex characters of the SHA-256 digest of `input`.
pub(crate) fn hash_prefix(input: &str, len: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(len);
    encoded
}

/// Short hash used in route keys.
pub(crate) fn short_hash(input: &str) -> String {
    hash_prefix(input, SHORT_HASH_LEN)
}

/// Lowercase kebab-case slug of a module path, keeping its tail.
fn module_slug(module_path: &str) -> String {
    let mut slug = String::with_capacity(module_path.len());
    for c in module_path.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.len() <= MAX_SLUG_LEN {
        return slug.to_owned();
    }
    // Cut on a segment boundary
    let tail = &slug[slug.len() - MAX_SLUG_LEN..];
    match tail.find('-') {
        Some(i) => tail[i + 1..].to_owned(),
        None => tail.to_owned(),
    }
}

/// Assigns chunk names and records them in the module registry.
#[derive(Debug, Default)]
pub(crate) struct ChunkRegistry {
    /// Chunk name to module path.
    modules: BTreeMap<String, String>,
    /// Module path to chunk name.
    assigned: BTreeMap<String, String>,
}

impl ChunkRegistry {
    /// Chunk name for `module_path`, registering it on first use.
    ///
    /// `<prefix>---<slug>-<hash>`; the hash grows if two module paths would
    /// otherwise share a name.
    pub(crate) fn chunk_name(&mut self, module_path: &str, prefix: &str) -> String {
        if let Some(name) = self.assigned.get(module_path) {
            return name.clone();
        }

        let slug = module_slug(module_path);
        let mut len = SHORT_HASH_LEN;
        let name = loop {
            let hash = hash_prefix(module_path, len);
            let candidate = if slug.is_empty() {
                format!("{prefix}---{hash}")
            } else {
                format!("{prefix}---{slug}-{hash}")
            };
            match self.modules.get(&candidate) {
                Some(existing) if existing != module_path && len < 64 => len += 1,
                _ => break candidate,
            }
        };

        self.modules.insert(name.clone(), module_path.to_owned());
        self.assigned.insert(module_path.to_owned(), name.clone());
        name
    }

    pub(crate) fn into_modules(self) -> BTreeMap<String, String> {
        self.modules
    }
}
