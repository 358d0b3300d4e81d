//! Sidebar items generated from the content folder structure.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::SidebarError;
use crate::metadata::{CategoriesMetadata, MetadataLink};
use crate::number_prefix::NumberPrefixParser;
use crate::types::{CategoryLink, DocItem, NormalizedCategory, NormalizedItem, SidebarDoc};

/// Input of a [`SidebarItemsGenerator`].
pub struct GeneratorArgs<'a> {
    /// Folder to generate items for, relative to the content root; `.` is
    /// the root.
    pub dir_name: &'a str,
    /// Every document of the content collection.
    pub docs: &'a [SidebarDoc],
    /// Parser used to strip ordering prefixes.
    pub number_prefix_parser: &'a dyn NumberPrefixParser,
    /// Metadata of every content folder.
    pub categories_metadata: &'a CategoriesMetadata,
}

/// Produces the items an `autogenerated` placeholder expands to.
///
/// Generated items go through the same processing as declared ones, so a
/// generator may leave collapse settings unset and set
/// [`NormalizedCategory::dir`] to have folder metadata applied.
pub trait SidebarItemsGenerator: Send + Sync {
    fn generate(&self, args: &GeneratorArgs<'_>) -> Result<Vec<NormalizedItem>, SidebarError>;
}

/// Mirrors the folder tree: one category per sub-folder, one doc item per
/// document, ordered by position then name.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSidebarItemsGenerator;

#[derive(Default)]
struct Folder<'a> {
    docs: Vec<&'a SidebarDoc>,
    subfolders: BTreeMap<String, Folder<'a>>,
}

impl<'a> Folder<'a> {
    fn insert(&mut self, rel_dir: &str, doc: &'a SidebarDoc) {
        let mut folder = self;
        for segment in rel_dir.split('/').filter(|s| !s.is_empty()) {
            folder = folder.subfolders.entry(segment.to_owned()).or_default();
        }
        folder.docs.push(doc);
    }

    fn is_empty(&self) -> bool {
        self.docs.is_empty() && self.subfolders.is_empty()
    }
}

struct Entry {
    position: Option<f64>,
    name: String,
    item: NormalizedItem,
}

impl SidebarItemsGenerator for DefaultSidebarItemsGenerator {
    fn generate(&self, args: &GeneratorArgs<'_>) -> Result<Vec<NormalizedItem>, SidebarError> {
        let root = normalize_dir_name(args.dir_name);
        let mut tree = Folder::default();
        for doc in args.docs {
            if let Some(rel_dir) = relative_dir(&doc.source_dir, &root) {
                tree.insert(rel_dir, doc);
            }
        }

        if tree.is_empty() {
            tracing::warn!(dir = %root, "No docs found in {root}: can't auto-generate a sidebar.");
            return Ok(Vec::new());
        }

        Ok(folder_items(&tree, &root, None, args))
    }
}

/// Canonical form of an autogenerated `dir_name`: no leading `./`, no
/// trailing `/`, `.` for the root.
pub(crate) fn normalize_dir_name(dir_name: &str) -> String {
    let trimmed = dir_name.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    let trimmed = trimmed.trim_matches('/');
    if trimmed.is_empty() {
        ".".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Path of `source_dir` below `root`, or `None` if it is outside.
fn relative_dir<'s>(source_dir: &'s str, root: &str) -> Option<&'s str> {
    if root == "." {
        return Some(if source_dir == "." { "" } else { source_dir });
    }
    if source_dir == root {
        return Some("");
    }
    source_dir
        .strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
}

fn join_dir(parent: &str, name: &str) -> String {
    if parent == "." {
        name.to_owned()
    } else {
        format!("{parent}/{name}")
    }
}

fn folder_items(
    folder: &Folder<'_>,
    path: &str,
    linked_doc: Option<&str>,
    args: &GeneratorArgs<'_>,
) -> Vec<NormalizedItem> {
    let parser = args.number_prefix_parser;
    let mut entries = Vec::with_capacity(folder.docs.len() + folder.subfolders.len());

    for doc in &folder.docs {
        if linked_doc == Some(doc.id.as_str()) {
            continue;
        }
        let parsed = parser.parse(&doc.file_stem);
        entries.push(Entry {
            position: doc
                .sidebar_position
                .or_else(|| parsed.number_prefix.map(f64::from)),
            name: doc.file_stem.clone(),
            item: NormalizedItem::Doc(DocItem {
                label: doc.sidebar_label.clone(),
                ..DocItem::new(doc.id.as_str())
            }),
        });
    }

    for (name, subfolder) in &folder.subfolders {
        let (position, category) = folder_category(subfolder, name, &join_dir(path, name), args);
        entries.push(Entry {
            position,
            name: name.clone(),
            item: NormalizedItem::Category(category),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries.sort_by(|a, b| compare_positions(a.position, b.position));
    entries.into_iter().map(|entry| entry.item).collect()
}

fn folder_category(
    folder: &Folder<'_>,
    name: &str,
    path: &str,
    args: &GeneratorArgs<'_>,
) -> (Option<f64>, NormalizedCategory) {
    let parsed = args.number_prefix_parser.parse(name);
    let metadata = args.categories_metadata.get(path);

    let link = match metadata.map(|m| &m.link) {
        Some(MetadataLink::Link(link)) => Some(link.clone()),
        Some(MetadataLink::Disabled) => None,
        Some(MetadataLink::Unset) | None => find_index_doc(folder, &parsed.filename, args)
            .map(|doc| CategoryLink::Doc { id: doc.id.clone() }),
    };
    let linked_doc = match &link {
        Some(CategoryLink::Doc { id }) => Some(id.as_str()),
        _ => None,
    };

    let items = folder_items(folder, path, linked_doc, args);
    let position = metadata
        .and_then(|m| m.position)
        .or_else(|| parsed.number_prefix.map(f64::from));

    let category = NormalizedCategory {
        label: metadata
            .and_then(|m| m.label.clone())
            .unwrap_or(parsed.filename),
        items,
        collapsed: None,
        collapsible: None,
        link,
        class_name: metadata.and_then(|m| m.class_name.clone()),
        custom_props: metadata.and_then(|m| m.custom_props.clone()),
        dir: Some(path.to_owned()),
    };
    (position, category)
}

/// The document that represents a folder: `index`, `README` or a document
/// named after the folder itself.
fn find_index_doc<'a>(
    folder: &Folder<'a>,
    folder_name: &str,
    args: &GeneratorArgs<'_>,
) -> Option<&'a SidebarDoc> {
    let folder_name = folder_name.to_lowercase();
    folder
        .docs
        .iter()
        .copied()
        .filter(|doc| {
            let stem = args
                .number_prefix_parser
                .parse(&doc.file_stem)
                .filename
                .to_lowercase();
            stem == "index" || stem == "readme" || stem == folder_name
        })
        .min_by(|a, b| a.file_stem.cmp(&b.file_stem))
}

/// Positioned entries first, ascending; unpositioned entries keep their
/// relative order.
fn compare_positions(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
