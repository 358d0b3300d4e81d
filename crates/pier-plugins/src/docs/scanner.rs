//! Document discovery and metadata extraction.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pier_sidebar::{NumberPrefixParser, SidebarDoc};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::DocsError;

static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)").unwrap()
});

static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());

const DOC_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Front matter keys the plugin understands; others are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FrontMatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub sidebar_label: Option<String>,
    pub sidebar_position: Option<f64>,
}

/// Split leading YAML front matter from the document body.
pub(crate) fn split_front_matter(content: &str) -> Result<(FrontMatter, &str), String> {
    let Some(caps) = FRONT_MATTER.captures(content) else {
        return Ok((FrontMatter::default(), content));
    };
    let body = &content[caps.get(0).map_or(0, |m| m.end())..];
    let yaml = caps.get(1).map_or("", |m| m.as_str());
    if yaml.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }
    let front_matter = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    Ok((front_matter, body))
}

/// Everything known about one document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocMetadata {
    /// Id, with number prefixes stripped from folder and file names.
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Module path of the source file (`@site/...`).
    pub source: String,
    /// Folder of the file relative to the content root, `.` at the root.
    pub source_dir_name: String,
    /// URL path relative to the plugin's base path.
    pub slug: String,
    /// Absolute URL path.
    pub permalink: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_position: Option<f64>,
    /// Name of the first sidebar referencing the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
    #[serde(skip)]
    pub(crate) file_stem: String,
    #[serde(skip)]
    pub(crate) file_path: PathBuf,
}

impl DocMetadata {
    pub(crate) fn sidebar_doc(&self) -> SidebarDoc {
        SidebarDoc {
            id: self.id.clone(),
            source_dir: self.source_dir_name.clone(),
            file_stem: self.file_stem.clone(),
            sidebar_label: self.sidebar_label.clone(),
            sidebar_position: self.sidebar_position,
        }
    }
}

/// What document reading needs besides the file itself.
pub(crate) struct ScanContext<'a> {
    pub site_dir: &'a Path,
    pub content_dir: &'a Path,
    /// URL every permalink starts with.
    pub base_path: &'a str,
    pub number_prefix_parser: &'a dyn NumberPrefixParser,
}

/// Read every document below the content folder.
///
/// Files and folders starting with `.` or `_` are skipped. Documents are
/// returned in path order.
pub(crate) fn scan_docs(cx: &ScanContext<'_>) -> Result<Vec<DocMetadata>, DocsError> {
    if !cx.content_dir.is_dir() {
        return Err(DocsError::MissingContentDir {
            path: cx.content_dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_doc_files(cx.content_dir, cx.content_dir, &mut files)?;
    if files.is_empty() {
        return Err(DocsError::NoDocs {
            path: cx.content_dir.to_path_buf(),
        });
    }

    let docs = files
        .par_iter()
        .map(|rel| read_doc(rel, cx))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for doc in &docs {
        if let Some(first) = seen.insert(&doc.id, &doc.file_path) {
            return Err(DocsError::DuplicateDocId {
                id: doc.id.clone(),
                first: first.to_path_buf(),
                second: doc.file_path.clone(),
            });
        }
    }
    Ok(docs)
}

fn collect_doc_files(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), DocsError> {
    let entries = fs::read_dir(dir).map_err(|source| DocsError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }
        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            collect_doc_files(root, &path, files)?;
        } else if path
            .extension()
            .is_some_and(|ext| DOC_EXTENSIONS.iter().any(|e| ext == *e))
            && let Ok(rel) = path.strip_prefix(root)
        {
            files.push(rel.to_path_buf());
        }
    }
    Ok(())
}

fn read_doc(rel: &Path, cx: &ScanContext<'_>) -> Result<DocMetadata, DocsError> {
    let file_path = cx.content_dir.join(rel);
    let content = fs::read_to_string(&file_path).map_err(|source| DocsError::Io {
        path: file_path.clone(),
        source,
    })?;
    let front_matter_error = |message: String| DocsError::FrontMatter {
        path: file_path.clone(),
        message,
    };
    let (front_matter, body) = split_front_matter(&content).map_err(front_matter_error)?;

    let dir_segments: Vec<String> = rel
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    let source_dir_name = if dir_segments.is_empty() {
        ".".to_owned()
    } else {
        dir_segments.join("/")
    };
    let stripped_dir: Vec<String> = dir_segments
        .iter()
        .map(|segment| cx.number_prefix_parser.parse(segment).filename)
        .collect();

    let file_stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stripped_stem = cx.number_prefix_parser.parse(&file_stem).filename;

    let base_id = match &front_matter.id {
        Some(id) if id.contains('/') => {
            return Err(front_matter_error(format!(
                "document id \"{id}\" cannot include a slash"
            )));
        }
        Some(id) => id.clone(),
        None => stripped_stem.clone(),
    };
    let id = if stripped_dir.is_empty() {
        base_id
    } else {
        format!("{}/{base_id}", stripped_dir.join("/"))
    };

    let dir_slug = format!("/{}", stripped_dir.join("/"));
    let is_category_index = ["index", "readme"].contains(&stripped_stem.to_lowercase().as_str())
        || stripped_dir
            .last()
            .is_some_and(|dir| dir.eq_ignore_ascii_case(&stripped_stem));
    let slug = match &front_matter.slug {
        Some(slug) if slug.starts_with('/') => normalize_slug(slug),
        Some(slug) => normalize_slug(&format!("{dir_slug}/{slug}")),
        None if is_category_index => normalize_slug(&dir_slug),
        None => normalize_slug(&format!("{dir_slug}/{stripped_stem}")),
    };

    let title = front_matter
        .title
        .or_else(|| H1.captures(body).map(|caps| caps[1].trim().to_owned()))
        .unwrap_or_else(|| stripped_stem.clone());
    let description = front_matter
        .description
        .or_else(|| first_paragraph_line(body));

    let source_path = file_path.strip_prefix(cx.site_dir).unwrap_or(&file_path);
    let source = format!(
        "@site/{}",
        source_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    );

    Ok(DocMetadata {
        permalink: join_url(cx.base_path, &[&slug]),
        id,
        title,
        description,
        source,
        source_dir_name,
        slug,
        sidebar_label: front_matter.sidebar_label,
        sidebar_position: front_matter.sidebar_position,
        sidebar: None,
        file_stem,
        file_path,
    })
}

fn first_paragraph_line(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("import "))
        .map(str::to_owned)
}

/// Collapse repeated slashes and drop the trailing one, keeping a leading `/`.
fn normalize_slug(slug: &str) -> String {
    let segments: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Append path segments to `base`; `base` itself when there is nothing to add.
pub(crate) fn join_url(base: &str, parts: &[&str]) -> String {
    let segments: Vec<&str> = parts
        .iter()
        .flat_map(|part| part.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return base.to_owned();
    }
    format!("{}/{}", base.trim_end_matches('/'), segments.join("/"))
}
