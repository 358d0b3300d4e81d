//! Turns normalized sidebars into final ones.
//!
//! Autogenerated placeholders are expanded, collapse settings resolved and
//! generated-index links given slugs in one depth-first pass. Document
//! references are checked once every sidebar is processed.

use std::collections::HashSet;
use std::path::Path;

use crate::error::SidebarError;
use crate::generator::{GeneratorArgs, SidebarItemsGenerator, normalize_dir_name};
use crate::metadata::CategoriesMetadata;
use crate::normalize::NormalizedSidebars;
use crate::number_prefix::NumberPrefixParser;
use crate::slug::Slugger;
use crate::types::{
    CategoryLink, NormalizedCategory, NormalizedItem, SidebarCategory, SidebarDoc, SidebarItem,
    SidebarOptions, Sidebars,
};

/// Everything the processor needs besides the declarations themselves.
pub struct SidebarProcessorParams<'a> {
    /// Expands `autogenerated` items.
    pub generator: &'a dyn SidebarItemsGenerator,
    /// Strips ordering prefixes from file and folder names.
    pub number_prefix_parser: &'a dyn NumberPrefixParser,
    /// Every document of the content collection.
    pub docs: &'a [SidebarDoc],
    /// Content root; category metadata files are looked up below it.
    pub content_path: &'a Path,
    /// Turns category labels into generated-index slugs.
    pub category_label_slugger: fn(&str) -> String,
    /// Collapse defaults.
    pub options: SidebarOptions,
}

/// Collapse preferences handed down from the nearest ancestor category.
#[derive(Clone, Copy, Default)]
struct Inherited {
    collapsed: Option<bool>,
    collapsible: Option<bool>,
}

struct Processor<'p, 'a> {
    params: &'p SidebarProcessorParams<'a>,
    metadata: &'p CategoriesMetadata,
    slugger: Slugger,
}

pub(crate) fn process_sidebars(
    sidebars: NormalizedSidebars,
    metadata: &CategoriesMetadata,
    params: &SidebarProcessorParams<'_>,
) -> Result<Sidebars, SidebarError> {
    let mut processor = Processor {
        params,
        metadata,
        slugger: Slugger::new(params.category_label_slugger),
    };

    let mut processed = Sidebars::new();
    for (name, items) in sidebars {
        let mut out = Vec::with_capacity(items.len());
        processor.process_items(items, Inherited::default(), &mut out)?;
        processed.insert(name, out);
    }

    validate_doc_ids(&processed, params.docs)?;
    Ok(processed)
}

impl Processor<'_, '_> {
    fn process_items(
        &mut self,
        items: Vec<NormalizedItem>,
        inherited: Inherited,
        out: &mut Vec<SidebarItem>,
    ) -> Result<(), SidebarError> {
        for item in items {
            match item {
                NormalizedItem::Doc(doc) => out.push(SidebarItem::Doc(doc)),
                NormalizedItem::Ref(reference) => out.push(SidebarItem::Ref(reference)),
                NormalizedItem::Link(link) => out.push(SidebarItem::Link(link)),
                NormalizedItem::Autogenerated { dir_name } => {
                    let generated = self.params.generator.generate(&GeneratorArgs {
                        dir_name: &dir_name,
                        docs: self.params.docs,
                        number_prefix_parser: self.params.number_prefix_parser,
                        categories_metadata: self.metadata,
                    })?;
                    self.process_items(generated, inherited, out)?;
                }
                NormalizedItem::Category(category) => {
                    out.push(SidebarItem::Category(
                        self.process_category(category, inherited)?,
                    ));
                }
            }
        }
        Ok(())
    }

    fn process_category(
        &mut self,
        mut category: NormalizedCategory,
        inherited: Inherited,
    ) -> Result<SidebarCategory, SidebarError> {
        // A category wrapping a single autogenerated item is backed by that folder
        if category.dir.is_none()
            && let [NormalizedItem::Autogenerated { dir_name }] = category.items.as_slice()
        {
            category.dir = Some(normalize_dir_name(dir_name));
        }

        let metadata = category.dir.as_deref().and_then(|dir| self.metadata.get(dir));
        let preferred = Inherited {
            collapsed: category
                .collapsed
                .or_else(|| metadata.and_then(|m| m.collapsed))
                .or(inherited.collapsed),
            collapsible: category
                .collapsible
                .or_else(|| metadata.and_then(|m| m.collapsible))
                .or(inherited.collapsible),
        };

        let collapsible = preferred.collapsible.unwrap_or(self.params.options.collapsible);
        let mut collapsed = preferred.collapsed.unwrap_or(self.params.options.collapsed);
        if !collapsible && collapsed {
            if preferred.collapsed == Some(true) {
                tracing::warn!(
                    category = %category.label,
                    "Sidebar category \"{}\" is collapsed but not collapsible; it will be expanded",
                    category.label
                );
            }
            collapsed = false;
        }

        let mut items = Vec::with_capacity(category.items.len());
        self.process_items(category.items, preferred, &mut items)?;

        let link = match category.link {
            Some(CategoryLink::GeneratedIndex {
                slug: None,
                title,
                description,
            }) => Some(CategoryLink::GeneratedIndex {
                slug: Some(format!("/category/{}", self.slugger.slug(&category.label))),
                title,
                description,
            }),
            other => other,
        };

        if items.is_empty() && link.is_none() {
            return Err(SidebarError::EmptyCategory {
                label: category.label,
            });
        }

        Ok(SidebarCategory {
            label: category.label,
            items,
            collapsed,
            collapsible,
            link,
            class_name: category.class_name,
            custom_props: category.custom_props,
        })
    }
}

/// Check that every document reference points to a known document.
fn validate_doc_ids(sidebars: &Sidebars, docs: &[SidebarDoc]) -> Result<(), SidebarError> {
    let known: HashSet<&str> = docs.iter().map(|doc| doc.id.as_str()).collect();

    for (name, items) in sidebars {
        if let Some(id) = first_unknown_doc(items, &known) {
            let mut available: Vec<String> = known.iter().map(|&id| id.to_owned()).collect();
            available.sort();
            return Err(SidebarError::DocNotFound {
                id: id.to_owned(),
                sidebar: name.clone(),
                available,
            });
        }
    }
    Ok(())
}

fn first_unknown_doc<'s>(items: &'s [SidebarItem], known: &HashSet<&str>) -> Option<&'s str> {
    items.iter().find_map(|item| match item {
        SidebarItem::Doc(doc) => (!known.contains(doc.id.as_str())).then_some(doc.id.as_str()),
        SidebarItem::Ref(reference) => {
            (!known.contains(reference.id.as_str())).then_some(reference.id.as_str())
        }
        SidebarItem::Link(_) => None,
        SidebarItem::Category(category) => {
            if let Some(CategoryLink::Doc { id }) = &category.link
                && !known.contains(id.as_str())
            {
                return Some(id.as_str());
            }
            first_unknown_doc(&category.items, known)
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::generator::DefaultSidebarItemsGenerator;
    use crate::metadata::CategoryMetadata;
    use crate::number_prefix::DefaultNumberPrefixParser;
    use crate::slug::slugify;
    use crate::types::DocItem;

    fn sidebar_doc(id: &str, source_dir: &str) -> SidebarDoc {
        SidebarDoc {
            id: id.to_owned(),
            source_dir: source_dir.to_owned(),
            file_stem: id.rsplit('/').next().unwrap_or(id).to_owned(),
            ..SidebarDoc::default()
        }
    }

    fn process_with(
        items: Vec<NormalizedItem>,
        docs: &[SidebarDoc],
        metadata: &CategoriesMetadata,
        options: SidebarOptions,
    ) -> Result<Vec<SidebarItem>, SidebarError> {
        let params = SidebarProcessorParams {
            generator: &DefaultSidebarItemsGenerator,
            number_prefix_parser: &DefaultNumberPrefixParser,
            docs,
            content_path: Path::new("/unused"),
            category_label_slugger: slugify,
            options,
        };
        let sidebars = BTreeMap::from([("docs".to_owned(), items)]);
        process_sidebars(sidebars, metadata, &params).map(|mut s| s.remove("docs").unwrap())
    }

    fn process(items: Vec<NormalizedItem>, docs: &[SidebarDoc]) -> Result<Vec<SidebarItem>, SidebarError> {
        process_with(
            items,
            docs,
            &CategoriesMetadata::default(),
            SidebarOptions::default(),
        )
    }

    fn doc(id: &str) -> NormalizedItem {
        NormalizedItem::Doc(DocItem::new(id))
    }

    fn only_category(items: &[SidebarItem]) -> &SidebarCategory {
        match items {
            [SidebarItem::Category(category)] => category,
            other => panic!("expected one category, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_applied() {
        let docs = [sidebar_doc("a", ".")];
        let items = process(
            vec![NormalizedItem::Category(NormalizedCategory::new("A", vec![doc("a")]))],
            &docs,
        )
        .unwrap();

        let category = only_category(&items);
        assert!(category.collapsed);
        assert!(category.collapsible);
    }

    #[test]
    fn test_collapse_inherited_from_ancestor() {
        let docs = [sidebar_doc("a", ".")];
        let inner = NormalizedCategory::new("Inner", vec![doc("a")]);
        let outer = NormalizedCategory {
            collapsed: Some(false),
            ..NormalizedCategory::new("Outer", vec![NormalizedItem::Category(inner)])
        };

        let items = process(vec![NormalizedItem::Category(outer)], &docs).unwrap();

        let outer = only_category(&items);
        assert!(!outer.collapsed);
        assert!(!only_category(&outer.items).collapsed);
    }

    #[test]
    fn test_explicit_beats_metadata_beats_ancestor() {
        let docs = [sidebar_doc("guides/a", "guides")];
        let mut metadata = CategoriesMetadata::default();
        metadata.folders.insert(
            "guides".to_owned(),
            CategoryMetadata {
                collapsed: Some(true),
                ..CategoryMetadata::default()
            },
        );
        let wrapper = |collapsed: Option<bool>| {
            let guides = NormalizedCategory {
                collapsed,
                ..NormalizedCategory::new(
                    "Guides",
                    vec![NormalizedItem::Autogenerated {
                        dir_name: "guides".to_owned(),
                    }],
                )
            };
            NormalizedItem::Category(NormalizedCategory {
                collapsed: Some(false),
                ..NormalizedCategory::new("Root", vec![NormalizedItem::Category(guides)])
            })
        };

        let from_metadata =
            process_with(vec![wrapper(None)], &docs, &metadata, SidebarOptions::default()).unwrap();
        let explicit = process_with(
            vec![wrapper(Some(false))],
            &docs,
            &metadata,
            SidebarOptions::default(),
        )
        .unwrap();

        assert!(only_category(&only_category(&from_metadata).items).collapsed);
        assert!(!only_category(&only_category(&explicit).items).collapsed);
    }

    #[test]
    fn test_not_collapsible_forces_expanded() {
        let docs = [sidebar_doc("a", ".")];
        let category = NormalizedCategory {
            collapsed: Some(true),
            collapsible: Some(false),
            ..NormalizedCategory::new("A", vec![doc("a")])
        };

        let items = process(vec![NormalizedItem::Category(category)], &docs).unwrap();

        let category = only_category(&items);
        assert!(!category.collapsed);
        assert!(!category.collapsible);
    }

    #[test]
    fn test_generated_index_slugs_are_unique() {
        let docs = [sidebar_doc("a", "."), sidebar_doc("b", ".")];
        let category = |id: &str| {
            NormalizedItem::Category(NormalizedCategory {
                link: Some(CategoryLink::GeneratedIndex {
                    slug: None,
                    title: None,
                    description: None,
                }),
                ..NormalizedCategory::new("Getting Started", vec![doc(id)])
            })
        };

        let items = process(vec![category("a"), category("b")], &docs).unwrap();

        let slugs: Vec<_> = items
            .iter()
            .map(|item| match item {
                SidebarItem::Category(SidebarCategory {
                    link: Some(CategoryLink::GeneratedIndex { slug, .. }),
                    ..
                }) => slug.clone().unwrap_or_default(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(
            slugs,
            vec!["/category/getting-started", "/category/getting-started-1"]
        );
    }

    #[test]
    fn test_empty_category_fails() {
        let err = process(
            vec![NormalizedItem::Category(NormalizedCategory::new("Empty", vec![]))],
            &[],
        )
        .unwrap_err();

        assert!(matches!(err, SidebarError::EmptyCategory { ref label } if label == "Empty"));
    }

    #[test]
    fn test_empty_category_with_link_is_kept() {
        let docs = [sidebar_doc("overview", ".")];
        let category = NormalizedCategory {
            link: Some(CategoryLink::Doc {
                id: "overview".to_owned(),
            }),
            ..NormalizedCategory::new("Overview", vec![])
        };

        let items = process(vec![NormalizedItem::Category(category)], &docs).unwrap();

        assert!(only_category(&items).items.is_empty());
    }

    #[test]
    fn test_unknown_doc_fails() {
        let docs = [sidebar_doc("b", "."), sidebar_doc("a", ".")];

        let err = process(vec![doc("a"), doc("missing")], &docs).unwrap_err();

        match &err {
            SidebarError::DocNotFound {
                id,
                sidebar,
                available,
            } => {
                assert_eq!(id, "missing");
                assert_eq!(sidebar, "docs");
                assert_eq!(available, &vec!["a".to_owned(), "b".to_owned()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("- a\n- b"));
    }

    #[test]
    fn test_unknown_category_link_doc_fails() {
        let docs = [sidebar_doc("a", ".")];
        let category = NormalizedCategory {
            link: Some(CategoryLink::Doc {
                id: "nope".to_owned(),
            }),
            ..NormalizedCategory::new("A", vec![doc("a")])
        };

        let err = process(vec![NormalizedItem::Category(category)], &docs).unwrap_err();

        assert!(matches!(err, SidebarError::DocNotFound { ref id, .. } if id == "nope"));
    }

    #[test]
    fn test_autogenerated_expands_in_place() {
        let docs = [
            sidebar_doc("intro", "."),
            sidebar_doc("guides/setup", "guides"),
        ];

        let items = process(
            vec![
                doc("intro"),
                NormalizedItem::Autogenerated {
                    dir_name: "guides".to_owned(),
                },
            ],
            &docs,
        )
        .unwrap();

        assert_eq!(
            items,
            vec![
                SidebarItem::Doc(DocItem::new("intro")),
                SidebarItem::Doc(DocItem::new("guides/setup")),
            ]
        );
    }
}
