//! Code translations of the site.
//!
//! A locale's messages live in `i18n/<locale>/code.json`:
//!
//! ```json
//! {
//!   "theme.colorToggle.ariaLabel": {
//!     "message": "Changer de thème",
//!     "description": "Label of the color mode toggle"
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;

/// File name of the code translations inside a localization directory.
pub const CODE_TRANSLATIONS_FILENAME: &str = "code.json";

/// One entry of `code.json`; the `description` is for translators only.
#[derive(Deserialize)]
struct TranslationMessage {
    message: String,
}

/// Read the code translations of `localization_dir`.
///
/// A missing file means the site translates nothing.
pub(crate) fn read_code_translations(
    localization_dir: &Path,
) -> Result<BTreeMap<String, String>, LoadError> {
    let path = localization_dir.join(CODE_TRANSLATIONS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => return Err(LoadError::CodeTranslationsIo { path, source }),
    };
    let messages: BTreeMap<String, TranslationMessage> = serde_json::from_str(&content)
        .map_err(|source| LoadError::CodeTranslations {
            path: path.clone(),
            source,
        })?;
    tracing::debug!(path = %path.display(), count = messages.len(), "Code translations read");
    Ok(messages
        .into_iter()
        .map(|(key, value)| (key, value.message))
        .collect())
}

/// Plugin defaults overridden by the site's own messages.
pub(crate) fn merge_code_translations(
    defaults: &BTreeMap<String, String>,
    site: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    merged.extend(site.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();

        assert!(read_code_translations(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_reads_messages() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CODE_TRANSLATIONS_FILENAME),
            r#"{"theme.next": {"message": "Suivant", "description": "Next page"}, "theme.prev": {"message": "Précédent"}}"#,
        )
        .unwrap();

        let messages = read_code_translations(temp.path()).unwrap();

        assert_eq!(messages["theme.next"], "Suivant");
        assert_eq!(messages["theme.prev"], "Précédent");
    }

    #[test]
    fn test_malformed_file_names_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CODE_TRANSLATIONS_FILENAME), r#"{"a": "b"}"#).unwrap();

        let err = read_code_translations(temp.path()).unwrap_err();

        assert!(matches!(err, LoadError::CodeTranslations { .. }));
        assert!(err.to_string().contains(CODE_TRANSLATIONS_FILENAME));
    }

    #[test]
    fn test_site_messages_override_defaults() {
        let defaults = BTreeMap::from([
            ("a".to_owned(), "A".to_owned()),
            ("b".to_owned(), "B".to_owned()),
        ]);
        let site = BTreeMap::from([("b".to_owned(), "Bee".to_owned())]);

        let merged = merge_code_translations(&defaults, &site);

        assert_eq!(merged["a"], "A");
        assert_eq!(merged["b"], "Bee");
    }
}
