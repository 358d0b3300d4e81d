//! Ordering prefixes on file and folder names.
//!
//! `01-intro.md` sorts before `02-setup.md` and both lose the prefix in
//! their ids and labels. Names that look like dates (`2024-05-01-release`)
//! or versions (`1.2-notes`) keep their prefix.

use std::sync::LazyLock;

use regex::Regex;

static IGNORED_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{2}|\d{4})[-_.]\d{2}(?:[-_.](?:\d{2}|\d{4}))?.*$|^\d+[-_.]\d+.*$").unwrap()
});

static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<prefix>\d+)\s*[-_.]+\s*(?<suffix>[^-_.\s].*)$").unwrap());

/// A file or folder name split into its ordering prefix and the rest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFilename {
    /// Name with the prefix removed.
    pub filename: String,
    /// Numeric prefix, if one was recognized.
    pub number_prefix: Option<u32>,
}

impl ParsedFilename {
    fn unchanged(filename: &str) -> Self {
        Self {
            filename: filename.to_owned(),
            number_prefix: None,
        }
    }
}

/// Strategy for extracting ordering prefixes.
///
/// Closures `Fn(&str) -> ParsedFilename` implement this trait too.
pub trait NumberPrefixParser: Send + Sync {
    fn parse(&self, filename: &str) -> ParsedFilename;
}

impl<F> NumberPrefixParser for F
where
    F: Fn(&str) -> ParsedFilename + Send + Sync,
{
    fn parse(&self, filename: &str) -> ParsedFilename {
        self(filename)
    }
}

/// Recognizes `NN-`, `NN_`, `NN.` and `NN -` prefixes.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNumberPrefixParser;

impl NumberPrefixParser for DefaultNumberPrefixParser {
    fn parse(&self, filename: &str) -> ParsedFilename {
        if IGNORED_PREFIX.is_match(filename) {
            return ParsedFilename::unchanged(filename);
        }
        let Some(caps) = NUMBER_PREFIX.captures(filename) else {
            return ParsedFilename::unchanged(filename);
        };
        // Prefixes too large for u32 are not ordering prefixes.
        let Ok(prefix) = caps["prefix"].parse::<u32>() else {
            return ParsedFilename::unchanged(filename);
        };
        ParsedFilename {
            filename: caps["suffix"].to_owned(),
            number_prefix: Some(prefix),
        }
    }
}

/// Leaves every name untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledNumberPrefixParser;

impl NumberPrefixParser for DisabledNumberPrefixParser {
    fn parse(&self, filename: &str) -> ParsedFilename {
        ParsedFilename::unchanged(filename)
    }
}
