//! HTML tags contributed by plugins.
//!
//! Tags are either raw HTML strings, inserted verbatim, or structured
//! descriptions rendered here with escaped attribute values.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*(?:-[a-zA-Z0-9]+)*$").unwrap());

/// Elements rendered without a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Value of an HTML attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// `true` renders a bare attribute, `false` omits it.
    Flag(bool),
    Text(String),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Structured description of an element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HtmlTagObject {
    /// Element name.
    pub tag_name: String,
    /// Attributes, rendered in key order.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Raw HTML placed between the opening and closing tags.
    #[serde(default)]
    pub inner_html: Option<String>,
}

impl HtmlTagObject {
    /// Element with the given attributes and no content.
    pub fn new<'a>(
        tag_name: &str,
        attributes: impl IntoIterator<Item = (&'a str, AttributeValue)>,
    ) -> Self {
        Self {
            tag_name: tag_name.to_owned(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
            inner_html: None,
        }
    }
}

/// A tag contributed by a plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HtmlTag {
    Raw(String),
    Element(HtmlTagObject),
}

/// Tags grouped by where they are injected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlTags {
    /// Inside `<head>`.
    pub head: Vec<HtmlTag>,
    /// Right after `<body>`.
    pub pre_body: Vec<HtmlTag>,
    /// Right before `</body>`.
    pub post_body: Vec<HtmlTag>,
}

/// Rendered tags of every plugin, one string per injection point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedHtmlTags {
    pub head_tags: String,
    pub pre_body_tags: String,
    pub post_body_tags: String,
}

impl RenderedHtmlTags {
    /// Render and append one plugin's tags.
    pub(crate) fn append(&mut self, tags: &HtmlTags) -> Result<(), String> {
        append_rendered(&mut self.head_tags, &tags.head)?;
        append_rendered(&mut self.pre_body_tags, &tags.pre_body)?;
        append_rendered(&mut self.post_body_tags, &tags.post_body)?;
        Ok(())
    }
}

fn append_rendered(out: &mut String, tags: &[HtmlTag]) -> Result<(), String> {
    for tag in tags {
        let rendered = render_tag(tag)?;
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&rendered);
    }
    Ok(())
}

/// Render one tag to HTML.
///
/// # Errors
///
/// Returns a message when the tag name is not a valid element name.
pub fn render_tag(tag: &HtmlTag) -> Result<String, String> {
    let element = match tag {
        HtmlTag::Raw(html) => return Ok(html.clone()),
        HtmlTag::Element(element) => element,
    };
    if !TAG_NAME.is_match(&element.tag_name) {
        return Err(format!(
            "\"{}\" is not a valid HTML tag name",
            element.tag_name
        ));
    }

    let name = element.tag_name.to_lowercase();
    let mut html = format!("<{name}");
    for (key, value) in &element.attributes {
        match value {
            AttributeValue::Flag(true) => {
                let _ = write!(html, " {key}");
            }
            AttributeValue::Flag(false) => {}
            AttributeValue::Text(text) => {
                let _ = write!(html, " {key}=\"{}\"", escape_attribute(text));
            }
        }
    }
    html.push('>');

    if VOID_ELEMENTS.contains(&name.as_str()) {
        return Ok(html);
    }
    if let Some(inner) = &element.inner_html {
        html.push_str(inner);
    }
    let _ = write!(html, "</{name}>");
    Ok(html)
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag_name: &str, attributes: &[(&str, AttributeValue)]) -> HtmlTag {
        HtmlTag::Element(HtmlTagObject::new(tag_name, attributes.iter().cloned()))
    }

    #[test]
    fn test_render_void_element() {
        let tag = element(
            "link",
            &[("rel", "stylesheet".into()), ("href", "/a.css".into())],
        );

        assert_eq!(
            render_tag(&tag).unwrap(),
            r#"<link href="/a.css" rel="stylesheet">"#
        );
    }

    #[test]
    fn test_render_with_inner_html_and_flags() {
        let mut object = HtmlTagObject::new(
            "script",
            [("async", AttributeValue::Flag(true)), ("defer", AttributeValue::Flag(false))],
        );
        object.inner_html = Some("console.log(1)".to_owned());

        assert_eq!(
            render_tag(&HtmlTag::Element(object)).unwrap(),
            "<script async>console.log(1)</script>"
        );
    }

    #[test]
    fn test_attribute_values_escaped() {
        let tag = element("meta", &[("content", "a \"quoted\" <value> & more".into())]);

        assert_eq!(
            render_tag(&tag).unwrap(),
            r#"<meta content="a &quot;quoted&quot; &lt;value&gt; &amp; more">"#
        );
    }

    #[test]
    fn test_raw_tag_verbatim() {
        let tag = HtmlTag::Raw("<!-- analytics -->".to_owned());

        assert_eq!(render_tag(&tag).unwrap(), "<!-- analytics -->");
    }

    #[test]
    fn test_invalid_tag_name() {
        let err = render_tag(&element("not a tag", &[])).unwrap_err();

        assert!(err.contains("not a tag"));
    }

    #[test]
    fn test_custom_element_allowed() {
        assert_eq!(
            render_tag(&element("my-widget", &[])).unwrap(),
            "<my-widget></my-widget>"
        );
    }

    #[test]
    fn test_append_joins_with_newlines() {
        let mut rendered = RenderedHtmlTags::default();
        let tags = HtmlTags {
            head: vec![HtmlTag::Raw("<a>".to_owned()), HtmlTag::Raw("<b>".to_owned())],
            ..HtmlTags::default()
        };

        rendered.append(&tags).unwrap();
        rendered.append(&tags).unwrap();

        assert_eq!(rendered.head_tags, "<a>\n<b>\n<a>\n<b>");
        assert!(rendered.pre_body_tags.is_empty());
    }

    #[test]
    fn test_tags_from_toml() {
        let tags: HtmlTags = toml::from_str(
            r#"
head = [
  "<meta name=\"x\">",
  { tag_name = "link", attributes = { rel = "icon", href = "/favicon.ico" } },
]
"#,
        )
        .unwrap();

        assert_eq!(tags.head.len(), 2);
        assert!(matches!(tags.head[0], HtmlTag::Raw(_)));
        assert!(matches!(tags.head[1], HtmlTag::Element(_)));
    }
}
