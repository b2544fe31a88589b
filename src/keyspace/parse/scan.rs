//! Structural tag scanning over map text.
//!
//! Not an XML parser: start tags are matched by pattern and anything that
//! does not match is skipped. Malformed input never errors.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on tags walked while looking for an element's end tag.
const MAX_BODY_TAGS: usize = 4096;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<([A-Za-z_][\w.:-]*)((?:\s+[^\s=/>"']+(?:\s*=\s*(?:"[^"]*"|'[^']*'))?)*)\s*(/?)>"#,
    )
    .expect("valid regex")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

static TAG_EDGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([A-Za-z_][\w.:-]*)[^<>]*?(/?)>").expect("valid regex"));

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("valid regex"));

/// A matched start tag with decoded attribute values.
#[derive(Debug)]
pub(super) struct StartTag<'a> {
    pub name: &'a str,
    attrs: Vec<(&'a str, Cow<'a, str>)>,
    pub self_closing: bool,
    /// Byte offset just past the `>`
    pub end: usize,
}

impl StartTag<'_> {
    /// Attribute value by exact name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_ref())
    }
}

/// Remove `<!-- -->` comments so their content is never extracted.
pub(super) fn strip_comments(text: &str) -> Cow<'_, str> {
    COMMENT.replace_all(text, "")
}

/// Iterate start tags (including self-closing ones) in document order.
pub(super) fn start_tags(text: &str) -> impl Iterator<Item = StartTag<'_>> {
    START_TAG.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?.as_str();
        let attrs = caps
            .get(2)
            .map(|m| parse_attrs(m.as_str()))
            .unwrap_or_default();
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
        Some(StartTag {
            name,
            attrs,
            self_closing,
            end: whole.end(),
        })
    })
}

fn parse_attrs(raw: &str) -> Vec<(&str, Cow<'_, str>)> {
    ATTR.captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((name, unescape(value)))
        })
        .collect()
}

/// Decode XML entities, keeping the raw text if decoding fails.
pub(super) fn unescape(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Content between a start tag (ending at `from`) and its matching end tag.
///
/// Nested elements with the same name are balanced. Returns `None` when no
/// end tag is found within the scan bound.
pub(super) fn element_body<'a>(text: &'a str, name: &str, from: usize) -> Option<&'a str> {
    let rest = text.get(from..)?;
    let mut depth = 1usize;
    for m in TAG_EDGE.captures_iter(rest).take(MAX_BODY_TAGS) {
        if m.get(2).map(|n| n.as_str()) != Some(name) {
            continue;
        }
        let closing = m.get(1).is_some_and(|c| !c.as_str().is_empty());
        let self_closing = m.get(3).is_some_and(|c| !c.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                let start = m.get(0)?.start();
                return rest.get(..start);
            }
        } else if !self_closing {
            depth += 1;
        }
    }
    None
}

/// Text content of a fragment: tags removed, entities decoded, whitespace
/// collapsed. Empty text yields `None`.
pub(super) fn text_content(fragment: &str) -> Option<String> {
    let stripped = ANY_TAG.replace_all(fragment, " ");
    let decoded = unescape(&stripped);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
