//! YAML frontmatter parsing.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Frontmatter fields the exporter reads.
///
/// Only `slug` drives behaviour; everything else is carried along in
/// `extra` for callers that want it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoteMetadata {
    #[serde(default, deserialize_with = "scalar_string")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl NoteMetadata {
    /// The slug, if present and not blank.
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Accept `slug: 2024-notes`, `slug: 42` and `slug: "x"` alike.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Split `content` into (frontmatter YAML, body).
///
/// Frontmatter must start on the very first line with `---` and end with a
/// line that is exactly `---`.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Parse the frontmatter of a note. Notes without (valid) frontmatter get
/// empty metadata.
pub fn parse_metadata(content: &str) -> NoteMetadata {
    let Some((yaml, _)) = split_frontmatter(content) else {
        return NoteMetadata::default();
    };
    if yaml.trim().is_empty() {
        return NoteMetadata::default();
    }
    match serde_yaml::from_str(yaml) {
        Ok(meta) => meta,
        Err(e) => {
            debug!("Ignoring malformed frontmatter: {}", e);
            NoteMetadata::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        let (yaml, body) = split_frontmatter("---\nslug: a\n---\nbody\n").unwrap();
        assert_eq!(yaml, "slug: a\n");
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_split_requires_leading_fence() {
        assert!(split_frontmatter("text\n---\nslug: a\n---\n").is_none());
        assert!(split_frontmatter("---\nslug: a\nno close").is_none());
    }

    #[test]
    fn test_split_crlf() {
        let (yaml, body) = split_frontmatter("---\r\nslug: a\r\n---\r\nbody").unwrap();
        assert_eq!(yaml, "slug: a\r\n");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_parse_slug_and_title() {
        let meta = parse_metadata("---\ntitle: Hello\nslug: my-post\ntags: [a, b]\n---\n# Hi");
        assert_eq!(meta.slug(), Some("my-post"));
        assert_eq!(meta.title.as_deref(), Some("Hello"));
        assert!(meta.extra.contains_key("tags"));
    }

    #[test]
    fn test_numeric_slug_is_stringified() {
        let meta = parse_metadata("---\nslug: 2024\n---\n");
        assert_eq!(meta.slug(), Some("2024"));
    }

    #[test]
    fn test_blank_slug_counts_as_missing() {
        let meta = parse_metadata("---\nslug: \"  \"\n---\n");
        assert_eq!(meta.slug(), None);
    }

    #[test]
    fn test_malformed_yaml_gives_empty_metadata() {
        let meta = parse_metadata("---\nslug: [oops\n---\n");
        assert_eq!(meta, NoteMetadata::default());
    }

    #[test]
    fn test_no_frontmatter() {
        assert_eq!(parse_metadata("# Title\n"), NoteMetadata::default());
    }
}
