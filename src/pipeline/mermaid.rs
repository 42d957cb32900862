//! Mermaid stage: ```` ```mermaid ```` fences to the `mermaid` shortcode.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_MERMAID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```mermaid\n(.*?)\n```").unwrap());

/// Rewrite every mermaid fence; lines are trimmed and blank lines dropped.
pub fn transform_mermaid(content: &str) -> String {
    RE_MERMAID
        .replace_all(content, |caps: &Captures| {
            let body = caps[1]
                .split('\n')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            format!("{{{{< mermaid >}}}}\n{body}\n{{{{< /mermaid >}}}}")
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mermaid_fence() {
        assert_eq!(
            transform_mermaid("```mermaid\ngraph TD\nA-->B\n```"),
            "{{< mermaid >}}\ngraph TD\nA-->B\n{{< /mermaid >}}"
        );
    }

    #[test]
    fn test_lines_trimmed_and_blanks_dropped() {
        assert_eq!(
            transform_mermaid("x\n```mermaid\n  graph LR\n\n    A --> B  \n```\ny"),
            "x\n{{< mermaid >}}\ngraph LR\nA --> B\n{{< /mermaid >}}\ny"
        );
    }

    #[test]
    fn test_other_fences_untouched() {
        let input = "```rust\nfn main() {}\n```";
        assert_eq!(transform_mermaid(input), input);
    }
}
