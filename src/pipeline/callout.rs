//! Callout stage: Obsidian `> [!type]` blocks to the Blowfish `alert` shortcode.
//!
//! ## Code-fence protection
//!
//! Callout syntax inside a fenced code block is an example, not a callout.
//! Before matching, the stage records the span of every ```` ``` ```` fence
//! in the *current* document; a callout whose first byte falls inside one of
//! those spans is copied verbatim. The spans are recomputed on every call
//! because the mermaid stage has not run yet and its fences still look like
//! ordinary code here.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static RE_CALLOUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^>\s*\[!(\w+)\][ \t]*(.*)?\n((?:>[^\n]*\n?)*)").unwrap());
static RE_QUOTE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s?").unwrap());

/// Byte range `[start, end)` of one fenced code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlockSpan {
    pub start: usize,
    pub end: usize,
}

impl CodeBlockSpan {
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Every fenced code block in `content`, in document order.
pub fn code_block_spans(content: &str) -> Vec<CodeBlockSpan> {
    RE_CODE_BLOCK
        .find_iter(content)
        .map(|m| CodeBlockSpan {
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Rewrite every callout outside fenced code.
///
/// The inline title after `[!type]` is dropped; only the quoted body lines
/// end up in the alert. The title must sit on the marker line, so a callout
/// without one keeps its first body line.
pub fn transform_callouts(content: &str) -> String {
    let spans = code_block_spans(content);
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for caps in RE_CALLOUT.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&content[last..whole.start()]);

        if spans.iter().any(|s| s.contains(whole.start())) {
            out.push_str(whole.as_str());
        } else {
            let body = clean_body(caps.get(3).map_or("", |m| m.as_str()));
            let attrs = callout_attributes(&caps[1]);
            out.push_str(&format!(
                "{{{{< alert {attrs} >}}}}\n{body}\n{{{{< /alert >}}}}"
            ));
        }
        last = whole.end();
    }

    out.push_str(&content[last..]);
    out
}

fn clean_body(lines: &str) -> String {
    lines
        .split('\n')
        .map(|line| RE_QUOTE_MARKER.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shortcode attributes for a callout type (case-insensitive).
///
/// Unknown types yield `""`; the alert is still emitted.
pub fn callout_attributes(kind: &str) -> &'static str {
    match kind.to_lowercase().as_str() {
        "note" => r##"icon="pencil" cardColor="#1E3A8A" textColor="#E0E7FF""##,
        "info" => r##"icon="circle-info" cardColor="#b0c4de" textColor="#333333""##,
        "todo" => {
            r##"icon="square-check" iconColor="#4682B4" cardColor="#e0ffff" textColor="#333333""##
        }
        "tip" | "hint" | "important" => {
            r##"icon="lightbulb" cardColor="#fff5b7" textColor="#333333""##
        }
        "success" | "check" | "done" => {
            r##"icon="check" cardColor="#32CD32" textColor="#fff" iconColor="#ffffff""##
        }
        "warning" | "caution" | "attention" => {
            r##"icon="triangle-exclamation" cardColor="#ffcc00" textColor="#333333" iconColor="#8B6914""##
        }
        "question" | "help" | "faq" => {
            r##"icon="circle-question" cardColor="#ffeb3b" textColor="#333333" iconColor="#3b3b3b""##
        }
        "danger" | "error" => {
            r##"icon="fire" cardColor="#e63946" iconColor="#ffffff" textColor="#ffffff""##
        }
        "example" => r##"icon="list" cardColor="#d8bfd8" iconColor="#8B008B" textColor="#333333""##,
        _ => "",
    }
}
