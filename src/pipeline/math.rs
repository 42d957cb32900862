//! Math stage: inline `$…$` to the Blowfish `katex` shortcode.
//!
//! Block math (`$$…$$`) is matched first so its inner `$` signs are never
//! read as inline delimiters, and it is emitted unchanged: Blowfish renders
//! display math without a shortcode. Unbalanced delimiters simply do not
//! match and pass through.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\$\$.+?\$\$|\$[^$]+?\$").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Rewrite every inline math span in `content`.
pub fn transform_math(content: &str) -> String {
    RE_MATH
        .replace_all(content, |caps: &Captures| {
            let segment = &caps[0];
            if segment.starts_with("$$") {
                segment.to_string()
            } else {
                katex(&clean_math(&segment[1..segment.len() - 1]))
            }
        })
        .into_owned()
}

/// Trim, collapse whitespace runs, double every backslash.
fn clean_math(body: &str) -> String {
    RE_WHITESPACE
        .replace_all(body.trim(), " ")
        .replace('\\', r"\\")
}

// The shortcode body is escaped twice by Hugo, hence `\\(` and `\\)`.
fn katex(body: &str) -> String {
    String::from(r"{{< katex >}}\\(") + body + r"\\)"
}
