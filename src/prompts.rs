//! System prompts for note translation.
//!
//! Both prompts are built here so the exact instructions sent to the model
//! can be inspected in unit tests without calling a provider.

/// System prompt for translating a note title into `language`.
pub fn title_prompt(language: &str) -> String {
    format!(
        "You are a precise title translator. Translate the following title into concise, \
         idiomatic {language}. Reply with the translated title only."
    )
}

/// System prompt for translating a whole Markdown note into `language`.
pub fn content_prompt(language: &str) -> String {
    format!(
        "You are a professional document translator. Translate the following Markdown \
         into fluent, natural {language}, following these rules:\n\
         1. Keep all Markdown formatting, links and image references unchanged; keep the \
         frontmatter format unchanged.\n\
         2. Do not translate file names or links.\n\
         3. Translate comments inside code blocks.\n\
         Output only the translated document."
    )
}
