/// Boilerplate prefixes some models put in front of the edited text.
pub const START_TAG_VARIATIONS: &[&str] = &[
    "<edited_text>",
    "<edited_Text>",
    "<Edited_Text>",
    "<Edited_text>",
    "<EditedText>",
];

/// Keeps only what follows the first recognised start tag, trimmed.
///
/// Variants are tried in table order and the first one present wins; text without
/// any tag is returned trimmed.
pub fn remove_start_tag(text: &str) -> String {
    for tag in START_TAG_VARIATIONS {
        if let Some(idx) = text.find(tag) {
            return text[idx + tag.len()..].trim().to_string();
        }
    }
    text.trim().to_string()
}
