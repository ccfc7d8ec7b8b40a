//! Comment delimiter construction
//!
//! Blocks serialize to HTML comments that encode the type name and a JSON
//! attribute object:
//!
//! ```text
//! <!-- wp:core/image {"id":7} -->...<!-- /wp:core/image -->
//! ```
//!
//! A block whose content is empty uses the self-closing form
//! `<!-- wp:core/spacer /-->`. Attribute JSON is escaped so it can never
//! terminate the surrounding comment or leak raw markup.

use serde_json::Value;

/// Serialize a block attribute value to comment-safe JSON.
///
/// After JSON encoding, the characters that are unsafe inside an HTML comment
/// are rewritten to unicode escape sequences: `--` (would close the comment),
/// `<`, `>`, `&`, and the escaped quote `\"`. JSON parsers resolve the
/// escapes back to the original characters, so attribute round-trips are
/// lossless.
pub fn serialize_attributes(attrs: &Value) -> String {
    let encoded = serde_json::to_string(attrs).unwrap_or_else(|_| String::from("{}"));
    encoded
        .replace("--", "\\u002d\\u002d")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace("\\\"", "\\u0022")
}

/// Wrap serialized block content in its comment delimiters.
///
/// * `block_name` of `None` marks a freeform block: the content is returned
///   undecorated.
/// * An empty or non-object `attrs` omits the JSON segment entirely.
/// * Empty `content` produces the self-closing form instead of an open/close
///   delimiter pair.
pub fn comment_delimited_content(
    block_name: Option<&str>,
    attrs: &Value,
    content: &str,
) -> String {
    let Some(name) = block_name else {
        return content.to_string();
    };

    let serialized_attrs = match attrs.as_object() {
        Some(map) if !map.is_empty() => format!("{} ", serialize_attributes(attrs)),
        _ => String::new(),
    };

    if content.is_empty() {
        format!("<!-- wp:{} {}/-->", name, serialized_attrs)
    } else {
        format!(
            "<!-- wp:{} {}-->{}<!-- /wp:{} -->",
            name, serialized_attrs, content, name
        )
    }
}
