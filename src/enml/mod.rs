//! ENML note content synthesis
//!
//! Builds Evernote note bodies from text, HTML fragments and file attachments:
//! - `resource`: turns an attachment into a hashed resource descriptor
//! - `builder`: assembles a complete `<en-note>` document

pub mod builder;
pub mod resource;

pub use builder::{ContentBuilder, FileAttachment, NoteDocument, NoteInput};
pub use resource::ResourceDescriptor;

pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
pub const DOCTYPE: &str =
    r#"<!DOCTYPE en-note SYSTEM "http://xml.evernote.com/pub/enml2.dtd">"#;
pub const ROOT_OPEN: &str = "<en-note>";
pub const ROOT_CLOSE: &str = "</en-note>";
pub const LINE_BREAK: &str = "<br />";

/// Escape text for use inside element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Anchor element with an escaped target and label.
pub fn link(href: &str, label: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, escape(href), escape(label))
}

/// The block appended to a body for one batch of content:
/// line break, text block, html, line break, then the resource references.
pub(crate) fn fragment(text: Option<&str>, html: Option<&str>, references: &[String]) -> String {
    let mut out = String::from(LINE_BREAK);
    if let Some(text) = text {
        out.push_str("<div>");
        out.push_str(&escape(text));
        out.push_str("</div>");
    }
    if let Some(html) = html {
        out.push_str(html);
    }
    out.push_str(LINE_BREAK);
    for reference in references {
        out.push_str(reference);
    }
    out
}

/// Wrap body children in the DOCTYPE-qualified root element.
pub(crate) fn document(children: &str) -> String {
    format!("{XML_HEADER}{DOCTYPE}{ROOT_OPEN}{children}{ROOT_CLOSE}")
}
