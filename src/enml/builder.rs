//! Note document builder
//!
//! Assembles a new note from already-extracted message content. The body
//! layout is fixed: line break, text block, html fragment, line break, then
//! one `<en-media>` element per attached resource.

use super::resource::ResourceDescriptor;
use super::{document, fragment};
use crate::error::{EvernoteError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Text longer than this many characters gets a truncated title.
pub const TITLE_MAX_CHARS: usize = 30;
/// Number of characters kept in a truncated title.
pub const TITLE_PREFIX_CHARS: usize = 25;

/// A local file to attach, e.g. a downloaded Telegram document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub path: PathBuf,
    pub mime_type: String,
    /// Name shown for the file; defaults to the path's file name
    #[serde(default)]
    pub name: Option<String>,
}

impl FileAttachment {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name shown for the file in note bodies.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    pub fn encode(&self) -> Result<ResourceDescriptor> {
        ResourceDescriptor::encode(&self.path, &self.mime_type, self.name.as_deref())
    }
}

/// Content extracted from one inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub files: Vec<FileAttachment>,
}

impl NoteInput {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_file(mut self, file: FileAttachment) -> Self {
        self.files.push(file);
        self
    }

    /// Text, treating an empty string as absent.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// HTML fragment, treating an empty string as absent.
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref().filter(|h| !h.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// True when there is neither text, html nor a file to store.
    pub fn is_empty(&self) -> bool {
        self.text().is_none() && self.html().is_none() && self.files.is_empty()
    }

    pub fn encode_files(&self) -> Result<Vec<ResourceDescriptor>> {
        self.files.iter().map(FileAttachment::encode).collect()
    }
}

/// A note ready to be created remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDocument {
    pub title: String,
    pub notebook_guid: Option<String>,
    /// ENML body
    pub content: String,
    pub resources: Vec<ResourceDescriptor>,
}

/// Title for a note: the explicit one if given, else derived from the text.
pub fn derive_title(title: Option<&str>, text: Option<&str>) -> String {
    if let Some(title) = title {
        return title.to_string();
    }
    match text {
        Some(text) if text.chars().count() > TITLE_MAX_CHARS => {
            let prefix: String = text.chars().take(TITLE_PREFIX_CHARS).collect();
            format!("{}...", prefix)
        }
        Some(text) => text.to_string(),
        None => String::new(),
    }
}

/// Builds `NoteDocument`s for a target notebook.
#[derive(Debug, Clone, Default)]
pub struct ContentBuilder {
    notebook_guid: Option<String>,
}

impl ContentBuilder {
    /// Builder for the account's default notebook.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_notebook(notebook_guid: impl Into<String>) -> Self {
        Self {
            notebook_guid: Some(notebook_guid.into()),
        }
    }

    /// Assemble a complete document, reading every attachment.
    pub fn build(&self, input: &NoteInput) -> Result<NoteDocument> {
        if input.is_empty() {
            return Err(EvernoteError::Validation(
                "nothing to store: no text, html or files".to_string(),
            ));
        }

        let resources = input.encode_files()?;
        let references: Vec<String> = resources.iter().map(|r| r.reference(None)).collect();
        let content = document(&fragment(input.text(), input.html(), &references));

        Ok(NoteDocument {
            title: derive_title(input.title(), input.text()),
            notebook_guid: self.notebook_guid.clone(),
            content,
            resources,
        })
    }
}
