//! Appending content to an existing note
//!
//! Two phases per update:
//! 1. Stage: attachments are created as a separate note, since a link in a
//!    note body must point at an existing note.
//! 2. Splice: the new fragment, with one link per staged file, is inserted
//!    before the existing body's closing `</en-note>` and the note is updated.
//!    A self-closed `<en-note/>` root is opened up to hold the fragment.
//!
//! The existing body is checked before anything is staged. If the remote
//! update fails after staging, the staging note is left behind.

use super::client::EvernoteClient;
use super::models::Note;
use crate::enml::{self, NoteInput, ROOT_CLOSE};
use crate::error::{EvernoteError, Result};

const ROOT_TAG: &str = "<en-note";

pub struct NoteMerger<'a> {
    client: &'a EvernoteClient,
}

impl<'a> NoteMerger<'a> {
    pub fn new(client: &'a EvernoteClient) -> Self {
        Self { client }
    }

    /// Fetch the note by guid, then merge `update` into it.
    pub async fn update_note_by_guid(
        &self,
        auth_token: &str,
        note_guid: &str,
        update: NoteInput,
    ) -> Result<Note> {
        let existing = self.client.get_note(auth_token, note_guid).await?;
        self.merge_and_update(auth_token, existing, update).await
    }

    /// Append `update` to `existing` and submit the result.
    pub async fn merge_and_update(
        &self,
        auth_token: &str,
        existing: Note,
        update: NoteInput,
    ) -> Result<Note> {
        if update.is_empty() {
            return Err(EvernoteError::Validation(
                "nothing to append: no text, html or files".to_string(),
            ));
        }

        locate_insertion(&existing.content)?;

        let links = if update.files.is_empty() {
            Vec::new()
        } else {
            self.stage_files(auth_token, &existing, &update).await?
        };

        let note = splice(existing, &update, &links)?;
        tracing::debug!(
            note_guid = note.guid.as_deref().unwrap_or(""),
            staged = links.len(),
            "Updating note with appended content"
        );
        self.client.update_note(auth_token, note).await
    }

    /// Create a staging note holding the attachments and return one anchor per file.
    async fn stage_files(
        &self,
        auth_token: &str,
        existing: &Note,
        update: &NoteInput,
    ) -> Result<Vec<String>> {
        let staging = NoteInput {
            title: update.title.clone(),
            files: update.files.clone(),
            ..Default::default()
        };
        let staged = self
            .client
            .new_note(auth_token, existing.notebook_guid.clone(), staging)
            .await?;
        let staged_guid = staged
            .guid
            .ok_or_else(|| EvernoteError::api("staging note was created without a guid"))?;
        let link = self
            .client
            .get_note_link(auth_token, &staged_guid, false)
            .await?;

        Ok(update
            .files
            .iter()
            .map(|file| enml::link(&link, &file.display_name()))
            .collect())
    }
}

/// Where new content goes in an existing body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Insertion {
    /// Byte offset of the last `</en-note>`
    BeforeClose(usize),
    /// Byte range of a trailing self-closed root tag, e.g. `<en-note/>`
    SelfClosed { start: usize, end: usize },
}

fn locate_insertion(content: &str) -> Result<Insertion> {
    if let Some(close) = content.rfind(ROOT_CLOSE) {
        return Ok(Insertion::BeforeClose(close));
    }
    let self_closed = content.rfind(ROOT_TAG).and_then(|start| {
        let end = start + content[start..].find('>')? + 1;
        let tag = &content[start..end];
        let name_ends = tag[ROOT_TAG.len()..]
            .starts_with(|c: char| c == '/' || c.is_whitespace());
        (name_ends && tag.ends_with("/>")).then_some(Insertion::SelfClosed { start, end })
    });
    self_closed.ok_or_else(|| {
        EvernoteError::Validation("existing note body has no <en-note> root element".to_string())
    })
}

/// Insert the update's fragment before the closing root tag of `existing`.
///
/// Anything after the root element is kept. The existing title wins unless
/// it is empty and the update carries one.
pub fn splice(mut existing: Note, update: &NoteInput, links: &[String]) -> Result<Note> {
    let body = existing.content.trim_end();
    let fragment = enml::fragment(update.text(), update.html(), links);

    let mut content = String::with_capacity(body.len() + fragment.len() + ROOT_CLOSE.len());
    match locate_insertion(body)? {
        Insertion::BeforeClose(close) => {
            content.push_str(&body[..close]);
            content.push_str(&fragment);
            content.push_str(&body[close..]);
        }
        Insertion::SelfClosed { start, end } => {
            let open = body[start..end - 2].trim_end();
            content.push_str(&body[..start]);
            content.push_str(open);
            content.push('>');
            content.push_str(&fragment);
            content.push_str(ROOT_CLOSE);
            content.push_str(&body[end..]);
        }
    }
    existing.content = content;

    if existing.title.is_empty() {
        if let Some(title) = update.title() {
            existing.title = title.to_string();
        }
    }
    Ok(existing)
}
