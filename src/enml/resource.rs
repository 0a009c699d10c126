//! Resource encoding
//!
//! An attachment becomes a `ResourceDescriptor`: the raw bytes, their MIME
//! type and the MD5 digest that joins `<en-media hash="…">` to the resource.

use super::escape;
use crate::error::{EvernoteError, Result};
use std::path::Path;

/// A binary attachment embedded in a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub data: Vec<u8>,
    pub mime: String,
    /// Lowercase hex MD5 of `data`
    pub hash: String,
    pub file_name: Option<String>,
}

impl ResourceDescriptor {
    /// Wrap in-memory bytes.
    pub fn from_bytes(data: Vec<u8>, mime: impl Into<String>, file_name: Option<String>) -> Self {
        let hash = content_hash(&data);
        Self {
            data,
            mime: mime.into(),
            hash,
            file_name,
        }
    }

    /// Read a file fully and describe it.
    ///
    /// `display_name` defaults to the file name component of `path`.
    pub fn encode(path: &Path, mime: &str, display_name: Option<&str>) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| EvernoteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = display_name.map(str::to_string).or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        });
        tracing::debug!(path = %path.display(), mime, size = data.len(), "Encoded resource");
        Ok(Self::from_bytes(data, mime, file_name))
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// `<en-media>` element referencing this resource by hash.
    pub fn media_tag(&self) -> String {
        format!(
            r#"<en-media type="{}" hash="{}" />"#,
            escape(&self.mime),
            self.hash
        )
    }

    /// Anchor pointing at `link`, labelled with the file name.
    pub fn link_tag(&self, link: &str) -> String {
        super::link(link, self.file_name.as_deref().unwrap_or(&self.hash))
    }

    /// Body reference for this resource.
    ///
    /// Images always embed as media. Other files become a link to `link`
    /// when one is known, and fall back to media otherwise.
    pub fn reference(&self, link: Option<&str>) -> String {
        match link {
            Some(link) if !self.is_image() => self.link_tag(link),
            _ => self.media_tag(),
        }
    }
}

/// MD5 digest of `data` as 32 lowercase hex characters.
pub fn content_hash(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_content_hash_known_values() {
        assert_eq!(content_hash(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(content_hash(b"Hello"), "8b1a9953c4611296a827abf8c47804d7");
    }

    #[test]
    fn test_content_hash_deterministic_and_distinct() {
        assert_eq!(content_hash(b"same bytes"), content_hash(b"same bytes"));
        assert_ne!(content_hash(b"Hello"), content_hash(b"hello"));
    }

    #[test]
    fn test_encode_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"Hello").unwrap();
        file.flush().unwrap();

        let resource = ResourceDescriptor::encode(file.path(), "text/plain", None).unwrap();
        assert_eq!(resource.hash, "8b1a9953c4611296a827abf8c47804d7");
        assert_eq!(resource.size(), 5);
        assert_eq!(resource.mime, "text/plain");
        let expected_name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(resource.file_name.as_deref(), Some(expected_name.as_str()));
    }

    #[test]
    fn test_encode_uses_display_name() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF").unwrap();
        let resource =
            ResourceDescriptor::encode(file.path(), "application/pdf", Some("report.pdf")).unwrap();
        assert_eq!(resource.file_name.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn test_encode_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.jpg");
        let err = ResourceDescriptor::encode(&missing, "image/jpeg", None).unwrap_err();
        match err {
            EvernoteError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reference_forms() {
        let image = ResourceDescriptor::from_bytes(vec![1, 2, 3], "image/png", None);
        let doc = ResourceDescriptor::from_bytes(vec![1, 2, 3], "text/plain", Some("a&b.txt".into()));

        assert!(image.is_image());
        assert_eq!(
            image.reference(Some("https://example.com/x")),
            format!(r#"<en-media type="image/png" hash="{}" />"#, image.hash)
        );
        assert_eq!(
            doc.reference(Some("https://example.com/x")),
            r#"<a href="https://example.com/x">a&amp;b.txt</a>"#
        );
        assert_eq!(doc.reference(None), doc.media_tag());
    }
}
