// ABOUTME: Implements a single multipart body part of an MMS message
// ABOUTME: Media classification is derived from the content-type prefix, never stored

use crate::macros::builder_setters;
use bytes::Bytes;

/// One part of a multipart MMS body.
///
/// A part carries its payload either inline (`data`) or as a reference to
/// external storage (`data_uri`). Both may be set; the inline payload wins
/// when the part is serialized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PduPart {
    pub content_type: Option<String>,
    pub content_location: Option<String>,
    pub content_id: Option<String>,
    pub data: Option<Bytes>,
    pub data_uri: Option<String>,
    pub filename: Option<String>,
    pub name: Option<String>,
    pub charset: Option<u16>,
}

impl PduPart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for an inline part.
    pub fn with_data(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            data: Some(data.into()),
            ..Self::default()
        }
    }

    builder_setters! {
        content_type: Option<String>,
        content_location: Option<String>,
        content_id: Option<String>,
        data: Option<Bytes>,
        data_uri: Option<String>,
        filename: Option<String>,
        name: Option<String>,
        charset: Option<u16>,
    }

    fn content_type_starts_with(&self, prefix: &str) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with(prefix))
    }

    pub fn is_text(&self) -> bool {
        self.content_type_starts_with("text/")
    }

    pub fn is_image(&self) -> bool {
        self.content_type_starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.content_type_starts_with("video/")
    }

    pub fn is_audio(&self) -> bool {
        self.content_type_starts_with("audio/")
    }

    /// Inline payload bytes, empty when the part only references external data.
    pub fn payload(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }
}
