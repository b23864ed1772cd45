use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// A chat line carried over the signaling socket.
///
/// Images travel inline as base64 text. At least one of `text`/`image`
/// is non-empty for any message built through [`ChatMessage::new`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    #[serde(default)]
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChatMessage {
    /// Returns `None` when both text and image are absent or empty.
    pub fn new(
        from: impl Into<String>,
        text: Option<String>,
        image: Option<String>,
    ) -> Option<Self> {
        let text = text.filter(|t| !t.trim().is_empty());
        let image = image.filter(|i| !i.is_empty());

        if text.is_none() && image.is_none() {
            return None;
        }

        Some(Self {
            from: from.into(),
            text,
            image,
        })
    }

    pub fn encode_image(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    pub fn image_bytes(&self) -> Result<Option<Vec<u8>>, ProtocolError> {
        self.image
            .as_deref()
            .map(|encoded| STANDARD.decode(encoded).map_err(ProtocolError::InvalidImage))
            .transpose()
    }

    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(|t| t.trim().is_empty())
            && self.image.as_deref().is_none_or(str::is_empty)
    }
}
