//! Content categories derived from file extensions.

use crate::codec::extension;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Audio,
    Other,
}

impl ContentKind {
    /// Image and audio content is stored as a base64 data URL.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(self, ContentKind::Image | ContentKind::Audio)
    }
}

/// Decides how a file's content is stored and presented.
pub trait ContentClassifier: Send + Sync {
    fn kind_of(&self, name: &str) -> ContentKind;

    /// Media type used in data URLs, `""` when unknown.
    fn media_type(&self, name: &str) -> String;

    /// Extensions accepted by the name validator.
    fn is_allowed(&self, name: &str) -> bool {
        self.kind_of(name) != ContentKind::Other
    }
}

const TEXT: &[&str] = &["grace", "txt", "json", "xml", "js", "html", "xhtml"];
const IMAGE: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("png", "image/png"),
];
const AUDIO: &[(&str, &str)] = &[("mp3", "audio/mpeg"), ("ogg", "audio/ogg"), ("wav", "audio/wav")];

/// The built-in extension table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionClassifier;

impl ContentClassifier for ExtensionClassifier {
    fn kind_of(&self, name: &str) -> ContentKind {
        let Some(ext) = extension(name) else {
            return ContentKind::Other;
        };
        if TEXT.contains(&ext) {
            ContentKind::Text
        } else if IMAGE.iter().any(|(known, _)| *known == ext) {
            ContentKind::Image
        } else if AUDIO.iter().any(|(known, _)| *known == ext) {
            ContentKind::Audio
        } else {
            ContentKind::Other
        }
    }

    fn media_type(&self, name: &str) -> String {
        let ext = extension(name).unwrap_or_default();
        IMAGE
            .iter()
            .chain(AUDIO.iter())
            .find(|(known, _)| *known == ext)
            .map(|(_, media)| (*media).to_string())
            .unwrap_or_default()
    }
}

/// `data:<media type>;base64,<payload>`
#[must_use]
pub fn encode_data_url(media_type: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{media_type};base64,{payload}")
}

/// Payload of a base64 data URL, `None` if `content` is not one.
#[must_use]
pub fn decode_data_url(content: &str) -> Option<Vec<u8>> {
    let rest = content.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    base64::engine::general_purpose::STANDARD.decode(payload).ok()
}
