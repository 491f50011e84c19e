//! Image source for the product form: nothing, a file picked by the user, or
//! an image produced by the generation endpoint. Never both.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::protocol::{GENERATED_IMAGE_FILENAME, GENERATED_IMAGE_MIME};

use crate::ImagePart;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UserFile {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// `data:` URL a view can render directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    bytes: Vec<u8>,
    preview: PreviewHandle,
}

impl GeneratedImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let preview = PreviewHandle::from_bytes(GENERATED_IMAGE_MIME, &bytes);
        Self { bytes, preview }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageSelection {
    #[default]
    None,
    UserFile(UserFile),
    Generated(GeneratedImage),
}

impl ImageSelection {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn user_file(&self) -> Option<&UserFile> {
        match self {
            Self::UserFile(file) => Some(file),
            _ => None,
        }
    }

    pub fn generated(&self) -> Option<&GeneratedImage> {
        match self {
            Self::Generated(image) => Some(image),
            _ => None,
        }
    }

    pub fn preview(&self) -> Option<PreviewHandle> {
        match self {
            Self::None => None,
            Self::UserFile(file) => Some(PreviewHandle::from_bytes(&file.mime_type, &file.bytes)),
            Self::Generated(image) => Some(image.preview.clone()),
        }
    }

    /// File part for the product submission; generated images are wrapped
    /// as a JPEG file.
    pub fn to_part(&self) -> Option<ImagePart> {
        match self {
            Self::None => None,
            Self::UserFile(file) => Some(ImagePart {
                filename: file.filename.clone(),
                mime_type: file.mime_type.clone(),
                bytes: file.bytes.clone(),
            }),
            Self::Generated(image) => Some(ImagePart {
                filename: GENERATED_IMAGE_FILENAME.to_string(),
                mime_type: GENERATED_IMAGE_MIME.to_string(),
                bytes: image.bytes.clone(),
            }),
        }
    }
}
