use bytes::Bytes;

use crate::constants;

/// One value held by a [`FormData`](crate::FormData) entry: either plain text
/// or a binary attachment.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Attachment(Attachment),
}

impl Value {
    /// Constructs an attachment value, equivalent to
    /// `Value::from(Attachment::new(content))`.
    pub fn attachment(content: impl Into<Bytes>) -> Value {
        Value::Attachment(Attachment::new(content))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn is_attachment(&self) -> bool {
        matches!(self, Value::Attachment(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            Value::Attachment(_) => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&Attachment> {
        match self {
            Value::Text(_) => None,
            Value::Attachment(attachment) => Some(attachment),
        }
    }
}

/// A binary payload with an associated filename and optional MIME type.
///
/// The payload is reference-counted [`Bytes`]; cloning an `Attachment` never
/// copies the content. A bare byte payload is always an attachment, never
/// coerced to text, and its filename defaults to `"blob"` until overridden.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    content: Bytes,
    file_name: String,
    content_type: Option<mime::Mime>,
}

impl Attachment {
    pub fn new(content: impl Into<Bytes>) -> Attachment {
        Attachment {
            content: content.into(),
            file_name: constants::DEFAULT_FILE_NAME.to_owned(),
            content_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Attachment {
        self.file_name = file_name.into();
        self
    }

    pub fn with_content_type(mut self, content_type: mime::Mime) -> Attachment {
        self.content_type = Some(content_type);
        self
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The declared MIME type, if any. The encoder substitutes
    /// `application/octet-stream` on the wire when this is `None`.
    pub fn content_type(&self) -> Option<&mime::Mime> {
        self.content_type.as_ref()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub(crate) fn set_file_name(&mut self, file_name: String) {
        self.file_name = file_name;
    }
}

impl From<Attachment> for Value {
    fn from(attachment: Attachment) -> Value {
        Value::Attachment(attachment)
    }
}

impl From<Bytes> for Value {
    fn from(content: Bytes) -> Value {
        Value::attachment(content)
    }
}

impl From<Vec<u8>> for Value {
    fn from(content: Vec<u8>) -> Value {
        Value::attachment(content)
    }
}

impl From<&[u8]> for Value {
    fn from(content: &[u8]) -> Value {
        Value::attachment(Bytes::copy_from_slice(content))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Value {
        Value::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Value {
        Value::Text(text)
    }
}

// Scalar inputs stringify to their conventional literal text.
macro_rules! impl_value_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(scalar: $ty) -> Value {
                    Value::Text(scalar.to_string())
                }
            }
        )*
    };
}

impl_value_from_scalar!(bool, i32, i64, u32, u64, f32, f64);
