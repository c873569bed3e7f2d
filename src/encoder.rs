use std::borrow::Cow;

use bytes::{Bytes, BytesMut};
use memchr::memchr3;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::constants;
use crate::{Error, FormData, Value};

/// The `multipart/form-data` rendition of a [`FormData`] collection.
///
/// The body is a sequence of [`Bytes`] chunks: attachment payloads are
/// reference-counted clones of the collection's own buffers, so iterating the
/// body never copies large contents. Use [`to_bytes`](EncodedBody::to_bytes)
/// when a single contiguous buffer is needed.
#[derive(Debug, Clone)]
pub struct EncodedBody {
    boundary: String,
    chunks: Vec<Bytes>,
}

impl EncodedBody {
    /// The boundary token separating the parts.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The value to declare as the transport envelope's `Content-Type`.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Total body length in bytes.
    pub fn len(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.len() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(|chunk| chunk.is_empty())
    }

    /// Iterates the body chunks without consuming them.
    pub fn chunks(&self) -> impl Iterator<Item = &Bytes> {
        self.chunks.iter()
    }

    /// Concatenates the body into one contiguous buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len() as usize);
        for chunk in &self.chunks {
            buf.extend_from_slice(chunk);
        }
        buf.freeze()
    }
}

impl IntoIterator for EncodedBody {
    type Item = Bytes;
    type IntoIter = std::vec::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

/// Encodes the collection with a freshly generated random boundary.
pub fn encode(form: &FormData) -> EncodedBody {
    encode_with_rng(form, &mut rand::thread_rng())
}

/// Encodes the collection, drawing the boundary token from `rng`.
pub fn encode_with_rng<R: Rng>(form: &FormData, rng: &mut R) -> EncodedBody {
    let boundary = random_boundary(rng);
    let chunks = build_chunks(form, &boundary);
    log::debug!("encoded {} entries into {} chunks", form.len(), chunks.len());
    EncodedBody { boundary, chunks }
}

/// Encodes the collection with a caller-chosen boundary token.
///
/// The caller is responsible for picking a token that does not occur inside
/// any entry's content.
pub fn encode_with_boundary(form: &FormData, boundary: impl Into<String>) -> crate::Result<EncodedBody> {
    let boundary = boundary.into();
    if boundary.is_empty() {
        return Err(Error::InvalidArgument(
            "multipart boundary must not be empty".to_owned(),
        ));
    }
    let chunks = build_chunks(form, &boundary);
    Ok(EncodedBody { boundary, chunks })
}

/// A boundary token long and random enough that a collision with entry
/// content is negligible (though not guaranteed against adversarial input).
pub fn random_boundary<R: Rng>(rng: &mut R) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(constants::BOUNDARY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", constants::BOUNDARY_PREFIX, suffix)
}

fn build_chunks(form: &FormData, boundary: &str) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(form.len() * 3 + 1);

    for (name, value) in form {
        let mut head = String::new();
        head.push_str(constants::BOUNDARY_EXT);
        head.push_str(boundary);
        head.push_str(constants::CRLF);

        match value {
            Value::Text(text) => {
                head.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    escape_header_param(name)
                ));
                chunks.push(Bytes::from(head.into_bytes()));
                chunks.push(Bytes::from(text.clone().into_bytes()));
            }
            Value::Attachment(attachment) => {
                head.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    escape_header_param(name),
                    escape_header_param(attachment.file_name())
                ));
                let content_type = attachment
                    .content_type()
                    .cloned()
                    .unwrap_or(mime::APPLICATION_OCTET_STREAM);
                head.push_str(&format!("Content-Type: {}\r\n\r\n", content_type));
                chunks.push(Bytes::from(head.into_bytes()));
                chunks.push(attachment.content().clone());
            }
        }

        chunks.push(Bytes::from_static(constants::CRLF.as_bytes()));
    }

    let closing = format!("{}{}{}", constants::BOUNDARY_EXT, boundary, constants::BOUNDARY_EXT);
    chunks.push(Bytes::from(closing.into_bytes()));
    chunks
}

/// Percent-encodes the bytes that may not appear raw inside a quoted header
/// parameter: CR, LF and the quote character. The streaming parser reverses
/// exactly these three escapes.
fn escape_header_param(value: &str) -> Cow<'_, str> {
    if memchr3(b'\r', b'\n', b'"', value.as_bytes()).is_none() {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            '"' => escaped.push_str("%22"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}
