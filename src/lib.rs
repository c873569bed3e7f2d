//! An in-memory model of a named, ordered, multi-valued form-field
//! collection, plus both `multipart/form-data` codec directions: a
//! deterministic encoder with a generated boundary, and a streaming,
//! chunk-boundary-agnostic parser.
//!
//! # Examples
//!
//! ```
//! use formdata::{Attachment, FormData};
//!
//! let mut form = FormData::new();
//! form.append("title", "hello");
//! form.append(
//!     "upload",
//!     Attachment::new(&b"payload"[..]).with_file_name("payload.bin"),
//! );
//!
//! let body = formdata::encode(&form);
//! let boundary = formdata::parse_boundary(body.content_type()).unwrap();
//!
//! let parsed = formdata::decode(body.chunks(), &boundary).unwrap();
//! assert_eq!(parsed.get("title").unwrap().as_text(), Some("hello"));
//! ```

pub use assembler::FormDataAssembler;
pub use encoder::{encode, encode_with_boundary, encode_with_rng, random_boundary, EncodedBody};
pub use error::Error;
pub use form_data::{FormData, Iter};
pub use parser::{Events, MultipartParser};
pub use value::{Attachment, Value};

mod assembler;
mod constants;
mod encoder;
mod error;
mod form_data;
mod parser;
mod value;

/// A Result type often returned from methods that can have `formdata` errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses a `Content-Type` header value to extract the boundary token.
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    let m = content_type
        .as_ref()
        .parse::<mime::Mime>()
        .map_err(Error::DecodeContentType)?;

    if !(m.type_() == mime::MULTIPART_FORM_DATA.type_() && m.subtype() == mime::MULTIPART_FORM_DATA.subtype()) {
        return Err(Error::NotMultipart);
    }

    m.get_param(mime::BOUNDARY)
        .map(|name| name.as_str().to_owned())
        .ok_or(Error::MissingBoundary)
}

/// Parses a full multipart body, supplied as any sequence of byte chunks,
/// into a [`FormData`] collection.
///
/// The chunking is immaterial: a boundary or header split across chunks
/// parses identically to the whole body in one buffer.
pub fn decode<C, B>(chunks: C, boundary: &str) -> crate::Result<FormData>
where
    C: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut parser = MultipartParser::new(boundary)?;
    let mut assembler = FormDataAssembler::new();

    for chunk in chunks {
        parser.write(chunk.as_ref(), &mut assembler)?;
    }
    parser.finish(&mut assembler)?;

    let form = assembler.into_form_data();
    log::debug!("decoded {} entries", form.len());
    Ok(form)
}
