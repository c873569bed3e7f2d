use std::fmt::{self, Debug, Display, Formatter};

use derive_more::Display;

/// A set of errors that can occur while mutating a [`FormData`](crate::FormData)
/// collection or running either codec direction.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// A caller-supplied argument was rejected before any mutation or parsing
    /// took place, e.g. an empty boundary token.
    #[display(fmt = "invalid argument: {}", _0)]
    InvalidArgument(String),

    /// The parser rejected a byte of the multipart stream. The offset counts
    /// from the first byte ever fed to the parser, across all chunks.
    ///
    /// This error is terminal for the parse session; the state machine cannot
    /// resynchronize mid-stream.
    #[display(fmt = "malformed multipart stream at byte offset {}", offset)]
    MalformedMultipart { offset: u64 },

    /// The input ended while the parser still expected more bytes, e.g. a
    /// body truncated inside a header line or part payload.
    #[display(fmt = "unexpected end of multipart stream")]
    UnexpectedEndOfStream,

    /// The `Content-Type` header is not `multipart/form-data`.
    #[display(fmt = "Content-Type is not multipart/form-data")]
    NotMultipart,

    /// No usable `boundary=` parameter in the `Content-Type` header.
    #[display(fmt = "multipart boundary not found in Content-Type")]
    MissingBoundary,

    /// Failed to parse the `Content-Type` header as a [`mime::Mime`].
    #[display(fmt = "failed to parse Content-Type as mime type: {}", _0)]
    DecodeContentType(mime::FromStrError),
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}
