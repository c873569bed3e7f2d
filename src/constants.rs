use lazy_static::lazy_static;
use regex::Regex;

pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const SPACE: u8 = b' ';
pub(crate) const HYPHEN: u8 = b'-';
pub(crate) const COLON: u8 = b':';

pub(crate) const CRLF: &str = "\r\n";
pub(crate) const BOUNDARY_EXT: &str = "--";
pub(crate) const BOUNDARY_PREFIX: &str = "----FormDataBoundary";
pub(crate) const BOUNDARY_RANDOM_LEN: usize = 16;

/// Fallback filename for attachments supplied without one.
pub(crate) const DEFAULT_FILE_NAME: &str = "blob";

/// Extra room in the parser's lookbehind window beyond the boundary itself,
/// covering the trailing `\r\n` / `--` and the probe byte.
pub(crate) const LOOKBEHIND_SLACK: usize = 8;

lazy_static! {
    // `name=` / `filename=` accept either a quoted-string or a bare token
    // (RFC 2616 section 19.5.1).
    pub(crate) static ref CONTENT_DISPOSITION_FIELD_NAME_RE: Regex =
        Regex::new(r#"(?i)\bname=(?:"([^"]*)"|([^()<>@,;:\\"/\[\]?={} \t]+))"#).unwrap();
    pub(crate) static ref CONTENT_DISPOSITION_FILE_NAME_RE: Regex =
        Regex::new(r#"(?i)\bfilename=(?:"(.*?)"|([^()<>@,;:\\"/\[\]?={} \t]+))(?:$|;)"#).unwrap();
}
