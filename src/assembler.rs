use bytes::BytesMut;
use encoding_rs::{Encoding, UTF_8};

use crate::constants;
use crate::parser::Events;
use crate::{Attachment, FormData, Value};

/// Materializes a [`FormData`] from the lexical events of a
/// [`MultipartParser`](crate::MultipartParser).
///
/// Parts without a filename become [`Value::Text`] entries, decoded with the
/// charset declared on the part's `Content-Type` (UTF-8 when absent); parts
/// with a filename become [`Value::Attachment`] entries carrying the declared
/// MIME type. A `Content-Transfer-Encoding` header is recorded but the
/// payload is passed through untouched.
#[derive(Default)]
pub struct FormDataAssembler {
    form: FormData,
    header_field: Vec<u8>,
    header_value: Vec<u8>,
    part: Option<Part>,
}

#[derive(Default)]
struct Part {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    transfer_encoding: Option<String>,
    data: BytesMut,
}

impl FormDataAssembler {
    pub fn new() -> FormDataAssembler {
        FormDataAssembler::default()
    }

    /// Consumes the assembler, returning the collection built so far.
    pub fn into_form_data(self) -> FormData {
        self.form
    }

    fn classify_header(&mut self) {
        let part = match &mut self.part {
            Some(part) => part,
            None => return,
        };

        let field = String::from_utf8_lossy(&self.header_field).to_ascii_lowercase();
        let value = String::from_utf8_lossy(&self.header_value).into_owned();

        match field.as_str() {
            "content-disposition" => {
                part.name = constants::CONTENT_DISPOSITION_FIELD_NAME_RE
                    .captures(&value)
                    .and_then(|cap| cap.get(1).or_else(|| cap.get(2)))
                    .map(|m| unescape_header_param(m.as_str()));
                part.file_name = extract_file_name(&value);
            }
            "content-type" => part.content_type = Some(value),
            "content-transfer-encoding" => part.transfer_encoding = Some(value.to_ascii_lowercase()),
            _ => {}
        }
    }
}

impl Events for FormDataAssembler {
    fn part_begin(&mut self) {
        self.part = Some(Part::default());
        self.header_field.clear();
        self.header_value.clear();
    }

    fn header_field(&mut self, bytes: &[u8]) {
        self.header_field.extend_from_slice(bytes);
    }

    fn header_value(&mut self, bytes: &[u8]) {
        self.header_value.extend_from_slice(bytes);
    }

    fn header_end(&mut self) {
        self.classify_header();
        self.header_field.clear();
        self.header_value.clear();
    }

    fn part_data(&mut self, bytes: &[u8]) {
        if let Some(part) = &mut self.part {
            part.data.extend_from_slice(bytes);
        }
    }

    fn part_end(&mut self) {
        let part = match self.part.take() {
            Some(part) => part,
            None => return,
        };

        let name = part.name.unwrap_or_default();
        log::trace!(
            "assembled part '{}' ({} bytes, file: {:?})",
            name,
            part.data.len(),
            part.file_name
        );

        match part.file_name {
            None => {
                let encoding = part
                    .content_type
                    .as_deref()
                    .and_then(|ct| ct.parse::<mime::Mime>().ok())
                    .and_then(|mime| {
                        mime.get_param(mime::CHARSET)
                            .and_then(|charset| Encoding::for_label(charset.as_str().as_bytes()))
                    })
                    .unwrap_or(UTF_8);
                let (text, _, _) = encoding.decode(&part.data);
                self.form.append(name, Value::Text(text.into_owned()));
            }
            Some(file_name) => {
                let mut attachment = Attachment::new(part.data.freeze()).with_file_name(file_name);
                if let Some(mime) = part
                    .content_type
                    .as_deref()
                    .and_then(|ct| ct.parse::<mime::Mime>().ok())
                {
                    attachment = attachment.with_content_type(mime);
                }
                self.form.append(name, Value::Attachment(attachment));
            }
        }
    }
}

/// Extracts `filename=` from a Content-Disposition value: quoted-string or
/// token, directory prefix stripped, escapes reversed.
fn extract_file_name(header_value: &str) -> Option<String> {
    let captures = constants::CONTENT_DISPOSITION_FILE_NAME_RE.captures(header_value)?;
    let raw = captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
        .unwrap_or("");

    // legacy user agents send the full path; keep the last component
    let raw = match raw.rfind('\\') {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    };

    Some(unescape_numeric_refs(&unescape_header_param(raw)))
}

/// Reverses the encoder's percent escapes for CR, LF and the quote character.
fn unescape_header_param(value: &str) -> String {
    value
        .replace("%0D", "\r")
        .replace("%0A", "\n")
        .replace("%22", "\"")
}

/// Reverses `&#dddd;` numeric character references some legacy senders place
/// in filenames.
fn unescape_numeric_refs(value: &str) -> String {
    lazy_static::lazy_static! {
        static ref NUMERIC_REF_RE: regex::Regex = regex::Regex::new(r"&#(\d{4});").unwrap();
    }
    NUMERIC_REF_RE
        .replace_all(value, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(std::char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}
