use bytes::Bytes;
use formdata::{Attachment, Error, FormData, Value};

fn sample_form() -> FormData {
    let mut form = FormData::new();
    form.append("My Field", "abcd");
    form.append("My Field", "second value");
    form.append(
        "File Field",
        Attachment::new(&b"Hello world\nHello\r\nWorld\rAgain"[..])
            .with_file_name("a-text-file.txt")
            .with_content_type(mime::TEXT_PLAIN),
    );
    form.append(
        "binary",
        Attachment::new(Bytes::from_static(&[0x00, 0x0D, 0x0A, 0x2D, 0x2D, 0xFF]))
            .with_file_name("raw.bin")
            .with_content_type(mime::APPLICATION_OCTET_STREAM),
    );
    form
}

#[test]
fn test_round_trip() {
    let form = sample_form();
    let body = formdata::encode(&form);
    let boundary = formdata::parse_boundary(body.content_type()).unwrap();

    let parsed = formdata::decode(body.chunks(), &boundary).unwrap();
    assert_eq!(parsed, form);
}

#[test]
fn test_parse_basic_body_fed_byte_at_a_time() {
    let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"My Field\"\r\n\r\nabcd\r\n--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"File Field\"; filename=\"a-text-file.txt\"\r\nContent-Type: text/plain\r\n\r\nHello world\nHello\r\nWorld\rAgain\r\n--X-BOUNDARY--\r\n";

    let form = formdata::decode(data.as_bytes().iter().map(std::slice::from_ref), "X-BOUNDARY").unwrap();

    assert_eq!(form.len(), 2);
    assert_eq!(form.get("My Field").unwrap().as_text(), Some("abcd"));

    let file = form.get("File Field").unwrap().as_attachment().unwrap();
    assert_eq!(file.file_name(), "a-text-file.txt");
    assert_eq!(file.content_type(), Some(&mime::TEXT_PLAIN));
    assert_eq!(file.content().as_ref(), b"Hello world\nHello\r\nWorld\rAgain");
}

#[test]
fn test_chunk_boundary_independence() {
    let form = sample_form();
    let body = formdata::encode_with_boundary(&form, "X-BOUNDARY").unwrap();
    let bytes = body.to_bytes();

    let expected = formdata::decode(Some(&bytes), "X-BOUNDARY").unwrap();

    for split in 0..=bytes.len() {
        let parsed = formdata::decode(vec![&bytes[..split], &bytes[split..]], "X-BOUNDARY")
            .unwrap_or_else(|err| panic!("split at {} failed: {}", split, err));
        assert_eq!(parsed, expected, "split at {}", split);
    }
}

#[test]
fn test_empty_body() {
    let form = formdata::decode(Some(b"--X-BOUNDARY--\r\n"), "X-BOUNDARY").unwrap();
    assert!(form.is_empty());

    let round = formdata::encode(&FormData::new());
    let parsed = formdata::decode(round.chunks(), round.boundary()).unwrap();
    assert!(parsed.is_empty());
}

#[test]
fn test_duplicate_names_preserve_order() {
    let mut form = FormData::new();
    form.append("a", "1");
    form.append("b", "2");
    form.append("a", "3");

    let body = formdata::encode(&form);
    let parsed = formdata::decode(body.chunks(), body.boundary()).unwrap();

    let keys: Vec<&str> = parsed.keys().collect();
    assert_eq!(keys, vec!["a", "b", "a"]);
    let all: Vec<&str> = parsed.get_all("a").iter().map(|v| v.as_text().unwrap()).collect();
    assert_eq!(all, vec!["1", "3"]);
}

#[test]
fn test_unsafe_names_and_filenames_round_trip() {
    let mut form = FormData::new();
    form.append("he said \"hi\"", "v1");
    form.append("line\r\nbreak", "v2");
    form.append(
        "file",
        Attachment::new(&b"x"[..])
            .with_file_name("we\"ird\r\n.txt")
            .with_content_type(mime::APPLICATION_OCTET_STREAM),
    );

    let body = formdata::encode(&form);
    let bytes = body.to_bytes();
    let contains = |needle: &[u8]| bytes.windows(needle.len()).any(|w| w == needle);
    // quotes, CR and LF are percent-escaped on the wire
    assert!(contains(br#"name="he said %22hi%22""#));
    assert!(contains(br#"name="line%0D%0Abreak""#));
    assert!(contains(br#"filename="we%22ird%0D%0A.txt""#));

    let parsed = formdata::decode(body.chunks(), body.boundary()).unwrap();
    assert_eq!(parsed, form);
}

#[test]
fn test_unicode_names_and_filenames() {
    let mut form = FormData::new();
    form.append("你好", "世界");
    form.append(
        "কখগ",
        Attachment::new(&b"bytes"[..])
            .with_file_name("কখগ-你好.txt")
            .with_content_type(mime::TEXT_PLAIN),
    );

    let body = formdata::encode(&form);
    let parsed = formdata::decode(body.chunks(), body.boundary()).unwrap();
    assert_eq!(parsed, form);
}

#[test]
fn test_bare_blob_gains_default_filename_and_type_on_the_wire() {
    let mut form = FormData::new();
    form.append("blobby", Vec::<u8>::new());

    let body = formdata::encode(&form);
    let parsed = formdata::decode(body.chunks(), body.boundary()).unwrap();

    let attachment = parsed.get("blobby").unwrap().as_attachment().unwrap();
    assert_eq!(attachment.file_name(), "blob");
    assert_eq!(attachment.content_type(), Some(&mime::APPLICATION_OCTET_STREAM));
    assert!(attachment.is_empty());
}

#[test]
fn test_truncated_mid_header_is_an_error() {
    let form = sample_form();
    let body = formdata::encode_with_boundary(&form, "X-BOUNDARY").unwrap();
    let bytes = body.to_bytes();

    // cut inside the first Content-Disposition line
    let cut = bytes
        .windows(b"name=".len())
        .position(|w| w == b"name=")
        .unwrap();
    let err = formdata::decode(Some(&bytes[..cut]), "X-BOUNDARY").unwrap_err();
    assert_eq!(err, Error::UnexpectedEndOfStream);
}

#[test]
fn test_truncated_mid_part_data_is_an_error() {
    let data = b"--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\npartial bo";
    let err = formdata::decode(Some(&data[..]), "X-BOUNDARY").unwrap_err();
    assert_eq!(err, Error::UnexpectedEndOfStream);
}

#[test]
fn test_garbage_before_first_boundary_is_rejected_with_offset() {
    let err = formdata::decode(Some(b"garbage\r\n--X--"), "X").unwrap_err();
    assert!(matches!(err, Error::MalformedMultipart { .. }));
}

#[test]
fn test_false_boundary_prefix_spanning_chunks() {
    // the body contains "\r\n--X-BOUNDARZ", a false prefix differing in its
    // final byte, and the feed is split in the middle of it
    let data = b"--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\nabc\r\n--X-BOUNDARZdef\r\n--X-BOUNDARY--";
    let whole = formdata::decode(Some(&data[..]), "X-BOUNDARY").unwrap();
    assert_eq!(
        whole.get("f").unwrap().as_text(),
        Some("abc\r\n--X-BOUNDARZdef")
    );

    let split = data.iter().position(|&b| b == b'Z').unwrap() - 3;
    let parts = formdata::decode(vec![&data[..split], &data[split..]], "X-BOUNDARY").unwrap();
    assert_eq!(parts, whole);
}

#[test]
fn test_part_charset_is_honored() {
    // "héllo" in latin-1
    let data = b"--X\r\nContent-Disposition: form-data; name=\"f\"\r\nContent-Type: text/plain; charset=iso-8859-1\r\n\r\nh\xe9llo\r\n--X--";
    let form = formdata::decode(Some(&data[..]), "X").unwrap();
    assert_eq!(form.get("f").unwrap().as_text(), Some("héllo"));
}

#[test]
fn test_transfer_encoding_is_passed_through() {
    let data = b"--X\r\nContent-Disposition: form-data; name=\"f\"; filename=\"f.b64\"\r\nContent-Transfer-Encoding: base64\r\n\r\naGVsbG8=\r\n--X--";
    let form = formdata::decode(Some(&data[..]), "X").unwrap();
    let attachment = form.get("f").unwrap().as_attachment().unwrap();
    // payload is not decoded
    assert_eq!(attachment.content().as_ref(), b"aGVsbG8=");
}

#[test]
fn test_set_then_encode_reflects_collection_semantics() {
    let mut form = FormData::new();
    form.append("a", "1");
    form.append("a", "2");
    form.append("b", "3");
    form.append("a", "4");
    form.set("a", "9");
    form.delete("missing");

    let body = formdata::encode(&form);
    let parsed = formdata::decode(body.chunks(), body.boundary()).unwrap();

    let entries: Vec<(&str, &str)> = parsed
        .iter()
        .map(|(name, value)| (name, value.as_text().unwrap()))
        .collect();
    assert_eq!(entries, vec![("a", "9"), ("b", "3")]);
}

#[test]
fn test_value_variants_survive_transit() {
    let mut form = FormData::new();
    form.append("flag", true);
    form.append("count", 42u64);

    let body = formdata::encode(&form);
    let parsed = formdata::decode(body.chunks(), body.boundary()).unwrap();

    assert_eq!(parsed.get("flag"), Some(&Value::Text("true".to_owned())));
    assert_eq!(parsed.get("count"), Some(&Value::Text("42".to_owned())));
}
