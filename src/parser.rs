use crate::constants::{self, COLON, CR, HYPHEN, LF, SPACE};
use crate::Error;

/// Receiver for the lexical events emitted by [`MultipartParser`].
///
/// Byte-carrying events borrow from the chunk currently being written (or
/// from the parser's lookbehind window) and are never emitted for an empty
/// span. A single part produces `part_begin`, then for each header line a run
/// of `header_field` and `header_value` slices closed by `header_end`, then
/// `headers_end`, a run of `part_data` slices, and `part_end`. A terminal
/// boundary additionally produces `end`.
pub trait Events {
    fn part_begin(&mut self) {}
    fn header_field(&mut self, bytes: &[u8]) {
        let _ = bytes;
    }
    fn header_value(&mut self, bytes: &[u8]) {
        let _ = bytes;
    }
    fn header_end(&mut self) {}
    fn headers_end(&mut self) {}
    fn part_data(&mut self, bytes: &[u8]) {
        let _ = bytes;
    }
    fn part_end(&mut self) {}
    fn end(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    StartBoundary,
    HeaderFieldStart,
    HeaderField,
    HeaderValueStart,
    HeaderValue,
    HeaderValueAlmostDone,
    HeadersAlmostDone,
    PartDataStart,
    PartData,
    End,
}

/// A streaming `multipart/form-data` parser.
///
/// The parser is a byte-driven state machine: feed it the body as one or more
/// arbitrarily split chunks via [`write`](MultipartParser::write) and call
/// [`finish`](MultipartParser::finish) once the input is exhausted. It holds
/// no I/O resources and suspends cleanly between chunks, so a boundary,
/// header line or body span may straddle any number of chunk borders.
///
/// A rejected byte is a terminal [`Error::MalformedMultipart`] carrying the
/// stream-global offset; the parser cannot resynchronize afterwards.
pub struct MultipartParser {
    /// The full delimiter as it occurs inside part data: `\r\n--{token}`.
    boundary: Vec<u8>,
    /// Byte-membership table over `boundary`, driving the skip-ahead scan.
    boundary_chars: [bool; 256],
    /// Provisionally matched boundary bytes, replayed as part data when a
    /// candidate match turns out to be a false prefix.
    lookbehind: Vec<u8>,
    state: State,
    index: usize,
    part_boundary_flag: bool,
    last_boundary_flag: bool,
    header_field_mark: Option<usize>,
    header_value_mark: Option<usize>,
    part_data_mark: Option<usize>,
    /// Bytes consumed by previous `write` calls.
    consumed: u64,
}

impl MultipartParser {
    /// Creates a parser for the given boundary token (the `boundary=` value
    /// of the envelope's Content-Type, without the leading dashes).
    pub fn new<B: AsRef<str>>(boundary: B) -> crate::Result<MultipartParser> {
        let token = boundary.as_ref();
        if token.is_empty() {
            return Err(Error::InvalidArgument(
                "multipart boundary must not be empty".to_owned(),
            ));
        }

        let boundary = format!("{}{}{}", constants::CRLF, constants::BOUNDARY_EXT, token).into_bytes();

        let mut boundary_chars = [false; 256];
        for &byte in &boundary {
            boundary_chars[byte as usize] = true;
        }

        let lookbehind = vec![0u8; boundary.len() + constants::LOOKBEHIND_SLACK];

        Ok(MultipartParser {
            boundary,
            boundary_chars,
            lookbehind,
            state: State::Start,
            index: 0,
            part_boundary_flag: false,
            last_boundary_flag: false,
            header_field_mark: None,
            header_value_mark: None,
            part_data_mark: None,
            consumed: 0,
        })
    }

    /// Feeds the next chunk of the body, emitting events to `events`.
    pub fn write<E: Events>(&mut self, chunk: &[u8], events: &mut E) -> crate::Result<()> {
        let len = chunk.len();
        let boundary_len = self.boundary.len();
        let boundary_end = boundary_len - 1;

        let mut i = 0;
        while i < len {
            let mut c = chunk[i];

            match self.state {
                State::Start => {
                    self.index = 0;
                    self.state = State::StartBoundary;
                    // reprocess this byte in the new state
                    continue;
                }
                State::StartBoundary => {
                    // `index` counts matched bytes of `--{token}`, skipping
                    // the `\r\n` prefix the opening delimiter does not carry.
                    if self.index == boundary_len - 2 {
                        if c == HYPHEN {
                            self.last_boundary_flag = true;
                        } else if c != CR {
                            return Err(self.malformed(i));
                        }
                        self.index += 1;
                    } else if self.index == boundary_len - 1 {
                        if self.last_boundary_flag && c == HYPHEN {
                            events.end();
                            self.state = State::End;
                            self.part_boundary_flag = false;
                            self.last_boundary_flag = false;
                        } else if !self.last_boundary_flag && c == LF {
                            self.index = 0;
                            events.part_begin();
                            self.state = State::HeaderFieldStart;
                        } else {
                            return Err(self.malformed(i));
                        }
                    } else if c == self.boundary[self.index + 2] {
                        self.index += 1;
                    } else {
                        return Err(self.malformed(i));
                    }
                    i += 1;
                }
                State::HeaderFieldStart => {
                    self.state = State::HeaderField;
                    self.header_field_mark = Some(i);
                    self.index = 0;
                    continue;
                }
                State::HeaderField => {
                    if c == CR {
                        self.header_field_mark = None;
                        self.state = State::HeadersAlmostDone;
                    } else {
                        self.index += 1;
                        if c == HYPHEN {
                            // allowed inside header names
                        } else if c == COLON {
                            if self.index == 1 {
                                // empty header field name
                                return Err(self.malformed(i));
                            }
                            if let Some(mark) = self.header_field_mark.take() {
                                if mark < i {
                                    events.header_field(&chunk[mark..i]);
                                }
                            }
                            self.state = State::HeaderValueStart;
                        } else {
                            let lower = c | 0x20;
                            if !(b'a'..=b'z').contains(&lower) {
                                return Err(self.malformed(i));
                            }
                        }
                    }
                    i += 1;
                }
                State::HeaderValueStart => {
                    if c == SPACE {
                        i += 1;
                    } else {
                        self.header_value_mark = Some(i);
                        self.state = State::HeaderValue;
                        continue;
                    }
                }
                State::HeaderValue => {
                    if c == CR {
                        if let Some(mark) = self.header_value_mark.take() {
                            if mark < i {
                                events.header_value(&chunk[mark..i]);
                            }
                        }
                        events.header_end();
                        self.state = State::HeaderValueAlmostDone;
                    }
                    i += 1;
                }
                State::HeaderValueAlmostDone => {
                    if c != LF {
                        return Err(self.malformed(i));
                    }
                    self.state = State::HeaderFieldStart;
                    i += 1;
                }
                State::HeadersAlmostDone => {
                    if c != LF {
                        return Err(self.malformed(i));
                    }
                    events.headers_end();
                    self.state = State::PartDataStart;
                    i += 1;
                }
                State::PartDataStart => {
                    self.state = State::PartData;
                    self.part_data_mark = Some(i);
                    continue;
                }
                State::PartData => {
                    let prev_index = self.index;

                    if self.index == 0 {
                        // Boyer-Moore derived skip: probe every
                        // `boundary_len`-th byte; a probe byte absent from the
                        // boundary rules out any delimiter covering it.
                        i += boundary_end;
                        while i < len && !self.boundary_chars[chunk[i] as usize] {
                            i += boundary_len;
                        }
                        i -= boundary_end;
                        if i >= len {
                            // everything left in this chunk is plain data
                            break;
                        }
                        c = chunk[i];
                    }

                    if self.index < boundary_len {
                        if self.boundary[self.index] == c {
                            if self.index == 0 {
                                if let Some(mark) = self.part_data_mark.take() {
                                    if mark < i {
                                        events.part_data(&chunk[mark..i]);
                                    }
                                }
                            }
                            self.index += 1;
                        } else {
                            self.index = 0;
                        }
                    } else if self.index == boundary_len {
                        self.index += 1;
                        if c == CR {
                            // CR after the delimiter: another part follows
                            self.part_boundary_flag = true;
                        } else if c == HYPHEN {
                            // hyphen: terminal boundary
                            self.last_boundary_flag = true;
                        } else {
                            self.index = 0;
                        }
                    } else if self.index == boundary_len + 1 {
                        if self.part_boundary_flag {
                            self.index = 0;
                            if c == LF {
                                self.part_boundary_flag = false;
                                events.part_end();
                                events.part_begin();
                                self.state = State::HeaderFieldStart;
                                i += 1;
                                continue;
                            }
                        } else if self.last_boundary_flag {
                            if c == HYPHEN {
                                events.part_end();
                                events.end();
                                self.state = State::End;
                                self.part_boundary_flag = false;
                                self.last_boundary_flag = false;
                            } else {
                                self.index = 0;
                            }
                        } else {
                            self.index = 0;
                        }
                    }

                    if self.index > 0 {
                        // keep the provisionally matched byte in case the
                        // candidate boundary turns out to be a false lead
                        self.lookbehind[self.index - 1] = c;
                    } else if prev_index > 0 {
                        // false lead: the captured lookbehind belongs to the
                        // part data, and the byte that broke the match must be
                        // re-examined as a possible new boundary start
                        events.part_data(&self.lookbehind[..prev_index]);
                        self.part_data_mark = Some(i);
                        continue;
                    }
                    i += 1;
                }
                State::End => {
                    // transport padding after the terminal boundary
                    i += 1;
                }
            }
        }

        if let Some(mark) = self.header_field_mark {
            if mark < len {
                events.header_field(&chunk[mark..len]);
            }
            self.header_field_mark = Some(0);
        }
        if let Some(mark) = self.header_value_mark {
            if mark < len {
                events.header_value(&chunk[mark..len]);
            }
            self.header_value_mark = Some(0);
        }
        if let Some(mark) = self.part_data_mark {
            if mark < len {
                events.part_data(&chunk[mark..len]);
            }
            self.part_data_mark = Some(0);
        }

        self.consumed += len as u64;
        Ok(())
    }

    /// Signals end of input.
    ///
    /// Ending right after a non-terminal boundary's CRLF, or with the
    /// delimiter fully matched but its `--`/CRLF tail missing, completes the
    /// current part silently; ending in any other non-terminal state is an
    /// [`Error::UnexpectedEndOfStream`].
    pub fn finish<E: Events>(&mut self, events: &mut E) -> crate::Result<()> {
        if (self.state == State::HeaderFieldStart && self.index == 0)
            || (self.state == State::PartData && self.index == self.boundary.len())
        {
            events.part_end();
            events.end();
            self.state = State::End;
            Ok(())
        } else if self.state == State::End {
            Ok(())
        } else {
            Err(Error::UnexpectedEndOfStream)
        }
    }

    fn malformed(&self, i: usize) -> Error {
        Error::MalformedMultipart {
            offset: self.consumed + i as u64,
        }
    }
}
