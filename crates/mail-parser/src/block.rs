/*
 * vSMTP mail transfer agent
 *
 * Copyright (C) 2003 - viridIT SAS
 * Licensed under the Elastic License 2.0
 *
 * You should have received a copy of the Elastic License 2.0 along with
 * this program. If not, see https://www.elastic.co/licensing/elastic-license.
 *
 */

use crate::{
    headers::split_field, Header, Headers, ParserError, ParserResult, MAX_HEADER_FIELDS,
    MAX_LINE_OCTETS,
};

/// Read a header block from the start of `reader`.
///
/// The block is a sequence of fields terminated by an empty line (`\n` or `\r\n`).
/// The reader is left positioned right after the terminator, the following
/// bytes are not consumed.
///
/// If the stream ends before the terminator, the block is considered absent
/// and an empty list of headers is returned.
///
/// # Errors
///
/// * the underlying reader failed, or the block is not valid UTF-8
/// * a line is longer than [`MAX_LINE_OCTETS`]
/// * the block holds more than [`MAX_HEADER_FIELDS`] fields
/// * a line is neither a field nor a continuation of the previous one
pub fn read_header_block<R: std::io::BufRead>(reader: &mut R) -> ParserResult<Headers> {
    let mut headers = Vec::<Header>::new();
    let mut line = Vec::with_capacity(128);

    loop {
        line.clear();
        std::io::BufRead::read_until(
            &mut std::io::Read::take(&mut *reader, MAX_LINE_OCTETS as u64 + 1),
            b'\n',
            &mut line,
        )?;

        if line.len() > MAX_LINE_OCTETS {
            return Err(ParserError::BufferTooLong {
                expected: MAX_LINE_OCTETS,
                got: line.len(),
            });
        }

        // end of stream before the terminator.
        if !line.ends_with(b"\n") {
            return Ok(Headers::default());
        }

        let text = std::str::from_utf8(&line)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let text = text.trim_end_matches('\n').trim_end_matches('\r');

        if text.is_empty() {
            return Ok(headers.into());
        }

        if text.starts_with([' ', '\t']) {
            let last = headers
                .last_mut()
                .ok_or_else(|| ParserError::OrphanContinuation(text.to_string()))?;
            last.body.push_str("\r\n");
            last.body.push_str(text);
            continue;
        }

        if headers.len() == MAX_HEADER_FIELDS {
            return Err(ParserError::TooManyFields(MAX_HEADER_FIELDS));
        }

        let (name, body) =
            split_field(text).ok_or_else(|| ParserError::InvalidHeader(text.to_string()))?;
        headers.push(Header::new(name, body));
    }
}

/// Write `headers` followed by the empty line terminating the block.
///
/// # Errors
///
/// * the underlying writer failed
pub fn write_header_block<W: std::io::Write>(
    writer: &mut W,
    headers: &Headers,
) -> std::io::Result<()> {
    write!(writer, "{headers}\r\n")
}
