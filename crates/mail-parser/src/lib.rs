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

//! Reading and writing of RFC 5322 header blocks, and access to message bodies.

/// Maximum number of fields accepted in a header block.
pub const MAX_HEADER_FIELDS: usize = 1000;
/// Maximum length of a single line of a header block, line ending included.
pub const MAX_LINE_OCTETS: usize = 4000;

/// Errors raised by the parser.
pub mod errors;
/// Header fields.
pub mod headers;
/// Header block framing.
pub mod block;
/// Message content handed to checks.
pub mod body;

pub use block::{read_header_block, write_header_block};
pub use body::{Body, FileBody, MemoryBody};
pub use errors::{ParserError, ParserResult};
pub use headers::{Header, Headers};
