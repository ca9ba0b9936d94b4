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

use std::ops::{Deref, DerefMut};

/// Header field of an email.
/// <https://www.rfc-editor.org/rfc/rfc5322#section-2.2>
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Header {
    pub name: String,
    /// Value of the field, surrounding whitespace removed.
    /// Folded values keep their `\r\n` followed by the original whitespace.
    pub body: String,
}

impl Header {
    /// Create a new header.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Value of the field with folding removed.
    #[must_use]
    pub fn unfolded(&self) -> String {
        self.body.replace("\r\n", "")
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.body)
    }
}

/// List of top-level headers.
/// We use `Vec` instead of a `HashMap` because header ordering is mandatory.
/// <https://www.rfc-editor.org/rfc/rfc5322#section-3.6>
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Headers(pub Vec<Header>);

impl Headers {
    /// First field named `name`, compared case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Header> {
        self.0.iter().find(|h| h.name.eq_ignore_ascii_case(name))
    }
}

impl From<Vec<Header>> for Headers {
    fn from(value: Vec<Header>) -> Self {
        Self(value)
    }
}

impl Deref for Headers {
    type Target = Vec<Header>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Headers {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl std::fmt::Display for Headers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for h in &self.0 {
            write!(f, "{h}\r\n")?;
        }
        Ok(())
    }
}

/// Split a header line into its name and value.
///
/// # Return
///
/// * `Option<(String, String)>` - the trimmed name and the trimmed value,
///                                `None` if the line has no colon or an
///                                empty / invalid name.
#[must_use]
pub fn split_field(line: &str) -> Option<(String, String)> {
    let (name, body) = line.split_once(':')?;
    let name = name.trim_end();

    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic()) {
        return None;
    }

    Some((name.to_string(), body.trim().to_string()))
}
