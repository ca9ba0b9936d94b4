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

/// Code at the start of each line of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReplyCode {
    /// Simple reply code as defined in RFC5321.
    Code {
        // https://datatracker.ietf.org/doc/html/rfc5321#section-4.2
        /// code base
        code: u16,
    },
    /// Reply code followed by an enhanced status code (RFC3463).
    Enhanced {
        /// code base
        code: u16,
        /// enhanced status code, `class.subject.detail`
        enhanced: String,
    },
}

impl ReplyCode {
    /// Build a reply code with an enhanced status code.
    #[must_use]
    pub fn enhanced(code: u16, enhanced: impl Into<String>) -> Self {
        Self::Enhanced {
            code,
            enhanced: enhanced.into(),
        }
    }

    /// Transient negative completion, the client may try again later.
    #[must_use]
    #[inline]
    pub const fn is_temporary(&self) -> bool {
        self.value() / 100 == 4
    }

    /// Return the underlying value of the reply code
    #[must_use]
    #[inline]
    pub const fn value(&self) -> u16 {
        match self {
            Self::Code { code, .. } | Self::Enhanced { code, .. } => *code,
        }
    }

    /// Return the enhanced value of the reply code
    #[must_use]
    #[inline]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Enhanced { enhanced, .. } => Some(enhanced),
            Self::Code { .. } => None,
        }
    }

    /// Class of an enhanced status code, `class.subject.detail` with a one
    /// digit class and up to three digits for the others.
    #[must_use]
    pub fn enhanced_class(enhanced: &str) -> Option<u16> {
        let mut parts = enhanced.split('.');
        let (Some(class), Some(subject), Some(detail), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };

        let digits = |part: &str, max: usize| {
            (1..=max).contains(&part.len()) && part.bytes().all(|byte| byte.is_ascii_digit())
        };
        if !(digits(class, 1) && digits(subject, 3) && digits(detail, 3)) {
            return None;
        }
        class.parse().ok()
    }
}

impl std::fmt::Display for ReplyCode {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code { code } => f.write_fmt(format_args!("{code}")),
            Self::Enhanced { code, enhanced } => f.write_fmt(format_args!("{code} {enhanced}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ReplyCode;

    #[rstest::rstest]
    #[case(ReplyCode::Code { code: 250 }, "250")]
    #[case(ReplyCode::enhanced(504, "5.5.4"), "504 5.5.4")]
    fn display(#[case] code: ReplyCode, #[case] expected: &str) {
        pretty_assertions::assert_eq!(code.to_string(), expected);
    }

    #[rstest::rstest]
    #[case("5.7.1", Some(5))]
    #[case("4.0.0", Some(4))]
    #[case("2.100.999", Some(2))]
    #[case("5.7", None)]
    #[case("5.7.1.2", None)]
    #[case("55.7.1", None)]
    #[case("5.7001.1", None)]
    #[case("5..1", None)]
    #[case("five.seven.one", None)]
    #[case("+5.7.1", None)]
    fn enhanced_class(#[case] enhanced: &str, #[case] expected: Option<u16>) {
        pretty_assertions::assert_eq!(ReplyCode::enhanced_class(enhanced), expected);
    }

    #[test]
    fn classes() {
        assert!(ReplyCode::enhanced(450, "4.0.0").is_temporary());
        assert!(!ReplyCode::enhanced(550, "5.7.1").is_temporary());
        pretty_assertions::assert_eq!(ReplyCode::enhanced(550, "5.7.1").details(), Some("5.7.1"));
        pretty_assertions::assert_eq!(ReplyCode::Code { code: 550 }.details(), None);
    }
}
