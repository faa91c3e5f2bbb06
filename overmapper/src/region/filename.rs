//! Fragment filename tokenizer.
//!
//! Recognizes region fragment names of the form:
//! `#{identity}.seen.{x}.{y}`
//!
//! Examples:
//! - `#Zm9vYmFy.seen.0.0` (identity `Zm9vYmFy`, region 0,0)
//! - `#QWxpY2U=.seen.-3.12` (identity `QWxpY2U=`, region -3,12)
//!
//! Matching rules:
//! - The identity starts after the first `#` and may contain any characters,
//!   including further `#` or `.` characters, or be empty.
//! - The name must end with `.seen.` followed by two signed integers
//!   separated by `.`. A signed integer is an optional `-` followed by one or
//!   more ASCII digits; a leading `+` is not accepted.
//! - Coordinates outside the `i32` range do not match.

/// Result of tokenizing one directory entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentName {
    /// The name is a region fragment.
    Matched {
        /// Subject identity segment between `#` and `.seen.`.
        identity: String,
        /// Region X coordinate.
        x: i32,
        /// Region Y coordinate.
        y: i32,
    },
    /// The name is something else and should be ignored.
    NotMatched,
}

const SEEN_MARKER: &str = ".seen";

/// Tokenize a file name into a fragment identity and region coordinates.
///
/// # Examples
///
/// ```
/// use overmapper::region::{parse_fragment_name, FragmentName};
///
/// let name = parse_fragment_name("#QWxpY2U=.seen.-3.12");
/// assert_eq!(
///     name,
///     FragmentName::Matched { identity: "QWxpY2U=".to_string(), x: -3, y: 12 }
/// );
///
/// assert_eq!(parse_fragment_name("master.gsav"), FragmentName::NotMatched);
/// ```
pub fn parse_fragment_name(name: &str) -> FragmentName {
    tokenize(name).unwrap_or(FragmentName::NotMatched)
}

fn tokenize(name: &str) -> Option<FragmentName> {
    let hash = name.find('#')?;
    let rest = &name[hash + 1..];

    // Walk the suffix right to left: `.{y}`, then `.{x}`, then `.seen`.
    let (head, y) = rest.rsplit_once('.')?;
    let y = parse_signed(y)?;
    let (head, x) = head.rsplit_once('.')?;
    let x = parse_signed(x)?;
    let identity = head.strip_suffix(SEEN_MARKER)?;

    Some(FragmentName::Matched {
        identity: identity.to_string(),
        x,
        y,
    })
}

fn parse_signed(token: &str) -> Option<i32> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}
