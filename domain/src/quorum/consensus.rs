//! Consensus detection between debate participants.

use crate::core::string::take_chars;

/// Characters compared when deciding whether proposals agree.
pub const CONSENSUS_PREFIX_CHARS: usize = 100;

/// Return the agreed text when every text shares the same first
/// [`CONSENSUS_PREFIX_CHARS`] characters.
///
/// An empty input never reaches consensus. A single text trivially does.
///
/// ```
/// use council_domain::quorum::check_consensus;
///
/// assert_eq!(check_consensus(["use a queue", "use a queue"]), Some("use a queue"));
/// assert_eq!(check_consensus(["use a queue", "use a stack"]), None);
/// ```
pub fn check_consensus<'a, I>(texts: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut texts = texts.into_iter();
    let first = texts.next()?;
    let prefix = take_chars(first, CONSENSUS_PREFIX_CHARS);

    texts
        .all(|t| take_chars(t, CONSENSUS_PREFIX_CHARS) == prefix)
        .then_some(first)
}
