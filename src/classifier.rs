//! Verdict classification of remote service messages

use crate::types::Verdict;

/// Phrases that mark a destination as bad enough to redirect away from
pub const REDIRECT_PHRASES: &[&str] = &[
    "Vulnerable IP found!",
    "Vulnerable domain found!",
    "Vulnerable link found!",
];

/// Marker for a warn-only verdict
pub const WARN_MARKER: &str = "Vulnerable";

/// Classify a verdict-service message.
///
/// Case-sensitive substring match; redirect phrases win over the warn
/// marker. Any other message containing `Vulnerable` is warn-only, which
/// is a product policy rather than a classification gap.
pub fn classify(message: &str) -> Verdict {
    if REDIRECT_PHRASES.iter().any(|p| message.contains(p)) {
        Verdict::RemoteVulnerableRedirect
    } else if message.contains(WARN_MARKER) {
        Verdict::RemoteVulnerableWarn
    } else {
        Verdict::Safe
    }
}
