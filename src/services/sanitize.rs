//! Content sanitization
//!
//! Strips unsafe HTML constructs from user-submitted content before it is
//! persisted: whole `<script>` regions and inline `on*` event handler
//! attributes. Markup is otherwise left untouched.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches an entire `<script ...>...</script>` region, non-greedy, across
/// line breaks, case-insensitive.
static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid script regex"));

/// Matches inline event handler attributes like ` onclick="..."`.
static EVENT_HANDLER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#" on\w+="[^"]*""#).expect("valid event handler regex"));

/// Remove script regions and inline event handlers from HTML text.
///
/// Deterministic and idempotent: `clean(clean(x)) == clean(x)`.
///
/// Stripping runs to a fixpoint. A single pass is not enough: removing a
/// nested `<script>` region can splice the surrounding text into a new one
/// (`<scr<script>x</script>ipt>...` becomes `<script>...` after one pass).
pub fn clean(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let without_scripts = SCRIPT_RE.replace_all(&current, "");
        let stripped = EVENT_HANDLER_RE
            .replace_all(&without_scripts, "")
            .into_owned();
        if stripped == current {
            return stripped;
        }
        current = stripped;
    }
}
