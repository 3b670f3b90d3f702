/// Display-name freshness
///
/// Sign-up flows sometimes leave the email address or the subject id in the
/// name slot of the session. A page that renders the name first asks a
/// [`NameFreshness`] predicate whether the cached value is usable, and only
/// looks the user up when it is not.

use regex::Regex;
use std::sync::OnceLock;

/// Decides whether a cached display name needs a backend lookup
pub trait NameFreshness: Send + Sync {
    /// True if `name` is missing or not a real display name
    fn needs_lookup(&self, name: Option<&str>) -> bool;
}

impl<F> NameFreshness for F
where
    F: Fn(Option<&str>) -> bool + Send + Sync,
{
    fn needs_lookup(&self, name: Option<&str>) -> bool {
        self(name)
    }
}

/// Default predicate: absent, email-like, or opaque-id-like names need a lookup
///
/// A name is opaque-id-like when it contains eight hex digits or dashes
/// followed by a dash (the start of a UUID), case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailOrOpaqueId;

fn opaque_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)[0-9a-f-]{8}-").ok())
        .as_ref()
}

impl NameFreshness for EmailOrOpaqueId {
    fn needs_lookup(&self, name: Option<&str>) -> bool {
        match name.map(str::trim) {
            None | Some("") => true,
            Some(name) => {
                name.contains('@')
                    || opaque_id_pattern().is_some_and(|pattern| pattern.is_match(name))
            }
        }
    }
}
