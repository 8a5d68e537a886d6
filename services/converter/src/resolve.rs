//! Alias fallback over a raw row.

use crate::raw::{RawRecord, RawValue};

/// Return the first value among `aliases` that is present and not an empty
/// sentinel (see [`RawValue::is_empty_sentinel`]).
///
/// An empty string never stops the search, so `["", "Tesco"]` resolves to
/// `"Tesco"`. When nothing usable is found the caller's default applies.
pub fn resolve<'r>(raw: &'r RawRecord, aliases: &[&str]) -> Option<&'r RawValue> {
    aliases
        .iter()
        .filter_map(|alias| raw.get(alias))
        .find(|value| !value.is_empty_sentinel())
}

/// [`resolve`] with a fallback value.
pub fn resolve_or<'r>(
    raw: &'r RawRecord,
    aliases: &[&str],
    default: &'r RawValue,
) -> &'r RawValue {
    resolve(raw, aliases).unwrap_or(default)
}
