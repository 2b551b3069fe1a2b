//! Element name fixup shared by both emitters

use std::borrow::Cow;

/// Lowercase the first character of a capitalized single-word name
///
/// `Amount` becomes `amount`; `InstrId`, `BIC` and `amount` are unchanged.
pub fn fixup_name(name: &str) -> Cow<'_, str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Cow::Borrowed(name);
    };
    if !first.is_uppercase() || chars.any(char::is_uppercase) {
        return Cow::Borrowed(name);
    }
    let mut fixed: String = first.to_lowercase().collect();
    fixed.push_str(&name[first.len_utf8()..]);
    Cow::Owned(fixed)
}

/// Apply [`fixup_name`] only when `enabled`
pub fn property_name(name: &str, enabled: bool) -> Cow<'_, str> {
    if enabled {
        fixup_name(name)
    } else {
        Cow::Borrowed(name)
    }
}
