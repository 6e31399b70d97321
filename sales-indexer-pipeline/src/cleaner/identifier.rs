//! Synthetic transaction identifiers.

/// Keep only the ASCII digits of `text`.
pub(crate) fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Plain decimal text: optional `-`, digits, optional `.` and digits.
pub(crate) fn is_decimal_text(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

/// `ID<position>-<date digits>_<cost digits>`.
///
/// `date` and `cost` are the values exactly as they appear in the raw row.
pub(crate) fn transaction_id(position: usize, date: &str, cost: &str) -> String {
    format!("ID{}-{}_{}", position, digits_only(date), digits_only(cost))
}
