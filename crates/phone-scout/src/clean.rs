//! Pure text-to-number cleaning for scraped price, rating, and review text.
//!
//! Every function here is total: malformed or empty input yields `None`.

/// Highest rating either retailer uses.
pub const RATING_MAX: f64 = 5.0;

/// Parse a rupee price such as `"₹1,29,999"`, `"Rs. 74,999"` or `"1,29,999."`
/// into whole rupees.
///
/// Currency prefixes are skipped up to the first digit; anything after the
/// next decimal point (paise) is dropped.
pub fn clean_price(raw: &str) -> Option<u64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    if starts_at_paise(&raw[..start]) {
        return None;
    }
    let whole = raw[start..].split('.').next().unwrap_or("");
    let digits: String = whole.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}

/// True when the text before the first digit ends in a bare decimal point
/// (`".99"`), as opposed to an abbreviation such as `"Rs."`.
fn starts_at_paise(prefix: &str) -> bool {
    match prefix.trim_end().strip_suffix('.') {
        Some(before) => !before.ends_with(|c: char| c.is_alphabetic()),
        None => false,
    }
}

/// Parse a rating such as `"4.5 out of 5 stars"` or `"4.4"`.
///
/// Only the first whitespace-separated token is read. Values outside
/// `[0.0, 5.0]` are rejected.
pub fn clean_rating(raw: &str) -> Option<f64> {
    let token = raw.split_whitespace().next()?;
    let value = token.parse::<f64>().ok()?;
    if value.is_finite() && (0.0..=RATING_MAX).contains(&value) {
        Some(value)
    } else {
        None
    }
}

/// Parse a review count such as `"(1,234)"`, `"12,345 Ratings & 1,234 Reviews"`,
/// or `"2.5K"`.
///
/// Reads the first number in the text, ignoring thousands separators. A
/// trailing `K` or `M` scales the value.
pub fn clean_review_count(raw: &str) -> Option<u64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let rest = &raw[start..];

    let span = number_span(rest);
    let number: String = rest[..span].chars().filter(|c| *c != ',').collect();
    let number = number.trim_end_matches('.');
    let suffix = rest[span..].trim_start().chars().next();

    let multiplier = if starts_with_word(rest, span) {
        1.0
    } else {
        match suffix {
            Some('K') | Some('k') => 1_000.0,
            Some('M') | Some('m') => 1_000_000.0,
            _ => 1.0,
        }
    };

    if multiplier == 1.0 {
        let integral = number.split('.').next().unwrap_or("");
        return integral.parse::<u64>().ok();
    }

    let value = number.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Byte length of the leading numeric run (digits, commas, dots) of `s`.
fn number_span(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == ',' || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// True when the text after the number is a longer word (e.g. "More"),
/// so its first letter is not a `K`/`M` suffix.
fn starts_with_word(s: &str, at: usize) -> bool {
    s[at..]
        .trim_start()
        .chars()
        .nth(1)
        .map(|c| c.is_alphabetic())
        .unwrap_or(false)
}
