//! The location fragment echoes the current slide as a 1-based number.

/// 0-based start slide for a fragment such as `#3`.
///
/// Out-of-range numbers are clamped to `[1, slide_count]`; a missing or
/// non-numeric fragment starts at the first slide.
pub fn start_index(fragment: &str, slide_count: usize) -> usize {
    if slide_count == 0 {
        return 0;
    }
    let raw = fragment.trim().trim_start_matches('#');
    match parse_leading_int(raw) {
        Some(n) => {
            let clamped = n.clamp(1, slide_count as i64);
            (clamped - 1) as usize
        }
        None => 0,
    }
}

pub fn for_index(index: usize) -> String {
    format!("#{}", index + 1)
}

/// Leading optional sign and digits, so `#3-details` still reads as 3.
fn parse_leading_int(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
