const CURRENCY_PREFIXES: [char; 4] = ['$', '€', '£', '¥'];

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Parse a numeric cell.
///
/// Besides plain floats this accepts a currency prefix, a trailing `%` and
/// digit-group commas. The flag is true when any of those had to be
/// stripped, i.e. the number alone no longer says how the cell was written.
pub fn parse_number(raw: &str) -> Option<(f64, bool)> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }

    let (negative, mut rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut reformatted = false;

    if let Some(r) = rest.strip_prefix(CURRENCY_PREFIXES) {
        rest = r;
        reformatted = true;
    }
    if let Some(r) = rest.strip_suffix('%') {
        rest = r;
        reformatted = true;
    }

    let digits = if rest.contains(',') {
        reformatted = true;
        strip_group_commas(rest)?
    } else {
        rest.to_string()
    };

    if digits.is_empty()
        || !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || !digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }

    let v: f64 = digits.parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some((if negative { -v } else { v }, reformatted))
}

/// `1,234,567.25` → `1234567.25`; rejects commas that are not thousands groups.
fn strip_group_commas(s: &str) -> Option<String> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if frac_part.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let groups: Vec<&str> = int_part.split(',').collect();
    let (head, tail) = groups.split_first()?;
    let all_digits = |g: &str| g.chars().all(|c| c.is_ascii_digit());
    if head.is_empty() || head.len() > 3 || !all_digits(head) {
        return None;
    }
    if !tail.iter().all(|g| g.len() == 3 && all_digits(g)) {
        return None;
    }

    let mut out = groups.concat();
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    Some(out)
}
