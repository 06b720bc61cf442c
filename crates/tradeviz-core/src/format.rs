// File: crates/tradeviz-core/src/format.rs
// Summary: Number formatting and parsing with browser-compatible semantics.

/// Fixed-point with comma thousands separators (d3 `",.Nf"`). Negative
/// values use the U+2212 minus sign, as d3-format does.
pub fn group_fixed(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return if v.is_nan() { "NaN".into() } else if v > 0.0 { "Infinity".into() } else { "\u{2212}Infinity".into() };
    }
    let fixed = fixed_half_up(v.abs(), decimals);
    let negative = v < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if negative { out.push('\u{2212}'); }
    out.push_str(&group_digits(int_part));
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// en-US `Number.prototype.toLocaleString()`: grouping plus at most three
/// fraction digits with trailing zeros dropped.
pub fn locale_string(v: f64) -> String {
    if !v.is_finite() {
        return if v.is_nan() { "NaN".into() } else if v > 0.0 { "∞".into() } else { "-∞".into() };
    }
    let fixed = fixed_half_up(v.abs(), 3);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let is_zero = int_part.chars().all(|c| c == '0') && frac.is_empty();
    let mut out = String::new();
    if v < 0.0 && !is_zero { out.push('-'); }
    out.push_str(&group_digits(int_part));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Bubble label: `U$1,234M`.
pub fn currency_millions(v: f64) -> String {
    format!("U${}M", group_fixed(v, 0))
}

/// Y-axis tick label (`toFixed(0)`). `-0.2` keeps its sign as `"-0"`.
pub fn tick_integer(v: f64) -> String {
    if !v.is_finite() {
        return if v.is_nan() { "NaN".into() } else if v > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    let digits = fixed_half_up(v.abs(), 0);
    if v < 0.0 { format!("-{digits}") } else { digits }
}

/// `v` (finite, non-negative) to `decimals` places, exact halves rounded up.
/// `format!` alone would round them to even.
fn fixed_half_up(v: f64, decimals: usize) -> String {
    let scaled = (v * 10f64.powi(decimals as i32)).round();
    if !scaled.is_finite() {
        return format!("{:.*}", decimals, v);
    }
    let digits = format!("{:.0}", scaled);
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    format!("{int_part}.{frac_part}")
}

fn group_digits(digits: &str) -> String {
    let n = digits.len();
    let mut out = String::with_capacity(n + n / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// JavaScript `parseFloat`: skip leading whitespace, then read the longest
/// prefix that is a decimal literal. `None` where JS would yield `NaN`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let t = s.trim_start();
    for lit in ["Infinity", "+Infinity", "-Infinity"] {
        if t.starts_with(lit) {
            return Some(if lit.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY });
        }
    }
    let bytes = t.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) { end = 1; }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() { end += 1; }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut k = frac_start;
        while k < bytes.len() && bytes[k].is_ascii_digit() { k += 1; }
        mantissa_digits += k - frac_start;
        if mantissa_digits > 0 { end = k; }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut k = end + 1;
        if k < bytes.len() && (bytes[k] == b'+' || bytes[k] == b'-') { k += 1; }
        let exp_start = k;
        while k < bytes.len() && bytes[k].is_ascii_digit() { k += 1; }
        if k > exp_start { end = k; }
    }
    t[..end].parse::<f64>().ok()
}
