// File: crates/tradeviz-core/tests/format.rs
// Purpose: Number formatting and lenient parsing used by labels, tooltips and data cells.

use tradeviz_core::format::{currency_millions, group_fixed, locale_string, parse_float_prefix, tick_integer};

#[test]
fn grouping() {
    assert_eq!(group_fixed(0.0, 0), "0");
    assert_eq!(group_fixed(999.0, 0), "999");
    assert_eq!(group_fixed(1000.0, 0), "1,000");
    assert_eq!(group_fixed(1234567.891, 2), "1,234,567.89");
    assert_eq!(group_fixed(-1500.0, 0), "\u{2212}1,500");
    assert_eq!(group_fixed(-0.2, 0), "0");
}

#[test]
fn locale_strings() {
    assert_eq!(locale_string(12_000_000_000.0), "12,000,000,000");
    assert_eq!(locale_string(1234.5), "1,234.5");
    assert_eq!(locale_string(0.12345), "0.123");
    assert_eq!(locale_string(-42.0), "-42");
    assert_eq!(locale_string(f64::NAN), "NaN");
}

#[test]
fn labels() {
    assert_eq!(currency_millions(42_900.0), "U$42,900M");
    assert_eq!(currency_millions(0.4), "U$0M");
    assert_eq!(tick_integer(2.4), "2");
    assert_eq!(tick_integer(2.6), "3");
    assert_eq!(tick_integer(-1500.0), "-1500");
}

#[test]
fn exact_halves_round_away_from_zero() {
    assert_eq!(currency_millions(2.5), "U$3M");
    assert_eq!(currency_millions(1234.5), "U$1,235M");
    assert_eq!(group_fixed(0.5, 0), "1");
    assert_eq!(group_fixed(-0.5, 0), "\u{2212}1");
    assert_eq!(group_fixed(0.125, 2), "0.13");
    assert_eq!(group_fixed(0.05, 3), "0.050");
    assert_eq!(locale_string(1234.5625), "1,234.563");
    assert_eq!(tick_integer(2.5), "3");
    assert_eq!(tick_integer(0.5), "1");
    assert_eq!(tick_integer(-2.5), "-3");
}

#[test]
fn parse_float_reads_the_leading_number() {
    assert_eq!(parse_float_prefix("42"), Some(42.0));
    assert_eq!(parse_float_prefix("  -3.5e2xyz"), Some(-350.0));
    assert_eq!(parse_float_prefix("5000000000abc"), Some(5e9));
    assert_eq!(parse_float_prefix(".5"), Some(0.5));
    assert_eq!(parse_float_prefix("7."), Some(7.0));
    assert_eq!(parse_float_prefix("1e"), Some(1.0));
    assert_eq!(parse_float_prefix("Infinity and beyond"), Some(f64::INFINITY));
    assert_eq!(parse_float_prefix("abc"), None);
    assert_eq!(parse_float_prefix("."), None);
    assert_eq!(parse_float_prefix(""), None);
    assert_eq!(parse_float_prefix("1,5"), Some(1.0));
}
