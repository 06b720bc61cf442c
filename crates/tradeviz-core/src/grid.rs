// File: crates/tradeviz-core/src/grid.rs
// Summary: Tick layout helpers (nice linear ticks, yearly time ticks).

use chrono::{Datelike, TimeZone, Utc};

/// Smallest 1/2/5×10^k step that covers `span` in at most `intervals` steps.
pub fn nice_step(span: f64, intervals: usize) -> f64 {
    let intervals = intervals.max(1) as f64;
    if !(span.is_finite() && span > 0.0) { return 1.0; }
    let raw = span / intervals;
    let magnitude = 10f64.powf(raw.log10().floor());
    for m in [1.0, 2.0, 5.0, 10.0] {
        let step = m * magnitude;
        if step >= raw - raw * 1e-12 {
            return step;
        }
    }
    10.0 * magnitude
}

/// Ticks at multiples of a nice step, with bounds expanded outward to the
/// nearest multiple. Never more than `max_ticks` entries (minimum 2).
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let max_ticks = max_ticks.max(2);
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let span = if max - min < 1e-12 { 1.0 } else { max - min };
    let mut intervals = max_ticks - 1;
    loop {
        let step = nice_step(span, intervals);
        let lo = (min / step).floor() * step;
        let hi = (max / step).ceil() * step;
        let count = ((hi - lo) / step).round() as usize + 1;
        if count <= max_ticks || intervals == 1 {
            let hi = if hi <= lo { lo + step } else { hi };
            let count = ((hi - lo) / step).round() as usize + 1;
            return (0..count).map(|i| clean(lo + step * i as f64, step)).collect();
        }
        intervals -= 1;
    }
}

// Snap float noise (0.30000000000000004) back onto the step grid.
fn clean(v: f64, step: f64) -> f64 {
    let digits = (-step.log10().floor()).max(0.0) as i32;
    let p = 10f64.powi(digits);
    (v * p).round() / p
}

/// Jan 1 (UTC) of each year within `[min_ms, max_ms]`, as epoch ms, thinned
/// with a uniform stride so at most `max_ticks` remain.
pub fn year_ticks(min_ms: f64, max_ms: f64, max_ticks: usize) -> Vec<f64> {
    let (Some(lo), Some(hi)) = (Utc.timestamp_millis_opt(min_ms as i64).single(), Utc.timestamp_millis_opt(max_ms as i64).single())
    else {
        return Vec::new();
    };
    let mut years = Vec::new();
    for year in lo.year()..=hi.year() {
        if let Some(t) = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single() {
            let ms = t.timestamp_millis() as f64;
            if ms >= min_ms && ms <= max_ms {
                years.push(ms);
            }
        }
    }
    let max_ticks = max_ticks.max(1);
    if years.len() <= max_ticks {
        return years;
    }
    let stride = years.len().div_ceil(max_ticks);
    years.into_iter().step_by(stride).collect()
}
