//! Field normalization from raw dashboard text to [`MetricValue`].
//!
//! Every extractor funnels its raw reads through [`normalize`]. Failure text
//! becomes `Unavailable`, never a numeric zero: conflating the two would make
//! a broken selector look like a shop with no traffic and permanently close
//! the gap.

use std::fmt;

use shopintel_core::MetricValue;

/// Shape of the raw text a metric is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `"15.5%"`, `"15,5 %"`, `"-12%"` → fraction of one, sign-preserving.
    Percentage,
    /// `"1.2K"`, `"3.4M"`, `"609,094"` → plain count.
    Magnitude,
    /// `"2:30"`, `"1:02:30"` → total seconds.
    Duration,
    /// `"$1.25"`, `"€0,95"` → decimal amount without symbols.
    Currency,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Percentage => "percentage",
            FieldKind::Magnitude => "magnitude",
            FieldKind::Duration => "duration",
            FieldKind::Currency => "currency",
        };
        f.write_str(name)
    }
}

/// Failure phrases the dashboards (and the scraping layer itself) render in
/// place of a value. Compared lowercase.
const SENTINELS: &[&str] = &[
    "na",
    "n/a",
    "null",
    "none",
    "-",
    "--",
    "—",
    "error",
    "no data",
    "not available",
    "selector not found",
    "sélecteur non trouvé",
    "element not found",
];

/// True when lowercased raw text is one of the known failure phrases.
pub(crate) fn is_sentinel(lower: &str) -> bool {
    SENTINELS.contains(&lower)
}

/// Converts raw scraped text into a canonical metric value.
///
/// `None`, empty text, and known failure sentinels normalize to
/// `Unavailable`; text that fails to parse for its kind also normalizes to
/// `Unavailable`, with a distinct diagnostic reason. A legitimate zero
/// (`"0%"`, `"0:00"`) parses to `Present(0.0)`.
#[must_use]
pub fn normalize(raw: Option<&str>, kind: FieldKind) -> MetricValue {
    let Some(raw) = raw else {
        return MetricValue::Unavailable("no raw value".to_owned());
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return MetricValue::Unavailable("empty value".to_owned());
    }

    let lower = trimmed.to_lowercase();
    if is_sentinel(&lower) {
        return MetricValue::Unavailable(format!("source sentinel: \"{trimmed}\""));
    }

    let parsed = match kind {
        FieldKind::Percentage => parse_percentage(trimmed),
        FieldKind::Magnitude => parse_magnitude(trimmed),
        FieldKind::Duration => parse_duration(trimmed),
        FieldKind::Currency => parse_currency(trimmed),
    };

    match parsed {
        Some(value) => MetricValue::Present(value),
        None => MetricValue::Unavailable(format!("unrecognized {kind} text: \"{trimmed}\"")),
    }
}

/// `"15.5%"` → `0.155`. The `%` sign is optional; `,` is accepted as the
/// decimal separator.
fn parse_percentage(s: &str) -> Option<f64> {
    let stripped = s.strip_suffix('%').unwrap_or(s).trim();
    let normalized = stripped.replace(',', ".");
    if normalized.matches('.').count() > 1 {
        return None;
    }
    normalized.parse::<f64>().ok().map(|v| v / 100.0)
}

/// `"1.2K"` → `1200`; `"3.4M"` → `3400000`; plain numbers pass through with
/// thousands separators stripped. Suffixes are case-insensitive.
fn parse_magnitude(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    let (number, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'b' | 'B' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    number.parse::<f64>().ok().map(|v| v * multiplier)
}

/// `"2:30"` → `150`; `"1:02:30"` → `3750`. Bare numbers are taken as seconds
/// already.
fn parse_duration(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(':').collect();
    let part = |p: &str| p.trim().parse::<u32>().ok();

    match parts.as_slice() {
        [only] => only.trim().parse::<f64>().ok().filter(|v| *v >= 0.0),
        [m, sec] => Some(f64::from(part(m)? * 60 + part(sec)?)),
        [h, m, sec] => Some(f64::from(part(h)? * 3600 + part(m)? * 60 + part(sec)?)),
        _ => None,
    }
}

/// Strips currency symbols and grouping separators. When a dot is present it
/// is the decimal separator and commas group thousands (`"$1,250.75"` →
/// `1250.75`); otherwise a comma not followed by exactly three digits is the
/// decimal separator (`"€0,95"` → `0.95`).
fn parse_currency(s: &str) -> Option<f64> {
    let stripped: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if stripped.is_empty() {
        return None;
    }

    let normalized = if stripped.contains('.') {
        stripped.replace(',', "")
    } else {
        match stripped.rfind(',') {
            Some(pos) if stripped.len() - pos - 1 != 3 => {
                let (head, tail) = stripped.split_at(pos);
                format!("{}.{}", head.replace(',', ""), &tail[1..])
            }
            _ => stripped.replace(',', ""),
        }
    };

    normalized.parse::<f64>().ok()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
