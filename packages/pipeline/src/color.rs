//! Severity-driven marker color intensity.

use std::sync::LazyLock;

use regex::Regex;

/// Neutral color used whenever the base color cannot be parsed.
pub const FALLBACK_COLOR: &str = "#808080";

/// Darkening applied per severity level above 1.
const DARKEN_STEP: f64 = 0.15;

static HEX6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{6}$").unwrap_or_else(|_| unreachable!()));

/// Darkens `base` according to `severity`.
///
/// `base` is a 3- or 6-digit hex color with an optional leading `#`.
/// Severity is clamped to 1-5 (non-finite values count as 1) and each
/// channel is scaled by `1 - (severity - 1) * 0.15`. Input that is not a
/// hex color yields [`FALLBACK_COLOR`].
#[must_use]
pub fn severity_color(base: &str, severity: f64) -> String {
    let Some([r, g, b]) = parse_hex(base) else {
        log::debug!("Unparseable base color {base:?}, using fallback");
        return FALLBACK_COLOR.to_string();
    };

    let level = if severity.is_finite() {
        severity.clamp(1.0, 5.0)
    } else {
        1.0
    };
    let scale = 1.0 - (level - 1.0) * DARKEN_STEP;

    format!(
        "#{:02x}{:02x}{:02x}",
        scale_channel(r, scale),
        scale_channel(g, scale),
        scale_channel(b, scale)
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_channel(channel: u8, scale: f64) -> u8 {
    (f64::from(channel) * scale).round().clamp(0.0, 255.0) as u8
}

/// Parses `#rgb`, `rgb`, `#rrggbb`, or `rrggbb` into channel values.
fn parse_hex(input: &str) -> Option<[u8; 3]> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    let expanded: String = if digits.chars().count() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    if !HEX6.is_match(&expanded) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
