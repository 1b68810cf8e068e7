//! OpenWeather condition codes mapped to Nerd Font glyphs.

use crate::error::WeatherError;

/// Every condition code the upstream API documents, with its glyph.
pub const ICONS: &[(&str, &str)] = &[
    ("01d", "\u{f0599}"), // clear sky, day
    ("01n", "\u{f186}"),  // clear sky, night
    ("02d", "\u{e302}"),
    ("02n", "\u{e32e}"),
    ("03d", "\u{e33d}"),
    ("03n", "\u{e33d}"),
    ("04d", "\u{e312}"),
    ("04n", "\u{e312}"),
    ("09d", "\u{e318}"),
    ("09n", "\u{e318}"),
    ("10d", "\u{e308}"),
    ("10n", "\u{e325}"),
    ("11d", "\u{e30f}"),
    ("11n", "\u{e32a}"),
    ("13d", "\u{f2dc}"),
    ("13n", "\u{f2dc}"),
    ("50d", "\u{e303}"),
    ("50n", "\u{e346}"),
];

/// Resolves a condition code. Unknown codes are an error rather than a
/// fallback glyph.
pub fn glyph_for(code: &str) -> Result<&'static str, WeatherError> {
    ICONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, glyph)| *glyph)
        .ok_or_else(|| WeatherError::UnknownIcon(code.to_string()))
}
