//! Luminance classification of rendered page colors.
//!
//! The host hands us computed-style strings for the document body (what a
//! browser returns from `getComputedStyle(body).backgroundColor` and
//! `.color`). Those strings are tokenized with `cssparser` and reduced to an
//! [`Rgb`] triplet, then classified by perceived brightness:
//!
//! ```text
//! Y = (299·r + 587·g + 114·b) / 1000
//! ```
//!
//! A background is dark when `Y < 128`; a foreground is light when `Y > 128`.
//!
//! Anything that does not reduce to three channels (`transparent`, a fully
//! transparent `rgba(…, 0)`, garbage) is treated as "not dark", so a page
//! we cannot read is inverted rather than skipped.
//!
//! # Example
//!
//! ```rust
//! use nocturne::color::{is_already_dark, Rgb};
//!
//! assert_eq!(Rgb::parse_css("rgb(18, 18, 18)"), Some(Rgb(18, 18, 18)));
//! assert!(is_already_dark("rgb(18, 18, 18)", Some("rgb(230, 230, 230)")));
//! assert!(!is_already_dark("rgb(255, 255, 255)", None));
//! assert!(!is_already_dark("transparent", None));
//! ```

use cssparser::{ParseError, Parser, ParserInput, Token};

/// Brightness midpoint separating dark from light samples.
pub const BRIGHTNESS_THRESHOLD: f64 = 128.0;

/// A simple RGB color triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses a computed-style color value.
    ///
    /// Accepts `rgb()` / `rgba()` in comma or space syntax, hex notation
    /// (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`) and the `black` / `white`
    /// keywords. Returns `None` for fewer than three channels, for
    /// `transparent`, and for a zero alpha.
    pub fn parse_css(sample: &str) -> Option<Self> {
        let mut input = ParserInput::new(sample);
        let mut parser = Parser::new(&mut input);

        let token = parser.next().ok()?.clone();
        match token {
            Token::Function(ref name)
                if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") =>
            {
                let channels = parser.parse_nested_block(read_channels).ok()?;
                from_channels(&channels)
            }
            Token::Hash(ref digits) | Token::IDHash(ref digits) => parse_hex(digits),
            Token::Ident(ref name) => match name.to_ascii_lowercase().as_str() {
                "black" => Some(Rgb(0, 0, 0)),
                "white" => Some(Rgb(255, 255, 255)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Perceived brightness in the 0.0–255.0 range.
    pub fn brightness(self) -> f64 {
        brightness(self)
    }
}

/// Perceived brightness: `(299·r + 587·g + 114·b) / 1000`.
pub fn brightness(rgb: Rgb) -> f64 {
    let Rgb(r, g, b) = rgb;
    (299.0 * f64::from(r) + 587.0 * f64::from(g) + 114.0 * f64::from(b)) / 1000.0
}

/// Returns `true` when a background color reads as dark.
pub fn is_dark_background(rgb: Rgb) -> bool {
    brightness(rgb) < BRIGHTNESS_THRESHOLD
}

/// Returns `true` when a text color reads as light.
pub fn is_light_foreground(rgb: Rgb) -> bool {
    brightness(rgb) > BRIGHTNESS_THRESHOLD
}

/// Reports whether a page already renders light-on-dark.
///
/// With a foreground sample, both conditions must hold (dark background and
/// light text). Without one, the background alone decides. Unparseable
/// samples yield `false`.
pub fn is_already_dark(background: &str, foreground: Option<&str>) -> bool {
    let Some(bg) = Rgb::parse_css(background) else {
        tracing::debug!(sample = background, "background color not classifiable");
        return false;
    };
    let dark_bg = is_dark_background(bg);

    match foreground {
        None => dark_bg,
        Some(sample) => match Rgb::parse_css(sample) {
            Some(fg) => dark_bg && is_light_foreground(fg),
            None => {
                tracing::debug!(sample, "foreground color not classifiable");
                false
            }
        },
    }
}

/// Collects the numeric arguments of an `rgb()` / `rgba()` block.
///
/// Channel percentages are scaled to 0–255; the fourth value is kept as
/// an alpha fraction.
fn read_channels<'i, 't>(input: &mut Parser<'i, 't>) -> Result<Vec<f32>, ParseError<'i, ()>> {
    let mut values = Vec::with_capacity(4);
    while let Ok(token) = input.next() {
        match *token {
            Token::Number { value, .. } => values.push(value),
            Token::Percentage { unit_value, .. } => {
                if values.len() < 3 {
                    values.push(unit_value * 255.0);
                } else {
                    values.push(unit_value);
                }
            }
            _ => {}
        }
    }
    Ok(values)
}

fn from_channels(values: &[f32]) -> Option<Rgb> {
    if values.len() < 3 {
        return None;
    }
    if let Some(alpha) = values.get(3) {
        if *alpha <= 0.0 {
            return None;
        }
    }
    Some(Rgb(
        clamp_channel(values[0]),
        clamp_channel(values[1]),
        clamp_channel(values[2]),
    ))
}

fn clamp_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

fn parse_hex(digits: &str) -> Option<Rgb> {
    let nibble = |i: usize| u8::from_str_radix(digits.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();

    let (rgb, alpha) = match digits.len() {
        3 | 4 => (
            Rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17),
            if digits.len() == 4 { nibble(3)? } else { 0xf },
        ),
        6 | 8 => (
            Rgb(byte(0)?, byte(2)?, byte(4)?),
            if digits.len() == 8 { byte(6)? } else { 0xff },
        ),
        _ => return None,
    };

    if alpha == 0 {
        None
    } else {
        Some(rgb)
    }
}
