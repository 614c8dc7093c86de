// tortuga/turtle/src/color.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pen and fill colors.

use crate::error::{Result, TurtleError};
use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Parses a CSS color name, `#rgb`, `#rrggbb` or `rgb(r, g, b)`.
    pub fn parse(text: &str) -> Result<Color> {
        let trimmed = text.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| TurtleError::UnknownColor(text.to_string()));
        }
        if trimmed.starts_with("rgb") {
            return parse_rgb_function(trimmed)
                .ok_or_else(|| TurtleError::UnknownColor(text.to_string()));
        }
        let lower = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .binary_search_by(|(name, _)| name.cmp(&lower.as_str()))
            .map(|index| {
                let value = NAMED_COLORS[index].1;
                Color::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
            })
            .map_err(|_| TurtleError::UnknownColor(text.to_string()))
    }

    /// Builds a color from components scaled by `colormode` (1.0 or 255).
    pub fn from_components(r: f64, g: f64, b: f64, colormode: f64) -> Result<Color> {
        let convert = |component: f64| -> Result<u8> {
            if !(0.0..=colormode).contains(&component) {
                return Err(TurtleError::InvalidArgument(format!(
                    "color component {} outside 0..={}",
                    component, colormode
                )));
            }
            Ok((component / colormode * 255.0).round() as u8)
        };
        Ok(Color::rgb(convert(r)?, convert(g)?, convert(b)?))
    }

    /// Components scaled to `colormode`.
    pub fn components(&self, colormode: f64) -> (f64, f64, f64) {
        let scale = |c: u8| c as f64 / 255.0 * colormode;
        (scale(self.r), scale(self.g), scale(self.b))
    }
}

impl Display for Color {
    fn fmt(&self, formatter: &mut Formatter) -> FormatResult {
        write!(formatter, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color as supplied by a caller, resolved against the turtle's colormode.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorSpec {
    Name(String),
    Rgb(f64, f64, f64),
    Exact(Color),
}

impl ColorSpec {
    pub fn resolve(&self, colormode: f64) -> Result<Color> {
        match self {
            ColorSpec::Name(name) => Color::parse(name),
            ColorSpec::Rgb(r, g, b) => Color::from_components(*r, *g, *b, colormode),
            ColorSpec::Exact(color) => Ok(*color),
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> ColorSpec {
        ColorSpec::Name(name.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(name: String) -> ColorSpec {
        ColorSpec::Name(name)
    }
}

impl From<(f64, f64, f64)> for ColorSpec {
    fn from((r, g, b): (f64, f64, f64)) -> ColorSpec {
        ColorSpec::Rgb(r, g, b)
    }
}

impl From<Color> for ColorSpec {
    fn from(color: Color) -> ColorSpec {
        ColorSpec::Exact(color)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Color::rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?))
        }
        _ => None,
    }
}

fn parse_rgb_function(text: &str) -> Option<Color> {
    static RGB: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = RGB
        .get_or_init(|| {
            Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*[01]?(?:\.\d*)?\s*)?\)$").ok()
        })
        .as_ref()?;
    let captures = regex.captures(text)?;
    let component = |i: usize| captures.get(i)?.as_str().parse::<u8>().ok();
    Some(Color::rgb(component(1)?, component(2)?, component(3)?))
}

// Sorted by name for binary search.
static NAMED_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff), ("antiquewhite", 0xfaebd7), ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4), ("azure", 0xf0ffff), ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4), ("black", 0x000000), ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff), ("blueviolet", 0x8a2be2), ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887), ("cadetblue", 0x5f9ea0), ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e), ("coral", 0xff7f50), ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc), ("crimson", 0xdc143c), ("cyan", 0x00ffff),
    ("darkblue", 0x00008b), ("darkcyan", 0x008b8b), ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9), ("darkgreen", 0x006400), ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b), ("darkolivegreen", 0x556b2f), ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc), ("darkred", 0x8b0000), ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f), ("darkslateblue", 0x483d8b), ("darkslategray", 0x2f4f4f),
    ("darkturquoise", 0x00ced1), ("darkviolet", 0x9400d3), ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff), ("dimgray", 0x696969), ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222), ("floralwhite", 0xfffaf0), ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff), ("gainsboro", 0xdcdcdc), ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700), ("goldenrod", 0xdaa520), ("gray", 0x808080),
    ("green", 0x008000), ("greenyellow", 0xadff2f), ("grey", 0x808080),
    ("honeydew", 0xf0fff0), ("hotpink", 0xff69b4), ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082), ("ivory", 0xfffff0), ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa), ("lavenderblush", 0xfff0f5), ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd), ("lightblue", 0xadd8e6), ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff), ("lightgoldenrodyellow", 0xfafad2), ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3), ("lightpink", 0xffb6c1), ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa), ("lightskyblue", 0x87cefa), ("lightslategray", 0x778899),
    ("lightsteelblue", 0xb0c4de), ("lightyellow", 0xffffe0), ("lime", 0x00ff00),
    ("limegreen", 0x32cd32), ("linen", 0xfaf0e6), ("magenta", 0xff00ff),
    ("maroon", 0x800000), ("mediumaquamarine", 0x66cdaa), ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3), ("mediumpurple", 0x9370d8), ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee), ("mediumspringgreen", 0x00fa9a), ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585), ("midnightblue", 0x191970), ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1), ("moccasin", 0xffe4b5), ("navajowhite", 0xffdead),
    ("navy", 0x000080), ("oldlace", 0xfdf5e6), ("olive", 0x808000),
    ("olivedrab", 0x6b8e23), ("orange", 0xffa500), ("orangered", 0xff4500),
    ("orchid", 0xda70d6), ("palegoldenrod", 0xeee8aa), ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee), ("palevioletred", 0xd87093), ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9), ("peru", 0xcd853f), ("pink", 0xffc0cb),
    ("plum", 0xdda0dd), ("powderblue", 0xb0e0e6), ("purple", 0x800080),
    ("rebeccapurple", 0x663399), ("red", 0xff0000), ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1), ("saddlebrown", 0x8b4513), ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460), ("seagreen", 0x2e8b57), ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d), ("silver", 0xc0c0c0), ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd), ("slategray", 0x708090), ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f), ("steelblue", 0x4682b4), ("tan", 0xd2b48c),
    ("teal", 0x008080), ("thistle", 0xd8bfd8), ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0), ("violet", 0xee82ee), ("wheat", 0xf5deb3),
    ("white", 0xffffff), ("whitesmoke", 0xf5f5f5), ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];
