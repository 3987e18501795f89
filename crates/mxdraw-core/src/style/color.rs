use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A Draw.io color attribute: `none`, `default`, or `#RRGGBB`.
///
/// Hex digits are accepted in either case and kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Color {
    None,
    Default,
    Hex(String),
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Hex(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    pub fn hex(value: &str) -> Result<Self> {
        value.parse()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Default => "default",
            Self::Hex(hex) => hex,
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        if s.eq_ignore_ascii_case("default") {
            return Ok(Self::Default);
        }
        let valid = s.len() == 7
            && s.starts_with('#')
            && s.bytes().skip(1).all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(Error::InvalidColor {
                value: s.to_string(),
            });
        }
        Ok(Self::Hex(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fill, stroke and font colors applied together. Each one only takes effect where the entity
/// has no explicit value of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorScheme {
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub font_color: Option<Color>,
}

impl ColorScheme {
    pub fn new(fill: Option<&str>, stroke: Option<&str>, font: Option<&str>) -> Result<Self> {
        Ok(Self {
            fill_color: fill.map(str::parse).transpose()?,
            stroke_color: stroke.map(str::parse).transpose()?,
            font_color: font.map(str::parse).transpose()?,
        })
    }
}
