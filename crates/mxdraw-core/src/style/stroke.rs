use std::fmt;

/// Line width in `[1, 999]`. Out-of-range input is clamped to the nearest bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StrokeWidth(u16);

impl StrokeWidth {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 999;

    pub fn new(width: i64) -> Self {
        Self(width.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u16)
    }

    /// Lenient parse used by the style-string path: numbers are rounded and clamped, anything
    /// non-numeric means "unset".
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(v) = raw.parse::<i64>() {
            return Some(Self::new(v));
        }
        let v = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(Self::new(v.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for StrokeWidth {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for StrokeWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
