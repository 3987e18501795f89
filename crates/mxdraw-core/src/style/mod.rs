//! Draw.io style strings.
//!
//! A style string is `[base-style;]key=value;key=value;`. [`StyleDict`] is the decoded form: an
//! ordered map plus an optional bare base-style token (e.g. `ellipse`, `swimlane`, `text`).

mod color;
pub mod library;
mod stroke;
mod text_format;

pub use color::{Color, ColorScheme};
pub use library::ShapeLibrary;
pub use stroke::StrokeWidth;
pub use text_format::{Align, Direction, TextFormat, VerticalAlign};

pub(crate) use text_format::style_token_enum;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single style value. Decoding coerces raw text into the narrowest variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl StyleValue {
    /// Coerces raw style-string text:
    /// - digits with one decimal point -> float
    /// - digits only -> integer
    /// - `True` / `False` -> boolean
    /// - anything else -> string
    pub fn coerce(raw: &str) -> Self {
        let digits = raw.replacen('.', "", 1);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if raw.contains('.') {
                if let Ok(v) = raw.parse::<f64>() {
                    return Self::Float(v);
                }
            } else if let Ok(v) = raw.parse::<i64>() {
                return Self::Int(v);
            }
            return Self::Str(raw.to_string());
        }
        match raw {
            "True" => Self::Bool(true),
            "False" => Self::Bool(false),
            _ => Self::Str(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Str(s) if s.is_empty())
    }

    /// Interprets `0`/`1`-style flags. Other numbers and strings are not booleans.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(0) => Some(false),
            Self::Int(1) => Some(true),
            Self::Str(s) => match s.as_str() {
                "0" | "false" => Some(false),
                "1" | "true" => Some(true),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() => Some(v.round() as i64),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Str(s) => s.trim().parse().ok().filter(|v: &f64| v.is_finite()),
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Int(v) => Some(Number::Int(*v)),
            Self::Float(v) if v.is_finite() => Some(Number::Float(*v)),
            Self::Str(s) => {
                let s = s.trim();
                if let Ok(v) = s.parse::<i64>() {
                    return Some(Number::Int(v));
                }
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Number::Float)
            }
            _ => None,
        }
    }

    /// The value as it appears in a style string.
    pub fn to_style_string(&self) -> String {
        match self {
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => "0".to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => fmt_float(*v),
            Self::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_style_string())
    }
}

impl From<&str> for StyleValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for StyleValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for StyleValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for StyleValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for StyleValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Number> for StyleValue {
    fn from(v: Number) -> Self {
        match v {
            Number::Int(v) => Self::Int(v),
            Number::Float(v) => Self::Float(v),
        }
    }
}

/// A numeric style attribute that keeps its integer/float spelling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn value(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&fmt_float(*v)),
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Whole floats keep a trailing `.0` so that `1.0` decodes back to a float.
fn fmt_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Decoded style string: optional base-style plus ordered `key=value` entries.
///
/// Equality ignores entry order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDict {
    base_style: Option<String>,
    entries: IndexMap<String, StyleValue>,
}

impl StyleDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a style string. Decoding never fails: empty fragments are skipped, a fragment
    /// without `=` becomes the base-style (the last one wins), and values are coerced with
    /// [`StyleValue::coerce`].
    pub fn parse(style: &str) -> Self {
        let mut out = Self::new();
        for fragment in style.split(';') {
            if fragment.is_empty() {
                continue;
            }
            match fragment.split_once('=') {
                Some((key, raw)) => {
                    out.entries
                        .insert(key.to_string(), StyleValue::coerce(raw));
                }
                None => out.base_style = Some(fragment.to_string()),
            }
        }
        out
    }

    /// Encodes to a style string terminated by `;`. Empty values are omitted; an empty dict
    /// encodes to an empty string.
    pub fn encode(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.entries.len() + 1);
        if let Some(base) = self.base_style.as_deref().filter(|b| !b.is_empty()) {
            parts.push(base.to_string());
        }
        for (key, value) in &self.entries {
            if value.is_empty() {
                continue;
            }
            parts.push(format!("{key}={}", value.to_style_string()));
        }
        if parts.is_empty() {
            return String::new();
        }
        let mut out = parts.join(";");
        out.push(';');
        out
    }

    pub fn base_style(&self) -> Option<&str> {
        self.base_style.as_deref()
    }

    pub fn set_base_style(&mut self, base_style: Option<impl Into<String>>) {
        self.base_style = base_style.map(Into::into);
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces an entry. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StyleValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn insert_opt(&mut self, key: &str, value: Option<impl Into<StyleValue>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<StyleValue> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.base_style.is_none()
    }

    /// Overlays `other` onto `self`; `other` wins on conflicts, including the base-style.
    pub fn overlay(&mut self, other: &StyleDict) {
        if other.base_style.is_some() {
            self.base_style = other.base_style.clone();
        }
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }
}

impl fmt::Display for StyleDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for StyleDict {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

/// Outcome of offering one decoded entry to a typed attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    /// A typed attribute took the value.
    Set,
    /// The key is known but the value failed typed validation.
    Rejected,
    /// The key is not a typed attribute.
    Unknown,
}

/// Typed attribute sets that accept decoded style entries: typed attributes first, everything
/// else into an ordered extension map.
pub(crate) trait StyleTarget {
    fn set_base_style(&mut self, base_style: Option<String>);

    fn apply_typed_entry(&mut self, key: &str, value: &StyleValue) -> Applied;

    fn extra_mut(&mut self) -> &mut IndexMap<String, StyleValue>;

    /// Unknown keys, and known keys whose value does not validate, are stored verbatim in the
    /// extension map.
    fn apply_dict(&mut self, dict: &StyleDict) {
        if let Some(base) = dict.base_style() {
            self.set_base_style(Some(base.to_string()));
        }
        for (key, value) in dict.iter() {
            match self.apply_typed_entry(key, value) {
                Applied::Set => {
                    self.extra_mut().shift_remove(key);
                }
                Applied::Rejected | Applied::Unknown => {
                    self.extra_mut().insert(key.to_string(), value.clone());
                }
            }
        }
    }
}

pub(crate) fn set_bool(slot: &mut Option<bool>, value: &StyleValue) -> Applied {
    match value.as_bool() {
        Some(b) => {
            *slot = Some(b);
            Applied::Set
        }
        None => Applied::Rejected,
    }
}

pub(crate) fn set_number(slot: &mut Option<Number>, value: &StyleValue) -> Applied {
    match value.as_number() {
        Some(n) => {
            *slot = Some(n);
            Applied::Set
        }
        None => Applied::Rejected,
    }
}

pub(crate) fn set_string(slot: &mut Option<String>, value: &StyleValue) -> Applied {
    *slot = Some(value.to_style_string());
    Applied::Set
}

pub(crate) fn set_color(slot: &mut Option<Color>, value: &StyleValue) -> Applied {
    match value.to_style_string().parse::<Color>() {
        Ok(c) => {
            *slot = Some(c);
            Applied::Set
        }
        Err(_) => Applied::Rejected,
    }
}

pub(crate) fn set_percent(slot: &mut Option<u8>, value: &StyleValue) -> Applied {
    match value {
        StyleValue::Int(v) if (0..=100).contains(v) => {
            *slot = Some(*v as u8);
            Applied::Set
        }
        _ => Applied::Rejected,
    }
}

pub(crate) fn push_bool(dict: &mut StyleDict, key: &str, value: Option<bool>) {
    dict.insert_opt(key, value);
}

pub(crate) fn push_display(dict: &mut StyleDict, key: &str, value: Option<impl fmt::Display>) {
    dict.insert_opt(key, value.map(|v| v.to_string()));
}

pub(crate) fn push_number(dict: &mut StyleDict, key: &str, value: Option<Number>) {
    dict.insert_opt(key, value);
}
