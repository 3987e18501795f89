//! Minimal XML emission shared by every serialized entity.
//!
//! Draw.io documents only need elements with attributes (no text nodes), so the writer is a small
//! tree of [`XmlElement`]s rendered with two-space indentation. Attribute values are escaped one
//! character at a time, which keeps `&` from being escaped twice.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ids `0` and `1` are taken by the sentinel cells of every page.
static NEXT_XML_ID: AtomicU64 = AtomicU64::new(2);

/// Returns a process-unique integer id, rendered as a string.
pub fn next_xml_id() -> String {
    NEXT_XML_ID.fetch_add(1, Ordering::Relaxed).to_string()
}

/// Anything that renders as a single XML element with a class name and ordered attributes.
pub trait XmlNode {
    fn xml_class(&self) -> &str;

    /// Ordered attributes. `None` values are omitted from the output.
    fn xml_attributes(&self) -> &[(&'static str, Option<String>)];

    fn open_tag(&self) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(self.xml_class());
        for (name, value) in self.xml_attributes() {
            let Some(value) = value else {
                continue;
            };
            let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
        }
        out.push('>');
        out
    }

    fn close_tag(&self) -> String {
        format!("</{}>", self.xml_class())
    }

    fn self_closing(&self) -> String {
        let mut tag = self.open_tag();
        tag.pop();
        tag.push_str(" />");
        tag
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    class: Cow<'static, str>,
    attributes: Vec<(&'static str, Option<String>)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(class: impl Into<Cow<'static, str>>) -> Self {
        Self {
            class: class.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, Some(value.into())));
        self
    }

    pub fn attr_opt(mut self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        self.attributes.push((name, value.map(Into::into)));
        self
    }

    pub fn attr_num(self, name: &'static str, value: f64) -> Self {
        self.attr(name, fmt_number(value))
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Renders the element and its children, one tag per line.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out, 0);
        out
    }

    pub fn write_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        if self.children.is_empty() {
            out.push_str(&self.self_closing());
            out.push('\n');
            return;
        }
        out.push_str(&self.open_tag());
        out.push('\n');
        for child in &self.children {
            child.write_into(out, depth + 1);
        }
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.close_tag());
        out.push('\n');
    }
}

impl XmlNode for XmlElement {
    fn xml_class(&self) -> &str {
        &self.class
    }

    fn xml_attributes(&self) -> &[(&'static str, Option<String>)] {
        &self.attributes
    }
}

pub fn escape_attr(text: &str) -> Cow<'_, str> {
    if !text
        .bytes()
        .any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\''))
    {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    escape_attr_into(&mut out, text);
    Cow::Owned(out)
}

pub fn escape_attr_into(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'&' => "&amp;",
            b'"' => "&quot;",
            b'\'' => "&apos;",
            _ => continue,
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}

/// Formats a coordinate the way Draw.io writes them: whole numbers without a fractional part.
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        let i = v as i64;
        return i.to_string();
    }
    let s = format!("{v}");
    if s == "-0" { "0".to_string() } else { s }
}
