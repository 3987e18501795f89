use crate::error::{Error, Result};
use crate::file::File;
use crate::geometry::{Box2D, Point, ShapeGeometry, Size, point, size};
use crate::id::{EdgeId, PageId, ShapeId};
use crate::style::{
    Applied, Color, ColorScheme, StrokeWidth, StyleDict, StyleTarget, StyleValue, TextFormat,
    library, push_bool, push_display, set_bool, set_color, set_percent, set_string,
};
use indexmap::IndexMap;

/// Typed style attributes of a vertex plus an ordered map of everything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeStyle {
    pub base_style: Option<String>,
    pub html: Option<bool>,
    pub white_space: Option<String>,
    pub rounded: Option<bool>,
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<StrokeWidth>,
    pub glass: Option<bool>,
    pub shadow: Option<bool>,
    pub comic: Option<bool>,
    pub sketch: Option<bool>,
    /// Percent, `0..=100`.
    pub opacity: Option<u8>,
    pub dashed: Option<bool>,
    pub dash_pattern: Option<String>,
    pub text_format: TextFormat,
    pub color_scheme: Option<ColorScheme>,
    /// Attributes without a typed slot, in first-seen order.
    pub extra: IndexMap<String, StyleValue>,
}

impl ShapeStyle {
    /// `html=1;whiteSpace=wrap;`, the style a freshly constructed shape starts from.
    pub fn basic() -> Self {
        Self {
            html: Some(true),
            white_space: Some("wrap".to_string()),
            ..Self::default()
        }
    }

    pub fn parse(style: &str) -> Self {
        let mut out = Self::default();
        out.apply_style_string(style);
        out
    }

    /// Resolves `name` in `library` into a fresh style.
    pub fn from_library(library: &library::ShapeLibrary, name: &str) -> Result<Self> {
        let mut out = Self::default();
        out.apply_dict(library.object(name)?);
        Ok(out)
    }

    pub fn apply_style_string(&mut self, style: &str) {
        self.apply_dict(&StyleDict::parse(style));
    }

    pub fn apply_attribute_dict(&mut self, dict: &StyleDict) {
        self.apply_dict(dict);
    }

    pub fn set_fill_color(&mut self, color: &str) -> Result<()> {
        self.fill_color = Some(color.parse()?);
        Ok(())
    }

    pub fn set_stroke_color(&mut self, color: &str) -> Result<()> {
        self.stroke_color = Some(color.parse()?);
        Ok(())
    }

    pub fn set_stroke_width(&mut self, width: i64) {
        self.stroke_width = Some(StrokeWidth::new(width));
    }

    pub fn set_opacity(&mut self, opacity: u8) -> Result<()> {
        if opacity > 100 {
            return Err(Error::invalid_argument(format!(
                "opacity must be within 0..=100, got {opacity}"
            )));
        }
        self.opacity = Some(opacity);
        Ok(())
    }

    /// Applies a named dash preset from the `line_styles` catalog.
    pub fn set_line_pattern(&mut self, name: &str) -> Result<()> {
        let preset = library::line_styles()
            .get(name)
            .ok_or_else(|| Error::invalid_enumeration("line pattern", name))?;
        self.dashed = preset.get("dashed").and_then(StyleValue::as_bool);
        self.dash_pattern = preset.get("dashPattern").map(StyleValue::to_style_string);
        Ok(())
    }

    /// The decoded form in emission order: typed attributes first, then extension keys.
    pub fn to_dict(&self) -> StyleDict {
        let scheme = self.color_scheme.as_ref();
        let mut dict = StyleDict::new();
        dict.set_base_style(self.base_style.clone());
        push_bool(&mut dict, "html", self.html);
        push_display(&mut dict, "whiteSpace", self.white_space.as_deref());
        push_bool(&mut dict, "rounded", self.rounded);
        push_display(
            &mut dict,
            "fillColor",
            self.fill_color
                .as_ref()
                .or(scheme.and_then(|s| s.fill_color.as_ref())),
        );
        push_display(
            &mut dict,
            "strokeColor",
            self.stroke_color
                .as_ref()
                .or(scheme.and_then(|s| s.stroke_color.as_ref())),
        );
        dict.insert_opt("strokeWidth", self.stroke_width.map(|w| i64::from(w.get())));
        push_bool(&mut dict, "glass", self.glass);
        push_bool(&mut dict, "shadow", self.shadow);
        push_bool(&mut dict, "comic", self.comic);
        push_bool(&mut dict, "sketch", self.sketch);
        dict.insert_opt("opacity", self.opacity.map(i64::from));
        push_bool(&mut dict, "dashed", self.dashed);
        push_display(&mut dict, "dashPattern", self.dash_pattern.as_deref());
        self.text_format
            .write_entries(&mut dict, scheme.and_then(|s| s.font_color.as_ref()));
        for (key, value) in &self.extra {
            if !dict.contains_key(key) {
                dict.insert(key.clone(), value.clone());
            }
        }
        dict
    }

    pub fn to_style_string(&self) -> String {
        self.to_dict().encode()
    }
}

impl StyleTarget for ShapeStyle {
    fn set_base_style(&mut self, base_style: Option<String>) {
        self.base_style = base_style;
    }

    fn apply_typed_entry(&mut self, key: &str, value: &StyleValue) -> Applied {
        match key {
            "html" => set_bool(&mut self.html, value),
            "whiteSpace" => set_string(&mut self.white_space, value),
            "rounded" => set_bool(&mut self.rounded, value),
            "fillColor" => set_color(&mut self.fill_color, value),
            "strokeColor" => set_color(&mut self.stroke_color, value),
            "strokeWidth" => {
                self.stroke_width = StrokeWidth::parse(&value.to_style_string());
                Applied::Set
            }
            "glass" => set_bool(&mut self.glass, value),
            "shadow" => set_bool(&mut self.shadow, value),
            "comic" => set_bool(&mut self.comic, value),
            "sketch" => set_bool(&mut self.sketch, value),
            "opacity" => set_percent(&mut self.opacity, value),
            "dashed" => set_bool(&mut self.dashed, value),
            "dashPattern" => set_string(&mut self.dash_pattern, value),
            _ => self.text_format.apply_entry(key, value),
        }
    }

    fn extra_mut(&mut self) -> &mut IndexMap<String, StyleValue> {
        &mut self.extra
    }
}

/// Container sizing policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autosize {
    /// Recompute the box after every child mutation.
    pub to_children: bool,
    /// Fit the children exactly (plus margin) instead of only growing.
    pub contract: bool,
    pub margin: f64,
}

impl Default for Autosize {
    fn default() -> Self {
        Self {
            to_children: false,
            contract: false,
            margin: 20.0,
        }
    }
}

/// A vertex cell.
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) xml_id: String,
    pub(crate) value: String,
    pub(crate) geometry: ShapeGeometry,
    pub(crate) style: ShapeStyle,
    pub(crate) autosize: Autosize,
    pub(crate) parent: Option<ShapeId>,
    pub(crate) children: Vec<ShapeId>,
    pub(crate) in_edges: Vec<EdgeId>,
    pub(crate) out_edges: Vec<EdgeId>,
    pub(crate) page: Option<PageId>,
}

impl Shape {
    pub fn xml_id(&self) -> &str {
        &self.xml_id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Geometry with `x`/`y` relative to the parent container.
    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn style_string(&self) -> String {
        self.style.to_style_string()
    }

    pub fn autosize(&self) -> Autosize {
        self.autosize
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    pub fn children(&self) -> &[ShapeId] {
        &self.children
    }

    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }

    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }

    pub fn page(&self) -> Option<PageId> {
        self.page
    }

    pub fn width(&self) -> f64 {
        self.geometry.width()
    }

    pub fn height(&self) -> f64 {
        self.geometry.height()
    }

    pub(crate) fn add_in_edge(&mut self, edge: EdgeId) {
        if !self.in_edges.contains(&edge) {
            self.in_edges.push(edge);
        }
    }

    pub(crate) fn add_out_edge(&mut self, edge: EdgeId) {
        if !self.out_edges.contains(&edge) {
            self.out_edges.push(edge);
        }
    }

    pub(crate) fn remove_in_edge(&mut self, edge: EdgeId) {
        self.in_edges.retain(|e| *e != edge);
    }

    pub(crate) fn remove_out_edge(&mut self, edge: EdgeId) {
        self.out_edges.retain(|e| *e != edge);
    }
}

/// Names a template in one of the built-in shape libraries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryObject {
    pub library: String,
    pub name: String,
}

impl LibraryObject {
    pub(crate) fn resolve(&self) -> Result<&'static StyleDict> {
        let Some(library) = library::builtin(&self.library) else {
            return Err(Error::UnknownLibraryObject {
                library: self.library.clone(),
                name: self.name.clone(),
            });
        };
        library.object(&self.name)
    }
}

/// Everything needed to construct a shape. Style sources apply in order: `style`, `template`,
/// `library_object`, `style_string`.
#[derive(Debug, Clone)]
pub struct ShapeOptions {
    pub value: String,
    /// Absolute top-left corner.
    pub position: Point,
    pub size: Size,
    pub page: Option<PageId>,
    pub parent: Option<ShapeId>,
    pub style: ShapeStyle,
    pub template: Option<ShapeId>,
    pub library_object: Option<LibraryObject>,
    pub style_string: Option<String>,
    pub autosize: Autosize,
    pub xml_id: Option<String>,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            value: String::new(),
            position: point(0.0, 0.0),
            size: size(120.0, 80.0),
            page: None,
            parent: None,
            style: ShapeStyle::basic(),
            template: None,
            library_object: None,
            style_string: None,
            autosize: Autosize::default(),
            xml_id: None,
        }
    }
}

impl ShapeOptions {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = point(x, y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = size(width, height);
        self
    }

    pub fn on_page(mut self, page: PageId) -> Self {
        self.page = Some(page);
        self
    }

    pub fn in_container(mut self, parent: ShapeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style_string = Some(style.into());
        self
    }

    pub fn from_library(mut self, library: impl Into<String>, name: impl Into<String>) -> Self {
        self.library_object = Some(LibraryObject {
            library: library.into(),
            name: name.into(),
        });
        self
    }

    pub fn like(mut self, template: ShapeId) -> Self {
        self.template = Some(template);
        self
    }

    pub fn autosizing(mut self, margin: f64) -> Self {
        self.autosize = Autosize {
            to_children: true,
            contract: false,
            margin,
        };
        self
    }
}

/// Mutable access to one shape. Every change that touches geometry or relationships goes through
/// the owning [`File`] so that containers, edges and pages stay consistent.
#[derive(Debug)]
pub struct ShapeMut<'a> {
    pub(crate) file: &'a mut File,
    pub(crate) id: ShapeId,
}

impl ShapeMut<'_> {
    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn get(&self) -> &Shape {
        self.file.shape(self.id)
    }

    pub fn set_value(&mut self, value: impl Into<String>) -> &mut Self {
        self.file.shape_entry(self.id).value = value.into();
        self
    }

    /// Absolute top-left corner.
    pub fn position(&self) -> Point {
        self.file.shape_position(self.id)
    }

    pub fn set_position(&mut self, x: f64, y: f64) -> Result<&mut Self> {
        self.file.set_shape_position(self.id, point(x, y))?;
        Ok(self)
    }

    pub fn center_position(&self) -> Point {
        self.file.shape_bounds(self.id).center()
    }

    pub fn set_center_position(&mut self, x: f64, y: f64) -> Result<&mut Self> {
        let shape = self.file.shape(self.id);
        let (w, h) = (shape.width(), shape.height());
        self.set_position(x - w / 2.0, y - h / 2.0)
    }

    pub fn bounds(&self) -> Box2D {
        self.file.shape_bounds(self.id)
    }

    pub fn set_width(&mut self, width: f64) -> Result<&mut Self> {
        let height = self.file.shape(self.id).height();
        self.file.set_shape_size(self.id, size(width, height))?;
        Ok(self)
    }

    pub fn set_height(&mut self, height: f64) -> Result<&mut Self> {
        let width = self.file.shape(self.id).width();
        self.file.set_shape_size(self.id, size(width, height))?;
        Ok(self)
    }

    pub fn set_size(&mut self, width: f64, height: f64) -> Result<&mut Self> {
        self.file.set_shape_size(self.id, size(width, height))?;
        Ok(self)
    }

    pub fn add_child(&mut self, child: ShapeId) -> Result<&mut Self> {
        self.file.add_child(self.id, child)?;
        Ok(self)
    }

    pub fn remove_child(&mut self, child: ShapeId) -> Result<&mut Self> {
        self.file.remove_child(self.id, child)?;
        Ok(self)
    }

    /// Moves this shape into `parent`, or to the root with `None`. The absolute position is kept.
    pub fn set_parent(&mut self, parent: Option<ShapeId>) -> Result<&mut Self> {
        match parent {
            Some(parent) => self.file.add_child(parent, self.id)?,
            None => {
                if let Some(old) = self.file.shape(self.id).parent {
                    self.file.remove_child(old, self.id)?;
                }
            }
        }
        Ok(self)
    }

    pub fn set_page(&mut self, page: Option<PageId>) -> &mut Self {
        self.file.move_shape_to_page(self.id, page);
        self
    }

    pub fn set_autosize(&mut self, autosize: Autosize) -> Result<&mut Self> {
        if !autosize.margin.is_finite() || autosize.margin < 0.0 {
            return Err(Error::invalid_argument(format!(
                "autosize margin must be a non-negative number, got {}",
                autosize.margin
            )));
        }
        self.file.shape_entry(self.id).autosize = autosize;
        if autosize.to_children {
            self.file.resize_chain(Some(self.id))?;
        }
        Ok(self)
    }

    /// Resizes to the children's bounding box now, whatever the autosize policy says.
    pub fn resize_to_children(&mut self) -> Result<&mut Self> {
        let policy = self.file.shape(self.id).autosize;
        self.file.resize_to_children(self.id, policy)?;
        let parent = self.file.shape(self.id).parent;
        self.file.resize_chain(parent)?;
        Ok(self)
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.file.shape_entry(self.id).style
    }

    pub fn apply_style_string(&mut self, style: &str) -> &mut Self {
        self.style_mut().apply_style_string(style);
        self
    }

    pub fn apply_attribute_dict(&mut self, dict: &StyleDict) -> &mut Self {
        self.style_mut().apply_attribute_dict(dict);
        self
    }

    pub fn format_as_library_object(
        &mut self,
        library: &library::ShapeLibrary,
        name: &str,
    ) -> Result<&mut Self> {
        let dict = library.object(name)?;
        self.style_mut().apply_dict(dict);
        Ok(self)
    }

    /// Copies the complete style of `template`. Geometry, value and relationships are untouched.
    pub fn copy_style_from(&mut self, template: ShapeId) -> &mut Self {
        let style = self.file.shape(template).style.clone();
        self.file.shape_entry(self.id).style = style;
        self
    }
}
