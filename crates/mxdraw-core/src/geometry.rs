use crate::error::{Error, Result};
use crate::xml::XmlElement;

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;
pub type Box2D = euclid::Box2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

/// Shape box. `x`/`y` are relative to the parent container (absolute at the root).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeGeometry {
    pub x: f64,
    pub y: f64,
    width: f64,
    height: f64,
}

impl Default for ShapeGeometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 120.0,
            height: 60.0,
        }
    }
}

impl ShapeGeometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        check_extent(width, height)?;
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn origin(&self) -> Point {
        point(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        size(self.width, self.height)
    }

    pub fn set_width(&mut self, width: f64) -> Result<()> {
        check_extent(width, self.height)?;
        self.width = width;
        Ok(())
    }

    pub fn set_height(&mut self, height: f64) -> Result<()> {
        check_extent(self.width, height)?;
        self.height = height;
        Ok(())
    }

    pub fn set_size(&mut self, size: Size) -> Result<()> {
        check_extent(size.width, size.height)?;
        self.width = size.width;
        self.height = size.height;
        Ok(())
    }

    pub fn to_xml(&self) -> XmlElement {
        XmlElement::new("mxGeometry")
            .attr_num("x", self.x)
            .attr_num("y", self.y)
            .attr_num("width", self.width)
            .attr_num("height", self.height)
            .attr("as", "geometry")
    }
}

fn check_extent(width: f64, height: f64) -> Result<()> {
    if !width.is_finite() || !height.is_finite() {
        return Err(Error::invalid_geometry(format!(
            "size must be finite, got {width} x {height}"
        )));
    }
    if width < 0.0 || height < 0.0 {
        return Err(Error::invalid_geometry(format!(
            "width and height must be non-negative, got {width} x {height}"
        )));
    }
    Ok(())
}

/// Edge geometry: label placement plus ordered routing points.
///
/// `x` is the label position along the edge in `[-1, 1]` (`-1` at the source, `1` at the
/// target); `y` is the perpendicular label offset in pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeGeometry {
    x: Option<f64>,
    pub y: Option<f64>,
    pub points: Vec<Point>,
}

impl EdgeGeometry {
    pub fn label_position(&self) -> Option<f64> {
        self.x
    }

    /// Clamped to `[-1, 1]`.
    pub fn set_label_position(&mut self, position: Option<f64>) {
        self.x = position
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(-1.0, 1.0));
    }

    pub fn label_offset(&self) -> Option<f64> {
        self.y
    }

    pub fn set_label_offset(&mut self, offset: Option<f64>) {
        self.y = offset.filter(|v| v.is_finite());
    }

    pub fn to_xml(&self) -> XmlElement {
        let mut geometry = XmlElement::new("mxGeometry")
            .attr_opt("x", self.x.map(crate::xml::fmt_number))
            .attr_opt("y", self.y.map(crate::xml::fmt_number))
            .attr("relative", "1")
            .attr("as", "geometry");
        if !self.points.is_empty() {
            let mut array = XmlElement::new("Array").attr("as", "points");
            for p in &self.points {
                array.push_child(XmlElement::new("mxPoint").attr_num("x", p.x).attr_num("y", p.y));
            }
            geometry.push_child(array);
        }
        geometry
    }
}
