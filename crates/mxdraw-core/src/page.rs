use crate::id::{CellId, EdgeId, ShapeId};
use crate::style::{Color, style_token_enum};
use crate::xml::{XmlElement, fmt_number};

style_token_enum! {
    /// Standard paper sizes, in Draw.io canvas units.
    PageSize, "page size" {
        Letter => "Letter",
        Legal => "Legal",
        Tabloid => "Tabloid",
        Executive => "Executive",
        A3 => "A3",
        A4 => "A4",
        A5 => "A5",
        A6 => "A6",
        B4 => "B4",
        B5 => "B5",
    }
}

impl PageSize {
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            Self::Letter => (850.0, 1100.0),
            Self::Legal => (850.0, 1400.0),
            Self::Tabloid => (1100.0, 1700.0),
            Self::Executive => (700.0, 1000.0),
            Self::A3 => (1169.0, 1654.0),
            Self::A4 => (827.0, 1169.0),
            Self::A5 => (583.0, 827.0),
            Self::A6 => (413.0, 583.0),
            Self::B4 => (980.0, 1390.0),
            Self::B5 => (690.0, 980.0),
        }
    }
}

/// `mxGraphModel` attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub dx: f64,
    pub dy: f64,
    pub grid: bool,
    pub grid_size: f64,
    pub guides: bool,
    pub tooltips: bool,
    pub connect: bool,
    pub arrows: bool,
    pub fold: bool,
    /// Page view (`page=1`) as opposed to an unbounded canvas.
    pub page_view: bool,
    pub page_scale: f64,
    pub page_width: f64,
    pub page_height: f64,
    pub math: bool,
    pub shadow: bool,
    pub background: Option<Color>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            dx: 2037.0,
            dy: 830.0,
            grid: true,
            grid_size: 10.0,
            guides: true,
            tooltips: true,
            connect: true,
            arrows: true,
            fold: true,
            page_view: true,
            page_scale: 1.0,
            page_width: 850.0,
            page_height: 1100.0,
            math: false,
            shadow: false,
            background: None,
        }
    }
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

impl Canvas {
    pub(crate) fn to_xml(&self) -> XmlElement {
        XmlElement::new("mxGraphModel")
            .attr("dx", fmt_number(self.dx))
            .attr("dy", fmt_number(self.dy))
            .attr("grid", flag(self.grid))
            .attr("gridSize", fmt_number(self.grid_size))
            .attr("guides", flag(self.guides))
            .attr("toolTips", flag(self.tooltips))
            .attr("connect", flag(self.connect))
            .attr("arrows", flag(self.arrows))
            .attr("fold", flag(self.fold))
            .attr("page", flag(self.page_view))
            .attr("pageScale", fmt_number(self.page_scale))
            .attr("pageWidth", fmt_number(self.page_width))
            .attr("pageHeight", fmt_number(self.page_height))
            .attr("math", flag(self.math))
            .attr("shadow", flag(self.shadow))
            .attr_opt("background", self.background.as_ref().map(Color::to_string))
    }
}

/// Construction options for a page. `size` wins over `width` / `height`.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Defaults to `Page-<n>` when the page is attached.
    pub name: Option<String>,
    pub xml_id: Option<String>,
    pub size: Option<PageSize>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub canvas: Canvas,
}

impl PageOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub(crate) fn resolve_canvas(&self) -> Canvas {
        let mut canvas = self.canvas.clone();
        if let Some(width) = self.width {
            canvas.page_width = width;
        }
        if let Some(height) = self.height {
            canvas.page_height = height;
        }
        if let Some(preset) = self.size {
            if self.width.is_some() || self.height.is_some() {
                tracing::warn!(
                    preset = %preset,
                    width = ?self.width,
                    height = ?self.height,
                    "page size preset overrides explicit width/height"
                );
            }
            let (width, height) = preset.dimensions();
            canvas.page_width = width;
            canvas.page_height = height;
        }
        canvas
    }
}

/// One entry of [`Page::objects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageObject {
    /// `<mxCell id="0" />`
    Root,
    /// `<mxCell id="1" parent="0" />`, the default layer.
    Layer,
    Shape(ShapeId),
    Edge(EdgeId),
}

impl PageObject {
    pub fn xml_id(self) -> Option<&'static str> {
        match self {
            Self::Root => Some("0"),
            Self::Layer => Some("1"),
            Self::Shape(_) | Self::Edge(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub(crate) xml_id: String,
    pub(crate) name: Option<String>,
    pub(crate) attached: bool,
    pub(crate) cells: Vec<CellId>,
    pub(crate) canvas: Canvas,
}

impl Page {
    pub fn xml_id(&self) -> &str {
        &self.xml_id
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Whether the page currently belongs to its file's page list.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// User cells in insertion order.
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Everything emitted into `<root>`: the two sentinel cells, then user cells.
    pub fn objects(&self) -> Vec<PageObject> {
        let mut out = Vec::with_capacity(self.cells.len() + 2);
        out.push(PageObject::Root);
        out.push(PageObject::Layer);
        out.extend(self.cells.iter().map(|cell| match *cell {
            CellId::Shape(id) => PageObject::Shape(id),
            CellId::Edge(id) => PageObject::Edge(id),
        }));
        out
    }

    pub fn shapes(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.cells.iter().filter_map(|cell| match *cell {
            CellId::Shape(id) => Some(id),
            CellId::Edge(_) => None,
        })
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.cells.iter().filter_map(|cell| match *cell {
            CellId::Edge(id) => Some(id),
            CellId::Shape(_) => None,
        })
    }

    pub fn contains(&self, cell: impl Into<CellId>) -> bool {
        self.cells.contains(&cell.into())
    }

    pub(crate) fn push_cell(&mut self, cell: CellId) {
        if !self.cells.contains(&cell) {
            self.cells.push(cell);
        }
    }

    pub(crate) fn remove_cell(&mut self, cell: CellId) -> bool {
        let before = self.cells.len();
        self.cells.retain(|c| *c != cell);
        self.cells.len() != before
    }
}
