//! Reading Draw.io documents back into the object model.
//!
//! Every `mxCell` of every `<diagram>` is collected (compressed diagram payloads are inflated
//! first), then rebuilt in three passes: vertices, container nesting, edges. The two sentinel
//! cells and anything that is neither a vertex nor an edge are dropped.

use crate::edge::{Edge, EdgeStyle};
use crate::error::{Error, Result};
use crate::file::File;
use crate::geometry::{EdgeGeometry, Point, ShapeGeometry, point};
use crate::id::{CellId, EdgeId, ShapeId};
use crate::page::PageOptions;
use crate::shape::{Autosize, Shape, ShapeStyle};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::read::DeflateDecoder;
use percent_encoding::percent_decode_str;
use roxmltree::{Document, Node};
use rustc_hash::FxHashMap;
use std::io::Read as _;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Exact,
    Substring,
}

/// The entity graph rebuilt from a document.
///
/// Imported cells live in a private [`File`] arena and are not on any page until
/// [`ParsedDiagram::into_file`] is called.
#[derive(Debug, Clone)]
pub struct ParsedDiagram {
    file: File,
    diagram_names: Vec<String>,
    shapes: Vec<ShapeId>,
    edges: Vec<EdgeId>,
    order: Vec<CellId>,
    index: FxHashMap<String, CellId>,
}

impl ParsedDiagram {
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Names of the `<diagram>` elements, in document order.
    pub fn diagram_names(&self) -> &[String] {
        &self.diagram_names
    }

    pub fn shapes(&self) -> &[ShapeId] {
        &self.shapes
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn shape(&self, id: ShapeId) -> &Shape {
        self.file.shape(id)
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.file.edge(id)
    }

    /// When several diagrams reuse an id, the first cell in document order wins.
    pub fn get_by_id(&self, xml_id: &str) -> Option<CellId> {
        self.index.get(xml_id).copied()
    }

    pub fn shape_by_id(&self, xml_id: &str) -> Option<&Shape> {
        match self.get_by_id(xml_id)? {
            CellId::Shape(id) => Some(self.file.shape(id)),
            CellId::Edge(_) => None,
        }
    }

    pub fn edge_by_id(&self, xml_id: &str) -> Option<&Edge> {
        match self.get_by_id(xml_id)? {
            CellId::Edge(id) => Some(self.file.edge(id)),
            CellId::Shape(_) => None,
        }
    }

    /// Shapes that no edge points at.
    pub fn root_shapes(&self) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .copied()
            .filter(|id| self.file.shape(*id).in_edges().is_empty())
            .collect()
    }

    pub fn outgoing_edges(&self, shape: ShapeId) -> &[EdgeId] {
        self.file.shape(shape).out_edges()
    }

    pub fn incoming_edges(&self, shape: ShapeId) -> &[EdgeId] {
        self.file.shape(shape).in_edges()
    }

    /// Shapes by value and edges by label, in document order.
    pub fn find_by_value(&self, text: &str, mode: MatchMode) -> Vec<CellId> {
        let hit = |candidate: &str| match mode {
            MatchMode::Exact => candidate == text,
            MatchMode::Substring => candidate.contains(text),
        };
        self.order
            .iter()
            .copied()
            .filter(|cell| match *cell {
                CellId::Shape(id) => hit(self.file.shape(id).value()),
                CellId::Edge(id) => self.file.edge(id).label().is_some_and(hit),
            })
            .collect()
    }

    /// Puts every imported cell, in document order, on a single new page.
    pub fn into_file(mut self, page_name: impl Into<String>) -> File {
        let page = self.file.add_page(PageOptions::named(page_name));
        for cell in &self.order {
            match *cell {
                CellId::Shape(id) => self.file.move_shape_to_page(id, Some(page)),
                CellId::Edge(id) => self.file.move_edge_to_page(id, Some(page)),
            }
        }
        self.file
    }
}

pub fn import_path(path: impl AsRef<Path>) -> Result<ParsedDiagram> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileMissing {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_str(&text)
}

pub fn import_str(xml: &str) -> Result<ParsedDiagram> {
    let mut collected = Collected::default();
    collect_document(xml, &mut collected)?;
    if collected.cell_count == 0 {
        return Err(Error::EmptyDocument);
    }
    let parsed = build(collected)?;
    tracing::debug!(
        shapes = parsed.shapes.len(),
        edges = parsed.edges.len(),
        "imported drawio document"
    );
    Ok(parsed)
}

#[derive(Debug, Default)]
struct Collected {
    diagram_names: Vec<String>,
    cells: Vec<RawCell>,
    cell_count: usize,
}

#[derive(Debug)]
struct RawCell {
    /// Ordinal of the enclosing `<diagram>`; ids are only unique within one diagram.
    diagram: usize,
    id: String,
    parent: Option<String>,
    value: String,
    style: String,
    vertex: bool,
    edge: bool,
    source: Option<String>,
    target: Option<String>,
    geometry: RawGeometry,
}

#[derive(Debug, Default)]
struct RawGeometry {
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    points: Vec<Point>,
}

fn collect_document(xml: &str, out: &mut Collected) -> Result<()> {
    let doc = Document::parse(xml).map_err(|e| Error::malformed(e.to_string()))?;
    for node in doc.descendants().filter(Node::is_element) {
        match node.tag_name().name() {
            "diagram" => {
                out.diagram_names
                    .push(node.attribute("name").unwrap_or_default().to_string());
                if node.children().any(|c| c.is_element()) {
                    continue;
                }
                let payload = node.text().unwrap_or_default();
                if payload.trim().is_empty() {
                    continue;
                }
                let inflated = inflate_payload(payload)?;
                collect_document(&inflated, out)?;
            }
            "mxCell" => {
                out.cell_count += 1;
                match read_cell(node, out.diagram_names.len())? {
                    Some(cell) => out.cells.push(cell),
                    None => tracing::trace!(
                        position = node.range().start,
                        "skipping mxCell without id"
                    ),
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Compressed diagrams are base64 of raw deflate of the percent-encoded model XML.
fn inflate_payload(payload: &str) -> Result<String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let deflated = STANDARD
        .decode(compact)
        .map_err(|e| Error::malformed(format!("diagram payload is not base64: {e}")))?;
    let mut inflated = Vec::new();
    DeflateDecoder::new(&deflated[..])
        .read_to_end(&mut inflated)
        .map_err(|e| Error::malformed(format!("diagram payload does not inflate: {e}")))?;
    let encoded = std::str::from_utf8(&inflated)
        .map_err(|e| Error::malformed(format!("diagram payload is not UTF-8: {e}")))?;
    let decoded = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| Error::malformed(format!("diagram payload is not UTF-8: {e}")))?;
    Ok(decoded.into_owned())
}

fn read_cell(node: Node<'_, '_>, diagram: usize) -> Result<Option<RawCell>> {
    let wrapper = node
        .parent_element()
        .filter(|p| matches!(p.tag_name().name(), "UserObject" | "object"));
    let Some(id) = wrapper
        .and_then(|w| w.attribute("id"))
        .or_else(|| node.attribute("id"))
    else {
        return Ok(None);
    };
    let value = wrapper
        .and_then(|w| w.attribute("label"))
        .or_else(|| node.attribute("value"))
        .unwrap_or_default();

    let mut geometry = RawGeometry::default();
    if let Some(geo) = node.children().find(|c| c.has_tag_name("mxGeometry")) {
        geometry.x = number_attr(geo, "x")?;
        geometry.y = number_attr(geo, "y")?;
        geometry.width = number_attr(geo, "width")?;
        geometry.height = number_attr(geo, "height")?;
        let points = geo
            .children()
            .find(|c| c.has_tag_name("Array") && c.attribute("as") == Some("points"));
        if let Some(points) = points {
            for p in points.children().filter(|c| c.has_tag_name("mxPoint")) {
                geometry.points.push(point(
                    number_attr(p, "x")?.unwrap_or(0.0),
                    number_attr(p, "y")?.unwrap_or(0.0),
                ));
            }
        }
    }

    Ok(Some(RawCell {
        diagram,
        id: id.to_string(),
        parent: node.attribute("parent").map(str::to_string),
        value: value.to_string(),
        style: node.attribute("style").unwrap_or_default().to_string(),
        vertex: node.attribute("vertex") == Some("1"),
        edge: node.attribute("edge") == Some("1"),
        source: node.attribute("source").map(str::to_string),
        target: node.attribute("target").map(str::to_string),
        geometry,
    }))
}

fn number_attr(node: Node<'_, '_>, name: &str) -> Result<Option<f64>> {
    let Some(raw) = node.attribute(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| Error::malformed(format!("attribute `{name}` is not a number: {raw:?}")))
}

fn build(collected: Collected) -> Result<ParsedDiagram> {
    let mut file = File::new();
    let mut shapes = Vec::new();
    let mut edges = Vec::new();
    let mut order = Vec::new();
    let mut index: FxHashMap<String, CellId> = FxHashMap::default();
    let mut local: FxHashMap<(usize, &str), CellId> = FxHashMap::default();

    for cell in collected.cells.iter().filter(|c| c.vertex) {
        let g = &cell.geometry;
        let geometry = ShapeGeometry::new(
            g.x.unwrap_or(0.0),
            g.y.unwrap_or(0.0),
            g.width.unwrap_or(0.0),
            g.height.unwrap_or(0.0),
        )
        .map_err(|e| Error::malformed(format!("cell {}: {e}", cell.id)))?;
        let id = file.insert_decoded_shape(Shape {
            xml_id: cell.id.clone(),
            value: cell.value.clone(),
            geometry,
            style: ShapeStyle::parse(&cell.style),
            autosize: Autosize::default(),
            parent: None,
            children: Vec::new(),
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            page: None,
        });
        shapes.push(id);
        index.entry(cell.id.clone()).or_insert(CellId::Shape(id));
        local.insert((cell.diagram, cell.id.as_str()), CellId::Shape(id));
    }

    let shape_for = |local: &FxHashMap<(usize, &str), CellId>,
                     diagram: usize,
                     xml_id: Option<&String>| {
        match xml_id.and_then(|id| local.get(&(diagram, id.as_str()))) {
            Some(CellId::Shape(id)) => Some(*id),
            _ => None,
        }
    };

    let vertices = collected.cells.iter().filter(|c| c.vertex).zip(shapes.iter().copied());
    for (cell, child) in vertices.clone() {
        if let Some(parent) = shape_for(&local, cell.diagram, cell.parent.as_ref()) {
            file.nest_decoded(parent, child);
        }
    }

    let mut vertices = vertices;
    for cell in &collected.cells {
        if cell.vertex {
            if let Some((_, id)) = vertices.next() {
                order.push(CellId::Shape(id));
            }
            continue;
        }
        if !cell.edge {
            tracing::trace!(xml_id = %cell.id, "skipping cell that is neither vertex nor edge");
            continue;
        }
        let mut style = EdgeStyle::plain();
        style.apply_style_string(&cell.style);
        let mut geometry = EdgeGeometry::default();
        geometry.points = cell.geometry.points.clone();
        geometry.set_label_position(cell.geometry.x);
        geometry.set_label_offset(cell.geometry.y);
        let id = file.insert_decoded_edge(Edge {
            xml_id: cell.id.clone(),
            label: Some(cell.value.clone()).filter(|v| !v.is_empty()),
            style,
            geometry,
            source: shape_for(&local, cell.diagram, cell.source.as_ref()),
            target: shape_for(&local, cell.diagram, cell.target.as_ref()),
            parent: shape_for(&local, cell.diagram, cell.parent.as_ref()),
            page: None,
        });
        edges.push(id);
        order.push(CellId::Edge(id));
        index.entry(cell.id.clone()).or_insert(CellId::Edge(id));
        local.insert((cell.diagram, cell.id.as_str()), CellId::Edge(id));
    }

    Ok(ParsedDiagram {
        file,
        diagram_names: collected.diagram_names,
        shapes,
        edges,
        order,
        index,
    })
}
