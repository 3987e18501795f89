//! The document arena.
//!
//! A [`File`] owns every page, shape and edge created through it. Entities are addressed by
//! [`ShapeId`] / [`EdgeId`] / [`PageId`] and never freed: removing something from a page or
//! unwiring an edge only changes relationships, so every id stays valid and can be reattached.

use crate::edge::{Edge, EdgeMut, EdgeOptions};
use crate::error::{Error, Result};
use crate::geometry::{Box2D, EdgeGeometry, Point, ShapeGeometry, Size, point};
use crate::id::{CellId, EdgeId, PageId, ShapeId};
use crate::page::{Page, PageOptions};
use crate::shape::{Autosize, Shape, ShapeMut, ShapeOptions};
use crate::style::StyleTarget;
use crate::xml::{XmlElement, next_xml_id};
use rustc_hash::FxHashSet;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_NAME: &str = "Drawpyo Diagram.drawio";
pub const DEFAULT_DIRECTORY_NAME: &str = "Drawpyo Charts";
pub const DRAWIO_VERSION: &str = "21.6.5";

const MODIFIED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// `<mxfile>` attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub host: String,
    pub modified: String,
    pub agent: String,
    pub etag: Option<String>,
    pub version: String,
    pub doc_type: String,
}

impl Default for FileMetadata {
    fn default() -> Self {
        Self {
            host: "Drawpyo".to_string(),
            modified: now_stamp(),
            agent: format!("Rust, mxdraw {}", env!("CARGO_PKG_VERSION")),
            etag: None,
            version: DRAWIO_VERSION.to_string(),
            doc_type: "device".to_string(),
        }
    }
}

fn now_stamp() -> String {
    chrono::Local::now().format(MODIFIED_FORMAT).to_string()
}

/// Selects a page for [`File::remove_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef<'a> {
    Id(PageId),
    /// Position in the file's page list.
    Index(usize),
    /// The first page with this name.
    Name(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Defaults to `<home>/Drawpyo Charts`.
    pub directory: Option<PathBuf>,
    /// Defaults to `Drawpyo Diagram.drawio`.
    pub file_name: Option<String>,
    /// When false, an existing file is an error instead of being truncated.
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: None,
            overwrite: true,
        }
    }
}

impl WriteOptions {
    pub fn to_dir(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Self::default()
        }
    }

    pub fn named(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }
}

/// `<home>/Drawpyo Charts`, or a relative `Drawpyo Charts` when no home directory is known.
pub fn default_directory() -> PathBuf {
    match directories::UserDirs::new() {
        Some(dirs) => dirs.home_dir().join(DEFAULT_DIRECTORY_NAME),
        None => PathBuf::from(DEFAULT_DIRECTORY_NAME),
    }
}

#[derive(Debug, Clone, Default)]
pub struct File {
    metadata: FileMetadata,
    pages: Vec<PageId>,
    page_arena: Vec<Page>,
    shapes: Vec<Shape>,
    edges: Vec<Edge>,
    xml_ids: FxHashSet<String>,
}

impl File {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut FileMetadata {
        &mut self.metadata
    }

    /// Creates a page and appends it to the page list.
    pub fn add_page(&mut self, options: PageOptions) -> PageId {
        let id = self.new_detached_page(options);
        self.attach_page(id);
        id
    }

    /// Creates a page that is not yet part of the page list.
    pub fn new_detached_page(&mut self, options: PageOptions) -> PageId {
        let canvas = options.resolve_canvas();
        let xml_id = self.claim_xml_id(options.xml_id);
        let id = PageId::from_index(self.page_arena.len());
        self.page_arena.push(Page {
            xml_id,
            name: options.name,
            attached: false,
            cells: Vec::new(),
            canvas,
        });
        id
    }

    /// Appends a detached page. Unnamed pages become `Page-<n>`.
    pub fn attach_page(&mut self, id: PageId) {
        if self.pages.contains(&id) {
            return;
        }
        self.pages.push(id);
        let position = self.pages.len();
        let page = &mut self.page_arena[id.index()];
        page.attached = true;
        if page.name.is_none() {
            page.name = Some(format!("Page-{position}"));
        }
    }

    /// Detaches the selected page and returns it. Its cells stay on it.
    pub fn remove_page(&mut self, page: PageRef<'_>) -> Option<PageId> {
        let position = match page {
            PageRef::Id(id) => self.pages.iter().position(|p| *p == id),
            PageRef::Index(index) => (index < self.pages.len()).then_some(index),
            PageRef::Name(name) => self
                .pages
                .iter()
                .position(|p| self.page_arena[p.index()].name() == name),
        }?;
        let id = self.pages.remove(position);
        self.page_arena[id.index()].attached = false;
        Some(id)
    }

    /// Attached pages in order.
    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }

    /// Panics if `id` was not issued by this file.
    pub fn page(&self, id: PageId) -> &Page {
        &self.page_arena[id.index()]
    }

    pub fn page_mut(&mut self, id: PageId) -> &mut Page {
        &mut self.page_arena[id.index()]
    }

    pub fn add_shape(&mut self, options: ShapeOptions) -> Result<ShapeId> {
        let geometry = ShapeGeometry::new(
            options.position.x,
            options.position.y,
            options.size.width,
            options.size.height,
        )?;
        if !options.autosize.margin.is_finite() || options.autosize.margin < 0.0 {
            return Err(Error::invalid_argument(format!(
                "autosize margin must be a non-negative number, got {}",
                options.autosize.margin
            )));
        }

        let mut style = options.style;
        if let Some(template) = options.template {
            style = self.shape(template).style.clone();
        }
        if let Some(object) = &options.library_object {
            style.apply_dict(object.resolve()?);
        }
        if let Some(raw) = &options.style_string {
            style.apply_style_string(raw);
        }

        let xml_id = self.claim_xml_id(options.xml_id);
        let id = ShapeId::from_index(self.shapes.len());
        self.shapes.push(Shape {
            xml_id,
            value: options.value,
            geometry,
            style,
            autosize: options.autosize,
            parent: None,
            children: Vec::new(),
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            page: None,
        });
        if options.page.is_some() {
            self.move_shape_to_page(id, options.page);
        }
        if let Some(parent) = options.parent {
            self.add_child(parent, id)?;
        }
        Ok(id)
    }

    /// Panics if `id` was not issued by this file.
    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.index()]
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> ShapeMut<'_> {
        ShapeMut { file: self, id }
    }

    /// Every shape ever created, attached or not.
    pub fn shape_ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        (0..self.shapes.len()).map(ShapeId::from_index)
    }

    pub(crate) fn shape_entry(&mut self, id: ShapeId) -> &mut Shape {
        &mut self.shapes[id.index()]
    }

    /// Absolute top-left corner.
    pub fn shape_position(&self, id: ShapeId) -> Point {
        let mut pos = self.shape(id).geometry.origin();
        let mut cursor = self.shape(id).parent;
        while let Some(parent) = cursor {
            let shape = self.shape(parent);
            pos += shape.geometry.origin().to_vector();
            cursor = shape.parent;
        }
        pos
    }

    /// Absolute box.
    pub fn shape_bounds(&self, id: ShapeId) -> Box2D {
        Box2D::from_origin_and_size(self.shape_position(id), self.shape(id).geometry.size())
    }

    pub(crate) fn set_shape_position(&mut self, id: ShapeId, absolute: Point) -> Result<()> {
        let origin = self.parent_origin(id);
        let geometry = &mut self.shapes[id.index()].geometry;
        geometry.x = absolute.x - origin.x;
        geometry.y = absolute.y - origin.y;
        let parent = self.shape(id).parent;
        self.resize_chain(parent)
    }

    pub(crate) fn set_shape_size(&mut self, id: ShapeId, size: Size) -> Result<()> {
        self.shapes[id.index()].geometry.set_size(size)?;
        let parent = self.shape(id).parent;
        self.resize_chain(parent)
    }

    fn parent_origin(&self, id: ShapeId) -> Point {
        match self.shape(id).parent {
            Some(parent) => self.shape_position(parent),
            None => point(0.0, 0.0),
        }
    }

    fn is_ancestor(&self, ancestor: ShapeId, of: ShapeId) -> bool {
        let mut cursor = self.shape(of).parent;
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.shape(id).parent;
        }
        false
    }

    /// Nests `child` in `parent`, keeping its absolute position. A child without a page joins
    /// the parent's page.
    pub(crate) fn add_child(&mut self, parent: ShapeId, child: ShapeId) -> Result<()> {
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::invalid_argument(format!(
                "nesting {child} in {parent} would create a containment cycle"
            )));
        }
        let old_parent = self.shape(child).parent;
        if old_parent == Some(parent) {
            return Ok(());
        }
        let absolute = self.shape_position(child);
        if let Some(old) = old_parent {
            self.shapes[old.index()].children.retain(|c| *c != child);
        }
        self.shapes[parent.index()].children.push(child);
        self.shapes[child.index()].parent = Some(parent);
        let origin = self.shape_position(parent);
        let geometry = &mut self.shapes[child.index()].geometry;
        geometry.x = absolute.x - origin.x;
        geometry.y = absolute.y - origin.y;

        if self.shape(child).page.is_none() {
            let page = self.shape(parent).page;
            self.move_shape_to_page(child, page);
        }
        self.resize_chain(old_parent)?;
        self.resize_chain(Some(parent))
    }

    /// Moves `child` back to the root, keeping its absolute position.
    pub(crate) fn remove_child(&mut self, parent: ShapeId, child: ShapeId) -> Result<()> {
        if self.shape(child).parent != Some(parent) {
            return Err(Error::invalid_argument(format!(
                "{child} is not a child of {parent}"
            )));
        }
        let absolute = self.shape_position(child);
        self.shapes[parent.index()].children.retain(|c| *c != child);
        let shape = &mut self.shapes[child.index()];
        shape.parent = None;
        shape.geometry.x = absolute.x;
        shape.geometry.y = absolute.y;
        self.resize_chain(Some(parent))
    }

    /// Re-fits `start` and every auto-sizing ancestor above it, stopping at the first container
    /// that does not auto-size.
    pub(crate) fn resize_chain(&mut self, start: Option<ShapeId>) -> Result<()> {
        let mut cursor = start;
        while let Some(id) = cursor {
            let policy = self.shape(id).autosize;
            if !policy.to_children {
                break;
            }
            self.resize_to_children(id, policy)?;
            cursor = self.shape(id).parent;
        }
        Ok(())
    }

    /// Returns whether the container's box changed. Children keep their absolute positions.
    pub(crate) fn resize_to_children(&mut self, id: ShapeId, policy: Autosize) -> Result<bool> {
        let children = self.shape(id).children.clone();
        let Some(content) = children
            .iter()
            .map(|c| self.shape_bounds(*c))
            .reduce(|a, b| union(&a, &b))
        else {
            return Ok(false);
        };
        let current = self.shape_bounds(id);
        let margin = policy.margin;
        let padded = content.inflate(margin, margin);
        let target = if policy.contract {
            padded
        } else if encloses(&current, &padded) {
            return Ok(false);
        } else {
            union(&current, &content).inflate(margin, margin)
        };
        if target == current {
            return Ok(false);
        }

        let shift = target.min - current.min;
        let shape = &mut self.shapes[id.index()];
        shape.geometry.set_size(target.size())?;
        shape.geometry.x += shift.x;
        shape.geometry.y += shift.y;
        for child in &children {
            let geometry = &mut self.shapes[child.index()].geometry;
            geometry.x -= shift.x;
            geometry.y -= shift.y;
        }
        tracing::debug!(
            container = %self.shape(id).xml_id,
            x = target.min.x,
            y = target.min.y,
            width = target.width(),
            height = target.height(),
            "resized container to children"
        );
        Ok(true)
    }

    /// Moves a shape onto `page` (or off every page with `None`).
    pub fn move_shape_to_page(&mut self, id: ShapeId, page: Option<PageId>) {
        let cell = CellId::Shape(id);
        if let Some(old) = self.shape(id).page {
            self.page_arena[old.index()].remove_cell(cell);
        }
        if let Some(new) = page {
            self.page_arena[new.index()].push_cell(cell);
        }
        self.shapes[id.index()].page = page;
    }

    pub fn move_edge_to_page(&mut self, id: EdgeId, page: Option<PageId>) {
        let cell = CellId::Edge(id);
        if let Some(old) = self.edge(id).page {
            self.page_arena[old.index()].remove_cell(cell);
        }
        if let Some(new) = page {
            self.page_arena[new.index()].push_cell(cell);
        }
        self.edges[id.index()].page = page;
    }

    /// Takes a cell off `page`. Returns false when the cell was not on it.
    pub fn remove_object(&mut self, page: PageId, cell: impl Into<CellId>) -> bool {
        let cell = cell.into();
        let on_page = match cell {
            CellId::Shape(id) => self.shape(id).page == Some(page),
            CellId::Edge(id) => self.edge(id).page == Some(page),
        };
        if !on_page {
            return false;
        }
        match cell {
            CellId::Shape(id) => self.move_shape_to_page(id, None),
            CellId::Edge(id) => self.move_edge_to_page(id, None),
        }
        true
    }

    pub fn add_edge(&mut self, options: EdgeOptions) -> Result<EdgeId> {
        for end in [options.source, options.target, options.parent]
            .into_iter()
            .flatten()
        {
            self.check_endpoint(end)?;
        }
        let mut style = options.style;
        if let Some(raw) = &options.style_string {
            style.apply_style_string(raw);
        }
        let mut geometry = EdgeGeometry::default();
        geometry.points = options.points;
        geometry.set_label_position(options.label_position);
        geometry.set_label_offset(options.label_offset);

        let xml_id = self.claim_xml_id(options.xml_id);
        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(Edge {
            xml_id,
            label: options.label,
            style,
            geometry,
            source: None,
            target: None,
            parent: options.parent,
            page: None,
        });
        self.set_edge_source(id, options.source);
        self.set_edge_target(id, options.target);
        if options.page.is_some() {
            self.move_edge_to_page(id, options.page);
        }
        Ok(id)
    }

    pub(crate) fn check_endpoint(&self, end: ShapeId) -> Result<()> {
        if end.index() >= self.shapes.len() {
            return Err(Error::invalid_argument(format!(
                "edge endpoint {end} does not belong to this file"
            )));
        }
        Ok(())
    }

    /// Panics if `id` was not issued by this file.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> EdgeMut<'_> {
        EdgeMut { file: self, id }
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId::from_index)
    }

    pub(crate) fn edge_entry(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    pub(crate) fn set_edge_source(&mut self, edge: EdgeId, source: Option<ShapeId>) {
        let old = self.edge(edge).source;
        if old == source {
            return;
        }
        if let Some(old) = old {
            self.shapes[old.index()].remove_out_edge(edge);
        }
        if let Some(new) = source {
            self.shapes[new.index()].add_out_edge(edge);
        }
        self.edges[edge.index()].source = source;
    }

    pub(crate) fn set_edge_target(&mut self, edge: EdgeId, target: Option<ShapeId>) {
        let old = self.edge(edge).target;
        if old == target {
            return;
        }
        if let Some(old) = old {
            self.shapes[old.index()].remove_in_edge(edge);
        }
        if let Some(new) = target {
            self.shapes[new.index()].add_in_edge(edge);
        }
        self.edges[edge.index()].target = target;
    }

    /// Registers a caller-supplied XML id, or draws a fresh one that no cell in this file uses.
    pub(crate) fn claim_xml_id(&mut self, requested: Option<String>) -> String {
        if let Some(id) = requested {
            if !self.xml_ids.insert(id.clone()) {
                tracing::debug!(xml_id = %id, "duplicate xml id");
            }
            return id;
        }
        loop {
            let id = next_xml_id();
            if self.xml_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Inserts a shape exactly as decoded: relative geometry, no page, no autosize.
    pub(crate) fn insert_decoded_shape(&mut self, mut shape: Shape) -> ShapeId {
        shape.xml_id = self.claim_xml_id(Some(std::mem::take(&mut shape.xml_id)));
        let id = ShapeId::from_index(self.shapes.len());
        self.shapes.push(shape);
        id
    }

    /// Wires a decoded parent link without touching the child's relative geometry.
    pub(crate) fn nest_decoded(&mut self, parent: ShapeId, child: ShapeId) {
        if parent == child || self.is_ancestor(child, parent) {
            tracing::trace!(%parent, %child, "skipping cyclic parent link");
            return;
        }
        if let Some(old) = self.shapes[child.index()].parent {
            self.shapes[old.index()].children.retain(|c| *c != child);
        }
        let children = &mut self.shapes[parent.index()].children;
        if !children.contains(&child) {
            children.push(child);
        }
        self.shapes[child.index()].parent = Some(parent);
    }

    pub(crate) fn insert_decoded_edge(&mut self, mut edge: Edge) -> EdgeId {
        let (source, target) = (edge.source.take(), edge.target.take());
        edge.xml_id = self.claim_xml_id(Some(std::mem::take(&mut edge.xml_id)));
        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(edge);
        self.set_edge_source(id, source);
        self.set_edge_target(id, target);
        id
    }

    fn container_xml_id(&self, parent: Option<ShapeId>) -> String {
        match parent {
            Some(id) => self.shape(id).xml_id.clone(),
            None => "1".to_string(),
        }
    }

    pub fn shape_xml(&self, id: ShapeId) -> XmlElement {
        let shape = self.shape(id);
        XmlElement::new("mxCell")
            .attr("id", shape.xml_id.clone())
            .attr("value", shape.value.clone())
            .attr("style", shape.style.to_style_string())
            .attr("vertex", "1")
            .attr("parent", self.container_xml_id(shape.parent))
            .child(shape.geometry.to_xml())
    }

    pub fn edge_xml(&self, id: EdgeId) -> XmlElement {
        let edge = self.edge(id);
        XmlElement::new("mxCell")
            .attr("id", edge.xml_id.clone())
            .attr("style", edge.style.to_style_string())
            .attr("edge", "1")
            .attr("parent", self.container_xml_id(edge.parent))
            .attr("source", self.container_xml_id(edge.source))
            .attr("target", self.container_xml_id(edge.target))
            .attr_opt("value", edge.label.clone())
            .child(edge.geometry.to_xml())
    }

    pub fn page_xml(&self, id: PageId) -> XmlElement {
        let page = self.page(id);
        let mut root = XmlElement::new("root")
            .child(XmlElement::new("mxCell").attr("id", "0"))
            .child(XmlElement::new("mxCell").attr("id", "1").attr("parent", "0"));
        for cell in &page.cells {
            root.push_child(match *cell {
                CellId::Shape(shape) => self.shape_xml(shape),
                CellId::Edge(edge) => self.edge_xml(edge),
            });
        }
        XmlElement::new("diagram")
            .attr("name", page.name())
            .attr("id", page.xml_id.clone())
            .child(page.canvas.to_xml().child(root))
    }

    pub fn to_xml_element(&self) -> XmlElement {
        let meta = &self.metadata;
        let mut doc = XmlElement::new("mxfile")
            .attr("host", meta.host.clone())
            .attr("modified", meta.modified.clone())
            .attr("agent", meta.agent.clone())
            .attr_opt("etag", meta.etag.clone())
            .attr("version", meta.version.clone())
            .attr("type", meta.doc_type.clone());
        for page in &self.pages {
            doc.push_child(self.page_xml(*page));
        }
        doc
    }

    /// The complete document, two-space indented.
    pub fn to_xml(&self) -> String {
        self.to_xml_element().to_xml_string()
    }

    /// Writes the document and returns the full path. `modified` is refreshed first.
    pub fn write(&mut self, options: &WriteOptions) -> Result<PathBuf> {
        let directory = options.directory.clone().unwrap_or_else(default_directory);
        let file_name = options.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME);
        let path = directory.join(file_name);

        std::fs::create_dir_all(&directory).map_err(|source| io_error(&directory, source))?;
        self.metadata.modified = now_stamp();
        let xml = self.to_xml();

        let mut open = OpenOptions::new();
        open.write(true);
        if options.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        let mut out = open.open(&path).map_err(|source| io_error(&path, source))?;
        out.write_all(xml.as_bytes())
            .map_err(|source| io_error(&path, source))?;
        tracing::debug!(path = %path.display(), pages = self.pages.len(), "wrote drawio file");
        Ok(path)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn union(a: &Box2D, b: &Box2D) -> Box2D {
    Box2D::new(a.min.min(b.min), a.max.max(b.max))
}

fn encloses(outer: &Box2D, inner: &Box2D) -> bool {
    outer.min.x <= inner.min.x
        && outer.min.y <= inner.min.y
        && outer.max.x >= inner.max.x
        && outer.max.y >= inner.max.y
}
