//! Tree diagrams.
//!
//! Nodes are ordinary page-level shapes; the tree structure (parent links, child order) lives in
//! the [`TreeDiagram`] and is drawn as one edge per parent/child pair. [`TreeDiagram::auto_layout`]
//! places leaves in consecutive slots along the item axis and centers every parent over its
//! children, one band per level along the level axis.

use crate::group::Group;
use indexmap::IndexMap;
use mxdraw_core::geometry::{Point, point};
use mxdraw_core::{
    ConnectionPoint, EdgeId, EdgeOptions, EdgeStyle, Error, File, Number, PageId, Result,
    ShapeId, ShapeOptions, Waypoints,
};
use std::fmt;
use std::str::FromStr;

/// Where children are placed relative to their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeDirection {
    #[default]
    Down,
    Up,
    Left,
    Right,
}

impl TreeDirection {
    pub const ALL: [Self; 4] = [Self::Down, Self::Up, Self::Left, Self::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Self::Down | Self::Up)
    }

    fn is_mirrored(self) -> bool {
        matches!(self, Self::Up | Self::Left)
    }

    /// `(exit, entry)` anchors of a parent→child link.
    fn anchors(self) -> ((Number, Number), (Number, Number)) {
        let half = Number::Float(0.5);
        let (zero, one) = (Number::Int(0), Number::Int(1));
        match self {
            Self::Down => ((half, one), (half, zero)),
            Self::Up => ((half, zero), (half, one)),
            Self::Right => ((one, half), (zero, half)),
            Self::Left => ((zero, half), (one, half)),
        }
    }
}

impl FromStr for TreeDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| Error::InvalidEnumeration {
                kind: "tree direction",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TreeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing of the parent→child links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    #[default]
    Orthogonal,
    Straight,
    Curved,
}

impl LinkStyle {
    pub const ALL: [Self; 3] = [Self::Orthogonal, Self::Straight, Self::Curved];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
            Self::Straight => "straight",
            Self::Curved => "curved",
        }
    }

    pub fn waypoints(self) -> Waypoints {
        match self {
            Self::Orthogonal => Waypoints::Orthogonal,
            Self::Straight => Waypoints::Straight,
            Self::Curved => Waypoints::Curved,
        }
    }
}

impl FromStr for LinkStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| Error::InvalidEnumeration {
                kind: "link style",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for LinkStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeOptions {
    pub direction: TreeDirection,
    pub link_style: LinkStyle,
    /// Gap between consecutive levels.
    pub level_spacing: f64,
    /// Gap between neighbouring subtrees on the same level.
    pub item_spacing: f64,
    /// Inset of the laid out tree from `origin`.
    pub padding: f64,
    pub origin: Point,
    pub node_width: f64,
    pub node_height: f64,
    /// Style string applied to every new node on top of the basic shape style.
    pub node_style: Option<String>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            direction: TreeDirection::Down,
            link_style: LinkStyle::Orthogonal,
            level_spacing: 60.0,
            item_spacing: 15.0,
            padding: 10.0,
            origin: point(0.0, 0.0),
            node_width: 120.0,
            node_height: 60.0,
            node_style: None,
        }
    }
}

/// A node's place in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    shape: ShapeId,
    parent: Option<ShapeId>,
    children: Vec<ShapeId>,
    link: Option<EdgeId>,
}

impl TreeNode {
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    pub fn children(&self) -> &[ShapeId] {
        &self.children
    }

    /// The edge from the parent to this node.
    pub fn link(&self) -> Option<EdgeId> {
        self.link
    }
}

#[derive(Debug, Clone)]
pub struct TreeDiagram {
    page: PageId,
    options: TreeOptions,
    nodes: IndexMap<ShapeId, TreeNode>,
    max_children: Option<usize>,
    group: Group,
}

impl TreeDiagram {
    pub fn new(page: PageId, options: TreeOptions) -> Self {
        Self {
            page,
            options,
            nodes: IndexMap::new(),
            max_children: None,
            group: Group::new(),
        }
    }

    fn with_max_children(page: PageId, options: TreeOptions, max_children: usize) -> Self {
        Self {
            max_children: Some(max_children),
            ..Self::new(page, options)
        }
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Every node shape. Links are not members.
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes.values()
    }

    pub fn node(&self, shape: ShapeId) -> Option<&TreeNode> {
        self.nodes.get(&shape)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.nodes
            .values()
            .filter(|n| n.parent.is_none())
            .map(|n| n.shape)
    }

    pub fn links(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.nodes.values().filter_map(|n| n.link)
    }

    /// Creates a node shape on the tree's page, linked under `parent` when given.
    pub fn add_node(
        &mut self,
        file: &mut File,
        value: impl Into<String>,
        parent: Option<ShapeId>,
    ) -> Result<ShapeId> {
        self.insert_node(file, value.into(), parent, None)
    }

    fn insert_node(
        &mut self,
        file: &mut File,
        value: String,
        parent: Option<ShapeId>,
        position: Option<usize>,
    ) -> Result<ShapeId> {
        if let Some(parent) = parent {
            self.check_capacity(parent)?;
        }
        let mut options = ShapeOptions::new(value)
            .with_size(self.options.node_width, self.options.node_height)
            .on_page(self.page);
        options.style_string = self.options.node_style.clone();
        let shape = file.add_shape(options)?;
        self.nodes.insert(
            shape,
            TreeNode {
                shape,
                parent: None,
                children: Vec::new(),
                link: None,
            },
        );
        self.group.add(shape);
        if let Some(parent) = parent {
            self.link(file, parent, shape, position)?;
        }
        Ok(shape)
    }

    /// Moves `node` (with its subtree) under `parent`, or makes it a root with `None`.
    pub fn set_parent(
        &mut self,
        file: &mut File,
        node: ShapeId,
        parent: Option<ShapeId>,
    ) -> Result<()> {
        let current = self.require(node)?.parent;
        if current == parent {
            return Ok(());
        }
        if let Some(parent) = parent {
            self.require(parent)?;
            if parent == node || self.is_ancestor(node, parent) {
                return Err(Error::invalid_argument(format!(
                    "{parent} is inside the subtree of {node}"
                )));
            }
            self.check_capacity(parent)?;
        }
        self.unlink(file, node);
        if let Some(parent) = parent {
            self.link(file, parent, node, None)?;
        }
        Ok(())
    }

    fn require(&self, shape: ShapeId) -> Result<&TreeNode> {
        self.nodes
            .get(&shape)
            .ok_or_else(|| Error::invalid_argument(format!("{shape} is not a node of this tree")))
    }

    fn check_capacity(&self, parent: ShapeId) -> Result<()> {
        let node = self.require(parent)?;
        match self.max_children {
            Some(max) if node.children.len() >= max => Err(Error::invalid_argument(format!(
                "{parent} already has {max} children"
            ))),
            _ => Ok(()),
        }
    }

    fn is_ancestor(&self, ancestor: ShapeId, node: ShapeId) -> bool {
        let mut cursor = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    fn link(
        &mut self,
        file: &mut File,
        parent: ShapeId,
        child: ShapeId,
        position: Option<usize>,
    ) -> Result<()> {
        let edge = file.add_edge(EdgeOptions {
            style: self.link_style(),
            page: Some(self.page),
            ..EdgeOptions::between(parent, child)
        })?;
        if let Some(node) = self.nodes.get_mut(&parent) {
            match position {
                Some(index) if index <= node.children.len() => node.children.insert(index, child),
                _ => node.children.push(child),
            }
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
            node.link = Some(edge);
        }
        Ok(())
    }

    fn unlink(&mut self, file: &mut File, node: ShapeId) {
        let Some(entry) = self.nodes.get_mut(&node) else {
            return;
        };
        let parent = entry.parent.take();
        let link = entry.link.take();
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
        if let Some(link) = link {
            file.edge_mut(link).remove();
        }
    }

    fn link_style(&self) -> EdgeStyle {
        let ((exit_x, exit_y), (entry_x, entry_y)) = self.options.direction.anchors();
        EdgeStyle {
            waypoints: self.options.link_style.waypoints(),
            exit: ConnectionPoint {
                x: Some(exit_x),
                y: Some(exit_y),
                ..ConnectionPoint::default()
            },
            entry: ConnectionPoint {
                x: Some(entry_x),
                y: Some(entry_y),
                ..ConnectionPoint::default()
            },
            ..EdgeStyle::default()
        }
    }

    fn item_extent(&self, file: &File, shape: ShapeId) -> f64 {
        let shape = file.shape(shape);
        if self.options.direction.is_vertical() {
            shape.width()
        } else {
            shape.height()
        }
    }

    fn depth_extent(&self, file: &File, shape: ShapeId) -> f64 {
        let shape = file.shape(shape);
        if self.options.direction.is_vertical() {
            shape.height()
        } else {
            shape.width()
        }
    }

    /// Positions every node. Roots are laid out side by side in creation order.
    pub fn auto_layout(&self, file: &mut File) -> Result<()> {
        let roots: Vec<ShapeId> = self.roots().collect();
        if roots.is_empty() {
            return Ok(());
        }
        let options = &self.options;

        let mut levels: IndexMap<ShapeId, usize> = IndexMap::new();
        let mut stack: Vec<(ShapeId, usize)> = roots.iter().rev().map(|r| (*r, 0)).collect();
        while let Some((node, level)) = stack.pop() {
            levels.insert(node, level);
            for child in self.nodes[&node].children.iter().rev() {
                stack.push((*child, level + 1));
            }
        }

        let depth = levels.values().copied().max().unwrap_or(0) + 1;
        let mut bands = vec![0.0_f64; depth];
        for (node, level) in &levels {
            bands[*level] = bands[*level].max(self.depth_extent(file, *node));
        }
        let mut offsets = Vec::with_capacity(depth);
        let mut next = options.padding;
        for band in &bands {
            offsets.push(next);
            next += band + options.level_spacing;
        }
        let total = offsets[depth - 1] + bands[depth - 1];

        let mut items: IndexMap<ShapeId, f64> = IndexMap::new();
        let mut cursor = options.padding;
        for root in &roots {
            self.place(file, *root, &mut cursor, &mut items);
        }

        for (node, item) in &items {
            let level = levels[node];
            let extent = self.depth_extent(file, *node);
            let mut along = offsets[level] + (bands[level] - extent) / 2.0;
            if options.direction.is_mirrored() {
                along = total + options.padding - along - extent;
            }
            let (x, y) = if options.direction.is_vertical() {
                (*item, along)
            } else {
                (along, *item)
            };
            file.shape_mut(*node)
                .set_position(options.origin.x + x, options.origin.y + y)?;
        }
        tracing::debug!(
            nodes = items.len(),
            levels = depth,
            direction = %options.direction,
            "laid out tree"
        );
        Ok(())
    }

    /// Assigns item-axis starts to the subtree of `node`, advancing `cursor` past it.
    fn place(
        &self,
        file: &File,
        node: ShapeId,
        cursor: &mut f64,
        items: &mut IndexMap<ShapeId, f64>,
    ) {
        let spacing = self.options.item_spacing;
        let extent = self.item_extent(file, node);
        let children = &self.nodes[&node].children;
        if children.is_empty() {
            items.insert(node, *cursor);
            *cursor += extent + spacing;
            return;
        }

        let subtree_start = *cursor;
        let first_placed = items.len();
        for child in children {
            self.place(file, *child, cursor, items);
        }
        let center_of = |id: &ShapeId| items[id] + self.item_extent(file, *id) / 2.0;
        let first = center_of(&children[0]);
        let last = center_of(&children[children.len() - 1]);
        let mut start = (first + last) / 2.0 - extent / 2.0;
        if start < subtree_start {
            let shift = subtree_start - start;
            for (_, item) in items.iter_mut().skip(first_placed) {
                *item += shift;
            }
            *cursor += shift;
            start = subtree_start;
        }
        items.insert(node, start);
        *cursor = cursor.max(start + extent + spacing);
    }
}

/// A tree whose nodes hold at most a left and a right child.
#[derive(Debug, Clone)]
pub struct BinaryTree {
    tree: TreeDiagram,
    slots: IndexMap<ShapeId, [Option<ShapeId>; 2]>,
}

const LEFT: usize = 0;
const RIGHT: usize = 1;

impl BinaryTree {
    pub fn new(page: PageId, options: TreeOptions) -> Self {
        Self {
            tree: TreeDiagram::with_max_children(page, options, 2),
            slots: IndexMap::new(),
        }
    }

    pub fn tree(&self) -> &TreeDiagram {
        &self.tree
    }

    pub fn group(&self) -> &Group {
        self.tree.group()
    }

    pub fn add_root(&mut self, file: &mut File, value: impl Into<String>) -> Result<ShapeId> {
        let id = self.tree.insert_node(file, value.into(), None, None)?;
        self.slots.insert(id, [None, None]);
        Ok(id)
    }

    pub fn add_left(
        &mut self,
        file: &mut File,
        parent: ShapeId,
        value: impl Into<String>,
    ) -> Result<ShapeId> {
        self.add_in_slot(file, parent, value.into(), LEFT)
    }

    pub fn add_right(
        &mut self,
        file: &mut File,
        parent: ShapeId,
        value: impl Into<String>,
    ) -> Result<ShapeId> {
        self.add_in_slot(file, parent, value.into(), RIGHT)
    }

    /// Fills the left slot, then the right one. A third child is an error.
    pub fn add_child(
        &mut self,
        file: &mut File,
        parent: ShapeId,
        value: impl Into<String>,
    ) -> Result<ShapeId> {
        let slots = self.slots_of(parent)?;
        match slots.iter().position(Option::is_none) {
            Some(slot) => self.add_in_slot(file, parent, value.into(), slot),
            None => Err(Error::invalid_argument(format!(
                "binary tree node {parent} already has two children"
            ))),
        }
    }

    pub fn left(&self, node: ShapeId) -> Option<ShapeId> {
        self.slots.get(&node).and_then(|s| s[LEFT])
    }

    pub fn right(&self, node: ShapeId) -> Option<ShapeId> {
        self.slots.get(&node).and_then(|s| s[RIGHT])
    }

    pub fn auto_layout(&self, file: &mut File) -> Result<()> {
        self.tree.auto_layout(file)
    }

    fn slots_of(&self, parent: ShapeId) -> Result<[Option<ShapeId>; 2]> {
        self.slots.get(&parent).copied().ok_or_else(|| {
            Error::invalid_argument(format!("{parent} is not a node of this tree"))
        })
    }

    fn add_in_slot(
        &mut self,
        file: &mut File,
        parent: ShapeId,
        value: String,
        slot: usize,
    ) -> Result<ShapeId> {
        let slots = self.slots_of(parent)?;
        if slots[slot].is_some() {
            let side = if slot == LEFT { "left" } else { "right" };
            return Err(Error::invalid_argument(format!(
                "{side} child of {parent} is already set"
            )));
        }
        let position = if slot == LEFT { 0 } else { 1 };
        let id = self
            .tree
            .insert_node(file, value, Some(parent), Some(position))?;
        self.slots.insert(id, [None, None]);
        if let Some(entry) = self.slots.get_mut(&parent) {
            entry[slot] = Some(id);
        }
        Ok(id)
    }
}
