use mxdraw_core::geometry::{Box2D, Point, Vector, vector};
use mxdraw_core::{File, Result, ShapeId};

/// A set of shapes moved together.
///
/// Membership is bookkeeping only: the shapes keep their pages and containers. Moving a group
/// shifts every member whose container is not itself a member, so nested members follow their
/// container instead of being shifted twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    shapes: Vec<ShapeId>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, shape: ShapeId) {
        if !self.shapes.contains(&shape) {
            self.shapes.push(shape);
        }
    }

    pub fn extend(&mut self, shapes: impl IntoIterator<Item = ShapeId>) {
        for shape in shapes {
            self.add(shape);
        }
    }

    pub fn remove(&mut self, shape: ShapeId) -> bool {
        let before = self.shapes.len();
        self.shapes.retain(|s| *s != shape);
        self.shapes.len() != before
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn shapes(&self) -> &[ShapeId] {
        &self.shapes
    }

    pub fn contains(&self, shape: ShapeId) -> bool {
        self.shapes.contains(&shape)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Union of the members' absolute boxes, `None` for an empty group.
    pub fn bounding_box(&self, file: &File) -> Option<Box2D> {
        self.shapes
            .iter()
            .map(|id| file.shape_bounds(*id))
            .reduce(|acc, b| Box2D::new(acc.min.min(b.min), acc.max.max(b.max)))
    }

    pub fn position(&self, file: &File) -> Option<Point> {
        self.bounding_box(file).map(|b| b.min)
    }

    pub fn center(&self, file: &File) -> Option<Point> {
        self.bounding_box(file).map(|b| b.center())
    }

    pub fn move_by(&self, file: &mut File, delta: Vector) -> Result<()> {
        if delta == Vector::zero() {
            return Ok(());
        }
        let movers: Vec<ShapeId> = self
            .shapes
            .iter()
            .copied()
            .filter(|id| !self.has_member_ancestor(file, *id))
            .collect();
        for id in movers {
            let target = file.shape_position(id) + delta;
            file.shape_mut(id).set_position(target.x, target.y)?;
        }
        Ok(())
    }

    /// Moves the group so its bounding box starts at `(x, y)`.
    pub fn move_to(&self, file: &mut File, x: f64, y: f64) -> Result<()> {
        let Some(origin) = self.position(file) else {
            return Ok(());
        };
        self.move_by(file, vector(x - origin.x, y - origin.y))
    }

    /// Moves the group so its bounding box is centered on `(x, y)`.
    pub fn center_on(&self, file: &mut File, x: f64, y: f64) -> Result<()> {
        let Some(center) = self.center(file) else {
            return Ok(());
        };
        self.move_by(file, vector(x - center.x, y - center.y))
    }

    fn has_member_ancestor(&self, file: &File, id: ShapeId) -> bool {
        let mut cursor = file.shape(id).parent();
        while let Some(parent) = cursor {
            if self.contains(parent) {
                return true;
            }
            cursor = file.shape(parent).parent();
        }
        false
    }
}

impl FromIterator<ShapeId> for Group {
    fn from_iter<I: IntoIterator<Item = ShapeId>>(iter: I) -> Self {
        let mut group = Self::new();
        group.extend(iter);
        group
    }
}
