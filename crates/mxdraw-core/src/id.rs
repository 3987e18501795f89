//! Arena handles. Entities are never freed, so an id stays valid for the life of its [`File`].
//!
//! [`File`]: crate::File

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(ShapeId, "shape");
arena_id!(EdgeId, "edge");
arena_id!(PageId, "page");

/// Any cell that lands in a page's `<root>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellId {
    Shape(ShapeId),
    Edge(EdgeId),
}

impl From<ShapeId> for CellId {
    fn from(id: ShapeId) -> Self {
        Self::Shape(id)
    }
}

impl From<EdgeId> for CellId {
    fn from(id: EdgeId) -> Self {
        Self::Edge(id)
    }
}
