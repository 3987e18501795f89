#![forbid(unsafe_code)]

//! Draw.io (mxGraph) diagram object model.
//!
//! Build pages, shapes and edges through a [`File`], serialize them to the Draw.io XML format,
//! and read existing documents back with [`import_path`] / [`import_str`].
//!
//! ```no_run
//! use mxdraw_core::{EdgeOptions, File, PageOptions, ShapeOptions, WriteOptions};
//!
//! # fn main() -> mxdraw_core::Result<()> {
//! let mut file = File::new();
//! let page = file.add_page(PageOptions::default());
//! let a = file.add_shape(ShapeOptions::new("A").on_page(page))?;
//! let b = file.add_shape(ShapeOptions::new("B").at(200.0, 0.0).on_page(page))?;
//! file.add_edge(EdgeOptions::between(a, b).with_label("go").on_page(page))?;
//! file.write(&WriteOptions::to_dir("out"))?;
//! # Ok(())
//! # }
//! ```

pub mod edge;
pub mod error;
pub mod file;
pub mod geometry;
mod id;
pub mod import;
pub mod page;
pub mod shape;
pub mod style;
pub mod xml;

pub use edge::{
    Connection, ConnectionPoint, Edge, EdgeEnd, EdgeMut, EdgeOptions, EdgeStyle, JumpStyle,
    LineEnd, Pattern, Waypoints,
};
pub use error::{Error, Result};
pub use file::{File, FileMetadata, PageRef, WriteOptions};
pub use geometry::{EdgeGeometry, ShapeGeometry};
pub use id::{CellId, EdgeId, PageId, ShapeId};
pub use import::{MatchMode, ParsedDiagram, import_path, import_str};
pub use page::{Canvas, Page, PageObject, PageOptions, PageSize};
pub use shape::{Autosize, LibraryObject, Shape, ShapeMut, ShapeOptions, ShapeStyle};
pub use style::{
    Align, Color, ColorScheme, Direction, Number, ShapeLibrary, StrokeWidth, StyleDict,
    StyleValue, TextFormat, VerticalAlign,
};

#[cfg(test)]
mod tests;
