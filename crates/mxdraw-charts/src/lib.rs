#![forbid(unsafe_code)]

//! Higher-level diagram builders: trees, bar charts, pie and donut charts, legends.
//!
//! Every builder only uses the public construction API of [`mxdraw_core`]: it adds shapes and
//! edges to a page of a [`mxdraw_core::File`] and keeps their ids in a [`Group`] so the whole
//! diagram can be moved afterwards.

pub mod bar_chart;
mod data;
pub mod group;
pub mod legend;
pub mod pie_chart;
pub mod tree;

pub use bar_chart::{BarChart, BarChartOptions};
pub use data::{DEFAULT_PALETTE, Series, default_palette};
pub use group::Group;
pub use legend::{Legend, LegendOptions};
pub use pie_chart::{PieChart, PieChartOptions};
pub use tree::{BinaryTree, LinkStyle, TreeDiagram, TreeDirection, TreeNode, TreeOptions};

#[cfg(test)]
mod tests;
