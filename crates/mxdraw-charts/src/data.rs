use indexmap::IndexMap;
use mxdraw_core::geometry::Point;
use mxdraw_core::{Color, Error, File, PageId, Result, ShapeId, ShapeOptions};

/// Labelled values in display order.
pub type Series = IndexMap<String, f64>;

pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4E79A7", "#F28E2B", "#E15759", "#76B7B2", "#59A14F", "#EDC948", "#B07AA1", "#FF9DA7",
];

pub fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE
        .iter()
        .map(|hex| Color::Hex((*hex).to_string()))
        .collect()
}

/// Collects `data` and rejects values a chart cannot draw.
pub(crate) fn collect_series<K: Into<String>>(
    chart: &str,
    data: impl IntoIterator<Item = (K, f64)>,
) -> Result<Series> {
    let mut series = Series::new();
    for (label, value) in data {
        let label = label.into();
        if !value.is_finite() || value < 0.0 {
            return Err(Error::invalid_argument(format!(
                "{chart} values must be finite and non-negative, got {value} for {label:?}"
            )));
        }
        series.insert(label, value);
    }
    Ok(series)
}

/// Cycles through `palette`, falling back to the default one when it is empty.
pub(crate) fn color_at(palette: &[Color], index: usize) -> Color {
    if palette.is_empty() {
        return Color::Hex(DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()].to_string());
    }
    palette[index % palette.len()].clone()
}

/// A borderless text label from the general catalog.
pub(crate) fn add_text(
    file: &mut File,
    page: PageId,
    text: impl Into<String>,
    origin: Point,
    width: f64,
    height: f64,
) -> Result<ShapeId> {
    file.add_shape(
        ShapeOptions::new(text)
            .from_library("general", "text")
            .at(origin.x, origin.y)
            .with_size(width, height)
            .on_page(page),
    )
}
