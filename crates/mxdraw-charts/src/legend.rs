use crate::data::add_text;
use crate::group::Group;
use indexmap::IndexMap;
use mxdraw_core::geometry::{Point, point};
use mxdraw_core::{Align, Color, File, PageId, Result, ShapeId, ShapeOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct LegendOptions {
    /// Top-left corner of the first row.
    pub position: Point,
    pub swatch_size: f64,
    /// Vertical gap between rows.
    pub row_spacing: f64,
    /// Gap between a swatch and its label.
    pub label_gap: f64,
    pub label_width: f64,
    pub title: Option<String>,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            position: point(0.0, 0.0),
            swatch_size: 16.0,
            row_spacing: 8.0,
            label_gap: 8.0,
            label_width: 120.0,
            title: None,
        }
    }
}

/// Colored swatches with a text label each, one row per entry.
#[derive(Debug, Clone)]
pub struct Legend {
    entries: IndexMap<String, Color>,
    title: Option<ShapeId>,
    rows: Vec<(ShapeId, ShapeId)>,
    group: Group,
}

impl Legend {
    pub fn new<K: Into<String>>(
        file: &mut File,
        page: PageId,
        entries: impl IntoIterator<Item = (K, Color)>,
        options: &LegendOptions,
    ) -> Result<Self> {
        let entries: IndexMap<String, Color> =
            entries.into_iter().map(|(k, c)| (k.into(), c)).collect();
        let mut legend = Self {
            entries: IndexMap::new(),
            title: None,
            rows: Vec::new(),
            group: Group::new(),
        };

        let size = options.swatch_size;
        let row_width = size + options.label_gap + options.label_width;
        let mut y = options.position.y;
        if let Some(title) = &options.title {
            let origin = point(options.position.x, y);
            let id = add_text(file, page, title.clone(), origin, row_width, size)?;
            let mut shape = file.shape_mut(id);
            let style = shape.style_mut();
            style.text_format.set_bold(true);
            style.text_format.align = Some(Align::Left);
            legend.title = Some(id);
            legend.group.add(id);
            y += size + options.row_spacing;
        }

        for (label, color) in &entries {
            let swatch = file.add_shape(
                ShapeOptions::new("")
                    .at(options.position.x, y)
                    .with_size(size, size)
                    .on_page(page),
            )?;
            file.shape_mut(swatch).style_mut().fill_color = Some(color.clone());
            let text = add_text(
                file,
                page,
                label.clone(),
                point(options.position.x + size + options.label_gap, y),
                options.label_width,
                size,
            )?;
            file.shape_mut(text).style_mut().text_format.align = Some(Align::Left);
            legend.rows.push((swatch, text));
            legend.group.extend([swatch, text]);
            y += size + options.row_spacing;
        }
        legend.entries = entries;
        Ok(legend)
    }

    pub fn entries(&self) -> &IndexMap<String, Color> {
        &self.entries
    }

    /// `(swatch, label)` shape pairs in entry order.
    pub fn rows(&self) -> &[(ShapeId, ShapeId)] {
        &self.rows
    }

    pub fn title(&self) -> Option<ShapeId> {
        self.title
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn move_to(&self, file: &mut File, x: f64, y: f64) -> Result<()> {
        self.group.move_to(file, x, y)
    }
}
