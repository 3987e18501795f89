use crate::data::{Series, add_text, collect_series, color_at, default_palette};
use crate::group::Group;
use mxdraw_core::geometry::{Point, point, vector};
use mxdraw_core::xml::fmt_number;
use mxdraw_core::{Color, File, PageId, Result, ShapeId, ShapeOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartOptions {
    /// Top-left corner of the chart.
    pub position: Point,
    pub bar_width: f64,
    pub bar_gap: f64,
    /// Height of the bar for the largest value.
    pub max_bar_height: f64,
    /// Bar fills, cycled.
    pub colors: Vec<Color>,
    pub stroke_color: Option<Color>,
    /// Value text above each bar.
    pub show_values: bool,
    /// Category text below the baseline.
    pub show_labels: bool,
    pub show_axis: bool,
    pub title: Option<String>,
    pub label_height: f64,
}

impl Default for BarChartOptions {
    fn default() -> Self {
        Self {
            position: point(0.0, 0.0),
            bar_width: 40.0,
            bar_gap: 20.0,
            max_bar_height: 200.0,
            colors: default_palette(),
            stroke_color: None,
            show_values: true,
            show_labels: true,
            show_axis: true,
            title: None,
            label_height: 20.0,
        }
    }
}

/// Vertical bars scaled so the largest value is `max_bar_height` tall.
#[derive(Debug, Clone)]
pub struct BarChart {
    page: PageId,
    options: BarChartOptions,
    data: Series,
    bars: Vec<ShapeId>,
    value_labels: Vec<ShapeId>,
    category_labels: Vec<ShapeId>,
    axis: Option<ShapeId>,
    title: Option<ShapeId>,
    group: Group,
}

impl BarChart {
    /// Values must be finite and non-negative.
    pub fn new<K: Into<String>>(
        file: &mut File,
        page: PageId,
        data: impl IntoIterator<Item = (K, f64)>,
        options: BarChartOptions,
    ) -> Result<Self> {
        let data = collect_series("bar chart", data)?;
        let mut chart = Self {
            page,
            options,
            data,
            bars: Vec::new(),
            value_labels: Vec::new(),
            category_labels: Vec::new(),
            axis: None,
            title: None,
            group: Group::new(),
        };
        chart.build(file)?;
        Ok(chart)
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn options(&self) -> &BarChartOptions {
        &self.options
    }

    pub fn data(&self) -> &Series {
        &self.data
    }

    /// Bar shapes in data order.
    pub fn bars(&self) -> &[ShapeId] {
        &self.bars
    }

    pub fn value_labels(&self) -> &[ShapeId] {
        &self.value_labels
    }

    pub fn category_labels(&self) -> &[ShapeId] {
        &self.category_labels
    }

    pub fn axis(&self) -> Option<ShapeId> {
        self.axis
    }

    pub fn title(&self) -> Option<ShapeId> {
        self.title
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Replaces the data and redraws. The previous shapes are taken off the page; invalid data
    /// leaves the chart as it was.
    pub fn update_data<K: Into<String>>(
        &mut self,
        file: &mut File,
        data: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<()> {
        let data = collect_series("bar chart", data)?;
        for shape in self.group.shapes() {
            file.remove_object(self.page, *shape);
        }
        self.data = data;
        self.build(file)
    }

    pub fn move_to(&mut self, file: &mut File, x: f64, y: f64) -> Result<()> {
        let Some(origin) = self.group.position(file) else {
            self.options.position = point(x, y);
            return Ok(());
        };
        let delta = vector(x - origin.x, y - origin.y);
        self.group.move_by(file, delta)?;
        self.options.position += delta;
        Ok(())
    }

    fn build(&mut self, file: &mut File) -> Result<()> {
        self.bars.clear();
        self.value_labels.clear();
        self.category_labels.clear();
        self.axis = None;
        self.title = None;
        self.group.clear();

        let opts = &self.options;
        let origin = opts.position;
        let count = self.data.len() as f64;
        let plot_width = (count * (opts.bar_width + opts.bar_gap) - opts.bar_gap).max(0.0);
        let max = self.data.values().copied().fold(0.0, f64::max);

        let mut top = origin.y;
        if let Some(title) = &opts.title {
            let width = plot_width.max(opts.bar_width);
            let id = add_text(file, self.page, title.clone(), origin, width, opts.label_height)?;
            file.shape_mut(id).style_mut().text_format.set_bold(true);
            self.title = Some(id);
            top += opts.label_height;
        }
        if opts.show_values {
            top += opts.label_height;
        }
        let baseline = top + opts.max_bar_height;

        for (i, (label, value)) in self.data.iter().enumerate() {
            let x = origin.x + i as f64 * (opts.bar_width + opts.bar_gap);
            let height = if max > 0.0 {
                value / max * opts.max_bar_height
            } else {
                0.0
            };
            let bar = file.add_shape(
                ShapeOptions::new("")
                    .at(x, baseline - height)
                    .with_size(opts.bar_width, height)
                    .on_page(self.page),
            )?;
            {
                let mut shape = file.shape_mut(bar);
                let style = shape.style_mut();
                style.fill_color = Some(color_at(&opts.colors, i));
                style.stroke_color = opts.stroke_color.clone();
            }
            self.bars.push(bar);

            if opts.show_values {
                let at = point(x, baseline - height - opts.label_height);
                let text = fmt_number(*value);
                let id = add_text(file, self.page, text, at, opts.bar_width, opts.label_height)?;
                self.value_labels.push(id);
            }
            if opts.show_labels {
                let at = point(x, baseline);
                let text = label.clone();
                let id = add_text(file, self.page, text, at, opts.bar_width, opts.label_height)?;
                self.category_labels.push(id);
            }
        }

        if opts.show_axis && !self.data.is_empty() {
            let axis = file.add_shape(
                ShapeOptions::new("")
                    .with_style("line;strokeWidth=2;html=1;")
                    .at(origin.x, baseline - 5.0)
                    .with_size(plot_width, 10.0)
                    .on_page(self.page),
            )?;
            self.axis = Some(axis);
        }

        self.group.extend(self.title);
        self.group.extend(self.bars.iter().copied());
        self.group.extend(self.value_labels.iter().copied());
        self.group.extend(self.category_labels.iter().copied());
        self.group.extend(self.axis);
        tracing::debug!(bars = self.bars.len(), max, "built bar chart");
        Ok(())
    }
}
