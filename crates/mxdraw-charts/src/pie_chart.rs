use crate::data::{Series, add_text, collect_series, color_at, default_palette};
use crate::group::Group;
use crate::legend::{Legend, LegendOptions};
use mxdraw_core::geometry::{Point, point, vector};
use mxdraw_core::xml::fmt_number;
use mxdraw_core::{Color, Error, File, PageId, Result, ShapeId, ShapeOptions};
use std::f64::consts::TAU;

#[derive(Debug, Clone, PartialEq)]
pub struct PieChartOptions {
    /// Top-left corner of the chart.
    pub position: Point,
    /// Diameter.
    pub size: f64,
    /// Draws ring segments instead of wedges.
    pub donut: bool,
    /// Ring thickness as a fraction of the radius, `(0, 1]`.
    pub arc_width: f64,
    /// Slice fills, cycled.
    pub colors: Vec<Color>,
    pub title: Option<String>,
    /// Percentage text on each slice.
    pub show_labels: bool,
    pub show_legend: bool,
    /// Placed to the right of the pie; `position` is ignored.
    pub legend: LegendOptions,
    pub label_height: f64,
}

impl Default for PieChartOptions {
    fn default() -> Self {
        Self {
            position: point(0.0, 0.0),
            size: 200.0,
            donut: false,
            arc_width: 0.5,
            colors: default_palette(),
            title: None,
            show_labels: true,
            show_legend: true,
            legend: LegendOptions::default(),
            label_height: 20.0,
        }
    }
}

/// Pie or donut chart. Every slice is a full-size `mxgraph.basic.pie` (or `partConcEllipse`)
/// shape on the same box, cut by `startAngle` / `endAngle` given as fractions of a turn
/// clockwise from twelve o'clock.
#[derive(Debug, Clone)]
pub struct PieChart {
    page: PageId,
    options: PieChartOptions,
    data: Series,
    slices: Vec<ShapeId>,
    labels: Vec<ShapeId>,
    title: Option<ShapeId>,
    legend: Option<Legend>,
    group: Group,
}

impl PieChart {
    /// Values must be finite, non-negative and not all zero.
    pub fn new<K: Into<String>>(
        file: &mut File,
        page: PageId,
        data: impl IntoIterator<Item = (K, f64)>,
        options: PieChartOptions,
    ) -> Result<Self> {
        if options.donut && !(options.arc_width > 0.0 && options.arc_width <= 1.0) {
            return Err(Error::invalid_argument(format!(
                "donut arc width must be within (0, 1], got {}",
                options.arc_width
            )));
        }
        let data = pie_series(data)?;
        let mut chart = Self {
            page,
            options,
            data,
            slices: Vec::new(),
            labels: Vec::new(),
            title: None,
            legend: None,
            group: Group::new(),
        };
        chart.build(file)?;
        Ok(chart)
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn options(&self) -> &PieChartOptions {
        &self.options
    }

    pub fn data(&self) -> &Series {
        &self.data
    }

    /// Slice shapes in data order. Zero values have no slice.
    pub fn slices(&self) -> &[ShapeId] {
        &self.slices
    }

    pub fn labels(&self) -> &[ShapeId] {
        &self.labels
    }

    pub fn title(&self) -> Option<ShapeId> {
        self.title
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    /// Every shape of the chart, legend included.
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Replaces the data and redraws. Invalid data leaves the chart as it was.
    pub fn update_data<K: Into<String>>(
        &mut self,
        file: &mut File,
        data: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<()> {
        let data = pie_series(data)?;
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
        self.slices.clear();
        self.labels.clear();
        self.title = None;
        self.legend = None;
        self.group.clear();

        let opts = &self.options;
        let origin = opts.position;
        let total: f64 = self.data.values().sum();

        let mut top = origin.y;
        if let Some(title) = &opts.title {
            let (width, height) = (opts.size, opts.label_height);
            let id = add_text(file, self.page, title.clone(), origin, width, height)?;
            file.shape_mut(id).style_mut().text_format.set_bold(true);
            self.title = Some(id);
            top += opts.label_height;
        }

        let radius = opts.size / 2.0;
        let center = point(origin.x + radius, top + radius);
        let label_radius = if opts.donut {
            radius * (1.0 - opts.arc_width / 2.0)
        } else {
            radius * 0.65
        };
        let object = if opts.donut { "donut" } else { "pie" };

        let mut swatches = Vec::with_capacity(self.data.len());
        let mut done = 0.0;
        for (i, (label, value)) in self.data.iter().enumerate() {
            let color = color_at(&opts.colors, i);
            swatches.push((label.clone(), color.clone()));
            if *value == 0.0 {
                tracing::trace!(label = %label, "skipping empty pie slice");
                continue;
            }
            let start = done / total;
            done += value;
            let end = done / total;

            let mut style = format!(
                "startAngle={};endAngle={};",
                fmt_number(start),
                fmt_number(end)
            );
            if opts.donut {
                style.push_str(&format!("arcWidth={};", fmt_number(opts.arc_width)));
            }
            let slice = file.add_shape(
                ShapeOptions::new("")
                    .from_library("infographics", object)
                    .with_style(style)
                    .at(origin.x, top)
                    .with_size(opts.size, opts.size)
                    .on_page(self.page),
            )?;
            file.shape_mut(slice).style_mut().fill_color = Some(color);
            self.slices.push(slice);

            if opts.show_labels {
                let angle = (start + end) / 2.0 * TAU;
                let (w, h) = (40.0, opts.label_height);
                let at = point(
                    center.x + label_radius * angle.sin() - w / 2.0,
                    center.y - label_radius * angle.cos() - h / 2.0,
                );
                let text = format!("{}%", fmt_number((value / total * 100.0).round()));
                let id = add_text(file, self.page, text, at, w, h)?;
                self.labels.push(id);
            }
        }

        if opts.show_legend && !swatches.is_empty() {
            let legend_options = LegendOptions {
                position: point(origin.x + opts.size + 20.0, top),
                ..opts.legend.clone()
            };
            self.legend = Some(Legend::new(file, self.page, swatches, &legend_options)?);
        }

        self.group.extend(self.title);
        self.group.extend(self.slices.iter().copied());
        self.group.extend(self.labels.iter().copied());
        if let Some(legend) = &self.legend {
            self.group.extend(legend.group().shapes().iter().copied());
        }
        tracing::debug!(slices = self.slices.len(), total, "built pie chart");
        Ok(())
    }
}

fn pie_series<K: Into<String>>(data: impl IntoIterator<Item = (K, f64)>) -> Result<Series> {
    let data = collect_series("pie chart", data)?;
    if !data.is_empty() && data.values().sum::<f64>() <= 0.0 {
        return Err(Error::invalid_argument("pie chart values must not all be zero"));
    }
    Ok(data)
}
