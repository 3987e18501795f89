use crate::error::Result;
use crate::file::File;
use crate::geometry::{EdgeGeometry, Point, point};
use crate::id::{EdgeId, PageId, ShapeId};
use crate::style::library::{self, ShapeLibrary};
use crate::style::{
    Applied, Color, ColorScheme, Number, StrokeWidth, StyleDict, StyleTarget, StyleValue,
    TextFormat, push_bool, push_display, push_number, set_bool, set_color, set_number,
    set_percent, style_token_enum,
};
use indexmap::IndexMap;
use std::str::FromStr;

style_token_enum! {
    /// Routing mode (`edgeStyle` and friends).
    Waypoints, "waypoints" {
        Straight => "straight",
        Orthogonal => "orthogonal",
        Vertical => "vertical",
        Horizontal => "horizontal",
        Isometric => "isometric",
        IsometricVertical => "isometric_vertical",
        Curved => "curved",
        EntityRelation => "entity_relation",
    }
}

style_token_enum! {
    /// How the line itself is drawn.
    Connection, "connection" {
        Line => "line",
        Link => "link",
        Arrow => "arrow",
        SimpleArrow => "simple_arrow",
    }
}

style_token_enum! {
    Pattern, "pattern" {
        Solid => "solid",
        DashedSmall => "dashed_small",
        DashedMedium => "dashed_medium",
        DashedLarge => "dashed_large",
        DottedSmall => "dotted_small",
        DottedMedium => "dotted_medium",
        DottedLarge => "dotted_large",
    }
}

style_token_enum! {
    /// Line crossing style.
    JumpStyle, "jump style" {
        Arc => "arc",
        Gap => "gap",
        Sharp => "sharp",
        Line => "line",
    }
}

style_token_enum! {
    /// Endpoint marker (`startArrow` / `endArrow`).
    LineEnd, "line end" {
        None => "none",
        Classic => "classic",
        ClassicThin => "classicThin",
        Open => "open",
        OpenThin => "openThin",
        OpenAsync => "openAsync",
        Block => "block",
        BlockThin => "blockThin",
        Async => "async",
        Oval => "oval",
        Diamond => "diamond",
        DiamondThin => "diamondThin",
        DoubleBlock => "doubleBlock",
        Box => "box",
        HalfCircle => "halfCircle",
        Dash => "dash",
        Cross => "cross",
        CirclePlus => "circlePlus",
        Circle => "circle",
        BaseDash => "baseDash",
        ErOne => "ERone",
        ErMandOne => "ERmandOne",
        ErMany => "ERmany",
        ErOneToMany => "ERoneToMany",
        ErZeroToOne => "ERzeroToOne",
        ErZeroToMany => "ERzeroToMany",
    }
}

impl LineEnd {
    /// Whether `startFill` / `endFill` means anything for this marker.
    pub fn is_fillable(self) -> bool {
        library::edge_styles().is_fillable(self.as_str())
    }
}

/// A marker at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeEnd {
    pub line_end: LineEnd,
    pub fill: Option<bool>,
    pub size: Option<Number>,
}

impl EdgeEnd {
    pub fn new(line_end: LineEnd) -> Self {
        Self {
            line_end,
            fill: None,
            size: None,
        }
    }

    pub fn filled(mut self, fill: bool) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// Where an edge leaves or enters a shape, as fractions of its box plus pixel offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectionPoint {
    pub x: Option<Number>,
    pub y: Option<Number>,
    pub dx: Option<Number>,
    pub dy: Option<Number>,
}

/// Keys whose meaning is owned by the `waypoints` / `connection` / `pattern` catalogs.
const WAYPOINT_KEYS: &[&str] = &["edgeStyle", "elbow", "curved"];
const CONNECTION_KEYS: &[&str] = &["shape"];
const PATTERN_KEYS: &[&str] = &["dashed", "dashPattern"];

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub base_style: Option<String>,
    pub waypoints: Waypoints,
    pub connection: Connection,
    pub pattern: Pattern,
    pub rounded: Option<bool>,
    pub html: Option<bool>,
    pub end: Option<EdgeEnd>,
    pub start: Option<EdgeEnd>,
    pub exit: ConnectionPoint,
    pub entry: ConnectionPoint,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<StrokeWidth>,
    pub fill_color: Option<Color>,
    pub jump_style: Option<JumpStyle>,
    pub jump_size: Option<Number>,
    pub shadow: Option<bool>,
    pub sketch: Option<bool>,
    pub comic: Option<bool>,
    pub opacity: Option<u8>,
    pub flow_animation: Option<bool>,
    pub text_format: TextFormat,
    pub color_scheme: Option<ColorScheme>,
    pub extra: IndexMap<String, StyleValue>,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            base_style: None,
            waypoints: Waypoints::Orthogonal,
            connection: Connection::Line,
            pattern: Pattern::Solid,
            rounded: Some(false),
            html: Some(true),
            end: None,
            start: None,
            exit: ConnectionPoint::default(),
            entry: ConnectionPoint::default(),
            stroke_color: None,
            stroke_width: None,
            fill_color: None,
            jump_style: None,
            jump_size: None,
            shadow: None,
            sketch: None,
            comic: None,
            opacity: None,
            flow_animation: None,
            text_format: TextFormat::default(),
            color_scheme: None,
            extra: IndexMap::new(),
        }
    }
}

impl EdgeStyle {
    /// A style with no typed attributes set and plain straight solid routing, which is what an
    /// edge without any style string means to Draw.io.
    pub fn plain() -> Self {
        Self {
            waypoints: Waypoints::Straight,
            rounded: None,
            html: None,
            ..Self::default()
        }
    }

    /// Sets the routing mode by token name. Unknown names leave the style untouched.
    pub fn set_waypoints_by_name(&mut self, name: &str) -> Result<()> {
        self.waypoints = name.parse()?;
        self.clear_family_extras(WAYPOINT_KEYS);
        Ok(())
    }

    pub fn set_connection_by_name(&mut self, name: &str) -> Result<()> {
        self.connection = name.parse()?;
        self.clear_family_extras(CONNECTION_KEYS);
        Ok(())
    }

    pub fn set_pattern_by_name(&mut self, name: &str) -> Result<()> {
        self.pattern = name.parse()?;
        self.clear_family_extras(PATTERN_KEYS);
        Ok(())
    }

    fn clear_family_extras(&mut self, family_keys: &[&str]) {
        self.extra.retain(|k, _| !family_keys.contains(&k.as_str()));
    }

    pub fn set_stroke_color(&mut self, color: &str) -> Result<()> {
        self.stroke_color = Some(color.parse()?);
        Ok(())
    }

    pub fn set_stroke_width(&mut self, width: i64) {
        self.stroke_width = Some(StrokeWidth::new(width));
    }

    /// Decodes `style` and routes catalog keys back to the closest tokens. Everything else
    /// follows the shape rules: typed slots first, extension map otherwise.
    pub fn apply_style_string(&mut self, style: &str) {
        self.apply_attribute_dict(&StyleDict::parse(style));
    }

    pub fn apply_attribute_dict(&mut self, dict: &StyleDict) {
        let catalog = library::edge_styles();
        let mut rest = dict.clone();
        if let Some(w) = infer_token::<Waypoints>(&catalog.waypoints, WAYPOINT_KEYS, &mut rest) {
            self.waypoints = w;
            self.clear_family_extras(WAYPOINT_KEYS);
        }
        if let Some(c) =
            infer_token::<Connection>(&catalog.connection, CONNECTION_KEYS, &mut rest)
        {
            self.connection = c;
            self.clear_family_extras(CONNECTION_KEYS);
        }
        if let Some(p) = infer_token::<Pattern>(&catalog.pattern, PATTERN_KEYS, &mut rest) {
            self.pattern = p;
            self.clear_family_extras(PATTERN_KEYS);
        }
        self.apply_dict(&rest);
    }

    pub fn to_dict(&self) -> StyleDict {
        let catalog = library::edge_styles();
        let scheme = self.color_scheme.as_ref();
        let mut dict = StyleDict::new();
        dict.set_base_style(self.base_style.clone());
        for (fragments, token) in [
            (&catalog.connection, self.connection.as_str()),
            (&catalog.waypoints, self.waypoints.as_str()),
            (&catalog.pattern, self.pattern.as_str()),
        ] {
            if let Some(fragment) = fragments.get(token) {
                dict.overlay(fragment);
            }
        }
        push_bool(&mut dict, "rounded", self.rounded);
        push_bool(&mut dict, "html", self.html);
        write_end(&mut dict, "end", self.end);
        write_end(&mut dict, "start", self.start);
        write_connection_point(&mut dict, "exit", &self.exit);
        write_connection_point(&mut dict, "entry", &self.entry);
        push_display(
            &mut dict,
            "strokeColor",
            self.stroke_color
                .as_ref()
                .or(scheme.and_then(|s| s.stroke_color.as_ref())),
        );
        dict.insert_opt("strokeWidth", self.stroke_width.map(|w| i64::from(w.get())));
        push_display(
            &mut dict,
            "fillColor",
            self.fill_color
                .as_ref()
                .or(scheme.and_then(|s| s.fill_color.as_ref())),
        );
        push_display(&mut dict, "jumpStyle", self.jump_style);
        push_number(&mut dict, "jumpSize", self.jump_size);
        push_bool(&mut dict, "shadow", self.shadow);
        push_bool(&mut dict, "sketch", self.sketch);
        push_bool(&mut dict, "comic", self.comic);
        dict.insert_opt("opacity", self.opacity.map(i64::from));
        push_bool(&mut dict, "flowAnimation", self.flow_animation);
        self.text_format
            .write_entries(&mut dict, scheme.and_then(|s| s.font_color.as_ref()));
        // Catalog keys no token matched override the token fragments in place.
        for (key, value) in &self.extra {
            if !dict.contains_key(key) || is_family_key(key) {
                dict.insert(key.clone(), value.clone());
            }
        }
        dict
    }

    pub fn to_style_string(&self) -> String {
        self.to_dict().encode()
    }
}

fn is_family_key(key: &str) -> bool {
    [WAYPOINT_KEYS, CONNECTION_KEYS, PATTERN_KEYS]
        .iter()
        .any(|family| family.contains(&key))
}

/// Picks the catalog entry whose fragment is fully present in `dict` with the most keys, and
/// removes the matched keys. Returns `None` when `dict` carries none of `family_keys`.
fn infer_token<T: FromStr>(
    fragments: &ShapeLibrary,
    family_keys: &[&str],
    dict: &mut StyleDict,
) -> Option<T> {
    if !family_keys.iter().any(|k| dict.contains_key(k)) {
        return None;
    }
    let mut best: Option<(&str, &StyleDict)> = None;
    for name in fragments.names() {
        let Some(fragment) = fragments.get(name) else {
            continue;
        };
        if fragment.is_empty() {
            continue;
        }
        let matches = fragment.iter().all(|(k, v)| {
            dict.get(k)
                .is_some_and(|have| have.to_style_string() == v.to_style_string())
        });
        if matches && best.is_none_or(|(_, b)| fragment.len() > b.len()) {
            best = Some((name, fragment));
        }
    }
    let (name, fragment) = best?;
    for (key, _) in fragment.iter() {
        dict.remove(key);
    }
    name.parse().ok()
}

fn write_end(dict: &mut StyleDict, side: &str, end: Option<EdgeEnd>) {
    let Some(end) = end else {
        return;
    };
    dict.insert(format!("{side}Arrow"), end.line_end.as_str());
    if end.line_end.is_fillable() {
        dict.insert_opt(&format!("{side}Fill"), end.fill);
    }
    push_number(dict, &format!("{side}Size"), end.size);
}

fn write_connection_point(dict: &mut StyleDict, side: &str, point: &ConnectionPoint) {
    push_number(dict, &format!("{side}X"), point.x);
    push_number(dict, &format!("{side}Y"), point.y);
    push_number(dict, &format!("{side}Dx"), point.dx);
    push_number(dict, &format!("{side}Dy"), point.dy);
}

fn end_slot(slot: &mut Option<EdgeEnd>, default: LineEnd) -> &mut EdgeEnd {
    slot.get_or_insert(EdgeEnd::new(default))
}

impl StyleTarget for EdgeStyle {
    fn set_base_style(&mut self, base_style: Option<String>) {
        self.base_style = base_style;
    }

    fn apply_typed_entry(&mut self, key: &str, value: &StyleValue) -> Applied {
        match key {
            "rounded" => set_bool(&mut self.rounded, value),
            "html" => set_bool(&mut self.html, value),
            "endArrow" | "startArrow" => match value.to_style_string().parse::<LineEnd>() {
                Ok(line_end) => {
                    let slot = if key == "endArrow" {
                        &mut self.end
                    } else {
                        &mut self.start
                    };
                    slot.get_or_insert(EdgeEnd::new(line_end)).line_end = line_end;
                    Applied::Set
                }
                Err(_) => Applied::Rejected,
            },
            "endFill" => set_bool(&mut end_slot(&mut self.end, LineEnd::Classic).fill, value),
            "startFill" => set_bool(&mut end_slot(&mut self.start, LineEnd::None).fill, value),
            "endSize" => set_number(&mut end_slot(&mut self.end, LineEnd::Classic).size, value),
            "startSize" => set_number(&mut end_slot(&mut self.start, LineEnd::None).size, value),
            "exitX" => set_number(&mut self.exit.x, value),
            "exitY" => set_number(&mut self.exit.y, value),
            "exitDx" => set_number(&mut self.exit.dx, value),
            "exitDy" => set_number(&mut self.exit.dy, value),
            "entryX" => set_number(&mut self.entry.x, value),
            "entryY" => set_number(&mut self.entry.y, value),
            "entryDx" => set_number(&mut self.entry.dx, value),
            "entryDy" => set_number(&mut self.entry.dy, value),
            "strokeColor" => set_color(&mut self.stroke_color, value),
            "strokeWidth" => {
                self.stroke_width = StrokeWidth::parse(&value.to_style_string());
                Applied::Set
            }
            "fillColor" => set_color(&mut self.fill_color, value),
            "jumpStyle" => match value.to_style_string().parse() {
                Ok(style) => {
                    self.jump_style = Some(style);
                    Applied::Set
                }
                Err(_) => Applied::Rejected,
            },
            "jumpSize" => set_number(&mut self.jump_size, value),
            "shadow" => set_bool(&mut self.shadow, value),
            "sketch" => set_bool(&mut self.sketch, value),
            "comic" => set_bool(&mut self.comic, value),
            "opacity" => set_percent(&mut self.opacity, value),
            "flowAnimation" => set_bool(&mut self.flow_animation, value),
            _ => self.text_format.apply_entry(key, value),
        }
    }

    fn extra_mut(&mut self) -> &mut IndexMap<String, StyleValue> {
        &mut self.extra
    }
}

/// A connector cell.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) xml_id: String,
    pub(crate) label: Option<String>,
    pub(crate) style: EdgeStyle,
    pub(crate) geometry: EdgeGeometry,
    pub(crate) source: Option<ShapeId>,
    pub(crate) target: Option<ShapeId>,
    pub(crate) parent: Option<ShapeId>,
    pub(crate) page: Option<PageId>,
}

impl Edge {
    pub fn xml_id(&self) -> &str {
        &self.xml_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    pub fn style_string(&self) -> String {
        self.style.to_style_string()
    }

    pub fn geometry(&self) -> &EdgeGeometry {
        &self.geometry
    }

    pub fn points(&self) -> &[Point] {
        &self.geometry.points
    }

    pub fn source(&self) -> Option<ShapeId> {
        self.source
    }

    pub fn target(&self) -> Option<ShapeId> {
        self.target
    }

    /// Container the edge is drawn in, if any.
    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    pub fn page(&self) -> Option<PageId> {
        self.page
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeOptions {
    pub source: Option<ShapeId>,
    pub target: Option<ShapeId>,
    pub label: Option<String>,
    pub style: EdgeStyle,
    pub style_string: Option<String>,
    pub points: Vec<Point>,
    pub label_position: Option<f64>,
    pub label_offset: Option<f64>,
    pub page: Option<PageId>,
    pub parent: Option<ShapeId>,
    pub xml_id: Option<String>,
}

impl EdgeOptions {
    pub fn between(source: ShapeId, target: ShapeId) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn on_page(mut self, page: PageId) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_waypoints(mut self, waypoints: Waypoints) -> Self {
        self.style.waypoints = waypoints;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style_string = Some(style.into());
        self
    }
}

/// Mutable access to one edge through its owning [`File`].
#[derive(Debug)]
pub struct EdgeMut<'a> {
    pub(crate) file: &'a mut File,
    pub(crate) id: EdgeId,
}

impl EdgeMut<'_> {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn get(&self) -> &Edge {
        self.file.edge(self.id)
    }

    /// Fails with `InvalidArgument` for a shape from another file.
    pub fn set_source(&mut self, source: ShapeId) -> Result<&mut Self> {
        self.file.check_endpoint(source)?;
        self.file.set_edge_source(self.id, Some(source));
        Ok(self)
    }

    pub fn clear_source(&mut self) -> &mut Self {
        self.file.set_edge_source(self.id, None);
        self
    }

    pub fn set_target(&mut self, target: ShapeId) -> Result<&mut Self> {
        self.file.check_endpoint(target)?;
        self.file.set_edge_target(self.id, Some(target));
        Ok(self)
    }

    pub fn clear_target(&mut self) -> &mut Self {
        self.file.set_edge_target(self.id, None);
        self
    }

    pub fn set_label(&mut self, label: Option<impl Into<String>>) -> &mut Self {
        self.file.edge_entry(self.id).label = label.map(Into::into);
        self
    }

    /// Position along the edge, clamped to `[-1, 1]`.
    pub fn set_label_position(&mut self, position: Option<f64>) -> &mut Self {
        self.file
            .edge_entry(self.id)
            .geometry
            .set_label_position(position);
        self
    }

    pub fn set_label_offset(&mut self, offset: Option<f64>) -> &mut Self {
        self.file
            .edge_entry(self.id)
            .geometry
            .set_label_offset(offset);
        self
    }

    pub fn add_point(&mut self, x: f64, y: f64) -> &mut Self {
        self.file.edge_entry(self.id).geometry.points.push(point(x, y));
        self
    }

    pub fn clear_points(&mut self) -> &mut Self {
        self.file.edge_entry(self.id).geometry.points.clear();
        self
    }

    pub fn set_waypoints_by_name(&mut self, name: &str) -> Result<&mut Self> {
        self.style_mut().set_waypoints_by_name(name)?;
        Ok(self)
    }

    pub fn set_connection_by_name(&mut self, name: &str) -> Result<&mut Self> {
        self.style_mut().set_connection_by_name(name)?;
        Ok(self)
    }

    pub fn set_pattern_by_name(&mut self, name: &str) -> Result<&mut Self> {
        self.style_mut().set_pattern_by_name(name)?;
        Ok(self)
    }

    pub fn set_page(&mut self, page: Option<PageId>) -> &mut Self {
        self.file.move_edge_to_page(self.id, page);
        self
    }

    pub fn style_mut(&mut self) -> &mut EdgeStyle {
        &mut self.file.edge_entry(self.id).style
    }

    pub fn apply_style_string(&mut self, style: &str) -> &mut Self {
        self.style_mut().apply_style_string(style);
        self
    }

    /// Detaches both endpoints and takes the edge off its page. The edge stays usable and can be
    /// rewired or put back on a page later.
    pub fn remove(&mut self) -> &mut Self {
        self.file.set_edge_source(self.id, None);
        self.file.set_edge_target(self.id, None);
        self.file.move_edge_to_page(self.id, None);
        self
    }
}

