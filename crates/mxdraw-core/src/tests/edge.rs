use crate::*;

struct Fixture {
    file: File,
    page: PageId,
    a: ShapeId,
    b: ShapeId,
}

fn fixture() -> Fixture {
    let mut file = File::new();
    let page = file.add_page(PageOptions::default());
    let a = file
        .add_shape(ShapeOptions::new("Shape A").with_size(120.0, 60.0).on_page(page))
        .unwrap();
    let b = file
        .add_shape(
            ShapeOptions::new("Shape B")
                .at(200.0, 0.0)
                .with_size(120.0, 60.0)
                .on_page(page),
        )
        .unwrap();
    Fixture { file, page, a, b }
}

fn assert_wiring_consistent(file: &File) {
    for shape in file.shape_ids() {
        for edge in file.shape(shape).out_edges() {
            assert_eq!(file.edge(*edge).source(), Some(shape));
        }
        for edge in file.shape(shape).in_edges() {
            assert_eq!(file.edge(*edge).target(), Some(shape));
        }
    }
    for edge in file.edge_ids() {
        if let Some(source) = file.edge(edge).source() {
            assert!(file.shape(source).out_edges().contains(&edge));
        }
        if let Some(target) = file.edge(edge).target() {
            assert!(file.shape(target).in_edges().contains(&edge));
        }
    }
}

#[test]
fn two_shapes_and_a_labelled_edge() {
    let Fixture {
        mut file,
        page,
        a,
        b,
    } = fixture();
    let edge = file
        .add_edge(EdgeOptions::between(a, b).with_label("go").on_page(page))
        .unwrap();

    assert_eq!(file.shape(a).out_edges(), [edge]);
    assert_eq!(file.shape(b).in_edges(), [edge]);
    assert!(file.shape(a).in_edges().is_empty());

    let xml = file.to_xml();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let cells: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("mxCell"))
        .collect();
    assert_eq!(cells.len(), 5);
    let user_cells: Vec<_> = cells
        .iter()
        .filter(|n| n.attribute("vertex") == Some("1") || n.attribute("edge") == Some("1"))
        .collect();
    assert_eq!(user_cells.len(), 3);

    let edge_cell = user_cells
        .iter()
        .find(|n| n.attribute("edge") == Some("1"))
        .unwrap();
    assert_eq!(edge_cell.attribute("source"), Some(file.shape(a).xml_id()));
    assert_eq!(edge_cell.attribute("target"), Some(file.shape(b).xml_id()));
    assert_eq!(edge_cell.attribute("value"), Some("go"));
    assert_eq!(edge_cell.attribute("parent"), Some("1"));
    assert_wiring_consistent(&file);
}

#[test]
fn reassigning_an_endpoint_moves_the_back_reference() {
    let Fixture {
        mut file,
        page,
        a,
        b,
    } = fixture();
    let c = file
        .add_shape(ShapeOptions::new("C").at(0.0, 200.0).on_page(page))
        .unwrap();
    let e = file.add_edge(EdgeOptions::between(a, b)).unwrap();

    file.edge_mut(e).set_source(c).unwrap();
    assert_eq!(file.edge(e).source(), Some(c));
    assert_eq!(file.shape(c).out_edges(), [e]);
    assert!(!file.shape(a).out_edges().contains(&e));

    file.edge_mut(e).clear_source();
    assert_eq!(file.edge(e).source(), None);
    assert!(file.shape(c).out_edges().is_empty());

    file.edge_mut(e).set_target(a).unwrap();
    assert!(file.shape(b).in_edges().is_empty());
    assert_eq!(file.shape(a).in_edges(), [e]);
    assert_wiring_consistent(&file);
}

#[test]
fn removed_edges_stay_usable() {
    let Fixture {
        mut file,
        page,
        a,
        b,
    } = fixture();
    let e = file
        .add_edge(EdgeOptions::between(a, b).on_page(page))
        .unwrap();
    file.edge_mut(e).remove();
    assert_eq!(file.edge(e).source(), None);
    assert_eq!(file.edge(e).target(), None);
    assert_eq!(file.edge(e).page(), None);
    assert!(!file.page(page).contains(e));
    assert!(file.shape(a).out_edges().is_empty());

    file.edge_mut(e)
        .set_source(b)
        .unwrap()
        .set_target(a)
        .unwrap()
        .set_page(Some(page));
    assert!(file.page(page).contains(e));
    assert_eq!(file.shape(b).out_edges(), [e]);
    assert_wiring_consistent(&file);
}

#[test]
fn unknown_edge_endpoints_are_rejected() {
    let mut file = File::new();
    let mut other = File::new();
    let stranger = other.add_shape(ShapeOptions::new("x")).unwrap();
    let err = file.add_edge(EdgeOptions::between(stranger, stranger)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn rewiring_to_a_foreign_shape_is_rejected() {
    let Fixture { mut file, a, b, .. } = fixture();
    let e = file.add_edge(EdgeOptions::between(a, b)).unwrap();

    let mut other = File::new();
    for _ in 0..3 {
        other.add_shape(ShapeOptions::new("filler")).unwrap();
    }
    let stranger = other.add_shape(ShapeOptions::new("x")).unwrap();

    let err = file.edge_mut(e).set_source(stranger).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    let err = file.edge_mut(e).set_target(stranger).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert_eq!(file.edge(e).source(), Some(a));
    assert_eq!(file.edge(e).target(), Some(b));
    assert_wiring_consistent(&file);
}

#[test]
fn default_style_is_orthogonal_solid_line() {
    let style = EdgeStyle::default();
    assert_eq!(style.waypoints, Waypoints::Orthogonal);
    assert_eq!(style.connection, Connection::Line);
    assert_eq!(style.pattern, Pattern::Solid);
    assert_eq!(
        style.to_style_string(),
        "edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;"
    );
    assert_eq!(EdgeStyle::plain().to_style_string(), "");
}

#[test]
fn unknown_waypoints_leave_the_previous_value() {
    let Fixture { mut file, a, b, .. } = fixture();
    let e = file
        .add_edge(EdgeOptions::between(a, b).with_waypoints(Waypoints::Curved))
        .unwrap();
    let err = file.edge_mut(e).set_waypoints_by_name("zigzag").unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidEnumeration {
            kind: "waypoints",
            ..
        }
    ));
    assert_eq!(file.edge(e).style().waypoints, Waypoints::Curved);

    file.edge_mut(e).set_waypoints_by_name("vertical").unwrap();
    assert_eq!(file.edge(e).style().waypoints, Waypoints::Vertical);

    assert!(file.edge_mut(e).set_connection_by_name("rope").is_err());
    assert!(file.edge_mut(e).set_pattern_by_name("dash_dot").is_err());
    assert_eq!("gap".parse::<JumpStyle>().unwrap(), JumpStyle::Gap);
    assert!("hop".parse::<JumpStyle>().is_err());
}

#[test]
fn style_strings_map_back_to_tokens() {
    let mut style = EdgeStyle::default();
    style.apply_style_string(
        "edgeStyle=elbowEdgeStyle;elbow=vertical;dashed=1;dashPattern=1 4;shape=flexArrow;\
         endArrow=block;endFill=1;",
    );
    assert_eq!(style.waypoints, Waypoints::Vertical);
    assert_eq!(style.pattern, Pattern::DottedSmall);
    assert_eq!(style.connection, Connection::Arrow);
    assert_eq!(
        style.end,
        Some(EdgeEnd {
            line_end: LineEnd::Block,
            fill: Some(true),
            size: None,
        })
    );
    assert!(style.extra.is_empty());
    assert_eq!(
        style.to_style_string(),
        "shape=flexArrow;edgeStyle=elbowEdgeStyle;elbow=vertical;dashed=1;dashPattern=1 4;\
         rounded=0;html=1;endArrow=block;endFill=1;"
    );
}

#[test]
fn inference_prefers_the_most_specific_fragment() {
    let mut style = EdgeStyle::plain();
    style.apply_style_string("edgeStyle=orthogonalEdgeStyle;curved=1;");
    assert_eq!(style.waypoints, Waypoints::Curved);

    let mut style = EdgeStyle::plain();
    style.apply_style_string("edgeStyle=orthogonalEdgeStyle;");
    assert_eq!(style.waypoints, Waypoints::Orthogonal);

    let mut style = EdgeStyle::plain();
    style.apply_style_string("dashed=1;dashPattern=3 3;");
    assert_eq!(style.pattern, Pattern::DashedSmall);
    assert_eq!(style.to_style_string(), "dashed=1;dashPattern=3 3;");
}

#[test]
fn explicit_edge_style_overrides_the_routing_fragment() {
    let Fixture { mut file, a, b, .. } = fixture();
    let e = file
        .add_edge(EdgeOptions::between(a, b).with_style("edgeStyle=segmentEdgeStyle;"))
        .unwrap();
    assert_eq!(file.edge(e).style().waypoints, Waypoints::Orthogonal);
    assert_eq!(
        file.edge(e).style_string(),
        "edgeStyle=segmentEdgeStyle;rounded=0;html=1;"
    );

    file.edge_mut(e).set_waypoints_by_name("curved").unwrap();
    assert_eq!(
        file.edge(e).style_string(),
        "edgeStyle=orthogonalEdgeStyle;curved=1;rounded=0;html=1;"
    );
}

#[test]
fn unmatched_catalog_keys_are_kept_verbatim() {
    let mut style = EdgeStyle::plain();
    style.apply_style_string("edgeStyle=segmentEdgeStyle;shape=pipe;");
    assert_eq!(style.waypoints, Waypoints::Straight);
    assert_eq!(style.connection, Connection::Line);
    assert_eq!(style.to_style_string(), "edgeStyle=segmentEdgeStyle;shape=pipe;");
}

#[test]
fn fill_flags_only_apply_to_fillable_ends() {
    let mut style = EdgeStyle::plain();
    style.end = Some(EdgeEnd::new(LineEnd::Open).filled(true));
    style.start = Some(EdgeEnd::new(LineEnd::Diamond).filled(false));
    assert_eq!(
        style.to_style_string(),
        "endArrow=open;startArrow=diamond;startFill=0;"
    );
    assert!(LineEnd::Classic.is_fillable());
    assert!(!LineEnd::ErMany.is_fillable());
}

#[test]
fn edge_geometry_carries_label_placement_and_points() {
    let Fixture { mut file, a, b, .. } = fixture();
    let e = file.add_edge(EdgeOptions::between(a, b)).unwrap();
    file.edge_mut(e)
        .set_label_position(Some(2.5))
        .set_label_offset(Some(-12.0))
        .add_point(160.0, 30.0)
        .add_point(160.0, 90.5);
    assert_eq!(file.edge(e).geometry().label_position(), Some(1.0));
    assert_eq!(file.edge(e).points().len(), 2);

    let xml = file.edge_xml(e).to_xml_string();
    assert!(xml.contains(
        "<mxGeometry x=\"1\" y=\"-12\" relative=\"1\" as=\"geometry\">\n    \
         <Array as=\"points\">\n      \
         <mxPoint x=\"160\" y=\"30\" />\n      \
         <mxPoint x=\"160\" y=\"90.5\" />\n    \
         </Array>\n  \
         </mxGeometry>"
    ));

    file.edge_mut(e).clear_points().set_label_position(Some(-3.0));
    assert_eq!(file.edge(e).geometry().label_position(), Some(-1.0));
    assert!(
        file.edge_xml(e)
            .to_xml_string()
            .contains("<mxGeometry x=\"-1\" y=\"-12\" relative=\"1\" as=\"geometry\" />")
    );
}

#[test]
fn unwired_edges_point_at_the_default_layer() {
    let mut file = File::new();
    let e = file.add_edge(EdgeOptions::default()).unwrap();
    let xml = file.edge_xml(e);
    assert_eq!(xml.attribute("source"), Some("1"));
    assert_eq!(xml.attribute("target"), Some("1"));
    assert_eq!(xml.attribute("parent"), Some("1"));
    assert_eq!(xml.attribute("value"), None);
}

#[test]
fn edges_inside_containers_name_the_container() {
    let Fixture { mut file, a, b, .. } = fixture();
    let lane = file.add_shape(ShapeOptions::new("lane")).unwrap();
    let e = file
        .add_edge(EdgeOptions {
            parent: Some(lane),
            ..EdgeOptions::between(a, b)
        })
        .unwrap();
    assert_eq!(file.edge(e).parent(), Some(lane));
    assert_eq!(
        file.edge_xml(e).attribute("parent"),
        Some(file.shape(lane).xml_id())
    );
}
