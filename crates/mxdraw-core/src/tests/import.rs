use crate::*;
use base64::Engine as _;
use std::io::Write as _;

const LIST_SAMPLE: &str = r#"<mxfile host="app.diagrams.net" version="21.6.5" type="device">
  <diagram name="Page-1" id="list">
    <mxGraphModel dx="1000" dy="600" grid="1" gridSize="10">
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
        <mxCell id="100" value="Groceries" style="swimlane;fontStyle=0;childLayout=stackLayout;horizontal=1;startSize=30;" vertex="1" parent="1">
          <mxGeometry x="40" y="40" width="140" height="90" as="geometry" />
        </mxCell>
        <mxCell id="101" value="Milk" style="text;strokeColor=none;fillColor=none;align=left;" vertex="1" parent="100">
          <mxGeometry y="30" width="140" height="30" as="geometry" />
        </mxCell>
        <mxCell id="102" value="Eggs" style="text;strokeColor=none;fillColor=none;align=left;" vertex="1" parent="100">
          <mxGeometry y="60" width="140" height="30" as="geometry" />
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>"#;

const FLOW_SAMPLE: &str = r#"<mxfile>
  <diagram name="Flow" id="flow">
    <mxGraphModel>
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
        <mxCell id="start" value="Start" style="ellipse;whiteSpace=wrap;html=1;" vertex="1" parent="1">
          <mxGeometry x="0" y="0" width="80" height="40" as="geometry" />
        </mxCell>
        <UserObject label="Check stock" id="check" link="https://example.com">
          <mxCell style="rhombus;whiteSpace=wrap;html=1;" vertex="1" parent="1">
            <mxGeometry x="0" y="100" width="80" height="80" as="geometry" />
          </mxCell>
        </UserObject>
        <mxCell id="done" value="Done" style="rounded=1;" vertex="1" parent="1">
          <mxGeometry x="0" y="240" width="80" height="40" as="geometry" />
        </mxCell>
        <mxCell id="e1" style="edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;" edge="1" parent="1" source="start" target="check">
          <mxGeometry relative="1" as="geometry" />
        </mxCell>
        <mxCell id="e2" value="in stock" style="endArrow=block;endFill=1;" edge="1" parent="1" source="check" target="done">
          <mxGeometry x="-0.5" y="10" relative="1" as="geometry">
            <Array as="points">
              <mxPoint x="120" y="140" />
              <mxPoint x="120" y="260" />
            </Array>
          </mxGeometry>
        </mxCell>
        <mxCell id="e3" value="dangling" edge="1" parent="1" source="done" target="nowhere">
          <mxGeometry relative="1" as="geometry" />
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>"#;

#[test]
fn list_container_children_are_nested() {
    let diagram = import_str(LIST_SAMPLE).unwrap();
    assert_eq!(diagram.shapes().len(), 3);
    assert!(diagram.edges().is_empty());
    assert_eq!(diagram.diagram_names(), ["Page-1"]);

    let list = diagram.shape_by_id("100").unwrap();
    assert_eq!(list.value(), "Groceries");
    let children: Vec<_> = list
        .children()
        .iter()
        .map(|id| diagram.shape(*id).xml_id())
        .collect();
    assert_eq!(children, ["101", "102"]);

    let Some(CellId::Shape(milk)) = diagram.get_by_id("101") else {
        panic!("101 should be a shape");
    };
    assert_eq!(diagram.shape(milk).geometry().y, 30.0);
    assert_eq!(diagram.shape(milk).geometry().x, 0.0);
    assert_eq!(diagram.shape(milk).width(), 140.0);
    assert_eq!(
        StyleDict::parse(&diagram.shape(milk).style_string()),
        StyleDict::parse("text;strokeColor=none;fillColor=none;align=left;")
    );
    assert!(diagram.get_by_id("0").is_none());
    assert!(diagram.get_by_id("1").is_none());
}

#[test]
fn edges_resolve_endpoints_by_id() {
    let diagram = import_str(FLOW_SAMPLE).unwrap();
    assert_eq!(diagram.shapes().len(), 3);
    assert_eq!(diagram.edges().len(), 3);

    let Some(CellId::Shape(check)) = diagram.get_by_id("check") else {
        panic!("check should be a shape");
    };
    assert_eq!(diagram.shape(check).value(), "Check stock");
    assert_eq!(diagram.incoming_edges(check).len(), 1);
    assert_eq!(diagram.outgoing_edges(check).len(), 1);

    let e2 = diagram.edge_by_id("e2").unwrap();
    assert_eq!(e2.label(), Some("in stock"));
    assert_eq!(e2.source(), Some(check));
    assert_eq!(e2.points().len(), 2);
    assert_eq!(e2.points()[1].y, 260.0);
    assert_eq!(e2.geometry().label_position(), Some(-0.5));
    assert_eq!(e2.geometry().label_offset(), Some(10.0));
    assert_eq!(e2.style().end.map(|end| end.line_end), Some(LineEnd::Block));

    let e1 = diagram.edge_by_id("e1").unwrap();
    assert_eq!(e1.label(), None);
    assert_eq!(e1.style().waypoints, Waypoints::Orthogonal);
    assert_eq!(
        e1.style_string(),
        "edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;"
    );

    let dangling = diagram.edge_by_id("e3").unwrap();
    assert!(dangling.source().is_some());
    assert_eq!(dangling.target(), None);
    assert!(diagram.shape_by_id("e3").is_none());
}

#[test]
fn root_shapes_have_no_incoming_edges() {
    let diagram = import_str(FLOW_SAMPLE).unwrap();
    let roots: Vec<_> = diagram
        .root_shapes()
        .into_iter()
        .map(|id| diagram.shape(id).xml_id().to_string())
        .collect();
    assert_eq!(roots, ["start"]);
}

#[test]
fn find_by_value_supports_exact_and_substring() {
    let diagram = import_str(FLOW_SAMPLE).unwrap();
    let exact = diagram.find_by_value("Done", MatchMode::Exact);
    assert_eq!(exact, [diagram.get_by_id("done").unwrap()]);

    assert!(diagram.find_by_value("stock", MatchMode::Exact).is_empty());
    let partial = diagram.find_by_value("stock", MatchMode::Substring);
    assert_eq!(
        partial,
        [
            diagram.get_by_id("check").unwrap(),
            diagram.get_by_id("e2").unwrap(),
        ]
    );
}

#[test]
fn into_file_puts_every_cell_on_one_page() {
    let diagram = import_str(FLOW_SAMPLE).unwrap();
    let file = diagram.into_file("Imported");
    assert_eq!(file.pages().len(), 1);
    let page = file.page(file.pages()[0]);
    assert_eq!(page.name(), "Imported");
    assert_eq!(page.shapes().count(), 3);
    assert_eq!(page.edges().count(), 3);

    let xml = file.to_xml();
    assert!(xml.contains("id=\"check\""));
    assert!(xml.contains("source=\"start\""));
}

#[test]
fn compressed_diagrams_are_inflated() {
    let model = r#"<mxGraphModel><root><mxCell id="0" /><mxCell id="1" parent="0" /><mxCell id="z" value="Zipped &amp; small" style="rounded=1;" vertex="1" parent="1"><mxGeometry x="10" y="20" width="30" height="40" as="geometry" /></mxCell></root></mxGraphModel>"#;
    let encoded =
        percent_encoding::utf8_percent_encode(model, percent_encoding::NON_ALPHANUMERIC)
            .to_string();
    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(encoded.as_bytes()).unwrap();
    let payload = base64::engine::general_purpose::STANDARD.encode(encoder.finish().unwrap());
    let doc = format!(r#"<mxfile><diagram name="Zip" id="zip">{payload}</diagram></mxfile>"#);

    let diagram = import_str(&doc).unwrap();
    assert_eq!(diagram.diagram_names(), ["Zip"]);
    let shape = diagram.shape_by_id("z").unwrap();
    assert_eq!(shape.value(), "Zipped & small");
    assert_eq!(shape.geometry().origin(), geometry::point(10.0, 20.0));
    assert_eq!(shape.height(), 40.0);
}

#[test]
fn corrupt_compressed_payload_is_malformed() {
    let doc = r#"<mxfile><diagram name="Zip">!!not base64!!</diagram></mxfile>"#;
    assert!(matches!(
        import_str(doc).unwrap_err(),
        Error::MalformedDocument { .. }
    ));
}

#[test]
fn missing_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = import_path(dir.path().join("absent.drawio")).unwrap_err();
    assert!(matches!(err, Error::FileMissing { .. }));
}

#[test]
fn unparseable_xml_is_malformed() {
    let err = import_str("<mxfile><diagram>").unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { .. }));

    let bad_number = r#"<mxfile><diagram><mxGraphModel><root>
        <mxCell id="a" vertex="1"><mxGeometry x="left" as="geometry" /></mxCell>
        </root></mxGraphModel></diagram></mxfile>"#;
    assert!(matches!(
        import_str(bad_number).unwrap_err(),
        Error::MalformedDocument { .. }
    ));
}

#[test]
fn documents_without_cells_are_empty() {
    assert!(matches!(
        import_str("<mxfile/>").unwrap_err(),
        Error::EmptyDocument
    ));
}

#[test]
fn imported_cells_are_not_on_a_page() {
    let diagram = import_str(LIST_SAMPLE).unwrap();
    for id in diagram.shapes() {
        assert_eq!(diagram.shape(*id).page(), None);
    }
    assert!(diagram.file().pages().is_empty());
}

const TWO_PAGE_SAMPLE: &str = r#"<mxfile>
  <diagram name="First" id="p1">
    <mxGraphModel>
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
        <mxCell id="c" value="box-1" style="swimlane;" vertex="1" parent="1">
          <mxGeometry x="0" y="0" width="200" height="100" as="geometry" />
        </mxCell>
        <mxCell id="k" value="item-1" vertex="1" parent="c">
          <mxGeometry x="10" y="30" width="80" height="40" as="geometry" />
        </mxCell>
        <mxCell id="e" edge="1" parent="1" source="c" target="k">
          <mxGeometry relative="1" as="geometry" />
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
  <diagram name="Second" id="p2">
    <mxGraphModel>
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
        <mxCell id="c" value="box-2" style="swimlane;" vertex="1" parent="1">
          <mxGeometry x="0" y="0" width="200" height="100" as="geometry" />
        </mxCell>
        <mxCell id="k" value="item-2" vertex="1" parent="c">
          <mxGeometry x="10" y="30" width="80" height="40" as="geometry" />
        </mxCell>
        <mxCell id="e" edge="1" parent="1" source="c" target="k">
          <mxGeometry relative="1" as="geometry" />
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>"#;

#[test]
fn repeated_ids_resolve_within_their_own_diagram() {
    let diagram = import_str(TWO_PAGE_SAMPLE).unwrap();
    assert_eq!(diagram.diagram_names(), ["First", "Second"]);
    assert_eq!(diagram.shapes().len(), 4);
    assert_eq!(diagram.edges().len(), 2);

    let [box1, item1, box2, item2] = diagram.shapes() else {
        panic!("expected four shapes");
    };
    assert_eq!(diagram.shape(*box1).value(), "box-1");
    assert_eq!(diagram.shape(*item2).value(), "item-2");
    assert_eq!(diagram.shape(*item1).parent(), Some(*box1));
    assert_eq!(diagram.shape(*item2).parent(), Some(*box2));
    assert_eq!(diagram.shape(*box1).children(), [*item1]);
    assert_eq!(diagram.shape(*box2).children(), [*item2]);

    let [first, second] = diagram.edges() else {
        panic!("expected two edges");
    };
    assert_eq!(diagram.edge(*first).source(), Some(*box1));
    assert_eq!(diagram.edge(*first).target(), Some(*item1));
    assert_eq!(diagram.edge(*second).source(), Some(*box2));
    assert_eq!(diagram.edge(*second).target(), Some(*item2));

    assert_eq!(diagram.get_by_id("k"), Some(CellId::Shape(*item1)));
}
