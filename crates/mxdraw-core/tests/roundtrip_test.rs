use mxdraw_core::{
    Connection, EdgeOptions, File, LineEnd, PageOptions, Pattern, ShapeId, ShapeOptions,
    Waypoints, WriteOptions, import_path,
};

fn sample_file() -> (File, Vec<ShapeId>) {
    let mut file = File::new();
    let page = file.add_page(PageOptions::named("Round trip"));
    let plain = file
        .add_shape(ShapeOptions::new("plain").at(10.0, 20.0).on_page(page))
        .unwrap();
    let styled = file
        .add_shape(
            ShapeOptions::new("styled")
                .at(200.5, 40.25)
                .with_size(90.0, 45.5)
                .with_style(
                    "rounded=1;whiteSpace=wrap;html=1;fillColor=#6a00ff;fontColor=#ffffff;\
                     strokeColor=#000000;strokeWidth=4;",
                )
                .on_page(page),
        )
        .unwrap();
    let decision = file
        .add_shape(
            ShapeOptions::new("decision?")
                .from_library("flowchart", "decision")
                .at(0.0, 200.0)
                .on_page(page),
        )
        .unwrap();
    let container = file
        .add_shape(
            ShapeOptions::new("lane")
                .from_library("general", "container")
                .at(400.0, 0.0)
                .with_size(200.0, 200.0)
                .on_page(page),
        )
        .unwrap();
    let inner = file
        .add_shape(
            ShapeOptions::new("inner")
                .at(420.0, 60.0)
                .with_size(60.0, 40.0)
                .in_container(container)
                .on_page(page),
        )
        .unwrap();

    let mut fancy = EdgeOptions::between(plain, decision).with_label("maybe");
    fancy.style.waypoints = Waypoints::Curved;
    fancy.style.connection = Connection::Link;
    fancy.style.pattern = Pattern::DashedMedium;
    fancy.style.end = Some(mxdraw_core::EdgeEnd::new(LineEnd::Open));
    file.add_edge(fancy.on_page(page)).unwrap();
    file.add_edge(EdgeOptions::between(styled, inner).on_page(page))
        .unwrap();
    let routed = file
        .add_edge(EdgeOptions::between(decision, container).on_page(page))
        .unwrap();
    file.edge_mut(routed)
        .add_point(300.0, 230.0)
        .add_point(300.0, 100.0)
        .set_label_position(Some(0.25));

    (file, vec![plain, styled, decision, container, inner])
}

#[test]
fn written_documents_import_with_the_same_cells() {
    let dir = tempfile::tempdir().unwrap();
    let (mut file, shapes) = sample_file();
    let path = file.write(&WriteOptions::to_dir(dir.path())).unwrap();

    let diagram = import_path(&path).unwrap();
    assert_eq!(diagram.shapes().len(), file.shape_ids().count());
    assert_eq!(diagram.edges().len(), file.edge_ids().count());

    for id in shapes {
        let original = file.shape(id);
        let imported = diagram.shape_by_id(original.xml_id()).unwrap();
        assert_eq!(imported.geometry(), original.geometry(), "{}", original.value());
        assert_eq!(imported.style_string(), original.style_string());
        assert_eq!(imported.value(), original.value());
    }
}

#[test]
fn edge_styles_and_routing_survive_import() {
    let dir = tempfile::tempdir().unwrap();
    let (mut file, _) = sample_file();
    let path = file.write(&WriteOptions::to_dir(dir.path())).unwrap();
    let diagram = import_path(&path).unwrap();

    for id in file.edge_ids() {
        let original = file.edge(id);
        let imported = diagram.edge_by_id(original.xml_id()).unwrap();
        assert_eq!(imported.style_string(), original.style_string());
        assert_eq!(imported.label(), original.label());
        assert_eq!(imported.points(), original.points());
        assert_eq!(
            imported.geometry().label_position(),
            original.geometry().label_position()
        );
        let source = imported.source().map(|s| diagram.shape(s).xml_id());
        let expected = original.source().map(|s| file.shape(s).xml_id());
        assert_eq!(source, expected);
    }

    let fancy = diagram.find_by_value("maybe", mxdraw_core::MatchMode::Exact);
    let Some(mxdraw_core::CellId::Edge(fancy)) = fancy.first().copied() else {
        panic!("labelled edge not found");
    };
    let style = diagram.edge(fancy).style();
    assert_eq!(style.waypoints, Waypoints::Curved);
    assert_eq!(style.connection, Connection::Link);
    assert_eq!(style.pattern, Pattern::DashedMedium);
}

#[test]
fn nested_shapes_keep_their_container() {
    let dir = tempfile::tempdir().unwrap();
    let (mut file, shapes) = sample_file();
    let path = file.write(&WriteOptions::to_dir(dir.path())).unwrap();
    let diagram = import_path(&path).unwrap();

    let container = file.shape(shapes[3]).xml_id();
    let inner = file.shape(shapes[4]).xml_id();
    let imported = diagram.shape_by_id(container).unwrap();
    let children: Vec<_> = imported
        .children()
        .iter()
        .map(|c| diagram.shape(*c).xml_id())
        .collect();
    assert_eq!(children, [inner]);
}

#[test]
fn reimported_files_write_again() {
    let dir = tempfile::tempdir().unwrap();
    let (mut file, _) = sample_file();
    let first = file.write(&WriteOptions::to_dir(dir.path()).named("first.drawio")).unwrap();

    let mut again = import_path(&first).unwrap().into_file("Round trip");
    let second = again
        .write(&WriteOptions::to_dir(dir.path()).named("second.drawio"))
        .unwrap();
    let diagram = import_path(&second).unwrap();
    assert_eq!(diagram.shapes().len(), 5);
    assert_eq!(diagram.edges().len(), 3);
}
