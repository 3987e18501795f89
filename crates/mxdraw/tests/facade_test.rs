use mxdraw::{EdgeOptions, File, PageOptions, ShapeOptions, WriteOptions, import_path};

#[test]
fn facade_writes_a_readable_document() {
    let mut file = File::new();
    let page = file.add_page(PageOptions::named("Flow"));
    let a = file
        .add_shape(
            ShapeOptions::new("Start")
                .from_library("flowchart", "terminator")
                .on_page(page),
        )
        .unwrap();
    let b = file
        .add_shape(ShapeOptions::new("End").at(0.0, 160.0).on_page(page))
        .unwrap();
    file.add_edge(EdgeOptions::between(a, b).with_label("next").on_page(page))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = file.write(&WriteOptions::to_dir(dir.path())).unwrap();

    let xml = std::fs::read_to_string(&path).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "mxfile");
    assert_eq!(
        doc.descendants().filter(|n| n.has_tag_name("mxCell")).count(),
        5
    );

    let diagram = import_path(&path).unwrap();
    assert_eq!(diagram.shapes().len(), 2);
    assert_eq!(diagram.edges().len(), 1);
}

#[cfg(feature = "charts")]
#[test]
fn charts_are_reachable_through_the_facade() {
    use mxdraw::charts::{TreeDiagram, TreeOptions};

    let mut file = File::new();
    let page = file.add_page(PageOptions::default());
    let mut tree = TreeDiagram::new(page, TreeOptions::default());
    let root = tree.add_node(&mut file, "root", None).unwrap();
    tree.add_node(&mut file, "leaf", Some(root)).unwrap();
    tree.auto_layout(&mut file).unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree.links().count(), 1);
}
