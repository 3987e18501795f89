use crate::*;
use mxdraw_core::{Error, File, PageId, PageOptions, ShapeId};

fn setup() -> (File, PageId) {
    let mut file = File::new();
    let page = file.add_page(PageOptions::default());
    (file, page)
}

fn angle(file: &File, slice: ShapeId, key: &str) -> String {
    file.shape(slice)
        .style()
        .extra
        .get(key)
        .map(|v| v.to_style_string())
        .unwrap_or_default()
}

#[test]
fn slices_cover_the_full_turn() {
    let (mut file, page) = setup();
    let data = [("a", 1.0), ("b", 1.0), ("c", 2.0)];
    let chart = PieChart::new(&mut file, page, data, PieChartOptions::default()).unwrap();

    let spans: Vec<_> = chart
        .slices()
        .iter()
        .map(|s| (angle(&file, *s, "startAngle"), angle(&file, *s, "endAngle")))
        .collect();
    assert_eq!(
        spans,
        [
            ("0".to_string(), "0.25".to_string()),
            ("0.25".to_string(), "0.5".to_string()),
            ("0.5".to_string(), "1".to_string()),
        ]
    );
    let style = file.shape(chart.slices()[0]).style_string();
    assert!(style.contains("shape=mxgraph.basic.pie"));
    assert_eq!(file.shape(chart.slices()[2]).width(), 200.0);

    let labels: Vec<_> = chart
        .labels()
        .iter()
        .map(|l| file.shape(*l).value().to_string())
        .collect();
    assert_eq!(labels, ["25%", "25%", "50%"]);
    assert_eq!(chart.legend().unwrap().rows().len(), 3);
}

#[test]
fn donut_slices_carry_the_arc_width() {
    let (mut file, page) = setup();
    let options = PieChartOptions {
        donut: true,
        arc_width: 0.3,
        show_legend: false,
        ..PieChartOptions::default()
    };
    let chart = PieChart::new(&mut file, page, [("only", 5.0)], options).unwrap();
    let slice = chart.slices()[0];
    assert!(
        file.shape(slice)
            .style_string()
            .contains("shape=mxgraph.basic.partConcEllipse")
    );
    assert_eq!(angle(&file, slice, "arcWidth"), "0.3");
    assert_eq!(angle(&file, slice, "endAngle"), "1");
    assert!(chart.legend().is_none());
}

#[test]
fn zero_values_get_a_legend_row_but_no_slice() {
    let (mut file, page) = setup();
    let chart = PieChart::new(
        &mut file,
        page,
        [("none", 0.0), ("all", 3.0)],
        PieChartOptions::default(),
    )
    .unwrap();
    assert_eq!(chart.slices().len(), 1);
    assert_eq!(angle(&file, chart.slices()[0], "startAngle"), "0");
    assert_eq!(chart.legend().unwrap().rows().len(), 2);
}

#[test]
fn degenerate_data_is_rejected() {
    let (mut file, page) = setup();
    let err = PieChart::new(
        &mut file,
        page,
        [("a", 0.0), ("b", 0.0)],
        PieChartOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let err = PieChart::new(&mut file, page, [("a", -2.0)], PieChartOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let options = PieChartOptions {
        donut: true,
        arc_width: 0.0,
        ..PieChartOptions::default()
    };
    assert!(PieChart::new(&mut file, page, [("a", 1.0)], options).is_err());
    assert!(file.page(page).cells().is_empty());
}

#[test]
fn update_data_replaces_slices_and_legend() {
    let (mut file, page) = setup();
    let mut chart = PieChart::new(
        &mut file,
        page,
        [("a", 1.0), ("b", 1.0)],
        PieChartOptions {
            title: Some("Share".to_string()),
            ..PieChartOptions::default()
        },
    )
    .unwrap();
    let old = chart.group().shapes().to_vec();
    chart
        .update_data(&mut file, [("a", 1.0), ("b", 1.0), ("c", 1.0), ("d", 1.0)])
        .unwrap();
    for shape in old {
        assert_eq!(file.shape(shape).page(), None);
    }
    assert_eq!(chart.slices().len(), 4);
    assert_eq!(chart.legend().unwrap().rows().len(), 4);
    assert_eq!(file.page(page).shapes().count(), chart.group().len());
    assert!(chart.title().is_some());
}
