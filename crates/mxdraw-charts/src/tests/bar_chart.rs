use crate::*;
use mxdraw_core::geometry::point;
use mxdraw_core::{Color, Error, File, PageId, PageOptions};

fn setup() -> (File, PageId) {
    let mut file = File::new();
    let page = file.add_page(PageOptions::default());
    (file, page)
}

#[test]
fn bars_scale_to_the_largest_value() {
    let (mut file, page) = setup();
    let data = [("a", 10.0), ("b", 20.0), ("c", 5.0)];
    let chart = BarChart::new(&mut file, page, data, BarChartOptions::default()).unwrap();

    let heights: Vec<_> = chart.bars().iter().map(|b| file.shape(*b).height()).collect();
    assert_eq!(heights, [100.0, 200.0, 50.0]);
    let origins: Vec<_> = chart
        .bars()
        .iter()
        .map(|b| file.shape_position(*b))
        .collect();
    assert_eq!(
        origins,
        [point(0.0, 120.0), point(60.0, 20.0), point(120.0, 170.0)]
    );

    let values: Vec<_> = chart
        .value_labels()
        .iter()
        .map(|l| file.shape(*l).value().to_string())
        .collect();
    assert_eq!(values, ["10", "20", "5"]);
    let labels: Vec<_> = chart
        .category_labels()
        .iter()
        .map(|l| file.shape(*l).value().to_string())
        .collect();
    assert_eq!(labels, ["a", "b", "c"]);

    assert_eq!(
        file.shape(chart.bars()[0]).style().fill_color,
        Some(Color::Hex("#4E79A7".to_string()))
    );
    assert!(chart.axis().is_some());
    assert_eq!(chart.group().len(), 10);
    assert_eq!(chart.group().position(&file), Some(point(0.0, 0.0)));
}

#[test]
fn invalid_values_are_rejected() {
    let (mut file, page) = setup();
    for bad in [-1.0, f64::NAN, f64::INFINITY] {
        let err =
            BarChart::new(&mut file, page, [("x", bad)], BarChartOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }), "{bad}");
    }
    assert_eq!(file.page(page).cells().len(), 0);
}

#[test]
fn update_data_redraws_in_place() {
    let (mut file, page) = setup();
    let options = BarChartOptions {
        title: Some("Sales".to_string()),
        show_axis: false,
        ..BarChartOptions::default()
    };
    let mut chart = BarChart::new(&mut file, page, [("q1", 3.0), ("q2", 4.0)], options).unwrap();
    let old_bars = chart.bars().to_vec();
    let title = chart.title().unwrap();
    assert!(file.shape(title).style().text_format.bold());

    chart
        .update_data(&mut file, [("q1", 1.0), ("q2", 2.0), ("q3", 4.0)])
        .unwrap();
    assert_eq!(chart.bars().len(), 3);
    for bar in old_bars {
        assert_eq!(file.shape(bar).page(), None);
    }
    assert_eq!(file.shape(chart.bars()[2]).height(), 200.0);
    assert_eq!(file.page(page).shapes().count(), chart.group().len());

    let before = chart.bars().to_vec();
    assert!(chart.update_data(&mut file, [("bad", -3.0)]).is_err());
    assert_eq!(chart.bars(), before);
    assert_eq!(chart.data().len(), 3);
}

#[test]
fn all_zero_data_draws_flat_bars() {
    let (mut file, page) = setup();
    let chart = BarChart::new(
        &mut file,
        page,
        [("a", 0.0), ("b", 0.0)],
        BarChartOptions::default(),
    )
    .unwrap();
    for bar in chart.bars() {
        assert_eq!(file.shape(*bar).height(), 0.0);
    }
}

#[test]
fn moving_keeps_the_layout() {
    let (mut file, page) = setup();
    let mut chart = BarChart::new(
        &mut file,
        page,
        [("a", 10.0), ("b", 20.0)],
        BarChartOptions::default(),
    )
    .unwrap();
    chart.move_to(&mut file, 100.0, 50.0).unwrap();
    assert_eq!(file.shape_position(chart.bars()[0]), point(100.0, 170.0));
    assert_eq!(chart.options().position, point(100.0, 50.0));

    chart.update_data(&mut file, [("a", 1.0)]).unwrap();
    assert_eq!(file.shape_position(chart.bars()[0]), point(100.0, 70.0));
}
