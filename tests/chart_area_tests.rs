use approx::assert_relative_eq;
use chart_axis::axis::ChartView;
use chart_axis::core::{
    AxisId, AxisPlotMode, AxisType, AxisValue, CategoryKey, DataPoint, Rect, SeriesId,
    SeriesModel, Size,
};
use chart_axis::{AxisError, AxisModel, ChartArea, InvalidationLevel, NullPresenter};

const CATEGORY_AXIS: AxisId = AxisId(0);
const VALUE_AXIS: AxisId = AxisId(1);
const AVAILABLE: Size = Size {
    width: 400.0,
    height: 300.0,
};

fn revenue() -> SeriesModel {
    SeriesModel::new(SeriesId(1), CATEGORY_AXIS, VALUE_AXIS)
        .with_default_plot_mode(AxisPlotMode::BetweenTicks)
        .with_points([
            DataPoint::numeric("a", 20.0),
            DataPoint::numeric("b", 60.0),
            DataPoint::numeric("c", 90.0),
        ])
}

fn chart() -> ChartArea {
    let mut value_axis = AxisModel::linear(VALUE_AXIS, AxisType::Second);
    value_axis
        .set_numerical_range(Some(0.0), Some(100.0))
        .expect("valid range");
    value_axis.set_major_step(25.0).expect("valid step");

    let mut area = ChartArea::new();
    area.add_axis(AxisModel::categorical(CATEGORY_AXIS, AxisType::First))
        .expect("category axis");
    area.add_axis(value_axis).expect("value axis");
    area.add_series(revenue()).expect("series");
    area
}

#[test]
fn layout_reserves_room_for_both_axes() {
    let mut area = chart();
    let plot_area = area
        .update_layout(AVAILABLE, Some(&NullPresenter::default()))
        .expect("layout");

    // vertical axis: 27px wide, half a label of top margin
    // horizontal axis: 20px tall
    assert_eq!(plot_area, Rect::new(27.0, 7.0, 373.0, 273.0));
    assert_eq!(area.plot_area(), plot_area);

    let category_axis = area.axis(CATEGORY_AXIS).expect("category axis");
    assert_eq!(category_axis.labels().len(), 3);
    assert_relative_eq!(category_axis.desired_size().height, 20.0);
    let value_axis = area.axis(VALUE_AXIS).expect("value axis");
    assert_relative_eq!(value_axis.desired_size().width, 27.0);
}

#[test]
fn repeated_layout_is_stable() {
    let mut area = chart();
    let presenter = NullPresenter::default();
    let first = area.update_layout(AVAILABLE, Some(&presenter)).expect("layout");
    let second = area.update_layout(AVAILABLE, Some(&presenter)).expect("layout");
    assert_eq!(first, second);
    assert_eq!(
        area.axis(VALUE_AXIS).expect("value axis").ticks().len(),
        5
    );
}

#[test]
fn property_changes_are_picked_up_by_the_next_layout() {
    let mut area = chart();
    let presenter = NullPresenter::default();
    area.update_layout(AVAILABLE, Some(&presenter)).expect("layout");

    area.axis_mut(VALUE_AXIS)
        .expect("value axis")
        .set_label_format(Some("{:.1}"))
        .expect("valid format");
    area.update_layout(AVAILABLE, Some(&presenter)).expect("layout");

    let value_axis = area.axis(VALUE_AXIS).expect("value axis");
    assert_eq!(value_axis.labels()[4].content, "100.0");
    // "100.0" is five characters wide
    assert_relative_eq!(value_axis.desired_size().width, 41.0);
    assert_relative_eq!(area.plot_area().x, 41.0);
}

#[test]
fn series_edits_invalidate_the_whole_area() {
    let mut area = chart();
    let presenter = NullPresenter::default();
    area.update_layout(AVAILABLE, Some(&presenter)).expect("layout");

    area.series_mut(SeriesId(1))
        .expect("series")
        .push_point(DataPoint::numeric("d", 10.0));
    area.update_layout(AVAILABLE, Some(&presenter)).expect("layout");

    let categories = area
        .axis(CATEGORY_AXIS)
        .and_then(AxisModel::categorical_axis)
        .expect("categorical axis")
        .categories()
        .len();
    assert_eq!(categories, 4);
}

#[test]
fn missing_presenter_collapses_the_axes() {
    let mut area = chart();
    let plot_area = area.update_layout(AVAILABLE, None).expect("layout");
    assert_eq!(plot_area, Rect::new(0.0, 0.0, 400.0, 300.0));
    assert!(area.axis(VALUE_AXIS).expect("value axis").is_updated());
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut area = chart();
    assert!(matches!(
        area.add_axis(AxisModel::linear(VALUE_AXIS, AxisType::Second)),
        Err(AxisError::InvalidArgument { .. })
    ));
    assert!(area.add_series(revenue()).is_err());
    assert!(area.remove_series(SeriesId(1)).is_some());
    area.add_series(revenue()).expect("id free again");
}

#[test]
fn points_round_trip_through_plot_coordinates() {
    let mut area = chart();
    area.update_layout(AVAILABLE, Some(&NullPresenter::default()))
        .expect("layout");

    let (x, y) = area.convert_data_to_point(
        (
            &AxisValue::Category(CategoryKey::from("b")),
            &AxisValue::Number(50.0),
        ),
        CATEGORY_AXIS,
        VALUE_AXIS,
    );
    assert_relative_eq!(x, 27.0 + 373.0 * 0.5);
    assert_relative_eq!(y, 7.0 + 273.0 * 0.5);

    let (category, value) = area.convert_point_to_data((x, 7.0 + 273.0 * 0.25), CATEGORY_AXIS, VALUE_AXIS);
    assert_eq!(category, Some(AxisValue::Category(CategoryKey::from("b"))));
    match value {
        Some(AxisValue::Number(value)) => assert_relative_eq!(value, 75.0, epsilon = 1e-9),
        other => panic!("unexpected value {other:?}"),
    }

    // axes swapped: types do not match
    let (x, y) = area.convert_data_to_point(
        (&AxisValue::Number(50.0), &AxisValue::Number(50.0)),
        VALUE_AXIS,
        CATEGORY_AXIS,
    );
    assert!(x.is_nan() && y.is_nan());
}

#[test]
fn zooming_narrows_the_visible_range() {
    let mut area = chart();
    let presenter = NullPresenter::default();
    area.update_layout(AVAILABLE, Some(&presenter)).expect("layout");

    area.set_view(ChartView {
        zoom_height: 2.0,
        ..ChartView::default()
    });
    area.update_layout(AVAILABLE, Some(&presenter)).expect("layout");

    let value_axis = area.axis(VALUE_AXIS).expect("value axis");
    let visible = value_axis.visible_range();
    assert_eq!(visible.maximum - visible.minimum, rust_decimal::Decimal::new(5, 1));
    assert_relative_eq!(value_axis.zoom(), 2.0);
}

#[test]
fn explicit_invalidation_resets_axes() {
    let mut area = chart();
    area.update_layout(AVAILABLE, Some(&NullPresenter::default()))
        .expect("layout");

    area.invalidate(InvalidationLevel::Full);
    assert!(!area.axis(VALUE_AXIS).expect("value axis").is_updated());
    assert!(area.combine_strategy(CATEGORY_AXIS).is_none());

    area.update_layout(AVAILABLE, Some(&NullPresenter::default()))
        .expect("layout");
    assert!(area.axis(VALUE_AXIS).expect("value axis").is_updated());
}
