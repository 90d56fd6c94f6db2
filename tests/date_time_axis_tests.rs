use approx::assert_relative_eq;
use chart_axis::axis::AxisPlotInfo;
use chart_axis::core::{
    AxisId, AxisPlotMode, AxisType, AxisValue, DataPoint, DateTimePlotStretch, SeriesId,
    SeriesModel, Size, TimeInterval, ValueRange,
};
use chart_axis::{AxisModel, NullPresenter, StackAggregationContext};
use chrono::{DateTime, TimeZone, Utc};

fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .expect("valid day")
}

fn month(month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0)
        .single()
        .expect("valid month")
}

fn series(times: &[DateTime<Utc>]) -> SeriesModel {
    SeriesModel::new(SeriesId(1), AxisId(0), AxisId(1))
        .with_points(times.iter().map(|time| DataPoint::timed(*time, 1.0)))
}

fn axis_with_mode(plot_mode: Option<AxisPlotMode>) -> AxisModel {
    let mut axis = AxisModel::date_time(AxisId(0), AxisType::First);
    axis.set_plot_mode(plot_mode).expect("date-time setter");
    axis
}

fn measured(axis: &mut AxisModel, model: &SeriesModel) {
    let context = StackAggregationContext::unstacked(axis.id(), vec![model]);
    axis.update(&context);
    axis.plot(&context);
    axis.measure(Some(&NullPresenter::default()), Size::new(600.0, 40.0))
        .expect("measure should succeed");
}

fn contents(axis: &AxisModel) -> Vec<&str> {
    axis.labels()
        .iter()
        .map(|label| label.content.as_str())
        .collect()
}

#[test]
fn daily_points_on_ticks_label_every_day() {
    let model = series(&[day(1), day(2), day(3), day(4), day(5)]);
    let mut axis = axis_with_mode(Some(AxisPlotMode::OnTicks));
    measured(&mut axis, &model);

    assert_eq!(axis.ticks().len(), 5);
    assert_eq!(
        contents(&axis),
        vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
    );

    let third = axis.plot_info(model.point_ref(2)).expect("plotted");
    assert_relative_eq!(third.normalized_position(), 0.5);

    let date_axis = axis.date_time_axis().expect("date-time axis");
    assert_eq!(date_axis.actual_range(), Some(ValueRange::new(day(1), day(5))));
    assert_eq!(date_axis.time_slots().len(), 5);
}

#[test]
fn between_ticks_series_extend_the_axis_by_one_step() {
    let model = series(&[day(1), day(2), day(3), day(4), day(5)])
        .with_default_plot_mode(AxisPlotMode::BetweenTicks);
    let mut axis = axis_with_mode(None);
    measured(&mut axis, &model);

    assert_eq!(axis.actual_plot_mode(), AxisPlotMode::BetweenTicks);
    assert_eq!(axis.ticks().len(), 6);
    assert_eq!(axis.labels().len(), 5);

    match axis.plot_info(model.point_ref(0)).expect("plotted") {
        AxisPlotInfo::Categorical {
            position, length, ..
        } => {
            assert_relative_eq!(*position, 0.1, epsilon = 1e-12);
            // one-day slot of a five-day extent, 30% gap
            assert_relative_eq!(*length, 0.14, epsilon = 1e-12);
        }
        other => panic!("unexpected plot info {other:?}"),
    }
}

#[test]
fn monthly_points_step_by_calendar_month() {
    let model = series(&[month(1), month(2), month(3), month(4)]);
    let mut axis = axis_with_mode(Some(AxisPlotMode::OnTicks));
    measured(&mut axis, &model);

    let date_axis = axis.date_time_axis().expect("date-time axis");
    assert_eq!(date_axis.month_step(), Some(1));
    assert_eq!(
        contents(&axis),
        vec!["2024-01", "2024-02", "2024-03", "2024-04"]
    );
}

#[test]
fn single_date_falls_back_to_a_day_resolution() {
    let model = series(&[day(7)]);
    let mut axis = axis_with_mode(Some(AxisPlotMode::OnTicks));
    measured(&mut axis, &model);

    let date_axis = axis.date_time_axis().expect("date-time axis");
    assert_eq!(date_axis.min_delta_millis(), 86_400_000);
    assert_eq!(date_axis.time_slots().len(), 1);
    assert_eq!(date_axis.time_slots()[0].length_millis, 86_400_000);
    assert!(axis.plot_info(model.point_ref(0)).is_some());
}

#[test]
fn user_step_drives_the_tick_interval() {
    let model = series(&[day(1), day(2), day(3), day(4), day(5)]);
    let mut axis = axis_with_mode(Some(AxisPlotMode::OnTicks));
    axis.set_major_step(2.0).expect("date-time step");
    axis.set_major_step_unit(TimeInterval::Day)
        .expect("date-time setter");
    measured(&mut axis, &model);

    let date_axis = axis.date_time_axis().expect("date-time axis");
    assert_relative_eq!(date_axis.tick_interval_millis(), 2.0 * 86_400_000.0);
    assert_eq!(
        contents(&axis),
        vec!["2024-01-01", "2024-01-03", "2024-01-05"]
    );
}

#[test]
fn uniform_stretch_divides_by_point_count() {
    let model = series(&[day(1), day(2), day(3), day(4)]);
    let mut axis = axis_with_mode(Some(AxisPlotMode::OnTicks));
    axis.set_plot_stretch(DateTimePlotStretch::Uniform)
        .expect("date-time setter");
    measured(&mut axis, &model);

    match axis.plot_info(model.point_ref(1)).expect("plotted") {
        AxisPlotInfo::Categorical { length, .. } => {
            assert_relative_eq!(*length, 0.7 / 4.0, epsilon = 1e-12);
        }
        other => panic!("unexpected plot info {other:?}"),
    }
}

#[test]
fn maximum_ticks_caps_the_tick_count() {
    let times: Vec<DateTime<Utc>> = (1..=31).map(day).collect();
    let model = series(&times);
    let mut axis = axis_with_mode(Some(AxisPlotMode::OnTicks));
    axis.set_maximum_ticks(Some(7)).expect("date-time setter");
    measured(&mut axis, &model);

    assert!(axis.major_tick_count() <= 7);
    assert!(axis.major_tick_count() >= 2);
}

#[test]
fn physical_coordinates_resolve_to_dates() {
    let model = series(&[day(1), day(2), day(3), day(4), day(5)]);
    let mut axis = axis_with_mode(Some(AxisPlotMode::OnTicks));
    measured(&mut axis, &model);

    let rect = chart_axis::core::Rect::new(0.0, 0.0, 400.0, 40.0);
    assert_eq!(
        axis.convert_physical_to_data(100.0, rect),
        Some(AxisValue::DateTime(day(2)))
    );
    assert_eq!(
        axis.create_plot_info(&AxisValue::DateTime(day(4)))
            .map(|info| info.normalized_position()),
        Some(0.75)
    );
}

#[test]
fn numerical_only_setters_are_rejected() {
    let mut axis = AxisModel::date_time(AxisId(0), AxisType::First);
    assert!(axis.set_logarithm_base(10.0).is_err());
    assert!(axis.set_desired_tick_count(5).is_err());
    assert!(axis.set_auto_group(false).is_err());
}
