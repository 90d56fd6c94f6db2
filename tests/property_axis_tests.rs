use chart_axis::axis::{AxisTick, TickPosition, link_ticks};
use chart_axis::core::{AxisId, AxisType, DataPoint, SeriesId, SeriesModel, Size};
use chart_axis::{AxisModel, NullPresenter, StackAggregationContext};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn laid_out_axis(
    minimum: f64,
    span: f64,
    steps: u32,
    label_offset: usize,
    label_interval: usize,
    is_inverse: bool,
) -> (AxisModel, SeriesModel) {
    let series = SeriesModel::new(SeriesId(1), AxisId(0), AxisId(1))
        .with_points([DataPoint::numeric("a", minimum + span / 3.0)]);

    let mut axis = AxisModel::linear(AxisId(1), AxisType::Second);
    axis.set_numerical_range(Some(minimum), Some(minimum + span))
        .expect("valid range");
    axis.set_major_step(span / f64::from(steps))
        .expect("valid step");
    axis.set_label_offset(label_offset);
    axis.set_label_interval(label_interval)
        .expect("valid interval");
    axis.set_is_inverse(is_inverse);

    let context = StackAggregationContext::unstacked(axis.id(), vec![&series]);
    axis.update(&context);
    axis.plot(&context);
    axis.measure(Some(&NullPresenter::default()), Size::new(80.0, 400.0))
        .expect("measure should succeed");
    (axis, series)
}

proptest! {
    #[test]
    fn ticks_stay_inside_the_unit_interval(
        minimum in -1_000.0f64..1_000.0,
        span in 1.0f64..1_000.0,
        steps in 1u32..20,
        is_inverse in any::<bool>()
    ) {
        let (axis, _) = laid_out_axis(minimum, span, steps, 0, 1, is_inverse);
        let tolerance = Decimal::new(1, 9);

        prop_assert!(axis.ticks().len() >= 2);
        for tick in axis.ticks() {
            prop_assert!(tick.normalized_value >= -tolerance);
            prop_assert!(tick.normalized_value <= Decimal::ONE + tolerance);
        }
        for pair in axis.ticks().windows(2) {
            if is_inverse {
                prop_assert!(pair[0].normalized_value > pair[1].normalized_value);
            } else {
                prop_assert!(pair[0].normalized_value < pair[1].normalized_value);
            }
        }
    }

    #[test]
    fn labels_follow_offset_and_interval(
        steps in 1u32..20,
        label_offset in 0usize..4,
        label_interval in 1usize..5
    ) {
        let (axis, _) = laid_out_axis(0.0, 100.0, steps, label_offset, label_interval, false);
        let majors = axis.major_tick_count();
        let expected = majors.saturating_sub(label_offset).div_ceil(label_interval);

        prop_assert_eq!(axis.labels().len(), expected);
        for (index, label) in axis.labels().iter().enumerate() {
            prop_assert_eq!(label.tick_index, label_offset + index * label_interval);
            prop_assert_eq!(axis.ticks()[label.tick_index].associated_label, Some(index));
        }
    }

    #[test]
    fn inverse_plot_infos_mirror_the_regular_ones(
        minimum in -500.0f64..500.0,
        span in 1.0f64..500.0,
        steps in 1u32..10
    ) {
        let (regular, series) = laid_out_axis(minimum, span, steps, 0, 1, false);
        let (inverse, _) = laid_out_axis(minimum, span, steps, 0, 1, true);
        let point = series.point_ref(0);

        let regular = regular.plot_info(point).expect("plotted").normalized_position();
        let inverse = inverse.plot_info(point).expect("plotted").normalized_position();
        prop_assert!((regular + inverse - 1.0).abs() <= 1e-9);
        prop_assert!((regular - 1.0 / 3.0).abs() <= 1e-9);
    }

    #[test]
    fn tick_offset_drops_leading_major_ticks(
        count in 1usize..40,
        offset in 0usize..10
    ) {
        let last = Decimal::from(count as u64);
        let generated = (0..count).map(|i| {
            let value = Decimal::from(i as u64);
            AxisTick::major(value, value / last)
        });
        let (ticks, majors) = link_ticks(generated, offset);

        prop_assert_eq!(ticks.len(), count.saturating_sub(offset));
        prop_assert_eq!(majors, ticks.len());
        if let Some(first) = ticks.first() {
            prop_assert_eq!(first.value, Decimal::from(offset as u64));
            prop_assert_eq!(first.previous, None);
        }
        if ticks.len() > 1 {
            prop_assert_eq!(ticks[0].position, TickPosition::First);
            prop_assert_eq!(ticks[ticks.len() - 1].position, TickPosition::Last);
        }
        for (index, tick) in ticks.iter().enumerate().skip(1) {
            prop_assert_eq!(tick.previous, Some(index - 1));
        }
    }
}
