//! Continuous numerical axes with a linear or logarithmic scale.
//!
//! Logarithmic axes work in exponent space: the actual range, the major step
//! and every normalized value are expressed in `log_base(value)`, only tick
//! values and converted data are mapped back to the data domain.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::{KindEnv, MAX_GENERATED_TICKS, visible_window};
use crate::axis::label_format::{LabelFormat, LabelValue};
use crate::axis::layout::reflect;
use crate::axis::plot_info::AxisPlotInfo;
use crate::axis::stack_context::StackAggregationContext;
use crate::axis::tick::AxisTick;
use crate::combine::{CombineGroup, CombineStack, StackSums};
use crate::core::primitives::{decimal_from_f64, decimals_are_close, is_zero};
use crate::core::{AxisId, AxisValue, PointRef, RangeExtendDirection, SeriesModel, ValueRange};

pub const DEFAULT_TICK_COUNT: usize = 8;

const DEFAULT_ORIGIN: f64 = 0.0;
/// Spread (relative to the far bound) above which the auto range snaps to zero.
const DELTA_PERCENT: f64 = 16.667 / 100.0;
const EXTEND_FACTOR: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumericalScale {
    Linear,
    Logarithmic { base: f64 },
}

impl NumericalScale {
    /// Maps a data value into axis space; NaN when the log of it is undefined.
    #[must_use]
    pub fn transform(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Logarithmic { base } => {
                if value <= 0.0 {
                    f64::NAN
                } else {
                    value.log(base)
                }
            }
        }
    }

    #[must_use]
    pub fn reverse_transform(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Logarithmic { base } => base.powf(value),
        }
    }

    #[must_use]
    pub fn is_logarithmic(self) -> bool {
        matches!(self, Self::Logarithmic { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericalOptions {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Explicit step; in exponent units on logarithmic axes.
    pub major_step: Option<f64>,
    pub desired_tick_count: Option<usize>,
    pub range_extend_direction: RangeExtendDirection,
}

/// Transformed running stack sum reported to a combine strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackSumValue {
    pub transformed: f64,
    pub positive: bool,
}

/// Rounds a raw step to 1, 2, 5 or 10 times a power of ten.
#[must_use]
pub fn normalize_step(initial_step: f64) -> f64 {
    if !initial_step.is_finite() || initial_step <= 0.0 {
        return 0.0;
    }

    let magnitude = initial_step.log10().floor();
    let power = 10f64.powf(magnitude);
    let digit = (initial_step / power + 0.5).trunc();
    let digit = if digit > 5.0 {
        10.0
    } else if digit > 2.0 {
        5.0
    } else if digit > 1.0 {
        2.0
    } else {
        digit
    };
    digit * power
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericalAxis {
    scale: NumericalScale,
    options: NumericalOptions,
    actual_range: ValueRange<f64>,
    point_min_max: ValueRange<f64>,
    major_step: f64,
    normalized_origin: f64,
    is_stacked100: bool,
    percent_decimal_offset: u32,
}

impl NumericalAxis {
    #[must_use]
    pub fn new(scale: NumericalScale) -> Self {
        Self {
            scale,
            options: NumericalOptions::default(),
            actual_range: ValueRange::new(0.0, 0.0),
            point_min_max: ValueRange::new(0.0, 0.0),
            major_step: 0.0,
            normalized_origin: 0.0,
            is_stacked100: false,
            percent_decimal_offset: 0,
        }
    }

    #[must_use]
    pub fn scale(&self) -> NumericalScale {
        self.scale
    }

    #[must_use]
    pub fn options(&self) -> &NumericalOptions {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut NumericalOptions {
        &mut self.options
    }

    pub(crate) fn set_scale(&mut self, scale: NumericalScale) {
        self.scale = scale;
    }

    /// Range in axis space after extension and step rounding.
    #[must_use]
    pub fn actual_range(&self) -> ValueRange<f64> {
        self.actual_range
    }

    /// Raw extent of the plotted data in axis space.
    #[must_use]
    pub fn point_min_max(&self) -> ValueRange<f64> {
        self.point_min_max
    }

    #[must_use]
    pub fn major_step(&self) -> f64 {
        self.major_step
    }

    #[must_use]
    pub fn normalized_origin(&self) -> f64 {
        self.normalized_origin
    }

    #[must_use]
    pub fn is_stacked100(&self) -> bool {
        self.is_stacked100
    }

    #[must_use]
    pub fn desired_tick_count(&self) -> usize {
        self.user_tick_count().unwrap_or(DEFAULT_TICK_COUNT)
    }

    fn user_tick_count(&self) -> Option<usize> {
        self.options.desired_tick_count.filter(|count| *count > 1)
    }

    #[must_use]
    pub fn calculate_auto_step(&self, range: ValueRange<f64>) -> f64 {
        let step = normalize_step(range.span() / (self.desired_tick_count() - 1) as f64);
        if self.scale.is_logarithmic() {
            // at least one decade per major tick
            step.max(1.0)
        } else {
            step
        }
    }

    pub(crate) fn reset_state(&mut self) {
        self.actual_range = ValueRange::new(0.0, 0.0);
        self.point_min_max = ValueRange::new(0.0, 0.0);
    }

    pub(crate) fn update_core(&mut self, context: &StackAggregationContext<'_>) {
        self.update_actual_range(context);
        self.update_plot_origin();
        self.is_stacked100 = context.is_stacked100;

        trace!(
            axis = context.axis.0,
            minimum = self.actual_range.minimum,
            maximum = self.actual_range.maximum,
            major_step = self.major_step,
            "numerical range updated"
        );
    }

    fn update_actual_range(&mut self, context: &StackAggregationContext<'_>) {
        self.point_min_max = self.calculate_range(context);
        self.actual_range = self.point_min_max;

        if let Some(minimum) = self.options.minimum {
            self.actual_range.minimum = self.scale.transform(minimum);
        }
        if let Some(maximum) = self.options.maximum {
            self.actual_range.maximum = self.scale.transform(maximum);
        }
        self.actual_range.maximum = self.actual_range.maximum.max(self.actual_range.minimum);

        let mut calculator = RangeCalculator::new(
            self.actual_range,
            self.options.range_extend_direction,
            self.options.minimum.is_some(),
            self.options.maximum.is_some(),
        );
        if !context.is_stacked100 {
            self.actual_range = calculator.extend();
        }

        self.major_step = match self.options.major_step {
            Some(step) => step,
            None => self.calculate_auto_step(self.actual_range),
        };

        self.actual_range = calculator.round_to_major_step(self.major_step);
        if let (Some(tick_count), None) = (self.user_tick_count(), self.options.major_step) {
            self.round_to_user_ticks(tick_count);
        }
    }

    fn round_to_user_ticks(&mut self, tick_count: usize) {
        let mut fractional_digits = 0;
        let mut step = self.major_step;
        while step > 0.0 && step < 1.0 {
            fractional_digits += 1;
            step *= 10.0;
        }

        let multiplier = 10f64.powi(fractional_digits);
        let new_step = (self.actual_range.span() / (tick_count - 1) as f64 * multiplier).ceil()
            / multiplier;

        self.major_step = new_step;
        self.actual_range.maximum = (tick_count - 1) as f64 * new_step + self.actual_range.minimum;
    }

    fn calculate_range(&self, context: &StackAggregationContext<'_>) -> ValueRange<f64> {
        if context.is_stacked {
            self.calculate_stacked_range(context)
        } else if context.is_stacked100 {
            calculate_stacked100_range(context)
        } else {
            self.calculate_normal_range(context.series.iter().copied(), context.axis)
        }
    }

    fn calculate_normal_range<'a>(
        &self,
        series: impl Iterator<Item = &'a SeriesModel>,
        axis: AxisId,
    ) -> ValueRange<f64> {
        // the maximum starts at zero so an all-negative extent still reaches the origin
        let mut range = ValueRange::new(f64::INFINITY, 0.0);

        for model in series.filter(|model| model.is_visible) {
            for point in model.points() {
                if let Some(value) = model.value_for_axis(point, axis) {
                    range = self.adjust_range(value, range);
                }
            }
        }

        if range.minimum == f64::INFINITY {
            range.minimum = 0.0;
        } else if range.minimum == range.maximum {
            if range.minimum != 0.0 {
                range.minimum = 0.0;
            } else {
                range.maximum = 1.0;
            }
        }
        range
    }

    fn adjust_range(&self, value: &AxisValue, range: ValueRange<f64>) -> ValueRange<f64> {
        let transform = |value: f64| self.scale.transform(value);
        match value {
            AxisValue::Number(value) => range.include(transform(*value)),
            AxisValue::Range { low, high } | AxisValue::Ohlc { high, low, .. } => {
                range.include(transform(*high)).include(transform(*low))
            }
            AxisValue::DateTime(_) | AxisValue::Category(_) => range,
        }
    }

    fn calculate_stacked_range(&self, context: &StackAggregationContext<'_>) -> ValueRange<f64> {
        let non_combined = self
            .calculate_normal_range(context.non_combined_series.iter().copied(), context.axis);
        ValueRange::new(
            context.minimum_stack_sum.min(non_combined.minimum),
            context.maximum_stack_sum.max(non_combined.maximum),
        )
    }

    fn update_plot_origin(&mut self) {
        let range = self.actual_range;
        self.normalized_origin = if DEFAULT_ORIGIN >= range.maximum {
            1.0
        } else if DEFAULT_ORIGIN > range.minimum {
            (DEFAULT_ORIGIN - range.minimum) / range.span()
        } else {
            0.0
        };
    }

    /// Normalized plot origin as seen by series, inverse applied.
    #[must_use]
    pub fn series_plot_origin(&self, is_inverse: bool) -> f64 {
        if is_inverse {
            1.0 - self.normalized_origin
        } else {
            self.normalized_origin
        }
    }

    pub(crate) fn stack_sum_value(
        &self,
        value: Option<&AxisValue>,
        sums: &mut StackSums,
    ) -> Option<StackSumValue> {
        let raw = match value {
            Some(AxisValue::Number(value)) => *value,
            _ => DEFAULT_ORIGIN,
        };

        let transformed = self.scale.transform(raw);
        if transformed.is_nan() {
            return None;
        }

        let positive = transformed >= DEFAULT_ORIGIN;
        let sum = if positive {
            sums.positive += raw;
            sums.positive
        } else {
            sums.negative += raw;
            sums.negative
        };
        Some(StackSumValue {
            transformed: self.scale.transform(sum),
            positive,
        })
    }

    pub(crate) fn plot_core(
        &self,
        context: &StackAggregationContext<'_>,
        env: &KindEnv,
        plot_infos: &mut IndexMap<PointRef, AxisPlotInfo>,
    ) {
        if context.is_stacked {
            for combined in &context.combined_series {
                for group in &combined.groups {
                    self.plot_combine_group(group, context, env, plot_infos, |_, value| value);
                }
            }
            self.plot_normal(context.non_combined_series.iter().copied(), env, plot_infos);
        } else if context.is_stacked100 {
            for combined in &context.combined_series {
                for group in &combined.groups {
                    self.plot_combine_group(group, context, env, plot_infos, |stack, value| {
                        let total = stack.total();
                        if total == 0.0 { 0.0 } else { value / total }
                    });
                }
            }
        } else {
            self.plot_normal(context.series.iter().copied(), env, plot_infos);
        }
    }

    fn plot_normal<'a>(
        &self,
        series: impl Iterator<Item = &'a SeriesModel>,
        env: &KindEnv,
        plot_infos: &mut IndexMap<PointRef, AxisPlotInfo>,
    ) {
        let delta = self.actual_range.span();

        for model in series.filter(|model| model.is_visible) {
            for (index, point) in model.points().iter().enumerate() {
                if point.is_empty() {
                    continue;
                }
                let Some(value) = model.value_for_axis(point, env.axis) else {
                    continue;
                };

                let info = match value {
                    AxisValue::Number(value) => {
                        let transformed = self.scale.transform(*value);
                        if transformed.is_nan() {
                            continue;
                        }
                        self.scalar_info(delta, transformed, env.is_inverse)
                    }
                    AxisValue::Range { low, high } => self.range_info(
                        delta,
                        self.scale.transform(*low),
                        self.scale.transform(*high),
                        env.is_inverse,
                    ),
                    AxisValue::Ohlc {
                        open,
                        high,
                        low,
                        close,
                    } => self.ohlc_info(
                        delta,
                        [*open, *high, *low, *close].map(|value| self.scale.transform(value)),
                        env.is_inverse,
                    ),
                    AxisValue::DateTime(_) | AxisValue::Category(_) => continue,
                };
                plot_infos.insert(model.point_ref(index), info);
            }
        }
    }

    fn plot_combine_group<F>(
        &self,
        group: &CombineGroup,
        context: &StackAggregationContext<'_>,
        env: &KindEnv,
        plot_infos: &mut IndexMap<PointRef, AxisPlotInfo>,
        stack_value: F,
    ) where
        F: Fn(&CombineStack, f64) -> f64,
    {
        let delta = self.actual_range.span();

        for stack in &group.stacks {
            let mut positive_sum = 0.0;
            let mut negative_sum = 0.0;
            let mut positive_position = self.normalized_origin;
            let mut negative_position = self.normalized_origin;

            for point_ref in &stack.points {
                let Some(model) = context.series_by_id(point_ref.series) else {
                    continue;
                };
                let Some(point) = model.points().get(point_ref.index) else {
                    continue;
                };
                if point.is_empty() {
                    continue;
                }
                let Some(value) = model
                    .value_for_axis(point, env.axis)
                    .and_then(AxisValue::as_number)
                else {
                    continue;
                };

                let positive = value >= DEFAULT_ORIGIN;
                let (values_sum, origin_offset) = if positive {
                    (positive_sum, positive_position)
                } else {
                    (negative_sum, negative_position)
                };
                let values_sum = values_sum + if value.is_nan() { 0.0 } else { value };

                let stack_sum = self.scale.transform(stack_value(stack, values_sum));
                let normalized = if delta == 0.0 {
                    0.0
                } else {
                    (stack_sum - self.actual_range.minimum) / delta
                };

                let info = if env.is_inverse {
                    AxisPlotInfo::Numerical {
                        normalized_value: 1.0 - normalized,
                        normalized_origin: 1.0 - self.normalized_origin,
                        plot_origin_offset: 1.0 - origin_offset,
                        snap_tick_index: self.snap_tick_index(stack_sum),
                    }
                } else {
                    AxisPlotInfo::Numerical {
                        normalized_value: normalized,
                        normalized_origin: self.normalized_origin,
                        plot_origin_offset: origin_offset,
                        snap_tick_index: self.snap_tick_index(stack_sum),
                    }
                };
                plot_infos.insert(*point_ref, info);

                if positive {
                    positive_sum = values_sum;
                    positive_position = normalized;
                } else {
                    negative_sum = values_sum;
                    negative_position = normalized;
                }
            }
        }
    }

    fn normalize(&self, delta: f64, value: f64) -> f64 {
        if delta == 0.0 {
            0.0
        } else {
            (value - self.actual_range.minimum) / delta
        }
    }

    fn scalar_info(&self, delta: f64, value: f64, is_inverse: bool) -> AxisPlotInfo {
        let normalized = self.normalize(delta, value);
        let origin = self.series_plot_origin(is_inverse);
        AxisPlotInfo::Numerical {
            normalized_value: if is_inverse { 1.0 - normalized } else { normalized },
            normalized_origin: origin,
            plot_origin_offset: origin,
            snap_tick_index: self.snap_tick_index(value),
        }
    }

    fn range_info(&self, delta: f64, low: f64, high: f64, is_inverse: bool) -> AxisPlotInfo {
        let normalized_high = self.normalize(delta, high);
        let normalized_low = self.normalize(delta, low).min(normalized_high);
        let flip = |value: f64| if is_inverse { 1.0 - value } else { value };
        AxisPlotInfo::NumericalRange {
            normalized_low: flip(normalized_low),
            normalized_high: flip(normalized_high),
            normalized_origin: self.series_plot_origin(is_inverse),
            snap_tick_index: self.snap_tick_index(high),
            snap_base_tick_index: self.snap_tick_index(low),
        }
    }

    fn ohlc_info(&self, delta: f64, values: [f64; 4], is_inverse: bool) -> AxisPlotInfo {
        let [open, high, low, close] = values;
        let flip = |value: f64| {
            let normalized = self.normalize(delta, value);
            if is_inverse { 1.0 - normalized } else { normalized }
        };
        AxisPlotInfo::Ohlc {
            normalized_open: flip(open),
            normalized_high: flip(high),
            normalized_low: flip(low),
            normalized_close: flip(close),
            normalized_origin: self.series_plot_origin(is_inverse),
            snap_open_tick_index: self.snap_tick_index(open),
            snap_close_tick_index: self.snap_tick_index(close),
        }
    }

    /// Index of the major tick `value` sits on, counted from the range minimum.
    #[must_use]
    pub fn snap_tick_index(&self, value: f64) -> Option<usize> {
        if value < self.actual_range.minimum || value % self.major_step != 0.0 {
            return None;
        }
        let index = (value - self.actual_range.minimum) / self.major_step;
        index.is_finite().then_some(index as usize)
    }

    /// Plot info for an arbitrary data value (annotations, crosshairs).
    #[must_use]
    pub fn create_plot_info(&self, value: f64, is_inverse: bool) -> Option<AxisPlotInfo> {
        if !value.is_finite() {
            return None;
        }
        let transformed = self.scale.transform(value);
        if transformed.is_nan() {
            return None;
        }
        Some(self.scalar_info(self.actual_range.span(), transformed, is_inverse))
    }

    /// Data value at a relative (0..1) axis position.
    #[must_use]
    pub fn value_at(&self, relative_position: f64) -> f64 {
        let value = relative_position * self.actual_range.span() + self.actual_range.minimum;
        self.scale.reverse_transform(value)
    }

    pub(crate) fn on_zoom_changed(&mut self, zoom: f64) {
        if !self.is_stacked100 {
            return;
        }

        self.percent_decimal_offset = 0;
        let mut step = normalize_step(self.major_step / zoom) * 100.0;
        while step > 0.0 && step < 1.0 {
            self.percent_decimal_offset += 1;
            step *= 10.0;
        }
    }

    pub(crate) fn default_label_format(&self) -> LabelFormat {
        if self.is_stacked100 {
            LabelFormat::percent(self.percent_decimal_offset)
        } else {
            LabelFormat::general()
        }
    }

    pub(crate) fn label_value(tick: &AxisTick) -> LabelValue {
        LabelValue::Number(tick.value)
    }

    pub(crate) fn generate_ticks(
        &self,
        visible_range: ValueRange<Decimal>,
        env: &KindEnv,
    ) -> Vec<AxisTick> {
        let span = self.actual_range.span();
        if span.is_nan() || span < 0.0 {
            return Vec::new();
        }

        if span == 0.0 {
            if self.scale.is_logarithmic() {
                return Vec::new();
            }
            let Some(value) = decimal_from_f64(self.actual_range.minimum) else {
                return Vec::new();
            };
            let (start, _) = visible_window(visible_range, env.is_inverse);
            if start > Decimal::ZERO {
                return Vec::new();
            }
            return vec![AxisTick::major(value, reflect(Decimal::ZERO, env.is_inverse))];
        }

        if !self.major_step.is_finite() || self.major_step <= 0.0 {
            return Vec::new();
        }

        match self.scale {
            NumericalScale::Linear => self.linear_ticks(visible_range, env),
            NumericalScale::Logarithmic { base } => self.logarithmic_ticks(visible_range, env, base),
        }
    }

    /// Walks the major-step grid inside the visible window, yielding
    /// `(index, exponent-or-value offset, normalized)` triples.
    fn major_grid(&self, visible_range: ValueRange<Decimal>, env: &KindEnv) -> Vec<(usize, Decimal, Decimal)> {
        let (Some(step), Some(span)) = (
            decimal_from_f64(self.major_step),
            decimal_from_f64(self.actual_range.span()),
        ) else {
            warn!(
                axis = env.axis.0,
                major_step = self.major_step,
                "numerical range is not representable, no ticks generated"
            );
            return Vec::new();
        };
        if span.is_zero() {
            return Vec::new();
        }

        let (start, end) = visible_window(visible_range, env.is_inverse);
        let Some(tick_step) = step.checked_div(span).filter(|tick_step| !tick_step.is_zero()) else {
            return Vec::new();
        };
        let raw_index = start / tick_step;
        let first_index = if decimals_are_close(raw_index, raw_index.floor()) {
            raw_index.floor()
        } else {
            raw_index.ceil()
        };
        let Some(mut index) = first_index.to_usize() else {
            return Vec::new();
        };

        let mut grid = Vec::new();
        loop {
            let Some(offset) = step.checked_mul(Decimal::from(index)) else {
                break;
            };
            let Some(current) = offset.checked_div(span) else {
                break;
            };
            if !(current < end || decimals_are_close(current, end)) {
                break;
            }
            if grid.len() >= MAX_GENERATED_TICKS {
                warn!(axis = env.axis.0, "tick generation capped");
                break;
            }
            grid.push((index, offset, current));
            index += 1;
        }
        grid
    }

    fn linear_ticks(&self, visible_range: ValueRange<Decimal>, env: &KindEnv) -> Vec<AxisTick> {
        let Some(minimum) = decimal_from_f64(self.actual_range.minimum) else {
            return Vec::new();
        };

        self.major_grid(visible_range, env)
            .into_iter()
            .map(|(index, offset, current)| {
                AxisTick::major(minimum + offset, reflect(current, env.is_inverse))
                    .with_virtual_index(index)
            })
            .collect()
    }

    fn logarithmic_ticks(
        &self,
        visible_range: ValueRange<Decimal>,
        env: &KindEnv,
        base: f64,
    ) -> Vec<AxisTick> {
        let minimum = self.actual_range.minimum;
        let span = self.actual_range.span();
        let grid = self.major_grid(visible_range, env);
        let (_, end) = visible_window(visible_range, env.is_inverse);
        let with_minors = is_zero(self.major_step - 1.0) && base.fract() == 0.0 && base >= 3.0;

        let mut ticks = Vec::with_capacity(grid.len());
        for (position, (index, offset, current)) in grid.iter().enumerate() {
            let exponent = minimum + offset.to_f64().unwrap_or_default();
            let Some(value) = decimal_from_f64(self.scale.reverse_transform(exponent)) else {
                warn!(axis = env.axis.0, exponent, "logarithmic tick value out of range");
                continue;
            };
            ticks.push(
                AxisTick::major(value, reflect(*current, env.is_inverse)).with_virtual_index(*index),
            );

            if !with_minors || position + 1 == grid.len() {
                continue;
            }
            let decade_start = self.scale.reverse_transform(exponent);
            for multiplier in 2..(base as u32) {
                let minor_value = f64::from(multiplier) * decade_start;
                let normalized = (self.scale.transform(minor_value) - minimum) / span;
                let (Some(value), Some(normalized)) =
                    (decimal_from_f64(minor_value), decimal_from_f64(normalized))
                else {
                    continue;
                };
                if normalized > end {
                    break;
                }
                ticks.push(AxisTick::minor(value, reflect(normalized, env.is_inverse)));
            }
        }
        ticks
    }
}

fn calculate_stacked100_range(context: &StackAggregationContext<'_>) -> ValueRange<f64> {
    let mut range = ValueRange::empty_accumulator();

    for combined in &context.combined_series {
        for group in &combined.groups {
            for stack in &group.stacks {
                if stack.positive_sum == 0.0 && stack.negative_sum == 0.0 {
                    continue;
                }

                if stack.positive_sum == 0.0 {
                    range.maximum = range.maximum.max(0.0);
                    range.minimum = range.minimum.min(-1.0);
                } else if stack.negative_sum == 0.0 {
                    range.maximum = range.maximum.max(1.0);
                    range.minimum = range.minimum.min(0.0);
                } else {
                    let total = stack.total();
                    range.maximum = range.maximum.max(stack.positive_sum / total);
                    range.minimum = range.minimum.min(stack.negative_sum / total);
                }

                if range.minimum == -1.0 && range.maximum == 1.0 {
                    return range;
                }
            }
        }
    }

    if range.minimum == f64::INFINITY {
        range.minimum = 0.0;
    }
    if range.maximum == f64::NEG_INFINITY {
        range.maximum = 0.0;
    }
    range
}

/// Auto-range extension and step rounding, spreadsheet style.
struct RangeCalculator {
    minimum: f64,
    maximum: f64,
    range: ValueRange<f64>,
    direction: RangeExtendDirection,
    user_minimum: bool,
    user_maximum: bool,
}

impl RangeCalculator {
    fn new(
        range: ValueRange<f64>,
        direction: RangeExtendDirection,
        user_minimum: bool,
        user_maximum: bool,
    ) -> Self {
        Self {
            minimum: range.minimum,
            maximum: range.maximum,
            range,
            direction,
            user_minimum,
            user_maximum,
        }
    }

    fn extend(&mut self) -> ValueRange<f64> {
        if self.direction.extends_negative() && !self.user_minimum {
            self.extend_negative();
        }
        if self.direction.extends_positive() && !self.user_maximum {
            self.extend_positive();
        }
        ValueRange::new(self.minimum, self.maximum)
    }

    fn round_to_major_step(&mut self, step: f64) -> ValueRange<f64> {
        if !step.is_finite() || step <= 0.0 {
            return ValueRange::new(self.minimum, self.maximum);
        }

        if !self.user_maximum {
            let remainder = self.maximum % step;
            if !is_zero(remainder) {
                if remainder > 0.0 {
                    self.maximum += step - remainder;
                } else {
                    self.maximum -= remainder;
                }
            }
        }

        if !self.user_minimum {
            let remainder = self.minimum % step;
            if !is_zero(remainder) {
                if remainder > 0.0 {
                    self.minimum -= remainder;
                } else {
                    self.minimum -= step + remainder;
                }
            }
        }

        ValueRange::new(self.minimum, self.maximum)
    }

    fn extend_positive(&mut self) {
        let delta = self.range.span();
        if self.range.minimum <= 0.0 && self.range.maximum <= 0.0 {
            if delta > DELTA_PERCENT * -self.range.minimum {
                self.maximum = 0.0;
            } else {
                self.maximum = self.range.maximum - (self.range.minimum - self.range.maximum) / 2.0;
            }
        } else {
            self.maximum = self.range.maximum + EXTEND_FACTOR * delta;
        }
    }

    fn extend_negative(&mut self) {
        let delta = self.range.span();
        if self.range.minimum >= 0.0 && self.range.maximum >= 0.0 {
            if delta > DELTA_PERCENT * self.range.maximum {
                self.minimum = 0.0;
            } else {
                self.minimum = self.range.minimum - delta / 2.0;
            }
        } else {
            self.minimum = self.range.minimum + EXTEND_FACTOR * (self.range.minimum - self.range.maximum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::core::{DataPoint, SeriesId};

    fn env() -> KindEnv {
        KindEnv {
            axis: AxisId(1),
            is_inverse: false,
            zoom: 1.0,
        }
    }

    fn series(values: &[f64]) -> SeriesModel {
        SeriesModel::new(SeriesId(1), AxisId(0), AxisId(1)).with_points(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| DataPoint::numeric(format!("c{i}"), *v)),
        )
    }

    #[test]
    fn steps_normalize_to_one_two_five() {
        assert_relative_eq!(normalize_step(0.7), 1.0);
        assert_relative_eq!(normalize_step(1.4), 1.0);
        assert_relative_eq!(normalize_step(1.6), 2.0);
        assert_relative_eq!(normalize_step(3.2), 5.0);
        assert_relative_eq!(normalize_step(14.0), 10.0);
        assert_relative_eq!(normalize_step(62.0), 100.0);
        assert_eq!(normalize_step(0.0), 0.0);
    }

    #[test]
    fn auto_range_snaps_to_zero_and_extends() {
        let model = series(&[10.0, 100.0]);
        let context = StackAggregationContext::unstacked(AxisId(1), vec![&model]);
        let mut axis = NumericalAxis::new(NumericalScale::Linear);
        axis.update_core(&context);
        // snapped to 0, extended to 104.5, step 10 from 104.5 / 7
        assert_relative_eq!(axis.major_step(), 10.0);
        assert_eq!(axis.actual_range().minimum, 0.0);
        assert_relative_eq!(axis.actual_range().maximum, 110.0);
    }

    #[test]
    fn negative_extent_keeps_zero_as_maximum() {
        let model = series(&[-40.0, -10.0]);
        let context = StackAggregationContext::unstacked(AxisId(1), vec![&model]);
        let mut axis = NumericalAxis::new(NumericalScale::Linear);
        axis.update_core(&context);
        assert_eq!(axis.point_min_max().maximum, 0.0);
        assert!(axis.actual_range().minimum <= -40.0);
        assert_relative_eq!(axis.normalized_origin(), 1.0);
    }

    #[test]
    fn single_value_is_anchored_at_zero() {
        let model = series(&[0.0]);
        let context = StackAggregationContext::unstacked(AxisId(1), vec![&model]);
        let axis = NumericalAxis::new(NumericalScale::Linear);
        assert_eq!(
            axis.calculate_normal_range(context.series.iter().copied(), AxisId(1)),
            ValueRange::new(0.0, 1.0)
        );
    }

    #[test]
    fn user_bounds_are_not_extended() {
        let model = series(&[3.0, 7.0]);
        let context = StackAggregationContext::unstacked(AxisId(1), vec![&model]);
        let mut axis = NumericalAxis::new(NumericalScale::Linear);
        axis.options_mut().minimum = Some(0.0);
        axis.options_mut().maximum = Some(100.0);
        axis.options_mut().major_step = Some(25.0);
        axis.update_core(&context);
        assert_eq!(axis.actual_range(), ValueRange::new(0.0, 100.0));

        let ticks = axis.generate_ticks(ValueRange::UNIT, &env());
        let values: Vec<Decimal> = ticks.iter().map(|tick| tick.value).collect();
        assert_eq!(
            values,
            [0, 25, 50, 75, 100].map(Decimal::from).to_vec()
        );
    }

    #[test]
    fn user_tick_count_reshapes_the_step() {
        let model = series(&[0.0, 9.0]);
        let context = StackAggregationContext::unstacked(AxisId(1), vec![&model]);
        let mut axis = NumericalAxis::new(NumericalScale::Linear);
        axis.options_mut().desired_tick_count = Some(4);
        axis.update_core(&context);
        assert_relative_eq!(axis.major_step(), 4.0);
        assert_relative_eq!(axis.actual_range().maximum, 12.0);
    }

    #[test]
    fn zero_width_range_yields_single_tick() {
        let model = series(&[]);
        let context = StackAggregationContext::unstacked(AxisId(1), vec![&model]);
        let mut axis = NumericalAxis::new(NumericalScale::Linear);
        axis.options_mut().minimum = Some(5.0);
        axis.options_mut().maximum = Some(5.0);
        axis.update_core(&context);
        assert_eq!(axis.generate_ticks(ValueRange::UNIT, &env()).len(), 1);

        let mut logarithmic = NumericalAxis::new(NumericalScale::Logarithmic { base: 10.0 });
        logarithmic.options_mut().minimum = Some(5.0);
        logarithmic.options_mut().maximum = Some(5.0);
        logarithmic.update_core(&context);
        assert!(logarithmic.generate_ticks(ValueRange::UNIT, &env()).is_empty());
    }

    #[test]
    fn logarithmic_ticks_cover_decades_with_minors() {
        let model = series(&[1.0, 1000.0]);
        let context = StackAggregationContext::unstacked(AxisId(1), vec![&model]);
        let mut axis = NumericalAxis::new(NumericalScale::Logarithmic { base: 10.0 });
        axis.update_core(&context);
        // three decades extended by 5% then rounded up to the next decade
        assert_eq!(axis.actual_range(), ValueRange::new(0.0, 4.0));

        let ticks = axis.generate_ticks(ValueRange::UNIT, &env());
        let majors: Vec<Decimal> = ticks
            .iter()
            .filter(|tick| tick.is_major())
            .map(|tick| tick.value)
            .collect();
        assert_eq!(majors, [1, 10, 100, 1000, 10_000].map(Decimal::from).to_vec());
        assert_eq!(ticks.len() - majors.len(), 4 * 8);
    }

    #[test]
    fn stack_sums_split_by_sign() {
        let axis = NumericalAxis::new(NumericalScale::Linear);
        let mut sums = StackSums::default();
        let first = axis
            .stack_sum_value(Some(&AxisValue::Number(3.0)), &mut sums)
            .expect("finite value");
        let second = axis
            .stack_sum_value(Some(&AxisValue::Number(-2.0)), &mut sums)
            .expect("finite value");
        let third = axis
            .stack_sum_value(Some(&AxisValue::Number(4.0)), &mut sums)
            .expect("finite value");
        assert!(first.positive && !second.positive);
        assert_relative_eq!(third.transformed, 7.0);
        assert_relative_eq!(second.transformed, -2.0);
        assert!(
            axis.stack_sum_value(Some(&AxisValue::Number(f64::NAN)), &mut sums)
                .is_none()
        );
    }

    #[test]
    fn snap_index_requires_a_step_multiple() {
        let model = series(&[]);
        let context = StackAggregationContext::unstacked(AxisId(1), vec![&model]);
        let mut axis = NumericalAxis::new(NumericalScale::Linear);
        axis.options_mut().minimum = Some(0.0);
        axis.options_mut().maximum = Some(100.0);
        axis.options_mut().major_step = Some(25.0);
        axis.update_core(&context);
        assert_eq!(axis.snap_tick_index(50.0), Some(2));
        assert_eq!(axis.snap_tick_index(40.0), None);
        assert_eq!(axis.snap_tick_index(-25.0), None);
    }

    #[test]
    fn stacked100_zoom_adds_percent_decimals() {
        let mut axis = NumericalAxis::new(NumericalScale::Linear);
        axis.is_stacked100 = true;
        axis.major_step = 0.1;
        axis.on_zoom_changed(50.0);
        // 0.1 / 50 normalizes to 0.002, i.e. 0.2 percent
        assert_eq!(axis.default_label_format(), LabelFormat::percent(1));
    }
}
