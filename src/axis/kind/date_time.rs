//! Continuous date-time axis.
//!
//! Positions are computed in epoch milliseconds. Calendar steps (months and
//! years) are walked with `chrono` so month lengths and leap years line up
//! with real dates; every other step is a fixed number of milliseconds.

use chrono::{DateTime, Months, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::{KindEnv, MAX_GENERATED_TICKS};
use crate::axis::label_format::{LabelFormat, LabelValue};
use crate::axis::layout::reflect;
use crate::axis::plot_info::AxisPlotInfo;
use crate::axis::stack_context::StackAggregationContext;
use crate::axis::tick::AxisTick;
use crate::core::primitives::{datetime_to_millis, decimals_are_close, millis_to_datetime};
use crate::core::{
    AxisPlotMode, CategoryKey, DateTimePlotStretch, PointRef, TimeInterval, ValueRange,
    select_plot_mode,
};

pub const DEFAULT_MAXIMUM_TICKS: usize = 31;
pub const DEFAULT_GAP_LENGTH: f64 = 0.3;

const SECOND_MILLIS: f64 = 1_000.0;
const MINUTE_MILLIS: f64 = 60.0 * SECOND_MILLIS;
const HOUR_MILLIS: f64 = 60.0 * MINUTE_MILLIS;
const DAY_MILLIS: f64 = 24.0 * HOUR_MILLIS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateTimeOptions {
    pub minimum: Option<DateTime<Utc>>,
    pub maximum: Option<DateTime<Utc>>,
    /// Step counted in `major_step_unit`; `None` infers it from the data.
    pub major_step: Option<f64>,
    pub major_step_unit: TimeInterval,
    pub gap_length: f64,
    pub plot_mode: Option<AxisPlotMode>,
    pub maximum_ticks: Option<usize>,
    pub plot_stretch: DateTimePlotStretch,
}

impl Default for DateTimeOptions {
    fn default() -> Self {
        Self {
            minimum: None,
            maximum: None,
            major_step: None,
            major_step_unit: TimeInterval::Year,
            gap_length: DEFAULT_GAP_LENGTH,
            plot_mode: None,
            maximum_ticks: None,
            plot_stretch: DateTimePlotStretch::TickSlot,
        }
    }
}

/// Interval of the timeline shared by the points falling into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_millis: i64,
    pub length_millis: i64,
    pub point_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct DateTimePoint {
    millis: i64,
    point: PointRef,
    series_point_count: usize,
    slot: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PlotExtent {
    minimum: i64,
    maximum: i64,
    /// Space appended after the last date in between-ticks layouts.
    extend: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeAxis {
    options: DateTimeOptions,
    values: Vec<DateTimePoint>,
    slots: Vec<TimeSlot>,
    actual_plot_mode: AxisPlotMode,
    actual_range: ValueRange<i64>,
    plot: PlotExtent,
    month_step: Option<u32>,
    year_step: Option<u32>,
    major_step: f64,
    tick_interval: f64,
    min_delta: i64,
    tick_zoom_factor: f64,
    visible_ticks: Option<ValueRange<i64>>,
}

impl Default for DateTimeAxis {
    fn default() -> Self {
        Self::new()
    }
}

impl DateTimeAxis {
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: DateTimeOptions::default(),
            values: Vec::new(),
            slots: Vec::new(),
            actual_plot_mode: AxisPlotMode::BetweenTicks,
            actual_range: ValueRange::new(0, 0),
            plot: PlotExtent::default(),
            month_step: None,
            year_step: None,
            major_step: 0.0,
            tick_interval: 0.0,
            min_delta: 0,
            tick_zoom_factor: 1.0,
            visible_ticks: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &DateTimeOptions {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut DateTimeOptions {
        &mut self.options
    }

    #[must_use]
    pub fn actual_plot_mode(&self) -> AxisPlotMode {
        self.actual_plot_mode
    }

    /// Resolved date range, once data or user bounds are known.
    #[must_use]
    pub fn actual_range(&self) -> Option<ValueRange<DateTime<Utc>>> {
        if self.values.is_empty() {
            return None;
        }
        Some(ValueRange::new(
            millis_to_datetime(self.actual_range.minimum)?,
            millis_to_datetime(self.actual_range.maximum)?,
        ))
    }

    #[must_use]
    pub fn min_delta_millis(&self) -> i64 {
        self.min_delta
    }

    #[must_use]
    pub fn tick_interval_millis(&self) -> f64 {
        self.tick_interval
    }

    #[must_use]
    pub fn tick_zoom_factor(&self) -> f64 {
        self.tick_zoom_factor
    }

    #[must_use]
    pub fn month_step(&self) -> Option<u32> {
        self.month_step
    }

    #[must_use]
    pub fn year_step(&self) -> Option<u32> {
        self.year_step
    }

    #[must_use]
    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    #[must_use]
    pub fn maximum_ticks(&self) -> usize {
        self.options.maximum_ticks.unwrap_or(DEFAULT_MAXIMUM_TICKS)
    }

    fn can_plot(&self) -> bool {
        !self.values.is_empty() && self.min_delta > 0
    }

    pub(crate) fn reset_state(&mut self) {
        self.visible_ticks = None;
    }

    pub(crate) fn reset(&mut self) {
        self.values.clear();
        self.slots.clear();
    }

    pub(crate) fn update_core(&mut self, context: &StackAggregationContext<'_>, env: &KindEnv) {
        self.build_values(context);
        self.slots.clear();
        self.min_delta = 0;
        if self.values.is_empty() {
            return;
        }

        self.actual_plot_mode = match self.options.plot_mode {
            Some(plot_mode) => plot_mode,
            None => select_plot_mode(context.series.iter().copied()),
        };
        self.update_actual_range();
        self.find_min_delta();

        if !self.can_plot() {
            return;
        }

        self.update_units(env.zoom);
        self.update_plot_extent();
        self.build_time_slots();

        trace!(
            axis = env.axis.0,
            values = self.values.len(),
            slots = self.slots.len(),
            min_delta = self.min_delta,
            tick_interval = self.tick_interval,
            "date-time axis updated"
        );
    }

    fn build_values(&mut self, context: &StackAggregationContext<'_>) {
        self.values.clear();
        for model in context.series.iter().filter(|model| model.is_visible) {
            let series_point_count = model.points().len();
            for (index, point) in model.points().iter().enumerate() {
                let Some(time) = model
                    .value_for_axis(point, context.axis)
                    .and_then(|value| value.as_datetime())
                else {
                    continue;
                };
                self.values.push(DateTimePoint {
                    millis: datetime_to_millis(time),
                    point: model.point_ref(index),
                    series_point_count,
                    slot: None,
                });
            }
        }
        self.values.sort_by_key(|value| value.millis);
    }

    fn update_actual_range(&mut self) {
        let (Some(first), Some(last)) = (self.values.first(), self.values.last()) else {
            return;
        };
        let mut range = ValueRange::new(first.millis, last.millis);
        if let Some(minimum) = self.options.minimum {
            range.minimum = datetime_to_millis(minimum);
        }
        if let Some(maximum) = self.options.maximum {
            range.maximum = datetime_to_millis(maximum);
        }
        self.actual_range = range;
    }

    fn find_min_delta(&mut self) {
        self.min_delta = self
            .values
            .windows(2)
            .map(|pair| pair[1].millis - pair[0].millis)
            .filter(|delta| *delta > 0)
            .min()
            .unwrap_or(0);

        // a single distinct date gets a one-day resolution
        if self.min_delta == 0 {
            self.min_delta = DAY_MILLIS as i64;
        }
    }

    fn update_units(&mut self, zoom: f64) {
        self.month_step = None;
        self.year_step = None;

        let range = (self.actual_range.maximum - self.actual_range.minimum) as f64;
        let interval = match self.options.major_step {
            Some(step) => self.user_step(step).min(range),
            None => {
                let mut interval = self.min_delta as f64;
                if self.options.maximum_ticks.is_none() {
                    let days = interval / DAY_MILLIS;
                    if is_month_like(days) {
                        self.month_step = Some(1);
                    } else if is_year_like(days) {
                        self.year_step = Some(1);
                    }
                }

                let maximum_ticks = self.maximum_ticks().max(2) as f64;
                let tick_count = (range / interval / zoom).trunc();
                if tick_count > maximum_ticks - 1.0 {
                    interval = (range / (maximum_ticks - 1.0)).trunc();
                }
                interval
            }
        };

        self.tick_interval = interval;
        self.major_step = interval;

        // equal dates leave no usable step
        if self.major_step <= 0.0 {
            self.month_step = Some(1);
        }

        self.tick_zoom_factor = self.calculate_tick_zoom_factor(zoom);
    }

    fn user_step(&mut self, step: f64) -> f64 {
        match self.options.major_step_unit {
            TimeInterval::Millisecond => step,
            TimeInterval::Second => step * SECOND_MILLIS,
            TimeInterval::Minute => step * MINUTE_MILLIS,
            TimeInterval::Hour => step * HOUR_MILLIS,
            TimeInterval::Day => step * DAY_MILLIS,
            TimeInterval::Week => 7.0 * step * DAY_MILLIS,
            TimeInterval::Month => {
                self.month_step = Some(step as u32);
                30.0 * step * DAY_MILLIS
            }
            TimeInterval::Quarter => {
                self.month_step = Some(step as u32 * 3);
                30.0 * step * DAY_MILLIS
            }
            TimeInterval::Year => {
                self.year_step = Some(step as u32);
                365.0 * step * DAY_MILLIS
            }
        }
    }

    fn calculate_tick_zoom_factor(&self, zoom: f64) -> f64 {
        let factor = if self.tick_interval / zoom < self.min_delta as f64 {
            self.tick_interval / self.min_delta as f64
        } else {
            zoom - zoom % 2.0
        };
        factor.max(1.0)
    }

    fn update_plot_extent(&mut self) {
        let mut plot = PlotExtent {
            minimum: self.actual_range.minimum,
            maximum: self.actual_range.maximum,
            extend: 0,
        };

        if matches!(
            self.actual_plot_mode,
            AxisPlotMode::BetweenTicks | AxisPlotMode::OnTicksPadded
        ) {
            if let Some(next) = self.next_millis(plot.maximum, self.tick_zoom_factor) {
                plot.extend = next - plot.maximum;
                plot.maximum = next;
            }
        } else if plot.minimum == plot.maximum {
            if let Some(next) = self.next_millis(plot.minimum, self.tick_zoom_factor) {
                plot.maximum = next;
            }
        }
        self.plot = plot;
    }

    fn build_time_slots(&mut self) {
        self.slots.clear();
        let (Some(first), Some(last)) = (self.values.first(), self.values.last()) else {
            return;
        };
        let (start, end) = (first.millis, last.millis);

        if start == end {
            let slot_start = self.actual_range.minimum;
            let length = self
                .next_millis(slot_start, 1.0)
                .map_or(0, |next| next - slot_start);
            self.slots.push(TimeSlot {
                start_millis: slot_start,
                length_millis: length,
                point_count: self.values.len(),
            });
            for value in &mut self.values {
                value.slot = Some(0);
            }
            return;
        }

        let mut index = 0;
        let mut current = start;
        while current <= end && index < self.values.len() {
            let Some(mut next) = self.next_millis(current, 1.0) else {
                break;
            };

            // fixed steps jump straight to the slot of the next point
            if self.values[index].millis >= next && self.is_fixed_step() {
                let step = next - current;
                let skipped = (self.values[index].millis - current) / step;
                current += skipped * step;
                next = current + step;
            }

            if self.values[index].millis < next {
                let slot = self.slots.len();
                self.slots.push(TimeSlot {
                    start_millis: current,
                    length_millis: next - current,
                    point_count: 0,
                });
                while index < self.values.len() && self.values[index].millis < next {
                    self.values[index].slot = Some(slot);
                    self.slots[slot].point_count += 1;
                    index += 1;
                }
            }
            current = next;
        }
    }

    fn is_fixed_step(&self) -> bool {
        self.month_step.is_none() && self.year_step.is_none()
    }

    fn next_millis(&self, current: i64, zoom: f64) -> Option<i64> {
        self.shift_millis(current, zoom, true)
    }

    fn previous_millis(&self, current: i64, zoom: f64) -> Option<i64> {
        self.shift_millis(current, zoom, false)
    }

    fn shift_millis(&self, current: i64, zoom: f64, forward: bool) -> Option<i64> {
        let calendar_months = if let Some(month_step) = self.month_step {
            Some(scaled_step(month_step, zoom))
        } else {
            self.year_step
                .map(|year_step| scaled_step(year_step, zoom).saturating_mul(12))
        };

        if let Some(months) = calendar_months {
            let date = millis_to_datetime(current)?;
            let shifted = if forward {
                date.checked_add_months(Months::new(months))
            } else {
                date.checked_sub_months(Months::new(months))
            }?;
            return Some(datetime_to_millis(shifted));
        }

        let step = ((self.major_step / zoom).round() as i64).max(1);
        if forward {
            current.checked_add(step)
        } else {
            current.checked_sub(step)
        }
    }

    pub(crate) fn plot_core(&self, env: &KindEnv, plot_infos: &mut IndexMap<PointRef, AxisPlotInfo>) {
        if !self.can_plot() {
            return;
        }
        let delta = (self.plot.maximum - self.plot.minimum) as f64;
        if delta <= 0.0 {
            return;
        }
        let extend = self.plot.extend as f64 / 2.0;
        let gap = self.options.gap_length;

        for value in &self.values {
            let Some(slot) = value.slot.and_then(|slot| self.slots.get(slot)) else {
                debug_assert!(false, "every date-time point belongs to a time slot");
                continue;
            };
            let Some(time) = millis_to_datetime(value.millis) else {
                continue;
            };

            let point_position = (value.millis - self.plot.minimum) as f64 / delta + extend / delta;
            let slot_length = slot.length_millis as f64 / delta;
            let length = match self.options.plot_stretch {
                DateTimePlotStretch::Uniform => (1.0 - gap) / value.series_point_count.max(1) as f64,
                DateTimePlotStretch::TickSlot => (1.0 - gap) * slot_length,
            };

            plot_infos.insert(
                value.point,
                AxisPlotInfo::Categorical {
                    category_key: CategoryKey::DateTime(time),
                    value: point_position - slot_length / 2.0,
                    position: if env.is_inverse {
                        1.0 - point_position
                    } else {
                        point_position
                    },
                    length,
                },
            );
        }
    }

    /// Returns `true` when the plot extent moved and plot infos are stale.
    pub(crate) fn on_zoom_changed(&mut self, zoom: f64) -> bool {
        if !self.can_plot() {
            return false;
        }

        let previous_factor = self.tick_zoom_factor;
        self.update_units(zoom);
        if previous_factor == self.tick_zoom_factor {
            return false;
        }

        self.visible_ticks = None;
        if self.actual_plot_mode == AxisPlotMode::BetweenTicks {
            self.update_plot_extent();
            return true;
        }
        false
    }

    pub(crate) fn generate_ticks(
        &mut self,
        visible_range: ValueRange<Decimal>,
        env: &KindEnv,
    ) -> Vec<AxisTick> {
        if !self.can_plot() || self.plot.minimum >= self.plot.maximum {
            return Vec::new();
        }

        let visible_ticks = self.update_visible_ticks(visible_range);
        let minimum = Decimal::from(self.plot.minimum);
        let delta = Decimal::from(self.plot.maximum - self.plot.minimum);

        let start = ((Decimal::from(visible_ticks.minimum) - minimum) / delta).max(Decimal::ZERO);
        let end = ((Decimal::from(visible_ticks.maximum) - minimum) / delta).min(Decimal::ONE);
        let mut current = start;
        let mut padded = start;
        let mut virtual_index = (start * Decimal::from(self.values.len()))
            .trunc()
            .to_usize()
            .unwrap_or(0);

        if self.actual_plot_mode == AxisPlotMode::OnTicksPadded {
            if let Some(next) = self.next_millis(self.plot.minimum, self.tick_zoom_factor) {
                padded += Decimal::from(next - self.plot.minimum) / delta / Decimal::TWO;
            }
        }

        let mut ticks = Vec::new();
        while padded < end || decimals_are_close(padded, end) {
            if ticks.len() >= MAX_GENERATED_TICKS {
                warn!(axis = env.axis.0, "date-time tick generation capped");
                break;
            }

            let value = (minimum + current * delta).round();
            let Some(millis) = value.to_i64() else {
                break;
            };
            ticks.push(
                AxisTick::major(value, reflect(padded, env.is_inverse))
                    .with_virtual_index(virtual_index),
            );

            let Some(next) = self.next_millis(millis, self.tick_zoom_factor) else {
                break;
            };
            let step = Decimal::from(next - millis) / delta;
            current += step;
            padded += step;
            virtual_index += 1;
        }
        ticks
    }

    /// Widens the cached tick window to cover `visible_range` with one
    /// extra tick on each side.
    fn update_visible_ticks(&mut self, visible_range: ValueRange<Decimal>) -> ValueRange<i64> {
        let minimum = Decimal::from(self.plot.minimum);
        let delta = Decimal::from(self.plot.maximum - self.plot.minimum);
        let visible_start = minimum + visible_range.minimum * delta;
        let visible_end = minimum + visible_range.maximum * delta;
        let zoom = self.tick_zoom_factor;

        let mut window = self
            .visible_ticks
            .unwrap_or(ValueRange::new(self.plot.minimum, self.plot.maximum));

        let mut budget = MAX_GENERATED_TICKS;
        let mut walk = |value: i64, forward: bool| -> Option<i64> {
            budget = budget.checked_sub(1)?;
            if forward {
                self.next_millis(value, zoom)
            } else {
                self.previous_millis(value, zoom)
            }
        };

        while Decimal::from(window.minimum) > visible_start {
            let Some(previous) = walk(window.minimum, false) else { break };
            window.minimum = previous;
        }
        while Decimal::from(window.minimum) < visible_start {
            let Some(next) = walk(window.minimum, true) else { break };
            window.minimum = next;
        }
        while Decimal::from(window.maximum) < visible_end {
            let Some(next) = walk(window.maximum, true) else { break };
            window.maximum = next;
        }
        while Decimal::from(window.maximum) > visible_end {
            let Some(previous) = walk(window.maximum, false) else { break };
            window.maximum = previous;
        }

        if let Some(previous) = self.previous_millis(window.minimum, zoom) {
            window.minimum = previous;
        }
        if let Some(next) = self.next_millis(window.maximum, zoom) {
            window.maximum = next;
        }

        self.visible_ticks = Some(window);
        window
    }

    pub(crate) fn label_value(tick: &AxisTick) -> LabelValue {
        tick.value
            .to_i64()
            .and_then(millis_to_datetime)
            .map_or(LabelValue::Empty, LabelValue::DateTime)
    }

    pub(crate) fn default_label_format(&self) -> LabelFormat {
        let pattern = if self.year_step.is_some() {
            "%Y"
        } else if self.month_step.is_some() {
            "%Y-%m"
        } else if self.major_step >= DAY_MILLIS {
            "%Y-%m-%d"
        } else if self.major_step >= MINUTE_MILLIS {
            "%Y-%m-%d %H:%M"
        } else {
            "%H:%M:%S%.3f"
        };
        LabelFormat::date_time(pattern)
    }

    /// Plot info for an arbitrary date, e.g. for annotations.
    #[must_use]
    pub fn create_plot_info(&self, time: DateTime<Utc>, is_inverse: bool) -> Option<AxisPlotInfo> {
        if !self.can_plot() {
            return None;
        }
        let delta = (self.plot.maximum - self.plot.minimum) as f64;
        if delta <= 0.0 {
            return None;
        }
        let position = (datetime_to_millis(time) - self.plot.minimum) as f64 / delta
            + self.plot.extend as f64 / 2.0 / delta;
        Some(AxisPlotInfo::Categorical {
            category_key: CategoryKey::DateTime(time),
            value: position,
            position: if is_inverse { 1.0 - position } else { position },
            length: 0.0,
        })
    }

    /// Date at a relative position along the plot extent.
    #[must_use]
    pub fn date_at(&self, relative_position: f64) -> Option<DateTime<Utc>> {
        if !self.can_plot() {
            return None;
        }
        let delta = (self.plot.maximum - self.plot.minimum) as f64;
        let millis = relative_position * delta + self.plot.minimum as f64 - self.plot.extend as f64 / 2.0;
        millis_to_datetime((millis + 0.5).floor() as i64)
    }
}

fn scaled_step(step: u32, zoom: f64) -> u32 {
    ((f64::from(step) / zoom) as u32).max(1)
}

fn is_month_like(days: f64) -> bool {
    [(28.0, 31.0), (59.0, 62.0), (89.0, 92.0), (120.0, 122.0), (181.0, 184.0)]
        .iter()
        .any(|(low, high)| (*low..=*high).contains(&days))
}

fn is_year_like(days: f64) -> bool {
    (365.0..=366.0).contains(&days) || (730.0..=731.0).contains(&days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    use crate::core::{AxisId, DataPoint, SeriesId, SeriesModel};

    fn env() -> KindEnv {
        KindEnv {
            axis: AxisId(0),
            is_inverse: false,
            zoom: 1.0,
        }
    }

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

    fn updated(times: &[DateTime<Utc>], plot_mode: AxisPlotMode) -> DateTimeAxis {
        let model = series(times);
        let context = StackAggregationContext::unstacked(AxisId(0), vec![&model]);
        let mut axis = DateTimeAxis::new();
        axis.options_mut().plot_mode = Some(plot_mode);
        axis.update_core(&context, &env());
        axis
    }

    #[test]
    fn daily_data_uses_the_smallest_gap() {
        let axis = updated(&[day(3), day(1), day(2), day(5)], AxisPlotMode::OnTicks);
        assert_eq!(axis.min_delta_millis(), DAY_MILLIS as i64);
        assert_eq!(axis.month_step(), None);
        assert_eq!(
            axis.actual_range(),
            Some(ValueRange::new(day(1), day(5)))
        );
    }

    #[test]
    fn monthly_gaps_switch_to_calendar_steps() {
        let axis = updated(&[month(1), month(2), month(3)], AxisPlotMode::OnTicks);
        assert_eq!(axis.month_step(), Some(1));
        assert_eq!(axis.default_label_format(), LabelFormat::date_time("%Y-%m"));
    }

    #[test]
    fn on_ticks_emits_one_tick_per_day() {
        let mut axis = updated(&[day(1), day(2), day(3), day(4), day(5)], AxisPlotMode::OnTicks);
        let ticks = axis.generate_ticks(ValueRange::UNIT, &env());
        assert_eq!(ticks.len(), 5);
        assert_eq!(ticks[0].value, Decimal::from(datetime_to_millis(day(1))));
        assert_eq!(ticks[4].normalized_value, Decimal::ONE);
    }

    #[test]
    fn between_ticks_extends_the_plot_by_one_step() {
        let mut axis = updated(&[day(1), day(2), day(3), day(4), day(5)], AxisPlotMode::BetweenTicks);
        let ticks = axis.generate_ticks(ValueRange::UNIT, &env());
        assert_eq!(ticks.len(), 6);

        let mut infos = IndexMap::new();
        axis.plot_core(&env(), &mut infos);
        let first = infos[0].clone();
        let AxisPlotInfo::Categorical {
            position, length, ..
        } = first
        else {
            panic!("categorical info expected");
        };
        assert_relative_eq!(position, 0.1, epsilon = 1e-9);
        assert_relative_eq!(length, 0.7 * 0.2, epsilon = 1e-9);
    }

    #[test]
    fn tick_count_is_capped() {
        let times: Vec<DateTime<Utc>> = (1..=31).map(day).collect();
        let model = series(&times);
        let context = StackAggregationContext::unstacked(AxisId(0), vec![&model]);
        let mut axis = DateTimeAxis::new();
        axis.options_mut().plot_mode = Some(AxisPlotMode::OnTicks);
        axis.options_mut().maximum_ticks = Some(4);
        axis.update_core(&context, &env());
        // 30 days over 3 intervals
        assert_relative_eq!(axis.tick_interval_millis(), 10.0 * DAY_MILLIS);
        assert_eq!(axis.generate_ticks(ValueRange::UNIT, &env()).len(), 4);
    }

    #[test]
    fn user_week_step_is_clamped_to_the_range() {
        let model = series(&[day(1), day(3)]);
        let context = StackAggregationContext::unstacked(AxisId(0), vec![&model]);
        let mut axis = DateTimeAxis::new();
        axis.options_mut().major_step = Some(1.0);
        axis.options_mut().major_step_unit = TimeInterval::Week;
        axis.update_core(&context, &env());
        assert_relative_eq!(axis.tick_interval_millis(), 2.0 * DAY_MILLIS);
    }

    #[test]
    fn single_date_falls_back_to_a_day() {
        let mut axis = updated(&[day(7)], AxisPlotMode::OnTicks);
        assert_eq!(axis.time_slots().len(), 1);
        assert_eq!(axis.time_slots()[0].length_millis, DAY_MILLIS as i64);
        assert!(!axis.generate_ticks(ValueRange::UNIT, &env()).is_empty());
    }

    #[test]
    fn slots_group_points_per_step() {
        let axis = updated(&[day(1), day(1), day(3)], AxisPlotMode::OnTicks);
        let counts: Vec<usize> = axis.time_slots().iter().map(|slot| slot.point_count).collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn physical_positions_round_trip_to_dates() {
        let axis = updated(&[day(1), day(2), day(3)], AxisPlotMode::OnTicks);
        assert_eq!(axis.date_at(0.5), Some(day(2)));
        assert!(DateTimeAxis::new().date_at(0.5).is_none());
    }
}
