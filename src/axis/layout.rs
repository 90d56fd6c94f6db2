//! Orientation-specific geometry of an axis.
//!
//! Horizontal axes map the x coordinate and grow to the right; vertical axes
//! map the y coordinate but plot bottom-up, so their normalized positions are
//! measured from the bottom edge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::axis::label::{AxisLabel, AxisTitle};
use crate::axis::tick::AxisTick;
use crate::core::primitives::{decimal_from_f64, decimal_is_one, decimal_is_zero, decimal_to_f64};
use crate::core::{
    AxisHorizontalLocation, AxisLabelFitMode, AxisLastLabelVisibility, AxisPlotMode, AxisType,
    AxisVerticalLocation, Rect, Size, Thickness, ValueRange,
};

/// Zoom and pan state of the plot area shared by all axes.
///
/// Plot origins are expressed in plot-area widths/heights and are zero or
/// negative while panned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    pub zoom_width: f64,
    pub zoom_height: f64,
    pub plot_origin_x: f64,
    pub plot_origin_y: f64,
}

impl Default for ChartView {
    fn default() -> Self {
        Self {
            zoom_width: 1.0,
            zoom_height: 1.0,
            plot_origin_x: 0.0,
            plot_origin_y: 0.0,
        }
    }
}

/// Mirrors a normalized value when the axis is inverse.
#[must_use]
pub fn reflect(normalized: Decimal, is_inverse: bool) -> Decimal {
    if is_inverse {
        Decimal::ONE - normalized
    } else {
        normalized
    }
}

/// Axis settings consulted while sizing and arranging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LayoutParams {
    pub line_thickness: f64,
    pub major_tick_length: f64,
    pub tick_thickness: f64,
    pub label_fit_mode: AxisLabelFitMode,
    pub last_label_visibility: AxisLastLabelVisibility,
    pub horizontal_location: AxisHorizontalLocation,
    pub vertical_location: AxisVerticalLocation,
    pub plot_mode: AxisPlotMode,
    pub major_tick_count: usize,
    pub view: ChartView,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct LabelExtents {
    max_width: f64,
    max_height: f64,
}

impl LabelExtents {
    fn of(labels: &[AxisLabel]) -> Self {
        labels
            .iter()
            .filter(|label| label.is_visible)
            .fold(Self::default(), |acc, label| Self {
                max_width: acc.max_width.max(label.desired_size.width),
                max_height: acc.max_height.max(label.desired_size.height),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HorizontalLayout {
    extents: LabelExtents,
    label_top: f64,
    total_label_height: f64,
    /// Number of label rows needed for multi-line fitting.
    label_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerticalLayout {
    extents: LabelExtents,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutStrategy {
    Horizontal(HorizontalLayout),
    Vertical(VerticalLayout),
}

impl LayoutStrategy {
    #[must_use]
    pub fn for_axis_type(axis_type: AxisType) -> Self {
        match axis_type {
            AxisType::First => Self::Horizontal(HorizontalLayout::default()),
            AxisType::Second => Self::Vertical(VerticalLayout::default()),
        }
    }

    #[must_use]
    pub fn zoom(&self, view: &ChartView) -> f64 {
        match self {
            Self::Horizontal(_) => view.zoom_width,
            Self::Vertical(_) => view.zoom_height,
        }
    }

    #[must_use]
    pub fn default_last_label_visibility(&self) -> AxisLastLabelVisibility {
        match self {
            Self::Horizontal(_) => AxisLastLabelVisibility::Clip,
            Self::Vertical(_) => AxisLastLabelVisibility::Visible,
        }
    }

    /// Normalized window of the axis currently inside the viewport.
    ///
    /// At zoom 1 the whole axis `(0, 1)` is visible; otherwise the window is
    /// `1 / zoom` long and shifted by the pan offset.
    #[must_use]
    pub fn visible_range(&self, view: &ChartView) -> ValueRange<Decimal> {
        let zoom = self.zoom(view);
        let Some(zoom_factor) = decimal_from_f64(zoom).filter(|zoom| zoom > &Decimal::ZERO) else {
            return ValueRange::UNIT;
        };
        if zoom_factor == Decimal::ONE {
            return ValueRange::UNIT;
        }

        let visible_length = Decimal::ONE / zoom_factor;
        let offset = match self {
            Self::Horizontal(_) => {
                let origin = decimal_from_f64(view.plot_origin_x).unwrap_or_default();
                -origin / zoom_factor
            }
            Self::Vertical(_) => {
                let origin = decimal_from_f64(view.plot_origin_y).unwrap_or_default();
                (zoom_factor - Decimal::ONE + origin) / zoom_factor
            }
        };
        ValueRange::new(offset, offset + visible_length)
    }

    /// Maps a physical coordinate inside `virtual_rect` to a normalized position.
    #[must_use]
    pub fn value_to_normalized_position(
        &self,
        coordinate: f64,
        virtual_rect: Rect,
        step_offset: f64,
        is_inverse: bool,
    ) -> f64 {
        let position = match self {
            Self::Horizontal(_) => {
                (coordinate - virtual_rect.x) / virtual_rect.width + step_offset
            }
            Self::Vertical(_) => {
                1.0 - (coordinate - virtual_rect.y) / virtual_rect.height - step_offset
            }
        };
        if is_inverse { 1.0 - position } else { position }
    }

    pub(crate) fn desired_size(
        &mut self,
        available: Size,
        labels: &[AxisLabel],
        title: &AxisTitle,
        params: &LayoutParams,
    ) -> Size {
        match self {
            Self::Horizontal(state) => {
                state.extents = LabelExtents::of(labels);
                state.update_total_label_height(available, labels.len(), params.label_fit_mode);
                Size::new(
                    0.0,
                    params.line_thickness
                        + params.major_tick_length
                        + state.total_label_height
                        + title.desired_size.height,
                )
            }
            Self::Vertical(state) => {
                state.extents = LabelExtents::of(labels);
                // the title is rotated, so its height adds to the width
                Size::new(
                    params.line_thickness
                        + params.major_tick_length
                        + state.extents.max_width
                        + title.desired_size.height,
                    0.0,
                )
            }
        }
    }

    /// Room the last label needs outside the plot area; call after `desired_size`.
    pub(crate) fn desired_margin(
        &self,
        available: Size,
        labels: &[AxisLabel],
        params: &LayoutParams,
    ) -> Thickness {
        let mut margin = Thickness::default();
        if params.last_label_visibility != AxisLastLabelVisibility::Visible {
            return margin;
        }

        match self {
            Self::Horizontal(state) => {
                let Some(last) = labels.last() else {
                    return margin;
                };
                if state.extents.max_width == 0.0 {
                    return margin;
                }
                let reach = (last.desired_size.width / 2.0).trunc();
                if params.plot_mode == AxisPlotMode::OnTicks {
                    margin.right = reach;
                } else if params.major_tick_count > 0 {
                    let slot_width = (available.width / params.major_tick_count as f64).trunc();
                    margin.right = (reach - slot_width / 2.0).max(0.0);
                }
            }
            Self::Vertical(state) => {
                if state.extents.max_height > 0.0 && params.plot_mode == AxisPlotMode::OnTicks {
                    margin.top = (state.extents.max_height / 2.0).trunc();
                }
            }
        }
        margin
    }

    pub(crate) fn arrange(
        &mut self,
        rect: Rect,
        ticks: &mut [AxisTick],
        labels: &mut [AxisLabel],
        title: &mut AxisTitle,
        params: &LayoutParams,
    ) {
        match self {
            Self::Horizontal(state) => state.arrange(rect, ticks, labels, title, params),
            Self::Vertical(_) => arrange_vertical(rect, ticks, labels, title, params),
        }
    }

    /// Snaps the edge ticks into the axis slot.
    pub(crate) fn apply_layout_rounding(
        &self,
        axis_slot: Rect,
        ticks: &mut [AxisTick],
        params: &LayoutParams,
    ) {
        let thickness_offset = (params.tick_thickness / 2.0).trunc();
        let count = ticks.len();
        if count == 0 {
            return;
        }

        match self {
            Self::Horizontal(_) => {
                if decimal_is_zero(ticks[0].normalized_value) {
                    ticks[0].layout_slot.x = axis_slot.x - thickness_offset;
                }
                if count > 1 && decimal_is_one(ticks[count - 1].normalized_value) {
                    let zoomed_width = axis_slot.width * params.view.zoom_width;
                    // rendering runs left to right, keep the far tick one pixel inside
                    ticks[count - 1].layout_slot.x =
                        axis_slot.x + zoomed_width - thickness_offset - 1.0;
                }
            }
            Self::Vertical(_) => {
                if decimal_is_zero(ticks[0].normalized_value) {
                    let zoomed_height = axis_slot.height * params.view.zoom_height;
                    ticks[0].layout_slot.y = axis_slot.y + zoomed_height - thickness_offset - 1.0;
                }
                if count > 1 && decimal_is_one(ticks[count - 1].normalized_value) {
                    ticks[count - 1].layout_slot.y = axis_slot.y - thickness_offset;
                }
            }
        }
    }

    /// Hides ticks (and their labels) whose slots fall outside `clip`.
    pub(crate) fn update_ticks_visibility(
        &self,
        clip: Rect,
        ticks: &mut [AxisTick],
        labels: &mut [AxisLabel],
        plot_mode: AxisPlotMode,
    ) {
        for tick in ticks.iter_mut() {
            let visible = match self {
                Self::Horizontal(_) => {
                    let center = tick.layout_slot.center_x();
                    center >= clip.x && center <= clip.right()
                }
                Self::Vertical(_) => {
                    let center = tick.layout_slot.center_y();
                    center >= clip.y && center <= clip.bottom()
                }
            };
            tick.is_visible = visible;

            let Some(label) = tick.associated_label.and_then(|index| labels.get_mut(index)) else {
                continue;
            };
            match self {
                Self::Horizontal(_) => {
                    if !label.is_visible {
                        continue;
                    }
                    if plot_mode == AxisPlotMode::OnTicks {
                        label.is_visible = visible;
                    } else if !visible {
                        label.is_visible = label.layout_slot.x >= clip.x
                            && label.layout_slot.right() <= clip.right();
                    }
                }
                Self::Vertical(_) => {
                    label.is_visible = if plot_mode == AxisPlotMode::OnTicks {
                        visible
                    } else {
                        label.layout_slot.y >= clip.y && label.layout_slot.bottom() <= clip.bottom()
                    };
                }
            }
        }
    }
}

impl HorizontalLayout {
    fn update_total_label_height(
        &mut self,
        available: Size,
        label_count: usize,
        fit_mode: AxisLabelFitMode,
    ) {
        // assumes labels are roughly as wide as the widest one
        let total_label_width = label_count as f64 * self.extents.max_width;
        let rows = if available.width > 0.0 {
            (total_label_width / available.width) as usize + 1
        } else {
            1
        };
        self.label_rows = rows.min(label_count.max(1));

        self.total_label_height = self.extents.max_height;
        if fit_mode == AxisLabelFitMode::MultiLine {
            self.total_label_height *= self.label_rows as f64;
        }
    }

    fn arrange(
        &mut self,
        mut rect: Rect,
        ticks: &mut [AxisTick],
        labels: &mut [AxisLabel],
        title: &mut AxisTitle,
        params: &LayoutParams,
    ) {
        let title_top = if params.vertical_location == AxisVerticalLocation::Bottom {
            rect.bottom() - title.desired_size.height
        } else {
            let top = rect.y;
            rect.y += title.desired_size.height;
            top
        };
        title.layout_slot = Rect::new(
            rect.x + (rect.width - title.desired_size.width) / 2.0,
            title_top,
            title.desired_size.width,
            title.desired_size.height,
        );

        rect.width *= params.view.zoom_width;

        let y = if params.vertical_location == AxisVerticalLocation::Bottom {
            rect.y
        } else {
            rect.y + self.total_label_height + params.line_thickness
        };
        let thickness = params.tick_thickness;
        let thickness_offset = (thickness / 2.0).trunc();

        for tick in ticks.iter_mut() {
            let normalized = decimal_to_f64(tick.normalized_value);
            let x = if tick.normalized_value.is_zero() {
                rect.x - thickness_offset
            } else if tick.normalized_value == Decimal::ONE {
                rect.right()
            } else {
                rect.x + normalized * rect.width - thickness_offset
            };
            tick.layout_slot = Rect::new(x, y, thickness, params.major_tick_length);
        }

        self.label_top = if params.vertical_location == AxisVerticalLocation::Bottom {
            rect.y + params.major_tick_length
        } else {
            rect.y
        };

        let multi_line = params.label_fit_mode == AxisLabelFitMode::MultiLine && self.label_rows > 1;
        for (index, label) in labels.iter_mut().enumerate() {
            let center = label.normalized_position * rect.width;
            label.layout_slot = if multi_line {
                let row = (index % self.label_rows) as f64;
                Rect::new(
                    rect.x + center - label.desired_size.width / 2.0,
                    self.label_top + row * label.desired_size.height,
                    label.desired_size.width,
                    label.desired_size.height,
                )
            } else {
                let size = label.untransformed_desired_size;
                Rect::new(
                    rect.x + center - size.width / 2.0,
                    self.label_top,
                    size.width,
                    size.height,
                )
            };
        }
    }
}

fn arrange_vertical(
    mut rect: Rect,
    ticks: &mut [AxisTick],
    labels: &mut [AxisLabel],
    title: &mut AxisTitle,
    params: &LayoutParams,
) {
    let title_left = if params.horizontal_location == AxisHorizontalLocation::Left {
        rect.x
    } else {
        rect.right() - title.desired_size.height
    };
    title.layout_slot = Rect::new(
        title_left,
        rect.y + (rect.height - title.desired_size.height) / 2.0,
        title.desired_size.width,
        title.desired_size.height,
    );

    rect.height *= params.view.zoom_height;

    let thickness = params.tick_thickness;
    let thickness_offset = (thickness / 2.0).trunc();
    let width = params.major_tick_length;
    let x = if params.horizontal_location == AxisHorizontalLocation::Left {
        rect.right() - width
    } else {
        rect.x
    };

    for tick in ticks.iter_mut() {
        let y = if tick.normalized_value.is_zero() {
            rect.bottom() - thickness_offset
        } else if tick.normalized_value == Decimal::ONE {
            rect.y
        } else {
            rect.bottom() - decimal_to_f64(tick.normalized_value) * rect.height - thickness_offset
        };
        tick.layout_slot = Rect::new(x, y, width, thickness);
    }

    for label in labels.iter_mut() {
        let center = label.normalized_position * rect.height;
        let x = if params.horizontal_location == AxisHorizontalLocation::Left {
            rect.right() - params.major_tick_length - label.desired_size.width
        } else {
            rect.x + params.major_tick_length
        };
        label.layout_slot = Rect::new(
            x,
            rect.bottom() - center - label.desired_size.height / 2.0,
            label.desired_size.width,
            label.desired_size.height,
        );
    }
}

/// Bounding box of `size` rotated by `angle_degrees`.
#[must_use]
pub fn rotated_bounds(size: Size, angle_degrees: f64) -> Size {
    let radians = angle_degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    Size::new(
        size.width * cos + size.height * sin,
        size.width * sin + size.height * cos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::label_format::LabelValue;
    use approx::assert_relative_eq;

    fn zoomed(zoom: f64, origin: f64) -> ChartView {
        ChartView {
            zoom_width: zoom,
            zoom_height: zoom,
            plot_origin_x: origin,
            plot_origin_y: origin,
        }
    }

    #[test]
    fn unit_window_without_zoom() {
        for strategy in [
            LayoutStrategy::for_axis_type(AxisType::First),
            LayoutStrategy::for_axis_type(AxisType::Second),
        ] {
            assert_eq!(strategy.visible_range(&ChartView::default()), ValueRange::UNIT);
        }
    }

    #[test]
    fn horizontal_window_follows_pan() {
        let strategy = LayoutStrategy::for_axis_type(AxisType::First);
        let range = strategy.visible_range(&zoomed(2.0, -0.5));
        assert_eq!(range, ValueRange::new(Decimal::new(25, 2), Decimal::new(75, 2)));
    }

    #[test]
    fn vertical_window_is_anchored_at_the_bottom() {
        let strategy = LayoutStrategy::for_axis_type(AxisType::Second);
        let range = strategy.visible_range(&zoomed(2.0, -1.0));
        assert_eq!(range, ValueRange::new(Decimal::ZERO, Decimal::new(5, 1)));
    }

    #[test]
    fn normalized_position_orientation() {
        let rect = Rect::new(10.0, 20.0, 100.0, 200.0);
        let horizontal = LayoutStrategy::for_axis_type(AxisType::First);
        let vertical = LayoutStrategy::for_axis_type(AxisType::Second);

        assert_relative_eq!(horizontal.value_to_normalized_position(10.0, rect, 0.0, false), 0.0);
        assert_relative_eq!(horizontal.value_to_normalized_position(110.0, rect, 0.0, false), 1.0);
        assert_relative_eq!(horizontal.value_to_normalized_position(10.0, rect, 0.0, true), 1.0);

        assert_relative_eq!(vertical.value_to_normalized_position(220.0, rect, 0.0, false), 0.0);
        assert_relative_eq!(vertical.value_to_normalized_position(20.0, rect, 0.0, false), 1.0);
        assert_relative_eq!(vertical.value_to_normalized_position(20.0, rect, 0.0, true), 0.0);
        assert_relative_eq!(vertical.value_to_normalized_position(120.0, rect, 0.25, false), 0.25);
    }

    #[test]
    fn single_row_labels_are_placed_by_their_unrotated_size() {
        let mut strategy = LayoutStrategy::for_axis_type(AxisType::First);
        let mut ticks = Vec::new();
        let mut labels = vec![AxisLabel {
            content: "quarter".to_owned(),
            value: LabelValue::Empty,
            normalized_position: 0.5,
            is_visible: true,
            tick_index: 0,
            desired_size: rotated_bounds(Size::new(40.0, 10.0), 90.0),
            untransformed_desired_size: Size::new(40.0, 10.0),
            layout_slot: Rect::EMPTY,
        }];
        let params = LayoutParams {
            line_thickness: 1.0,
            major_tick_length: 5.0,
            tick_thickness: 1.0,
            label_fit_mode: AxisLabelFitMode::Rotate,
            last_label_visibility: AxisLastLabelVisibility::Visible,
            horizontal_location: AxisHorizontalLocation::Left,
            vertical_location: AxisVerticalLocation::Bottom,
            plot_mode: AxisPlotMode::OnTicks,
            major_tick_count: 1,
            view: ChartView::default(),
        };

        strategy.arrange(
            Rect::new(0.0, 100.0, 200.0, 50.0),
            &mut ticks,
            &mut labels,
            &mut AxisTitle::default(),
            &params,
        );

        assert_eq!(labels[0].layout_slot, Rect::new(80.0, 105.0, 40.0, 10.0));
    }

    #[test]
    fn rotated_bounds_swap_at_right_angle() {
        let size = rotated_bounds(Size::new(40.0, 10.0), 90.0);
        assert_relative_eq!(size.width, 10.0, epsilon = 1e-9);
        assert_relative_eq!(size.height, 40.0, epsilon = 1e-9);
    }
}
