use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::api::InvalidationLevel;
use crate::axis::kind::{
    AxisKind, AxisKindTag, CategoricalAxis, DateTimeAxis, KindEnv, NumericalAxis, NumericalScale,
    StackSumValue,
};
use crate::axis::label::{AxisLabel, AxisTitle, LabelPolicy, generate_labels};
use crate::axis::label_format::{ContentFormatterFn, LabelFormat};
use crate::axis::layout::{ChartView, LayoutParams, LayoutStrategy, rotated_bounds};
use crate::axis::options::{
    AxisOptions, AxisProperty, PropertyChange, PropertyChangedFn, PropertyListeners,
    PropertyValue, validate_label_interval, validate_length, validate_rotation_angle,
    validate_unit_interval,
};
use crate::axis::plot_info::AxisPlotInfo;
use crate::axis::stack_context::StackAggregationContext;
use crate::axis::tick::{AxisTick, link_ticks};
use crate::combine::StackSums;
use crate::core::{
    AxisHorizontalLocation, AxisId, AxisLabelFitMode, AxisLastLabelVisibility, AxisPlotMode,
    AxisType, AxisValue, AxisVerticalLocation, CategoryKey, DataPoint, DateTimePlotStretch,
    PointRef, RangeExtendDirection, Rect, SeriesModel, Size, Thickness, TimeInterval, ValueRange,
};
use crate::error::{AxisError, AxisResult};
use crate::render::{AxisPresenter, MeasuredElement};

/// One chart axis: range resolution, ticks, labels and layout.
///
/// A layout pass drives the axis through `update` → `plot` → `measure` →
/// `arrange`. Each step is guarded by its own flag so repeated calls within
/// a pass are no-ops; `reset_state` re-arms all of them.
#[derive(Clone)]
pub struct AxisModel {
    id: AxisId,
    axis_type: AxisType,
    layout: LayoutStrategy,
    kind: AxisKind,
    options: AxisOptions,
    label_format: Option<LabelFormat>,
    formatter: Option<ContentFormatterFn>,
    listeners: PropertyListeners,
    title: AxisTitle,
    ticks: Vec<AxisTick>,
    labels: Vec<AxisLabel>,
    visible_range: ValueRange<Decimal>,
    major_tick_count: usize,
    is_updated: bool,
    is_plot_valid: bool,
    is_measure_valid: bool,
    desired_size: Size,
    desired_margin: Thickness,
    desired_arrange_rect: Rect,
    last_measure_size: Size,
    view: ChartView,
    plot_infos: IndexMap<PointRef, AxisPlotInfo>,
    pending_invalidation: InvalidationLevel,
}

impl fmt::Debug for AxisModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisModel")
            .field("id", &self.id)
            .field("axis_type", &self.axis_type)
            .field("kind", &self.kind.tag())
            .field("visible_range", &self.visible_range)
            .field("ticks", &self.ticks.len())
            .field("labels", &self.labels.len())
            .field("is_updated", &self.is_updated)
            .field("is_plot_valid", &self.is_plot_valid)
            .field("is_measure_valid", &self.is_measure_valid)
            .field("has_formatter", &self.formatter.is_some())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl AxisModel {
    #[must_use]
    pub fn new(id: AxisId, axis_type: AxisType, kind: AxisKind) -> Self {
        Self {
            id,
            axis_type,
            layout: LayoutStrategy::for_axis_type(axis_type),
            kind,
            options: AxisOptions::default(),
            label_format: None,
            formatter: None,
            listeners: PropertyListeners::default(),
            title: AxisTitle::default(),
            ticks: Vec::new(),
            labels: Vec::new(),
            visible_range: ValueRange::UNSET,
            major_tick_count: 0,
            is_updated: false,
            is_plot_valid: false,
            is_measure_valid: false,
            desired_size: Size::EMPTY,
            desired_margin: Thickness::default(),
            desired_arrange_rect: Rect::EMPTY,
            last_measure_size: Size::EMPTY,
            view: ChartView::default(),
            plot_infos: IndexMap::new(),
            pending_invalidation: InvalidationLevel::None,
        }
    }

    #[must_use]
    pub fn linear(id: AxisId, axis_type: AxisType) -> Self {
        Self::new(
            id,
            axis_type,
            AxisKind::Numerical(NumericalAxis::new(NumericalScale::Linear)),
        )
    }

    pub fn logarithmic(id: AxisId, axis_type: AxisType, base: f64) -> AxisResult<Self> {
        let base = validate_logarithm_base(base)?;
        Ok(Self::new(
            id,
            axis_type,
            AxisKind::Numerical(NumericalAxis::new(NumericalScale::Logarithmic { base })),
        ))
    }

    #[must_use]
    pub fn categorical(id: AxisId, axis_type: AxisType) -> Self {
        Self::new(id, axis_type, AxisKind::Categorical(CategoricalAxis::new()))
    }

    #[must_use]
    pub fn date_time(id: AxisId, axis_type: AxisType) -> Self {
        Self::new(id, axis_type, AxisKind::DateTime(DateTimeAxis::new()))
    }

    /// Replaces every shared option at once after validating the set.
    pub fn with_options(mut self, options: AxisOptions) -> AxisResult<Self> {
        options.validate()?;
        self.label_format = options
            .label_format
            .as_deref()
            .map(LabelFormat::parse)
            .transpose()?;
        self.title.content = options.title.clone();
        self.options = options;
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> AxisId {
        self.id
    }

    #[must_use]
    pub fn axis_type(&self) -> AxisType {
        self.axis_type
    }

    #[must_use]
    pub fn kind(&self) -> &AxisKind {
        &self.kind
    }

    #[must_use]
    pub fn numerical(&self) -> Option<&NumericalAxis> {
        match &self.kind {
            AxisKind::Numerical(axis) => Some(axis),
            _ => None,
        }
    }

    #[must_use]
    pub fn date_time_axis(&self) -> Option<&DateTimeAxis> {
        match &self.kind {
            AxisKind::DateTime(axis) => Some(axis),
            _ => None,
        }
    }

    #[must_use]
    pub fn categorical_axis(&self) -> Option<&CategoricalAxis> {
        match &self.kind {
            AxisKind::Categorical(axis) => Some(axis),
            _ => None,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutStrategy {
        &self.layout
    }

    #[must_use]
    pub fn options(&self) -> &AxisOptions {
        &self.options
    }

    #[must_use]
    pub fn title(&self) -> &AxisTitle {
        &self.title
    }

    #[must_use]
    pub fn ticks(&self) -> &[AxisTick] {
        &self.ticks
    }

    #[must_use]
    pub fn labels(&self) -> &[AxisLabel] {
        &self.labels
    }

    pub fn major_ticks(&self) -> impl Iterator<Item = &AxisTick> {
        self.ticks.iter().filter(|tick| tick.is_major())
    }

    #[must_use]
    pub fn first_tick(&self) -> Option<&AxisTick> {
        self.ticks.first()
    }

    #[must_use]
    pub fn last_tick(&self) -> Option<&AxisTick> {
        self.ticks.last()
    }

    #[must_use]
    pub fn major_tick_count(&self) -> usize {
        self.major_tick_count
    }

    #[must_use]
    pub fn visible_range(&self) -> ValueRange<Decimal> {
        self.visible_range
    }

    #[must_use]
    pub fn desired_size(&self) -> Size {
        self.desired_size
    }

    #[must_use]
    pub fn desired_margin(&self) -> Thickness {
        self.desired_margin
    }

    #[must_use]
    pub fn desired_arrange_rect(&self) -> Rect {
        self.desired_arrange_rect
    }

    #[must_use]
    pub fn plot_infos(&self) -> &IndexMap<PointRef, AxisPlotInfo> {
        &self.plot_infos
    }

    #[must_use]
    pub fn plot_info(&self, point: PointRef) -> Option<&AxisPlotInfo> {
        self.plot_infos.get(&point)
    }

    #[must_use]
    pub fn view(&self) -> ChartView {
        self.view
    }

    #[must_use]
    pub fn is_updated(&self) -> bool {
        self.is_updated
    }

    #[must_use]
    pub fn is_plot_valid(&self) -> bool {
        self.is_plot_valid
    }

    #[must_use]
    pub fn is_measure_valid(&self) -> bool {
        self.is_measure_valid
    }

    /// Last-label policy in effect: the configured one or the orientation default.
    #[must_use]
    pub fn last_label_visibility(&self) -> AxisLastLabelVisibility {
        self.options
            .last_label_visibility
            .unwrap_or_else(|| self.layout.default_last_label_visibility())
    }

    #[must_use]
    pub fn actual_plot_mode(&self) -> AxisPlotMode {
        self.kind.actual_plot_mode()
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.layout.zoom(&self.view)
    }

    fn env(&self) -> KindEnv {
        KindEnv {
            axis: self.id,
            is_inverse: self.options.is_inverse,
            zoom: self.zoom(),
        }
    }

    fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            line_thickness: self.options.line_thickness,
            major_tick_length: self.options.major_tick_length,
            tick_thickness: self.options.tick_thickness,
            label_fit_mode: self.options.label_fit_mode,
            last_label_visibility: self.last_label_visibility(),
            horizontal_location: self.options.horizontal_location,
            vertical_location: self.options.vertical_location,
            plot_mode: self.actual_plot_mode(),
            major_tick_count: self.major_tick_count,
            view: self.view,
        }
    }

    /// Resolves the data range from the series of this pass. Runs once per cycle.
    pub fn update(&mut self, context: &StackAggregationContext<'_>) {
        if self.is_updated {
            return;
        }

        let env = self.env();
        self.kind.update_core(context, &env);
        self.is_updated = true;

        debug!(
            axis = self.id.0,
            kind = ?self.kind.tag(),
            series = context.series.len(),
            stacked = context.is_stacked,
            stacked100 = context.is_stacked100,
            "axis updated"
        );
    }

    /// Computes per-point plot infos. Runs once until the plot is invalidated.
    pub fn plot(&mut self, context: &StackAggregationContext<'_>) {
        if self.is_plot_valid {
            return;
        }

        let env = self.env();
        self.plot_infos.clear();
        self.kind.plot_core(context, &env, &mut self.plot_infos);
        self.is_plot_valid = true;

        trace!(axis = self.id.0, points = self.plot_infos.len(), "axis plotted");
    }

    /// Measures the axis for `available`; returns `true` when a measure pass ran.
    ///
    /// A missing or hidden presenter empties the desired size.
    pub fn measure(
        &mut self,
        presenter: Option<&dyn AxisPresenter>,
        available: Size,
    ) -> AxisResult<bool> {
        let Some(presenter) = presenter.filter(|presenter| presenter.is_visible()) else {
            self.desired_size = Size::EMPTY;
            return Ok(false);
        };

        if available != self.last_measure_size {
            self.is_measure_valid = false;
        }
        if self.is_measure_valid {
            return Ok(false);
        }

        self.last_measure_size = available;
        self.measure_core(presenter, available)?;
        self.is_measure_valid = true;
        Ok(true)
    }

    fn measure_core(&mut self, presenter: &dyn AxisPresenter, available: Size) -> AxisResult<()> {
        self.build_ticks_and_labels()?;

        let rotate = self.options.label_fit_mode == AxisLabelFitMode::Rotate;
        let angle = self.options.normalized_label_rotation_angle;
        for (index, label) in self.labels.iter_mut().enumerate() {
            if !label.desired_size.is_empty() {
                continue;
            }
            let size = presenter.measure_content(MeasuredElement::Label(index), &label.content);
            label.untransformed_desired_size = size;
            label.desired_size = if rotate {
                rotated_bounds(size, angle)
            } else {
                size
            };
        }

        if self.title.desired_size.is_empty() {
            if let Some(content) = &self.title.content {
                self.title.desired_size = presenter.measure_content(MeasuredElement::Title, content);
            }
        }

        let params = self.layout_params();
        self.desired_size = self
            .layout
            .desired_size(available, &self.labels, &self.title, &params);
        self.desired_margin = self.layout.desired_margin(available, &self.labels, &params);

        trace!(
            axis = self.id.0,
            width = self.desired_size.width,
            height = self.desired_size.height,
            "axis measured"
        );
        Ok(())
    }

    /// Rebuilds ticks and labels when the visible range moved.
    ///
    /// Returns `false` and leaves everything untouched when the range is
    /// unchanged.
    fn build_ticks_and_labels(&mut self) -> AxisResult<bool> {
        let visible_range = self.layout.visible_range(&self.view);
        if visible_range == self.visible_range {
            return Ok(false);
        }

        self.labels.clear();
        self.ticks.clear();
        self.update_ticks(visible_range);
        self.update_labels()?;
        self.visible_range = visible_range;

        debug!(
            axis = self.id.0,
            minimum = %visible_range.minimum,
            maximum = %visible_range.maximum,
            ticks = self.ticks.len(),
            labels = self.labels.len(),
            "ticks and labels rebuilt"
        );
        Ok(true)
    }

    fn update_ticks(&mut self, visible_range: ValueRange<Decimal>) {
        let env = self.env();
        let generated = self.kind.generate_ticks(visible_range, &env);
        let (ticks, major_tick_count) = link_ticks(generated, self.options.major_tick_offset);
        self.ticks = ticks;
        self.major_tick_count = major_tick_count;
    }

    fn update_labels(&mut self) -> AxisResult<()> {
        if !self.options.show_labels {
            return Ok(());
        }

        let default_format = if self.formatter.is_none() && self.label_format.is_none() {
            self.kind.default_label_format()
        } else {
            None
        };
        let policy = LabelPolicy {
            offset: self.options.label_offset,
            interval: self.options.label_interval,
            plot_mode: self.kind.actual_plot_mode(),
            is_inverse: self.options.is_inverse,
            formatter: self.formatter.as_ref(),
            format: self.label_format.as_ref().or(default_format.as_ref()),
        };

        let kind = &self.kind;
        self.labels = generate_labels(&mut self.ticks, &policy, |tick| kind.label_value(tick))?;

        if self.labels.len() > 1 && self.last_label_visibility() == AxisLastLabelVisibility::Hidden {
            if let Some(last) = self.labels.last_mut() {
                last.is_visible = false;
            }
        }
        Ok(())
    }

    /// Lays the axis out inside `rect`, re-measuring when the size differs.
    pub fn arrange(&mut self, presenter: Option<&dyn AxisPresenter>, rect: Rect) -> AxisResult<()> {
        let Some(presenter) = presenter.filter(|presenter| presenter.is_visible()) else {
            self.desired_arrange_rect = Rect::EMPTY;
            return Ok(());
        };

        if rect.size() != self.last_measure_size {
            self.measure(Some(presenter), rect.size())?;
        }

        let params = self.layout_params();
        self.layout.arrange(
            rect,
            &mut self.ticks,
            &mut self.labels,
            &mut self.title,
            &params,
        );
        self.desired_arrange_rect = rect;
        Ok(())
    }

    /// Snaps the edge ticks to `axis_slot`.
    pub fn apply_layout_rounding(&mut self, axis_slot: Rect) {
        let params = self.layout_params();
        self.layout
            .apply_layout_rounding(axis_slot, &mut self.ticks, &params);
    }

    /// Hides ticks and labels outside `clip`.
    pub fn update_ticks_visibility(&mut self, clip: Rect) {
        let plot_mode = self.actual_plot_mode();
        self.layout
            .update_ticks_visibility(clip, &mut self.ticks, &mut self.labels, plot_mode);
    }

    /// Clears the cycle flags so the next pass recomputes everything.
    pub fn reset_state(&mut self) {
        self.is_updated = false;
        self.is_plot_valid = false;
        self.is_measure_valid = false;
        self.visible_range = ValueRange::UNSET;
        self.kind.reset_state();
    }

    pub fn reset(&mut self) {
        self.reset_state();
        self.ticks.clear();
        self.labels.clear();
        self.plot_infos.clear();
        self.kind.reset();
    }

    pub fn on_zoom_changed(&mut self) {
        self.is_measure_valid = false;
        let zoom = self.zoom();
        if self.kind.on_zoom_changed(zoom) {
            self.is_plot_valid = false;
        }
    }

    /// Forces the next `measure` to run without touching range or plot state.
    pub fn invalidate_measure(&mut self) {
        self.is_measure_valid = false;
    }

    pub fn on_plot_origin_changed(&mut self) {
        self.is_measure_valid = false;
    }

    /// Applies the zoom and pan state of the plot area.
    pub fn set_view(&mut self, view: ChartView) {
        let previous = self.view;
        self.view = view;
        if self.layout.zoom(&previous) != self.layout.zoom(&view) {
            self.on_zoom_changed();
        } else if previous != view {
            self.on_plot_origin_changed();
        }
    }

    /// Data value under a physical coordinate of the axis virtual rectangle.
    ///
    /// `None` until the axis has been updated.
    #[must_use]
    pub fn convert_physical_to_data(&self, coordinate: f64, virtual_rect: Rect) -> Option<AxisValue> {
        if !self.is_updated {
            return None;
        }
        let relative = self.layout.value_to_normalized_position(
            coordinate,
            virtual_rect,
            self.kind.physical_step_offset(),
            self.options.is_inverse,
        );
        match &self.kind {
            AxisKind::Numerical(axis) => Some(AxisValue::Number(axis.value_at(relative))),
            AxisKind::DateTime(axis) => axis.date_at(relative).map(AxisValue::DateTime),
            AxisKind::Categorical(axis) => {
                axis.category_at(relative).cloned().map(AxisValue::Category)
            }
        }
    }

    /// Plot info for a value that is not part of any series.
    #[must_use]
    pub fn create_plot_info(&self, value: &AxisValue) -> Option<AxisPlotInfo> {
        let is_inverse = self.options.is_inverse;
        match (&self.kind, value) {
            (AxisKind::Numerical(axis), AxisValue::Number(number)) => {
                axis.create_plot_info(*number, is_inverse)
            }
            (AxisKind::DateTime(axis), AxisValue::DateTime(time)) => {
                axis.create_plot_info(*time, is_inverse)
            }
            (AxisKind::Categorical(axis), value) => {
                axis.create_plot_info(&value.category_key()?, is_inverse)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn combine_group_key(&self, series: &SeriesModel, point: &DataPoint) -> Option<CategoryKey> {
        self.kind.combine_group_key(self.id, series, point)
    }

    pub(crate) fn stack_sum_value(
        &self,
        value: Option<&AxisValue>,
        sums: &mut StackSums,
    ) -> Option<StackSumValue> {
        self.kind.stack_sum_value(value, sums)
    }

    /// Returns and clears the invalidation raised by property changes.
    pub fn take_invalidation(&mut self) -> InvalidationLevel {
        std::mem::take(&mut self.pending_invalidation)
    }

    pub fn add_property_listener(&mut self, listener: PropertyChangedFn) {
        self.listeners.push(listener);
    }

    pub fn clear_property_listeners(&mut self) {
        self.listeners.clear();
    }

    fn property_changed(&mut self, property: AxisProperty, old_value: PropertyValue, new_value: PropertyValue) {
        if old_value == new_value {
            return;
        }

        let level = property.invalidation_level();
        self.pending_invalidation = self.pending_invalidation.max(level);
        match level {
            InvalidationLevel::Full => self.reset_state(),
            InvalidationLevel::Axes => self.is_measure_valid = false,
            InvalidationLevel::None => {}
        }

        debug!(axis = self.id.0, ?property, "axis property changed");
        self.listeners.notify(&PropertyChange {
            property,
            old_value,
            new_value,
        });
    }

    pub fn set_label_interval(&mut self, value: usize) -> AxisResult<()> {
        let value = validate_label_interval(value)?;
        let old = std::mem::replace(&mut self.options.label_interval, value);
        self.property_changed(
            AxisProperty::LabelInterval,
            PropertyValue::Count(old),
            PropertyValue::Count(value),
        );
        Ok(())
    }

    pub fn set_label_offset(&mut self, value: usize) {
        let old = std::mem::replace(&mut self.options.label_offset, value);
        self.property_changed(
            AxisProperty::LabelOffset,
            PropertyValue::Count(old),
            PropertyValue::Count(value),
        );
    }

    pub fn set_major_tick_offset(&mut self, value: usize) {
        let old = std::mem::replace(&mut self.options.major_tick_offset, value);
        self.property_changed(
            AxisProperty::MajorTickOffset,
            PropertyValue::Count(old),
            PropertyValue::Count(value),
        );
    }

    pub fn set_major_tick_length(&mut self, value: f64) -> AxisResult<()> {
        let value = validate_length("major_tick_length", value)?;
        let old = std::mem::replace(&mut self.options.major_tick_length, value);
        self.property_changed(
            AxisProperty::MajorTickLength,
            PropertyValue::Number(old),
            PropertyValue::Number(value),
        );
        Ok(())
    }

    pub fn set_line_thickness(&mut self, value: f64) -> AxisResult<()> {
        let value = validate_length("line_thickness", value)?;
        let old = std::mem::replace(&mut self.options.line_thickness, value);
        self.property_changed(
            AxisProperty::LineThickness,
            PropertyValue::Number(old),
            PropertyValue::Number(value),
        );
        Ok(())
    }

    pub fn set_tick_thickness(&mut self, value: f64) -> AxisResult<()> {
        let value = validate_length("tick_thickness", value)?;
        let old = std::mem::replace(&mut self.options.tick_thickness, value);
        self.property_changed(
            AxisProperty::TickThickness,
            PropertyValue::Number(old),
            PropertyValue::Number(value),
        );
        Ok(())
    }

    pub fn set_normalized_label_rotation_angle(&mut self, value: f64) -> AxisResult<()> {
        let value = validate_rotation_angle(value)?;
        let old = std::mem::replace(&mut self.options.normalized_label_rotation_angle, value);
        self.property_changed(
            AxisProperty::NormalizedLabelRotationAngle,
            PropertyValue::Number(old),
            PropertyValue::Number(value),
        );
        Ok(())
    }

    pub fn set_show_labels(&mut self, value: bool) {
        let old = std::mem::replace(&mut self.options.show_labels, value);
        self.property_changed(
            AxisProperty::ShowLabels,
            PropertyValue::Flag(old),
            PropertyValue::Flag(value),
        );
    }

    pub fn set_label_fit_mode(&mut self, value: AxisLabelFitMode) {
        let old = std::mem::replace(&mut self.options.label_fit_mode, value);
        self.property_changed(
            AxisProperty::LabelFitMode,
            PropertyValue::FitMode(old),
            PropertyValue::FitMode(value),
        );
    }

    /// Sets the label format template; malformed templates are rejected.
    pub fn set_label_format(&mut self, value: Option<&str>) -> AxisResult<()> {
        let parsed = value.map(LabelFormat::parse).transpose()?;
        self.label_format = parsed;
        let value = value.map(str::to_owned);
        let old = std::mem::replace(&mut self.options.label_format, value.clone());
        self.property_changed(
            AxisProperty::LabelFormat,
            PropertyValue::Text(old),
            PropertyValue::Text(value),
        );
        Ok(())
    }

    /// Custom label content callback; takes precedence over any format.
    pub fn set_label_formatter(&mut self, formatter: Option<ContentFormatterFn>) {
        self.formatter = formatter;
        self.pending_invalidation = self.pending_invalidation.max(InvalidationLevel::Full);
        self.reset_state();
    }

    pub fn set_last_label_visibility(&mut self, value: Option<AxisLastLabelVisibility>) {
        let old = std::mem::replace(&mut self.options.last_label_visibility, value);
        self.property_changed(
            AxisProperty::LastLabelVisibility,
            PropertyValue::LastLabelVisibility(old),
            PropertyValue::LastLabelVisibility(value),
        );
    }

    pub fn set_horizontal_location(&mut self, value: AxisHorizontalLocation) {
        let old = std::mem::replace(&mut self.options.horizontal_location, value);
        self.property_changed(
            AxisProperty::HorizontalLocation,
            PropertyValue::HorizontalLocation(old),
            PropertyValue::HorizontalLocation(value),
        );
    }

    pub fn set_vertical_location(&mut self, value: AxisVerticalLocation) {
        let old = std::mem::replace(&mut self.options.vertical_location, value);
        self.property_changed(
            AxisProperty::VerticalLocation,
            PropertyValue::VerticalLocation(old),
            PropertyValue::VerticalLocation(value),
        );
    }

    pub fn set_is_inverse(&mut self, value: bool) {
        let old = std::mem::replace(&mut self.options.is_inverse, value);
        self.property_changed(
            AxisProperty::IsInverse,
            PropertyValue::Flag(old),
            PropertyValue::Flag(value),
        );
    }

    pub fn set_title(&mut self, value: Option<String>) {
        self.title = AxisTitle {
            content: value.clone(),
            ..AxisTitle::default()
        };
        let old = std::mem::replace(&mut self.options.title, value.clone());
        self.property_changed(
            AxisProperty::Title,
            PropertyValue::Text(old),
            PropertyValue::Text(value),
        );
    }

    /// User bounds of a numerical axis; `None` restores the automatic bound.
    pub fn set_numerical_range(&mut self, minimum: Option<f64>, maximum: Option<f64>) -> AxisResult<()> {
        let tag = self.kind.tag();
        for (property, value) in [("minimum", minimum), ("maximum", maximum)] {
            if value.is_some_and(|value| !value.is_finite()) {
                return Err(AxisError::invalid(property, "must be finite"));
            }
        }
        if let (Some(minimum), Some(maximum)) = (minimum, maximum) {
            if minimum > maximum {
                return Err(AxisError::invalid("minimum", "must not exceed maximum"));
            }
        }

        let AxisKind::Numerical(axis) = &mut self.kind else {
            return Err(unsupported(tag, "minimum"));
        };
        if matches!(axis.scale(), NumericalScale::Logarithmic { .. }) {
            for (property, value) in [("minimum", minimum), ("maximum", maximum)] {
                if value.is_some_and(|value| value <= 0.0) {
                    return Err(AxisError::invalid(
                        property,
                        "must be > 0 on a logarithmic axis",
                    ));
                }
            }
        }
        let options = axis.options_mut();
        let old_minimum = std::mem::replace(&mut options.minimum, minimum);
        let old_maximum = std::mem::replace(&mut options.maximum, maximum);
        self.property_changed(
            AxisProperty::Minimum,
            PropertyValue::OptionalNumber(old_minimum),
            PropertyValue::OptionalNumber(minimum),
        );
        self.property_changed(
            AxisProperty::Maximum,
            PropertyValue::OptionalNumber(old_maximum),
            PropertyValue::OptionalNumber(maximum),
        );
        Ok(())
    }

    /// Major step of numerical and date-time axes; `0` restores the automatic step.
    pub fn set_major_step(&mut self, value: f64) -> AxisResult<()> {
        let tag = self.kind.tag();
        if !value.is_finite() || value < 0.0 {
            return Err(AxisError::invalid("major_step", "must be finite and >= 0"));
        }
        let step = (value > 0.0).then_some(value);

        let old = match &mut self.kind {
            AxisKind::Numerical(axis) => std::mem::replace(&mut axis.options_mut().major_step, step),
            AxisKind::DateTime(axis) => std::mem::replace(&mut axis.options_mut().major_step, step),
            AxisKind::Categorical(_) => return Err(unsupported(tag, "major_step")),
        };
        self.property_changed(
            AxisProperty::MajorStep,
            PropertyValue::OptionalNumber(old),
            PropertyValue::OptionalNumber(step),
        );
        Ok(())
    }

    /// Desired tick count of a numerical axis; values `<= 1` restore the default.
    pub fn set_desired_tick_count(&mut self, value: usize) -> AxisResult<()> {
        let tag = self.kind.tag();
        let count = (value > 1).then_some(value);
        let AxisKind::Numerical(axis) = &mut self.kind else {
            return Err(unsupported(tag, "desired_tick_count"));
        };
        let old = std::mem::replace(&mut axis.options_mut().desired_tick_count, count);
        self.property_changed(
            AxisProperty::DesiredTickCount,
            PropertyValue::Count(old.unwrap_or(0)),
            PropertyValue::Count(count.unwrap_or(0)),
        );
        Ok(())
    }

    pub fn set_range_extend_direction(&mut self, value: RangeExtendDirection) -> AxisResult<()> {
        let tag = self.kind.tag();
        let AxisKind::Numerical(axis) = &mut self.kind else {
            return Err(unsupported(tag, "range_extend_direction"));
        };
        let old = std::mem::replace(&mut axis.options_mut().range_extend_direction, value);
        self.property_changed(
            AxisProperty::RangeExtendDirection,
            PropertyValue::ExtendDirection(old),
            PropertyValue::ExtendDirection(value),
        );
        Ok(())
    }

    pub fn set_logarithm_base(&mut self, value: f64) -> AxisResult<()> {
        let tag = self.kind.tag();
        let base = validate_logarithm_base(value)?;
        let AxisKind::Numerical(axis) = &mut self.kind else {
            return Err(unsupported(tag, "logarithm_base"));
        };
        let NumericalScale::Logarithmic { base: old } = axis.scale() else {
            return Err(unsupported(tag, "logarithm_base"));
        };
        axis.set_scale(NumericalScale::Logarithmic { base });
        self.property_changed(
            AxisProperty::LogarithmBase,
            PropertyValue::Number(old),
            PropertyValue::Number(base),
        );
        Ok(())
    }

    /// Share of a category slot left empty, within `0..=1`.
    pub fn set_gap_length(&mut self, value: f64) -> AxisResult<()> {
        let tag = self.kind.tag();
        let value = validate_unit_interval("gap_length", value)?;
        let old = match &mut self.kind {
            AxisKind::Categorical(axis) => std::mem::replace(&mut axis.options_mut().gap_length, value),
            AxisKind::DateTime(axis) => std::mem::replace(&mut axis.options_mut().gap_length, value),
            AxisKind::Numerical(_) => return Err(unsupported(tag, "gap_length")),
        };
        self.property_changed(
            AxisProperty::GapLength,
            PropertyValue::Number(old),
            PropertyValue::Number(value),
        );
        Ok(())
    }

    /// Explicit plot mode; `None` lets the series decide.
    pub fn set_plot_mode(&mut self, value: Option<AxisPlotMode>) -> AxisResult<()> {
        let tag = self.kind.tag();
        let old = match &mut self.kind {
            AxisKind::Categorical(axis) => std::mem::replace(&mut axis.options_mut().plot_mode, value),
            AxisKind::DateTime(axis) => std::mem::replace(&mut axis.options_mut().plot_mode, value),
            AxisKind::Numerical(_) => return Err(unsupported(tag, "plot_mode")),
        };
        self.property_changed(
            AxisProperty::PlotMode,
            PropertyValue::PlotMode(old),
            PropertyValue::PlotMode(value),
        );
        Ok(())
    }

    pub fn set_major_tick_interval(&mut self, value: usize) -> AxisResult<()> {
        let tag = self.kind.tag();
        if value == 0 {
            return Err(AxisError::invalid("major_tick_interval", "must be >= 1"));
        }
        let AxisKind::Categorical(axis) = &mut self.kind else {
            return Err(unsupported(tag, "major_tick_interval"));
        };
        let old = std::mem::replace(&mut axis.options_mut().major_tick_interval, value);
        self.property_changed(
            AxisProperty::MajorTickInterval,
            PropertyValue::Count(old),
            PropertyValue::Count(value),
        );
        Ok(())
    }

    pub fn set_auto_group(&mut self, value: bool) -> AxisResult<()> {
        let tag = self.kind.tag();
        let AxisKind::Categorical(axis) = &mut self.kind else {
            return Err(unsupported(tag, "auto_group"));
        };
        let old = std::mem::replace(&mut axis.options_mut().auto_group, value);
        self.property_changed(
            AxisProperty::AutoGroup,
            PropertyValue::Flag(old),
            PropertyValue::Flag(value),
        );
        Ok(())
    }

    /// User bounds of a date-time axis; `None` restores the data bound.
    pub fn set_date_time_range(
        &mut self,
        minimum: Option<DateTime<Utc>>,
        maximum: Option<DateTime<Utc>>,
    ) -> AxisResult<()> {
        let tag = self.kind.tag();
        if let (Some(minimum), Some(maximum)) = (minimum, maximum) {
            if minimum > maximum {
                return Err(AxisError::invalid("minimum", "must not exceed maximum"));
            }
        }
        let AxisKind::DateTime(axis) = &mut self.kind else {
            return Err(unsupported(tag, "minimum"));
        };
        let options = axis.options_mut();
        let old_minimum = std::mem::replace(&mut options.minimum, minimum);
        let old_maximum = std::mem::replace(&mut options.maximum, maximum);
        self.property_changed(
            AxisProperty::Minimum,
            PropertyValue::OptionalDateTime(old_minimum),
            PropertyValue::OptionalDateTime(minimum),
        );
        self.property_changed(
            AxisProperty::Maximum,
            PropertyValue::OptionalDateTime(old_maximum),
            PropertyValue::OptionalDateTime(maximum),
        );
        Ok(())
    }

    pub fn set_major_step_unit(&mut self, value: TimeInterval) -> AxisResult<()> {
        let tag = self.kind.tag();
        let AxisKind::DateTime(axis) = &mut self.kind else {
            return Err(unsupported(tag, "major_step_unit"));
        };
        let old = std::mem::replace(&mut axis.options_mut().major_step_unit, value);
        self.property_changed(
            AxisProperty::MajorStepUnit,
            PropertyValue::TimeInterval(old),
            PropertyValue::TimeInterval(value),
        );
        Ok(())
    }

    /// Tick cap of a date-time axis with an inferred step; at least 2.
    pub fn set_maximum_ticks(&mut self, value: Option<usize>) -> AxisResult<()> {
        let tag = self.kind.tag();
        if value.is_some_and(|value| value < 2) {
            return Err(AxisError::invalid("maximum_ticks", "must be >= 2"));
        }
        let AxisKind::DateTime(axis) = &mut self.kind else {
            return Err(unsupported(tag, "maximum_ticks"));
        };
        let old = std::mem::replace(&mut axis.options_mut().maximum_ticks, value);
        self.property_changed(
            AxisProperty::MaximumTicks,
            PropertyValue::Count(old.unwrap_or(0)),
            PropertyValue::Count(value.unwrap_or(0)),
        );
        Ok(())
    }

    pub fn set_plot_stretch(&mut self, value: DateTimePlotStretch) -> AxisResult<()> {
        let tag = self.kind.tag();
        let AxisKind::DateTime(axis) = &mut self.kind else {
            return Err(unsupported(tag, "plot_stretch"));
        };
        let old = std::mem::replace(&mut axis.options_mut().plot_stretch, value);
        self.property_changed(
            AxisProperty::PlotStretch,
            PropertyValue::PlotStretch(old),
            PropertyValue::PlotStretch(value),
        );
        Ok(())
    }

    #[must_use]
    pub fn kind_tag(&self) -> AxisKindTag {
        self.kind.tag()
    }
}

fn unsupported(tag: AxisKindTag, property: &'static str) -> AxisError {
    AxisError::invalid(property, format!("not supported by {tag:?} axes"))
}

fn validate_logarithm_base(base: f64) -> AxisResult<f64> {
    if !base.is_finite() || base <= 0.0 || base == 1.0 {
        return Err(AxisError::invalid(
            "logarithm_base",
            "must be finite, > 0 and != 1",
        ));
    }
    Ok(base)
}
