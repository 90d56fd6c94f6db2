use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::InvalidationLevel;
use crate::core::{
    AxisHorizontalLocation, AxisLabelFitMode, AxisLastLabelVisibility, AxisPlotMode,
    AxisVerticalLocation, DateTimePlotStretch, RangeExtendDirection, TimeInterval,
};
use crate::error::{AxisError, AxisResult};

/// Settings shared by every axis kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisOptions {
    pub label_interval: usize,
    pub label_offset: usize,
    pub major_tick_offset: usize,
    pub major_tick_length: f64,
    pub line_thickness: f64,
    pub tick_thickness: f64,
    pub normalized_label_rotation_angle: f64,
    pub show_labels: bool,
    pub label_fit_mode: AxisLabelFitMode,
    pub label_format: Option<String>,
    /// `None` keeps the orientation default.
    pub last_label_visibility: Option<AxisLastLabelVisibility>,
    pub horizontal_location: AxisHorizontalLocation,
    pub vertical_location: AxisVerticalLocation,
    pub is_inverse: bool,
    pub title: Option<String>,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            label_interval: 1,
            label_offset: 0,
            major_tick_offset: 0,
            major_tick_length: 5.0,
            line_thickness: 1.0,
            tick_thickness: 1.0,
            normalized_label_rotation_angle: 300.0,
            show_labels: true,
            label_fit_mode: AxisLabelFitMode::None,
            label_format: None,
            last_label_visibility: None,
            horizontal_location: AxisHorizontalLocation::Left,
            vertical_location: AxisVerticalLocation::Bottom,
            is_inverse: false,
            title: None,
        }
    }
}

impl AxisOptions {
    /// Checks a whole option set, e.g. one deserialized from a host config.
    pub fn validate(&self) -> AxisResult<()> {
        validate_label_interval(self.label_interval)?;
        validate_length("major_tick_length", self.major_tick_length)?;
        validate_length("line_thickness", self.line_thickness)?;
        validate_length("tick_thickness", self.tick_thickness)?;
        validate_rotation_angle(self.normalized_label_rotation_angle)?;
        if let Some(format) = &self.label_format {
            crate::axis::LabelFormat::parse(format)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_label_interval(value: usize) -> AxisResult<usize> {
    if value == 0 {
        return Err(AxisError::invalid("label_interval", "must be >= 1"));
    }
    Ok(value)
}

pub(crate) fn validate_length(property: &'static str, value: f64) -> AxisResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(AxisError::invalid(property, "must be finite and >= 0"));
    }
    Ok(value)
}

pub(crate) fn validate_rotation_angle(value: f64) -> AxisResult<f64> {
    if !(0.0..=360.0).contains(&value) {
        return Err(AxisError::invalid(
            "normalized_label_rotation_angle",
            "must be within 0..=360",
        ));
    }
    Ok(value)
}

pub(crate) fn validate_unit_interval(property: &'static str, value: f64) -> AxisResult<f64> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AxisError::invalid(property, "must be within 0..=1"));
    }
    Ok(value)
}

/// Every observable axis property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisProperty {
    LabelInterval,
    LabelOffset,
    MajorTickOffset,
    MajorTickLength,
    LineThickness,
    TickThickness,
    NormalizedLabelRotationAngle,
    ShowLabels,
    LabelFitMode,
    LabelFormat,
    LastLabelVisibility,
    HorizontalLocation,
    VerticalLocation,
    IsInverse,
    Title,
    Minimum,
    Maximum,
    MajorStep,
    DesiredTickCount,
    RangeExtendDirection,
    LogarithmBase,
    GapLength,
    PlotMode,
    MajorTickInterval,
    AutoGroup,
    MajorStepUnit,
    MaximumTicks,
    PlotStretch,
}

impl AxisProperty {
    /// How much of the chart a change of this property invalidates.
    #[must_use]
    pub const fn invalidation_level(self) -> InvalidationLevel {
        match self {
            Self::LineThickness | Self::TickThickness => InvalidationLevel::Axes,
            _ => InvalidationLevel::Full,
        }
    }
}

/// Property value carried by change notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Count(usize),
    Number(f64),
    OptionalNumber(Option<f64>),
    OptionalDateTime(Option<DateTime<Utc>>),
    Flag(bool),
    Text(Option<String>),
    PlotMode(Option<AxisPlotMode>),
    FitMode(AxisLabelFitMode),
    LastLabelVisibility(Option<AxisLastLabelVisibility>),
    HorizontalLocation(AxisHorizontalLocation),
    VerticalLocation(AxisVerticalLocation),
    ExtendDirection(RangeExtendDirection),
    TimeInterval(TimeInterval),
    PlotStretch(DateTimePlotStretch),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub property: AxisProperty,
    pub old_value: PropertyValue,
    pub new_value: PropertyValue,
}

pub type PropertyChangedFn = Arc<dyn Fn(&PropertyChange) + Send + Sync + 'static>;

/// Registered property listeners of one axis.
#[derive(Clone, Default)]
pub(crate) struct PropertyListeners {
    listeners: Vec<PropertyChangedFn>,
}

impl fmt::Debug for PropertyListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl PropertyListeners {
    pub(crate) fn push(&mut self, listener: PropertyChangedFn) {
        self.listeners.push(listener);
    }

    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
    }

    pub(crate) fn notify(&self, change: &PropertyChange) {
        for listener in &self.listeners {
            listener(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = AxisOptions::default();
        options.validate().expect("defaults validate");
        assert_eq!(options.label_interval, 1);
        assert_eq!(options.major_tick_length, 5.0);
        assert_eq!(options.normalized_label_rotation_angle, 300.0);
    }

    #[test]
    fn invalid_option_sets_are_rejected() {
        let zero_interval = AxisOptions {
            label_interval: 0,
            ..AxisOptions::default()
        };
        assert!(zero_interval.validate().is_err());

        let nan_thickness = AxisOptions {
            tick_thickness: f64::NAN,
            ..AxisOptions::default()
        };
        assert!(matches!(
            nan_thickness.validate(),
            Err(AxisError::InvalidArgument {
                property: "tick_thickness",
                ..
            })
        ));

        let bad_format = AxisOptions {
            label_format: Some("{".to_owned()),
            ..AxisOptions::default()
        };
        assert!(matches!(bad_format.validate(), Err(AxisError::Format(_))));
    }

    #[test]
    fn thickness_changes_only_invalidate_axes() {
        assert_eq!(
            AxisProperty::TickThickness.invalidation_level(),
            InvalidationLevel::Axes
        );
        assert_eq!(
            AxisProperty::LabelInterval.invalidation_level(),
            InvalidationLevel::Full
        );
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: AxisOptions =
            serde_json::from_str(r#"{"label_interval": 3}"#).expect("partial options");
        assert_eq!(options.label_interval, 3);
        assert!(options.show_labels);
    }
}
