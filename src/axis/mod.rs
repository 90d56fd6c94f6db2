//! Axis models: range resolution, tick and label generation, layout.

pub mod kind;
pub mod label;
pub mod label_format;
pub mod layout;
pub mod model;
pub mod options;
pub mod plot_info;
pub mod stack_context;
pub mod tick;

pub use kind::{
    AxisCategory, AxisKind, AxisKindTag, CategoricalAxis, CategoricalOptions, DateTimeAxis,
    DateTimeOptions, NumericalAxis, NumericalOptions, NumericalScale, StackSumValue, TimeSlot,
};
pub use label::{AxisLabel, AxisTitle};
pub use label_format::{ContentFormatterFn, LabelFormat, LabelValue};
pub use layout::{ChartView, LayoutStrategy, reflect, rotated_bounds};
pub use model::AxisModel;
pub use options::{AxisOptions, AxisProperty, PropertyChange, PropertyChangedFn, PropertyValue};
pub use plot_info::AxisPlotInfo;
pub use stack_context::StackAggregationContext;
pub use tick::{AxisTick, TickPosition, TickType, link_ticks};
