pub mod primitives;
pub mod range;
pub mod series;
pub mod types;

pub use range::ValueRange;
pub use series::{AxisValue, CategoryKey, DataPoint, PointRef, SeriesModel, select_plot_mode};
pub use types::{
    AxisHorizontalLocation, AxisId, AxisLabelFitMode, AxisLastLabelVisibility, AxisPlotMode,
    AxisType, AxisVerticalLocation, CombineMode, DateTimePlotStretch, RangeExtendDirection, Rect,
    SeriesId, Size, Thickness, TimeInterval,
};
