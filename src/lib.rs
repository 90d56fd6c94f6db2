//! chart-axis: framework-independent axis modeling and plot-coordinate layout.
//!
//! Axes resolve their data range from series (stacking included), generate
//! ticks and labels for the visible window, and report the size they need
//! inside a host layout pass. Rendering stays with the host behind the
//! [`render::AxisPresenter`] seam.

pub mod api;
pub mod axis;
pub mod combine;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{AxisSnapshot, ChartArea, ChartAreaSnapshot, InvalidationLevel};
pub use axis::{AxisModel, AxisOptions, LabelFormat, StackAggregationContext};
pub use error::{AxisError, AxisResult};
pub use render::{AxisPresenter, MeasuredElement, NullPresenter};
