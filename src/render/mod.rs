mod null_presenter;

pub use null_presenter::NullPresenter;

use serde::{Deserialize, Serialize};

use crate::core::Size;

/// Visual element of an axis whose content the host measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasuredElement {
    /// Label at this index of the axis label list.
    Label(usize),
    Title,
}

/// Contract implemented by the host that draws an axis.
///
/// The axis never renders anything itself; it only asks the presenter how
/// much room a piece of content needs so layout stays independent of any
/// text engine.
pub trait AxisPresenter {
    fn is_visible(&self) -> bool;

    fn measure_content(&self, element: MeasuredElement, content: &str) -> Size;
}
