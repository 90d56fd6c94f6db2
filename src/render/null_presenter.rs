use crate::core::Size;
use crate::render::{AxisPresenter, MeasuredElement};

/// Headless presenter with a fixed-pitch text model.
///
/// Each character is `char_width` wide and each line `line_height` tall.
/// Used by tests and tools that need deterministic layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullPresenter {
    pub char_width: f64,
    pub line_height: f64,
    pub is_visible: bool,
}

impl Default for NullPresenter {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
            is_visible: true,
        }
    }
}

impl NullPresenter {
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            is_visible: false,
            ..Self::default()
        }
    }
}

impl AxisPresenter for NullPresenter {
    fn is_visible(&self) -> bool {
        self.is_visible
    }

    fn measure_content(&self, _element: MeasuredElement, content: &str) -> Size {
        if content.is_empty() {
            return Size::EMPTY;
        }
        let lines = content.lines().count().max(1);
        let widest = content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        Size::new(
            widest as f64 * self.char_width,
            lines as f64 * self.line_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_widest_line() {
        let presenter = NullPresenter::default();
        let size = presenter.measure_content(MeasuredElement::Title, "ab\nabcd");
        assert_eq!(size, Size::new(28.0, 28.0));
        assert_eq!(
            presenter.measure_content(MeasuredElement::Label(0), ""),
            Size::EMPTY
        );
    }
}
