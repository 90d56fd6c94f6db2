use serde::{Deserialize, Serialize};

/// Ordered invalidation levels raised by axis property changes.
///
/// `Axes` only re-runs the measure pass. `Full` resets axes and combine
/// strategies so ranges, stacks and plot infos are rebuilt from series data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum InvalidationLevel {
    #[default]
    None,
    Axes,
    Full,
}

impl InvalidationLevel {
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if self as u8 >= other as u8 {
            self
        } else {
            other
        }
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}
