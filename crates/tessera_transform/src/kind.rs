//! Transform identifiers used as the first component of a cache key.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Identifies which transform produced a cached value.
///
/// Well-known kinds cover every coordinate system transform; anything else
/// the host wants to cache goes through [`TransformKind::Custom`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    ScreenToCanvas,
    CanvasToScreen,
    CanvasToGrid,
    GridToCanvas,
    CanvasToWorkspace,
    WorkspaceToCanvas,
    ScreenToGrid,
    GridToScreen,
    ScreenToWorkspace,
    WorkspaceToScreen,
    WorkspaceToGrid,
    GridToWorkspace,
    GridCellBounds,
    Custom(Cow<'static, str>),
}

impl TransformKind {
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        TransformKind::Custom(name.into())
    }

    /// Stable name, used for recording and pattern invalidation
    pub fn as_str(&self) -> &str {
        match self {
            TransformKind::ScreenToCanvas => "screen_to_canvas",
            TransformKind::CanvasToScreen => "canvas_to_screen",
            TransformKind::CanvasToGrid => "canvas_to_grid",
            TransformKind::GridToCanvas => "grid_to_canvas",
            TransformKind::CanvasToWorkspace => "canvas_to_workspace",
            TransformKind::WorkspaceToCanvas => "workspace_to_canvas",
            TransformKind::ScreenToGrid => "screen_to_grid",
            TransformKind::GridToScreen => "grid_to_screen",
            TransformKind::ScreenToWorkspace => "screen_to_workspace",
            TransformKind::WorkspaceToScreen => "workspace_to_screen",
            TransformKind::WorkspaceToGrid => "workspace_to_grid",
            TransformKind::GridToWorkspace => "grid_to_workspace",
            TransformKind::GridCellBounds => "grid_cell_bounds",
            TransformKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for TransformKind {
    fn from(name: &'static str) -> Self {
        TransformKind::Custom(Cow::Borrowed(name))
    }
}

impl From<String> for TransformKind {
    fn from(name: String) -> Self {
        TransformKind::Custom(Cow::Owned(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(TransformKind::CanvasToGrid.as_str(), "canvas_to_grid");
        assert_eq!(TransformKind::from("piece_anchor").as_str(), "piece_anchor");
        assert_eq!(
            TransformKind::custom(String::from("snap")).to_string(),
            "snap"
        );
    }

    #[test]
    fn test_borrowed_and_owned_custom_are_equal() {
        assert_eq!(
            TransformKind::from("snap"),
            TransformKind::from("snap".to_string())
        );
    }
}
