//! Error types for imlink-core
//!
//! Capability mismatches are deliberately not errors: a dashboard that
//! cannot be linked falls back to unlinked rendering. Errors cover caller
//! mistakes (unknown panels, filters over absent columns, malformed filter
//! expressions) that must surface instead of producing silently wrong
//! filtering.

use crate::panel::PanelId;
use imlink_filter::ParseError;
use thiserror::Error;

/// Main error type for dashboard operations
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The panel was never registered with this dashboard
    #[error("unknown panel: {0}")]
    UnknownPanel(PanelId),

    /// The panel is already registered
    #[error("panel '{0}' is already registered")]
    DuplicatePanel(PanelId),

    /// The panel's render setup has not completed yet
    #[error("panel '{0}' has not completed render setup")]
    PanelNotReady(PanelId),

    /// Crossfiltering is off for this dashboard, by configuration or
    /// because the compliance probe rejected the trace set
    #[error("crossfiltering is not enabled for this dashboard")]
    LinkingDisabled,

    /// A programmatic filter named a column the grid does not have
    #[error("column '{0}' is not present in the shared grid")]
    ColumnNotFound(String),

    /// Filter expression errors
    #[error("filter error: {0}")]
    Filter(#[from] ParseError),
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::ColumnNotFound("depth".to_string());
        assert!(err.to_string().contains("depth"));

        let err = DashboardError::UnknownPanel(PanelId::from("p9"));
        assert!(err.to_string().contains("p9"));
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = imlink_filter::parse_filter("a ~ 1").unwrap_err();
        let err = DashboardError::from(parse);
        assert!(matches!(err, DashboardError::Filter(_)));
    }
}
