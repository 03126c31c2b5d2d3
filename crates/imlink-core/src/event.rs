//! Interaction events delivered by the render collaborator
//!
//! The engine consumes selection and click events as plain data: a list of
//! points, each referencing the trace and point (or bin) it was made on.

use serde::{Deserialize, Serialize};

/// One point of a selection or click event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPoint {
    /// Point index within the trace; bin number for histograms
    pub point_number: usize,
    /// Index of the trace the point belongs to
    pub curve_number: usize,
    /// Uid of the trace the point belongs to
    pub trace_uid: Option<String>,
    /// Slice label, for label-addressed chart types
    pub label: Option<String>,
    /// Underlying point indices, when the render layer pre-expands bins
    pub point_numbers: Option<Vec<usize>>,
}

impl EventPoint {
    pub fn new(curve_number: usize, point_number: usize) -> Self {
        Self {
            point_number,
            curve_number,
            ..Self::default()
        }
    }

    pub fn with_uid(mut self, uid: &str) -> Self {
        self.trace_uid = Some(uid.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_point_numbers(mut self, point_numbers: Vec<usize>) -> Self {
        self.point_numbers = Some(point_numbers);
        self
    }
}

/// A box/lasso selection or click event on one panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub points: Vec<EventPoint>,
}

impl SelectionEvent {
    pub fn new(points: Vec<EventPoint>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
