//! The multi-dimensional filter index
//!
//! One instance exists per dashboard and is the single source of truth for
//! filter state. Dimensions are independent axes over one shared record set:
//! applying a predicate on one dimension and querying the record axis yields
//! the intersection of all active predicates, in whatever order they were
//! applied. That intersection property is what makes panel linking work.

use crate::grid::{CellValue, Grid, Record};
use crate::panel::PanelId;
use crate::registry::FieldSource;
use imlink_filter::{ComparisonOp, FilterValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Handle to one dimension of the filter index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionId(usize);

/// What drives a dimension's predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DimensionRole {
    /// The whole-record identity axis used for retained-set queries
    Record,
    /// Selection axis owned by one interactive panel
    Plot(PanelId),
    /// Externally driven programmatic filter
    Form,
}

/// A boolean test narrowing the retained record set along one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Retain exactly these original record indices
    Indices(BTreeSet<usize>),
    /// Compare one column's value against a literal
    Column {
        column: String,
        op: ComparisonOp,
        value: FilterValue,
    },
}

impl Predicate {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Indices(set) => set.contains(&record.index),
            Predicate::Column { column, op, value } => match (record.get(column), value) {
                (Some(CellValue::Number(actual)), FilterValue::Number(expected)) => {
                    op.evaluate(*actual, *expected)
                }
                (Some(CellValue::Text(actual)), FilterValue::Text(expected)) => {
                    op.evaluate_ordering(actual.as_str().cmp(expected.as_str()))
                }
                // Absent columns and type mismatches retain nothing.
                _ => false,
            },
        }
    }
}

/// One filterable axis of the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub role: DimensionRole,
    pub constrained: bool,
    predicate: Option<Predicate>,
}

impl Dimension {
    fn new(role: DimensionRole) -> Self {
        Self {
            role,
            constrained: false,
            predicate: None,
        }
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn is_constrained(&self) -> bool {
        self.constrained
    }
}

/// The shared filter state: grid, field sources, records, and dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterIndex {
    grid: Grid,
    field_sources: BTreeMap<String, Vec<FieldSource>>,
    records: Vec<Record>,
    dimensions: Vec<Dimension>,
}

impl FilterIndex {
    /// Create an index with its whole-record dimension
    pub fn new() -> Self {
        Self {
            grid: Grid::new(),
            field_sources: BTreeMap::new(),
            records: Vec::new(),
            dimensions: vec![Dimension::new(DimensionRole::Record)],
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Append a field source and seed its column (first binding wins)
    pub fn merge_field_source(&mut self, source: FieldSource) {
        self.grid.insert_column(&source.column, source.data.clone());
        self.field_sources
            .entry(source.column.clone())
            .or_default()
            .push(source);
    }

    pub fn field_sources(&self) -> &BTreeMap<String, Vec<FieldSource>> {
        &self.field_sources
    }

    /// Field sources bound by one panel, across all columns
    pub fn panel_field_sources(&self, panel: &PanelId) -> Vec<&FieldSource> {
        self.field_sources
            .values()
            .flatten()
            .filter(|fs| &fs.panel == panel)
            .collect()
    }

    /// (Re)build the record set from the current grid
    pub fn build(&mut self) {
        self.records = self.grid.records();
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn add_dimension(&mut self, role: DimensionRole) -> DimensionId {
        self.dimensions.push(Dimension::new(role));
        DimensionId(self.dimensions.len() - 1)
    }

    pub fn dimension(&self, id: DimensionId) -> Option<&Dimension> {
        self.dimensions.get(id.0)
    }

    /// The selection dimension owned by one panel
    pub fn plot_dimension(&self, panel: &PanelId) -> Option<DimensionId> {
        self.dimensions
            .iter()
            .position(|d| matches!(&d.role, DimensionRole::Plot(p) if p == panel))
            .map(DimensionId)
    }

    /// Replace a dimension's predicate
    ///
    /// Any previously held predicate is disposed first; `None` clears. Safe
    /// to call on an unconstrained dimension.
    pub fn apply_predicate(&mut self, id: DimensionId, predicate: Option<Predicate>) {
        if let Some(dim) = self.dimensions.get_mut(id.0) {
            dim.constrained = predicate.is_some();
            dim.predicate = predicate;
        }
    }

    /// Whether any dimension currently holds a filter
    pub fn some_constrained(&self) -> bool {
        self.dimensions.iter().any(|d| d.constrained)
    }

    /// Records passing every active predicate, ascending by original index
    ///
    /// Returns the empty set when nothing is constrained: highlighting is
    /// only meaningful once at least one filter is active.
    pub fn retained_records(&self) -> Vec<&Record> {
        if !self.some_constrained() {
            return Vec::new();
        }
        let active: Vec<&Predicate> = self
            .dimensions
            .iter()
            .filter(|d| d.constrained)
            .filter_map(Dimension::predicate)
            .collect();
        self.records
            .iter()
            .filter(|record| active.iter().all(|p| p.matches(record)))
            .collect()
    }

    /// Original indices of the retained records
    pub fn retained_indices(&self) -> Vec<usize> {
        self.retained_records().iter().map(|r| r.index).collect()
    }

    /// Clear every dimension's predicate and constrained flag. Idempotent.
    pub fn reset_all(&mut self) {
        for dim in &mut self.dimensions {
            dim.constrained = false;
            dim.predicate = None;
        }
    }
}

impl Default for FilterIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::AttrPath;

    fn seeded_index() -> (FilterIndex, DimensionId, DimensionId) {
        let mut index = FilterIndex::new();
        index.merge_field_source(FieldSource {
            panel: PanelId::from("p1"),
            trace_index: 0,
            src_attribute: "xsrc".to_string(),
            path: AttrPath::new().key("x"),
            column: "a".to_string(),
            data: vec![1.into(), 2.into(), 3.into(), 4.into(), 5.into()],
            constrained: false,
        });
        index.merge_field_source(FieldSource {
            panel: PanelId::from("p1"),
            trace_index: 0,
            src_attribute: "ysrc".to_string(),
            path: AttrPath::new().key("y"),
            column: "b".to_string(),
            data: vec!["x".into(), "y".into(), "x".into(), "y".into(), "x".into()],
            constrained: false,
        });
        index.build();
        let plot = index.add_dimension(DimensionRole::Plot(PanelId::from("p1")));
        let form = index.add_dimension(DimensionRole::Form);
        (index, plot, form)
    }

    fn column_eq(column: &str, value: &str) -> Predicate {
        Predicate::Column {
            column: column.to_string(),
            op: ComparisonOp::Eq,
            value: FilterValue::Text(value.to_string()),
        }
    }

    #[test]
    fn test_unconstrained_index_retains_nothing() {
        let (index, _, _) = seeded_index();
        assert_eq!(index.record_count(), 5);
        assert!(!index.some_constrained());
        assert!(index.retained_records().is_empty());
    }

    #[test]
    fn test_column_predicate_narrows_by_value() {
        let (mut index, _, form) = seeded_index();
        index.apply_predicate(form, Some(column_eq("b", "x")));
        assert_eq!(index.retained_indices(), vec![0, 2, 4]);
    }

    #[test]
    fn test_predicates_intersect_across_dimensions() {
        let (mut index, plot, form) = seeded_index();
        index.apply_predicate(form, Some(column_eq("b", "x")));
        index.apply_predicate(
            plot,
            Some(Predicate::Indices([0, 1, 2].into_iter().collect())),
        );
        assert_eq!(index.retained_indices(), vec![0, 2]);

        // Application order must not matter.
        index.reset_all();
        index.apply_predicate(
            plot,
            Some(Predicate::Indices([0, 1, 2].into_iter().collect())),
        );
        index.apply_predicate(form, Some(column_eq("b", "x")));
        assert_eq!(index.retained_indices(), vec![0, 2]);
    }

    #[test]
    fn test_clearing_a_predicate_round_trips() {
        let (mut index, _, form) = seeded_index();
        index.apply_predicate(form, Some(column_eq("b", "x")));
        index.apply_predicate(form, None);
        assert!(!index.some_constrained());
        assert!(index.retained_records().is_empty());
    }

    #[test]
    fn test_reapplying_a_predicate_is_idempotent() {
        let (mut index, _, form) = seeded_index();
        index.apply_predicate(form, Some(column_eq("b", "x")));
        let first = index.retained_indices();
        index.apply_predicate(form, Some(column_eq("b", "x")));
        assert_eq!(index.retained_indices(), first);
    }

    #[test]
    fn test_reset_all_is_idempotent() {
        let (mut index, plot, form) = seeded_index();
        index.apply_predicate(form, Some(column_eq("b", "x")));
        index.apply_predicate(plot, Some(Predicate::Indices(BTreeSet::new())));
        index.reset_all();
        assert!(!index.some_constrained());
        index.reset_all();
        assert!(!index.some_constrained());
    }

    #[test]
    fn test_numeric_predicate_and_type_mismatch() {
        let (mut index, _, form) = seeded_index();
        index.apply_predicate(
            form,
            Some(Predicate::Column {
                column: "a".to_string(),
                op: ComparisonOp::Gt,
                value: FilterValue::Number(3.0),
            }),
        );
        assert_eq!(index.retained_indices(), vec![3, 4]);

        // Text literal against a numeric column retains nothing.
        index.apply_predicate(
            form,
            Some(Predicate::Column {
                column: "a".to_string(),
                op: ComparisonOp::Gt,
                value: FilterValue::Text("3".to_string()),
            }),
        );
        assert!(index.retained_indices().is_empty());
    }

    #[test]
    fn test_plot_dimension_lookup() {
        let (index, plot, _) = seeded_index();
        assert_eq!(index.plot_dimension(&PanelId::from("p1")), Some(plot));
        assert_eq!(index.plot_dimension(&PanelId::from("p2")), None);
    }
}
