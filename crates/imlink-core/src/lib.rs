//! imlink-core - Linked-panel crossfiltering engine
//!
//! This crate provides the filter-state synchronization logic for dashboards
//! whose panels render different projections of one shared dataset: a
//! selection gesture on any panel narrows the salient record set on every
//! panel.
//!
//! # Key Components
//!
//! - **Grid**: the shared column store, with stable original record indices
//! - **FieldSource registry**: which grid columns back which rendered attributes
//! - **Compliance**: the one-time capability probe deciding whether linking
//!   can be enabled at all
//! - **FilterIndex**: the multi-dimensional filter index; the retained set is
//!   the intersection of all active predicates
//! - **Translation**: per-chart-type decoding of selection and click events
//! - **Dashboard**: the coordinator owning the shared state
//!
//! # Division of Labor
//!
//! The engine renders nothing. Interaction events and programmatic filter
//! specs go in; redraw instructions ([`PanelRedraw`]) come out. The rendering
//! collaborator owns pixels, hit-testing, and redraw, and reports each
//! panel's resolved appearance once its setup completes.

pub mod compliance;
pub mod config;
pub mod crossfilter;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod grid;
pub mod panel;
pub mod redraw;
pub mod registry;
pub mod trace;
pub mod translate;

pub use compliance::{default_allow_list, is_linkable};
pub use config::{default_layout_overrides, DashboardConfig};
pub use crossfilter::{Dimension, DimensionId, DimensionRole, FilterIndex, Predicate};
pub use dashboard::Dashboard;
pub use error::{DashboardError, DashboardResult};
pub use event::{EventPoint, SelectionEvent};
pub use grid::{CellValue, Grid, Record};
pub use panel::{PanelEntry, PanelId, PanelRenderInfo, TraceRenderInfo};
pub use redraw::{PanelRedraw, RestyleOp, DESELECT_DIM, DESELECT_DIM_MAPBOX};
pub use registry::{collect_field_sources, FieldSource};
pub use trace::{AttrPath, ChartType, PathSegment, TraceDef};
pub use translate::{event_points, translate};
