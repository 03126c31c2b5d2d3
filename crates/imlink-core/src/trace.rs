//! Trace definitions and attribute-tree helpers
//!
//! A panel is rendered from a list of traces. Each trace carries an
//! attribute tree (a JSON value) in which attributes whose key ends in the
//! `src` suffix mark their base attribute as sourced from a grid column.
//! Column references are colon-qualified (`owner:grid:column`); only the
//! part after the last colon names the column.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Suffix marking an attribute as sourced from a grid column
pub const SRC_SUFFIX: &str = "src";

/// Keys whose array children contain attribute objects of their own and are
/// therefore walked (transform definitions are arrays of attribute trees)
const WALK_ARRAY_KEYS: &[&str] = &["transforms"];

/// Chart type of one trace
///
/// The named variants form the closed set of filter-reactive types; anything
/// else parses to [`ChartType::Other`] and can never join a crossfiltered
/// dashboard.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartType {
    Bar,
    Box,
    Choropleth,
    Histogram,
    Pie,
    Scatter,
    Scatter3d,
    ScatterGeo,
    ScatterMapbox,
    Table,
    /// A chart type outside the filter-reactive set
    Other(String),
}

impl ChartType {
    /// Parse a render-layer type string
    pub fn parse(s: &str) -> Self {
        match s {
            "bar" => ChartType::Bar,
            "box" => ChartType::Box,
            "choropleth" => ChartType::Choropleth,
            "histogram" => ChartType::Histogram,
            "pie" => ChartType::Pie,
            "scatter" => ChartType::Scatter,
            "scatter3d" => ChartType::Scatter3d,
            "scattergeo" => ChartType::ScatterGeo,
            "scattermapbox" => ChartType::ScatterMapbox,
            "table" => ChartType::Table,
            other => ChartType::Other(other.to_string()),
        }
    }

    /// Get the render-layer type string
    pub fn as_str(&self) -> &str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Box => "box",
            ChartType::Choropleth => "choropleth",
            ChartType::Histogram => "histogram",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Scatter3d => "scatter3d",
            ChartType::ScatterGeo => "scattergeo",
            ChartType::ScatterMapbox => "scattermapbox",
            ChartType::Table => "table",
            ChartType::Other(s) => s,
        }
    }

    /// Whether the type belongs to the fixed filter-reactive set
    pub fn filter_reactive(&self) -> bool {
        !matches!(self, ChartType::Other(_))
    }

    /// Context hover can only be toggled on flat chart types; the geo and 3d
    /// renderers restyle hover through a different path.
    pub fn supports_hover_toggle(&self) -> bool {
        !matches!(
            self,
            ChartType::Scatter3d | ChartType::ScatterGeo | ChartType::ScatterMapbox
        )
    }
}

impl From<String> for ChartType {
    fn from(s: String) -> Self {
        ChartType::parse(&s)
    }
}

impl From<ChartType> for String {
    fn from(t: ChartType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered trace of a panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDef {
    /// Chart type
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Trace identity, stable across restyles
    pub uid: String,
    /// The attribute tree
    pub attributes: Value,
}

impl TraceDef {
    /// Create a trace with a fresh uid
    pub fn new(chart_type: ChartType, attributes: Value) -> Self {
        Self {
            chart_type,
            uid: Uuid::new_v4().to_string(),
            attributes,
        }
    }

    /// Create a trace with a host-assigned uid
    pub fn with_uid(chart_type: ChartType, uid: impl Into<String>, attributes: Value) -> Self {
        Self {
            chart_type,
            uid: uid.into(),
            attributes,
        }
    }
}

/// One segment of a path into a trace attribute tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A path into a trace attribute tree
///
/// Rendered in the render layer's attribute-string form, e.g.
/// `cells.values[1]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttrPath(Vec<PathSegment>);

impl AttrPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Append a key segment
    pub fn key(mut self, key: &str) -> Self {
        self.0.push(PathSegment::Key(key.to_string()));
        self
    }

    /// Append an index segment
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The attribute-string rendering of the path
    pub fn to_attr_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_attr_string())
    }
}

/// Whether a key marks its base attribute as grid-sourced
pub fn is_src_attribute(key: &str) -> bool {
    key.len() > SRC_SUFFIX.len() && key.ends_with(SRC_SUFFIX)
}

/// The data attribute a `src` marker belongs to (`xsrc` -> `x`)
pub fn base_attribute_name(key: &str) -> &str {
    &key[..key.len() - SRC_SUFFIX.len()]
}

/// The column id of a colon-qualified column reference
pub fn column_ref_id(value: &str) -> &str {
    value.rsplit(':').next().unwrap_or(value)
}

/// Walk every object node of a trace attribute tree
///
/// `visit` is called once per key of each object, with the containing object
/// and the path to it. Array children are only descended under the keys in
/// [`WALK_ARRAY_KEYS`].
pub fn walk_attributes<F>(tree: &Value, visit: &mut F)
where
    F: FnMut(&str, &serde_json::Map<String, Value>, &[PathSegment]),
{
    let mut path = Vec::new();
    walk_inner(tree, &mut path, visit);
}

fn walk_inner<F>(node: &Value, path: &mut Vec<PathSegment>, visit: &mut F)
where
    F: FnMut(&str, &serde_json::Map<String, Value>, &[PathSegment]),
{
    let Value::Object(map) = node else {
        return;
    };
    for (key, child) in map {
        visit(key, map, path);
        match child {
            Value::Object(_) => {
                path.push(PathSegment::Key(key.clone()));
                walk_inner(child, path, visit);
                path.pop();
            }
            Value::Array(items) if WALK_ARRAY_KEYS.contains(&key.as_str()) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(PathSegment::Key(key.clone()));
                    path.push(PathSegment::Index(index));
                    walk_inner(item, path, visit);
                    path.pop();
                    path.pop();
                }
            }
            _ => {}
        }
    }
}

/// Set a value at `path`, creating intermediate objects (or arrays for index
/// segments) as needed
pub fn set_deep(root: &mut Value, path: &AttrPath, value: Value) {
    let Some((last, parents)) = path.segments().split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        node = match segment {
            PathSegment::Key(key) => ensure_object(node).entry(key.clone()).or_insert(Value::Null),
            PathSegment::Index(index) => {
                let items = ensure_array(node, index + 1);
                &mut items[*index]
            }
        };
    }

    match last {
        PathSegment::Key(key) => {
            ensure_object(node).insert(key.clone(), value);
        }
        PathSegment::Index(index) => {
            let items = ensure_array(node, index + 1);
            items[*index] = value;
        }
    }
}

fn ensure_object(node: &mut Value) -> &mut serde_json::Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(serde_json::Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

fn ensure_array(node: &mut Value, len: usize) -> &mut Vec<Value> {
    if !node.is_array() {
        *node = Value::Array(Vec::new());
    }
    match node {
        Value::Array(items) => {
            while items.len() < len {
                items.push(Value::Null);
            }
            items
        }
        _ => unreachable!("node was just made an array"),
    }
}

/// Blank every grid-backed data attribute of a trace attribute tree
///
/// Table headers keep their values; headers must not change just because
/// filtering eliminates rows.
pub fn erase_grid_data(attrs: &mut Value) {
    let mut path = Vec::new();
    erase_inner(attrs, &mut path);
}

fn erase_inner(node: &mut Value, path: &mut Vec<PathSegment>) {
    let Value::Object(map) = node else {
        return;
    };

    let in_header = matches!(path.first(), Some(PathSegment::Key(k)) if k == "header");
    if !in_header {
        let src_keys: Vec<String> = map.keys().filter(|k| is_src_attribute(k)).cloned().collect();
        for key in src_keys {
            map.insert(
                base_attribute_name(&key).to_string(),
                Value::Array(Vec::new()),
            );
        }
    }

    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys {
        let Some(child) = map.get_mut(&key) else {
            continue;
        };
        match child {
            Value::Object(_) => {
                path.push(PathSegment::Key(key.clone()));
                erase_inner(child, path);
                path.pop();
            }
            Value::Array(items) if WALK_ARRAY_KEYS.contains(&key.as_str()) => {
                for (index, item) in items.iter_mut().enumerate() {
                    path.push(PathSegment::Key(key.clone()));
                    path.push(PathSegment::Index(index));
                    erase_inner(item, path);
                    path.pop();
                    path.pop();
                }
            }
            _ => {}
        }
    }
}
