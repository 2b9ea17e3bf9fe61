//! SourceRecord - one detected object

use serde::{Deserialize, Serialize};

use crate::schema::{FieldType, Key, Schema};

/// 2-D pixel position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Typed column storage of a record
#[doc(hidden)]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValues {
    pub(crate) f64s: Vec<f64>,
    pub(crate) i32s: Vec<i32>,
    pub(crate) flags: Vec<bool>,
}

impl RecordValues {
    fn for_schema(schema: &Schema) -> Self {
        let (n_f64, n_i32, n_flag) = schema.column_counts();
        Self {
            f64s: vec![f64::initial(); n_f64],
            i32s: vec![i32::initial(); n_i32],
            flags: vec![bool::initial(); n_flag],
        }
    }
}

/// One row of a source catalog
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    id: u64,
    parent: Option<u64>,
    centroid: Point2D,
    footprint_area: Option<u32>,
    values: RecordValues,
}

impl SourceRecord {
    pub(crate) fn new(schema: &Schema, id: u64, centroid: Point2D) -> Self {
        Self {
            id,
            parent: None,
            centroid,
            footprint_area: None,
            values: RecordValues::for_schema(schema),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn parent(&self) -> Option<u64> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<u64>) {
        self.parent = parent;
    }

    pub fn centroid(&self) -> Point2D {
        self.centroid
    }

    pub fn set_centroid(&mut self, centroid: Point2D) {
        self.centroid = centroid;
    }

    /// Pixel count of the detection footprint, if one was attached
    pub fn footprint_area(&self) -> Option<u32> {
        self.footprint_area
    }

    pub fn set_footprint_area(&mut self, area: Option<u32>) {
        self.footprint_area = area;
    }

    /// Read a field
    ///
    /// # Panics
    /// If `key` was obtained from a different schema with more columns.
    pub fn get<T: FieldType>(&self, key: Key<T>) -> T {
        T::column(&self.values)[key.offset()]
    }

    /// Write a field
    ///
    /// # Panics
    /// If `key` was obtained from a different schema with more columns.
    pub fn set<T: FieldType>(&mut self, key: Key<T>, value: T) {
        T::column_mut(&mut self.values)[key.offset()] = value;
    }
}
