//! SourceCatalog - ordered records sharing one frozen schema

use std::cmp::Ordering;

use crate::record::{Point2D, SourceRecord};
use crate::schema::{FieldType, Key, Schema};

/// Catalog of sources
///
/// Owns its schema; once a catalog exists no field can be added.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    schema: Schema,
    records: Vec<SourceRecord>,
}

impl SourceCatalog {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Append a record with initial values for every field
    pub fn add_new(&mut self, id: u64, centroid: Point2D) -> &mut SourceRecord {
        self.records
            .push(SourceRecord::new(&self.schema, id, centroid));
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SourceRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SourceRecord> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SourceRecord> {
        self.records.iter_mut()
    }

    pub fn find_by_id(&self, id: u64) -> Option<&SourceRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Records whose parent is `parent_id`
    pub fn children(&self, parent_id: u64) -> impl Iterator<Item = &SourceRecord> {
        self.records
            .iter()
            .filter(move |r| r.parent() == Some(parent_id))
    }

    pub fn sort_by_id(&mut self) {
        self.records.sort_by_key(SourceRecord::id);
    }

    /// Stable sort by a field; unordered values (NaN) go last
    pub fn sort_by_key<T: FieldType + PartialOrd>(&mut self, key: Key<T>) {
        self.records.sort_by(|a, b| {
            let (va, vb) = (a.get(key), b.get(key));
            va.partial_cmp(&vb).unwrap_or_else(|| {
                let a_ordered = va.partial_cmp(&va).is_some();
                let b_ordered = vb.partial_cmp(&vb).is_some();
                match (a_ordered, b_ordered) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => Ordering::Equal,
                }
            })
        });
    }
}

impl<'a> IntoIterator for &'a SourceCatalog {
    type Item = &'a SourceRecord;
    type IntoIter = std::slice::Iter<'a, SourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut SourceCatalog {
    type Item = &'a mut SourceRecord;
    type IntoIter = std::slice::IterMut<'a, SourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
