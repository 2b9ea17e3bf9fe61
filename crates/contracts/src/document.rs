//! Catalog interchange document
//!
//! Serde form of a schema plus records. Loading is two-phase so that tasks can
//! add their fields between building the schema and filling the records:
//!
//! ```ignore
//! let mut schema = document.build_schema()?;
//! let task = ApplyApCorrTask::new(&mut schema, &names, config)?;
//! let catalog = document.fill(SourceCatalog::new(schema))?;
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ContractError, FieldKind, Point2D, Schema, SourceCatalog, SourceRecord};

/// Field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub doc: String,
}

/// Cell value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Int(i64),
    Float(f64),
}

/// One record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    pub centroid: Point2D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint_area: Option<u32>,
    /// Values by field name; missing fields keep their initial value
    #[serde(default)]
    pub values: BTreeMap<String, Option<FieldValue>>,
}

/// Whole catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub records: Vec<RecordDocument>,
}

impl CatalogDocument {
    /// Build a mutable schema from the declared fields and aliases
    pub fn build_schema(&self) -> Result<Schema, ContractError> {
        let mut schema = Schema::new();
        for field in &self.fields {
            match field.kind {
                FieldKind::F64 => schema.add_field::<f64>(&field.name, &field.doc).map(drop)?,
                FieldKind::I32 => schema.add_field::<i32>(&field.name, &field.doc).map(drop)?,
                FieldKind::Flag => schema.add_field::<bool>(&field.name, &field.doc).map(drop)?,
            }
        }
        for (alias, target) in &self.aliases {
            schema.alias_map_mut().set(alias, target);
        }
        Ok(schema)
    }

    /// Append the document's records to `catalog`
    pub fn fill(&self, mut catalog: SourceCatalog) -> Result<SourceCatalog, ContractError> {
        let schema = catalog.schema().clone();
        for doc in &self.records {
            let record = catalog.add_new(doc.id, doc.centroid);
            record.set_parent(doc.parent);
            record.set_footprint_area(doc.footprint_area);
            for (name, value) in &doc.values {
                write_value(&schema, record, name, *value)?;
            }
        }
        Ok(catalog)
    }

    /// Snapshot a catalog, including every field added by tasks
    pub fn from_catalog(catalog: &SourceCatalog) -> Result<Self, ContractError> {
        let schema = catalog.schema();
        let fields: Vec<FieldSpec> = schema
            .fields()
            .map(|f| FieldSpec {
                name: f.name.clone(),
                kind: f.kind,
                doc: f.doc.clone(),
            })
            .collect();
        let aliases = schema
            .alias_map()
            .iter()
            .map(|(a, t)| (a.to_string(), t.to_string()))
            .collect();

        let mut records = Vec::with_capacity(catalog.len());
        for record in catalog {
            let mut values = BTreeMap::new();
            for field in &fields {
                values.insert(field.name.clone(), read_value(schema, record, field)?);
            }
            records.push(RecordDocument {
                id: record.id(),
                parent: record.parent(),
                centroid: record.centroid(),
                footprint_area: record.footprint_area(),
                values,
            });
        }

        Ok(Self {
            fields,
            aliases,
            records,
        })
    }
}

fn write_value(
    schema: &Schema,
    record: &mut SourceRecord,
    name: &str,
    value: Option<FieldValue>,
) -> Result<(), ContractError> {
    let kind = schema
        .field(name)
        .map(|f| f.kind)
        .ok_or_else(|| ContractError::document(record.id(), format!("unknown field '{name}'")))?;

    // null means NaN for floating fields and is otherwise invalid
    match (kind, value) {
        (FieldKind::F64, None) => record.set(schema.find::<f64>(name)?, f64::NAN),
        (FieldKind::F64, Some(FieldValue::Float(v))) => record.set(schema.find::<f64>(name)?, v),
        (FieldKind::F64, Some(FieldValue::Int(v))) => {
            record.set(schema.find::<f64>(name)?, v as f64)
        }
        (FieldKind::I32, Some(FieldValue::Int(v))) => {
            let v = i32::try_from(v).map_err(|_| {
                ContractError::document(record.id(), format!("value {v} out of range for '{name}'"))
            })?;
            record.set(schema.find::<i32>(name)?, v)
        }
        (FieldKind::Flag, Some(FieldValue::Flag(v))) => record.set(schema.find::<bool>(name)?, v),
        (kind, value) => {
            return Err(ContractError::document(
                record.id(),
                format!("value {value:?} does not fit field '{name}' of kind {kind:?}"),
            ))
        }
    }
    Ok(())
}

fn read_value(
    schema: &Schema,
    record: &SourceRecord,
    field: &FieldSpec,
) -> Result<Option<FieldValue>, ContractError> {
    let value = match field.kind {
        FieldKind::F64 => {
            let v = record.get(schema.find::<f64>(&field.name)?);
            // JSON has no NaN
            v.is_finite().then_some(FieldValue::Float(v))
        }
        FieldKind::I32 => Some(FieldValue::Int(
            record.get(schema.find::<i32>(&field.name)?) as i64,
        )),
        FieldKind::Flag => Some(FieldValue::Flag(
            record.get(schema.find::<bool>(&field.name)?),
        )),
    };
    Ok(value)
}
