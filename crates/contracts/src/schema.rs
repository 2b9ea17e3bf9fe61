//! Schema - typed, named fields with column aliases
//!
//! Keys are resolved once at construction time and reused for every record access.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::record::RecordValues;
use crate::ContractError;

/// Maximum alias chain length before a cycle is assumed
const MAX_ALIAS_DEPTH: usize = 16;

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    F64,
    I32,
    Flag,
}

/// Rust types that can be stored in a record column
pub trait FieldType: Copy + fmt::Debug + 'static {
    const KIND: FieldKind;

    /// Value a fresh record holds before anything is written
    fn initial() -> Self;

    #[doc(hidden)]
    fn column(values: &RecordValues) -> &[Self];

    #[doc(hidden)]
    fn column_mut(values: &mut RecordValues) -> &mut [Self];
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::F64;

    fn initial() -> Self {
        f64::NAN
    }

    fn column(values: &RecordValues) -> &[Self] {
        &values.f64s
    }

    fn column_mut(values: &mut RecordValues) -> &mut [Self] {
        &mut values.f64s
    }
}

impl FieldType for i32 {
    const KIND: FieldKind = FieldKind::I32;

    fn initial() -> Self {
        0
    }

    fn column(values: &RecordValues) -> &[Self] {
        &values.i32s
    }

    fn column_mut(values: &mut RecordValues) -> &mut [Self] {
        &mut values.i32s
    }
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Flag;

    fn initial() -> Self {
        false
    }

    fn column(values: &RecordValues) -> &[Self] {
        &values.flags
    }

    fn column_mut(values: &mut RecordValues) -> &mut [Self] {
        &mut values.flags
    }
}

/// Typed handle to one column
///
/// Two keys compare equal when they address the same underlying storage,
/// which is how an alias is told apart from a distinct field.
pub struct Key<T> {
    offset: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    fn new(offset: usize) -> Self {
        Self {
            offset,
            _marker: PhantomData,
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl<T> Eq for Key<T> {}

impl<T: FieldType> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key<{:?}>({})", T::KIND, self.offset)
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub doc: String,
    pub kind: FieldKind,
    offset: usize,
}

/// Alias name -> target name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    aliases: BTreeMap<String, String>,
}

impl AliasMap {
    /// Install or replace an alias
    pub fn set(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn remove(&mut self, alias: &str) -> Option<String> {
        self.aliases.remove(alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Record layout
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDef>,
    by_name: HashMap<String, usize>,
    aliases: AliasMap,
    f64_count: usize,
    i32_count: usize,
    flag_count: usize,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compose a field name from a prefix and a suffix
    pub fn join(prefix: &str, suffix: &str) -> String {
        format!("{prefix}_{suffix}")
    }

    /// Add a new field, returning its key
    pub fn add_field<T: FieldType>(
        &mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
    ) -> Result<Key<T>, ContractError> {
        let name = name.into();
        if self.by_name.contains_key(&name) || self.aliases.get(&name).is_some() {
            return Err(ContractError::DuplicateField { name });
        }

        let counter = match T::KIND {
            FieldKind::F64 => &mut self.f64_count,
            FieldKind::I32 => &mut self.i32_count,
            FieldKind::Flag => &mut self.flag_count,
        };
        let offset = *counter;
        *counter += 1;

        self.by_name.insert(name.clone(), self.fields.len());
        self.fields.push(FieldDef {
            name,
            doc: doc.into(),
            kind: T::KIND,
            offset,
        });

        Ok(Key::new(offset))
    }

    /// Look up a field by name, following aliases
    pub fn find<T: FieldType>(&self, name: &str) -> Result<Key<T>, ContractError> {
        let def = self.resolve(name)?;
        if def.kind != T::KIND {
            return Err(ContractError::FieldTypeMismatch {
                name: name.to_string(),
                expected: T::KIND,
                actual: def.kind,
            });
        }
        Ok(Key::new(def.offset))
    }

    /// Alias-aware membership test
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Field definition by (possibly aliased) name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.resolve(name).ok()
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn alias_map(&self) -> &AliasMap {
        &self.aliases
    }

    pub fn alias_map_mut(&mut self) -> &mut AliasMap {
        &mut self.aliases
    }

    pub(crate) fn column_counts(&self) -> (usize, usize, usize) {
        (self.f64_count, self.i32_count, self.flag_count)
    }

    fn resolve(&self, name: &str) -> Result<&FieldDef, ContractError> {
        let mut current = name;
        for _ in 0..MAX_ALIAS_DEPTH {
            if let Some(&idx) = self.by_name.get(current) {
                return Ok(&self.fields[idx]);
            }
            match self.aliases.get(current) {
                Some(target) => current = target,
                None => return Err(ContractError::field_not_found(name)),
            }
        }
        Err(ContractError::AliasCycle {
            name: name.to_string(),
        })
    }
}
