// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Record accessor seam and an in-memory record implementation.
//!
//! The behavior never owns the record it works on. It reads source attributes
//! and change flags through [`SlugRecord`] and writes back exactly one field.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primary identity of a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,)]
#[serde(transparent)]
pub struct RecordKey(String,);

impl RecordKey
{
    /// Wraps the provided key value.
    pub fn new(value: impl Into<String,>,) -> Self
    {
        Self(value.into(),)
    }

    /// Borrows the key as a string slice.
    pub fn as_str(&self,) -> &str
    {
        &self.0
    }
}

impl fmt::Display for RecordKey
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(&self.0,)
    }
}

impl From<&str,> for RecordKey
{
    fn from(value: &str,) -> Self
    {
        Self::new(value,)
    }
}

impl From<u64,> for RecordKey
{
    fn from(value: u64,) -> Self
    {
        Self(value.to_string(),)
    }
}

/// Access to the owning record's fields during a save.
pub trait SlugRecord
{
    /// Returns the textual value of `name`, or `None` when the field is
    /// absent or null.
    fn attribute(&self, name: &str,) -> Option<String,>;

    /// Assigns `value` to `name`.
    fn set_attribute(&mut self, name: &str, value: String,);

    /// Reports whether `name` changed since the record was loaded.
    fn is_attribute_changed(&self, name: &str,) -> bool;

    /// Primary key of the record, `None` for records not yet inserted.
    fn identity(&self,) -> Option<RecordKey,>;
}

/// In-memory record backed by JSON values.
///
/// Every [`set`](Self::set) marks the field as changed until
/// [`mark_clean`](Self::mark_clean) is called, which mirrors what an ORM does
/// after persisting a row.
///
/// # Examples
///
/// ```
/// use sluggable::{MemoryRecord, SlugRecord};
///
/// let mut record = MemoryRecord::new();
/// record.set("title", "Hello");
/// assert!(record.is_attribute_changed("title"));
/// record.mark_clean();
/// assert!(!record.is_attribute_changed("title"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize,)]
pub struct MemoryRecord
{
    #[serde(skip_serializing_if = "Option::is_none")]
    id:         Option<RecordKey,>,
    attributes: BTreeMap<String, Value,>,
    #[serde(skip)]
    changed:    BTreeSet<String,>,
}

impl MemoryRecord
{
    /// Creates an empty record without identity.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Creates a loaded record: the attributes are present but none of them
    /// count as changed.
    pub fn loaded<I, K, V,>(id: impl Into<RecordKey,>, attributes: I,) -> Self
    where
        I: IntoIterator<Item = (K, V,),>,
        K: Into<String,>,
        V: Into<Value,>,
    {
        Self {
            id:         Some(id.into(),),
            attributes: attributes.into_iter().map(|(k, v,)| (k.into(), v.into(),),).collect(),
            changed:    BTreeSet::new(),
        }
    }

    /// Assigns a value and marks the field as changed.
    pub fn set(&mut self, name: impl Into<String,>, value: impl Into<Value,>,)
    {
        let name = name.into();
        self.changed.insert(name.clone(),);
        self.attributes.insert(name, value.into(),);
    }

    /// Returns the raw JSON value of a field.
    pub fn get(&self, name: &str,) -> Option<&Value,>
    {
        self.attributes.get(name,)
    }

    /// Assigns the primary key, as the store does after inserting.
    pub fn set_id(&mut self, id: impl Into<RecordKey,>,)
    {
        self.id = Some(id.into(),);
    }

    /// Clears the changed-fields set.
    pub fn mark_clean(&mut self,)
    {
        self.changed.clear();
    }

    /// Names of the fields changed since load, in lexical order.
    pub fn changed_attributes(&self,) -> impl Iterator<Item = &str,>
    {
        self.changed.iter().map(String::as_str,)
    }

    /// Read-only view over all attributes.
    pub fn attributes(&self,) -> &BTreeMap<String, Value,>
    {
        &self.attributes
    }
}

impl SlugRecord for MemoryRecord
{
    fn attribute(&self, name: &str,) -> Option<String,>
    {
        match self.attributes.get(name,)? {
            Value::Null => None,
            Value::String(text,) => Some(text.clone(),),
            other => Some(other.to_string(),),
        }
    }

    fn set_attribute(&mut self, name: &str, value: String,)
    {
        self.set(name, value,);
    }

    fn is_attribute_changed(&self, name: &str,) -> bool
    {
        self.changed.contains(name,)
    }

    fn identity(&self,) -> Option<RecordKey,>
    {
        self.id.clone()
    }
}
