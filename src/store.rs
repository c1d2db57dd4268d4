// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Existence-check seam used by the uniqueness resolver.
//!
//! A check answers one question: is `value` already stored in `field` by a
//! record other than `exclude`? Implementations are read-only against their
//! backing store. The isolation level is whatever the store provides; the
//! resolver treats the answer as best-effort, so callers that need strict
//! uniqueness under concurrent saves should keep a unique constraint in the
//! storage layer and retry the save when it fires.

use std::{
    collections::BTreeMap,
    future::Future,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    error::Error,
    record::{MemoryRecord, RecordKey, SlugRecord},
};

/// Synchronous existence check.
pub trait ExistenceCheck
{
    /// Returns `Ok(true)` when another record already stores `value` in
    /// `field`. The record identified by `exclude`, when present, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] when the backing store cannot be
    /// queried.
    fn exists(&self, field: &str, value: &str, exclude: Option<&RecordKey,>,)
    -> Result<bool, Error,>;
}

impl<F,> ExistenceCheck for F
where
    F: Fn(&str, &str, Option<&RecordKey,>,) -> Result<bool, Error,>,
{
    fn exists(&self, field: &str, value: &str, exclude: Option<&RecordKey,>,)
    -> Result<bool, Error,>
    {
        self(field, value, exclude,)
    }
}

/// Awaitable existence check for stores reached through async drivers.
pub trait AsyncExistenceCheck
{
    /// Async counterpart of [`ExistenceCheck::exists`].
    fn exists(
        &self,
        field: &str,
        value: &str,
        exclude: Option<&RecordKey,>,
    ) -> impl Future<Output = Result<bool, Error,>,>;
}

/// In-memory collection of persisted records.
///
/// Counts every existence query so callers can assert how many probes a save
/// needed, and can simulate an outage through
/// [`set_available`](Self::set_available).
#[derive(Debug,)]
pub struct MemoryStore
{
    rows:      BTreeMap<RecordKey, MemoryRecord,>,
    next_id:   u64,
    queries:   AtomicUsize,
    available: AtomicBool,
}

impl Default for MemoryStore
{
    fn default() -> Self
    {
        Self {
            rows:      BTreeMap::new(),
            next_id:   1,
            queries:   AtomicUsize::new(0,),
            available: AtomicBool::new(true,),
        }
    }
}

impl MemoryStore
{
    /// Creates an empty store.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Creates a store holding one record per value, each with `value` in
    /// `field`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluggable::{ExistenceCheck, MemoryStore};
    ///
    /// let store = MemoryStore::with_values("slug", ["post", "post-2"]);
    /// assert!(store.exists("slug", "post", None)?);
    /// assert!(!store.exists("slug", "post-3", None)?);
    /// # Ok::<(), sluggable::Error>(())
    /// ```
    pub fn with_values<I, V,>(field: &str, values: I,) -> Self
    where
        I: IntoIterator<Item = V,>,
        V: Into<String,>,
    {
        let mut store = Self::new();
        for value in values {
            let value: String = value.into();
            let mut record = MemoryRecord::new();
            record.set(field, value,);
            store.save(&mut record,);
        }
        store
    }

    /// Persists `record`, assigning the next numeric key when it has none,
    /// and clears its changed-fields set.
    pub fn save(&mut self, record: &mut MemoryRecord,) -> RecordKey
    {
        let key = match record.identity() {
            Some(key,) => key,
            None => {
                let key = RecordKey::from(self.next_id,);
                self.next_id += 1;
                record.set_id(key.clone(),);
                key
            }
        };
        record.mark_clean();
        self.rows.insert(key.clone(), record.clone(),);
        key
    }

    /// Looks up a persisted record by key.
    pub fn get(&self, key: &RecordKey,) -> Option<&MemoryRecord,>
    {
        self.rows.get(key,)
    }

    /// Number of persisted records.
    pub fn len(&self,) -> usize
    {
        self.rows.len()
    }

    /// Returns `true` when nothing has been persisted.
    pub fn is_empty(&self,) -> bool
    {
        self.rows.is_empty()
    }

    /// Number of existence queries served so far.
    pub fn query_count(&self,) -> usize
    {
        self.queries.load(Ordering::Relaxed,)
    }

    /// Resets the query counter.
    pub fn reset_query_count(&self,)
    {
        self.queries.store(0, Ordering::Relaxed,);
    }

    /// Toggles simulated availability. While unavailable every query fails
    /// with [`Error::StoreUnavailable`].
    pub fn set_available(&self, available: bool,)
    {
        self.available.store(available, Ordering::Relaxed,);
    }
}

impl ExistenceCheck for MemoryStore
{
    fn exists(&self, field: &str, value: &str, exclude: Option<&RecordKey,>,)
    -> Result<bool, Error,>
    {
        self.queries.fetch_add(1, Ordering::Relaxed,);
        if !self.available.load(Ordering::Relaxed,) {
            return Err(Error::store_unavailable("memory store is offline",),);
        }

        Ok(self.rows.iter().any(|(key, row,)| {
            exclude != Some(key,) && row.attribute(field,).as_deref() == Some(value,)
        },),)
    }
}

impl AsyncExistenceCheck for MemoryStore
{
    async fn exists(
        &self,
        field: &str,
        value: &str,
        exclude: Option<&RecordKey,>,
    ) -> Result<bool, Error,>
    {
        ExistenceCheck::exists(self, field, value, exclude,)
    }
}
