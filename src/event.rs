// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Lifecycle points of a record's save path that the behavior can react to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::SlugRecord;

/// Save-path hook raised by the owning ORM.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash,)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent
{
    /// Raised before validation on both insert and update.
    BeforeValidate,
    /// Raised before a new record is inserted.
    BeforeInsert,
    /// Raised before an existing record is updated.
    BeforeUpdate,
}

impl fmt::Display for LifecycleEvent
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        let name = match self {
            Self::BeforeValidate => "before_validate",
            Self::BeforeInsert => "before_insert",
            Self::BeforeUpdate => "before_update",
        };
        f.write_str(name,)
    }
}

/// Context handed to value producers for one event.
pub struct SaveEvent<'a,>
{
    /// Hook being handled.
    pub kind:   LifecycleEvent,
    /// Record being saved.
    pub record: &'a dyn SlugRecord,
}

impl fmt::Debug for SaveEvent<'_,>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("SaveEvent",)
            .field("kind", &self.kind,)
            .field("identity", &self.record.identity(),)
            .finish()
    }
}
