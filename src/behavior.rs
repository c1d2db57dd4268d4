// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Behavior attached to a record's save path.
//!
//! On each configured lifecycle event the behavior builds a candidate,
//! resolves it against the existence check when uniqueness is required and
//! writes the result into the slug field. It touches no other field and
//! persists nothing; saving the record stays the caller's job.
//!
//! Uniqueness is best-effort: two concurrent saves may both see the same
//! value as free between the check and their write. Keep a unique constraint
//! in storage and retry the save when it fires.

use tracing::{debug, info};

use crate::{
    candidate::build_candidate,
    config::SlugConfig,
    error::Error,
    event::LifecycleEvent,
    record::SlugRecord,
    resolver::{finalize, finalize_async},
    store::{AsyncExistenceCheck, ExistenceCheck},
};

/// Fills a record's slug field from its source attributes or a producer.
///
/// # Examples
///
/// ```
/// use sluggable::{MemoryRecord, MemoryStore, SlugConfig, SlugRecord, SluggableBehavior};
///
/// let behavior = SluggableBehavior::new(
///     SlugConfig::builder().attribute("title",).ensure_unique(true,).build(),
/// )?;
/// let mut store = MemoryStore::with_values("slug", ["hello-world"]);
///
/// let mut record = MemoryRecord::new();
/// record.set("title", "Hello World");
/// behavior.before_validate(&mut record, &store)?;
/// store.save(&mut record);
///
/// assert_eq!(record.attribute("slug").as_deref(), Some("hello-world-2"));
/// # Ok::<(), sluggable::Error>(())
/// ```
#[derive(Debug,)]
pub struct SluggableBehavior
{
    config: SlugConfig,
}

impl SluggableBehavior
{
    /// Validates `config` and wraps it in a behavior.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when neither source attributes nor a
    /// value producer are configured, or when other options are invalid.
    pub fn new(config: SlugConfig,) -> Result<Self, Error,>
    {
        config.validate()?;
        Ok(Self {
            config,
        },)
    }

    /// Configuration the behavior runs with.
    pub fn config(&self,) -> &SlugConfig
    {
        &self.config
    }

    /// Reports whether the behavior reacts to `event`.
    pub fn handles(&self, event: LifecycleEvent,) -> bool
    {
        self.config.events().contains(&event,)
    }

    /// Handles the before-validate hook.
    ///
    /// # Errors
    ///
    /// See [`handle`](Self::handle).
    pub fn before_validate<R, C,>(&self, record: &mut R, check: &C,) -> Result<(), Error,>
    where
        R: SlugRecord,
        C: ExistenceCheck + ?Sized,
    {
        self.handle(LifecycleEvent::BeforeValidate, record, check,)
    }

    /// Runs the behavior for `event`. Events outside the configured set are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Propagates producer and existence-check errors and returns
    /// [`Error::ResolutionExhausted`] when no free slug is found. The slug
    /// field is left untouched in every error case.
    pub fn handle<R, C,>(
        &self,
        event: LifecycleEvent,
        record: &mut R,
        check: &C,
    ) -> Result<(), Error,>
    where
        R: SlugRecord,
        C: ExistenceCheck + ?Sized,
    {
        if !self.handles(event,) {
            return Ok((),);
        }

        let candidate = build_candidate(&*record, &self.config, event,)?;
        let is_new = candidate.is_new;
        let slug = finalize(candidate, &self.config, check, &*record,)?;
        self.write(record, slug, is_new,);
        Ok((),)
    }

    /// Async counterpart of [`handle`](Self::handle).
    ///
    /// # Errors
    ///
    /// Same as [`handle`](Self::handle).
    pub async fn handle_async<R, C,>(
        &self,
        event: LifecycleEvent,
        record: &mut R,
        check: &C,
    ) -> Result<(), Error,>
    where
        R: SlugRecord,
        C: AsyncExistenceCheck,
    {
        if !self.handles(event,) {
            return Ok((),);
        }

        let candidate = build_candidate(&*record, &self.config, event,)?;
        let is_new = candidate.is_new;
        let slug = finalize_async(candidate, &self.config, check, &*record,).await?;
        self.write(record, slug, is_new,);
        Ok((),)
    }

    fn write<R: SlugRecord,>(&self, record: &mut R, slug: String, is_new: bool,)
    {
        let field = self.config.slug_attribute();
        // A retained slug already holds this value.
        if !is_new {
            debug!(field, slug = %slug, "slug unchanged");
            return;
        }
        info!(field, slug = %slug, "assigned slug");
        record.set_attribute(field, slug,);
    }
}
