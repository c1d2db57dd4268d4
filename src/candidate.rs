// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Decides, per save event, whether the slug must be regenerated.
//!
//! A stored non-empty slug survives when the behavior is immutable or when
//! none of the source attributes changed. Otherwise the source attributes are
//! joined in configured order and normalized.

use tracing::debug;

use crate::{
    config::{SlugConfig, SourceSpec},
    error::Error,
    event::{LifecycleEvent, SaveEvent},
    record::SlugRecord,
    slug::SlugStrategy,
};

/// Separator used when joining source attribute values.
const SOURCE_JOIN: &str = "-";

/// Slug value proposed for one event.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Candidate
{
    /// Proposed slug.
    pub value:  String,
    /// Whether the value is freshly computed and must go through the
    /// uniqueness search.
    pub is_new: bool,
}

/// Produces a slug value without consulting source attributes.
pub trait ValueProducer
{
    /// Returns the slug for the record carried by `event`.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::Producer`] when no value can be
    /// produced; the save is aborted.
    fn produce(&self, event: &SaveEvent<'_,>,) -> Result<String, Error,>;
}

impl<F,> ValueProducer for F
where
    F: Fn(&SaveEvent<'_,>,) -> Result<String, Error,>,
{
    fn produce(&self, event: &SaveEvent<'_,>,) -> Result<String, Error,>
    {
        self(event,)
    }
}

/// Producer returning the same value for every record.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct FixedValue(String,);

impl FixedValue
{
    /// Wraps the constant slug value.
    pub fn new(value: impl Into<String,>,) -> Self
    {
        Self(value.into(),)
    }
}

impl ValueProducer for FixedValue
{
    fn produce(&self, _event: &SaveEvent<'_,>,) -> Result<String, Error,>
    {
        Ok(self.0.clone(),)
    }
}

/// Builds the candidate slug for `record`.
///
/// # Errors
///
/// Propagates errors raised by a custom [`ValueProducer`].
///
/// # Examples
///
/// ```
/// use sluggable::{LifecycleEvent, MemoryRecord, SlugConfig, build_candidate};
///
/// let config = SlugConfig::builder().attributes(["first", "last"],).build();
/// let mut record = MemoryRecord::new();
/// record.set("first", "Hello");
/// record.set("last", "World");
///
/// let candidate = build_candidate(&record, &config, LifecycleEvent::BeforeValidate)?;
/// assert_eq!(candidate.value, "hello-world");
/// assert!(candidate.is_new);
/// # Ok::<(), sluggable::Error>(())
/// ```
pub fn build_candidate(
    record: &dyn SlugRecord,
    config: &SlugConfig,
    kind: LifecycleEvent,
) -> Result<Candidate, Error,>
{
    let names = match config.source() {
        SourceSpec::Producer(producer,) => {
            let value = producer.produce(&SaveEvent {
                kind,
                record,
            },)?;
            return Ok(Candidate {
                value,
                is_new: true,
            },);
        }
        SourceSpec::Attributes(names,) => names,
    };

    let slug_attribute = config.slug_attribute();
    if let Some(stored,) = record.attribute(slug_attribute,).filter(|value| !value.is_empty(),) {
        let changed = !config.immutable()
            && names.iter().any(|name| record.is_attribute_changed(name,),);
        if !changed {
            debug!(field = slug_attribute, slug = %stored, "keeping stored slug");
            return Ok(Candidate {
                value:  stored,
                is_new: false,
            },);
        }
    }

    let joined = names
        .iter()
        .map(|name| record.attribute(name,).unwrap_or_default(),)
        .collect::<Vec<_,>>()
        .join(SOURCE_JOIN,);
    let value = SlugStrategy::builder(&joined,).separator(config.separator(),).build();
    debug!(field = slug_attribute, slug = %value, "derived slug from source attributes");

    Ok(Candidate {
        value,
        is_new: true,
    },)
}
