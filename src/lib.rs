//! Slug generation and uniqueness enforcement for persisted records.
//!
//! A [`SluggableBehavior`] is attached to a record's save path. On each
//! configured lifecycle event it derives a URL-safe slug from the record's
//! source attributes (or a custom [`ValueProducer`]), keeps the stored slug
//! when regeneration is not needed, and, when uniqueness is required, probes
//! an [`ExistenceCheck`] with suffixed variants until a free value is found.
//!
//! The ORM itself stays outside: records are reached through [`SlugRecord`]
//! and the backing store through [`ExistenceCheck`] or
//! [`AsyncExistenceCheck`]. [`MemoryRecord`] and [`MemoryStore`] implement
//! both seams in memory.

mod behavior;
mod candidate;
mod config;
mod error;
mod event;
mod record;
mod resolver;
mod slug;
mod store;

pub use behavior::SluggableBehavior;
pub use candidate::{Candidate, FixedValue, ValueProducer, build_candidate};
pub use config::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_SLUG_ATTRIBUTE, SlugConfig, SlugConfigBuilder, SlugSettings,
    SourceSpec, UniqueCheck, load_settings, parse_settings,
};
pub use error::{Error, io_error};
pub use event::{LifecycleEvent, SaveEvent};
pub use record::{MemoryRecord, RecordKey, SlugRecord};
pub use resolver::{
    IncrementSuffix, SuffixGenerator, excluded_identity, finalize, finalize_async, resolve,
    resolve_async,
};
pub use slug::{DEFAULT_SEPARATOR, SlugStrategy, is_valid_separator, is_valid_slug, slugify};
pub use store::{AsyncExistenceCheck, ExistenceCheck, MemoryStore};
