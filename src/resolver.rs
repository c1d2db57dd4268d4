// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Uniqueness search for freshly generated slugs.
//!
//! Probes the existence check with the base slug, then with suffixed
//! variants produced by a [`SuffixGenerator`], until a free value is found or
//! the configured iteration cap is exceeded.

use tracing::{debug, warn};

use crate::{
    candidate::Candidate,
    config::SlugConfig,
    error::Error,
    record::{RecordKey, SlugRecord},
    store::{AsyncExistenceCheck, ExistenceCheck},
};

/// Derives the next candidate from the base slug and iteration number.
pub trait SuffixGenerator
{
    /// Returns the candidate for `iteration` (starting at 1).
    fn generate(&self, base: &str, iteration: u32, record: &dyn SlugRecord,) -> String;
}

impl<F,> SuffixGenerator for F
where
    F: Fn(&str, u32, &dyn SlugRecord,) -> String,
{
    fn generate(&self, base: &str, iteration: u32, record: &dyn SlugRecord,) -> String
    {
        self(base, iteration, record,)
    }
}

/// Default generator: appends `iteration + 1`, so the first retry of `post`
/// is `post-2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct IncrementSuffix
{
    separator: char,
}

impl Default for IncrementSuffix
{
    fn default() -> Self
    {
        Self {
            separator: crate::slug::DEFAULT_SEPARATOR,
        }
    }
}

impl IncrementSuffix
{
    /// Creates a generator joining base and counter with `separator`.
    pub fn new(separator: char,) -> Self
    {
        Self {
            separator,
        }
    }
}

impl SuffixGenerator for IncrementSuffix
{
    fn generate(&self, base: &str, iteration: u32, _record: &dyn SlugRecord,) -> String
    {
        let counter = u64::from(iteration,) + 1;
        format!("{base}{}{counter}", self.separator)
    }
}

/// Identity excluded from existence queries for `record`.
///
/// Records without identity are never excluded.
pub fn excluded_identity(config: &SlugConfig, record: &dyn SlugRecord,) -> Option<RecordKey,>
{
    if config.unique_check().exclude_current { record.identity() } else { None }
}

struct Search<'a,>
{
    base:      &'a str,
    config:    &'a SlugConfig,
    record:    &'a dyn SlugRecord,
    fallback:  IncrementSuffix,
    iteration: u32,
}

impl<'a,> Search<'a,>
{
    fn new(base: &'a str, config: &'a SlugConfig, record: &'a dyn SlugRecord,) -> Self
    {
        Self {
            base,
            config,
            record,
            fallback: IncrementSuffix::new(config.separator(),),
            iteration: 0,
        }
    }

    /// Records that `current` is taken and returns the next candidate.
    fn advance(&mut self, current: &str,) -> Result<String, Error,>
    {
        debug!(slug = %current, iteration = self.iteration, "slug already in use");
        let next =
            self.iteration.checked_add(1,).filter(|next| *next <= self.config.max_iterations(),);
        let Some(next,) = next else {
            let attempts = self.iteration.saturating_add(1,);
            warn!(
                base = %self.base,
                attempts,
                "giving up on unique slug after {} attempts",
                attempts
            );
            return Err(Error::ResolutionExhausted {
                base: self.base.to_owned(),
                attempts,
            },);
        };
        self.iteration = next;

        let generator: &dyn SuffixGenerator = match self.config.suffix_generator() {
            Some(custom,) => custom,
            None => &self.fallback,
        };
        Ok(generator.generate(self.base, self.iteration, self.record,),)
    }

    fn found(&self, current: String,) -> String
    {
        if self.iteration > 0 {
            debug!(base = %self.base, slug = %current, attempts = self.iteration.saturating_add(1,), "resolved unique slug");
        }
        current
    }
}

/// Searches for a free slug starting from `base`.
///
/// Performs one existence query per iteration, so with a cap of `n` at most
/// `n + 1` queries are issued.
///
/// # Errors
///
/// Returns [`Error::ResolutionExhausted`] once the iteration count passes
/// [`SlugConfig::max_iterations`] and propagates errors from the existence
/// check unchanged.
///
/// # Examples
///
/// ```
/// use sluggable::{MemoryRecord, MemoryStore, SlugConfig, resolve};
///
/// let config = SlugConfig::builder().attribute("title",).build();
/// let store = MemoryStore::with_values("slug", ["post", "post-1"]);
///
/// let slug = resolve("post", &config, &store, &MemoryRecord::new())?;
/// assert_eq!(slug, "post-2");
/// assert_eq!(store.query_count(), 2);
/// # Ok::<(), sluggable::Error>(())
/// ```
pub fn resolve<C,>(
    base: &str,
    config: &SlugConfig,
    check: &C,
    record: &dyn SlugRecord,
) -> Result<String, Error,>
where
    C: ExistenceCheck + ?Sized,
{
    let target = config.target_attribute();
    let exclude = excluded_identity(config, record,);
    let mut search = Search::new(base, config, record,);
    let mut current = base.to_owned();

    while ExistenceCheck::exists(check, target, &current, exclude.as_ref(),)? {
        current = search.advance(&current,)?;
    }
    Ok(search.found(current,),)
}

/// Async counterpart of [`resolve`]. Awaits exactly one existence query per
/// iteration, in the same order.
///
/// # Errors
///
/// Same as [`resolve`].
pub async fn resolve_async<C,>(
    base: &str,
    config: &SlugConfig,
    check: &C,
    record: &dyn SlugRecord,
) -> Result<String, Error,>
where
    C: AsyncExistenceCheck,
{
    let target = config.target_attribute();
    let exclude = excluded_identity(config, record,);
    let mut search = Search::new(base, config, record,);
    let mut current = base.to_owned();

    while AsyncExistenceCheck::exists(check, target, &current, exclude.as_ref(),).await? {
        current = search.advance(&current,)?;
    }
    Ok(search.found(current,),)
}

/// Returns the final slug for `candidate`: the candidate itself unless
/// uniqueness is required and the value is new.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn finalize<C,>(
    candidate: Candidate,
    config: &SlugConfig,
    check: &C,
    record: &dyn SlugRecord,
) -> Result<String, Error,>
where
    C: ExistenceCheck + ?Sized,
{
    if config.ensure_unique() && candidate.is_new {
        resolve(&candidate.value, config, check, record,)
    } else {
        Ok(candidate.value,)
    }
}

/// Async counterpart of [`finalize`].
///
/// # Errors
///
/// Same as [`resolve`].
pub async fn finalize_async<C,>(
    candidate: Candidate,
    config: &SlugConfig,
    check: &C,
    record: &dyn SlugRecord,
) -> Result<String, Error,>
where
    C: AsyncExistenceCheck,
{
    if config.ensure_unique() && candidate.is_new {
        resolve_async(&candidate.value, config, check, record,).await
    } else {
        Ok(candidate.value,)
    }
}

#[cfg(test)]
mod tests
{
    use std::cell::RefCell;

    use super::{
        IncrementSuffix, Search, SuffixGenerator, finalize, finalize_async, resolve, resolve_async,
    };
    use crate::{
        candidate::Candidate,
        config::{SlugConfig, UniqueCheck},
        error::Error,
        record::{MemoryRecord, RecordKey, SlugRecord},
        store::MemoryStore,
    };

    fn unique_config() -> SlugConfig
    {
        SlugConfig::builder().attribute("title",).ensure_unique(true,).build()
    }

    #[test]
    fn free_base_needs_one_query()
    {
        let store = MemoryStore::new();
        let slug = resolve("post", &unique_config(), &store, &MemoryRecord::new(),)
            .expect("expected slug",);
        assert_eq!(slug, "post");
        assert_eq!(store.query_count(), 1);
    }

    #[test]
    fn default_generator_skips_dash_one()
    {
        let probes = RefCell::new(Vec::new(),);
        let check = |_: &str, value: &str, _: Option<&RecordKey,>| {
            probes.borrow_mut().push(value.to_owned(),);
            Ok::<bool, Error,>(value == "post" || value == "post-1")
        };

        let slug = resolve("post", &unique_config(), &check, &MemoryRecord::new(),)
            .expect("expected slug",);
        assert_eq!(slug, "post-2");
        assert_eq!(probes.into_inner(), vec!["post", "post-2"]);
    }

    #[test]
    fn counts_upwards_until_free()
    {
        let store = MemoryStore::with_values("slug", ["post", "post-2", "post-3"],);
        let slug = resolve("post", &unique_config(), &store, &MemoryRecord::new(),)
            .expect("expected slug",);
        assert_eq!(slug, "post-4");
        assert_eq!(store.query_count(), 4);
    }

    #[test]
    fn always_taken_check_exhausts_after_cap()
    {
        let config =
            SlugConfig::builder().attribute("title",).ensure_unique(true,).max_iterations(3,).build();
        let calls = RefCell::new(0_u32,);
        let check = |_: &str, _: &str, _: Option<&RecordKey,>| {
            *calls.borrow_mut() += 1;
            Ok::<bool, Error,>(true)
        };

        let error = resolve("post", &config, &check, &MemoryRecord::new(),)
            .expect_err("expected exhaustion",);
        match error {
            Error::ResolutionExhausted {
                base,
                attempts,
            } => {
                assert_eq!(base, "post");
                assert_eq!(attempts, 4);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(calls.into_inner(), 4);
    }

    #[test]
    fn zero_cap_checks_only_the_base()
    {
        let config =
            SlugConfig::builder().attribute("title",).ensure_unique(true,).max_iterations(0,).build();
        let store = MemoryStore::with_values("slug", ["post"],);
        let error =
            resolve("post", &config, &store, &MemoryRecord::new(),).expect_err("expected error",);
        assert!(matches!(error, Error::ResolutionExhausted { attempts: 1, .. }));
        assert_eq!(store.query_count(), 1);
    }

    #[test]
    fn store_errors_propagate_unchanged()
    {
        let store = MemoryStore::new();
        store.set_available(false,);
        let error = resolve("post", &unique_config(), &store, &MemoryRecord::new(),)
            .expect_err("expected store error",);
        match error {
            Error::StoreUnavailable {
                message,
            } => assert_eq!(message, "memory store is offline"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn custom_generator_receives_base_iteration_and_record()
    {
        let config = SlugConfig::builder()
            .attribute("title",)
            .ensure_unique(true,)
            .suffix_generator(|base: &str, iteration: u32, record: &dyn SlugRecord| {
                let year = record.attribute("year",).unwrap_or_default();
                format!("{base}-{year}-{iteration}")
            },)
            .build();
        let store = MemoryStore::with_values("slug", ["post", "post-2024-1"],);
        let mut record = MemoryRecord::new();
        record.set("year", 2024,);

        let slug = resolve("post", &config, &store, &record,).expect("expected slug",);
        assert_eq!(slug, "post-2024-2");
    }

    #[test]
    fn own_identity_is_excluded()
    {
        let mut store = MemoryStore::new();
        let mut own = MemoryRecord::new();
        own.set("slug", "post",);
        store.save(&mut own,);

        let slug = resolve("post", &unique_config(), &store, &own,).expect("expected slug",);
        assert_eq!(slug, "post");
    }

    #[test]
    fn exclusion_can_be_disabled()
    {
        let config = SlugConfig::builder()
            .attribute("title",)
            .ensure_unique(true,)
            .unique_check(UniqueCheck {
                target_attribute: None, exclude_current: false,
            },)
            .build();
        let mut store = MemoryStore::new();
        let mut own = MemoryRecord::new();
        own.set("slug", "post",);
        store.save(&mut own,);

        let slug = resolve("post", &config, &store, &own,).expect("expected slug",);
        assert_eq!(slug, "post-2");
    }

    #[test]
    fn queries_target_attribute()
    {
        let config = SlugConfig::builder()
            .attribute("title",)
            .ensure_unique(true,)
            .unique_check(UniqueCheck {
                target_attribute: Some("path".to_owned(),), exclude_current: true,
            },)
            .build();
        let fields = RefCell::new(Vec::new(),);
        let check = |field: &str, _: &str, _: Option<&RecordKey,>| {
            fields.borrow_mut().push(field.to_owned(),);
            Ok::<bool, Error,>(false)
        };

        resolve("post", &config, &check, &MemoryRecord::new(),).expect("expected slug",);
        assert_eq!(fields.into_inner(), vec!["path"]);
    }

    #[test]
    fn empty_base_gets_separator_and_counter()
    {
        let store = MemoryStore::with_values("slug", [""],);
        let slug =
            resolve("", &unique_config(), &store, &MemoryRecord::new(),).expect("expected slug",);
        assert_eq!(slug, "-2");
        assert_eq!(store.query_count(), 2);
    }

    #[test]
    fn iteration_counter_at_type_limit_exhausts_instead_of_wrapping()
    {
        let config = SlugConfig::builder()
            .attribute("title",)
            .ensure_unique(true,)
            .max_iterations(u32::MAX,)
            .build();
        let record = MemoryRecord::new();
        let mut search = Search::new("post", &config, &record,);
        search.iteration = u32::MAX;

        let error = search.advance("post-4294967296",).expect_err("expected exhaustion",);
        assert!(matches!(
            error,
            Error::ResolutionExhausted { attempts: u32::MAX, .. }
        ));
        assert_eq!(search.iteration, u32::MAX);
    }

    #[test]
    fn increment_suffix_uses_separator()
    {
        let record = MemoryRecord::new();
        assert_eq!(IncrementSuffix::default().generate("post", 1, &record), "post-2");
        assert_eq!(IncrementSuffix::new('_').generate("post", 4, &record), "post_5");
    }

    #[test]
    fn finalize_skips_search_for_retained_or_non_unique()
    {
        let store = MemoryStore::with_values("slug", ["post"],);
        let retained = Candidate {
            value: "post".to_owned(), is_new: false,
        };
        let kept = finalize(retained, &unique_config(), &store, &MemoryRecord::new(),)
            .expect("expected slug",);
        assert_eq!(kept, "post");

        let fresh = Candidate {
            value: "post".to_owned(), is_new: true,
        };
        let relaxed = SlugConfig::builder().attribute("title",).build();
        let unchanged =
            finalize(fresh, &relaxed, &store, &MemoryRecord::new(),).expect("expected slug",);
        assert_eq!(unchanged, "post");
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn async_resolution_matches_sync()
    {
        let store = MemoryStore::with_values("slug", ["post", "post-1"],);
        let record = MemoryRecord::new();
        let slug =
            resolve_async("post", &unique_config(), &store, &record,).await.expect("expected slug",);
        assert_eq!(slug, "post-2");
        assert_eq!(store.query_count(), 2);
    }

    #[tokio::test]
    async fn async_finalize_propagates_exhaustion()
    {
        let config =
            SlugConfig::builder().attribute("title",).ensure_unique(true,).max_iterations(1,).build();
        let store = MemoryStore::with_values("slug", ["post", "post-2"],);
        let candidate = Candidate {
            value: "post".to_owned(), is_new: true,
        };
        let record = MemoryRecord::new();
        let error = finalize_async(candidate, &config, &store, &record,)
            .await
            .expect_err("expected exhaustion",);
        assert!(error.is_retryable());
        assert_eq!(store.query_count(), 2);
    }
}
