// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Configuration of a sluggable behavior.
//!
//! [`SlugConfig`] is assembled in code through [`SlugConfig::builder`].
//! [`SlugSettings`] mirrors the YAML document accepted by the CLI and converts
//! into a [`SlugConfig`] once validated. Neither form is checked for
//! consistency until a [`SluggableBehavior`](crate::SluggableBehavior) is
//! constructed from it.

use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    candidate::{FixedValue, ValueProducer},
    error::{self, Error},
    event::LifecycleEvent,
    resolver::SuffixGenerator,
    slug::{DEFAULT_SEPARATOR, is_valid_separator},
};

/// Field that receives the slug unless configured otherwise.
pub const DEFAULT_SLUG_ATTRIBUTE: &str = "slug";
/// Upper bound on suffix iterations before resolution gives up.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Where the slug value comes from.
pub enum SourceSpec
{
    /// Ordered source attributes, joined with `-` before normalization.
    Attributes(Vec<String,>,),
    /// Custom producer whose output is used verbatim.
    Producer(Box<dyn ValueProducer + Send + Sync,>,),
}

impl fmt::Debug for SourceSpec
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self {
            Self::Attributes(names,) => f.debug_tuple("Attributes",).field(names,).finish(),
            Self::Producer(_,) => f.write_str("Producer(..)",),
        }
    }
}

/// Settings of the uniqueness query.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(deny_unknown_fields)]
pub struct UniqueCheck
{
    /// Field compared against the candidate. Defaults to the slug field.
    #[serde(default, alias = "targetAttribute")]
    pub target_attribute: Option<String,>,

    /// Whether the record being saved is excluded from the query when it
    /// already has an identity.
    #[serde(default = "default_exclude_current", alias = "excludeCurrent")]
    pub exclude_current: bool,
}

impl Default for UniqueCheck
{
    fn default() -> Self
    {
        Self {
            target_attribute: None, exclude_current: true,
        }
    }
}

fn default_exclude_current() -> bool
{
    true
}

/// Immutable configuration of one sluggable behavior.
pub struct SlugConfig
{
    pub(crate) source:           SourceSpec,
    pub(crate) slug_attribute:   String,
    pub(crate) immutable:        bool,
    pub(crate) ensure_unique:    bool,
    pub(crate) unique_check:     UniqueCheck,
    pub(crate) suffix_generator: Option<Box<dyn SuffixGenerator + Send + Sync,>,>,
    pub(crate) separator:        char,
    pub(crate) max_iterations:   u32,
    pub(crate) events:           Vec<LifecycleEvent,>,
}

impl fmt::Debug for SlugConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("SlugConfig",)
            .field("source", &self.source,)
            .field("slug_attribute", &self.slug_attribute,)
            .field("immutable", &self.immutable,)
            .field("ensure_unique", &self.ensure_unique,)
            .field("unique_check", &self.unique_check,)
            .field("custom_suffix_generator", &self.suffix_generator.is_some(),)
            .field("separator", &self.separator,)
            .field("max_iterations", &self.max_iterations,)
            .field("events", &self.events,)
            .finish()
    }
}

impl SlugConfig
{
    /// Starts a builder with every option at its default.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluggable::SlugConfig;
    ///
    /// let config = SlugConfig::builder().attribute("title",).ensure_unique(true,).build();
    /// assert_eq!(config.slug_attribute(), "slug");
    /// assert!(config.ensure_unique());
    /// ```
    pub fn builder() -> SlugConfigBuilder
    {
        SlugConfigBuilder::default()
    }

    /// Source of the slug value.
    pub fn source(&self,) -> &SourceSpec
    {
        &self.source
    }

    /// Field that receives the slug.
    pub fn slug_attribute(&self,) -> &str
    {
        &self.slug_attribute
    }

    /// Whether a stored slug is never regenerated.
    pub fn immutable(&self,) -> bool
    {
        self.immutable
    }

    /// Whether new slugs are checked against the store.
    pub fn ensure_unique(&self,) -> bool
    {
        self.ensure_unique
    }

    /// Uniqueness query settings.
    pub fn unique_check(&self,) -> &UniqueCheck
    {
        &self.unique_check
    }

    /// Field queried by the existence check.
    pub fn target_attribute(&self,) -> &str
    {
        self.unique_check.target_attribute.as_deref().unwrap_or(&self.slug_attribute,)
    }

    /// Custom suffix generator, if any.
    pub fn suffix_generator(&self,) -> Option<&(dyn SuffixGenerator + Send + Sync),>
    {
        self.suffix_generator.as_deref()
    }

    /// Separator placed between slug words.
    pub fn separator(&self,) -> char
    {
        self.separator
    }

    /// Cap on suffix iterations.
    pub fn max_iterations(&self,) -> u32
    {
        self.max_iterations
    }

    /// Events the behavior reacts to.
    pub fn events(&self,) -> &[LifecycleEvent]
    {
        &self.events
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when there is neither a source
    /// attribute nor a value producer, when a field name is blank, when the
    /// separator is not ASCII punctuation, or when no event is selected.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if let SourceSpec::Attributes(names,) = &self.source {
            if names.is_empty() {
                return Err(Error::configuration(
                    "either source attributes or a value producer must be specified",
                ),);
            }
            if names.iter().any(|name| name.trim().is_empty(),) {
                return Err(Error::configuration("source attribute names must not be blank",),);
            }
        }
        if self.slug_attribute.trim().is_empty() {
            return Err(Error::configuration("slug attribute name must not be blank",),);
        }
        if let Some(target,) = self.unique_check.target_attribute.as_deref()
            && target.trim().is_empty()
        {
            return Err(Error::configuration("unique check target attribute must not be blank",),);
        }
        if !is_valid_separator(self.separator,) {
            return Err(Error::configuration(format!(
                "separator {:?} must be an ASCII punctuation character",
                self.separator
            ),),);
        }
        if self.events.is_empty() {
            return Err(Error::configuration("at least one lifecycle event must be selected",),);
        }
        Ok((),)
    }
}

/// Builder returned by [`SlugConfig::builder`].
pub struct SlugConfigBuilder
{
    config: SlugConfig,
}

impl Default for SlugConfigBuilder
{
    fn default() -> Self
    {
        Self {
            config: SlugConfig {
                source:           SourceSpec::Attributes(Vec::new(),),
                slug_attribute:   DEFAULT_SLUG_ATTRIBUTE.to_owned(),
                immutable:        false,
                ensure_unique:    false,
                unique_check:     UniqueCheck::default(),
                suffix_generator: None,
                separator:        DEFAULT_SEPARATOR,
                max_iterations:   DEFAULT_MAX_ITERATIONS,
                events:           vec![LifecycleEvent::BeforeValidate],
            },
        }
    }
}

impl SlugConfigBuilder
{
    /// Appends a source attribute. Replaces a previously set producer.
    pub fn attribute(mut self, name: impl Into<String,>,) -> Self
    {
        match &mut self.config.source {
            SourceSpec::Attributes(names,) => names.push(name.into(),),
            SourceSpec::Producer(_,) => {
                self.config.source = SourceSpec::Attributes(vec![name.into()],);
            }
        }
        self
    }

    /// Replaces the source with the given ordered attributes.
    pub fn attributes<I, S,>(mut self, names: I,) -> Self
    where
        I: IntoIterator<Item = S,>,
        S: Into<String,>,
    {
        self.config.source = SourceSpec::Attributes(names.into_iter().map(Into::into,).collect(),);
        self
    }

    /// Replaces the source with a custom value producer.
    pub fn producer<P,>(mut self, producer: P,) -> Self
    where
        P: ValueProducer + Send + Sync + 'static,
    {
        self.config.source = SourceSpec::Producer(Box::new(producer,),);
        self
    }

    /// Uses a constant slug value.
    pub fn value(self, value: impl Into<String,>,) -> Self
    {
        self.producer(FixedValue::new(value,),)
    }

    /// Sets the field that receives the slug.
    pub fn slug_attribute(mut self, name: impl Into<String,>,) -> Self
    {
        self.config.slug_attribute = name.into();
        self
    }

    /// Keeps a stored slug forever once it is non-empty.
    pub fn immutable(mut self, immutable: bool,) -> Self
    {
        self.config.immutable = immutable;
        self
    }

    /// Enables the uniqueness search for new slugs.
    pub fn ensure_unique(mut self, ensure_unique: bool,) -> Self
    {
        self.config.ensure_unique = ensure_unique;
        self
    }

    /// Overrides the uniqueness query settings.
    pub fn unique_check(mut self, unique_check: UniqueCheck,) -> Self
    {
        self.config.unique_check = unique_check;
        self
    }

    /// Installs a custom suffix generator.
    pub fn suffix_generator<G,>(mut self, generator: G,) -> Self
    where
        G: SuffixGenerator + Send + Sync + 'static,
    {
        self.config.suffix_generator = Some(Box::new(generator,),);
        self
    }

    /// Sets the separator placed between slug words.
    pub fn separator(mut self, separator: char,) -> Self
    {
        self.config.separator = separator;
        self
    }

    /// Sets the cap on suffix iterations.
    pub fn max_iterations(mut self, max_iterations: u32,) -> Self
    {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Replaces the events the behavior reacts to.
    pub fn events<I,>(mut self, events: I,) -> Self
    where
        I: IntoIterator<Item = LifecycleEvent,>,
    {
        self.config.events = events.into_iter().collect();
        self
    }

    /// Finishes the builder without validating.
    pub fn build(self,) -> SlugConfig
    {
        self.config
    }
}

/// YAML form of a behavior configuration.
///
/// Field names follow snake case; the camel-case spellings of the original
/// behavior properties are accepted as aliases.
///
/// # Examples
///
/// ```
/// use sluggable::parse_settings;
///
/// let yaml = r#"
/// attribute: [first_name, last_name]
/// ensureUnique: true
/// "#;
/// let config = parse_settings(yaml,)?.into_config()?;
/// assert!(config.ensure_unique());
/// # Ok::<(), sluggable::Error>(())
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq,)]
#[serde(deny_unknown_fields)]
pub struct SlugSettings
{
    /// One attribute name or an ordered list of names.
    #[serde(default, alias = "attribute", deserialize_with = "deserialize_optional_attributes")]
    pub attributes: Option<Vec<String,>,>,

    /// Constant slug value used instead of source attributes.
    #[serde(default)]
    pub value: Option<String,>,

    /// Field that receives the slug.
    #[serde(default, alias = "slugAttribute")]
    pub slug_attribute: Option<String,>,

    /// Whether a stored slug is never regenerated.
    #[serde(default)]
    pub immutable: bool,

    /// Whether new slugs are checked against the store.
    #[serde(default, alias = "ensureUnique")]
    pub ensure_unique: bool,

    /// Separator placed between slug words.
    #[serde(default)]
    pub separator: Option<char,>,

    /// Cap on suffix iterations.
    #[serde(default, alias = "maxIterations")]
    pub max_iterations: Option<u32,>,

    /// Uniqueness query settings.
    #[serde(default, alias = "uniqueValidator")]
    pub unique_check: Option<UniqueCheck,>,

    /// Events the behavior reacts to.
    #[serde(default)]
    pub events: Option<Vec<LifecycleEvent,>,>,
}

impl SlugSettings
{
    /// Converts the document into a [`SlugConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] unless exactly one of `attributes`
    /// and `value` is present.
    pub fn into_config(self,) -> Result<SlugConfig, Error,>
    {
        let builder = match (self.attributes, self.value,) {
            (Some(_,), Some(_,),) => {
                return Err(Error::configuration(
                    "'attributes' and 'value' are mutually exclusive",
                ),);
            }
            (Some(names,), None,) => SlugConfig::builder().attributes(names,),
            (None, Some(value,),) => SlugConfig::builder().value(value,),
            (None, None,) => {
                return Err(Error::configuration(
                    "either 'attributes' or 'value' must be specified",
                ),);
            }
        };

        let mut builder = builder.immutable(self.immutable,).ensure_unique(self.ensure_unique,);
        if let Some(name,) = self.slug_attribute {
            builder = builder.slug_attribute(name,);
        }
        if let Some(separator,) = self.separator {
            builder = builder.separator(separator,);
        }
        if let Some(max_iterations,) = self.max_iterations {
            builder = builder.max_iterations(max_iterations,);
        }
        if let Some(unique_check,) = self.unique_check {
            builder = builder.unique_check(unique_check,);
        }
        if let Some(events,) = self.events {
            builder = builder.events(events,);
        }
        Ok(builder.build(),)
    }
}

/// Loads behavior settings from the provided YAML file path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read or the YAML cannot be
/// deserialized.
pub fn load_settings(path: &Path,) -> Result<SlugSettings, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_settings(&contents,)
}

/// Parses behavior settings from the provided YAML document string.
///
/// # Errors
///
/// Propagates [`Error::Parse`] when the YAML cannot be decoded.
pub fn parse_settings(contents: &str,) -> Result<SlugSettings, Error,>
{
    Ok(serde_yaml::from_str(contents,)?,)
}

fn deserialize_optional_attributes<'de, D,>(
    deserializer: D,
) -> Result<Option<Vec<String,>,>, D::Error,>
where
    D: serde::Deserializer<'de,>,
{
    #[derive(Deserialize,)]
    #[serde(untagged)]
    enum OneOrMany
    {
        One(String,),
        Many(Vec<String,>,),
    }

    let value: Option<OneOrMany,> = Option::deserialize(deserializer,)?;
    Ok(value.map(|attributes| match attributes {
        OneOrMany::One(name,) => vec![name],
        OneOrMany::Many(names,) => names,
    },),)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::tempdir;

    use super::{
        DEFAULT_MAX_ITERATIONS, SlugConfig, SlugSettings, SourceSpec, UniqueCheck, load_settings,
        parse_settings,
    };
    use crate::{error::Error, event::LifecycleEvent};

    #[test]
    fn builder_defaults()
    {
        let config = SlugConfig::builder().attribute("title",).build();
        assert_eq!(config.slug_attribute(), "slug");
        assert_eq!(config.target_attribute(), "slug");
        assert!(!config.immutable());
        assert!(!config.ensure_unique());
        assert!(config.unique_check().exclude_current);
        assert_eq!(config.separator(), '-');
        assert_eq!(config.max_iterations(), DEFAULT_MAX_ITERATIONS);
        assert_eq!(config.events(), &[LifecycleEvent::BeforeValidate]);
        assert!(config.suffix_generator().is_none());
        config.validate().expect("expected valid configuration",);
    }

    #[test]
    fn attribute_calls_accumulate_in_order()
    {
        let config = SlugConfig::builder().attribute("first",).attribute("last",).build();
        match config.source() {
            SourceSpec::Attributes(names,) => assert_eq!(names, &["first", "last"]),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn producer_replaces_attributes()
    {
        let config = SlugConfig::builder().attribute("title",).value("fixed",).build();
        assert!(matches!(config.source(), SourceSpec::Producer(_)));
        config.validate().expect("expected valid configuration",);
    }

    #[test]
    fn validate_rejects_missing_source()
    {
        let error = SlugConfig::builder().build().validate().expect_err("expected error",);
        match error {
            Error::Configuration {
                message,
            } => assert!(message.contains("either source attributes or a value producer")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_blank_names_and_bad_separator()
    {
        let blank = SlugConfig::builder().attributes(["title", " "],).build();
        assert!(blank.validate().is_err());

        let blank_slug = SlugConfig::builder().attribute("title",).slug_attribute("",).build();
        assert!(blank_slug.validate().is_err());

        let separator = SlugConfig::builder().attribute("title",).separator('a',).build();
        assert!(separator.validate().is_err());

        let target = SlugConfig::builder()
            .attribute("title",)
            .unique_check(UniqueCheck {
                target_attribute: Some(String::new(),), exclude_current: true,
            },)
            .build();
        assert!(target.validate().is_err());

        let events = SlugConfig::builder().attribute("title",).events(Vec::<LifecycleEvent,>::new(),).build();
        assert!(events.validate().is_err());
    }

    #[test]
    fn target_attribute_prefers_unique_check_override()
    {
        let config = SlugConfig::builder()
            .attribute("title",)
            .slug_attribute("alias",)
            .unique_check(UniqueCheck {
                target_attribute: Some("path".to_owned(),), exclude_current: false,
            },)
            .build();
        assert_eq!(config.slug_attribute(), "alias");
        assert_eq!(config.target_attribute(), "path");
    }

    #[test]
    fn settings_accept_single_attribute_and_aliases()
    {
        let yaml = r#"
            attribute: title
            slugAttribute: alias
            ensureUnique: true
            maxIterations: 5
            separator: "_"
            uniqueValidator:
              targetAttribute: alias
              excludeCurrent: false
            events: [before_insert]
        "#;

        let settings = parse_settings(yaml,).expect("expected settings to parse",);
        assert_eq!(settings.attributes, Some(vec!["title".to_owned()]));
        let config = settings.into_config().expect("expected valid settings",);
        assert_eq!(config.slug_attribute(), "alias");
        assert!(config.ensure_unique());
        assert_eq!(config.max_iterations(), 5);
        assert_eq!(config.separator(), '_');
        assert!(!config.unique_check().exclude_current);
        assert_eq!(config.events(), &[LifecycleEvent::BeforeInsert]);
    }

    #[test]
    fn settings_accept_attribute_list()
    {
        let settings =
            parse_settings("attributes: [first, last]\nimmutable: true\n",).expect("parse",);
        let config = settings.into_config().expect("expected valid settings",);
        assert!(config.immutable());
        match config.source() {
            SourceSpec::Attributes(names,) => assert_eq!(names, &["first", "last"]),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn unique_check_defaults_to_excluding_current()
    {
        let settings = parse_settings("attribute: title\nunique_check: {}\n",).expect("parse",);
        assert_eq!(settings.unique_check, Some(UniqueCheck::default()));
    }

    #[test]
    fn settings_require_exactly_one_source()
    {
        let neither = SlugSettings::default().into_config().expect_err("expected error",);
        assert!(matches!(neither, Error::Configuration { .. }));

        let both = parse_settings("attribute: title\nvalue: fixed\n",)
            .expect("parse",)
            .into_config()
            .expect_err("expected error",);
        assert!(matches!(both, Error::Configuration { .. }));
    }

    #[test]
    fn settings_reject_unknown_fields()
    {
        let error = parse_settings("attribute: title\nslug_field: x\n",).unwrap_err();
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn load_settings_reads_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("slug.yaml",);
        fs::write(&path, "attribute: title\n",).expect("failed to write config",);

        let settings = load_settings(&path,).expect("expected settings to load",);
        assert_eq!(settings.attributes, Some(vec!["title".to_owned()]));
    }

    #[test]
    fn load_settings_reports_missing_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("missing.yaml",);
        let error = load_settings(&path,).expect_err("expected io error",);
        assert!(matches!(error, Error::Io { .. }));
    }
}
