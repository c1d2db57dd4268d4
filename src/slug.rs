// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Utilities for deriving stable slugs from user-supplied strings.
//!
//! Slugs produced by this module contain only lowercase ASCII alphanumeric
//! characters separated by single separators, making them suitable for URL
//! path segments. Accented and non-Latin characters are transliterated to
//! ASCII before filtering, so `"Crème Brûlée"` becomes `"creme-brulee"`.

/// Separator placed between slug words unless configured otherwise.
pub const DEFAULT_SEPARATOR: char = '-';

/// Normalizes `text` into a slug joined by [`DEFAULT_SEPARATOR`].
///
/// The function is total: input without any slug-worthy characters yields an
/// empty string. Applying it to its own output returns the output unchanged.
///
/// # Examples
///
/// ```
/// use sluggable::slugify;
///
/// assert_eq!(slugify(" Docs/Overview  "), "docs-overview");
/// assert_eq!(slugify("***"), "");
/// ```
pub fn slugify(text: &str,) -> String
{
    SlugStrategy::builder(text,).build()
}

/// Returns `true` when `separator` may join slug words.
///
/// Only ASCII punctuation qualifies; letters, digits and whitespace would make
/// the normalized form ambiguous.
pub fn is_valid_separator(separator: char,) -> bool
{
    separator.is_ascii_punctuation()
}

/// Returns `true` when `value` is already in normalized form for `separator`.
///
/// The empty string counts as normalized.
pub fn is_valid_slug(value: &str, separator: char,) -> bool
{
    if value.starts_with(separator,) || value.ends_with(separator,) {
        return false;
    }
    let mut previous_separator = false;
    for ch in value.chars() {
        if ch == separator {
            if previous_separator {
                return false;
            }
            previous_separator = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            previous_separator = false;
        } else {
            return false;
        }
    }
    true
}

/// Builder for slug strings.
#[derive(Debug, Clone, Copy,)]
pub struct SlugStrategy<'input,>
{
    source:    &'input str,
    separator: char,
}

impl<'input,> SlugStrategy<'input,>
{
    /// Creates a new slug builder for the provided string slice.
    ///
    /// The builder retains a borrowed view of the source to avoid allocations
    /// until [`build`](Self::build) is invoked.
    pub fn builder(source: &'input str,) -> Self
    {
        Self {
            source,
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Overrides the separator placed between words.
    ///
    /// Characters rejected by [`is_valid_separator`] are ignored and the
    /// default separator is kept.
    pub fn separator(mut self, separator: char,) -> Self
    {
        if is_valid_separator(separator,) {
            self.separator = separator;
        }
        self
    }

    /// Builds a slug from the provided source string.
    ///
    /// Transliteration and filtering are delegated to the `slug` crate,
    /// which always joins words with `-`; the configured separator is
    /// substituted afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluggable::SlugStrategy;
    ///
    /// let slug = SlugStrategy::builder("Hello World",).separator('_',).build();
    /// assert_eq!(slug, "hello_world");
    /// ```
    pub fn build(self,) -> String
    {
        let normalized = ::slug::slugify(self.source,);
        if self.separator == DEFAULT_SEPARATOR {
            normalized
        } else {
            normalized.replace(DEFAULT_SEPARATOR, &self.separator.to_string(),)
        }
    }
}
