//! URL-safe identifiers derived from a display name.

use core::fmt;

use deunicode::deunicode;
use serde::{Deserialize, Serialize};

/// A URL-safe slug: lower-case ASCII letters and digits separated by single
/// hyphens, with no leading or trailing hyphen. Names are transliterated to
/// ASCII first, so accented and non-Latin letters keep their place.
///
/// Slugs are derived once when a brand or product is created and are never
/// recomputed afterwards. Collisions are not resolved here; the database
/// uniqueness constraint rejects them.
///
/// ```
/// use shopdesk_core::Slug;
///
/// assert_eq!(Slug::derive("  Hello, World!  ").as_str(), "hello-world");
/// assert_eq!(Slug::derive("Café Crème 2000").as_str(), "cafe-creme-2000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Separator placed between alphanumeric runs.
    pub const SEPARATOR: char = '-';

    /// Derive a slug from a name.
    ///
    /// The name is transliterated to ASCII, then every run of characters
    /// outside `[a-z0-9]` (after lower-casing) collapses into one separator;
    /// separators at either end are dropped. The result is empty only when
    /// the name has no letters or digits in any script.
    #[must_use]
    pub fn derive(name: &str) -> Self {
        let ascii = deunicode(name);
        let mut slug = String::with_capacity(ascii.len());
        let mut pending_separator = false;

        for c in ascii.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push(Self::SEPARATOR);
                }
                pending_separator = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_separator = true;
            }
        }

        Self(slug)
    }

    /// Wrap a slug read back from storage without re-deriving it.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Whether a string already has slug shape.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        !value.is_empty()
            && !value.starts_with(Self::SEPARATOR)
            && !value.ends_with(Self::SEPARATOR)
            && !value.contains("--")
            && value
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == Self::SEPARATOR)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether derivation produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
