//! App Store identifier extraction.
//!
//! Accepts either a bare numeric ID or anything containing a storefront path
//! segment of the form `/id<digits>`, e.g.:
//! - `https://apps.apple.com/app/id6743941366`
//! - `https://apps.apple.com/us/app/some-app-name/id6743941366?mt=8`

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::AppIdError;

// ASCII digits only; `\d` in `regex` also matches other Unicode digit scripts.
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));
static STORE_PATH_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/id([0-9]+)").expect("valid regex"));

/// Best-effort extraction of a numeric app ID from free-form input.
///
/// Returns the trimmed input unchanged when it is already numeric or when no
/// `/id<digits>` segment is present. Never fails.
#[must_use]
pub fn normalize_app_id(raw: &str) -> String {
    let trimmed = raw.trim();

    if NUMERIC_RE.is_match(trimmed) {
        return trimmed.to_owned();
    }

    STORE_PATH_ID_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| trimmed.to_owned(), |m| m.as_str().to_owned())
}

/// A purely numeric App Store ID, safe to use as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalAppId(String);

impl CanonicalAppId {
    /// Normalizes `raw` and checks the result is non-empty and numeric.
    ///
    /// # Errors
    ///
    /// Returns [`AppIdError::Empty`] for blank input and
    /// [`AppIdError::NotNumeric`] when normalization could not find an ID.
    pub fn parse(raw: &str) -> Result<Self, AppIdError> {
        let normalized = normalize_app_id(raw);
        if normalized.is_empty() {
            return Err(AppIdError::Empty);
        }
        if !NUMERIC_RE.is_match(&normalized) {
            return Err(AppIdError::NotNumeric(normalized));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalAppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalAppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
