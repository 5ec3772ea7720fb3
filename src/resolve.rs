use std::fmt;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Opaque YouTube video identifier, taken verbatim from the matched locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page link
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    /// Embeddable player link; the query parameters are fixed.
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}?autoplay=1&rel=0&modestbranding=1", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL shape recognized by a locator pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    Watch,
    Short,
    Embed,
    Shorts,
    Fallback,
}

#[derive(Debug)]
pub struct LocatorPattern {
    pub kind: LocatorKind,
    pub regex: Regex,
}

static PATTERNS: LazyLock<Vec<LocatorPattern>> = LazyLock::new(|| {
    [
        // youtube.com/watch?v=ID
        (LocatorKind::Watch, r"(?:youtube\.com/watch\?v=)([^&\s]+)"),
        // youtu.be/ID
        (LocatorKind::Short, r"(?:youtu\.be/)([^?\s]+)"),
        // youtube.com/embed/ID
        (LocatorKind::Embed, r"(?:youtube\.com/embed/)([^?\s]+)"),
        // youtube.com/shorts/ID
        (LocatorKind::Shorts, r"(?:youtube\.com/shorts/)([^?\s]+)"),
        // v= anywhere in the query, or youtu.be with trailing junk
        (LocatorKind::Fallback, r"(?:youtube\.com.*(?:\?|&)v=|youtu\.be/)([^&#]+)"),
    ]
    .into_iter()
    .map(|(kind, pattern)| LocatorPattern {
        kind,
        regex: Regex::new(pattern).expect("locator patterns are valid"),
    })
    .collect()
});

/// Locator patterns in evaluation order
pub fn locator_patterns() -> &'static [LocatorPattern] {
    &PATTERNS
}

/// Resolve a raw reference, reporting which pattern won.
///
/// Patterns are tried in table order and the first one matching anywhere in
/// the input wins. The captured token is not validated.
pub fn resolve_with_kind(raw: &str) -> Option<(LocatorKind, VideoId)> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }

    locator_patterns().iter().find_map(|p| {
        let caps = p.regex.captures(input)?;
        let id = caps.get(1)?.as_str();
        debug!("Matched {:?} locator: {id}", p.kind);
        Some((p.kind, VideoId(id.to_string())))
    })
}

/// Resolve a raw, user-supplied reference to a video identifier.
pub fn resolve(raw: &str) -> Result<VideoId> {
    resolve_with_kind(raw)
        .map(|(_, id)| id)
        .ok_or_else(|| Error::NotFound { input: raw.trim().to_string() })
}
