//! Org-mode notes store.
//!
//! Scans Org outline text once into a heading table. Each heading owns the
//! lines up to the next heading; its properties come from a `:PROPERTIES:`
//! drawer that follows the heading line, optionally after one planning line
//! (`SCHEDULED:`, `DEADLINE:`, `CLOSED:`). Property names compare
//! case-insensitively, as in Org, and `:NAME+:` lines extend `NAME`.

use crate::error::ReplayError;
use crate::notes::{Location, NotesStore};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\*+)(?:[ \t]+(.*?))?[ \t]*$").unwrap());

static RE_PLANNING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:SCHEDULED|DEADLINE|CLOSED):").unwrap());

static RE_DRAWER_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[ \t]*:PROPERTIES:[ \t]*$").unwrap());

static RE_DRAWER_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[ \t]*:END:[ \t]*$").unwrap());

static RE_PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*:([^\s:]+):(?:[ \t]+(.*?))?[ \t]*$").unwrap());

/// One heading and its property drawer.
#[derive(Debug, Clone, PartialEq)]
pub struct OrgHeading {
    pub location: Location,
    pub level: usize,
    pub title: String,
    /// Properties in drawer order; names keep their original spelling.
    pub properties: Vec<(String, String)>,
}

impl OrgHeading {
    /// First property named `name`, compared case-insensitively.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An Org document parsed into its headings.
#[derive(Debug, Clone, Default)]
pub struct OrgNotes {
    headings: Vec<OrgHeading>,
}

impl OrgNotes {
    /// Parse Org text.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut headings = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let Some(caps) = RE_HEADING.captures(line) else {
                continue;
            };
            let level = caps[1].len();
            let title = caps.get(2).map_or("", |m| m.as_str()).to_string();
            let properties = read_drawer(&lines[idx + 1..]);
            headings.push(OrgHeading {
                location: Location::new(idx),
                level,
                title,
                properties,
            });
        }

        debug!("Parsed {} Org headings", headings.len());
        Self { headings }
    }

    /// Read and parse an Org file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ReplayError::NotesReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn all_headings(&self) -> &[OrgHeading] {
        &self.headings
    }

    /// The heading owning `location`: the last heading at or before it.
    pub fn heading_at(&self, location: Location) -> Option<&OrgHeading> {
        let idx = self
            .headings
            .partition_point(|h| h.location <= location);
        idx.checked_sub(1).map(|i| &self.headings[i])
    }

    /// First value of `name` found on any heading, in document order.
    pub fn first_property(&self, name: &str) -> Option<&str> {
        self.headings.iter().find_map(|h| h.property(name))
    }
}

impl NotesStore for OrgNotes {
    fn property(&self, location: Location, name: &str) -> Option<String> {
        self.heading_at(location)
            .and_then(|h| h.property(name))
            .map(str::to_string)
    }

    fn headings(&self) -> Vec<Location> {
        self.headings.iter().map(|h| h.location).collect()
    }
}

/// Parse the property drawer directly below a heading line.
///
/// An unterminated drawer yields no properties.
fn read_drawer(after_heading: &[&str]) -> Vec<(String, String)> {
    let mut lines = after_heading.iter().copied().peekable();
    if lines.peek().is_some_and(|l| RE_PLANNING.is_match(l)) {
        lines.next();
    }
    if !lines.next().is_some_and(|l| RE_DRAWER_START.is_match(l)) {
        return Vec::new();
    }

    let mut properties = Vec::new();
    for line in lines {
        if RE_DRAWER_END.is_match(line) {
            return properties;
        }
        if RE_HEADING.is_match(line) {
            break;
        }
        if let Some(caps) = RE_PROPERTY.captures(line) {
            let value = caps.get(2).map_or("", |m| m.as_str());
            set_property(&mut properties, &caps[1], value);
        }
    }
    Vec::new()
}

/// Record one drawer line. `:NAME+:` appends to an earlier `NAME` with a
/// space between the values.
fn set_property(properties: &mut Vec<(String, String)>, name: &str, value: &str) {
    let Some(base) = name.strip_suffix('+').filter(|b| !b.is_empty()) else {
        properties.push((name.to_string(), value.to_string()));
        return;
    };
    match properties
        .iter_mut()
        .find(|(k, _)| k.eq_ignore_ascii_case(base))
    {
        Some((_, existing)) if existing.is_empty() => existing.push_str(value),
        Some((_, existing)) if !value.is_empty() => {
            existing.push(' ');
            existing.push_str(value);
        }
        Some(_) => {}
        None => properties.push((base.to_string(), value.to_string())),
    }
}
