//! Endpoint path templates with `{name}` placeholders.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::{Error, Result};

/// Characters escaped in a substituted path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed path template such as `/wizard/{wizard_id}`.
///
/// ```
/// use std::collections::BTreeMap;
/// use courier_core::PathTemplate;
///
/// let template = PathTemplate::parse("/wizard/{wizard_id}").expect("valid");
/// let params = BTreeMap::from([("wizard_id".to_string(), "05b289cc".to_string())]);
/// assert_eq!(template.render(&params).expect("rendered"), "/wizard/05b289cc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] on an unterminated or empty
    /// placeholder.
    pub fn parse(template: impl Into<String>) -> Result<Self> {
        let raw = template.into();
        let mut segments = Vec::new();
        let mut rest = raw.as_str();

        while let Some((literal, after)) = rest.split_once('{') {
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }
            let (name, tail) = after.split_once('}').ok_or_else(|| {
                Error::configuration(format!("unterminated placeholder in path '{raw}'"))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::configuration(format!(
                    "empty placeholder in path '{raw}'"
                )));
            }
            segments.push(Segment::Param(name.to_string()));
            rest = tail;
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { raw, segments })
    }

    /// Template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every placeholder, percent-encoding values as path
    /// segments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a placeholder has no value.
    pub fn render(&self, params: &BTreeMap<String, String>) -> Result<String> {
        let mut path = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Param(name) => {
                    let value = params.get(name).ok_or_else(|| {
                        Error::configuration(format!(
                            "missing path parameter '{name}' for '{}'",
                            self.raw
                        ))
                    })?;
                    path.extend(utf8_percent_encode(value, SEGMENT));
                }
            }
        }
        Ok(path)
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl AsRef<str> for PathTemplate {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
