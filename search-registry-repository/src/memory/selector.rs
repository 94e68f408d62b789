//! Document selectors and sort specifications for the in-memory backend.
//!
//! Supports the subset of Mongo-style selectors the default query produces
//! plus what callers commonly hand-write: `$or`, `$and`, `$regex` with
//! `$options`, and literal equality on (dotted) field paths.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::errors::SearchIndexError;
use crate::utils::json_type_name;

/// A compiled selector.
#[derive(Debug)]
pub(crate) enum Selector {
    /// Every clause must match. An empty list matches everything.
    All(Vec<Selector>),
    /// At least one clause must match.
    Any(Vec<Selector>),
    /// A condition on the value at a field path.
    Field { path: String, condition: Condition },
}

#[derive(Debug)]
pub(crate) enum Condition {
    Regex(Regex),
    Equals(Value),
}

impl Selector {
    /// Compile a selector object.
    ///
    /// Regular expressions are compiled here, so an invalid pattern fails the
    /// search before any document is looked at.
    pub(crate) fn compile(selector: &Value) -> Result<Self, SearchIndexError> {
        match selector {
            Value::Null => Ok(Self::All(Vec::new())),
            Value::Object(map) => Self::compile_object(map),
            other => Err(SearchIndexError::query(format!(
                "selector must be an object, got {}",
                json_type_name(other)
            ))),
        }
    }

    fn compile_object(map: &Map<String, Value>) -> Result<Self, SearchIndexError> {
        let mut clauses = Vec::with_capacity(map.len());

        for (key, value) in map {
            let clause = match key.as_str() {
                "$or" => Self::Any(compile_clauses(key, value)?),
                "$and" => Self::All(compile_clauses(key, value)?),
                op if op.starts_with('$') => {
                    return Err(SearchIndexError::query(format!(
                        "unsupported selector operator `{}`",
                        op
                    )))
                }
                path => Self::Field {
                    path: path.to_string(),
                    condition: Condition::compile(value)?,
                },
            };
            clauses.push(clause);
        }

        Ok(match clauses.len() {
            1 => clauses.remove(0),
            _ => Self::All(clauses),
        })
    }

    /// Returns true if `document` satisfies this selector.
    pub(crate) fn matches(&self, document: &Value) -> bool {
        match self {
            Self::All(clauses) => clauses.iter().all(|c| c.matches(document)),
            Self::Any(clauses) => clauses.iter().any(|c| c.matches(document)),
            Self::Field { path, condition } => condition.matches(lookup(document, path)),
        }
    }
}

fn compile_clauses(op: &str, value: &Value) -> Result<Vec<Selector>, SearchIndexError> {
    match value {
        Value::Array(items) => items.iter().map(Selector::compile).collect(),
        other => Err(SearchIndexError::query(format!(
            "`{}` expects an array of selectors, got {}",
            op,
            json_type_name(other)
        ))),
    }
}

impl Condition {
    fn compile(value: &Value) -> Result<Self, SearchIndexError> {
        let Value::Object(map) = value else {
            return Ok(Self::Equals(value.clone()));
        };

        if let Some(pattern) = map.get("$regex") {
            let pattern = pattern.as_str().ok_or_else(|| {
                SearchIndexError::query(format!(
                    "`$regex` must be a string, got {}",
                    json_type_name(pattern)
                ))
            })?;
            let options = match map.get("$options") {
                None => "",
                Some(Value::String(options)) => options.as_str(),
                Some(other) => {
                    return Err(SearchIndexError::query(format!(
                        "`$options` must be a string, got {}",
                        json_type_name(other)
                    )))
                }
            };
            return compile_regex(pattern, options).map(Self::Regex);
        }

        if let Some(op) = map.keys().find(|key| key.starts_with('$')) {
            return Err(SearchIndexError::query(format!(
                "unsupported field operator `{}`",
                op
            )));
        }

        Ok(Self::Equals(value.clone()))
    }

    fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::Equals(Value::Null), None) => true,
            (_, None) => false,
            (_, Some(Value::Array(items))) if !matches!(self, Self::Equals(Value::Array(_))) => {
                items.iter().any(|item| self.matches_scalar(item))
            }
            (_, Some(value)) => self.matches_scalar(value),
        }
    }

    fn matches_scalar(&self, value: &Value) -> bool {
        match self {
            Self::Regex(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
            Self::Equals(expected) => expected == value,
        }
    }
}

fn compile_regex(pattern: &str, options: &str) -> Result<Regex, SearchIndexError> {
    let mut builder = RegexBuilder::new(pattern);
    for option in options.chars() {
        match option {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => {
                return Err(SearchIndexError::query(format!(
                    "unsupported regex option `{}`",
                    other
                )))
            }
        };
    }

    builder
        .build()
        .map_err(|e| SearchIndexError::query(format!("invalid regular expression: {}", e)))
}

/// Resolve a dotted field path (`profile.name`) inside a document.
pub(crate) fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ascending,
    Descending,
}

/// A compiled sort specification: field paths in priority order.
#[derive(Debug, Default)]
pub(crate) struct SortSpec {
    keys: Vec<(String, Direction)>,
}

impl SortSpec {
    /// Compile a sort object such as `{"score": -1, "name": 1}`.
    ///
    /// Keys take priority in the order they are written.
    pub(crate) fn compile(sort: &Value) -> Result<Self, SearchIndexError> {
        let map = match sort {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(SearchIndexError::query(format!(
                    "sort must be an object, got {}",
                    json_type_name(other)
                )))
            }
        };

        let keys = map
            .iter()
            .map(|(path, direction)| {
                let direction = match direction.as_i64() {
                    Some(1) => Direction::Ascending,
                    Some(-1) => Direction::Descending,
                    _ => {
                        return Err(SearchIndexError::query(format!(
                            "sort direction for `{}` must be 1 or -1, got {}",
                            path, direction
                        )))
                    }
                };
                Ok((path.clone(), direction))
            })
            .collect::<Result<Vec<_>, SearchIndexError>>()?;

        Ok(Self { keys })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Stable in-place sort of `documents`.
    pub(crate) fn apply(&self, documents: &mut [Value]) {
        if self.is_empty() {
            return;
        }

        documents.sort_by(|a, b| {
            for (path, direction) in &self.keys {
                let ordering = compare(lookup(a, path), lookup(b, path));
                let ordering = match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

/// Missing values first, then numbers, then everything else by text.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => sort_text(a).cmp(&sort_text(b)),
        },
    }
}

fn sort_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
