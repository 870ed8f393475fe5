//! Profile documents and the two write primitives applied to them

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::clock::Timestamp;
use crate::error::{CoreError, Result};

/// Field names the service reads or writes itself
pub mod fields {
    pub const UID: &str = "uid";
    pub const EMAIL: &str = "email";
    pub const CREATED_AT: &str = "createdAt";
    pub const LAST_UPDATED: &str = "lastUpdated";
    pub const ONBOARDING_COMPLETED: &str = "onboardingCompleted";
    pub const ONBOARDING: &str = "onboarding";
    pub const CURRENT_STEP: &str = "currentStep";
}

/// One user's profile, stored as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileDocument(Map<String, Value>);

impl ProfileDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value, rejecting anything that is not an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CoreError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a possibly nested field
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments.split_first()?;
        rest.iter()
            .try_fold(self.0.get(first)?, |value, segment| value.as_object()?.get(segment))
    }

    pub fn uid(&self) -> Option<&str> {
        self.0.get(fields::UID).and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.0.get(fields::EMAIL).and_then(Value::as_str)
    }

    /// Creation time, if present and well formed
    pub fn created_at(&self) -> Option<Timestamp> {
        self.timestamp(fields::CREATED_AT)
    }

    /// Time of the last write, if present and well formed
    pub fn last_updated(&self) -> Option<Timestamp> {
        self.timestamp(fields::LAST_UPDATED)
    }

    pub fn onboarding_completed(&self) -> bool {
        self.0
            .get(fields::ONBOARDING_COMPLETED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn current_step(&self) -> Option<&Value> {
        self.0
            .get(fields::ONBOARDING)
            .and_then(Value::as_object)
            .and_then(|onboarding| onboarding.get(fields::CURRENT_STEP))
    }

    fn timestamp(&self, field: &str) -> Option<Timestamp> {
        self.0.get(field)?.as_str()?.parse().ok()
    }

    /// Merge a patch into this document
    ///
    /// Objects present on both sides merge recursively. Any other value in
    /// the patch (scalars, arrays, null) replaces the existing one.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        merge_objects(&mut self.0, patch);
    }

    /// Apply targeted field updates in order
    pub fn apply(&mut self, updates: &FieldUpdates) {
        for (path, value) in updates.iter() {
            set_path(&mut self.0, path.segments(), value.clone());
        }
    }
}

impl From<ProfileDocument> for Value {
    fn from(doc: ProfileDocument) -> Self {
        doc.into_value()
    }
}

fn merge_objects(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, incoming) in patch {
        match (target.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge_objects(existing, nested);
            }
            (_, incoming) => {
                target.insert(key, incoming);
            }
        }
    }
}

fn set_path(target: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.clone(), value);
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Dotted path to a (possibly nested) document field, e.g. `onboarding.currentStep`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(CoreError::InvalidFieldPath(path.to_string()));
        }
        Ok(Self {
            segments: path.split('.').map(String::from).collect(),
        })
    }

    /// Path made of a single top-level field
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Extend this path by one segment
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.segments.push(name.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl FromStr for FieldPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Ordered set of field-path assignments for a must-exist update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    entries: Vec<(FieldPath, Value)>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment
    pub fn set(mut self, path: FieldPath, value: impl Into<Value>) -> Self {
        self.entries.push((path, value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FieldPath, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the patch written by a profile create/update
///
/// Server-owned fields are stamped here: `uid` always comes from the
/// authenticated principal, `lastUpdated` is always `now`, and `createdAt` is
/// only written when no document exists yet. A client-supplied `createdAt` is
/// dropped so it can never overwrite the stored one.
pub fn upsert_patch(
    body: Map<String, Value>,
    uid: &str,
    now: Timestamp,
    is_new: bool,
) -> Map<String, Value> {
    let mut patch = body;
    patch.remove(fields::CREATED_AT);
    patch.insert(fields::UID.into(), Value::String(uid.to_string()));
    patch.insert(fields::LAST_UPDATED.into(), now.to_json());
    if is_new {
        patch.insert(fields::CREATED_AT.into(), now.to_json());
    }
    patch
}
