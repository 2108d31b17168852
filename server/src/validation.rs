//! Declarative request validation.
//!
//! Every endpoint that takes a body declares a list of [`FieldRules`]. All rules
//! are checked before anything is handed to the album service, and a request
//! either passes as a whole or is rejected with the messages of every failed field.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

pub const BODY_NOT_AN_OBJECT: &str = "request body must be a JSON object";
pub const BODY_NOT_A_FORM: &str = "request body must be a multipart form";
pub const INVALID_ALBUM_ID: &str = "album id must be a valid id";
pub const INVALID_TRACK_ID: &str = "track id must be a valid id";
pub const ALBUM_NAME_REQUIRED: &str = "album name is required";
pub const ALBUM_DESCRIPTION_REQUIRED: &str = "album description is required";
pub const ALBUM_DATE_REQUIRED: &str =
    "album date is required and must be a valid date in ISO 8601 format";
pub const ALBUM_NAME_TOO_SHORT: &str = "album name must be at least 2 characters";
pub const ALBUM_DESCRIPTION_TOO_SHORT: &str = "album description must be at least 2 characters";
pub const ALBUM_DATE_INVALID: &str = "album date must be a valid date in ISO 8601 format";
pub const TRACK_NAME_REQUIRED: &str = "track name is required";
pub const TRACK_FILE_REQUIRED: &str = "track file is required";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn single(message: impl Into<String>) -> ValidationErrors {
        ValidationErrors(vec![message.into()])
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages in the order they were added, without duplicates
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().unique().cloned().collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Exists,
    IsString,
    MinLength(usize),
    IsDate,
}

impl Rule {
    /// Rules other than `Exists` pass for absent fields.
    fn check(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Rule::Exists, value) => value.is_some(),
            (_, None) => true,
            (Rule::IsString, Some(value)) => value.is_string(),
            (Rule::MinLength(min), Some(Value::String(s))) => s.chars().count() >= *min,
            (Rule::IsDate, Some(Value::String(s))) => parse_date(s).is_some(),
            (Rule::MinLength(_) | Rule::IsDate, Some(_)) => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
    pub message: &'static str,
}

impl FieldRules {
    pub const fn new(
        field: &'static str,
        rules: &'static [Rule],
        message: &'static str,
    ) -> FieldRules {
        FieldRules {
            field,
            rules,
            message,
        }
    }

    fn passes(&self, body: &JsonObject) -> bool {
        let value = body.get(self.field);
        self.rules.iter().all(|rule| rule.check(value))
    }
}

pub const CREATE_ALBUM: &[FieldRules] = &[
    FieldRules::new(
        "name",
        &[Rule::Exists, Rule::IsString, Rule::MinLength(2)],
        ALBUM_NAME_REQUIRED,
    ),
    FieldRules::new(
        "description",
        &[Rule::Exists, Rule::IsString, Rule::MinLength(2)],
        ALBUM_DESCRIPTION_REQUIRED,
    ),
    FieldRules::new("date", &[Rule::Exists, Rule::IsDate], ALBUM_DATE_REQUIRED),
];

pub const UPDATE_ALBUM: &[FieldRules] = &[
    FieldRules::new(
        "name",
        &[Rule::IsString, Rule::MinLength(2)],
        ALBUM_NAME_TOO_SHORT,
    ),
    FieldRules::new(
        "description",
        &[Rule::IsString, Rule::MinLength(2)],
        ALBUM_DESCRIPTION_TOO_SHORT,
    ),
    FieldRules::new("date", &[Rule::IsDate], ALBUM_DATE_INVALID),
];

pub const TRACK_NAME: &[FieldRules] = &[FieldRules::new(
    "name",
    &[Rule::Exists, Rule::IsString, Rule::MinLength(1)],
    TRACK_NAME_REQUIRED,
)];

pub fn check(body: &JsonObject, fields: &[FieldRules]) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    for field in fields.iter().filter(|field| !field.passes(body)) {
        errors.push(field.message);
    }
    errors
}

/// Accepts `YYYY-MM-DD` and full date-times, keeping only the date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|d| d.date())
        })
}

/// A request body that can be built once its rules have passed.
pub trait Validate: Sized {
    const RULES: &'static [FieldRules];

    /// Only called on bodies that passed `RULES`.
    fn from_checked(body: &JsonObject) -> Result<Self, ValidationErrors>;

    fn validate(body: &JsonObject) -> Result<Self, ValidationErrors> {
        check(body, Self::RULES).into_result()?;
        Self::from_checked(body)
    }
}

pub fn string_field(body: &JsonObject, field: &str) -> Option<String> {
    body.get(field).and_then(Value::as_str).map(str::to_owned)
}

pub fn date_field(body: &JsonObject, field: &str) -> Option<NaiveDate> {
    body.get(field).and_then(Value::as_str).and_then(parse_date)
}

pub fn required<T>(value: Option<T>, message: &'static str) -> Result<T, ValidationErrors> {
    value.ok_or_else(|| ValidationErrors::single(message))
}
