//! Form validation and sanitization
//!
//! Each form field runs an ordered chain of sanitizers (trim, escape) and
//! checks. A failing check records one [`FieldError`] and the chain keeps
//! going, so a field can collect several errors; every field of the form is
//! checked regardless of earlier failures. The sanitized candidate record is
//! always built so the caller can re-display what the user typed.

pub mod forms;

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidateLength;

pub use forms::{author_form, book_form, book_instance_form, genre_form};

static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z]+$").expect("valid alphanumeric pattern"));

/// Calendar (extended, basic or reduced), ordinal and week dates
static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<year>\d{4})(?:-(?P<month>\d{2})(?:-(?P<day>\d{2}))?|(?P<basic_month>\d{2})(?P<basic_day>\d{2})|-(?P<ordinal>\d{3})|-?W(?P<week>\d{2})(?:-?(?P<weekday>[1-7]))?)?$",
    )
    .expect("valid ISO-8601 date pattern")
});

/// Time of day with optional seconds, fraction and offset
static ISO_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<hour>\d{2})(?::?(?P<minute>\d{2})(?::?(?P<second>\d{2})(?:[.,]\d+)?)?)?(?:[Zz]|[+-](?:[01]\d|2[0-3])(?::?[0-5]\d)?)?$",
    )
    .expect("valid ISO-8601 time pattern")
});

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// One failed check on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Raw value submitted for a form field.
///
/// Numbers and booleans arrive as their text so they go through the field
/// chains like any typed value; `null` inside a list is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Many(Vec<String>),
    One(String),
    Absent,
}

impl<'de> Deserialize<'de> for FormValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, SeqAccess, Visitor};

        struct FormValueVisitor;

        impl<'de> Visitor<'de> for FormValueVisitor {
            type Value = FormValue;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string, number, boolean, null or list of those")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(FormValue::One(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(FormValue::One(value))
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(FormValue::One(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(FormValue::One(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(FormValue::One(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                Ok(FormValue::One(value.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FormValue::Absent)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FormValue::Absent)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(element) = seq.next_element::<FormValue>()? {
                    match element {
                        FormValue::One(value) => values.push(value),
                        FormValue::Many(nested) => values.extend(nested),
                        FormValue::Absent => {}
                    }
                }
                Ok(FormValue::Many(values))
            }
        }

        deserializer.deserialize_any(FormValueVisitor)
    }
}

impl FormValue {
    /// Value of a single-valued field
    pub fn first(&self) -> Option<&str> {
        match self {
            FormValue::One(value) => Some(value),
            FormValue::Many(values) => values.first().map(String::as_str),
            FormValue::Absent => None,
        }
    }

    /// Values of a multi-valued field: a lone value becomes a one-element list
    pub fn all(&self) -> Vec<&str> {
        match self {
            FormValue::One(value) => vec![value.as_str()],
            FormValue::Many(values) => values.iter().map(String::as_str).collect(),
            FormValue::Absent => Vec::new(),
        }
    }
}

/// Untrusted form submission, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FormInput {
    fields: HashMap<String, FormValue>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), FormValue::One(value.into()));
        self
    }

    pub fn with_many<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.fields.insert(name.into(), FormValue::Many(values));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.get(name)
    }
}

/// Sanitized candidate record plus the errors found while building it
#[derive(Debug, Clone)]
pub struct Validated<T> {
    pub record: T,
    pub errors: Vec<FieldError>,
}

/// Candidate record refused by validation
#[derive(Debug, Clone, Serialize)]
pub struct Rejected<T> {
    pub candidate: T,
    pub errors: Vec<FieldError>,
}

impl<T> Validated<T> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<T, Rejected<T>> {
        if self.errors.is_empty() {
            Ok(self.record)
        } else {
            Err(Rejected {
                candidate: self.record,
                errors: self.errors,
            })
        }
    }
}

/// Collects field errors across all the chains of one form
pub struct FormValidator<'a> {
    input: &'a FormInput,
    errors: Vec<FieldError>,
}

impl<'a> FormValidator<'a> {
    pub fn new(input: &'a FormInput) -> Self {
        Self {
            input,
            errors: Vec::new(),
        }
    }

    /// Start the chain of a single-valued field
    pub fn field(&mut self, name: &'static str) -> FieldChain<'_> {
        let value = self
            .input
            .get(name)
            .and_then(FormValue::first)
            .unwrap_or_default()
            .to_string();
        FieldChain {
            name,
            value,
            errors: &mut self.errors,
        }
    }

    /// Start the chain of a multi-valued field
    pub fn list(&mut self, name: &'static str) -> ListChain<'_> {
        let values = self
            .input
            .get(name)
            .map(|v| v.all().into_iter().map(str::to_string).collect())
            .unwrap_or_default();
        ListChain {
            name,
            values,
            errors: &mut self.errors,
        }
    }

    pub fn finish<T>(self, record: T) -> Validated<T> {
        Validated {
            record,
            errors: self.errors,
        }
    }
}

fn push_error(errors: &mut Vec<FieldError>, field: &str, message: &str) {
    errors.push(FieldError {
        field: field.to_string(),
        message: message.to_string(),
    });
}

/// Sanitizers and checks for one single-valued field, applied in call order
pub struct FieldChain<'v> {
    name: &'static str,
    value: String,
    errors: &'v mut Vec<FieldError>,
}

impl<'v> FieldChain<'v> {
    pub fn trim(mut self) -> Self {
        let trimmed = self.value.trim();
        if trimmed.len() != self.value.len() {
            self.value = trimmed.to_string();
        }
        self
    }

    pub fn escape(mut self) -> Self {
        self.value = escape_html(&self.value);
        self
    }

    /// Character count within the given bounds
    pub fn length(self, min: Option<u64>, max: Option<u64>, message: &str) -> Self {
        if !self.value.validate_length(min, max, None) {
            push_error(self.errors, self.name, message);
        }
        self
    }

    pub fn min_length(self, min: u64, message: &str) -> Self {
        self.length(Some(min), None, message)
    }

    pub fn max_length(self, max: u64, message: &str) -> Self {
        self.length(None, Some(max), message)
    }

    pub fn alphanumeric(self, message: &str) -> Self {
        if !ALPHANUMERIC.is_match(&self.value) {
            push_error(self.errors, self.name, message);
        }
        self
    }

    /// Sanitized value
    pub fn value(self) -> String {
        self.value
    }

    /// Optional ISO-8601 date; an empty value means "no date"
    pub fn date(self, message: &str) -> Option<NaiveDate> {
        if self.value.is_empty() {
            return None;
        }
        let parsed = parse_iso_date(&self.value);
        if parsed.is_none() {
            push_error(self.errors, self.name, message);
        }
        parsed
    }

    /// Identifier of a referenced record; an empty value yields `None` silently
    pub fn identifier(self, message: &str) -> Option<Uuid> {
        if self.value.is_empty() {
            return None;
        }
        let parsed = Uuid::parse_str(&self.value).ok();
        if parsed.is_none() {
            push_error(self.errors, self.name, message);
        }
        parsed
    }

    /// Parse into `T`, falling back to `T::default()` when empty or invalid
    pub fn parse_or_default<T>(self, message: &str) -> T
    where
        T: std::str::FromStr + Default,
    {
        if self.value.is_empty() {
            return T::default();
        }
        match self.value.parse() {
            Ok(value) => value,
            Err(_) => {
                push_error(self.errors, self.name, message);
                T::default()
            }
        }
    }
}

/// Sanitizers and checks applied to every element of a multi-valued field
pub struct ListChain<'v> {
    name: &'static str,
    values: Vec<String>,
    errors: &'v mut Vec<FieldError>,
}

impl<'v> ListChain<'v> {
    pub fn trim(mut self) -> Self {
        self.values = self.values.iter().map(|v| v.trim().to_string()).collect();
        self
    }

    pub fn escape(mut self) -> Self {
        self.values = self.values.iter().map(|v| escape_html(v)).collect();
        self
    }

    /// Distinct identifiers, in submission order. Empty elements are skipped.
    pub fn identifiers(self, message: &str) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::with_capacity(self.values.len());
        for value in self.values.iter().filter(|v| !v.is_empty()) {
            match Uuid::parse_str(value) {
                Ok(id) if !ids.contains(&id) => ids.push(id),
                Ok(_) => {}
                Err(_) => push_error(self.errors, self.name, message),
            }
        }
        ids
    }
}

/// Replace HTML-significant characters with entities
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Calendar date from an ISO-8601 date or date-time.
///
/// Accepts calendar dates (`1965-08-01`, `19650801`, and the reduced `1965-08`
/// and `1965`), ordinal dates (`1965-213`) and week dates (`1965-W31-7`), each
/// optionally followed by a time of day and offset. Reduced dates stand for
/// their first day. The time part must be well formed but does not move the
/// date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let (date, time) = match value.find(|c: char| matches!(c, 'T' | 't' | ' ')) {
        Some(idx) => (&value[..idx], Some(&value[idx + 1..])),
        None => (value, None),
    };
    if let Some(time) = time {
        if !is_iso_time(time) {
            return None;
        }
    }

    let caps = ISO_DATE.captures(date)?;
    let number = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());
    let year: i32 = caps["year"].parse().ok()?;

    if let Some(ordinal) = number("ordinal") {
        return NaiveDate::from_yo_opt(year, ordinal);
    }
    if let Some(week) = number("week") {
        let weekday = WEEKDAYS.get(number("weekday").unwrap_or(1) as usize - 1)?;
        return NaiveDate::from_isoywd_opt(year, week, *weekday);
    }
    let month = number("month").or_else(|| number("basic_month")).unwrap_or(1);
    let day = number("day").or_else(|| number("basic_day")).unwrap_or(1);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn is_iso_time(time: &str) -> bool {
    let Some(caps) = ISO_TIME.captures(time) else {
        return false;
    };
    let within = |name: &str, max: u32| {
        caps.name(name)
            .map_or(true, |m| m.as_str().parse::<u32>().map_or(false, |n| n <= max))
    };
    within("hour", 23) && within("minute", 59) && within("second", 60)
}
