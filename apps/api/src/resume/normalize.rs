//! Normalization: coerces the model's loosely shaped JSON into a `ResumeDocument`.
//!
//! The extractor is a best-effort collaborator: sections go missing, nulls show up
//! where strings belong, and string lists arrive either as bare strings or as
//! `{"value": "..."}` wrappers (the field-array shape a form library produces).
//! Every accepted variant is matched explicitly below. The mapping is total: any
//! JSON value yields a document, and every sequence is present even when empty.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::models::resume::{
    Certification, Education, Experience, PersonalDetails, Project, ResumeDocument,
};

type Object = Map<String, Value>;

const PERSONAL_DETAILS: &[&str] = &["personalDetails", "personal_details"];
const START_DATE: &[&str] = &["startDate", "start_date"];
const END_DATE: &[&str] = &["endDate", "end_date"];

/// Maps an extraction response onto the strict document shape. Never fails.
pub fn normalize_extracted(value: &Value) -> ResumeDocument {
    let obj = match value {
        Value::Object(obj) => obj,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            return ResumeDocument::default();
        }
    };

    ResumeDocument {
        personal_details: field(obj, PERSONAL_DETAILS).and_then(personal_details),
        summary: field(obj, &["summary"]).and_then(scalar_text),
        experience: entries(field(obj, &["experience"]), experience),
        education: entries(field(obj, &["education"]), education),
        skills: dedup_case_insensitive(string_list(field(obj, &["skills"]))),
        projects: entries(field(obj, &["projects"]), project),
        certifications: entries(field(obj, &["certifications"]), certification),
        achievements: string_list(field(obj, &["achievements"])),
        hobbies: string_list(field(obj, &["hobbies"])),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field lookup and scalars
// ────────────────────────────────────────────────────────────────────────────

/// First non-null value under any of `keys`.
fn field<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

/// Trimmed, non-empty text of a scalar. Containers and null have no text.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn required(obj: &Object, keys: &[&str]) -> String {
    optional(obj, keys).unwrap_or_default()
}

fn optional(obj: &Object, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(scalar_text)
}

// ────────────────────────────────────────────────────────────────────────────
// String lists (skills, achievements, hobbies)
// ────────────────────────────────────────────────────────────────────────────

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(list_item).collect(),
        Some(Value::String(joined)) => split_joined(joined),
        Some(single @ (Value::Object(_) | Value::Number(_) | Value::Bool(_))) => {
            list_item(single).into_iter().collect()
        }
    }
}

/// One element of a string list: a bare scalar or a `{"value": ...}` wrapper.
fn list_item(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => scalar_text(value),
        Value::Object(wrapper) => wrapper.get("value").and_then(scalar_text),
        Value::Null | Value::Array(_) => None,
    }
}

/// "Rust, Go; SQL" → ["Rust", "Go", "SQL"]
fn split_joined(joined: &str) -> Vec<String> {
    joined
        .split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Entry lists
// ────────────────────────────────────────────────────────────────────────────

fn entries<T>(value: Option<&Value>, map: fn(&Object) -> Option<T>) -> Vec<T> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_object().and_then(map))
            .collect(),
        Some(Value::Object(single)) => map(single).into_iter().collect(),
        Some(Value::String(_) | Value::Number(_) | Value::Bool(_)) => Vec::new(),
    }
}

fn personal_details(value: &Value) -> Option<PersonalDetails> {
    let obj = value.as_object()?;
    let details = PersonalDetails {
        name: required(obj, &["name"]),
        email: required(obj, &["email"]),
        phone: required(obj, &["phone"]),
        linkedin: optional(obj, &["linkedin"]),
    };
    let blank = details.name.is_empty()
        && details.email.is_empty()
        && details.phone.is_empty()
        && details.linkedin.is_none();
    (!blank).then_some(details)
}

fn experience(obj: &Object) -> Option<Experience> {
    let entry = Experience {
        title: required(obj, &["title"]),
        company: required(obj, &["company"]),
        start_date: required(obj, START_DATE),
        end_date: optional(obj, END_DATE),
        description: required(obj, &["description"]),
    };
    let blank = entry.title.is_empty()
        && entry.company.is_empty()
        && entry.start_date.is_empty()
        && entry.end_date.is_none()
        && entry.description.is_empty();
    (!blank).then_some(entry)
}

fn education(obj: &Object) -> Option<Education> {
    let entry = Education {
        institution: required(obj, &["institution"]),
        degree: required(obj, &["degree"]),
        start_date: required(obj, START_DATE),
        end_date: required(obj, END_DATE),
        description: optional(obj, &["description"]),
    };
    let blank = entry.institution.is_empty()
        && entry.degree.is_empty()
        && entry.start_date.is_empty()
        && entry.end_date.is_empty()
        && entry.description.is_none();
    (!blank).then_some(entry)
}

fn project(obj: &Object) -> Option<Project> {
    let entry = Project {
        title: required(obj, &["title"]),
        link: optional(obj, &["link"]),
        start_date: optional(obj, START_DATE),
        end_date: optional(obj, END_DATE),
        description: required(obj, &["description"]),
    };
    let blank = entry.title.is_empty()
        && entry.link.is_none()
        && entry.start_date.is_none()
        && entry.end_date.is_none()
        && entry.description.is_empty();
    (!blank).then_some(entry)
}

fn certification(obj: &Object) -> Option<Certification> {
    let entry = Certification {
        title: required(obj, &["title"]),
        link: optional(obj, &["link"]),
        start_date: optional(obj, START_DATE),
        end_date: optional(obj, END_DATE),
        description: optional(obj, &["description"]),
    };
    let blank = entry.title.is_empty()
        && entry.link.is_none()
        && entry.start_date.is_none()
        && entry.end_date.is_none()
        && entry.description.is_none();
    (!blank).then_some(entry)
}
