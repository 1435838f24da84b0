use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeDocument;

/// An inline message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path into the document, e.g. `experience.0.title`.
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub errors: Vec<FieldError>,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Accepts `https://host/...`, `http://host/...` and bare `host.tld/...`.
fn link_pattern() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| {
        Regex::new(r"^(?i)(https?://)?[a-z0-9-]+(\.[a-z0-9-]+)+(:\d+)?(/\S*)?$")
            .expect("link pattern is valid")
    })
}

/// Checks a form snapshot and returns field-local messages.
///
/// Never fatal: callers store the document regardless and show the messages
/// next to the offending fields.
pub fn validate_document(doc: &ResumeDocument) -> ValidationReport {
    let mut errors = Vec::new();

    if let Some(details) = &doc.personal_details {
        let email = details.email.trim();
        if !email.is_empty() && !email_pattern().is_match(email) {
            push(&mut errors, "personalDetails.email", "Invalid email address.");
        }
        check_link(&mut errors, "personalDetails.linkedin", &details.linkedin);
    }

    for (i, e) in doc.experience.iter().enumerate() {
        require(&mut errors, &format!("experience.{i}.title"), &e.title, "Job title");
        require(&mut errors, &format!("experience.{i}.company"), &e.company, "Company");
        require(&mut errors, &format!("experience.{i}.startDate"), &e.start_date, "Start date");
        require(&mut errors, &format!("experience.{i}.description"), &e.description, "Description");
    }

    for (i, e) in doc.education.iter().enumerate() {
        require(&mut errors, &format!("education.{i}.institution"), &e.institution, "Institution");
        require(&mut errors, &format!("education.{i}.degree"), &e.degree, "Degree");
        require(&mut errors, &format!("education.{i}.startDate"), &e.start_date, "Start date");
        require(&mut errors, &format!("education.{i}.endDate"), &e.end_date, "End date");
    }

    for (i, p) in doc.projects.iter().enumerate() {
        require(&mut errors, &format!("projects.{i}.title"), &p.title, "Project title");
        require(&mut errors, &format!("projects.{i}.description"), &p.description, "Description");
        check_link(&mut errors, &format!("projects.{i}.link"), &p.link);
    }

    for (i, c) in doc.certifications.iter().enumerate() {
        require(&mut errors, &format!("certifications.{i}.title"), &c.title, "Certification title");
        check_link(&mut errors, &format!("certifications.{i}.link"), &c.link);
    }

    ValidationReport {
        passed: errors.is_empty(),
        errors,
    }
}

fn push(errors: &mut Vec<FieldError>, field: &str, message: &str) {
    errors.push(FieldError {
        field: field.to_string(),
        message: message.to_string(),
    });
}

fn require(errors: &mut Vec<FieldError>, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        push(errors, field, &format!("{label} is required."));
    }
}

fn check_link(errors: &mut Vec<FieldError>, field: &str, value: &Option<String>) {
    let Some(link) = value.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return;
    };
    if !link_pattern().is_match(link) {
        push(errors, field, "Invalid link.");
    }
}
