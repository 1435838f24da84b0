//! Preview: the read-only projection of a session's document.
//!
//! `ResumePreview` carries only what is worth showing: blank fields, blank entries
//! and empty sections are dropped here, so renderers never test for emptiness.
//! `render_printable_html` turns it into a standalone page for print-to-PDF.

use askama::Template;
use serde::Serialize;

use crate::models::resume::ResumeDocument;

pub const EMPTY_PREVIEW_MESSAGE: &str =
    "Fill in the form or upload a resume to see the preview here.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
    Linkedin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactItem {
    pub kind: ContactKind,
    pub label: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewHeader {
    pub name: Option<String>,
    pub contacts: Vec<ContactItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Projects,
    Education,
    Skills,
    Certifications,
    Achievements,
    Hobbies,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Experience => "Work Experience",
            SectionKind::Projects => "Projects",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Certifications => "Certifications",
            SectionKind::Achievements => "Achievements",
            SectionKind::Hobbies => "Hobbies",
        }
    }
}

/// One dated item: a job, a degree, a project or a certification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    pub heading: Option<String>,
    pub subheading: Option<String>,
    pub dates: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionBody {
    Paragraph { text: String },
    Entries { entries: Vec<PreviewEntry> },
    Tags { items: Vec<String> },
    List { items: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSection {
    pub kind: SectionKind,
    pub title: &'static str,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePreview {
    pub is_empty: bool,
    pub header: Option<PreviewHeader>,
    pub sections: Vec<PreviewSection>,
}

impl ResumePreview {
    pub fn from_document(doc: &ResumeDocument) -> Self {
        if doc.is_blank() {
            return Self::empty();
        }

        let mut sections = Vec::new();

        if let Some(summary) = text(doc.summary.as_deref()) {
            push_section(&mut sections, SectionKind::Summary, SectionBody::Paragraph { text: summary });
        }

        let experience = doc
            .experience
            .iter()
            .filter_map(|e| {
                entry(
                    &e.title,
                    Some(e.company.as_str()),
                    open_ended_range(&e.start_date, e.end_date.as_deref()),
                    None,
                    Some(e.description.as_str()),
                )
            })
            .collect();
        push_entries(&mut sections, SectionKind::Experience, experience);

        let projects = doc
            .projects
            .iter()
            .filter_map(|p| {
                entry(
                    &p.title,
                    None,
                    range(p.start_date.as_deref(), p.end_date.as_deref()),
                    p.link.as_deref(),
                    Some(p.description.as_str()),
                )
            })
            .collect();
        push_entries(&mut sections, SectionKind::Projects, projects);

        let education = doc
            .education
            .iter()
            .filter_map(|e| {
                entry(
                    &e.degree,
                    Some(e.institution.as_str()),
                    range(Some(e.start_date.as_str()), Some(e.end_date.as_str())),
                    None,
                    e.description.as_deref(),
                )
            })
            .collect();
        push_entries(&mut sections, SectionKind::Education, education);

        push_items(&mut sections, SectionKind::Skills, &doc.skills, true);

        let certifications = doc
            .certifications
            .iter()
            .filter_map(|c| {
                entry(
                    &c.title,
                    None,
                    range(c.start_date.as_deref(), c.end_date.as_deref()),
                    c.link.as_deref(),
                    c.description.as_deref(),
                )
            })
            .collect();
        push_entries(&mut sections, SectionKind::Certifications, certifications);

        push_items(&mut sections, SectionKind::Achievements, &doc.achievements, false);
        push_items(&mut sections, SectionKind::Hobbies, &doc.hobbies, false);

        let header = doc.personal_details.as_ref().and_then(|p| {
            let mut contacts = Vec::new();
            if let Some(email) = text(Some(p.email.as_str())) {
                contacts.push(ContactItem {
                    kind: ContactKind::Email,
                    href: Some(format!("mailto:{email}")),
                    label: email,
                });
            }
            if let Some(phone) = text(Some(p.phone.as_str())) {
                contacts.push(ContactItem {
                    kind: ContactKind::Phone,
                    label: phone,
                    href: None,
                });
            }
            if let Some(linkedin) = text(p.linkedin.as_deref()) {
                contacts.push(ContactItem {
                    kind: ContactKind::Linkedin,
                    label: "LinkedIn".to_string(),
                    href: Some(absolute_url(&linkedin)),
                });
            }
            let name = text(Some(p.name.as_str()));
            (name.is_some() || !contacts.is_empty())
                .then_some(PreviewHeader { name, contacts })
        });

        if header.is_none() && sections.is_empty() {
            return Self::empty();
        }
        Self {
            is_empty: false,
            header,
            sections,
        }
    }

    fn empty() -> Self {
        Self {
            is_empty: true,
            header: None,
            sections: Vec::new(),
        }
    }
}

fn text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Prefixes `https://` unless the link already carries an http(s) scheme.
fn absolute_url(link: &str) -> String {
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        link.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        link.to_string()
    } else {
        format!("https://{link}")
    }
}

/// A job with no end date is current.
fn open_ended_range(start: &str, end: Option<&str>) -> Option<String> {
    match (text(Some(start)), text(end)) {
        (Some(start), Some(end)) => Some(format!("{start} - {end}")),
        (Some(start), None) => Some(format!("{start} - Present")),
        (None, end) => end,
    }
}

fn range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (text(start), text(end)) {
        (Some(start), Some(end)) => Some(format!("{start} - {end}")),
        (one, None) | (None, one) => one,
    }
}

fn entry(
    heading: &str,
    subheading: Option<&str>,
    dates: Option<String>,
    link: Option<&str>,
    description: Option<&str>,
) -> Option<PreviewEntry> {
    let entry = PreviewEntry {
        heading: text(Some(heading)),
        subheading: text(subheading),
        dates,
        link: text(link).map(|l| absolute_url(&l)),
        description: text(description),
    };
    let blank = entry.heading.is_none()
        && entry.subheading.is_none()
        && entry.dates.is_none()
        && entry.link.is_none()
        && entry.description.is_none();
    (!blank).then_some(entry)
}

fn push_section(sections: &mut Vec<PreviewSection>, kind: SectionKind, body: SectionBody) {
    sections.push(PreviewSection {
        kind,
        title: kind.title(),
        body,
    });
}

fn push_entries(sections: &mut Vec<PreviewSection>, kind: SectionKind, entries: Vec<PreviewEntry>) {
    if !entries.is_empty() {
        push_section(sections, kind, SectionBody::Entries { entries });
    }
}

fn push_items(sections: &mut Vec<PreviewSection>, kind: SectionKind, items: &[String], tags: bool) {
    let items: Vec<String> = items.iter().filter_map(|i| text(Some(i.as_str()))).collect();
    if items.is_empty() {
        return;
    }
    let body = if tags {
        SectionBody::Tags { items }
    } else {
        SectionBody::List { items }
    };
    push_section(sections, kind, body);
}

// ────────────────────────────────────────────────────────────────────────────
// Printable HTML
// ────────────────────────────────────────────────────────────────────────────

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.5; color: #222; max-width: 820px; margin: 0 auto; padding: 32px; }
        header { text-align: center; margin-bottom: 24px; }
        header h1 { margin: 0; font-size: 2em; }
        .contacts { display: flex; flex-wrap: wrap; justify-content: center; gap: 16px; margin-top: 8px; color: #555; font-size: 0.9em; }
        .contacts a { color: inherit; }
        section { margin-bottom: 20px; }
        section h2 { font-size: 1.2em; border-bottom: 1px solid #ccc; padding-bottom: 4px; }
        .entry { margin-bottom: 12px; }
        .entry h3 { margin: 0; font-size: 1.05em; }
        .subheading { font-weight: 600; }
        .dates { font-size: 0.8em; text-transform: uppercase; color: #666; }
        .description { white-space: pre-line; margin: 4px 0 0; }
        .tags { display: flex; flex-wrap: wrap; gap: 8px; list-style: none; padding: 0; }
        .tags li { border: 1px solid #ccc; border-radius: 12px; padding: 2px 10px; font-size: 0.9em; }
        .empty { text-align: center; color: #777; }
        @media print { body { padding: 0; } @page { margin: 0.75in; } }
    </style>
</head>
<body>
{% if preview.is_empty %}
    <p class="empty">{{ empty_message }}</p>
{% else %}
    {% match preview.header %}
    {% when Some with (header) %}
    <header>
        {% match header.name %}{% when Some with (name) %}<h1>{{ name }}</h1>{% when None %}{% endmatch %}
        <div class="contacts">
        {% for contact in header.contacts %}
            {% match contact.href %}
            {% when Some with (href) %}<a href="{{ href }}">{{ contact.label }}</a>
            {% when None %}<span>{{ contact.label }}</span>
            {% endmatch %}
        {% endfor %}
        </div>
    </header>
    {% when None %}
    {% endmatch %}
    {% for section in preview.sections %}
    <section>
        <h2>{{ section.title }}</h2>
        {% match section.body %}
        {% when SectionBody::Paragraph with { text } %}
        <p class="description">{{ text }}</p>
        {% when SectionBody::Entries with { entries } %}
        {% for entry in entries %}
        <div class="entry">
            {% match entry.heading %}{% when Some with (heading) %}<h3>{{ heading }}</h3>{% when None %}{% endmatch %}
            {% match entry.subheading %}{% when Some with (subheading) %}<div class="subheading">{{ subheading }}</div>{% when None %}{% endmatch %}
            {% match entry.dates %}{% when Some with (dates) %}<div class="dates">{{ dates }}</div>{% when None %}{% endmatch %}
            {% match entry.link %}{% when Some with (link) %}<div><a href="{{ link }}">{{ link }}</a></div>{% when None %}{% endmatch %}
            {% match entry.description %}{% when Some with (description) %}<p class="description">{{ description }}</p>{% when None %}{% endmatch %}
        </div>
        {% endfor %}
        {% when SectionBody::Tags with { items } %}
        <ul class="tags">{% for item in items %}<li>{{ item }}</li>{% endfor %}</ul>
        {% when SectionBody::List with { items } %}
        <ul>{% for item in items %}<li>{{ item }}</li>{% endfor %}</ul>
        {% endmatch %}
    </section>
    {% endfor %}
{% endif %}
</body>
</html>"#,
    ext = "html"
)]
struct PrintableTemplate<'a> {
    title: String,
    empty_message: &'a str,
    preview: &'a ResumePreview,
}

/// Standalone HTML page for the client's print-to-PDF. All text is escaped.
pub fn render_printable_html(preview: &ResumePreview) -> Result<String, askama::Error> {
    let title = preview
        .header
        .as_ref()
        .and_then(|h| h.name.as_deref())
        .map(|name| format!("{name} - Resume"))
        .unwrap_or_else(|| "Resume".to_string());

    PrintableTemplate {
        title,
        empty_message: EMPTY_PREVIEW_MESSAGE,
        preview,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Certification, Education, Experience, PersonalDetails, Project};

    fn manual_document() -> ResumeDocument {
        ResumeDocument {
            personal_details: Some(PersonalDetails {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "(123) 456-7890".to_string(),
                linkedin: Some("linkedin.com/in/janedoe".to_string()),
            }),
            summary: Some("Systems engineer.".to_string()),
            experience: vec![Experience {
                title: "Software Engineer".to_string(),
                company: "Tech Solutions Inc.".to_string(),
                start_date: "Jan 2020".to_string(),
                end_date: None,
                description: "Built the billing pipeline.".to_string(),
            }],
            education: vec![Education {
                institution: "University of Example".to_string(),
                degree: "B.S. in Computer Science".to_string(),
                start_date: "Aug 2016".to_string(),
                end_date: "May 2020".to_string(),
                description: None,
            }],
            skills: vec!["Rust".to_string(), " ".to_string(), "SQL".to_string()],
            projects: vec![],
            certifications: vec![],
            achievements: vec![],
            hobbies: vec!["Hiking".to_string()],
        }
    }

    fn section<'a>(preview: &'a ResumePreview, kind: SectionKind) -> Option<&'a PreviewSection> {
        preview.sections.iter().find(|s| s.kind == kind)
    }

    #[test]
    fn test_blank_document_is_empty_state() {
        let preview = ResumePreview::from_document(&ResumeDocument::default());
        assert!(preview.is_empty);
        assert!(preview.header.is_none());
        assert!(preview.sections.is_empty());
    }

    #[test]
    fn test_manual_document_renders_non_empty_fields_and_omits_empty_sections() {
        let preview = ResumePreview::from_document(&manual_document());
        assert!(!preview.is_empty);

        let kinds: Vec<_> = preview.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Summary,
                SectionKind::Experience,
                SectionKind::Education,
                SectionKind::Skills,
                SectionKind::Hobbies,
            ]
        );

        let header = preview.header.as_ref().unwrap();
        assert_eq!(header.name.as_deref(), Some("Jane Doe"));
        assert_eq!(header.contacts.len(), 3);
        assert_eq!(header.contacts[0].href.as_deref(), Some("mailto:jane@example.com"));
        assert_eq!(
            header.contacts[2].href.as_deref(),
            Some("https://linkedin.com/in/janedoe")
        );

        match &section(&preview, SectionKind::Experience).unwrap().body {
            SectionBody::Entries { entries } => {
                assert_eq!(entries[0].heading.as_deref(), Some("Software Engineer"));
                assert_eq!(entries[0].subheading.as_deref(), Some("Tech Solutions Inc."));
                assert_eq!(entries[0].dates.as_deref(), Some("Jan 2020 - Present"));
            }
            other => panic!("unexpected body: {other:?}"),
        }

        match &section(&preview, SectionKind::Education).unwrap().body {
            SectionBody::Entries { entries } => {
                assert_eq!(entries[0].heading.as_deref(), Some("B.S. in Computer Science"));
                assert_eq!(entries[0].dates.as_deref(), Some("Aug 2016 - May 2020"));
                assert_eq!(entries[0].description, None);
            }
            other => panic!("unexpected body: {other:?}"),
        }

        assert_eq!(
            section(&preview, SectionKind::Skills).unwrap().body,
            SectionBody::Tags {
                items: vec!["Rust".to_string(), "SQL".to_string()]
            }
        );
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let doc = ResumeDocument {
            skills: vec!["Rust".to_string()],
            experience: vec![Experience::default()],
            projects: vec![Project {
                title: "Portfolio".to_string(),
                link: Some("github.com/jane/site".to_string()),
                start_date: None,
                end_date: Some("2023".to_string()),
                description: String::new(),
            }],
            certifications: vec![Certification::default()],
            ..Default::default()
        };
        let preview = ResumePreview::from_document(&doc);
        assert!(section(&preview, SectionKind::Experience).is_none());
        assert!(section(&preview, SectionKind::Certifications).is_none());
        assert!(preview.header.is_none());

        match &section(&preview, SectionKind::Projects).unwrap().body {
            SectionBody::Entries { entries } => {
                assert_eq!(entries[0].link.as_deref(), Some("https://github.com/jane/site"));
                assert_eq!(entries[0].dates.as_deref(), Some("2023"));
                assert_eq!(entries[0].description, None);
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn test_document_with_only_empty_rows_is_empty_state() {
        let doc = ResumeDocument {
            personal_details: Some(PersonalDetails::default()),
            experience: vec![Experience::default()],
            education: vec![Education::default()],
            ..Default::default()
        };
        let preview = ResumePreview::from_document(&doc);
        assert!(preview.is_empty);
        assert!(preview.header.is_none());
        assert!(preview.sections.is_empty());

        let html = render_printable_html(&preview).unwrap();
        assert!(html.contains(EMPTY_PREVIEW_MESSAGE));
    }

    #[test]
    fn test_preview_json_is_camel_case() {
        let value = serde_json::to_value(ResumePreview::from_document(&manual_document())).unwrap();
        assert_eq!(value["isEmpty"], false);
        assert!(value.get("is_empty").is_none());
        assert_eq!(value["sections"][1]["body"]["type"], "entries");
    }

    #[test]
    fn test_absolute_url_keeps_any_case_scheme() {
        assert_eq!(
            absolute_url("HTTPS://linkedin.com/in/x"),
            "HTTPS://linkedin.com/in/x"
        );
        assert_eq!(absolute_url("Http://example.com"), "Http://example.com");
        assert_eq!(absolute_url("linkedin.com/in/x"), "https://linkedin.com/in/x");
        assert_eq!(absolute_url("http"), "https://http");
    }

    #[test]
    fn test_date_ranges() {
        assert_eq!(open_ended_range("2020", Some("2022")).as_deref(), Some("2020 - 2022"));
        assert_eq!(open_ended_range("", None), None);
        assert_eq!(range(Some("2020"), None).as_deref(), Some("2020"));
        assert_eq!(range(None, Some(" ")), None);
    }

    #[test]
    fn test_printable_html_contains_content_and_escapes() {
        let mut doc = manual_document();
        doc.summary = Some("<script>alert(1)</script>".to_string());
        let html = render_printable_html(&ResumePreview::from_document(&doc)).unwrap();

        assert!(html.contains("<title>Jane Doe - Resume</title>"));
        assert!(html.contains("Work Experience"));
        assert!(html.contains("Jan 2020 - Present"));
        assert!(html.contains("mailto:jane@example.com"));
        assert!(html.contains("<li>Hiking</li>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("Certifications"));
    }

    #[test]
    fn test_printable_html_empty_state() {
        let html =
            render_printable_html(&ResumePreview::from_document(&ResumeDocument::default())).unwrap();
        assert!(html.contains(EMPTY_PREVIEW_MESSAGE));
        assert!(html.contains("<title>Resume</title>"));
    }
}
