use serde::{Deserialize, Serialize};

/// Contact block at the top of a resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start_date: String,
    /// `None` means the position is current.
    #[serde(default)]
    pub end_date: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    /// Issue date.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Expiry date.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The canonical structured resume shared by the form, the extractor and the preview.
///
/// Sequences keep resume order and are always serialized, empty or not.
/// Dates are free-form text ("Jan 2020", "2020-01", "Present").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal_details: Option<PersonalDetails>,
    pub summary: Option<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub achievements: Vec<String>,
    pub hobbies: Vec<String>,
}

impl PersonalDetails {
    pub fn is_blank(&self) -> bool {
        blank(&self.name) && blank(&self.email) && blank(&self.phone) && blank_opt(&self.linkedin)
    }
}

impl Experience {
    pub fn is_blank(&self) -> bool {
        blank(&self.title)
            && blank(&self.company)
            && blank(&self.start_date)
            && blank_opt(&self.end_date)
            && blank(&self.description)
    }
}

impl Education {
    pub fn is_blank(&self) -> bool {
        blank(&self.institution)
            && blank(&self.degree)
            && blank(&self.start_date)
            && blank(&self.end_date)
            && blank_opt(&self.description)
    }
}

impl Project {
    pub fn is_blank(&self) -> bool {
        blank(&self.title)
            && blank_opt(&self.link)
            && blank_opt(&self.start_date)
            && blank_opt(&self.end_date)
            && blank(&self.description)
    }
}

impl Certification {
    pub fn is_blank(&self) -> bool {
        blank(&self.title)
            && blank_opt(&self.link)
            && blank_opt(&self.start_date)
            && blank_opt(&self.end_date)
            && blank_opt(&self.description)
    }
}

impl ResumeDocument {
    /// True when no field carries any non-blank text. Empty rows added to the
    /// form count as blank.
    pub fn is_blank(&self) -> bool {
        self.personal_details.as_ref().map_or(true, PersonalDetails::is_blank)
            && blank_opt(&self.summary)
            && self.experience.iter().all(Experience::is_blank)
            && self.education.iter().all(Education::is_blank)
            && self.projects.iter().all(Project::is_blank)
            && self.certifications.iter().all(Certification::is_blank)
            && self.skills.iter().all(|s| blank(s))
            && self.achievements.iter().all(|s| blank(s))
            && self.hobbies.iter().all(|s| blank(s))
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn blank_opt(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, blank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_serializes_every_section() {
        let value = serde_json::to_value(ResumeDocument::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "personalDetails": null,
                "summary": null,
                "experience": [],
                "education": [],
                "skills": [],
                "projects": [],
                "certifications": [],
                "achievements": [],
                "hobbies": []
            })
        );
    }

    #[test]
    fn test_missing_top_level_fields_default() {
        let doc: ResumeDocument = serde_json::from_str(r#"{"skills": ["Rust"]}"#).unwrap();
        assert_eq!(doc.skills, vec!["Rust"]);
        assert!(doc.education.is_empty());
        assert!(doc.personal_details.is_none());
    }

    #[test]
    fn test_entry_requires_its_sub_fields() {
        let result = serde_json::from_str::<ResumeDocument>(
            r#"{"experience": [{"title": "Engineer", "company": "Acme"}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_experience_end_date_optional() {
        let doc: ResumeDocument = serde_json::from_str(
            r#"{"experience": [{"title": "Engineer", "company": "Acme", "startDate": "Jan 2020", "description": "Built things"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.experience[0].start_date, "Jan 2020");
        assert_eq!(doc.experience[0].end_date, None);
    }

    #[test]
    fn test_is_blank() {
        assert!(ResumeDocument::default().is_blank());

        let empty_details = ResumeDocument {
            personal_details: Some(PersonalDetails::default()),
            summary: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(empty_details.is_blank());

        let with_hobby = ResumeDocument {
            hobbies: vec!["Hiking".to_string()],
            ..Default::default()
        };
        assert!(!with_hobby.is_blank());
    }

    #[test]
    fn test_empty_form_rows_are_blank() {
        let rows = ResumeDocument {
            experience: vec![Experience::default()],
            education: vec![Education {
                description: Some(" ".to_string()),
                ..Default::default()
            }],
            projects: vec![Project::default()],
            certifications: vec![Certification::default()],
            ..Default::default()
        };
        assert!(rows.is_blank());

        let started = ResumeDocument {
            experience: vec![
                Experience::default(),
                Experience {
                    company: "Acme".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert!(!started.is_blank());
    }
}
