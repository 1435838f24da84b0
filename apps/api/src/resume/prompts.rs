// Resume extraction prompt templates.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub fn extraction_system() -> String {
    format!(
        "You are an expert resume parser. {JSON_ONLY_SYSTEM} \
         Extract only what the resume states. Never invent employers, dates, or contact details."
    )
}

pub const EXTRACTION_PROMPT: &str = r#"Extract the resume in the attached document into a JSON object.
Prioritize extracting as much information as possible. If a field is not present in the
resume, omit it (for lists, return an empty array).

OUTPUT SCHEMA (return exactly this structure):
{
  "personalDetails": {"name": "string", "email": "string", "phone": "string", "linkedin": "string (optional)"},
  "summary": "string (optional professional summary or objective)",
  "experience": [
    {"title": "string", "company": "string", "startDate": "string", "endDate": "string (omit if current)", "description": "string"}
  ],
  "education": [
    {"institution": "string", "degree": "string", "startDate": "string", "endDate": "string", "description": "string (optional)"}
  ],
  "skills": ["string"],
  "projects": [
    {"title": "string", "link": "string (optional)", "startDate": "string (optional)", "endDate": "string (optional)", "description": "string (technologies used and role)"}
  ],
  "certifications": [
    {"title": "string", "link": "string (optional)", "startDate": "string (issue date, optional)", "endDate": "string (expiry, optional)", "description": "string (optional)"}
  ],
  "achievements": ["string"],
  "hobbies": ["string"]
}

RULES:
1. Keep entries in the order they appear in the resume.
2. Copy dates as written ("Jan 2020", "2020-01", "Present"); do not reformat them.
3. Skills, achievements and hobbies are arrays of plain strings.
4. Return ONLY the JSON object. No prose, no code fences."#;
