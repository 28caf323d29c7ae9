
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use tracing::debug;

use crate::profile::{ProfileRecord, ProfileSource};

/// Represents one self-contained unit of retrievable profile knowledge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Stable identifier, unique within one preparation pass
    pub id: String,
    /// Prose that gets embedded and shown to the downstream model
    pub content: String,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub category: Category,
    /// Human-readable provenance, e.g. the company or project name
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Profile,
    Education,
    Skills,
    Experience,
    Projects,
    Achievements,
    Interests,
    Contact,
}

impl fmt::Display for Category {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Profile => "profile",
            Self::Education => "education",
            Self::Skills => "skills",
            Self::Experience => "experience",
            Self::Projects => "projects",
            Self::Achievements => "achievements",
            Self::Interests => "interests",
            Self::Contact => "contact",
        };
        f.write_str(name)
    }
}

impl DocumentChunk {
    #[inline]
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        category: Category,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: ChunkMetadata {
                category,
                source: source.into(),
            },
        }
    }
}

/// Anything that can produce the document set for an index build.
///
/// Called once per build, so implementations should re-read their backing data
/// each time rather than caching it.
pub trait DocumentSource: Send + Sync {
    fn load_documents(&self) -> crate::Result<Vec<DocumentChunk>>;
}

impl DocumentSource for ProfileSource {
    #[inline]
    fn load_documents(&self) -> crate::Result<Vec<DocumentChunk>> {
        let profile = self.load()?;
        Ok(prepare_documents(&profile))
    }
}

/// Split a profile into one chunk per logical section.
///
/// Sections without data are skipped so that every chunk stays readable prose.
#[inline]
pub fn prepare_documents(profile: &ProfileRecord) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    let owner = profile.first_name();

    chunks.push(basic_info_chunk(profile));

    if let Some(education) = profile
        .education
        .as_ref()
        .filter(|education| !education.degree.trim().is_empty())
    {
        let mut content = format!("Education: {}", education.degree.trim());
        if !education.institution.trim().is_empty() {
            content.push_str(" from ");
            content.push_str(education.institution.trim());
        }
        if !education.duration.trim().is_empty() {
            let _ = write!(content, " ({})", education.duration.trim());
        }
        content.push('.');
        if let Some(gpa) = education.gpa.as_deref().filter(|gpa| !gpa.trim().is_empty()) {
            let _ = write!(content, " GPA: {}.", gpa.trim());
        }
        if !education.highlights.is_empty() {
            let _ = write!(
                content,
                " Highlights: {}.",
                join_sentences(&education.highlights)
            );
        }
        chunks.push(DocumentChunk::new(
            "education",
            content,
            Category::Education,
            "education-details",
        ));
    }

    let skills = &profile.skills;
    let skill_sections = [
        (
            "skills-languages",
            "programming-languages",
            &skills.languages,
            format!("These are the programming languages {owner} is proficient in."),
            "Programming Languages",
        ),
        (
            "skills-frontend",
            "frontend-stack",
            &skills.frontend,
            format!(
                "These are the frontend frameworks and tools {owner} uses for building user interfaces."
            ),
            "Frontend Technologies",
        ),
        (
            "skills-backend",
            "backend-stack",
            &skills.backend,
            format!(
                "These are the backend frameworks, databases and cloud platforms {owner} works with."
            ),
            "Backend Technologies",
        ),
        (
            "skills-ai",
            "ai-ml",
            &skills.ai_ml,
            format!("{owner} has experience with these AI, machine learning and data tools."),
            "AI/ML Technologies",
        ),
    ];

    for (id, source, items, sentence, label) in skill_sections {
        if items.is_empty() {
            continue;
        }
        chunks.push(DocumentChunk::new(
            id,
            format!("{label}: {}. {sentence}", items.join(", ")),
            Category::Skills,
            source,
        ));
    }

    if !skills.tools.is_empty() || !skills.soft_skills.is_empty() {
        let mut parts = Vec::new();
        if !skills.tools.is_empty() {
            parts.push(format!("Development Tools: {}.", skills.tools.join(", ")));
        }
        if !skills.soft_skills.is_empty() {
            parts.push(format!("Soft Skills: {}.", skills.soft_skills.join(", ")));
        }
        chunks.push(DocumentChunk::new(
            "skills-tools",
            parts.join(" "),
            Category::Skills,
            "tools-and-soft-skills",
        ));
    }

    for (index, exp) in profile.experience.iter().enumerate() {
        let mut content = format!(
            "Work Experience: {} at {}",
            exp.role.trim(),
            exp.company.trim()
        );
        if !exp.duration.trim().is_empty() {
            let _ = write!(content, " ({})", exp.duration.trim());
        }
        content.push('.');
        if !exp.description.trim().is_empty() {
            content.push(' ');
            content.push_str(exp.description.trim());
        }
        chunks.push(DocumentChunk::new(
            format!("experience-{index}"),
            content,
            Category::Experience,
            exp.company.trim(),
        ));
    }

    for (index, project) in profile.projects.iter().enumerate() {
        let mut content = format!("Project: {}.", project.name.trim());
        if let Some(duration) = project
            .duration
            .as_deref()
            .filter(|duration| !duration.trim().is_empty())
        {
            let _ = write!(content, " Timeline: {}.", duration.trim());
        }
        if !project.description.trim().is_empty() {
            content.push(' ');
            content.push_str(project.description.trim());
        }
        if !project.technologies.is_empty() {
            let _ = write!(
                content,
                " Technologies used: {}.",
                project.technologies.join(", ")
            );
        }
        chunks.push(DocumentChunk::new(
            format!("project-{index}"),
            content,
            Category::Projects,
            project.name.trim(),
        ));
    }

    if !profile.achievements.is_empty() {
        chunks.push(DocumentChunk::new(
            "achievements",
            format!(
                "Achievements and Certifications: {}.",
                join_sentences(&profile.achievements)
            ),
            Category::Achievements,
            "achievements-list",
        ));
    }

    if !profile.interests.is_empty() {
        chunks.push(DocumentChunk::new(
            "interests",
            format!(
                "Interests and Hobbies: {}. These are the areas {owner} is passionate about.",
                profile.interests.join(", ")
            ),
            Category::Interests,
            "interests-list",
        ));
    }

    if let Some(contact) = contact_chunk(profile) {
        chunks.push(contact);
    }

    debug!(
        "Prepared {} document chunks for profile '{}'",
        chunks.len(),
        profile.name
    );

    chunks
}

fn basic_info_chunk(profile: &ProfileRecord) -> DocumentChunk {
    let mut content = format!("Name: {}.", profile.name.trim());
    for (label, value) in [
        ("Title", &profile.title),
        ("Bio", &profile.bio),
        ("Location", &profile.location),
    ] {
        let value = value.trim().trim_end_matches('.');
        if !value.is_empty() {
            let _ = write!(content, " {label}: {value}.");
        }
    }
    DocumentChunk::new("profile-basic", content, Category::Profile, "basic-info")
}

fn contact_chunk(profile: &ProfileRecord) -> Option<DocumentChunk> {
    let social = &profile.social;
    let entries: Vec<String> = [
        ("GitHub", social.github.as_deref()),
        ("LinkedIn", social.linkedin.as_deref()),
        ("Twitter", social.twitter.as_deref()),
        ("Website", social.website.as_deref()),
        ("Email", profile.email.as_deref()),
        ("Phone", profile.phone.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| format!("{label}: {value}"))
    })
    .collect();

    if entries.is_empty() {
        return None;
    }

    Some(DocumentChunk::new(
        "contact",
        format!("Contact and Social Links: {}.", entries.join(", ")),
        Category::Contact,
        "social-links",
    ))
}

/// Join list items as sentences without doubling up trailing periods
fn join_sentences(items: &[String]) -> String {
    items
        .iter()
        .map(|item| item.trim().trim_end_matches('.'))
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}
