//! Skill classifier — buckets a free-text skill list into technology categories
//! and soft skills using static keyword tables.
//!
//! Category order is part of the contract: a token that matches several technology
//! tables lands only in the first one declared in `TECH_CATEGORIES`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::screening::validators::ValidationFailure;

const MIN_DISTINCT_SKILLS: usize = 3;

/// Declaration order doubles as the `Ord` used for display and tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Languages,
    Frameworks,
    Databases,
    Tools,
    Cloud,
    SoftSkills,
    Other,
}

impl SkillCategory {
    pub fn is_technical(self) -> bool {
        self != SkillCategory::SoftSkills
    }
}

const TECH_CATEGORIES: &[(SkillCategory, &[&str])] = &[
    (
        SkillCategory::Languages,
        &[
            "python",
            "javascript",
            "java",
            "c++",
            "c#",
            "go",
            "golang",
            "rust",
            "php",
            "ruby",
            "swift",
            "kotlin",
            "typescript",
            "scala",
            "r",
            "matlab",
        ],
    ),
    (
        SkillCategory::Frameworks,
        &[
            "react", "angular", "vue", "django", "flask", "fastapi", "spring", "express", "node",
            "laravel", "rails", "asp.net", "nextjs", "nuxt",
        ],
    ),
    (
        SkillCategory::Databases,
        &[
            "mysql",
            "postgresql",
            "mongodb",
            "redis",
            "elasticsearch",
            "sqlite",
            "oracle",
            "cassandra",
            "dynamodb",
            "firebase",
        ],
    ),
    (
        SkillCategory::Tools,
        &[
            "docker",
            "kubernetes",
            "git",
            "jenkins",
            "aws",
            "azure",
            "gcp",
            "terraform",
            "ansible",
            "webpack",
            "npm",
            "maven",
            "gradle",
        ],
    ),
    (
        SkillCategory::Cloud,
        &[
            "aws",
            "azure",
            "gcp",
            "heroku",
            "vercel",
            "netlify",
            "digitalocean",
        ],
    ),
];

const SOFT_SKILL_KEYWORDS: &[&str] = &[
    "communication",
    "teamwork",
    "leadership",
    "problem solving",
    "critical thinking",
    "adaptability",
    "time management",
    "creativity",
    "collaboration",
    "analytical",
    "interpersonal",
    "presentation",
    "negotiation",
    "mentoring",
    "training",
    "documentation",
    "project management",
    "agile",
    "scrum",
    "kanban",
];

/// Keywords this short only match a whole word, otherwise "r" would claim "docker".
const SHORT_KEYWORD_LEN: usize = 2;

/// Category → skills, in input order within each category. Empty categories are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassifiedSkills(BTreeMap<SkillCategory, Vec<String>>);

impl ClassifiedSkills {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, category: SkillCategory) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every non-soft skill, category by category.
    pub fn technical(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(category, _)| category.is_technical())
            .flat_map(|(_, skills)| skills.iter().map(String::as_str))
    }

    pub fn technical_count(&self) -> usize {
        self.technical().count()
    }

    pub fn soft_skills(&self) -> &[String] {
        self.get(SkillCategory::SoftSkills)
    }

    fn push(&mut self, category: SkillCategory, skill: String) {
        let bucket = self.0.entry(category).or_default();
        if !bucket.contains(&skill) {
            bucket.push(skill);
        }
    }
}

/// Splits on `,` `;` `|` and newlines, lower-cases, trims, and drops empties.
pub fn tokenize_skills(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split([',', ';', '|', '\n', '\r'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_soft_skill(token: &str) -> bool {
    let normalized = token.replace(['-', '_'], " ");
    SOFT_SKILL_KEYWORDS
        .iter()
        .any(|keyword| normalized.contains(keyword))
}

fn keyword_matches(keyword: &str, token: &str) -> bool {
    if keyword.len() <= SHORT_KEYWORD_LEN {
        return token
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .any(|word| word == keyword);
    }
    token.contains(keyword) || (token.len() > SHORT_KEYWORD_LEN && keyword.contains(token))
}

/// First technology table (in declared order) with a keyword matching the token.
fn tech_category(token: &str) -> Option<SkillCategory> {
    TECH_CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| keyword_matches(k, token)))
        .map(|(category, _)| *category)
}

/// Classifies a raw skill list. Fails when fewer than three distinct skills are given.
pub fn classify_skills(raw: &str) -> Result<ClassifiedSkills, ValidationFailure> {
    if raw.trim().is_empty() {
        return Err(ValidationFailure::SkillsRequired);
    }

    let mut distinct: Vec<String> = Vec::new();
    for token in tokenize_skills(raw) {
        if !distinct.contains(&token) {
            distinct.push(token);
        }
    }

    if distinct.len() < MIN_DISTINCT_SKILLS {
        return Err(ValidationFailure::TooFewSkills);
    }

    let mut classified = ClassifiedSkills::default();
    for token in distinct {
        let category = if is_soft_skill(&token) {
            SkillCategory::SoftSkills
        } else {
            tech_category(&token).unwrap_or(SkillCategory::Other)
        };
        classified.push(category, token);
    }

    Ok(classified)
}
