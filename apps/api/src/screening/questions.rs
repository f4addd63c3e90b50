//! Question Source — pluggable, trait-based generator of technical assessment questions.
//!
//! Default without an API key: `StaticQuestionBank` (deterministic, no network).
//! With a key: `GenerativeQuestionSource`, which asks the LLM first and falls back
//! to the static bank on any failure.
//!
//! `AppState` holds an `Arc<dyn QuestionSource>`, chosen at startup from config.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::llm_client::prompts::format_chat_prompt;
use crate::llm_client::{LlmError, TextGenerator};
use crate::screening::models::CandidateProfile;
use crate::screening::prompts::{QUESTION_GENERATION_SYSTEM, QUESTION_GENERATION_TEMPLATE};

pub const MAX_QUESTIONS: usize = 5;
const MIN_PREFIXED_QUESTION_CHARS: usize = 10;
const MIN_SENTENCE_QUESTION_CHARS: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Experience tiers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceTier {
    Beginner,
    Intermediate,
    Senior,
}

impl ExperienceTier {
    /// beginner < 3 years, intermediate 3–5, senior 6+
    pub fn from_years(years: u32) -> Self {
        match years {
            0..=2 => ExperienceTier::Beginner,
            3..=5 => ExperienceTier::Intermediate,
            _ => ExperienceTier::Senior,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceTier::Beginner => "beginner",
            ExperienceTier::Intermediate => "intermediate",
            ExperienceTier::Senior => "senior",
        }
    }

    fn fallback_questions(self) -> [&'static str; 2] {
        match self {
            ExperienceTier::Beginner => [
                "Can you explain the difference between a variable and a constant in programming?",
                "What is version control and why is it important in software development?",
            ],
            ExperienceTier::Intermediate => [
                "Can you describe your approach to debugging complex issues in production?",
                "How do you ensure code quality and maintainability in your projects?",
            ],
            ExperienceTier::Senior => [
                "How do you approach system design for scalable applications?",
                "Can you discuss a challenging technical problem you solved and your approach?",
            ],
        }
    }
}

/// Technology questions, asked in this order when any keyword appears in the skill text.
const TECH_QUESTIONS: &[(&[&str], &str)] = &[
    (
        &["python"],
        "What are Python decorators and how have you used them in your projects?",
    ),
    (
        &["javascript", "react", "node"],
        "Can you explain the concept of asynchronous programming in JavaScript?",
    ),
    (
        &["django", "flask"],
        "How do you handle database migrations in Django/Flask applications?",
    ),
    (
        &["sql", "database", "postgresql", "mysql"],
        "How would you optimize a slow database query?",
    ),
    (
        &["docker", "kubernetes"],
        "Can you explain the benefits of containerization in your development workflow?",
    ),
];

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Produces 0–5 questions for a candidate. Implementations must never fail:
/// a source that cannot produce anything returns an empty list.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, profile: &CandidateProfile) -> Vec<String>;
}

// ────────────────────────────────────────────────────────────────────────────
// StaticQuestionBank — deterministic fallback
// ────────────────────────────────────────────────────────────────────────────

/// Two tier questions followed by technology questions, capped at five.
pub struct StaticQuestionBank;

impl StaticQuestionBank {
    pub fn questions_for(skills_text: &str, years: u32) -> Vec<String> {
        let skills_lower = skills_text.to_lowercase();

        ExperienceTier::from_years(years)
            .fallback_questions()
            .into_iter()
            .chain(
                TECH_QUESTIONS
                    .iter()
                    .filter(|(keywords, _)| keywords.iter().any(|k| skills_lower.contains(k)))
                    .map(|(_, question)| *question),
            )
            .take(MAX_QUESTIONS)
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionBank {
    async fn generate(&self, profile: &CandidateProfile) -> Vec<String> {
        Self::questions_for(
            profile.raw_skills_text.as_deref().unwrap_or_default(),
            profile.experience_years.unwrap_or_default(),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GenerativeQuestionSource — LLM first, static bank on failure
// ────────────────────────────────────────────────────────────────────────────

/// What came back from one attempt at the generative service.
/// Only this module ever looks at the difference between the failure kinds.
#[derive(Debug)]
pub enum GenerationOutcome {
    Generated(Vec<String>),
    TimedOut,
    ServiceError(LlmError),
}

pub struct GenerativeQuestionSource {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl GenerativeQuestionSource {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// One bounded call to the generator, with the response parsed into questions.
    pub async fn attempt(&self, profile: &CandidateProfile) -> GenerationOutcome {
        let prompt = build_question_prompt(profile);

        match tokio::time::timeout(self.timeout, self.generator.generate_text(&prompt)).await {
            Err(_) => GenerationOutcome::TimedOut,
            Ok(Err(LlmError::Timeout)) => GenerationOutcome::TimedOut,
            Ok(Err(e)) => GenerationOutcome::ServiceError(e),
            Ok(Ok(text)) => GenerationOutcome::Generated(parse_questions(&text)),
        }
    }
}

#[async_trait]
impl QuestionSource for GenerativeQuestionSource {
    async fn generate(&self, profile: &CandidateProfile) -> Vec<String> {
        match self.attempt(profile).await {
            GenerationOutcome::Generated(questions) if !questions.is_empty() => {
                debug!("LLM produced {} questions", questions.len());
                return questions;
            }
            GenerationOutcome::Generated(_) => {
                warn!("LLM response contained no usable questions, using fallback bank");
            }
            GenerationOutcome::TimedOut => {
                warn!(
                    "Question generation timed out after {}s, using fallback bank",
                    self.timeout.as_secs()
                );
            }
            GenerationOutcome::ServiceError(e) => {
                warn!("Question generation failed: {e}, using fallback bank");
            }
        }

        StaticQuestionBank.generate(profile).await
    }
}

fn build_question_prompt(profile: &CandidateProfile) -> String {
    let years = profile.experience_years.unwrap_or_default();
    let user = QUESTION_GENERATION_TEMPLATE
        .replace("{tier}", ExperienceTier::from_years(years).as_str())
        .replace("{years}", &years.to_string())
        .replace(
            "{tech_stack}",
            profile.raw_skills_text.as_deref().unwrap_or_default(),
        );
    format_chat_prompt(QUESTION_GENERATION_SYSTEM, &user)
}

fn question_sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^.!?]*\?").expect("question pattern is valid"))
}

/// Extracts questions from free model output.
///
/// 1. Lines starting with `Q:` or `Question`, enumeration stripped, longer than 10 chars.
/// 2. Otherwise, `?`-terminated sentences longer than 20 chars.
///
/// Both paths are capped at five.
pub fn parse_questions(text: &str) -> Vec<String> {
    let prefixed: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix("Q:")
                .or_else(|| line.strip_prefix("Question"))
        })
        .map(|rest| {
            rest.trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ':' | ')' | ' '))
                .trim()
        })
        .filter(|q| q.chars().count() > MIN_PREFIXED_QUESTION_CHARS)
        .take(MAX_QUESTIONS)
        .map(str::to_string)
        .collect();

    if !prefixed.is_empty() {
        return prefixed;
    }

    question_sentence_pattern()
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|q| q.chars().count() > MIN_SENTENCE_QUESTION_CHARS)
        .take(MAX_QUESTIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(120)).await;
            Ok("Q: What is the meaning of a slow response?".to_string())
        }
    }

    struct PromptEcho;

    #[async_trait]
    impl TextGenerator for PromptEcho {
        async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
            Ok(format!("Q: {}", prompt.replace('\n', " ")))
        }
    }

    fn profile(skills: &str, years: u32) -> CandidateProfile {
        CandidateProfile {
            raw_skills_text: Some(skills.to_string()),
            experience_years: Some(years),
            ..Default::default()
        }
    }

    fn source(generator: impl TextGenerator + 'static) -> GenerativeQuestionSource {
        GenerativeQuestionSource::new(Arc::new(generator), Duration::from_secs(30))
    }

    #[test]
    fn test_experience_tier_boundaries() {
        assert_eq!(ExperienceTier::from_years(0), ExperienceTier::Beginner);
        assert_eq!(ExperienceTier::from_years(2), ExperienceTier::Beginner);
        assert_eq!(ExperienceTier::from_years(3), ExperienceTier::Intermediate);
        assert_eq!(ExperienceTier::from_years(5), ExperienceTier::Intermediate);
        assert_eq!(ExperienceTier::from_years(6), ExperienceTier::Senior);
        assert_eq!(ExperienceTier::from_years(50), ExperienceTier::Senior);
    }

    #[test]
    fn test_static_bank_tier_questions_come_first() {
        let questions = StaticQuestionBank::questions_for("Python, Docker", 1);
        assert_eq!(questions.len(), 4);
        assert!(questions[0].contains("variable and a constant"));
        assert!(questions[1].contains("version control"));
        assert!(questions[2].contains("Python decorators"));
        assert!(questions[3].contains("containerization"));
    }

    #[test]
    fn test_static_bank_caps_at_five_in_table_order() {
        let questions =
            StaticQuestionBank::questions_for("python, react, django, mysql, docker", 8);
        assert_eq!(questions.len(), 5);
        assert!(questions[0].contains("system design"));
        assert!(questions[2].contains("Python decorators"));
        assert!(questions[3].contains("asynchronous programming"));
        assert!(questions[4].contains("migrations"));
    }

    #[test]
    fn test_static_bank_unknown_stack_gets_tier_questions_only() {
        let questions = StaticQuestionBank::questions_for("cobol, fortran, pascal", 4);
        assert_eq!(questions.len(), 2);
        assert!(questions[0].contains("debugging complex issues"));
    }

    #[test]
    fn test_static_bank_keyword_match_is_case_insensitive() {
        let questions = StaticQuestionBank::questions_for("PostgreSQL, Kubernetes, Go", 3);
        assert!(questions.iter().any(|q| q.contains("slow database query")));
        assert!(questions.iter().any(|q| q.contains("containerization")));
    }

    #[test]
    fn test_parse_prefixed_lines() {
        let text = "Here are some questions:\n\
            Q: 1. What is the borrow checker and why does it exist?\n\
            Question 2: How do you structure error handling in a service?\n\
            Q: short\n\
            Unrelated line?";
        let questions = parse_questions(text);
        assert_eq!(
            questions,
            vec![
                "What is the borrow checker and why does it exist?",
                "How do you structure error handling in a service?",
            ]
        );
    }

    #[test]
    fn test_parse_falls_back_to_question_sentences() {
        let text = "Let us begin. How would you design a rate limiter for an API? \
            Also, why? Describe how you would scale a read-heavy database.";
        let questions = parse_questions(text);
        assert_eq!(
            questions,
            vec!["How would you design a rate limiter for an API?"]
        );
    }

    #[test]
    fn test_parse_caps_at_five() {
        let text = (1..=8)
            .map(|i| format!("Q: Question number {i} about distributed systems?"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_questions(&text).len(), 5);
    }

    #[test]
    fn test_parse_nothing_usable() {
        assert!(parse_questions("I am a chatbot. Hello there.").is_empty());
    }

    #[tokio::test]
    async fn test_generative_source_uses_llm_questions() {
        let source = source(CannedGenerator(
            "Q: How does Python manage memory for large objects?\nQ: What is a Docker layer cache?",
        ));
        let questions = source.generate(&profile("Python, Docker", 5)).await;
        assert_eq!(questions.len(), 2);
        assert!(questions[0].starts_with("How does Python"));
    }

    #[tokio::test]
    async fn test_generative_source_falls_back_on_service_error() {
        let source = source(FailingGenerator);
        let p = profile("Python, Docker, AWS, PostgreSQL, Communication, Teamwork", 5);
        assert!(matches!(
            source.attempt(&p).await,
            GenerationOutcome::ServiceError(_)
        ));
        let questions = source.generate(&p).await;
        assert_eq!(questions, StaticQuestionBank::questions_for("python docker postgresql", 5));
    }

    #[tokio::test]
    async fn test_generative_source_falls_back_on_unusable_output() {
        let source = source(CannedGenerator("hello! nice to meet you."));
        let questions = source.generate(&profile("rust, go, zig", 10)).await;
        assert_eq!(questions.len(), 2);
        assert!(questions[0].contains("system design"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generative_source_times_out_to_fallback() {
        let source = GenerativeQuestionSource::new(Arc::new(SlowGenerator), Duration::from_secs(30));
        let p = profile("python, flask, mysql", 2);
        assert!(matches!(source.attempt(&p).await, GenerationOutcome::TimedOut));
        let questions = source.generate(&p).await;
        assert_eq!(questions.len(), 5);
        assert!(questions[0].contains("variable and a constant"));
    }

    #[tokio::test]
    async fn test_failed_service_always_yields_two_to_five_questions() {
        let source = source(FailingGenerator);
        for (skills, years) in [
            ("x", 0),
            ("cobol, fortran, pascal", 3),
            ("python, javascript, django, sql, docker", 7),
            ("Communication, Teamwork, Leadership", 50),
        ] {
            let questions = source.generate(&profile(skills, years)).await;
            assert!((2..=5).contains(&questions.len()), "skills: {skills}");
            assert!(questions.iter().all(|q| !q.trim().is_empty()));
        }
    }

    #[tokio::test]
    async fn test_prompt_embeds_tier_and_stack() {
        let source = source(PromptEcho);
        let questions = source.generate(&profile("Rust, Tokio, Axum", 7)).await;
        assert_eq!(questions.len(), 1);
        assert!(questions[0].contains("senior level candidate with 7 years"));
        assert!(questions[0].contains("Tech stack: Rust, Tokio, Axum"));
    }
}
