//! Input validators for each collected field, plus sanitization and farewell detection.
//!
//! Every validator is pure. Failures carry the reason shown to the candidate;
//! the conversation turns them into re-prompts, never into HTTP errors.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Messages longer than this (in characters) are cut and marked with `...`.
pub const MAX_INPUT_CHARS: usize = 500;

const MIN_LOCATION_CHARS: usize = 2;
const MAX_LOCATION_CHARS: usize = 100;
const MAX_EXPERIENCE_YEARS: u32 = 50;

// "im" is what "i'm" looks like after sanitization strips the apostrophe.
const NAME_PREFIXES: &[&str] = &[
    "my name is",
    "i am",
    "i'm",
    "im",
    "call me",
    "name:",
    "name is",
];

const ENDING_KEYWORDS: &[&str] = &[
    "bye",
    "goodbye",
    "quit",
    "exit",
    "stop",
    "end",
    "finish",
    "thank you",
    "thanks",
    "done",
    "complete",
];

/// A user-correctable problem with a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("I'd like to get your full name (first and last name).")]
    IncompleteName,

    #[error("Email address is required")]
    EmailRequired,

    #[error("Please provide a valid email address (e.g., john@example.com)")]
    InvalidEmail,

    #[error("Phone number is required")]
    PhoneRequired,

    #[error("Please provide a valid 10-digit phone number")]
    InvalidPhone,

    #[error("Please provide the number of years of experience")]
    ExperienceMissing,

    #[error("Please provide a realistic number of years (0-50)")]
    ExperienceOutOfRange,

    #[error("Please let me know what position or role you're interested in.")]
    PositionRequired,

    #[error("Please provide a location")]
    LocationRequired,

    #[error("Location seems too long. Please provide a shorter location.")]
    LocationTooLong,

    #[error("Please provide your skills")]
    SkillsRequired,

    #[error("Please provide at least 3 skills (mix of technical and soft skills)")]
    TooFewSkills,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email pattern is valid")
    })
}

fn first_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("number pattern is valid"))
}

fn ending_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let alternatives = ENDING_KEYWORDS
            .iter()
            .map(|k| regex::escape(k).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("ending pattern is valid")
    })
}

pub fn validate_email(input: &str) -> Result<String, ValidationFailure> {
    let email = input.trim();
    if email.is_empty() {
        return Err(ValidationFailure::EmailRequired);
    }
    if email_pattern().is_match(email) {
        Ok(email.to_string())
    } else {
        Err(ValidationFailure::InvalidEmail)
    }
}

/// Exactly ten ASCII digits. Only `validate_phone` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

/// Renders as `(DDD) DDD-DDDD`.
impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (area, rest) = self.0.split_at(3);
        let (exchange, line) = rest.split_at(3);
        write!(f, "({area}) {exchange}-{line}")
    }
}

/// Keeps the digits of the input, punctuation stripped. There must be exactly ten.
pub fn validate_phone(input: &str) -> Result<PhoneNumber, ValidationFailure> {
    if input.trim().is_empty() {
        return Err(ValidationFailure::PhoneRequired);
    }
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        Ok(PhoneNumber(digits))
    } else {
        Err(ValidationFailure::InvalidPhone)
    }
}

/// Takes the first integer in the text as the number of years.
pub fn validate_experience(input: &str) -> Result<u32, ValidationFailure> {
    let token = first_number_pattern()
        .find(input)
        .ok_or(ValidationFailure::ExperienceMissing)?;

    // Anything too large for u32 is out of range anyway.
    match token.as_str().parse::<u32>() {
        Ok(years) if years <= MAX_EXPERIENCE_YEARS => Ok(years),
        _ => Err(ValidationFailure::ExperienceOutOfRange),
    }
}

pub fn validate_position(input: &str) -> Result<String, ValidationFailure> {
    let position = input.trim();
    if position.is_empty() {
        Err(ValidationFailure::PositionRequired)
    } else {
        Ok(position.to_string())
    }
}

pub fn validate_location(input: &str) -> Result<String, ValidationFailure> {
    let location = input.trim();
    let len = location.chars().count();
    if len < MIN_LOCATION_CHARS {
        return Err(ValidationFailure::LocationRequired);
    }
    if len > MAX_LOCATION_CHARS {
        return Err(ValidationFailure::LocationTooLong);
    }
    Ok(location.to_string())
}

/// Strips a leading self-introduction ("my name is", "call me", ...) while keeping the
/// candidate's own capitalization.
pub fn extract_name(input: &str) -> String {
    let trimmed = input.trim();
    for prefix in NAME_PREFIXES {
        let Some(head) = trimmed.get(..prefix.len()) else {
            continue;
        };
        let rest = &trimmed[prefix.len()..];
        // "I amanda ..." is a name, not "i am" + "anda".
        let at_word_end = prefix.ends_with(':') || rest.is_empty() || rest.starts_with(' ');
        if head.eq_ignore_ascii_case(prefix) && at_word_end {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// A full name needs at least a first and a last name.
pub fn validate_name(input: &str) -> Result<String, ValidationFailure> {
    let name = extract_name(input);
    if name.split_whitespace().count() >= 2 {
        Ok(name)
    } else {
        Err(ValidationFailure::IncompleteName)
    }
}

/// Matches the farewell lexicon as whole words, so "Backend" does not read as "end".
pub fn is_conversation_ending(message: &str) -> bool {
    ending_pattern().is_match(message)
}

/// Collapses whitespace, drops markup-ish characters, and truncates over-long input.
pub fn sanitize_input(input: &str) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned: String = collapsed
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '`'))
        .collect();

    if cleaned.chars().count() > MAX_INPUT_CHARS {
        let mut truncated: String = cleaned.chars().take(MAX_INPUT_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        cleaned
    }
}
