use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::screening::skills::ClassifiedSkills;

/// The ten stages of a screening conversation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Greeting,
    CollectingName,
    CollectingEmail,
    CollectingPhone,
    CollectingExperience,
    CollectingPosition,
    CollectingLocation,
    CollectingTechStack,
    AskingQuestions,
    Completed,
}

impl ConversationState {
    pub const ORDER: [ConversationState; 10] = [
        ConversationState::Greeting,
        ConversationState::CollectingName,
        ConversationState::CollectingEmail,
        ConversationState::CollectingPhone,
        ConversationState::CollectingExperience,
        ConversationState::CollectingPosition,
        ConversationState::CollectingLocation,
        ConversationState::CollectingTechStack,
        ConversationState::AskingQuestions,
        ConversationState::Completed,
    ];

    pub fn is_terminal(self) -> bool {
        self == ConversationState::Completed
    }

    /// 1-based position in `ORDER`. Display only.
    pub fn step(self) -> usize {
        Self::ORDER
            .iter()
            .position(|s| *s == self)
            .map_or(1, |i| i + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current_step: usize,
    pub total_steps: usize,
}

impl From<ConversationState> for Progress {
    fn from(state: ConversationState) -> Self {
        Progress {
            current_step: state.step(),
            total_steps: ConversationState::ORDER.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalAnswer {
    pub question: String,
    pub answer: String,
}

/// Everything learned about the candidate so far. Each field is filled exactly once,
/// when its conversation state is passed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience_years: Option<u32>,
    pub desired_position: Option<String>,
    pub location: Option<String>,
    pub raw_skills_text: Option<String>,
    pub classified_skills: ClassifiedSkills,
    pub technical_answers: Vec<TechnicalAnswer>,
}

impl CandidateProfile {
    /// Multi-line rendering for recruiters and the session inspector.
    pub fn summary(&self) -> String {
        let na = |field: &Option<String>| field.clone().unwrap_or_else(|| "N/A".to_string());
        let experience = self
            .experience_years
            .map_or_else(|| "N/A".to_string(), |years| years.to_string());

        let mut lines = vec![
            "Candidate Information:".to_string(),
            format!("- Name: {}", na(&self.name)),
            format!("- Email: {}", na(&self.email)),
            format!("- Phone: {}", na(&self.phone)),
            format!("- Experience: {experience} years"),
            format!("- Position: {}", na(&self.desired_position)),
            format!("- Location: {}", na(&self.location)),
        ];

        if !self.classified_skills.is_empty() {
            lines.push("- Skills:".to_string());
            let technical: Vec<&str> = self.classified_skills.technical().collect();
            if !technical.is_empty() {
                lines.push(format!("  - Technical: {}", technical.join(", ")));
            }
            let soft = self.classified_skills.soft_skills();
            if !soft.is_empty() {
                lines.push(format!("  - Soft Skills: {}", soft.join(", ")));
            }
        }

        lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

/// One line of the display transcript. Never read by conversation logic.
#[derive(Debug, Clone, Serialize)]
pub struct ChatEntry {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}
