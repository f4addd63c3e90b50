//! Conversation state machine — walks one candidate through the screening script.
//!
//! A session owns its profile, questions, cursor and transcript. The only way to change
//! any of them is `ConversationSession::submit`, one message at a time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::screening::models::{
    CandidateProfile, ChatEntry, ConversationState, Progress, Speaker, TechnicalAnswer,
};
use crate::screening::questions::QuestionSource;
use crate::screening::skills::classify_skills;
use crate::screening::validators::{
    is_conversation_ending, sanitize_input, validate_email, validate_experience,
    validate_location, validate_name, validate_phone, validate_position, ValidationFailure,
};

pub const GREETING: &str = "👋 Hello! I'm TalentScout Hiring Assistant. I'm here to conduct \
    your initial screening and technical assessment. Let's start by getting to know you \
    better. What's your full name?";

pub const FAREWELL: &str = "Thank you for your time! If you'd like to complete the screening \
    process later, please feel free to return.\n\n\
    We're here whenever you're ready to continue. Have a great day! 👋";

const SKILLS_GUIDANCE: &str = "**Please provide your tech stack including:**\n\
    - At least **4 technical skills** (programming languages, frameworks, tools, databases)\n\
    - At least **2 soft skills** (communication, teamwork, problem-solving, etc.)\n\n\
    **Example:** Python, JavaScript, React, AWS, Communication, Teamwork\n\n\
    You can separate them with commas.";

const NO_QUESTIONS: &str = "I've gathered all your information! However, I'm having trouble \
    generating technical questions at the moment. Our team will review your profile and get \
    back to you soon.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// The answer was accepted and the conversation moved on.
    Advanced,
    /// The answer failed validation; same state, asked again.
    Reprompt,
    /// The candidate asked to leave; nothing was recorded.
    Farewell,
    /// The screening is over.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
}

impl Reply {
    fn advanced(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            kind: ReplyKind::Advanced,
        }
    }

    fn reprompt(failure: &ValidationFailure, hint: &str) -> Self {
        let text = if hint.is_empty() {
            format!("❌ {failure}")
        } else {
            format!("❌ {failure} {hint}")
        };
        Reply {
            text,
            kind: ReplyKind::Reprompt,
        }
    }

    fn farewell() -> Self {
        Reply {
            text: FAREWELL.to_string(),
            kind: ReplyKind::Farewell,
        }
    }

    fn completed(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            kind: ReplyKind::Completed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    state: ConversationState,
    profile: CandidateProfile,
    technical_questions: Vec<String>,
    current_question_index: usize,
    chat_log: Vec<ChatEntry>,
    started: bool,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// A fresh session reusing an existing id. Used by reset.
    pub fn with_id(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_active_at: now,
            state: ConversationState::Greeting,
            profile: CandidateProfile::default(),
            technical_questions: Vec::new(),
            current_question_index: 0,
            chat_log: Vec::new(),
            started: false,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn profile(&self) -> &CandidateProfile {
        &self.profile
    }

    pub fn technical_questions(&self) -> &[String] {
        &self.technical_questions
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn chat_log(&self) -> &[ChatEntry] {
        &self.chat_log
    }

    /// When the candidate last moved the conversation. Finished sessions stop updating it.
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn progress(&self) -> Progress {
        Progress::from(self.state)
    }

    /// Opens the conversation. The greeting already asks for the name, so the state
    /// stays `Greeting` until the first answer arrives.
    pub fn start(&mut self) -> String {
        if !self.started {
            self.started = true;
            self.log(Speaker::Assistant, GREETING);
            info!("Session {} started", self.id);
        }
        GREETING.to_string()
    }

    /// Handles one candidate message and returns the assistant's reply.
    /// Both sides of the exchange are appended to the chat log until the screening is
    /// complete; after that the transcript is closed and every message gets the same reply.
    pub async fn submit(&mut self, raw_text: &str, questions: &dyn QuestionSource) -> Reply {
        if self.state.is_terminal() {
            return Reply::completed(self.completion_message());
        }

        self.last_active_at = Utc::now();
        let text = sanitize_input(raw_text);
        self.log(Speaker::User, &text);

        let reply = self.transition(&text, questions).await;

        debug!(
            "Session {} reply kind {:?}, now in {:?}",
            self.id, reply.kind, self.state
        );
        self.log(Speaker::Assistant, &reply.text);
        reply
    }

    async fn transition(&mut self, text: &str, questions: &dyn QuestionSource) -> Reply {
        if is_conversation_ending(text) {
            info!("Session {} received a farewell in {:?}", self.id, self.state);
            return Reply::farewell();
        }

        match self.state {
            ConversationState::Greeting => {
                // The first message answers the greeting's name question.
                self.started = true;
                self.advance(ConversationState::CollectingName);
                self.collect_name(text)
            }
            ConversationState::CollectingName => self.collect_name(text),
            ConversationState::CollectingEmail => self.collect_email(text),
            ConversationState::CollectingPhone => self.collect_phone(text),
            ConversationState::CollectingExperience => self.collect_experience(text),
            ConversationState::CollectingPosition => self.collect_position(text),
            ConversationState::CollectingLocation => self.collect_location(text),
            ConversationState::CollectingTechStack => self.collect_tech_stack(text, questions).await,
            ConversationState::AskingQuestions => self.record_answer(text),
            ConversationState::Completed => Reply::completed(self.completion_message()),
        }
    }

    fn collect_name(&mut self, text: &str) -> Reply {
        match validate_name(text) {
            Ok(name) => {
                let reply = format!(
                    "Nice to meet you, {name}! Now, could you please provide your email address?"
                );
                self.profile.name = Some(name);
                self.advance(ConversationState::CollectingEmail);
                Reply::advanced(reply)
            }
            Err(e) => Reply::reprompt(&e, "Could you please provide that?"),
        }
    }

    fn collect_email(&mut self, text: &str) -> Reply {
        match validate_email(text) {
            Ok(email) => {
                self.profile.email = Some(email);
                self.advance(ConversationState::CollectingPhone);
                Reply::advanced(
                    "Perfect! Now I need your phone number for our records. \
                     Please provide a 10-digit phone number.",
                )
            }
            Err(e) => Reply::reprompt(&e, ""),
        }
    }

    fn collect_phone(&mut self, text: &str) -> Reply {
        match validate_phone(text) {
            Ok(phone) => {
                self.profile.phone = Some(phone.to_string());
                self.advance(ConversationState::CollectingExperience);
                Reply::advanced(
                    "Thank you! How many years of professional experience do you have in \
                     technology/software development?",
                )
            }
            Err(e) => Reply::reprompt(&e, "(e.g., 123-456-7890 or (123) 456-7890)."),
        }
    }

    fn collect_experience(&mut self, text: &str) -> Reply {
        match validate_experience(text) {
            Ok(years) => {
                self.profile.experience_years = Some(years);
                self.advance(ConversationState::CollectingPosition);
                Reply::advanced(
                    "Excellent! What position or role are you interested in applying for? \
                     (You can mention multiple if applicable)",
                )
            }
            Err(e) => Reply::reprompt(&e, "For example: 5 years."),
        }
    }

    fn collect_position(&mut self, text: &str) -> Reply {
        match validate_position(text) {
            Ok(position) => {
                self.profile.desired_position = Some(position);
                self.advance(ConversationState::CollectingLocation);
                Reply::advanced(
                    "Great choice! What's your current location or preferred work location? \
                     (Please provide city, state, or country)",
                )
            }
            Err(e) => Reply::reprompt(&e, ""),
        }
    }

    fn collect_location(&mut self, text: &str) -> Reply {
        match validate_location(text) {
            Ok(location) => {
                self.profile.location = Some(location);
                self.advance(ConversationState::CollectingTechStack);
                Reply::advanced(format!(
                    "Perfect! Now, let's talk about your skills.\n\n{SKILLS_GUIDANCE}"
                ))
            }
            Err(e) => Reply::reprompt(&e, "Please provide a valid location (city, state, or country)."),
        }
    }

    async fn collect_tech_stack(&mut self, text: &str, questions: &dyn QuestionSource) -> Reply {
        let skills = match classify_skills(text) {
            Ok(skills) => skills,
            Err(e) => {
                return Reply {
                    text: format!("❌ {e}\n\n{SKILLS_GUIDANCE}"),
                    kind: ReplyKind::Reprompt,
                }
            }
        };

        let technical: Vec<&str> = skills.technical().collect();
        let soft = skills.soft_skills();
        let technical_count = skills.technical_count();
        let summary = format!(
            "Great! I've recorded your skills:\n\n\
             ✅ **Technical Skills ({}):** {}\n\n\
             ✅ **Soft Skills ({}):** {}\n\n",
            technical_count,
            technical.join(", "),
            soft.len(),
            soft.join(", ")
        );

        self.profile.raw_skills_text = Some(text.trim().to_string());
        self.profile.classified_skills = skills;

        let generated = questions.generate(&self.profile).await;
        let Some(first) = generated.first().cloned() else {
            self.advance(ConversationState::Completed);
            return Reply::completed(format!("{summary}{NO_QUESTIONS}"));
        };

        let count = generated.len();
        self.technical_questions = generated;
        self.current_question_index = 0;
        self.advance(ConversationState::AskingQuestions);

        Reply::advanced(format!(
            "{summary}Now, I have {count} technical questions to help assess your skills. \
             Let's start with the first one:\n\n**Question 1:** {first}"
        ))
    }

    fn record_answer(&mut self, text: &str) -> Reply {
        if let Some(question) = self.technical_questions.get(self.current_question_index) {
            self.profile.technical_answers.push(TechnicalAnswer {
                question: question.clone(),
                answer: text.to_string(),
            });
            self.current_question_index += 1;
        }

        match self.technical_questions.get(self.current_question_index) {
            Some(next) => Reply::advanced(format!(
                "Thank you for that response! Here's the next question:\n\n\
                 **Question {}:** {next}",
                self.current_question_index + 1
            )),
            None => {
                self.advance(ConversationState::Completed);
                Reply::completed(self.completion_message())
            }
        }
    }

    fn completion_message(&self) -> String {
        let profile = &self.profile;
        format!(
            "🎉 **Screening Complete!**\n\n\
             Thank you {name} for completing our initial screening process.\n\n\
             **Summary of Information Collected:**\n\
             • Personal Details: Name, Contact Information\n\
             • Professional Background: {years} years experience\n\
             • Position Interest: {position}\n\
             • Location: {location}\n\
             • Technical Assessment: {answered} questions answered\n\n\
             **Next Steps:**\n\
             • Our technical team will review your responses within 2-3 business days\n\
             • You'll receive an email update about your application status\n\
             • If selected, we'll schedule a more detailed technical interview\n\n\
             We appreciate your interest in opportunities through TalentScout, and we'll be in touch soon!",
            name = profile.name.as_deref().unwrap_or("Candidate"),
            years = profile.experience_years.unwrap_or_default(),
            position = profile.desired_position.as_deref().unwrap_or("N/A"),
            location = profile.location.as_deref().unwrap_or("N/A"),
            answered = profile.technical_answers.len(),
        )
    }

    fn advance(&mut self, next: ConversationState) {
        info!("Session {} advanced {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    fn log(&mut self, speaker: Speaker, text: &str) {
        self.chat_log.push(ChatEntry {
            speaker,
            text: text.to_string(),
            timestamp: Utc::now(),
        });
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
