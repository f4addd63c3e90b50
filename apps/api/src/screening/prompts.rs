// Prompt templates for technical question generation.

pub const QUESTION_GENERATION_SYSTEM: &str = "You are a technical interviewer. \
    Generate 3-5 relevant technical questions based on the candidate's tech stack \
    and experience level. List each question on a new line starting with 'Q:'.";

/// Placeholders: {tier}, {years}, {tech_stack}
pub const QUESTION_GENERATION_TEMPLATE: &str = "Generate technical questions for a {tier} \
    level candidate with {years} years of experience.\n\
    Tech stack: {tech_stack}\n\n\
    Provide 3-5 questions, each on a new line starting with 'Q:'.";
