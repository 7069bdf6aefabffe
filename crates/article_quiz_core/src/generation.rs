//! crates/article_quiz_core/src/generation.rs
//!
//! The prompt and response contract between the application and the completion
//! service: how summaries and quizzes are requested, and how quiz output is
//! sanitized and validated before anyone trusts its shape.

use crate::domain::QuizQuestion;
use crate::ports::{CompletionService, PortError};

/// Number of questions every generated quiz must contain.
pub const QUIZ_LENGTH: usize = 5;
/// Number of options every quiz question must offer.
pub const OPTIONS_PER_QUESTION: usize = 4;

const SUMMARY_PROMPT_PREFIX: &str = "Please summarize the following article in a clear and concise way. Keep the summary to 2-3 paragraphs:\n\n";

//=========================================================================================
// Errors
//=========================================================================================

/// The completion text did not satisfy the quiz output contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedCompletionError {
    #[error("Quiz response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Expected {expected} quiz questions, got {found}")]
    WrongQuestionCount { expected: usize, found: usize },
    #[error("Question {index} has no text")]
    EmptyQuestion { index: usize },
    #[error("Question {index} has {found} options, expected {expected}")]
    WrongOptionCount {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("The answer to question {index} does not match exactly one of its options")]
    AnswerNotInOptions { index: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Completion(#[from] PortError),
    #[error(transparent)]
    Malformed(#[from] MalformedCompletionError),
    #[error("The completion service returned no text")]
    Empty,
}

//=========================================================================================
// Prompts
//=========================================================================================

pub fn summary_prompt(content: &str) -> String {
    format!("{SUMMARY_PROMPT_PREFIX}{content}")
}

pub fn quiz_prompt(title: &str, content: &str) -> String {
    format!(
        r#"Based on the following article titled "{title}", generate exactly 5 multiple choice quiz questions to test understanding of the content.

Article Content:
{content}

IMPORTANT: Return ONLY a valid JSON array with no markdown formatting, no code blocks, no backticks. Just the raw JSON array.

Each question object must have:
- "question": the question text
- "options": array of exactly 4 answer choices (A, B, C, D format like "A. Answer text")
- "answer": the correct answer (must match exactly one of the options)

Example format:
[{{"question":"What is...?","options":["A. First option","B. Second option","C. Third option","D. Fourth option"],"answer":"A. First option"}}]"#
    )
}

//=========================================================================================
// Response handling
//=========================================================================================

/// Strips the code fences a model may wrap around its JSON output.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Sanitizes and parses a quiz completion, then validates it against the quiz schema.
pub fn parse_quiz(raw: &str) -> Result<Vec<QuizQuestion>, MalformedCompletionError> {
    let questions: Vec<QuizQuestion> = serde_json::from_str(strip_code_fences(raw))
        .map_err(|e| MalformedCompletionError::InvalidJson(e.to_string()))?;
    validate_quiz(&questions)?;
    Ok(questions)
}

pub fn validate_quiz(questions: &[QuizQuestion]) -> Result<(), MalformedCompletionError> {
    if questions.len() != QUIZ_LENGTH {
        return Err(MalformedCompletionError::WrongQuestionCount {
            expected: QUIZ_LENGTH,
            found: questions.len(),
        });
    }

    for (index, question) in questions.iter().enumerate() {
        if question.question.trim().is_empty() {
            return Err(MalformedCompletionError::EmptyQuestion { index });
        }
        if question.options.len() != OPTIONS_PER_QUESTION {
            return Err(MalformedCompletionError::WrongOptionCount {
                index,
                expected: OPTIONS_PER_QUESTION,
                found: question.options.len(),
            });
        }
        let hits = question
            .options
            .iter()
            .filter(|option| **option == question.answer)
            .count();
        if hits != 1 {
            return Err(MalformedCompletionError::AnswerNotInOptions { index });
        }
    }

    Ok(())
}

/// Requests a summary of `content`.
pub async fn generate_summary(
    completion: &dyn CompletionService,
    content: &str,
) -> Result<String, GenerationError> {
    let summary = completion.complete(&summary_prompt(content)).await?;
    if summary.trim().is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(summary)
}

/// Requests a quiz for the article and validates the result.
pub async fn generate_quiz(
    completion: &dyn CompletionService,
    title: &str,
    content: &str,
) -> Result<Vec<QuizQuestion>, GenerationError> {
    let raw = completion.complete(&quiz_prompt(title, content)).await?;
    if raw.trim().is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(parse_quiz(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{quiz_json, ScriptedCompletion};

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("  [] "), "[]");
    }

    #[test]
    fn fenced_quiz_yields_five_questions() {
        let raw = format!("```json\n{}\n```", quiz_json());
        let questions = parse_quiz(&raw).unwrap();
        assert_eq!(questions.len(), QUIZ_LENGTH);
        assert!(questions.iter().all(|q| q.options.len() == 4));
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_quiz("Sure! Here is your quiz:").unwrap_err();
        assert!(matches!(err, MalformedCompletionError::InvalidJson(_)));
    }

    #[test]
    fn rejects_wrong_question_count() {
        let raw = r#"[{"question":"Q","options":["A. a","B. b","C. c","D. d"],"answer":"A. a"}]"#;
        assert_eq!(
            parse_quiz(raw).unwrap_err(),
            MalformedCompletionError::WrongQuestionCount {
                expected: 5,
                found: 1
            }
        );
    }

    #[test]
    fn rejects_answer_missing_from_options() {
        let mut questions: Vec<QuizQuestion> = serde_json::from_str(&quiz_json()).unwrap();
        questions[2].answer = "E. none of the above".to_string();
        assert_eq!(
            validate_quiz(&questions).unwrap_err(),
            MalformedCompletionError::AnswerNotInOptions { index: 2 }
        );
    }

    #[test]
    fn rejects_three_options() {
        let mut questions: Vec<QuizQuestion> = serde_json::from_str(&quiz_json()).unwrap();
        questions[4].options.pop();
        assert!(matches!(
            validate_quiz(&questions).unwrap_err(),
            MalformedCompletionError::WrongOptionCount { index: 4, found: 3, .. }
        ));
    }

    #[test]
    fn quiz_prompt_embeds_title_and_content() {
        let prompt = quiz_prompt("Photosynthesis", "Plants convert light...");
        assert!(prompt.contains(r#"titled "Photosynthesis""#));
        assert!(prompt.contains("Plants convert light..."));
        assert!(prompt.contains("exactly 5"));
    }

    #[test]
    fn quiz_prompt_keeps_placeholder_text_in_title() {
        let prompt = quiz_prompt("Why {content} matters", "BODY");
        assert!(prompt.starts_with(
            r#"Based on the following article titled "Why {content} matters","#
        ));
        assert_eq!(prompt.matches("BODY").count(), 1);
        assert!(prompt.ends_with(r#""answer":"A. First option"}]"#));
    }

    #[tokio::test]
    async fn summary_uses_the_fixed_template() {
        let completion = ScriptedCompletion::new(vec![Ok("A short summary.".to_string())]);
        let summary = generate_summary(&completion, "Plants convert light...")
            .await
            .unwrap();
        assert_eq!(summary, "A short summary.");
        assert_eq!(
            completion.prompts(),
            vec![summary_prompt("Plants convert light...")]
        );
    }

    #[tokio::test]
    async fn blank_summary_is_an_error() {
        let completion = ScriptedCompletion::new(vec![Ok("   ".to_string())]);
        let err = generate_summary(&completion, "text").await.unwrap_err();
        assert!(matches!(err, GenerationError::Empty));
    }
}
