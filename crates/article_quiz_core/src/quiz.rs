//! crates/article_quiz_core/src/quiz.rs
//!
//! The quiz attempt state machine: loading, answering, scoring, review and retake.
//!
//! ```text
//! Loading ──► Failed
//!    │
//!    └──► InProgress ──► InProgress (next question) ──► Completed ──► InProgress (retake)
//! ```

use crate::domain::QuizQuestion;

/// How an answer moves the attempt forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvanceMode {
    /// Selecting an option records it and immediately moves on.
    #[default]
    AutoAdvance,
    /// Selecting an option only marks it; `submit` records it and `next` moves on.
    SubmitThenNext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    Loading,
    Failed(String),
    InProgress,
    Completed,
}

/// What happened to a call to `select_option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The answer was recorded (auto-advance mode).
    Recorded { correct: bool },
    /// The option is now pending submission (submit-then-next mode).
    Pending,
    /// The question was already answered, the option is unknown, or no
    /// question is being asked.
    Ignored,
}

/// One row of the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question: String,
    pub chosen: Option<String>,
    pub correct: bool,
    /// Present only when the chosen option was wrong or missing.
    pub correct_answer: Option<String>,
}

/// A single attempt at a generated quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    mode: AdvanceMode,
    phase: QuizPhase,
    questions: Vec<QuizQuestion>,
    current: usize,
    answers: Vec<Option<String>>,
    pending: Option<String>,
    score: usize,
}

impl QuizSession {
    pub fn new(mode: AdvanceMode) -> Self {
        Self {
            mode,
            phase: QuizPhase::Loading,
            questions: Vec::new(),
            current: 0,
            answers: Vec::new(),
            pending: None,
            score: 0,
        }
    }

    /// Leaves `Loading` with either the generated questions or an error message.
    /// Has no effect outside `Loading`.
    pub fn load(&mut self, result: Result<Vec<QuizQuestion>, String>) {
        if self.phase != QuizPhase::Loading {
            return;
        }
        match result {
            Ok(questions) if questions.is_empty() => {
                self.phase = QuizPhase::Failed("The quiz contained no questions.".to_string());
            }
            Ok(questions) => {
                self.answers = vec![None; questions.len()];
                self.questions = questions;
                self.phase = QuizPhase::InProgress;
            }
            Err(message) => self.phase = QuizPhase::Failed(message),
        }
    }

    pub fn mode(&self) -> AdvanceMode {
        self.mode
    }

    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.phase {
            QuizPhase::InProgress => self.questions.get(self.current),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    pub fn is_answered(&self, index: usize) -> bool {
        matches!(self.answers.get(index), Some(Some(_)))
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn select_option(&mut self, option: &str) -> Selection {
        let Some(question) = self.current_question() else {
            return Selection::Ignored;
        };
        if self.is_answered(self.current) || !question.options.iter().any(|o| o == option) {
            return Selection::Ignored;
        }

        match self.mode {
            AdvanceMode::AutoAdvance => {
                let correct = self.record(option.to_string());
                self.advance();
                Selection::Recorded { correct }
            }
            AdvanceMode::SubmitThenNext => {
                self.pending = Some(option.to_string());
                Selection::Pending
            }
        }
    }

    /// Records the pending option. Returns its correctness, or `None` when there
    /// was nothing to submit.
    pub fn submit(&mut self) -> Option<bool> {
        if self.mode != AdvanceMode::SubmitThenNext
            || self.current_question().is_none()
            || self.is_answered(self.current)
        {
            return None;
        }
        let option = self.pending.take()?;
        Some(self.record(option))
    }

    /// Moves past an answered question. Returns whether the attempt moved.
    pub fn next(&mut self) -> bool {
        if self.mode != AdvanceMode::SubmitThenNext
            || self.current_question().is_none()
            || !self.is_answered(self.current)
        {
            return false;
        }
        self.advance();
        true
    }

    /// Starts the same question set over. Has no effect before questions are loaded.
    pub fn retake(&mut self) {
        if !matches!(self.phase, QuizPhase::InProgress | QuizPhase::Completed) {
            return;
        }
        self.current = 0;
        self.score = 0;
        self.pending = None;
        self.answers = vec![None; self.questions.len()];
        self.phase = QuizPhase::InProgress;
    }

    pub fn review(&self) -> Vec<QuestionReview> {
        self.questions
            .iter()
            .zip(&self.answers)
            .map(|(question, chosen)| {
                let correct = chosen.as_deref().is_some_and(|c| question.is_correct(c));
                QuestionReview {
                    question: question.question.clone(),
                    chosen: chosen.clone(),
                    correct,
                    correct_answer: (!correct).then(|| question.answer.clone()),
                }
            })
            .collect()
    }

    fn record(&mut self, option: String) -> bool {
        let correct = self.questions[self.current].is_correct(&option);
        if correct {
            self.score += 1;
        }
        self.answers[self.current] = Some(option);
        correct
    }

    fn advance(&mut self) {
        self.pending = None;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        } else {
            self.phase = QuizPhase::Completed;
        }
    }
}
