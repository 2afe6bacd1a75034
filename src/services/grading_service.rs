use crate::models::question::{Question, QuestionType};
use serde::{Deserialize, Serialize};

/// Marker answer recorded when a user manually flags a mistake as mastered.
pub const MASTERED_MARKER: &str = "MANUAL_MARK_AS_MASTERED";

/// What the client submitted: one option token, or a set of tokens for
/// multiple-select questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    One(String),
    Many(Vec<String>),
}

impl SubmittedAnswer {
    pub fn is_empty(&self) -> bool {
        match self {
            SubmittedAnswer::One(token) => token.trim().is_empty(),
            SubmittedAnswer::Many(tokens) => tokens.iter().all(|t| t.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub is_correct: bool,
    /// Exact string persisted as the user's answer.
    pub normalized_answer: String,
    /// Fill-in questions are never auto-graded.
    pub needs_review: bool,
}

pub struct GradingService;

impl GradingService {
    /// Grades a submission against the stored correct-answer encoding.
    /// Comparisons are case-sensitive; callers reject empty submissions and
    /// fill questions before getting here.
    pub fn grade(question: &Question, submitted: &SubmittedAnswer) -> GradeOutcome {
        match question.question_type {
            QuestionType::Single | QuestionType::Boolean => {
                let token = match submitted {
                    SubmittedAnswer::One(token) => token.clone(),
                    // A one-element array for a single-choice question is
                    // accepted as that element.
                    SubmittedAnswer::Many(tokens) => {
                        tokens.first().cloned().unwrap_or_default()
                    }
                };
                GradeOutcome {
                    is_correct: token == question.correct_answer,
                    normalized_answer: token,
                    needs_review: false,
                }
            }
            QuestionType::Multiple => {
                let mut tokens = match submitted {
                    SubmittedAnswer::One(token) => vec![token.clone()],
                    SubmittedAnswer::Many(tokens) => tokens.clone(),
                };
                tokens.sort();
                let normalized = tokens.join(",");
                // Storage order of the correct set is not guaranteed sorted,
                // so both sides are normalized the same way.
                let mut correct: Vec<String> = question
                    .correct_answer
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect();
                correct.sort();
                GradeOutcome {
                    is_correct: normalized == correct.join(","),
                    normalized_answer: normalized,
                    needs_review: false,
                }
            }
            QuestionType::Fill => {
                let text = match submitted {
                    SubmittedAnswer::One(token) => token.clone(),
                    SubmittedAnswer::Many(tokens) => tokens.join(","),
                };
                GradeOutcome {
                    is_correct: false,
                    normalized_answer: text,
                    needs_review: true,
                }
            }
        }
    }

    /// Option tokens a submission may legally contain, in stored option
    /// order. Positional labels A, B, C... except for boolean questions whose
    /// options are the literal strings "true"/"false".
    pub fn option_tokens(question: &Question) -> Vec<String> {
        let labels = question.option_labels();
        labels
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                if question.question_type == QuestionType::Boolean
                    && (label == "true" || label == "false")
                {
                    label.clone()
                } else {
                    position_token(idx)
                }
            })
            .collect()
    }
}

/// 0 -> "A", 1 -> "B", ...
fn position_token(idx: usize) -> String {
    char::from_u32('A' as u32 + idx as u32)
        .unwrap_or('?')
        .to_string()
}
