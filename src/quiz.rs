use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::countdown::TICK_RATE_MS;
use crate::error::QuizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum QuestionKind {
    #[serde(rename = "MULTIPLECHOICE", alias = "multiple_choice")]
    #[strum(serialize = "multiple choice")]
    MultipleChoice,
    #[serde(rename = "Open", alias = "open_text")]
    #[strum(serialize = "open text")]
    OpenText,
}

/// A single timed question.
///
/// For open-text questions the first entry of `options` holds the expected
/// answer; the remaining entries are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "time", alias = "time_limit_ms")]
    pub time_limit_ms: u64,
    #[serde(rename = "question", alias = "prompt")]
    pub prompt: String,
    #[serde(rename = "answers", alias = "options", default)]
    pub options: Vec<String>,
    #[serde(
        rename = "correctAnswer",
        alias = "correct_option_index",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_option_index: Option<usize>,
}

impl Question {
    pub fn multiple_choice<S: Into<String>>(
        prompt: S,
        options: &[&str],
        correct_option_index: usize,
        time_limit_ms: u64,
    ) -> Self {
        Self {
            kind: QuestionKind::MultipleChoice,
            time_limit_ms,
            prompt: prompt.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_option_index: Some(correct_option_index),
        }
    }

    pub fn open_text<S: Into<String>>(prompt: S, expected: &str, time_limit_ms: u64) -> Self {
        Self {
            kind: QuestionKind::OpenText,
            time_limit_ms,
            prompt: prompt.into(),
            options: vec![expected.to_string()],
            correct_option_index: None,
        }
    }

    /// Expected answer of an open-text question
    pub fn expected_text(&self) -> Option<&str> {
        match self.kind {
            QuestionKind::OpenText => self.options.first().map(String::as_str),
            QuestionKind::MultipleChoice => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intro {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// The read-only question set a session runs through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizDefinition {
    #[serde(default)]
    pub intro: Intro,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    pub fn new(intro: Intro, questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        Ok(Self { intro, questions })
    }

    pub fn from_json(s: &str) -> Result<Self, QuizError> {
        let def: QuizDefinition = serde_json::from_str(s)?;
        if def.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        Ok(def)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

/// What the user submitted for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Choice(usize),
    Text(String),
}

impl AnswerValue {
    /// Numeric reading of the value. Text is read from its leading digits
    /// after any leading whitespace, so `"2"` and `" 2nd"` both yield 2.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            AnswerValue::Choice(i) => Some(*i),
            AnswerValue::Text(s) => {
                let digits: String = s
                    .trim_start()
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits.parse().ok()
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            AnswerValue::Choice(_) => None,
        }
    }
}

impl From<usize> for AnswerValue {
    fn from(i: usize) -> Self {
        AnswerValue::Choice(i)
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

pub type AnswerRecord = BTreeMap<usize, AnswerValue>;

/// Data issues that the session tolerates but which make a question
/// unwinnable or its timer unreliable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizWarning {
    MissingCorrectOption { index: usize },
    CorrectOptionOutOfRange { index: usize, correct: usize, options: usize },
    MissingExpectedText { index: usize },
    ZeroTimeLimit { index: usize },
    TimeLimitNotTickAligned { index: usize, time_limit_ms: u64 },
}

impl fmt::Display for QuizWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizWarning::MissingCorrectOption { index } => {
                write!(f, "question {}: multiple choice without a correct answer", index + 1)
            }
            QuizWarning::CorrectOptionOutOfRange {
                index,
                correct,
                options,
            } => write!(
                f,
                "question {}: correct answer {} is outside its {} options",
                index + 1,
                correct,
                options
            ),
            QuizWarning::MissingExpectedText { index } => {
                write!(f, "question {}: open question without an expected answer", index + 1)
            }
            QuizWarning::ZeroTimeLimit { index } => {
                write!(f, "question {}: time limit is zero", index + 1)
            }
            QuizWarning::TimeLimitNotTickAligned {
                index,
                time_limit_ms,
            } => write!(
                f,
                "question {}: time limit {}ms is not a multiple of {}ms; exact expiry will never fire",
                index + 1,
                time_limit_ms,
                TICK_RATE_MS
            ),
        }
    }
}

/// Report malformed questions without rejecting them.
pub fn lint(def: &QuizDefinition) -> Vec<QuizWarning> {
    let mut warnings = Vec::new();

    for (index, q) in def.questions.iter().enumerate() {
        match q.kind {
            QuestionKind::MultipleChoice => match q.correct_option_index {
                None => warnings.push(QuizWarning::MissingCorrectOption { index }),
                Some(correct) if correct >= q.options.len() => {
                    warnings.push(QuizWarning::CorrectOptionOutOfRange {
                        index,
                        correct,
                        options: q.options.len(),
                    })
                }
                Some(_) => {}
            },
            QuestionKind::OpenText => {
                if q.options.is_empty() {
                    warnings.push(QuizWarning::MissingExpectedText { index });
                }
            }
        }

        if q.time_limit_ms == 0 {
            warnings.push(QuizWarning::ZeroTimeLimit { index });
        } else if q.time_limit_ms % TICK_RATE_MS != 0 {
            warnings.push(QuizWarning::TimeLimitNotTickAligned {
                index,
                time_limit_ms: q.time_limit_ms,
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const DOC: &str = r#"{
        "intro": { "title": "Capitals", "text": "Pick fast." },
        "questions": [
            { "type": "MULTIPLECHOICE", "time": 5000, "question": "Pick B",
              "answers": ["A", "B"], "correctAnswer": 1 },
            { "type": "Open", "time": 3000, "question": "Capital of France?",
              "answers": ["paris"] }
        ]
    }"#;

    #[test]
    fn parses_camel_case_document() {
        let def = QuizDefinition::from_json(DOC).unwrap();

        assert_eq!(def.intro.title, "Capitals");
        assert_eq!(def.question_count(), 2);
        assert_eq!(def.last_index(), 1);
        assert_eq!(
            def.questions[0],
            Question::multiple_choice("Pick B", &["A", "B"], 1, 5000)
        );
        assert_eq!(
            def.questions[1],
            Question::open_text("Capital of France?", "paris", 3000)
        );
    }

    #[test]
    fn accepts_snake_case_aliases() {
        let doc = r#"{ "questions": [
            { "type": "open_text", "time_limit_ms": 1000, "prompt": "x", "options": ["y"] }
        ] }"#;
        let def = QuizDefinition::from_json(doc).unwrap();

        assert_eq!(def.questions[0].kind, QuestionKind::OpenText);
        assert_eq!(def.questions[0].expected_text(), Some("y"));
        assert_eq!(def.intro, Intro::default());
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let doc = r#"{ "intro": { "title": "t", "text": "x" }, "questions": [] }"#;
        assert_matches!(QuizDefinition::from_json(doc), Err(QuizError::NoQuestions));
        assert_matches!(
            QuizDefinition::new(Intro::default(), vec![]),
            Err(QuizError::NoQuestions)
        );
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let doc = r#"{ "questions": [ { "type": "ESSAY", "time": 100, "question": "x" } ] }"#;
        assert_matches!(QuizDefinition::from_json(doc), Err(QuizError::Parse(_)));
    }

    #[test]
    fn text_answers_read_numerically_from_leading_digits() {
        assert_eq!(AnswerValue::Choice(3).as_index(), Some(3));
        assert_eq!(AnswerValue::from("2").as_index(), Some(2));
        assert_eq!(AnswerValue::from("  12abc").as_index(), Some(12));
        assert_eq!(AnswerValue::from("abc").as_index(), None);
        assert_eq!(AnswerValue::from("").as_index(), None);
    }

    #[test]
    fn lint_flags_malformed_questions() {
        let mut missing_key = Question::multiple_choice("a", &["x"], 0, 1000);
        missing_key.correct_option_index = None;
        let out_of_range = Question::multiple_choice("b", &["x", "y"], 5, 1000);
        let mut no_expected = Question::open_text("c", "z", 1000);
        no_expected.options.clear();
        let drifting = Question::open_text("d", "z", 1050);
        let zero = Question::open_text("e", "z", 0);

        let def = QuizDefinition::new(
            Intro::default(),
            vec![missing_key, out_of_range, no_expected, drifting, zero],
        )
        .unwrap();

        assert_eq!(
            lint(&def),
            vec![
                QuizWarning::MissingCorrectOption { index: 0 },
                QuizWarning::CorrectOptionOutOfRange {
                    index: 1,
                    correct: 5,
                    options: 2
                },
                QuizWarning::MissingExpectedText { index: 2 },
                QuizWarning::TimeLimitNotTickAligned {
                    index: 3,
                    time_limit_ms: 1050
                },
                QuizWarning::ZeroTimeLimit { index: 4 },
            ]
        );
    }

    #[test]
    fn lint_is_quiet_for_well_formed_quiz() {
        let def = QuizDefinition::from_json(DOC).unwrap();
        assert!(lint(&def).is_empty());
    }

    #[test]
    fn warning_messages_are_one_based() {
        let w = QuizWarning::TimeLimitNotTickAligned {
            index: 0,
            time_limit_ms: 150,
        };
        assert_eq!(
            w.to_string(),
            "question 1: time limit 150ms is not a multiple of 100ms; exact expiry will never fire"
        );
    }
}
