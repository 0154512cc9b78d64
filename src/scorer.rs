use crate::quiz::{AnswerRecord, AnswerValue, Question, QuestionKind};

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
    Unanswered,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        self == Outcome::Correct
    }
}

#[derive(Clone, Debug, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub correct_count: usize,
    pub wrong_count: usize,
}

impl Score {
    pub fn total(&self) -> usize {
        self.correct_count + self.wrong_count
    }

    pub fn is_perfect(&self) -> bool {
        self.wrong_count == 0 && self.correct_count > 0
    }
}

/// Whether `answer` satisfies the answer key of `question`.
///
/// Malformed questions (no correct option, no expected text) never match.
pub fn is_correct(question: &Question, answer: &AnswerValue) -> bool {
    match question.kind {
        QuestionKind::MultipleChoice => match (answer.as_index(), question.correct_option_index) {
            (Some(given), Some(expected)) => given == expected,
            _ => false,
        },
        QuestionKind::OpenText => match (answer.as_text(), question.expected_text()) {
            (Some(given), Some(expected)) => given.to_lowercase() == expected.to_lowercase(),
            _ => false,
        },
    }
}

/// Per-question outcome, in question order.
pub fn grade(questions: &[Question], answers: &AnswerRecord) -> Vec<Outcome> {
    questions
        .iter()
        .enumerate()
        .map(|(idx, question)| match answers.get(&idx) {
            None => Outcome::Unanswered,
            Some(answer) if is_correct(question, answer) => Outcome::Correct,
            Some(_) => Outcome::Wrong,
        })
        .collect()
}

pub fn score(questions: &[Question], answers: &AnswerRecord) -> Score {
    grade(questions, answers)
        .into_iter()
        .fold(Score::default(), |mut score, outcome| {
            if outcome.is_correct() {
                score.correct_count += 1;
            } else {
                score.wrong_count += 1;
            }
            score
        })
}
