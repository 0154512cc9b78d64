use tracing::{debug, info};

use crate::countdown::{Countdown, ExpiryRule, TickOutcome, TimerHandle};
use crate::quiz::{AnswerRecord, AnswerValue, Intro, Question, QuizDefinition};
use crate::scorer::{self, Outcome, Score};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub expiry: ExpiryRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry: ExpiryRule::Exact,
        }
    }
}

/// Mutable part of a running quiz
#[derive(Debug, Clone)]
pub struct SessionState {
    pub current_index: usize,
    pub answers: AnswerRecord,
    pub result_visible: bool,
    pub score: Score,
    pub countdown: Countdown,
}

impl SessionState {
    fn new(expiry: ExpiryRule) -> Self {
        Self {
            current_index: 0,
            answers: AnswerRecord::new(),
            result_visible: false,
            score: Score::default(),
            countdown: Countdown::new(expiry),
        }
    }

    pub fn remaining_ms(&self) -> Option<i64> {
        self.countdown.remaining_ms()
    }
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Loaded(QuizDefinition),
    RecordAnswer { index: usize, value: AnswerValue },
    Next,
    Submit,
    Tick,
    CloseResults,
}

/// What a dispatched action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Not loaded yet, or the action does not apply in the current state.
    Ignored,
    Loaded,
    AnswerRecorded,
    TimerTicked,
    Advanced { index: usize },
    ResultsShown { score: Score },
    Reset,
}

/// Read-only view of a loaded session for rendering
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub intro: &'a Intro,
    pub index: usize,
    pub question_count: usize,
    pub question: &'a Question,
    pub questions: &'a [Question],
    pub is_last: bool,
    pub remaining_ms: Option<i64>,
    pub answers: &'a AnswerRecord,
    pub result_visible: bool,
    pub score: Score,
    pub outcomes: Vec<Outcome>,
}

impl Snapshot<'_> {
    pub fn current_answer(&self) -> Option<&AnswerValue> {
        self.answers.get(&self.index)
    }

    /// Share of the current time limit already used, in `[0, 1]`.
    pub fn elapsed_ratio(&self) -> f64 {
        let limit = self.question.time_limit_ms as f64;
        match self.remaining_ms {
            Some(remaining) if limit > 0.0 => ((limit - remaining as f64) / limit).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// A quiz session: the loaded question set plus the state it drives.
///
/// Until a quiz is loaded every operation is a no-op.
#[derive(Debug, Clone)]
pub struct Session {
    quiz: Option<QuizDefinition>,
    state: SessionState,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            quiz: None,
            state: SessionState::new(config.expiry),
            config,
        }
    }

    /// A session that is already running `quiz`.
    pub fn with_quiz(quiz: QuizDefinition, config: SessionConfig) -> Self {
        let mut session = Self::new(config);
        session.load(quiz);
        session
    }

    pub fn dispatch(&mut self, action: Action) -> Transition {
        let transition = match action {
            Action::Loaded(quiz) => self.load(quiz),
            Action::RecordAnswer { index, value } => self.record_answer(index, value),
            Action::Next => self.next(),
            Action::Submit => self.submit(),
            Action::Tick => self.on_tick(),
            Action::CloseResults => self.close_results(),
        };
        if !matches!(transition, Transition::Ignored | Transition::TimerTicked) {
            debug!(?transition, "session transition");
        }
        transition
    }

    /// Install the question set and start the first question. Later loads
    /// are ignored.
    pub fn load(&mut self, quiz: QuizDefinition) -> Transition {
        if self.quiz.is_some() {
            return Transition::Ignored;
        }
        info!(
            title = %quiz.intro.title,
            questions = quiz.question_count(),
            "quiz loaded"
        );
        self.quiz = Some(quiz);
        self.reset();
        Transition::Loaded
    }

    pub fn record_answer(&mut self, index: usize, value: AnswerValue) -> Transition {
        if self.quiz.is_none() {
            return Transition::Ignored;
        }
        self.state.answers.insert(index, value);
        Transition::AnswerRecorded
    }

    /// Move past the current question: score and show results on the last
    /// one, otherwise step to the next and restart its timer.
    pub fn advance(&mut self) -> Transition {
        let Some(quiz) = self.quiz.as_ref() else {
            return Transition::Ignored;
        };

        if self.state.current_index >= quiz.last_index() {
            self.show_results()
        } else {
            self.state.current_index += 1;
            let limit = quiz.questions[self.state.current_index].time_limit_ms;
            self.state.countdown.start(limit);
            Transition::Advanced {
                index: self.state.current_index,
            }
        }
    }

    /// Manual "Next"; only available before the last question.
    pub fn next(&mut self) -> Transition {
        if !self.is_answering() || self.is_last() {
            return Transition::Ignored;
        }
        self.state.countdown.stop();
        self.advance()
    }

    /// Manual "Submit"; only available on the last question.
    pub fn submit(&mut self) -> Transition {
        if !self.is_answering() || !self.is_last() {
            return Transition::Ignored;
        }
        self.show_results()
    }

    pub fn on_tick(&mut self) -> Transition {
        if !self.is_answering() {
            return Transition::Ignored;
        }
        match self.state.countdown.on_tick() {
            TickOutcome::Ignored => Transition::Ignored,
            TickOutcome::Running => Transition::TimerTicked,
            TickOutcome::Expired => {
                debug!(index = self.state.current_index, "question timed out");
                self.advance()
            }
        }
    }

    pub fn close_results(&mut self) -> Transition {
        if self.quiz.is_none() || !self.state.result_visible {
            return Transition::Ignored;
        }
        self.reset()
    }

    /// Back to question 0 with no answers, zero counts and a fresh timer.
    pub fn reset(&mut self) -> Transition {
        let Some(quiz) = self.quiz.as_ref() else {
            return Transition::Ignored;
        };
        self.state = SessionState::new(self.config.expiry);
        self.state.countdown.start(quiz.questions[0].time_limit_ms);
        Transition::Reset
    }

    fn show_results(&mut self) -> Transition {
        let Some(quiz) = self.quiz.as_ref() else {
            return Transition::Ignored;
        };
        self.state.countdown.stop();
        let score = scorer::score(&quiz.questions, &self.state.answers);
        self.state.score = score;
        self.state.result_visible = true;
        info!(
            correct = score.correct_count,
            wrong = score.wrong_count,
            "quiz finished"
        );
        Transition::ResultsShown { score }
    }

    fn is_answering(&self) -> bool {
        self.quiz.is_some() && !self.state.result_visible
    }

    pub fn is_loaded(&self) -> bool {
        self.quiz.is_some()
    }

    pub fn is_last(&self) -> bool {
        self.quiz
            .as_ref()
            .is_some_and(|quiz| self.state.current_index == quiz.last_index())
    }

    pub fn quiz(&self) -> Option<&QuizDefinition> {
        self.quiz.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn timer_handle(&self) -> Option<TimerHandle> {
        self.state.countdown.handle()
    }

    pub fn snapshot(&self) -> Option<Snapshot<'_>> {
        let quiz = self.quiz.as_ref()?;
        let outcomes = if self.state.result_visible {
            scorer::grade(&quiz.questions, &self.state.answers)
        } else {
            Vec::new()
        };

        Some(Snapshot {
            intro: &quiz.intro,
            index: self.state.current_index,
            question_count: quiz.question_count(),
            question: &quiz.questions[self.state.current_index],
            questions: &quiz.questions,
            is_last: self.state.current_index == quiz.last_index(),
            remaining_ms: self.state.remaining_ms(),
            answers: &self.state.answers,
            result_visible: self.state.result_visible,
            score: self.state.score,
            outcomes,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn quiz() -> QuizDefinition {
        QuizDefinition::new(
            Intro {
                title: "Capitals".into(),
                text: "Be quick".into(),
            },
            vec![
                Question::multiple_choice("Pick B", &["A", "B"], 1, 5000),
                Question::open_text("Capital of France?", "paris", 3000),
            ],
        )
        .unwrap()
    }

    fn three_questions() -> QuizDefinition {
        QuizDefinition::new(
            Intro::default(),
            vec![
                Question::multiple_choice("one", &["a", "b"], 0, 200),
                Question::multiple_choice("two", &["a", "b"], 0, 300),
                Question::open_text("three", "x", 400),
            ],
        )
        .unwrap()
    }

    fn tick_n(session: &mut Session, n: usize) -> Vec<Transition> {
        (0..n).map(|_| session.dispatch(Action::Tick)).collect()
    }

    #[test]
    fn operations_are_noops_until_loaded() {
        let mut s = Session::default();

        assert!(!s.is_loaded());
        assert!(s.snapshot().is_none());
        assert_eq!(s.record_answer(0, AnswerValue::Choice(1)), Transition::Ignored);
        assert_eq!(s.advance(), Transition::Ignored);
        assert_eq!(s.next(), Transition::Ignored);
        assert_eq!(s.submit(), Transition::Ignored);
        assert_eq!(s.on_tick(), Transition::Ignored);
        assert_eq!(s.close_results(), Transition::Ignored);
        assert_eq!(s.reset(), Transition::Ignored);
        assert!(s.state().answers.is_empty());
        assert!(s.timer_handle().is_none());
    }

    #[test]
    fn loading_starts_first_question() {
        let mut s = Session::default();
        assert_eq!(s.dispatch(Action::Loaded(quiz())), Transition::Loaded);

        let snap = s.snapshot().unwrap();
        assert_eq!(snap.index, 0);
        assert_eq!(snap.remaining_ms, Some(5000));
        assert_eq!(snap.question_count, 2);
        assert!(!snap.is_last);
        assert!(!snap.result_visible);
        assert!(s.timer_handle().is_some());
    }

    #[test]
    fn second_load_is_ignored() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        assert_eq!(s.load(three_questions()), Transition::Ignored);
        assert_eq!(s.quiz().unwrap().question_count(), 2);
    }

    #[test]
    fn record_answer_overwrites() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        s.record_answer(0, AnswerValue::Choice(0));
        s.record_answer(0, AnswerValue::Choice(1));

        assert_eq!(s.state().answers.len(), 1);
        assert_eq!(s.state().answers[&0], AnswerValue::Choice(1));
    }

    #[test]
    fn next_restarts_timer_for_new_question() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        let first = s.timer_handle();
        tick_n(&mut s, 3);
        assert_eq!(s.state().remaining_ms(), Some(4700));

        assert_eq!(s.dispatch(Action::Next), Transition::Advanced { index: 1 });
        assert_eq!(s.state().current_index, 1);
        assert_eq!(s.state().remaining_ms(), Some(3000));
        assert_ne!(s.timer_handle(), first);
        assert!(s.is_last());
    }

    #[test]
    fn next_on_last_question_is_ignored() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        s.next();
        assert_eq!(s.next(), Transition::Ignored);
        assert_eq!(s.state().current_index, 1);
        assert!(!s.state().result_visible);
    }

    #[test]
    fn submit_before_last_question_is_ignored() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        assert_eq!(s.submit(), Transition::Ignored);
        assert!(!s.state().result_visible);
    }

    #[test]
    fn advance_on_last_question_shows_results_without_moving() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        s.advance();
        assert_matches!(s.advance(), Transition::ResultsShown { .. });
        assert_eq!(s.state().current_index, 1);
        assert!(s.state().result_visible);

        // repeated calls keep re-showing results
        assert_matches!(s.advance(), Transition::ResultsShown { .. });
        assert_eq!(s.state().current_index, 1);
        assert!(s.timer_handle().is_none());
    }

    #[test]
    fn answered_correctly_then_submitted() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        s.dispatch(Action::RecordAnswer {
            index: 0,
            value: AnswerValue::Choice(1),
        });
        s.dispatch(Action::Next);
        s.dispatch(Action::RecordAnswer {
            index: 1,
            value: "Paris".into(),
        });
        let t = s.dispatch(Action::Submit);

        let expected = Score {
            correct_count: 2,
            wrong_count: 0,
        };
        assert_eq!(t, Transition::ResultsShown { score: expected });
        let snap = s.snapshot().unwrap();
        assert!(snap.result_visible);
        assert_eq!(snap.score, expected);
        assert_eq!(snap.outcomes, vec![Outcome::Correct, Outcome::Correct]);
    }

    #[test]
    fn unanswered_quiz_times_out_into_results() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());

        let transitions = tick_n(&mut s, 50);
        assert_eq!(transitions[48], Transition::TimerTicked);
        assert_eq!(transitions[49], Transition::Advanced { index: 1 });
        assert_eq!(s.state().remaining_ms(), Some(3000));
        assert!(!s.state().result_visible);

        let transitions = tick_n(&mut s, 30);
        assert_eq!(
            transitions[29],
            Transition::ResultsShown {
                score: Score {
                    correct_count: 0,
                    wrong_count: 2
                }
            }
        );
        assert!(s.state().result_visible);
        assert_eq!(s.state().remaining_ms(), Some(0));

        // the timer is gone; further ticks do nothing
        assert_eq!(s.on_tick(), Transition::Ignored);
        assert_eq!(s.state().remaining_ms(), Some(0));
    }

    #[test]
    fn wrong_answers_score_zero() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        s.record_answer(0, AnswerValue::Choice(0));
        s.next();
        s.record_answer(1, "london".into());
        s.submit();

        assert_eq!(s.state().score.correct_count, 0);
        assert_eq!(s.state().score.wrong_count, 2);
    }

    #[test]
    fn submit_scores_answers_from_every_question() {
        let mut s = Session::with_quiz(three_questions(), SessionConfig::default());
        s.record_answer(0, AnswerValue::Choice(0));
        s.next();
        s.next();
        s.record_answer(2, "X".into());
        s.submit();

        assert_eq!(
            s.snapshot().unwrap().outcomes,
            vec![Outcome::Correct, Outcome::Unanswered, Outcome::Correct]
        );
        assert_eq!(s.state().score.correct_count, 2);
        assert_eq!(s.state().score.wrong_count, 1);
    }

    #[test]
    fn close_results_resets_to_first_question() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        s.record_answer(0, AnswerValue::Choice(1));
        s.next();
        tick_n(&mut s, 4);
        s.record_answer(1, "paris".into());
        s.submit();

        assert_eq!(s.dispatch(Action::CloseResults), Transition::Reset);
        let state = s.state();
        assert_eq!(state.current_index, 0);
        assert!(state.answers.is_empty());
        assert_eq!(state.score, Score::default());
        assert!(!state.result_visible);
        assert_eq!(state.remaining_ms(), Some(5000));
        assert!(s.timer_handle().is_some());
    }

    #[test]
    fn close_results_while_answering_is_ignored() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        s.record_answer(0, AnswerValue::Choice(1));
        assert_eq!(s.close_results(), Transition::Ignored);
        assert_eq!(s.state().answers.len(), 1);
    }

    #[test]
    fn ticks_are_ignored_while_results_are_shown() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        s.next();
        s.submit();
        let remaining = s.state().remaining_ms();

        assert_eq!(s.on_tick(), Transition::Ignored);
        assert_eq!(s.state().remaining_ms(), remaining);
    }

    #[test]
    fn rapid_next_and_expiry_never_double_count() {
        let mut s = Session::with_quiz(three_questions(), SessionConfig::default());

        // first question expires after two ticks and auto-advances
        tick_n(&mut s, 2);
        assert_eq!(s.state().current_index, 1);
        // manual next straight after the expiry
        s.next();
        assert_eq!(s.state().current_index, 2);
        assert_eq!(s.state().remaining_ms(), Some(400));

        s.on_tick();
        assert_eq!(s.state().remaining_ms(), Some(300));
        assert!(s.timer_handle().is_some());
    }

    #[test]
    fn every_index_change_resets_remaining_time() {
        let mut s = Session::with_quiz(three_questions(), SessionConfig::default());
        let limits: Vec<u64> = s
            .quiz()
            .unwrap()
            .questions
            .iter()
            .map(|q| q.time_limit_ms)
            .collect();

        for (idx, limit) in limits.iter().enumerate() {
            assert_eq!(s.state().current_index, idx);
            assert_eq!(s.state().remaining_ms(), Some(*limit as i64));
            s.on_tick();
            s.advance();
        }
    }

    #[test]
    fn unaligned_limit_under_exact_rule_keeps_running() {
        let def = QuizDefinition::new(
            Intro::default(),
            vec![Question::open_text("x", "y", 150)],
        )
        .unwrap();
        let mut s = Session::with_quiz(def, SessionConfig::default());

        tick_n(&mut s, 5);
        assert!(!s.state().result_visible);
        assert_eq!(s.state().remaining_ms(), Some(-350));
    }

    #[test]
    fn unaligned_limit_under_threshold_rule_expires() {
        let def = QuizDefinition::new(
            Intro::default(),
            vec![Question::open_text("x", "y", 150)],
        )
        .unwrap();
        let mut s = Session::with_quiz(
            def,
            SessionConfig {
                expiry: ExpiryRule::Threshold,
            },
        );

        tick_n(&mut s, 2);
        assert!(s.state().result_visible);
    }

    #[test]
    fn elapsed_ratio_tracks_countdown() {
        let mut s = Session::with_quiz(quiz(), SessionConfig::default());
        assert_eq!(s.snapshot().unwrap().elapsed_ratio(), 0.0);

        tick_n(&mut s, 25);
        assert!((s.snapshot().unwrap().elapsed_ratio() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn reset_keeps_expiry_rule() {
        let mut s = Session::with_quiz(
            quiz(),
            SessionConfig {
                expiry: ExpiryRule::Threshold,
            },
        );
        s.next();
        s.submit();
        s.close_results();
        assert_eq!(s.state().countdown.rule(), ExpiryRule::Threshold);
    }
}
