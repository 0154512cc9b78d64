use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::quiz::{AnswerValue, QuestionKind};
use crate::runtime::QuizEvent;
use crate::session::{Action, Session, SessionConfig, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Loading,
    Answering,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The session plus the bits of view state the terminal UI needs.
#[derive(Debug)]
pub struct App {
    pub session: Session,
    /// highlighted option of the current multiple-choice question
    pub highlighted: usize,
    pub load_error: Option<String>,
    highlighted_for: usize,
}

impl App {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: Session::new(config),
            highlighted: 0,
            load_error: None,
            highlighted_for: 0,
        }
    }

    pub fn state(&self) -> AppState {
        match self.session.snapshot() {
            None => AppState::Loading,
            Some(snap) if snap.result_visible => AppState::Results,
            Some(_) => AppState::Answering,
        }
    }

    pub fn handle_event(&mut self, event: QuizEvent) -> Flow {
        match event {
            QuizEvent::Tick => {
                self.dispatch(Action::Tick);
            }
            QuizEvent::Resize => {}
            QuizEvent::Loaded(quiz) => {
                self.load_error = None;
                self.dispatch(Action::Loaded(quiz));
            }
            QuizEvent::LoadFailed(msg) => {
                // the session stays in its loading state
                self.load_error = Some(msg);
            }
            QuizEvent::Key(key) => return self.handle_key(key),
        }
        Flow::Continue
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        match self.state() {
            AppState::Loading => {}
            AppState::Results => {
                if matches!(
                    key.code,
                    KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char('C')
                ) {
                    self.dispatch(Action::CloseResults);
                }
            }
            AppState::Answering => self.handle_answer_key(key),
        }
        Flow::Continue
    }

    fn handle_answer_key(&mut self, key: KeyEvent) {
        let (index, is_last, kind, option_count, current_text) = {
            let Some(snap) = self.session.snapshot() else {
                return;
            };
            let text = snap
                .current_answer()
                .and_then(AnswerValue::as_text)
                .unwrap_or_default()
                .to_string();
            (
                snap.index,
                snap.is_last,
                snap.question.kind,
                snap.question.options.len(),
                text,
            )
        };

        if key.code == KeyCode::Enter {
            self.dispatch(if is_last { Action::Submit } else { Action::Next });
            return;
        }

        match kind {
            QuestionKind::MultipleChoice => match key.code {
                KeyCode::Up if option_count > 0 => {
                    self.highlighted = (self.highlighted + option_count - 1) % option_count;
                }
                KeyCode::Down if option_count > 0 => {
                    self.highlighted = (self.highlighted + 1) % option_count;
                }
                KeyCode::Char(' ') if self.highlighted < option_count => {
                    self.choose(index, self.highlighted);
                }
                KeyCode::Char(c) => {
                    if let Some(choice) = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1)) {
                        if choice < option_count {
                            self.highlighted = choice;
                            self.choose(index, choice);
                        }
                    }
                }
                _ => {}
            },
            QuestionKind::OpenText => match key.code {
                KeyCode::Char(c) => {
                    let mut text = current_text;
                    text.push(c);
                    self.dispatch(Action::RecordAnswer {
                        index,
                        value: AnswerValue::Text(text),
                    });
                }
                KeyCode::Backspace => {
                    let mut text = current_text;
                    if text.pop().is_some() {
                        self.dispatch(Action::RecordAnswer {
                            index,
                            value: AnswerValue::Text(text),
                        });
                    }
                }
                _ => {}
            },
        }
    }

    fn choose(&mut self, index: usize, choice: usize) {
        self.dispatch(Action::RecordAnswer {
            index,
            value: AnswerValue::Choice(choice),
        });
    }

    fn dispatch(&mut self, action: Action) -> Transition {
        let transition = self.session.dispatch(action);
        let current = self.session.state().current_index;
        if current != self.highlighted_for || transition == Transition::Reset {
            debug!(from = self.highlighted_for, to = current, "question changed");
            self.highlighted = 0;
            self.highlighted_for = current;
        }
        transition
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
