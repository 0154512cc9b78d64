use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppState};
use crate::ui::{render_loading, render_question, render_results};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Placeholder shown until the question set arrives
pub struct LoadingScreen;

impl Screen for LoadingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_loading(app.load_error.as_deref(), area, buf);
    }
}

pub struct QuestionScreen;

impl Screen for QuestionScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(snap) = app.session.snapshot() {
            render_question(&snap, app.highlighted, area, buf);
        }
    }
}

/// Results modal on top of a cleared area
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(snap) = app.session.snapshot() {
            render_results(&snap, area, buf);
        }
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Loading => Box::new(LoadingScreen),
        AppState::Answering => Box::new(QuestionScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}
