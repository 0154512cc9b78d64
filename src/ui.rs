pub mod format;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap},
};

use self::screen::Screen;
use crate::{
    app::App,
    quiz::{AnswerValue, QuestionKind},
    scorer::Outcome,
    session::Snapshot,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.state()).render(self, area, buf);
    }
}

pub(crate) fn render_loading(load_error: Option<&str>, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![Line::from(Span::styled(
        "Loading...",
        Style::default().add_modifier(Modifier::BOLD | Modifier::DIM),
    ))];
    if let Some(err) = load_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(Span::styled(
            "(esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

pub(crate) fn render_question(snap: &Snapshot<'_>, highlighted: usize, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_bold_style = Style::default().patch(bold_style).fg(Color::Magenta);

    let question = snap.question;
    let body_lines: u16 = match question.kind {
        QuestionKind::MultipleChoice => question.options.len() as u16,
        QuestionKind::OpenText => 1,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // intro title
            Constraint::Length(2), // intro text
            Constraint::Length(1), // padding
            Constraint::Length(1), // question counter
            Constraint::Length(2), // prompt
            Constraint::Length(body_lines),
            Constraint::Length(1), // padding
            Constraint::Length(1), // time gauge
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(snap.intro.title.clone(), bold_style))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(snap.intro.text.clone(), italic_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "Question {}/{} · {}",
            snap.index + 1,
            snap.question_count,
            question.kind
        ),
        dim_style,
    ))
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(question.prompt.clone(), bold_style))
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    let answer = snap.current_answer();
    let body: Vec<Line> = match question.kind {
        QuestionKind::MultipleChoice => question
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let checked = answer.and_then(AnswerValue::as_index) == Some(i);
                let marker = if checked { "(•)" } else { "( )" };
                let style = if i == highlighted {
                    magenta_bold_style.add_modifier(Modifier::UNDERLINED)
                } else if checked {
                    magenta_bold_style
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{marker} {}. {option}", i + 1), style))
            })
            .collect(),
        QuestionKind::OpenText => {
            let typed = answer.and_then(AnswerValue::as_text).unwrap_or_default();
            vec![Line::from(vec![
                Span::styled("> ", dim_style),
                Span::styled(typed.to_string(), magenta_bold_style),
                Span::styled("_", dim_style.add_modifier(Modifier::SLOW_BLINK)),
            ])]
        }
    };
    Paragraph::new(body).render(chunks[5], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Blue).bg(Color::DarkGray))
        .ratio(snap.elapsed_ratio())
        .label(format::remaining_label(snap.remaining_ms))
        .render(chunks[7], buf);

    let action = if snap.is_last { "submit" } else { "next" };
    let legend = match question.kind {
        QuestionKind::MultipleChoice => {
            format!("(1-9) choose / (↑↓ space) pick / (enter) {action} / (esc)ape")
        }
        QuestionKind::OpenText => format!("type your answer / (enter) {action} / (esc)ape"),
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[9], buf);
}

fn outcome_mark(outcome: Outcome) -> Span<'static> {
    match outcome {
        Outcome::Correct => Span::styled("✓", Style::default().fg(Color::Green)),
        Outcome::Wrong => Span::styled("✗", Style::default().fg(Color::Red)),
        Outcome::Unanswered => Span::styled("–", Style::default().fg(Color::DarkGray)),
    }
}

pub(crate) fn render_results(snap: &Snapshot<'_>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let summary = snap.outcomes.iter().map(|o| outcome_mark(*o).content).join(" ");
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Correct answers: {}", snap.score.correct_count),
            bold_style.fg(Color::Green),
        )),
        Line::from(Span::styled(
            format!("Wrong answers: {}", snap.score.wrong_count),
            bold_style.fg(Color::Red),
        )),
        Line::from(""),
        Line::from(summary),
        Line::from(""),
    ];
    lines.extend(snap.outcomes.iter().enumerate().map(|(i, outcome)| {
        Line::from(vec![
            outcome_mark(*outcome),
            Span::raw(format!(" {}", format::truncate(&snap.questions[i].prompt, 48))),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("(enter) close / (esc)ape", italic_style)));

    let content_width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    let popup = format::centered_rect(content_width + 4, lines.len() as u16 + 2, area);

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Results ", bold_style)),
        )
        .alignment(Alignment::Center)
        .render(popup, buf);
}
