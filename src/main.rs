use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use quizr::{
    app::{App, Flow},
    config::{Config, ConfigStore, FileConfigStore, Settings},
    countdown::ExpiryRule,
    logging,
    provider::{self, EmbeddedQuizSource, QuizSource},
    quiz::lint,
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    session::SessionConfig,
    TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};
use tracing::info;

/// timed quiz runner for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs a quiz of timed multiple-choice and open questions. Each question auto-advances when its timer runs out; the last one scores the quiz."
)]
pub struct Cli {
    /// quiz file to run (defaults to the configured quiz, else the bundled sample)
    #[clap(short = 'q', long)]
    quiz: Option<PathBuf>,

    /// when a question's timer counts as expired
    #[clap(short = 'e', long, value_enum)]
    expiry: Option<ExpiryRule>,

    /// check the quiz file, print any problems and exit
    #[clap(long)]
    validate: bool,

    /// remember --quiz and --expiry as defaults for later runs
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn settings(&self, cfg: &Config) -> Settings {
        Settings::resolve(cfg, self.quiz.clone(), self.expiry)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init();

    let store = FileConfigStore::new();
    let settings = cli.settings(&store.load());

    if cli.save_config {
        store.save(&Config::from(&settings))?;
        info!(path = %store.path().display(), "saved config");
    }

    let source = provider::source_for(settings.quiz_path.as_deref());

    if cli.validate {
        return validate(&*source, &mut io::stdout());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    provider::spawn_load(source, events.sender());

    let mut app = App::new(SessionConfig {
        expiry: settings.expiry,
    });
    let result = start_tui(&mut terminal, &mut app, events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn validate<W: Write>(source: &dyn QuizSource, out: &mut W) -> Result<(), Box<dyn Error>> {
    let quiz = source.load()?;
    let warnings = lint(&quiz);

    writeln!(
        out,
        "{}: \"{}\" with {} questions",
        source.describe(),
        quiz.intro.title,
        quiz.question_count()
    )?;
    for warning in &warnings {
        writeln!(out, "warning: {warning}")?;
    }
    if warnings.is_empty() {
        writeln!(out, "ok")?;
    }
    if source.describe() == EmbeddedQuizSource::default().describe() {
        writeln!(
            out,
            "bundled quizzes: {}",
            EmbeddedQuizSource::available().join(", ")
        )?;
    }
    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: CrosstermEventSource,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let handle_before = app.session.timer_handle();
        let event = runner.step();
        let is_tick = matches!(event, QuizEvent::Tick);

        if app.handle_event(event) == Flow::Quit {
            break;
        }

        let handle_after = app.session.timer_handle();
        if handle_after.is_some() && handle_after != handle_before {
            // a new timer was registered; give it a full first period
            runner.rearm();
        }

        // idle ticks (loading, results) don't change the screen
        if !is_tick || handle_before.is_some() {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}
