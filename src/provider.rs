use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use include_dir::{include_dir, Dir};
use tracing::{error, warn};

use crate::error::QuizError;
use crate::quiz::{lint, QuizDefinition};
use crate::runtime::QuizEvent;

static QUIZ_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/quizzes");

/// Name of the quiz bundled into the binary and used when none is configured
pub const DEFAULT_QUIZ: &str = "sample";

/// Supplies the question set for a session.
pub trait QuizSource: Send + 'static {
    fn load(&self) -> Result<QuizDefinition, QuizError>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileQuizSource {
    path: PathBuf,
}

impl FileQuizSource {
    pub fn new<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl QuizSource for FileQuizSource {
    fn load(&self) -> Result<QuizDefinition, QuizError> {
        let data = fs::read_to_string(&self.path).map_err(|source| QuizError::Io {
            path: self.path.clone(),
            source,
        })?;
        QuizDefinition::from_json(&data)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A quiz compiled into the binary from the `quizzes/` directory.
#[derive(Debug, Clone)]
pub struct EmbeddedQuizSource {
    name: String,
}

impl EmbeddedQuizSource {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }

    pub fn available() -> Vec<String> {
        let mut names: Vec<String> = QUIZ_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl Default for EmbeddedQuizSource {
    fn default() -> Self {
        Self::new(DEFAULT_QUIZ)
    }
}

impl QuizSource for EmbeddedQuizSource {
    fn load(&self) -> Result<QuizDefinition, QuizError> {
        let contents = QUIZ_DIR
            .get_file(format!("{}.json", self.name))
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| QuizError::UnknownEmbedded(self.name.clone()))?;
        QuizDefinition::from_json(contents)
    }

    fn describe(&self) -> String {
        format!("embedded:{}", self.name)
    }
}

/// Picks a file source when a path is configured, the bundled quiz otherwise.
pub fn source_for(path: Option<&Path>) -> Box<dyn QuizSource> {
    match path {
        Some(p) => Box::new(FileQuizSource::new(p)),
        None => Box::new(EmbeddedQuizSource::default()),
    }
}

impl QuizSource for Box<dyn QuizSource> {
    fn load(&self) -> Result<QuizDefinition, QuizError> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Load and lint, logging every warning.
pub fn load_checked<S: QuizSource + ?Sized>(source: &S) -> Result<QuizDefinition, QuizError> {
    let quiz = source.load()?;
    for warning in lint(&quiz) {
        warn!(source = %source.describe(), "{warning}");
    }
    Ok(quiz)
}

/// Load the quiz on a background thread and post the result to the event loop.
pub fn spawn_load<S: QuizSource>(source: S, tx: Sender<QuizEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let event = match load_checked(&source) {
            Ok(quiz) => QuizEvent::Loaded(quiz),
            Err(e) => {
                error!(source = %source.describe(), error = %e, "failed to load quiz");
                QuizEvent::LoadFailed(e.to_string())
            }
        };
        let _ = tx.send(event);
    })
}
