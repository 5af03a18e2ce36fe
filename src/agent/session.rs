use crate::agent::memory::{Interaction, Memory};
use crate::config::Settings;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// Pipeline variant used to answer a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Search,
    Research,
    Normal,
    Code,
    FastCode,
    /// Decides between `Search` and `Normal` per question.
    Auto,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Search => "search",
            Mode::Research => "research",
            Mode::Normal => "normal",
            Mode::Code => "code",
            Mode::FastCode => "fast-code",
            Mode::Auto => "auto",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "search" => Ok(Mode::Search),
            "r" | "research" => Ok(Mode::Research),
            "n" | "normal" => Ok(Mode::Normal),
            "c" | "code" => Ok(Mode::Code),
            "f" | "fast-code" | "fastcode" => Ok(Mode::FastCode),
            "a" | "auto" => Ok(Mode::Auto),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Everything one interactive session carries between questions.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub settings: Settings,
    pub mode: Mode,
    pub memory: Memory,
    pub remember: bool,
    pub attached_file: Option<PathBuf>,
}

impl SessionState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            mode: Mode::default(),
            memory: Memory::default(),
            remember: true,
            attached_file: None,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        debug!("Switching to {} mode", mode);
        self.mode = mode;
    }

    pub fn attach(&mut self, path: impl Into<PathBuf>) {
        self.attached_file = Some(path.into());
    }

    pub fn detach(&mut self) {
        self.attached_file = None;
    }

    /// Contents of the attached file. An unreadable file is skipped with a
    /// warning so the question can still be answered.
    pub fn attachment(&self) -> Option<String> {
        let path = self.attached_file.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Failed to read attached file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Append a finished turn to the active memory while remembering is on.
    /// Returns whether the turn was recorded.
    pub fn record(&mut self, question: &str, answer: &str, sources: Vec<String>) -> bool {
        if !self.remember {
            return false;
        }
        self.memory.append(Interaction::new(question, answer, sources));
        true
    }

    /// Drop the active memory and stop recording. The next recorded turn
    /// starts a memory with a new identity.
    pub fn forget(&mut self) {
        debug!("Forgetting current memory");
        self.remember = false;
        self.memory = Memory::default();
    }

    pub fn remember(&mut self) {
        debug!("Remembering chat");
        self.remember = true;
    }

    /// Replace the active memory with one loaded from the store.
    pub fn adopt(&mut self, memory: Memory) {
        self.memory = memory;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("r".parse::<Mode>().unwrap(), Mode::Research);
        assert_eq!("Fast-Code".parse::<Mode>().unwrap(), Mode::FastCode);
        assert_eq!(" auto ".parse::<Mode>().unwrap(), Mode::Auto);
        assert!("turbo".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Search);
    }

    #[test]
    fn test_record_respects_remember_flag() {
        let mut session = SessionState::new(Settings::default());
        assert!(session.record("q", "a", vec![]));
        session.forget();
        assert!(!session.record("q2", "a2", vec![]));
        assert!(session.memory.is_empty());
        session.remember();
        assert!(session.record("q3", "a3", vec![]));
        assert_eq!(session.memory.title, "q3");
    }

    #[test]
    fn test_missing_attachment_is_skipped() {
        let mut session = SessionState::new(Settings::default());
        session.attach("/definitely/not/here.txt");
        assert!(session.attachment().is_none());
        session.detach();
        assert!(session.attached_file.is_none());
    }
}
