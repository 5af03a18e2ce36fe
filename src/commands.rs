//! Slash commands understood by the interactive prompt.

use crate::agent::session::Mode;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryCommand {
    List,
    Use(String),
    /// Save the current memory, then start a fresh one.
    New,
    /// Start a fresh memory without saving the current one.
    NewForget,
    Delete(String),
    Resume,
    Forget,
    Remember,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(Mode),
    Memory(MemoryCommand),
    Attach(PathBuf),
    Detach,
    Current,
    /// Show inference call totals for this run.
    Stats,
    Help,
    Exit,
    /// A slash command that could not be understood, with a usage hint.
    Invalid(String),
}

pub const HELP: &str = "\
/mode <s|r|n|c|f|a>   search, research, normal, code, fast-code, auto
/memory l             list saved memories
/memory u <id>        use a saved memory
/memory n             save this memory and start a new one
/memory nf            start a new memory without saving
/memory d <id>        delete a saved memory
/memory r             resume the most recent memory
/memory forget        stop recording this chat
/memory remember      record this chat again
/file <path>          attach a file to every question
/file                 detach the file
/current              show the active memory
/stats                show model call totals
/exit                 save and quit";

impl Command {
    /// Parse one input line. Lines that are not slash commands are questions
    /// and yield `None`.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "mode" => match arg.parse::<Mode>() {
                Ok(mode) => Command::Mode(mode),
                Err(e) => Command::Invalid(format!("{} (usage: /mode <s|r|n|c|f|a>)", e)),
            },
            "memory" => parse_memory(arg),
            "file" if arg.is_empty() => Command::Detach,
            "file" => Command::Attach(PathBuf::from(arg)),
            "current" => Command::Current,
            "stats" => Command::Stats,
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => Command::Invalid(format!("unknown command /{} (try /help)", other)),
        };
        Some(command)
    }
}

fn parse_memory(arg: &str) -> Command {
    let (action, id) = match arg.split_once(char::is_whitespace) {
        Some((action, id)) => (action, id.trim()),
        None => (arg, ""),
    };

    let memory = match (action, id.is_empty()) {
        ("l", true) => MemoryCommand::List,
        ("u", false) => MemoryCommand::Use(id.to_string()),
        ("n", true) => MemoryCommand::New,
        ("nf", true) => MemoryCommand::NewForget,
        ("d", false) => MemoryCommand::Delete(id.to_string()),
        ("r", true) => MemoryCommand::Resume,
        ("forget", true) => MemoryCommand::Forget,
        ("remember", true) => MemoryCommand::Remember,
        ("u" | "d", true) => {
            return Command::Invalid(format!("/memory {} needs a memory id", action));
        }
        _ => {
            return Command::Invalid(
                "usage: /memory <l|u ID|n|nf|d ID|r|forget|remember>".to_string(),
            );
        }
    };
    Command::Memory(memory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_are_not_commands() {
        assert_eq!(Command::parse("what is the capital of France?"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_mode_and_file_commands() {
        assert_eq!(Command::parse("/mode r"), Some(Command::Mode(Mode::Research)));
        assert_eq!(Command::parse("  /mode   a "), Some(Command::Mode(Mode::Auto)));
        assert!(matches!(Command::parse("/mode x"), Some(Command::Invalid(_))));
        assert_eq!(
            Command::parse("/file notes/todo.md"),
            Some(Command::Attach(PathBuf::from("notes/todo.md")))
        );
        assert_eq!(Command::parse("/file"), Some(Command::Detach));
    }

    #[test]
    fn test_stats_command() {
        assert_eq!(Command::parse("/stats"), Some(Command::Stats));
        assert!(HELP.contains("/stats"));
    }

    #[test]
    fn test_memory_commands() {
        assert_eq!(Command::parse("/memory l"), Some(Command::Memory(MemoryCommand::List)));
        assert_eq!(
            Command::parse("/memory u 4f2c-11"),
            Some(Command::Memory(MemoryCommand::Use("4f2c-11".to_string())))
        );
        assert_eq!(Command::parse("/memory nf"), Some(Command::Memory(MemoryCommand::NewForget)));
        assert_eq!(Command::parse("/memory r"), Some(Command::Memory(MemoryCommand::Resume)));
        assert!(matches!(Command::parse("/memory d"), Some(Command::Invalid(_))));
        assert!(matches!(Command::parse("/memory l extra"), Some(Command::Invalid(_))));
        assert!(matches!(Command::parse("/bogus"), Some(Command::Invalid(_))));
    }
}
