//! Line commands for the interactive terminal client.

use std::str::FromStr;

pub const HELP: &str = "\
commands:
  url <value>     set the site to index
  query <value>   set the search query
  search          index the site, then search it
  toggle <n>      expand or collapse result n
  show            print the current view
  help            print this help
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetUrl(String),
    SetQuery(String),
    Search,
    /// 0-based result index; typed 1-based.
    Toggle(usize),
    Show,
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?}, type `help`")]
    Unknown(String),

    #[error("`{0}` takes no argument")]
    UnexpectedArgument(&'static str),

    #[error("`toggle` needs a result number starting at 1, got {0:?}")]
    BadResultNumber(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let bare = |cmd: Command, name: &'static str| {
            if rest.is_empty() {
                Ok(cmd)
            } else {
                Err(CommandError::UnexpectedArgument(name))
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Ok(Command::Nothing),
            // Values may be cleared by giving no argument.
            "url" => Ok(Command::SetUrl(rest.to_string())),
            "query" => Ok(Command::SetQuery(rest.to_string())),
            "search" => bare(Command::Search, "search"),
            "toggle" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Command::Toggle(n - 1)),
                _ => Err(CommandError::BadResultNumber(rest.to_string())),
            },
            "show" => bare(Command::Show, "show"),
            "help" | "?" => bare(Command::Help, "help"),
            "quit" | "exit" => bare(Command::Quit, "quit"),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}
