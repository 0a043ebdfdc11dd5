use std::str::FromStr;

use crate::error::AppError;

pub const HELP: &str = "\
commands:
  search <term>   search the collection (empty term returns to browsing)
  clear           leave search mode
  page <n>        go to page n
  next | prev     move one page
  letter <c>      jump to an index letter
  show <id>       show details of a movie on this page
  rate <id> <n>   change the rating of a movie on this page
  sync <id>       refresh a movie on this page from its metadata and save it
  refresh         reload the current page
  add <query>     add the first metadata match for <query>
  delete <id>     delete a movie
  version         show the backend version
  help            show this help
  quit            exit";

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Clear,
    Page(u32),
    Next,
    Prev,
    Letter(char),
    Show(u64),
    Rate(u64, f64),
    Sync(u64),
    Refresh,
    Add(String),
    Delete(u64),
    Version,
    Help,
    Quit,
}

fn parse_number<T: FromStr>(command: &str, arg: &str) -> Result<T, AppError> {
    arg.parse().map_err(|_| {
        AppError::InvalidInput(format!("{} expects a number, got \"{}\"", command, arg))
    })
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        match name.to_lowercase().as_str() {
            "search" | "s" => Ok(Command::Search(arg.to_string())),
            "clear" => Ok(Command::Clear),
            "page" | "p" => parse_number("page", arg).map(Command::Page),
            "next" | "n" => Ok(Command::Next),
            "prev" => Ok(Command::Prev),
            "letter" | "l" => {
                let mut chars = arg.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Command::Letter(c)),
                    _ => Err(AppError::InvalidInput(
                        "letter expects a single character".to_string(),
                    )),
                }
            }
            "show" => parse_number("show", arg).map(Command::Show),
            "rate" => match arg.split_whitespace().collect::<Vec<_>>().as_slice() {
                [id, rating] => {
                    let rating: f64 = parse_number("rate", rating)?;
                    if !rating.is_finite() || rating < 0.0 {
                        return Err(AppError::InvalidInput(format!(
                            "rating must be zero or more, got {}",
                            rating
                        )));
                    }
                    Ok(Command::Rate(parse_number("rate", id)?, rating))
                }
                _ => Err(AppError::InvalidInput(
                    "rate expects an id and a rating".to_string(),
                )),
            },
            "sync" | "refresh-meta" => parse_number("sync", arg).map(Command::Sync),
            "refresh" | "r" => Ok(Command::Refresh),
            "add" if !arg.is_empty() => Ok(Command::Add(arg.to_string())),
            "add" => Err(AppError::InvalidInput("add expects a title".to_string())),
            "delete" => parse_number("delete", arg).map(Command::Delete),
            "version" => Ok(Command::Version),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err(AppError::InvalidInput("empty command".to_string())),
            other => Err(AppError::InvalidInput(format!(
                "unknown command \"{}\", try help",
                other
            ))),
        }
    }
}
