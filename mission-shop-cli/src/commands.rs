use mission_shop::{Catalog, Difficulty};
use thiserror::Error;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start {
        difficulty: Difficulty,
        budget: u32,
        name: String,
    },
    Items,
    Add(String),
    Remove(String),
    Register {
        name: String,
        price: u32,
    },
    Cart,
    Buy,
    Reflect(String),
    Save,
    Ranking,
    Restart,
    Help,
    Quit,
}

impl Command {
    /// Commands that only display state and never reach the controller.
    #[must_use]
    pub const fn is_view(&self) -> bool {
        matches!(self, Self::Items | Self::Cart | Self::Ranking | Self::Help)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?} (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Difficulty(String),
    #[error("{0:?} is not a valid amount")]
    Amount(String),
    #[error("no item #{0} in the catalog")]
    Position(usize),
}

pub const HELP: &[(&str, &str)] = &[
    ("start <easy|normal|hard> <budget> [name]", "begin a mission"),
    ("items", "list the catalog"),
    ("add <item|#>", "put one unit in the cart"),
    ("remove <item|#>", "take one unit out of the cart"),
    ("register <name> <price>", "add an item to this session's catalog"),
    ("cart", "show the cart and budget"),
    ("buy", "finish shopping and see the result"),
    ("reflect <text>", "write what you thought about your choices"),
    ("save", "save your score to the ranking"),
    ("ranking", "show the ranking"),
    ("restart", "go back to the start screen"),
    ("quit", "leave"),
];

/// Parse a prompt line. Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "start" => parse_start(rest)?,
        "items" | "list" => Command::Items,
        "add" => Command::Add(required(rest, "add <item|#>")?),
        "remove" | "rm" => Command::Remove(required(rest, "remove <item|#>")?),
        "register" => parse_register(rest)?,
        "cart" => Command::Cart,
        "buy" | "done" => Command::Buy,
        "reflect" => Command::Reflect(rest.to_string()),
        "save" => Command::Save,
        "ranking" | "rank" => Command::Ranking,
        "restart" => Command::Restart,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn required(rest: &str, usage: &'static str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(rest.to_string())
    }
}

fn parse_start(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "start <easy|normal|hard> <budget> [name]";
    let mut parts = rest.splitn(3, char::is_whitespace);
    let difficulty = parts
        .next()
        .filter(|p| !p.is_empty())
        .ok_or(CommandError::Usage(USAGE))?
        .parse::<Difficulty>()
        .map_err(CommandError::Difficulty)?;
    let budget = parse_amount(parts.next().ok_or(CommandError::Usage(USAGE))?)?;
    let name = parts.next().unwrap_or_default().trim().to_string();
    Ok(Command::Start {
        difficulty,
        budget,
        name,
    })
}

fn parse_register(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "register <name> <price>";
    let (name, price) = rest
        .rsplit_once(char::is_whitespace)
        .ok_or(CommandError::Usage(USAGE))?;
    Ok(Command::Register {
        name: name.trim().to_string(),
        price: parse_amount(price)?,
    })
}

/// Parse an amount such as `30000`, `30,000` or `30_000원`.
pub fn parse_amount(raw: &str) -> Result<u32, CommandError> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('원')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned
        .parse()
        .map_err(|_| CommandError::Amount(raw.to_string()))
}

/// Resolve `#3`/`3` to the third catalog entry; anything else is a name.
pub fn resolve_item(catalog: &Catalog, selector: &str) -> Result<String, CommandError> {
    let digits = selector.trim_start_matches('#');
    match digits.parse::<usize>() {
        Ok(position) => catalog
            .by_position(position)
            .map(|entry| entry.name.clone())
            .ok_or(CommandError::Position(position)),
        Err(_) => Ok(selector.to_string()),
    }
}
