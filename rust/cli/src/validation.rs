//! Input parsing and validation for interactive commands.
//!
//! Parsing functions return structured results (like [`ParseResult`]) so the
//! play loop can tell a move, a quit request and a typo apart.

use hitstand_engine::cards::Rank;
use hitstand_engine::round::PlayerAction;
use hitstand_engine::rules::TableRules;

/// Result of parsing a line typed during a round.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    /// Valid player action parsed from input
    Action(PlayerAction),
    /// User entered quit command (q or quit)
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

/// Parse user input into a [`PlayerAction`] or a quit request.
///
/// Accepts (case-insensitive): `h`/`hit`, `s`/`stand`, `d`/`double`,
/// `p`/`split`, `q`/`quit`.
///
/// ```rust
/// # use hitstand_cli::validation::{parse_player_action, ParseResult};
/// use hitstand_engine::round::PlayerAction;
///
/// assert_eq!(parse_player_action("H"), ParseResult::Action(PlayerAction::Hit));
/// assert_eq!(parse_player_action("quit"), ParseResult::Quit);
/// assert!(matches!(parse_player_action("fold"), ParseResult::Invalid(_)));
/// ```
pub fn parse_player_action(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return ParseResult::Invalid("Empty input".to_string());
    }
    if is_quit(&input) {
        return ParseResult::Quit;
    }
    match input.parse::<PlayerAction>() {
        Ok(action) => ParseResult::Action(action),
        Err(_) => ParseResult::Invalid(format!(
            "Unrecognized action '{}'. Use (h)it, (s)tand, (d)ouble, s(p)lit or (q)uit",
            input
        )),
    }
}

/// Result of parsing a bet prompt.
#[derive(Debug, PartialEq)]
pub enum BetInput {
    Amount(u32),
    Quit,
    Invalid(String),
}

/// Parse a bet and check it against the table limits and the bankroll.
///
/// ```rust
/// # use hitstand_cli::validation::{parse_bet, BetInput};
/// use hitstand_engine::rules::TableRules;
///
/// let rules = TableRules::default();
/// assert_eq!(parse_bet("50", &rules, 1000), BetInput::Amount(50));
/// assert!(matches!(parse_bet("5", &rules, 1000), BetInput::Invalid(_)));
/// assert!(matches!(parse_bet("90", &rules, 80), BetInput::Invalid(_)));
/// ```
pub fn parse_bet(input: &str, rules: &TableRules, bankroll: u32) -> BetInput {
    let input = input.trim().trim_start_matches('$').to_lowercase();
    if is_quit(&input) {
        return BetInput::Quit;
    }
    let amount: u32 = match input.parse() {
        Ok(v) => v,
        Err(_) => return BetInput::Invalid(format!("'{}' is not a whole amount", input)),
    };
    if let Err(e) = rules.place_bet(bankroll, amount) {
        return BetInput::Invalid(e.to_string());
    }
    BetInput::Amount(amount)
}

/// Parse card symbols such as `A`, `10`, `t`, `K`.
///
/// ```rust
/// # use hitstand_cli::validation::parse_cards;
/// use hitstand_engine::cards::Rank;
///
/// let cards = parse_cards(&["A".into(), "10".into()]).unwrap();
/// assert_eq!(cards, vec![Rank::Ace, Rank::Ten]);
/// assert!(parse_cards(&["Z".into()]).is_err());
/// ```
pub fn parse_cards(symbols: &[String]) -> Result<Vec<Rank>, String> {
    symbols
        .iter()
        .flat_map(|s| s.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Rank>().map_err(|e| e.to_string()))
        .collect()
}

fn is_quit(input: &str) -> bool {
    matches!(input, "q" | "quit" | "exit")
}
