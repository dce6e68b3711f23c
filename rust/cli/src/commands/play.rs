//! # Play Command
//!
//! Interactive blackjack at the terminal. The player starts with a bankroll,
//! bets on each round, and picks hit/stand/double/split with optional
//! strategy advice until they quit, run out of money, or reach `--rounds`.

use crate::commands::{advisor_by_name, load_config, seed_stream};
use crate::error::CliError;
use crate::formatters::{format_dealer_upcard, format_hand, format_net, outcome_label};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{BetInput, ParseResult, parse_bet, parse_player_action};
use hitstand_ai::Advisor;
use hitstand_engine::deck::Deck;
use hitstand_engine::outcome::Outcome;
use hitstand_engine::round::{PlayerAction, Round};
use hitstand_engine::rules::TableRules;
use hitstand_engine::stats::RoundStats;
use rand::RngCore;
use std::io::{BufRead, Write};

/// Options for [`handle_play_command`]; unset values come from configuration.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    pub bankroll: Option<u32>,
    pub rounds: Option<u32>,
    pub seed: Option<u64>,
    pub advisor: Option<String>,
    pub show_advice: bool,
}

/// Handle the play command: interactive rounds until quit, bankruptcy or the round limit.
///
/// # Errors
///
/// `CliError::InvalidInput` for a zero bankroll, zero rounds or an unknown
/// advisor; `CliError::Config` if configuration fails to load; `CliError::Io`
/// if the output streams fail.
pub fn handle_play_command(
    opts: PlayOptions,
    stdin: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let cfg = load_config()?;
    let mut bankroll = opts.bankroll.unwrap_or(cfg.starting_bankroll);
    if bankroll == 0 {
        ui::write_error(err, "bankroll must be >= 1")?;
        return Err(CliError::InvalidInput("bankroll must be >= 1".to_string()));
    }
    if opts.rounds == Some(0) {
        ui::write_error(err, "rounds must be >= 1")?;
        return Err(CliError::InvalidInput("rounds must be >= 1".to_string()));
    }
    let advisor = advisor_by_name(opts.advisor.as_deref().unwrap_or(&cfg.advisor))?;
    let rules = TableRules {
        split_policy: cfg.split_policy,
        ..TableRules::default()
    };
    let seed = opts.seed.or(cfg.seed).unwrap_or_else(rand::random);
    let mut seeds = seed_stream(seed);

    writeln!(out, "Welcome to Blackjack! You start with ${}.", bankroll)?;
    writeln!(
        out,
        "play: seed={} advisor={} limits={}-{}",
        seed,
        advisor.name(),
        rules.min_bet,
        rules.max_bet
    )?;

    let mut stats = RoundStats::default();
    let mut interrupted = false;
    loop {
        if opts.rounds.is_some_and(|n| stats.rounds >= u64::from(n)) {
            break;
        }
        if bankroll < rules.min_bet {
            writeln!(
                out,
                "You don't have enough money to continue. Game over."
            )?;
            break;
        }
        writeln!(out)?;
        writeln!(out, "Bankroll: ${}", bankroll)?;
        let Some(bet) = prompt_bet(&rules, bankroll, stdin, out, err)? else {
            break;
        };

        let mut round = Round::new(Deck::new_with_seed(seeds.next_u64()), rules);
        round.place_bet(&mut bankroll, bet)?;
        writeln!(out, "Round {}", stats.rounds + 1)?;
        writeln!(out, "Dealer shows: {}", format_dealer_upcard(&round))?;

        let shown = opts.show_advice.then_some(advisor.as_ref());
        let end = play_round(&mut round, &mut bankroll, shown, stdin, out, err)?;
        if end != RoundEnd::Resolved {
            writeln!(
                out,
                "Round abandoned; your bet of ${} is forfeited.",
                round.total_bet()
            )?;
            stats.record(Outcome::Lose, round.total_bet(), 0);
            interrupted = end == RoundEnd::InputClosed;
            break;
        }
        report_result(&round, out)?;
        if let Some(outcome) = round.outcome() {
            stats.record(outcome, round.total_bet(), round.total_payout());
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Thanks for playing! Rounds played: {}. Final bankroll: ${} ({}).",
        stats.rounds,
        bankroll,
        format_net(stats.net)
    )?;
    if interrupted {
        return Err(CliError::Interrupted(
            "input closed during a round".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum RoundEnd {
    Resolved,
    Quit,
    InputClosed,
}

/// Reads bets until one is valid. `None` when the player quits or input ends.
fn prompt_bet(
    rules: &TableRules,
    bankroll: u32,
    stdin: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Option<u32>, CliError> {
    loop {
        ui::prompt(
            out,
            &format!(
                "Place your bet ({}-{}, q to quit): ",
                rules.min_bet,
                rules.max_bet.min(bankroll)
            ),
        )?;
        let Some(line) = read_stdin_line(stdin) else {
            writeln!(out)?;
            return Ok(None);
        };
        match parse_bet(&line, rules, bankroll) {
            BetInput::Amount(v) => return Ok(Some(v)),
            BetInput::Quit => return Ok(None),
            BetInput::Invalid(msg) => ui::write_error(err, &msg)?,
        }
    }
}

fn play_round(
    round: &mut Round,
    bankroll: &mut u32,
    advisor: Option<&dyn Advisor>,
    stdin: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<RoundEnd, CliError> {
    while let Some(index) = round.active_index() {
        let hands = round.hands();
        let hand = &hands[index];
        if hands.len() > 1 {
            writeln!(
                out,
                "Hand {} of {}: {}",
                index + 1,
                hands.len(),
                format_hand(&hand.cards)
            )?;
        } else {
            writeln!(out, "Your hand: {}", format_hand(&hand.cards))?;
        }
        if let (Some(advisor), Some(up)) = (advisor, round.dealer_upcard()) {
            writeln!(
                out,
                "Advice ({}): {}",
                advisor.name(),
                advisor.advise(&hand.cards, up)
            )?;
        }

        ui::prompt(out, &format!("Action [{}] or q: ", action_menu(round)))?;
        let Some(line) = read_stdin_line(stdin) else {
            writeln!(out)?;
            return Ok(RoundEnd::InputClosed);
        };
        match parse_player_action(&line) {
            ParseResult::Action(action) => {
                if let Err(e) = apply_and_narrate(round, bankroll, action, out) {
                    ui::write_error(err, &e.to_string())?;
                }
            }
            ParseResult::Quit => return Ok(RoundEnd::Quit),
            ParseResult::Invalid(msg) => ui::write_error(err, &msg)?,
        }
    }
    Ok(RoundEnd::Resolved)
}

fn apply_and_narrate(
    round: &mut Round,
    bankroll: &mut u32,
    action: PlayerAction,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match action {
        PlayerAction::Hit => {
            let card = round.hit(bankroll)?;
            writeln!(out, "You drew {}", card)?;
        }
        PlayerAction::DoubleDown => {
            round.double_down(bankroll)?;
            writeln!(out, "Doubled down.")?;
        }
        PlayerAction::Split => {
            round.split(bankroll)?;
            writeln!(out, "Split into {} hands.", round.hands().len())?;
        }
        PlayerAction::Stand => round.stand(bankroll)?,
    }
    Ok(())
}

fn action_menu(round: &Round) -> String {
    round
        .available_actions()
        .iter()
        .map(|a| match a {
            PlayerAction::Hit => "h=hit",
            PlayerAction::Stand => "s=stand",
            PlayerAction::DoubleDown => "d=double",
            PlayerAction::Split => "p=split",
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn report_result(round: &Round, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(out, "Dealer's hand: {}", format_hand(round.dealer_cards()))?;
    let hands = round.hands();
    for (i, (hand, settlement)) in hands.iter().zip(round.settlements()).enumerate() {
        let label = if hands.len() > 1 {
            format!("Hand {}", i + 1)
        } else {
            "Your hand".to_string()
        };
        writeln!(
            out,
            "{}: {} -> {} {}",
            label,
            format_hand(&hand.cards),
            settlement.outcome,
            outcome_label(settlement.outcome)
        )?;
    }
    if let Some(outcome) = round.outcome() {
        writeln!(out, "Result: {} ({})", outcome, format_net(round.net()))?;
    }
    Ok(())
}
