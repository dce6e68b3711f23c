//! # hitstand-engine: Blackjack Game Engine Core
//!
//! A deterministic single-deck blackjack engine. Provides hand valuation with
//! soft/hard ace adjustment, the dealer stand-on-17 policy, outcome settlement
//! and a round state machine covering bet, hit, stand, double-down and split.
//! Decks are shuffled with a seeded ChaCha20 RNG so any round can be replayed.
//!
//! ## Core Modules
//!
//! - [`cards`] - Rank representation and its fixed value table
//! - [`deck`] - Seeded shuffle-then-draw deck (or stacked decks for tests)
//! - [`hand`] - Hand valuation, bust/blackjack/soft checks, player hands
//! - [`dealer`] - Dealer drawing policy
//! - [`outcome`] - Win/lose/tie/bust settlement
//! - [`rules`] - Table limits, bet escrow and split policy
//! - [`round`] - Round state machine and player actions
//! - [`engine`] - Stateless deal/hit/stand primitives
//! - [`logger`] - RoundRecord serialization to JSONL
//! - [`stats`] - Win/loss tallies over many rounds
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use hitstand_engine::cards::Rank;
//! use hitstand_engine::hand::{hand_value, is_blackjack};
//!
//! assert_eq!(hand_value(&[Rank::Ace, Rank::Ace, Rank::Nine]), 21);
//! assert!(is_blackjack(&[Rank::Ace, Rank::King]));
//! ```
//!
//! ## Playing a Round
//!
//! ```rust
//! use hitstand_engine::deck::Deck;
//! use hitstand_engine::round::{PlayerAction, Round};
//! use hitstand_engine::rules::TableRules;
//!
//! let mut round = Round::new(Deck::new_with_seed(42), TableRules::default());
//! let mut bankroll = 1000;
//! round.place_bet(&mut bankroll, 25).unwrap();
//! while !round.is_resolved() {
//!     round.apply(PlayerAction::Stand, &mut bankroll).unwrap();
//! }
//! println!("{:?} -> bankroll {}", round.outcome(), bankroll);
//! ```

pub mod cards;
pub mod dealer;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod hand;
pub mod logger;
pub mod outcome;
pub mod round;
pub mod rules;
pub mod stats;
