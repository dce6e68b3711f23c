//! # hitstand-ai: Strategy Advisors for Blackjack
//!
//! Advisors look at the active player hand and the dealer upcard and
//! recommend the next move. The terminal game shows their advice, the
//! simulator lets them play whole sessions, and the web service attaches
//! basic-strategy advice to every round view.
//!
//! ## Core Components
//!
//! - [`Advisor`] - Trait every strategy implements
//! - [`Advice`] - Recommendation, convertible into a [`PlayerAction`]
//! - [`baseline`] - Basic strategy table
//! - [`mimic`] - Plays the dealer's own stand-on-17 rule
//! - [`random`] - Seeded coin-flip player, a floor for simulations
//! - [`create_advisor`] - Factory by name
//!
//! ## Quick Start
//!
//! ```rust
//! use hitstand_ai::{create_advisor, Advice};
//! use hitstand_engine::cards::Rank;
//!
//! let advisor = create_advisor("basic").expect("known advisor");
//! let advice = advisor.advise(&[Rank::Six, Rank::Five], Rank::Nine);
//! assert_eq!(advice, Advice::DoubleOrHit);
//! ```

use std::fmt;

use hitstand_engine::cards::Rank;
use hitstand_engine::round::{PlayerAction, Round};

pub mod baseline;
pub mod mimic;
pub mod random;

/// Names accepted by [`create_advisor`].
pub const ADVISOR_NAMES: [&str; 3] = ["basic", "mimic", "random"];

/// A recommended move.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Advice {
    Hit,
    Stand,
    /// Double down when the hand still allows it, otherwise hit
    DoubleOrHit,
}

impl Advice {
    pub fn into_action(self, can_double: bool) -> PlayerAction {
        match self {
            Advice::Hit => PlayerAction::Hit,
            Advice::Stand => PlayerAction::Stand,
            Advice::DoubleOrHit if can_double => PlayerAction::DoubleDown,
            Advice::DoubleOrHit => PlayerAction::Hit,
        }
    }

    pub const fn describe(self) -> &'static str {
        match self {
            Advice::Hit => "Hit",
            Advice::Stand => "Stand",
            Advice::DoubleOrHit => "Double down (if possible), otherwise Hit",
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Interface for blackjack strategy advisors.
///
/// # Example Implementation
///
/// ```rust
/// use hitstand_ai::{Advice, Advisor};
/// use hitstand_engine::cards::Rank;
///
/// struct AlwaysStand;
///
/// impl Advisor for AlwaysStand {
///     fn advise(&self, _hand: &[Rank], _upcard: Rank) -> Advice {
///         Advice::Stand
///     }
///
///     fn name(&self) -> &str {
///         "always-stand"
///     }
/// }
/// ```
pub trait Advisor: Send + Sync {
    /// Recommend a move for `hand` against the dealer's visible card.
    fn advise(&self, hand: &[Rank], dealer_upcard: Rank) -> Advice;

    fn name(&self) -> &str;
}

/// Advice for the active hand of an in-play round, already resolved against
/// what the hand and the remaining `bankroll` allow. `None` once the round
/// has no active hand.
pub fn recommend(advisor: &dyn Advisor, round: &Round, bankroll: u32) -> Option<PlayerAction> {
    let hand = round.active_hand()?;
    let upcard = round.dealer_upcard()?;
    let can_double = hand.can_double() && bankroll >= hand.bet;
    Some(advisor.advise(&hand.cards, upcard).into_action(can_double))
}

/// Creates an advisor by name (`basic`, `mimic`, `random`).
///
/// ```rust
/// use hitstand_ai::create_advisor;
///
/// assert_eq!(create_advisor("basic").unwrap().name(), "basic");
/// assert!(create_advisor("oracle").is_none());
/// ```
pub fn create_advisor(name: &str) -> Option<Box<dyn Advisor>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "basic" | "baseline" => Some(Box::new(baseline::BasicStrategy::new())),
        "mimic" | "dealer" => Some(Box::new(mimic::DealerMimic)),
        "random" => Some(Box::new(random::RandomAdvisor::new(None))),
        _ => None,
    }
}
