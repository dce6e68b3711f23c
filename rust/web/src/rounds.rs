//! Round lifecycle for the web service: bet, act, resolve, persist.
//!
//! Each mutation runs under a per-account lock, works on a clone of the
//! stored round and the account's bankroll, and ends with one
//! [`Storage::commit`]. A failed engine action therefore commits nothing.

use crate::accounts::{Account, AccountId};
use crate::errors::{ErrorSeverity, IntoErrorResponse};
use crate::events::{EventBus, RoundEvent};
use crate::store::{now_rfc3339, Commit, RoundId, StoreError, Storage, StoredRound};
use hitstand_ai::baseline::BasicStrategy;
use hitstand_ai::recommend;
use hitstand_engine::cards::Rank;
use hitstand_engine::deck::Deck;
use hitstand_engine::errors::{ErrorKind, GameError};
use hitstand_engine::hand::HandStatus;
use hitstand_engine::logger::RoundRecord;
use hitstand_engine::outcome::Outcome;
use hitstand_engine::round::{PlayerAction, RoundPhase};
use hitstand_engine::rules::TableRules;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use uuid::Uuid;
use warp::http::StatusCode;

#[derive(Debug, Error)]
pub enum RoundError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("A round is already in progress: {0}")]
    RoundInProgress(RoundId),
    #[error("No round in progress")]
    NoOpenRound,
    #[error("Round not found: {0}")]
    RoundNotFound(RoundId),
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoErrorResponse for RoundError {
    fn status_code(&self) -> StatusCode {
        match self {
            RoundError::Game(err) => match err.kind() {
                ErrorKind::InvalidAmount | ErrorKind::InsufficientFunds => StatusCode::BAD_REQUEST,
                ErrorKind::InvalidState | ErrorKind::EmptyDeck => StatusCode::CONFLICT,
            },
            RoundError::RoundInProgress(_) => StatusCode::CONFLICT,
            RoundError::NoOpenRound
            | RoundError::RoundNotFound(_)
            | RoundError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            RoundError::Store(err) => err.status_code(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RoundError::Game(err) => match err.kind() {
                ErrorKind::InvalidAmount => "invalid_amount",
                ErrorKind::InsufficientFunds => "insufficient_funds",
                ErrorKind::InvalidState => "invalid_state",
                ErrorKind::EmptyDeck => "empty_deck",
            },
            RoundError::RoundInProgress(_) => "invalid_state",
            RoundError::NoOpenRound => "no_open_round",
            RoundError::RoundNotFound(_) => "round_not_found",
            RoundError::AccountNotFound(_) => "account_not_found",
            RoundError::Store(err) => err.error_code(),
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            RoundError::Game(GameError::InvalidAmount {
                amount,
                minimum,
                maximum,
            }) => Some(json!({ "amount": amount, "minimum": minimum, "maximum": maximum })),
            RoundError::Game(GameError::InsufficientFunds {
                required,
                available,
            }) => Some(json!({ "required": required, "available": available })),
            RoundError::Game(GameError::PayoutOverflow { stake }) => {
                Some(json!({ "stake": stake }))
            }
            RoundError::RoundInProgress(round_id) | RoundError::RoundNotFound(round_id) => {
                Some(json!({ "round_id": round_id }))
            }
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            RoundError::Store(err) => err.severity(),
            _ => ErrorSeverity::Client,
        }
    }
}

/// Where new rounds get their decks.
#[derive(Debug)]
pub enum DeckSource {
    /// Fresh random seed per round
    Random,
    /// Per-round seeds drawn from one ChaCha20 stream
    Seeded(Mutex<ChaCha20Rng>),
    /// Prepared decks dealt in order, then random decks
    Stacked(Mutex<VecDeque<Vec<Rank>>>),
}

impl DeckSource {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => DeckSource::Seeded(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
            None => DeckSource::Random,
        }
    }

    pub fn stacked<I>(decks: I) -> Self
    where
        I: IntoIterator<Item = Vec<Rank>>,
    {
        DeckSource::Stacked(Mutex::new(decks.into_iter().collect()))
    }

    fn next_deck(&self) -> Deck {
        match self {
            DeckSource::Random => Deck::new(),
            DeckSource::Seeded(rng) => {
                let seed = rng.lock().unwrap_or_else(PoisonError::into_inner).next_u64();
                Deck::new_with_seed(seed)
            }
            DeckSource::Stacked(decks) => decks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .map(Deck::from_ranks)
                .unwrap_or_else(Deck::new),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandView {
    pub cards: Vec<Rank>,
    pub value: u32,
    pub soft: bool,
    pub bet: u32,
    pub doubled: bool,
    pub status: HandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<u32>,
}

/// The dealer as the player may see it: the hole card stays hidden until
/// the round resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerView {
    pub cards: Vec<Rank>,
    pub hidden: usize,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub round_id: RoundId,
    pub phase: RoundPhase,
    pub hands: Vec<HandView>,
    pub active_hand: Option<usize>,
    pub dealer: DealerView,
    pub available_actions: Vec<PlayerAction>,
    /// Basic-strategy suggestion for the active hand
    pub advice: Option<PlayerAction>,
    pub actions: Vec<PlayerAction>,
    pub total_bet: u32,
    pub outcome: Option<Outcome>,
    pub payout: Option<u32>,
    pub net: Option<i64>,
    pub bankroll: u32,
}

impl RoundView {
    pub fn new(stored: &StoredRound, bankroll: u32) -> Self {
        let round = &stored.round;
        let resolved = round.is_resolved();
        let settlements = round.settlements();

        let hands = round
            .hands()
            .iter()
            .enumerate()
            .map(|(i, hand)| HandView {
                cards: hand.cards.clone(),
                value: hand.value(),
                soft: hand.is_soft(),
                bet: hand.bet,
                doubled: hand.doubled,
                status: hand.status,
                outcome: settlements.get(i).map(|s| s.outcome),
                payout: settlements.get(i).map(|s| s.payout),
            })
            .collect();

        let dealer = if resolved {
            DealerView {
                cards: round.dealer_cards().to_vec(),
                hidden: 0,
                value: round.dealer_value(),
            }
        } else {
            let shown: Vec<Rank> = round.dealer_upcard().into_iter().collect();
            DealerView {
                hidden: round.dealer_cards().len().saturating_sub(shown.len()),
                value: shown.iter().map(|r| r.value()).sum(),
                cards: shown,
            }
        };

        Self {
            round_id: stored.id.clone(),
            phase: round.phase(),
            hands,
            active_hand: round.active_index(),
            dealer,
            available_actions: round.available_actions(),
            advice: recommend(&BasicStrategy::new(), round, bankroll),
            actions: stored.actions.clone(),
            total_bet: round.total_bet(),
            outcome: round.outcome(),
            payout: resolved.then(|| round.total_payout()),
            net: resolved.then(|| round.net()),
            bankroll,
        }
    }
}

/// Owns the round lifecycle for every account.
#[derive(Debug)]
pub struct RoundManager {
    store: Arc<dyn Storage>,
    events: Arc<EventBus>,
    rules: TableRules,
    decks: DeckSource,
    locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl RoundManager {
    pub fn new(
        store: Arc<dyn Storage>,
        events: Arc<EventBus>,
        rules: TableRules,
        decks: DeckSource,
    ) -> Self {
        Self {
            store,
            events,
            rules,
            decks,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    /// Runs `f` as the only writer for the account. The account's lock entry
    /// is dropped again once nobody else holds or waits on it.
    fn with_account_lock<T>(&self, account_id: &str, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(account_id.to_string()).or_default())
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // the map and `lock` are the only owners: no other writer is queued
        if Arc::strong_count(&lock) == 2 {
            locks.remove(account_id);
        }
        result
    }

    /// Accounts with a writer in flight.
    #[cfg(test)]
    fn busy_accounts(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn load_account(&self, account_id: &str) -> Result<Account, RoundError> {
        self.store
            .account(account_id)?
            .ok_or_else(|| RoundError::AccountNotFound(account_id.to_string()))
    }

    /// Escrows `bet`, deals, and stores the new round.
    pub fn start_round(&self, account_id: &str, bet: u32) -> Result<RoundView, RoundError> {
        self.with_account_lock(account_id, || self.start_round_locked(account_id, bet))
    }

    fn start_round_locked(&self, account_id: &str, bet: u32) -> Result<RoundView, RoundError> {
        let account = self.load_account(account_id)?;
        if let Some(open) = self.store.open_round(account_id)? {
            return Err(RoundError::RoundInProgress(open.id));
        }

        let mut bankroll = account.bankroll;
        let mut round = hitstand_engine::round::Round::new(self.decks.next_deck(), self.rules);
        round.place_bet(&mut bankroll, bet)?;

        let now = now_rfc3339();
        let stored = StoredRound {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            round,
            actions: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.store.commit(Commit {
            account_id: account_id.to_string(),
            bankroll,
            round: stored.clone(),
            history: None,
        })?;

        tracing::info!(account_id = %account_id, round_id = %stored.id, bet, "round started");
        let view = RoundView::new(&stored, bankroll);
        self.events.publish(RoundEvent::RoundStarted {
            round_id: stored.id.clone(),
            round: view.clone(),
        });
        Ok(view)
    }

    pub fn current_round(&self, account_id: &str) -> Result<RoundView, RoundError> {
        let account = self.load_account(account_id)?;
        let stored = self
            .store
            .open_round(account_id)?
            .ok_or(RoundError::NoOpenRound)?;
        Ok(RoundView::new(&stored, account.bankroll))
    }

    /// A round owned by the account; other accounts' rounds are reported as missing.
    pub fn round(&self, account_id: &str, round_id: &str) -> Result<RoundView, RoundError> {
        let account = self.load_account(account_id)?;
        let stored = self.owned_round(account_id, round_id)?;
        Ok(RoundView::new(&stored, account.bankroll))
    }

    /// Checks that the round exists and belongs to the account.
    pub fn ensure_owned(&self, account_id: &str, round_id: &str) -> Result<(), RoundError> {
        self.owned_round(account_id, round_id).map(|_| ())
    }

    fn owned_round(&self, account_id: &str, round_id: &str) -> Result<StoredRound, RoundError> {
        self.store
            .round(round_id)?
            .filter(|stored| stored.account_id == account_id)
            .ok_or_else(|| RoundError::RoundNotFound(round_id.to_string()))
    }

    pub fn apply_action(
        &self,
        account_id: &str,
        round_id: &str,
        action: PlayerAction,
    ) -> Result<RoundView, RoundError> {
        self.with_account_lock(account_id, || {
            self.apply_action_locked(account_id, round_id, action)
        })
    }

    fn apply_action_locked(
        &self,
        account_id: &str,
        round_id: &str,
        action: PlayerAction,
    ) -> Result<RoundView, RoundError> {
        let account = self.load_account(account_id)?;
        let mut stored = self.owned_round(account_id, round_id)?;
        let mut bankroll = account.bankroll;

        if let Err(err) = stored.round.apply(action, &mut bankroll) {
            tracing::debug!(
                account_id = %account_id,
                round_id = %round_id,
                action = action.as_str(),
                error = %err,
                "action rejected"
            );
            return Err(err.into());
        }
        stored.actions.push(action);
        stored.updated_at = now_rfc3339();

        let history = RoundRecord::from_round(
            stored.id.clone(),
            &stored.round,
            stored.actions.clone(),
            bankroll,
        )
        .map(|mut record| {
            record.ts = Some(stored.updated_at.clone());
            record
        });
        let resolved = history.is_some();

        self.store.commit(Commit {
            account_id: account_id.to_string(),
            bankroll,
            round: stored.clone(),
            history,
        })?;

        let view = RoundView::new(&stored, bankroll);
        tracing::debug!(
            account_id = %account_id,
            round_id = %round_id,
            action = action.as_str(),
            "action applied"
        );
        self.events.publish(RoundEvent::ActionApplied {
            round_id: stored.id.clone(),
            action,
            round: view.clone(),
        });

        if resolved {
            if let Some(outcome) = stored.round.outcome() {
                tracing::info!(
                    account_id = %account_id,
                    round_id = %round_id,
                    outcome = outcome.as_str(),
                    payout = stored.round.total_payout(),
                    bankroll,
                    "round resolved"
                );
                self.events.publish(RoundEvent::RoundResolved {
                    round_id: stored.id.clone(),
                    outcome,
                    payout: stored.round.total_payout(),
                    bankroll,
                });
            }
        }
        Ok(view)
    }
}
