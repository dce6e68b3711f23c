use crate::errors::{ErrorSeverity, IntoErrorResponse};
use crate::store::{StoreError, Storage};
use hitstand_engine::logger::RoundRecord;
use hitstand_engine::stats::RoundStats;
use std::sync::Arc;
use thiserror::Error;
use warp::http::StatusCode;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// Read side of the per-account round history.
#[derive(Debug, Clone)]
pub struct HistoryService {
    store: Arc<dyn Storage>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Most recent rounds first. `None` means the default limit.
    pub fn recent(
        &self,
        account_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RoundRecord>, HistoryError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if limit == 0 || limit > MAX_HISTORY_LIMIT {
            return Err(HistoryError::InvalidLimit(limit));
        }
        Ok(self.store.history(account_id, limit)?)
    }

    /// Totals over every resolved round of the account.
    pub fn stats(&self, account_id: &str) -> Result<RoundStats, HistoryError> {
        let records = self.store.history(account_id, usize::MAX)?;
        Ok(records
            .iter()
            .map(|r| (r.outcome, r.total_bet, r.payout))
            .collect())
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("limit must be between 1 and {MAX_HISTORY_LIMIT}, got {0}")]
    InvalidLimit(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoErrorResponse for HistoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            HistoryError::InvalidLimit(_) => StatusCode::BAD_REQUEST,
            HistoryError::Store(err) => err.status_code(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            HistoryError::InvalidLimit(_) => "invalid_limit",
            HistoryError::Store(err) => err.error_code(),
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            HistoryError::InvalidLimit(_) => ErrorSeverity::Client,
            HistoryError::Store(err) => err.severity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Account;
    use crate::store::{now_rfc3339, Commit, MemoryStore, StoredRound};
    use hitstand_engine::cards::Rank::{self, *};
    use hitstand_engine::deck::Deck;
    use hitstand_engine::round::Round;
    use hitstand_engine::rules::TableRules;

    fn play(store: &dyn Storage, id: &str, deck: Vec<Rank>, bet: u32) {
        let mut bankroll = store.account("a1").unwrap().unwrap().bankroll;
        let mut round = Round::new(Deck::from_ranks(deck), TableRules::default());
        round.place_bet(&mut bankroll, bet).unwrap();
        round.stand(&mut bankroll).unwrap();
        let history = RoundRecord::from_round(id.into(), &round, vec![], bankroll);
        store
            .commit(Commit {
                account_id: "a1".into(),
                bankroll,
                round: StoredRound {
                    id: id.into(),
                    account_id: "a1".into(),
                    round,
                    actions: vec![],
                    created_at: now_rfc3339(),
                    updated_at: now_rfc3339(),
                },
                history,
            })
            .unwrap();
    }

    fn service() -> HistoryService {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_account(&Account {
                id: "a1".into(),
                username: "alice".into(),
                password_hash: "x$y".into(),
                bankroll: 1000,
                created_at: now_rfc3339(),
            })
            .unwrap();
        // win, lose, tie
        play(store.as_ref(), "r1", vec![Ten, King, Nine, Eight], 50);
        play(store.as_ref(), "r2", vec![Ten, Seven, Ten, Nine], 20);
        play(store.as_ref(), "r3", vec![Ten, Eight, Ten, Eight], 10);
        HistoryService::new(store)
    }

    #[test]
    fn recent_defaults_and_bounds() {
        let history = service();
        let all = history.recent("a1", None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].round_id, "r3");
        assert_eq!(history.recent("a1", Some(1)).unwrap().len(), 1);
        assert!(matches!(
            history.recent("a1", Some(0)),
            Err(HistoryError::InvalidLimit(0))
        ));
        assert!(history.recent("a1", Some(1001)).is_err());
        assert!(history.recent("nobody", None).unwrap().is_empty());
    }

    #[test]
    fn stats_tally_every_round() {
        let stats = service().stats("a1").unwrap();
        assert_eq!(stats.rounds, 3);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.ties, 1);
        assert_eq!(stats.net, 30);
        assert_eq!(stats.total_bet, 80);
    }
}
