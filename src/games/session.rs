//! Game sessions
//!
//! A session owns one ledger and one round controller behind a single mutex,
//! so debit, credit, round creation and round close never interleave between
//! concurrent requests.

use crate::config::SessionConfig;
use crate::errors::{RgsError, RgsResult};
use crate::games::catalogue::Catalogue;
use crate::games::ledger::BalanceLedger;
use crate::games::selector::BookSelector;
use crate::games::settlement::{Round, RoundController};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Session id every request maps to when sessions are not isolated
pub const SHARED_SESSION_ID: &str = "shared";

/// Round id reported by replays
pub const REPLAY_ROUND_ID: u64 = 1;

/// Balance as reported to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub amount: i64,
    pub currency: String,
}

impl BalanceSnapshot {
    fn of(ledger: &BalanceLedger) -> Self {
        Self {
            amount: ledger.read(),
            currency: ledger.currency().to_string(),
        }
    }
}

/// Result of a bet
#[derive(Debug, Clone)]
pub struct PlayOutcome {
    pub balance: BalanceSnapshot,
    pub round: Round,
}

#[derive(Debug)]
struct SessionState {
    ledger: BalanceLedger,
    rounds: RoundController,
}

/// One player's wallet and round state
pub struct Session {
    id: String,
    catalogue: Arc<Catalogue>,
    selector: Arc<dyn BookSelector>,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        catalogue: Arc<Catalogue>,
        selector: Arc<dyn BookSelector>,
        settings: &SessionConfig,
    ) -> Self {
        Self {
            id: id.into(),
            catalogue,
            selector,
            state: Mutex::new(SessionState {
                ledger: BalanceLedger::new(
                    settings.starting_balance,
                    settings.currency.clone(),
                    settings.overdraft,
                ),
                rounds: RoundController::new(settings.unclosed_round),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn lock(&self) -> RgsResult<MutexGuard<'_, SessionState>> {
        self.state.lock().map_err(|_| RgsError::StatePoisoned)
    }

    /// Reset to no round and report the balance
    pub fn authenticate(&self) -> RgsResult<BalanceSnapshot> {
        let mut state = self.lock()?;
        state.rounds.reset()?;
        debug!(session = %self.id, balance = state.ledger.read(), "Session authenticated");
        Ok(BalanceSnapshot::of(&state.ledger))
    }

    /// Select a book and play it for `amount`
    pub fn bet(&self, amount: u64, mode: &str) -> RgsResult<PlayOutcome> {
        let book = self.selector.select(&self.catalogue);

        let mut state = self.lock()?;
        let SessionState { ledger, rounds } = &mut *state;
        let round = rounds.bet(ledger, book, amount, mode)?;

        Ok(PlayOutcome {
            balance: BalanceSnapshot::of(ledger),
            round,
        })
    }

    /// Settle and clear the open round, if any
    pub fn close_round(&self) -> RgsResult<BalanceSnapshot> {
        let mut state = self.lock()?;
        let SessionState { ledger, rounds } = &mut *state;
        rounds.close_round(ledger)?;
        Ok(BalanceSnapshot::of(ledger))
    }

    pub fn balance(&self) -> RgsResult<BalanceSnapshot> {
        let state = self.lock()?;
        Ok(BalanceSnapshot::of(&state.ledger))
    }

    /// Store a client progress marker on the open round
    pub fn record_event(&self, event: &str) -> RgsResult<Option<u64>> {
        let mut state = self.lock()?;
        Ok(state.rounds.record_event(event))
    }

    pub fn active_round(&self) -> RgsResult<Option<Round>> {
        let state = self.lock()?;
        Ok(state.rounds.current().cloned())
    }

    /// Play a fresh random book for viewing only; the ledger and round
    /// sequence are left untouched.
    pub fn replay(&self, amount: u64, mode: &str) -> RgsResult<Round> {
        let book = self.selector.select(&self.catalogue);
        Round::from_book(REPLAY_ROUND_ID, book, amount, mode)
    }
}

/// Maps client session ids to sessions
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
    catalogue: Arc<Catalogue>,
    selector: Arc<dyn BookSelector>,
    settings: SessionConfig,
}

impl SessionRegistry {
    pub fn new(
        catalogue: Arc<Catalogue>,
        selector: Arc<dyn BookSelector>,
        settings: SessionConfig,
    ) -> Self {
        info!(
            books = catalogue.len(),
            selector = selector.name(),
            isolate_sessions = settings.isolate_sessions,
            "Session registry ready"
        );
        Self {
            sessions: DashMap::new(),
            catalogue,
            selector,
            settings,
        }
    }

    /// Session for a client id, created on first use.
    /// Without isolation every id resolves to the shared session.
    pub fn session(&self, session_id: Option<&str>) -> Arc<Session> {
        let key = match session_id {
            Some(id) if self.settings.isolate_sessions && !id.is_empty() => id,
            _ => SHARED_SESSION_ID,
        };

        self.sessions
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(session = key, "Creating session");
                Arc::new(Session::new(
                    key,
                    self.catalogue.clone(),
                    self.selector.clone(),
                    &self.settings,
                ))
            })
            .value()
            .clone()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RgsConfig;
    use crate::games::selector::{ScriptedSelector, UniformSelector};

    fn registry(isolate: bool, script: Vec<u64>) -> SessionRegistry {
        let settings = SessionConfig {
            isolate_sessions: isolate,
            ..SessionConfig::default()
        };
        SessionRegistry::new(
            Arc::new(Catalogue::embedded().unwrap()),
            Arc::new(ScriptedSelector::new(script)),
            settings,
        )
    }

    #[test]
    fn test_shared_session_by_default() {
        let registry = registry(false, vec![2]);
        let a = registry.session(Some("alice"));
        let b = registry.session(Some("bob"));
        assert_eq!(a.id(), SHARED_SESSION_ID);
        assert!(Arc::ptr_eq(&a, &b));

        a.bet(1_000_000, "BASE").unwrap();
        assert_eq!(b.balance().unwrap().amount, 10_000_700_000);
        assert_eq!(registry.session_count(), 1);
    }

    #[test]
    fn test_isolated_sessions_do_not_share_balance() {
        let registry = registry(true, vec![1]);
        let a = registry.session(Some("alice"));
        let b = registry.session(Some("bob"));

        a.bet(1_000_000, "BASE").unwrap();
        assert_eq!(a.balance().unwrap().amount, 9_999_000_000);
        assert_eq!(b.balance().unwrap().amount, 10_000_000_000);
        assert_eq!(registry.session_count(), 2);

        // Blank ids fall back to the shared session
        assert_eq!(registry.session(Some("")).id(), SHARED_SESSION_ID);
    }

    #[test]
    fn test_authenticate_discards_open_round() {
        let registry = registry(false, vec![4]);
        let session = registry.session(None);

        session.bet(1_000_000, "BASE").unwrap();
        assert!(session.active_round().unwrap().is_some());

        let balance = session.authenticate().unwrap();
        assert_eq!(balance.amount, 9_999_000_000);
        assert!(session.active_round().unwrap().is_none());

        // Nothing left to settle
        assert_eq!(session.close_round().unwrap().amount, 9_999_000_000);
    }

    #[test]
    fn test_strict_authenticate_keeps_unsettled_bonus() {
        let session = Session::new(
            "strict",
            Arc::new(Catalogue::embedded().unwrap()),
            Arc::new(ScriptedSelector::new(vec![4])),
            &RgsConfig::strict().session,
        );

        let outcome = session.bet(1_000_000, "BASE").unwrap();
        assert!(outcome.round.active);

        let err = session.authenticate().unwrap_err();
        assert!(matches!(err, RgsError::RoundInProgress { round_id: 1 }));
        assert!(session.active_round().unwrap().is_some());

        assert_eq!(session.close_round().unwrap().amount, 10_031_300_000);
        assert_eq!(session.authenticate().unwrap().amount, 10_031_300_000);
    }

    #[test]
    fn test_replay_bypasses_ledger() {
        let settings = SessionConfig::default();
        let session = Session::new(
            "replay",
            Arc::new(Catalogue::embedded().unwrap()),
            Arc::new(UniformSelector),
            &settings,
        );

        for _ in 0..10 {
            let round = session.replay(1_000_000, "BASE").unwrap();
            assert_eq!(round.round_id, REPLAY_ROUND_ID);
        }
        assert_eq!(session.balance().unwrap().amount, settings.starting_balance);
        assert!(session.active_round().unwrap().is_none());
    }

    #[test]
    fn test_concurrent_bets_keep_balance_consistent() {
        let registry = Arc::new(registry(false, vec![2, 1, 3]));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let registry = registry.clone();
            handles.push(std::thread::spawn(move || {
                let session = registry.session(None);
                (0..30)
                    .map(|_| session.bet(1_000_000, "BASE").unwrap().round.round_id)
                    .collect::<Vec<_>>()
            }));
        }

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=240).collect::<Vec<_>>());

        // 240 bets cycling 1.7x, 0x, 0.5x: 80 of each
        let expected = 10_000_000_000 - 240 * 1_000_000 + 80 * 1_700_000 + 80 * 500_000;
        assert_eq!(registry.session(None).balance().unwrap().amount, expected);
    }
}
