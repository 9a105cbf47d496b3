//! Round Lifecycle Controller
//!
//! Governs one bet-to-settlement cycle. A round's payout is credited exactly
//! once: at bet time for outcomes without a free-spin trigger, or at round
//! close for bonus outcomes. The controller is the only writer allowed to
//! credit a deferred payout.
//!
//! ```text
//! NoRound --bet--> RoundOpen{immediate} --close--> NoRound
//!         --bet--> RoundOpen{deferred}  --close (credit payout)--> NoRound
//! ```

use crate::errors::{RgsError, RgsResult};
use crate::games::ledger::BalanceLedger;
use crate::games::types::{Book, IndexedEvent, Multiplier};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What a new bet or authenticate does with a round that was never closed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnclosedRoundPolicy {
    /// Replace the old round; an unsettled bonus payout is forfeited
    #[default]
    Discard,
    /// Refuse a new bet or authenticate while a bonus payout is awaiting settlement
    Reject,
}

/// When a round's payout reaches the ledger
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Settlement {
    /// Credited during the bet
    Immediate,
    /// Credited when the round is closed
    Deferred,
    /// Zero payout, nothing to credit
    Nothing,
}

/// One bet-to-settlement cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub round_id: u64,
    pub book_id: u64,
    pub amount: u64,
    pub payout: u64,
    pub payout_multiplier: Multiplier,
    /// True iff a bonus payout is still awaiting settlement
    pub active: bool,
    pub settlement: Settlement,
    pub state: Vec<IndexedEvent>,
    pub mode: String,
    /// Last progress marker reported by the client
    pub event: Option<String>,
    pub opened_at: DateTime<Utc>,
}

impl Round {
    /// Build a round from a book without touching any ledger
    pub fn from_book(round_id: u64, book: &Book, amount: u64, mode: &str) -> RgsResult<Self> {
        let payout = book
            .payout_multiplier
            .apply(amount)
            .ok_or(RgsError::PayoutOverflow { bet: amount })?;

        let settlement = match (book.is_bonus(), payout > 0) {
            (_, false) => Settlement::Nothing,
            (true, true) => Settlement::Deferred,
            (false, true) => Settlement::Immediate,
        };

        Ok(Self {
            round_id,
            book_id: book.id,
            amount,
            payout,
            payout_multiplier: book.payout_multiplier,
            active: settlement == Settlement::Deferred,
            settlement,
            state: book.events.clone(),
            mode: mode.to_string(),
            event: None,
            opened_at: Utc::now(),
        })
    }

    /// Time since the round was opened
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.opened_at)
    }
}

/// Result of closing a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOutcome {
    pub balance: i64,
    /// Round that was consumed, if any
    pub round_id: Option<u64>,
    /// Amount credited by this close
    pub credited: u64,
}

/// Owns the current round and the round-id sequence
#[derive(Debug)]
pub struct RoundController {
    current: Option<Round>,
    next_round_id: u64,
    unclosed: UnclosedRoundPolicy,
}

impl RoundController {
    pub fn new(unclosed: UnclosedRoundPolicy) -> Self {
        Self {
            current: None,
            next_round_id: 1,
            unclosed,
        }
    }

    pub fn current(&self) -> Option<&Round> {
        self.current.as_ref()
    }

    pub fn next_round_id(&self) -> u64 {
        self.next_round_id
    }

    /// Place a bet against `book`: debit, settle immediately when possible,
    /// and open a new round in place of any previous one.
    pub fn bet(
        &mut self,
        ledger: &mut BalanceLedger,
        book: &Book,
        amount: u64,
        mode: &str,
    ) -> RgsResult<Round> {
        self.guard_unclosed()?;

        let round = Round::from_book(self.next_round_id, book, amount, mode)?;

        ledger.debit(amount)?;
        if round.settlement == Settlement::Immediate {
            if let Err(e) = ledger.credit(round.payout) {
                ledger.credit(amount)?;
                return Err(e);
            }
        }

        self.next_round_id += 1;
        if let Some(previous) = self.current.take() {
            self.log_discard(&previous, "bet");
        }

        info!(
            round_id = round.round_id,
            book_id = round.book_id,
            amount,
            payout = round.payout,
            settlement = ?round.settlement,
            balance = ledger.read(),
            "Round opened"
        );

        self.current = Some(round.clone());
        Ok(round)
    }

    /// Credit a pending bonus payout, then clear the round.
    /// With no round open this is a no-op.
    pub fn close_round(&mut self, ledger: &mut BalanceLedger) -> RgsResult<CloseOutcome> {
        let Some(round) = self.current.as_ref() else {
            debug!(balance = ledger.read(), "Close requested with no open round");
            return Ok(CloseOutcome {
                balance: ledger.read(),
                round_id: None,
                credited: 0,
            });
        };

        let credited = if round.active && round.payout > 0 {
            ledger.credit(round.payout)?;
            round.payout
        } else {
            0
        };

        let round_id = round.round_id;
        let age_ms = round.age().num_milliseconds();
        self.current = None;

        info!(round_id, credited, age_ms, balance = ledger.read(), "Round closed");

        Ok(CloseOutcome {
            balance: ledger.read(),
            round_id: Some(round_id),
            credited,
        })
    }

    /// Drop any open round without crediting it.
    /// Under the reject policy an unsettled bonus blocks the reset instead.
    pub fn reset(&mut self) -> RgsResult<Option<Round>> {
        self.guard_unclosed()?;
        let previous = self.current.take();
        if let Some(round) = &previous {
            self.log_discard(round, "authenticate");
        }
        Ok(previous)
    }

    fn guard_unclosed(&self) -> RgsResult<()> {
        match &self.current {
            Some(round) if round.active && self.unclosed == UnclosedRoundPolicy::Reject => {
                Err(RgsError::RoundInProgress {
                    round_id: round.round_id,
                })
            }
            _ => Ok(()),
        }
    }

    /// Store the client's progress marker on the open round
    pub fn record_event(&mut self, event: &str) -> Option<u64> {
        let round = self.current.as_mut()?;
        round.event = Some(event.to_string());
        debug!(round_id = round.round_id, event, "Round event recorded");
        Some(round.round_id)
    }

    fn log_discard(&self, round: &Round, cause: &str) {
        if round.active {
            warn!(
                round_id = round.round_id,
                forfeited = round.payout,
                age_ms = round.age().num_milliseconds(),
                cause,
                "Discarding active round with unsettled payout"
            );
        } else {
            debug!(
                round_id = round.round_id,
                age_ms = round.age().num_milliseconds(),
                cause,
                "Discarding settled round"
            );
        }
    }
}
