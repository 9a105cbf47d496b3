pub mod types;
pub mod catalogue;
pub mod selector;
pub mod ledger;
pub mod settlement;
pub mod session;

pub use types::*;
pub use catalogue::Catalogue;
pub use selector::{BookSelector, ScriptedSelector, UniformSelector};
pub use ledger::{BalanceLedger, OverdraftPolicy};
pub use settlement::{Round, RoundController, Settlement, UnclosedRoundPolicy};
pub use session::{BalanceSnapshot, PlayOutcome, Session, SessionRegistry};
