pub mod ledger;

pub use ledger::{LedgerClient, LedgerError};
