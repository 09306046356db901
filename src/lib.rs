//! # Expense Splitter
//!
//! A group expense ledger: members of a group record who paid for what and
//! how each cost is split, and the engine works out who owes whom.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: amounts are exact 2-place decimals via
//!   `rust_decimal`, rounded half away from zero
//! - **One cent tolerance**: [`Money::TOLERANCE`] is the single definition
//!   of "effectively zero"
//! - **Pure engine**: [`compute_balances`] and [`suggest_settlements`]
//!   read a [`LedgerStore`] snapshot and return fresh values
//! - **All-or-nothing admission**: the store validates every expense before
//!   it is recorded
//!
//! ## Example
//!
//! ```
//! use expense_splitter::{ExpenseDraft, LedgerStore, Money, Split};
//!
//! # fn main() -> expense_splitter::Result<()> {
//! let mut store = LedgerStore::new();
//! let trip = store.create_group("Trip")?;
//! let a = store.add_member(&trip, "Aditi")?;
//! let r = store.add_member(&trip, "Ravi")?;
//!
//! store.add_expense(ExpenseDraft::new(
//!     trip.clone(),
//!     "Hotel",
//!     Money::from_cents(10_000),
//!     a.clone(),
//!     Split::equal(vec![a.clone(), r.clone()]),
//! ))?;
//!
//! let balances = store.balances(&trip);
//! assert_eq!(balances[&a].to_string(), "50.00");
//!
//! let plan = store.settlements(&trip);
//! assert_eq!(plan.len(), 1);
//! assert_eq!(plan[0].from, r);
//! # Ok(())
//! # }
//! ```

pub mod balance;
pub mod error;
pub mod model;
pub mod money;
pub mod report;
pub mod settlement;
pub mod store;
pub mod validation;

pub use balance::{compute_balances, expense_shares, Balances};
pub use error::{LedgerError, Result};
pub use model::{Expense, ExpenseDraft, ExpenseId, Group, GroupId, Member, MemberId, Split};
pub use money::Money;
pub use settlement::{apply_transfers, suggest_settlements, Transfer};
pub use store::LedgerStore;
