//! Error types for the expense ledger.

use crate::model::{ExpenseId, GroupId, MemberId};
use crate::money::Money;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while admitting or mutating ledger records.
///
/// Validation variants are raised before any state changes, so a rejected
/// expense or rename leaves the store untouched.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to read or write a ledger file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ledger JSON could not be parsed or produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV report could not be written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown group {0}")]
    UnknownGroup(GroupId),

    #[error("Unknown member {0}")]
    UnknownMember(MemberId),

    #[error("Unknown expense {0}")]
    UnknownExpense(ExpenseId),

    /// Expense amount is zero or negative
    #[error("Expense amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    #[error("Expense must have at least one participant")]
    EmptyParticipants,

    #[error("Member {0} is listed more than once as a participant")]
    DuplicateParticipant(MemberId),

    /// Payer or participant does not belong to the expense's group
    #[error("Member {member} is not part of group {group}")]
    NotAGroupMember { member: MemberId, group: GroupId },

    /// Exact or percent split keys differ from the participant list
    #[error("Split shares must be given for exactly the listed participants")]
    SplitKeysMismatch,

    #[error("Share for member {0} must not be negative")]
    NegativeShare(MemberId),

    /// Exact shares do not add up to the expense amount
    #[error("Exact amounts must sum to {expected}, got {actual}")]
    ExactSharesMismatch { expected: Money, actual: Money },

    /// Percentages do not add up to 100
    #[error("Percentages must sum to 100, got {actual}")]
    PercentagesMismatch { actual: Decimal },

    /// Amount or share above [`Money::MAX_AMOUNT`]
    #[error("Amount {0} exceeds the limit of {max}", max = Money::MAX_AMOUNT)]
    AmountTooLarge(Money),

    #[error("Percentage {percent} for member {member} is outside 0..=100")]
    PercentageOutOfRange { member: MemberId, percent: Decimal },

    #[error("Name must not be empty")]
    EmptyName,

    /// Another member of the same group already uses this name
    #[error("Member name {name:?} is already used in group {group}")]
    DuplicateMemberName { name: String, group: GroupId },
}
