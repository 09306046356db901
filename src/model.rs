//! Ledger records: groups, members, expenses and their splits.
//!
//! These are plain data. Invariants such as "participants belong to the
//! group" are checked when records are admitted to the
//! [`LedgerStore`](crate::store::LedgerStore), not here.

use crate::money::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier, e.g. one loaded from a saved ledger.
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                $name(format!(concat!($prefix, "_{}"), Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name::new(id)
            }
        }
    };
}

string_id!(
    /// Unique group identifier.
    GroupId,
    "g"
);
string_id!(
    /// Globally unique member identifier.
    MemberId,
    "m"
);
string_id!(
    /// Unique expense identifier.
    ExpenseId,
    "e"
);

/// A named set of members sharing expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,

    /// Members in insertion order. Membership only; member records live in
    /// the store's member collection.
    pub member_ids: Vec<MemberId>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Group {
            id: GroupId::generate(),
            name: name.into(),
            member_ids: Vec::new(),
        }
    }

    pub fn has_member(&self, member: &MemberId) -> bool {
        self.member_ids.contains(member)
    }
}

/// A person who can pay for or take part in expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Member {
            id: MemberId::generate(),
            name: name.into(),
        }
    }
}

/// The rule attributing an expense across its participants.
///
/// Serialized with a `type` tag and the participant list alongside the
/// per-variant share map:
///
/// ```json
/// {"type": "percent", "participants": ["u1", "u2"], "percent": {"u1": 60, "u2": 40}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Split {
    /// Every participant owes the same rounded share.
    Equal { participants: Vec<MemberId> },

    /// Each participant owes an explicit amount.
    Exact {
        participants: Vec<MemberId>,
        exact: BTreeMap<MemberId, Money>,
    },

    /// Each participant owes a percentage of the amount.
    Percent {
        participants: Vec<MemberId>,
        percent: BTreeMap<MemberId, Decimal>,
    },
}

impl Split {
    pub fn equal(participants: Vec<MemberId>) -> Self {
        Split::Equal { participants }
    }

    /// Builds an exact split; participants are listed in identifier order.
    pub fn exact(shares: impl IntoIterator<Item = (MemberId, Money)>) -> Self {
        let exact: BTreeMap<MemberId, Money> = shares.into_iter().collect();
        Split::Exact {
            participants: exact.keys().cloned().collect(),
            exact,
        }
    }

    /// Builds a percent split; participants are listed in identifier order.
    pub fn percent(shares: impl IntoIterator<Item = (MemberId, Decimal)>) -> Self {
        let percent: BTreeMap<MemberId, Decimal> = shares.into_iter().collect();
        Split::Percent {
            participants: percent.keys().cloned().collect(),
            percent,
        }
    }

    pub fn participants(&self) -> &[MemberId] {
        match self {
            Split::Equal { participants }
            | Split::Exact { participants, .. }
            | Split::Percent { participants, .. } => participants,
        }
    }

    /// Short variant name, as used in the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Split::Equal { .. } => "equal",
            Split::Exact { .. } => "exact",
            Split::Percent { .. } => "percent",
        }
    }

    /// Drops a member from the participant list and from any share map.
    ///
    /// Returns `true` if the member was a participant.
    pub fn remove_participant(&mut self, member: &MemberId) -> bool {
        let participants = match self {
            Split::Equal { participants } => participants,
            Split::Exact {
                participants,
                exact,
            } => {
                exact.remove(member);
                participants
            }
            Split::Percent {
                participants,
                percent,
            } => {
                percent.remove(member);
                participants
            }
        };
        let before = participants.len();
        participants.retain(|p| p != member);
        participants.len() != before
    }
}

/// A recorded payment by one member, attributed across participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub description: String,

    /// Always positive once admitted.
    pub amount: Money,
    pub payer_id: MemberId,
    pub split: Split,

    /// Display ordering only; never affects balances.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Caller input for a new expense. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub group_id: GroupId,
    pub description: String,
    pub amount: Money,
    pub payer_id: MemberId,
    pub split: Split,
}

impl ExpenseDraft {
    pub fn new(
        group_id: GroupId,
        description: impl Into<String>,
        amount: Money,
        payer_id: MemberId,
        split: Split,
    ) -> Self {
        ExpenseDraft {
            group_id,
            description: description.into(),
            amount,
            payer_id,
            split,
        }
    }
}
