//! Net balance computation for a group.
//!
//! A positive balance means the member is owed money overall, a negative
//! one means the member owes money. Balances are recomputed from scratch
//! on every call; nothing is cached between calls.

use crate::model::{Expense, GroupId, MemberId, Split};
use crate::money::Money;
use crate::store::LedgerStore;
use log::debug;
use std::collections::BTreeMap;

/// Signed net balance per member, iterated in member-id order.
pub type Balances = BTreeMap<MemberId, Money>;

/// Computes every current member's net balance within a group.
///
/// The result has one entry per member of the group, including members
/// with a zero balance. An unknown group or a group without members yields
/// an empty mapping.
///
/// Each expense credits its payer with the full amount and debits each
/// participant with their share (see [`expense_shares`]). A payer or
/// participant that is no longer a group member is skipped for that side
/// of the entry rather than failing the whole computation.
///
/// The result depends only on the store snapshot; expense order does not
/// matter.
pub fn compute_balances(store: &LedgerStore, group_id: &GroupId) -> Balances {
    let mut balances: Balances = store
        .group_members(group_id)
        .into_iter()
        .map(|member| (member.id.clone(), Money::ZERO))
        .collect();

    if balances.is_empty() {
        return balances;
    }

    for expense in store.group_expenses(group_id) {
        match balances.get_mut(&expense.payer_id) {
            Some(balance) => *balance += expense.amount,
            None => debug!(
                "Expense {}: payer {} is not a member of group {}, skipping credit",
                expense.id, expense.payer_id, group_id
            ),
        }

        for (participant, share) in expense_shares(expense) {
            match balances.get_mut(participant) {
                Some(balance) => *balance -= share,
                None => debug!(
                    "Expense {}: participant {} is not a member of group {}, skipping debit",
                    expense.id, participant, group_id
                ),
            }
        }
    }

    for balance in balances.values_mut() {
        *balance = Money::new(balance.as_decimal());
    }

    balances
}

/// Each participant's share of an expense, in participant order.
///
/// - `equal`: the amount divided by the participant count, rounded per
///   participant. The rounding residual is not assigned to anyone, so the
///   shares may fall short of (or exceed) the amount by up to one cent per
///   participant.
/// - `exact`: the stored share as-is; a participant missing from the share
///   map owes nothing.
/// - `percent`: `amount * pct / 100`, rounded per participant; a missing
///   percentage counts as zero.
pub fn expense_shares(expense: &Expense) -> Vec<(&MemberId, Money)> {
    match &expense.split {
        Split::Equal { participants } => match expense.amount.split_evenly(participants.len()) {
            Some(share) => participants.iter().map(|p| (p, share)).collect(),
            None => Vec::new(),
        },
        Split::Exact {
            participants,
            exact,
        } => participants
            .iter()
            .map(|p| (p, exact.get(p).copied().unwrap_or(Money::ZERO)))
            .collect(),
        Split::Percent {
            participants,
            percent,
        } => participants
            .iter()
            .map(|p| {
                let share = percent
                    .get(p)
                    .map(|pct| expense.amount.percent_of(*pct))
                    .unwrap_or(Money::ZERO);
                (p, share)
            })
            .collect(),
    }
}
