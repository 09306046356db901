//! Admission checks run before a record enters the ledger.
//!
//! The balance calculator trusts its input, so every rule about split
//! totals, participants and amounts lives here and is enforced by the
//! store before it mutates anything.

use crate::error::{LedgerError, Result};
use crate::model::{Expense, ExpenseDraft, Group, Member, MemberId, Split};
use crate::money::Money;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Trims a display name and rejects it if nothing is left.
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LedgerError::EmptyName);
    }
    Ok(name.to_string())
}

/// Rejects `name` if another member of `group` already uses it, ignoring case.
///
/// `exclude` skips one member, so a member can be renamed to a different
/// capitalization of its own name.
pub fn ensure_unique_member_name<'a>(
    group: &Group,
    members: impl IntoIterator<Item = &'a Member>,
    name: &str,
    exclude: Option<&MemberId>,
) -> Result<()> {
    let wanted = name.to_lowercase();
    let clash = members
        .into_iter()
        .filter(|m| group.has_member(&m.id))
        .filter(|m| Some(&m.id) != exclude)
        .any(|m| m.name.to_lowercase() == wanted);

    if clash {
        return Err(LedgerError::DuplicateMemberName {
            name: name.to_string(),
            group: group.id.clone(),
        });
    }
    Ok(())
}

/// Checks that an expense draft is well formed for `group`.
///
/// Rules:
/// - the amount is positive and at most [`Money::MAX_AMOUNT`]
/// - payer and every participant are members of the group
/// - participants are non-empty and distinct
/// - `exact` shares cover exactly the participants and sum to the amount
///   within [`Money::TOLERANCE`]
/// - `percent` shares cover exactly the participants and sum to 100 within
///   the same tolerance, each one within `0..=100`
pub fn validate_expense(draft: &ExpenseDraft, group: &Group) -> Result<()> {
    if !draft.amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount(draft.amount));
    }
    ensure_within_limit(draft.amount)?;

    ensure_member(group, &draft.payer_id)?;

    let participants = draft.split.participants();
    if participants.is_empty() {
        return Err(LedgerError::EmptyParticipants);
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if !seen.insert(participant) {
            return Err(LedgerError::DuplicateParticipant(participant.clone()));
        }
        ensure_member(group, participant)?;
    }

    match &draft.split {
        Split::Equal { .. } => Ok(()),
        Split::Exact { exact, .. } => {
            ensure_keys_match(&seen, exact.keys())?;
            if let Some((member, _)) = exact.iter().find(|(_, share)| **share < Money::ZERO) {
                return Err(LedgerError::NegativeShare(member.clone()));
            }
            let mut actual = Money::ZERO;
            for share in exact.values() {
                ensure_within_limit(*share)?;
                actual = actual
                    .checked_add(*share)
                    .ok_or(LedgerError::AmountTooLarge(*share))?;
            }
            if !actual.approx_eq(draft.amount) {
                return Err(LedgerError::ExactSharesMismatch {
                    expected: draft.amount,
                    actual,
                });
            }
            Ok(())
        }
        Split::Percent { percent, .. } => {
            ensure_keys_match(&seen, percent.keys())?;
            if let Some((member, _)) = percent.iter().find(|(_, pct)| pct.is_sign_negative()) {
                return Err(LedgerError::NegativeShare(member.clone()));
            }
            ensure_percentages_in_range(percent.iter())?;
            let actual: Decimal = percent.values().sum();
            if (actual - Decimal::ONE_HUNDRED).abs() > Money::TOLERANCE.as_decimal() {
                return Err(LedgerError::PercentagesMismatch { actual });
            }
            Ok(())
        }
    }
}

/// Rejects stored records whose magnitudes the engine cannot sum safely.
///
/// Applied to ledgers read from disk, which bypass [`validate_expense`].
pub fn check_stored_expense(expense: &Expense) -> Result<()> {
    ensure_within_limit(expense.amount.abs())?;
    match &expense.split {
        Split::Equal { .. } => Ok(()),
        Split::Exact { exact, .. } => exact
            .values()
            .try_for_each(|share| ensure_within_limit(share.abs())),
        Split::Percent { percent, .. } => ensure_percentages_in_range(percent.iter()),
    }
}

fn ensure_within_limit(amount: Money) -> Result<()> {
    if amount > Money::MAX_AMOUNT {
        return Err(LedgerError::AmountTooLarge(amount));
    }
    Ok(())
}

fn ensure_percentages_in_range<'a>(
    mut percentages: impl Iterator<Item = (&'a MemberId, &'a Decimal)>,
) -> Result<()> {
    match percentages.find(|(_, pct)| **pct < Decimal::ZERO || **pct > Decimal::ONE_HUNDRED) {
        Some((member, pct)) => Err(LedgerError::PercentageOutOfRange {
            member: member.clone(),
            percent: *pct,
        }),
        None => Ok(()),
    }
}

fn ensure_member(group: &Group, member: &MemberId) -> Result<()> {
    if group.has_member(member) {
        Ok(())
    } else {
        Err(LedgerError::NotAGroupMember {
            member: member.clone(),
            group: group.id.clone(),
        })
    }
}

fn ensure_keys_match<'a>(
    participants: &HashSet<&MemberId>,
    mut keys: impl ExactSizeIterator<Item = &'a MemberId>,
) -> Result<()> {
    if keys.len() != participants.len() {
        return Err(LedgerError::SplitKeysMismatch);
    }
    if keys.all(|k| participants.contains(k)) {
        Ok(())
    } else {
        Err(LedgerError::SplitKeysMismatch)
    }
}
