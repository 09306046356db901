//! Settlement planning: turning net balances into transfers.
//!
//! The planner is a greedy matcher. It always pays the largest remaining
//! debt to the largest remaining credit, which bounds the plan to `k - 1`
//! transfers for `k` unsettled members but does not search for the
//! smallest possible plan.

use crate::balance::Balances;
use crate::model::MemberId;
use crate::money::Money;
use log::debug;
use serde::{Deserialize, Serialize};

/// A suggested payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Member paying (negative balance).
    pub from: MemberId,

    /// Member receiving (positive balance).
    pub to: MemberId,

    /// Always positive, 2 decimal places.
    pub amount: Money,
}

/// A member's outstanding magnitude while planning.
struct Position<'a> {
    member: &'a MemberId,
    remaining: Money,
}

/// Suggests transfers that bring every balance to within one cent of zero.
///
/// Members with a balance above [`Money::TOLERANCE`] are creditors, those
/// below `-TOLERANCE` are debtors, everyone else is already settled. Both
/// sides are sorted by magnitude, largest first, and matched pairwise: each
/// transfer moves `min(creditor, debtor)` and retires whichever side drops
/// below the tolerance.
///
/// The order among members with equal balances is not specified.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use expense_splitter::{suggest_settlements, Balances, MemberId, Money};
///
/// let balances: Balances = [
///     (MemberId::new("a"), Money::from_str("50").unwrap()),
///     (MemberId::new("b"), Money::from_str("-50").unwrap()),
/// ]
/// .into_iter()
/// .collect();
///
/// let plan = suggest_settlements(&balances);
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan[0].from, MemberId::new("b"));
/// assert_eq!(plan[0].amount.to_string(), "50.00");
/// ```
pub fn suggest_settlements(balances: &Balances) -> Vec<Transfer> {
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();

    for (member, &balance) in balances {
        if balance > Money::TOLERANCE {
            creditors.push(Position {
                member,
                remaining: balance,
            });
        } else if balance < -Money::TOLERANCE {
            debtors.push(Position {
                member,
                remaining: balance.abs(),
            });
        }
    }

    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
    let (mut i, mut j) = (0, 0);

    while let (Some(creditor), Some(debtor)) = (creditors.get_mut(i), debtors.get_mut(j)) {
        let amount = creditor.remaining.min(debtor.remaining);
        transfers.push(Transfer {
            from: debtor.member.clone(),
            to: creditor.member.clone(),
            amount,
        });
        creditor.remaining -= amount;
        debtor.remaining -= amount;

        if creditor.remaining < Money::TOLERANCE {
            i += 1;
        }
        if debtor.remaining < Money::TOLERANCE {
            j += 1;
        }
    }

    let unmatched: Money = creditors
        .iter()
        .skip(i)
        .chain(debtors.iter().skip(j))
        .map(|p| p.remaining)
        .sum();
    if !unmatched.is_zero() {
        debug!(
            "Balances do not net to zero, {} left unmatched after {} transfers",
            unmatched,
            transfers.len()
        );
    }

    transfers
}

/// Applies a settlement plan to a copy of `balances`.
///
/// Each transfer raises the payer's balance and lowers the receiver's by
/// the transfer amount. Members not yet present are added at zero first.
pub fn apply_transfers(balances: &Balances, transfers: &[Transfer]) -> Balances {
    let mut settled = balances.clone();
    for transfer in transfers {
        *settled.entry(transfer.from.clone()).or_insert(Money::ZERO) += transfer.amount;
        *settled.entry(transfer.to.clone()).or_insert(Money::ZERO) -= transfer.amount;
    }
    settled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn balances(entries: &[(&str, &str)]) -> Balances {
        entries
            .iter()
            .map(|(m, b)| (MemberId::new(*m), Money::from_str(b).unwrap()))
            .collect()
    }

    fn all_settled(balances: &Balances) -> bool {
        balances.values().all(|b| b.is_effectively_zero())
    }

    #[test]
    fn test_two_members() {
        let b = balances(&[("a", "50"), ("b", "-50")]);
        let plan = suggest_settlements(&b);

        assert_eq!(
            plan,
            vec![Transfer {
                from: MemberId::new("b"),
                to: MemberId::new("a"),
                amount: Money::from_str("50").unwrap(),
            }]
        );
    }

    #[test]
    fn test_largest_debtor_pays_largest_creditor_first() {
        let b = balances(&[("a", "10"), ("b", "70"), ("c", "-60"), ("d", "-20")]);
        let plan = suggest_settlements(&b);

        assert_eq!(plan[0].from, MemberId::new("c"));
        assert_eq!(plan[0].to, MemberId::new("b"));
        assert_eq!(plan[0].amount.to_string(), "60.00");
        assert!(plan.len() <= 3);
        assert!(all_settled(&apply_transfers(&b, &plan)));
    }

    #[test]
    fn test_one_creditor_many_debtors() {
        let b = balances(&[("a", "90"), ("b", "-30"), ("c", "-30"), ("d", "-30")]);
        let plan = suggest_settlements(&b);

        assert_eq!(plan.len(), 3);
        assert!(plan.iter().all(|t| t.to == MemberId::new("a")));
        assert!(all_settled(&apply_transfers(&b, &plan)));
    }

    #[test]
    fn test_members_within_tolerance_are_settled() {
        let b = balances(&[("a", "0.01"), ("b", "-0.01"), ("c", "0")]);
        assert!(suggest_settlements(&b).is_empty());
    }

    #[test]
    fn test_empty_balances() {
        assert!(suggest_settlements(&Balances::new()).is_empty());
    }

    #[test]
    fn test_residual_cent_from_equal_split() {
        // 100 split three ways paid by "a": shares of 33.33 leave one cent over
        let b = balances(&[("a", "66.67"), ("b", "-33.33"), ("c", "-33.33")]);
        let plan = suggest_settlements(&b);

        assert_eq!(plan.len(), 2);
        let after = apply_transfers(&b, &plan);
        assert!(all_settled(&after));
        assert_eq!(after[&MemberId::new("a")].to_string(), "0.01");
    }

    #[test]
    fn test_transfer_count_bound() {
        let b = balances(&[
            ("a", "40"),
            ("b", "25.5"),
            ("c", "-10"),
            ("d", "-15.25"),
            ("e", "-40.25"),
            ("f", "0"),
        ]);
        let plan = suggest_settlements(&b);

        let unsettled = b.values().filter(|v| !v.is_effectively_zero()).count();
        assert!(plan.len() <= unsettled - 1);
        assert!(plan.iter().all(|t| t.amount.is_positive()));
        assert!(all_settled(&apply_transfers(&b, &plan)));
    }
}
