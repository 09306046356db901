//! CSV export of balances and settlement suggestions.
//!
//! Member ids are resolved to display names through the store, so the
//! output is meant for people rather than for reloading.

use crate::balance::Balances;
use crate::error::Result;
use crate::settlement::Transfer;
use crate::store::LedgerStore;
use std::io::Write;

/// Writes balances as `member,balance` rows.
///
/// Rows are sorted by display name for stable, readable output. Amounts
/// are formatted with exactly 2 decimal places.
pub fn write_balances<W: Write>(
    store: &LedgerStore,
    balances: &Balances,
    writer: W,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["member", "balance"])?;

    let mut rows: Vec<_> = balances
        .iter()
        .map(|(member, balance)| (store.member_name(member), balance))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    for (name, balance) in rows {
        csv_writer.write_record([name.to_string(), balance.to_string()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes a settlement plan as `from,to,amount` rows, in plan order.
pub fn write_settlements<W: Write>(
    store: &LedgerStore,
    transfers: &[Transfer],
    writer: W,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["from", "to", "amount"])?;

    for transfer in transfers {
        let amount = transfer.amount.to_string();
        csv_writer.write_record([
            store.member_name(&transfer.from),
            store.member_name(&transfer.to),
            amount.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
