//! The ledger store: single owner of groups, members and expenses.
//!
//! Every mutation goes through a `&mut self` method that validates first
//! and then applies the whole change, including cascades, in one call. A
//! rejected operation leaves the store untouched.
//!
//! The serialized form is one JSON record with three ordered collections:
//!
//! ```json
//! {"groups": [...], "members": [...], "expenses": [...]}
//! ```

use crate::balance::{compute_balances, Balances};
use crate::error::{LedgerError, Result};
use crate::model::{Expense, ExpenseDraft, ExpenseId, Group, GroupId, Member, MemberId};
use crate::settlement::{suggest_settlements, Transfer};
use crate::validation::{
    check_stored_expense, ensure_unique_member_name, normalize_name, validate_expense,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Display name used for member ids that no longer resolve.
pub const UNKNOWN_MEMBER_NAME: &str = "Unknown";

/// In-memory ledger state.
///
/// Owned by the application; the balance calculator and settlement planner
/// borrow it for the duration of a call. Hosts that share a store between
/// threads should hold a read lock while computing balances so the engine
/// sees a consistent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStore {
    #[serde(default)]
    groups: Vec<Group>,

    #[serde(default)]
    members: Vec<Member>,

    #[serde(default)]
    expenses: Vec<Expense>,
}

impl LedgerStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        LedgerStore::default()
    }

    /// Creates the first-run ledger: a "Sample Trip" group with two members.
    pub fn with_sample_group() -> Self {
        let aditi = Member {
            id: MemberId::new("u1"),
            name: "Aditi".to_string(),
        };
        let ravi = Member {
            id: MemberId::new("u2"),
            name: "Ravi".to_string(),
        };
        let trip = Group {
            id: GroupId::new("g1"),
            name: "Sample Trip".to_string(),
            member_ids: vec![aditi.id.clone(), ravi.id.clone()],
        };

        LedgerStore {
            groups: vec![trip],
            members: vec![aditi, ravi],
            expenses: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.members.is_empty() && self.expenses.is_empty()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn expense(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| &e.id == id)
    }

    /// Member's display name, or [`UNKNOWN_MEMBER_NAME`] for a stale id.
    pub fn member_name(&self, id: &MemberId) -> &str {
        self.member(id)
            .map(|m| m.name.as_str())
            .unwrap_or(UNKNOWN_MEMBER_NAME)
    }

    /// Current members of a group, in group order.
    ///
    /// Ids without a member record are left out. An unknown group has no
    /// members.
    pub fn group_members(&self, group_id: &GroupId) -> Vec<&Member> {
        match self.group(group_id) {
            Some(group) => group
                .member_ids
                .iter()
                .filter_map(|id| self.member(id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Expenses belonging to a group, in insertion order.
    pub fn group_expenses(&self, group_id: &GroupId) -> impl Iterator<Item = &Expense> + '_ {
        let group_id = group_id.clone();
        self.expenses.iter().filter(move |e| e.group_id == group_id)
    }

    /// Expenses of a group for display, newest first.
    pub fn expenses_newest_first(&self, group_id: &GroupId) -> Vec<&Expense> {
        let mut expenses: Vec<&Expense> = self.group_expenses(group_id).collect();
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        expenses
    }

    /// Net balance of every member in the group.
    pub fn balances(&self, group_id: &GroupId) -> Balances {
        compute_balances(self, group_id)
    }

    /// Suggested transfers that settle the group.
    pub fn settlements(&self, group_id: &GroupId) -> Vec<Transfer> {
        suggest_settlements(&self.balances(group_id))
    }

    /// Creates an empty group and returns its id.
    pub fn create_group(&mut self, name: &str) -> Result<GroupId> {
        let group = Group::new(normalize_name(name)?);
        let id = group.id.clone();
        info!("Created group {} ({:?})", id, group.name);
        self.groups.push(group);
        Ok(id)
    }

    pub fn rename_group(&mut self, id: &GroupId, name: &str) -> Result<()> {
        let name = normalize_name(name)?;
        let group = self
            .groups
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| LedgerError::UnknownGroup(id.clone()))?;
        debug!("Renaming group {} from {:?} to {:?}", id, group.name, name);
        group.name = name;
        Ok(())
    }

    /// Deletes a group together with all of its expenses.
    ///
    /// Member records are kept; they may belong to other groups.
    pub fn delete_group(&mut self, id: &GroupId) -> Result<Group> {
        let index = self
            .groups
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| LedgerError::UnknownGroup(id.clone()))?;

        let before = self.expenses.len();
        self.expenses.retain(|e| &e.group_id != id);
        let group = self.groups.remove(index);

        info!(
            "Deleted group {} ({:?}) and {} expenses",
            id,
            group.name,
            before - self.expenses.len()
        );
        Ok(group)
    }

    /// Adds a new member to a group and returns the member's id.
    ///
    /// The name must be unique within the group, ignoring case.
    pub fn add_member(&mut self, group_id: &GroupId, name: &str) -> Result<MemberId> {
        let name = normalize_name(name)?;
        let index = self
            .groups
            .iter()
            .position(|g| &g.id == group_id)
            .ok_or_else(|| LedgerError::UnknownGroup(group_id.clone()))?;
        ensure_unique_member_name(&self.groups[index], &self.members, &name, None)?;

        let member = Member::new(name);
        let id = member.id.clone();
        info!("Added member {} ({:?}) to group {}", id, member.name, group_id);
        self.members.push(member);
        self.groups[index].member_ids.push(id.clone());
        Ok(id)
    }

    /// Renames a member; the new name must stay unique in each of its groups.
    pub fn rename_member(&mut self, id: &MemberId, name: &str) -> Result<()> {
        let name = normalize_name(name)?;
        if self.member(id).is_none() {
            return Err(LedgerError::UnknownMember(id.clone()));
        }
        for group in self.groups.iter().filter(|g| g.has_member(id)) {
            ensure_unique_member_name(group, &self.members, &name, Some(id))?;
        }

        if let Some(member) = self.members.iter_mut().find(|m| &m.id == id) {
            debug!("Renaming member {} from {:?} to {:?}", id, member.name, name);
            member.name = name;
        }
        Ok(())
    }

    /// Deletes a member everywhere.
    ///
    /// The member leaves every group and every split's participant list.
    /// Expenses the member paid for stay in place; the balance calculator
    /// skips their now-unknown payer.
    pub fn delete_member(&mut self, id: &MemberId) -> Result<Member> {
        let index = self
            .members
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| LedgerError::UnknownMember(id.clone()))?;

        for group in &mut self.groups {
            group.member_ids.retain(|m| m != id);
        }
        let mut stripped = 0;
        for expense in &mut self.expenses {
            if expense.split.remove_participant(id) {
                stripped += 1;
            }
        }
        let member = self.members.remove(index);

        info!(
            "Deleted member {} ({:?}), removed from {} expense splits",
            id, member.name, stripped
        );
        Ok(member)
    }

    /// Validates and records a new expense, timestamped now.
    pub fn add_expense(&mut self, draft: ExpenseDraft) -> Result<ExpenseId> {
        self.add_expense_at(draft, Utc::now())
    }

    /// Validates and records a new expense with an explicit timestamp.
    ///
    /// Nothing is stored if validation fails.
    pub fn add_expense_at(
        &mut self,
        draft: ExpenseDraft,
        created_at: DateTime<Utc>,
    ) -> Result<ExpenseId> {
        let group = self
            .group(&draft.group_id)
            .ok_or_else(|| LedgerError::UnknownGroup(draft.group_id.clone()))?;
        validate_expense(&draft, group)?;

        let expense = Expense {
            id: ExpenseId::generate(),
            group_id: draft.group_id,
            description: draft.description.trim().to_string(),
            amount: draft.amount,
            payer_id: draft.payer_id,
            split: draft.split,
            created_at,
        };
        let id = expense.id.clone();
        debug!(
            "Added expense {} to group {}: {} paid by {}, {} split over {} participants",
            id,
            expense.group_id,
            expense.amount,
            expense.payer_id,
            expense.split.kind(),
            expense.split.participants().len()
        );
        self.expenses.push(expense);
        Ok(id)
    }

    pub fn delete_expense(&mut self, id: &ExpenseId) -> Result<Expense> {
        let index = self
            .expenses
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| LedgerError::UnknownExpense(id.clone()))?;
        let expense = self.expenses.remove(index);
        debug!("Deleted expense {} from group {}", id, expense.group_id);
        Ok(expense)
    }

    /// Reads a ledger from JSON.
    ///
    /// Stored expenses above [`Money::MAX_AMOUNT`](crate::Money::MAX_AMOUNT)
    /// are rejected, since balances could no longer be summed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let store: LedgerStore = serde_json::from_reader(reader)?;
        for expense in &store.expenses {
            check_stored_expense(expense)?;
        }
        debug!(
            "Loaded ledger with {} groups, {} members, {} expenses",
            store.groups.len(),
            store.members.len(),
            store.expenses.len()
        );
        Ok(store)
    }

    /// Writes the ledger as JSON.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Loads a ledger file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        LedgerStore::from_reader(BufReader::new(file))
    }

    /// Loads a ledger file, falling back to the sample ledger when the file
    /// does not exist yet.
    pub fn load_or_sample(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No ledger at {}, starting from sample data", path.display());
            return Ok(LedgerStore::with_sample_group());
        }
        LedgerStore::load(path)
    }

    /// Saves the ledger to a file, replacing any previous content.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
