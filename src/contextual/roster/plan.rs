//! Decides which roster entries become API calls.
//!
//! Plans are computed from one membership snapshot before anything is
//! mutated, so the executor never decides based on state it has changed itself.

use std::collections::HashMap;

use crate::contextual::roster::model::{Role, RosterEntry, TenantUser};

pub const ALREADY_MEMBER: &str = "already a member";
pub const NOT_FOUND: &str = "not found";
pub const ADMIN_PROTECTED: &str = "admin protected";

/// Mutation performed for a planned email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
}

/// What happens to one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Act(Action),
    /// Decided without calling the platform.
    Skip(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub email: String,
    pub step: Step,
}

/// Ordered execution plan. Pre-skipped entries keep their position so the
/// report follows roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that require an API call.
    pub fn actions(&self) -> impl Iterator<Item = (&str, Action)> {
        self.entries.iter().filter_map(|entry| match entry.step {
            Step::Act(action) => Some((entry.email.as_str(), action)),
            Step::Skip(_) => None,
        })
    }

    pub fn action_count(&self) -> usize {
        self.actions().count()
    }

    /// Entries skipped up front, with their reasons.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| match &entry.step {
            Step::Skip(reason) => Some((entry.email.as_str(), reason.as_str())),
            Step::Act(_) => None,
        })
    }

    fn act(&mut self, email: impl Into<String>, action: Action) {
        self.entries.push(PlanEntry {
            email: email.into(),
            step: Step::Act(action),
        });
    }

    fn skip(&mut self, email: impl Into<String>, reason: &str) {
        self.entries.push(PlanEntry {
            email: email.into(),
            step: Step::Skip(reason.to_string()),
        });
    }
}

fn index_members(members: &[TenantUser]) -> HashMap<String, &TenantUser> {
    members
        .iter()
        .map(|member| (member.normalised_email(), member))
        .collect()
}

/// Every roster entry not yet in the tenant becomes an add.
pub fn plan_invite(members: &[TenantUser], roster: &[RosterEntry]) -> Plan {
    let index = index_members(members);
    let mut plan = Plan::default();

    for entry in roster {
        if index.contains_key(entry.email()) {
            plan.skip(entry.email(), ALREADY_MEMBER);
        } else {
            plan.act(entry.email(), Action::Add);
        }
    }

    plan
}

/// Removes the roster entries that are members, protecting admins unless
/// `include_admins` is set.
pub fn plan_targeted_removal(
    members: &[TenantUser],
    roster: &[RosterEntry],
    include_admins: bool,
) -> Plan {
    let index = index_members(members);
    let mut plan = Plan::default();

    for entry in roster {
        match index.get(entry.email()) {
            None => plan.skip(entry.email(), NOT_FOUND),
            Some(member) if member.role() == Role::Admin && !include_admins => {
                plan.skip(entry.email(), ADMIN_PROTECTED)
            }
            Some(_) => plan.act(entry.email(), Action::Remove),
        }
    }

    plan
}

/// Removes every member in listing order. Admins are left out entirely unless
/// `include_admins` is set.
pub fn plan_bulk_removal(members: &[TenantUser], include_admins: bool) -> Plan {
    let mut plan = Plan::default();

    for member in members {
        if member.role() == Role::Admin && !include_admins {
            continue;
        }
        plan.act(member.email.trim(), Action::Remove);
    }

    plan
}
