use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::contextual::roster::api::{RetryPolicy, TenantApi};
use crate::contextual::roster::error::Result;
use crate::contextual::roster::execute::{self, ExecuteOptions, MAX_BATCH_SIZE};
use crate::contextual::roster::io;
use crate::contextual::roster::model::{Operation, OperationReport, TenantUser};
use crate::contextual::roster::plan::{self, Plan};
use crate::contextual::roster::prompt::Confirm;

/// Where a roster comes from.
#[derive(Debug, Clone)]
pub struct RosterSource {
    pub path: PathBuf,
    /// Exact header to read; auto-detected when `None`.
    pub column: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InviteOptions {
    pub roster: RosterSource,
    pub tenant: String,
    pub admin: bool,
    pub dry_run: bool,
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

/// Which users a removal targets.
#[derive(Debug, Clone)]
pub enum RemovalTarget {
    Roster(RosterSource),
    AllUsers,
}

#[derive(Debug, Clone)]
pub struct RemoveOptions {
    pub target: RemovalTarget,
    /// Informational; the credential decides the tenant.
    pub tenant: Option<String>,
    pub include_admins: bool,
    pub dry_run: bool,
    /// Skip interactive confirmation.
    pub assume_yes: bool,
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

impl RemoveOptions {
    pub fn new(target: RemovalTarget) -> Self {
        Self {
            target,
            tenant: None,
            include_admins: false,
            dry_run: false,
            assume_yes: false,
            batch_size: MAX_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

fn list_members(api: &dyn TenantApi, retry: &RetryPolicy) -> Result<Vec<TenantUser>> {
    let members = retry.run(|| api.list_members())?;
    info!(count = members.len(), "fetched current tenant users");
    Ok(members)
}

/// Invites every roster address that is not already a tenant member.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %options.roster.path.display(), tenant = %options.tenant)
)]
pub fn invite(api: &dyn TenantApi, options: &InviteOptions) -> Result<OperationReport> {
    let roster = io::read_roster(&options.roster.path, options.roster.column.as_deref())?;
    let members = list_members(api, &options.retry)?;

    let plan = plan::plan_invite(&members, &roster.entries);
    info!(
        actions = plan.action_count(),
        skipped = plan.skipped().count(),
        "invitation plan computed"
    );
    if options.admin {
        info!("invited users will be granted admin privileges");
    }

    let execute_options = ExecuteOptions {
        tenant: options.tenant.clone(),
        admin: options.admin,
        dry_run: options.dry_run,
        batch_size: options.batch_size,
        retry: options.retry.clone(),
    };

    let mut report = OperationReport::new(
        Operation::Invite,
        Some(options.tenant.clone()),
        options.dry_run,
    );
    report.results = execute::execute(api, &plan, &execute_options);
    report.warnings = roster.warnings;
    Ok(report)
}

/// Removes roster addresses, or every user with [`RemovalTarget::AllUsers`],
/// asking `confirm` before anything destructive unless `assume_yes` is set.
#[instrument(level = "info", skip_all, fields(tenant = ?options.tenant))]
pub fn remove(
    api: &dyn TenantApi,
    options: &RemoveOptions,
    confirm: &mut dyn Confirm,
) -> Result<OperationReport> {
    let mut report = OperationReport::new(
        Operation::Remove,
        options.tenant.clone(),
        options.dry_run,
    );

    let plan = match &options.target {
        RemovalTarget::AllUsers => {
            let members = list_members(api, &options.retry)?;
            let plan = plan::plan_bulk_removal(&members, options.include_admins);
            let who = if options.include_admins { "" } else { "non-admin " };
            let prompt = format!(
                "This will remove ALL {who}users ({}) from the tenant. Type 'yes' to confirm",
                plan.action_count()
            );
            confirmed(plan, options.assume_yes, confirm, &prompt, &["yes"])
        }
        RemovalTarget::Roster(source) => {
            let roster = io::read_roster(&source.path, source.column.as_deref())?;
            report.warnings = roster.warnings;
            let members = list_members(api, &options.retry)?;
            let plan = plan::plan_targeted_removal(&members, &roster.entries, options.include_admins);
            let prompt = format!(
                "This will remove {} user(s) from the tenant. Continue? (y/n)",
                plan.action_count()
            );
            let skip_prompt = options.assume_yes || options.dry_run;
            confirmed(plan, skip_prompt, confirm, &prompt, &["y", "yes"])
        }
    };

    info!(
        actions = plan.action_count(),
        skipped = plan.skipped().count(),
        "removal plan computed"
    );

    let execute_options = ExecuteOptions {
        tenant: options.tenant.clone().unwrap_or_default(),
        admin: false,
        dry_run: options.dry_run,
        batch_size: options.batch_size,
        retry: options.retry.clone(),
    };
    report.results = execute::execute(api, &plan, &execute_options);
    Ok(report)
}

/// Returns `plan` when confirmation is not needed or given, an empty plan when
/// the user declines.
fn confirmed(
    plan: Plan,
    skip_prompt: bool,
    confirm: &mut dyn Confirm,
    prompt: &str,
    accepted: &[&str],
) -> Plan {
    if skip_prompt || plan.action_count() == 0 || confirm.confirm(prompt, accepted) {
        plan
    } else {
        warn!("aborted by user; nothing will be removed");
        Plan::default()
    }
}
