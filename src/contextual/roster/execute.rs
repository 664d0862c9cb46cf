use std::collections::{HashMap, HashSet};

use tracing::{info, instrument, warn};

use crate::contextual::roster::api::{RetryPolicy, TenantApi};
use crate::contextual::roster::model::OperationResult;
use crate::contextual::roster::plan::{Action, Plan, Step};

/// Largest number of users the platform accepts in one request.
pub const MAX_BATCH_SIZE: usize = 50;

pub const DRY_RUN: &str = "dry-run";

/// Reason recorded for an email the platform neither invited nor rejected.
pub const NOT_INVITED: &str = "not invited by the platform";

/// Knobs for [`execute`].
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Tenant short name sent with invitations.
    pub tenant: String,
    /// Grant the admin role to invited users.
    pub admin: bool,
    pub dry_run: bool,
    /// Clamped to `1..=MAX_BATCH_SIZE`.
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            tenant: String::new(),
            admin: false,
            dry_run: false,
            batch_size: MAX_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

/// Carries out `plan` and returns one result per plan entry, in plan order.
///
/// Pre-skipped entries pass through untouched. Under dry-run no call is made
/// and every action is reported as skipped. A failure only ever affects the
/// entries it belongs to; later entries and batches still run.
#[instrument(
    level = "info",
    skip_all,
    fields(actions = plan.action_count(), dry_run = options.dry_run)
)]
pub fn execute(api: &dyn TenantApi, plan: &Plan, options: &ExecuteOptions) -> Vec<OperationResult> {
    let mut results: Vec<Option<OperationResult>> = vec![None; plan.entries.len()];
    let mut pending: Vec<(usize, &str, Action)> = Vec::new();

    for (index, entry) in plan.entries.iter().enumerate() {
        match &entry.step {
            Step::Skip(reason) => {
                results[index] = Some(OperationResult::skipped(&entry.email, reason));
            }
            Step::Act(_) if options.dry_run => {
                results[index] = Some(OperationResult::skipped(&entry.email, DRY_RUN));
            }
            Step::Act(action) => pending.push((index, entry.email.as_str(), *action)),
        }
    }

    let batch_size = options.batch_size.clamp(1, MAX_BATCH_SIZE);
    let batch_count = pending.len().div_ceil(batch_size);

    for (batch_index, batch) in pending.chunks(batch_size).enumerate() {
        info!(
            batch = batch_index + 1,
            of = batch_count,
            users = batch.len(),
            "processing batch"
        );

        let adds: Vec<(usize, &str)> = batch
            .iter()
            .filter(|(_, _, action)| *action == Action::Add)
            .map(|(index, email, _)| (*index, *email))
            .collect();
        if !adds.is_empty() {
            for (index, result) in invite_batch(api, &adds, options) {
                results[index] = Some(result);
            }
        }

        for (index, email, action) in batch {
            if *action == Action::Remove {
                results[*index] = Some(remove_one(api, email, &options.retry));
            }
        }
    }

    results.into_iter().flatten().collect()
}

fn invite_batch(
    api: &dyn TenantApi,
    batch: &[(usize, &str)],
    options: &ExecuteOptions,
) -> Vec<(usize, OperationResult)> {
    let emails: Vec<String> = batch.iter().map(|(_, email)| email.to_string()).collect();

    match options
        .retry
        .run(|| api.add_members(&options.tenant, &emails, options.admin))
    {
        Ok(outcome) => {
            let invited: HashSet<String> = outcome
                .invited
                .iter()
                .map(|email| email.trim().to_lowercase())
                .collect();
            let errors: HashMap<String, &String> = outcome
                .errors
                .iter()
                .map(|(email, message)| (email.trim().to_lowercase(), message))
                .collect();
            batch
                .iter()
                .map(|(index, email)| {
                    let key = email.to_lowercase();
                    let result = if let Some(message) = errors.get(&key) {
                        warn!(email, %message, "platform rejected invitation");
                        OperationResult::failed(*email, message.as_str())
                    } else if invited.contains(&key) {
                        OperationResult::succeeded(*email)
                    } else {
                        warn!(email, "platform did not acknowledge invitation");
                        OperationResult::failed(*email, NOT_INVITED)
                    };
                    (*index, result)
                })
                .collect()
        }
        Err(error) if batch.len() > 1 && !error.is_transient() => {
            // The request as a whole was refused; resend one email per request
            // so the rejection lands on the entry that caused it.
            warn!(%error, users = batch.len(), "invitation batch rejected, retrying individually");
            batch
                .iter()
                .flat_map(|entry| invite_batch(api, std::slice::from_ref(entry), options))
                .collect()
        }
        Err(error) => {
            warn!(%error, users = batch.len(), "invitation batch failed");
            batch
                .iter()
                .map(|(index, email)| (*index, OperationResult::failed(*email, error.to_string())))
                .collect()
        }
    }
}

fn remove_one(api: &dyn TenantApi, email: &str, retry: &RetryPolicy) -> OperationResult {
    match retry.run(|| api.remove_member(email)) {
        Ok(()) => OperationResult::succeeded(email),
        Err(error) => {
            warn!(email, %error, "failed to remove user");
            OperationResult::failed(email, error.to_string())
        }
    }
}
