#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use contextual_roster::api::{ApiError, InviteOutcome, TenantApi};
use contextual_roster::model::TenantUser;
use contextual_roster::prompt::Confirm;
use tempfile::TempDir;

/// In-memory tenant that applies invitations and removals to its own member
/// list, so consecutive runs observe earlier writes.
#[derive(Default)]
pub struct FakeTenant {
    members: RefCell<Vec<TenantUser>>,
    /// Emails the platform rejects with a per-entry error.
    pub rejected: HashMap<String, String>,
    /// Emails the platform silently drops: neither invited nor rejected.
    pub dropped: HashSet<String>,
    /// Refuse a whole invitation request if any email starts with this prefix.
    pub refuse_batches_with: Option<String>,
    /// Number of transient failures to emit before each mutating call succeeds.
    pub transient_failures: Cell<u32>,
    /// Number of transient failures to emit before listing succeeds.
    pub list_transient_failures: Cell<u32>,
    /// Permanent listing failure.
    pub list_error: Option<ApiError>,
    pub list_calls: Cell<usize>,
    pub add_calls: RefCell<Vec<Vec<String>>>,
    pub remove_calls: RefCell<Vec<String>>,
}

impl FakeTenant {
    pub fn with_members(members: &[(&str, bool)]) -> Self {
        let members = members
            .iter()
            .enumerate()
            .map(|(index, (email, is_admin))| TenantUser {
                id: format!("user-{index}"),
                email: email.to_string(),
                is_admin: *is_admin,
            })
            .collect();
        Self {
            members: RefCell::new(members),
            ..Self::default()
        }
    }

    pub fn reject(mut self, email: &str, message: &str) -> Self {
        self.rejected.insert(email.to_string(), message.to_string());
        self
    }

    pub fn drop_silently(mut self, email: &str) -> Self {
        self.dropped.insert(email.to_string());
        self
    }

    pub fn refuse_batches_with(mut self, prefix: &str) -> Self {
        self.refuse_batches_with = Some(prefix.to_string());
        self
    }

    pub fn failing_list(mut self, error: ApiError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn member_emails(&self) -> Vec<String> {
        self.members
            .borrow()
            .iter()
            .map(|member| member.email.clone())
            .collect()
    }

    pub fn mutating_calls(&self) -> usize {
        self.add_calls.borrow().len() + self.remove_calls.borrow().len()
    }

    fn take_transient(&self) -> Option<ApiError> {
        let remaining = self.transient_failures.get();
        if remaining == 0 {
            return None;
        }
        self.transient_failures.set(remaining - 1);
        Some(ApiError::Status {
            status: 503,
            message: "service unavailable".into(),
        })
    }
}

impl TenantApi for FakeTenant {
    fn list_members(&self) -> Result<Vec<TenantUser>, ApiError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if let Some(error) = &self.list_error {
            return Err(error.clone());
        }
        let remaining = self.list_transient_failures.get();
        if remaining > 0 {
            self.list_transient_failures.set(remaining - 1);
            return Err(ApiError::RateLimited {
                retry_after_secs: None,
            });
        }
        Ok(self.members.borrow().clone())
    }

    fn add_members(
        &self,
        _tenant: &str,
        emails: &[String],
        admin: bool,
    ) -> Result<InviteOutcome, ApiError> {
        self.add_calls.borrow_mut().push(emails.to_vec());
        if let Some(error) = self.take_transient() {
            return Err(error);
        }
        if let Some(prefix) = &self.refuse_batches_with {
            if let Some(bad) = emails.iter().find(|email| email.starts_with(prefix.as_str())) {
                return Err(ApiError::Status {
                    status: 422,
                    message: format!("invalid email: {bad}"),
                });
            }
        }

        let mut invited = BTreeSet::new();
        let mut errors = BTreeMap::new();
        let mut members = self.members.borrow_mut();
        for email in emails {
            if let Some(message) = self.rejected.get(email) {
                errors.insert(email.clone(), message.clone());
                continue;
            }
            if self.dropped.contains(email) {
                continue;
            }
            let id = format!("user-{}", members.len());
            members.push(TenantUser {
                id,
                email: email.clone(),
                is_admin: admin,
            });
            invited.insert(email.clone());
        }
        Ok(InviteOutcome { invited, errors })
    }

    fn remove_member(&self, email: &str) -> Result<(), ApiError> {
        self.remove_calls.borrow_mut().push(email.to_string());
        if let Some(error) = self.take_transient() {
            return Err(error);
        }
        if let Some(message) = self.rejected.get(email) {
            return Err(ApiError::Status {
                status: 400,
                message: message.clone(),
            });
        }

        let mut members = self.members.borrow_mut();
        let before = members.len();
        members.retain(|member| !member.email.eq_ignore_ascii_case(email));
        if members.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: "user not found".into(),
            });
        }
        Ok(())
    }
}

/// Replays fixed answers; every prompt consumes the next one.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Vec<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().rev().map(|answer| answer.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirm for ScriptedPrompt {
    fn confirm(&mut self, prompt: &str, accepted: &[&str]) -> bool {
        self.asked.push(prompt.to_string());
        self.answers.pop().is_some_and(|answer| {
            accepted
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(answer.trim()))
        })
    }
}

/// Writes `contents` into a fresh temporary directory.
pub fn write_roster(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("roster written");
    (dir, path)
}
