use std::io::IsTerminal;

use dialoguer::Input;
use tracing::warn;

/// Source of yes/no answers for destructive operations.
pub trait Confirm {
    /// Asks `prompt` and reports whether the answer is one of `accepted`
    /// (compared case-insensitively).
    fn confirm(&mut self, prompt: &str, accepted: &[&str]) -> bool;
}

/// Asks on the controlling terminal.
///
/// Without a terminal on stdin nothing can be asked, so the answer is treated
/// as a refusal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&mut self, prompt: &str, accepted: &[&str]) -> bool {
        if !std::io::stdin().is_terminal() {
            warn!("stdin is not a terminal; pass --yes to confirm non-interactively");
            return false;
        }

        match Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(answer) => is_accepted(&answer, accepted),
            Err(err) => {
                warn!(%err, "could not read confirmation");
                false
            }
        }
    }
}

fn is_accepted(answer: &str, accepted: &[&str]) -> bool {
    let answer = answer.trim();
    accepted
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(answer))
}
