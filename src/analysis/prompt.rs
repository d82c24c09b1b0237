//! Prompt construction for commit message feedback.

use crate::github::CommitRecord;

/// Size bounds applied while rendering commits into a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    /// Commits beyond this many (in input order, so the oldest) are left out.
    pub max_commits: usize,
    /// Longer messages are cut at this many characters.
    pub max_message_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_commits: 50,
            max_message_chars: 500,
        }
    }
}

/// A rendered prompt and how many commits made it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPrompt {
    pub text: String,
    pub commits_included: usize,
}

/// Build the feedback prompt: one bulleted line per commit, in input order.
pub fn build_prompt(batch: &[CommitRecord], limits: PromptLimits) -> CommitPrompt {
    let lines: Vec<String> = batch
        .iter()
        .take(limits.max_commits)
        .map(|c| format!("- {}", clean_message(&c.message, limits.max_message_chars)))
        .collect();
    let commits_included = lines.len();
    let commit_lines = lines.join("\n");

    let text = format!(
        r#"As an expert programmer and code reviewer, analyze the following Git commit messages.
Provide brief, actionable feedback on their clarity, conciseness, and adherence to
the conventional commit format (e.g., `<type>: <subject>`).
If a message can be improved, suggest a better version.

Commit messages:
{commit_lines}

Your analysis:"#
    );

    CommitPrompt {
        text,
        commits_included,
    }
}

/// Reduce a raw message to one prompt line.
///
/// Drops everything up to the last `/` (branch or path prefixes such as
/// `Merge branch 'feature/login'`), folds the remaining lines into one,
/// trims it, and cuts it at `max_chars` characters.
pub fn clean_message(message: &str, max_chars: usize) -> String {
    let tail = message.rsplit('/').next().unwrap_or(message);

    let single_line = tail
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if single_line.chars().count() > max_chars {
        let cut: String = single_line.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    } else {
        single_line
    }
}
