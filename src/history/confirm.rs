use std::io::{BufRead, Write};

/// What the user is being asked to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    DeleteOne { filename: Option<String> },
    DeleteAll,
}

impl ConfirmPrompt {
    pub fn message(&self) -> String {
        match self {
            ConfirmPrompt::DeleteOne {
                filename: Some(name),
            } => format!("Are you sure you want to delete the translation of {}?", name),
            ConfirmPrompt::DeleteOne { filename: None } => {
                "Are you sure you want to delete this translation?".to_string()
            }
            ConfirmPrompt::DeleteAll => {
                "Are you sure you want to clear all translation history? This cannot be undone."
                    .to_string()
            }
        }
    }
}

/// Acknowledgment required before an irreversible history operation.
pub trait Confirm {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Accepts every prompt. For scripted use (`--yes`) and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        true
    }
}

/// Refuses every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl Confirm for Decline {
    fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        false
    }
}

impl<F> Confirm for F
where
    F: Fn(&ConfirmPrompt) -> bool,
{
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        self(prompt)
    }
}

/// Asks on the terminal and accepts only an explicit `y`/`yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn ask(prompt: &ConfirmPrompt, input: &mut impl BufRead, output: &mut impl Write) -> bool {
        if write!(output, "{} [y/N] ", prompt.message())
            .and_then(|_| output.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        if input.read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

impl Confirm for TerminalPrompt {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        Self::ask(prompt, &mut input, &mut std::io::stderr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn terminal_prompt_requires_explicit_yes() {
        let prompt = ConfirmPrompt::DeleteAll;
        let mut out = Vec::new();

        assert!(TerminalPrompt::ask(&prompt, &mut Cursor::new("yes\n"), &mut out));
        assert!(TerminalPrompt::ask(&prompt, &mut Cursor::new("Y\n"), &mut out));
        assert!(!TerminalPrompt::ask(&prompt, &mut Cursor::new("\n"), &mut out));
        assert!(!TerminalPrompt::ask(&prompt, &mut Cursor::new("nope\n"), &mut out));
        assert!(!TerminalPrompt::ask(&prompt, &mut Cursor::new(""), &mut out));

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("This cannot be undone."));
    }

    #[test]
    fn closures_act_as_confirmers() {
        let only_bulk = |p: &ConfirmPrompt| matches!(p, ConfirmPrompt::DeleteAll);
        assert!(only_bulk.confirm(&ConfirmPrompt::DeleteAll));
        assert!(!only_bulk.confirm(&ConfirmPrompt::DeleteOne { filename: None }));
        assert!(AutoConfirm.confirm(&ConfirmPrompt::DeleteAll));
        assert!(!Decline.confirm(&ConfirmPrompt::DeleteAll));
    }
}
