use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Participant;

/// How each line of the organizer's participant list is laid out.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RosterFormat {
    #[default]
    NamesOnly,
    /// `name, email` per line. Only the first comma separates the two.
    NameAndEmail,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter at least 2 participants.")]
    TooFewParticipants { found: usize },
    #[error("Line {line} is missing a name.")]
    MissingName { line: usize },
    #[error("Line {line} is missing an email address.")]
    MissingEmail { line: usize },
    #[error("Duplicate names detected ({name}). Names must be unique.")]
    DuplicateName { name: String },
}

/// Parses the organizer's free-text participant list.
///
/// Blank lines are skipped and `line` numbers in errors count only non-blank lines.
/// Stops at the first problem found.
pub fn parse_roster(text: &str, format: RosterFormat) -> Result<Vec<Participant>, ValidationError> {
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    let participants = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| parse_line(line, idx + 1, format))
        .collect::<Result<Vec<_>, _>>()?;

    if participants.len() < 2 {
        return Err(ValidationError::TooFewParticipants {
            found: participants.len(),
        });
    }

    let mut seen = HashSet::new();
    for participant in &participants {
        if !seen.insert(participant.name.to_lowercase()) {
            return Err(ValidationError::DuplicateName {
                name: participant.name.clone(),
            });
        }
    }

    Ok(participants)
}

fn parse_line(line: &str, line_no: usize, format: RosterFormat) -> Result<Participant, ValidationError> {
    match format {
        RosterFormat::NamesOnly => Ok(Participant::named(line)),
        RosterFormat::NameAndEmail => {
            let (name, email) = line.split_once(',').unwrap_or((line, ""));
            let name = name.trim();
            let email = email.trim();
            if name.is_empty() {
                return Err(ValidationError::MissingName { line: line_no });
            }
            if email.is_empty() {
                return Err(ValidationError::MissingEmail { line: line_no });
            }
            Ok(Participant {
                name: name.to_string(),
                email: Some(email.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(participants: &[Participant]) -> Vec<&str> {
        participants.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn trims_and_skips_blank_lines() {
        let parsed = parse_roster("  Alice \n\n Bob\r\n   \nCarol", RosterFormat::NamesOnly).unwrap();
        assert_eq!(names(&parsed), vec!["Alice", "Bob", "Carol"]);
        assert!(parsed.iter().all(|p| p.email.is_none()));
    }

    #[test]
    fn rejects_single_participant() {
        let err = parse_roster("Alice", RosterFormat::NamesOnly).unwrap_err();
        assert_eq!(err, ValidationError::TooFewParticipants { found: 1 });
        assert_eq!(err.to_string(), "Please enter at least 2 participants.");

        let err = parse_roster("\n  \n", RosterFormat::NamesOnly).unwrap_err();
        assert_eq!(err, ValidationError::TooFewParticipants { found: 0 });
    }

    #[test]
    fn rejects_case_insensitive_duplicates() {
        let err = parse_roster("Alice\nalice", RosterFormat::NamesOnly).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateName {
                name: "alice".into()
            }
        );
    }

    #[test]
    fn preserves_case_of_names() {
        let parsed = parse_roster("ALICE\nbob", RosterFormat::NamesOnly).unwrap();
        assert_eq!(names(&parsed), vec!["ALICE", "bob"]);
    }

    #[test]
    fn name_and_email_splits_on_first_comma_only() {
        let parsed = parse_roster(
            "Alice, alice@example.com\nBob,\"bob, jr\"@example.com",
            RosterFormat::NameAndEmail,
        )
        .unwrap();
        assert_eq!(parsed[0].email.as_deref(), Some("alice@example.com"));
        assert_eq!(parsed[1].name, "Bob");
        assert_eq!(parsed[1].email.as_deref(), Some("\"bob, jr\"@example.com"));
    }

    #[test]
    fn name_and_email_reports_offending_line() {
        let err = parse_roster("Alice, a@x.io\nBob", RosterFormat::NameAndEmail).unwrap_err();
        assert_eq!(err, ValidationError::MissingEmail { line: 2 });

        let err = parse_roster("Alice, a@x.io\n\n , b@x.io", RosterFormat::NameAndEmail).unwrap_err();
        assert_eq!(err, ValidationError::MissingName { line: 2 });
    }

    #[test]
    fn line_errors_win_over_count_errors() {
        let err = parse_roster("Alice", RosterFormat::NameAndEmail).unwrap_err();
        assert_eq!(err, ValidationError::MissingEmail { line: 1 });
    }
}
