//! Field-level and cross-entity validation rules.
//!
//! Every function here is pure: callers pass in the sibling entities and the
//! current date instead of the rules reaching for storage or the clock.

use chrono::NaiveDate;

use crate::error::{CoreError, Entity, ValidationReason};
use crate::models::{Project, Task, TaskStatus};
use crate::types::{Date, DbId};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum number of words in a project or task name.
pub const MAX_NAME_WORDS: usize = 30;

/// Maximum number of words in a project or task description.
pub const MAX_DESCRIPTION_WORDS: usize = 150;

/// The only accepted deadline layout.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Text fields
// ---------------------------------------------------------------------------

/// Count whitespace-separated, non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// A name is mandatory and at most `max_words` words long.
pub fn validate_name(text: &str, max_words: usize) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::validation("name", ValidationReason::Required));
    }
    if word_count(text) > max_words {
        return Err(CoreError::validation(
            "name",
            ValidationReason::TooLong { max_words },
        ));
    }
    Ok(())
}

/// A description is optional, so empty passes; otherwise at most `max_words`.
pub fn validate_description(text: &str, max_words: usize) -> Result<(), CoreError> {
    if word_count(text) > max_words {
        return Err(CoreError::validation(
            "description",
            ValidationReason::TooLong { max_words },
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

/// Project names are unique across all projects (exact, case-sensitive match).
///
/// `exclude_id` skips the project being updated.
pub fn validate_unique_project_name(
    name: &str,
    existing_projects: &[Project],
    exclude_id: Option<DbId>,
) -> Result<(), CoreError> {
    let taken = existing_projects
        .iter()
        .filter(|p| Some(p.id) != exclude_id)
        .any(|p| p.name == name);
    if taken {
        return Err(CoreError::Duplicate {
            entity: Entity::Project,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Task names are unique within one project; pass only that project's tasks.
pub fn validate_unique_task_name(
    name: &str,
    existing_tasks_in_project: &[Task],
    exclude_id: Option<DbId>,
) -> Result<(), CoreError> {
    let taken = existing_tasks_in_project
        .iter()
        .filter(|t| Some(t.id) != exclude_id)
        .any(|t| t.name == name);
    if taken {
        return Err(CoreError::Duplicate {
            entity: Entity::Task,
            name: name.to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status and deadline
// ---------------------------------------------------------------------------

/// Accept `todo`, `doing` or `done`, ignoring surrounding whitespace and case.
pub fn validate_status(value: &str) -> Result<TaskStatus, CoreError> {
    value.trim().to_lowercase().parse::<TaskStatus>()
}

/// Parse a `YYYY-MM-DD` deadline and reject dates strictly before `today`.
pub fn validate_deadline(text: &str, today: Date) -> Result<Date, CoreError> {
    let date = parse_deadline(text)?;
    validate_deadline_date(date, today)?;
    Ok(date)
}

/// Reject an already-parsed deadline that lies strictly before `today`.
pub fn validate_deadline_date(date: Date, today: Date) -> Result<(), CoreError> {
    if date < today {
        return Err(CoreError::validation("deadline", ValidationReason::PastDate));
    }
    Ok(())
}

/// Strict `YYYY-MM-DD` parse: exactly ten characters, zero-padded.
pub fn parse_deadline(text: &str) -> Result<Date, CoreError> {
    let text = text.trim();
    let bad_format = || CoreError::validation("deadline", ValidationReason::BadFormat);

    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(bad_format());
    }

    NaiveDate::parse_from_str(text, DEADLINE_FORMAT).map_err(|_| bad_format())
}

// ---------------------------------------------------------------------------
// Count limits
// ---------------------------------------------------------------------------

pub fn validate_project_limit(current_count: usize, max_allowed: usize) -> Result<(), CoreError> {
    if current_count >= max_allowed {
        return Err(CoreError::LimitReached {
            entity: Entity::Project,
            limit: max_allowed,
        });
    }
    Ok(())
}

pub fn validate_task_limit(current_count: usize, max_allowed: usize) -> Result<(), CoreError> {
    if current_count >= max_allowed {
        return Err(CoreError::LimitReached {
            entity: Entity::Task,
            limit: max_allowed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn reason(err: CoreError) -> ValidationReason {
        match err {
            CoreError::Validation { reason, .. } => reason,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn today() -> Date {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn project(id: DbId, name: &str) -> Project {
        let now = Utc::now();
        Project {
            id,
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn task(id: DbId, name: &str) -> Task {
        let now = Utc::now();
        Task {
            id,
            project_id: 1,
            name: name.into(),
            description: None,
            status: TaskStatus::Todo,
            deadline: None,
            closed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    // -----------------------------------------------------------------------
    // Names and descriptions
    // -----------------------------------------------------------------------

    #[test]
    fn name_up_to_limit_is_accepted() {
        assert!(validate_name("Launch", MAX_NAME_WORDS).is_ok());
        assert!(validate_name(&words(30), MAX_NAME_WORDS).is_ok());
    }

    #[test]
    fn name_over_limit_is_too_long() {
        let err = validate_name(&words(31), MAX_NAME_WORDS).unwrap_err();
        assert_eq!(reason(err), ValidationReason::TooLong { max_words: 30 });
    }

    #[test]
    fn blank_name_is_required() {
        for blank in ["", "   ", "\t\n"] {
            let err = validate_name(blank, MAX_NAME_WORDS).unwrap_err();
            assert_eq!(reason(err), ValidationReason::Required);
        }
    }

    #[test]
    fn extra_whitespace_does_not_inflate_word_count() {
        let spaced = format!("  {}  ", words(30).replace(' ', "   \t"));
        assert_eq!(word_count(&spaced), 30);
        assert!(validate_name(&spaced, MAX_NAME_WORDS).is_ok());
    }

    #[test]
    fn description_allows_empty_and_caps_words() {
        assert!(validate_description("", MAX_DESCRIPTION_WORDS).is_ok());
        assert!(validate_description(&words(150), MAX_DESCRIPTION_WORDS).is_ok());
        let err = validate_description(&words(151), MAX_DESCRIPTION_WORDS).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation {
                field: "description",
                reason: ValidationReason::TooLong { max_words: 150 }
            }
        );
    }

    // -----------------------------------------------------------------------
    // Uniqueness
    // -----------------------------------------------------------------------

    #[test]
    fn duplicate_project_name_is_rejected() {
        let existing = vec![project(1, "Launch"), project(2, "Hiring")];
        assert_matches!(
            validate_unique_project_name("Launch", &existing, None),
            Err(CoreError::Duplicate {
                entity: Entity::Project,
                ..
            })
        );
        assert!(validate_unique_project_name("Roadmap", &existing, None).is_ok());
    }

    #[test]
    fn project_name_comparison_is_case_sensitive() {
        let existing = vec![project(1, "Launch")];
        assert!(validate_unique_project_name("launch", &existing, None).is_ok());
    }

    #[test]
    fn renaming_to_own_name_is_allowed() {
        let existing = vec![project(1, "Launch"), project(2, "Hiring")];
        assert!(validate_unique_project_name("Launch", &existing, Some(1)).is_ok());
        assert!(validate_unique_project_name("Hiring", &existing, Some(1)).is_err());
    }

    #[test]
    fn duplicate_task_name_is_rejected_unless_excluded() {
        let existing = vec![task(10, "Setup")];
        assert_matches!(
            validate_unique_task_name("Setup", &existing, None),
            Err(CoreError::Duplicate {
                entity: Entity::Task,
                ..
            })
        );
        assert!(validate_unique_task_name("Setup", &existing, Some(10)).is_ok());
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    #[test]
    fn status_is_normalised() {
        assert_eq!(validate_status("todo").unwrap(), TaskStatus::Todo);
        assert_eq!(validate_status(" Doing ").unwrap(), TaskStatus::Doing);
        assert_eq!(validate_status("DONE").unwrap(), TaskStatus::Done);
    }

    #[test]
    fn unknown_status_is_rejected() {
        for bad in ["", "blocked", "to do"] {
            let err = validate_status(bad).unwrap_err();
            assert_eq!(reason(err), ValidationReason::InvalidStatus);
        }
    }

    // -----------------------------------------------------------------------
    // Deadline
    // -----------------------------------------------------------------------

    #[test]
    fn today_and_future_deadlines_are_accepted() {
        assert_eq!(validate_deadline("2025-06-15", today()).unwrap(), today());
        assert!(validate_deadline("2025-06-16", today()).is_ok());
        assert!(validate_deadline("2030-01-01", today()).is_ok());
    }

    #[test]
    fn past_deadline_is_rejected() {
        for past in ["2025-06-14", "2024-12-31", "1999-01-01"] {
            let err = validate_deadline(past, today()).unwrap_err();
            assert_eq!(reason(err), ValidationReason::PastDate);
        }
    }

    #[test]
    fn malformed_deadline_is_bad_format() {
        for bad in ["2025/06/20", "20-06-2025", "2025-6-20", "2025-02-30", "tomorrow", ""] {
            let err = validate_deadline(bad, today()).unwrap_err();
            assert_eq!(reason(err), ValidationReason::BadFormat, "input {bad:?}");
        }
    }

    // -----------------------------------------------------------------------
    // Limits
    // -----------------------------------------------------------------------

    #[test]
    fn limits_reject_at_ceiling() {
        assert!(validate_project_limit(9, 10).is_ok());
        assert_matches!(
            validate_project_limit(10, 10),
            Err(CoreError::LimitReached {
                entity: Entity::Project,
                limit: 10
            })
        );
        assert!(validate_task_limit(49, 50).is_ok());
        assert_matches!(
            validate_task_limit(50, 50),
            Err(CoreError::LimitReached {
                entity: Entity::Task,
                limit: 50
            })
        );
    }
}
