// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion,
// suitable for showing next to the photo the user just took.

use crate::error::FlatscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix it: move the corners, retake the photo.
    ActionRequired,
    /// Retaking the photo will not help (bad file, bad settings).
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `FlatscanError` into a `HumanError`.
pub fn humanize_error(err: &FlatscanError) -> HumanError {
    match err {
        FlatscanError::InvalidInput(detail) => HumanError {
            message: "The page corners couldn't be read.".into(),
            suggestion: format!(
                "Mark exactly four corners on the photo and try again. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        FlatscanError::InvalidGeometry(_) => HumanError {
            message: "Those corners don't outline a page.".into(),
            suggestion: "Drag the four corners onto the corners of the document so they form a box, not a line or a bow tie.".into(),
            severity: Severity::ActionRequired,
        },

        FlatscanError::InvalidConfig(detail) => HumanError {
            message: "The scanner settings are invalid.".into(),
            suggestion: format!("Fix the settings file or delete it to use the defaults. ({detail})"),
            severity: Severity::Permanent,
        },

        FlatscanError::ImageError(_) => HumanError {
            message: "This picture couldn't be opened.".into(),
            suggestion: "Try a JPEG or PNG photo, or take the picture again.".into(),
            severity: Severity::Permanent,
        },

        FlatscanError::Io(io_err) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check the file exists and you have permission to use it. ({io_err})"),
            severity: Severity::Permanent,
        },

        FlatscanError::Serialization(_) => HumanError {
            message: "A settings file is damaged.".into(),
            suggestion: "Check the file is valid JSON, or delete it to use the defaults.".into(),
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_corners_are_action_required() {
        let err = FlatscanError::InvalidGeometry("corners are collinear".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn bad_corner_payload_mentions_detail() {
        let err = FlatscanError::InvalidInput("expected exactly 4 corner points, got 3".into());
        let human = humanize_error(&err);
        assert!(human.suggestion.contains("got 3"));
    }

    #[test]
    fn undecodable_image_is_permanent() {
        let human = humanize_error(&FlatscanError::ImageError("bad magic".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
