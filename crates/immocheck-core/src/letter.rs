use crate::record::UnitKey;
use crate::verdict::Liability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// LetterKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LetterKind {
    #[default]
    Postal,
    Email,
}

impl fmt::Display for LetterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LetterKind::Postal => "postal",
            LetterKind::Email => "email",
        })
    }
}

impl std::str::FromStr for LetterKind {
    type Err = crate::error::ImmoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postal" | "letter" => Ok(LetterKind::Postal),
            "email" | "mail" => Ok(LetterKind::Email),
            _ => Err(crate::error::ImmoError::MissingInput(format!(
                "unknown letter kind '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// LetterInput
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterInput {
    pub kind: LetterKind,
    pub occupant: String,
    pub key: UnitKey,
    /// One-line summary of the reported issue.
    pub issue: String,
    pub liability: Liability,
    pub date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// The closing paragraph is the only part that varies: one fixed sentence
/// per category of the closed enum.
fn decision_paragraph(liability: Liability) -> &'static str {
    match liability {
        Liability::Occupant => {
            "After review of the photographs and our technician's assessment, \
             this repair falls under routine tenant maintenance. The cost of \
             the intervention will therefore be charged to you as the occupant."
        }
        Liability::Owner => {
            "After review of the photographs and our technician's assessment, \
             this repair falls under the owner's structural obligations. The \
             intervention will be carried out at the landlord's expense; no \
             action is required on your part."
        }
        Liability::Contractor => {
            "After review of the photographs and our technician's assessment, \
             this defect is covered by the installer's warranty. The file has \
             been forwarded to the contractor, who will contact you to \
             schedule the intervention."
        }
        Liability::Unclassified => {
            "The photographs and description you provided did not allow an \
             automatic determination. Your file has been forwarded to our \
             technical team for manual review; we will come back to you \
             within five working days."
        }
    }
}

/// Interpolate the input into the fixed template for its kind. Pure string
/// formatting; the occupant line degrades to a neutral salutation when the
/// directory had no name for the unit.
pub fn render(input: &LetterInput) -> String {
    let date = input.date.format("%Y-%m-%d");
    let salutation = if input.occupant.trim().is_empty() {
        "Dear occupant".to_string()
    } else {
        format!("Dear {}", input.occupant.trim())
    };
    let decision = decision_paragraph(input.liability);

    match input.kind {
        LetterKind::Postal => format!(
            "GH Expert — Property Management\n\
             {date}\n\
             \n\
             Unit: {key}\n\
             \n\
             {salutation},\n\
             \n\
             We have received your report concerning: {issue}.\n\
             \n\
             {decision}\n\
             \n\
             Yours faithfully,\n\
             The GH Expert management team\n",
            key = input.key,
            issue = input.issue,
        ),
        LetterKind::Email => format!(
            "Subject: Your maintenance report — {key}\n\
             \n\
             {salutation},\n\
             \n\
             We have received your report of {date} concerning: {issue}.\n\
             \n\
             {decision}\n\
             \n\
             Best regards,\n\
             GH Expert management\n",
            key = input.key,
            issue = input.issue,
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
