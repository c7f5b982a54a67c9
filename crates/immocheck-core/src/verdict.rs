use crate::error::ImmoError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Liability
// ---------------------------------------------------------------------------

/// Who pays for the repair, as judged by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liability {
    Occupant,
    Owner,
    Contractor,
    /// The reply carried no valid verdict tag. Rendered as "needs manual
    /// review", never silently mapped to a chargeable category.
    Unclassified,
}

impl Liability {
    pub fn as_str(self) -> &'static str {
        match self {
            Liability::Occupant => "occupant",
            Liability::Owner => "owner",
            Liability::Contractor => "contractor",
            Liability::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Liability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Liability {
    type Err = ImmoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "occupant" => Ok(Liability::Occupant),
            "owner" => Ok(Liability::Owner),
            "contractor" => Ok(Liability::Contractor),
            "unclassified" => Ok(Liability::Unclassified),
            _ => Err(ImmoError::InvalidLiability(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// A model reply split into prose and its machine-readable category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub liability: Liability,
    /// The reply with the trailing tag line removed. Untouched when no tag
    /// was found.
    pub body: String,
}

/// Prefix the model must use on its final line.
pub const VERDICT_TAG: &str = "VERDICT:";

/// Build the diagnostic prompt for a reported issue. The instruction block
/// is the producing side of the grammar `parse_verdict` consumes.
pub fn diagnosis_prompt(note: &str) -> String {
    format!(
        "You are a building-maintenance expert working for a property \
         management agency. A field agent reports the following issue, with \
         a photograph attached when available:\n\
         \n\
         {note}\n\
         \n\
         Explain the most likely cause and who must pay for the repair: the \
         occupant (tenant-caused damage or routine tenant maintenance), the \
         owner (structural or aging-related repairs), or the contractor \
         (defective recent installation under warranty).\n\
         \n\
         End your reply with exactly one final line of the form\n\
         `{VERDICT_TAG} OCCUPANT` or `{VERDICT_TAG} OWNER` or \
         `{VERDICT_TAG} CONTRACTOR`."
    )
}

/// Parse a model reply against the verdict grammar.
///
/// Grammar: the last non-empty line of the reply, and only that line, may be
/// a tag of the form `VERDICT: <token>` where `<token>` is one of
/// `OCCUPANT`, `OWNER`, `CONTRACTOR` (any case, surrounding whitespace
/// ignored). Anything else — tag missing, tag mid-text, unknown token —
/// yields `Unclassified` with the reply passed through verbatim.
pub fn parse_verdict(text: &str) -> Verdict {
    let Some(last) = text.lines().rev().find(|l| !l.trim().is_empty()) else {
        return Verdict {
            liability: Liability::Unclassified,
            body: text.to_string(),
        };
    };

    let trimmed = last.trim();
    let upper = trimmed.to_uppercase();
    let Some(token) = upper.strip_prefix(VERDICT_TAG) else {
        return Verdict {
            liability: Liability::Unclassified,
            body: text.to_string(),
        };
    };

    let liability = match token.trim() {
        "OCCUPANT" => Liability::Occupant,
        "OWNER" => Liability::Owner,
        "CONTRACTOR" => Liability::Contractor,
        _ => {
            return Verdict {
                liability: Liability::Unclassified,
                body: text.to_string(),
            }
        }
    };

    // Drop the tag line; keep everything before it.
    let tag_start = text.rfind(last).unwrap_or(text.len());
    let body = text[..tag_start].trim_end().to_string();

    Verdict { liability, body }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
