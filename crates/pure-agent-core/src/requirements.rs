//! Per-action prerequisites.
//!
//! [`FIELD_REQUIREMENTS`] is read by the config validator and by the
//! `get_export_actions` listing. Giving a new action a prerequisite field means
//! adding one entry here.

use crate::schema::{StringField, PR_FIELDS};
use crate::types::ExportAction;
use serde::Serialize;

/// Which field paths an agent must supply for a requirement.
#[derive(Debug, Clone, Copy)]
pub enum RequiredPaths {
    /// The top-level field itself.
    Field,
    /// Every non-optional key of a nested object.
    NestedKeys(&'static [StringField]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRequirement {
    pub action: ExportAction,
    /// Top-level config field checked by the validator.
    pub field: &'static str,
    pub required: RequiredPaths,
}

impl FieldRequirement {
    /// Field paths exposed to agents, e.g. `pr.title`.
    pub fn required_fields(&self) -> Vec<String> {
        match self.required {
            RequiredPaths::Field => vec![self.field.to_string()],
            RequiredPaths::NestedKeys(keys) => keys
                .iter()
                .filter(|k| !k.optional)
                .map(|k| format!("{}.{}", self.field, k.name))
                .collect(),
        }
    }
}

pub const FIELD_REQUIREMENTS: &[FieldRequirement] = &[
    FieldRequirement {
        action: ExportAction::Report,
        field: "report_content",
        required: RequiredPaths::Field,
    },
    FieldRequirement {
        action: ExportAction::CreatePr,
        field: "pr",
        required: RequiredPaths::NestedKeys(PR_FIELDS),
    },
];

pub fn field_requirement(action: ExportAction) -> Option<&'static FieldRequirement> {
    FIELD_REQUIREMENTS.iter().find(|r| r.action == action)
}

// ---------------------------------------------------------------------------
// ActionDescriptor
// ---------------------------------------------------------------------------

/// Static metadata for one action token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    #[serde(rename = "type")]
    pub action: ExportAction,
    pub description: &'static str,
    pub exclusive: bool,
    pub requires_issue: bool,
    pub required_fields: Vec<String>,
}

impl ActionDescriptor {
    pub fn of(action: ExportAction) -> Self {
        Self {
            action,
            description: action.description(),
            exclusive: action.is_exclusive(),
            requires_issue: action.requires_issue(),
            required_fields: field_requirement(action)
                .map(FieldRequirement::required_fields)
                .unwrap_or_default(),
        }
    }
}

/// Descriptors for every action, in token declaration order.
pub fn action_descriptors() -> Vec<ActionDescriptor> {
    ExportAction::all()
        .iter()
        .copied()
        .map(ActionDescriptor::of)
        .collect()
}
