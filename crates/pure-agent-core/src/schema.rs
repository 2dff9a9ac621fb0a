//! Export configuration document and the rule validator that produces it.
//!
//! Validation runs in two stages. The structural stage checks types, enum
//! membership and length bounds and reports every problem it finds. Only a
//! structurally valid document reaches the cross-field rules, which run in a
//! fixed order (see [`config_rules`]).

use crate::error::{ExportError, Result, ValidationIssue};
use crate::requirements::FIELD_REQUIREMENTS;
use crate::types::{
    has_issue, ExportAction, DEFAULT_PR_BASE, MAX_PR_BODY_LENGTH, MAX_PR_BRANCH_LENGTH,
    MAX_PR_REPO_LENGTH, MAX_PR_REPO_PATH_LENGTH, MAX_PR_TITLE_LENGTH, MAX_REPORT_CONTENT_LENGTH,
    MAX_SUMMARY_LENGTH,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrConfig {
    pub title: String,
    pub body: String,
    pub branch: String,
    pub base: String,
    pub repo: String,
    pub repo_path: String,
}

/// A configuration that passed every structural check and business rule.
/// Only [`validate`] constructs one from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linear_issue_id: Option<String>,
    pub summary: String,
    pub actions: Vec<ExportAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr: Option<PrConfig>,
}

impl ExportConfig {
    /// The issue id when it names a real issue (not absent, not `"none"`).
    pub fn issue_id(&self) -> Option<&str> {
        let id = self.linear_issue_id.as_deref();
        if has_issue(id) {
            id
        } else {
            None
        }
    }

    pub fn includes(&self, action: ExportAction) -> bool {
        self.actions.contains(&action)
    }

    /// Whether a top-level field is set to a usable value. Empty strings count
    /// as absent.
    pub fn has_field(&self, field: &str) -> bool {
        match field {
            "linear_issue_id" => self.linear_issue_id.as_deref().is_some_and(|s| !s.is_empty()),
            "summary" => !self.summary.is_empty(),
            "report_content" => self.report_content.as_deref().is_some_and(|s| !s.is_empty()),
            "pr" => self.pr.is_some(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Field bounds
// ---------------------------------------------------------------------------

/// Bounds for a string field. Lengths count characters.
#[derive(Debug, Clone, Copy)]
pub struct StringField {
    pub name: &'static str,
    pub min: usize,
    pub max: Option<usize>,
    pub optional: bool,
}

impl StringField {
    pub const fn new(name: &'static str, min: usize, max: Option<usize>, optional: bool) -> Self {
        StringField {
            name,
            min,
            max,
            optional,
        }
    }
}

const fn field(name: &'static str, min: usize, max: Option<usize>, optional: bool) -> StringField {
    StringField::new(name, min, max, optional)
}

const LINEAR_ISSUE_ID: StringField = field("linear_issue_id", 1, None, true);
const SUMMARY: StringField = field("summary", 1, Some(MAX_SUMMARY_LENGTH), false);
const REPORT_CONTENT: StringField =
    field("report_content", 0, Some(MAX_REPORT_CONTENT_LENGTH), true);

/// PR descriptor fields in declaration order.
pub const PR_FIELDS: &[StringField] = &[
    field("title", 1, Some(MAX_PR_TITLE_LENGTH), false),
    field("body", 0, Some(MAX_PR_BODY_LENGTH), false),
    field("branch", 1, Some(MAX_PR_BRANCH_LENGTH), false),
    field("base", 0, Some(MAX_PR_BRANCH_LENGTH), true),
    field("repo", 1, Some(MAX_PR_REPO_LENGTH), false),
    field("repo_path", 1, Some(MAX_PR_REPO_PATH_LENGTH), false),
];

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Check one string field. Returns the value when it is present and valid.
pub fn check_string(
    obj: &Map<String, Value>,
    prefix: &str,
    rule: &StringField,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    let path = join_path(prefix, rule.name);
    let value = match obj.get(rule.name) {
        None => {
            if !rule.optional {
                issues.push(ValidationIssue::new(path, "Required"));
            }
            return None;
        }
        Some(v) => v,
    };
    let Some(s) = value.as_str() else {
        issues.push(ValidationIssue::new(
            path,
            format!("Expected string, received {}", type_name(value)),
        ));
        return None;
    };
    let len = s.chars().count();
    if len < rule.min {
        issues.push(ValidationIssue::new(
            path,
            format!("String must contain at least {} character(s)", rule.min),
        ));
        return None;
    }
    if let Some(max) = rule.max {
        if len > max {
            issues.push(ValidationIssue::new(
                path,
                format!("String must contain at most {max} character(s)"),
            ));
            return None;
        }
    }
    Some(s.to_string())
}

fn check_actions(
    obj: &Map<String, Value>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Vec<ExportAction>> {
    let value = match obj.get("actions") {
        None => {
            issues.push(ValidationIssue::new("actions", "Required"));
            return None;
        }
        Some(v) => v,
    };
    let Some(items) = value.as_array() else {
        issues.push(ValidationIssue::new(
            "actions",
            format!("Expected array, received {}", type_name(value)),
        ));
        return None;
    };

    let before = issues.len();
    let mut actions = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = format!("actions.{i}");
        match item.as_str() {
            Some(token) => match token.parse::<ExportAction>() {
                Ok(a) => actions.push(a),
                Err(msg) => issues.push(ValidationIssue::new(path, msg)),
            },
            None => issues.push(ValidationIssue::new(
                path,
                format!("Expected string, received {}", type_name(item)),
            )),
        }
    }
    if items.is_empty() {
        issues.push(ValidationIssue::new(
            "actions",
            "Array must contain at least 1 element(s)",
        ));
    }
    if issues.len() > before {
        return None;
    }
    Some(actions)
}

fn check_pr(obj: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) -> Option<PrConfig> {
    let value = obj.get("pr")?;
    let Some(pr) = value.as_object() else {
        issues.push(ValidationIssue::new(
            "pr",
            format!("Expected object, received {}", type_name(value)),
        ));
        return None;
    };

    let before = issues.len();
    let values: Vec<Option<String>> = PR_FIELDS
        .iter()
        .map(|rule| check_string(pr, "pr", rule, issues))
        .collect();
    if issues.len() > before {
        return None;
    }
    let [title, body, branch, base, repo, repo_path] = <[Option<String>; 6]>::try_from(values).ok()?;
    Some(PrConfig {
        title: title.unwrap_or_default(),
        body: body.unwrap_or_default(),
        branch: branch.unwrap_or_default(),
        base: base.unwrap_or_else(|| DEFAULT_PR_BASE.to_string()),
        repo: repo.unwrap_or_default(),
        repo_path: repo_path.unwrap_or_default(),
    })
}

fn check_structure(raw: &Value) -> std::result::Result<ExportConfig, Vec<ValidationIssue>> {
    let Some(obj) = raw.as_object() else {
        return Err(vec![ValidationIssue::new(
            "",
            format!("Expected object, received {}", type_name(raw)),
        )]);
    };

    let mut issues = Vec::new();
    let linear_issue_id = check_string(obj, "", &LINEAR_ISSUE_ID, &mut issues);
    let summary = check_string(obj, "", &SUMMARY, &mut issues);
    let actions = check_actions(obj, &mut issues);
    let report_content = check_string(obj, "", &REPORT_CONTENT, &mut issues);
    let pr = check_pr(obj, &mut issues);

    match (summary, actions) {
        (Some(summary), Some(actions)) if issues.is_empty() => Ok(ExportConfig {
            linear_issue_id,
            summary,
            actions,
            report_content,
            pr,
        }),
        _ => Err(issues),
    }
}

// ---------------------------------------------------------------------------
// Cross-field rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFlow {
    Continue,
    /// Skip every later rule.
    Stop,
}

/// A fn-pointer business rule over a structurally valid config.
pub struct ConfigRule {
    pub id: &'static str,
    pub check: fn(&ExportConfig, &mut Vec<ValidationIssue>) -> RuleFlow,
}

fn exclusive_actions(config: &ExportConfig, issues: &mut Vec<ValidationIssue>) -> RuleFlow {
    if config.actions.len() < 2 {
        return RuleFlow::Continue;
    }
    match config.actions.iter().find(|a| a.is_exclusive()) {
        Some(action) => {
            issues.push(ValidationIssue::new(
                "actions",
                format!("Action '{action}' must be the only action when present"),
            ));
            RuleFlow::Stop
        }
        None => RuleFlow::Continue,
    }
}

fn unique_actions(config: &ExportConfig, issues: &mut Vec<ValidationIssue>) -> RuleFlow {
    let unique: HashSet<_> = config.actions.iter().collect();
    if unique.len() != config.actions.len() {
        issues.push(ValidationIssue::new(
            "actions",
            "Duplicate actions are not allowed",
        ));
    }
    RuleFlow::Continue
}

fn issue_required(config: &ExportConfig, issues: &mut Vec<ValidationIssue>) -> RuleFlow {
    if config.issue_id().is_some() {
        return RuleFlow::Continue;
    }
    let offending: Vec<String> = config
        .actions
        .iter()
        .filter(|a| a.requires_issue())
        .map(|a| format!("'{a}'"))
        .collect();
    if !offending.is_empty() {
        issues.push(ValidationIssue::new(
            "linear_issue_id",
            format!(
                "linear_issue_id is required when actions include {}",
                offending.join(", ")
            ),
        ));
    }
    RuleFlow::Continue
}

fn field_requirements(config: &ExportConfig, issues: &mut Vec<ValidationIssue>) -> RuleFlow {
    for req in FIELD_REQUIREMENTS {
        if config.includes(req.action) && !config.has_field(req.field) {
            issues.push(ValidationIssue::new(
                req.field,
                format!("{} is required when actions include '{}'", req.field, req.action),
            ));
        }
    }
    RuleFlow::Continue
}

/// Business rules in evaluation order. Exclusivity short-circuits: once it
/// fires, no later rule is evaluated.
pub fn config_rules() -> Vec<ConfigRule> {
    vec![
        ConfigRule {
            id: "exclusive_actions",
            check: exclusive_actions,
        },
        ConfigRule {
            id: "unique_actions",
            check: unique_actions,
        },
        ConfigRule {
            id: "issue_required",
            check: issue_required,
        },
        ConfigRule {
            id: "field_requirements",
            check: field_requirements,
        },
    ]
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate a raw document into an [`ExportConfig`].
pub fn validate(raw: &Value) -> std::result::Result<ExportConfig, Vec<ValidationIssue>> {
    let config = check_structure(raw)?;

    let mut issues = Vec::new();
    for rule in config_rules() {
        if (rule.check)(&config, &mut issues) == RuleFlow::Stop {
            tracing::debug!(rule = rule.id, "rule evaluation stopped");
            break;
        }
    }

    if issues.is_empty() {
        Ok(config)
    } else {
        Err(issues)
    }
}

/// Parse JSON text and validate it.
pub fn parse_export_config(text: &str) -> Result<ExportConfig> {
    let raw: Value = serde_json::from_str(text)?;
    validate(&raw).map_err(ExportError::InvalidConfig)
}
