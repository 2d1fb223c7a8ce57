//! Typed parameter schemas for session creation.
//!
//! Each schema is a fixed, ordered slice of [`FieldSpec`]s. The resolver walks
//! it in order and the request builder matches exhaustively on [`Field`].

use std::fmt;

/// Every parameter the session API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Prompt,
    SnapshotId,
    PlaybookId,
    Unlisted,
    Idempotent,
    MaxAcuLimit,
    SecretIds,
    KnowledgeIds,
    Tags,
    Title,
}

impl Field {
    /// Name of the field in the JSON payload.
    pub fn api_name(self) -> &'static str {
        match self {
            Field::Prompt => "prompt",
            Field::SnapshotId => "snapshot_id",
            Field::PlaybookId => "playbook_id",
            Field::Unlisted => "unlisted",
            Field::Idempotent => "idempotent",
            Field::MaxAcuLimit => "max_acu_limit",
            Field::SecretIds => "secret_ids",
            Field::KnowledgeIds => "knowledge_ids",
            Field::Tags => "tags",
            Field::Title => "title",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Identifier-like string; surrounding whitespace is trimmed.
    Text,
    /// Prose kept verbatim.
    FreeText,
    /// Presence flag / yes-no question.
    Switch,
    /// Decimal integer, coerced when the request is built.
    Integer,
    /// Comma-separated list.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub kind: FieldKind,
    pub required: bool,
    /// Raw default, interpreted according to `kind`.
    pub default: Option<&'static str>,
    /// Question shown in interactive mode.
    pub label: &'static str,
}

impl FieldSpec {
    const fn new(field: Field, kind: FieldKind, label: &'static str) -> Self {
        FieldSpec {
            field,
            kind,
            required: false,
            default: None,
            label,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    fields: &'static [FieldSpec],
}

impl Schema {
    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn spec(&self, field: Field) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|s| s.field == field)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|s| s.required)
    }
}

/// Full create-session schema.
pub static SESSION_SCHEMA: Schema = Schema {
    name: "session",
    fields: &[
        FieldSpec::new(Field::Prompt, FieldKind::FreeText, "Task description for Devin").required(),
        FieldSpec::new(Field::SnapshotId, FieldKind::Text, "Snapshot ID (optional)"),
        FieldSpec::new(Field::PlaybookId, FieldKind::Text, "Playbook ID (optional)"),
        FieldSpec::new(Field::Unlisted, FieldKind::Switch, "Make session unlisted?")
            .default_value("false"),
        FieldSpec::new(
            Field::Idempotent,
            FieldKind::Switch,
            "Enable idempotent session creation?",
        )
        .default_value("false"),
        FieldSpec::new(Field::MaxAcuLimit, FieldKind::Integer, "Maximum ACU limit (optional)"),
        FieldSpec::new(
            Field::SecretIds,
            FieldKind::List,
            "Secret IDs (comma-separated, optional)",
        ),
        FieldSpec::new(
            Field::KnowledgeIds,
            FieldKind::List,
            "Knowledge IDs (comma-separated, optional)",
        ),
        FieldSpec::new(Field::Tags, FieldKind::List, "Tags (comma-separated, optional)"),
        FieldSpec::new(Field::Title, FieldKind::FreeText, "Custom title (optional)"),
    ],
};

/// Reduced schema for `devin playbook`: a playbook id and a prompt, nothing else.
pub static PLAYBOOK_SCHEMA: Schema = Schema {
    name: "playbook",
    fields: &[
        FieldSpec::new(Field::PlaybookId, FieldKind::Text, "Playbook ID").required(),
        FieldSpec::new(Field::Prompt, FieldKind::FreeText, "Task description for Devin").required(),
    ],
};

/// Split a comma-separated list, trimming elements and dropping empty ones.
/// Returns `None` when nothing remains.
pub fn split_list(input: &str) -> Option<Vec<String>> {
    let items: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Parse a yes/no style switch value.
pub fn parse_switch(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" | "" => Some(false),
        _ => None,
    }
}
