//! Parameter resolution: explicit flags, interactive answers and schema
//! defaults merged into one [`ResolvedParams`].
//!
//! Precedence per field is flag > prompt answer > schema default > absent.
//! The walk is a single pass in schema order; a field is settled once and
//! never revisited. Which fields are asked about depends on the
//! [`InteractionMode`]:
//!
//! - `FlagsOnly` never touches the [`Prompter`].
//! - `Interactive` asks about every field, offering the flag value (if any)
//!   as the default answer.
//! - `Mixed` asks only about required fields the flags left empty.

use std::collections::BTreeMap;
use std::io;

use crate::error::SessionError;
use crate::schema::{parse_switch, split_list, Field, FieldKind, FieldSpec, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    FlagsOnly,
    Interactive,
    Mixed,
}

/// A value as it arrived on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    /// A presence flag such as `--unlisted`.
    Switch,
}

/// Explicit flag values for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitFlags(BTreeMap<Field, RawValue>);

impl ExplicitFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, field: Field, value: impl Into<String>) -> Self {
        self.0.insert(field, RawValue::Text(value.into()));
        self
    }

    /// Record a presence flag; `false` means the flag was not given.
    pub fn switch(mut self, field: Field, present: bool) -> Self {
        if present {
            self.0.insert(field, RawValue::Switch);
        }
        self
    }

    pub fn maybe_text(self, field: Field, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.text(field, v),
            None => self,
        }
    }

    pub fn get(&self, field: Field) -> Option<&RawValue> {
        self.0.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A settled, typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Switch(bool),
    /// Integer literal; checked and converted by the request builder.
    Integer(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Text form used as the pre-filled answer of a prompt.
    fn as_prompt_default(&self) -> String {
        match self {
            ParamValue::Text(s) | ParamValue::Integer(s) => s.clone(),
            ParamValue::Switch(b) => b.to_string(),
            ParamValue::List(items) => items.join(", "),
        }
    }
}

/// Fully resolved parameters. Every required field of the schema is present;
/// optional fields nobody supplied are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParams(BTreeMap<Field, ParamValue>);

impl ResolvedParams {
    pub fn get(&self, field: Field) -> Option<&ParamValue> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &ParamValue)> {
        self.0.iter().map(|(f, v)| (*f, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, field: Field, value: ParamValue) {
        self.0.insert(field, value);
    }
}

impl FromIterator<(Field, ParamValue)> for ResolvedParams {
    fn from_iter<I: IntoIterator<Item = (Field, ParamValue)>>(iter: I) -> Self {
        ResolvedParams(iter.into_iter().collect())
    }
}

/// Source of interactive answers.
pub trait Prompter {
    /// Ask for a text answer; `default` is offered for the user to accept.
    fn text(&mut self, spec: &FieldSpec, default: Option<&str>) -> io::Result<String>;

    fn confirm(&mut self, spec: &FieldSpec, default: bool) -> io::Result<bool>;
}

/// Resolve `schema` against `flags` in the given `mode`.
pub fn resolve(
    schema: &Schema,
    flags: &ExplicitFlags,
    mode: InteractionMode,
    prompter: &mut dyn Prompter,
) -> Result<ResolvedParams, SessionError> {
    let mut resolved = ResolvedParams::default();
    let mut missing = Vec::new();

    for spec in schema.fields() {
        let explicit = match flags.get(spec.field) {
            Some(raw) => from_raw(spec, raw)?,
            None => None,
        };

        let ask = match mode {
            InteractionMode::FlagsOnly => false,
            InteractionMode::Interactive => true,
            InteractionMode::Mixed => spec.required && explicit.is_none(),
        };

        let value = if ask {
            ask_field(spec, explicit.as_ref(), prompter)?
        } else {
            explicit
        };
        let value = match value {
            Some(v) => Some(v),
            None => schema_default(spec)?,
        };

        match value {
            Some(v) => {
                tracing::debug!(field = %spec.field, prompted = ask, "resolved parameter");
                resolved.insert(spec.field, v);
            }
            None if spec.required => missing.push(spec.field.api_name()),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(SessionError::Validation(format!(
            "missing required parameter(s): {}",
            missing.join(", ")
        )));
    }
    Ok(resolved)
}

fn ask_field(
    spec: &FieldSpec,
    primed: Option<&ParamValue>,
    prompter: &mut dyn Prompter,
) -> Result<Option<ParamValue>, SessionError> {
    if spec.kind == FieldKind::Switch {
        let default = match primed {
            Some(ParamValue::Switch(b)) => *b,
            _ => switch_default(spec),
        };
        return Ok(Some(ParamValue::Switch(prompter.confirm(spec, default)?)));
    }
    let default = primed.map(ParamValue::as_prompt_default);
    let answer = prompter.text(spec, default.as_deref())?;
    Ok(from_text(spec, &answer))
}

fn from_raw(spec: &FieldSpec, raw: &RawValue) -> Result<Option<ParamValue>, SessionError> {
    match (spec.kind, raw) {
        (FieldKind::Switch, RawValue::Switch) => Ok(Some(ParamValue::Switch(true))),
        (FieldKind::Switch, RawValue::Text(_)) => Err(SessionError::Validation(format!(
            "parameter '{}' is a flag and takes no value",
            spec.field
        ))),
        (_, RawValue::Switch) => Err(SessionError::Validation(format!(
            "parameter '{}' requires a value",
            spec.field
        ))),
        (_, RawValue::Text(text)) => Ok(from_text(spec, text)),
    }
}

/// Normalize free-form input for a non-switch field. Blank input is absent.
fn from_text(spec: &FieldSpec, text: &str) -> Option<ParamValue> {
    match spec.kind {
        FieldKind::List => split_list(text).map(ParamValue::List),
        _ if text.trim().is_empty() => None,
        FieldKind::FreeText => Some(ParamValue::Text(text.to_string())),
        FieldKind::Text => Some(ParamValue::Text(text.trim().to_string())),
        FieldKind::Integer => Some(ParamValue::Integer(text.trim().to_string())),
        FieldKind::Switch => parse_switch(text).map(ParamValue::Switch),
    }
}

fn schema_default(spec: &FieldSpec) -> Result<Option<ParamValue>, SessionError> {
    let Some(raw) = spec.default else {
        return Ok(None);
    };
    if spec.kind == FieldKind::Switch {
        return match parse_switch(raw) {
            Some(b) => Ok(Some(ParamValue::Switch(b))),
            None => Err(SessionError::Validation(format!(
                "invalid default '{raw}' for flag '{}'",
                spec.field
            ))),
        };
    }
    Ok(from_text(spec, raw))
}

fn switch_default(spec: &FieldSpec) -> bool {
    spec.default.and_then(parse_switch).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PLAYBOOK_SCHEMA, SESSION_SCHEMA};
    use std::collections::HashMap;

    /// Answers from a script keyed by field; records every question asked.
    #[derive(Default)]
    struct ScriptedPrompter {
        text_answers: HashMap<Field, String>,
        confirm_answers: HashMap<Field, bool>,
        asked: Vec<(Field, Option<String>)>,
    }

    impl ScriptedPrompter {
        fn answer(mut self, field: Field, value: &str) -> Self {
            self.text_answers.insert(field, value.to_string());
            self
        }

        fn confirm_answer(mut self, field: Field, value: bool) -> Self {
            self.confirm_answers.insert(field, value);
            self
        }

        fn asked_fields(&self) -> Vec<Field> {
            self.asked.iter().map(|(f, _)| *f).collect()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn text(&mut self, spec: &FieldSpec, default: Option<&str>) -> io::Result<String> {
            self.asked.push((spec.field, default.map(str::to_string)));
            // an unscripted question behaves like pressing enter
            Ok(self
                .text_answers
                .get(&spec.field)
                .cloned()
                .or_else(|| default.map(str::to_string))
                .unwrap_or_default())
        }

        fn confirm(&mut self, spec: &FieldSpec, default: bool) -> io::Result<bool> {
            self.asked.push((spec.field, Some(default.to_string())));
            Ok(self
                .confirm_answers
                .get(&spec.field)
                .copied()
                .unwrap_or(default))
        }
    }

    /// Fails the test if any question is asked.
    struct NoPrompts;

    impl Prompter for NoPrompts {
        fn text(&mut self, spec: &FieldSpec, _: Option<&str>) -> io::Result<String> {
            panic!("unexpected prompt for {}", spec.field)
        }

        fn confirm(&mut self, spec: &FieldSpec, _: bool) -> io::Result<bool> {
            panic!("unexpected confirm for {}", spec.field)
        }
    }

    fn text(s: &str) -> ParamValue {
        ParamValue::Text(s.to_string())
    }

    #[test]
    fn required_flags_present_never_prompt_in_non_interactive_modes() {
        let flags = ExplicitFlags::new().text(Field::Prompt, "fix the build");
        for mode in [InteractionMode::FlagsOnly, InteractionMode::Mixed] {
            let resolved = resolve(&SESSION_SCHEMA, &flags, mode, &mut NoPrompts).unwrap();
            assert_eq!(resolved.get(Field::Prompt), Some(&text("fix the build")));
        }
    }

    #[test]
    fn flags_only_missing_prompt_names_the_field() {
        let err = resolve(
            &SESSION_SCHEMA,
            &ExplicitFlags::new().text(Field::Title, "t"),
            InteractionMode::FlagsOnly,
            &mut NoPrompts,
        )
        .unwrap_err();
        match err {
            SessionError::Validation(msg) => assert!(msg.contains("prompt"), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn flags_only_lists_every_missing_field() {
        let err = resolve(
            &PLAYBOOK_SCHEMA,
            &ExplicitFlags::new(),
            InteractionMode::FlagsOnly,
            &mut NoPrompts,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required parameter(s): playbook_id, prompt"
        );
    }

    #[test]
    fn blank_prompt_flag_counts_as_missing() {
        let err = resolve(
            &SESSION_SCHEMA,
            &ExplicitFlags::new().text(Field::Prompt, "   "),
            InteractionMode::FlagsOnly,
            &mut NoPrompts,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[test]
    fn mixed_mode_prompts_only_missing_required_fields() {
        let mut prompter = ScriptedPrompter::default().answer(Field::Prompt, "write docs");
        let flags = ExplicitFlags::new().text(Field::Tags, "docs");

        let resolved = resolve(&SESSION_SCHEMA, &flags, InteractionMode::Mixed, &mut prompter)
            .unwrap();

        assert_eq!(prompter.asked_fields(), vec![Field::Prompt]);
        assert_eq!(resolved.get(Field::Prompt), Some(&text("write docs")));
        assert_eq!(
            resolved.get(Field::Tags),
            Some(&ParamValue::List(vec!["docs".into()]))
        );
        assert!(!resolved.contains(Field::SnapshotId));
        assert!(!resolved.contains(Field::Title));
        assert_eq!(resolved.get(Field::Unlisted), Some(&ParamValue::Switch(false)));
    }

    #[test]
    fn mixed_mode_blank_answer_for_required_field_fails() {
        let mut prompter = ScriptedPrompter::default();
        let err = resolve(
            &SESSION_SCHEMA,
            &ExplicitFlags::new(),
            InteractionMode::Mixed,
            &mut prompter,
        )
        .unwrap_err();
        assert!(err.to_string().contains("prompt"));
    }

    #[test]
    fn interactive_mode_walks_every_field_with_flag_defaults() {
        let flags = ExplicitFlags::new()
            .text(Field::Prompt, "from flag")
            .text(Field::Tags, "a,b")
            .switch(Field::Unlisted, true);
        let mut prompter = ScriptedPrompter::default()
            .answer(Field::SnapshotId, " snap-1 ")
            .answer(Field::MaxAcuLimit, "15")
            .answer(Field::KnowledgeIds, "k1, ,k2")
            .confirm_answer(Field::Idempotent, true);

        let resolved = resolve(
            &SESSION_SCHEMA,
            &flags,
            InteractionMode::Interactive,
            &mut prompter,
        )
        .unwrap();

        let all: Vec<Field> = SESSION_SCHEMA.fields().iter().map(|s| s.field).collect();
        assert_eq!(prompter.asked_fields(), all);

        let prompt_default = prompter
            .asked
            .iter()
            .find(|(f, _)| *f == Field::Prompt)
            .and_then(|(_, d)| d.clone());
        assert_eq!(prompt_default.as_deref(), Some("from flag"));
        let tags_default = prompter
            .asked
            .iter()
            .find(|(f, _)| *f == Field::Tags)
            .and_then(|(_, d)| d.clone());
        assert_eq!(tags_default.as_deref(), Some("a, b"));

        assert_eq!(resolved.get(Field::Prompt), Some(&text("from flag")));
        assert_eq!(resolved.get(Field::SnapshotId), Some(&text("snap-1")));
        assert_eq!(resolved.get(Field::Unlisted), Some(&ParamValue::Switch(true)));
        assert_eq!(resolved.get(Field::Idempotent), Some(&ParamValue::Switch(true)));
        assert_eq!(
            resolved.get(Field::MaxAcuLimit),
            Some(&ParamValue::Integer("15".into()))
        );
        assert_eq!(
            resolved.get(Field::KnowledgeIds),
            Some(&ParamValue::List(vec!["k1".into(), "k2".into()]))
        );
        assert!(!resolved.contains(Field::SecretIds));
        assert!(!resolved.contains(Field::Title));
    }

    #[test]
    fn interactive_answer_overrides_primed_flag_value() {
        let flags = ExplicitFlags::new().text(Field::Prompt, "old task");
        let mut prompter = ScriptedPrompter::default()
            .answer(Field::Prompt, "new task")
            .confirm_answer(Field::Unlisted, false);

        let resolved = resolve(
            &PLAYBOOK_SCHEMA,
            &flags.text(Field::PlaybookId, "pb-1"),
            InteractionMode::Interactive,
            &mut prompter,
        )
        .unwrap();
        assert_eq!(resolved.get(Field::Prompt), Some(&text("new task")));
        assert_eq!(resolved.get(Field::PlaybookId), Some(&text("pb-1")));
    }

    #[test]
    fn free_text_is_kept_verbatim_but_identifiers_are_trimmed() {
        let flags = ExplicitFlags::new()
            .text(Field::Prompt, "  indented task\n")
            .text(Field::SnapshotId, "  snap-9  ");
        let resolved =
            resolve(&SESSION_SCHEMA, &flags, InteractionMode::FlagsOnly, &mut NoPrompts).unwrap();
        assert_eq!(resolved.get(Field::Prompt), Some(&text("  indented task\n")));
        assert_eq!(resolved.get(Field::SnapshotId), Some(&text("snap-9")));
    }

    #[test]
    fn empty_list_flag_is_absent() {
        let flags = ExplicitFlags::new()
            .text(Field::Prompt, "p")
            .text(Field::SecretIds, "")
            .text(Field::Tags, " , ");
        let resolved =
            resolve(&SESSION_SCHEMA, &flags, InteractionMode::FlagsOnly, &mut NoPrompts).unwrap();
        assert!(!resolved.contains(Field::SecretIds));
        assert!(!resolved.contains(Field::Tags));
    }

    #[test]
    fn mismatched_flag_shapes_are_rejected() {
        let err = resolve(
            &SESSION_SCHEMA,
            &ExplicitFlags::new()
                .text(Field::Prompt, "p")
                .text(Field::Unlisted, "yes"),
            InteractionMode::FlagsOnly,
            &mut NoPrompts,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unlisted"));

        let err = resolve(
            &SESSION_SCHEMA,
            &ExplicitFlags::new().switch(Field::Prompt, true),
            InteractionMode::FlagsOnly,
            &mut NoPrompts,
        )
        .unwrap_err();
        assert!(err.to_string().contains("requires a value"));
    }
}
