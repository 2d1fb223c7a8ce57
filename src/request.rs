//! Session request payload and the builder that derives it from resolved
//! parameters.

use serde::Serialize;

use crate::error::SessionError;
use crate::resolver::{ParamValue, ResolvedParams};
use crate::schema::Field;

/// JSON body of a session-creation call. Unset optionals and false switches
/// are left out of the payload entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playbook_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub unlisted: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub idempotent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_acu_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SessionRequest {
    pub fn to_json(&self) -> Result<Vec<u8>, SessionError> {
        serde_json::to_vec(self)
            .map_err(|err| SessionError::Validation(format!("cannot encode request: {err}")))
    }
}

/// Map resolved parameters onto the wire payload.
pub fn build(resolved: &ResolvedParams) -> Result<SessionRequest, SessionError> {
    let mut request = SessionRequest::default();
    let mut has_prompt = false;

    for (field, value) in resolved.iter() {
        match field {
            Field::Prompt => {
                request.prompt = expect_text(field, value)?;
                has_prompt = true;
            }
            Field::SnapshotId => request.snapshot_id = Some(expect_text(field, value)?),
            Field::PlaybookId => request.playbook_id = Some(expect_text(field, value)?),
            Field::Title => request.title = Some(expect_text(field, value)?),
            Field::Unlisted => request.unlisted = expect_switch(field, value)?,
            Field::Idempotent => request.idempotent = expect_switch(field, value)?,
            Field::MaxAcuLimit => request.max_acu_limit = Some(expect_integer(field, value)?),
            Field::SecretIds => request.secret_ids = Some(expect_list(field, value)?),
            Field::KnowledgeIds => request.knowledge_ids = Some(expect_list(field, value)?),
            Field::Tags => request.tags = Some(expect_list(field, value)?),
        }
    }

    if !has_prompt {
        return Err(SessionError::Validation(
            "missing required parameter(s): prompt".into(),
        ));
    }
    Ok(request)
}

fn type_error(field: Field, expected: &str, value: &ParamValue) -> SessionError {
    SessionError::Validation(format!("{field} must be {expected}, got {value:?}"))
}

fn expect_text(field: Field, value: &ParamValue) -> Result<String, SessionError> {
    match value {
        ParamValue::Text(s) => Ok(s.clone()),
        other => Err(type_error(field, "text", other)),
    }
}

fn expect_switch(field: Field, value: &ParamValue) -> Result<bool, SessionError> {
    match value {
        ParamValue::Switch(b) => Ok(*b),
        other => Err(type_error(field, "a flag", other)),
    }
}

fn expect_integer(field: Field, value: &ParamValue) -> Result<i64, SessionError> {
    match value {
        ParamValue::Integer(raw) => raw.parse::<i64>().map_err(|_| {
            SessionError::Validation(format!("{field} must be an integer, got '{raw}'"))
        }),
        other => Err(type_error(field, "an integer", other)),
    }
}

fn expect_list(field: Field, value: &ParamValue) -> Result<Vec<String>, SessionError> {
    match value {
        ParamValue::List(items) => Ok(items.clone()),
        other => Err(type_error(field, "a list", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved(entries: Vec<(Field, ParamValue)>) -> ResolvedParams {
        entries.into_iter().collect()
    }

    #[test]
    fn minimal_request_carries_only_the_prompt() {
        let params = resolved(vec![
            (Field::Prompt, ParamValue::Text("do it".into())),
            (Field::Unlisted, ParamValue::Switch(false)),
            (Field::Idempotent, ParamValue::Switch(false)),
        ]);
        let body: serde_json::Value =
            serde_json::from_slice(&build(&params).unwrap().to_json().unwrap()).unwrap();
        assert_eq!(body, json!({"prompt": "do it"}));
    }

    #[test]
    fn full_request_maps_every_field() {
        let params = resolved(vec![
            (Field::Prompt, ParamValue::Text("task".into())),
            (Field::SnapshotId, ParamValue::Text("snap".into())),
            (Field::PlaybookId, ParamValue::Text("pb".into())),
            (Field::Unlisted, ParamValue::Switch(true)),
            (Field::Idempotent, ParamValue::Switch(true)),
            (Field::MaxAcuLimit, ParamValue::Integer("42".into())),
            (Field::SecretIds, ParamValue::List(vec!["s1".into()])),
            (Field::KnowledgeIds, ParamValue::List(vec!["k1".into(), "k2".into()])),
            (Field::Tags, ParamValue::List(vec!["t".into()])),
            (Field::Title, ParamValue::Text("Title".into())),
        ]);
        let body = serde_json::to_value(build(&params).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "prompt": "task",
                "snapshot_id": "snap",
                "playbook_id": "pb",
                "unlisted": true,
                "idempotent": true,
                "max_acu_limit": 42,
                "secret_ids": ["s1"],
                "knowledge_ids": ["k1", "k2"],
                "tags": ["t"],
                "title": "Title"
            })
        );
    }

    #[test]
    fn single_element_lists_stay_arrays() {
        let params = resolved(vec![
            (Field::Prompt, ParamValue::Text("p".into())),
            (Field::Tags, ParamValue::List(vec!["only".into()])),
        ]);
        let body = serde_json::to_value(build(&params).unwrap()).unwrap();
        assert_eq!(body["tags"], json!(["only"]));
    }

    #[test]
    fn building_twice_is_byte_identical() {
        let params = resolved(vec![
            (Field::Prompt, ParamValue::Text("p".into())),
            (Field::Tags, ParamValue::List(vec!["a".into(), "b".into()])),
            (Field::MaxAcuLimit, ParamValue::Integer("7".into())),
            (Field::Idempotent, ParamValue::Switch(true)),
        ]);
        let first = build(&params).unwrap().to_json().unwrap();
        let second = build(&params).unwrap().to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn non_numeric_acu_limit_is_a_validation_error() {
        let params = resolved(vec![
            (Field::Prompt, ParamValue::Text("p".into())),
            (Field::MaxAcuLimit, ParamValue::Integer("abc".into())),
        ]);
        match build(&params) {
            Err(SessionError::Validation(msg)) => {
                assert_eq!(msg, "max_acu_limit must be an integer, got 'abc'")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_prompt_is_rejected() {
        let params = resolved(vec![(Field::Title, ParamValue::Text("t".into()))]);
        assert!(matches!(build(&params), Err(SessionError::Validation(_))));
    }
}
