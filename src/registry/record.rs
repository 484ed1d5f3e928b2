//! Persisted condition payloads.
//!
//! A record is a tagged JSON object: a `ref` discriminator plus the
//! variant's durable fields, flattened alongside it. The surrounding
//! persistence layer treats the whole object as opaque; only the loader
//! peeks the tag. Transient machinery (subscription ids, bus handles) is
//! never part of a record.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::{ConditionRef, EngineError};

/// The discriminator key inside a persisted payload.
const REF_KEY: &str = "ref";

/// A condition's durable snapshot: ref plus variant fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionRecord {
    reference: ConditionRef,
    fields: Map<String, Value>,
}

impl ConditionRecord {
    /// Build a record from a variant's durable-field struct.
    ///
    /// The fields must serialize to a JSON object (or to nothing, for a
    /// variant with no parameters).
    pub fn new<T: Serialize>(reference: ConditionRef, fields: &T) -> Result<Self, EngineError> {
        let value = serde_json::to_value(fields).map_err(|e| {
            EngineError::Internal(format!("cannot serialize fields for {reference}: {e}"))
        })?;
        let fields = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(EngineError::Internal(format!(
                    "fields for {reference} serialized to {other}, expected an object"
                )))
            }
        };
        if fields.contains_key(REF_KEY) {
            return Err(EngineError::Internal(format!(
                "fields for {reference} shadow the `{REF_KEY}` discriminator"
            )));
        }
        Ok(Self { reference, fields })
    }

    /// The variant this record belongs to.
    #[must_use]
    pub fn reference(&self) -> &ConditionRef {
        &self.reference
    }

    /// Recover a variant's durable-field struct.
    ///
    /// Omitted optional fields take their documented serde defaults.
    pub fn parse_fields<T: DeserializeOwned>(&self) -> Result<T, EngineError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            EngineError::InvalidArgument(format!("malformed payload for {}: {e}", self.reference))
        })
    }

    /// Render the opaque persisted payload.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert(
            REF_KEY.to_string(),
            Value::String(self.reference.to_string()),
        );
        Value::Object(object)
    }

    /// Peek a persisted payload: parse the tag, keep the rest untouched.
    ///
    /// Fails [`EngineError::InvalidArgument`] when the payload is not an
    /// object, has no tag, or the tag is malformed. Whether the ref is
    /// *known* is the registry's question, not this one's.
    pub fn from_value(value: &Value) -> Result<Self, EngineError> {
        let Some(object) = value.as_object() else {
            return Err(EngineError::InvalidArgument(
                "condition payload is not a JSON object".to_string(),
            ));
        };
        let Some(tag) = object.get(REF_KEY) else {
            return Err(EngineError::InvalidArgument(format!(
                "condition payload has no `{REF_KEY}` discriminator"
            )));
        };
        let Some(tag) = tag.as_str() else {
            return Err(EngineError::InvalidArgument(format!(
                "condition payload `{REF_KEY}` is not a string"
            )));
        };
        let reference = ConditionRef::parse(tag)?;

        let mut fields = object.clone();
        fields.remove(REF_KEY);
        Ok(Self { reference, fields })
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Durable {
        character: String,
        level: u32,
        #[serde(default = "ten")]
        rounds: u32,
    }

    fn ten() -> u32 {
        10
    }

    fn rage_ref() -> ConditionRef {
        ConditionRef::new("class", "barbarian", "rage")
    }

    #[test]
    fn test_round_trip_is_field_identical() {
        let record = ConditionRecord::new(
            rage_ref(),
            &Durable {
                character: "barbarian-1".to_string(),
                level: 5,
                rounds: 7,
            },
        )
        .unwrap();

        let payload = record.to_value();
        let back = ConditionRecord::from_value(&payload).unwrap();

        assert_eq!(back, record);
        assert_eq!(back.to_value(), payload);
        assert_eq!(back.reference(), &rage_ref());
    }

    #[test]
    fn test_payload_is_tagged_and_flat() {
        let record = ConditionRecord::new(
            rage_ref(),
            &Durable {
                character: "barbarian-1".to_string(),
                level: 5,
                rounds: 10,
            },
        )
        .unwrap();

        assert_eq!(
            record.to_value(),
            json!({
                "ref": "class:barbarian:rage",
                "character": "barbarian-1",
                "level": 5,
                "rounds": 10,
            })
        );
    }

    #[test]
    fn test_omitted_fields_take_defaults() {
        let payload = json!({
            "ref": "class:barbarian:rage",
            "character": "barbarian-1",
            "level": 3,
        });
        let record = ConditionRecord::from_value(&payload).unwrap();
        let fields: Durable = record.parse_fields().unwrap();

        assert_eq!(fields.rounds, 10);
    }

    #[test]
    fn test_peek_rejects_malformed_payloads() {
        for payload in [
            json!(42),
            json!({"character": "barbarian-1"}),
            json!({"ref": 7}),
            json!({"ref": "not-a-ref"}),
        ] {
            let result = ConditionRecord::from_value(&payload);
            assert!(
                matches!(result, Err(EngineError::InvalidArgument(_))),
                "accepted {payload}"
            );
        }
    }

    #[test]
    fn test_unit_fields_serialize_to_empty_object() {
        #[derive(Serialize)]
        struct Nothing;

        let record = ConditionRecord::new(rage_ref(), &Nothing).unwrap();
        assert_eq!(record.to_value(), json!({"ref": "class:barbarian:rage"}));
    }
}
