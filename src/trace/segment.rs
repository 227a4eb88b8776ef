//! Segment wire model.
//!
//! Field names and shapes here are collector wire format; renames and
//! skipped optionals are deliberate and must not change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::trace::id::{EntityId, TraceId};

/// Wire value for the subsegment `type` field.
pub const SUBSEGMENT_TYPE: &str = "subsegment";

/// One recorded exception inside a segment's cause block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exception {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Failure cause attached to a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cause {
    pub exceptions: Vec<Exception>,
}

/// A root segment or nested subsegment record.
///
/// Absent optional fields are omitted from the serialized form rather
/// than encoded as null. Timestamps are seconds since epoch with
/// fractional precision preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub id: EntityId,
    pub trace_id: TraceId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<EntityId>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub annotations: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cause: Option<Cause>,
}

impl Segment {
    /// Build a root segment: no parent, no `type` field.
    pub fn root(
        name: impl Into<String>,
        id: EntityId,
        trace_id: TraceId,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            trace_id,
            parent_id: None,
            kind: None,
            start_time,
            end_time,
            annotations: BTreeMap::new(),
            error: None,
            cause: None,
        }
    }

    /// Build a subsegment parented to the root or another subsegment.
    pub fn subsegment(
        name: impl Into<String>,
        id: EntityId,
        trace_id: TraceId,
        parent_id: EntityId,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        let mut segment = Self::root(name, id, trace_id, start_time, end_time);
        segment.parent_id = Some(parent_id);
        segment.kind = Some(SUBSEGMENT_TYPE.to_string());
        segment
    }

    /// Attach a free-form annotation.
    pub fn annotate(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.to_string(), value.into());
        self
    }

    /// Record a failure on this segment.
    pub fn with_error(mut self, message: &str, kind: &str) -> Self {
        self.error = Some(true);
        self.cause = Some(Cause {
            exceptions: vec![Exception {
                message: message.to_string(),
                kind: kind.to_string(),
            }],
        });
        self
    }

    pub fn is_subsegment(&self) -> bool {
        self.kind.as_deref() == Some(SUBSEGMENT_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::id::IdGenerator;

    fn ids() -> IdGenerator {
        IdGenerator::deterministic()
    }

    #[test]
    fn root_segment_omits_optional_fields() {
        let ids = ids();
        let segment = Segment::root("gateway", ids.new_entity_id(), ids.new_trace_id(), 1.0, 2.0);
        let value = serde_json::to_value(&segment).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("parent_id"));
        assert!(!obj.contains_key("type"));
        assert!(!obj.contains_key("error"));
        assert!(!obj.contains_key("cause"));
        assert!(obj.contains_key("annotations"));
    }

    #[test]
    fn subsegment_carries_type_and_parent() {
        let ids = ids();
        let parent = ids.new_entity_id();
        let segment = Segment::subsegment(
            "step-a",
            ids.new_entity_id(),
            ids.new_trace_id(),
            parent.clone(),
            1.0,
            2.0,
        );
        assert!(segment.is_subsegment());
        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(value["type"], "subsegment");
        assert_eq!(value["parent_id"], parent.as_str());
    }

    #[test]
    fn error_serializes_as_flag_plus_cause() {
        let ids = ids();
        let segment = Segment::subsegment(
            "step-a",
            ids.new_entity_id(),
            ids.new_trace_id(),
            ids.new_entity_id(),
            1.0,
            2.0,
        )
        .with_error("Missing required field", "InferenceError");
        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(value["error"], true);
        assert_eq!(
            value["cause"]["exceptions"][0]["message"],
            "Missing required field"
        );
        assert_eq!(value["cause"]["exceptions"][0]["type"], "InferenceError");
    }

    #[test]
    fn timestamps_keep_fractional_precision() {
        let ids = ids();
        let segment = Segment::root(
            "gateway",
            ids.new_entity_id(),
            ids.new_trace_id(),
            1700000000.123456,
            1700000000.654321,
        );
        let value = serde_json::to_value(&segment).unwrap();
        assert!((value["start_time"].as_f64().unwrap() - 1700000000.123456).abs() < 1e-9);
        assert!((value["end_time"].as_f64().unwrap() - 1700000000.654321).abs() < 1e-9);
    }

    #[test]
    fn annotations_round_trip() {
        let ids = ids();
        let segment = Segment::root("gateway", ids.new_entity_id(), ids.new_trace_id(), 1.0, 2.0)
            .annotate("success", true)
            .annotate("duration_ms", 12.5)
            .annotate("service", "inference-gateway");
        let raw = serde_json::to_string(&segment).unwrap();
        let parsed: Segment = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, segment);
    }
}
