//! Decision-service event wire format.
//!
//! Events produced for the external event logger. Field order and key
//! casing are a strict compatibility contract, so the ranking event is
//! assembled by hand on top of `serde_json`'s string/number formatting
//! (its context payload is spliced verbatim and need not be valid JSON
//! on its own).

use std::fmt::Write;

use serde::Serialize;

/// Outcome event: `{"EventId":"<uuid>","v":"<outcome_data>"}`.
///
/// Both fields are free-form strings; empty values serialize as empty
/// strings with no coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeEvent {
    /// Decision event id this outcome belongs to.
    #[serde(rename = "EventId")]
    pub event_id: String,
    /// Opaque outcome payload.
    pub v: String,
}

impl OutcomeEvent {
    /// Create an outcome event.
    pub fn new(event_id: impl Into<String>, outcome: impl Into<String>) -> Self {
        OutcomeEvent {
            event_id: event_id.into(),
            v: outcome.into(),
        }
    }

    /// Serialize to the wire string.
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).expect("string-only struct serializes")
    }
}

/// Ranking event:
/// `{"Version":"1","EventId":…,"a":[…],"c":…,"p":[…],"VWState":{"m":…}}`.
///
/// `ranking` pairs `(action id, probability)` in rank order; the two
/// arrays `a` and `p` keep that order. An empty ranking serializes as
/// `"a":[],"p":[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingEvent {
    /// Decision event id.
    pub event_id: String,
    /// Opaque context payload, spliced into the output verbatim.
    pub context: String,
    /// `(action id, probability)` in rank order.
    pub ranking: Vec<(u32, f32)>,
    /// Identifier of the model that produced the ranking.
    pub model_id: String,
}

impl RankingEvent {
    /// Create a ranking event.
    pub fn new(
        event_id: impl Into<String>,
        context: impl Into<String>,
        ranking: Vec<(u32, f32)>,
        model_id: impl Into<String>,
    ) -> Self {
        RankingEvent {
            event_id: event_id.into(),
            context: context.into(),
            ranking,
            model_id: model_id.into(),
        }
    }

    /// Serialize to the wire string.
    pub fn serialize(&self) -> String {
        let json_string =
            |s: &str| serde_json::to_string(s).expect("strings serialize");

        let mut out = String::with_capacity(64 + self.context.len());
        out.push_str("{\"Version\":\"1\",\"EventId\":");
        out.push_str(&json_string(&self.event_id));

        out.push_str(",\"a\":[");
        for (rank, (action, _)) in self.ranking.iter().enumerate() {
            if rank > 0 {
                out.push(',');
            }
            write!(out, "{action}").expect("writing to a String");
        }

        out.push_str("],\"c\":");
        out.push_str(&self.context);

        out.push_str(",\"p\":[");
        for (rank, (_, probability)) in self.ranking.iter().enumerate() {
            if rank > 0 {
                out.push(',');
            }
            out.push_str(
                &serde_json::to_string(probability).expect("finite floats serialize"),
            );
        }

        out.push_str("],\"VWState\":{\"m\":");
        out.push_str(&json_string(&self.model_id));
        out.push_str("}}");
        out
    }
}
