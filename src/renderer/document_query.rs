use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A rendered aggregation pipeline and the collection it runs against.
///
/// Serializes as `{"collection": ..., "aggregation": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub collection: String,
    #[serde(rename = "aggregation")]
    pub pipeline: Vec<Value>,
}

impl DocumentQuery {
    pub fn new(collection: &str, pipeline: Vec<Value>) -> Self {
        Self { collection: collection.to_string(), pipeline }
    }

    /// Operator key of every stage, in order (`$group`, `$match`...).
    pub fn stage_names(&self) -> Vec<&str> {
        self.pipeline
            .iter()
            .filter_map(|stage| stage.as_object()?.keys().next().map(String::as_str))
            .collect()
    }

    /// The body of the first stage with the given operator.
    pub fn stage(&self, operator: &str) -> Option<&Value> {
        self.pipeline.iter().find_map(|stage| stage.get(operator))
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "collection": self.collection,
            "aggregation": self.pipeline,
        })
    }
}

impl fmt::Display for DocumentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(&self.to_json()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::renderer::DocumentQuery;

    #[test]
    pub fn test_wire_shape() {
        let query = DocumentQuery::new("sales", vec![json!({"$limit": 5})]);
        let wire = serde_json::to_value(&query).expect("serialize");
        assert_eq!(wire, json!({"collection": "sales", "aggregation": [{"$limit": 5}]}));

        let back: DocumentQuery = serde_json::from_value(wire).expect("deserialize");
        assert_eq!(back, query);
    }

    #[test]
    pub fn test_stage_lookup() {
        let query = DocumentQuery::new("sales", vec![json!({"$match": {"a": 1}}), json!({"$limit": 5})]);
        assert_eq!(query.stage_names(), vec!["$match", "$limit"]);
        assert_eq!(query.stage("$limit"), Some(&json!(5)));
        assert_eq!(query.stage("$sort"), None);
    }
}
