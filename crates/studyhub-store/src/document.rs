//! Document type: an ID plus a schemaless field map.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::StoreResult;

/// A document snapshot: the store-assigned ID and the field map as of the
/// read. Clients hold these only as ephemeral, derived copies for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self { id: id.into(), data }
    }

    /// Deserialize into a domain model, injecting the document ID as the
    /// model's `id` field.
    pub fn to_model<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(data))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        id: String,
        name: String,
    }

    #[test]
    fn to_model_injects_the_document_id() {
        let mut data = Map::new();
        data.insert("name".into(), Value::String("Biology".into()));
        let doc = Document::new("doc-1", data);

        let probe: Probe = doc.to_model().unwrap();
        assert_eq!(probe.id, "doc-1");
        assert_eq!(probe.name, "Biology");
    }
}
