use crate::{
    client::KibanaApi,
    error::{ProviderError, Result},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

pub mod alert;
pub mod mapper;

/// Shared context handed to every resource callback
pub struct ProviderContext {
    client: Box<dyn KibanaApi>,
}

impl ProviderContext {
    /// Create a new context around a connected client handle
    pub fn new(client: Box<dyn KibanaApi>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &dyn KibanaApi {
        self.client.as_ref()
    }
}

/// Identity and named attributes of one resource instance.
///
/// An empty id means the resource does not exist (yet).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl ResourceData {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// Start from a bare identity, as done when importing
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_empty()
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    /// Raw value of an attribute, null counts as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    /// Typed value of an attribute, `None` when absent
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| ProviderError::InvalidAttribute {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| ProviderError::InvalidAttribute {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    pub fn unset(&mut self, key: &str) {
        self.attributes.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_as_typed() {
        let mut data = ResourceData::default();
        data.set("name", "cpu").unwrap();
        data.set("enabled", false).unwrap();

        assert_eq!(data.get_as::<String>("name").unwrap().as_deref(), Some("cpu"));
        assert_eq!(data.get_as::<bool>("enabled").unwrap(), Some(false));
        assert_eq!(data.get_as::<String>("consumer").unwrap(), None);
    }

    #[test]
    fn test_null_is_absent() {
        let data = ResourceData::new(json!({ "throttle": null }).as_object().cloned().unwrap());

        assert!(data.get("throttle").is_none());
        assert_eq!(data.get_as::<String>("throttle").unwrap(), None);
    }

    #[test]
    fn test_get_as_wrong_type() {
        let mut data = ResourceData::default();
        data.set("enabled", "yes").unwrap();

        let err = data.get_as::<bool>("enabled").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidAttribute { ref key, .. } if key == "enabled"));
    }

    #[test]
    fn test_identity() {
        let mut data = ResourceData::from_id("abc");
        assert!(!data.is_absent());

        data.set_id("");
        assert!(data.is_absent());
    }

    #[test]
    fn test_wire_format() {
        let data: ResourceData =
            serde_json::from_value(json!({ "attributes": { "name": "cpu" } })).unwrap();

        assert!(data.is_absent());
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({ "id": "", "attributes": { "name": "cpu" } })
        );
    }
}
