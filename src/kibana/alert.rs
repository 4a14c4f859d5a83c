use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Assigned by Kibana, never sent back
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alert_type_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule: AlertSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notify_when: String,
    #[serde(default = "enabled_by_default", deserialize_with = "null_as_enabled")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consumer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<AlertAction>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AlertSchedule {
    #[serde(default, deserialize_with = "null_as_default")]
    pub interval: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlertAction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub group: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_type_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: Map<String, Value>,
}

fn enabled_by_default() -> bool {
    true
}

/// Kibana sends `null` for fields it has no value for
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_enabled<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|enabled| enabled.unwrap_or(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case_without_id() {
        let alert = Alert {
            id: Some("7d9e".to_string()),
            name: "cpu".to_string(),
            alert_type_id: ".index-threshold".to_string(),
            schedule: AlertSchedule {
                interval: "1m".to_string(),
            },
            notify_when: "onActiveAlert".to_string(),
            enabled: true,
            consumer: "alerts".to_string(),
            actions: vec![AlertAction {
                group: "threshold met".to_string(),
                id: "slack".to_string(),
                action_type_id: ".slack".to_string(),
                params: Map::new(),
            }],
            ..Default::default()
        };

        let value = serde_json::to_value(&alert).unwrap();

        assert!(value.get("id").is_none());
        assert!(value.get("throttle").is_none());
        assert_eq!(value["alertTypeId"], ".index-threshold");
        assert_eq!(value["notifyWhen"], "onActiveAlert");
        assert_eq!(value["schedule"], json!({ "interval": "1m" }));
        assert_eq!(value["actions"][0]["actionTypeId"], ".slack");
    }

    #[test]
    fn test_deserializes_server_response() {
        let body = json!({
            "id": "0a1b",
            "name": "cpu",
            "tags": ["prod", "infra"],
            "alertTypeId": ".index-threshold",
            "schedule": { "interval": "5m" },
            "throttle": null,
            "notifyWhen": "onActionGroupChange",
            "enabled": false,
            "consumer": "alerts",
            "params": { "threshold": [90] },
            "actions": [],
            "createdBy": "elastic",
            "muteAll": false
        });

        let alert: Alert = serde_json::from_value(body).unwrap();

        assert_eq!(alert.id.as_deref(), Some("0a1b"));
        assert_eq!(alert.tags.len(), 2);
        assert!(alert.throttle.is_none());
        assert!(!alert.enabled);
        assert_eq!(alert.params["threshold"], json!([90]));
    }

    #[test]
    fn test_null_fields_decode_as_defaults() {
        let body = json!({
            "id": "0a1b",
            "name": "cpu",
            "tags": null,
            "alertTypeId": ".index-threshold",
            "schedule": { "interval": "1m" },
            "throttle": null,
            "notifyWhen": null,
            "enabled": null,
            "consumer": null,
            "params": null,
            "actions": [{
                "group": "threshold met",
                "id": "slack",
                "actionTypeId": ".slack",
                "params": null
            }]
        });

        let alert: Alert = serde_json::from_value(body).unwrap();

        assert_eq!(alert.notify_when, "");
        assert_eq!(alert.consumer, "");
        assert!(alert.tags.is_empty());
        assert!(alert.params.is_empty());
        assert!(alert.enabled);
        assert!(alert.actions[0].params.is_empty());
    }

    #[test]
    fn test_wrong_types_still_fail() {
        let body = json!({ "name": "cpu", "notifyWhen": 3 });

        assert!(serde_json::from_value::<Alert>(body).is_err());
    }
}
