use crate::{
    error::{ProviderError, Result},
    kibana::alert::{Alert, AlertAction, AlertSchedule},
    resource::ResourceData,
};
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;

/// Alert configuration as read from resource attributes, `None` marks an unset attribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertConfig {
    pub name: Option<String>,
    pub space_id: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub alert_type_id: Option<String>,
    pub schedule: Option<Vec<AlertSchedule>>,
    pub throttle: Option<String>,
    pub notify_when: Option<String>,
    pub enabled: Option<bool>,
    pub consumer: Option<String>,
    pub params: Option<Map<String, Value>>,
    pub actions: Option<Vec<Value>>,
}

impl AlertConfig {
    /// Read and type-check every attribute
    pub fn from_resource(d: &ResourceData) -> Result<Self> {
        Ok(Self {
            name: d.get_as("name")?,
            space_id: d.get_as("space_id")?,
            tags: d.get_as("tags")?,
            alert_type_id: d.get_as("alert_type_id")?,
            schedule: d.get_as("schedule")?,
            throttle: d.get_as("throttle")?,
            notify_when: d.get_as("notify_when")?,
            enabled: d.get_as("enabled")?,
            consumer: d.get_as("consumer")?,
            params: d.get_as("params")?,
            actions: d.get_as("actions")?,
        })
    }

    /// Build the alert sent to Kibana
    pub fn into_alert(self) -> Result<Alert> {
        let mut schedule = self.schedule.unwrap_or_default();
        if schedule.len() != 1 {
            return Err(ProviderError::MalformedSchedule(schedule.len()));
        }

        let actions = expand_actions(&self.actions.unwrap_or_default())?;

        Ok(Alert {
            id: None,
            name: self.name.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            alert_type_id: self.alert_type_id.unwrap_or_default(),
            schedule: schedule.remove(0),
            throttle: self.throttle,
            notify_when: self.notify_when.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            consumer: self.consumer.unwrap_or_default(),
            params: self.params.unwrap_or_default(),
            actions,
        })
    }
}

/// Map resource attributes to an alert
pub fn expand_alert(d: &ResourceData) -> Result<Alert> {
    AlertConfig::from_resource(d)?.into_alert()
}

/// Map each element of the actions attribute, failing on the first bad one
pub fn expand_actions(actions: &[Value]) -> Result<Vec<AlertAction>> {
    actions
        .iter()
        .enumerate()
        .map(|(index, action)| expand_action(index, action))
        .collect()
}

fn expand_action(index: usize, action: &Value) -> Result<AlertAction> {
    let Some(action) = action.as_object() else {
        return Err(ProviderError::ActionMapping {
            index,
            message: "expected an object".to_string(),
        });
    };

    let required = |key: &str| -> Result<String> {
        action
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ActionMapping {
                index,
                message: format!("'{key}' must be a string"),
            })
    };

    let params = match action.get("params") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(params)) => params.clone(),
        Some(_) => {
            return Err(ProviderError::ActionMapping {
                index,
                message: "'params' must be a map".to_string(),
            });
        }
    };

    Ok(AlertAction {
        group: required("group")?,
        id: required("id")?,
        action_type_id: required("action_type_id")?,
        params,
    })
}

/// Copy an alert into resource attributes
pub fn flatten_alert(alert: &Alert, d: &mut ResourceData) -> Result<()> {
    d.set("name", &alert.name)?;
    d.set("tags", &alert.tags)?;
    d.set("alert_type_id", &alert.alert_type_id)?;
    d.set("schedule", [&alert.schedule])?;
    match &alert.throttle {
        Some(throttle) => d.set("throttle", throttle)?,
        None => d.unset("throttle"),
    }
    d.set("notify_when", &alert.notify_when)?;
    d.set("enabled", alert.enabled)?;
    d.set("consumer", &alert.consumer)?;
    d.set("params", &alert.params)?;
    d.set(
        "actions",
        alert.actions.iter().map(flatten_action).collect::<Vec<_>>(),
    )?;

    Ok(())
}

fn flatten_action(action: &AlertAction) -> Value {
    json!({
        "group": action.group,
        "id": action.id,
        "action_type_id": action.action_type_id,
        "params": action.params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(value: Value) -> ResourceData {
        ResourceData::new(value.as_object().cloned().unwrap())
    }

    fn full_config() -> Value {
        json!({
            "name": "cpu",
            "tags": ["infra", "prod"],
            "alert_type_id": ".index-threshold",
            "schedule": [{ "interval": "5m" }],
            "throttle": "10m",
            "notify_when": "onThrottleInterval",
            "enabled": false,
            "consumer": "alerts",
            "params": { "index": ["metrics-*"], "threshold": [90] },
            "actions": [
                {
                    "group": "threshold met",
                    "id": "slack-ops",
                    "action_type_id": ".slack",
                    "params": { "message": "cpu is hot" }
                },
                {
                    "group": "recovered",
                    "id": "slack-ops",
                    "action_type_id": ".slack",
                    "params": {}
                }
            ]
        })
    }

    #[test]
    fn test_expand_full_config() {
        let alert = expand_alert(&resource(full_config())).unwrap();

        assert!(alert.id.is_none());
        assert_eq!(alert.name, "cpu");
        assert_eq!(alert.schedule.interval, "5m");
        assert_eq!(alert.throttle.as_deref(), Some("10m"));
        assert!(!alert.enabled);
        assert_eq!(alert.actions.len(), 2);
        assert_eq!(alert.actions[0].action_type_id, ".slack");
        assert_eq!(alert.actions[0].params["message"], "cpu is hot");
    }

    #[test]
    fn test_round_trip_is_identity() {
        let config = resource(full_config());
        let alert = expand_alert(&config).unwrap();

        let mut state = ResourceData::default();
        flatten_alert(&alert, &mut state).unwrap();

        assert_eq!(state.attributes(), config.attributes());
    }

    #[test]
    fn test_round_trip_over_config_shapes() {
        let minimal = json!({
            "name": "",
            "tags": [],
            "alert_type_id": "",
            "schedule": [{ "interval": "1m" }],
            "notify_when": "",
            "enabled": true,
            "consumer": "",
            "params": {},
            "actions": []
        });

        let mut no_actions = full_config();
        no_actions["tags"] = json!([]);
        no_actions["actions"] = json!([]);

        let mut single_action = full_config();
        single_action.as_object_mut().unwrap().remove("throttle");
        single_action["actions"] = json!([{
            "group": "threshold met",
            "id": "pager",
            "action_type_id": ".pagerduty",
            "params": { "severity": "critical", "dedupKey": ["cpu", 1] }
        }]);

        for config in [minimal, no_actions, single_action] {
            let config = resource(config);
            let alert = expand_alert(&config).unwrap();

            let mut state = ResourceData::default();
            flatten_alert(&alert, &mut state).unwrap();

            assert_eq!(state.attributes(), config.attributes());
        }
    }

    #[test]
    fn test_round_trip_fills_absent_action_params() {
        let mut config = full_config();
        config["actions"] = json!([{
            "group": "threshold met",
            "id": "slack-ops",
            "action_type_id": ".slack"
        }]);
        let alert = expand_alert(&resource(config)).unwrap();

        let mut state = ResourceData::default();
        flatten_alert(&alert, &mut state).unwrap();

        assert_eq!(state.attributes()["actions"][0]["params"], json!({}));
        assert_eq!(expand_alert(&state).unwrap(), alert);
    }

    #[test]
    fn test_round_trip_keeps_space_id() {
        let mut config = full_config();
        config["space_id"] = json!("ops");
        let mut state = resource(config);

        let alert = expand_alert(&state).unwrap();
        flatten_alert(&alert, &mut state).unwrap();

        assert_eq!(state.get_as::<String>("space_id").unwrap().as_deref(), Some("ops"));
    }

    #[test]
    fn test_empty_schedule_is_malformed() {
        let mut config = full_config();
        config["schedule"] = json!([]);

        let err = expand_alert(&resource(config)).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedSchedule(0)));
    }

    #[test]
    fn test_missing_schedule_is_malformed() {
        let err = expand_alert(&resource(json!({ "name": "cpu" }))).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedSchedule(0)));
    }

    #[test]
    fn test_two_schedules_are_malformed() {
        let mut config = full_config();
        config["schedule"] = json!([{ "interval": "1m" }, { "interval": "2m" }]);

        let err = expand_alert(&resource(config)).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedSchedule(2)));
    }

    #[test]
    fn test_bad_action_reports_index() {
        let mut config = full_config();
        config["actions"][1] = json!({ "group": "recovered", "id": "slack-ops" });

        let err = expand_alert(&resource(config)).unwrap_err();
        assert!(matches!(err, ProviderError::ActionMapping { index: 1, ref message } if message.contains("action_type_id")));
    }

    #[test]
    fn test_action_params_must_be_a_map() {
        let actions = vec![json!({
            "group": "g",
            "id": "x",
            "action_type_id": ".email",
            "params": "to: ops"
        })];

        let err = expand_actions(&actions).unwrap_err();
        assert!(matches!(err, ProviderError::ActionMapping { index: 0, .. }));
    }

    #[test]
    fn test_wrong_attribute_type() {
        let mut config = full_config();
        config["tags"] = json!("prod");

        let err = expand_alert(&resource(config)).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidAttribute { ref key, .. } if key == "tags"));
    }

    #[test]
    fn test_unset_attributes_use_defaults() {
        let alert = expand_alert(&resource(json!({
            "name": "terraform-test",
            "schedule": [{ "interval": "1m" }]
        })))
        .unwrap();

        assert!(alert.enabled);
        assert!(alert.tags.is_empty());
        assert!(alert.throttle.is_none());
        assert!(alert.actions.is_empty());
        assert_eq!(alert.consumer, "");
    }

    #[test]
    fn test_flatten_unsets_missing_throttle() {
        let mut state = resource(json!({ "throttle": "1h" }));
        let alert = Alert {
            name: "cpu".to_string(),
            ..Default::default()
        };

        flatten_alert(&alert, &mut state).unwrap();

        assert!(state.get("throttle").is_none());
        assert_eq!(state.get("schedule"), Some(&json!([{ "interval": "" }])));
    }
}
