use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Default check interval applied when a configuration has no schedule block
pub const DEFAULT_SCHEDULE_INTERVAL: &str = "1m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Map,
    List,
    Set,
}

impl AttributeType {
    /// Whether a JSON value has this shape
    fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::Map => value.is_object(),
            AttributeType::List | AttributeType::Set => value.is_array(),
        }
    }
}

/// Element description of a list or set attribute
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Type(AttributeType),
    Block(Schema),
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Element>,
}

impl Attribute {
    fn new(kind: AttributeType, required: bool) -> Self {
        Self {
            kind,
            required,
            optional: !required,
            force_new: false,
            max_items: None,
            default: None,
            elem: None,
        }
    }

    pub fn required_string() -> Self {
        Self::new(AttributeType::String, true)
    }

    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, false)
    }

    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, false)
    }

    pub fn optional_map() -> Self {
        Self::new(AttributeType::Map, false)
    }

    pub fn optional_list(elem: Element) -> Self {
        Self {
            elem: Some(elem),
            ..Self::new(AttributeType::List, false)
        }
    }

    pub fn optional_set(elem: Element) -> Self {
        Self {
            elem: Some(elem),
            ..Self::new(AttributeType::Set, false)
        }
    }

    /// Changing this attribute replaces the resource
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// A problem found while checking a configuration against a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub attribute: String,
    pub summary: String,
}

impl Diagnostic {
    fn new(attribute: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            summary: summary.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Fill in defaults for top-level attributes that are absent or null
    pub fn apply_defaults(&self, attributes: &mut Map<String, Value>) {
        for (name, attribute) in &self.attributes {
            let Some(default) = &attribute.default else {
                continue;
            };

            if attributes.get(name).is_none_or(Value::is_null) {
                attributes.insert(name.clone(), default.clone());
            }
        }
    }

    /// Check a configuration, returning every problem found
    pub fn validate(&self, attributes: &Map<String, Value>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.validate_at("", attributes, &mut diagnostics);
        diagnostics
    }

    fn validate_at(
        &self,
        prefix: &str,
        attributes: &Map<String, Value>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for key in attributes.keys() {
            if !self.attributes.contains_key(key) {
                diagnostics.push(Diagnostic::new(
                    format!("{prefix}{key}"),
                    "unsupported attribute",
                ));
            }
        }

        for (name, attribute) in &self.attributes {
            let path = format!("{prefix}{name}");

            let Some(value) = attributes.get(name).filter(|v| !v.is_null()) else {
                if attribute.required && attribute.default.is_none() {
                    diagnostics.push(Diagnostic::new(path, "required attribute is missing"));
                }
                continue;
            };

            if !attribute.kind.accepts(value) {
                diagnostics.push(Diagnostic::new(
                    path,
                    format!("expected a value of type {:?}", attribute.kind),
                ));
                continue;
            }

            let Some(items) = value.as_array() else {
                continue;
            };

            if let Some(max_items) = attribute.max_items {
                if items.len() > max_items {
                    diagnostics.push(Diagnostic::new(
                        path.clone(),
                        format!("at most {max_items} item(s) allowed, got {}", items.len()),
                    ));
                }
            }

            for (index, item) in items.iter().enumerate() {
                match &attribute.elem {
                    Some(Element::Type(kind)) if !kind.accepts(item) => {
                        diagnostics.push(Diagnostic::new(
                            format!("{path}.{index}"),
                            format!("expected a value of type {kind:?}"),
                        ));
                    }
                    Some(Element::Block(block)) => match item.as_object() {
                        Some(nested) => {
                            block.validate_at(&format!("{path}.{index}."), nested, diagnostics)
                        }
                        None => diagnostics.push(Diagnostic::new(
                            format!("{path}.{index}"),
                            "expected a block",
                        )),
                    },
                    _ => {}
                }
            }
        }
    }
}

/// Schema of the `kibana_alert` resource
pub fn kibana_alert_schema() -> Schema {
    let schedule = Schema::new().with_attribute("interval", Attribute::required_string());

    let action = Schema::new()
        .with_attribute("group", Attribute::required_string())
        .with_attribute("id", Attribute::required_string())
        .with_attribute("action_type_id", Attribute::required_string())
        .with_attribute("params", Attribute::optional_map());

    Schema::new()
        .with_attribute("name", Attribute::required_string().force_new())
        .with_attribute("space_id", Attribute::optional_string())
        .with_attribute(
            "tags",
            Attribute::optional_set(Element::Type(AttributeType::String)),
        )
        .with_attribute("alert_type_id", Attribute::required_string())
        .with_attribute(
            "schedule",
            Attribute::optional_list(Element::Block(schedule))
                .max_items(1)
                .with_default(json!([{ "interval": DEFAULT_SCHEDULE_INTERVAL }])),
        )
        .with_attribute("throttle", Attribute::optional_string())
        .with_attribute("notify_when", Attribute::required_string())
        .with_attribute(
            "enabled",
            Attribute::optional_bool().with_default(Value::Bool(true)),
        )
        .with_attribute("consumer", Attribute::required_string())
        .with_attribute("params", Attribute::optional_map())
        .with_attribute("actions", Attribute::optional_set(Element::Block(action)))
}
