use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// An artifact being deployed, with the attachments deployers exchange
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploymentUnit {
    name: String,
    stage: Option<String>,
    attachments: BTreeMap<String, Value>,
}

impl DeploymentUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: None,
            attachments: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last stage the unit completed, `None` when not deployed
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub(crate) fn set_stage(&mut self, stage: Option<String>) {
        self.stage = stage;
    }

    /// Attaches a value under a token name, returning the previous one.
    pub fn add_attachment(&mut self, token: impl Into<String>, value: Value) -> Option<Value> {
        self.attachments.insert(token.into(), value)
    }

    pub fn attachment(&self, token: &str) -> Option<&Value> {
        self.attachments.get(token)
    }

    pub fn attachment_mut(&mut self, token: &str) -> Option<&mut Value> {
        self.attachments.get_mut(token)
    }

    pub fn is_attached(&self, token: &str) -> bool {
        self.attachments.contains_key(token)
    }

    pub fn remove_attachment(&mut self, token: &str) -> Option<Value> {
        self.attachments.remove(token)
    }

    pub fn attachments(&self) -> &BTreeMap<String, Value> {
        &self.attachments
    }
}
