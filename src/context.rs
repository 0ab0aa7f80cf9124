//! Backend context: base URL, template variables, and query parameters.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use reqwest::Url;

use crate::config::SuperinterfaceConfig;
use crate::error::{Result, SuperinterfaceError};

/// Template variables shared by every request of a session.
pub type Variables = BTreeMap<String, String>;

/// Turns the variables map plus ambient context into URL query parameters.
pub trait VariableParams: Send + Sync {
    fn params(&self, variables: &Variables, public_api_key: Option<&str>) -> Vec<(String, String)>;
}

/// Default strategy: `publicApiKey` first, then every variable as `key=value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVariableParams;

impl VariableParams for DefaultVariableParams {
    fn params(&self, variables: &Variables, public_api_key: Option<&str>) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(variables.len() + 1);
        if let Some(key) = public_api_key {
            params.push(("publicApiKey".to_string(), key.to_string()));
        }
        params.extend(
            variables
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        params
    }
}

/// Explicit session context, cloned cheaply into every component.
#[derive(Clone)]
pub struct SuperinterfaceContext {
    base_url: String,
    public_api_key: Option<String>,
    variables: Arc<RwLock<Variables>>,
    params: Arc<dyn VariableParams>,
}

impl std::fmt::Debug for SuperinterfaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperinterfaceContext")
            .field("base_url", &self.base_url)
            .field("public_api_key", &self.public_api_key.as_ref().map(|_| ".."))
            .field("variables", &self.variables())
            .finish()
    }
}

impl SuperinterfaceContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            public_api_key: None,
            variables: Arc::new(RwLock::new(Variables::new())),
            params: Arc::new(DefaultVariableParams),
        }
    }

    pub fn from_config(config: &SuperinterfaceConfig) -> Self {
        let context = Self::new(config.base_url.clone());
        context.extend_variables(config.variables.clone());
        Self {
            public_api_key: config.public_api_key.clone(),
            ..context
        }
    }

    pub fn with_public_api_key(mut self, key: impl Into<String>) -> Self {
        self.public_api_key = Some(key.into());
        self
    }

    pub fn with_variable_params(mut self, params: Arc<dyn VariableParams>) -> Self {
        self.params = params;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_variable(&self, key: impl Into<String>, value: impl Into<String>) {
        self.variables
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.into(), value.into());
    }

    pub fn extend_variables(&self, variables: Variables) {
        self.variables
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend(variables);
    }

    pub fn variable(&self, key: &str) -> Option<String> {
        self.variables
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    /// Snapshot of the current variables.
    pub fn variables(&self) -> Variables {
        self.variables
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Query parameters derived from the current variables.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let variables = self.variables();
        self.params
            .params(&variables, self.public_api_key.as_deref())
    }

    /// `{base_url}{path}` with the variable query string appended.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.url(path)?;
        let params = self.query_params();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// `{base_url}{path}` without any query.
    pub fn url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(SuperinterfaceError::Configuration(
                "Base URL cannot be empty".into(),
            ));
        }
        Url::parse(&format!("{base}{path}")).map_err(|e| {
            SuperinterfaceError::Configuration(format!("Invalid base URL '{base}': {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoint_appends_encoded_variables() {
        let context = SuperinterfaceContext::new("https://api.example.com/cloud/")
            .with_public_api_key("pk_1");
        context.set_variable("assistantId", "asst 1");

        let url = context.endpoint("/audio-runtimes/webrtc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/cloud/audio-runtimes/webrtc?publicApiKey=pk_1&assistantId=asst+1"
        );
    }

    #[test]
    fn endpoint_without_variables_has_no_query() {
        let context = SuperinterfaceContext::new("http://localhost:3000");
        let url = context.endpoint("/tts").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/tts");
    }

    #[test]
    fn clones_share_variables() {
        let context = SuperinterfaceContext::new("http://localhost");
        let clone = context.clone();
        clone.set_variable("threadId", "thread_1");
        assert_eq!(context.variable("threadId").as_deref(), Some("thread_1"));
    }

    #[test]
    fn empty_base_url_is_configuration_error() {
        let context = SuperinterfaceContext::new("");
        assert!(matches!(
            context.endpoint("/tts"),
            Err(SuperinterfaceError::Configuration(_))
        ));
    }

    struct OnlyAssistant;

    impl VariableParams for OnlyAssistant {
        fn params(&self, variables: &Variables, _: Option<&str>) -> Vec<(String, String)> {
            variables
                .get("assistantId")
                .map(|id| vec![("assistantId".to_string(), id.clone())])
                .unwrap_or_default()
        }
    }

    #[test]
    fn custom_variable_params_strategy() {
        let context = SuperinterfaceContext::new("http://localhost")
            .with_variable_params(Arc::new(OnlyAssistant));
        context.set_variable("assistantId", "a");
        context.set_variable("ignored", "b");
        assert_eq!(
            context.query_params(),
            vec![("assistantId".to_string(), "a".to_string())]
        );
    }
}
