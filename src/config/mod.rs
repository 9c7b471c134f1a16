//! Configuration resolution.
//!
//! Settings are read fresh on every dispatch so a change made in the editor
//! applies to the next request without a restart. Resolution never fails:
//! missing or malformed data falls back to built-in defaults field by field.

pub mod store;

pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Key under which the editor persists its settings blob.
pub const SETTINGS_KEY: &str = "storyboard.settings";

/// Public upstream origin used when no host is configured.
pub const DEFAULT_API_ORIGIN: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Resolved dispatch configuration (one snapshot per call).
#[derive(Clone)]
pub struct Configuration {
    /// Endpoint host; empty means the public upstream.
    pub api_host: String,
    pub api_key: SecretString,
    pub text_model: String,
    pub image_model: String,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("api_host", &self.api_host)
            .field(
                "api_key_present",
                &(!self.api_key.expose_secret().is_empty()),
            )
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_host: String::new(),
            api_key: SecretString::from(String::new()),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl Configuration {
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Accepted spellings per field, in precedence order.
const HOST_KEYS: &[&str] = &["apiHost", "api_host", "baseUrl", "host"];
const KEY_KEYS: &[&str] = &["apiKey", "api_key"];
const TEXT_MODEL_KEYS: &[&str] = &["textModel", "text_model"];
const IMAGE_MODEL_KEYS: &[&str] = &["imageModel", "image_model"];

/// Values taken from the process environment when settings leave them blank.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
}

impl EnvOverrides {
    /// Reads `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Reads the settings store and produces a `Configuration`.
#[derive(Clone)]
pub struct ConfigResolver {
    store: Arc<dyn SettingsStore>,
    env: EnvOverrides,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            env: EnvOverrides::default(),
        }
    }

    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }

    pub async fn resolve(&self) -> Configuration {
        let raw = self.store.load(SETTINGS_KEY).await;
        let mut config = parse_settings(raw.as_deref());
        if config.api_key().is_empty()
            && let Some(key) = &self.env.api_key
        {
            config.api_key = SecretString::from(key.clone());
        }
        config
    }
}

/// Parse a persisted blob; parse failure is treated exactly like absence.
///
/// Fields are read one at a time: a missing, blank or non-string field falls
/// back to its own default without affecting the others.
pub fn parse_settings(raw: Option<&str>) -> Configuration {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Configuration::default();
    };
    let fields = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(kind = %json_kind(&other), "Persisted settings are not an object; using defaults");
            return Configuration::default();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Persisted settings are malformed; using defaults");
            return Configuration::default();
        }
    };

    let field = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .filter_map(|k| fields.get(*k).and_then(|v| v.as_str()))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    };

    let defaults = Configuration::default();
    Configuration {
        api_host: field(HOST_KEYS).unwrap_or(defaults.api_host),
        api_key: field(KEY_KEYS)
            .map(SecretString::from)
            .unwrap_or(defaults.api_key),
        text_model: field(TEXT_MODEL_KEYS).unwrap_or(defaults.text_model),
        image_model: field(IMAGE_MODEL_KEYS).unwrap_or(defaults.image_model),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_settings_use_defaults() {
        let cfg = parse_settings(None);
        assert_eq!(cfg.api_host, "");
        assert_eq!(cfg.api_key(), "");
        assert_eq!(cfg.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(cfg.image_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn malformed_settings_are_treated_as_absent() {
        for raw in ["{not json", "[1,2,3]", "\"just a string\"", r#"{"apiKey": 42}"#] {
            let cfg = parse_settings(Some(raw));
            assert_eq!(cfg.api_key(), "", "input: {raw}");
            assert_eq!(cfg.image_model, DEFAULT_IMAGE_MODEL, "input: {raw}");
        }
    }

    #[test]
    fn camel_case_fields_are_read_and_blanks_fall_back() {
        let cfg = parse_settings(Some(
            r#"{"apiHost":"/api","apiKey":" k-123 ","textModel":"","imageModel":"my-image-model"}"#,
        ));
        assert_eq!(cfg.api_host, "/api");
        assert_eq!(cfg.api_key(), "k-123");
        assert_eq!(cfg.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(cfg.image_model, "my-image-model");
    }

    #[test]
    fn several_host_spellings_keep_the_rest_of_the_blob() {
        let cfg = parse_settings(Some(
            r#"{"apiHost":"/api","baseUrl":"x.example","apiKey":"k-1"}"#,
        ));
        assert_eq!(cfg.api_host, "/api");
        assert_eq!(cfg.api_key(), "k-1");

        let cfg = parse_settings(Some(r#"{"apiHost":"  ","host":"relay.example"}"#));
        assert_eq!(cfg.api_host, "relay.example");
    }

    #[test]
    fn wrongly_typed_field_falls_back_alone() {
        let cfg = parse_settings(Some(
            r#"{"apiHost":"example.com","apiKey":"k-1","textModel":5,"imageModel":null}"#,
        ));
        assert_eq!(cfg.api_host, "example.com");
        assert_eq!(cfg.api_key(), "k-1");
        assert_eq!(cfg.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(cfg.image_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn debug_output_hides_the_key() {
        let cfg = parse_settings(Some(r#"{"api_key":"super-secret"}"#));
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("api_key_present: true"));
    }

    #[tokio::test]
    async fn resolver_reads_fresh_on_every_call() {
        let store = MemorySettingsStore::with_entry(SETTINGS_KEY, r#"{"apiKey":"first"}"#);
        let resolver = ConfigResolver::new(Arc::new(store.clone()));
        assert_eq!(resolver.resolve().await.api_key(), "first");

        store.set(SETTINGS_KEY, r#"{"apiKey":"second"}"#);
        assert_eq!(resolver.resolve().await.api_key(), "second");
    }

    #[tokio::test]
    async fn env_key_fills_blank_persisted_key_only() {
        let env = EnvOverrides {
            api_key: Some("from-env".into()),
        };
        let store = MemorySettingsStore::new();
        let resolver = ConfigResolver::new(Arc::new(store.clone())).with_env(env);
        assert_eq!(resolver.resolve().await.api_key(), "from-env");

        store.set(SETTINGS_KEY, r#"{"apiKey":"persisted"}"#);
        assert_eq!(resolver.resolve().await.api_key(), "persisted");
    }
}
