use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    /// Returns raw JSON section for the module, if any.
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

#[derive(Clone)]
pub struct ModuleCtx {
    pub(crate) config_provider: Option<Arc<dyn ConfigProvider>>,
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                config_provider: None,
                cancellation_token: token,
                module_name: None,
            },
        }
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }

    /// Scope the built context to one module, as the registry does per phase.
    pub fn for_module(mut self, name: &str) -> Self {
        self.inner.module_name = Some(Arc::<str>::from(name));
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    /// Scope context to a specific module name (used by the registry).
    pub(crate) fn for_module(mut self, name: &str) -> Self {
        self.module_name = Some(Arc::<str>::from(name));
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Best-effort: deserialize the module's config into `T`, fallback to `T::default()`
    /// if section is missing.
    ///
    /// A section that is present but malformed is an error.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> anyhow::Result<T> {
        let raw = match (&self.module_name, &self.config_provider) {
            (Some(name), Some(p)) => p.get_module_config(name).map(|v| (name, v)),
            _ => None,
        };

        match raw {
            Some((name, v)) => serde_json::from_value::<T>(v.clone())
                .map_err(|e| anyhow::anyhow!("invalid {name} config: {e}")),
            None => Ok(T::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct SampleConfig {
        #[serde(default)]
        enabled: bool,
    }

    struct MapProvider(HashMap<String, serde_json::Value>);

    impl ConfigProvider for MapProvider {
        fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
            self.0.get(module_name)
        }
    }

    fn ctx_with(name: &str, value: serde_json::Value) -> ModuleCtx {
        let mut sections = HashMap::new();
        sections.insert(name.to_string(), value);
        ModuleCtxBuilder::new(CancellationToken::new())
            .with_config_provider(Arc::new(MapProvider(sections)))
            .build()
            .for_module(name)
    }

    #[test]
    fn module_config_reads_scoped_section() {
        let ctx = ctx_with("sample", serde_json::json!({ "enabled": true }));
        assert_eq!(ctx.current_module(), Some("sample"));
        let cfg: SampleConfig = ctx.module_config().unwrap();
        assert!(cfg.enabled);
    }

    #[test]
    fn module_config_defaults_when_section_missing() {
        let ctx = ctx_with("other", serde_json::json!({ "enabled": true }))
            .for_module("sample");
        let cfg: SampleConfig = ctx.module_config().unwrap();
        assert_eq!(cfg, SampleConfig::default());
    }

    #[test]
    fn module_config_rejects_malformed_section() {
        let ctx = ctx_with("sample", serde_json::json!({ "bogus": 1 }));
        let err = ctx.module_config::<SampleConfig>().unwrap_err();
        assert!(err.to_string().contains("invalid sample config"));
    }
}
