//! Registry configuration.

/// Registry configuration.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Name attached to every log line and failure report from this registry.
    pub label: String,

    /// Whether to watch each source's destroy notification so its records
    /// self-remove. Sources without a destroy capability are never watched.
    pub watch_destroy: bool,

    /// Whether dropping the registry disconnects everything it still holds.
    pub disconnect_on_drop: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            label: "connections".to_string(),
            watch_destroy: true,
            disconnect_on_drop: true,
        }
    }
}

impl RegistryConfig {
    /// Default configuration under a different label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }
}
