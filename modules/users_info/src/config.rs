use serde::{Deserialize, Serialize};

/// `modules.users_info` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    /// Emit a structured log record for each create/update/delete.
    #[serde(default = "default_publish_events")]
    pub publish_events: bool,
}

impl Default for UsersInfoConfig {
    fn default() -> Self {
        Self {
            publish_events: default_publish_events(),
        }
    }
}

fn default_publish_events() -> bool {
    true
}
