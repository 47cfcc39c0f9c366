pub mod flat;
pub mod sessions;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;

pub type SharedBackend = Arc<dyn Backend + Send + Sync>;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> Result<SharedBackend> {
        match name {
            BackendName::Flat => return Ok(Arc::new(flat::Flat::default())),
            BackendName::Sessions => return Ok(Arc::new(sessions::Sessions::default())),
        }
    }

    /// Builds the backend named by the loaded configuration.
    pub fn from_config() -> Result<SharedBackend> {
        let name = Config::get(ConfigKey::Backend);
        if let Some(backend_name) = BackendName::parse(name.to_string()) {
            return BackendManager::get(backend_name);
        }

        bail!(format!("Unknown backend '{name}'"));
    }
}

/// Backends emit either RFC 3339 or naive ISO timestamps, the latter being
/// UTC.
pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    return None;
}
