use fantasy_api::client::{ApiConfig, Credentials, CRICKET_SPORTS_ID, DEFAULT_BASE_URL};
use fantasy_api::MergePolicy;
use log::{LevelFilter, warn};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api: ApiConfig,
    /// Match to open on startup; the first lobby fixture otherwise.
    pub season_game_uid: Option<String>,
    pub merge_policy: MergePolicy,
    pub save_debounce: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api: ApiConfig::default(),
            season_game_uid: None,
            merge_policy: MergePolicy::default(),
            save_debounce: Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("XITUI_"))
            .collect();
        Self::from_vars(|key| vars.get(key).cloned())
    }

    /// Build settings from a variable lookup. Blank values count as unset;
    /// unparseable values are logged and replaced by the default.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let merge_policy = match get("XITUI_MERGE_POLICY") {
            Some(raw) => MergePolicy::parse(&raw).unwrap_or_else(|| {
                warn!("unknown XITUI_MERGE_POLICY {raw:?}, using local");
                MergePolicy::default()
            }),
            None => MergePolicy::default(),
        };

        let debounce_ms = match get("XITUI_SAVE_DEBOUNCE_MS") {
            Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
                warn!("invalid XITUI_SAVE_DEBOUNCE_MS {raw:?}, using {DEFAULT_SAVE_DEBOUNCE_MS}");
                DEFAULT_SAVE_DEBOUNCE_MS
            }),
            None => DEFAULT_SAVE_DEBOUNCE_MS,
        };

        let log_level = get("XITUI_LOG_LEVEL").and_then(|raw| {
            raw.parse::<LevelFilter>()
                .map_err(|_| warn!("invalid XITUI_LOG_LEVEL {raw:?}"))
                .ok()
        });

        Self {
            full_screen: false,
            log_level,
            api: ApiConfig {
                base_url: get("XITUI_API_BASE").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                credentials: Credentials {
                    session_key: get("XITUI_SESSION_KEY").unwrap_or_default(),
                    module_access: get("XITUI_MODULE_ACCESS").unwrap_or_default(),
                },
                website_id: get("XITUI_WEBSITE_ID").unwrap_or_else(|| "1".to_string()),
                sports_id: get("XITUI_SPORTS_ID").unwrap_or_else(|| CRICKET_SPORTS_ID.to_string()),
            },
            season_game_uid: get("XITUI_MATCH"),
            merge_policy,
            save_debounce: Duration::from_millis(debounce_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_from(pairs: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = settings_from(&[]);
        assert_eq!(settings.api, ApiConfig::default());
        assert_eq!(settings.merge_policy, MergePolicy::LocalWins);
        assert_eq!(settings.save_debounce, Duration::from_millis(500));
        assert!(settings.season_game_uid.is_none());
        assert!(settings.log_level.is_none());
    }

    #[test]
    fn reads_overrides() {
        let settings = settings_from(&[
            ("XITUI_API_BASE", "http://localhost:9000"),
            ("XITUI_SESSION_KEY", "abc"),
            ("XITUI_MODULE_ACCESS", "xyz"),
            ("XITUI_MATCH", " 8812 "),
            ("XITUI_MERGE_POLICY", "server"),
            ("XITUI_SAVE_DEBOUNCE_MS", "250"),
            ("XITUI_LOG_LEVEL", "debug"),
        ]);
        assert_eq!(settings.api.base_url, "http://localhost:9000");
        assert_eq!(settings.api.credentials.session_key, "abc");
        assert_eq!(settings.api.credentials.module_access, "xyz");
        assert_eq!(settings.season_game_uid.as_deref(), Some("8812"));
        assert_eq!(settings.merge_policy, MergePolicy::ServerWins);
        assert_eq!(settings.save_debounce, Duration::from_millis(250));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let settings = settings_from(&[
            ("XITUI_MERGE_POLICY", "whoever"),
            ("XITUI_SAVE_DEBOUNCE_MS", "soon"),
            ("XITUI_MATCH", "   "),
        ]);
        assert_eq!(settings.merge_policy, MergePolicy::LocalWins);
        assert_eq!(settings.save_debounce, Duration::from_millis(500));
        assert!(settings.season_game_uid.is_none());
    }
}
