//! Config - 環境変数からの設定読み込み
//!
//! 変数名はデプロイ済みの関数と同じ（`RETENTION_DAYS`, `EXCLUDED_NAMESPACES`, ...）。
//! 起動時に 1 度だけ読み込み、以降は不変の [`RetentionConfig`] を渡す。

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Upper bound for `RETENTION_DAYS` (100 years).
pub const MAX_RETENTION_DAYS: u32 = 36_500;

const ENV_KEYS: &[&str] = &[
    "retention_days",
    "excluded_namespaces",
    "excluded_clusters",
    "dynamodb_table_name",
    "slack_webhook_url",
    "slack_channel",
    "dry_run",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    #[error("SLACK_WEBHOOK_URL must be an http(s) URL, got {0:?}")]
    InvalidWebhookUrl(String),

    #[error("RETENTION_DAYS must be at most {max}, got {got}")]
    RetentionTooLong { got: u32, max: u32 },
}

/// Everything the binary needs, as loaded from the environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Days a volume may stay unattached. `0` disables reaping.
    ///
    /// Env: RETENTION_DAYS
    #[serde(default)]
    pub retention_days: u32,

    /// Env: EXCLUDED_NAMESPACES (comma-separated)
    #[serde(default, deserialize_with = "comma_separated")]
    pub excluded_namespaces: BTreeSet<String>,

    /// Env: EXCLUDED_CLUSTERS (comma-separated)
    #[serde(default, deserialize_with = "comma_separated")]
    pub excluded_clusters: BTreeSet<String>,

    /// Env: DYNAMODB_TABLE_NAME
    pub dynamodb_table_name: String,

    /// Empty disables notifications.
    ///
    /// Env: SLACK_WEBHOOK_URL
    #[serde(default)]
    pub slack_webhook_url: String,

    /// Env: SLACK_CHANNEL
    pub slack_channel: String,

    /// Log reap candidates without deleting or notifying.
    ///
    /// Env: DRY_RUN
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retention_days: 0,
            excluded_namespaces: BTreeSet::new(),
            excluded_clusters: BTreeSet::new(),
            dynamodb_table_name: "lambda-ebs-cleaner".to_string(),
            slack_webhook_url: String::new(),
            slack_channel: "sandbox".to_string(),
            dry_run: false,
        }
    }
}

impl Settings {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default())).merge(Env::raw().only(ENV_KEYS))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Settings = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(ConfigError::RetentionTooLong {
                got: self.retention_days,
                max: MAX_RETENTION_DAYS,
            });
        }

        let url = self.slack_webhook_url.as_str();
        if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidWebhookUrl(url.to_string()));
        }
        Ok(())
    }

    pub fn retention(&self) -> RetentionConfig {
        RetentionConfig {
            retention_days: self.retention_days,
            excluded_namespaces: self.excluded_namespaces.clone(),
            excluded_clusters: self.excluded_clusters.clone(),
            region_localities: default_region_localities(),
            dry_run: self.dry_run,
        }
    }
}

/// Immutable per-run retention settings passed into discovery and the tracker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetentionConfig {
    pub retention_days: u32,
    pub excluded_namespaces: BTreeSet<String>,
    pub excluded_clusters: BTreeSet<String>,
    /// Region -> locality code used when a resource has no `Country` tag.
    pub region_localities: HashMap<String, String>,
    pub dry_run: bool,
}

impl RetentionConfig {
    pub fn new(retention_days: u32) -> Self {
        Self {
            retention_days,
            excluded_namespaces: BTreeSet::new(),
            excluded_clusters: BTreeSet::new(),
            region_localities: default_region_localities(),
            dry_run: false,
        }
    }

    pub fn with_excluded_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_namespaces = namespaces.into_iter().map(Into::<String>::into).collect();
        self
    }

    pub fn with_excluded_clusters<I, S>(mut self, clusters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_clusters = clusters.into_iter().map(Into::<String>::into).collect();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// `retention_days == 0` turns the whole reaper off.
    pub fn reaping_enabled(&self) -> bool {
        self.retention_days > 0
    }

    pub fn locality_for_region<'a>(&'a self, region: &'a str) -> &'a str {
        self.region_localities
            .get(region)
            .map(String::as_str)
            .unwrap_or(region)
    }
}

pub fn default_region_localities() -> HashMap<String, String> {
    [
        ("ap-northeast-1", "jp"),
        ("ap-northeast-2", "kr"),
        ("ca-central-1", "ca"),
        ("eu-west-2", "gb"),
        ("us-west-2", "us"),
    ]
    .into_iter()
    .map(|(region, locality)| (region.to_string(), locality.to_string()))
    .collect()
}

/// Accepts `"a,b"`, a bare scalar (env values like `42` or `true` are parsed
/// as numbers and booleans), or a sequence. Blank entries are dropped.
fn comma_separated<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CommaSeparated;

    impl<'de> Visitor<'de> for CommaSeparated {
        type Value = BTreeSet<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a comma-separated string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(BTreeSet::from([v.to_string()]))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(BTreeSet::from([v.to_string()]))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(BTreeSet::from([v.to_string()]))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(BTreeSet::from([v.to_string()]))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut out = BTreeSet::new();
            while let Some(item) = seq.next_element::<String>()? {
                if !item.trim().is_empty() {
                    out.insert(item.trim().to_string());
                }
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(CommaSeparated)
}
