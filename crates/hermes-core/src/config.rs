use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, gate::WatchedChannels, presence::DEFAULT_REFRESH_DELAY, Result};

/// Typed configuration, loaded once at startup.
///
/// Secrets may come either from a `SECRETS` JSON object (deployment secret
/// manager) or from individual environment variables; the JSON blob wins when
/// both are present.
#[derive(Clone, Debug)]
pub struct Config {
    // Discord
    pub discord_bot_token: String,
    pub command_prefix: String,
    pub bot_administrators: Vec<u64>,
    pub watched_channels: WatchedChannels,

    // Storage
    pub s3_bucket_name: String,
    pub s3_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub cdn_domain: String,

    // Presence
    pub presence_refresh_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let secrets = match get("SECRETS") {
            Some(raw) => parse_secrets(&raw)?,
            None => serde_json::Map::new(),
        };
        let secret = |key: &str, env_key: &str| {
            secrets
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .and_then(non_empty)
                .or_else(|| get(env_key))
        };

        let discord_bot_token = secret("BOT_TOKEN", "DISCORD_BOT_TOKEN")
            .ok_or_else(|| required("BOT_TOKEN (in SECRETS) or DISCORD_BOT_TOKEN"))?;
        let s3_bucket_name = secret("S3_BUCKET_NAME", "S3_BUCKET_NAME")
            .ok_or_else(|| required("S3_BUCKET_NAME"))?;
        let aws_access_key_id = secret("AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID");
        let aws_secret_access_key = secret("AWS_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY");
        if aws_access_key_id.is_some() != aws_secret_access_key.is_some() {
            return Err(Error::Config(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
            ));
        }

        let cdn_domain = get("CDN_DOMAIN").ok_or_else(|| required("CDN_DOMAIN"))?;
        let cdn_domain = normalize_domain(&cdn_domain)?;

        let command_prefix = get("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string());
        let bot_administrators = parse_admin_ids(get("BOT_ADMINISTRATORS").as_deref())?;
        let s3_region = get("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string());
        let watched_channels = WatchedChannels::parse(&get("WATCHED_CHANNELS").unwrap_or_default())?;

        let presence_refresh_delay = match get("PRESENCE_REFRESH_DELAY_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "PRESENCE_REFRESH_DELAY_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?),
            None => DEFAULT_REFRESH_DELAY,
        };

        Ok(Self {
            discord_bot_token,
            command_prefix,
            bot_administrators,
            watched_channels,
            s3_bucket_name,
            s3_region,
            aws_access_key_id,
            aws_secret_access_key,
            cdn_domain,
            presence_refresh_delay,
        })
    }

    /// Non-fatal configuration problems, for logging at startup.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.watched_channels.is_empty() {
            warnings.push(
                "No guild:channel mappings provided. Bot will not handle any messages.".to_string(),
            );
        }
        if self.bot_administrators.is_empty() {
            warnings.push(
                "No bot administrators specified. Admin commands will be inaccessible.".to_string(),
            );
        }
        warnings
    }

    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

fn required(name: &str) -> Error {
    Error::Config(format!("{name} environment variable is required"))
}

fn parse_secrets(raw: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::Config("SECRETS must be a JSON object".to_string())),
    }
}

fn parse_admin_ids(raw: Option<&str>) -> Result<Vec<u64>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>().map_err(|_| {
                Error::Config(
                    "BOT_ADMINISTRATORS must be a comma-separated list of valid Discord user IDs"
                        .to_string(),
                )
            })
        })
        .collect()
}

/// Accept `cdn.example.com`, `https://cdn.example.com/` and similar.
fn normalize_domain(raw: &str) -> Result<String> {
    let d = raw.trim();
    let d = d
        .strip_prefix("https://")
        .or_else(|| d.strip_prefix("http://"))
        .unwrap_or(d)
        .trim_end_matches('/');
    if d.is_empty() || d.contains(char::is_whitespace) {
        return Err(Error::Config(format!("CDN_DOMAIN is not a hostname: '{raw}'")));
    }
    Ok(d.to_string())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
