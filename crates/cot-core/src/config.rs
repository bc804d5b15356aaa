use std::{env, fs, path::Path, time::Duration};

use crate::{eligibility::EligibilityPolicy, errors::Error, Result};

pub const DEFAULT_SESSION_FILE: &str = "cot.session";

/// Typed configuration, read from the environment (and `.env` if present).
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram application credentials
    pub api_id: i32,
    pub api_hash: String,

    // MTProto session
    pub session_file: String,
    pub phone: Option<String>,

    // Broadcast behavior
    pub pacing_interval: Duration,
    pub check_reachability: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let api_id_raw = env_str("API_ID").unwrap_or_default();
        if api_id_raw.trim().is_empty() {
            return Err(Error::Config(
                "API_ID environment variable is required".to_string(),
            ));
        }
        let api_id = api_id_raw
            .trim()
            .parse::<i32>()
            .map_err(|e| Error::Config(format!("API_ID conversion failed: {e}")))?;

        let api_hash = env_str("API_HASH").and_then(non_empty).ok_or_else(|| {
            Error::Config("API_HASH environment variable is required".to_string())
        })?;

        let session_file = env_str("SESSION_FILE")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string());
        let phone = env_str("PHONE").and_then(non_empty);

        let pacing_interval = Duration::from_secs(env_u64("BROADCAST_PACING_SECS").unwrap_or(60));
        let check_reachability = env_bool("BROADCAST_CHECK_REACHABILITY").unwrap_or(true);

        Ok(Self {
            api_id,
            api_hash,
            session_file,
            phone,
            pacing_interval,
            check_reachability,
        })
    }

    pub fn eligibility_policy(&self) -> EligibilityPolicy {
        EligibilityPolicy {
            check_reachability: self.check_reachability,
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
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

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| parse_bool(&s))
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
