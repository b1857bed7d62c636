/// Session configuration from environment variables
///
/// Controls where the file-backed session store lives, whether connect
/// attempts are serialized, and the simulated submission delay.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_STORE_DIR: &str = "./session";
const DEFAULT_SUBMISSION_DELAY_MS: u64 = 1500;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Base directory for [`crate::store::FileStore`]
    pub store_dir: PathBuf,
    /// Reject a connect request while another one is pending
    pub serialize_connects: bool,
    /// Simulated round-trip for work submissions
    pub submission_delay: Duration,
}

impl SessionConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables (a `.env` file is honored):
    /// - `SESSION_STORE_DIR`: session store directory (default "./session")
    /// - `SERIALIZE_CONNECTS`: "true" (default) or "false"
    /// - `SUBMISSION_DELAY_MS`: simulated submission delay (default 1500)
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let store_dir = env::var("SESSION_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_DIR));
        log::info!("Session store directory: {:?}", store_dir);

        let serialize_connects = match env::var("SERIALIZE_CONNECTS") {
            Ok(value) => parse_bool(&value).unwrap_or_else(|| {
                log::warn!("Unknown SERIALIZE_CONNECTS '{}', defaulting to true", value);
                true
            }),
            Err(_) => true,
        };
        if !serialize_connects {
            log::warn!("Connect serialization disabled; concurrent connects race, last to resolve wins");
        }

        let submission_delay = match env::var("SUBMISSION_DELAY_MS") {
            Ok(value) => match value.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    log::warn!(
                        "Invalid SUBMISSION_DELAY_MS '{}', defaulting to {}",
                        value,
                        DEFAULT_SUBMISSION_DELAY_MS
                    );
                    Duration::from_millis(DEFAULT_SUBMISSION_DELAY_MS)
                }
            },
            Err(_) => Duration::from_millis(DEFAULT_SUBMISSION_DELAY_MS),
        };

        Self {
            store_dir,
            serialize_connects,
            submission_delay,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            serialize_connects: true,
            submission_delay: Duration::from_millis(DEFAULT_SUBMISSION_DELAY_MS),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
