use std::sync::LazyLock;
use std::time::Duration;

/// Process-wide configuration, read once from the environment at startup.
pub struct BridgeConfig {
    ffmpeg_path: String,
    listen_addr: String,
    convert_timeout: Duration,
    max_input_bytes: usize,
    max_output_bytes: usize,
}

impl BridgeConfig {
    fn from_env() -> Self {
        Self {
            ffmpeg_path: env_string("VID2GIF_FFMPEG", "ffmpeg"),
            listen_addr: env_string("VID2GIF_LISTEN", "0.0.0.0:8080"),
            convert_timeout: Duration::from_secs(env_u64("VID2GIF_TIMEOUT_SECS", 60)),
            max_input_bytes: env_u64("VID2GIF_MAX_INPUT_BYTES", 64 * 1024 * 1024) as usize,
            max_output_bytes: env_u64("VID2GIF_MAX_OUTPUT_BYTES", 64 * 1024 * 1024) as usize,
        }
    }

    /// Location of the external transcoder binary (resolved via PATH if bare).
    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    /// Wall-clock bound on one whole conversion (fetch + transcode).
    pub fn convert_timeout(&self) -> Duration {
        self.convert_timeout
    }

    pub fn max_input_bytes(&self) -> usize {
        self.max_input_bytes
    }

    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub fn config() -> &'static BridgeConfig {
    static CONFIG: LazyLock<BridgeConfig> = LazyLock::new(BridgeConfig::from_env);
    &CONFIG
}
