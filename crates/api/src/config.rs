use fondant_vision::CapabilityConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Generation runs
    /// synchronously inside the request, so this must comfortably exceed
    /// the stage-1 budget.
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
        }
    }
}

/// Split a comma-separated origin list, dropping empty entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Vision capability connection settings loaded from environment variables.
///
/// Model names and the per-call timeout come from
/// [`CapabilityConfig::new`]'s default lineup.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// Bearer token sent with every call.
    pub api_key: String,
}

impl VisionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                  |
    /// |-------------------|--------------------------|
    /// | `VISION_BASE_URL` | `https://api.openai.com` |
    /// | `VISION_API_KEY`  | (empty)                  |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("VISION_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".into());
        let api_key = std::env::var("VISION_API_KEY").unwrap_or_default();

        Self { base_url, api_key }
    }

    /// Build the capability client configuration from these settings.
    pub fn capability(&self) -> CapabilityConfig {
        CapabilityConfig::new(self.base_url.clone(), self.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins("http://localhost:5173, https://cakes.example.com ,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://cakes.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty_input_yields_no_origins() {
        assert!(parse_origins("").is_empty());
    }
}
