pub mod api;
pub mod chart;
pub mod dashboard;
pub mod detail;
pub mod domain;
pub mod fetch;
pub mod format;
pub mod markup;
pub mod narrative;
pub mod table;
pub mod time;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: Option<String>,
        pub gemini_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                api_base_url: non_empty_var("API_BASE_URL"),
                gemini_api_key: non_empty_var("GEMINI_API_KEY"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required for narrative generation")
        }
    }

    fn non_empty_var(name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn missing_gemini_key_names_the_variable() {
            let settings = Settings {
                api_base_url: None,
                gemini_api_key: None,
                sentry_dsn: None,
            };
            let err = settings.require_gemini_api_key().unwrap_err();
            assert!(err.to_string().contains("GEMINI_API_KEY"));
        }
    }
}
