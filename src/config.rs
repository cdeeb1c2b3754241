#[derive(Debug, Clone)]
pub struct Config {
    /// Address the progress API listens on
    pub bind_addr: String,
    pub db_connection_string: String,
    /// Origin of the progress API the player reports to
    pub api_base_url: String,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9983";
const DEFAULT_DB_CONNECTION_STRING: &str = "sqlite://video_progress.sqlite?mode=rwc";
const DEFAULT_API_BASE_URL: &str = "http://localhost:9983";

impl Config {
    pub fn load() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(DEFAULT_BIND_ADDR.into());
        let db_connection_string =
            std::env::var("DB_CONNECTION_STRING").unwrap_or(DEFAULT_DB_CONNECTION_STRING.into());
        let api_base_url =
            std::env::var("PROGRESS_API_BASE_URL").unwrap_or(DEFAULT_API_BASE_URL.into());
        Config {
            bind_addr,
            db_connection_string,
            api_base_url,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bind_addr.trim().is_empty() {
            return Err("BIND_ADDR is empty".into());
        }
        if self.db_connection_string.trim().is_empty() {
            return Err("DB_CONNECTION_STRING is empty".into());
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(format!(
                "PROGRESS_API_BASE_URL must start with http:// or https://, got {:?}",
                self.api_base_url
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            db_connection_string: DEFAULT_DB_CONNECTION_STRING.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn rejects_base_url_without_scheme() {
        let mut c = config();
        c.api_base_url = "localhost:9983".into();
        let err = c.validate().unwrap_err();
        assert!(err.contains("PROGRESS_API_BASE_URL"));
    }

    #[test]
    fn rejects_empty_database() {
        let mut c = config();
        c.db_connection_string = " ".into();
        assert_eq!(c.validate().unwrap_err(), "DB_CONNECTION_STRING is empty");
    }
}
