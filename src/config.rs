//! read configuration from a file or the environment

use serde::Deserialize;

use crate::errors::Error;

pub enum ConfigLocation {
    File(String),
    Env,
}

#[derive(Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_renew_path")]
    pub renew_path: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    #[serde(default = "default_login_route")]
    pub login_route: String,
    #[serde(default = "default_home_route")]
    pub home_route: String,
}

fn default_login_path() -> String {
    "/user/login".to_string()
}

fn default_renew_path() -> String {
    "/user/refresh".to_string()
}

fn default_logout_path() -> String {
    "/user/logout".to_string()
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_home_route() -> String {
    "/".to_string()
}

impl Config {
    pub fn read(loc: ConfigLocation) -> Result<Config, Error> {
        let config = match loc {
            ConfigLocation::File(path) => {
                let contents = std::fs::read_to_string(path)?;
                serde_json::from_str(&contents)?
            }
            ConfigLocation::Env => read_config_from_env()?,
        };
        Ok(config)
    }

    /// Explicit construction with default endpoint and route paths.
    pub fn from_values(base_url: impl Into<String>) -> Config {
        Config {
            base_url: base_url.into(),
            login_path: default_login_path(),
            renew_path: default_renew_path(),
            logout_path: default_logout_path(),
            login_route: default_login_route(),
            home_route: default_home_route(),
        }
    }

    fn base(&self) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        if trimmed.starts_with("http") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        }
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.base(), self.login_path)
    }

    pub fn renew_url(&self) -> String {
        format!("{}{}", self.base(), self.renew_path)
    }

    pub fn logout_url(&self) -> String {
        format!("{}{}", self.base(), self.logout_path)
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base(), path)
    }
}

fn read_config_from_env() -> Result<Config, Error> {
    Ok(Config {
        base_url: std::env::var("SESSION_BASE_URL")
            .map_err(|_| Error::Config("Missing SESSION_BASE_URL env var".to_string()))?,
        login_path: env_or("SESSION_LOGIN_PATH", default_login_path),
        renew_path: env_or("SESSION_RENEW_PATH", default_renew_path),
        logout_path: env_or("SESSION_LOGOUT_PATH", default_logout_path),
        login_route: env_or("SESSION_LOGIN_ROUTE", default_login_route),
        home_route: env_or("SESSION_HOME_ROUTE", default_home_route),
    })
}

fn env_or(var: &str, fallback: fn() -> String) -> String {
    std::env::var(var).unwrap_or_else(|_| fallback())
}
