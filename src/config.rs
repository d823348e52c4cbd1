use std::env;

use url::Url;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. `DATABASE_URL` wins over the
    /// individual `DB_*` settings when both are present.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let required = |key: &str| {
                    lookup(key).ok_or_else(|| AppError::Internal(format!("{key} must be set")))
                };
                mysql_url(
                    &required("DB_HOST")?,
                    &var("DB_PORT", "3306"),
                    &required("DB_NAME")?,
                    &required("DB_USER")?,
                    lookup("DB_PASSWORD").as_deref(),
                    var("DB_SSL", "false") == "true",
                )?
            }
        };

        Ok(Self {
            database_url,
            db_max_connections: parse_number("DB_MAX_CONNECTIONS", &var("DB_MAX_CONNECTIONS", "10"))?,
            server_host: var("SERVER_HOST", "0.0.0.0"),
            server_port: parse_number("SERVER_PORT", &var("SERVER_PORT", "3000"))?,
            run_migrations: var("RUN_MIGRATIONS", "true") != "false",
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Credentials are percent-encoded into the userinfo part.
fn mysql_url(
    host: &str,
    port: &str,
    name: &str,
    user: &str,
    password: Option<&str>,
    ssl: bool,
) -> AppResult<String> {
    let invalid = || AppError::Internal(format!("Invalid database address {host}:{port}/{name}"));

    let mut url = Url::parse(&format!("mysql://{host}:{port}/{name}")).map_err(|_| invalid())?;
    url.set_username(user).map_err(|_| invalid())?;
    url.set_password(password.filter(|password| !password.is_empty()))
        .map_err(|_| invalid())?;
    if ssl {
        url.query_pairs_mut().append_pair("ssl-mode", "required");
    }

    Ok(url.into())
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.parse()
        .map_err(|_| AppError::Internal(format!("{key} must be a number, got {raw:?}")))
}
