use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub public_base_url: String,
    pub uploads_dir: String,
    pub storage_backend: String,
    pub ms_client_id: Option<String>,
    pub ms_client_secret: Option<String>,
    pub ms_tenant_id: Option<String>,
    pub ms_upload_folder_link: Option<String>,
    pub scorer_webhook_url: Option<String>,
    pub jd_generator_webhook_url: Option<String>,
    pub dispatch_cron: String,
    pub dispatch_batch_size: i64,
    pub form_rps: u32,
    pub api_rps: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            public_base_url: get_env_or("PUBLIC_BASE_URL", "http://localhost:3001"),
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            storage_backend: get_env_or("STORAGE_BACKEND", "local"),
            ms_client_id: env::var("MS_CLIENT_ID").ok(),
            ms_client_secret: env::var("MS_CLIENT_SECRET").ok(),
            ms_tenant_id: env::var("MS_TENANT_ID").ok(),
            ms_upload_folder_link: env::var("MS_UPLOAD_FOLDER_LINK").ok(),
            scorer_webhook_url: env::var("SCORER_WEBHOOK_URL").ok(),
            jd_generator_webhook_url: env::var("JD_GENERATOR_WEBHOOK_URL").ok(),
            dispatch_cron: get_env_or("DISPATCH_CRON", "0 0 */2 * * *"),
            dispatch_batch_size: get_env_parse_or("DISPATCH_BATCH_SIZE", 10)?,
            form_rps: get_env_parse_or("FORM_RPS", 30)?,
            api_rps: get_env_parse_or("API_RPS", 50)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
