use std::env;

use secrecy::SecretString;

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";
const DEFAULT_SMTP_PORT: u16 = 587;
const GMAIL_SMTP_HOST: &str = "smtp.gmail.com";

/// Credentials for one outbound SMTP provider.
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: String,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub jwt_refresh_expiration_hours: i64,
    pub admin_email: Option<String>,
    pub default_passing_score: i32,
    pub default_max_attempts: i32,
    pub smtp_primary: Option<SmtpSettings>,
    pub smtp_fallback: Option<SmtpSettings>,
    pub storage_url: String,
    pub storage_service_key: SecretString,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "eduhub-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: parse_var("WEB_SERVER_PORT").unwrap_or(8080),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            ),
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS").unwrap_or(24),
            jwt_refresh_expiration_hours: parse_var("JWT_REFRESH_EXPIRATION_HOURS").unwrap_or(168),
            admin_email: env::var("ADMIN_EMAIL")
                .ok()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty()),
            default_passing_score: parse_var("DEFAULT_PASSING_SCORE").unwrap_or(80),
            default_max_attempts: parse_var("DEFAULT_MAX_ATTEMPTS").unwrap_or(3),
            smtp_primary: primary_smtp_from_env(),
            smtp_fallback: fallback_smtp_from_env(),
            storage_url: env::var("STORAGE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".to_string()),
            storage_service_key: SecretString::from(
                env::var("STORAGE_SERVICE_KEY").unwrap_or_default(),
            ),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES").unwrap_or(10 * 1024 * 1024),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.storage_service_key.expose_secret().is_empty() {
            panic!("FATAL: STORAGE_SERVICE_KEY is not set.");
        }

        if self.smtp_primary.is_none() && self.smtp_fallback.is_none() {
            log::warn!("No SMTP provider configured; email notifications are disabled");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            app_env: "test".to_string(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "eduhub-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: "http://localhost:3000".to_string(),
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            jwt_refresh_expiration_hours: 24,
            admin_email: Some("admin@eduhub.test".to_string()),
            default_passing_score: 80,
            default_max_attempts: 3,
            smtp_primary: None,
            smtp_fallback: None,
            storage_url: "http://storage.test".to_string(),
            storage_service_key: SecretString::from("service-key".to_string()),
            max_upload_bytes: 1024,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn primary_smtp_from_env() -> Option<SmtpSettings> {
    let host = env::var("SMTP_HOST").ok()?;
    let username = env::var("SMTP_USER").ok()?;
    let password = env::var("SMTP_PASSWORD").ok()?;

    Some(SmtpSettings {
        host,
        port: parse_var("SMTP_PORT").unwrap_or(DEFAULT_SMTP_PORT),
        from_address: env::var("SMTP_FROM").unwrap_or_else(|_| username.clone()),
        username,
        password: SecretString::from(password),
    })
}

fn fallback_smtp_from_env() -> Option<SmtpSettings> {
    let username = env::var("GMAIL_USER").ok()?;
    let password = env::var("GMAIL_APP_PASSWORD").ok()?;

    Some(SmtpSettings {
        host: GMAIL_SMTP_HOST.to_string(),
        port: DEFAULT_SMTP_PORT,
        from_address: username.clone(),
        username,
        password: SecretString::from(password),
    })
}
