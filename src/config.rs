// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Payment gateway (escrow provider)
    pub payment_gateway_url: String,
    pub payment_gateway_secret: String,
    // Email service configurations
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub mail_from: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");

        // Payment gateway configurations (with defaults for local runs)
        let payment_gateway_url = std::env::var("PAYMENT_GATEWAY_URL")
            .unwrap_or_else(|_| "https://api.escrow-gateway.test".to_string());
        let payment_gateway_secret = std::env::var("PAYMENT_GATEWAY_SECRET")
            .unwrap_or_else(|_| "test_secret_key".to_string());

        // Email service configurations (with defaults)
        let smtp_host = std::env::var("SMTP_HOST")
            .unwrap_or_else(|_| "localhost".to_string());
        let smtp_username = std::env::var("SMTP_USERNAME")
            .unwrap_or_else(|_| "".to_string());
        let smtp_password = std::env::var("SMTP_PASSWORD")
            .unwrap_or_else(|_| "".to_string());
        let mail_from = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "Dapio <no-reply@dapio.app>".to_string());

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port: 8000,
            payment_gateway_url,
            payment_gateway_secret,
            smtp_host,
            smtp_username,
            smtp_password,
            mail_from,
        }
    }
}
