use std::env;

pub struct MediaSettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

pub struct Config {
    pub database_url: String,
    pub frontend_origin: String,
    /// Secure cookie attribute follows the deployment environment.
    pub auth_cookie_secure: bool,
    pub port: u16,
    pub media: MediaSettings,
}

impl Config {
    /// Missing required vars are unrecoverable at boot and terminate the
    /// process by design.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let frontend_origin = env::var("FRONTEND_ORIGIN").expect("FRONTEND_ORIGIN must be set");

        let auth_cookie_secure = env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);

        let media = MediaSettings {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .expect("CLOUDINARY_CLOUD_NAME must be set"),
            api_key: env::var("CLOUDINARY_API_KEY").expect("CLOUDINARY_API_KEY must be set"),
            api_secret: env::var("CLOUDINARY_API_SECRET")
                .expect("CLOUDINARY_API_SECRET must be set"),
        };

        Config {
            database_url,
            frontend_origin,
            auth_cookie_secure,
            port,
            media,
        }
    }
}
