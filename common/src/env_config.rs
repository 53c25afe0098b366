use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// This struct holds all the necessary configuration parameters
/// required to initialize and run the server.
/// It includes database connection details, JWT configuration,
/// server host and port, number of worker threads, CORS settings,
/// logging preferences, the Google OAuth client, Stripe credentials
/// and the indexing provider endpoints.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Configuration for JWT (JSON Web Token) authentication.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Public URL of the dashboard, used for Stripe redirects.
    pub web_app_url: String,
    /// The URL that the web application will redirect to after authentication.
    pub web_app_auth_callback_url: String,
    /// Configuration for the Google OAuth2 client.
    pub google_client: OAuthProviderClient,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook secret
    pub stripe_webhook_secret: String,
    /// Stripe price ids of the paid plans
    pub stripe_prices: StripePrices,
    /// Indexing provider endpoints and client behaviour
    pub providers: ProviderConfig,
    /// Process-wide request budget per second
    pub global_permits_per_second: u32,
}

#[derive(Clone, Debug)]
/// `ProviderClient` holds the configuration necessary for interacting with an OAuth 2.0 provider.
///
/// It contains the client ID and secret, as well as the authentication and token URLs required
/// for the OAuth 2.0 flow. The redirect URI is also stored for use after successful authentication.
pub struct OAuthProviderClient {
    /// The client ID for the OAuth 2.0 provider.
    pub client_id: String,
    /// The client secret for the OAuth 2.0 provider.
    pub client_secret: String,
    /// The authentication URL for the OAuth 2.0 provider.
    pub auth_url: String,
    /// The token URL for the OAuth 2.0 provider.
    pub token_url: String,
    /// The redirect URI for the OAuth 2.0 provider.
    pub redirect_uri: String,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication.
///
/// This struct contains the secret key used to sign JWTs and
/// the expiration time in hours for issued tokens.
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

#[derive(Clone, Debug, Default)]
/// Stripe price ids mapped to the paid plans.
pub struct StripePrices {
    pub starter: Option<String>,
    pub pro: Option<String>,
    pub agency: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Google Indexing API publish endpoint.
    pub gsc_indexing_endpoint: String,
    /// Search Console (webmasters v3) API base.
    pub gsc_webmasters_endpoint: String,
    /// Search Console URL inspection endpoint.
    pub gsc_inspection_endpoint: String,
    /// IndexNow submission endpoint.
    pub indexnow_endpoint: String,
    /// Per-call deadline for outbound provider requests.
    pub timeout_secs: u64,
    /// Delay between consecutive URL submissions in a batch.
    pub pacing_ms: u64,
}

impl JwtConfig {
    /// Creates a new `JwtConfig` instance from environment variables.
    ///
    /// Reads the JWT configuration from environment variables:
    /// - `JWT_SECRET`: Required. The secret key for JWT signing, at least 32 bytes
    ///   since it also derives the session cookie key.
    /// - `JWT_EXPIRATION_HOURS`: Optional. Defaults to 24 hours if not provided.
    ///
    /// # Panics
    ///
    /// This function will panic if:
    /// - `JWT_SECRET` environment variable is not set or is shorter than 32 bytes
    /// - `JWT_EXPIRATION_HOURS` is set but cannot be parsed as a valid number
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        assert!(secret.len() >= 32, "JWT_SECRET must be at least 32 bytes long");

        JwtConfig {
            secret,
            expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a valid number"),
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads all configuration values from environment variables with sensible defaults
    /// for most optional settings.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `DATABASE_URL`: Connection string for the database
    /// - `JWT_SECRET`: Secret key for JWT signing (via `JwtConfig::from_env()`)
    ///
    /// Optional (with defaults):
    /// - `ENVIRONMENT`: "development" or "production" (default: "development")
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `WEB_APP_URL`: Dashboard URL (default: "http://localhost:3000")
    /// - `WEB_APP_AUTH_CALLBACK_URL`: Web app callback URL (default: "http://localhost:3000/auth/callback")
    /// - `GOOGLE_*`: Google OAuth client settings
    /// - `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET`, `STRIPE_*_PRICE_ID`
    /// - `GSC_INDEXING_ENDPOINT`, `GSC_WEBMASTERS_ENDPOINT`, `GSC_INSPECTION_ENDPOINT`, `INDEXNOW_ENDPOINT`
    /// - `PROVIDER_TIMEOUT_SECS` (default: 10), `SUBMISSION_PACING_MS` (default: 300)
    /// - `GLOBAL_PERMITS_PER_SECOND` (default: 10)
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing or if
    /// numeric values cannot be parsed correctly.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY").unwrap_or_default();
        let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_config: JwtConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            web_app_url: env::var("WEB_APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            web_app_auth_callback_url: env::var("WEB_APP_AUTH_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string()),
            google_client: OAuthProviderClient {
                client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
                auth_url: env::var("GOOGLE_AUTH_URL")
                    .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string()),
                token_url: env::var("GOOGLE_TOKEN_URL")
                    .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),
                redirect_uri: env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
                    "http://localhost:8080/api/auth/oauth/google/callback".to_string()
                }),
            },
            stripe_secret_key,
            stripe_webhook_secret,
            stripe_prices: StripePrices {
                starter: optional_var("STRIPE_STARTER_PRICE_ID"),
                pro: optional_var("STRIPE_PRO_PRICE_ID"),
                agency: optional_var("STRIPE_AGENCY_PRICE_ID"),
            },
            providers: ProviderConfig {
                gsc_indexing_endpoint: env::var("GSC_INDEXING_ENDPOINT").unwrap_or_else(|_| {
                    "https://indexing.googleapis.com/v3/urlNotifications:publish".to_string()
                }),
                gsc_webmasters_endpoint: env::var("GSC_WEBMASTERS_ENDPOINT")
                    .unwrap_or_else(|_| "https://www.googleapis.com/webmasters/v3".to_string()),
                gsc_inspection_endpoint: env::var("GSC_INSPECTION_ENDPOINT").unwrap_or_else(
                    |_| {
                        "https://searchconsole.googleapis.com/v1/urlInspection/index:inspect"
                            .to_string()
                    },
                ),
                indexnow_endpoint: env::var("INDEXNOW_ENDPOINT")
                    .unwrap_or_else(|_| "https://api.indexnow.org/indexnow".to_string()),
                timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("PROVIDER_TIMEOUT_SECS must be a valid number"),
                pacing_ms: env::var("SUBMISSION_PACING_MS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .expect("SUBMISSION_PACING_MS must be a valid number"),
            },
            global_permits_per_second: env::var("GLOBAL_PERMITS_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("GLOBAL_PERMITS_PER_SECOND must be a valid number"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
