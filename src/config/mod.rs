use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub astro: AstroConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Tunables for chart computation: natal aspect matching uses a wide orb,
/// transit matching a tight one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstroConfig {
    pub aspect_orb_deg: f64,
    pub transit_orb_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Natal charts a free-tier account may keep
    pub free_chart_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Astro overrides
        if let Ok(v) = env::var("ASTRO_ASPECT_ORB_DEG") {
            self.astro.aspect_orb_deg = v.parse().unwrap_or(self.astro.aspect_orb_deg);
        }
        if let Ok(v) = env::var("ASTRO_TRANSIT_ORB_DEG") {
            self.astro.transit_orb_deg = v.parse().unwrap_or(self.astro.transit_orb_deg);
        }

        // Limit overrides
        if let Ok(v) = env::var("LIMITS_FREE_CHART_LIMIT") {
            self.limits.free_chart_limit = v.parse().unwrap_or(self.limits.free_chart_limit);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-in-production".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            astro: AstroConfig {
                aspect_orb_deg: 8.0,
                transit_orb_deg: 3.0,
            },
            limits: LimitsConfig { free_chart_limit: 1 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                // Must be provided via JWT_SECRET; token issuance rejects an empty secret
                jwt_secret: String::new(),
                jwt_expiry_hours: 72,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            astro: AstroConfig {
                aspect_orb_deg: 8.0,
                transit_orb_deg: 3.0,
            },
            limits: LimitsConfig { free_chart_limit: 1 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            astro: AstroConfig {
                aspect_orb_deg: 8.0,
                transit_orb_deg: 3.0,
            },
            limits: LimitsConfig { free_chart_limit: 1 },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
