use chrono::NaiveTime;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::auth::JwtConfig;

/// Server configuration - all settings of the ordering service
///
/// # Environment variables
///
/// Every setting can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/mett | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP service port |
/// | ENVIRONMENT | development | Runtime environment |
/// | EXPIRY_CUTOFF | 09:30 | Time of day at which an order window closes |
/// | DEFAULT_BUNS | Weizen,Roggen,Roeggelchen | Seeded bun catalog (CSV) |
/// | DEFAULT_PRICE | 1.00 | Seeded price per bun |
/// | DEFAULT_METT_GRAMS | 66.0 | Seeded mett grams per bun |
/// | HALF_BUNS | Roeggelchen | Bun classes sold in joined pairs (at most one) |
/// | DEFAULT_SPARE | Weizen | Bun class used for spare buns |
/// | SPARE_COUNT | 2 | Spare buns added to each aggregate order |
/// | DEFAULT_ADMIN | init | Seeded admin user |
/// | DEFAULT_ADMIN_PASSWORD | init | Seeded admin password |
/// | DEFAULT_ROLE | user | Role granted to newly created users |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Business rules of the bun order
    pub mett: MettConfig,
    /// Seeded admin account
    pub default_admin: String,
    pub default_admin_password: String,
    /// Role granted to newly created users
    pub default_role: String,
}

/// Business configuration of the order window and spare-bun rule
#[derive(Debug, Clone)]
pub struct MettConfig {
    /// Time of day at which the order window of an expiry date closes
    pub expiry_cutoff: NaiveTime,
    /// Bun classes seeded into an empty catalog
    pub default_buns: Vec<String>,
    /// Price each seeded class starts with
    pub default_price: Decimal,
    /// Mett grams each seeded class starts with
    pub default_mett_grams: f64,
    /// Classes sold only in joined pairs; at most one may be configured
    pub half_buns: Vec<String>,
    /// Class spare buns are booked against
    pub default_spare: String,
    /// Number of spare buns added to the aggregate order
    pub spare_count: u64,
}

/// Configuration violations detected at seed time
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("At most one half bun class may be configured, got: {0}")]
    MultipleHalfBuns(String),

    #[error("Default spare '{0}' must be one of the configured non-half bun classes")]
    SpareNotInCatalog(String),
}

impl MettConfig {
    /// The single configured half bun class, if any.
    ///
    /// Only meaningful after [`validate`](Self::validate) has passed.
    pub fn half_bun(&self) -> Option<&str> {
        self.half_buns.first().map(String::as_str)
    }

    /// Check the half-bun/spare constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.half_buns.len() > 1 {
            return Err(ConfigError::MultipleHalfBuns(self.half_buns.join(", ")));
        }
        let spare_is_full_bun = self
            .default_buns
            .iter()
            .any(|bun| bun == &self.default_spare && !self.half_buns.contains(bun));
        if !spare_is_full_bun {
            return Err(ConfigError::SpareNotInCatalog(self.default_spare.clone()));
        }
        Ok(())
    }
}

impl Default for MettConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl MettConfig {
    /// Load the business configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            expiry_cutoff: std::env::var("EXPIRY_CUTOFF")
                .ok()
                .and_then(|t| NaiveTime::parse_from_str(&t, "%H:%M").ok())
                .unwrap_or_else(|| NaiveTime::from_hms_opt(9, 30, 0).unwrap()),
            default_buns: csv_from_env("DEFAULT_BUNS", "Weizen,Roggen,Roeggelchen"),
            default_price: std::env::var("DEFAULT_PRICE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| Decimal::new(100, 2)),
            default_mett_grams: std::env::var("DEFAULT_METT_GRAMS")
                .ok()
                .and_then(|g| g.parse().ok())
                .unwrap_or(66.0),
            half_buns: csv_from_env("HALF_BUNS", "Roeggelchen"),
            default_spare: std::env::var("DEFAULT_SPARE").unwrap_or_else(|_| "Weizen".into()),
            spare_count: std::env::var("SPARE_COUNT")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(2),
        }
    }
}

fn csv_from_env(key: &str, default: &str) -> Vec<String> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.into());
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Load the configuration from environment variables.
    ///
    /// Unset variables fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/mett".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            mett: MettConfig::from_env(),
            default_admin: std::env::var("DEFAULT_ADMIN").unwrap_or_else(|_| "init".into()),
            default_admin_password: std::env::var("DEFAULT_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "init".into()),
            default_role: std::env::var("DEFAULT_ROLE").unwrap_or_else(|_| "user".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(buns: &[&str], half: &[&str], spare: &str) -> MettConfig {
        MettConfig {
            expiry_cutoff: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            default_buns: buns.iter().map(|s| s.to_string()).collect(),
            default_price: Decimal::new(100, 2),
            default_mett_grams: 66.0,
            half_buns: half.iter().map(|s| s.to_string()).collect(),
            default_spare: spare.to_string(),
            spare_count: 2,
        }
    }

    #[test]
    fn test_valid_config() {
        let config = test_config(&["Weizen", "Roggen", "Roeggelchen"], &["Roeggelchen"], "Weizen");
        assert!(config.validate().is_ok());
        assert_eq!(config.half_bun(), Some("Roeggelchen"));
    }

    #[test]
    fn test_two_half_buns_rejected() {
        let config = test_config(
            &["Weizen", "Roggen", "Roeggelchen"],
            &["Roeggelchen", "Roggen"],
            "Weizen",
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MultipleHalfBuns(_))
        ));
    }

    #[test]
    fn test_spare_must_be_full_bun() {
        // Spare pointing at the half bun class is rejected
        let config = test_config(&["Weizen", "Roeggelchen"], &["Roeggelchen"], "Roeggelchen");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpareNotInCatalog(_))
        ));

        // As is a spare that is not in the catalog at all
        let config = test_config(&["Weizen"], &[], "Vollkorn");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpareNotInCatalog(_))
        ));
    }

    #[test]
    fn test_no_half_bun_is_fine() {
        let config = test_config(&["Weizen", "Roggen"], &[], "Weizen");
        assert!(config.validate().is_ok());
        assert_eq!(config.half_bun(), None);
    }
}
