// Server settings - read from the environment at startup

use crate::money::parse_amount;
use crate::payment::PaymentConfig;
use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use std::path::PathBuf;

pub const ENV_BIND: &str = "EVENT_CHECKIN_BIND";
pub const ENV_PRICE: &str = "EVENT_CHECKIN_PRICE";
pub const ENV_PAYMENT_CONFIG: &str = "EVENT_CHECKIN_PAYMENT_CONFIG";

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP adapter listens on
    pub bind: String,

    /// Ticket price of the active event
    pub event_price: Decimal,

    /// JSON payment configuration; defaults apply when absent
    pub payment_config_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup(ENV_BIND)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let raw_price = lookup(ENV_PRICE).ok_or_else(|| anyhow!("{} is not set", ENV_PRICE))?;
        let event_price =
            parse_amount(&raw_price).with_context(|| format!("{} is not a valid amount", ENV_PRICE))?;

        if event_price < Decimal::ZERO {
            return Err(anyhow!("{} cannot be negative", ENV_PRICE));
        }

        let payment_config_path = lookup(ENV_PAYMENT_CONFIG)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Settings {
            bind,
            event_price,
            payment_config_path,
        })
    }

    /// Load and check the payment configuration this event uses
    pub fn load_payment_config(&self) -> Result<PaymentConfig> {
        let Some(path) = &self.payment_config_path else {
            return Ok(PaymentConfig::default());
        };

        let config = PaymentConfig::from_file(path)?;

        if let Err(errors) = config.validate() {
            let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(anyhow!("Invalid payment config {:?}: {}", path, details.join("; ")));
        }

        Ok(config)
    }
}
