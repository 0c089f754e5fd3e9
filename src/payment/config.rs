// ⚙️ Payment Configuration - fee policy per method, supplied per event
//
// Each method is its own variant so a debit card with installments
// cannot be written down, and unknown keys fail the parse.
// A method is enabled by being listed.

use super::method::PaymentMethod;
use anyhow::{Context as AnyhowContext, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Upper bound accepted for `max_installments`
pub const MAX_INSTALLMENTS: u32 = 24;

// ============================================================================
// FEE POLICY
// ============================================================================

/// Who bears the processing fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeAbsorption {
    /// Organizer pays; attendee is charged the event price
    #[default]
    Merchant,

    /// Attendee pays; the price is grossed up
    Payer,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeeSchedule {
    /// Percent of the charged amount (3.99 means 3.99%)
    #[serde(default)]
    pub percentage: Decimal,

    /// Flat amount per transaction, in BRL
    #[serde(default)]
    pub fixed: Decimal,

    #[serde(default)]
    pub absorbed_by: FeeAbsorption,
}

impl FeeSchedule {
    pub fn free() -> Self {
        FeeSchedule::default()
    }

    pub fn payer(percentage: Decimal, fixed: Decimal) -> Self {
        FeeSchedule {
            percentage,
            fixed,
            absorbed_by: FeeAbsorption::Payer,
        }
    }

    pub fn merchant(percentage: Decimal, fixed: Decimal) -> Self {
        FeeSchedule {
            percentage,
            fixed,
            absorbed_by: FeeAbsorption::Merchant,
        }
    }
}

/// Extra percentage for credit card purchases split in up to `up_to` installments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallmentTier {
    pub up_to: u32,
    pub percentage: Decimal,
}

impl InstallmentTier {
    pub fn new(up_to: u32, percentage: Decimal) -> Self {
        InstallmentTier { up_to, percentage }
    }
}

fn default_max_installments() -> u32 {
    1
}

// ============================================================================
// METHOD CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case", deny_unknown_fields)]
pub enum MethodConfig {
    Pix {
        #[serde(default)]
        fee: FeeSchedule,
    },
    DebitCard {
        #[serde(default)]
        fee: FeeSchedule,
    },
    CreditCard {
        #[serde(default)]
        fee: FeeSchedule,

        #[serde(default = "default_max_installments")]
        max_installments: u32,

        /// Sorted by `up_to`, strictly ascending
        #[serde(default)]
        installment_fees: Vec<InstallmentTier>,
    },
}

impl MethodConfig {
    pub fn method(&self) -> PaymentMethod {
        match self {
            MethodConfig::Pix { .. } => PaymentMethod::Pix,
            MethodConfig::DebitCard { .. } => PaymentMethod::DebitCard,
            MethodConfig::CreditCard { .. } => PaymentMethod::CreditCard,
        }
    }

    pub fn fee(&self) -> &FeeSchedule {
        match self {
            MethodConfig::Pix { fee }
            | MethodConfig::DebitCard { fee }
            | MethodConfig::CreditCard { fee, .. } => fee,
        }
    }

    /// 1 for methods paid in a single charge
    pub fn max_installments(&self) -> u32 {
        match self {
            MethodConfig::CreditCard { max_installments, .. } => *max_installments,
            _ => 1,
        }
    }

    /// Tier surcharge for `installments`: first tier covering the count,
    /// the last tier past the end of the table, zero without a table.
    pub fn tier_percentage(&self, installments: u32) -> Decimal {
        match self {
            MethodConfig::CreditCard { installment_fees, .. } => installment_fees
                .iter()
                .find(|tier| installments <= tier.up_to)
                .or_else(|| installment_fees.last())
                .map(|tier| tier.percentage)
                .unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }

    /// Check a single entry in isolation
    pub fn validate(&self) -> Result<(), PaymentConfigError> {
        let method = self.method();
        let fee = self.fee();
        let hundred = Decimal::ONE_HUNDRED;

        if fee.percentage < Decimal::ZERO || fee.percentage >= hundred {
            return Err(PaymentConfigError::InvalidPercentage {
                method,
                value: fee.percentage,
            });
        }

        if fee.fixed < Decimal::ZERO {
            return Err(PaymentConfigError::NegativeFixedFee {
                method,
                value: fee.fixed,
            });
        }

        if let MethodConfig::CreditCard {
            max_installments,
            installment_fees,
            ..
        } = self
        {
            if *max_installments < 1 || *max_installments > MAX_INSTALLMENTS {
                return Err(PaymentConfigError::InstallmentsOutOfRange(*max_installments));
            }

            let mut previous = 0;
            for tier in installment_fees {
                if tier.up_to <= previous {
                    return Err(PaymentConfigError::UnorderedTiers(tier.up_to));
                }
                previous = tier.up_to;

                let combined = fee.percentage.checked_add(tier.percentage).unwrap_or(Decimal::MAX);
                if tier.percentage < Decimal::ZERO || combined >= hundred {
                    return Err(PaymentConfigError::InvalidPercentage {
                        method,
                        value: tier.percentage,
                    });
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentConfigError {
    #[error("{0}: declared more than once")]
    DuplicateMethod(PaymentMethod),

    #[error("{method}: fee percentage {value} must be at least 0 and below 100")]
    InvalidPercentage { method: PaymentMethod, value: Decimal },

    #[error("{method}: fixed fee {value} cannot be negative")]
    NegativeFixedFee { method: PaymentMethod, value: Decimal },

    #[error("credit_card: max_installments {0} must be between 1 and 24")]
    InstallmentsOutOfRange(u32),

    #[error("credit_card: installment tiers must be strictly ascending (tier up_to {0})")]
    UnorderedTiers(u32),
}

// ============================================================================
// PAYMENT CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentConfig {
    /// Offered in this order at checkout
    pub methods: Vec<MethodConfig>,
}

impl Default for PaymentConfig {
    /// PIX and a single credit card charge, organizer absorbs fees
    fn default() -> Self {
        PaymentConfig {
            methods: vec![
                MethodConfig::Pix {
                    fee: FeeSchedule::free(),
                },
                MethodConfig::CreditCard {
                    fee: FeeSchedule::free(),
                    max_installments: 1,
                    installment_fees: Vec::new(),
                },
            ],
        }
    }
}

impl PaymentConfig {
    pub fn new(methods: Vec<MethodConfig>) -> Self {
        PaymentConfig { methods }
    }

    /// Parse the JSON an organizer saves in the admin panel
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse payment config JSON")
    }

    /// Load from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read payment config: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    /// Entry for `method`, if enabled
    pub fn get(&self, method: PaymentMethod) -> Option<&MethodConfig> {
        self.methods.iter().find(|m| m.method() == method)
    }

    pub fn is_enabled(&self, method: PaymentMethod) -> bool {
        self.get(method).is_some()
    }

    /// All problems at once, so the admin panel can show every one
    pub fn validate(&self) -> Result<(), Vec<PaymentConfigError>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for entry in &self.methods {
            if !seen.insert(entry.method()) {
                errors.push(PaymentConfigError::DuplicateMethod(entry.method()));
                continue;
            }

            if let Err(e) = entry.validate() {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pct(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn test_default_config() {
        let config = PaymentConfig::default();

        assert!(config.is_enabled(PaymentMethod::Pix));
        assert!(config.is_enabled(PaymentMethod::CreditCard));
        assert!(!config.is_enabled(PaymentMethod::DebitCard));
        assert_eq!(config.get(PaymentMethod::CreditCard).unwrap().max_installments(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_tagged_json() {
        let config = PaymentConfig::from_json(
            r#"{
                "methods": [
                    {"method": "pix"},
                    {"method": "debit_card", "fee": {"percentage": 1.99, "absorbed_by": "payer"}},
                    {
                        "method": "credit_card",
                        "fee": {"percentage": 3.99, "fixed": 0.49, "absorbed_by": "payer"},
                        "max_installments": 12,
                        "installment_fees": [
                            {"up_to": 1, "percentage": 0},
                            {"up_to": 6, "percentage": 2.5},
                            {"up_to": 12, "percentage": 4}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.methods.len(), 3);
        assert_eq!(config.methods[0], MethodConfig::Pix { fee: FeeSchedule::free() });

        let debit = config.get(PaymentMethod::DebitCard).unwrap();
        assert_eq!(debit.fee().percentage, pct(199, 2));
        assert_eq!(debit.fee().absorbed_by, FeeAbsorption::Payer);

        let credit = config.get(PaymentMethod::CreditCard).unwrap();
        assert_eq!(credit.max_installments(), 12);
        assert_eq!(credit.fee().fixed, pct(49, 2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debit_card_rejects_installments() {
        let err = PaymentConfig::from_json(
            r#"{"methods": [{"method": "debit_card", "max_installments": 3}]}"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("max_installments"));

        let err = PaymentConfig::from_json(
            r#"{"methods": [{"method": "pix", "installment_fees": []}]}"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("installment_fees"));
    }

    #[test]
    fn test_misspelled_keys_rejected() {
        // "absorbed" instead of "absorbed_by"
        assert!(PaymentConfig::from_json(
            r#"{"methods": [{"method": "pix", "fee": {"percentage": 1, "absorbed": "payer"}}]}"#,
        )
        .is_err());

        // "max_instalments"
        assert!(PaymentConfig::from_json(
            r#"{"methods": [{"method": "credit_card", "max_instalments": 6}]}"#,
        )
        .is_err());

        assert!(PaymentConfig::from_json(
            r#"{"methods": [{"method": "credit_card", "installment_fees": [{"up_to": 3, "pct": 1}]}]}"#,
        )
        .is_err());

        assert!(PaymentConfig::from_json(r#"{"methods": [], "currency": "BRL"}"#).is_err());
    }

    #[test]
    fn test_huge_tier_percentage_rejected() {
        let credit = MethodConfig::CreditCard {
            fee: FeeSchedule::payer(pct(99, 0), Decimal::ZERO),
            max_installments: 2,
            installment_fees: vec![InstallmentTier::new(2, Decimal::MAX)],
        };
        assert!(matches!(
            credit.validate(),
            Err(PaymentConfigError::InvalidPercentage { .. })
        ));
    }

    #[test]
    fn test_unknown_method_fails_to_parse() {
        assert!(PaymentConfig::from_json(r#"{"methods": [{"method": "boleto"}]}"#).is_err());
    }

    #[test]
    fn test_tier_lookup() {
        let credit = MethodConfig::CreditCard {
            fee: FeeSchedule::free(),
            max_installments: 12,
            installment_fees: vec![
                InstallmentTier::new(1, Decimal::ZERO),
                InstallmentTier::new(6, pct(25, 1)),
                InstallmentTier::new(10, pct(4, 0)),
            ],
        };

        assert_eq!(credit.tier_percentage(1), Decimal::ZERO);
        assert_eq!(credit.tier_percentage(2), pct(25, 1));
        assert_eq!(credit.tier_percentage(6), pct(25, 1));
        assert_eq!(credit.tier_percentage(7), pct(4, 0));
        // Past the table: last tier applies
        assert_eq!(credit.tier_percentage(12), pct(4, 0));

        let pix = MethodConfig::Pix { fee: FeeSchedule::free() };
        assert_eq!(pix.tier_percentage(3), Decimal::ZERO);
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = PaymentConfig::new(vec![
            MethodConfig::Pix {
                fee: FeeSchedule::payer(pct(100, 0), Decimal::ZERO),
            },
            MethodConfig::Pix { fee: FeeSchedule::free() },
            MethodConfig::DebitCard {
                fee: FeeSchedule::payer(Decimal::ONE, pct(-1, 0)),
            },
            MethodConfig::CreditCard {
                fee: FeeSchedule::free(),
                max_installments: 25,
                installment_fees: Vec::new(),
            },
        ]);

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], PaymentConfigError::InvalidPercentage { method: PaymentMethod::Pix, .. }));
        assert_eq!(errors[1], PaymentConfigError::DuplicateMethod(PaymentMethod::Pix));
        assert!(matches!(errors[2], PaymentConfigError::NegativeFixedFee { .. }));
        assert_eq!(errors[3], PaymentConfigError::InstallmentsOutOfRange(25));
    }

    #[test]
    fn test_validate_tiers() {
        let unordered = MethodConfig::CreditCard {
            fee: FeeSchedule::free(),
            max_installments: 12,
            installment_fees: vec![InstallmentTier::new(6, Decimal::ONE), InstallmentTier::new(3, Decimal::ONE)],
        };
        assert_eq!(unordered.validate(), Err(PaymentConfigError::UnorderedTiers(3)));

        let too_expensive = MethodConfig::CreditCard {
            fee: FeeSchedule::payer(pct(60, 0), Decimal::ZERO),
            max_installments: 12,
            installment_fees: vec![InstallmentTier::new(12, pct(40, 0))],
        };
        assert!(matches!(
            too_expensive.validate(),
            Err(PaymentConfigError::InvalidPercentage { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"methods": [{{"method": "pix"}}]}}"#).unwrap();

        let config = PaymentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.methods.len(), 1);

        assert!(PaymentConfig::from_file("/nonexistent/payment.json").is_err());
    }
}
