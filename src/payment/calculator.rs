// 🧮 Payment Fee Calculator
// Turns an event price + fee policy into the options shown at checkout
//
// merchant absorbs -> attendee pays the price
// payer absorbs    -> (price + fixed) / (1 - (method% + tier%) / 100)

use super::config::{FeeAbsorption, MethodConfig, PaymentConfig};
use super::method::{PaymentMethod, PaymentOption, PaymentOptions};
use crate::money::round_cents;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, warn};

// ============================================================================
// FREE FUNCTIONS
// ============================================================================

/// Options for `price`. Without a config the defaults apply (PIX + 1x card).
pub fn calculate_payment_options(price: Decimal, config: Option<&PaymentConfig>) -> PaymentOptions {
    match config {
        Some(config) => options_for(price, config),
        None => options_for(price, &PaymentConfig::default()),
    }
}

/// Whether the checkout may charge `method` in `installments` (default 1)
pub fn validate_payment_option(method: &str, installments: Option<u32>, config: Option<&PaymentConfig>) -> bool {
    let method = match method.parse::<PaymentMethod>() {
        Ok(m) => m,
        Err(_) => return false,
    };

    match config {
        Some(config) => is_allowed(method, installments, config),
        None => is_allowed(method, installments, &PaymentConfig::default()),
    }
}

// ============================================================================
// CALCULATOR
// ============================================================================

/// Calculator bound to one event's payment configuration
#[derive(Debug, Clone, Default)]
pub struct PaymentFeeCalculator {
    config: PaymentConfig,
}

impl PaymentFeeCalculator {
    pub fn new(config: PaymentConfig) -> Self {
        PaymentFeeCalculator { config }
    }

    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    pub fn calculate(&self, price: Decimal) -> PaymentOptions {
        options_for(price, &self.config)
    }

    pub fn validate(&self, method: PaymentMethod, installments: Option<u32>) -> bool {
        is_allowed(method, installments, &self.config)
    }

    /// The option a checkout request selected, if the config allows it
    pub fn select(&self, price: Decimal, method: PaymentMethod, installments: Option<u32>) -> Option<PaymentOption> {
        if !self.validate(method, installments) {
            return None;
        }

        let entry = usable_entries(&self.config).find(|e| e.method() == method)?;
        let count = if method.supports_installments() {
            installments.unwrap_or(1)
        } else {
            1
        };

        option_for(price, entry, count)
    }
}

// ============================================================================
// INTERNALS
// ============================================================================

/// Entries the calculator will use: first declaration of each method that validates
fn usable_entries(config: &PaymentConfig) -> impl Iterator<Item = &MethodConfig> {
    let mut seen = HashSet::new();

    config.methods.iter().filter(move |entry| {
        if !seen.insert(entry.method()) {
            warn!(method = %entry.method(), "Duplicate payment method entry ignored");
            return false;
        }

        match entry.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Invalid payment method entry skipped");
                false
            }
        }
    })
}

fn is_allowed(method: PaymentMethod, installments: Option<u32>, config: &PaymentConfig) -> bool {
    let Some(entry) = usable_entries(config).find(|e| e.method() == method) else {
        return false;
    };

    match entry {
        MethodConfig::CreditCard { max_installments, .. } => {
            let count = installments.unwrap_or(1);
            count >= 1 && count <= *max_installments
        }
        _ => true,
    }
}

fn final_value(price: Decimal, entry: &MethodConfig, installments: u32) -> Option<Decimal> {
    let fee = entry.fee();

    match fee.absorbed_by {
        FeeAbsorption::Merchant => Some(price),
        FeeAbsorption::Payer => {
            let percentage = fee.percentage.checked_add(entry.tier_percentage(installments))?;
            let kept = Decimal::ONE.checked_sub(percentage / Decimal::ONE_HUNDRED)?;
            let gross = price.checked_add(fee.fixed)?.checked_div(kept)?;
            Some(round_cents(gross))
        }
    }
}

fn option_for(price: Decimal, entry: &MethodConfig, installments: u32) -> Option<PaymentOption> {
    let total = final_value(price, entry, installments)?;

    match entry {
        MethodConfig::CreditCard { .. } => {
            let each = round_cents(total / Decimal::from(installments));
            Some(PaymentOption::installment(installments, total, each))
        }
        _ => Some(PaymentOption::single(entry.method(), total)),
    }
}

fn options_for(price: Decimal, config: &PaymentConfig) -> PaymentOptions {
    if price < Decimal::ZERO {
        warn!(%price, "Negative price, no payment options");
        return PaymentOptions::default();
    }

    let mut available_methods = Vec::new();

    for entry in usable_entries(config) {
        for installments in 1..=entry.max_installments() {
            if let Some(option) = option_for(price, entry, installments) {
                available_methods.push(option);
            }
        }
    }

    debug!(%price, count = available_methods.len(), "Payment options calculated");

    PaymentOptions { available_methods }
}

// ============================================================================
// TESTS
// ============================================================================
