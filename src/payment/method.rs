// 💳 Payment methods and the options offered at checkout

use crate::money::format_brl;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// PAYMENT METHOD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    CreditCard,
    DebitCard,
}

impl PaymentMethod {
    /// Wire name, as sent by the checkout form
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
        }
    }

    /// Label shown to attendees
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::CreditCard => "Cartão de crédito",
            PaymentMethod::DebitCard => "Cartão de débito",
        }
    }

    pub fn supports_installments(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pix" => Ok(PaymentMethod::Pix),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

// ============================================================================
// PAYMENT OPTION
// ============================================================================

/// One selectable line at checkout. Derived on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOption {
    pub method: PaymentMethod,

    /// Only present for credit card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,

    /// Total charged to the payer
    #[serde(with = "rust_decimal::serde::float")]
    pub final_value: Decimal,

    /// Amount of each installment (credit card only)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub installment_value: Option<Decimal>,

    pub description: String,
}

impl PaymentOption {
    pub(crate) fn single(method: PaymentMethod, final_value: Decimal) -> Self {
        PaymentOption {
            method,
            installments: None,
            final_value,
            installment_value: None,
            description: format!("{} - {}", method.label(), format_brl(final_value)),
        }
    }

    pub(crate) fn installment(installments: u32, final_value: Decimal, installment_value: Decimal) -> Self {
        PaymentOption {
            method: PaymentMethod::CreditCard,
            installments: Some(installments),
            final_value,
            installment_value: Some(installment_value),
            description: format!("{}x de {}", installments, format_brl(installment_value)),
        }
    }

    /// Installment count the gateway should charge (1 for methods without installments)
    pub fn installment_count(&self) -> u32 {
        self.installments.unwrap_or(1)
    }
}

/// Body of the payment-methods response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentOptions {
    pub available_methods: Vec<PaymentOption>,
}

impl PaymentOptions {
    pub fn is_empty(&self) -> bool {
        self.available_methods.is_empty()
    }

    pub fn find(&self, method: PaymentMethod, installments: Option<u32>) -> Option<&PaymentOption> {
        let wanted = installments.unwrap_or(1);
        self.available_methods
            .iter()
            .find(|o| o.method == method && (!method.supports_installments() || o.installment_count() == wanted))
    }
}
