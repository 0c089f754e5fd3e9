// Payment - fee policy configuration and the checkout options it produces
//
// Pure functions only: the payment-methods route hands in the event price
// and configuration, the gateway integration receives the selected option.

pub mod calculator;
pub mod config;
pub mod method;

pub use calculator::{calculate_payment_options, validate_payment_option, PaymentFeeCalculator};
pub use config::{
    FeeAbsorption, FeeSchedule, InstallmentTier, MethodConfig, PaymentConfig, PaymentConfigError,
    MAX_INSTALLMENTS,
};
pub use method::{PaymentMethod, PaymentOption, PaymentOptions, UnknownPaymentMethod};
