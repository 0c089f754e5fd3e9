// Event Check-in - Core Library
// CPF validation and payment options for registration, exposed to the CLI,
// the HTTP adapter and tests

pub mod cpf;
pub mod logging;
pub mod money;
pub mod payment;
pub mod settings;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use cpf::{
    Cpf, CpfError, CpfValidation,
    compute_check_digits, format_cpf, is_valid_cpf, mask_cpf, normalize_cpf, validate_cpf_digits,
};
pub use money::{format_brl, parse_amount, round_cents};
pub use payment::{
    FeeAbsorption, FeeSchedule, InstallmentTier, MethodConfig,
    PaymentConfig, PaymentConfigError, PaymentFeeCalculator,
    PaymentMethod, PaymentOption, PaymentOptions,
    calculate_payment_options, validate_payment_option,
};
pub use settings::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
