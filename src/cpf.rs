// 🪪 CPF Validator - Brazilian taxpayer identifier
// Checksum validation for the 11-digit CPF used on registration and lookup
//
// Registration stores the normalized form (digits only), so
// "111.444.777-35" and "11144477735" always hit the same attendee.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Number of digits in a normalized CPF
pub const CPF_LENGTH: usize = 11;

// ============================================================================
// ERRORS
// ============================================================================

/// Why a CPF was rejected. Messages are shown to attendees as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpfError {
    #[error("CPF é obrigatório")]
    Required,

    #[error("CPF não pode estar vazio")]
    Empty,

    #[error("CPF incompleto")]
    Incomplete,

    #[error("CPF deve ter exatamente 11 dígitos")]
    TooLong,

    #[error("CPF inválido: todos os dígitos são iguais")]
    RepeatedDigits,

    #[error("CPF inválido: dígitos verificadores não conferem")]
    InvalidCheckDigits,
}

impl Serialize for CpfError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpfValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CpfError>,
}

impl CpfValidation {
    pub fn valid() -> Self {
        CpfValidation {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: CpfError) -> Self {
        CpfValidation {
            is_valid: false,
            error: Some(error),
        }
    }
}

// ============================================================================
// ALGORITHM
// ============================================================================

/// Strip every non-digit character ("111.444.777-35" -> "11144477735")
pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn check_digit(digits: &[u8], first_weight: u32) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, &digit)| u32::from(digit) * (first_weight - index as u32))
        .sum();

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

/// Compute both check digits for the first nine digits of a CPF
pub fn compute_check_digits(base: &[u8; 9]) -> (u8, u8) {
    let first = check_digit(base, 10);

    let mut with_first = [0u8; 10];
    with_first[..9].copy_from_slice(base);
    with_first[9] = first;

    (first, check_digit(&with_first, 11))
}

fn to_digits(normalized: &str) -> Vec<u8> {
    normalized.bytes().map(|b| b - b'0').collect()
}

fn all_digits_equal(digits: &[u8]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}

/// Checksum rules on an already-normalized 11-digit string
fn check_normalized(normalized: &str) -> Result<(), CpfError> {
    let digits = to_digits(normalized);

    if all_digits_equal(&digits) {
        return Err(CpfError::RepeatedDigits);
    }

    if digits[9] != check_digit(&digits[..9], 10) {
        return Err(CpfError::InvalidCheckDigits);
    }

    if digits[10] != check_digit(&digits[..10], 11) {
        return Err(CpfError::InvalidCheckDigits);
    }

    Ok(())
}

/// Checksum-only validation. Formatting characters are ignored.
pub fn validate_cpf_digits(raw: &str) -> bool {
    let normalized = normalize_cpf(raw);
    normalized.len() == CPF_LENGTH && check_normalized(&normalized).is_ok()
}

/// Full validation with the message registration forms display
pub fn is_valid_cpf(raw: &str) -> CpfValidation {
    match check(raw) {
        Ok(_) => CpfValidation::valid(),
        Err(error) => CpfValidation::invalid(error),
    }
}

fn check(raw: &str) -> Result<String, CpfError> {
    if raw.is_empty() {
        return Err(CpfError::Required);
    }

    let normalized = normalize_cpf(raw);

    match normalized.len() {
        0 => Err(CpfError::Empty),
        len if len < CPF_LENGTH => Err(CpfError::Incomplete),
        len if len > CPF_LENGTH => Err(CpfError::TooLong),
        _ => {
            check_normalized(&normalized)?;
            Ok(normalized)
        }
    }
}

// Both expect exactly 11 ASCII digits
fn punctuate(n: &str) -> String {
    format!("{}.{}.{}-{}", &n[0..3], &n[3..6], &n[6..9], &n[9..11])
}

fn mask_digits(n: &str) -> String {
    format!("***.{}.{}-**", &n[3..6], &n[6..9])
}

fn eleven_digits(raw: &str) -> Option<String> {
    Some(normalize_cpf(raw)).filter(|n| n.len() == CPF_LENGTH)
}

/// "11144477735" -> "111.444.777-35". None unless there are exactly 11 digits.
pub fn format_cpf(raw: &str) -> Option<String> {
    eleven_digits(raw).map(|n| punctuate(&n))
}

/// Hide first and last groups for admin listings and exports
pub fn mask_cpf(raw: &str) -> Option<String> {
    eleven_digits(raw).map(|n| mask_digits(&n))
}

// ============================================================================
// TYPED VALUE
// ============================================================================

/// A CPF that passed validation, held in normalized form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(raw: &str) -> Result<Self, CpfError> {
        check(raw).map(Cpf)
    }

    /// The 11 unformatted digits, as stored
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_digits(&self.0)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&punctuate(&self.0))
    }
}

impl Serialize for Cpf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl std::str::FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cpf::parse(s)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_valid_cpf() {
        assert!(validate_cpf_digits("11144477735"));
        assert!(is_valid_cpf("11144477735").is_valid);
    }

    #[test]
    fn test_known_invalid_cpf() {
        assert!(!validate_cpf_digits("12345678900"));

        let result = is_valid_cpf("12345678900");
        assert!(!result.is_valid);
        assert_eq!(result.error, Some(CpfError::InvalidCheckDigits));
    }

    #[test]
    fn test_formatted_input_matches_unformatted() {
        assert!(validate_cpf_digits("111.444.777-35"));
        assert_eq!(is_valid_cpf("111.444.777-35"), is_valid_cpf("11144477735"));
        assert_eq!(is_valid_cpf("123.456.789-00"), is_valid_cpf("12345678900"));
    }

    #[test]
    fn test_empty_input_is_required() {
        let result = is_valid_cpf("");
        assert!(!result.is_valid);
        assert_eq!(result.error, Some(CpfError::Required));
        assert_eq!(result.error.unwrap().to_string(), "CPF é obrigatório");
    }

    #[test]
    fn test_only_formatting_is_empty() {
        assert_eq!(is_valid_cpf("..-").error, Some(CpfError::Empty));
        assert_eq!(is_valid_cpf("   ").error, Some(CpfError::Empty));
    }

    #[test]
    fn test_short_input_is_incomplete() {
        assert_eq!(is_valid_cpf("123").error, Some(CpfError::Incomplete));
        assert_eq!(is_valid_cpf("1114447773").error, Some(CpfError::Incomplete));
    }

    #[test]
    fn test_long_input_rejected() {
        let result = is_valid_cpf("111444777350");
        assert_eq!(result.error, Some(CpfError::TooLong));
        assert_eq!(
            result.error.unwrap().to_string(),
            "CPF deve ter exatamente 11 dígitos"
        );
        assert!(!validate_cpf_digits("111444777350"));
    }

    #[test]
    fn test_repeated_digits_rejected() {
        for d in 0..=9 {
            let cpf = d.to_string().repeat(11);
            assert!(!validate_cpf_digits(&cpf));
            assert_eq!(is_valid_cpf(&cpf).error, Some(CpfError::RepeatedDigits));
        }
    }

    #[test]
    fn test_first_check_digit_mismatch() {
        // 11144477735 with digit[9] altered
        assert_eq!(
            is_valid_cpf("11144477745").error,
            Some(CpfError::InvalidCheckDigits)
        );
    }

    #[test]
    fn test_compute_check_digits() {
        assert_eq!(compute_check_digits(&[1, 1, 1, 4, 4, 4, 7, 7, 7]), (3, 5));
        assert_eq!(compute_check_digits(&[5, 2, 9, 9, 8, 2, 2, 4, 7]), (2, 5));
        // remainder < 2 on both digits
        assert_eq!(compute_check_digits(&[9, 8, 7, 6, 5, 4, 3, 2, 1]), (0, 0));
        assert!(validate_cpf_digits("987.654.321-00"));
        assert!(validate_cpf_digits("12345678909"));
    }

    #[test]
    fn test_format_and_mask() {
        assert_eq!(format_cpf("11144477735").as_deref(), Some("111.444.777-35"));
        assert_eq!(mask_cpf("111.444.777-35").as_deref(), Some("***.444.777-**"));
        assert_eq!(format_cpf("123"), None);
        assert_eq!(mask_cpf(""), None);
    }

    #[test]
    fn test_typed_cpf() {
        let cpf: Cpf = "111.444.777-35".parse().unwrap();
        assert_eq!(cpf.as_str(), "11144477735");
        assert_eq!(cpf.to_string(), "111.444.777-35");
        assert_eq!(cpf.masked(), "***.444.777-**");
        assert_eq!(serde_json::to_value(&cpf).unwrap(), serde_json::json!("11144477735"));

        assert_eq!(Cpf::parse("00000000000"), Err(CpfError::RepeatedDigits));

        // typed value and free helpers render identically
        for raw in ["111.444.777-35", "98765432100", "123.456.789-09"] {
            let cpf = Cpf::parse(raw).unwrap();
            assert_eq!(Some(cpf.to_string()), format_cpf(raw));
            assert_eq!(Some(cpf.masked()), mask_cpf(raw));
        }
    }

    #[test]
    fn test_validation_serializes_message() {
        let json = serde_json::to_value(is_valid_cpf("123")).unwrap();
        assert_eq!(json["is_valid"], false);
        assert_eq!(json["error"], "CPF incompleto");

        let json = serde_json::to_value(is_valid_cpf("11144477735")).unwrap();
        assert!(json.get("error").is_none());
    }
}
