//! Input validation for accounts and wallet setups.

use std::fmt;

use crate::models::{Beneficiary, WalletSetup};

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Value too short.
    TooShort { field: String, min: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Wallet setup without a main wallet.
    MissingMainWallet,
    /// Wallet setup without beneficiaries.
    NoBeneficiaries,
    /// A beneficiary share outside 1..=100.
    InvalidPercentage { name: String, percentage: u32 },
    /// Beneficiary shares that do not add up to 100.
    PercentageTotal { total: u64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::TooShort { field, min } => {
                write!(f, "{} must be at least {} characters", field, min)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::MissingMainWallet => write!(f, "Main wallet address is required"),
            ValidationError::NoBeneficiaries => write!(f, "At least one beneficiary is required"),
            ValidationError::InvalidPercentage { name, percentage } => write!(
                f,
                "Beneficiary {} has invalid percentage {} (must be 1-100)",
                name, percentage
            ),
            ValidationError::PercentageTotal { .. } => {
                write!(f, "Beneficiaries percentages must total 100%")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for display names.
pub const MAX_NAME_LENGTH: usize = 128;

/// Minimum password length at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Required sum of beneficiary percentages.
pub const TOTAL_PERCENTAGE: u64 = 100;

/// Validate an email address (basic RFC 5322 format check).
///
/// This is a basic validation that checks:
/// - Contains exactly one @
/// - Has at least one character before @
/// - Has at least one dot after @
/// - Is not too long
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    };

    if domain.contains('@') {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain an inner dot".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}

/// Validate a display name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Empty("name".to_string()));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
            actual: name.len(),
        });
    }

    Ok(())
}

/// Validate a new password.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Check that a non-empty beneficiary list adds up to exactly 100%.
///
/// An empty list passes; whether one is allowed is up to the caller.
pub fn validate_percentage_total(beneficiaries: &[Beneficiary]) -> Result<(), ValidationError> {
    if beneficiaries.is_empty() {
        return Ok(());
    }

    let total: u64 = beneficiaries.iter().map(|b| u64::from(b.percentage)).sum();
    if total != TOTAL_PERCENTAGE {
        return Err(ValidationError::PercentageTotal { total });
    }

    Ok(())
}

/// Validate a single beneficiary.
pub fn validate_beneficiary(beneficiary: &Beneficiary) -> Result<(), ValidationError> {
    if beneficiary.name.trim().is_empty() {
        return Err(ValidationError::Empty("beneficiary name".to_string()));
    }

    if beneficiary.wallet_address.trim().is_empty() {
        return Err(ValidationError::Empty("beneficiary wallet address".to_string()));
    }

    if !(1..=100).contains(&beneficiary.percentage) {
        return Err(ValidationError::InvalidPercentage {
            name: beneficiary.name.clone(),
            percentage: beneficiary.percentage,
        });
    }

    match beneficiary.email.as_deref() {
        Some(email) if !email.trim().is_empty() => validate_email(email),
        _ => Ok(()),
    }
}

/// Validate a wallet setup submitted for saving.
pub fn validate_wallet_setup(setup: &WalletSetup) -> Result<(), ValidationError> {
    if setup.main_wallet.trim().is_empty() {
        return Err(ValidationError::MissingMainWallet);
    }

    if setup.beneficiaries.is_empty() {
        return Err(ValidationError::NoBeneficiaries);
    }

    for beneficiary in &setup.beneficiaries {
        validate_beneficiary(beneficiary)?;
    }

    validate_percentage_total(&setup.beneficiaries)
}
