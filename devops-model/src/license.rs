//! Account license tiers
//!
//! This module defines the license kinds that can be assigned to a user when they
//! are added to an account, and the platform license identifiers they map to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a license name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown license kind: {0}")]
pub struct UnknownLicense(pub String);

/// Access tier assigned to a user's account entitlement.
///
/// # License Mapping
///
/// - **Stakeholder**: `Account-Stakeholder`
/// - **Basic**: `Account-Express` (the default, cheapest paid tier)
/// - **Professional**: `Account-Professional`
/// - **Advanced**: `Account-Advanced`
/// - **EligibleBySubscription**: `Msdn-Eligible`
///
/// # Examples
///
/// ```
/// use devops_model::LicenseKind;
///
/// assert_eq!(LicenseKind::default(), LicenseKind::Basic);
/// assert_eq!(LicenseKind::Basic.license_id(), "Account-Express");
/// assert_eq!(LicenseKind::parse_or_basic("gold"), LicenseKind::Basic);
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LicenseKind {
    /// Free, limited access for non-contributors
    Stakeholder,

    /// Standard paid access
    #[default]
    Basic,

    /// Professional tier
    Professional,

    /// Advanced tier
    Advanced,

    /// Access granted through an existing subscription
    EligibleBySubscription,
}

impl LicenseKind {
    /// All license kinds, cheapest first.
    pub const ALL: [LicenseKind; 5] = [
        LicenseKind::Stakeholder,
        LicenseKind::Basic,
        LicenseKind::Professional,
        LicenseKind::Advanced,
        LicenseKind::EligibleBySubscription,
    ];

    /// Get the platform license identifier for this kind.
    pub fn license_id(&self) -> &'static str {
        match self {
            LicenseKind::Stakeholder => "Account-Stakeholder",
            LicenseKind::Basic => "Account-Express",
            LicenseKind::Professional => "Account-Professional",
            LicenseKind::Advanced => "Account-Advanced",
            LicenseKind::EligibleBySubscription => "Msdn-Eligible",
        }
    }

    /// Get the short name used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            LicenseKind::Stakeholder => "stakeholder",
            LicenseKind::Basic => "basic",
            LicenseKind::Professional => "professional",
            LicenseKind::Advanced => "advanced",
            LicenseKind::EligibleBySubscription => "eligible_by_subscription",
        }
    }

    /// Parse a license name, falling back to [`LicenseKind::Basic`] when unrecognised.
    pub fn parse_or_basic(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for LicenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LicenseKind {
    type Err = UnknownLicense;

    /// Accepts short names, variant names and platform license ids, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "stakeholder" | "account_stakeholder" => Ok(LicenseKind::Stakeholder),
            "basic" | "express" | "account_express" => Ok(LicenseKind::Basic),
            "professional" | "account_professional" => Ok(LicenseKind::Professional),
            "advanced" | "account_advanced" => Ok(LicenseKind::Advanced),
            "eligible_by_subscription" | "eligiblebysubscription" | "msdn" | "msdn_eligible" => {
                Ok(LicenseKind::EligibleBySubscription)
            }
            _ => Err(UnknownLicense(s.to_string())),
        }
    }
}
