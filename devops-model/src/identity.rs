//! Identity records and descriptor helpers
//!
//! This module provides the `Identity` record returned by identity lookups and the
//! `Descriptor` type the platform uses to address identities and groups in
//! membership calls. It also holds the SID arithmetic needed to turn a well-known
//! group into its collection-scoped counterpart when provisioning bind-pending users.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Identity type for SID-addressed users and groups.
pub const TEAM_FOUNDATION_TYPE: &str = "Microsoft.TeamFoundation.Identity";

/// Identity type for provisional users recorded only by email.
pub const BIND_PENDING_TYPE: &str = "Microsoft.TeamFoundation.BindPendingIdentity";

/// Prefix shared by every SID the platform issues.
pub const TEAM_FOUNDATION_SID_PREFIX: &str = "S-1-9-1551374245-";

/// Prefix of well-known (built-in) group SIDs.
pub const WELL_KNOWN_SID_PREFIX: &str = "S-1-9-1551374245-0-0-0-0-";

/// Marker inserted between a domain SID and a well-known group's relative id.
pub const WELL_KNOWN_SID_TYPE: &str = "-0-0-0-0-";

/// SID of the built-in "licensed users" group.
pub const LICENSED_USERS_GROUP_SID: &str = "S-1-9-1551374245-0-0-0-0-4";

/// Directory used for bind-pending users when the caller is a Microsoft account.
pub const DEFAULT_DIRECTORY: &str = "Windows Live ID";

/// Errors raised while parsing or deriving descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Wire form did not contain the `type;identifier` separator.
    #[error("Descriptor is missing the type separator: {0}")]
    MissingSeparator(String),

    /// Identifier did not carry the prefix required by the derivation.
    #[error("Identifier {identifier} does not start with {expected}")]
    UnexpectedPrefix {
        /// The offending identifier.
        identifier: String,
        /// The prefix that was expected.
        expected: &'static str,
    },
}

/// An opaque typed reference to an identity or group.
///
/// Descriptors travel on the wire as `"{identity_type};{identifier}"`. They are
/// distinct from an identity's `id` and are what group-membership calls expect.
///
/// # Examples
///
/// ```
/// use devops_model::Descriptor;
///
/// let descriptor: Descriptor = "Microsoft.TeamFoundation.Identity;S-1-9-1551374245-1".parse().unwrap();
/// assert!(descriptor.is_team_foundation());
/// assert_eq!(descriptor.to_string(), "Microsoft.TeamFoundation.Identity;S-1-9-1551374245-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Descriptor {
    /// Identity type tag
    pub identity_type: String,

    /// Type-specific identifier (a SID, a UPN, a claims name...)
    pub identifier: String,
}

impl Descriptor {
    /// Creates a descriptor from its two parts.
    pub fn new(identity_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            identity_type: identity_type.into(),
            identifier: identifier.into(),
        }
    }

    /// Creates a SID-based group or user descriptor.
    pub fn team_foundation(sid: impl Into<String>) -> Self {
        Self::new(TEAM_FOUNDATION_TYPE, sid)
    }

    /// The built-in licensed users group, before collection scoping.
    pub fn licensed_users_group() -> Self {
        Self::team_foundation(LICENSED_USERS_GROUP_SID)
    }

    /// Creates the provisional descriptor for a user who has never signed in.
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory of the caller, see [`directory_of`]
    /// * `email` - Email address the bind-pending user will sign in with
    pub fn bind_pending(directory: &str, email: &str) -> Self {
        Self::new(BIND_PENDING_TYPE, bind_pending_upn(directory, email))
    }

    /// Check whether this descriptor is SID-based.
    pub fn is_team_foundation(&self) -> bool {
        self.identity_type == TEAM_FOUNDATION_TYPE
    }

    /// Check whether this descriptor refers to a bind-pending user.
    pub fn is_bind_pending(&self) -> bool {
        self.identity_type == BIND_PENDING_TYPE
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.identity_type, self.identifier)
    }
}

impl FromStr for Descriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(';') {
            Some((identity_type, identifier)) if !identity_type.is_empty() => {
                Ok(Self::new(identity_type, identifier))
            }
            _ => Err(DescriptorError::MissingSeparator(s.to_string())),
        }
    }
}

impl TryFrom<String> for Descriptor {
    type Error = DescriptorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Descriptor> for String {
    fn from(descriptor: Descriptor) -> Self {
        descriptor.to_string()
    }
}

/// A resolved platform identity.
///
/// Identities are read-only snapshots: they are produced by a lookup (or by the
/// lookup that follows provisioning) and never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Platform id (a GUID string)
    pub id: String,

    /// Human-readable name
    pub display_name: String,

    /// Account name, normally the user's email
    pub unique_name: String,

    /// Descriptor used to address this identity in membership calls
    pub descriptor: Descriptor,

    /// Avatar URL, when the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Identity {
    /// Check whether this identity is still waiting for its first sign-in.
    pub fn is_bind_pending(&self) -> bool {
        self.descriptor.is_bind_pending()
    }
}

/// Render a collection scope id as a domain SID.
///
/// The GUID is laid out in its little-endian (mixed-endian) byte order and read
/// back as four unsigned 32-bit integers.
///
/// # Examples
///
/// ```
/// use devops_model::identity::domain_sid;
/// use uuid::Uuid;
///
/// let scope = Uuid::parse_str("00000001-0000-0000-0000-000000000000").unwrap();
/// assert_eq!(domain_sid(&scope), "S-1-9-1551374245-1-0-0-0");
/// ```
pub fn domain_sid(scope_id: &Uuid) -> String {
    let bytes = scope_id.to_bytes_le();
    let parts: Vec<String> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]).to_string())
        .collect();
    format!("{}{}", TEAM_FOUNDATION_SID_PREFIX, parts.join("-"))
}

/// Derive the collection-scoped SID of a well-known group.
///
/// The result is the scope's domain SID, the well-known marker, and the well-known
/// identifier with its [`WELL_KNOWN_SID_PREFIX`] removed, concatenated in that order.
pub fn collection_group_identifier(
    scope_id: &Uuid,
    well_known: &Descriptor,
) -> Result<String, DescriptorError> {
    let suffix = well_known
        .identifier
        .strip_prefix(WELL_KNOWN_SID_PREFIX)
        .ok_or_else(|| DescriptorError::UnexpectedPrefix {
            identifier: well_known.identifier.clone(),
            expected: WELL_KNOWN_SID_PREFIX,
        })?;

    Ok(format!("{}{}{}", domain_sid(scope_id), WELL_KNOWN_SID_TYPE, suffix))
}

/// Derive the collection-scoped descriptor of a well-known group.
pub fn collection_group_descriptor(
    scope_id: &Uuid,
    well_known: &Descriptor,
) -> Result<Descriptor, DescriptorError> {
    let identifier = collection_group_identifier(scope_id, well_known)?;
    Ok(Descriptor::new(well_known.identity_type.clone(), identifier))
}

/// Extract the directory from a caller's descriptor identifier.
///
/// Directory-backed accounts identify users as `domain\email`; anything without a
/// backslash is treated as a Microsoft account.
pub fn directory_of(identifier: &str) -> &str {
    match identifier.split_once('\\') {
        Some((domain, _)) => domain,
        None => DEFAULT_DIRECTORY,
    }
}

/// Format the UPN a bind-pending user is recorded under.
pub fn bind_pending_upn(directory: &str, email: &str) -> String {
    format!("upn:{}\\{}", directory, email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_round_trip() {
        let descriptor: Descriptor = "Microsoft.TeamFoundation.Identity;S-1-9-1551374245-0-0-0-0-4"
            .parse()
            .unwrap();

        assert_eq!(descriptor, Descriptor::licensed_users_group());
        assert_eq!(
            descriptor.to_string(),
            "Microsoft.TeamFoundation.Identity;S-1-9-1551374245-0-0-0-0-4"
        );
    }

    #[test]
    fn test_descriptor_keeps_semicolons_in_identifier() {
        let descriptor: Descriptor = "Custom.Type;a;b".parse().unwrap();
        assert_eq!(descriptor.identity_type, "Custom.Type");
        assert_eq!(descriptor.identifier, "a;b");
    }

    #[test]
    fn test_descriptor_without_separator_is_rejected() {
        let err = "no-separator".parse::<Descriptor>().unwrap_err();
        assert_eq!(err, DescriptorError::MissingSeparator("no-separator".to_string()));

        assert!(";identifier".parse::<Descriptor>().is_err());
    }

    #[test]
    fn test_descriptor_serde_uses_wire_form() {
        let descriptor = Descriptor::team_foundation("S-1-9-1551374245-7");
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json, serde_json::json!("Microsoft.TeamFoundation.Identity;S-1-9-1551374245-7"));

        let back: Descriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, descriptor);

        assert!(serde_json::from_value::<Descriptor>(serde_json::json!("broken")).is_err());
    }

    #[test]
    fn test_domain_sid_fixtures() {
        let scope = Uuid::parse_str("01020304-0506-0708-090a-0b0c0d0e0f10").unwrap();
        assert_eq!(
            domain_sid(&scope),
            "S-1-9-1551374245-16909060-117966086-202050057-269422093"
        );

        let scope = Uuid::parse_str("d81542e4-cdfa-4333-b082-1ae2d6c3ad16").unwrap();
        assert_eq!(
            domain_sid(&scope),
            "S-1-9-1551374245-3625272036-1127468538-3793388208-380486614"
        );

        assert_eq!(domain_sid(&Uuid::nil()), "S-1-9-1551374245-0-0-0-0");
    }

    #[test]
    fn test_collection_licensed_users_group() {
        let scope = Uuid::parse_str("d81542e4-cdfa-4333-b082-1ae2d6c3ad16").unwrap();
        let descriptor =
            collection_group_descriptor(&scope, &Descriptor::licensed_users_group()).unwrap();

        assert!(descriptor.is_team_foundation());
        assert_eq!(
            descriptor.identifier,
            "S-1-9-1551374245-3625272036-1127468538-3793388208-380486614-0-0-0-0-4"
        );
    }

    #[test]
    fn test_collection_group_requires_well_known_prefix() {
        let scope = Uuid::nil();
        let not_well_known = Descriptor::team_foundation("S-1-9-1551374245-12-34");

        let err = collection_group_identifier(&scope, &not_well_known).unwrap_err();
        assert!(matches!(err, DescriptorError::UnexpectedPrefix { .. }));
    }

    #[test]
    fn test_directory_of() {
        assert_eq!(directory_of("admin@contoso.com"), DEFAULT_DIRECTORY);
        assert_eq!(
            directory_of("72f988bf-86f1-41af-91ab-2d7cd011db47\\admin@contoso.com"),
            "72f988bf-86f1-41af-91ab-2d7cd011db47"
        );
        assert_eq!(directory_of("first\\second\\third"), "first");
    }

    #[test]
    fn test_bind_pending_descriptor() {
        let descriptor = Descriptor::bind_pending(DEFAULT_DIRECTORY, "new.user@example.com");

        assert!(descriptor.is_bind_pending());
        assert_eq!(descriptor.identifier, "upn:Windows Live ID\\new.user@example.com");
        assert_eq!(
            descriptor.to_string(),
            "Microsoft.TeamFoundation.BindPendingIdentity;upn:Windows Live ID\\new.user@example.com"
        );
    }
}
