//! # DevOps Model
//!
//! This crate provides the records exchanged with a hosted project-management and
//! source-control platform (Azure DevOps / VSTS style REST API). It performs no I/O;
//! `devops-client` builds requests from these types and parses responses into them.
//!
//! ## Overview
//!
//! The devops-model crate handles:
//! - **Identities**: Resolved identities and the typed descriptors used to address them
//! - **SID derivation**: Collection-scoped well-known group descriptors
//! - **Licenses**: Account license tiers and their platform identifiers
//! - **Properties**: Project property bags and ordered patch documents
//! - **Projects, teams, repos**: Flat listing records and creation/import request bodies
//!
//! ## Architecture
//!
//! ```text
//! Identity ── Descriptor (type;identifier)
//!               └─ collection_group_descriptor(scope, well-known)
//! LicenseKind ── license_id()
//! PropertyMap ── PatchDocument ── [PatchOperation]
//! Project ── Team ── Member
//!    └─ Repo
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use devops_model::{PatchDocument, PropertyMap, ProjectProperties};
//!
//! let mut properties = PropertyMap::new();
//! properties.insert(ProjectProperties::COST_CODE.to_string(), "X123".to_string());
//!
//! let doc = PatchDocument::additions(&properties);
//! assert_eq!(doc.operations()[0].path, "/Cost Code");
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod envelope;
pub mod identity;
pub mod license;
pub mod project;
pub mod property;
pub mod repo;
pub mod team;

// Re-export main types for convenience
pub use envelope::ValueList;
pub use identity::{Descriptor, DescriptorError, Identity};
pub use license::{LicenseKind, UnknownLicense};
pub use project::{CreateProjectRequest, Project, StateFilter};
pub use property::{PatchDocument, PatchOp, PatchOperation, ProjectProperties, PropertyMap};
pub use repo::{ImportRequest, Repo, ServiceEndpointRequest};
pub use team::{Member, Team};
