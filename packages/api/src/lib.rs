//! Data Services Directory core.
//!
//! This crate implements the DSD side of the dataset discovery exchange:
//! resolving inbound REST query parameters, querying the directory search
//! API, and converting the directory's answer into a RegRep query response
//! with embedded dataset descriptions.
//!
//! # Example
//!
//! ```
//! use dsd_api::doctype::DoctypeId;
//!
//! let parts = DoctypeId::parse(
//!     "toop-doctypeid-qns::RegisteredOrganization::REGISTERED_ORGANIZATION_TYPE::CONCEPT##CCCEV::toop-edm:v2.1",
//! )
//! .unwrap();
//! assert!(parts.matches("REGISTERED_ORGANIZATION_TYPE"));
//! ```
//!
//! # Architecture
//!
//! - [`query`]: inbound parameter validation and typing
//! - [`doctype`]: compound doctype identifier parsing
//! - [`directory`]: outbound directory search client
//! - [`transform`]: directory-to-RegRep conversion
//! - [`dataset`]: dataset record extraction from RegRep responses
//! - [`pipeline`]: fetch → transform → extract orchestration
//! - [`error`]: error types and Result alias
//! - [`xml`]: XML navigation and writing helpers

pub mod dataset;
pub mod directory;
pub mod doctype;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod transform;
pub mod xml;

// Re-export commonly used items
pub use dataset::{parse_datasets, DatasetRecord};
pub use directory::{DirectoryClient, DirectoryClientConfig};
pub use doctype::DoctypeId;
pub use error::{DsdError, Result};
pub use pipeline::QueryPipeline;
pub use query::{Query, QueryKind};
pub use transform::{RegRepTransformer, TransformFilter};
