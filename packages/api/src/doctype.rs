//! Compound doctype identifier parsing.
//!
//! Directory records carry a flat doctype identifier string in one of two
//! incompatible historical layouts. The legacy three-token layout:
//!
//! `urn:eu:toop:ns:dataexchange-1p40::Request##urn:eu.toop.request.registeredorganization::1.40`
//!
//! and the current four-token layout:
//!
//! `RegisteredOrganization::REGISTERED_ORGANIZATION_TYPE::CONCEPT##CCCEV::toop-edm:v2.1`
//!
//! Both may carry an optional leading `toop-doctypeid-qns::` scheme prefix.

use std::fmt;

use crate::error::{DsdError, Result};

/// Identifier scheme that may prefix a doctype identifier string.
pub const DOCTYPE_SCHEME: &str = "toop-doctypeid-qns";

/// Delimiter between the tokens of the compound identifier.
const DELIMITER: &str = "::";
/// Sub-delimiter splitting a token into a value and its conformance part.
const SUB_DELIMITER: &str = "##";

/// A parsed doctype identifier in one of the two supported layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoctypeId {
    /// The legacy three-token layout:
    /// `{namespaceURI}::{localElementName}##{customizationId}::{version}`
    Legacy {
        namespace_uri: String,
        local_element_name: String,
        customization_id: String,
        version: String,
    },
    /// The current four-token layout:
    /// `{datasetIdentifier}::{datasetType}::{distributionFormat}[##{distributionConformsTo}]::{conformsTo}`
    Current {
        dataset_identifier: String,
        dataset_type: String,
        distribution_format: String,
        distribution_conforms_to: Option<String>,
        conforms_to: String,
    },
}

impl DoctypeId {
    /// Parse a flat doctype identifier string.
    ///
    /// A leading `toop-doctypeid-qns::` scheme prefix is stripped before
    /// splitting. A three-token remainder parses as [`DoctypeId::Legacy`],
    /// a four-token remainder as [`DoctypeId::Current`].
    ///
    /// # Errors
    /// [`DsdError::DoctypeFormat`] on any other token count, or when the
    /// legacy middle token lacks the `##` sub-delimiter.
    pub fn parse(identifier: &str) -> Result<Self> {
        let rest = identifier
            .strip_prefix(DOCTYPE_SCHEME)
            .and_then(|r| r.strip_prefix(DELIMITER))
            .unwrap_or(identifier);

        let tokens: Vec<&str> = rest.split(DELIMITER).collect();
        match tokens.as_slice() {
            [namespace_uri, middle, version] => {
                // the middle token must split into element name and
                // customization id
                let (local_element_name, customization_id) = middle
                    .split_once(SUB_DELIMITER)
                    .ok_or_else(|| DsdError::DoctypeFormat(identifier.to_string()))?;
                Ok(DoctypeId::Legacy {
                    namespace_uri: namespace_uri.to_string(),
                    local_element_name: local_element_name.to_string(),
                    customization_id: customization_id.to_string(),
                    version: version.to_string(),
                })
            }
            [dataset_identifier, dataset_type, distribution, conforms_to] => {
                let (distribution_format, distribution_conforms_to) =
                    match distribution.split_once(SUB_DELIMITER) {
                        Some((format, conforms)) => {
                            (format.to_string(), Some(conforms.to_string()))
                        }
                        None => (distribution.to_string(), None),
                    };
                Ok(DoctypeId::Current {
                    dataset_identifier: dataset_identifier.to_string(),
                    dataset_type: dataset_type.to_string(),
                    distribution_format,
                    distribution_conforms_to,
                    conforms_to: conforms_to.to_string(),
                })
            }
            _ => Err(DsdError::DoctypeFormat(identifier.to_string())),
        }
    }

    /// Check this doctype against a dataset type.
    ///
    /// The two layouts match differently and the asymmetry is part of the
    /// contract: the legacy layout does a case- and underscore-insensitive
    /// containment check against its customization id, the current layout
    /// requires exact equality.
    pub fn matches(&self, dataset_type: &str) -> bool {
        match self {
            DoctypeId::Legacy {
                customization_id, ..
            } => {
                let haystack = customization_id.replace('_', "").to_lowercase();
                let needle = dataset_type.replace('_', "").to_lowercase();
                haystack.contains(&needle)
            }
            DoctypeId::Current {
                dataset_type: own, ..
            } => own == dataset_type,
        }
    }

    /// The dataset identifier.
    ///
    /// Derived for the legacy layout as `{namespaceURI}::{localElementName}`.
    pub fn dataset_identifier(&self) -> String {
        match self {
            DoctypeId::Legacy {
                namespace_uri,
                local_element_name,
                ..
            } => format!("{namespace_uri}{DELIMITER}{local_element_name}"),
            DoctypeId::Current {
                dataset_identifier, ..
            } => dataset_identifier.clone(),
        }
    }

    /// The dataset type. The legacy layout has none of its own; its
    /// namespace URI is the stand-in.
    pub fn dataset_type(&self) -> &str {
        match self {
            DoctypeId::Legacy { namespace_uri, .. } => namespace_uri,
            DoctypeId::Current { dataset_type, .. } => dataset_type,
        }
    }

    /// The distribution format.
    pub fn distribution_format(&self) -> &str {
        match self {
            DoctypeId::Legacy {
                local_element_name, ..
            } => local_element_name,
            DoctypeId::Current {
                distribution_format,
                ..
            } => distribution_format,
        }
    }

    /// The conformance profile of the distribution, if any.
    pub fn distribution_conforms_to(&self) -> Option<&str> {
        match self {
            DoctypeId::Legacy {
                customization_id, ..
            } => Some(customization_id),
            DoctypeId::Current {
                distribution_conforms_to,
                ..
            } => distribution_conforms_to.as_deref(),
        }
    }

    /// The conformance profile of the doctype. Maps the legacy version
    /// field; that mapping is tentative and kept as-is because
    /// [`DoctypeId::matches`] callers depend on it.
    pub fn conforms_to(&self) -> &str {
        match self {
            DoctypeId::Legacy { version, .. } => version,
            DoctypeId::Current { conforms_to, .. } => conforms_to,
        }
    }
}

impl fmt::Display for DoctypeId {
    /// Writes the identifier in its wire layout, without the scheme
    /// prefix. Legacy derived accessors are lossy, but Display recomposes
    /// from the stored fields and round-trips.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoctypeId::Legacy {
                namespace_uri,
                local_element_name,
                customization_id,
                version,
            } => write!(
                f,
                "{namespace_uri}::{local_element_name}##{customization_id}::{version}"
            ),
            DoctypeId::Current {
                dataset_identifier,
                dataset_type,
                distribution_format,
                distribution_conforms_to,
                conforms_to,
            } => {
                write!(f, "{dataset_identifier}::{dataset_type}::{distribution_format}")?;
                if let Some(conforms) = distribution_conforms_to {
                    write!(f, "##{conforms}")?;
                }
                write!(f, "::{conforms_to}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_current() {
        let parts = DoctypeId::parse(
            "toop-doctypeid-qns::RegisteredOrganization::REGISTERED_ORGANIZATION_TYPE::CONCEPT##CCCEV::toop-edm:v2.1",
        )
        .unwrap();

        assert_eq!(parts.dataset_identifier(), "RegisteredOrganization");
        assert_eq!(parts.dataset_type(), "REGISTERED_ORGANIZATION_TYPE");
        assert_eq!(parts.distribution_format(), "CONCEPT");
        assert_eq!(parts.distribution_conforms_to(), Some("CCCEV"));
        assert_eq!(parts.conforms_to(), "toop-edm:v2.1");
    }

    #[test]
    fn test_parse_current_without_distribution_conformance() {
        let parts = DoctypeId::parse(
            "toop-doctypeid-qns::FinancialRatioDocument::FINANCIAL_RECORD_TYPE::UNSTRUCTURED::toop-edm:v2.1",
        )
        .unwrap();

        assert_eq!(parts.distribution_format(), "UNSTRUCTURED");
        assert_eq!(parts.distribution_conforms_to(), None);
    }

    #[test]
    fn test_parse_legacy() {
        let parts = DoctypeId::parse(
            "toop-doctypeid-qns::urn:eu:toop:ns:dataexchange-1p40::Request##urn:eu.toop.request.registeredorganization::1.40",
        )
        .unwrap();

        assert_eq!(parts.dataset_type(), "urn:eu:toop:ns:dataexchange-1p40");
        assert_eq!(parts.distribution_format(), "Request");
        assert_eq!(
            parts.distribution_conforms_to(),
            Some("urn:eu.toop.request.registeredorganization")
        );
        assert_eq!(parts.conforms_to(), "1.40");
        assert_eq!(
            parts.dataset_identifier(),
            "urn:eu:toop:ns:dataexchange-1p40::Request"
        );
    }

    #[test]
    fn test_parse_without_scheme_prefix() {
        let parts =
            DoctypeId::parse("RegisteredOrganization::REGISTERED_ORGANIZATION_TYPE::CONCEPT##CCCEV::toop-edm:v2.1")
                .unwrap();
        assert_eq!(parts.dataset_type(), "REGISTERED_ORGANIZATION_TYPE");
    }

    #[test]
    fn test_parse_legacy_without_sub_delimiter_fails() {
        let result =
            DoctypeId::parse("urn:eu:toop:ns:dataexchange-1p40::Request::1.40");
        assert!(matches!(result, Err(DsdError::DoctypeFormat(_))));
    }

    #[test]
    fn test_parse_wrong_token_count_fails() {
        for identifier in [
            "justonetoken",
            "two::tokens",
            "toop-doctypeid-qns::two::tokens",
            "a::b::c::d::e",
            "toop-doctypeid-qns::a::b::c::d::e",
        ] {
            let result = DoctypeId::parse(identifier);
            assert!(
                matches!(result, Err(DsdError::DoctypeFormat(_))),
                "expected format error for {identifier}"
            );
        }
    }

    #[test]
    fn test_matches_current_is_exact() {
        let parts = DoctypeId::parse(
            "RegisteredOrganization::REGISTERED_ORGANIZATION_TYPE::CONCEPT##CCCEV::toop-edm:v2.1",
        )
        .unwrap();

        assert!(parts.matches("REGISTERED_ORGANIZATION_TYPE"));
        assert!(!parts.matches("registered_organization_type"));
        assert!(!parts.matches("REGISTERED_ORGANIZATION"));
    }

    #[test]
    fn test_matches_legacy_is_containment() {
        let parts = DoctypeId::parse(
            "urn:eu:toop:ns:dataexchange-1p40::Request##urn:eu.toop.request.registeredorganization::1.40",
        )
        .unwrap();

        // case- and underscore-insensitive containment
        assert!(parts.matches("REGISTERED_ORGANIZATION"));
        assert!(parts.matches("RegisteredOrganization"));
        assert!(parts.matches("registeredorganization"));
        assert!(!parts.matches("FINANCIAL_RECORD"));
    }

    #[test]
    fn test_display_round_trip() {
        for identifier in [
            "RegisteredOrganization::REGISTERED_ORGANIZATION_TYPE::CONCEPT##CCCEV::toop-edm:v2.1",
            "FinancialRatioDocument::FINANCIAL_RECORD_TYPE::UNSTRUCTURED::toop-edm:v2.1",
            "urn:eu:toop:ns:dataexchange-1p40::Request##urn:eu.toop.request.registeredorganization::1.40",
        ] {
            let parts = DoctypeId::parse(identifier).unwrap();
            assert_eq!(parts.to_string(), identifier);
        }
    }
}
