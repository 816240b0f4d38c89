//! Inbound DSD query resolution.
//!
//! An inbound request arrives as a multi-valued parameter map (a raw query
//! string allows repeated keys). [`Query::resolve`] validates that map
//! against the per-kind requirements and flattens it into an immutable,
//! single-valued [`Query`]. An invalid map never produces a `Query`.

use std::collections::HashMap;

use crate::error::{DsdError, Result};

/// Parameter name for the query identifier URN.
pub const PARAM_QUERY_ID: &str = "queryId";
/// Parameter name for the dataset type.
pub const PARAM_DATA_SET_TYPE: &str = "dataSetType";
/// Parameter name for the data provider type.
pub const PARAM_DATA_PROVIDER_TYPE: &str = "dataProviderType";
/// Parameter name for the two-letter country code.
pub const PARAM_COUNTRY_CODE: &str = "countryCode";

/// The two supported DSD query kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Query datasets by dataset type and data provider type.
    ByDatasetTypeAndDpType,
    /// Query datasets by dataset type and location.
    ByDatasetTypeAndLocation,
}

impl QueryKind {
    /// URN identifying the dataset-type/provider-type query.
    pub const BY_DATASET_TYPE_AND_DP_TYPE_ID: &'static str =
        "urn:toop:dsd:ebxml-regrem:queries:ByDatasetTypeAndDPType";
    /// URN identifying the dataset-type/location query.
    pub const BY_DATASET_TYPE_AND_LOCATION_ID: &'static str =
        "urn:toop:dsd:ebxml-regrem:queries:ByDatasetTypeAndLocation";

    /// Look up a query kind by its URN.
    pub fn from_id(query_id: &str) -> Result<Self> {
        match query_id {
            Self::BY_DATASET_TYPE_AND_DP_TYPE_ID => Ok(Self::ByDatasetTypeAndDpType),
            Self::BY_DATASET_TYPE_AND_LOCATION_ID => Ok(Self::ByDatasetTypeAndLocation),
            other => Err(DsdError::UnknownQueryKind(other.to_string())),
        }
    }

    /// The URN of this query kind.
    pub fn id(self) -> &'static str {
        match self {
            Self::ByDatasetTypeAndDpType => Self::BY_DATASET_TYPE_AND_DP_TYPE_ID,
            Self::ByDatasetTypeAndLocation => Self::BY_DATASET_TYPE_AND_LOCATION_ID,
        }
    }

    /// Parameters that must be present for this query kind.
    ///
    /// countryCode is deliberately absent from the location row: it is
    /// optional for that kind.
    fn required_parameters(self) -> &'static [&'static str] {
        match self {
            Self::ByDatasetTypeAndDpType => {
                &[PARAM_QUERY_ID, PARAM_DATA_SET_TYPE, PARAM_DATA_PROVIDER_TYPE]
            }
            Self::ByDatasetTypeAndLocation => &[PARAM_QUERY_ID, PARAM_DATA_SET_TYPE],
        }
    }
}

/// A resolved, validated DSD query.
///
/// Holds the resolved [`QueryKind`] and the parameter map flattened to
/// single values. Construct only through [`Query::resolve`].
#[derive(Debug, Clone)]
pub struct Query {
    kind: QueryKind,
    parameters: HashMap<String, String>,
}

impl Query {
    /// Resolve a raw multi-valued parameter map into a typed query.
    ///
    /// # Errors
    /// * [`DsdError::UnknownQueryKind`] if the queryId value is not one of
    ///   the supported URNs
    /// * [`DsdError::InvalidQuery`] if queryId is missing, a required
    ///   parameter for the resolved kind is missing, or any key carries a
    ///   value count other than one
    pub fn resolve(parameter_map: &HashMap<String, Vec<String>>) -> Result<Self> {
        let query_id_values = parameter_map
            .get(PARAM_QUERY_ID)
            .ok_or_else(|| DsdError::InvalidQuery("missing queryId parameter".to_string()))?;
        if query_id_values.len() != 1 {
            return Err(DsdError::InvalidQuery(format!(
                "queryId must carry exactly one value, got {}",
                query_id_values.len()
            )));
        }

        let kind = QueryKind::from_id(&query_id_values[0])?;

        for required in kind.required_parameters() {
            if !parameter_map.contains_key(*required) {
                return Err(DsdError::InvalidQuery(format!(
                    "missing required parameter {required}"
                )));
            }
        }

        // Flatten to single values. Every key must carry exactly one value,
        // even keys irrelevant to the resolved kind.
        let mut parameters = HashMap::with_capacity(parameter_map.len());
        for (name, values) in parameter_map {
            if values.len() != 1 {
                return Err(DsdError::InvalidQuery(format!(
                    "parameter {name} must carry exactly one value, got {}",
                    values.len()
                )));
            }
            parameters.insert(name.clone(), values[0].clone());
        }

        Ok(Query { kind, parameters })
    }

    /// The resolved query kind.
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Get the value of the given parameter, or `None` if absent.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Get the value of a parameter known to be required for the resolved
    /// kind; fails on absence instead of forcing callers to re-validate.
    pub fn require_parameter(&self, name: &str) -> Result<&str> {
        self.parameter(name)
            .ok_or_else(|| DsdError::InvalidQuery(format!("No parameter value for {name}")))
    }
}
