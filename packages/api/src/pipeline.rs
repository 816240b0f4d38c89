//! The fetch → transform → extract pipeline behind the search endpoint.

use crate::dataset::{parse_datasets, DatasetRecord};
use crate::directory::DirectoryClient;
use crate::error::Result;
use crate::query::{
    Query, QueryKind, PARAM_COUNTRY_CODE, PARAM_DATA_PROVIDER_TYPE, PARAM_DATA_SET_TYPE,
};
use crate::transform::{RegRepTransformer, TransformFilter};

/// Directory result used to warm the transformer at startup.
const WARM_UP_SAMPLE: &str = r#"<resultlist version="1" total-result-count="1" used-result-count="1">
  <match>
    <participantID scheme="iso6523-actorid-upis">9999:sample</participantID>
    <docTypeID scheme="toop-doctypeid-qns">FinancialRatioDocument::FINANCIAL_RECORD_TYPE::UNSTRUCTURED::toop-edm:v2.1</docTypeID>
    <entity>
      <name>Sample Provider</name>
      <countryCode>SV</countryCode>
    </entity>
  </match>
</resultlist>"#;

/// Executes resolved queries against the directory and converts the
/// results into RegRep response documents.
///
/// Stages run in a fixed order with no retries; the first failing stage
/// aborts the run and its error is surfaced to the caller.
pub struct QueryPipeline {
    directory: DirectoryClient,
    transformer: RegRepTransformer,
}

impl QueryPipeline {
    pub fn new(directory: DirectoryClient) -> Self {
        Self {
            directory,
            transformer: RegRepTransformer::new(),
        }
    }

    /// Run fetch and transform for a resolved query and return the RegRep
    /// response document.
    pub async fn execute(&self, query: &Query) -> Result<String> {
        let dataset_type = query.require_parameter(PARAM_DATA_SET_TYPE)?;

        match query.kind() {
            QueryKind::ByDatasetTypeAndLocation => {
                let country_code = query.parameter(PARAM_COUNTRY_CODE);
                tracing::debug!(
                    dataset_type,
                    country_code,
                    "processing dataset request by location"
                );

                let directory_result = self.directory.search_by_country(country_code).await?;
                let transform_filter = TransformFilter {
                    dataset_type: Some(dataset_type.to_string()),
                    country_code: country_code.map(str::to_string),
                    dp_type: None,
                };
                self.transformer.transform(&directory_result, &transform_filter)
            }
            QueryKind::ByDatasetTypeAndDpType => {
                let dp_type = query.require_parameter(PARAM_DATA_PROVIDER_TYPE)?;
                tracing::debug!(
                    dataset_type,
                    dp_type,
                    "processing dataset request by provider type"
                );

                let directory_result = self.directory.search_by_dp_type(dp_type).await?;
                let transform_filter = TransformFilter {
                    dataset_type: Some(dataset_type.to_string()),
                    country_code: None,
                    dp_type: Some(dp_type.to_string()),
                };
                self.transformer.transform(&directory_result, &transform_filter)
            }
        }
    }

    /// Like [`QueryPipeline::execute`], additionally extracting the
    /// embedded dataset records. `None` means the transform output was not
    /// a valid query response, which is distinct from an empty result.
    pub async fn execute_with_datasets(&self, query: &Query) -> Result<Option<Vec<DatasetRecord>>> {
        let regrep = self.execute(query).await?;
        Ok(parse_datasets(&regrep))
    }

    /// Run a throwaway transform so the first real request does not pay
    /// first-use costs.
    pub fn warm_up(&self) {
        tracing::info!("running transformer warm-up");
        let transform_filter = TransformFilter {
            dataset_type: Some("FINANCIAL_RECORD_TYPE".to_string()),
            country_code: Some("SV".to_string()),
            dp_type: None,
        };
        match self.transformer.transform(WARM_UP_SAMPLE, &transform_filter) {
            Ok(_) => tracing::info!("transformer warm-up finished"),
            Err(error) => tracing::warn!(error = %error, "transformer warm-up failed"),
        }
    }
}
