//! Router and handlers for the DSD REST query endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use dsd_api::error::DsdError;
use dsd_api::pipeline::QueryPipeline;
use dsd_api::query::Query;

/// Body sent when an error carries no displayable message.
const UNKNOWN_ERROR: &str = "UNKNOWN ERROR";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rest/search", get(search))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Handle one DSD REST query.
///
/// Works on the raw query string rather than a deserialized struct:
/// repeated keys must stay visible so the resolver can reject them.
async fn search(State(state): State<AppState>, RawQuery(raw_query): RawQuery) -> Response {
    let parameter_map = parse_parameter_map(raw_query.as_deref().unwrap_or(""));

    match process(&state, &parameter_map).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/xml")], body).into_response(),
        Err(error) => {
            tracing::error!(error = %error, "search request failed");
            let status = if error.is_user_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let mut message = error.to_string();
            if message.is_empty() {
                message = UNKNOWN_ERROR.to_string();
            }
            (status, [(header::CONTENT_TYPE, "text/plain")], message).into_response()
        }
    }
}

async fn process(
    state: &AppState,
    parameter_map: &HashMap<String, Vec<String>>,
) -> dsd_api::Result<String> {
    if parameter_map.is_empty() {
        return Err(DsdError::InvalidQuery(
            "parameter map cannot be empty".to_string(),
        ));
    }

    let query = Query::resolve(parameter_map)?;
    state.pipeline.execute(&query).await
}

/// Fold a raw query string into a multi-valued parameter map.
fn parse_parameter_map(raw_query: &str) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        map.entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_parameter_map_keeps_repeated_keys() {
        let map = parse_parameter_map("a=1&b=2&a=3");
        assert_eq!(map["a"], vec!["1".to_string(), "3".to_string()]);
        assert_eq!(map["b"], vec!["2".to_string()]);
    }

    #[test]
    fn test_parse_parameter_map_decodes_values() {
        let map = parse_parameter_map(
            "queryId=urn%3Atoop%3Adsd%3Aebxml-regrem%3Aqueries%3AByDatasetTypeAndLocation",
        );
        assert_eq!(
            map["queryId"],
            vec!["urn:toop:dsd:ebxml-regrem:queries:ByDatasetTypeAndLocation".to_string()]
        );
    }

    #[test]
    fn test_parse_parameter_map_empty() {
        assert!(parse_parameter_map("").is_empty());
    }
}
