//! Directory-to-RegRep transformation.
//!
//! One [`RegRepTransformer`] is created at startup and shared by every
//! request. The engine keeps its named filter parameters as call-scoped
//! state, so a run is clear parameters → set parameters → transform; the
//! mutex makes that sequence atomic with respect to concurrent callers.
//! Without it, one request's filter values would bleed into another
//! request's output.

use std::collections::HashMap;
use std::sync::Mutex;

use roxmltree::{Document, Node};

use crate::dataset::DATASET_SLOT_NAME;
use crate::directory::DP_TYPE_IDENTIFIER_SCHEME;
use crate::doctype::DoctypeId;
use crate::error::{DsdError, Result};
use crate::xml::{child_text, find_child, find_children, local_name, text_of, XmlWriter};

/// Named parameter: dataset type filter.
pub const PARAM_DATASET_TYPE: &str = "datasetType";
/// Named parameter: country code filter.
pub const PARAM_COUNTRY_CODE: &str = "countryCode";
/// Named parameter: data provider type filter.
pub const PARAM_DP_TYPE: &str = "dpType";

const NS_QUERY: &str = "urn:oasis:names:tc:ebxml-regrep:xsd:query:4.0";
const NS_RIM: &str = "urn:oasis:names:tc:ebxml-regrep:xsd:rim:4.0";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
const NS_DCAT: &str = "http://data.europa.eu/r5r/";
const NS_DCT: &str = "http://purl.org/dc/terms/";
const NS_CAGV: &str = "https://semic.org/sa/cv/cagv/agent-2.0.0#";
const NS_CBC: &str = "https://semic.org/sa/cv/common/cbc-2.0.0#";
const NS_LOCN: &str = "http://www.w3.org/ns/locn#";

const STATUS_SUCCESS: &str = "urn:oasis:names:tc:ebxml-regrep:ResponseStatusType:Success";

/// Filter parameters for one transformation run. Only the values that are
/// set are applied.
#[derive(Debug, Clone, Default)]
pub struct TransformFilter {
    pub dataset_type: Option<String>,
    pub country_code: Option<String>,
    pub dp_type: Option<String>,
}

/// Shared directory-to-RegRep transformation engine.
pub struct RegRepTransformer {
    engine: Mutex<TransformEngine>,
}

impl RegRepTransformer {
    pub fn new() -> Self {
        Self {
            engine: Mutex::new(TransformEngine {
                parameters: HashMap::new(),
            }),
        }
    }

    /// Transform a raw directory search result into a RegRep query
    /// response document.
    ///
    /// # Errors
    /// * [`DsdError::XmlParse`] when `directory_xml` is not well-formed
    /// * [`DsdError::Transform`] when the document is not a directory
    ///   result list
    pub fn transform(&self, directory_xml: &str, filter: &TransformFilter) -> Result<String> {
        // clear → set → run must not interleave with another caller's
        // sequence on the same engine
        let mut engine = self
            .engine
            .lock()
            .map_err(|_| DsdError::Transform("transformer lock poisoned".to_string()))?;

        engine.clear_parameters();
        if let Some(value) = &filter.dataset_type {
            engine.set_parameter(PARAM_DATASET_TYPE, value);
        }
        if let Some(value) = &filter.country_code {
            engine.set_parameter(PARAM_COUNTRY_CODE, value);
        }
        if let Some(value) = &filter.dp_type {
            engine.set_parameter(PARAM_DP_TYPE, value);
        }

        engine.run(directory_xml)
    }
}

impl Default for RegRepTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// One dataset selected for the output document.
struct DatasetEntry {
    participant_id: String,
    participant_scheme: Option<String>,
    entity_name: Option<String>,
    entity_country: Option<String>,
    website: Option<String>,
    doctype: DoctypeId,
}

struct TransformEngine {
    parameters: HashMap<&'static str, String>,
}

impl TransformEngine {
    fn clear_parameters(&mut self) {
        self.parameters.clear();
    }

    fn set_parameter(&mut self, name: &'static str, value: &str) {
        self.parameters.insert(name, value.to_string());
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    fn run(&self, directory_xml: &str) -> Result<String> {
        let doc = Document::parse(directory_xml)?;
        let root = doc.root_element();
        if local_name(root) != "resultlist" {
            return Err(DsdError::Transform(format!(
                "expected a resultlist document, got <{}>",
                local_name(root)
            )));
        }

        let mut entries = Vec::new();
        for match_node in find_children(root, "match") {
            self.collect_match(match_node, &mut entries);
        }

        tracing::debug!(datasets = entries.len(), "directory result transformed");
        Ok(write_query_response(&entries))
    }

    /// Apply the filter parameters to one directory match and push an
    /// entry per surviving doctype.
    fn collect_match(&self, match_node: Node<'_, '_>, entries: &mut Vec<DatasetEntry>) {
        let participant = match find_child(match_node, "participantID") {
            Some(node) => node,
            None => return,
        };
        let entity = find_child(match_node, "entity");
        let entity_country = entity.and_then(|e| child_text(e, "countryCode"));

        if let Some(wanted) = self.parameter(PARAM_COUNTRY_CODE) {
            if entity_country.as_deref() != Some(wanted) {
                return;
            }
        }

        // A match that carries DataProviderType identifiers must carry the
        // requested one; a match without any is left to the directory-side
        // filter.
        if let Some(wanted) = self.parameter(PARAM_DP_TYPE) {
            let provider_types: Vec<String> = entity
                .map(|e| {
                    find_children(e, "identifier")
                        .filter(|id| id.attribute("scheme") == Some(DP_TYPE_IDENTIFIER_SCHEME))
                        .map(text_of)
                        .collect()
                })
                .unwrap_or_default();
            if !provider_types.is_empty() && !provider_types.iter().any(|v| v == wanted) {
                return;
            }
        }

        for doctype_node in find_children(match_node, "docTypeID") {
            let raw = text_of(doctype_node);
            let doctype = match DoctypeId::parse(&raw) {
                Ok(doctype) => doctype,
                Err(error) => {
                    tracing::debug!(doctype = %raw, error = %error, "skipping unparseable doctype");
                    continue;
                }
            };
            if let Some(wanted) = self.parameter(PARAM_DATASET_TYPE) {
                if !doctype.matches(wanted) {
                    continue;
                }
            }

            entries.push(DatasetEntry {
                participant_id: text_of(participant),
                participant_scheme: participant.attribute("scheme").map(str::to_string),
                entity_name: entity.and_then(|e| child_text(e, "name")),
                entity_country: entity_country.clone(),
                website: entity.and_then(|e| child_text(e, "website")),
                doctype,
            });
        }
    }
}

fn write_query_response(entries: &[DatasetEntry]) -> String {
    let mut w = XmlWriter::new();
    w.declaration();
    w.open_with(
        "query:QueryResponse",
        &[
            ("xmlns:query", NS_QUERY),
            ("xmlns:rim", NS_RIM),
            ("xmlns:xsi", NS_XSI),
            ("xmlns:dcat", NS_DCAT),
            ("xmlns:dct", NS_DCT),
            ("xmlns:cagv", NS_CAGV),
            ("xmlns:cbc", NS_CBC),
            ("xmlns:locn", NS_LOCN),
            ("status", STATUS_SUCCESS),
            ("totalResultCount", &entries.len().to_string()),
        ],
    );
    w.open("rim:RegistryObjectList");
    for (index, entry) in entries.iter().enumerate() {
        write_registry_object(&mut w, index, entry);
    }
    w.close("rim:RegistryObjectList");
    w.close("query:QueryResponse");
    w.into_string()
}

fn write_registry_object(w: &mut XmlWriter, index: usize, entry: &DatasetEntry) {
    let id = format!(
        "urn:toop:dsd:registry-object:{}:{index}",
        entry.participant_id
    );
    w.open_with("rim:RegistryObject", &[("id", &id)]);
    w.open_with("rim:Slot", &[("name", DATASET_SLOT_NAME)]);
    w.open_with("rim:SlotValue", &[("xsi:type", "rim:AnyValueType")]);
    write_dataset(w, entry);
    w.close("rim:SlotValue");
    w.close("rim:Slot");
    w.close("rim:RegistryObject");
}

fn write_dataset(w: &mut XmlWriter, entry: &DatasetEntry) {
    let doctype = &entry.doctype;
    w.open("dcat:Dataset");
    w.leaf("dct:identifier", &doctype.dataset_identifier());
    w.leaf("dct:type", doctype.dataset_type());
    if let Some(name) = &entry.entity_name {
        w.leaf(
            "dct:title",
            &format!("{} dataset of {name}", doctype.dataset_type()),
        );
        w.leaf(
            "dct:description",
            &format!(
                "Dataset of type {} provided by {name}",
                doctype.dataset_type()
            ),
        );
    }
    w.leaf("dct:conformsTo", doctype.conforms_to());

    w.open("dcat:distribution");
    if let Some(conforms) = doctype.distribution_conforms_to() {
        w.leaf("dct:conformsTo", conforms);
    }
    w.leaf("dct:format", doctype.distribution_format());
    if let Some(website) = &entry.website {
        w.leaf("dcat:accessURL", website);
    }
    w.close("dcat:distribution");

    w.open("dct:publisher");
    w.open("cagv:Agent");
    match &entry.participant_scheme {
        Some(scheme) => w.leaf_with("cbc:id", &[("schemeID", scheme)], &entry.participant_id),
        None => w.leaf("cbc:id", &entry.participant_id),
    }
    if let Some(name) = &entry.entity_name {
        w.leaf("cbc:name", name);
    }
    if let Some(country) = &entry.entity_country {
        w.open("cagv:location");
        w.leaf("locn:geographicIdentifier", country);
        w.close("cagv:location");
    }
    w.close("cagv:Agent");
    w.close("dct:publisher");
    w.close("dcat:Dataset");
}
