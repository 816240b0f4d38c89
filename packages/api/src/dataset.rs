//! Extraction of dataset records from RegRep query responses.
//!
//! The transform stage embeds every dataset description as a registry
//! object slot named [`DATASET_SLOT_NAME`]. This module walks a response
//! document, finds those slots and unmarshals their payload elements into
//! [`DatasetRecord`] values.

use roxmltree::{Document, Node};

use crate::xml::{child_text, find_child, find_children, local_name, text_of};

/// Name of the registry-object slot carrying a dataset description.
pub const DATASET_SLOT_NAME: &str = "Dataset";

/// One dataset description extracted from a RegRep response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    /// Dataset identifier, e.g. `RegisteredOrganization`.
    pub identifier: String,
    /// Dataset type, e.g. `REGISTERED_ORGANIZATION_TYPE`.
    pub dataset_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Conformance profile of the dataset, e.g. `toop-edm:v2.1`.
    pub conforms_to: Option<String>,
    pub publisher: Option<Publisher>,
    pub distributions: Vec<Distribution>,
}

/// The participant publishing a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    /// Participant identifier, e.g. `9999:elonia`.
    pub id: String,
    /// Identifier scheme of `id`.
    pub scheme: Option<String>,
    pub name: Option<String>,
    pub country_code: Option<String>,
}

/// One distribution of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Distribution {
    /// Distribution format, e.g. `CONCEPT`.
    pub format: Option<String>,
    /// Conformance profile of the distribution, e.g. `CCCEV`.
    pub conforms_to: Option<String>,
    pub access_url: Option<String>,
}

/// Parse a RegRep query response and unmarshal every embedded dataset.
///
/// Returns `None` when the input is not a well-formed query response at
/// all, and `Some` with an empty vector when the response is valid but
/// carries no dataset slots. Callers must keep the two apart: an empty
/// answer is a result, a non-response is not.
pub fn parse_datasets(regrep_xml: &str) -> Option<Vec<DatasetRecord>> {
    let doc = Document::parse(regrep_xml).ok()?;
    let root = doc.root_element();
    if local_name(root) != "QueryResponse" {
        return None;
    }

    let mut records = Vec::new();
    let object_list = match find_child(root, "RegistryObjectList") {
        Some(list) => list,
        // a response without an object list is valid and carries nothing
        None => return Some(records),
    };

    for object in find_children(object_list, "RegistryObject") {
        for slot in find_children(object, "Slot") {
            if slot.attribute("name") != Some(DATASET_SLOT_NAME) {
                continue;
            }
            let dataset = find_child(slot, "SlotValue")
                .and_then(|value| value.children().find(|c| c.is_element()));
            if let Some(dataset) = dataset {
                records.push(read_dataset(dataset));
            }
        }
    }

    Some(records)
}

fn read_dataset(node: Node<'_, '_>) -> DatasetRecord {
    DatasetRecord {
        identifier: child_text(node, "identifier").unwrap_or_default(),
        dataset_type: child_text(node, "type").unwrap_or_default(),
        title: child_text(node, "title"),
        description: child_text(node, "description"),
        conforms_to: child_text(node, "conformsTo"),
        publisher: find_child(node, "publisher").and_then(read_publisher),
        distributions: find_children(node, "distribution")
            .map(read_distribution)
            .collect(),
    }
}

fn read_publisher(node: Node<'_, '_>) -> Option<Publisher> {
    let agent = find_child(node, "Agent")?;
    let id_node = find_child(agent, "id")?;
    Some(Publisher {
        id: text_of(id_node),
        scheme: id_node.attribute("schemeID").map(str::to_string),
        name: child_text(agent, "name"),
        country_code: find_child(agent, "location")
            .and_then(|location| child_text(location, "geographicIdentifier")),
    })
}

fn read_distribution(node: Node<'_, '_>) -> Distribution {
    Distribution {
        format: child_text(node, "format"),
        conforms_to: child_text(node, "conformsTo"),
        access_url: child_text(node, "accessURL"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<query:QueryResponse
    xmlns:query="urn:oasis:names:tc:ebxml-regrep:xsd:query:4.0"
    xmlns:rim="urn:oasis:names:tc:ebxml-regrep:xsd:rim:4.0"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:dcat="http://data.europa.eu/r5r/"
    xmlns:dct="http://purl.org/dc/terms/"
    xmlns:cagv="https://semic.org/sa/cv/cagv/agent-2.0.0#"
    xmlns:cbc="https://semic.org/sa/cv/common/cbc-2.0.0#"
    xmlns:locn="http://www.w3.org/ns/locn#"
    status="urn:oasis:names:tc:ebxml-regrep:ResponseStatusType:Success"
    totalResultCount="1">
  <rim:RegistryObjectList>
    <rim:RegistryObject id="urn:toop:dsd:registry-object:9999:elonia:0">
      <rim:Slot name="Dataset">
        <rim:SlotValue xsi:type="rim:AnyValueType">
          <dcat:Dataset>
            <dct:identifier>RegisteredOrganization</dct:identifier>
            <dct:type>REGISTERED_ORGANIZATION_TYPE</dct:type>
            <dct:title>REGISTERED_ORGANIZATION_TYPE dataset of Elonia Development</dct:title>
            <dct:description>Dataset of type REGISTERED_ORGANIZATION_TYPE provided by Elonia Development</dct:description>
            <dct:conformsTo>toop-edm:v2.1</dct:conformsTo>
            <dcat:distribution>
              <dct:conformsTo>CCCEV</dct:conformsTo>
              <dct:format>CONCEPT</dct:format>
            </dcat:distribution>
            <dct:publisher>
              <cagv:Agent>
                <cbc:id schemeID="iso6523-actorid-upis">9999:elonia</cbc:id>
                <cbc:name>Elonia Development</cbc:name>
                <cagv:location>
                  <locn:geographicIdentifier>SV</locn:geographicIdentifier>
                </cagv:location>
              </cagv:Agent>
            </dct:publisher>
          </dcat:Dataset>
        </rim:SlotValue>
      </rim:Slot>
    </rim:RegistryObject>
  </rim:RegistryObjectList>
</query:QueryResponse>"#;

    #[test]
    fn test_parse_datasets_basic() {
        let records = parse_datasets(SAMPLE_RESPONSE).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.identifier, "RegisteredOrganization");
        assert_eq!(record.dataset_type, "REGISTERED_ORGANIZATION_TYPE");
        assert_eq!(record.conforms_to, Some("toop-edm:v2.1".to_string()));

        let publisher = record.publisher.as_ref().unwrap();
        assert_eq!(publisher.id, "9999:elonia");
        assert_eq!(publisher.scheme, Some("iso6523-actorid-upis".to_string()));
        assert_eq!(publisher.name, Some("Elonia Development".to_string()));
        assert_eq!(publisher.country_code, Some("SV".to_string()));

        assert_eq!(record.distributions.len(), 1);
        assert_eq!(record.distributions[0].format, Some("CONCEPT".to_string()));
        assert_eq!(
            record.distributions[0].conforms_to,
            Some("CCCEV".to_string())
        );
    }

    #[test]
    fn test_parse_datasets_empty_object_list() {
        let xml = r#"<query:QueryResponse
            xmlns:query="urn:oasis:names:tc:ebxml-regrep:xsd:query:4.0"
            xmlns:rim="urn:oasis:names:tc:ebxml-regrep:xsd:rim:4.0">
          <rim:RegistryObjectList/>
        </query:QueryResponse>"#;

        assert_eq!(parse_datasets(xml), Some(Vec::new()));
    }

    #[test]
    fn test_parse_datasets_missing_object_list() {
        let xml = r#"<query:QueryResponse
            xmlns:query="urn:oasis:names:tc:ebxml-regrep:xsd:query:4.0"/>"#;

        assert_eq!(parse_datasets(xml), Some(Vec::new()));
    }

    #[test]
    fn test_parse_datasets_ignores_other_slots() {
        let xml = r#"<query:QueryResponse
            xmlns:query="urn:oasis:names:tc:ebxml-regrep:xsd:query:4.0"
            xmlns:rim="urn:oasis:names:tc:ebxml-regrep:xsd:rim:4.0">
          <rim:RegistryObjectList>
            <rim:RegistryObject id="x">
              <rim:Slot name="SomethingElse">
                <rim:SlotValue><value>1</value></rim:SlotValue>
              </rim:Slot>
            </rim:RegistryObject>
          </rim:RegistryObjectList>
        </query:QueryResponse>"#;

        assert_eq!(parse_datasets(xml), Some(Vec::new()));
    }

    #[test]
    fn test_parse_datasets_not_a_query_response() {
        assert_eq!(parse_datasets("<resultlist/>"), None);
    }

    #[test]
    fn test_parse_datasets_malformed_input() {
        assert_eq!(parse_datasets("this is not xml"), None);
        assert_eq!(parse_datasets("<unclosed>"), None);
    }
}
