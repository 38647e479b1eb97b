//! Serializable model document.
//!
//! The parser hands the engine either a built [`ModelGraph`] or a
//! `ModelDocument` (JSON/YAML). Both paths go through the same validation.

use crate::deployment::DeploymentElement;
use crate::element::Element;
use crate::error::ModelError;
use crate::graph::ModelGraph;
use crate::relationship::Relationship;
use serde::{Deserialize, Serialize};

/// Flat, declaration-ordered model description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub deployments: Vec<DeploymentElement>,
}

impl ModelDocument {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TryFrom<ModelDocument> for ModelGraph {
    type Error = ModelError;

    fn try_from(document: ModelDocument) -> Result<Self, Self::Error> {
        let mut builder = ModelGraph::builder();
        for element in document.elements {
            builder.add_element(element);
        }
        for relationship in document.relationships {
            builder.add_relationship(relationship);
        }
        for deployment in document.deployments {
            builder.add_deployment(deployment);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fqn::Fqn;

    #[test]
    fn yaml_document_builds_graph() {
        let yaml = r#"
elements:
  - id: customer
    kind: actor
    title: Customer
  - id: cloud
    kind: system
  - id: cloud.api
    kind: container
    technology: Rust
    tags: [public]
relationships:
  - id: r1
    source: customer
    target: cloud.api
    title: calls
    line: dashed
deployments:
  - type: node
    id: prod
    kind: environment
  - type: instance
    id: prod.api
    element: cloud.api
"#;
        let document: ModelDocument = serde_yaml::from_str(yaml).unwrap();
        let graph = ModelGraph::try_from(document).unwrap();
        let api = graph.element(&Fqn::new("cloud.api").unwrap()).unwrap();
        assert!(api.tags.contains("public"));
        assert_eq!(graph.relationships().len(), 1);
        assert_eq!(graph.deployments().len(), 2);
    }

    #[test]
    fn invalid_document_is_rejected() {
        let json = r#"{"elements": [{"id": "a.b", "kind": "x"}]}"#;
        let document = ModelDocument::from_json_str(json).unwrap();
        let err = ModelGraph::try_from(document).unwrap_err();
        assert_eq!(err.code(), "MISSING_PARENT");
    }
}
