//! The workflow data model: [`Workflow`], [`Node`], and [`Tag`].
//!
//! These mirror the shape an n8n-compatible server sends and expects over
//! `/api/v1/workflows` (see `other_examples/.../n8n_client.rs` in the
//! retrieval pack for the wire conventions this follows: camelCase fields,
//! an `X-N8N-API-KEY` header, a `{data: [...]}` envelope on list
//! endpoints). The engine treats `nodes`, `connections`, `parameters`, and
//! `settings` as opaque JSON it round-trips verbatim; it only inspects
//! `id`, `name`, `tags`, and each node's `credentials`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One automation graph as stored on an n8n-compatible server.
///
/// `id` is assigned by the server and is `None` for a workflow that has not
/// yet been created on a given server; `connections` and `settings` are
/// preserved verbatim since their internal shape is server-defined and the
/// engine never inspects them.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Value,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub settings: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}
impl Workflow {
    /// Whether this workflow satisfies TARGET's creation invariant: a
    /// non-empty `name` and at least one node.
    ///
    /// # Returns
    /// `true` if [`TargetCreateError`] would *not* be raised for this
    /// workflow, `false` otherwise.
    #[must_use]
    pub fn is_creatable(&self) -> bool { !self.name.trim().is_empty() && !self.nodes.is_empty() }

    /// Whether any node in this workflow references source-side
    /// credentials.
    ///
    /// Used by the credential gate (transfer pipeline step 4): a workflow
    /// where every node's `credentials` mapping is empty or absent passes
    /// the gate even when `skip_credentials` is set.
    #[must_use]
    pub fn has_credentials(&self) -> bool { self.nodes.iter().any(Node::has_credentials) }

    /// Whether this workflow carries a tag with the given name.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool { self.tags.iter().any(|t| t.name == name) }

    /// Whether this workflow carries any tag named in `names`.
    #[must_use]
    pub fn has_any_tag(&self, names: &[String]) -> bool { names.iter().any(|n| self.has_tag(n)) }
}

/// One vertex of a workflow graph.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default = "default_type_version")]
    pub type_version: f64,
    pub position: (f64, f64),
    #[serde(default)]
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Value>,
}
impl Node {
    /// Whether this node's `credentials` mapping is present and non-empty.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        match &self.credentials {
            Some(Value::Object(map)) => !map.is_empty(),
            Some(other) => !other.is_null(),
            None => false,
        }
    }
}

fn default_type_version() -> f64 { 1.0 }

/// A categorical label attached to a workflow, unique by name within one
/// workflow.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "updatedAt")]
    pub updated_at: Option<String>,
}
impl Tag {
    /// Constructs a bare tag with only a name, as used by filters that
    /// don't carry server-assigned metadata.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self { Self { name: name.into(), id: None, created_at: None, updated_at: None } }
}

#[cfg(test)]
mod tests {
    use serde_test::{assert_tokens, Token};

    use super::*;

    fn node(id: &str, credentials: Option<Value>) -> Node {
        Node { id: id.into(), name: id.into(), node_type: "n8n-nodes-base.noOp".into(), type_version: 1.0, position: (0.0, 0.0), parameters: Value::Null, credentials }
    }

    #[test]
    fn is_creatable_requires_name_and_nodes() {
        let mut w = Workflow { name: String::new(), nodes: vec![node("1", None)], ..Default::default() };
        assert!(!w.is_creatable());
        w.name = "ok".into();
        assert!(w.is_creatable());
        w.nodes.clear();
        assert!(!w.is_creatable());
    }

    #[test]
    fn has_credentials_ignores_empty_mapping() {
        let w = Workflow { name: "w".into(), nodes: vec![node("1", Some(Value::Object(Default::default())))], ..Default::default() };
        assert!(!w.has_credentials());

        let mut creds = serde_json::Map::new();
        creds.insert("slackApi".into(), serde_json::json!({"id": "5"}));
        let w = Workflow { name: "w".into(), nodes: vec![node("1", Some(Value::Object(creds)))], ..Default::default() };
        assert!(w.has_credentials());
    }

    #[test]
    fn tag_matching() {
        let w = Workflow { name: "w".into(), nodes: vec![node("1", None)], tags: vec![Tag::named("prod")], ..Default::default() };
        assert!(w.has_tag("prod"));
        assert!(!w.has_tag("dev"));
        assert!(w.has_any_tag(&["dev".into(), "prod".into()]));
    }

    #[test]
    fn bare_tag_serializes_name_only() {
        let tag = Tag::named("prod");
        assert_tokens(&tag, &[Token::Struct { name: "Tag", len: 1 }, Token::Str("name"), Token::Str("prod"), Token::StructEnd]);
    }

    #[test]
    fn round_trips_through_json() {
        let w = Workflow { id: Some("1".into()), name: "w".into(), nodes: vec![node("n1", None)], ..Default::default() };
        let json = serde_json::to_string(&w).unwrap();
        let back: Workflow = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}
