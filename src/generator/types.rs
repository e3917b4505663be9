//! Rendered output types.

use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Kubernetes object kinds a rendered document can hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    Deployment,
    Service,
    HorizontalPodAutoscaler,
    PersistentVolumeClaim,
    NetworkAttachmentDefinition,
    Secret,
    ConfigMap,
    /// Any other kind found in YAML loaded from disk.
    Other(String),
}

impl DocumentKind {
    /// Map a manifest's `kind` field to a document kind.
    pub fn from_kind(kind: &str) -> Self {
        match kind {
            "Deployment" => Self::Deployment,
            "Service" => Self::Service,
            "HorizontalPodAutoscaler" => Self::HorizontalPodAutoscaler,
            "PersistentVolumeClaim" => Self::PersistentVolumeClaim,
            "NetworkAttachmentDefinition" => Self::NetworkAttachmentDefinition,
            "Secret" => Self::Secret,
            "ConfigMap" => Self::ConfigMap,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Deployment => "Deployment",
            Self::Service => "Service",
            Self::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
            Self::NetworkAttachmentDefinition => "NetworkAttachmentDefinition",
            Self::Secret => "Secret",
            Self::ConfigMap => "ConfigMap",
            Self::Other(kind) => kind,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for DocumentKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One YAML document with the file name it is written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub filename: String,
    pub content: String,
    pub kind: DocumentKind,
}

/// Ordered collection of rendered documents, keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedSet {
    documents: BTreeMap<String, RenderedDocument>,
}

impl RenderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document. Returns the document back if its file name is
    /// already taken.
    pub fn insert(&mut self, document: RenderedDocument) -> Result<(), RenderedDocument> {
        match self.documents.entry(document.filename.clone()) {
            Entry::Occupied(_) => Err(document),
            Entry::Vacant(slot) => {
                slot.insert(document);
                Ok(())
            }
        }
    }

    pub fn get(&self, filename: &str) -> Option<&RenderedDocument> {
        self.documents.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.documents.contains_key(filename)
    }

    /// Documents in file name order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderedDocument> {
        self.documents.values()
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn of_kind<'a>(&'a self, kind: &'a DocumentKind) -> impl Iterator<Item = &'a RenderedDocument> {
        self.iter().filter(move |d| &d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents joined into one multi-document YAML stream.
    pub fn to_multi_document(&self) -> String {
        self.iter()
            .map(|d| d.content.trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n---\n")
            + "\n"
    }
}

impl<'a> IntoIterator for &'a RenderedSet {
    type Item = &'a RenderedDocument;
    type IntoIter = std::collections::btree_map::Values<'a, String, RenderedDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(filename: &str, kind: DocumentKind) -> RenderedDocument {
        RenderedDocument {
            filename: filename.to_string(),
            content: format!("kind: {}\n", kind),
            kind,
        }
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = RenderedSet::new();
        assert!(set.insert(doc("a.yaml", DocumentKind::Service)).is_ok());
        assert!(set.insert(doc("a.yaml", DocumentKind::Deployment)).is_err());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a.yaml").unwrap().kind, DocumentKind::Service);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut set = RenderedSet::new();
        set.insert(doc("web-service.yaml", DocumentKind::Service)).unwrap();
        set.insert(doc("web-deployment.yaml", DocumentKind::Deployment)).unwrap();
        let names: Vec<_> = set.filenames().collect();
        assert_eq!(names, vec!["web-deployment.yaml", "web-service.yaml"]);
        assert_eq!(set.to_multi_document(), "kind: Deployment\n---\nkind: Service\n");
    }

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(DocumentKind::from_kind("Secret"), DocumentKind::Secret);
        assert_eq!(
            DocumentKind::from_kind("NetworkPolicy"),
            DocumentKind::Other("NetworkPolicy".to_string())
        );
        assert_eq!(DocumentKind::from_kind("NetworkPolicy").as_str(), "NetworkPolicy");
    }
}
