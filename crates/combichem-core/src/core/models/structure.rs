use super::annotation::Annotations;
use super::item::Item;
use crate::core::chem::attachment;
use crate::core::chem::toolkit::StructureToolkit;

/// A fragment or fused structure identified by its canonical representation.
///
/// Mapped attachment points (`[*:N]` tokens) are extracted once at construction so that
/// signature checks during screening never re-scan the representation.
#[derive(Debug, Clone)]
pub struct Structure {
    key: String,
    valid: bool,
    attachment_points: Vec<u32>,
    attachment_count: usize,
    annotations: Annotations<Structure>,
}

impl Structure {
    /// Canonicalizes `repr` through the toolkit.
    ///
    /// A representation the toolkit rejects, or one that canonicalizes to an empty string,
    /// yields an invalid structure keyed by the raw input rather than an error.
    pub fn parse(repr: &str, toolkit: &dyn StructureToolkit) -> Self {
        match toolkit.canonicalize(repr) {
            Some(canonical) if !canonical.is_empty() => Self::from_canonical(canonical),
            _ => Self::invalid(repr),
        }
    }

    /// Wraps a representation that is already canonical.
    pub fn from_canonical(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            attachment_points: attachment::attachment_labels(&key),
            attachment_count: attachment::attachment_count(&key),
            key,
            valid: true,
            annotations: Annotations::new(),
        }
    }

    pub fn invalid(repr: impl Into<String>) -> Self {
        Self {
            key: repr.into(),
            valid: false,
            attachment_points: Vec::new(),
            attachment_count: 0,
            annotations: Annotations::new(),
        }
    }

    /// Sorted labels of the mapped attachment points.
    pub fn attachment_points(&self) -> &[u32] {
        &self.attachment_points
    }

    /// Number of attachment points, mapped or not.
    pub fn attachment_count(&self) -> usize {
        self.attachment_count
    }

    /// Whether this structure exposes exactly the sorted `signature`, with no unmapped extras.
    pub fn matches_signature(&self, signature: &[u32]) -> bool {
        self.valid
            && self.attachment_count == signature.len()
            && self.attachment_points == signature
    }
}

impl Item for Structure {
    fn key(&self) -> &str {
        &self.key
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn annotations(&self) -> &Annotations<Self> {
        &self.annotations
    }
}
