use super::annotation::Annotations;
use super::item::{Item, Marked};
use crate::core::chem::toolkit::StructureToolkit;
use std::fmt;

/// An opaque compatibility tag representing a reactive capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mark(String);

impl Mark {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Mark {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Mark {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reactive building block for reaction-driven assembly.
#[derive(Debug, Clone)]
pub struct Synthon {
    key: String,
    valid: bool,
    marks: Vec<Mark>,
    compatible_marks: Vec<Mark>,
    functional_groups: usize,
    annotations: Annotations<Synthon>,
}

impl Synthon {
    /// Creates a valid synthon with no marks and no functional groups.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            valid: true,
            marks: Vec::new(),
            compatible_marks: Vec::new(),
            functional_groups: 0,
            annotations: Annotations::new(),
        }
    }

    pub fn invalid(key: impl Into<String>) -> Self {
        Self {
            valid: false,
            ..Self::new(key)
        }
    }

    /// Canonicalizes `repr` through the toolkit, falling back to an invalid synthon.
    pub fn parse(repr: &str, toolkit: &dyn StructureToolkit) -> Self {
        match toolkit.canonicalize(repr) {
            Some(canonical) if !canonical.is_empty() => Self::new(canonical),
            _ => Self::invalid(repr),
        }
    }

    /// Sets the marks this synthon exhibits. Repeated marks are kept once.
    pub fn with_marks<M: Into<Mark>>(mut self, marks: impl IntoIterator<Item = M>) -> Self {
        self.marks = dedup_marks(marks);
        self
    }

    /// Sets the marks this synthon can pair with. Repeated marks are kept once.
    pub fn with_compatible_marks<M: Into<Mark>>(
        mut self,
        marks: impl IntoIterator<Item = M>,
    ) -> Self {
        self.compatible_marks = dedup_marks(marks);
        self
    }

    pub fn with_functional_groups(mut self, count: usize) -> Self {
        self.functional_groups = count;
        self
    }

    /// Number of reactive functional groups left on this synthon.
    pub fn functional_groups(&self) -> usize {
        self.functional_groups
    }
}

fn dedup_marks<M: Into<Mark>>(marks: impl IntoIterator<Item = M>) -> Vec<Mark> {
    let mut unique: Vec<Mark> = Vec::new();
    for mark in marks.into_iter().map(Into::into) {
        if !unique.contains(&mark) {
            unique.push(mark);
        }
    }
    unique
}

impl Item for Synthon {
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

impl Marked for Synthon {
    fn marks(&self) -> &[Mark] {
        &self.marks
    }

    fn compatible_marks(&self) -> &[Mark] {
        &self.compatible_marks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ToyToolkit;

    #[test]
    fn builder_sets_marks_without_duplicates() {
        let synthon = Synthon::new("CC(=O)O")
            .with_marks(["acid", "acid", "ester"])
            .with_compatible_marks(["amine"])
            .with_functional_groups(1);

        assert_eq!(synthon.marks(), &[Mark::from("acid"), Mark::from("ester")]);
        assert_eq!(synthon.compatible_marks(), &[Mark::from("amine")]);
        assert_eq!(synthon.functional_groups(), 1);
        assert!(synthon.is_valid());
    }

    #[test]
    fn parse_falls_back_to_invalid_synthon() {
        let toolkit = ToyToolkit::default();

        assert!(Synthon::parse("NCC", &toolkit).is_valid());
        assert!(!Synthon::parse("", &toolkit).is_valid());
    }
}
