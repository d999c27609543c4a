//! Citations supporting a Rule. An `Enactment` is an opaque value from the
//! authoring side: a source path into a code hierarchy plus an optional
//! character span selecting part of the cited text. The composition layer
//! needs only equality, containment, and union minimization.

use serde::{Deserialize, Serialize};

/// A citation to enacted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enactment {
    /// Hierarchical source path, e.g. `/us/usc/t47/s230`.
    pub source: String,
    /// Character span selecting part of the cited text; `None` cites the
    /// whole node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<(usize, usize)>,
}

impl Enactment {
    /// A citation to a whole source node.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            span: None,
        }
    }

    /// Restrict the citation to a character span.
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some((start, end));
        self
    }

    /// Whether this citation's text range subsumes `other`'s: the source
    /// path covers it and the span (if any) contains its span.
    pub fn contains(&self, other: &Enactment) -> bool {
        let path_covers = other.source == self.source
            || (other.source.starts_with(&self.source)
                && other.source[self.source.len()..].starts_with('/'));
        if !path_covers {
            return false;
        }
        match (self.span, other.span) {
            (None, _) => true,
            (Some((a, b)), Some((c, d))) => other.source == self.source && a <= c && d <= b,
            (Some(_), None) => false,
        }
    }
}

/// Union of two citation sets, de-duplicated and minimized: a citation
/// whose range another citation already subsumes is dropped.
pub fn merge_enactments(left: &[Enactment], right: &[Enactment]) -> Vec<Enactment> {
    let mut combined: Vec<Enactment> = Vec::new();
    for e in left.iter().chain(right.iter()) {
        if !combined.contains(e) {
            combined.push(e.clone());
        }
    }
    let mut kept: Vec<Enactment> = Vec::new();
    for (i, e) in combined.iter().enumerate() {
        let subsumed = combined
            .iter()
            .enumerate()
            .any(|(j, other)| i != j && other != e && other.contains(e));
        if !subsumed {
            kept.push(e.clone());
        }
    }
    kept
}
