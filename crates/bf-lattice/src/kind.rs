//! Element kinds.

use std::fmt;

/// Closed set of element kinds understood by the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Replaces the payload with its `initial` value.
    Source,
    Marker,
    Drift,
    SBend,
    Quadrupole,
    Solenoid,
    RfCavity,
    Stripper,
    EDipole,
    /// Transfer matrix supplied verbatim.
    Generic,
}

impl ElementKind {
    pub const ALL: [ElementKind; 10] = [
        ElementKind::Source,
        ElementKind::Marker,
        ElementKind::Drift,
        ElementKind::SBend,
        ElementKind::Quadrupole,
        ElementKind::Solenoid,
        ElementKind::RfCavity,
        ElementKind::Stripper,
        ElementKind::EDipole,
        ElementKind::Generic,
    ];

    /// Type name as written in configurations.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Source => "source",
            ElementKind::Marker => "marker",
            ElementKind::Drift => "drift",
            ElementKind::SBend => "sbend",
            ElementKind::Quadrupole => "quadrupole",
            ElementKind::Solenoid => "solenoid",
            ElementKind::RfCavity => "rfcavity",
            ElementKind::Stripper => "stripper",
            ElementKind::EDipole => "edipole",
            ElementKind::Generic => "generic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// True when propagation replaces the payload instead of composing a matrix.
    pub fn overrides_payload(self) -> bool {
        matches!(self, ElementKind::Source)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
