//! Closed vocabulary of node and facility categories.
//!
//! The graph stores a `NodeKind` per node; nearest-facility queries and the
//! citizen decision rules match on `FacilityKind`.  Both are closed enums so
//! the compiler checks every dispatch site exhaustively.

/// What a placed (non-corner) facility node represents.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FacilityKind {
    Hospital,
    Pharmacy,
    School,
    Restaurant,
    Mall,
    Park,
    Office,
    Residence,
}

impl FacilityKind {
    /// Human-readable label, also the token used in CSV dataset rows.
    pub fn as_str(self) -> &'static str {
        match self {
            FacilityKind::Hospital   => "hospital",
            FacilityKind::Pharmacy   => "pharmacy",
            FacilityKind::School     => "school",
            FacilityKind::Restaurant => "restaurant",
            FacilityKind::Mall       => "mall",
            FacilityKind::Park       => "park",
            FacilityKind::Office     => "office",
            FacilityKind::Residence  => "residence",
        }
    }

    /// Parse a CSV dataset token.  Case-sensitive by design: the static
    /// datasets are machine-generated and lower-case.
    pub fn parse(s: &str) -> Option<FacilityKind> {
        Some(match s {
            "hospital"   => FacilityKind::Hospital,
            "pharmacy"   => FacilityKind::Pharmacy,
            "school"     => FacilityKind::School,
            "restaurant" => FacilityKind::Restaurant,
            "mall"       => FacilityKind::Mall,
            "park"       => FacilityKind::Park,
            "office"     => FacilityKind::Office,
            "residence"  => FacilityKind::Residence,
            _ => return None,
        })
    }
}

impl std::fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── NodeKind ──────────────────────────────────────────────────────────────────

/// Category of a road-graph node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Skeleton road-grid intersection generated with its sector.
    /// Never a facility; never placed in a sub-cell.
    #[default]
    Corner,
    /// A public-transit boarding point.
    TransitStop,
    /// A placed, named point of interest.
    Facility(FacilityKind),
}

impl NodeKind {
    #[inline]
    pub fn is_corner(self) -> bool {
        matches!(self, NodeKind::Corner)
    }

    /// The facility category, if this node is a facility.
    #[inline]
    pub fn facility(self) -> Option<FacilityKind> {
        match self {
            NodeKind::Facility(k) => Some(k),
            _ => None,
        }
    }

    /// `true` if a nearest-facility query for `kind` should stop here.
    /// Transit stops are matched by [`NodeKind::TransitStop`] queries only.
    #[inline]
    pub fn matches(self, other: NodeKind) -> bool {
        self == other
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Corner      => f.write_str("corner"),
            NodeKind::TransitStop => f.write_str("stop"),
            NodeKind::Facility(k) => write!(f, "{k}"),
        }
    }
}
