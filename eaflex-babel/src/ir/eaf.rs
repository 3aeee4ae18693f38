//! The annotation document: tiers of time-aligned and referring annotations.
//!
//! An [`AnnotationDocument`] owns a [`TimeOrder`] (the shared timeline), the
//! [`LinguisticType`] catalog that gives every tier its constraints, and the
//! [`Tier`]s themselves in document order. Each tier holds its annotations in
//! emission order; that order is significant for subdivision chains.
//!
//! Metadata this crate does not interpret (the header, languages, constraint
//! descriptions, controlled vocabularies) is kept as generic [`Element`]s and
//! written back unchanged.

use super::xml::Element;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Name of the header property that records the last assigned annotation id.
pub const LAST_USED_ANNOTATION_ID: &str = "lastUsedAnnotationId";

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDocument {
    /// Root attributes, including namespace declarations
    pub attributes: Vec<(String, String)>,
    pub header: Element,
    pub time_order: TimeOrder,
    pub tiers: Vec<Tier>,
    pub linguistic_types: Vec<LinguisticType>,
    /// Everything after the linguistic types, in source order
    pub passthrough: Vec<Element>,
    /// Highest annotation id in use, written to the header on output
    pub last_used_annotation_id: Option<u64>,
}

impl Default for AnnotationDocument {
    fn default() -> Self {
        Self {
            attributes: vec![
                ("AUTHOR".to_string(), String::new()),
                ("FORMAT".to_string(), "3.0".to_string()),
                ("VERSION".to_string(), "3.0".to_string()),
            ],
            header: Element::new("HEADER")
                .with_attribute("MEDIA_FILE", "")
                .with_attribute("TIME_UNITS", "milliseconds"),
            time_order: TimeOrder::default(),
            tiers: Vec::new(),
            linguistic_types: Vec::new(),
            passthrough: Vec::new(),
            last_used_annotation_id: None,
        }
    }
}

impl AnnotationDocument {
    pub fn tier(&self, id: &str) -> Option<&Tier> {
        self.tiers.iter().find(|tier| tier.id == id)
    }

    pub fn tier_mut(&mut self, id: &str) -> Option<&mut Tier> {
        self.tiers.iter_mut().find(|tier| tier.id == id)
    }

    pub fn linguistic_type(&self, id: &str) -> Option<&LinguisticType> {
        self.linguistic_types.iter().find(|lt| lt.id == id)
    }

    /// The linguistic type a tier refers to, if it is defined.
    pub fn type_of(&self, tier: &Tier) -> Option<&LinguisticType> {
        self.linguistic_type(&tier.linguistic_type)
    }

    /// Distinct participants of all tiers, sorted.
    pub fn participants(&self) -> BTreeSet<String> {
        self.tiers
            .iter()
            .filter_map(|tier| tier.participant.clone())
            .collect()
    }

    /// Media locations listed in the header, primary first.
    pub fn media_urls(&self) -> Vec<String> {
        self.header
            .children_named("MEDIA_DESCRIPTOR")
            .filter_map(|media| media.attribute("MEDIA_URL"))
            .map(str::to_string)
            .collect()
    }

    /// Remove every tier whose linguistic type carries the given constraint
    /// (e.g. `Included_In`). Returns the number of tiers removed.
    pub fn remove_tiers_with_constraint(&mut self, constraint: &str) -> usize {
        let doomed: BTreeSet<String> = self
            .linguistic_types
            .iter()
            .filter(|lt| lt.constraint.map(Constraint::as_str) == Some(constraint))
            .map(|lt| lt.id.clone())
            .collect();
        let before = self.tiers.len();
        self.tiers
            .retain(|tier| !doomed.contains(&tier.linguistic_type));
        before - self.tiers.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.tiers.iter().map(|tier| tier.annotations.len()).sum()
    }

    /// All annotation ids paired with the tier that holds them.
    pub fn annotations(&self) -> impl Iterator<Item = (&Tier, &Annotation)> {
        self.tiers
            .iter()
            .flat_map(|tier| tier.annotations.iter().map(move |a| (tier, a)))
    }
}

/// A named point on the shared timeline. Slots without a value are legal but
/// cannot anchor anything this crate reads.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot {
    pub id: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeOrder {
    pub slots: Vec<TimeSlot>,
}

impl TimeOrder {
    /// Append a slot with the next free `ts<n>` id and return that id.
    pub fn push(&mut self, value: f64) -> String {
        let id = format!("ts{}", self.slots.len() + 1);
        self.slots.push(TimeSlot {
            id: id.clone(),
            value: Some(value),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Stereotype of a linguistic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    SymbolicSubdivision,
    SymbolicAssociation,
    TimeSubdivision,
    IncludedIn,
}

impl Constraint {
    pub fn as_str(self) -> &'static str {
        match self {
            Constraint::SymbolicSubdivision => "Symbolic_Subdivision",
            Constraint::SymbolicAssociation => "Symbolic_Association",
            Constraint::TimeSubdivision => "Time_Subdivision",
            Constraint::IncludedIn => "Included_In",
        }
    }

    /// Whether children under one parent form an ordered chain.
    pub fn is_chained(self) -> bool {
        matches!(self, Constraint::SymbolicSubdivision)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Constraint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Symbolic_Subdivision" => Ok(Constraint::SymbolicSubdivision),
            "Symbolic_Association" => Ok(Constraint::SymbolicAssociation),
            "Time_Subdivision" => Ok(Constraint::TimeSubdivision),
            "Included_In" => Ok(Constraint::IncludedIn),
            other => Err(format!("unknown constraint '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticType {
    pub id: String,
    pub time_alignable: bool,
    pub constraint: Option<Constraint>,
    /// Attributes other than id, time-alignability and constraint
    pub extra_attributes: Vec<(String, String)>,
}

impl LinguisticType {
    pub fn new(id: impl Into<String>, time_alignable: bool, constraint: Option<Constraint>) -> Self {
        Self {
            id: id.into(),
            time_alignable,
            constraint,
            extra_attributes: vec![("GRAPHIC_REFERENCES".to_string(), "false".to_string())],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub id: String,
    pub linguistic_type: String,
    pub parent: Option<String>,
    pub participant: Option<String>,
    /// Attributes other than id, type, parent and participant
    pub extra_attributes: Vec<(String, String)>,
    pub annotations: Vec<Annotation>,
}

impl Tier {
    pub fn new(
        id: impl Into<String>,
        linguistic_type: impl Into<String>,
        parent: Option<String>,
        participant: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            linguistic_type: linguistic_type.into(),
            parent,
            participant,
            extra_attributes: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }
}

/// A time-anchored annotation, legal only on a time-alignable tier.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignableAnnotation {
    pub id: String,
    pub begin_slot: String,
    pub end_slot: String,
    pub value: String,
}

/// An annotation depending on one in the immediate parent tier.
#[derive(Debug, Clone, PartialEq)]
pub struct RefAnnotation {
    pub id: String,
    pub parent: String,
    /// Preceding sibling in a subdivision chain; absent on the chain head
    pub previous: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Alignable(AlignableAnnotation),
    Reference(RefAnnotation),
}

impl Annotation {
    pub fn id(&self) -> &str {
        match self {
            Annotation::Alignable(a) => &a.id,
            Annotation::Reference(r) => &r.id,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Annotation::Alignable(a) => &a.value,
            Annotation::Reference(r) => &r.value,
        }
    }
}

/// Numeric part of an `a<n>` annotation id.
pub fn annotation_number(id: &str) -> Option<u64> {
    id.strip_prefix('a')?.parse().ok()
}

pub fn annotation_id(number: u64) -> String {
    format!("a{number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(id: &str, lt: &str) -> Tier {
        Tier::new(id, lt, None, Some("ANA".to_string()))
    }

    #[test]
    fn test_removes_tiers_by_constraint() {
        let mut doc = AnnotationDocument {
            linguistic_types: vec![
                LinguisticType::new("default-lt", true, None),
                LinguisticType::new("incl", false, Some(Constraint::IncludedIn)),
            ],
            tiers: vec![tier("a", "default-lt"), tier("b", "incl"), tier("c", "incl")],
            ..AnnotationDocument::default()
        };

        assert_eq!(doc.remove_tiers_with_constraint("Included_In"), 2);
        assert_eq!(doc.tiers.len(), 1);
        assert_eq!(doc.remove_tiers_with_constraint("Symbolic_Association"), 0);
    }

    #[test]
    fn test_time_order_mints_sequential_ids() {
        let mut order = TimeOrder::default();
        assert_eq!(order.push(0.0), "ts1");
        assert_eq!(order.push(1500.0), "ts2");
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_constraint_names_round_trip() {
        for c in [
            Constraint::SymbolicSubdivision,
            Constraint::SymbolicAssociation,
            Constraint::TimeSubdivision,
            Constraint::IncludedIn,
        ] {
            assert_eq!(c.as_str().parse::<Constraint>(), Ok(c));
        }
        assert!("Nonsense".parse::<Constraint>().is_err());
    }

    #[test]
    fn test_annotation_numbers() {
        assert_eq!(annotation_number("a12"), Some(12));
        assert_eq!(annotation_number("b12"), None);
        assert_eq!(annotation_id(3), "a3");
    }
}
