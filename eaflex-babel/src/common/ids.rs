//! Annotation ids, subdivision chains, and checked emission.
//!
//! Ids come from one [`IdAllocator`] per output document, seeded at 1 and
//! advanced exactly once per annotation. [`ReferenceChains`] remembers the
//! last child written per (tier, parent) so the next sibling can point back
//! to it. [`Emitter`] combines both and refuses to write an annotation that
//! would break the document's structure.

use crate::error::ConversionError;
use crate::ir::eaf::{
    annotation_id, AlignableAnnotation, Annotation, AnnotationDocument, RefAnnotation,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`IdAllocator::next_id`] returns.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Last id handed out, 0 if none.
    pub fn last(&self) -> u64 {
        self.next - 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceChains {
    last_child: HashMap<(String, u64), u64>,
}

impl ReferenceChains {
    /// Previous sibling of the next child of `parent` on `tier`.
    pub fn chain_next(&self, tier: &str, parent: u64) -> Option<u64> {
        self.last_child.get(&(tier.to_string(), parent)).copied()
    }

    pub fn record(&mut self, tier: &str, parent: u64, id: u64) {
        self.last_child.insert((tier.to_string(), parent), id);
    }
}

/// Writes annotations into a document while enforcing its constraints.
#[derive(Debug)]
pub struct Emitter {
    doc: AnnotationDocument,
    ids: IdAllocator,
    chains: ReferenceChains,
    tier_index: HashMap<String, usize>,
    /// Annotation id to the tier holding it
    owner: HashMap<u64, usize>,
    associated: HashSet<(usize, u64)>,
}

impl Emitter {
    /// Start emitting into `doc`, whose tiers must still be empty.
    pub fn new(doc: AnnotationDocument) -> Self {
        let tier_index = doc
            .tiers
            .iter()
            .enumerate()
            .map(|(i, tier)| (tier.id.clone(), i))
            .collect();
        Self {
            doc,
            ids: IdAllocator::new(),
            chains: ReferenceChains::default(),
            tier_index,
            owner: HashMap::new(),
            associated: HashSet::new(),
        }
    }

    fn pending(&self) -> String {
        annotation_id(self.ids.peek())
    }

    fn tier(&self, tier_id: &str) -> Result<usize, ConversionError> {
        self.tier_index.get(tier_id).copied().ok_or_else(|| {
            ConversionError::integrity(self.pending(), format!("tier '{tier_id}' does not exist"))
        })
    }

    pub fn emit_alignable(
        &mut self,
        tier_id: &str,
        begin_slot: &str,
        end_slot: &str,
        value: &str,
    ) -> Result<u64, ConversionError> {
        let index = self.tier(tier_id)?;
        let tier = &self.doc.tiers[index];
        if !self.doc.type_of(tier).is_some_and(|lt| lt.time_alignable) {
            return Err(ConversionError::integrity(
                self.pending(),
                format!("tier '{tier_id}' is not time-alignable"),
            ));
        }
        for slot in [begin_slot, end_slot] {
            if !self.doc.time_order.slots.iter().any(|s| s.id == slot) {
                return Err(ConversionError::Alignment(format!(
                    "time slot '{slot}' is not defined"
                )));
            }
        }

        let id = self.ids.next_id();
        self.owner.insert(id, index);
        self.doc.tiers[index]
            .annotations
            .push(Annotation::Alignable(AlignableAnnotation {
                id: annotation_id(id),
                begin_slot: begin_slot.to_string(),
                end_slot: end_slot.to_string(),
                value: value.to_string(),
            }));
        Ok(id)
    }

    /// Write a referring annotation under `parent`, which must live in the
    /// immediate parent tier of `tier_id`.
    pub fn emit_ref(&mut self, tier_id: &str, parent: u64, value: &str) -> Result<u64, ConversionError> {
        let index = self.tier(tier_id)?;
        let tier = &self.doc.tiers[index];
        let parent_tier = tier
            .parent
            .as_deref()
            .and_then(|p| self.tier_index.get(p).copied());
        if parent_tier.is_none() || self.owner.get(&parent) != parent_tier.as_ref() {
            return Err(ConversionError::integrity(
                self.pending(),
                format!(
                    "parent {} is not an annotation of the parent tier of '{tier_id}'",
                    annotation_id(parent)
                ),
            ));
        }
        let constraint = match self.doc.type_of(tier) {
            Some(lt) if !lt.time_alignable => lt.constraint,
            _ => {
                return Err(ConversionError::integrity(
                    self.pending(),
                    format!("tier '{tier_id}' cannot hold referring annotations"),
                ))
            }
        };

        let chained = constraint.is_some_and(|c| c.is_chained());
        let previous = if chained {
            self.chains.chain_next(tier_id, parent)
        } else if !self.associated.insert((index, parent)) {
            return Err(ConversionError::integrity(
                self.pending(),
                format!(
                    "{} already has an annotation on '{tier_id}'",
                    annotation_id(parent)
                ),
            ));
        } else {
            None
        };

        let id = self.ids.next_id();
        if chained {
            self.chains.record(tier_id, parent, id);
        }
        self.owner.insert(id, index);
        self.doc.tiers[index]
            .annotations
            .push(Annotation::Reference(RefAnnotation {
                id: annotation_id(id),
                parent: annotation_id(parent),
                previous: previous.map(annotation_id),
                value: value.to_string(),
            }));
        Ok(id)
    }

    pub fn last_id(&self) -> u64 {
        self.ids.last()
    }

    /// The finished document, with its final annotation id recorded.
    pub fn finish(mut self) -> AnnotationDocument {
        self.doc.last_used_annotation_id = Some(self.ids.last());
        self.doc
    }
}
