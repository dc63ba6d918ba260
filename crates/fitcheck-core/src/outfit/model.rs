//! Outfit state and its transitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::garment::{Category, GarmentDescriptor};

/// Addresses one occupied position of an outfit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutfitSlot {
    Top,
    Bottom,
    FullBody,
    /// One accessory, addressed by garment id
    Accessory(String),
}

/// The garments currently worn by the model.
///
/// A full-body garment and a top/bottom pair are mutually exclusive; the
/// constructors and transitions keep that invariant, so a value of this type
/// never holds both. Accessories are independent and unique by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutfitState {
    top: Option<GarmentDescriptor>,
    bottom: Option<GarmentDescriptor>,
    fullbody: Option<GarmentDescriptor>,
    accessories: Vec<GarmentDescriptor>,
}

impl OutfitState {
    /// The bare model, nothing equipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuilds an outfit from stored parts.
    ///
    /// Stored data may predate the exclusivity rule: when both a full-body
    /// garment and a top or bottom are present, the full-body garment wins.
    /// Duplicate accessories (same id) keep their first occurrence.
    pub fn from_parts(
        top: Option<GarmentDescriptor>,
        bottom: Option<GarmentDescriptor>,
        fullbody: Option<GarmentDescriptor>,
        accessories: Vec<GarmentDescriptor>,
    ) -> Self {
        let (top, bottom) = if fullbody.is_some() {
            if top.is_some() || bottom.is_some() {
                tracing::debug!("Dropping top/bottom shadowed by a full-body garment");
            }
            (None, None)
        } else {
            (top, bottom)
        };

        let mut seen = BTreeSet::new();
        let accessories = accessories
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();

        Self {
            top,
            bottom,
            fullbody,
            accessories,
        }
    }

    pub fn top(&self) -> Option<&GarmentDescriptor> {
        self.top.as_ref()
    }

    pub fn bottom(&self) -> Option<&GarmentDescriptor> {
        self.bottom.as_ref()
    }

    pub fn fullbody(&self) -> Option<&GarmentDescriptor> {
        self.fullbody.as_ref()
    }

    pub fn accessories(&self) -> &[GarmentDescriptor] {
        &self.accessories
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
            && self.bottom.is_none()
            && self.fullbody.is_none()
            && self.accessories.is_empty()
    }

    pub fn has_accessory(&self, id: &str) -> bool {
        self.accessories.iter().any(|item| item.id == id)
    }

    /// Computes the outfit that results from selecting `garment`.
    ///
    /// - full-body: equip it, clear top and bottom
    /// - bottom: equip it, clear full-body
    /// - accessory: toggle by id (remove when present, append otherwise)
    /// - top: equip it, clear full-body
    pub fn with_selection(&self, garment: &GarmentDescriptor) -> Self {
        let mut next = self.clone();
        match garment.category {
            Category::FullBody => {
                next.fullbody = Some(garment.clone());
                next.top = None;
                next.bottom = None;
            }
            Category::Bottom => {
                next.bottom = Some(garment.clone());
                next.fullbody = None;
            }
            Category::Accessory => {
                if next.has_accessory(&garment.id) {
                    next.accessories.retain(|item| item.id != garment.id);
                } else {
                    next.accessories.push(garment.clone());
                }
            }
            Category::Top => {
                next.top = Some(garment.clone());
                next.fullbody = None;
            }
        }
        next
    }

    /// Computes the outfit with one slot cleared.
    pub fn without(&self, slot: &OutfitSlot) -> Self {
        let mut next = self.clone();
        match slot {
            OutfitSlot::Top => next.top = None,
            OutfitSlot::Bottom => next.bottom = None,
            OutfitSlot::FullBody => next.fullbody = None,
            OutfitSlot::Accessory(id) => next.accessories.retain(|item| &item.id != id),
        }
        next
    }

    /// Structural comparison by garment ids.
    ///
    /// Accessories are compared as a set, so their order does not matter.
    pub fn same_selection(&self, other: &Self) -> bool {
        fn id_of(item: Option<&GarmentDescriptor>) -> Option<&str> {
            item.map(|garment| garment.id.as_str())
        }
        fn accessory_ids(outfit: &OutfitState) -> BTreeSet<&str> {
            outfit.accessories.iter().map(|item| item.id.as_str()).collect()
        }

        id_of(self.top()) == id_of(other.top())
            && id_of(self.bottom()) == id_of(other.bottom())
            && id_of(self.fullbody()) == id_of(other.fullbody())
            && accessory_ids(self) == accessory_ids(other)
    }

    /// Every occupied slot with its garment, full-body first.
    pub fn occupied(&self) -> Vec<(OutfitSlot, &GarmentDescriptor)> {
        let mut slots = Vec::with_capacity(3 + self.accessories.len());
        if let Some(garment) = &self.fullbody {
            slots.push((OutfitSlot::FullBody, garment));
        }
        if let Some(garment) = &self.top {
            slots.push((OutfitSlot::Top, garment));
        }
        if let Some(garment) = &self.bottom {
            slots.push((OutfitSlot::Bottom, garment));
        }
        for garment in &self.accessories {
            slots.push((OutfitSlot::Accessory(garment.id.clone()), garment));
        }
        slots
    }

    /// Ids of every equipped garment.
    pub fn garment_ids(&self) -> Vec<String> {
        self.occupied()
            .into_iter()
            .map(|(_, garment)| garment.id.clone())
            .collect()
    }

    /// Display names of every equipped garment, full-body first.
    pub fn garment_names(&self) -> Vec<&str> {
        self.occupied()
            .into_iter()
            .map(|(_, garment)| garment.name.as_str())
            .collect()
    }
}
