//! Pre-test preparation checklists.
//!
//! The catalogue below fixes the categories and their items. [`ChecklistState`] stores only
//! the ticked/unticked flag per item and never decides which items exist; that is the
//! caller's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tilt_types::Percent;

const EQUIPMENT_ITEMS: &[&str] = &[
    "Motorized tilt table (60-70° capability)",
    "Foot board and safety restraints",
    "ECG monitor (3 or 6 lead capability)",
    "Beat-to-beat BP monitor (finger plethysmography)",
    "IV access supplies",
    "Emergency crash cart available",
    "Defibrillator ready",
    "Atropine 1mg IV available",
    "Isoproterenol/nitroglycerin if needed",
    "Timer/stopwatch",
    "Emergency lowering capability (<10 sec)",
];

const MEDICATION_ITEMS: &[&str] = &[
    "Isoproterenol available (if using)",
    "Nitroglycerin available (if using)",
    "Atropine 1mg IV (emergency)",
    "Normal saline 500ml-1L (hydration)",
    "IV fluids administration set",
    "Emergency medications checked (not expired)",
    "Sildenafil/Vardenafil washout confirmed (>24h)",
    "Tadalafil washout confirmed (>48h)",
];

const EMERGENCY_ITEMS: &[&str] = &[
    "Crash cart immediately available",
    "Atropine drawn and labeled",
    "Defibrillator pads attached",
    "Oxygen supply ready",
    "Airway management equipment",
    "Emergency team contact confirmed",
    "IV access patent and functional",
    "Patient consented for procedure",
    "Emergency lowering procedure reviewed",
    "Continuous monitoring confirmed",
];

const PATIENT_PREP_ITEMS: &[&str] = &[
    "Patient fasting confirmed",
    "Medication status documented",
    "IV placed >30 min ago",
    "Room environment optimized",
    "Patient pre-test vitals stable",
    "Informed consent obtained",
];

/// The standard preparation checklist categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistCategory {
    Equipment,
    Medications,
    Emergency,
    PatientPrep,
}

impl ChecklistCategory {
    pub const ALL: [ChecklistCategory; 4] = [
        ChecklistCategory::Equipment,
        ChecklistCategory::Medications,
        ChecklistCategory::Emergency,
        ChecklistCategory::PatientPrep,
    ];

    /// Storage key for this category in [`ChecklistState`].
    pub fn key(self) -> &'static str {
        match self {
            ChecklistCategory::Equipment => "equipment",
            ChecklistCategory::Medications => "medications",
            ChecklistCategory::Emergency => "emergency",
            ChecklistCategory::PatientPrep => "patient_prep",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChecklistCategory::Equipment => "Equipment Readiness",
            ChecklistCategory::Medications => "Medication Readiness",
            ChecklistCategory::Emergency => "Emergency Readiness",
            ChecklistCategory::PatientPrep => "Patient Preparation",
        }
    }

    /// Items declared for this category, in display order.
    pub fn items(self) -> &'static [&'static str] {
        match self {
            ChecklistCategory::Equipment => EQUIPMENT_ITEMS,
            ChecklistCategory::Medications => MEDICATION_ITEMS,
            ChecklistCategory::Emergency => EMERGENCY_ITEMS,
            ChecklistCategory::PatientPrep => PATIENT_PREP_ITEMS,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// Readiness banner derived from a completion percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Readiness {
    Ready,
    PartiallyReady,
    NotReady,
}

impl Readiness {
    pub fn from_completion(completion: Percent) -> Self {
        match completion.value() {
            100 => Readiness::Ready,
            51..=99 => Readiness::PartiallyReady,
            _ => Readiness::NotReady,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Readiness::Ready => "ready",
            Readiness::PartiallyReady => "partially ready",
            Readiness::NotReady => "not ready",
        }
    }
}

/// Ticked state of checklist items, keyed by category then item label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChecklistState {
    categories: BTreeMap<String, BTreeMap<String, bool>>,
}

impl ChecklistState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an item's flag, creating the category entry on first use.
    pub fn set(&mut self, category: &str, item: &str, value: bool) {
        self.categories
            .entry(category.to_owned())
            .or_default()
            .insert(item.to_owned(), value);
    }

    /// Returns the stored flag, or `false` for an item that was never set.
    pub fn is_checked(&self, category: &str, item: &str) -> bool {
        self.categories
            .get(category)
            .and_then(|items| items.get(item))
            .copied()
            .unwrap_or(false)
    }

    pub fn checked_count(&self, category: &str) -> usize {
        self.categories
            .get(category)
            .map(|items| items.values().filter(|v| **v).count())
            .unwrap_or(0)
    }

    /// `round(100 * checked / total_items)`, or 0 when the category has never been touched.
    ///
    /// `total_items` is trusted to equal the number of items declared for the category.
    pub fn completion(&self, category: &str, total_items: usize) -> Percent {
        if !self.categories.contains_key(category) {
            return Percent::ZERO;
        }
        Percent::from_ratio(self.checked_count(category), total_items)
    }
}
