//! Patient setup: demographics, indication, protocol and baseline vitals.

use serde::{Deserialize, Serialize};
use tilt_types::NonEmptyText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

/// Primary clinical indication for the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indication {
    #[serde(rename = "Recurrent unexplained syncope")]
    RecurrentUnexplainedSyncope,
    #[serde(rename = "Single high-risk syncope episode")]
    SingleHighRiskEpisode,
    #[serde(rename = "Suspected vasovagal syncope")]
    SuspectedVasovagalSyncope,
    #[serde(rename = "Suspected orthostatic hypotension")]
    SuspectedOrthostaticHypotension,
    #[serde(rename = "POTS evaluation")]
    PotsEvaluation,
    #[serde(rename = "Convulsive syncope vs epilepsy")]
    ConvulsiveSyncopeVsEpilepsy,
    #[serde(rename = "Pseudosyncope evaluation")]
    PseudosyncopeEvaluation,
    #[serde(rename = "Autonomic dysfunction workup")]
    AutonomicDysfunctionWorkup,
}

impl Indication {
    pub fn label(self) -> &'static str {
        match self {
            Indication::RecurrentUnexplainedSyncope => "Recurrent unexplained syncope",
            Indication::SingleHighRiskEpisode => "Single high-risk syncope episode",
            Indication::SuspectedVasovagalSyncope => "Suspected vasovagal syncope",
            Indication::SuspectedOrthostaticHypotension => "Suspected orthostatic hypotension",
            Indication::PotsEvaluation => "POTS evaluation",
            Indication::ConvulsiveSyncopeVsEpilepsy => "Convulsive syncope vs epilepsy",
            Indication::PseudosyncopeEvaluation => "Pseudosyncope evaluation",
            Indication::AutonomicDysfunctionWorkup => "Autonomic dysfunction workup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "Standard Passive (20-45 min)")]
    StandardPassive,
    #[serde(rename = "Short Passive (15 min)")]
    ShortPassive,
    #[serde(rename = "Italian Protocol (Nitroglycerin)")]
    ItalianNitroglycerin,
    #[serde(rename = "Isoproterenol Protocol")]
    Isoproterenol,
    Custom,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::StandardPassive => "Standard Passive (20-45 min)",
            Protocol::ShortPassive => "Short Passive (15 min)",
            Protocol::ItalianNitroglycerin => "Italian Protocol (Nitroglycerin)",
            Protocol::Isoproterenol => "Isoproterenol Protocol",
            Protocol::Custom => "Custom",
        }
    }
}

/// Agent used for pharmacological provocation after a non-diagnostic passive phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvocationDrug {
    Isoproterenol,
    Nitroglycerin,
}

impl ProvocationDrug {
    pub fn label(self) -> &'static str {
        match self {
            ProvocationDrug::Isoproterenol => "Isoproterenol",
            ProvocationDrug::Nitroglycerin => "Nitroglycerin",
        }
    }

    /// Isoproterenol is titrated as an infusion; nitroglycerin is a single sublingual dose.
    pub fn dose_unit(self) -> &'static str {
        match self {
            ProvocationDrug::Isoproterenol => "mcg/min",
            ProvocationDrug::Nitroglycerin => "mcg",
        }
    }
}

/// Supine vitals captured at patient setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupVitals {
    pub hr_bpm: u16,
    pub sbp_mmhg: u16,
    pub dbp_mmhg: u16,
    pub spo2_percent: u8,
}

/// Everything submitted by the patient setup form.
///
/// A later submission replaces the whole record; fields are never patched individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientProfile {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub patient_id: Option<NonEmptyText>,
    pub age_years: u8,
    pub gender: Gender,
    pub weight_kg: f64,
    pub indication: Indication,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub medications: String,
    pub protocol: Protocol,
    pub tilt_angle_deg: u8,
    pub max_duration_min: u8,
    #[serde(default)]
    pub drug_provocation: bool,
    #[serde(default)]
    pub drug_choice: Option<ProvocationDrug>,
    pub baseline: SetupVitals,
}

/// Setup forms submit an empty string when the identifier field is left blank.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NonEmptyText>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(NonEmptyText::optional))
}

impl PatientProfile {
    /// The drug planned for provocation, if provocation is planned at all.
    pub fn planned_drug(&self) -> Option<ProvocationDrug> {
        if self.drug_provocation {
            self.drug_choice
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn profile() -> PatientProfile {
        PatientProfile {
            patient_id: NonEmptyText::optional("PT-001"),
            age_years: 45,
            gender: Gender::Female,
            weight_kg: 62.5,
            indication: Indication::SuspectedVasovagalSyncope,
            history: "Three faints while standing in queues".into(),
            medications: "None".into(),
            protocol: Protocol::StandardPassive,
            tilt_angle_deg: 70,
            max_duration_min: 45,
            drug_provocation: true,
            drug_choice: Some(ProvocationDrug::Nitroglycerin),
            baseline: SetupVitals {
                hr_bpm: 70,
                sbp_mmhg: 120,
                dbp_mmhg: 80,
                spo2_percent: 98,
            },
        }
    }
}
