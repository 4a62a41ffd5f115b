//! Test results accumulated across the phases of one tilt test.

use crate::interpretation::HemodynamicPattern;
use crate::profile::ProvocationDrug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Symptoms the patient may report during tilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symptom {
    None,
    Lightheadedness,
    Nausea,
    Sweating,
    #[serde(rename = "Blurred vision")]
    BlurredVision,
    Palpitations,
    #[serde(rename = "Chest discomfort")]
    ChestDiscomfort,
    Tremulousness,
    Headache,
    /// Loss of consciousness. Always a critical event.
    #[serde(rename = "Complete LOC", alias = "LOC")]
    CompleteLoc,
}

impl Symptom {
    pub fn label(self) -> &'static str {
        match self {
            Symptom::None => "None",
            Symptom::Lightheadedness => "Lightheadedness",
            Symptom::Nausea => "Nausea",
            Symptom::Sweating => "Sweating",
            Symptom::BlurredVision => "Blurred vision",
            Symptom::Palpitations => "Palpitations",
            Symptom::ChestDiscomfort => "Chest discomfort",
            Symptom::Tremulousness => "Tremulousness",
            Symptom::Headache => "Headache",
            Symptom::CompleteLoc => "Complete LOC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    SupineBaseline,
    PassiveTilt,
    DrugProvocation,
    Recovery,
}

impl TestPhase {
    pub fn label(self) -> &'static str {
        match self {
            TestPhase::SupineBaseline => "Supine Baseline",
            TestPhase::PassiveTilt => "Passive Tilt",
            TestPhase::DrugProvocation => "Drug Provocation",
            TestPhase::Recovery => "Recovery",
        }
    }
}

/// One set of vitals taken during tilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VitalSample {
    /// Minutes since tilt (or since drug administration in the drug phase).
    pub time_min: f64,
    pub hr_bpm: u16,
    pub sbp_mmhg: u16,
    pub dbp_mmhg: u16,
    #[serde(default)]
    pub symptoms: BTreeSet<Symptom>,
}

impl VitalSample {
    pub fn has_loss_of_consciousness(&self) -> bool {
        self.symptoms.contains(&Symptom::CompleteLoc)
    }
}

/// A sample together with the phase it was taken in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedSample {
    pub phase: TestPhase,
    pub sample: VitalSample,
}

/// Supine baseline confirmed at the start of testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaselineVitals {
    pub hr_bpm: u16,
    pub sbp_mmhg: u16,
    pub dbp_mmhg: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrugResponse {
    Positive,
    Negative,
}

impl DrugResponse {
    pub fn label(self) -> &'static str {
        match self {
            DrugResponse::Positive => "Positive",
            DrugResponse::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrugAdministration {
    pub drug: ProvocationDrug,
    pub dose: f64,
}

/// Final result chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestResult {
    #[serde(rename = "Positive - Vasovagal Syncope")]
    VasovagalSyncope,
    #[serde(rename = "Positive - Orthostatic Hypotension")]
    OrthostaticHypotension,
    #[serde(rename = "Positive - POTS")]
    Pots,
    #[serde(rename = "Positive - Pseudosyncope")]
    Pseudosyncope,
    #[serde(rename = "Negative - No abnormality detected")]
    Negative,
    Indeterminate,
}

impl TestResult {
    pub const ALL: [TestResult; 6] = [
        TestResult::VasovagalSyncope,
        TestResult::OrthostaticHypotension,
        TestResult::Pots,
        TestResult::Pseudosyncope,
        TestResult::Negative,
        TestResult::Indeterminate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TestResult::VasovagalSyncope => "Positive - Vasovagal Syncope",
            TestResult::OrthostaticHypotension => "Positive - Orthostatic Hypotension",
            TestResult::Pots => "Positive - POTS",
            TestResult::Pseudosyncope => "Positive - Pseudosyncope",
            TestResult::Negative => "Negative - No abnormality detected",
            TestResult::Indeterminate => "Indeterminate",
        }
    }
}

impl std::str::FromStr for TestResult {
    type Err = String;

    /// Accepts the full label or a short name such as `vasovagal` or `pots`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let short = match wanted.as_str() {
            "vasovagal" | "vasovagal-syncope" => Some(TestResult::VasovagalSyncope),
            "orthostatic" | "orthostatic-hypotension" => Some(TestResult::OrthostaticHypotension),
            "pots" => Some(TestResult::Pots),
            "pseudosyncope" => Some(TestResult::Pseudosyncope),
            "negative" => Some(TestResult::Negative),
            "indeterminate" => Some(TestResult::Indeterminate),
            _ => None,
        };
        short
            .or_else(|| {
                TestResult::ALL
                    .into_iter()
                    .find(|r| r.label().to_ascii_lowercase() == wanted)
            })
            .ok_or_else(|| format!("unknown test result: {s}"))
    }
}

/// Everything recorded for the current test, built up phase by phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestResults {
    pub baseline: Option<BaselineVitals>,
    pub samples: Vec<RecordedSample>,
    pub drug: Option<DrugAdministration>,
    pub drug_response: Option<DrugResponse>,
    pub min_hr_bpm: Option<u16>,
    pub min_sbp_mmhg: Option<u16>,
    pub pattern: Option<HemodynamicPattern>,
    pub time_to_symptoms_min: Option<f64>,
    /// Time offset of the first critical event seen by live monitoring. Set once; later
    /// events and operator edits leave it alone.
    pub critical_event_min: Option<f64>,
    pub result: Option<TestResult>,
    pub interpretation: Option<String>,
    pub recommendations: Option<String>,
    /// Total test duration documented at recovery.
    pub duration_min: Option<f64>,
}

impl TestResults {
    /// Lowest HR and lowest SBP across all recorded samples, taken independently.
    pub fn nadir(&self) -> Option<(u16, u16)> {
        let min_hr = self.samples.iter().map(|s| s.sample.hr_bpm).min()?;
        let min_sbp = self.samples.iter().map(|s| s.sample.sbp_mmhg).min()?;
        Some((min_hr, min_sbp))
    }

    /// Earliest time offset among samples reporting loss of consciousness.
    pub fn earliest_loss_of_consciousness(&self) -> Option<f64> {
        self.samples
            .iter()
            .filter(|s| s.sample.has_loss_of_consciousness())
            .map(|s| s.sample.time_min)
            .reduce(f64::min)
    }

    /// Distinct symptoms reported across the test, excluding the "None" tag.
    pub fn reported_symptoms(&self) -> BTreeSet<Symptom> {
        self.samples
            .iter()
            .flat_map(|s| s.sample.symptoms.iter().copied())
            .filter(|s| *s != Symptom::None)
            .collect()
    }

    /// Applies every field set in `update`, leaving the rest untouched.
    pub fn merge(&mut self, update: ResultsUpdate) {
        let ResultsUpdate {
            min_hr_bpm,
            min_sbp_mmhg,
            pattern,
            time_to_symptoms_min,
            result,
            interpretation,
            recommendations,
            duration_min,
        } = update;

        if min_hr_bpm.is_some() {
            self.min_hr_bpm = min_hr_bpm;
        }
        if min_sbp_mmhg.is_some() {
            self.min_sbp_mmhg = min_sbp_mmhg;
        }
        if pattern.is_some() {
            self.pattern = pattern;
        }
        if time_to_symptoms_min.is_some() {
            self.time_to_symptoms_min = time_to_symptoms_min;
        }
        if result.is_some() {
            self.result = result;
        }
        if interpretation.is_some() {
            self.interpretation = interpretation;
        }
        if recommendations.is_some() {
            self.recommendations = recommendations;
        }
        if duration_min.is_some() {
            self.duration_min = duration_min;
        }
    }
}

/// Named fields to merge into [`TestResults`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsUpdate {
    pub min_hr_bpm: Option<u16>,
    pub min_sbp_mmhg: Option<u16>,
    pub pattern: Option<HemodynamicPattern>,
    pub time_to_symptoms_min: Option<f64>,
    pub result: Option<TestResult>,
    pub interpretation: Option<String>,
    pub recommendations: Option<String>,
    pub duration_min: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time_min: f64, hr: u16, sbp: u16, symptoms: &[Symptom]) -> RecordedSample {
        RecordedSample {
            phase: TestPhase::PassiveTilt,
            sample: VitalSample {
                time_min,
                hr_bpm: hr,
                sbp_mmhg: sbp,
                dbp_mmhg: 70,
                symptoms: symptoms.iter().copied().collect(),
            },
        }
    }

    #[test]
    fn test_nadir_takes_columns_independently() {
        let results = TestResults {
            samples: vec![sample(5.0, 50, 110, &[]), sample(10.0, 80, 70, &[])],
            ..Default::default()
        };
        assert_eq!(results.nadir(), Some((50, 70)));
    }

    #[test]
    fn test_nadir_empty_is_none() {
        assert_eq!(TestResults::default().nadir(), None);
    }

    #[test]
    fn test_earliest_loss_of_consciousness_ignores_entry_order() {
        let results = TestResults {
            samples: vec![
                sample(12.0, 45, 70, &[Symptom::CompleteLoc]),
                sample(9.5, 50, 75, &[Symptom::CompleteLoc, Symptom::Nausea]),
                sample(3.0, 90, 118, &[Symptom::Nausea]),
            ],
            ..Default::default()
        };
        assert_eq!(results.earliest_loss_of_consciousness(), Some(9.5));
    }

    #[test]
    fn test_reported_symptoms_excludes_none_tag() {
        let results = TestResults {
            samples: vec![
                sample(1.0, 70, 120, &[Symptom::None]),
                sample(2.0, 70, 120, &[Symptom::Sweating, Symptom::Nausea]),
                sample(3.0, 70, 120, &[Symptom::Nausea]),
            ],
            ..Default::default()
        };
        let symptoms: Vec<_> = results.reported_symptoms().into_iter().collect();
        assert_eq!(symptoms, vec![Symptom::Nausea, Symptom::Sweating]);
    }

    #[test]
    fn test_merge_last_write_wins_per_field() {
        let mut results = TestResults::default();
        results.merge(ResultsUpdate {
            result: Some(TestResult::Pots),
            interpretation: Some("first".into()),
            ..Default::default()
        });
        results.merge(ResultsUpdate {
            interpretation: Some("second".into()),
            duration_min: Some(32.0),
            ..Default::default()
        });
        assert_eq!(results.result, Some(TestResult::Pots));
        assert_eq!(results.interpretation.as_deref(), Some("second"));
        assert_eq!(results.duration_min, Some(32.0));
    }

    #[test]
    fn test_symptom_accepts_short_loc_alias() {
        let symptom: Symptom = serde_yaml::from_str("LOC").unwrap();
        assert_eq!(symptom, Symptom::CompleteLoc);
        let symptom: Symptom = serde_yaml::from_str("Complete LOC").unwrap();
        assert_eq!(symptom, Symptom::CompleteLoc);
    }

    #[test]
    fn test_test_result_from_str() {
        assert_eq!("pots".parse::<TestResult>(), Ok(TestResult::Pots));
        assert_eq!(
            "Positive - Vasovagal Syncope".parse::<TestResult>(),
            Ok(TestResult::VasovagalSyncope)
        );
        assert!("maybe".parse::<TestResult>().is_err());
    }
}
