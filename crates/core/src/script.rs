//! Session scripts.
//!
//! A session script is a YAML document holding everything an operator would enter across the
//! pages of one test: ticked checklist items, screening answers, patient setup, baseline,
//! samples, drug provocation, manual nadir and the final result. [`SessionScript::apply`]
//! replays it into a [`Session`] in page order.
//!
//! The script is the form boundary. Numeric fields are range-checked here before anything
//! reaches the session store.

use crate::checklist::ChecklistCategory;
use crate::interpretation::{CannedText, PatternAnalysis, SampleAssessment};
use crate::profile::{PatientProfile, ProvocationDrug};
use crate::results::{BaselineVitals, ResultsUpdate, TestPhase, TestResult, VitalSample};
use crate::screening::{screen, ScreeningInput, ScreeningOutcome};
use crate::session::{ManualNadir, Session};
use crate::validation::{
    validate_baseline, validate_drug_dose, validate_drug_sample, validate_manual_nadir,
    validate_profile, validate_tilt_sample,
};
use crate::{TiltError, TiltResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrugStep {
    /// Falls back to the drug planned at setup.
    #[serde(default)]
    pub drug: Option<ProvocationDrug>,
    pub dose: f64,
    #[serde(default)]
    pub samples: Vec<VitalSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionScript {
    /// Ticked items per category. Items not listed are unticked.
    #[serde(default)]
    pub checklists: BTreeMap<ChecklistCategory, Vec<String>>,
    #[serde(default)]
    pub screening: Option<ScreeningInput>,
    #[serde(default)]
    pub patient: Option<PatientProfile>,
    #[serde(default)]
    pub baseline: Option<BaselineVitals>,
    #[serde(default)]
    pub passive: Vec<VitalSample>,
    #[serde(default)]
    pub drug: Option<DrugStep>,
    #[serde(default)]
    pub nadir: Option<ManualNadir>,
    #[serde(default)]
    pub result: Option<TestResult>,
    #[serde(default)]
    pub interpretation: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub duration_min: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonitoringAlert {
    pub phase: TestPhase,
    pub time_min: f64,
    pub assessment: SampleAssessment,
}

/// What replaying a script produced, for display by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptOutcome {
    pub screening: Option<ScreeningOutcome>,
    pub alerts: Vec<MonitoringAlert>,
    pub analysis: Option<PatternAnalysis>,
    pub canned_text: Option<CannedText>,
}

impl SessionScript {
    /// Parse a session script from YAML text.
    ///
    /// Schema errors carry the path of the offending field, e.g. `passive[2].hr_bpm`.
    ///
    /// # Errors
    ///
    /// Returns `TiltError::ScriptParse` if the YAML does not match the script schema.
    pub fn parse(yaml_text: &str) -> TiltResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        match serde_path_to_error::deserialize::<_, SessionScript>(deserializer) {
            Ok(script) => Ok(script),
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                Err(TiltError::ScriptParse(format!("at {path}: {source}")))
            }
        }
    }

    /// Read and parse a session script file.
    ///
    /// # Errors
    ///
    /// Returns `TiltError::FileRead` if the file cannot be read, or
    /// `TiltError::ScriptParse` if it does not match the script schema.
    pub fn load(path: &Path) -> TiltResult<Self> {
        let text = std::fs::read_to_string(path).map_err(TiltError::FileRead)?;
        Self::parse(&text)
    }

    /// Replays the script into `session`, page by page.
    ///
    /// Analysis runs once any test data has been recorded. A script that records test data
    /// must therefore also supply samples or a manual nadir.
    ///
    /// # Errors
    ///
    /// Returns the first validation or gating error encountered. Pages already applied stay
    /// applied.
    pub fn apply(self, session: &mut Session) -> TiltResult<ScriptOutcome> {
        let mut outcome = ScriptOutcome::default();

        for (category, ticked) in &self.checklists {
            apply_checklist(session, *category, ticked)?;
        }

        outcome.screening = self.screening.as_ref().map(screen);

        if let Some(mut profile) = self.patient {
            validate_profile(&profile)?;
            if !profile.drug_provocation {
                profile.drug_choice = None;
            }
            session.save_patient_profile(profile);
        }

        if let Some(baseline) = self.baseline {
            validate_baseline(&baseline)?;
            session.confirm_baseline(baseline)?;
        }

        for sample in self.passive {
            validate_tilt_sample(&sample)?;
            let time_min = sample.time_min;
            let assessment = session.record_vital_sample(TestPhase::PassiveTilt, sample)?;
            push_alert(&mut outcome.alerts, TestPhase::PassiveTilt, time_min, assessment);
        }

        if let Some(step) = self.drug {
            let drug = session.resolve_provocation_drug(step.drug);
            validate_drug_dose(drug, step.dose)?;
            session.record_drug_administration(Some(drug), step.dose)?;
            for sample in step.samples {
                validate_drug_sample(&sample)?;
                let time_min = sample.time_min;
                let assessment = session.record_drug_sample(sample)?;
                push_alert(
                    &mut outcome.alerts,
                    TestPhase::DrugProvocation,
                    time_min,
                    assessment,
                );
            }
        }

        if let Some(nadir) = &self.nadir {
            validate_manual_nadir(nadir)?;
        }
        if session.results().is_some() {
            outcome.analysis = Some(session.analyse(self.nadir)?);
        }

        if let Some(result) = self.result {
            outcome.canned_text = Some(session.select_result(result)?);
        }

        let edits = ResultsUpdate {
            interpretation: self.interpretation,
            recommendations: self.recommendations,
            duration_min: self.duration_min,
            ..Default::default()
        };
        if edits != ResultsUpdate::default() {
            session.finalize_results(edits);
        }

        Ok(outcome)
    }
}

fn apply_checklist(
    session: &mut Session,
    category: ChecklistCategory,
    ticked: &[String],
) -> TiltResult<()> {
    let items = category.items();
    if let Some(unknown) = ticked.iter().find(|t| !items.contains(&t.as_str())) {
        return Err(TiltError::InvalidInput(format!(
            "unknown {} checklist item: {unknown}",
            category.key()
        )));
    }
    for item in items {
        let value = ticked.iter().any(|t| t == item);
        session.set_checklist_item(category.key(), item, value);
    }
    Ok(())
}

fn push_alert(
    alerts: &mut Vec<MonitoringAlert>,
    phase: TestPhase,
    time_min: f64,
    assessment: SampleAssessment,
) {
    if assessment.critical_event || assessment.pots_alert {
        alerts.push(MonitoringAlert {
            phase,
            time_min,
            assessment,
        });
    }
}
