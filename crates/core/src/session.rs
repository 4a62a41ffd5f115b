//! The session store.
//!
//! One [`Session`] holds everything for a single operator working through one test:
//! checklist state, the patient profile and the accumulating test results. It is created when
//! the operator starts and dropped when they finish. Nothing is shared between sessions.
//!
//! Phases that depend on upstream records are gated:
//! - testing requires a saved patient profile
//! - analysis requires recorded test results

use crate::checklist::{ChecklistCategory, ChecklistState};
use crate::config::CoreConfig;
use crate::interpretation::{
    assess_sample, canned_text, classify_pattern, CannedText, PatternAnalysis, PatternInputs,
    SampleAssessment,
};
use crate::profile::{PatientProfile, ProvocationDrug};
use crate::report;
use crate::results::{
    BaselineVitals, DrugAdministration, DrugResponse, RecordedSample, ResultsUpdate, TestPhase,
    TestResult, TestResults, VitalSample,
};
use crate::{TiltError, TiltResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tilt_types::Percent;
use uuid::Uuid;

/// Nadir values entered by hand when no samples were recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManualNadir {
    pub min_hr_bpm: u16,
    pub min_sbp_mmhg: u16,
    #[serde(default)]
    pub time_to_symptoms_min: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    checklists: ChecklistState,
    patient: Option<PatientProfile>,
    results: Option<TestResults>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            checklists: ChecklistState::new(),
            patient: None,
            results: None,
        };
        tracing::info!(
            session = %session.id,
            started_at = %session.started_at.to_rfc3339(),
            "tilt test session started"
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // ------------------------------------------------------------------------
    // Checklists
    // ------------------------------------------------------------------------

    /// Ticks or unticks a checklist item. Setting the same value twice changes nothing.
    pub fn set_checklist_item(&mut self, category: &str, item: &str, value: bool) {
        tracing::debug!(session = %self.id, category, item, value, "checklist item set");
        self.checklists.set(category, item, value);
    }

    /// Completion of `category` against a caller-supplied item count.
    pub fn category_completion(&self, category: &str, total_items: usize) -> Percent {
        self.checklists.completion(category, total_items)
    }

    /// Completion of a standard category against its catalogue size.
    pub fn completion(&self, category: ChecklistCategory) -> Percent {
        self.category_completion(category.key(), category.items().len())
    }

    pub fn checklist(&self) -> &ChecklistState {
        &self.checklists
    }

    // ------------------------------------------------------------------------
    // Patient profile
    // ------------------------------------------------------------------------

    /// Replaces the whole patient profile.
    pub fn save_patient_profile(&mut self, profile: PatientProfile) {
        tracing::info!(
            session = %self.id,
            patient_id = profile.patient_id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
            "patient setup saved"
        );
        self.patient = Some(profile);
    }

    pub fn patient_profile(&self) -> Option<&PatientProfile> {
        self.patient.as_ref()
    }

    fn require_profile(&self) -> TiltResult<&PatientProfile> {
        self.patient.as_ref().ok_or_else(|| {
            tracing::warn!(session = %self.id, "testing attempted before patient setup");
            TiltError::PatientProfileMissing
        })
    }

    // ------------------------------------------------------------------------
    // Test phases
    // ------------------------------------------------------------------------

    pub fn results(&self) -> Option<&TestResults> {
        self.results.as_ref()
    }

    fn results_mut(&mut self) -> &mut TestResults {
        self.results.get_or_insert_with(TestResults::default)
    }

    /// The confirmed supine baseline, falling back to the baseline entered at setup.
    pub fn comparison_baseline(&self) -> Option<BaselineVitals> {
        self.results
            .as_ref()
            .and_then(|r| r.baseline)
            .or_else(|| {
                self.patient.as_ref().map(|p| BaselineVitals {
                    hr_bpm: p.baseline.hr_bpm,
                    sbp_mmhg: p.baseline.sbp_mmhg,
                    dbp_mmhg: p.baseline.dbp_mmhg,
                })
            })
    }

    /// Records the supine baseline before tilting.
    ///
    /// # Errors
    ///
    /// Returns `TiltError::PatientProfileMissing` if patient setup has not been saved.
    pub fn confirm_baseline(&mut self, baseline: BaselineVitals) -> TiltResult<()> {
        self.require_profile()?;
        self.results_mut().baseline = Some(baseline);
        tracing::info!(
            session = %self.id,
            hr = baseline.hr_bpm,
            sbp = baseline.sbp_mmhg,
            dbp = baseline.dbp_mmhg,
            "baseline confirmed"
        );
        Ok(())
    }

    /// Appends a sample and runs live monitoring on it.
    ///
    /// Samples are kept in entry order; time offsets are not required to increase. During
    /// passive tilt and drug provocation, the first critical event marks the result as
    /// vasovagal syncope and captures its time offset as the time to symptoms. Later critical
    /// events leave both untouched.
    ///
    /// # Errors
    ///
    /// Returns `TiltError::PatientProfileMissing` if patient setup has not been saved.
    pub fn record_vital_sample(
        &mut self,
        phase: TestPhase,
        sample: VitalSample,
    ) -> TiltResult<SampleAssessment> {
        self.require_profile()?;
        let baseline = self
            .comparison_baseline()
            .ok_or(TiltError::BaselineMissing)?;
        let assessment = assess_sample(&sample, &baseline);
        let monitored = matches!(phase, TestPhase::PassiveTilt | TestPhase::DrugProvocation);
        let time_min = sample.time_min;
        let id = self.id;

        let results = self.results_mut();
        results.samples.push(RecordedSample { phase, sample });
        tracing::debug!(session = %id, phase = phase.label(), time_min, "sample recorded");

        if monitored && assessment.critical_event {
            tracing::warn!(session = %id, time_min, "critical event: syncope or severe hypotension");
            if results.critical_event_min.is_none() {
                results.critical_event_min = Some(time_min);
                results.result = Some(TestResult::VasovagalSyncope);
                results.time_to_symptoms_min = Some(time_min);
            }
        } else if monitored && assessment.pots_alert {
            tracing::warn!(
                session = %id,
                time_min,
                hr_change = assessment.hr_change_percent,
                "POTS pattern detected"
            );
        }

        Ok(assessment)
    }

    /// The drug to use: the one requested, else the one planned at setup, else nitroglycerin.
    pub fn resolve_provocation_drug(&self, requested: Option<ProvocationDrug>) -> ProvocationDrug {
        requested
            .or_else(|| self.patient.as_ref().and_then(|p| p.planned_drug()))
            .unwrap_or(ProvocationDrug::Nitroglycerin)
    }

    /// Records the provocation drug and dose.
    ///
    /// # Errors
    ///
    /// Returns `TiltError::PatientProfileMissing` if patient setup has not been saved.
    pub fn record_drug_administration(
        &mut self,
        drug: Option<ProvocationDrug>,
        dose: f64,
    ) -> TiltResult<DrugAdministration> {
        self.require_profile()?;
        let administration = DrugAdministration {
            drug: self.resolve_provocation_drug(drug),
            dose,
        };
        self.results_mut().drug = Some(administration);
        tracing::info!(
            session = %self.id,
            drug = administration.drug.label(),
            dose,
            unit = administration.drug.dose_unit(),
            "provocation drug administered"
        );
        Ok(administration)
    }

    /// Records a post-drug sample and updates the drug response.
    ///
    /// Loss of consciousness makes the response positive. A positive response is kept even if
    /// later samples are uneventful.
    ///
    /// # Errors
    ///
    /// Returns `TiltError::DrugNotAdministered` if no drug has been recorded, or
    /// `TiltError::PatientProfileMissing` if patient setup has not been saved.
    pub fn record_drug_sample(&mut self, sample: VitalSample) -> TiltResult<SampleAssessment> {
        if self.results.as_ref().and_then(|r| r.drug).is_none() {
            return Err(TiltError::DrugNotAdministered);
        }
        let loss_of_consciousness = sample.has_loss_of_consciousness();
        let assessment = self.record_vital_sample(TestPhase::DrugProvocation, sample)?;

        let results = self.results_mut();
        results.drug_response = match (loss_of_consciousness, results.drug_response) {
            (true, _) => Some(DrugResponse::Positive),
            (false, Some(DrugResponse::Positive)) => Some(DrugResponse::Positive),
            (false, _) => Some(DrugResponse::Negative),
        };
        Ok(assessment)
    }

    // ------------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------------

    /// Derives nadir, pattern and time to symptoms and stores them in the results.
    ///
    /// The nadir comes from recorded samples; `manual` is only used when no samples exist.
    /// A time to symptoms captured during monitoring is kept; otherwise the earliest loss of
    /// consciousness is used, then the manual value.
    ///
    /// # Errors
    ///
    /// - `TiltError::TestResultsMissing` if nothing has been recorded yet
    /// - `TiltError::PatientProfileMissing` if patient setup has not been saved
    /// - `TiltError::BaselineMissing` if no baseline is available
    /// - `TiltError::NadirMissing` if there are no samples and no manual nadir
    pub fn analyse(&mut self, manual: Option<ManualNadir>) -> TiltResult<PatternAnalysis> {
        let Some(results) = self.results.as_ref() else {
            tracing::warn!(session = %self.id, "analysis attempted before any test data");
            return Err(TiltError::TestResultsMissing);
        };
        let age_years = self.require_profile()?.age_years;
        let baseline = self
            .comparison_baseline()
            .ok_or(TiltError::BaselineMissing)?;

        let (min_hr_bpm, min_sbp_mmhg) = results
            .nadir()
            .or_else(|| manual.map(|m| (m.min_hr_bpm, m.min_sbp_mmhg)))
            .ok_or(TiltError::NadirMissing)?;

        let time_to_symptoms_min = results
            .critical_event_min
            .or(results.time_to_symptoms_min)
            .or_else(|| results.earliest_loss_of_consciousness())
            .or_else(|| manual.and_then(|m| m.time_to_symptoms_min));

        let analysis = classify_pattern(&PatternInputs {
            baseline_hr_bpm: baseline.hr_bpm,
            baseline_sbp_mmhg: baseline.sbp_mmhg,
            min_hr_bpm,
            min_sbp_mmhg,
            age_years,
        });

        self.results_mut().merge(ResultsUpdate {
            min_hr_bpm: Some(min_hr_bpm),
            min_sbp_mmhg: Some(min_sbp_mmhg),
            pattern: Some(analysis.pattern),
            time_to_symptoms_min,
            ..Default::default()
        });

        tracing::info!(
            session = %self.id,
            pattern = analysis.pattern.label(),
            hr_drop = analysis.hr_drop_bpm,
            bp_drop = analysis.bp_drop_mmhg,
            "hemodynamic pattern classified"
        );
        Ok(analysis)
    }

    /// Sets the operator's final result and fills in the canned text for it.
    ///
    /// The returned text is what was stored; the operator may replace it afterwards through
    /// [`Session::finalize_results`].
    ///
    /// # Errors
    ///
    /// Returns `TiltError::TestResultsMissing` if nothing has been recorded yet.
    pub fn select_result(&mut self, result: TestResult) -> TiltResult<CannedText> {
        let Some(results) = self.results.as_mut() else {
            return Err(TiltError::TestResultsMissing);
        };
        let text = canned_text(result, results.pattern);
        results.merge(ResultsUpdate {
            result: Some(result),
            interpretation: Some(text.interpretation.to_owned()),
            recommendations: Some(text.recommendations.to_owned()),
            ..Default::default()
        });
        tracing::info!(session = %self.id, result = result.label(), "final result selected");
        Ok(text)
    }

    /// Merges the given fields into the results; the last write wins per field.
    pub fn finalize_results(&mut self, update: ResultsUpdate) {
        self.results_mut().merge(update);
    }

    /// Discards all test results so a new test can begin. Checklists and profile are kept.
    pub fn start_new_test(&mut self) {
        tracing::info!(session = %self.id, "test results reset for a new test");
        self.results = None;
    }

    // ------------------------------------------------------------------------
    // Report
    // ------------------------------------------------------------------------

    pub fn render_report(&self, generated_at: NaiveDateTime) -> String {
        report::render_report(self.patient.as_ref(), self.results.as_ref(), generated_at)
    }

    pub fn report_filename(&self) -> String {
        report::report_filename(self.patient.as_ref())
    }

    pub fn write_report(
        &self,
        cfg: &CoreConfig,
        generated_at: NaiveDateTime,
    ) -> TiltResult<PathBuf> {
        report::write_report(
            cfg,
            self.patient.as_ref(),
            self.results.as_ref(),
            generated_at,
        )
    }
}
