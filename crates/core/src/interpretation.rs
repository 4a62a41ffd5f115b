//! Interpretation engine.
//!
//! Everything here is a pure function of its arguments. Inputs are assumed to have been
//! range-checked at the form boundary and are not validated again.
//!
//! Responsibilities:
//! - Classify the hemodynamic pattern from baseline and nadir vitals
//! - Flag critical events and POTS alerts for individual samples during monitoring
//! - Supply canned interpretation and recommendation text for the operator's chosen result

use crate::constants::{
    AGE_ADVISORY_THRESHOLD_YEARS, BRADYCARDIA_FLOOR_BPM, CRITICAL_HR_BPM, CRITICAL_SBP_MMHG,
    POTS_ALERT_HR_CHANGE_PERCENT, POTS_ALERT_SBP_CHANGE_PERCENT, POTS_HR_RISE_BPM,
    POTS_MAX_BP_DROP_MMHG, SIGNIFICANT_BP_DROP_MMHG, SIGNIFICANT_HR_DROP_BPM,
};
use crate::results::{BaselineVitals, TestResult, VitalSample};
use serde::{Deserialize, Serialize};

// ============================================================================
// Pattern classification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HemodynamicPattern {
    #[serde(rename = "Mixed (Cardioinhibitory + Vasodepressor)")]
    Mixed,
    #[serde(rename = "Cardioinhibitory (Predominant)")]
    Cardioinhibitory,
    #[serde(rename = "Vasodepressor (Predominant)")]
    Vasodepressor,
    #[serde(rename = "POTS Pattern")]
    Pots,
    #[serde(rename = "Nonspecific/Negative")]
    Nonspecific,
}

impl HemodynamicPattern {
    pub fn label(self) -> &'static str {
        match self {
            HemodynamicPattern::Mixed => "Mixed (Cardioinhibitory + Vasodepressor)",
            HemodynamicPattern::Cardioinhibitory => "Cardioinhibitory (Predominant)",
            HemodynamicPattern::Vasodepressor => "Vasodepressor (Predominant)",
            HemodynamicPattern::Pots => "POTS Pattern",
            HemodynamicPattern::Nonspecific => "Nonspecific/Negative",
        }
    }

    /// One-line description shown next to the pattern.
    pub fn summary(self) -> &'static str {
        match self {
            HemodynamicPattern::Mixed => "Mixed Response: Significant HR and BP drop",
            HemodynamicPattern::Cardioinhibitory => {
                "Cardioinhibitory Response: Significant bradycardia"
            }
            HemodynamicPattern::Vasodepressor => {
                "Vasodepressor Response: BP drop without severe bradycardia"
            }
            HemodynamicPattern::Pots => "Postural Tachycardia Syndrome pattern",
            HemodynamicPattern::Nonspecific => "No clear vasovagal pattern",
        }
    }

    /// True for patterns with a heart-rate component, which is what makes pacing relevant.
    pub fn has_cardioinhibitory_component(self) -> bool {
        matches!(
            self,
            HemodynamicPattern::Mixed | HemodynamicPattern::Cardioinhibitory
        )
    }
}

impl std::str::FromStr for HemodynamicPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mixed" => Ok(HemodynamicPattern::Mixed),
            "cardioinhibitory" => Ok(HemodynamicPattern::Cardioinhibitory),
            "vasodepressor" => Ok(HemodynamicPattern::Vasodepressor),
            "pots" => Ok(HemodynamicPattern::Pots),
            "nonspecific" | "negative" => Ok(HemodynamicPattern::Nonspecific),
            _ => Err(format!("unknown hemodynamic pattern: {s}")),
        }
    }
}

/// Baseline and nadir vitals used to classify the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternInputs {
    pub baseline_hr_bpm: u16,
    pub baseline_sbp_mmhg: u16,
    pub min_hr_bpm: u16,
    pub min_sbp_mmhg: u16,
    pub age_years: u8,
}

impl PatternInputs {
    pub fn hr_drop(&self) -> i32 {
        i32::from(self.baseline_hr_bpm) - i32::from(self.min_hr_bpm)
    }

    pub fn bp_drop(&self) -> i32 {
        i32::from(self.baseline_sbp_mmhg) - i32::from(self.min_sbp_mmhg)
    }

    /// Nadir HR minus baseline HR.
    ///
    /// This is what the POTS rule tests. It can only be positive when every recorded HR sits
    /// above baseline, so it is not a true peak-HR rise.
    pub fn nadir_hr_rise(&self) -> i32 {
        i32::from(self.min_hr_bpm) - i32::from(self.baseline_hr_bpm)
    }
}

struct PatternRule {
    pattern: HemodynamicPattern,
    applies: fn(&PatternInputs) -> bool,
}

fn mixed_response(i: &PatternInputs) -> bool {
    i.bp_drop() >= SIGNIFICANT_BP_DROP_MMHG && i.hr_drop() >= SIGNIFICANT_HR_DROP_BPM
}

fn cardioinhibitory_response(i: &PatternInputs) -> bool {
    i.hr_drop() >= SIGNIFICANT_HR_DROP_BPM || i32::from(i.min_hr_bpm) < BRADYCARDIA_FLOOR_BPM
}

fn vasodepressor_response(i: &PatternInputs) -> bool {
    i.bp_drop() >= SIGNIFICANT_BP_DROP_MMHG
}

fn pots_response(i: &PatternInputs) -> bool {
    i.nadir_hr_rise() >= POTS_HR_RISE_BPM && i.bp_drop() < POTS_MAX_BP_DROP_MMHG
}

/// Evaluated top to bottom; the first rule that applies decides the pattern.
const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        pattern: HemodynamicPattern::Mixed,
        applies: mixed_response,
    },
    PatternRule {
        pattern: HemodynamicPattern::Cardioinhibitory,
        applies: cardioinhibitory_response,
    },
    PatternRule {
        pattern: HemodynamicPattern::Vasodepressor,
        applies: vasodepressor_response,
    },
    PatternRule {
        pattern: HemodynamicPattern::Pots,
        applies: pots_response,
    },
];

const AGE_ADVISORY: &str = "Age Consideration: Older patients more likely to show \
vasodepressor response rather than cardioinhibitory response.";

/// Classified pattern together with the derived drops and any advisory note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternAnalysis {
    pub pattern: HemodynamicPattern,
    pub hr_drop_bpm: i32,
    pub bp_drop_mmhg: i32,
    pub age_advisory: Option<&'static str>,
}

/// Classifies the hemodynamic response.
///
/// The age advisory is attached for patients over 60 with a vasodepressor-predominant
/// response and does not change the pattern.
pub fn classify_pattern(inputs: &PatternInputs) -> PatternAnalysis {
    let pattern = PATTERN_RULES
        .iter()
        .find(|rule| (rule.applies)(inputs))
        .map(|rule| rule.pattern)
        .unwrap_or(HemodynamicPattern::Nonspecific);

    let age_advisory = (inputs.age_years > AGE_ADVISORY_THRESHOLD_YEARS
        && pattern == HemodynamicPattern::Vasodepressor)
        .then_some(AGE_ADVISORY);

    PatternAnalysis {
        pattern,
        hr_drop_bpm: inputs.hr_drop(),
        bp_drop_mmhg: inputs.bp_drop(),
        age_advisory,
    }
}

// ============================================================================
// Live monitoring
// ============================================================================

/// Per-sample monitoring result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleAssessment {
    pub hr_change_percent: f64,
    pub sbp_change_percent: f64,
    /// Syncope or severe hypotension/bradycardia: stop the tilt.
    pub critical_event: bool,
    /// Advisory only; never set alongside `critical_event`.
    pub pots_alert: bool,
}

fn percent_change(current: u16, baseline: u16) -> f64 {
    if baseline == 0 {
        return 0.0;
    }
    (f64::from(current) - f64::from(baseline)) / f64::from(baseline) * 100.0
}

/// LOC, `SBP < 70` or `HR < 40`.
pub fn is_critical_event(sample: &VitalSample) -> bool {
    sample.has_loss_of_consciousness()
        || sample.sbp_mmhg < CRITICAL_SBP_MMHG
        || sample.hr_bpm < CRITICAL_HR_BPM
}

/// Assesses one incoming sample against the baseline.
///
/// The POTS alert is only considered when the sample is not a critical event.
pub fn assess_sample(sample: &VitalSample, baseline: &BaselineVitals) -> SampleAssessment {
    let hr_change_percent = percent_change(sample.hr_bpm, baseline.hr_bpm);
    let sbp_change_percent = percent_change(sample.sbp_mmhg, baseline.sbp_mmhg);
    let critical_event = is_critical_event(sample);
    let pots_alert = !critical_event
        && hr_change_percent > POTS_ALERT_HR_CHANGE_PERCENT
        && sbp_change_percent < POTS_ALERT_SBP_CHANGE_PERCENT;

    SampleAssessment {
        hr_change_percent,
        sbp_change_percent,
        critical_event,
        pots_alert,
    }
}

// ============================================================================
// Canned text
// ============================================================================

const INTERPRETATIONS: &[(TestResult, &str)] = &[
    (
        TestResult::VasovagalSyncope,
        "Delayed accelerating fall in BP with HR changes consistent with \
vasovagal mechanism. Patient reported symptoms similar to spontaneous episodes.",
    ),
    (
        TestResult::OrthostaticHypotension,
        "Immediate or early (within 3-5 min) sustained drop in SBP ≥20 mmHg \
or DBP ≥10 mmHg without compensatory tachycardia.",
    ),
    (
        TestResult::Pots,
        "Sustained HR increase ≥30 bpm (≥40 bpm if <20 years) within 10 min \
of tilt without significant BP drop.",
    ),
    (
        TestResult::Pseudosyncope,
        "Apparent LOC without significant hemodynamic changes. \
Consider psychiatric evaluation.",
    ),
    (
        TestResult::Negative,
        "No significant hemodynamic changes during passive or drug phase. \
Consider alternative diagnoses or repeat testing.",
    ),
    (
        TestResult::Indeterminate,
        "Inconclusive results. Consider prolonged monitoring or alternative testing.",
    ),
];

/// Which patterns a recommendation row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternScope {
    Any,
    Cardioinhibitory,
    NotCardioinhibitory,
}

impl PatternScope {
    fn admits(self, pattern: Option<HemodynamicPattern>) -> bool {
        let cardioinhibitory = pattern.is_some_and(|p| p.has_cardioinhibitory_component());
        match self {
            PatternScope::Any => true,
            PatternScope::Cardioinhibitory => cardioinhibitory,
            PatternScope::NotCardioinhibitory => !cardioinhibitory,
        }
    }
}

const DEFAULT_RECOMMENDATION: &str = "Further evaluation based on clinical suspicion.";

const RECOMMENDATIONS: &[(TestResult, PatternScope, &str)] = &[
    (
        TestResult::VasovagalSyncope,
        PatternScope::Cardioinhibitory,
        "- Consider permanent pacemaker if recurrent severe bradycardia/asystole\n\
- Fluid and salt supplementation\n\
- Physical counterpressure maneuvers\n\
- Consider midodrine or fludrocortisone",
    ),
    (
        TestResult::VasovagalSyncope,
        PatternScope::NotCardioinhibitory,
        "- Fluid and salt supplementation\n\
- Physical counterpressure maneuvers\n\
- Consider midodrine, fludrocortisone, or beta-blockers\n\
- Pacemaker NOT indicated for pure vasodepressor response",
    ),
    (
        TestResult::OrthostaticHypotension,
        PatternScope::Any,
        "- Volume expansion (fluids, salt)\n\
- Compression stockings/abdominal binder\n\
- Head-up sleeping position\n\
- Consider midodrine, droxidopa, or fludrocortisone\n\
- Review medications (stop offending agents)",
    ),
    (
        TestResult::Pots,
        PatternScope::Any,
        "- Hydration (2-3L/day) and increased salt intake\n\
- Compression garments\n\
- Exercise training (recumbent initially)\n\
- Consider beta-blockers, ivabradine, or fludrocortisone\n\
- Evaluate for underlying causes",
    ),
];

/// Canned interpretation for the operator's chosen result.
pub fn interpretation_text(result: TestResult) -> &'static str {
    INTERPRETATIONS
        .iter()
        .find(|(r, _)| *r == result)
        .map(|(_, text)| *text)
        .unwrap_or("")
}

/// Canned recommendations for the chosen result and, for vasovagal syncope, the pattern.
pub fn recommendation_text(result: TestResult, pattern: Option<HemodynamicPattern>) -> &'static str {
    RECOMMENDATIONS
        .iter()
        .find(|(r, scope, _)| *r == result && scope.admits(pattern))
        .map(|(_, _, text)| *text)
        .unwrap_or(DEFAULT_RECOMMENDATION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CannedText {
    pub interpretation: &'static str,
    pub recommendations: &'static str,
}

pub fn canned_text(result: TestResult, pattern: Option<HemodynamicPattern>) -> CannedText {
    CannedText {
        interpretation: interpretation_text(result),
        recommendations: recommendation_text(result, pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Symptom;

    fn inputs(baseline_hr: u16, min_hr: u16, baseline_sbp: u16, min_sbp: u16) -> PatternInputs {
        PatternInputs {
            baseline_hr_bpm: baseline_hr,
            baseline_sbp_mmhg: baseline_sbp,
            min_hr_bpm: min_hr,
            min_sbp_mmhg: min_sbp,
            age_years: 45,
        }
    }

    fn sample(hr: u16, sbp: u16, symptoms: &[Symptom]) -> VitalSample {
        VitalSample {
            time_min: 5.0,
            hr_bpm: hr,
            sbp_mmhg: sbp,
            dbp_mmhg: 70,
            symptoms: symptoms.iter().copied().collect(),
        }
    }

    const BASELINE: BaselineVitals = BaselineVitals {
        hr_bpm: 70,
        sbp_mmhg: 120,
        dbp_mmhg: 80,
    };

    #[test]
    fn test_mixed_dominates_other_rules() {
        // hr_drop 70, bp_drop 50, nadir HR also below the bradycardia floor
        let analysis = classify_pattern(&inputs(100, 30, 130, 80));
        assert_eq!(analysis.pattern, HemodynamicPattern::Mixed);
        assert_eq!(analysis.hr_drop_bpm, 70);
        assert_eq!(analysis.bp_drop_mmhg, 50);
    }

    #[test]
    fn test_mixed_at_exact_thresholds() {
        let analysis = classify_pattern(&inputs(120, 60, 140, 100));
        assert_eq!(analysis.pattern, HemodynamicPattern::Mixed);
    }

    #[test]
    fn test_hr_drop_without_bp_drop_is_cardioinhibitory() {
        let analysis = classify_pattern(&inputs(120, 60, 120, 90));
        assert_eq!(analysis.pattern, HemodynamicPattern::Cardioinhibitory);
    }

    #[test]
    fn test_bradycardia_floor_alone_is_cardioinhibitory() {
        // hr_drop 40 < 60, but nadir 30 < 40
        let analysis = classify_pattern(&inputs(70, 30, 120, 110));
        assert_eq!(analysis.pattern, HemodynamicPattern::Cardioinhibitory);
    }

    #[test]
    fn test_bp_drop_alone_is_vasodepressor() {
        let analysis = classify_pattern(&inputs(70, 65, 120, 75));
        assert_eq!(analysis.pattern, HemodynamicPattern::Vasodepressor);
        assert_eq!(analysis.age_advisory, None);
    }

    #[test]
    fn test_nadir_at_floor_is_not_cardioinhibitory() {
        let analysis = classify_pattern(&inputs(90, 40, 130, 85));
        assert_eq!(analysis.pattern, HemodynamicPattern::Vasodepressor);
    }

    #[test]
    fn test_pots_uses_nadir_minus_baseline() {
        let analysis = classify_pattern(&inputs(70, 105, 120, 115));
        assert_eq!(analysis.pattern, HemodynamicPattern::Pots);
    }

    #[test]
    fn test_pots_requires_small_bp_drop() {
        let analysis = classify_pattern(&inputs(70, 105, 120, 110));
        assert_eq!(analysis.pattern, HemodynamicPattern::Nonspecific);
    }

    #[test]
    fn test_no_rule_matches_is_nonspecific() {
        let analysis = classify_pattern(&inputs(70, 60, 120, 105));
        assert_eq!(analysis.pattern, HemodynamicPattern::Nonspecific);
        assert_eq!(analysis.hr_drop_bpm, 10);
        assert_eq!(analysis.bp_drop_mmhg, 15);
    }

    #[test]
    fn test_age_advisory_only_for_older_vasodepressor() {
        let mut older = inputs(70, 65, 120, 75);
        older.age_years = 61;
        assert!(classify_pattern(&older).age_advisory.is_some());

        older.age_years = 60;
        assert!(classify_pattern(&older).age_advisory.is_none());

        let mut mixed = inputs(100, 30, 130, 80);
        mixed.age_years = 75;
        let analysis = classify_pattern(&mixed);
        assert_eq!(analysis.pattern, HemodynamicPattern::Mixed);
        assert!(analysis.age_advisory.is_none());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let i = inputs(82, 48, 131, 88);
        assert_eq!(classify_pattern(&i), classify_pattern(&i));
    }

    #[test]
    fn test_critical_event_triggers() {
        assert!(is_critical_event(&sample(80, 110, &[Symptom::CompleteLoc])));
        assert!(is_critical_event(&sample(80, 69, &[])));
        assert!(is_critical_event(&sample(39, 110, &[])));
        assert!(!is_critical_event(&sample(40, 70, &[Symptom::Nausea])));
    }

    #[test]
    fn test_assess_sample_percent_changes() {
        let assessment = assess_sample(&sample(84, 108, &[]), &BASELINE);
        assert!((assessment.hr_change_percent - 20.0).abs() < 1e-9);
        assert!((assessment.sbp_change_percent + 10.0).abs() < 1e-9);
        assert!(!assessment.pots_alert);
    }

    #[test]
    fn test_pots_alert_on_tachycardia_without_bp_fall() {
        let assessment = assess_sample(&sample(95, 118, &[]), &BASELINE);
        assert!(assessment.pots_alert);
        assert!(!assessment.critical_event);
    }

    #[test]
    fn test_pots_alert_suppressed_by_critical_event() {
        let assessment = assess_sample(&sample(120, 118, &[Symptom::CompleteLoc]), &BASELINE);
        assert!(assessment.critical_event);
        assert!(!assessment.pots_alert);
    }

    #[test]
    fn test_interpretation_table_covers_every_result() {
        for result in TestResult::ALL {
            assert!(!interpretation_text(result).is_empty(), "{result:?}");
        }
    }

    #[test]
    fn test_vasovagal_recommendation_keyed_by_pattern() {
        let paced = recommendation_text(
            TestResult::VasovagalSyncope,
            Some(HemodynamicPattern::Cardioinhibitory),
        );
        assert!(paced.contains("Consider permanent pacemaker"));

        let mixed =
            recommendation_text(TestResult::VasovagalSyncope, Some(HemodynamicPattern::Mixed));
        assert_eq!(mixed, paced);

        let not_paced = recommendation_text(
            TestResult::VasovagalSyncope,
            Some(HemodynamicPattern::Vasodepressor),
        );
        assert!(not_paced.contains("Pacemaker NOT indicated"));

        let unclassified = recommendation_text(TestResult::VasovagalSyncope, None);
        assert_eq!(unclassified, not_paced);
    }

    #[test]
    fn test_other_results_fall_back_to_default_recommendation() {
        for result in [
            TestResult::Pseudosyncope,
            TestResult::Negative,
            TestResult::Indeterminate,
        ] {
            assert_eq!(recommendation_text(result, None), DEFAULT_RECOMMENDATION);
        }
        assert!(recommendation_text(TestResult::Pots, Some(HemodynamicPattern::Mixed))
            .contains("Compression garments"));
    }
}
