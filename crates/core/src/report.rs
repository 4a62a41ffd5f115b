//! Plain-text report rendering and writing.
//!
//! Rendering is total: any field that has not been recorded renders as `N/A` and never causes
//! an error. Only writing the file can fail.

use crate::config::CoreConfig;
use crate::constants::{
    NOT_AVAILABLE, REPORT_FILENAME_PREFIX, REPORT_TIMESTAMP_FORMAT, UNKNOWN_PATIENT_ID,
};
use crate::profile::PatientProfile;
use crate::results::TestResults;
use crate::{TiltError, TiltResult};
use chrono::NaiveDateTime;
use std::fmt::Display;
use std::path::PathBuf;

fn or_na<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

fn minutes(value: Option<f64>) -> String {
    or_na(value.map(|v| format!("{v:.1}")))
}

/// Renders the full report.
///
/// Field order is fixed: generation time, patient information, test parameters, baseline
/// vitals, results, interpretation, recommendations.
pub fn render_report(
    profile: Option<&PatientProfile>,
    results: Option<&TestResults>,
    generated_at: NaiveDateTime,
) -> String {
    let symptoms = results.map(|r| r.reported_symptoms()).and_then(|set| {
        (!set.is_empty()).then(|| set.iter().map(|s| s.label()).collect::<Vec<_>>().join(", "))
    });
    let baseline = results.and_then(|r| r.baseline);
    let drug = results.and_then(|r| r.drug);

    let mut out = String::new();
    out.push_str("TILT TABLE TEST REPORT\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.format(REPORT_TIMESTAMP_FORMAT)
    ));

    out.push_str("PATIENT INFORMATION:\n");
    out.push_str(&format!(
        "- Patient ID: {}\n",
        or_na(profile.and_then(|p| p.patient_id.as_ref()))
    ));
    out.push_str(&format!("- Age: {}\n", or_na(profile.map(|p| p.age_years))));
    out.push_str(&format!(
        "- Gender: {}\n",
        or_na(profile.map(|p| p.gender.label()))
    ));
    out.push_str(&format!(
        "- Weight: {} kg\n",
        or_na(profile.map(|p| format!("{:.1}", p.weight_kg)))
    ));
    out.push_str(&format!(
        "- Indication: {}\n\n",
        or_na(profile.map(|p| p.indication.label()))
    ));

    out.push_str("TEST PARAMETERS:\n");
    out.push_str(&format!(
        "- Protocol: {}\n",
        or_na(profile.map(|p| p.protocol.label()))
    ));
    out.push_str(&format!(
        "- Tilt Angle: {} degrees\n",
        or_na(profile.map(|p| p.tilt_angle_deg))
    ));
    out.push_str(&format!(
        "- Test Duration: {} minutes\n",
        minutes(results.and_then(|r| r.duration_min))
    ));
    out.push_str(&format!(
        "- Drug Provocation: {}\n",
        or_na(drug.map(|d| d.drug.label()))
    ));
    out.push_str(&format!(
        "- Drug Dose: {}\n\n",
        or_na(drug.map(|d| format!("{} {}", d.dose, d.drug.dose_unit())))
    ));

    out.push_str("BASELINE VITALS:\n");
    out.push_str(&format!(
        "- Baseline HR: {} bpm\n",
        or_na(baseline.map(|b| b.hr_bpm))
    ));
    out.push_str(&format!(
        "- Baseline SBP: {} mmHg\n",
        or_na(baseline.map(|b| b.sbp_mmhg))
    ));
    out.push_str(&format!(
        "- Baseline DBP: {} mmHg\n\n",
        or_na(baseline.map(|b| b.dbp_mmhg))
    ));

    out.push_str("RESULTS:\n");
    out.push_str(&format!(
        "- Test Result: {}\n",
        or_na(results.and_then(|r| r.result).map(|r| r.label()))
    ));
    out.push_str(&format!(
        "- Hemodynamic Pattern: {}\n",
        or_na(results.and_then(|r| r.pattern).map(|p| p.label()))
    ));
    out.push_str(&format!(
        "- Minimum HR: {} bpm\n",
        or_na(results.and_then(|r| r.min_hr_bpm))
    ));
    out.push_str(&format!(
        "- Minimum SBP: {} mmHg\n",
        or_na(results.and_then(|r| r.min_sbp_mmhg))
    ));
    out.push_str(&format!("- Symptoms: {}\n", or_na(symptoms)));
    out.push_str(&format!(
        "- Time to Symptoms: {} min\n",
        minutes(results.and_then(|r| r.time_to_symptoms_min))
    ));
    out.push_str(&format!(
        "- Drug Response: {}\n\n",
        or_na(results.and_then(|r| r.drug_response).map(|d| d.label()))
    ));

    out.push_str("INTERPRETATION:\n");
    out.push_str(&or_na(results.and_then(|r| r.interpretation.as_deref())));
    out.push_str("\n\nRECOMMENDATIONS:\n");
    out.push_str(&or_na(results.and_then(|r| r.recommendations.as_deref())));
    out.push('\n');

    out
}

/// `Tilt_Test_Report_<patientId>.txt`, with `Unknown` when there is no identifier.
///
/// Characters outside `[A-Za-z0-9._-]` are replaced with `_` so the identifier cannot
/// escape the report directory.
pub fn report_filename(profile: Option<&PatientProfile>) -> String {
    let id = profile
        .and_then(|p| p.patient_id.as_ref())
        .map(|id| id.as_str())
        .unwrap_or(UNKNOWN_PATIENT_ID);

    let safe: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{REPORT_FILENAME_PREFIX}{safe}.txt")
}

/// Renders the report and writes it into the configured report directory.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns `TiltError::ReportDirMissing` if the directory does not exist, or
/// `TiltError::FileWrite` if the file cannot be written.
pub fn write_report(
    cfg: &CoreConfig,
    profile: Option<&PatientProfile>,
    results: Option<&TestResults>,
    generated_at: NaiveDateTime,
) -> TiltResult<PathBuf> {
    let dir = cfg.report_dir();
    if !dir.is_dir() {
        return Err(TiltError::ReportDirMissing(dir.to_path_buf()));
    }

    let path = dir.join(report_filename(profile));
    let text = render_report(profile, results, generated_at);
    std::fs::write(&path, text).map_err(TiltError::FileWrite)?;

    tracing::info!("report written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpretation::HemodynamicPattern;
    use crate::profile::{fixtures, ProvocationDrug};
    use crate::results::{
        BaselineVitals, DrugAdministration, DrugResponse, RecordedSample, Symptom, TestPhase,
        TestResult, VitalSample,
    };
    use chrono::NaiveDate;
    use tilt_types::NonEmptyText;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    fn field<'a>(report: &'a str, prefix: &str) -> &'a str {
        report
            .lines()
            .find_map(|l| l.strip_prefix(prefix))
            .unwrap_or_else(|| panic!("missing line {prefix}"))
    }

    #[test]
    fn test_render_empty_records_is_all_na() {
        let report = render_report(None, Some(&TestResults::default()), timestamp());

        assert!(report.starts_with("TILT TABLE TEST REPORT\nGenerated: 2026-03-14 09:30:05\n"));
        for line in report.lines().filter(|l| l.starts_with("- ")) {
            let value = line.split_once(": ").unwrap().1;
            assert!(value.starts_with("N/A"), "{line}");
        }
        assert_eq!(field(&report, "- Weight: "), "N/A kg");
        assert!(report.contains("INTERPRETATION:\nN/A\n"));
        assert!(report.ends_with("RECOMMENDATIONS:\nN/A\n"));
    }

    #[test]
    fn test_render_without_results_is_total() {
        let profile = fixtures::profile();
        let report = render_report(Some(&profile), None, timestamp());
        assert_eq!(field(&report, "- Patient ID: "), "PT-001");
        assert_eq!(field(&report, "- Test Result: "), "N/A");
    }

    #[test]
    fn test_render_sections_in_fixed_order() {
        let report = render_report(None, None, timestamp());
        let order = [
            "Generated:",
            "PATIENT INFORMATION:",
            "TEST PARAMETERS:",
            "BASELINE VITALS:",
            "RESULTS:",
            "INTERPRETATION:",
            "RECOMMENDATIONS:",
        ];
        let positions: Vec<usize> = order.iter().map(|h| report.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_render_populated_fields() {
        let profile = fixtures::profile();
        let results = TestResults {
            baseline: Some(BaselineVitals {
                hr_bpm: 72,
                sbp_mmhg: 124,
                dbp_mmhg: 78,
            }),
            samples: vec![RecordedSample {
                phase: TestPhase::PassiveTilt,
                sample: VitalSample {
                    time_min: 14.5,
                    hr_bpm: 38,
                    sbp_mmhg: 66,
                    dbp_mmhg: 40,
                    symptoms: [Symptom::CompleteLoc, Symptom::Nausea].into_iter().collect(),
                },
            }],
            drug: Some(DrugAdministration {
                drug: ProvocationDrug::Nitroglycerin,
                dose: 400.0,
            }),
            drug_response: Some(DrugResponse::Negative),
            min_hr_bpm: Some(38),
            min_sbp_mmhg: Some(66),
            pattern: Some(HemodynamicPattern::Cardioinhibitory),
            time_to_symptoms_min: Some(14.5),
            critical_event_min: None,
            result: Some(TestResult::VasovagalSyncope),
            interpretation: Some("Typical vasovagal response.".into()),
            recommendations: Some("- Fluids".into()),
            duration_min: Some(20.0),
        };

        let report = render_report(Some(&profile), Some(&results), timestamp());
        assert_eq!(field(&report, "- Weight: "), "62.5 kg");
        assert_eq!(field(&report, "- Indication: "), "Suspected vasovagal syncope");
        assert_eq!(field(&report, "- Tilt Angle: "), "70 degrees");
        assert_eq!(field(&report, "- Test Duration: "), "20.0 minutes");
        assert_eq!(field(&report, "- Drug Provocation: "), "Nitroglycerin");
        assert_eq!(field(&report, "- Drug Dose: "), "400 mcg");
        assert_eq!(field(&report, "- Baseline HR: "), "72 bpm");
        assert_eq!(field(&report, "- Test Result: "), "Positive - Vasovagal Syncope");
        assert_eq!(
            field(&report, "- Hemodynamic Pattern: "),
            "Cardioinhibitory (Predominant)"
        );
        assert_eq!(field(&report, "- Minimum SBP: "), "66 mmHg");
        assert_eq!(field(&report, "- Symptoms: "), "Nausea, Complete LOC");
        assert_eq!(field(&report, "- Time to Symptoms: "), "14.5 min");
        assert_eq!(field(&report, "- Drug Response: "), "Negative");
        assert!(report.contains("INTERPRETATION:\nTypical vasovagal response.\n"));
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename(None), "Tilt_Test_Report_Unknown.txt");

        let mut profile = fixtures::profile();
        assert_eq!(report_filename(Some(&profile)), "Tilt_Test_Report_PT-001.txt");

        profile.patient_id = None;
        assert_eq!(report_filename(Some(&profile)), "Tilt_Test_Report_Unknown.txt");

        profile.patient_id = NonEmptyText::optional("../etc/x y");
        assert_eq!(
            report_filename(Some(&profile)),
            "Tilt_Test_Report_.._etc_x_y.txt"
        );
    }

    #[test]
    fn test_write_report_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CoreConfig::new(dir.path().to_path_buf()).unwrap();
        let profile = fixtures::profile();

        let path = write_report(&cfg, Some(&profile), None, timestamp()).unwrap();
        assert_eq!(path, dir.path().join("Tilt_Test_Report_PT-001.txt"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("- Patient ID: PT-001"));
    }

    #[test]
    fn test_write_report_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CoreConfig::new(dir.path().join("absent")).unwrap();
        let err = write_report(&cfg, None, None, timestamp()).expect_err("missing dir");
        assert!(matches!(err, TiltError::ReportDirMissing(_)));
    }
}
