//! Constants used throughout the tilt core crate.
//!
//! Clinical cutoffs for the interpretation engine and the declared input ranges for every
//! form field live here, so that a reviewer can audit them in one place.

use tilt_types::ClinicalRange;

// ============================================================================
// Pattern classification cutoffs
// ============================================================================

/// Systolic drop from baseline treated as a significant vasodepressor response.
pub const SIGNIFICANT_BP_DROP_MMHG: i32 = 40;

/// Heart-rate drop from baseline treated as a significant cardioinhibitory response.
pub const SIGNIFICANT_HR_DROP_BPM: i32 = 60;

/// Nadir heart rate below which the response is cardioinhibitory regardless of the drop.
pub const BRADYCARDIA_FLOOR_BPM: i32 = 40;

/// Heart-rate rise over baseline for the POTS pattern.
pub const POTS_HR_RISE_BPM: i32 = 30;

/// Systolic drop that must not be reached for the POTS pattern.
pub const POTS_MAX_BP_DROP_MMHG: i32 = 10;

/// Patients older than this get the age advisory on a vasodepressor response.
pub const AGE_ADVISORY_THRESHOLD_YEARS: u8 = 60;

// ============================================================================
// Live monitoring cutoffs
// ============================================================================

/// Systolic pressure below which a sample is a critical event.
pub const CRITICAL_SBP_MMHG: u16 = 70;

/// Heart rate below which a sample is a critical event.
pub const CRITICAL_HR_BPM: u16 = 40;

/// Heart-rate change from baseline, in percent, above which the POTS alert may fire.
pub const POTS_ALERT_HR_CHANGE_PERCENT: f64 = 30.0;

/// Systolic change from baseline, in percent, that must stay below this for the POTS alert.
pub const POTS_ALERT_SBP_CHANGE_PERCENT: f64 = 10.0;

// ============================================================================
// Patient setup ranges
// ============================================================================

pub const AGE_YEARS: ClinicalRange<u8> = ClinicalRange::new(10, 100);
pub const WEIGHT_KG: ClinicalRange<f64> = ClinicalRange::new(30.0, 200.0);
pub const TILT_ANGLE_DEG: ClinicalRange<u8> = ClinicalRange::new(60, 80);
pub const MAX_DURATION_MIN: ClinicalRange<u8> = ClinicalRange::new(15, 60);
pub const BASELINE_HR_BPM: ClinicalRange<u16> = ClinicalRange::new(40, 150);
pub const BASELINE_SBP_MMHG: ClinicalRange<u16> = ClinicalRange::new(80, 200);
pub const BASELINE_DBP_MMHG: ClinicalRange<u16> = ClinicalRange::new(40, 120);
pub const BASELINE_SPO2_PERCENT: ClinicalRange<u8> = ClinicalRange::new(90, 100);

// ============================================================================
// Test phase ranges
// ============================================================================

pub const TILT_TIME_MIN: ClinicalRange<f64> = ClinicalRange::new(0.0, 60.0);
pub const SAMPLE_HR_BPM: ClinicalRange<u16> = ClinicalRange::new(30, 200);
pub const SAMPLE_SBP_MMHG: ClinicalRange<u16> = ClinicalRange::new(50, 250);
pub const SAMPLE_DBP_MMHG: ClinicalRange<u16> = ClinicalRange::new(30, 150);
pub const POST_DRUG_TIME_MIN: ClinicalRange<f64> = ClinicalRange::new(0.0, 30.0);
pub const ISOPROTERENOL_DOSE_MCG_PER_MIN: ClinicalRange<f64> = ClinicalRange::new(0.0, 5.0);
pub const NITROGLYCERIN_DOSE_MCG: ClinicalRange<f64> = ClinicalRange::new(0.0, 800.0);
pub const MANUAL_NADIR_HR_BPM: ClinicalRange<u16> = ClinicalRange::new(30, 200);
pub const MANUAL_NADIR_SBP_MMHG: ClinicalRange<u16> = ClinicalRange::new(40, 250);
pub const TIME_TO_SYMPTOMS_MIN: ClinicalRange<f64> = ClinicalRange::new(0.0, 60.0);

// ============================================================================
// Report
// ============================================================================

/// Placeholder rendered for any absent report field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Prefix of the report filename; the patient identifier and `.txt` follow.
pub const REPORT_FILENAME_PREFIX: &str = "Tilt_Test_Report_";

/// Identifier used in the report filename when the patient has none.
pub const UNKNOWN_PATIENT_ID: &str = "Unknown";

/// Timestamp format on the report's "Generated" line.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default directory for written reports when no explicit directory is configured.
pub const DEFAULT_REPORT_DIR: &str = ".";
