//! Input validation at the form boundary.
//!
//! Every numeric field has a declared range in [`crate::constants`]. These checks run when
//! operator input enters the system (the session script loader) so that the session store
//! and the interpretation engine can treat their inputs as already valid.

use crate::constants::{
    AGE_YEARS, BASELINE_DBP_MMHG, BASELINE_HR_BPM, BASELINE_SBP_MMHG, BASELINE_SPO2_PERCENT,
    ISOPROTERENOL_DOSE_MCG_PER_MIN, MANUAL_NADIR_HR_BPM, MANUAL_NADIR_SBP_MMHG, MAX_DURATION_MIN,
    NITROGLYCERIN_DOSE_MCG, POST_DRUG_TIME_MIN, SAMPLE_DBP_MMHG, SAMPLE_HR_BPM, SAMPLE_SBP_MMHG,
    TILT_ANGLE_DEG, TILT_TIME_MIN, TIME_TO_SYMPTOMS_MIN, WEIGHT_KG,
};
use crate::profile::{PatientProfile, ProvocationDrug};
use crate::results::{BaselineVitals, VitalSample};
use crate::session::ManualNadir;
use crate::TiltResult;

/// Checks every numeric field submitted by the patient setup form.
///
/// # Errors
///
/// Returns `TiltError::Types` naming the first field that is out of range.
pub fn validate_profile(profile: &PatientProfile) -> TiltResult<()> {
    AGE_YEARS.check("age_years", profile.age_years)?;
    WEIGHT_KG.check("weight_kg", profile.weight_kg)?;
    TILT_ANGLE_DEG.check("tilt_angle_deg", profile.tilt_angle_deg)?;
    MAX_DURATION_MIN.check("max_duration_min", profile.max_duration_min)?;
    BASELINE_HR_BPM.check("baseline.hr_bpm", profile.baseline.hr_bpm)?;
    BASELINE_SBP_MMHG.check("baseline.sbp_mmhg", profile.baseline.sbp_mmhg)?;
    BASELINE_DBP_MMHG.check("baseline.dbp_mmhg", profile.baseline.dbp_mmhg)?;
    BASELINE_SPO2_PERCENT.check("baseline.spo2_percent", profile.baseline.spo2_percent)?;
    Ok(())
}

/// The supine confirmation form shares the setup form's baseline ranges.
pub fn validate_baseline(baseline: &BaselineVitals) -> TiltResult<()> {
    BASELINE_HR_BPM.check("baseline.hr_bpm", baseline.hr_bpm)?;
    BASELINE_SBP_MMHG.check("baseline.sbp_mmhg", baseline.sbp_mmhg)?;
    BASELINE_DBP_MMHG.check("baseline.dbp_mmhg", baseline.dbp_mmhg)?;
    Ok(())
}

fn validate_sample_vitals(sample: &VitalSample) -> TiltResult<()> {
    SAMPLE_HR_BPM.check("sample.hr_bpm", sample.hr_bpm)?;
    SAMPLE_SBP_MMHG.check("sample.sbp_mmhg", sample.sbp_mmhg)?;
    SAMPLE_DBP_MMHG.check("sample.dbp_mmhg", sample.dbp_mmhg)?;
    Ok(())
}

/// A passive-tilt sample: time at tilt up to 60 minutes.
pub fn validate_tilt_sample(sample: &VitalSample) -> TiltResult<()> {
    TILT_TIME_MIN.check("sample.time_min", sample.time_min)?;
    validate_sample_vitals(sample)
}

/// A post-drug sample: time since administration up to 30 minutes.
pub fn validate_drug_sample(sample: &VitalSample) -> TiltResult<()> {
    POST_DRUG_TIME_MIN.check("sample.time_min", sample.time_min)?;
    validate_sample_vitals(sample)
}

pub fn validate_drug_dose(drug: ProvocationDrug, dose: f64) -> TiltResult<()> {
    match drug {
        ProvocationDrug::Isoproterenol => ISOPROTERENOL_DOSE_MCG_PER_MIN.check("drug.dose", dose)?,
        ProvocationDrug::Nitroglycerin => NITROGLYCERIN_DOSE_MCG.check("drug.dose", dose)?,
    };
    Ok(())
}

pub fn validate_manual_nadir(nadir: &ManualNadir) -> TiltResult<()> {
    MANUAL_NADIR_HR_BPM.check("nadir.min_hr_bpm", nadir.min_hr_bpm)?;
    MANUAL_NADIR_SBP_MMHG.check("nadir.min_sbp_mmhg", nadir.min_sbp_mmhg)?;
    if let Some(time) = nadir.time_to_symptoms_min {
        TIME_TO_SYMPTOMS_MIN.check("nadir.time_to_symptoms_min", time)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures;
    use crate::TiltError;
    use tilt_types::TypesError;

    fn sample(time_min: f64, hr: u16, sbp: u16) -> VitalSample {
        VitalSample {
            time_min,
            hr_bpm: hr,
            sbp_mmhg: sbp,
            dbp_mmhg: 70,
            symptoms: Default::default(),
        }
    }

    #[test]
    fn test_validate_profile_accepts_fixture() {
        assert!(validate_profile(&fixtures::profile()).is_ok());
    }

    #[test]
    fn test_validate_profile_names_offending_field() {
        let mut profile = fixtures::profile();
        profile.tilt_angle_deg = 85;
        let err = validate_profile(&profile).expect_err("tilt angle out of range");
        assert!(matches!(
            err,
            TiltError::Types(TypesError::OutOfRange { field: "tilt_angle_deg", .. })
        ));
    }

    #[test]
    fn test_validate_profile_rejects_low_weight() {
        let mut profile = fixtures::profile();
        profile.weight_kg = 29.9;
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn test_tilt_and_drug_samples_use_different_time_ranges() {
        let late = sample(45.0, 80, 110);
        assert!(validate_tilt_sample(&late).is_ok());
        assert!(validate_drug_sample(&late).is_err());
    }

    #[test]
    fn test_sample_vitals_ranges() {
        assert!(validate_tilt_sample(&sample(5.0, 29, 110)).is_err());
        assert!(validate_tilt_sample(&sample(5.0, 30, 50)).is_ok());
        assert!(validate_tilt_sample(&sample(-0.5, 80, 110)).is_err());
    }

    #[test]
    fn test_drug_dose_ranges_depend_on_drug() {
        assert!(validate_drug_dose(ProvocationDrug::Isoproterenol, 3.0).is_ok());
        assert!(validate_drug_dose(ProvocationDrug::Isoproterenol, 400.0).is_err());
        assert!(validate_drug_dose(ProvocationDrug::Nitroglycerin, 400.0).is_ok());
    }

    #[test]
    fn test_manual_nadir_range() {
        let nadir = ManualNadir {
            min_hr_bpm: 50,
            min_sbp_mmhg: 39,
            time_to_symptoms_min: None,
        };
        assert!(validate_manual_nadir(&nadir).is_err());
    }
}
