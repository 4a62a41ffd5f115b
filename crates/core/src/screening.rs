//! Safety screening before tilt testing.
//!
//! Screening never blocks the session on its own. It produces an outcome that the front end
//! shows to the operator, who decides whether to seek clearance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Conditions that should stop the test without cardiology clearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Contraindication {
    #[serde(rename = "Severe coronary artery disease")]
    SevereCoronaryArteryDisease,
    #[serde(rename = "Recent MI (<3 months)")]
    RecentMyocardialInfarction,
    #[serde(rename = "Severe aortic stenosis")]
    SevereAorticStenosis,
    #[serde(rename = "Severe cerebrovascular disease")]
    SevereCerebrovascularDisease,
    #[serde(rename = "Pregnancy")]
    Pregnancy,
    #[serde(rename = "Uncontrolled hypertension")]
    UncontrolledHypertension,
    #[serde(rename = "LV outflow tract obstruction")]
    LvOutflowTractObstruction,
    #[serde(rename = "Severe anemia")]
    SevereAnemia,
    #[serde(rename = "Acute illness/dehydration")]
    AcuteIllnessOrDehydration,
}

/// Conditions that argue against isoproterenol provocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IsoproterenolContraindication {
    #[serde(rename = "Coronary artery disease")]
    CoronaryArteryDisease,
    #[serde(rename = "Uncontrolled HTN")]
    UncontrolledHypertension,
    #[serde(rename = "LVOT obstruction")]
    LvotObstruction,
    #[serde(rename = "Aortic stenosis")]
    AorticStenosis,
    #[serde(rename = "History of VT/VF")]
    VentricularArrhythmiaHistory,
    #[serde(rename = "Recent MI")]
    RecentMyocardialInfarction,
}

/// Recent phosphodiesterase-5 inhibitor use inside its washout window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecentPde5Inhibitor {
    #[serde(rename = "Sildenafil (<24h)")]
    Sildenafil,
    #[serde(rename = "Vardenafil (<24h)")]
    Vardenafil,
    #[serde(rename = "Tadalafil (<48h)")]
    Tadalafil,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// No structural heart disease.
    #[default]
    Low,
    /// Controlled comorbidities.
    Intermediate,
    /// Structural heart disease present.
    High,
}

impl RiskCategory {
    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "Low Risk (No structural heart disease)",
            RiskCategory::Intermediate => "Intermediate Risk (Controlled comorbidities)",
            RiskCategory::High => "High Risk (Structural heart disease present)",
        }
    }
}

const HIGH_RISK_PRECAUTIONS: &[&str] = &[
    "Cardiology consultation recommended",
    "Exclude cardiac causes before tilt testing",
    "Consider alternative diagnostic methods",
    "Have advanced life support immediately available",
];

/// Everything the operator ticked on the screening page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreeningInput {
    #[serde(default)]
    pub contraindications: BTreeSet<Contraindication>,
    #[serde(default)]
    pub isoproterenol: BTreeSet<IsoproterenolContraindication>,
    #[serde(default)]
    pub pde5_inhibitors: BTreeSet<RecentPde5Inhibitor>,
    #[serde(default)]
    pub risk: RiskCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreeningOutcome {
    pub contraindication_count: usize,
    pub isoproterenol_warning_count: usize,
    pub nitroglycerin_contraindicated: bool,
    pub risk: RiskCategory,
    pub high_risk_precautions: &'static [&'static str],
}

impl ScreeningOutcome {
    /// True when no absolute contraindication was identified.
    pub fn clear_to_proceed(&self) -> bool {
        self.contraindication_count == 0
    }

    /// Operator-facing messages, most severe first.
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.contraindication_count > 0 {
            out.push(format!(
                "{} contraindication(s) identified. Test should NOT proceed without cardiology clearance.",
                self.contraindication_count
            ));
        } else {
            out.push("No absolute contraindications identified".to_owned());
        }
        if self.isoproterenol_warning_count > 0 {
            out.push(format!(
                "{} contraindication(s) for Isoproterenol",
                self.isoproterenol_warning_count
            ));
        }
        if self.nitroglycerin_contraindicated {
            out.push("Nitroglycerin contraindicated! Wait appropriate washout period.".to_owned());
        }
        if !self.high_risk_precautions.is_empty() {
            out.push("HIGH RISK PATIENT - Additional precautions required".to_owned());
            out.extend(self.high_risk_precautions.iter().map(|p| format!("  - {p}")));
        }
        out
    }
}

/// Evaluates the screening selections.
pub fn screen(input: &ScreeningInput) -> ScreeningOutcome {
    let outcome = ScreeningOutcome {
        contraindication_count: input.contraindications.len(),
        isoproterenol_warning_count: input.isoproterenol.len(),
        nitroglycerin_contraindicated: !input.pde5_inhibitors.is_empty(),
        risk: input.risk,
        high_risk_precautions: match input.risk {
            RiskCategory::High => HIGH_RISK_PRECAUTIONS,
            _ => &[],
        },
    };

    if !outcome.clear_to_proceed() {
        tracing::warn!(
            count = outcome.contraindication_count,
            "contraindications identified during screening"
        );
    }

    outcome
}
