use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilt_core::checklist::{ChecklistCategory, Readiness};
use tilt_core::config::report_dir_from_env_value;
use tilt_core::interpretation::canned_text;
use tilt_core::{
    classify_pattern, CoreConfig, HemodynamicPattern, PatternAnalysis, PatternInputs,
    ScriptOutcome, Session, SessionScript, TestResult,
};

#[derive(Parser)]
#[command(name = "tilt")]
#[command(about = "Head-up tilt table test assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session script and print the report
    Run {
        /// Path to the YAML session script
        script: PathBuf,
        /// Write the report file into TILT_REPORT_DIR
        #[arg(long)]
        write: bool,
        /// Print the outcome and results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the preparation checklists
    Checklist {
        /// One of equipment, medications, emergency, patient_prep
        category: Option<String>,
    },
    /// Classify a hemodynamic response from baseline and nadir vitals
    Classify {
        #[arg(long)]
        baseline_hr: u16,
        #[arg(long)]
        baseline_sbp: u16,
        #[arg(long)]
        min_hr: u16,
        #[arg(long)]
        min_sbp: u16,
        #[arg(long)]
        age: u8,
        #[arg(long)]
        json: bool,
    },
    /// Print the canned interpretation and recommendations for a result
    Text {
        /// Short name (vasovagal, orthostatic, pots, pseudosyncope, negative,
        /// indeterminate) or the full result label
        result: TestResult,
        /// Hemodynamic pattern, used to pick vasovagal recommendations
        #[arg(long)]
        pattern: Option<HemodynamicPattern>,
    },
}

/// Entry point for the `tilt` command line.
///
/// # Environment Variables
/// - `TILT_REPORT_DIR`: Directory where `run --write` places reports (default: ".")
/// - `RUST_LOG`: Log filter; `tilt=info` is always added
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("tilt=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            script,
            write,
            json,
        }) => run_script(&script, write, json)?,
        Some(Commands::Checklist { category }) => print_checklists(category.as_deref())?,
        Some(Commands::Classify {
            baseline_hr,
            baseline_sbp,
            min_hr,
            min_sbp,
            age,
            json,
        }) => {
            let analysis = classify_pattern(&PatternInputs {
                baseline_hr_bpm: baseline_hr,
                baseline_sbp_mmhg: baseline_sbp,
                min_hr_bpm: min_hr,
                min_sbp_mmhg: min_sbp,
                age_years: age,
            });
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
        }
        Some(Commands::Text { result, pattern }) => {
            let text = canned_text(result, pattern);
            println!("{}", result.label());
            println!();
            println!("INTERPRETATION:");
            println!("{}", text.interpretation);
            println!();
            println!("RECOMMENDATIONS:");
            println!("{}", text.recommendations);
        }
        None => {
            println!("Use 'tilt --help' for commands");
        }
    }

    Ok(())
}

fn run_script(path: &std::path::Path, write: bool, json: bool) -> anyhow::Result<()> {
    let script = SessionScript::load(path)
        .with_context(|| format!("loading session script {}", path.display()))?;

    let mut session = Session::new();
    let outcome = script.apply(&mut session)?;
    let generated_at = Local::now().naive_local();

    if json {
        let doc = serde_json::json!({
            "session_id": session.id().to_string(),
            "started_at": session.started_at().to_rfc3339(),
            "checklists": ChecklistCategory::ALL
                .iter()
                .map(|c| (c.key(), session.completion(*c).value()))
                .collect::<std::collections::BTreeMap<_, _>>(),
            "outcome": outcome,
            "patient": session.patient_profile(),
            "results": session.results(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_outcome(&session, &outcome);
        println!();
        print!("{}", session.render_report(generated_at));
    }

    if write {
        let cfg = CoreConfig::new(report_dir_from_env_value(
            std::env::var("TILT_REPORT_DIR").ok(),
        ))?;
        let written = session.write_report(&cfg, generated_at)?;
        eprintln!("Report written to {}", written.display());
    }

    Ok(())
}

fn print_outcome(session: &Session, outcome: &ScriptOutcome) {
    println!("== Checklists ==");
    for category in ChecklistCategory::ALL {
        let completion = session.completion(category);
        println!(
            "{}: {} ({})",
            category.title(),
            completion,
            Readiness::from_completion(completion).label()
        );
    }

    if let Some(screening) = &outcome.screening {
        println!();
        println!("== Screening ({}) ==", screening.risk.label());
        for message in screening.messages() {
            println!("{message}");
        }
    }

    if !outcome.alerts.is_empty() {
        println!();
        println!("== Monitoring alerts ==");
        for alert in &outcome.alerts {
            let kind = if alert.assessment.critical_event {
                "CRITICAL EVENT: syncope or severe hypotension, lower the table"
            } else {
                "POTS pattern: HR rise without significant BP drop"
            };
            println!(
                "[{} @ {} min] {kind} (HR {:+.1}%, SBP {:+.1}%)",
                alert.phase.label(),
                alert.time_min,
                alert.assessment.hr_change_percent,
                alert.assessment.sbp_change_percent
            );
        }
    }

    if let Some(analysis) = &outcome.analysis {
        println!();
        println!("== Analysis ==");
        print_analysis(analysis);
    }
}

fn print_analysis(analysis: &PatternAnalysis) {
    println!("Pattern: {}", analysis.pattern.label());
    println!("HR drop: {} bpm", analysis.hr_drop_bpm);
    println!("BP drop: {} mmHg", analysis.bp_drop_mmhg);
    println!("{}", analysis.pattern.summary());
    if let Some(advisory) = analysis.age_advisory {
        println!("{advisory}");
    }
}

fn print_checklists(category: Option<&str>) -> anyhow::Result<()> {
    let categories = match category {
        Some(key) => vec![ChecklistCategory::from_key(key)
            .with_context(|| format!("unknown checklist category: {key}"))?],
        None => ChecklistCategory::ALL.to_vec(),
    };

    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} ({})", category.title(), category.key());
        for item in category.items() {
            println!("  [ ] {item}");
        }
    }
    Ok(())
}
