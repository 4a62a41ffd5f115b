//! # Tilt Core
//!
//! Core logic for the head-up tilt table test assistant.
//!
//! This crate contains the session store and the pure interpretation engine:
//! - Preparation checklists and safety screening
//! - Patient setup and test results gathered phase by phase
//! - Live monitoring, hemodynamic pattern classification and canned clinical text
//! - The plain-text report and its filename
//!
//! **No presentation concerns**: page layout, prompts and terminal output belong in the
//! `tilt` binary.

pub mod checklist;
pub mod config;
pub mod constants;
pub mod error;
pub mod interpretation;
pub mod profile;
pub mod report;
pub mod results;
pub mod screening;
pub mod script;
pub mod session;
pub mod validation;

pub use config::CoreConfig;
pub use error::{TiltError, TiltResult};
pub use interpretation::{classify_pattern, HemodynamicPattern, PatternAnalysis, PatternInputs};
pub use profile::PatientProfile;
pub use results::{TestResult, TestResults};
pub use script::{ScriptOutcome, SessionScript};
pub use session::{ManualNadir, Session};
