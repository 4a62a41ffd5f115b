#[derive(Debug, thiserror::Error)]
pub enum TiltError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Types(#[from] tilt_types::TypesError),

    #[error("patient setup has not been saved; complete patient setup before testing")]
    PatientProfileMissing,
    #[error("no test data available; complete the test before analysis")]
    TestResultsMissing,
    #[error("no baseline vitals available for comparison")]
    BaselineMissing,
    #[error("no vital signs recorded and no manual nadir supplied")]
    NadirMissing,
    #[error("record the drug administration before post-drug vitals")]
    DrugNotAdministered,

    #[error("report directory does not exist: {}", .0.display())]
    ReportDirMissing(std::path::PathBuf),
    #[error("failed to write report file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read session script: {0}")]
    FileRead(std::io::Error),
    #[error("session script schema mismatch: {0}")]
    ScriptParse(String),
}

pub type TiltResult<T> = std::result::Result<T, TiltError>;
