use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds that end the run, each with its own exit code so scripts
/// can tell them apart. Everything else funnels through `Other` and exits 1.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("link dump not found: {0}")]
    MissingLinkDump(PathBuf),
    #[error("catalog not found: {0}")]
    MissingCatalog(PathBuf),
    #[error("no valid share links parsed from {0}")]
    EmptyLinkTable(PathBuf),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::MissingLinkDump(_) => 2,
            AppError::MissingCatalog(_) => 3,
            AppError::EmptyLinkTable(_) => 4,
            AppError::Other(_) => 1,
        }
    }
}
