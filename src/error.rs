//! Fatal error classes.
//!
//! Everything here aborts the run. Directories that cannot be listed are not
//! errors; they simply fail to qualify for the impacted set.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlimError {
    #[error("failed to start {program}: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {args} failed ({status}): {stderr}")]
    CommandFailed {
        program: String,
        args: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("cannot resolve import path {import_path}: {reason}")]
    Unresolved { import_path: String, reason: String },

    #[error(
        "package {import_path} at {} is outside the project root {}",
        .dir.display(),
        .root.display()
    )]
    OutsideRoot {
        import_path: String,
        dir: PathBuf,
        root: PathBuf,
    },

    #[error("unexpected output from {program}: {detail}")]
    MalformedOutput { program: String, detail: String },
}
