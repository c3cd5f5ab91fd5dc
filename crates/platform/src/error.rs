//! Error type shared by the power backends.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading energy counters.
///
/// Discovery never produces these: an unreadable interface root degrades to
/// an empty domain set. They surface from sampling, where a failed read means
/// the whole sample is unusable.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid energy counter in {}: {content:?}", .path.display())]
    Parse { path: PathBuf, content: String },

    #[error("sum of sub-domain counters overflows in {}", .path.display())]
    Overflow { path: PathBuf },
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Error::Read { path, source }
    }

    /// Returns true if the underlying failure was a permission error.
    ///
    /// Energy counters are root-only on most recent kernels, so this is the
    /// usual reason sampling fails on an otherwise supported machine.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::Read { source, .. } if source.kind() == io::ErrorKind::PermissionDenied)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
