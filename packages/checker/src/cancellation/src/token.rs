// Cancellation Token
//
// A checked flag with linked parents. Clones share the flag, so the host can
// cancel an iteration that is running on the worker thread. A token may also
// be backed by a marker file, which lets a host in another process cancel it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{CheckerError, Result};

/// Minimum delay between two reads of the marker file.
const MARKER_CHECK_INTERVAL: Duration = Duration::from_millis(10);

static NEXT_MARKER_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
struct TokenState {
    cancelled: AtomicBool,
    marker_file: Option<PathBuf>,
    last_marker_check: Mutex<Option<Instant>>,
}

impl TokenState {
    fn new(marker_file: Option<PathBuf>) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            marker_file,
            last_marker_check: Mutex::new(None),
        }
    }

    fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return true;
        }
        let Some(marker) = &self.marker_file else {
            return false;
        };

        let mut last_check = match self.last_marker_check.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        if let Some(last) = *last_check {
            if now.duration_since(last) < MARKER_CHECK_INTERVAL {
                return false;
            }
        }
        *last_check = Some(now);

        if marker.exists() {
            self.cancelled.store(true, Ordering::Release);
            return true;
        }
        false
    }
}

/// Cooperative cancellation handle.
///
/// A token is *active* until cancellation is requested on it or on any of its
/// ancestors. Cancellation is never undone.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<TokenState>,
    parents: Vec<CancellationToken>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            state: Arc::new(TokenState::new(None)),
            parents: Vec::new(),
        }
    }

    /// A token that is also cancelled once `marker_file` exists.
    pub fn with_marker_file(marker_file: impl Into<PathBuf>) -> Self {
        Self {
            state: Arc::new(TokenState::new(Some(marker_file.into()))),
            parents: Vec::new(),
        }
    }

    /// A marker-file token with a fresh file name in the system temp dir.
    pub fn with_unique_marker_file() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let name = format!(
            "checker-cancellation-{}-{}-{}.flag",
            std::process::id(),
            NEXT_MARKER_ID.fetch_add(1, Ordering::Relaxed),
            nanos
        );
        Self::with_marker_file(std::env::temp_dir().join(name))
    }

    /// A new token linked to this one: cancelling `self` cancels the child,
    /// cancelling the child leaves `self` untouched.
    pub fn child(&self) -> Self {
        Self {
            state: Arc::new(TokenState::new(None)),
            parents: vec![self.clone()],
        }
    }

    /// A child of both `self` and `other`: cancelling either one cancels
    /// the returned token.
    pub fn linked_with(&self, other: &CancellationToken) -> Self {
        Self {
            state: Arc::new(TokenState::new(None)),
            parents: vec![self.clone(), other.clone()],
        }
    }

    pub fn marker_file(&self) -> Option<&Path> {
        self.state.marker_file.as_deref()
    }

    /// Pure query; never fails.
    pub fn is_cancellation_requested(&self) -> bool {
        if self.state.is_cancelled() {
            return true;
        }
        self.parents.iter().any(|parent| parent.is_cancellation_requested())
    }

    /// Fails with [`CheckerError::Cancelled`] iff this token or an ancestor
    /// has been cancelled.
    pub fn throw_if_cancellation_requested(&self) -> Result<()> {
        if self.is_cancellation_requested() {
            return Err(CheckerError::Cancelled);
        }
        Ok(())
    }

    pub fn request_cancellation(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        if let Some(marker) = &self.state.marker_file {
            if let Err(error) = fs::write(marker, b"") {
                tracing::warn!(
                    marker = %marker.display(),
                    %error,
                    "failed to write cancellation marker"
                );
            }
        }
    }

    /// Remove the marker file, if any. The in-memory flag stays set.
    pub fn cleanup_cancellation(&self) {
        if let Some(marker) = &self.state.marker_file {
            if marker.exists() {
                if let Err(error) = fs::remove_file(marker) {
                    tracing::debug!(
                        marker = %marker.display(),
                        %error,
                        "failed to remove cancellation marker"
                    );
                }
            }
        }
    }

    pub fn to_descriptor(&self) -> CancellationTokenDescriptor {
        CancellationTokenDescriptor {
            marker_file: self.state.marker_file.clone(),
            cancelled: self.state.cancelled.load(Ordering::Acquire),
        }
    }

    pub fn from_descriptor(descriptor: &CancellationTokenDescriptor) -> Self {
        let token = Self {
            state: Arc::new(TokenState::new(descriptor.marker_file.clone())),
            parents: Vec::new(),
        };
        if descriptor.cancelled {
            token.state.cancelled.store(true, Ordering::Release);
        }
        token
    }
}

/// Serializable form of a token for crossing a process boundary. Only the
/// marker file carries cancellation across; the flag is a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationTokenDescriptor {
    pub marker_file: Option<PathBuf>,
    #[serde(default)]
    pub cancelled: bool,
}
