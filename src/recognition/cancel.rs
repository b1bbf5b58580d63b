use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{info, warn};

use crate::error::ImportError;

/// Shared cancellation flag, checked between recognition requests
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    attempt: u64,
}

impl CancelToken {
    /// Create an un-cancelled token not tied to any coordinator (attempt 0)
    pub fn new() -> Self {
        Self::default()
    }

    fn for_attempt(attempt: u64) -> Self {
        Self {
            flag: Arc::default(),
            attempt,
        }
    }

    /// Attempt this token belongs to
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// What to do when an import starts while another is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyPolicy {
    /// Cancel the in-flight attempt and start the new one
    #[default]
    Supersede,
    /// Refuse the new attempt with [`ImportError::Busy`]
    Reject,
}

#[derive(Debug)]
struct Active {
    id: u64,
    token: CancelToken,
}

#[derive(Debug)]
struct Inner {
    next_id: AtomicU64,
    active: Mutex<Option<Active>>,
    policy: ConcurrencyPolicy,
}

/// Single-flight gate for import attempts.
///
/// Each attempt gets a fresh id and cancel token. Results are delivered only
/// if the attempt is still the current one and was not cancelled, so a
/// superseded attempt can never write into a newer attempt's grid.
#[derive(Debug, Clone, Default)]
pub struct ImportCoordinator {
    inner: Arc<Inner>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            active: Mutex::new(None),
            policy: ConcurrencyPolicy::default(),
        }
    }
}

impl ImportCoordinator {
    /// Coordinator with the given policy
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Active>> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new attempt
    pub fn begin(&self) -> Result<AttemptTicket, ImportError> {
        let mut active = self.lock();
        if let Some(current) = active.as_ref() {
            match self.inner.policy {
                ConcurrencyPolicy::Reject => {
                    return Err(ImportError::Busy {
                        in_flight: current.id,
                    });
                }
                ConcurrencyPolicy::Supersede => {
                    warn!("import attempt {} superseded", current.id);
                    current.token.cancel();
                }
            }
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancelToken::for_attempt(id);
        *active = Some(Active {
            id,
            token: token.clone(),
        });
        info!("import attempt {} started", id);

        Ok(AttemptTicket {
            id,
            token,
            coordinator: self.clone(),
        })
    }

    /// Cancel whatever attempt is in flight (retake, dialog closed)
    pub fn cancel_current(&self) -> Option<u64> {
        let active = self.lock();
        active.as_ref().map(|a| {
            info!("import attempt {} cancelled", a.id);
            a.token.cancel();
            a.id
        })
    }

    /// Id of the attempt in flight, if any
    pub fn in_flight(&self) -> Option<u64> {
        self.lock().as_ref().map(|a| a.id)
    }

    fn deliver<T>(&self, ticket: &AttemptTicket, value: T) -> Result<T, ImportError> {
        let active = self.lock();
        match active.as_ref() {
            Some(a) if a.id == ticket.id => {
                if ticket.token.is_cancelled() {
                    Err(ImportError::Cancelled { attempt: ticket.id })
                } else {
                    Ok(value)
                }
            }
            Some(a) => Err(ImportError::Superseded {
                attempt: ticket.id,
                current: a.id,
            }),
            None => Err(ImportError::Cancelled { attempt: ticket.id }),
        }
    }

    fn release(&self, id: u64) {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|a| a.id == id) {
            *active = None;
        }
    }
}

/// Identity and cancel token of one import attempt.
///
/// Dropping the ticket frees the coordinator for the next attempt.
#[derive(Debug)]
pub struct AttemptTicket {
    id: u64,
    token: CancelToken,
    coordinator: ImportCoordinator,
}

impl AttemptTicket {
    /// Attempt id, unique per coordinator
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Token observed by the recognition loop
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Whether this attempt was cancelled or superseded
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Hand `value` to the caller if this attempt is still current
    pub fn deliver<T>(self, value: T) -> Result<T, ImportError> {
        self.coordinator.deliver(&self, value)
    }
}

impl Drop for AttemptTicket {
    fn drop(&mut self) {
        self.coordinator.release(self.id);
    }
}
