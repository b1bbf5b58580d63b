use std::ops::{Deref, DerefMut};

use log::debug;

use super::RecognitionSession;

/// Owns a session and terminates it when dropped
///
/// Covers success, early return, `?` propagation and unwinding alike.
pub struct SessionGuard<S: RecognitionSession> {
    session: S,
}

impl<S: RecognitionSession> SessionGuard<S> {
    /// Take ownership of a started session
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: RecognitionSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: RecognitionSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: RecognitionSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        debug!("terminating recognition session");
        self.session.terminate();
    }
}
