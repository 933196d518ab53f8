//! Session-expiry notification hook.

/// Callback invoked when the session terminally expires.
///
/// Fired at most once per failed refresh cycle, after the stored tokens
/// have been cleared. The embedding application decides what "force
/// re-authentication" means: a CLI prints a message, a GUI navigates to
/// its login view.
pub trait SessionExpired: Send + Sync {
    /// Called when a token refresh terminally fails.
    fn on_session_expired(&self);
}

impl<F> SessionExpired for F
where
    F: Fn() + Send + Sync,
{
    fn on_session_expired(&self) {
        self()
    }
}

/// Hook that does nothing; the default for library consumers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionExpired;

impl SessionExpired for NoopSessionExpired {
    fn on_session_expired(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn closures_implement_the_hook() {
        static FIRED: AtomicUsize = AtomicUsize::new(0);
        let hook = || {
            FIRED.fetch_add(1, Ordering::SeqCst);
        };
        hook.on_session_expired();
        assert_eq!(FIRED.load(Ordering::SeqCst), 1);
    }
}
