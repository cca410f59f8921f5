//! Idle timeout for signed-in sessions.

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::ports::ActivityEvent;

use super::SessionManager;

/// How long a session may sit without user activity (15 minutes).
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Background task logging the user out after `timeout` without activity.
///
/// Every activity event restarts the countdown. When the countdown runs out
/// the session is ended (a no-op when nobody is signed in) and the timer
/// stays disarmed until the next activity. The task stops when the handle
/// is dropped or `shutdown` is called.
pub struct IdleWatchdog {
    handle: JoinHandle<()>,
}

impl IdleWatchdog {
    /// Start watching `activity`. Must be called inside a tokio runtime.
    pub fn spawn<S>(manager: Arc<SessionManager>, activity: S, timeout: Duration) -> Self
    where
        S: Stream<Item = ActivityEvent> + Send + 'static,
    {
        let handle = tokio::spawn(run(manager, Box::pin(activity), timeout));
        Self { handle }
    }

    pub fn shutdown(self) {
        // Drop aborts the task
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run<S>(manager: Arc<SessionManager>, mut activity: S, timeout: Duration)
where
    S: Stream<Item = ActivityEvent> + Unpin,
{
    debug!(timeout_secs = timeout.as_secs(), "Idle watchdog started");

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);
    let mut armed = true;
    let mut source_open = true;

    loop {
        if !armed && !source_open {
            break;
        }

        tokio::select! {
            event = activity.next(), if source_open => match event {
                Some(event) => {
                    trace!(?event, "User activity");
                    deadline.as_mut().reset(Instant::now() + timeout);
                    armed = true;
                }
                None => {
                    debug!("Activity source closed");
                    source_open = false;
                }
            },
            () = &mut deadline, if armed => {
                armed = false;
                if manager.expire_for_inactivity() {
                    debug!("Idle timeout reached");
                }
            }
        }
    }

    debug!("Idle watchdog stopped");
}
