// The pick clock: a server-owned countdown that fires the auto-pick
// fallback when a human lets their turn expire.
//
// One clock is armed per pending pick and disarmed the moment a pick lands.
// A clock that fires late is harmless: the expiry callback carries the pick
// number it was armed for, and the draft rejects stale picks.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// A single armed countdown.
pub struct PickClock {
    handle: Option<JoinHandle<()>>,
    pick_number: u32,
}

impl PickClock {
    /// Arm a countdown for a pick. `on_expiry` runs at most once, after the
    /// full duration, unless the clock is disarmed first.
    ///
    /// Disarming cancels the countdown only; a callback that already started
    /// runs detached to completion. The callback itself may therefore disarm
    /// and re-arm the clock (the auto-pick path does exactly that) without
    /// cancelling its own execution.
    pub fn arm<F>(duration: Duration, pick_number: u32, on_expiry: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        debug!(pick = pick_number, secs = duration.as_secs(), "pick clock armed");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            tokio::spawn(on_expiry);
        });
        PickClock {
            handle: Some(handle),
            pick_number,
        }
    }

    /// Stop the countdown. Safe to call after expiry or repeatedly.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(pick = self.pick_number, "pick clock disarmed");
        }
    }

    /// The pick this clock was armed for.
    pub fn pick_number(&self) -> u32 {
        self.pick_number
    }
}

impl Drop for PickClock {
    fn drop(&mut self) {
        self.disarm();
    }
}
