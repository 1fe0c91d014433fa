//! Periodic palette refresh. The first tick fires immediately, so the initial palette is
//! generated as soon as the task starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::theme::PaletteGenerator;

pub fn spawn_auto_update(generator: Arc<PaletteGenerator>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let palette = generator.generate().await;
            debug!("Auto-update refreshed palette: primary={}", palette.primary.main);
        }
    })
}
