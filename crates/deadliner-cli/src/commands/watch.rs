//! Deadline monitor loop.
//!
//! Re-arms timers from storage, then ticks the scheduler on an interval.
//! All timer callbacks run inside `tick()` on this thread; the loop is the
//! single actor every state mutation goes through.

use std::time::Duration;

use deadliner_core::{Config, DeadlineScheduler};

use crate::notify;

pub fn run(interval: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let tick_secs = interval.unwrap_or(config.monitor.tick_secs).max(1);

    let mut scheduler = DeadlineScheduler::open()?;
    if config.notifications.enabled {
        notify::subscribe(scheduler.bus_mut());
    }
    scheduler.setup_deadline_monitoring()?;

    let armed = scheduler.today_tasks()?.len();
    println!("Monitoring {armed} task(s) for today; ticking every {tick_secs}s. Ctrl-C to stop.");

    loop {
        scheduler.tick()?;
        std::thread::sleep(Duration::from_secs(tick_secs));
    }
}
