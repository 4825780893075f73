use chrono::prelude::{DateTime, Local};
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

pub mod cluster;

/// Installs the timestamped logger. Repeated calls are ignored.
pub fn init_logger() {
    let _ = env_logger::builder()
        .format(|buf, record| {
            let now: DateTime<Local> = Local::now();
            let now_str = now.format("%H:%M:%S.%3f").to_string();
            writeln!(buf, "{:5}: {} - {}", record.level(), now_str, record.args())
        })
        .is_test(true)
        .try_init();
}

pub fn get_peers_communication_timeout() -> Duration {
    Duration::from_millis(100)
}

pub fn get_client_communication_timeout() -> Duration {
    Duration::from_millis(1000)
}

pub fn get_heartbeat_timeout() -> Duration {
    Duration::from_millis(30)
}

pub fn get_election_base_timeout_ms() -> u64 {
    150
}

/// Generous bound for a leader to emerge or for entries to be applied.
pub fn get_convergence_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Polls the condition until it holds or the timeout elapses.
pub fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub fn sleep_ms(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}
