use std::sync::atomic::{AtomicU16, Ordering};
use crate::constants::FIRST_TEST_PORT;

static NEXT_PORT: AtomicU16 = AtomicU16::new(FIRST_TEST_PORT);

/// A port no other daemon in this test binary has been given.
///
/// Test binaries run in parallel, so each one offsets by its pid to keep
/// their ranges apart.
pub fn next_port() -> u16 {
    let offset = (std::process::id() % 200) as u16 * 50;
    NEXT_PORT.fetch_add(1, Ordering::Relaxed) + offset
}
