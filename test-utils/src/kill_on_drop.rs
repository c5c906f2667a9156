use std::io;
use std::ops::{Deref, DerefMut};
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::Instant;
use crate::constants::{KILL_CHECK_INTERVAL, TERM_WAIT};
use crate::signal::ChildKillTermExt;

/// A child process that gets SIGTERM, and SIGKILL after [`TERM_WAIT`],
/// when the test holding it ends, panicking tests included.
#[derive(Debug)]
pub struct KillOnDropChild(Child);

impl KillOnDropChild {
    /// Asks the child to terminate and waits for it to exit.
    ///
    /// Returns `None` if the child ignored SIGTERM and had to be killed.
    pub fn stop(&mut self) -> Result<Option<ExitStatus>, io::Error> {
        if let Some(status) = self.0.try_wait()? {
            return Ok(Some(status))
        }
        self.0.kill_term()?;

        let wait_start = Instant::now();
        while wait_start.elapsed() < TERM_WAIT {
            match self.0.try_wait()? {
                Some(status) => return Ok(Some(status)),
                None => thread::sleep(KILL_CHECK_INTERVAL),
            }
        }

        eprintln!(
            "child process {} refused to stop in {} milliseconds, killing",
            self.0.id(),
            TERM_WAIT.as_millis(),
        );
        self.0.kill()?;
        self.0.wait()?;
        Ok(None)
    }
}

impl Drop for KillOnDropChild {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            eprintln!("leaking child process {}: {e}", self.0.id());
        }
    }
}

impl Deref for KillOnDropChild {
    type Target = Child;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for KillOnDropChild {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

pub trait ChildKillOnDropExt {
    fn kill_on_drop(self) -> KillOnDropChild;
}

impl ChildKillOnDropExt for Child {
    fn kill_on_drop(self) -> KillOnDropChild {
        KillOnDropChild(self)
    }
}
