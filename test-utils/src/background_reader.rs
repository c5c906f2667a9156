use std::{io, thread};
use std::io::Read;
use std::string::FromUtf8Error;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;
use crate::constants::BACKGROUND_READER_CHECK_INTERVAL;

pub trait Reader: Read + Send + 'static {}
impl<T: Read + Send + 'static> Reader for T {}

/// Collects everything a child process writes to a pipe on a separate
/// thread, so the pipe never fills up while the test waits for something.
pub struct BackgroundReader {
    thread: Option<JoinHandle<Result<(), io::Error>>>,
    buf: Arc<Mutex<Vec<u8>>>,
    consumed: usize,
    timeout: Duration,
}

impl BackgroundReader {
    pub fn new(reader: impl Reader, timeout_millis: u64) -> Self {
        let buf = Arc::new(Mutex::new(Vec::with_capacity(16 * 1024)));
        let thread_buf = buf.clone();
        let thread = thread::spawn(move || Self::read_loop(reader, thread_buf));
        BackgroundReader {
            thread: Some(thread),
            buf,
            consumed: 0,
            timeout: Duration::from_millis(timeout_millis),
        }
    }

    fn read_loop(
        mut reader: impl Reader,
        buf: Arc<Mutex<Vec<u8>>>,
    ) -> Result<(), io::Error> {
        let mut read_buf = [0u8; 16 * 1024];
        loop {
            match reader.read(&mut read_buf) {
                Ok(0) => return Ok(()),
                Ok(bytes_read) => lock(&buf).extend_from_slice(&read_buf[..bytes_read]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Blocks until `needle` shows up in the output that has not been
    /// returned yet, then returns that output up to and including `needle`.
    pub fn wait_until(&mut self, needle: &str) -> Result<String, BackgroundReaderError> {
        let needle = needle.as_bytes();
        let start = Instant::now();
        loop {
            let finished = self.thread.as_ref()
                .is_none_or(JoinHandle::is_finished);
            let found = {
                let buf = lock(&self.buf);
                buf[self.consumed..]
                    .windows(needle.len())
                    .position(|window| window == needle)
                    .map(|pos| {
                        let end = self.consumed + pos + needle.len();
                        (buf[self.consumed..end].to_vec(), end)
                    })
            };
            if let Some((chunk, end)) = found {
                self.consumed = end;
                return Ok(String::from_utf8(chunk)?)
            }

            if finished || start.elapsed() > self.timeout {
                return Err(
                    BackgroundReaderError::NotFound {
                        needle: String::from_utf8_lossy(needle).into_owned(),
                        output: String::from_utf8_lossy(
                            &lock(&self.buf)[self.consumed..]
                        ).into_owned(),
                    }
                )
            }
            thread::sleep(BACKGROUND_READER_CHECK_INTERVAL);
        }
    }

    /// Waits for the writing end to close and returns the output that
    /// [`Self::wait_until`] has not returned yet.
    pub fn read_to_end(mut self) -> Result<String, BackgroundReaderError> {
        if let Some(thread) = self.thread.take() {
            thread.join()
                .unwrap_or_else(|_| panic!("background reader thread panicked"))?;
        }
        let rest = lock(&self.buf).split_off(self.consumed);
        Ok(String::from_utf8(rest)?)
    }
}

fn lock(buf: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buf.lock()
        .unwrap_or_else(|e| panic!("background reader thread panicked: {e}"))
}

#[derive(Debug, Error)]
pub enum BackgroundReaderError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    FromUtf8(#[from] FromUtf8Error),

    #[error("\"{needle}\" did not appear in the output: {output}")]
    NotFound {
        needle: String,
        output: String,
    },
}
