//! Input frame reader.
//!
//! Reads newline-delimited JSON [`JoyMessage`] frames (one per line) and
//! posts each decoded snapshot to the [`InputMailbox`]. Blank lines are
//! skipped; undecodable frames are logged and counted, never fatal.
//! End of stream closes the mailbox.

use ds4_common::input::{InputError, InputSnapshot, JoyMessage};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::mailbox::InputMailbox;

/// Name of the reader thread.
pub const READER_THREAD_NAME: &str = "ds4-input";

/// Decode one frame.
///
/// # Errors
/// Returns `InputError::Malformed` for invalid JSON, or the validation
/// error of [`InputSnapshot::from_parts`].
pub fn parse_frame(line: &str) -> Result<InputSnapshot, InputError> {
    let message: JoyMessage =
        serde_json::from_str(line).map_err(|e| InputError::Malformed(e.to_string()))?;
    InputSnapshot::try_from(&message)
}

/// Read frames until end of stream, then close `mailbox`.
///
/// Returns the number of lines read.
///
/// # Errors
/// Returns the underlying I/O error; the mailbox is closed in that case too.
pub fn read_frames<R: BufRead>(reader: R, mailbox: &InputMailbox) -> io::Result<u64> {
    let mut lines = 0u64;
    let result = pump(reader, mailbox, &mut lines);
    mailbox.close();
    debug!("Input closed after {lines} lines");
    result.map(|()| lines)
}

fn pump<R: BufRead>(reader: R, mailbox: &InputMailbox, lines: &mut u64) -> io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        *lines += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_frame(trimmed) {
            Ok(snapshot) => mailbox.post(snapshot),
            Err(e) => {
                mailbox.reject();
                warn!("Input line {lines} rejected: {e}");
            }
        }
    }
    Ok(())
}

/// Spawn the reader thread over `reader`.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_reader<R>(reader: R, mailbox: Arc<InputMailbox>) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name(READER_THREAD_NAME.to_string())
        .spawn(move || match read_frames(reader, &mailbox) {
            Ok(lines) => info!("Input stream ended ({lines} lines)"),
            Err(e) => warn!("Input stream failed: {e}"),
        })
}
