use std::io::{self, Read};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cancel::CancelToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);
const READ_BUFFER_CAPACITY: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct FollowConfig {
    /// Delay between read attempts that found nothing new
    pub interval: Duration,
    /// Initial capacity of the buffer holding bytes not yet emitted
    pub read_buffer_capacity: usize,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            read_buffer_capacity: READ_BUFFER_CAPACITY,
        }
    }
}

/// Reads whatever has been appended to a source since the previous poll.
pub struct Follower<R> {
    source: R,
    config: FollowConfig,
    pending: Vec<u8>,
}

impl<R: Read> Follower<R> {
    pub fn new(source: R, config: FollowConfig) -> Self {
        let pending = Vec::with_capacity(config.read_buffer_capacity);
        Self {
            source,
            config,
            pending,
        }
    }

    /// Read from the cursor to the current end of the source.
    ///
    /// Returns `None` when nothing new can be emitted yet, which includes a
    /// read that ends partway through a multi-byte character. Those bytes are
    /// kept and emitted once the rest of the character arrives.
    pub fn poll(&mut self) -> io::Result<Option<String>> {
        let read = self.source.read_to_end(&mut self.pending)?;
        if self.pending.is_empty() {
            return Ok(None);
        }

        let text = decode_complete(&mut self.pending);
        if text.is_empty() {
            trace!(read, held = self.pending.len(), "incomplete character at end of read");
            return Ok(None);
        }
        Ok(Some(text))
    }

    pub fn into_stream(self, cancel: CancelToken) -> Follow<R> {
        Follow {
            follower: self,
            cancel,
        }
    }
}

/// Endless stream of appended text, ending only when cancelled.
pub struct Follow<R> {
    follower: Follower<R>,
    cancel: CancelToken,
}

impl<R: Read> Iterator for Follow<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.cancel.is_cancelled() {
                debug!("follow cancelled");
                return None;
            }

            match self.follower.poll() {
                Ok(Some(text)) => return Some(text),
                Ok(None) => {}
                Err(e) => debug!(error = %e, "read failed while following, retrying"),
            }

            thread::sleep(self.follower.config.interval);
        }
    }
}

pub fn follow<R: Read>(source: R, cancel: CancelToken, config: FollowConfig) -> Follow<R> {
    Follower::new(source, config).into_stream(cancel)
}

/// Decode the longest prefix of `pending` that does not end inside a
/// character, removing it from `pending`. Invalid sequences become U+FFFD.
fn decode_complete(pending: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut rest = pending.as_slice();

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                rest = &[];
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                text.push_str(&String::from_utf8_lossy(valid));
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    }
                    None => {
                        rest = after;
                        break;
                    }
                }
            }
        }
    }

    let consumed = pending.len() - rest.len();
    pending.drain(..consumed);
    text
}
