//! Streaming placeholder substitution
//!
//! The patcher sees the body one chunk at a time. It holds back the last
//! `magic.len() - 1` bytes of every chunk, since they may be the start of
//! a placeholder that finishes in the next chunk, and replaces each
//! complete placeholder with the padded command line. Output length
//! always equals input length.

use crate::error::{IsoError, Result};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, warn};

/// Sliding-window placeholder replacer
#[derive(Debug, Clone)]
pub struct MagicPatcher {
    magic: Vec<u8>,
    replacement: Vec<u8>,
    carry: BytesMut,
    matches: usize,
}

impl MagicPatcher {
    /// `cmdline` is right-padded with spaces to the length of `magic`
    pub fn new(magic: &[u8], cmdline: &str) -> Result<Self> {
        if magic.is_empty() {
            return Err(IsoError::EmptyMagic);
        }
        if cmdline.len() > magic.len() {
            return Err(IsoError::CmdlineTooLong {
                len: cmdline.len(),
                max: magic.len(),
            });
        }
        let mut replacement = cmdline.as_bytes().to_vec();
        replacement.resize(magic.len(), b' ');
        Ok(Self {
            magic: magic.to_vec(),
            replacement,
            carry: BytesMut::new(),
            matches: 0,
        })
    }

    /// Placeholders replaced so far
    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Feed the next chunk; returns the bytes that are now final
    pub fn push(&mut self, chunk: &[u8]) -> Bytes {
        let mut window = std::mem::take(&mut self.carry);
        window.extend_from_slice(chunk);

        let m = self.magic.len();
        let mut pos = 0;
        let mut patched_to = 0;
        while pos + m <= window.len() {
            if window[pos..pos + m] == self.magic[..] {
                window[pos..pos + m].copy_from_slice(&self.replacement);
                self.matches += 1;
                debug!(matches = self.matches, "Patched magic placeholder");
                pos += m;
                patched_to = pos;
            } else {
                pos += 1;
            }
        }

        // Keep what could still start a placeholder, never replaced bytes
        let hold = (m - 1).min(window.len());
        let split = (window.len() - hold).max(patched_to);
        self.carry = window.split_off(split);
        window.freeze()
    }

    /// Flush the held-back tail at end of stream
    pub fn finish(&mut self) -> Bytes {
        std::mem::take(&mut self.carry).freeze()
    }
}

/// Patch `upstream` as it streams.
///
/// A chunk error ends the stream with an error so the response is cut
/// short rather than completed. So does a gap longer than `idle_timeout`.
pub fn patch_stream<S, E>(
    upstream: S,
    patcher: MagicPatcher,
    idle_timeout: Duration,
) -> impl Stream<Item = Result<Bytes>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + Unpin,
    E: Display + Send,
{
    struct State<S> {
        upstream: S,
        patcher: MagicPatcher,
        total: u64,
        done: bool,
    }

    let state = State {
        upstream,
        patcher,
        total: 0,
        done: false,
    };

    futures::stream::unfold(state, move |mut state| async move {
        if state.done {
            return None;
        }
        loop {
            match tokio::time::timeout(idle_timeout, state.upstream.next()).await {
                Ok(Some(Ok(chunk))) => {
                    state.total += chunk.len() as u64;
                    let out = state.patcher.push(&chunk);
                    if !out.is_empty() {
                        return Some((Ok(out), state));
                    }
                }
                Ok(None) => {
                    state.done = true;
                    if state.patcher.matches() == 0 {
                        warn!(bytes = state.total, "Magic placeholder not found, ISO served unpatched");
                    } else {
                        debug!(bytes = state.total, matches = state.patcher.matches(), "Finished streaming patched ISO");
                    }
                    let tail = state.patcher.finish();
                    if tail.is_empty() {
                        return None;
                    }
                    return Some((Ok(tail), state));
                }
                Ok(Some(Err(e))) => {
                    state.done = true;
                    warn!(error = %e, bytes = state.total, "Upstream body failed mid-stream");
                    return Some((Err(IsoError::Stream(e.to_string())), state));
                }
                Err(_) => {
                    state.done = true;
                    warn!(bytes = state.total, "Upstream body stalled");
                    return Some((
                        Err(IsoError::Stream(format!("no data for {idle_timeout:?}"))),
                        state,
                    ));
                }
            }
        }
    })
}
