//! In-memory fakes for the send loop tests.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::core::{PayloadSource, SourceEntry, SourceError, TransportError, TransportResult};
use crate::transport::Connector;

/// What the peer does on the next read.
#[derive(Debug, Clone)]
pub enum Reply {
    Bytes(Vec<u8>),
    Eof,
}

#[derive(Debug, Default)]
pub struct StreamLog {
    pub writes: Vec<Vec<u8>>,
    pub read_polls: usize,
    pub shutdowns: usize,
    pub replies: VecDeque<Reply>,
    pub fail_writes: bool,
}

/// A stream that records writes and answers reads from a script.
///
/// With no scripted reply left, reads stay pending like a silent peer.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStream {
    pub log: Arc<Mutex<StreamLog>>,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, bytes: &[u8]) -> Self {
        self.push(Reply::Bytes(bytes.to_vec()));
        self
    }

    pub fn push(&self, reply: Reply) {
        self.log.lock().unwrap().replies.push_back(reply);
    }

    pub fn failing_writes(self) -> Self {
        self.log.lock().unwrap().fail_writes = true;
        self
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log.lock().unwrap().writes.clone()
    }

    pub fn read_polls(&self) -> usize {
        self.log.lock().unwrap().read_polls
    }

    pub fn shutdowns(&self) -> usize {
        self.log.lock().unwrap().shutdowns
    }
}

impl AsyncRead for ScriptedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut log = self.log.lock().unwrap();
        log.read_polls += 1;
        match log.replies.pop_front() {
            Some(Reply::Bytes(bytes)) => {
                let len = bytes.len().min(buf.remaining());
                buf.put_slice(&bytes[..len]);
                Poll::Ready(Ok(()))
            }
            Some(Reply::Eof) => Poll::Ready(Ok(())),
            None => Poll::Pending,
        }
    }
}

impl AsyncWrite for ScriptedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut log = self.log.lock().unwrap();
        if log.fail_writes {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")));
        }
        log.writes.push(buf.to_vec());
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.log.lock().unwrap().shutdowns += 1;
        Poll::Ready(Ok(()))
    }
}

/// Hands out one prepared stream, counting connects.
#[derive(Debug, Default)]
pub struct FakeConnector {
    pub stream: ScriptedStream,
    pub connects: AtomicUsize,
    pub refuse: bool,
}

impl FakeConnector {
    pub fn new(stream: ScriptedStream) -> Self {
        Self {
            stream,
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for FakeConnector {
    type Stream = ScriptedStream;

    async fn connect(&self, address: &str) -> TransportResult<ScriptedStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(TransportError::Connect {
                address: address.to_string(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
            });
        }
        Ok(self.stream.clone())
    }
}

/// Payloads held in memory, recording every load.
#[derive(Debug, Default)]
pub struct MemorySource {
    pub entries: Vec<(SourceEntry, Vec<u8>)>,
    pub loaded: Mutex<Vec<PathBuf>>,
    pub enumerations: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, payload: &[u8]) -> Self {
        self.entries.push((SourceEntry::file(path), payload.to_vec()));
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.entries.push((SourceEntry::dir(path), Vec::new()));
        self
    }

    pub fn loaded(&self) -> Vec<PathBuf> {
        self.loaded.lock().unwrap().clone()
    }
}

impl PayloadSource for MemorySource {
    fn entries(&self) -> Result<Vec<SourceEntry>, SourceError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.iter().map(|(entry, _)| entry.clone()).collect())
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        self.loaded.lock().unwrap().push(path.to_path_buf());
        self.entries
            .iter()
            .find(|(entry, _)| entry.path == path)
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
    }
}
