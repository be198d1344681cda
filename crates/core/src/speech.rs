//! Speech Recognition Capability
//!
//! A platform speech-to-text engine is modelled as something that opens a
//! recognition session and later delivers at most one final transcript.
//! The session owner can abort it at any time; recognizers watch the abort
//! token and stop listening.

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio_util::sync::CancellationToken;

use crate::error::SpeechError;

/// Platform speech-to-text engine.
pub trait SpeechRecognizer: Send + Sync {
    /// Whether the capability exists on this platform at all.
    fn is_available(&self) -> bool;

    /// Open a new recognition session.
    fn start(&self) -> Result<RecognitionSession, SpeechError>;
}

/// Result of polling a session without waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPoll {
    /// Still listening
    Pending,
    /// Final transcript delivered
    Transcript(String),
    /// Session ended without a transcript
    Ended,
}

/// Owner side of one recognition session.
#[derive(Debug)]
pub struct RecognitionSession {
    transcript: oneshot::Receiver<String>,
    abort: CancellationToken,
    finished: CancellationToken,
}

/// Recognizer side of one recognition session.
#[derive(Debug)]
pub struct TranscriptSender {
    tx: Option<oneshot::Sender<String>>,
    abort: CancellationToken,
    finished: CancellationToken,
}

impl RecognitionSession {
    /// Create a connected session/sender pair.
    pub fn channel() -> (TranscriptSender, RecognitionSession) {
        let (tx, rx) = oneshot::channel();
        let abort = CancellationToken::new();
        let finished = CancellationToken::new();
        (
            TranscriptSender {
                tx: Some(tx),
                abort: abort.clone(),
                finished: finished.clone(),
            },
            RecognitionSession {
                transcript: rx,
                abort,
                finished,
            },
        )
    }

    /// Wait for the transcript. `None` if the recognizer ended without one.
    pub async fn transcript(&mut self) -> Option<String> {
        (&mut self.transcript).await.ok()
    }

    /// Non-blocking check for the transcript.
    pub fn poll(&mut self) -> SessionPoll {
        match self.transcript.try_recv() {
            Ok(text) => SessionPoll::Transcript(text),
            Err(TryRecvError::Empty) => SessionPoll::Pending,
            Err(TryRecvError::Closed) => SessionPoll::Ended,
        }
    }

    /// Ask the recognizer to stop listening.
    pub fn abort(&self) {
        self.abort.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }

    /// Whether the recognizer side is done: a transcript was delivered or
    /// the sender went away. A following `poll` never returns `Pending`.
    pub fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }
}

impl Drop for RecognitionSession {
    fn drop(&mut self) {
        self.abort.cancel();
    }
}

impl TranscriptSender {
    /// Deliver the final transcript. Returns false if the session was
    /// aborted or dropped first.
    pub fn deliver(mut self, transcript: impl Into<String>) -> bool {
        if self.abort.is_cancelled() {
            return false;
        }
        match self.tx.take() {
            Some(tx) => tx.send(transcript.into()).is_ok(),
            None => false,
        }
    }

    /// Token cancelled when the owner aborts the session.
    pub fn abort_token(&self) -> CancellationToken {
        self.abort.clone()
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }
}

impl Drop for TranscriptSender {
    fn drop(&mut self) {
        // Dropping the oneshot sender first makes the value (or the close)
        // visible before the session reports finished
        drop(self.tx.take());
        self.finished.cancel();
    }
}
