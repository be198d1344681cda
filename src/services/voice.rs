//! Voice Capture
//!
//! Wraps a `SpeechRecognizer` into an Idle/Listening toggle with at most one
//! open session. A session yields at most one transcript; its delivery (or
//! the session ending) returns the adapter to Idle. A delivered transcript
//! is kept until the caller takes it, even if listening starts again.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use imagegen_core::error::SpeechError;
use imagegen_core::speech::{RecognitionSession, SessionPoll, SpeechRecognizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Listening,
}

pub struct VoiceCapture {
    recognizer: Arc<dyn SpeechRecognizer>,
    session: Option<RecognitionSession>,
    delivered: Option<String>,
}

impl VoiceCapture {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            recognizer,
            session: None,
            delivered: None,
        }
    }

    /// Adapter for a platform without speech recognition
    pub fn unavailable() -> Self {
        Self::new(Arc::new(UnavailableRecognizer))
    }

    pub fn state(&self) -> VoiceState {
        match &self.session {
            Some(session) if !session.is_finished() => VoiceState::Listening,
            _ => VoiceState::Idle,
        }
    }

    /// Close a session whose recognizer is done, keeping its transcript
    fn settle(&mut self) {
        let finished = self
            .session
            .as_ref()
            .is_some_and(RecognitionSession::is_finished);
        if !finished {
            return;
        }
        if let Some(mut session) = self.session.take() {
            if let SessionPoll::Transcript(text) = session.poll() {
                self.delivered = Some(text);
            }
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state() == VoiceState::Listening
    }

    /// Start listening. No-op when already listening or when the platform
    /// has no recognizer.
    pub fn start(&mut self) {
        self.settle();
        if self.session.is_some() {
            return;
        }
        if !self.recognizer.is_available() {
            tracing::debug!("speech recognition unavailable; ignoring start");
            return;
        }
        match self.recognizer.start() {
            Ok(session) => self.session = Some(session),
            Err(e) => tracing::debug!("speech recognition did not start: {}", e),
        }
    }

    /// Stop listening and abort the active session, if any
    pub fn stop(&mut self) {
        self.settle();
        if let Some(session) = self.session.take() {
            session.abort();
        }
    }

    /// Start if idle, stop if listening
    pub fn toggle(&mut self) {
        self.settle();
        match self.state() {
            VoiceState::Idle => self.start(),
            VoiceState::Listening => self.stop(),
        }
    }

    /// Wait for the active session's transcript, or return one already
    /// delivered.
    ///
    /// Returns `None` when idle with nothing delivered, when the session
    /// ends without speech, or when `cancel` fires. A waited-on session is
    /// always closed afterwards.
    pub async fn next_transcript(&mut self, cancel: &CancellationToken) -> Option<String> {
        if let Some(text) = self.delivered.take() {
            return Some(text);
        }
        let mut session = self.session.take()?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                session.abort();
                None
            }
            transcript = session.transcript() => transcript,
        }
    }

    /// Non-blocking check for a delivered transcript
    pub fn try_transcript(&mut self) -> Option<String> {
        if let Some(text) = self.delivered.take() {
            return Some(text);
        }
        let poll = self.session.as_mut()?.poll();
        match poll {
            SessionPoll::Pending => None,
            SessionPoll::Transcript(text) => {
                self.session = None;
                Some(text)
            }
            SessionPoll::Ended => {
                self.session = None;
                None
            }
        }
    }
}

impl std::fmt::Debug for VoiceCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCapture")
            .field("state", &self.state())
            .finish()
    }
}

/// Recognizer for platforms without the capability
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

impl SpeechRecognizer for UnavailableRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&self) -> Result<RecognitionSession, SpeechError> {
        Err(SpeechError::Unavailable)
    }
}

/// Recognizer that treats one line of text from a reader as the final
/// transcript. Lets the CLI dictate through stdin.
pub struct LineRecognizer<R> {
    reader: Arc<Mutex<BufReader<R>>>,
}

impl<R> LineRecognizer<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Arc::new(Mutex::new(BufReader::new(reader))),
        }
    }
}

impl LineRecognizer<tokio::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R> SpeechRecognizer for LineRecognizer<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    fn is_available(&self) -> bool {
        true
    }

    fn start(&self) -> Result<RecognitionSession, SpeechError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Failed(format!("no async runtime: {}", e)))?;

        let (sender, session) = RecognitionSession::channel();
        let abort = sender.abort_token();
        let reader = self.reader.clone();

        handle.spawn(async move {
            let mut reader = reader.lock().await;
            let mut line = String::new();
            tokio::select! {
                biased;
                _ = abort.cancelled() => {}
                read = reader.read_line(&mut line) => match read {
                    Ok(0) => tracing::debug!("speech input closed"),
                    Ok(_) => {
                        let transcript = line.trim();
                        if !transcript.is_empty() {
                            sender.deliver(transcript);
                        }
                    }
                    Err(e) => tracing::warn!("failed to read speech input: {}", e),
                },
            }
        });

        Ok(session)
    }
}
