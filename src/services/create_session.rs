//! Create Session
//!
//! One create form: name field, prompt editor, voice capture and the
//! generation controller, wired the way the create page uses them.

use tokio_util::sync::CancellationToken;

use crate::services::generation::{GenerationController, SubmitReport};
use crate::services::prompt::PromptEditor;
use crate::services::voice::VoiceCapture;
use imagegen_core::error::{GenerationError, SubmitError};
use imagegen_core::models::GeneratedImage;

#[derive(Debug)]
pub struct CreateSession {
    name: String,
    editor: PromptEditor,
    voice: VoiceCapture,
    controller: GenerationController,
}

impl CreateSession {
    pub fn new(controller: GenerationController, voice: VoiceCapture, prefill_on_edit: bool) -> Self {
        Self {
            name: String::new(),
            editor: PromptEditor::new(prefill_on_edit),
            voice,
            controller,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn editor(&self) -> &PromptEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut PromptEditor {
        &mut self.editor
    }

    pub fn voice(&self) -> &VoiceCapture {
        &self.voice
    }

    pub fn controller(&self) -> &GenerationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut GenerationController {
        &mut self.controller
    }

    /// Voice button: start listening if idle, stop if listening
    pub fn toggle_voice(&mut self) {
        self.voice.toggle();
    }

    /// Feed an already delivered transcript into the prompt.
    /// Returns whether one arrived.
    pub fn pump_transcript(&mut self) -> bool {
        match self.voice.try_transcript() {
            Some(transcript) => {
                self.editor.apply_transcript(transcript);
                true
            }
            None => false,
        }
    }

    /// Listen for one transcript and make it the prompt
    pub async fn dictate(&mut self, cancel: &CancellationToken) -> Option<String> {
        self.voice.start();
        let transcript = self.voice.next_transcript(cancel).await?;
        self.editor.apply_transcript(transcript.clone());
        Some(transcript)
    }

    /// Generate from the committed prompt. A pending edit is committed
    /// first, as leaving the field would.
    pub async fn generate(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Vec<GeneratedImage>, GenerationError> {
        self.editor.blur();
        self.controller.generate(self.editor.committed(), cancel).await
    }

    /// Share the current batch with the community
    pub async fn share(&mut self, cancel: &CancellationToken) -> Result<SubmitReport, SubmitError> {
        self.editor.blur();
        self.controller
            .submit(Some(self.name.as_str()), self.editor.committed(), cancel)
            .await
    }
}
