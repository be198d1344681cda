//! Prompt Editor
//!
//! Display/Editing state for the single prompt field. The committed prompt
//! is what generation uses; the draft only lives while editing.

use rand::seq::SliceRandom;
use rand::Rng;

/// Label shown when no prompt has been committed
pub const EMPTY_PROMPT_LABEL: &str = "Click here to enter a prompt";

/// Prompts offered by "surprise me"
pub const SURPRISE_PROMPTS: &[&str] = &[
    "an armchair in the shape of an avocado",
    "a red fox curled up in fresh snow at sunrise, watercolor",
    "a lighthouse on a cliff during a thunderstorm, oil painting",
    "a cyberpunk street market at night with neon signs in the rain",
    "a teddy bear astronaut floating above the moon, 3D render",
    "a cozy cabin library with a fireplace and a sleeping cat",
    "an origami crane flying over a misty bamboo forest",
    "a steampunk owl with brass goggles, detailed illustration",
    "a bowl of ramen that is also a tiny hot spring for frogs",
    "a glass terrarium containing a miniature waterfall and castle",
    "a portrait of a robot painting a self portrait, impressionist style",
    "a hot air balloon festival over lavender fields, photograph",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Display,
    Editing,
}

#[derive(Debug, Clone, Default)]
pub struct PromptEditor {
    committed: String,
    draft: String,
    editing: bool,
    prefill_on_edit: bool,
}

impl PromptEditor {
    /// `prefill_on_edit` starts editing from the committed prompt instead
    /// of an empty draft
    pub fn new(prefill_on_edit: bool) -> Self {
        Self {
            prefill_on_edit,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> EditorMode {
        if self.editing {
            EditorMode::Editing
        } else {
            EditorMode::Display
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Text for the display-mode button
    pub fn label(&self) -> &str {
        if self.committed.is_empty() {
            EMPTY_PROMPT_LABEL
        } else {
            &self.committed
        }
    }

    pub fn begin_edit(&mut self) {
        self.draft = if self.prefill_on_edit {
            self.committed.clone()
        } else {
            String::new()
        };
        self.editing = true;
    }

    /// Replace the draft. Ignored outside editing.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if self.editing {
            self.draft = text.into();
        }
    }

    /// Commit the draft and return to display
    pub fn blur(&mut self) {
        if self.editing {
            self.committed = std::mem::take(&mut self.draft);
            self.editing = false;
        }
    }

    /// A voice transcript replaces both the draft and the committed prompt
    pub fn apply_transcript(&mut self, transcript: impl Into<String>) {
        let transcript = transcript.into();
        self.draft = transcript.clone();
        self.committed = transcript;
    }

    /// Commit a random built-in prompt different from the current one
    pub fn surprise_me(&mut self) -> &str {
        self.surprise_me_with(&mut rand::thread_rng())
    }

    pub fn surprise_me_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        let candidates: Vec<&str> = SURPRISE_PROMPTS
            .iter()
            .copied()
            .filter(|p| *p != self.committed)
            .collect();
        if let Some(choice) = candidates.choose(rng) {
            self.committed = choice.to_string();
        }
        self.draft = self.committed.clone();
        self.editing = false;
        &self.committed
    }
}
