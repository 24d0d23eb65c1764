//! One user's generator session: form, crop editor, canvas and the state of
//! the latest submission, all owned by a single task.
//!
//! Submissions run as spawned tasks and report back through a watch
//! channel, so a card can be downloaded before its submission settles.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};
use tokio::sync::watch;

use crate::compositor::{Compositor, GeneratedCard};
use crate::crop::{CropEditor, CroppedPhoto, DisplaySize};
use crate::form::{Field, FormFields};
use crate::identity::today;
use crate::rendering::Snapshot;
use crate::submit::{SubmissionRecord, SubmissionStatus, Submitter};
use crate::{Error, GeneratorConfig, Result};

/// Progress of the most recent submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    /// A request is in flight; generating is disabled meanwhile
    pub saving: bool,
    pub status: SubmissionStatus,
}

pub struct Session {
    config: GeneratorConfig,
    form: FormFields,
    editor: CropEditor,
    photo: Option<CroppedPhoto>,
    compositor: Compositor,
    canvas: Option<Snapshot>,
    card: Option<GeneratedCard>,
    submitter: Option<Arc<dyn Submitter>>,
    state_tx: Arc<watch::Sender<SubmissionState>>,
    state_rx: watch::Receiver<SubmissionState>,
}

impl Session {
    pub fn new(config: GeneratorConfig, compositor: Compositor, submitter: Option<Arc<dyn Submitter>>) -> Self {
        let (tx, rx) = watch::channel(SubmissionState::default());
        Self {
            config,
            form: FormFields::new(),
            editor: CropEditor::new(),
            photo: None,
            compositor,
            canvas: None,
            card: None,
            submitter,
            state_tx: Arc::new(tx),
            state_rx: rx,
        }
    }

    /// Build a session from configuration, wiring the HTTP submitter when
    /// submissions are enabled.
    pub fn from_config(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let compositor = Compositor::from_config(&config)?;
        let submitter = default_submitter(&config)?;
        Ok(Self::new(config, compositor, submitter))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draw the bare template onto the canvas, as shown before any card
    /// exists.
    pub async fn mount(&mut self) -> Result<&Snapshot> {
        let blank = self.compositor.blank().await?;
        Ok(self.canvas.insert(blank))
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormFields {
        &mut self.form
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Load a photo into the crop editor and lay it out at the editor width.
    /// `None` (picker dismissed) changes nothing.
    pub async fn select_photo(&mut self, path: Option<&Path>) -> Result<bool> {
        if !self.editor.select_file(path).await? {
            return Ok(false);
        }
        if let Some(source) = self.editor.source() {
            let display = DisplaySize::fit(source.natural_size(), self.config.editor_width);
            self.editor.on_image_displayed(display.width, display.height);
        }
        Ok(true)
    }

    pub fn editor(&self) -> &CropEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut CropEditor {
        &mut self.editor
    }

    /// Apply the committed crop. Returns `false` (and changes nothing) when
    /// the editor has no finalized region or no image.
    pub fn apply_crop(&mut self) -> bool {
        match self.editor.apply_crop() {
            Some(photo) => {
                info!("Photo cropped to {}x{}", photo.width(), photo.height());
                self.photo = Some(photo);
                true
            }
            None => false,
        }
    }

    pub fn photo(&self) -> Option<&CroppedPhoto> {
        self.photo.as_ref()
    }

    pub fn canvas(&self) -> Option<&Snapshot> {
        self.canvas.as_ref()
    }

    /// The latest card; present whatever its submission's outcome
    pub fn download(&self) -> Option<&GeneratedCard> {
        self.card.as_ref()
    }

    pub fn submission(&self) -> SubmissionState {
        self.state_rx.borrow().clone()
    }

    /// Whether the generate action is enabled
    pub fn can_generate(&self) -> bool {
        !self.state_rx.borrow().saving
    }

    /// Generate a card issued today.
    pub async fn generate(&mut self) -> Result<&GeneratedCard> {
        self.generate_on(today()).await
    }

    /// Generate a card issued on `issued`, then start its submission.
    ///
    /// A missing field or photo fails with [`Error::MissingFields`] and leaves
    /// the canvas, the previous card and the submission state untouched.
    pub async fn generate_on(&mut self, issued: NaiveDate) -> Result<&GeneratedCard> {
        if !self.can_generate() {
            return Err(Error::SubmissionInFlight);
        }
        let card = self
            .compositor
            .compose(&self.form, self.photo.as_ref(), issued)
            .await?;
        self.canvas = Some(card.snapshot().clone());

        if let Some(submitter) = &self.submitter {
            let record = SubmissionRecord::new(&self.form, card.details());
            spawn_submission(submitter.clone(), self.state_tx.clone(), record);
        }
        Ok(self.card.insert(card))
    }

    /// Wait until no submission is in flight and return its final state.
    pub async fn wait_for_submission(&mut self) -> SubmissionState {
        let settled = self
            .state_rx
            .wait_for(|s| !s.saving)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.submission())
    }
}

fn spawn_submission(
    submitter: Arc<dyn Submitter>,
    state: Arc<watch::Sender<SubmissionState>>,
    record: SubmissionRecord,
) {
    state.send_replace(SubmissionState { saving: true, status: SubmissionStatus::Unset });
    tokio::spawn(async move {
        let status = SubmissionStatus::from_result(submitter.submit(&record).await);
        match &status {
            SubmissionStatus::Error(msg) => warn!("Submission for {} failed: {}", record.id_number, msg),
            _ => info!("Submission for {} saved", record.id_number),
        }
        state.send_replace(SubmissionState { saving: false, status });
    });
}

#[cfg(feature = "remote")]
fn default_submitter(config: &GeneratorConfig) -> Result<Option<Arc<dyn Submitter>>> {
    if !config.submit {
        return Ok(None);
    }
    let submitter = crate::submit::SheetSubmitter::new(config)?;
    Ok(Some(Arc::new(submitter)))
}

#[cfg(not(feature = "remote"))]
fn default_submitter(config: &GeneratorConfig) -> Result<Option<Arc<dyn Submitter>>> {
    if config.submit {
        warn!("Built without the `remote` feature; submissions are disabled");
    }
    Ok(None)
}
