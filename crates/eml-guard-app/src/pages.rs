//! Page controllers for the upload (source) and result (destination) pages.
//!
//! The two pages share nothing but the [`CrossPageStore`]; each page runs one
//! linear pipeline per user action.

use std::fs;
use std::path::{Path, PathBuf};

use eml_guard_analysis_contract::AnalysisOutcome;
use eml_guard_core::{CandidateFile, PendingArtifact, Rejection, validate_file};
use eml_guard_handoff::{CrossPageStore, HandoffError};
use eml_guard_ui::{ResultScreen, UploadForm};
use eml_guard_upload::AnalysisClient;
use tracing::{info, warn};

use crate::AppError;

/// Navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// File picker page.
    Upload,
    /// Analysis result page.
    Result,
}

impl Page {
    /// Relative location of the page.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Upload => "index.html",
            Self::Result => "result.html",
        }
    }
}

/// A file chosen by the user.
pub trait SelectedFile {
    /// File name without directories.
    fn name(&self) -> &str;

    /// Size reported by the file system, before reading.
    fn size(&self) -> u64;

    /// Reads the whole file.
    fn read_bytes(&self) -> std::io::Result<Vec<u8>>;
}

/// File on the local file system.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl LocalFile {
    /// Inspects `path` without reading its content.
    ///
    /// # Errors
    /// Returns [`AppError::File`] when metadata is unavailable, the path is not
    /// a regular file, or its file name is missing or not valid UTF-8. The
    /// name is uploaded as-is, so it is never lossily converted.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)
            .map_err(|error| AppError::File(format!("{}: {error}", path.display())))?;
        if !metadata.is_file() {
            return Err(AppError::File(format!("{} is not a file", path.display())));
        }
        let name = path
            .file_name()
            .ok_or_else(|| AppError::File(format!("{} has no file name", path.display())))?
            .to_str()
            .ok_or_else(|| {
                AppError::File(format!("{} has a non-UTF-8 file name", path.display()))
            })?
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }
}

impl SelectedFile for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// File held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    /// File name.
    pub name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl MemoryFile {
    /// Creates an in-memory file.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl SelectedFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// Result of submitting the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Artifact stored; go to the given page.
    Navigate(Page),
    /// Acceptance rules refused the file; the form is idle again.
    Rejected(Rejection),
    /// Reading or storing failed; the form is idle again.
    Failed(String),
}

/// Source page controller.
pub struct SourcePage {
    store: CrossPageStore,
    form: UploadForm,
}

impl SourcePage {
    /// Creates the page with an idle form.
    pub fn new(store: CrossPageStore) -> Self {
        Self {
            store,
            form: UploadForm::new(),
        }
    }

    /// Current form state.
    pub fn form(&self) -> &UploadForm {
        &self.form
    }

    /// Handles a change of the file picker.
    pub fn choose(&mut self, file: Option<&dyn SelectedFile>) {
        match file {
            Some(file) => {
                info!(stage = "source", action = "choose", name = %file.name(), "file selected");
                self.form.choose_file(file.name());
            }
            None => self.form.clear_selection(),
        }
    }

    /// Validates, encodes, and stores `file`, then requests navigation.
    ///
    /// Nothing is stored and no navigation happens unless every step
    /// succeeds.
    pub fn submit(&mut self, file: Option<&dyn SelectedFile>, now_ms: u64) -> SubmitOutcome {
        self.form.begin_validation();
        let candidate = file.map(|file| CandidateFile::new(file.name(), file.size()));
        if let Err(rejection) = validate_file(candidate.as_ref()) {
            info!(stage = "source", action = "validate", "rejected: {rejection}");
            self.form.reject(rejection.to_string());
            return SubmitOutcome::Rejected(rejection);
        }
        let Some(file) = file else {
            // validate_file rejects a missing selection above.
            return SubmitOutcome::Rejected(Rejection::NoFileSelected);
        };

        self.form.begin_encoding();
        let bytes = match file.read_bytes() {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(stage = "source", action = "read", name = %file.name(), "{error}");
                return self.fail(format!("unable to read {}: {error}", file.name()));
            }
        };

        let artifact = PendingArtifact::from_bytes(file.name(), &bytes, now_ms);
        if let Err(error) = self.store.put(&artifact) {
            warn!(stage = "source", action = "store", "{error}");
            return self.fail(error.to_string());
        }
        self.form.mark_stored();

        self.form.navigate_away();
        info!(stage = "source", action = "navigate", target = Page::Result.path(), "handoff complete");
        SubmitOutcome::Navigate(Page::Result)
    }

    /// Opens the file at `path`, selects it, and submits it.
    ///
    /// A path that cannot be opened as a file is a pre-storage failure: the
    /// form returns to idle with the reason and nothing is stored.
    pub fn submit_path(&mut self, path: &Path, now_ms: u64) -> SubmitOutcome {
        let local = match LocalFile::open(path) {
            Ok(local) => local,
            Err(error) => {
                warn!(stage = "source", action = "open", "{error}");
                return self.fail(error.to_string());
            }
        };
        let file: &dyn SelectedFile = &local;
        self.choose(Some(file));
        self.submit(Some(file), now_ms)
    }

    fn fail(&mut self, message: String) -> SubmitOutcome {
        self.form.fail_processing(message.clone());
        SubmitOutcome::Failed(message)
    }
}

/// Result of loading the destination page.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Nothing to analyze; go to the given page without rendering.
    Redirect(Page),
    /// The outcome was rendered on the result screen.
    Rendered(AnalysisOutcome),
}

/// Destination page controller.
pub struct ResultPage {
    store: CrossPageStore,
    client: AnalysisClient,
    screen: ResultScreen,
}

impl ResultPage {
    /// Creates the page with a blank screen.
    pub fn new(store: CrossPageStore, client: AnalysisClient) -> Self {
        Self {
            store,
            client,
            screen: ResultScreen::new(),
        }
    }

    /// Current screen state.
    pub fn screen(&self) -> &ResultScreen {
        &self.screen
    }

    /// Consumes the pending artifact and renders its analysis.
    ///
    /// # Errors
    /// Returns [`AppError::Handoff`] when the store backend itself fails.
    /// A missing or corrupt record is not an error: it redirects.
    pub fn load(&mut self) -> Result<LoadOutcome, AppError> {
        let artifact = match self.store.take() {
            Ok(Some(artifact)) => artifact,
            Ok(None) => {
                info!(stage = "result", action = "load", "nothing pending; redirecting");
                return Ok(LoadOutcome::Redirect(Page::Upload));
            }
            Err(HandoffError::CorruptState(detail)) => {
                warn!(stage = "result", action = "load", "corrupt pending record; redirecting: {detail}");
                return Ok(LoadOutcome::Redirect(Page::Upload));
            }
            Err(error) => return Err(error.into()),
        };

        self.screen.render_loading();
        let outcome = self.client.submit(&artifact);
        self.screen.present(&outcome);
        Ok(LoadOutcome::Rendered(outcome))
    }

    /// Clears any residual pending artifact and returns to the upload page.
    ///
    /// # Errors
    /// Returns [`AppError::Handoff`] when the store backend fails.
    pub fn analyze_another(&mut self) -> Result<Page, AppError> {
        self.store.clear()?;
        Ok(Page::Upload)
    }

    /// Returns to the upload page without touching the store.
    pub fn go_back_home(&self) -> Page {
        Page::Upload
    }
}
