#![warn(missing_docs)]
//! # eml-guard-ui
//!
//! ## Purpose
//! Defines the UI-facing state of both pages as explicit finite states.
//!
//! ## Responsibilities
//! - Track the upload form (prompt text, busy affordance, analyze action).
//! - Map an analysis outcome onto the result screen: verdict view or error
//!   view, with loading and "analyze another" toggles.
//! - Render either state as plain text for the terminal shell.
//!
//! ## Data flow
//! Page controllers drive [`UploadForm`] and [`ResultScreen`] transitions;
//! the shell prints [`UploadForm::render_text`] / [`ResultScreen::render_text`].
//!
//! ## Ownership and lifetimes
//! Views own copies of the service strings so a screen outlives the response
//! it was built from.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Every
//! [`AnalysisOutcome`] variant maps to exactly one view.

use eml_guard_analysis_contract::{AnalysisOutcome, AnalysisResult};

/// Upload prompt before anything is chosen.
pub const IDLE_PROMPT: &str = "Select an EML file for analysis";
/// Upload prompt while the artifact is being prepared.
pub const PREPARING_PROMPT: &str = "Preparing analysis...";
/// Upload prompt after preparation failed.
pub const PROCESSING_FAILED_PROMPT: &str = "Error processing file. Try again.";
/// Danger view headline.
pub const DANGER_HEADLINE: &str = "Possible phishing detected!";
/// Safe view headline.
pub const SAFE_HEADLINE: &str = "File looks safe";
/// Error view title.
pub const ERROR_TITLE: &str = "Analysis Error";
/// Retry hint shown under every error.
pub const ERROR_HINT: &str = "Check your connection and try again.";

/// Names up to this many characters are displayed verbatim.
pub const DISPLAY_NAME_MAX_CHARS: usize = 30;
const DISPLAY_STEM_CHARS: usize = 25;

/// Shortens long file names for the upload prompt.
///
/// `"a_very_long_quarterly_financial_report.eml"` becomes
/// `"a_very_long_quarterly_fin....eml"`.
pub fn display_file_name(name: &str) -> String {
    if name.chars().count() <= DISPLAY_NAME_MAX_CHARS {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(index) => name.split_at(index),
        None => (name, ""),
    };
    let short_stem: String = stem.chars().take(DISPLAY_STEM_CHARS).collect();
    format!("{short_stem}...{extension}")
}

/// Source page stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Waiting for a (new) selection.
    Idle,
    /// A file is chosen but not yet submitted.
    FileChosen,
    /// Acceptance rules are running.
    Validating,
    /// File is being read and encoded.
    Encoding,
    /// Pending artifact is in the cross-page store.
    Stored,
    /// Navigation to the result page was issued.
    NavigatingAway,
}

/// Upload form state for the source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    /// Current stage.
    pub stage: UploadStage,
    /// Prompt text above the picker.
    pub prompt: String,
    /// Last rejection or failure message, if any.
    pub notice: Option<String>,
    /// Whether the analyze action is shown.
    pub analyze_visible: bool,
    /// Whether the analyze action accepts input.
    pub analyze_enabled: bool,
    /// Whether the busy affordance is shown.
    pub busy_visible: bool,
}

impl UploadForm {
    /// Creates an idle form.
    pub fn new() -> Self {
        Self {
            stage: UploadStage::Idle,
            prompt: IDLE_PROMPT.to_string(),
            notice: None,
            analyze_visible: false,
            analyze_enabled: true,
            busy_visible: false,
        }
    }

    /// Reflects a new selection in the prompt and reveals the analyze action.
    pub fn choose_file(&mut self, name: &str) {
        self.stage = UploadStage::FileChosen;
        self.prompt = format!("File selected: {}", display_file_name(name));
        self.notice = None;
        self.analyze_visible = true;
    }

    /// Resets the prompt when the selection is cleared.
    pub fn clear_selection(&mut self) {
        *self = Self::new();
    }

    /// Enters validation.
    pub fn begin_validation(&mut self) {
        self.stage = UploadStage::Validating;
        self.notice = None;
    }

    /// Returns to idle showing why the file was refused.
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.stage = UploadStage::Idle;
        self.notice = Some(reason.into());
        self.analyze_enabled = true;
        self.busy_visible = false;
    }

    /// Disables submission and shows the busy affordance.
    pub fn begin_encoding(&mut self) {
        self.stage = UploadStage::Encoding;
        self.prompt = PREPARING_PROMPT.to_string();
        self.analyze_enabled = false;
        self.busy_visible = true;
    }

    /// Marks the artifact as stored.
    pub fn mark_stored(&mut self) {
        self.stage = UploadStage::Stored;
    }

    /// Marks navigation to the result page.
    pub fn navigate_away(&mut self) {
        self.stage = UploadStage::NavigatingAway;
    }

    /// Reverts to an actionable state after encoding or storage failed.
    pub fn fail_processing(&mut self, message: impl Into<String>) {
        self.stage = UploadStage::Idle;
        self.prompt = PROCESSING_FAILED_PROMPT.to_string();
        self.notice = Some(message.into());
        self.analyze_enabled = true;
        self.busy_visible = false;
    }

    /// Renders the form as terminal text.
    pub fn render_text(&self) -> String {
        let mut lines = vec![self.prompt.clone()];
        if let Some(notice) = &self.notice {
            lines.push(format!("! {notice}"));
        }
        lines.join("\n")
    }
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Visual tone of a verdict view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictTone {
    /// Phishing suspected.
    Danger,
    /// No phishing suspected.
    Safe,
}

/// Rendered verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    /// Danger or safe.
    pub tone: VerdictTone,
    /// Headline matching the tone.
    pub headline: &'static str,
    /// Risk label.
    pub risk_level: String,
    /// Recommendation text.
    pub recommendation: String,
    /// Formatted score (`92/100`), only when reported.
    pub phishing_score: Option<String>,
    /// Confidence label, only when reported.
    pub confidence: Option<String>,
    /// Email sender.
    pub sender: String,
    /// Email subject.
    pub subject: String,
    /// Number of links found.
    pub links_count: u64,
    /// Body preview, only when reported.
    pub body_preview: Option<String>,
}

impl ResultView {
    /// Builds the view for a service result.
    pub fn from_result(result: &AnalysisResult) -> Self {
        let verdict = &result.verdict;
        let (tone, headline) = if verdict.is_phishing {
            (VerdictTone::Danger, DANGER_HEADLINE)
        } else {
            (VerdictTone::Safe, SAFE_HEADLINE)
        };

        Self {
            tone,
            headline,
            risk_level: verdict.risk_level.clone(),
            recommendation: verdict.recommendation.clone(),
            phishing_score: verdict.phishing_score.map(format_score),
            confidence: verdict.confidence.clone(),
            sender: result.email_data.sender.clone(),
            subject: result.email_data.subject.clone(),
            links_count: result.email_data.links_count,
            body_preview: result.email_data.body_preview.clone(),
        }
    }
}

/// Rendered failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    /// Fixed title.
    pub title: &'static str,
    /// Service or transport message.
    pub message: String,
    /// Fixed retry hint.
    pub hint: &'static str,
}

/// Result page stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultStage {
    /// Nothing rendered yet.
    Blank,
    /// Analysis in flight.
    Loading,
    /// Verdict shown.
    Result(ResultView),
    /// Error shown.
    Error(ErrorView),
}

/// Result screen state for the destination page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultScreen {
    /// Current stage.
    pub stage: ResultStage,
    /// Whether the loading indicator is shown.
    pub loading_visible: bool,
    /// Whether the result panel is shown.
    pub result_visible: bool,
    /// Whether the "analyze another" action is shown.
    pub analyze_another_visible: bool,
}

impl ResultScreen {
    /// Creates a blank screen.
    pub fn new() -> Self {
        Self {
            stage: ResultStage::Blank,
            loading_visible: false,
            result_visible: false,
            analyze_another_visible: false,
        }
    }

    /// Shows the loading indicator and hides everything else.
    pub fn render_loading(&mut self) {
        self.stage = ResultStage::Loading;
        self.loading_visible = true;
        self.result_visible = false;
        self.analyze_another_visible = false;
    }

    /// Shows the verdict view.
    pub fn render_result(&mut self, result: &AnalysisResult) {
        self.stage = ResultStage::Result(ResultView::from_result(result));
        self.reveal_outcome();
    }

    /// Shows the error view.
    pub fn render_error(&mut self, message: impl Into<String>) {
        self.stage = ResultStage::Error(ErrorView {
            title: ERROR_TITLE,
            message: message.into(),
            hint: ERROR_HINT,
        });
        self.reveal_outcome();
    }

    /// Dispatches an outcome to exactly one of the two renderers.
    pub fn present(&mut self, outcome: &AnalysisOutcome) {
        match outcome {
            AnalysisOutcome::Success(result) => self.render_result(result),
            AnalysisOutcome::ServiceError(message) | AnalysisOutcome::TransportError(message) => {
                self.render_error(message.clone())
            }
        }
    }

    fn reveal_outcome(&mut self) {
        self.loading_visible = false;
        self.result_visible = true;
        self.analyze_another_visible = true;
    }

    /// Renders the screen as terminal text.
    pub fn render_text(&self) -> String {
        match &self.stage {
            ResultStage::Blank => String::new(),
            ResultStage::Loading => "Analyzing...".to_string(),
            ResultStage::Result(view) => render_result_text(view),
            ResultStage::Error(view) => {
                format!("[ERROR] {}\n{}\n{}", view.title, view.message, view.hint)
            }
        }
    }
}

impl Default for ResultScreen {
    fn default() -> Self {
        Self::new()
    }
}

fn render_result_text(view: &ResultView) -> String {
    let tag = match view.tone {
        VerdictTone::Danger => "DANGER",
        VerdictTone::Safe => "SAFE",
    };

    let mut lines = vec![
        format!("[{tag}] {}", view.headline),
        format!("Risk level: {}", view.risk_level),
        format!("Recommendation: {}", view.recommendation),
    ];
    if let Some(score) = &view.phishing_score {
        lines.push(format!("Phishing score: {score}"));
    }
    if let Some(confidence) = &view.confidence {
        lines.push(format!("Confidence: {confidence}"));
    }
    lines.push(String::new());
    lines.push("Email details:".to_string());
    lines.push(format!("Sender: {}", view.sender));
    lines.push(format!("Subject: {}", view.subject));
    lines.push(format!("Links found: {}", view.links_count));
    if let Some(preview) = &view.body_preview {
        lines.push(format!("Preview: {preview}"));
    }
    lines.join("\n")
}

/// Formats a score on the 0-100 scale, dropping a zero fraction.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}/100", score as i64)
    } else {
        format!("{score}/100")
    }
}
