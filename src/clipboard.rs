//! Copying text to the clipboard with a legacy fallback, plus the transient
//! "Copied!" / "Copy Failed" annotation on the button that triggered it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use futures_util::future::LocalBoxFuture;
use serde_json::json;

use crate::config::SiteConfig;
use crate::log::Logger;
use crate::timer::Scheduler;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CopyError {
    /// The async clipboard refused the write (permissions, focus, ...).
    Rejected(String),
    Unavailable,
    /// The offscreen text holder could not be created.
    Staging(String),
    CommandFailed(String),
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "clipboard write rejected: {reason}"),
            Self::Unavailable => write!(f, "clipboard unavailable"),
            Self::Staging(reason) => write!(f, "could not stage text for copying: {reason}"),
            Self::CommandFailed(reason) => write!(f, "copy command failed: {reason}"),
        }
    }
}

impl std::error::Error for CopyError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Success,
    Failure,
}

/// Text placed offscreen so the legacy copy command can pick up the
/// selection. Implementations remove it from the page on drop.
pub trait StagedText {
    fn select(&self);

    fn copy(&self) -> Result<(), CopyError>;
}

pub trait ClipboardBackend {
    type Staged: StagedText;

    /// Secure context and an async clipboard with `writeText`.
    fn async_clipboard_available(&self) -> bool;

    fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), CopyError>>;

    fn stage(&self, text: &str) -> Result<Self::Staged, CopyError>;
}

/// Never fails: a rejected async write falls through to the legacy path, and
/// a failed legacy copy becomes [`CopyOutcome::Failure`].
pub async fn copy_text<B: ClipboardBackend>(
    backend: &B,
    text: &str,
    logger: &Logger,
) -> CopyOutcome {
    if backend.async_clipboard_available() {
        match backend.write_text(text).await {
            Ok(()) => return CopyOutcome::Success,
            Err(error) => {
                logger.warn(
                    "clipboard.write_rejected",
                    json!({ "error": error.to_string() }),
                );
            }
        }
    }

    fallback_copy(backend, text, logger)
}

pub fn fallback_copy<B: ClipboardBackend>(backend: &B, text: &str, logger: &Logger) -> CopyOutcome {
    // `staged` is dropped at the end of the closure whichever way it exits.
    let result = backend.stage(text).and_then(|staged| {
        staged.select();
        staged.copy()
    });

    match result {
        Ok(()) => CopyOutcome::Success,
        Err(error) => {
            logger.error(
                "clipboard.fallback_failed",
                json!({ "error": error.to_string() }),
            );
            CopyOutcome::Failure
        }
    }
}

/// Text to copy from a page element: its content without the surrounding
/// whitespace that markup indentation leaves in `textContent`.
pub fn copy_source_text(raw: &str) -> &str {
    raw.trim()
}

pub async fn copy_with_feedback<B, V, S>(
    backend: &B,
    text: &str,
    feedback: &CopyFeedback<V, S>,
    logger: &Logger,
) -> CopyOutcome
where
    B: ClipboardBackend,
    V: CopyButtonView + 'static,
    S: Scheduler + 'static,
{
    let outcome = copy_text(backend, text, logger).await;
    if outcome == CopyOutcome::Success {
        logger.info("clipboard.copied", json!({ "chars": text.chars().count() }));
    }
    feedback.show(outcome);
    outcome
}

pub trait CopyButtonView {
    fn label(&self) -> String;

    fn background(&self) -> String;

    fn set_label(&self, label: &str);

    fn set_background(&self, color: &str);
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackStyle {
    pub success_label: String,
    pub success_color: String,
    pub failure_label: String,
    pub failure_color: String,
    pub duration_ms: u32,
}

impl Default for FeedbackStyle {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}

impl FeedbackStyle {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            success_label: config.success_label.clone(),
            success_color: config.success_color.clone(),
            failure_label: config.failure_label.clone(),
            failure_color: config.failure_color.clone(),
            duration_ms: config.feedback_duration_ms,
        }
    }

    fn for_outcome(&self, outcome: CopyOutcome) -> (&str, &str) {
        match outcome {
            CopyOutcome::Success => (self.success_label.as_str(), self.success_color.as_str()),
            CopyOutcome::Failure => (self.failure_label.as_str(), self.failure_color.as_str()),
        }
    }
}

struct PendingRevert<H> {
    handle: H,
    label: String,
    background: String,
}

struct FeedbackInner<V, S: Scheduler> {
    view: V,
    scheduler: S,
    style: FeedbackStyle,
    pending: RefCell<Option<PendingRevert<S::Handle>>>,
}

/// Annotates the copy button with the outcome and restores it afterwards.
///
/// An outcome shown while a previous annotation is still up replaces it:
/// the earlier revert is cancelled and the button still returns to the
/// label and background it had before the first attempt.
pub struct CopyFeedback<V, S: Scheduler> {
    inner: Rc<FeedbackInner<V, S>>,
}

impl<V, S: Scheduler> Clone for CopyFeedback<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V, S> CopyFeedback<V, S>
where
    V: CopyButtonView + 'static,
    S: Scheduler + 'static,
{
    pub fn new(view: V, scheduler: S, style: FeedbackStyle) -> Self {
        Self {
            inner: Rc::new(FeedbackInner {
                view,
                scheduler,
                style,
                pending: RefCell::new(None),
            }),
        }
    }

    pub fn view(&self) -> &V {
        &self.inner.view
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    pub fn show(&self, outcome: CopyOutcome) {
        let inner = &self.inner;
        let previous = inner.pending.borrow_mut().take();
        let (label, background) = match previous {
            Some(previous) => {
                inner.scheduler.cancel(previous.handle);
                (previous.label, previous.background)
            }
            None => (inner.view.label(), inner.view.background()),
        };

        let (next_label, next_color) = inner.style.for_outcome(outcome);
        inner.view.set_label(next_label);
        inner.view.set_background(next_color);

        let weak: Weak<FeedbackInner<V, S>> = Rc::downgrade(inner);
        let handle = inner.scheduler.schedule(
            inner.style.duration_ms,
            Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let revert = inner.pending.borrow_mut().take();
                if let Some(revert) = revert {
                    inner.view.set_label(&revert.label);
                    inner.view.set_background(&revert.background);
                }
            }),
        );

        *inner.pending.borrow_mut() = Some(PendingRevert {
            handle,
            label,
            background,
        });
    }
}
