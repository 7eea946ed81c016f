//! Render isolation boundary
//!
//! [`ErrorBoundary`] wraps one mount at a time. A failing child, whether it
//! returns an error or panics, moves the boundary to `Faulted`; the host is
//! told once and the fallback is shown until the identity changes or
//! [`ErrorBoundary::reset`] is called.
//!
//! Only failures inside the child closure are contained. Work the child
//! schedules to run later is outside the boundary's reach.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use mirage_script::{Node, ScriptError, to_html};
use tracing::{debug, warn};

use crate::error::LoadError;

/// Receives boundary notifications
pub trait BoundaryHost {
    /// A fault was captured; called once per fault
    fn on_error(&mut self, message: &str);

    /// First successful render for the current identity
    fn on_success(&mut self);
}

/// [`BoundaryHost`] built from two closures
pub struct Callbacks<E, S> {
    on_error: E,
    on_success: S,
}

impl<E, S> Callbacks<E, S>
where
    E: FnMut(&str),
    S: FnMut(),
{
    pub fn new(on_error: E, on_success: S) -> Self {
        Self {
            on_error,
            on_success,
        }
    }
}

impl<E, S> BoundaryHost for Callbacks<E, S>
where
    E: FnMut(&str),
    S: FnMut(),
{
    fn on_error(&mut self, message: &str) {
        (self.on_error)(message)
    }

    fn on_success(&mut self) {
        (self.on_success)()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Resolution or top-level evaluation of a file
    Load,
    /// The mounted component threw
    Render,
    /// The child panicked
    Panic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Load => "load",
            FailureKind::Render => "render",
            FailureKind::Panic => "panic",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub kind: FailureKind,
    /// File the failure is attributed to
    pub path: Option<String>,
    /// Unresolved import specifier
    pub specifier: Option<String>,
}

/// A captured failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub message: String,
    pub detail: Option<FailureDetail>,
}

impl RenderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.detail.as_ref().map(|detail| detail.kind)
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            format!("Render panicked: {}", s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("Render panicked: {}", s)
        } else {
            "Render panicked".to_string()
        };
        Self {
            message,
            detail: Some(FailureDetail {
                kind: FailureKind::Panic,
                path: None,
                specifier: None,
            }),
        }
    }
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RenderFailure {}

impl From<LoadError> for RenderFailure {
    fn from(error: LoadError) -> Self {
        Self {
            message: error.to_string(),
            detail: Some(FailureDetail {
                kind: FailureKind::Load,
                path: error.path().map(str::to_string),
                specifier: error.specifier().map(str::to_string),
            }),
        }
    }
}

impl From<ScriptError> for RenderFailure {
    fn from(error: ScriptError) -> Self {
        Self {
            message: error.to_string(),
            detail: Some(FailureDetail {
                kind: FailureKind::Render,
                path: None,
                specifier: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    Clear,
    Faulted,
}

/// Fault containment around a mount
pub struct ErrorBoundary<H: BoundaryHost> {
    host: H,
    identity: Option<String>,
    fault: Option<RenderFailure>,
    /// `on_success` already fired for the current identity
    succeeded: bool,
}

impl<H: BoundaryHost> ErrorBoundary<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            identity: None,
            fault: None,
            succeeded: false,
        }
    }

    /// Render `child` under `identity`.
    ///
    /// A new identity clears any fault first. While faulted, `child` is not
    /// invoked and the stored failure is returned.
    pub fn render<T, E, F>(&mut self, identity: &str, child: F) -> Result<T, &RenderFailure>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderFailure>,
    {
        if self.identity.as_deref() != Some(identity) {
            if self.identity.is_some() {
                debug!(identity, "boundary identity changed");
            }
            self.identity = Some(identity.to_string());
            self.fault = None;
            self.succeeded = false;
        }

        match self.fault {
            Some(ref failure) => Err(failure),
            None => match catch_unwind(AssertUnwindSafe(child)) {
                Ok(Ok(content)) => {
                    if !self.succeeded {
                        self.succeeded = true;
                        self.host.on_success();
                    }
                    Ok(content)
                }
                Ok(Err(error)) => Err(self.record(error.into())),
                Err(payload) => Err(self.record(RenderFailure::from_panic(payload))),
            },
        }
    }

    fn record(&mut self, failure: RenderFailure) -> &RenderFailure {
        warn!(
            identity = self.identity.as_deref().unwrap_or_default(),
            kind = ?failure.kind(),
            "{}",
            failure.message
        );
        self.host.on_error(&failure.message);
        self.fault.insert(failure)
    }

    /// Clear the fault without changing identity
    pub fn reset(&mut self) {
        self.fault = None;
    }

    pub fn state(&self) -> BoundaryState {
        if self.fault.is_some() {
            BoundaryState::Faulted
        } else {
            BoundaryState::Clear
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn failure(&self) -> Option<&RenderFailure> {
        self.fault.as_ref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

/// Markup shown in place of a faulted artifact
pub fn fallback_html(failure: &RenderFailure) -> String {
    let text = |s: &str| Node::Text(s.to_string());
    let mut children = vec![
        Node::Element {
            tag: "strong".into(),
            attributes: Vec::new(),
            children: vec![text("Preview failed")],
        },
        Node::Element {
            tag: "pre".into(),
            attributes: Vec::new(),
            children: vec![text(&failure.message)],
        },
    ];
    if let Some(path) = failure.detail.as_ref().and_then(|detail| detail.path.as_deref()) {
        children.push(Node::Element {
            tag: "small".into(),
            attributes: Vec::new(),
            children: vec![text(path)],
        });
    }
    to_html(&[Node::Element {
        tag: "div".into(),
        attributes: vec![
            ("role".into(), "alert".into()),
            ("class".into(), "mirage-error".into()),
        ],
        children,
    }])
}
