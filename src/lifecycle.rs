use tracing::info;

/// Ready guard shared by every component that has an initialize/shutdown cycle.
///
/// Components start out not ready. Public operations call [`Lifecycle::ensure_ready`]
/// before doing any work so that a component that was shut down fails fast instead
/// of producing partial output.
#[derive(Debug)]
pub struct Lifecycle {
    component: &'static str,
    ready: bool,
}

impl Lifecycle {
    pub const fn new(component: &'static str) -> Self {
        Self { component, ready: false }
    }

    pub fn initialize(&mut self) {
        info!(component = self.component, "initializing");
        self.ready = true;
    }

    pub fn shutdown(&mut self) {
        info!(component = self.component, "shutting down");
        self.ready = false;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn ensure_ready(&self) -> Result<(), NotReady> {
        if self.ready { Ok(()) } else { Err(NotReady { component: self.component }) }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{component} is not enabled")]
pub struct NotReady {
    pub component: &'static str,
}
