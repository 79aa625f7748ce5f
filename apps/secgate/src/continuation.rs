//! # Continuations
//!
//! The success/failure pair handed to an asynchronous collaborator.
//!
//! `Continuations` is consumed by whichever of `succeed`, `fail` or
//! `resolve` is called, so a collaborator can run at most one of the two
//! closures, at most once. Dropping it without resolving runs neither;
//! that only happens when the runtime shuts down with the attempt still
//! in flight.

use secgate_core::GateError;

/// Success continuation.
pub type OnSucceed = Box<dyn FnOnce() + Send + 'static>;

/// Failure continuation. Receives the reason the attempt failed.
pub type OnFail = Box<dyn FnOnce(GateError) + Send + 'static>;

/// A pending success/failure pair. Exactly one side runs on resolution.
pub struct Continuations {
    on_succeed: OnSucceed,
    on_fail: OnFail,
}

impl Continuations {
    /// Bundle a success and a failure continuation.
    pub fn new(
        on_succeed: impl FnOnce() + Send + 'static,
        on_fail: impl FnOnce(GateError) + Send + 'static,
    ) -> Self {
        Self {
            on_succeed: Box::new(on_succeed),
            on_fail: Box::new(on_fail),
        }
    }

    /// Run the success continuation and discard the failure one.
    pub fn succeed(self) {
        (self.on_succeed)();
    }

    /// Run the failure continuation and discard the success one.
    pub fn fail(self, error: GateError) {
        (self.on_fail)(error);
    }

    /// Run the continuation matching `outcome`.
    pub fn resolve(self, outcome: Result<(), GateError>) {
        match outcome {
            Ok(()) => self.succeed(),
            Err(e) => self.fail(e),
        }
    }

    /// Wrap the success side: `before` runs first, then the original
    /// success continuation. The failure side is unchanged.
    pub fn before_success(self, before: impl FnOnce() + Send + 'static) -> Self {
        let on_succeed = self.on_succeed;
        Self {
            on_succeed: Box::new(move || {
                before();
                on_succeed();
            }),
            on_fail: self.on_fail,
        }
    }
}

impl std::fmt::Debug for Continuations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Continuations").finish_non_exhaustive()
    }
}
