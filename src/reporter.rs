use log::{error, info};
use std::sync::Arc;

/// Where [`MockServerClient`] sends progress notes and terminal failures.
///
/// `fail` is called exactly once for every operation ending in an error, after the error has
/// been classified - never for statuses tolerated while verification attempts remain.
///
/// Use [`LogReporter`] (the default) to simply log failures and handle the returned `Result`s,
/// or [`PanicReporter`] to fail the current test as soon as an operation fails.
///
/// [`MockServerClient`]: crate::MockServerClient
pub trait Reporter: Send + Sync {
    fn log(&self, message: &str);

    fn fail(&self, message: &str);
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn log(&self, message: &str) {
        (**self).log(message)
    }

    fn fail(&self, message: &str) {
        (**self).fail(message)
    }
}

/// Forward everything to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn log(&self, message: &str) {
        info!("{}", message);
    }

    fn fail(&self, message: &str) {
        error!("{}", message);
    }
}

/// Panic on failures, failing the test that is driving the client.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl Reporter for PanicReporter {
    fn log(&self, message: &str) {
        info!("{}", message);
    }

    fn fail(&self, message: &str) {
        panic!("{}", message);
    }
}
