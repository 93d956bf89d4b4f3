//! Build-pipeline utilities handed to the audit step.

/// Capability to mark the surrounding build as failed.
pub trait BuildUtils {
    fn fail_build(&self, message: &str);
}

/// Default failure handler: log the message and exit with status 1.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExitProcess;

impl BuildUtils for ExitProcess {
    fn fail_build(&self, message: &str) {
        log::error!("{}", message);
        std::process::exit(1);
    }
}
