//! Host environment descriptor.
//!
//! Everything the pipelines need to know about the machine they run on is
//! detected once by the caller and passed in, so tests can describe any host.

use crate::config::ServiceLayout;

/// Facts about the running host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    pub hostname: String,
    pub hostname_error: Option<String>,
    /// Effective user id.
    pub uid: u32,
    pub services: ServiceLayout,
}

impl HostEnvironment {
    pub fn new(hostname: impl Into<String>, uid: u32, services: ServiceLayout) -> Self {
        Self {
            hostname: hostname.into(),
            hostname_error: None,
            uid,
            services,
        }
    }

    /// Detect hostname and effective uid of the current process.
    pub fn detect(services: ServiceLayout) -> Self {
        let (hostname, hostname_error) = match hostname::get() {
            Ok(name) => (name.to_string_lossy().into_owned(), None),
            Err(e) => (String::new(), Some(format!("cannot get hostname: {e}"))),
        };

        Self {
            hostname,
            hostname_error,
            uid: effective_uid(),
            services,
        }
    }

    pub fn with_hostname_error(mut self, error: impl Into<String>) -> Self {
        self.hostname = String::new();
        self.hostname_error = Some(error.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.uid == 0
    }

    /// Error reported when a command needs root and the process is not.
    pub fn uid_error(&self) -> Option<String> {
        (!self.is_root()).then(|| "this command requires root privileges".to_string())
    }
}

#[cfg(unix)]
fn effective_uid() -> u32 {
    unsafe { libc::geteuid() }
}

#[cfg(not(unix))]
fn effective_uid() -> u32 {
    0
}
