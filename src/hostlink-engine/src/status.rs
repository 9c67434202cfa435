//! The `status` pipeline: read-only queries of every subsystem.

use tracing::debug;

use crate::collaborators::Collaborators;
use crate::environment::HostEnvironment;
use crate::exit_status::{EXIT_FAILURE, EXIT_OK};
use crate::result::{Facet, StatusResult};

pub struct StatusPipeline<'a> {
    env: &'a HostEnvironment,
    collaborators: Collaborators,
}

impl<'a> StatusPipeline<'a> {
    pub fn new(env: &'a HostEnvironment, collaborators: Collaborators) -> Self {
        Self { env, collaborators }
    }

    pub async fn run(&self) -> StatusResult {
        let c = &self.collaborators;
        let (rhsm, content, analytics, daemon) = tokio::join!(
            c.subscription.is_registered(),
            c.subscription.manages_repos(),
            c.analytics.is_registered(),
            c.services.is_active(&self.env.services.daemon_unit),
        );

        let rhsm = Facet::from_query(rhsm);
        let content = Facet::from_query(content);
        let analytics = Facet::from_query(analytics);
        let daemon = Facet::from_query(daemon);

        let all_ok = [&rhsm, &content, &analytics, &daemon]
            .iter()
            .all(|f| f.is_ok());
        let exit_code = if all_ok && self.env.hostname_error.is_none() {
            EXIT_OK
        } else {
            EXIT_FAILURE
        };
        debug!("status finished with exit code {}", exit_code);

        StatusResult {
            hostname: self.env.hostname.clone(),
            hostname_error: self.env.hostname_error.clone(),
            rhsm,
            content,
            analytics,
            daemon,
            exit_code,
        }
    }
}
