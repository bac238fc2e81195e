// ── Portal ──
//
// The explicitly constructed context callers hold instead of a process-wide
// singleton: one session, one client, and factories for the stateful flows
// built on top of them.

use std::sync::Arc;

use rollcall_api::{ClassId, FileBackend, SchoolClient, SessionStore, Student};
use tracing::debug;

use crate::bulk::AttendanceSheet;
use crate::config::{ClientConfig, SessionLocation};
use crate::error::CoreError;
use crate::search::QueryCoordinator;

/// Cheaply cloneable; clones share the session and connection pool.
#[derive(Clone)]
pub struct Portal {
    client: SchoolClient,
    config: Arc<ClientConfig>,
}

impl Portal {
    /// Open the session described by `config` and assemble the client.
    ///
    /// Makes no network calls.
    pub fn open(config: ClientConfig) -> Result<Self, CoreError> {
        let session = match &config.session {
            SessionLocation::Memory => SessionStore::in_memory(),
            SessionLocation::File(path) => SessionStore::open(FileBackend::new(path)).map_err(
                |source| CoreError::SessionUnavailable {
                    path: path.clone(),
                    source,
                },
            )?,
        };
        debug!(
            base_url = %config.base_url,
            authenticated = session.is_authenticated(),
            "portal opened"
        );

        let client = SchoolClient::new(
            config.base_url.as_str(),
            &config.transport,
            Arc::new(session),
            config.policy.clone(),
        )
        .map_err(|source| CoreError::ClientSetup {
            url: config.base_url.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn client(&self) -> &SchoolClient {
        &self.client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A debounced student search wired to the student gateway.
    pub fn student_search(&self) -> QueryCoordinator<Vec<Student>> {
        let students = self.client.students().clone();
        QueryCoordinator::new(self.config.search_debounce, move |term: String| {
            let students = students.clone();
            async move { students.search(&term).await }
        })
    }

    /// An attendance sheet for `roster`, using the configured default status.
    pub fn attendance_sheet(
        &self,
        class_id: Option<ClassId>,
        roster: &[Student],
    ) -> AttendanceSheet {
        AttendanceSheet::for_roster(class_id, roster, self.config.policy.default_status)
    }
}
