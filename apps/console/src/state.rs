use std::sync::Arc;

use crate::backend::RecordStore;
use crate::config::Config;
use crate::remarks::reminder::ReminderValidator;
use crate::remarks::submit::SubmitGuard;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// CRM backend. `BackendClient` in production, an in-memory store in tests.
    pub store: Arc<dyn RecordStore>,
    pub config: Config,
    pub reminders: ReminderValidator,
    /// One remark submission in flight per record.
    pub submissions: SubmitGuard,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self {
            store,
            reminders: ReminderValidator::new(config.reminder_offset),
            config,
            submissions: SubmitGuard::default(),
        }
    }
}
