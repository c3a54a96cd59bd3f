use sd_core::{DashboardStore, DigestNotifier};
use std::sync::Arc;

use crate::auth::AuthConfig;

pub struct AppState {
    pub store: Arc<dyn DashboardStore>,
    pub notifier: Arc<dyn DigestNotifier>,
    pub auth: AuthConfig,
}
