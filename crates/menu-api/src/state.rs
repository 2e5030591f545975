use std::sync::Arc;

use menu_core::MenuService;
use menu_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MenuService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service: MenuService, config: AppConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}
