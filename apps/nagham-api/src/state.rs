use std::sync::Arc;

use nagham_service::{NaghamService, PreferenceStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NaghamService>,
}
impl AppState {
	pub fn new(config: nagham_config::Config) -> Self {
		let service = NaghamService::new(config, Arc::new(PreferenceStore::new()));

		Self::from_service(service)
	}

	pub fn from_service(service: NaghamService) -> Self {
		Self { service: Arc::new(service) }
	}
}
