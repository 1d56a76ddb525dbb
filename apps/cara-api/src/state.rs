use std::sync::Arc;

use cara_index::QdrantIndex;
use cara_providers::lexical::Bm25Encoder;
use cara_service::CaraService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CaraService>,
}
impl AppState {
	pub fn new(config: cara_config::Config) -> color_eyre::Result<Self> {
		let index = QdrantIndex::new(&config.index)?;
		let lexical = Bm25Encoder::load(&config.lexical.artifact)?;
		let service = CaraService::new(config, Arc::new(index), lexical);

		Ok(Self { service: Arc::new(service) })
	}

	pub fn with_service(service: CaraService) -> Self {
		Self { service: Arc::new(service) }
	}
}
