use std::sync::Arc;

use pdfduck_extract::{Extractor, PdfBackend};

/// Shared application state accessible from all handlers.
///
/// The backend and extractor are stateless between requests; nothing here
/// is mutated after startup, so a bad upload cannot affect later requests.
pub struct AppState {
    pub backend: Arc<dyn PdfBackend>,
    pub extractor: Extractor,
}

impl AppState {
    pub fn new(backend: impl PdfBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            extractor: Extractor::new(),
        }
    }
}
