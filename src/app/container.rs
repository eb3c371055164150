use std::sync::Arc;

use crate::adapters::FFmpegAdapter;
use crate::app::{CompressInteractor, InspectInteractor};
use crate::config::CompressorConfig;
use crate::ports::PassExecutor;

pub trait AppContainer: Send + Sync {
    fn compress_interactor(&self) -> Arc<CompressInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    compress_interactor: Arc<CompressInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire the subprocess executor
    pub fn new(config: CompressorConfig) -> Self {
        Self::with_executor(config, Arc::new(FFmpegAdapter::new()))
    }

    pub fn with_executor(config: CompressorConfig, executor: Arc<dyn PassExecutor>) -> Self {
        let compress_interactor = Arc::new(CompressInteractor::new(
            Arc::clone(&executor),
            config.clone(),
        ));
        let inspect_interactor = Arc::new(InspectInteractor::new(executor, config));

        Self {
            compress_interactor,
            inspect_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn compress_interactor(&self) -> Arc<CompressInteractor> {
        Arc::clone(&self.compress_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
