use std::sync::Arc;

use crate::config::GuardConfig;
use crate::execution::{ProcessExecutor, ProcessSpawnRequest, run_and_collect_output};
use crate::guard::toolchain::{ToolchainSource, toolchain_version_request};
use crate::models::GuardResult;

pub struct ProcessToolchainSource {
    executor: Arc<dyn ProcessExecutor>,
    request: ProcessSpawnRequest,
}

impl ProcessToolchainSource {
    pub fn new(executor: Arc<dyn ProcessExecutor>, config: &GuardConfig) -> Self {
        Self {
            executor,
            request: toolchain_version_request(config),
        }
    }
}

impl ToolchainSource for ProcessToolchainSource {
    fn version_output(&self) -> GuardResult<String> {
        run_and_collect_output(self.executor.as_ref(), self.request.clone())
    }
}
