use std::sync::Arc;

use http::HeaderMap;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::context::{CallContext, LogContext};
use crate::detail::Detail;
use crate::dispatcher::Dispatcher;
use crate::error::JsonRpcError;
use crate::request::BatchRequest;
use crate::response::{BatchResponse, JsonRpcMessage};

/// Largest batch accepted unless configured otherwise
pub const DEFAULT_MAX_BATCH_SIZE: usize = 25;
/// Batch elements in flight at once unless configured otherwise
pub const DEFAULT_BATCH_PARALLELISM: usize = 8;

/// Runs the [`Dispatcher`] over every element of a batch.
///
/// Each element is its own task; at most `parallelism` of them run at a
/// time and the rest wait for a slot. Elements fail independently. Only
/// requests with an id contribute an entry to the result.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    dispatcher: Dispatcher,
    max_batch_size: usize,
    parallelism: usize,
}

impl BatchExecutor {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            parallelism: DEFAULT_BATCH_PARALLELISM,
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Clamped to `1..=Semaphore::MAX_PERMITS`
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatch every element and collect the correlated outcomes.
    ///
    /// An empty batch or one larger than `max_batch_size` is rejected as a
    /// whole with an Invalid Request error and nothing is dispatched.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        log: &LogContext,
        headers: &HeaderMap,
        batch: BatchRequest,
    ) -> Result<BatchResponse, JsonRpcError> {
        if batch.is_empty() {
            warn!("Rejected empty batch");
            return Err(JsonRpcError::invalid_request(
                None,
                [Detail::rationale("Empty batch")],
            ));
        }
        if batch.len() > self.max_batch_size {
            warn!(
                size = batch.len(),
                max = self.max_batch_size,
                "Rejected oversized batch"
            );
            return Err(JsonRpcError::invalid_request(
                None,
                [
                    Detail::rationale("Too many requests"),
                    Detail::new("maxBatchSize", self.max_batch_size),
                ],
            ));
        }

        debug!(size = batch.len(), parallelism = self.parallelism, "Dispatching batch");

        let log = log.clone().with("batch.size", batch.len());
        let headers = Arc::new(headers.clone());
        let slots = Arc::new(Semaphore::new(self.parallelism));
        let responses: Arc<Mutex<Vec<JsonRpcMessage>>> =
            Arc::new(Mutex::new(Vec::with_capacity(batch.len())));
        let mut tasks = JoinSet::new();

        for request in batch {
            let dispatcher = self.dispatcher.clone();
            let ctx = ctx.clone();
            let log = log.clone();
            let headers = Arc::clone(&headers);
            let slots = Arc::clone(&slots);
            let responses = Arc::clone(&responses);

            tasks.spawn(async move {
                let Ok(_slot) = slots.acquire().await else {
                    return;
                };
                let correlated = !request.is_notification();
                let outcome = dispatcher.route(&ctx, &log, &headers, request).await;
                if correlated {
                    responses.lock().await.push(outcome.into_message());
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!("Batch element task failed: {}", err);
            }
        }

        let messages = std::mem::take(&mut *responses.lock().await);
        Ok(BatchResponse::new(messages))
    }
}
