//! Request router: validate, dispatch, and wrap every outcome.
//!
//! ```text
//! RequestEnvelope { type, params }
//!   ↓ validate (type, then params, then payload shape)
//! AiRequest
//!   ↓ dispatch (prediction model, or TaskScheduler for run_task)
//! AiResponse<AiOutput>
//! ```
//!
//! Nothing escapes the router as an `Err` or a panic; every failure is
//! reported as `AiResponse { success: false, error }`.

pub mod request;
pub mod response;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use bizsense_ai::models::{
    calculate_ambassador_score, calculate_churn_risk, calculate_driver_performance,
    calculate_store_quality, detect_wholesaler_fraud, forecast_brand_sales,
    predict_inventory_needs, predict_reorder,
};
use bizsense_ai::{AiError, optimize_route};

pub use request::{AiRequest, RequestEnvelope, RouteParams, RunTaskParams};
pub use response::{AiOutput, AiResponse};

use crate::jobs::TaskScheduler;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouterError {
    #[error("Request type is required")]
    MissingType,
    #[error("Request params are required")]
    MissingParams,
    #[error("Unknown request type: {0}")]
    UnknownType(String),
    #[error("invalid params for {kind}: {message}")]
    InvalidParams { kind: String, message: String },
    #[error(transparent)]
    Model(#[from] AiError),
    /// The request's task was cancelled or panicked.
    #[error("request aborted: {0}")]
    Aborted(String),
}

/// Entry point for analytical requests.
#[derive(Debug, Clone)]
pub struct AiRouter {
    scheduler: Arc<TaskScheduler>,
}

impl AiRouter {
    pub fn new(scheduler: TaskScheduler) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
        }
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// Dispatch a typed request.
    pub async fn process(&self, request: AiRequest) -> AiResponse<AiOutput> {
        let kind = request.kind();
        debug!(request_type = kind, "dispatching request");

        match self.dispatch(request).await {
            Ok(output) => AiResponse::ok(output),
            Err(err) => {
                warn!(request_type = kind, error = %err, "request failed");
                AiResponse::err(err.to_string())
            }
        }
    }

    /// Validate a raw envelope, then dispatch it.
    pub async fn process_envelope(&self, envelope: RequestEnvelope) -> AiResponse<AiOutput> {
        match envelope.into_request() {
            Ok(request) => self.process(request).await,
            Err(err) => {
                warn!(error = %err, "request rejected");
                AiResponse::err(err.to_string())
            }
        }
    }

    /// Dispatch every envelope concurrently; responses come back in input order.
    ///
    /// Each request runs on its own tokio task, so one failing (or panicking)
    /// request never affects the others.
    pub async fn process_batch(&self, envelopes: Vec<RequestEnvelope>) -> Vec<AiResponse<AiOutput>> {
        let handles: Vec<_> = envelopes
            .into_iter()
            .map(|envelope| {
                let router = self.clone();
                tokio::spawn(async move { router.process_envelope(envelope).await })
            })
            .collect();

        let mut responses = Vec::with_capacity(handles.len());
        for handle in handles {
            let response = match handle.await {
                Ok(response) => response,
                Err(join_err) => {
                    let err = RouterError::Aborted(join_err.to_string());
                    warn!(error = %err, "batch request aborted");
                    AiResponse::err(err.to_string())
                }
            };
            responses.push(response);
        }
        responses
    }

    async fn dispatch(&self, request: AiRequest) -> Result<AiOutput, RouterError> {
        let output = match request {
            AiRequest::StoreQualityScore(input) => {
                AiOutput::StoreQuality(calculate_store_quality(&input)?)
            }
            AiRequest::ReorderPrediction(input) => {
                AiOutput::Reorder(predict_reorder(&input, Utc::now())?)
            }
            AiRequest::DriverPerformance(input) => {
                AiOutput::Driver(calculate_driver_performance(&input)?)
            }
            AiRequest::SalesForecast(input) => AiOutput::SalesForecast(forecast_brand_sales(&input)?),
            AiRequest::InventoryNeeds(input) => AiOutput::Inventory(predict_inventory_needs(&input)?),
            AiRequest::WholesalerFraud(input) => AiOutput::Fraud(detect_wholesaler_fraud(&input)?),
            AiRequest::AmbassadorScore(input) => {
                AiOutput::Ambassador(calculate_ambassador_score(&input)?)
            }
            AiRequest::RouteOptimization(params) => AiOutput::Route(optimize_route(params.stops)),
            AiRequest::ChurnRisk(input) => AiOutput::Churn(calculate_churn_risk(&input)?),
            AiRequest::RunTask(params) => AiOutput::Task(self.scheduler.execute(&params.task).await),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{AiTask, JsonMap, TaskCategory, TaskFrequency, TaskHandler, TaskLogStatus, TaskRegistry};
    use chrono::DateTime;
    use serde_json::json;

    struct Panics;

    #[async_trait::async_trait]
    impl TaskHandler for Panics {
        async fn run(&self, _task: &AiTask, _now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
            panic!("handler bug")
        }
    }

    fn router() -> AiRouter {
        AiRouter::new(TaskScheduler::new(TaskRegistry::new()))
    }

    fn driver_params() -> serde_json::Value {
        json!({
            "driverId": "d1",
            "totalDeliveries": 100,
            "completedDeliveries": 95,
            "onTimeDeliveries": 80,
            "customerRatings": [5, 4, 5],
            "averageDeliveryTime": 30,
            "expectedDeliveryTime": 30
        })
    }

    #[tokio::test]
    async fn model_errors_become_error_responses() {
        let response = router()
            .process_envelope(RequestEnvelope::new(
                "wholesaler_fraud",
                json!({ "wholesalerId": "w1", "orderAmounts": [] }),
            ))
            .await;

        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("invalid model input: order history is empty"));
    }

    #[tokio::test]
    async fn null_ratings_do_not_escape_the_router() {
        let mut params = driver_params();
        params["customerRatings"] = serde_json::Value::Null;

        let response = router()
            .process_envelope(RequestEnvelope::new("driver_performance", params))
            .await;

        assert!(!response.success);
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn typed_requests_dispatch_to_models() {
        let response = router()
            .process_envelope(RequestEnvelope::new("driver_performance", driver_params()))
            .await;

        assert!(response.success, "{:?}", response.error);
        match response.data {
            Some(AiOutput::Driver(perf)) => assert_eq!(perf.driver_id.as_deref(), Some("d1")),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_task_goes_through_the_scheduler() {
        let task = AiTask::new("Unwired", "", TaskCategory::Operations, TaskFrequency::Manual).unwrap();
        let response = router()
            .process(AiRequest::RunTask(RunTaskParams { task: task.clone() }))
            .await;

        match response.data {
            Some(AiOutput::Task(log)) => {
                assert_eq!(log.task_id, task.id);
                assert_eq!(log.status, TaskLogStatus::Completed);
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn batch_preserves_order_and_isolates_failures() {
        let responses = router()
            .process_batch(vec![
                RequestEnvelope::new("driver_performance", driver_params()),
                RequestEnvelope::new("teleport", json!({})),
                RequestEnvelope::default(),
            ])
            .await;

        assert_eq!(responses.len(), 3);
        assert!(responses[0].success);
        assert!(!responses[1].success);
        assert_eq!(responses[1].error.as_deref(), Some("Unknown request type: teleport"));
        assert_eq!(responses[2].error.as_deref(), Some("Request type is required"));
    }

    #[tokio::test]
    async fn panicking_task_is_reported_not_raised() {
        let router = AiRouter::new(TaskScheduler::new(TaskRegistry::new().with_handler("explodes", Panics)));
        let task = AiTask::new("explodes", "", TaskCategory::Analytics, TaskFrequency::Manual).unwrap();

        let response = router
            .process(AiRequest::RunTask(RunTaskParams { task: task.clone() }))
            .await;
        match response.data {
            Some(AiOutput::Task(log)) => {
                assert_eq!(log.status, TaskLogStatus::Failed);
                assert_eq!(log.error.as_deref(), Some("task panicked: handler bug"));
            }
            other => panic!("unexpected output: {other:?}"),
        }

        let responses = router
            .process_batch(vec![
                RequestEnvelope::from(AiRequest::RunTask(RunTaskParams { task })),
                RequestEnvelope::new("driver_performance", driver_params()),
            ])
            .await;

        assert_eq!(responses.len(), 2);
        match &responses[0].data {
            Some(AiOutput::Task(log)) => assert_eq!(log.status, TaskLogStatus::Failed),
            other => panic!("unexpected output: {other:?}"),
        }
        assert!(responses[1].success);
    }
}
