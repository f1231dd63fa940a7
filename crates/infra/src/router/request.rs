//! Inbound request shapes: the raw `{type, params}` envelope and the typed
//! request it validates into.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use bizsense_ai::RouteStop;
use bizsense_ai::models::{
    AmbassadorInput, ChurnInput, DriverInput, FraudInput, InventoryInput, ReorderInput,
    SalesForecastInput, StoreQualityInput,
};

use super::RouterError;
use crate::jobs::AiTask;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteParams {
    pub stops: Vec<RouteStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTaskParams {
    pub task: AiTask,
}

/// A validated analytical request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum AiRequest {
    StoreQualityScore(StoreQualityInput),
    ReorderPrediction(ReorderInput),
    DriverPerformance(DriverInput),
    SalesForecast(SalesForecastInput),
    InventoryNeeds(InventoryInput),
    WholesalerFraud(FraudInput),
    AmbassadorScore(AmbassadorInput),
    RouteOptimization(RouteParams),
    ChurnRisk(ChurnInput),
    RunTask(RunTaskParams),
}

impl AiRequest {
    /// Every request tag, as it appears on the wire.
    pub const KINDS: [&'static str; 10] = [
        "store_quality_score",
        "reorder_prediction",
        "driver_performance",
        "sales_forecast",
        "inventory_needs",
        "wholesaler_fraud",
        "ambassador_score",
        "route_optimization",
        "churn_risk",
        "run_task",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            AiRequest::StoreQualityScore(_) => "store_quality_score",
            AiRequest::ReorderPrediction(_) => "reorder_prediction",
            AiRequest::DriverPerformance(_) => "driver_performance",
            AiRequest::SalesForecast(_) => "sales_forecast",
            AiRequest::InventoryNeeds(_) => "inventory_needs",
            AiRequest::WholesalerFraud(_) => "wholesaler_fraud",
            AiRequest::AmbassadorScore(_) => "ambassador_score",
            AiRequest::RouteOptimization(_) => "route_optimization",
            AiRequest::ChurnRisk(_) => "churn_risk",
            AiRequest::RunTask(_) => "run_task",
        }
    }
}

/// Raw inbound request, as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(kind: impl Into<String>, params: Value) -> Self {
        Self {
            kind: Some(kind.into()),
            params: Some(params),
        }
    }

    /// Check presence of `type` then `params`, then decode the payload for
    /// the tag.
    pub fn into_request(self) -> Result<AiRequest, RouterError> {
        let kind = match self.kind {
            Some(kind) if !kind.is_empty() => kind,
            _ => return Err(RouterError::MissingType),
        };
        let params = match self.params {
            Some(Value::Null) | None => return Err(RouterError::MissingParams),
            Some(params) => params,
        };
        if !AiRequest::KINDS.contains(&kind.as_str()) {
            return Err(RouterError::UnknownType(kind));
        }

        serde_json::from_value(json!({ "type": kind, "params": params })).map_err(|e| {
            RouterError::InvalidParams {
                kind,
                message: e.to_string(),
            }
        })
    }
}

impl From<AiRequest> for RequestEnvelope {
    fn from(request: AiRequest) -> Self {
        let kind = request.kind();
        let params = match serde_json::to_value(&request) {
            Ok(Value::Object(mut map)) => map.remove("params"),
            _ => None,
        };
        Self {
            kind: Some(kind.to_string()),
            params,
        }
    }
}
