//! Uniform response envelope returned for every routed request.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use bizsense_ai::RouteStop;
use bizsense_ai::models::{
    AmbassadorScore, ChurnRisk, DriverPerformance, FraudSignals, InventoryNeeds,
    ReorderPrediction, SalesForecast, StoreQualityScore,
};

use crate::jobs::TaskLog;

/// `success` is true exactly when `data` is present; otherwise `error` is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// UTC, RFC 3339.
    pub timestamp: String,
}

impl<T> AiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: now_rfc3339(),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: now_rfc3339(),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), _) if self.success => Ok(data),
            (_, Some(error)) => Err(error),
            _ => Err("response carries neither data nor error".to_string()),
        }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Result payload of any request kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AiOutput {
    StoreQuality(StoreQualityScore),
    Reorder(ReorderPrediction),
    Driver(DriverPerformance),
    SalesForecast(SalesForecast),
    Inventory(InventoryNeeds),
    Fraud(FraudSignals),
    Ambassador(AmbassadorScore),
    Route(Vec<RouteStop>),
    Churn(ChurnRisk),
    Task(TaskLog),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn ok_and_err_are_exclusive() {
        let ok = AiResponse::ok(5);
        assert!(ok.success);
        assert_eq!(ok.data, Some(5));
        assert!(ok.error.is_none());

        let err: AiResponse<i32> = AiResponse::err("boom");
        assert!(!err.success);
        assert!(err.data.is_none());
        assert_eq!(err.into_result(), Err("boom".to_string()));
    }

    #[test]
    fn error_response_omits_data_field() {
        let err: AiResponse<AiOutput> = AiResponse::err("Unknown request type: x");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("data").is_none());
        assert!(DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn outputs_serialize_without_wrapper() {
        let out = AiOutput::Route(vec![RouteStop::new("a", 1.0, 2.0, 3.0)]);
        let value = serde_json::to_value(AiResponse::ok(out)).unwrap();
        assert_eq!(value["data"][0]["id"], "a");
    }
}
