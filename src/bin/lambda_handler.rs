//! AWS Lambda handler for single-loan break-funding requests
//!
//! Accepts loan terms as JSON and returns the break-funding cost, the present
//! values and optionally the stacked chart series.
//!
//! Works both for direct invocation (payload is the request) and for Lambda
//! Function URLs (request is the JSON string in `body`).

use break_funding::{config::CurveConfig, BreakFundingCalculator, RawLoanTerms, StackedSeries};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A numeric field sent either as a JSON number or as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NumberField {
    Number(f64),
    Text(String),
}

impl NumberField {
    fn into_text(self) -> String {
        match self {
            NumberField::Number(n) => n.to_string(),
            NumberField::Text(s) => s,
        }
    }
}

impl Default for NumberField {
    fn default() -> Self {
        NumberField::Number(0.0)
    }
}

/// Input for one computation
#[derive(Debug, Deserialize)]
pub struct BreakFundingRequest {
    pub effective_date: String,
    pub maturity_date: String,
    pub frequency: String,
    pub amortization_type: String,

    /// Annual rate in percent
    pub loan_rate: NumberField,
    pub balance: NumberField,
    pub prepayment_date: String,

    #[serde(default)]
    pub prepayment_amount: NumberField,

    /// Include the four stacked chart series in the response
    #[serde(default)]
    pub include_chart: bool,
}

impl BreakFundingRequest {
    fn into_raw_terms(self) -> RawLoanTerms {
        RawLoanTerms {
            effective_date: self.effective_date,
            maturity_date: self.maturity_date,
            frequency: self.frequency,
            amortization_type: self.amortization_type,
            loan_rate: self.loan_rate.into_text(),
            balance: self.balance.into_text(),
            prepayment_date: self.prepayment_date,
            prepayment_amount: self.prepayment_amount.into_text(),
        }
    }
}

/// Output of one computation
#[derive(Debug, Serialize)]
pub struct BreakFundingResponse {
    pub break_funding_cost: f64,
    pub pv_original: f64,
    pub pv_adjusted: f64,
    pub periods: usize,
    pub prepay_index: usize,
    pub curve: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<StackedSeries>,
    pub execution_time_ms: u64,
}

fn http_response(status: u16, body: &Value) -> Value {
    json!({
        "statusCode": status,
        "headers": {
            "Content-Type": "application/json",
            "Access-Control-Allow-Origin": "*",
            "Access-Control-Allow-Methods": "POST, OPTIONS",
            "Access-Control-Allow-Headers": "Content-Type",
        },
        "body": body.to_string(),
    })
}

fn error_response(status: u16, message: &str) -> Value {
    http_response(status, &json!({ "error": message }))
}

/// Pull the request JSON out of a Function URL event, or use the payload as-is
fn request_body(payload: Value) -> Result<Value, String> {
    if let Some(Value::String(body)) = payload.get("body") {
        if payload.get("isBase64Encoded").and_then(Value::as_bool).unwrap_or(false) {
            return Err("Base64-encoded bodies are not supported".to_string());
        }
        return serde_json::from_str(body).map_err(|e| format!("Invalid JSON: {}", e));
    }

    // Function URL event without a body
    if payload.get("requestContext").is_some() {
        return Ok(json!({}));
    }
    Ok(payload)
}

fn compute(body: Value, calculator: &BreakFundingCalculator) -> Result<BreakFundingResponse, (u16, String)> {
    let start = std::time::Instant::now();

    let request: BreakFundingRequest =
        serde_json::from_value(body).map_err(|e| (400, format!("Invalid request: {}", e)))?;
    let include_chart = request.include_chart;

    let terms = request
        .into_raw_terms()
        .parse()
        .map_err(|e| (400, e.to_string()))?;

    let result = calculator.calculate(&terms).map_err(|e| (422, e.to_string()))?;

    Ok(BreakFundingResponse {
        break_funding_cost: result.cost,
        pv_original: result.pv_original,
        pv_adjusted: result.pv_adjusted,
        periods: result.original.periods(),
        prepay_index: result.adjusted.prepay_index,
        curve: result.curve.clone(),
        chart: include_chart.then(|| StackedSeries::from_result(&result)),
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

/// Lambda handler function
async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let payload = event.payload;

    // CORS preflight
    let method = payload
        .pointer("/requestContext/http/method")
        .and_then(Value::as_str)
        .unwrap_or("POST");
    if method.eq_ignore_ascii_case("OPTIONS") {
        return Ok(http_response(200, &json!({})));
    }

    let body = match request_body(payload) {
        Ok(body) => body,
        Err(message) => return Ok(error_response(400, &message)),
    };

    let calculator = BreakFundingCalculator::from_config(&CurveConfig::from_env());
    match compute(body, &calculator) {
        Ok(response) => Ok(http_response(200, &serde_json::to_value(&response)?)),
        Err((status, message)) => {
            log::warn!("Request rejected ({}): {}", status, message);
            Ok(error_response(status, &message))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
