//! Fyers v3 data API: index quote and options chain.

use super::FeedError;
use crate::domain::entities::chain::{ChainRow, ChainSnapshot};
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::values::option_side::OptionSide;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api-t1.fyers.in";
pub const NIFTY_INDEX_SYMBOL: &str = "NSE:NIFTY50-INDEX";

pub struct FyersClient {
    client_id: String,
    access_token: String,
    symbol: String,
    strike_count: u32,
    base_url: String,
    client: reqwest::Client,
}

impl FyersClient {
    pub fn new(client_id: String, access_token: String, symbol: String, strike_count: u32) -> Self {
        Self {
            client_id,
            access_token,
            symbol,
            strike_count,
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::builder()
                .user_agent("oiwatch/0.1")
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FeedError> {
        if self.client_id.is_empty() || self.access_token.is_empty() {
            return Err(FeedError::Config("Fyers client id / access token not set".into()));
        }
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("{}:{}", self.client_id, self.access_token))
            .query(query)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FeedError::Network(format!(
                "Fyers API returned {} for {path}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))?;
        if body.get("s").and_then(Value::as_str) != Some("ok") {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(FeedError::Api(format!("{path}: {message}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl MarketDataProvider for FyersClient {
    fn name(&self) -> &str {
        "fyers"
    }

    async fn get_spot(&self) -> Result<f64, DomainError> {
        let body = self
            .get_json("/data/quotes", &[("symbols", self.symbol.clone())])
            .await?;
        Ok(parse_spot(&body)?)
    }

    async fn get_chain_snapshot(&self) -> Result<ChainSnapshot, DomainError> {
        let body = self
            .get_json(
                "/data/options-chain-v3",
                &[
                    ("symbol", self.symbol.clone()),
                    ("strikecount", self.strike_count.to_string()),
                    ("timestamp", String::new()),
                ],
            )
            .await?;
        Ok(parse_chain(&body)?)
    }
}

pub fn parse_spot(body: &Value) -> Result<f64, FeedError> {
    body.pointer("/d/0/v/lp")
        .and_then(Value::as_f64)
        .ok_or_else(|| FeedError::Parse("quote response has no last price".into()))
}

/// Parse the options chain. Rows that cannot be read are counted and
/// skipped; the underlying's own row (no option type) is ignored.
pub fn parse_chain(body: &Value) -> Result<ChainSnapshot, FeedError> {
    let data = body
        .get("data")
        .ok_or_else(|| FeedError::Parse("chain response has no data".into()))?;
    let raw_rows = data
        .get("optionsChain")
        .and_then(Value::as_array)
        .ok_or_else(|| FeedError::Parse("chain response has no optionsChain".into()))?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut skipped_rows = 0;
    for raw in raw_rows {
        match parse_row(raw) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => {}
            Err(e) => {
                debug!(error = %e, "skipping malformed chain row");
                skipped_rows += 1;
            }
        }
    }

    let expiries = data
        .get("expiryData")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|e| e.get("date")?.as_str())
                .filter_map(|d| NaiveDate::parse_from_str(d, "%d-%m-%Y").ok())
                .collect()
        })
        .unwrap_or_default();

    Ok(ChainSnapshot {
        rows,
        expiries,
        skipped_rows,
    })
}

fn parse_row(raw: &Value) -> Result<Option<ChainRow>, String> {
    let option_type = raw.get("option_type").and_then(Value::as_str).unwrap_or("");
    if option_type.is_empty() {
        return Ok(None);
    }
    let side: OptionSide = option_type.parse()?;
    let strike = number(raw, "strike_price")?;
    if strike <= 0.0 {
        return Err(format!("non-positive strike {strike}"));
    }
    let open_interest = number(raw, "oi")?;
    let last_price = number(raw, "ltp")?;
    let volume = number(raw, "volume").unwrap_or(0.0);
    Ok(Some(ChainRow {
        side,
        strike: strike.round() as i64,
        open_interest: open_interest.round() as i64,
        last_price,
        volume: volume.round() as i64,
    }))
}

/// Numeric field that may arrive as a JSON number or a numeric string.
fn number(raw: &Value, field: &str) -> Result<f64, String> {
    let value = raw.get(field).ok_or_else(|| format!("missing {field}"))?;
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
        .ok_or_else(|| format!("{field} is not a number: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> FyersClient {
        FyersClient::new("APP-100".into(), "tok".into(), NIFTY_INDEX_SYMBOL.into(), 20)
            .with_base_url(server.uri())
    }

    #[test]
    fn test_parse_spot() {
        let body = json!({"s": "ok", "d": [{"n": "NSE:NIFTY50-INDEX", "v": {"lp": 24012.35}}]});
        assert_eq!(parse_spot(&body).unwrap(), 24012.35);
        assert!(parse_spot(&json!({"s": "ok", "d": []})).is_err());
    }

    #[test]
    fn test_parse_chain_skips_bad_rows() {
        let body = json!({
            "s": "ok",
            "data": {
                "expiryData": [{"date": "23-10-2025", "expiry": "1761213600"}, {"date": "bad"}],
                "optionsChain": [
                    {"symbol": "NSE:NIFTY50-INDEX", "option_type": "", "strike_price": -1, "ltp": 24012.0},
                    {"option_type": "CE", "strike_price": 24000, "oi": 150000, "ltp": 95.5, "volume": 12000},
                    {"option_type": "PE", "strike_price": 24000, "oi": "210000", "ltp": 80.0},
                    {"option_type": "PE", "strike_price": 24050, "oi": "n/a", "ltp": 99.0},
                    {"option_type": "XX", "strike_price": 24050, "oi": 1, "ltp": 1.0}
                ]
            }
        });
        let snap = parse_chain(&body).unwrap();
        assert_eq!(snap.rows.len(), 2);
        assert_eq!(snap.skipped_rows, 2);
        assert_eq!(snap.rows[0].side, OptionSide::Call);
        assert_eq!(snap.rows[1].open_interest, 210000);
        assert_eq!(snap.rows[1].volume, 0);
        assert_eq!(snap.expiries, vec![NaiveDate::from_ymd_opt(2025, 10, 23).unwrap()]);
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let client = FyersClient::new(String::new(), String::new(), NIFTY_INDEX_SYMBOL.into(), 20);
        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt.block_on(client.get_spot()).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[tokio::test]
    async fn test_get_spot_sends_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/quotes"))
            .and(query_param("symbols", NIFTY_INDEX_SYMBOL))
            .and(header("Authorization", "APP-100:tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "s": "ok",
                "d": [{"n": NIFTY_INDEX_SYMBOL, "v": {"lp": 24101.5}}]
            })))
            .mount(&server)
            .await;

        assert_eq!(client(&server).get_spot().await.unwrap(), 24101.5);
    }

    #[tokio::test]
    async fn test_get_chain_snapshot_passes_strike_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/options-chain-v3"))
            .and(query_param("strikecount", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "s": "ok",
                "data": {
                    "expiryData": [{"date": "28-10-2025"}],
                    "optionsChain": [
                        {"option_type": "CE", "strike_price": 24000, "oi": 150000, "ltp": 95.5, "volume": 12000},
                        {"option_type": "PE", "strike_price": 24000, "oi": 210000, "ltp": 80.0, "volume": 9000}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let snap = client(&server).get_chain_snapshot().await.unwrap();
        assert_eq!(snap.rows.len(), 2);
        assert_eq!(snap.expiries, vec![NaiveDate::from_ymd_opt(2025, 10, 28).unwrap()]);
    }

    #[tokio::test]
    async fn test_api_error_status_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/quotes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "s": "error",
                "message": "token expired"
            })))
            .mount(&server)
            .await;

        let err = client(&server).get_spot().await.unwrap_err();
        assert!(matches!(&err, DomainError::Provider(msg) if msg.contains("token expired")));
    }

    #[tokio::test]
    async fn test_http_failure_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/options-chain-v3"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).get_chain_snapshot().await.unwrap_err();
        assert!(matches!(err, DomainError::Provider(_)));
    }
}
