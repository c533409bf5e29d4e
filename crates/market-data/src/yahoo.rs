use crate::QuoteProvider;
use crate::error::MarketDataError;
use crate::responses::{ChartResponse, ChartResult};
use async_trait::async_trait;
use chrono::DateTime;
use configuration::MarketDataSettings;
use core_types::{Exchange, Period, PriceBar, PriceSeries};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::time::Duration;

/// A `QuoteProvider` backed by the public chart endpoint.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(settings: &MarketDataSettings) -> Result<Self, MarketDataError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|e| MarketDataError::InvalidData(format!("user agent: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_chart(
        &self,
        ticker: &str,
        period: Period,
    ) -> Result<ChartResponse, MarketDataError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            ticker.replace('^', "%5E")
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", period.provider_range()),
                ("interval", "1d"),
                ("includeAdjustedClose", "false"),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // The endpoint reports unknown tickers as 404 with a regular chart body.
        match serde_json::from_str::<ChartResponse>(&text) {
            Ok(body) => Ok(body),
            Err(_) if status == reqwest::StatusCode::NOT_FOUND => {
                Err(MarketDataError::SymbolNotFound(ticker.to_string()))
            }
            Err(e) if status.is_success() => Err(MarketDataError::Deserialization(e.to_string())),
            Err(_) => Err(MarketDataError::Provider(format!("HTTP {status}: {text}"))),
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooClient {
    async fn fetch_history(
        &self,
        symbol: &str,
        exchange: Exchange,
        period: Period,
    ) -> Result<PriceSeries, MarketDataError> {
        let ticker = exchange.qualify(symbol);
        tracing::debug!(%ticker, %period, "Fetching daily history");

        let body = self.fetch_chart(&ticker, period).await?;
        let series = parse_chart(&ticker, period, body)?;

        tracing::debug!(%ticker, bars = series.len(), "Fetched daily history");
        Ok(series)
    }
}

/// Converts a chart body into a `PriceSeries`.
///
/// Rows with any missing OHLC value are dropped. For windows the provider can
/// only serve as "max", the series is trimmed to the period's bar count.
pub fn parse_chart(
    ticker: &str,
    period: Period,
    body: ChartResponse,
) -> Result<PriceSeries, MarketDataError> {
    if let Some(error) = body.chart.error {
        let description = error.description.unwrap_or_default();
        return Err(if error.code.eq_ignore_ascii_case("Not Found") {
            MarketDataError::SymbolNotFound(ticker.to_string())
        } else {
            MarketDataError::Provider(format!("{}: {}", error.code, description))
        });
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::new(ticker, period, Vec::new()));
    };

    let bars = bars_from_result(&result)?;
    let series = PriceSeries::new(result.meta.symbol, period, bars);

    Ok(match period.provider_range() {
        "max" => series.trailing(period.approx_trading_days()),
        _ => series,
    })
}

fn bars_from_result(result: &ChartResult) -> Result<Vec<PriceBar>, MarketDataError> {
    let Some(quote) = result.indicators.quote.first() else {
        return Ok(Vec::new());
    };
    let offset = result.meta.gmt_offset.unwrap_or(0);
    let column = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            column(&quote.open, i),
            column(&quote.high, i),
            column(&quote.low, i),
            column(&quote.close, i),
        ) else {
            continue;
        };

        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| MarketDataError::InvalidData(format!("Invalid timestamp: {ts}")))?
            .date_naive();

        bars.push(PriceBar {
            date,
            open: to_decimal(open)?,
            high: to_decimal(high)?,
            low: to_decimal(low)?,
            close: to_decimal(close)?,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }
    Ok(bars)
}

fn to_decimal(value: f64) -> Result<Decimal, MarketDataError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(6))
        .ok_or_else(|| MarketDataError::InvalidData(format!("Unrepresentable price: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "RELIANCE.NS", "currency": "INR", "gmtoffset": 19800, "exchangeName": "NSI"},
                "timestamp": [1704253500, 1704339900, 1704426300],
                "indicators": {"quote": [{
                    "open":   [2600.5, null, 2610.0],
                    "high":   [2620.0, 2630.0, 2640.25],
                    "low":    [2590.0, 2600.0, 2605.0],
                    "close":  [2615.0, 2625.0, 2635.5],
                    "volume": [1200000, 900000, null]
                }]}
            }],
            "error": null
        }
    }"#;

    fn settings(base_url: String) -> MarketDataSettings {
        MarketDataSettings {
            base_url,
            ..MarketDataSettings::default()
        }
    }

    #[test]
    fn parse_skips_incomplete_rows() {
        let body: ChartResponse = serde_json::from_str(CHART).unwrap();
        let series = parse_chart("RELIANCE.NS", Period::OneMonth, body).unwrap();

        assert_eq!(series.len(), 2);
        let first = series.first().unwrap();
        assert_eq!(first.date.to_string(), "2024-01-03");
        assert_eq!(first.open, Decimal::new(26005, 1));
        assert_eq!(first.volume, 1_200_000);
        assert_eq!(series.last().unwrap().volume, 0);
    }

    #[test]
    fn dates_follow_the_exchange_offset() {
        // 2024-01-02 20:00 UTC is already 2024-01-03 in India (+05:30).
        let chart = |offset: i64| {
            format!(
                r#"{{"chart": {{"result": [{{
                    "meta": {{"symbol": "TCS.NS", "gmtoffset": {offset}}},
                    "timestamp": [1704225600],
                    "indicators": {{"quote": [{{
                        "open": [3700.0], "high": [3720.0], "low": [3690.0],
                        "close": [3710.0], "volume": [5000]
                    }}]}}
                }}], "error": null}}}}"#
            )
        };

        let local: ChartResponse = serde_json::from_str(&chart(19800)).unwrap();
        let series = parse_chart("TCS.NS", Period::OneMonth, local).unwrap();
        assert_eq!(series.first().unwrap().date.to_string(), "2024-01-03");

        let utc: ChartResponse = serde_json::from_str(&chart(0)).unwrap();
        let series = parse_chart("TCS.NS", Period::OneMonth, utc).unwrap();
        assert_eq!(series.first().unwrap().date.to_string(), "2024-01-02");
    }

    #[test]
    fn provider_error_maps_to_not_found() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#,
        )
        .unwrap();

        let err = parse_chart("ZZZ.NS", Period::OneYear, body).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(_)));
    }

    #[tokio::test]
    async fn fetches_qualified_ticker_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v8/finance/chart/RELIANCE.NS")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("range".into(), "1mo".into()),
                Matcher::UrlEncoded("interval".into(), "1d".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CHART)
            .create_async()
            .await;

        let client = YahooClient::new(&settings(server.url())).unwrap();
        let series = client
            .fetch_history("reliance", Exchange::Nse, Period::OneMonth)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(series.symbol, "RELIANCE.NS");
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn http_404_is_symbol_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v8/finance/chart/MISSING.BO")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let client = YahooClient::new(&settings(server.url())).unwrap();
        let err = client
            .fetch_history("MISSING", Exchange::Bse, Period::OneYear)
            .await
            .unwrap_err();

        assert!(matches!(err, MarketDataError::SymbolNotFound(t) if t == "MISSING.BO"));
    }
}
