// ==========================================
// 施工现场日报系统 - 短期预报接口客户端
// ==========================================
// 接口: 기상청 단기예보 (getVilageFcst)
// 参数: ServiceKey, pageNo, numOfRows, dataType, base_date, base_time, nx, ny
// 响应: response.header.resultCode + response.body.items.item[] {category, fcstValue}
// ==========================================

use crate::config::WeatherSettings;
use crate::engine::forecast_decode::ForecastItem;
use crate::engine::forecast_window::ForecastWindow;
use crate::weather::error::WeatherError;
use async_trait::async_trait;
use serde::Deserialize;

/// 成功的 resultCode
const RESULT_CODE_OK: &str = "00";

/// 单次请求条目数（覆盖一整天的全部分类）
const NUM_OF_ROWS: &str = "1000";

// ==========================================
// ForecastClient Trait
// ==========================================
// 实现者: KmaForecastClient（reqwest）；测试中可替换为桩
#[async_trait]
pub trait ForecastClient: Send + Sync {
    /// 查询某发布时次的全部预报条目
    async fn fetch_forecast(
        &self,
        window: &ForecastWindow,
    ) -> Result<Vec<ForecastItem>, WeatherError>;
}

// ==========================================
// 响应结构
// ==========================================

#[derive(Debug, Deserialize)]
struct KmaEnvelope {
    response: KmaResponse,
}

#[derive(Debug, Deserialize)]
struct KmaResponse {
    header: KmaHeader,
    body: Option<KmaBody>,
}

#[derive(Debug, Deserialize)]
struct KmaHeader {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct KmaBody {
    items: KmaItems,
}

#[derive(Debug, Deserialize)]
struct KmaItems {
    #[serde(default)]
    item: Vec<ForecastItem>,
}

/// 解析响应文本
///
/// 出错时接口可能返回 XML，统一视为格式错误
fn parse_payload(text: &str) -> Result<Vec<ForecastItem>, WeatherError> {
    let envelope: KmaEnvelope = serde_json::from_str(text)
        .map_err(|e| WeatherError::MalformedPayload(e.to_string()))?;

    let header = envelope.response.header;
    if header.result_code != RESULT_CODE_OK {
        return Err(WeatherError::Upstream {
            code: header.result_code,
            message: header.result_msg,
        });
    }

    envelope
        .response
        .body
        .map(|body| body.items.item)
        .ok_or_else(|| WeatherError::MalformedPayload("响应缺少 body".to_string()))
}

// ==========================================
// KmaForecastClient - reqwest 实现
// ==========================================

pub struct KmaForecastClient {
    client: reqwest::Client,
    settings: WeatherSettings,
}

impl KmaForecastClient {
    /// 创建客户端（请求超时取自配置）
    pub fn new(settings: WeatherSettings) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ForecastClient for KmaForecastClient {
    async fn fetch_forecast(
        &self,
        window: &ForecastWindow,
    ) -> Result<Vec<ForecastItem>, WeatherError> {
        if self.settings.service_key.trim().is_empty() {
            return Err(WeatherError::MissingServiceKey);
        }

        let base_date = window.base_date_param();
        let base_time = window.base_time_param();
        let nx = self.settings.grid_nx.to_string();
        let ny = self.settings.grid_ny.to_string();

        tracing::debug!(base_date = %base_date, base_time = %base_time, "请求短期预报");

        let text = self
            .client
            .get(&self.settings.base_url)
            .query(&[
                ("ServiceKey", self.settings.service_key.as_str()),
                ("pageNo", "1"),
                ("numOfRows", NUM_OF_ROWS),
                ("dataType", "JSON"),
                ("base_date", base_date.as_str()),
                ("base_time", base_time.as_str()),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_payload(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_payload() {
        let text = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL_SERVICE"},
            "body":{"dataType":"JSON","items":{"item":[
                {"baseDate":"20240315","baseTime":"0500","category":"TMN","fcstDate":"20240315","fcstTime":"0600","fcstValue":"-1.0","nx":60,"ny":121},
                {"baseDate":"20240315","baseTime":"0500","category":"SKY","fcstDate":"20240315","fcstTime":"0600","fcstValue":"1","nx":60,"ny":121}
            ]},"pageNo":1,"numOfRows":1000,"totalCount":2}}}"#;

        let items = parse_payload(text).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], ForecastItem::new("TMN", "-1.0"));
    }

    #[test]
    fn test_parse_upstream_error() {
        let text = r#"{"response":{"header":{"resultCode":"03","resultMsg":"NO_DATA"}}}"#;
        assert!(matches!(
            parse_payload(text),
            Err(WeatherError::Upstream { code, .. }) if code == "03"
        ));
    }

    #[test]
    fn test_parse_xml_is_malformed() {
        let text = "<OpenAPI_ServiceResponse><cmmMsgHeader/></OpenAPI_ServiceResponse>";
        assert!(matches!(parse_payload(text), Err(WeatherError::MalformedPayload(_))));
    }

    #[test]
    fn test_missing_body_is_malformed() {
        let text = r#"{"response":{"header":{"resultCode":"00","resultMsg":"OK"}}}"#;
        assert!(matches!(parse_payload(text), Err(WeatherError::MalformedPayload(_))));
    }
}
