/// 公众号 API 客户端
///
/// 封装 token、永久素材上传、新建草稿三个接口
use crate::clients::DraftApi;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{DraftPayload, ProxyConfig, UploadResult};
use async_trait::async_trait;
use reqwest::multipart;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const TOKEN_ENDPOINT: &str = "token";
const UPLOAD_ENDPOINT: &str = "material/add_material";
const DRAFT_ENDPOINT: &str = "draft/add";

/// 公众号 API 客户端
///
/// 每个账号一个实例，代理在构建时确定
pub struct WeChatClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    draft_timeout: Duration,
    upload_timeout: Duration,
}

impl WeChatClient {
    /// 创建新的客户端
    ///
    /// # 参数
    /// - `config`: 全局配置（API 地址、超时）
    /// - `proxy`: 账号级 SOCKS5 代理（可选）
    pub fn new(config: &Config, proxy: Option<&ProxyConfig>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy.url()?).map_err(ApiError::ClientBuild)?;
            builder = builder.proxy(proxy);
        }
        let http = builder.build().map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
            draft_timeout: config.draft_timeout(),
            upload_timeout: config.upload_timeout(),
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// 发送请求并把响应体解析为 JSON
    async fn send_json(&self, endpoint: &str, request: reqwest::RequestBuilder) -> AppResult<Value> {
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        debug!("{} 响应: {}", endpoint, body);

        serde_json::from_str(&body).map_err(|source| {
            ApiError::JsonParseFailed {
                endpoint: endpoint.to_string(),
                source,
            }
            .into()
        })
    }

    /// 把平台的 errcode / errmsg 转成错误
    fn bad_response(endpoint: &str, result: &Value) -> AppError {
        ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            code: result.get("errcode").and_then(Value::as_i64),
            message: result
                .get("errmsg")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
        .into()
    }

    /// 检查草稿响应是否成功
    pub fn is_success_response(result: &Value) -> bool {
        result.get("errcode").and_then(Value::as_i64) == Some(0) || result.get("media_id").is_some()
    }
}

#[async_trait]
impl DraftApi for WeChatClient {
    async fn fetch_token(&self, app_id: &str, app_secret: &str) -> AppResult<String> {
        let request = self
            .http
            .get(self.endpoint_url(TOKEN_ENDPOINT))
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", app_id),
                ("secret", app_secret),
            ])
            .timeout(self.request_timeout);

        let result = self.send_json(TOKEN_ENDPOINT, request).await?;

        match result.get("access_token").and_then(Value::as_str) {
            Some(token) => Ok(token.to_string()),
            None if result.get("errcode").is_some() => Err(Self::bad_response(TOKEN_ENDPOINT, &result)),
            None => Err(ApiError::MissingField {
                endpoint: TOKEN_ENDPOINT.to_string(),
                field: "access_token",
            }
            .into()),
        }
    }

    async fn download_image(&self, url: &str) -> AppResult<Vec<u8>> {
        let bytes = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::api_request_failed(url, e))?
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(url, e))?;

        Ok(bytes.to_vec())
    }

    async fn upload_image(&self, token: &str, file_name: &str, data: Vec<u8>) -> AppResult<UploadResult> {
        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|e| AppError::api_request_failed(UPLOAD_ENDPOINT, e))?;
        let form = multipart::Form::new().part("media", part);

        let request = self
            .http
            .post(self.endpoint_url(UPLOAD_ENDPOINT))
            .query(&[("access_token", token), ("type", "image")])
            .multipart(form)
            .timeout(self.upload_timeout);

        let result = self.send_json(UPLOAD_ENDPOINT, request).await?;

        if result.get("media_id").is_none() {
            return Err(Self::bad_response(UPLOAD_ENDPOINT, &result));
        }

        serde_json::from_value(result).map_err(|source| {
            ApiError::JsonParseFailed {
                endpoint: UPLOAD_ENDPOINT.to_string(),
                source,
            }
            .into()
        })
    }

    async fn create_draft(&self, token: &str, payload: &DraftPayload) -> AppResult<Option<String>> {
        // 平台要求中文不转义，serde_json 默认即输出 UTF-8 原文
        let body = serde_json::to_vec(payload).map_err(|source| ApiError::JsonParseFailed {
            endpoint: DRAFT_ENDPOINT.to_string(),
            source,
        })?;

        let request = self
            .http
            .post(self.endpoint_url(DRAFT_ENDPOINT))
            .query(&[("access_token", token)])
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .timeout(self.draft_timeout);

        let result = self.send_json(DRAFT_ENDPOINT, request).await?;

        if Self::is_success_response(&result) {
            Ok(result
                .get("media_id")
                .and_then(Value::as_str)
                .map(str::to_string))
        } else {
            Err(Self::bad_response(DRAFT_ENDPOINT, &result))
        }
    }
}

/// 按扩展名推断图片 MIME，默认 JPEG
pub fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".bmp") {
        "image/bmp"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_success_response() {
        assert!(WeChatClient::is_success_response(&json!({"errcode": 0})));
        assert!(WeChatClient::is_success_response(&json!({"media_id": "abc"})));
        assert!(!WeChatClient::is_success_response(&json!({"errcode": 45166, "errmsg": "invalid content"})));
        assert!(!WeChatClient::is_success_response(&json!({})));
    }

    #[test]
    fn test_bad_response_extracts_code() {
        let err = WeChatClient::bad_response(DRAFT_ENDPOINT, &json!({"errcode": 40007, "errmsg": "invalid media_id"}));
        match err {
            AppError::Api(ApiError::BadResponse { code, message, .. }) => {
                assert_eq!(code, Some(40007));
                assert_eq!(message.as_deref(), Some("invalid media_id"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("a.PNG"), "image/png");
        assert_eq!(mime_for("cover.gif"), "image/gif");
        assert_eq!(mime_for("photo"), "image/jpeg");
    }

    #[test]
    fn test_socks_proxy_client_builds() {
        let proxy = ProxyConfig {
            host: "127.0.0.1".to_string(),
            port: 1080,
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
        };
        assert!(WeChatClient::new(&Config::default(), Some(&proxy)).is_ok());

        let escaped = ProxyConfig {
            password: Some("p@ss:w/rd".to_string()),
            ..proxy
        };
        assert!(WeChatClient::new(&Config::default(), Some(&escaped)).is_ok());
    }

    /// 真实接口连通性，需要设置 WECHAT_APP_ID / WECHAT_APP_SECRET
    #[tokio::test]
    #[ignore]
    async fn test_fetch_token_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let app_id = std::env::var("WECHAT_APP_ID").expect("WECHAT_APP_ID 未设置");
        let app_secret = std::env::var("WECHAT_APP_SECRET").expect("WECHAT_APP_SECRET 未设置");

        let client = WeChatClient::new(&Config::from_env(), None).unwrap();
        let token = client.fetch_token(&app_id, &app_secret).await.unwrap();
        assert!(!token.is_empty());
    }
}
