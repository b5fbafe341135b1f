// 請求書APIのHTTPクライアント

use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, error, info};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::{BillStore, CreatedProof, ProofUpload, StoreError, StoreResult, UpdateRequest};
use crate::features::bills::Bill;
use crate::features::new_bill::content_type_for;
use crate::shared::config::StoreConfig;
use crate::shared::errors::{AppError, AppResult};

const BILLS_RESOURCE: &str = "bills";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// エラー応答の本文
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            StoreError::Decode(error.to_string())
        } else {
            StoreError::Network(error.to_string())
        }
    }
}

/// 請求書APIクライアント
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: Url,
    jwt: Option<String>,
}

impl HttpStore {
    /// 設定からクライアントを初期化する
    ///
    /// # 引数
    /// * `config` - APIのベースURLと認証トークン
    ///
    /// # 戻り値
    /// 初期化されたクライアント。HTTPクライアントを構築できない場合は設定エラー
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::configuration(format!("HTTPクライアントの初期化に失敗しました: {e}"))
            })?;

        // joinで末尾のパスが置き換わらないよう、ベースURLは必ず`/`で終える
        let mut base_url = config.api_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        info!("請求書APIクライアントを初期化しました: {base_url}");

        Ok(Self {
            client,
            base_url,
            jwt: config.jwt.clone(),
        })
    }

    /// 環境変数の設定からクライアントを初期化する
    pub fn from_env() -> AppResult<Self> {
        Self::new(&StoreConfig::from_env()?)
    }

    /// リソースのURLを組み立てる
    ///
    /// # 引数
    /// * `path` - ベースURLからの相対パス（例: `bills/{id}`）
    ///
    /// # 戻り値
    /// 結合後のURL
    pub fn endpoint(&self, path: &str) -> StoreResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| {
                StoreError::Rejected(format!("URLの組み立てに失敗しました ({path}): {e}"))
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.jwt {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// 応答を検査し、成功時は本文をデシリアライズする
    async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
        let status = response.status();
        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("").to_string();
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or(fallback);
            error!("請求書APIがエラーを返しました: status={status}, message={message}");
            return Err(StoreError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn fetch_bills(&self) -> StoreResult<Vec<Bill>> {
        let url = self.endpoint(BILLS_RESOURCE)?;
        debug!("請求書一覧を取得します: {url}");

        let response = self.authorize(self.client.get(url)).send().await?;
        Self::read_json(response).await
    }

    async fn upload_proof(&self, upload: ProofUpload) -> StoreResult<CreatedProof> {
        let url = self.endpoint(BILLS_RESOURCE)?;
        let file_name = upload.file.base_name().to_string();
        debug!(
            "証憑をアップロードします: file={file_name}, size={}bytes",
            upload.file.bytes.len()
        );

        // ブラウザ申告のContent-Typeは空や不明な値があり得るため、拡張子から決める
        let content_type = content_type_for(&file_name);
        let part = Part::bytes(upload.file.bytes)
            .file_name(file_name)
            .mime_str(content_type)?;
        let form = Form::new().part("file", part).text("email", upload.email);

        let response = self
            .authorize(self.client.post(url))
            .multipart(form)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn save_bill(&self, request: UpdateRequest) -> StoreResult<Bill> {
        let builder = match &request.selector {
            Some(id) => {
                let url = self.endpoint(&format!("{BILLS_RESOURCE}/{id}"))?;
                debug!("請求書を更新します: {url}");
                self.client.patch(url)
            }
            None => {
                let url = self.endpoint(BILLS_RESOURCE)?;
                debug!("請求書を新規作成します: {url}");
                self.client.post(url)
            }
        };

        let response = self.authorize(builder).json(&request.bill).send().await?;
        Self::read_json(response).await
    }
}

impl BillStore for HttpStore {
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Bill>>> {
        Box::pin(self.fetch_bills())
    }

    fn create(&self, upload: ProofUpload) -> BoxFuture<'_, StoreResult<CreatedProof>> {
        Box::pin(self.upload_proof(upload))
    }

    fn update(&self, request: UpdateRequest) -> BoxFuture<'_, StoreResult<Bill>> {
        Box::pin(self.save_bill(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bills::{BillDraft, BillStatus};
    use crate::features::new_bill::SelectedFile;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn store(api_url: &str) -> HttpStore {
        HttpStore::new(&StoreConfig::from_values(api_url, None).unwrap()).unwrap()
    }

    fn store_with_jwt(api_url: &str, jwt: &str) -> HttpStore {
        HttpStore::new(&StoreConfig::from_values(api_url, Some(jwt.to_string())).unwrap())
            .unwrap()
    }

    /// 受信したリクエスト（ヘッダー名は小文字化済み）
    struct CapturedRequest {
        method: String,
        path: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl CapturedRequest {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }
    }

    fn find_header_end(buffer: &[u8]) -> Option<usize> {
        buffer.windows(4).position(|w| w == b"\r\n\r\n")
    }

    /// 一件だけリクエストを受け付け、固定の応答を返すテスト用サーバー
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "ヘッダーの途中で接続が閉じられました");
                buffer.extend_from_slice(&chunk[..n]);
                if let Some(end) = find_header_end(&buffer) {
                    break end;
                }
            };

            let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let mut lines = head.split("\r\n");
            let mut request_line = lines.next().unwrap().split(' ');
            let method = request_line.next().unwrap().to_string();
            let path = request_line.next().unwrap().to_string();
            let headers: Vec<(String, String)> = lines
                .filter_map(|line| line.split_once(':'))
                .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
                .collect();

            let content_length = headers
                .iter()
                .find(|(k, _)| k == "content-length")
                .map(|(_, v)| v.parse::<usize>().unwrap())
                .unwrap_or(0);
            let body_start = header_end + 4;
            while buffer.len() < body_start + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buffer.extend_from_slice(&chunk[..n]);
            }
            let request_body = String::from_utf8_lossy(&buffer[body_start..]).to_string();

            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            CapturedRequest {
                method,
                path,
                headers,
                body: request_body,
            }
        });

        (base_url, handle)
    }

    fn draft() -> BillDraft {
        BillDraft {
            email: "employee@test.tld".to_string(),
            bill_type: "Transports".to_string(),
            name: "Vol Paris Londres".to_string(),
            amount: 348,
            date: "2004-04-04".to_string(),
            vat: "70".to_string(),
            pct: 20,
            commentary: String::new(),
            file_url: Some("https://localhost:3456/images/facture.png".to_string()),
            file_name: Some("facture.png".to_string()),
            status: BillStatus::Pending,
        }
    }

    const SAVED_BILL: &str = concat!(
        r#"{"id":"47qAXb6fIm2zOKkLzMro","email":"employee@test.tld","type":"Transports","#,
        r#""name":"Vol Paris Londres","amount":348,"date":"2004-04-04","vat":"70","pct":20,"#,
        r#""commentary":"","fileUrl":"https://localhost:3456/images/facture.png","#,
        r#""fileName":"facture.png","status":"pending"}"#
    );

    #[test]
    fn test_endpoint_from_root_url() {
        let store = store("http://localhost:5678");
        assert_eq!(
            store.endpoint("bills").unwrap().as_str(),
            "http://localhost:5678/bills"
        );
        assert_eq!(
            store.endpoint("bills/47qAXb6fIm2zOKkLzMro").unwrap().as_str(),
            "http://localhost:5678/bills/47qAXb6fIm2zOKkLzMro"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let store = store("https://api.billed.test/v1");
        assert_eq!(
            store.endpoint("bills").unwrap().as_str(),
            "https://api.billed.test/v1/bills"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // 接続できないポートに対してはネットワークエラーになる
        let store = store("http://127.0.0.1:9");
        let result = store.list().await;
        assert!(matches!(result, Err(StoreError::Network(_))));
    }

    #[tokio::test]
    async fn test_list_sends_get_without_authorization() {
        let (base_url, server) = serve_once("200 OK", "[]").await;

        let bills = store(&base_url).list().await.unwrap();
        assert!(bills.is_empty());

        let request = server.await.unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/bills");
        assert_eq!(request.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_jwt_is_sent_as_bearer_token() {
        let (base_url, server) = serve_once("200 OK", "[]").await;

        store_with_jwt(&base_url, "jeton-secret").list().await.unwrap();

        let request = server.await.unwrap();
        assert_eq!(request.header("authorization"), Some("Bearer jeton-secret"));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_and_email() {
        let body = r#"{"fileUrl":"https://localhost:3456/images/U.png","key":"K"}"#;
        let (base_url, server) = serve_once("200 OK", body).await;

        let file = SelectedFile::new("C:\\fakepath\\facture.png", "image/png", b"PNGDATA".to_vec());
        let created = store(&base_url)
            .create(ProofUpload {
                file,
                email: "employee@test.tld".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.key, "K");
        assert_eq!(created.file_url, "https://localhost:3456/images/U.png");

        let request = server.await.unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/bills");
        assert!(request
            .header("content-type")
            .unwrap()
            .starts_with("multipart/form-data"));
        assert!(request.body.contains(r#"name="file"; filename="facture.png""#));
        assert!(request.body.to_lowercase().contains("content-type: image/png"));
        assert!(request.body.contains("PNGDATA"));
        assert!(request.body.contains(r#"name="email""#));
        assert!(request.body.contains("employee@test.tld"));
    }

    #[tokio::test]
    async fn test_upload_ignores_reported_content_type() {
        // 拡張子で受け付けたファイルは、申告されたContent-Typeが空でもアップロードできる
        for reported in ["", "inconnu", "application/octet-stream"] {
            let (base_url, server) = serve_once("200 OK", r#"{"fileUrl":"U","key":"K"}"#).await;

            let created = store(&base_url)
                .create(ProofUpload {
                    file: SelectedFile::new("facture.JPG", reported, b"JPEGDATA".to_vec()),
                    email: "employee@test.tld".to_string(),
                })
                .await
                .unwrap();
            assert_eq!(created.key, "K");

            let request = server.await.unwrap();
            assert!(request.body.to_lowercase().contains("content-type: image/jpeg"));
        }
    }

    #[tokio::test]
    async fn test_update_with_selector_patches_bill() {
        let (base_url, server) = serve_once("200 OK", SAVED_BILL).await;

        let saved = store(&base_url)
            .update(UpdateRequest {
                bill: draft(),
                selector: Some("47qAXb6fIm2zOKkLzMro".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(saved.id, "47qAXb6fIm2zOKkLzMro");
        assert_eq!(saved.status, BillStatus::Pending);

        let request = server.await.unwrap();
        assert_eq!(request.method, "PATCH");
        assert_eq!(request.path, "/bills/47qAXb6fIm2zOKkLzMro");
        assert_eq!(request.header("content-type"), Some("application/json"));

        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["amount"], 348);
        assert_eq!(body["pct"], 20);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["type"], "Transports");
        assert_eq!(body["fileName"], "facture.png");
    }

    #[tokio::test]
    async fn test_update_without_selector_posts_json() {
        let (base_url, server) = serve_once("200 OK", SAVED_BILL).await;

        let mut bill = draft();
        bill.file_url = None;
        bill.file_name = None;
        store(&base_url)
            .update(UpdateRequest {
                bill,
                selector: None,
            })
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/bills");
        assert_eq!(request.header("content-type"), Some("application/json"));

        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["email"], "employee@test.tld");
        assert!(body.get("fileUrl").is_none());
    }

    #[tokio::test]
    async fn test_error_body_message_is_used() {
        let (base_url, server) = serve_once("404 Not Found", r#"{"message":"Erreur 404"}"#).await;

        let result = store(&base_url).list().await;
        server.await.unwrap();

        match result {
            Err(StoreError::Http { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Erreur 404");
            }
            other => panic!("HTTPエラーになるはず: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_message_uses_canonical_reason() {
        let (base_url, server) = serve_once("500 Internal Server Error", "").await;

        let result = store(&base_url).list().await;
        server.await.unwrap();

        match result {
            Err(StoreError::Http { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("HTTPエラーになるはず: {other:?}"),
        }
    }
}
