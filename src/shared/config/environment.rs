use crate::shared::errors::{AppError, AppResult};

/// 請求書APIのデフォルト接続先
pub const DEFAULT_API_URL: &str = "http://localhost:5678";

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            debug_mode,
            log_level,
        }
    }

    /// プロダクション環境かどうかを判定
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 設定されたログレベルを`log::LevelFilter`に変換する
    ///
    /// 不明な値は`Info`として扱う
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境に応じた.envファイルを読み込む
pub fn load_environment_variables() {
    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match environment.as_str() {
        "production" => ".env.production",
        _ => ".env",
    };

    log::info!("環境: {environment}, 読み込み対象: {env_file}");

    match dotenv::from_filename(env_file) {
        Ok(_) => {
            log::info!("{env_file}ファイルを読み込みました");
        }
        Err(_) => {
            // 環境固有のファイルがない場合は、デフォルトの.envを試行
            if env_file != ".env" && dotenv::dotenv().is_ok() {
                log::warn!("{env_file}が見つからないため、デフォルトの.envファイルを読み込みました");
            } else {
                log::warn!("環境変数ファイルが見つかりません。直接設定された環境変数を使用します。");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// 二重初期化はエラーにせず無視する（テストから複数回呼ばれるため）
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let initialized = env_logger::Builder::from_default_env()
        .filter_level(env_config.level_filter())
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .is_ok();

    if initialized {
        log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            env_config.log_level,
            env_config.environment
        );
    }
}

/// APIの接続先を決定する
///
/// # 引数
/// * `env_config` - 実行環境の設定
/// * `configured` - 埋め込み値または環境変数で指定されたURL
///
/// # 戻り値
/// 使用するURL。プロダクション環境で未指定の場合は設定エラー
/// （開発環境ではデフォルトの接続先を使用する）
pub fn resolve_api_url(
    env_config: &EnvironmentConfig,
    configured: Option<String>,
) -> AppResult<String> {
    match configured.filter(|url| !url.trim().is_empty()) {
        Some(url) => Ok(url),
        None if env_config.is_production() => Err(AppError::configuration(
            "プロダクション環境ではAPI_URLの設定が必須です",
        )),
        None => {
            log::debug!("API_URLが設定されていないため、デフォルト値を使用");
            Ok(DEFAULT_API_URL.to_string())
        }
    }
}

/// 請求書ストア（HTTP API）の接続設定
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// APIのベースURL
    pub api_url: url::Url,
    /// 認証トークン（未ログイン時はNone）
    pub jwt: Option<String>,
}

impl StoreConfig {
    /// 環境変数から設定を読み込む
    ///
    /// コンパイル時埋め込み値を優先し、見つからない場合は実行時環境変数を使用する
    pub fn from_env() -> AppResult<Self> {
        let configured = option_env!("EMBEDDED_API_URL")
            .map(|s| {
                log::debug!("コンパイル時埋め込みAPI_URLを使用: {s}");
                s.to_string()
            })
            .or_else(|| std::env::var("API_URL").ok());

        let api_url = resolve_api_url(&EnvironmentConfig::from_env(), configured)?;
        let jwt = std::env::var("API_JWT").ok().filter(|t| !t.is_empty());

        Self::from_values(&api_url, jwt)
    }

    /// 値から設定を構築し、URLを検証する
    pub fn from_values(api_url: &str, jwt: Option<String>) -> AppResult<Self> {
        let api_url = url::Url::parse(api_url)
            .map_err(|e| AppError::configuration(format!("API_URLが不正です ({api_url}): {e}")))?;

        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(AppError::configuration(format!(
                "API_URLはhttpまたはhttpsである必要があります: {api_url}"
            )));
        }

        Ok(Self { api_url, jwt })
    }
}
