use std::env;

fn main() {
    // 環境変数をコンパイル時に埋め込み
    // ENVIRONMENT環境変数に基づいて適切な.envファイルを読み込み
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match environment.as_str() {
        "production" => ".env.production",
        _ => ".env",
    };

    println!("cargo:rerun-if-env-changed=ENVIRONMENT");
    println!("cargo:rerun-if-changed={env_file}");

    // 環境変数ファイルを読み込み
    if dotenv::from_filename(env_file).is_ok() {
        println!("cargo:warning={env_file}ファイルを読み込みました");

        // 請求書APIの接続先をコンパイル時定数として埋め込み
        if let Ok(api_url) = env::var("API_URL") {
            println!("cargo:rustc-env=EMBEDDED_API_URL={api_url}");
        }

        // 注意: API_JWTは埋め込まない
        // トークンはセッションごとに実行時に渡す
    }
}
