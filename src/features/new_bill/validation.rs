// 証憑ファイルの形式検証

use std::path::Path;

use crate::shared::errors::{AppError, AppResult};

/// 受け付ける証憑ファイルの拡張子（小文字）
pub const ALLOWED_PROOF_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// 不正な形式のファイルが選択されたときの警告文
pub const INVALID_PROOF_MESSAGE: &str =
    "Veuillez sélectionner un fichier au format JPG, JPEG ou PNG.";

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// ファイル形式を検証
///
/// 拡張子のみで判定し、Content-Typeは参照しない
pub fn validate_proof_file(file_name: &str) -> AppResult<()> {
    let extension = extension_of(file_name)
        .ok_or_else(|| AppError::validation(INVALID_PROOF_MESSAGE))?;

    if !ALLOWED_PROOF_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::validation(INVALID_PROOF_MESSAGE));
    }

    Ok(())
}

/// Content-Typeを推定
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).unwrap_or_default().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}
