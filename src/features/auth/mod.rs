/// 認証機能のモジュール
///
/// ログイン処理そのものは外部にあり、ここではログイン中のユーザー情報の読み取りのみを扱う
pub mod session;

pub use session::{Session, SessionStorage, UserType, USER_STORAGE_KEY};
