// ============================================
// src/session.rs
// ログイン状態と表示言語
// ============================================

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::i18n::Locale;
use crate::save_data::data_dir;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// サーバーを介さないローカルのユーザー
    pub fn local(username: &str) -> Self {
        Self {
            id: 0,
            username: username.to_string(),
            email: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// セッション。ログインで作られ、起動時に読み込まれ、ログアウトで消える
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
    #[serde(default)]
    locale: Locale,
}

impl Session {
    pub fn login(&mut self, user: User, token: Option<String>) {
        info!("Logged in as {}", user.username);
        self.user = Some(user);
        self.token = token;
    }

    /// ユーザーとトークンを消す。言語設定は残す
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("Logged out {}", user.username);
        }
        self.token = None;
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn toggle_locale(&mut self) -> Locale {
        self.locale = self.locale.toggle();
        self.locale
    }

    pub fn load() -> Self {
        Self::load_from(&data_dir())
    }

    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join(SESSION_FILE);
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(&path)
            .map_err(AppError::from)
            .and_then(|json| Ok(serde_json::from_str(&json)?))
        {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to read {}: {e}. Starting a new session", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&data_dir())
    }

    pub fn save_to(&self, dir: &Path) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(SESSION_FILE), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_logout_lifecycle() {
        let mut session = Session::default();
        assert!(session.user().is_none());

        session.login(User::local("lan"), Some("abc123".to_string()));
        assert_eq!(session.user().unwrap().username, "lan");
        assert_eq!(session.token(), Some("abc123"));

        session.set_locale(Locale::En);
        session.logout();
        assert!(session.user().is_none());
        assert_eq!(session.token(), None);
        assert_eq!(session.locale(), Locale::En);
    }

    #[test]
    fn persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Session::load_from(dir.path()), Session::default());

        let mut session = Session::default();
        session.login(User::local("minh"), None);
        session.toggle_locale();
        session.save_to(dir.path()).unwrap();

        let loaded = Session::load_from(dir.path());
        assert_eq!(loaded, session);
        assert_eq!(loaded.locale(), Locale::En);
    }

    #[test]
    fn corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "{ not json").unwrap();
        assert_eq!(Session::load_from(dir.path()), Session::default());
    }
}
