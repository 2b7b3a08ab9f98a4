use chrono::{DateTime, Utc};

use crate::result::{Error, Result};

/// Signed-in user state. Built once by the application and shared as `Arc<Session>`
/// with whatever needs it (journal, sync worker).
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub access_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: None,
            expires_at: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (None, _) => false,
            (Some(_), Some(expires_at)) => now < expires_at,
            (Some(_), None) => true,
        }
    }

    pub fn authorization(&self, now: DateTime<Utc>) -> Result<String> {
        if !self.is_authenticated(now) {
            return Err(Error::Unauthenticated);
        }

        match &self.access_token {
            Some(token) => Ok(format!("Bearer {}", token)),
            None => Err(Error::Unauthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn anonymous_session_cannot_authorize() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated(Utc::now()));
        assert!(matches!(
            session.authorization(Utc::now()),
            Err(Error::Unauthenticated)
        ));
    }

    #[test]
    fn token_without_expiry_is_valid() {
        let session = Session::new("user-1").with_access_token("abc");
        assert_eq!(session.authorization(Utc::now()).unwrap(), "Bearer abc");
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let session = Session::new("user-1")
            .with_access_token("abc")
            .with_expiry(now - Duration::minutes(1));
        assert!(!session.is_authenticated(now));

        let fresh = session.clone().with_expiry(now + Duration::minutes(5));
        assert!(fresh.is_authenticated(now));
    }
}
