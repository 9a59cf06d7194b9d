use std::sync::Arc;

use tracing::instrument;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, password_matches};

pub const MIN_PASSWORD_LEN: usize = 5;

pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    keys: JwtKeys,
}

impl<R: UserRepository + 'static> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            keys: self.keys.clone(),
        }
    }
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<User, DomainError> {
        let name = name.trim().to_string();
        let email = email.trim().to_lowercase();
        if name.is_empty() {
            return Err(DomainError::Validation("name must not be empty".into()));
        }
        if !email.contains('@') {
            return Err(DomainError::Validation("please enter a valid email".into()));
        }
        if password.trim().chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let hash = hash_password(&password)?;
        self.repo.create_user(User::new(name, email, hash)).await
    }

    /// Returns a bearer token and the id of the user it identifies.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), DomainError> {
        let user = self
            .repo
            .find_user_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !password_matches(password, &user.password_hash) {
            return Err(DomainError::Unauthorized);
        }

        let token = self.keys.issue(user.id)?;
        Ok((token, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    fn service() -> AuthService<MemoryStore> {
        AuthService::new(Arc::new(MemoryStore::new()), JwtKeys::new("secret".into()))
    }

    #[tokio::test]
    async fn clones_share_one_store() {
        let auth = service();
        let worker = auth.clone();
        let user = auth
            .signup("Ada".into(), "ada@example.com".into(), "secret1".into())
            .await
            .unwrap();

        let (token, logged_in) = worker.login("ada@example.com", "secret1").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(auth.keys().authenticate(&token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn signup_then_login_issues_token_for_user() {
        let auth = service();
        let user = auth
            .signup("Ada".into(), "Ada@Example.com".into(), "secret1".into())
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.status, "I am new!!!");

        let (token, logged_in) = auth.login("ada@example.com", "secret1").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(auth.keys().authenticate(&token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let auth = service();
        auth.signup("Ada".into(), "ada@example.com".into(), "secret1".into())
            .await
            .unwrap();
        let err = auth.login("ada@example.com", "secret2").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
        let err = auth.login("bob@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[tokio::test]
    async fn signup_validates_input() {
        let auth = service();
        for (name, email, password) in [
            ("", "a@b.c", "secret1"),
            ("Ada", "not-an-email", "secret1"),
            ("Ada", "a@b.c", "abc"),
        ] {
            let err = auth
                .signup(name.into(), email.into(), password.into())
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }
}
