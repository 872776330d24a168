use log::{debug, info, warn};

use crate::{Error, KeyValueStore, Result, UserData, UserType};

pub const KEY_USER_TOKEN: &str = "userToken";
pub const KEY_USER_TYPE: &str = "userType";
pub const KEY_USER_DATA: &str = "userData";

/// Stand-in credential; any stored token counts as authenticated.
const PLACEHOLDER_TOKEN: &str = "dummy-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    LoggedOut,
    /// The role is `None` when a token was stored without a usable user type.
    LoggedIn(Option<UserType>),
}

/// The authenticated user's state, backed by a [`KeyValueStore`].
///
/// Starts loading until [`Session::restore`] runs.
pub struct Session<S> {
    store: S,
    loading: bool,
    logged_in: bool,
    user_type: Option<UserType>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S) -> Self {
        Session {
            store,
            loading: true,
            logged_in: false,
            user_type: None,
        }
    }

    /// Builds a session and restores it from the store in one step.
    pub async fn restored(store: S) -> Self {
        let mut session = Self::new(store);
        session.restore().await;
        session
    }

    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if self.logged_in {
            SessionPhase::LoggedIn(self.user_type)
        } else {
            SessionPhase::LoggedOut
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.user_type
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read_persisted(&self) -> Result<(bool, Option<UserType>)> {
        let token = self.store.get(KEY_USER_TOKEN).await?;
        let user_type = match self.store.get(KEY_USER_TYPE).await? {
            Some(raw) => match raw.parse::<UserType>() {
                Ok(user_type) => Some(user_type),
                Err(e) => {
                    warn!("Ignoring stored user type: {}", e);
                    None
                }
            },
            None => None,
        };
        Ok((token.is_some(), user_type))
    }

    /// Reads the persisted token and user type. Always leaves the loading
    /// phase; store failures are logged and yield a logged out session.
    pub async fn restore(&mut self) -> SessionPhase {
        match self.read_persisted().await {
            Ok((logged_in, user_type)) => {
                self.logged_in = logged_in;
                self.user_type = user_type;
            }
            Err(e) => {
                warn!("Could not restore session: {}", e);
                self.logged_in = false;
                self.user_type = None;
            }
        }
        self.loading = false;
        debug!("Restored session: {:?}", self.phase());
        self.phase()
    }

    /// Simulated login: any non-blank credentials are accepted.
    pub async fn login(&mut self, email: &str, password: &str, user_type: UserType) -> Result<()> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(Error::Validation(
                "email and password are required".to_string(),
            ));
        }

        // Written last: a stored token alone means logged in.
        self.store.set(KEY_USER_TYPE, user_type.as_str()).await?;
        self.store
            .set_json(KEY_USER_DATA, &UserData::synthesize(email, user_type))
            .await?;
        self.store.set(KEY_USER_TOKEN, PLACEHOLDER_TOKEN).await?;

        self.logged_in = true;
        self.user_type = Some(user_type);
        self.loading = false;
        info!("Logged in as {} ({})", email, user_type);
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.store
            .multi_remove(&[KEY_USER_TOKEN, KEY_USER_TYPE, KEY_USER_DATA])
            .await?;
        self.logged_in = false;
        self.user_type = None;
        self.loading = false;
        info!("Logged out");
        Ok(())
    }

    pub async fn user_data(&self) -> Result<Option<UserData>> {
        Ok(self.store.get_json(KEY_USER_DATA).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StoreError};

    /// Wraps a [`MemoryStore`] and refuses writes to one key.
    #[derive(Clone)]
    struct ReadOnlyKeyStore {
        inner: MemoryStore,
        read_only: &'static str,
    }

    impl KeyValueStore for ReadOnlyKeyStore {
        async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
            if key == self.read_only {
                return Err(StoreError::write(key, std::io::Error::other("read-only")));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
            self.inner.remove(key).await
        }

        async fn keys_with_prefix(
            &self,
            prefix: &str,
        ) -> std::result::Result<Vec<String>, StoreError> {
            self.inner.keys_with_prefix(prefix).await
        }
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let session = Session::new(MemoryStore::new());
        assert!(session.is_loading());
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_login_then_restore() {
        let store = MemoryStore::new();
        let mut session = Session::restored(store.clone()).await;
        assert_eq!(session.phase(), SessionPhase::LoggedOut);

        session
            .login("a@b.com", "x", UserType::Industry)
            .await
            .unwrap();

        let restored = Session::restored(store).await;
        assert!(restored.is_logged_in());
        assert_eq!(restored.user_type(), Some(UserType::Industry));

        let profile = restored.user_data().await.unwrap().unwrap();
        assert_eq!(profile.email, "a@b.com");
        assert_eq!(profile.name, "Gestor Agroindústria");
    }

    #[tokio::test]
    async fn test_logout_then_restore() {
        let store = MemoryStore::new();
        let mut session = Session::restored(store.clone()).await;
        session.login("c@d.gov", "pw", UserType::Public).await.unwrap();
        session.logout().await.unwrap();
        assert!(!session.is_logged_in());

        let restored = Session::restored(store.clone()).await;
        assert!(!restored.is_logged_in());
        assert_eq!(restored.user_type(), None);
        assert_eq!(store.get(KEY_USER_DATA).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blank_credentials_are_rejected() {
        let store = MemoryStore::new();
        let mut session = Session::restored(store.clone()).await;

        let result = session.login("  ", "x", UserType::Public).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.get(KEY_USER_TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_login_stores_no_token() {
        for read_only in [KEY_USER_TYPE, KEY_USER_DATA] {
            let store = ReadOnlyKeyStore {
                inner: MemoryStore::new(),
                read_only,
            };
            let mut session = Session::restored(store.clone()).await;

            let result = session.login("a@b.com", "x", UserType::Industry).await;
            assert!(matches!(result, Err(Error::Store(StoreError::Write { .. }))));
            assert!(!session.is_logged_in());
            assert_eq!(store.get(KEY_USER_TOKEN).await.unwrap(), None);

            let restored = Session::restored(store).await;
            assert_eq!(restored.phase(), SessionPhase::LoggedOut);
        }
    }

    #[tokio::test]
    async fn test_token_content_is_not_validated() {
        let store = MemoryStore::new();
        store.set(KEY_USER_TOKEN, "anything").await.unwrap();
        store.set(KEY_USER_TYPE, "public").await.unwrap();

        let session = Session::restored(store).await;
        assert_eq!(session.phase(), SessionPhase::LoggedIn(Some(UserType::Public)));
    }

    #[tokio::test]
    async fn test_unknown_user_type_keeps_token_login() {
        let store = MemoryStore::new();
        store.set(KEY_USER_TOKEN, "dummy-token").await.unwrap();
        store.set(KEY_USER_TYPE, "admin").await.unwrap();

        let session = Session::restored(store).await;
        assert!(session.is_logged_in());
        assert_eq!(session.phase(), SessionPhase::LoggedIn(None));
    }
}
