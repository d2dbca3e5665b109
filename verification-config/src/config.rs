use std::fmt;

use chrono::TimeDelta;
use secretconf::validate::check_durations;
use secretconf::{
    BootstrapError, EnvConfig, Finalize, Lookuper, OsLookuper, SecretStoreRegistry,
    ValidationError,
};
use tracing::info;

use crate::csrf::{decode_key, CsrfKeyError, CSRF_KEY_LEN};
use crate::firebase::{FirebaseAppConfig, FirebaseConfig};
use crate::legacy::LegacyKeyLookuper;

/// Environment configuration of the verification server.
///
/// Any value may be a `secret://` reference; see [`secretconf::Bootstrap`].
#[derive(Clone, Default, EnvConfig)]
pub struct Config {
    #[env(nested)]
    pub firebase: FirebaseConfig,

    #[env(default = 8080)]
    pub port: u16,

    // Login
    #[env(name = "SESSION_DURATION", default = "24h")]
    pub session_cookie_duration: TimeDelta,

    #[env(name = "REVOKE_CHECK_DURATION", default = "5m")]
    pub revoke_check_period: TimeDelta,

    /// Base64 of a 32 byte key; read it with [`Config::csrf_key`].
    #[env(required)]
    pub csrf_auth_key: String,

    // Application
    #[env(default = "Diagnosis Verification Server")]
    pub server_name: String,

    #[env(default = "1h")]
    pub code_duration: TimeDelta,

    #[env(default = 8)]
    pub code_digits: u32,

    #[env(default = 6)]
    pub collision_retry_count: u32,

    /// 336h is 14 days.
    #[env(name = "ALLOWED_PAST_TEST_DAYS", default = "336h")]
    pub allowed_test_age: TimeDelta,

    #[env(default = "5m")]
    pub api_key_cache_duration: TimeDelta,

    #[env(default = 60)]
    pub rate_limit: u64,

    // Verification tokens
    #[env(default = "24h")]
    pub verification_token_duration: TimeDelta,

    #[env(required)]
    pub token_signing_key: String,

    #[env(default = "v1")]
    pub token_signing_key_id: String,

    #[env(default = "diagnosis-verification-example")]
    pub token_issuer: String,

    // Verification certificates
    #[env(default = "15m")]
    pub public_key_cache_duration: TimeDelta,

    #[env(required)]
    pub certificate_signing_key: String,

    #[env(default = "v1")]
    pub certificate_signing_key_id: String,

    #[env(default = "diagnosis-verification-example")]
    pub certificate_issuer: String,

    #[env(default = "exposure-notifications-server")]
    pub certificate_audience: String,

    #[env(default = "15m")]
    pub certificate_duration: TimeDelta,

    // Cleanup
    #[env(default = "15m")]
    pub cleanup_period: TimeDelta,

    #[env(default = "336h")]
    pub disabled_user_max_age: TimeDelta,

    #[env(default = "24h")]
    pub verification_code_max_age: TimeDelta,

    #[env(default = "24h")]
    pub verification_token_max_age: TimeDelta,

    #[env(default = "./cmd/server/assets")]
    pub assets_path: String,

    /// Cookies, including the CSRF cookie, may travel over plain HTTP.
    pub dev_mode: bool,
}

impl Config {
    /// Load from the process environment with the default secret backends.
    pub fn new() -> Result<Self, BootstrapError> {
        Self::new_with(&OsLookuper, SecretStoreRegistry::default())
    }

    /// Load from `lookuper`, resolving secrets through a backend from `registry`.
    ///
    /// The misspelled `COLISSION_RETRY_COUNT`, `ALLOWRD_PAST_TEST_DAYS` and
    /// `DIABLED_USER_MAX_AGE` are still read when the correct key is unset.
    pub fn new_with(
        lookuper: &dyn Lookuper,
        registry: SecretStoreRegistry,
    ) -> Result<Self, BootstrapError> {
        let lookuper = LegacyKeyLookuper::new(lookuper);
        let config: Self = secretconf::load_with(&lookuper, registry)?;
        info!(
            server_name = %config.server_name,
            port = config.port,
            dev_mode = config.dev_mode,
            "loaded verification server configuration"
        );
        Ok(config)
    }

    /// The decoded CSRF key.
    pub fn csrf_key(&self) -> Result<[u8; CSRF_KEY_LEN], CsrfKeyError> {
        decode_key(&self.csrf_auth_key)
    }

    pub fn firebase_app_config(&self) -> FirebaseAppConfig {
        FirebaseAppConfig::from(&self.firebase)
    }

    /// Every duration setting paired with its environment key.
    fn durations(&self) -> [(&'static str, TimeDelta); 12] {
        [
            ("SESSION_DURATION", self.session_cookie_duration),
            ("REVOKE_CHECK_DURATION", self.revoke_check_period),
            ("CODE_DURATION", self.code_duration),
            ("ALLOWED_PAST_TEST_DAYS", self.allowed_test_age),
            ("API_KEY_CACHE_DURATION", self.api_key_cache_duration),
            ("VERIFICATION_TOKEN_DURATION", self.verification_token_duration),
            ("PUBLIC_KEY_CACHE_DURATION", self.public_key_cache_duration),
            ("CERTIFICATE_DURATION", self.certificate_duration),
            ("CLEANUP_PERIOD", self.cleanup_period),
            ("DISABLED_USER_MAX_AGE", self.disabled_user_max_age),
            ("VERIFICATION_CODE_MAX_AGE", self.verification_code_max_age),
            ("VERIFICATION_TOKEN_MAX_AGE", self.verification_token_max_age),
        ]
    }
}

impl Finalize for Config {
    fn postprocess(&mut self) {
        self.firebase.strip_database_url_scheme();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_durations(self.durations())?;
        self.csrf_key()
            .map_err(|e| ValidationError::invalid("CSRF_AUTH_KEY", e))?;
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "[REDACTED]";
        f.debug_struct("Config")
            .field("firebase", &self.firebase)
            .field("port", &self.port)
            .field("session_cookie_duration", &self.session_cookie_duration)
            .field("revoke_check_period", &self.revoke_check_period)
            .field("csrf_auth_key", &REDACTED)
            .field("server_name", &self.server_name)
            .field("code_duration", &self.code_duration)
            .field("code_digits", &self.code_digits)
            .field("collision_retry_count", &self.collision_retry_count)
            .field("allowed_test_age", &self.allowed_test_age)
            .field("api_key_cache_duration", &self.api_key_cache_duration)
            .field("rate_limit", &self.rate_limit)
            .field("verification_token_duration", &self.verification_token_duration)
            .field("token_signing_key", &REDACTED)
            .field("token_signing_key_id", &self.token_signing_key_id)
            .field("token_issuer", &self.token_issuer)
            .field("public_key_cache_duration", &self.public_key_cache_duration)
            .field("certificate_signing_key", &REDACTED)
            .field("certificate_signing_key_id", &self.certificate_signing_key_id)
            .field("certificate_issuer", &self.certificate_issuer)
            .field("certificate_audience", &self.certificate_audience)
            .field("certificate_duration", &self.certificate_duration)
            .field("cleanup_period", &self.cleanup_period)
            .field("disabled_user_max_age", &self.disabled_user_max_age)
            .field("verification_code_max_age", &self.verification_code_max_age)
            .field("verification_token_max_age", &self.verification_token_max_age)
            .field("assets_path", &self.assets_path)
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}
