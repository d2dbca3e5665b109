use secretconf::EnvConfig;

/// Firebase auth settings handed to the browser and the admin SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq, EnvConfig)]
pub struct FirebaseConfig {
    #[env(name = "FIREBASE_API_KEY", required)]
    pub api_key: String,

    #[env(name = "FIREBASE_AUTH_DOMAIN", required)]
    pub auth_domain: String,

    #[env(name = "FIREBASE_DATABASE_URL", required)]
    pub database_url: String,

    #[env(name = "FIREBASE_PROJECT_ID", required)]
    pub project_id: String,

    #[env(name = "FIREBASE_STORAGE_BUCKET", required)]
    pub storage_bucket: String,

    #[env(name = "FIREBASE_MESSAGE_SENDER_ID", required)]
    pub message_sender_id: String,

    #[env(name = "FIREBASE_APP_ID", required)]
    pub app_id: String,

    #[env(name = "FIREBASE_MEASUREMENT_ID", required)]
    pub measurement_id: String,
}

impl FirebaseConfig {
    /// Drop every `https://` from the database URL; the templates add the
    /// scheme themselves and an escaped one breaks the embedded script.
    pub fn strip_database_url_scheme(&mut self) {
        self.database_url = self.database_url.replace("https://", "");
    }
}

/// The subset of [`FirebaseConfig`] the server-side auth client needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseAppConfig {
    pub database_url: String,
    pub project_id: String,
    pub storage_bucket: String,
}

impl From<&FirebaseConfig> for FirebaseAppConfig {
    fn from(config: &FirebaseConfig) -> Self {
        Self {
            database_url: config.database_url.clone(),
            project_id: config.project_id.clone(),
            storage_bucket: config.storage_bucket.clone(),
        }
    }
}
