//! Wires the auth stack from settings.

use std::sync::Arc;

use apiprobe_application::ports::{Clock, HttpTransport, RecordStore, TransportError};
use apiprobe_application::{
    AuthGateway, ExecuteRequest, LoginRetryPolicy, RequestInterceptor, RetryOnAuthFailure,
    TokenStore,
};
use apiprobe_domain::ProviderRegistry;

use crate::adapters::{ReqwestTransport, SystemClock};
use crate::config::Settings;
use crate::persistence::{FileRecordStore, TokioFileSystem};

/// The assembled token lifecycle and request pipeline.
pub struct AuthStack {
    /// Shared token cache
    pub token_store: Arc<TokenStore>,
    /// Login and refresh
    pub gateway: Arc<AuthGateway>,
    /// Authenticated request execution
    pub client: ExecuteRequest,
    /// Provider table
    pub providers: Arc<ProviderRegistry>,
    /// Backoff for explicit logins
    pub retry_policy: LoginRetryPolicy,
}

impl AuthStack {
    /// Builds the production stack: reqwest transport, file-backed durable
    /// tokens under `settings.token_storage_dir`, system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn build(settings: &Settings) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        let records = Arc::new(FileRecordStore::new(
            TokioFileSystem::new(),
            settings.token_storage_dir.clone(),
        ));
        Ok(Self::with_ports(
            settings,
            transport,
            records,
            Arc::new(SystemClock::new()),
        ))
    }

    /// Builds the stack over the given ports.
    #[must_use]
    pub fn with_ports(
        settings: &Settings,
        transport: Arc<dyn HttpTransport>,
        records: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let providers = Arc::new(settings.provider_registry());
        let token_store = Arc::new(TokenStore::with_durable(
            records,
            providers.durable_keys(),
            clock,
        ));
        let gateway = Arc::new(AuthGateway::new(
            Arc::clone(&token_store),
            Arc::new(settings.credential_provider()),
            Arc::clone(&transport),
            Arc::clone(&providers),
            settings.gateway_settings(),
        ));
        let client = ExecuteRequest::new(
            transport,
            Arc::new(RequestInterceptor::new(
                Arc::clone(&gateway),
                Arc::clone(&providers),
            )),
            Arc::new(RetryOnAuthFailure::new(
                Arc::clone(&gateway),
                Arc::clone(&providers),
            )),
        );

        tracing::debug!(
            providers = providers.iter().count(),
            storage = %settings.token_storage_dir.display(),
            "auth stack ready"
        );
        Self {
            token_store,
            gateway,
            client,
            providers,
            retry_policy: settings.login_retry_policy(),
        }
    }
}
