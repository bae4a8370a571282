//! Service assembly: stores in, router out.
//!
//! `main` picks the store implementations; everything downstream of
//! [`Stores`] is identical for PostgreSQL and in-memory deployments, which
//! is what the integration tests rely on.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::http::{messaging_router, MessagingAppState};
use crate::adapters::memory::{
    InMemoryBookingStore, InMemoryConversationStore, InMemoryMessageStore,
    InMemoryNotificationStore,
};
use crate::adapters::postgres::{
    PostgresAccountReader, PostgresBookingRelationshipReader, PostgresChatSessionRepository,
    PostgresMessageRepository, PostgresNotificationRepository,
};
use crate::adapters::websocket::{websocket_router, InMemoryConnectionRegistry, WebSocketState};
use crate::application::handlers::messaging::{
    ConnectionHandler, GetHistoryHandler, GetUnreadCountHandler, IdentityResolver,
    JoinConversationHandler, ListConversationsHandler, NotificationFanout,
    RelationshipAuthorizer, SendMessageHandler, TypingSignaler,
};
use crate::config::{MessagingConfig, ServerConfig};
use crate::domain::foundation::MonotonicClock;
use crate::ports::{
    AccountReader, BookingRelationshipReader, ConnectionRegistry, ConversationRepository,
    MessageRepository, NotificationRepository, SessionValidator,
};

/// Every external dependency of the messaging core.
#[derive(Clone)]
pub struct Stores {
    pub sessions: Arc<dyn SessionValidator>,
    pub accounts: Arc<dyn AccountReader>,
    pub bookings: Arc<dyn BookingRelationshipReader>,
    pub messages: Arc<dyn MessageRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool, sessions: Arc<dyn SessionValidator>) -> Self {
        Self {
            sessions,
            accounts: Arc::new(PostgresAccountReader::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRelationshipReader::new(pool.clone())),
            messages: Arc::new(PostgresMessageRepository::new(pool.clone())),
            conversations: Arc::new(PostgresChatSessionRepository::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepository::new(pool)),
        }
    }

    /// In-memory stores. Accounts still come from the caller.
    pub fn in_memory(
        sessions: Arc<dyn SessionValidator>,
        accounts: Arc<dyn AccountReader>,
        bookings: InMemoryBookingStore,
    ) -> Self {
        Self {
            sessions,
            accounts,
            bookings: Arc::new(bookings),
            messages: Arc::new(InMemoryMessageStore::new()),
            conversations: Arc::new(InMemoryConversationStore::new()),
            notifications: Arc::new(InMemoryNotificationStore::new()),
        }
    }
}

/// Wired application: the router plus the registry it shares.
pub struct ChatService {
    pub router: Router,
    pub registry: Arc<InMemoryConnectionRegistry>,
}

/// Builds every handler over `stores` and mounts `/ws`, `/api/*` and `/health`.
pub fn build_service(stores: Stores, messaging: &MessagingConfig) -> ChatService {
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let registry_port: Arc<dyn ConnectionRegistry> = registry.clone();

    let resolver = Arc::new(IdentityResolver::new(
        stores.sessions.clone(),
        stores.accounts.clone(),
    ));
    let authorizer = Arc::new(RelationshipAuthorizer::new(stores.bookings.clone()));
    let fanout = Arc::new(NotificationFanout::new(
        stores.notifications.clone(),
        stores.messages.clone(),
        registry_port.clone(),
    ));

    let ws_state = WebSocketState {
        connections: Arc::new(ConnectionHandler::new(resolver.clone(), registry_port.clone())),
        registry: registry_port.clone(),
        join: Arc::new(JoinConversationHandler::new(
            authorizer.clone(),
            registry_port.clone(),
            stores.messages.clone(),
        )),
        send: Arc::new(
            SendMessageHandler::new(
                authorizer.clone(),
                stores.messages.clone(),
                stores.conversations.clone(),
                registry_port.clone(),
                fanout,
                Arc::new(MonotonicClock::new()),
            )
            .with_limits(messaging.message_limits()),
        ),
        typing: Arc::new(TypingSignaler::new(registry_port)),
    };

    let http_state = MessagingAppState {
        resolver,
        history: Arc::new(GetHistoryHandler::new(
            authorizer,
            stores.messages.clone(),
            messaging.history_page_size,
            messaging.max_history_page_size,
        )),
        conversations: Arc::new(ListConversationsHandler::new(
            stores.conversations.clone(),
            stores.messages.clone(),
        )),
        unread: Arc::new(GetUnreadCountHandler::new(stores.messages)),
    };

    let router = messaging_router(http_state)
        .merge(websocket_router().with_state(ws_state))
        .layer(TraceLayer::new_for_http());

    ChatService { router, registry }
}

/// CORS for the configured origins.
///
/// Without origins, development allows any origin and other environments
/// allow none.
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([axum::http::Method::GET])
            .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE]);
    }

    match server.environment {
        crate::config::Environment::Development => CorsLayer::permissive(),
        _ => CorsLayer::new(),
    }
}
