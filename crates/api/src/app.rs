use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use domain::models::board::Board;
use domain::models::settings::DisplaySettings;
use persistence::{BlobStorage, DocumentStore};
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    auth, boards, campaigns, candidates, dashboard, events, expenses, health, mission, notices,
    payments, recommendations, settings,
};
use crate::services::boards::BoardService;
use crate::services::campaigns::CampaignService;
use crate::services::candidates::CandidateService;
use crate::services::events::EventService;
use crate::services::expenses::ExpenseService;
use crate::services::identity::IdentityProvider;
use crate::services::mission::MissionService;
use crate::services::notices::NoticeService;
use crate::services::payments::PaymentService;
use crate::services::recommendation::Recommender;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub jwt: Arc<JwtConfig>,
    pub identity: Arc<dyn IdentityProvider>,
    pub recommender: Recommender,
    pub settings: Arc<RwLock<DisplaySettings>>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub campaigns: CampaignService,
    pub payments: PaymentService,
    pub expenses: ExpenseService,
    pub notices: NoticeService,
    pub events: EventService,
    pub advisory_board: BoardService,
    pub executive_committee: BoardService,
    pub candidates: CandidateService,
    pub mission: MissionService,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        blobs: BlobStorage,
        identity: Arc<dyn IdentityProvider>,
        recommender: Recommender,
    ) -> Result<Self, JwtError> {
        let jwt = Arc::new(config.jwt.build()?);
        let settings = Arc::new(RwLock::new(DisplaySettings::new(config.app.display_name.clone())));
        let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            campaigns: CampaignService::new(store.clone(), blobs.clone()),
            payments: PaymentService::new(store.clone(), blobs.clone()),
            expenses: ExpenseService::new(store.clone(), blobs.clone()),
            notices: NoticeService::new(store.clone(), blobs.clone()),
            events: EventService::new(store.clone(), blobs.clone()),
            advisory_board: BoardService::new(Board::Advisory, store.clone(), blobs.clone()),
            executive_committee: BoardService::new(Board::Executive, store.clone(), blobs.clone()),
            candidates: CandidateService::new(store.clone(), blobs),
            mission: MissionService::new(store.clone()),
            config: Arc::new(config),
            store,
            jwt,
            identity,
            recommender,
            settings,
            rate_limiter,
        })
    }

    pub fn board(&self, board: Board) -> &BoardService {
        match board {
            Board::Advisory => &self.advisory_board,
            Board::Executive => &self.executive_committee,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Readable by anyone
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/campaigns", get(campaigns::list_campaigns))
        .route("/api/v1/campaigns/:id", get(campaigns::get_campaign))
        .route("/api/v1/notices", get(notices::list_notices))
        .route("/api/v1/notices/popup", get(notices::get_popup_notice))
        .route("/api/v1/notices/:id", get(notices::get_notice))
        .route("/api/v1/events", get(events::list_events))
        .route("/api/v1/events/:id", get(events::get_event))
        .route("/api/v1/boards/:board/members", get(boards::list_members))
        .route("/api/v1/boards/:board/members/:id", get(boards::get_member))
        .route("/api/v1/candidates", get(candidates::list_candidates))
        .route("/api/v1/candidates/:id", get(candidates::get_candidate))
        .route("/api/v1/candidates/:id/voters", get(candidates::list_voters))
        .route("/api/v1/mission", get(mission::get_mission))
        .route("/api/v1/settings", get(settings::get_settings))
        .route("/api/v1/recommendations", post(recommendations::recommend))
        .route("/api/v1/auth/me", get(auth::me));

    // Signup and login, limited per client
    let auth_routes = Router::new()
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let admin_routes = Router::new()
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/campaigns", post(campaigns::create_campaign))
        .route(
            "/api/v1/campaigns/:id",
            patch(campaigns::update_campaign).delete(campaigns::delete_campaign),
        )
        .route(
            "/api/v1/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/api/v1/payments/:id",
            get(payments::get_payment)
                .patch(payments::update_payment)
                .delete(payments::delete_payment),
        )
        .route(
            "/api/v1/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/api/v1/expenses/:id",
            get(expenses::get_expense)
                .patch(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .route("/api/v1/notices", post(notices::create_notice))
        .route(
            "/api/v1/notices/:id",
            patch(notices::update_notice).delete(notices::delete_notice),
        )
        .route("/api/v1/events", post(events::create_event))
        .route(
            "/api/v1/events/:id",
            patch(events::update_event).delete(events::delete_event),
        )
        .route("/api/v1/boards/:board/members", post(boards::create_member))
        .route(
            "/api/v1/boards/:board/members/:id",
            patch(boards::update_member).delete(boards::delete_member),
        )
        .route("/api/v1/candidates", post(candidates::create_candidate))
        .route(
            "/api/v1/candidates/:id",
            patch(candidates::update_candidate).delete(candidates::delete_candidate),
        )
        .route("/api/v1/mission", put(mission::set_mission))
        .route("/api/v1/settings", patch(settings::update_settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
