use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::app_conf::AppConfig;
use crate::config::jwt_conf::JwtConfig;
use crate::config::mongo_conf::MongoConfig;
use crate::handler::request_handler::RequestHandlerState;
use crate::middlewares::staff_middleware::StaffAuthState;
use crate::repository::milestone_repo::{MilestoneRepository, MongoMilestoneRepository};
use crate::repository::package_repo::{MongoServicePackageRepository, ServicePackageRepository};
use crate::repository::project_repo::{MongoProjectRepository, ProjectRepository};
use crate::repository::request_repo::{MongoProjectRequestRepository, ProjectRequestRepository};
use crate::repository::template_repo::{MongoTemplateRepository, TemplateRepository};
use crate::router::catalog_router::catalog_router;
use crate::router::project_router::project_router;
use crate::router::request_router::request_router;
use crate::service::catalog_service::CatalogServiceImpl;
use crate::service::conversion_service::ConversionServiceImpl;
use crate::service::pricing_service::PricingResolver;
use crate::service::project_service::ProjectServiceImpl;
use crate::service::request_service::RequestServiceImpl;
use crate::util::jwt::JwtTokenUtilsImpl;

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env().expect("App config error");
        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        mongo_config.validate().expect("Invalid Mongo config");

        let request_repo: Arc<dyn ProjectRequestRepository> = Arc::new(
            MongoProjectRequestRepository::new(&mongo_config)
                .await
                .expect("Request repo error"),
        );
        let project_repo: Arc<dyn ProjectRepository> = Arc::new(
            MongoProjectRepository::new(&mongo_config)
                .await
                .expect("Project repo error"),
        );
        let milestone_repo: Arc<dyn MilestoneRepository> = Arc::new(
            MongoMilestoneRepository::new(&mongo_config)
                .await
                .expect("Milestone repo error"),
        );
        let template_repo: Arc<dyn TemplateRepository> = Arc::new(
            MongoTemplateRepository::new(&mongo_config)
                .await
                .expect("Template repo error"),
        );
        let package_repo: Arc<dyn ServicePackageRepository> = Arc::new(
            MongoServicePackageRepository::new(&mongo_config)
                .await
                .expect("Service package repo error"),
        );

        let pricing = PricingResolver::new(template_repo.clone(), package_repo.clone());
        let request_service = Arc::new(RequestServiceImpl::new(request_repo.clone(), pricing));
        let conversion_service = Arc::new(ConversionServiceImpl::new(
            request_repo,
            project_repo.clone(),
            milestone_repo.clone(),
        ));
        let project_service = Arc::new(ProjectServiceImpl::new(project_repo, milestone_repo));
        let catalog_service = Arc::new(CatalogServiceImpl::new(template_repo, package_repo));

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let staff_auth_state = Arc::new(StaffAuthState { jwt_utils });

        let request_state = Arc::new(RequestHandlerState {
            request_service,
            conversion_service,
        });

        let router = Router::new()
            .merge(request_router(request_state, staff_auth_state.clone()))
            .merge(project_router(project_service, staff_auth_state.clone()))
            .merge(catalog_router(catalog_service, staff_auth_state))
            .route("/health", get(|| async { "OK" }));

        App { config, router }
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router).await.expect("Failed to start server");
    }
}
