use clap::Parser;
use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;
use std::sync::Arc;

use rbac_backend::api::{AuthApi, HealthApi, PermissionApi, ProfileApi, RoleApi, UserApi};
use rbac_backend::authz::Authorizer;
use rbac_backend::cli::{self, Cli, Commands};
use rbac_backend::config::{
    init_database, init_logging, migrate_database, BootstrapSettings, SecretManager,
};
use rbac_backend::services::{AuthService, TokenService};
use rbac_backend::stores::{CredentialStore, PermissionStore, RoleStore, UserStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logging()?;

    let args = Cli::parse();
    let settings = BootstrapSettings::from_env()?;
    let secrets = SecretManager::init()?;

    let db = init_database(&settings).await?;
    migrate_database(&db).await?;

    let credential_store = Arc::new(CredentialStore::new(db.clone(), secrets.pepper().to_string()));
    let user_store = Arc::new(UserStore::new(db.clone()));
    let role_store = Arc::new(RoleStore::new(db.clone()));
    let permission_store = Arc::new(PermissionStore::new(db.clone()));

    let token_service = Arc::new(TokenService::new(
        secrets.jwt_secret().to_string(),
        settings.jwt_expiry_days(),
    ));
    let authorizer = Arc::new(Authorizer::with_builtin_grants());
    let auth_service = Arc::new(AuthService::new(
        user_store.clone(),
        token_service.clone(),
        authorizer,
    ));

    if let Some(Commands::Seed) = args.command {
        cli::seed::seed_database(
            &credential_store,
            &role_store,
            &permission_store,
            &user_store,
        )
        .await?;
        return Ok(());
    }

    let auth_api = AuthApi::new(
        credential_store,
        role_store.clone(),
        token_service,
        auth_service.clone(),
    );
    let user_api = UserApi::new(user_store.clone(), auth_service.clone());
    let role_api = RoleApi::new(role_store, auth_service.clone());
    let permission_api = PermissionApi::new(permission_store, auth_service.clone());
    let profile_api = ProfileApi::new(user_store, auth_service);

    let api_service = OpenApiService::new(
        (
            HealthApi,
            auth_api,
            user_api,
            role_api,
            permission_api,
            profile_api,
        ),
        "RBAC Backend",
        "1.0.0",
    )
    .server(format!("http://{}/api", settings.server_address()));

    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/swagger", ui);

    tracing::info!("Starting server on http://{}", settings.server_address());
    tracing::info!("Swagger UI available at /swagger, API at /api");

    Server::new(TcpListener::bind(settings.server_address()))
        .run(app)
        .await?;

    Ok(())
}
