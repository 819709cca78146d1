pub use crate::utils::database;
use async_trait::async_trait;
use std::env;

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub port: u32,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub db_conn: database::DatabaseConnection,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u32,
}

#[derive(Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5050".to_string())
            .parse::<u32>()
            .expect("Invalid PORT number");

        Self {
            database: DatabaseConfig { url: database_url },
            app: AppConfig { host, port },
        }
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Context;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Context {
        let db_conn = database::connect(self.database.url.as_str()).await;
        database::migrate(&db_conn).await;

        Context {
            app: AppContext {
                host: self.app.host,
                port: self.app.port,
            },
            db_conn,
        }
    }
}
