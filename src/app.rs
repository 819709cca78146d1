use crate::{
    modules,
    types::{Config, Context, ToContext},
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace;

pub struct App {
    ctx: Arc<Context>,
    router: Router,
}

impl App {
    pub async fn new() -> Self {
        let ctx: Arc<Context> = Arc::new(Config::default().to_context().await);

        let router = Router::new()
            .merge(modules::get_router())
            .with_state(ctx.clone())
            .layer(trace::TraceLayer::new_for_http());

        Self { ctx, router }
    }

    pub async fn serve(self) {
        let listener = TcpListener::bind(format!("{}:{}", self.ctx.app.host, self.ctx.app.port))
            .await
            .unwrap();

        tracing::info!(
            "App is running on {}:{}",
            self.ctx.app.host,
            self.ctx.app.port
        );

        axum::serve(listener, self.router).await.unwrap();
    }
}
