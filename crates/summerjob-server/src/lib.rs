pub mod form;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use summerjob_db::Database;
use summerjob_service::LocalService;
use summerjob_store::FileStore;
use tokio::net::TcpListener;

pub use routes::{build_router, AppState, InnerAppState};

pub fn app_state(db: Arc<dyn Database>, store: Arc<dyn FileStore>) -> AppState {
    Arc::new(InnerAppState {
        service: LocalService::new(db, store.clone()),
        store,
    })
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
