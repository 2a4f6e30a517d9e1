use std::sync::Arc;

use crate::error::AppError;
use crate::store::{GameStore, StoreError};

/// 服务器全局状态，所有 handler 共享
pub struct AppState {
    pub store: Arc<dyn GameStore>,
    pub shuffle_rounds: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn GameStore>, shuffle_rounds: usize) -> SharedState {
        Arc::new(AppState { store, shuffle_rounds })
    }

    /// 在阻塞线程池中执行存储操作，避免阻塞异步运行时
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn GameStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        Ok(tokio::task::spawn_blocking(move || f(store.as_ref())).await??)
    }
}
