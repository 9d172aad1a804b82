//! Application context.
//!
//! Everything a running service shares (configuration, storage handles, the
//! posts service) is built once here and handed to the router. Nothing is
//! cached in globals.

use std::sync::Arc;

use crate::config::Config;
use crate::db::{self, DbPool};
use crate::error::Result;
use crate::posts::{self, PostsService, SqlPostsService};
use crate::router::Router;

pub struct AppContext {
    config: Config,
    writer: DbPool,
    posts: Arc<dyn PostsService>,
}

impl AppContext {
    /// Opens both storage handles named by `config` and builds the services.
    pub async fn connect(config: Config) -> Result<Self> {
        let reader = db::connect(&config.database.reader).await?;
        let writer = db::connect(&config.database.writer).await?;
        Self::new(config, reader, writer)
    }

    /// Builds the services over already opened handles.
    pub fn new(config: Config, reader: DbPool, writer: DbPool) -> Result<Self> {
        let service = SqlPostsService::new(Some(reader), Some(writer.clone()))?;
        Ok(Self { config, writer, posts: Arc::new(service) })
    }

    /// Applies pending schema migrations through the write handle.
    pub async fn migrate(&self) -> Result<()> {
        db::migrate(&self.writer).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn posts(&self) -> Arc<dyn PostsService> {
        Arc::clone(&self.posts)
    }

    /// The full route table of the application.
    pub fn router(&self) -> Router {
        posts::routes(self.posts())
    }
}
