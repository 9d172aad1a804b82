//! # quill
//!
//! A minimal REST service exposing CRUD operations over posts.
//!
//! ## Layers
//!
//! - [`Router`]: a table of route pattern to per-method handlers. Known
//!   paths with an unregistered method answer `404` with a message naming
//!   both.
//! - [`Response`]: JSON envelope templates (`ok`, `created`,
//!   `bad_request`, ...).
//! - [`posts`]: the post entity, its service trait with a SQL-backed
//!   implementation, and the controller that binds them to HTTP.
//! - [`Server`]: hyper accept loop with graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use quill::{AppContext, Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> quill::Result<()> {
//!     let config = Config::from_env()?;
//!     let app = AppContext::connect(config).await?;
//!     app.migrate().await?;
//!
//!     Server::bind(app.config().server.addr()).serve(app.router()).await
//! }
//! ```
//!
//! ## HTTP surface
//!
//! | Request | Success | Failure |
//! |---|---|---|
//! | `GET /posts` | `200` array | `400` (including an empty table) |
//! | `POST /posts` | `201` post | `400` |
//! | `GET /posts/{id}` | `200` post | `400` |
//! | `PUT /posts/{id}` | `201` post | `400` |
//! | `DELETE /posts/{id}` | `200` `{"message":"post deleted"}` | `400` |

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod posts;

pub use app::AppContext;
pub use config::Config;
pub use error::{Error, Result};
pub use handler::Handler;
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::{MethodRouter, Router};
pub use server::Server;
