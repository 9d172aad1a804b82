//! The posts resource: entity, domain errors, service and HTTP controller.

mod controller;
mod error;
mod model;
mod service;

pub use controller::{DELETED, PostsController, routes};
pub use error::{ErrorKind, MAX_TITLE_CHARS, PostError};
pub use model::{Post, PostId};
pub use service::{PostsService, SqlPostsService};
