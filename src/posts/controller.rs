//! HTTP adapter for the posts service.
//!
//! Every service error is answered with `400` and the error's message; the
//! not-found and duplicate cases are not distinguished from validation
//! failures at the HTTP level. Updates answer `201` like creates.

use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use super::error::{ErrorKind, PostError};
use super::model::{Post, PostId};
use super::service::PostsService;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::router::{MethodRouter, Router};

/// Message sent after a successful delete.
pub const DELETED: &str = "post deleted";

/// Route table for the posts resource.
///
/// | Route | Method | Handler |
/// |---|---|---|
/// | `/posts` | `GET` | [`PostsController::index`] |
/// | `/posts` | `POST` | [`PostsController::create`] |
/// | `/posts/{id}` | `GET` | [`PostsController::find`] |
/// | `/posts/{id}` | `PUT` | [`PostsController::update`] |
/// | `/posts/{id}` | `DELETE` | [`PostsController::delete`] |
pub fn routes(service: Arc<dyn PostsService>) -> Router {
    let controller = Arc::new(PostsController::new(service));
    Router::from_table([
        (
            "/posts",
            MethodRouter::new()
                .get(bind(&controller, PostsController::index))
                .post(bind(&controller, PostsController::create)),
        ),
        (
            "/posts/{id}",
            MethodRouter::new()
                .delete(bind(&controller, PostsController::delete))
                .get(bind(&controller, PostsController::find))
                .put(bind(&controller, PostsController::update)),
        ),
    ])
}

/// Adapts a controller method into a [`Handler`] sharing `controller`.
fn bind<F, Fut>(controller: &Arc<PostsController>, method: F) -> impl Handler + use<F, Fut>
where
    F: Fn(Arc<PostsController>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let controller = Arc::clone(controller);
    move |req: Request| method(Arc::clone(&controller), req)
}

/// Translates requests into [`PostsService`] calls and their results into
/// responses.
pub struct PostsController {
    service: Arc<dyn PostsService>,
}

impl PostsController {
    pub fn new(service: Arc<dyn PostsService>) -> Self {
        Self { service }
    }

    /// `GET /posts`
    pub async fn index(self: Arc<Self>, _req: Request) -> Response {
        match self.service.list().await {
            Ok(posts) => Response::ok(&posts),
            Err(e) => fail(e),
        }
    }

    /// `GET /posts/{id}`
    pub async fn find(self: Arc<Self>, req: Request) -> Response {
        let id = match path_id(&req) {
            Ok(id) => id,
            Err(response) => return response,
        };
        match self.service.find(id).await {
            Ok(post) => Response::ok(&post),
            Err(e) => fail(e),
        }
    }

    /// `PUT /posts/{id}`. The path id wins over any id in the body.
    pub async fn update(self: Arc<Self>, req: Request) -> Response {
        let id = match path_id(&req) {
            Ok(id) => id,
            Err(response) => return response,
        };
        let mut post: Post = match req.json() {
            Ok(post) => post,
            Err(e) => return Response::bad_request(e.to_string()),
        };
        post.id = id;
        match self.service.update(post).await {
            Ok(post) => Response::created(&post),
            Err(e) => fail(e),
        }
    }

    /// `POST /posts`. A body id is kept, so clients may pick ids; collisions
    /// are reported by the service.
    pub async fn create(self: Arc<Self>, req: Request) -> Response {
        let post: Post = match req.json() {
            Ok(post) => post,
            Err(e) => return Response::bad_request(e.to_string()),
        };
        match self.service.create(post).await {
            Ok(post) => Response::created(&post),
            Err(e) => fail(e),
        }
    }

    /// `DELETE /posts/{id}`
    pub async fn delete(self: Arc<Self>, req: Request) -> Response {
        let id = match path_id(&req) {
            Ok(id) => id,
            Err(response) => return response,
        };
        match self.service.delete(id).await {
            Ok(()) => Response::ok_message(DELETED),
            Err(e) => fail(e),
        }
    }
}

fn path_id(req: &Request) -> Result<PostId, Response> {
    req.param("id")
        .unwrap_or_default()
        .parse()
        .map_err(|e: std::num::ParseIntError| Response::bad_request(e.to_string()))
}

fn fail(err: PostError) -> Response {
    if err.kind() == ErrorKind::Storage {
        warn!(error = %err, "posts storage failure");
    }
    Response::bad_request(err.to_string())
}
