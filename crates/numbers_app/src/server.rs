//! HTTP surface: `GET /numbers?u=<url>&u=<url>...`.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use engine_logging::{engine_error, engine_info};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use numbers_engine::Merger;
use tokio::time::Instant;

pub const NUMBERS_PATH: &str = "/numbers";
pub const URL_PARAM: &str = "u";

/// Request handler; the response deadline starts when a request arrives.
#[derive(Clone)]
pub struct NumbersService {
    merger: Arc<dyn Merger>,
    response_timeout: Duration,
}

impl NumbersService {
    pub fn new(merger: Arc<dyn Merger>, response_timeout: Duration) -> Self {
        Self {
            merger,
            response_timeout,
        }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let deadline = Instant::now() + self.response_timeout;
        if req.uri().path() != NUMBERS_PATH {
            return text_response(StatusCode::NOT_FOUND, "not found");
        }
        if req.method() != Method::GET {
            return text_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
        }

        let urls = query_urls(req.uri().query());
        engine_info!("obtained list of urls: {:?}", urls);

        let mut body = Vec::new();
        match self.merger.merge(urls, &mut body, Some(deadline)).await {
            Ok(()) => {
                let mut response = Response::new(Body::from(body));
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
            Err(err) => {
                engine_error!("merge failed: {}", err);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

/// Every value of the repeatable `u` query parameter, in request order.
pub fn query_urls(query: Option<&str>) -> Vec<String> {
    query
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .filter(|(key, _)| key == URL_PARAM)
                .map(|(_, value)| value.into_owned())
                .collect()
        })
        .unwrap_or_default()
}

fn text_response(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

/// Serves `service` on `addr` until `shutdown` resolves, then lets in-flight
/// requests finish.
pub async fn serve<F>(addr: SocketAddr, service: NumbersService, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let make_service = make_service_fn(move |_conn| {
        let service = service.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let service = service.clone();
                async move { Ok::<_, Infallible>(service.handle(req).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("failed to bind {addr}"))?
        .serve(make_service);
    engine_info!("listening on {}", server.local_addr());

    server
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed")
}
