//! HTTP transport seam between the API client and the network.

use futures::future::BoxFuture;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum HttpMethod {
  #[default]
  #[serde(rename = "GET")]
  Get,
  #[serde(rename = "POST")]
  Post,
  #[serde(rename = "PUT")]
  Put,
  #[serde(rename = "DELETE")]
  Delete,
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      HttpMethod::Get => "GET",
      HttpMethod::Post => "POST",
      HttpMethod::Put => "PUT",
      HttpMethod::Delete => "DELETE",
    };
    f.write_str(s)
  }
}

impl From<HttpMethod> for reqwest::Method {
  fn from(method: HttpMethod) -> Self {
    match method {
      HttpMethod::Get => reqwest::Method::GET,
      HttpMethod::Post => reqwest::Method::POST,
      HttpMethod::Put => reqwest::Method::PUT,
      HttpMethod::Delete => reqwest::Method::DELETE,
    }
  }
}

/// A fully built request, ready to go on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
  pub method: HttpMethod,
  pub url: String,
  pub headers: BTreeMap<String, String>,
  /// Serialized JSON body
  pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
  pub status: u16,
  pub body: String,
}

impl HttpResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
  /// The attempt was aborted for taking too long
  Timeout,
  Other(String),
}

impl fmt::Display for TransportError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TransportError::Timeout => f.write_str("request timed out"),
      TransportError::Other(msg) => f.write_str(msg),
    }
  }
}

/// Sends one HTTP request. Timeouts and retries are the caller's concern.
pub trait Transport: Send + Sync {
  fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>>;
}

/// Production transport backed by reqwest.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Transport for ReqwestTransport {
  fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
    Box::pin(async move {
      let mut builder = self
        .client
        .request(request.method.into(), request.url.as_str());
      for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
      }
      if let Some(body) = request.body {
        builder = builder.body(body);
      }

      let response = builder.send().await.map_err(map_reqwest_error)?;
      let status = response.status().as_u16();
      let body = response.text().await.map_err(map_reqwest_error)?;

      Ok(HttpResponse { status, body })
    })
  }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
  if e.is_timeout() {
    TransportError::Timeout
  } else {
    TransportError::Other(e.to_string())
  }
}

#[cfg(test)]
pub mod testing {
  //! Scripted transport for exercising the client without a network.

  use super::*;
  use std::collections::VecDeque;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;

  /// One scripted reply.
  #[derive(Debug, Clone)]
  pub enum Reply {
    Json(u16, String),
    Timeout,
    Fail(String),
    /// Sleep before answering, to trip the client-side timeout
    Slow(Duration, String),
  }

  impl Reply {
    pub fn ok(value: serde_json::Value) -> Self {
      Reply::Json(200, value.to_string())
    }
  }

  /// Replays a queue of replies and records every request.
  ///
  /// When the queue runs dry the last reply repeats.
  #[derive(Clone, Default)]
  pub struct FakeTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    last: Arc<Mutex<Option<Reply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
  }

  impl FakeTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
      Self {
        replies: Arc::new(Mutex::new(replies.into_iter().collect())),
        ..Default::default()
      }
    }

    pub fn always(reply: Reply) -> Self {
      Self::new([reply])
    }

    pub fn calls(&self) -> usize {
      self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
      self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Reply {
      let mut replies = self.replies.lock().unwrap();
      let mut last = self.last.lock().unwrap();
      if let Some(reply) = replies.pop_front() {
        *last = Some(reply.clone());
        reply
      } else {
        last
          .clone()
          .unwrap_or_else(|| Reply::Fail("no scripted reply".to_string()))
      }
    }
  }

  impl Transport for FakeTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
      self.requests.lock().unwrap().push(request);
      let reply = self.next_reply();
      Box::pin(async move {
        match reply {
          Reply::Json(status, body) => Ok(HttpResponse { status, body }),
          Reply::Timeout => Err(TransportError::Timeout),
          Reply::Fail(msg) => Err(TransportError::Other(msg)),
          Reply::Slow(delay, body) => {
            tokio::time::sleep(delay).await;
            Ok(HttpResponse { status: 200, body })
          }
        }
      })
    }
  }
}
