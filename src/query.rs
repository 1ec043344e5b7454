//! Background fetches owned by a view.
//!
//! A `Query<T>` runs its fetcher on the tokio runtime and hands the result
//! back through a oneshot channel that the view polls on each tick. The
//! spawned task is aborted on refetch and when the query is dropped, so a
//! view the user has navigated away from never receives a late result.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Not started yet
  Idle,
  Loading,
  Success(T),
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

struct InFlight<T> {
  receiver: oneshot::Receiver<Result<T, String>>,
  handle: JoinHandle<()>,
}

pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  in_flight: Option<InFlight<T>>,
}

impl<T: Send + 'static> Query<T> {
  /// The fetcher is called again on every `fetch`/`refetch`, so it should
  /// clone whatever services it captures into the returned future.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      in_flight: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn data_mut(&mut self) -> Option<&mut T> {
    match &mut self.state {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Start fetching unless a fetch is already running.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Abort whatever is running and start over.
  pub fn refetch(&mut self) {
    self.cancel();
    self.start_fetch();
  }

  /// Abort the running fetch, if any. A loading query goes back to idle.
  pub fn cancel(&mut self) {
    if let Some(in_flight) = self.in_flight.take() {
      in_flight.handle.abort();
      if self.state.is_loading() {
        self.state = QueryState::Idle;
      }
    }
  }

  /// Pick up a finished result. Returns true when the state changed.
  pub fn poll(&mut self) -> bool {
    let Some(in_flight) = self.in_flight.as_mut() else {
      return false;
    };

    match in_flight.receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.in_flight = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.in_flight = None;
        true
      }
      Err(oneshot::error::TryRecvError::Empty) => false,
      Err(oneshot::error::TryRecvError::Closed) => {
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.in_flight = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = oneshot::channel();
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    let handle = tokio::spawn(async move {
      let result = future.await;
      // Receiver may be gone
      let _ = tx.send(result);
    });
    self.in_flight = Some(InFlight {
      receiver: rx,
      handle,
    });
  }
}

impl<T> Drop for Query<T> {
  fn drop(&mut self) {
    if let Some(in_flight) = self.in_flight.take() {
      in_flight.handle.abort();
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("in_flight", &self.in_flight.is_some())
      .finish_non_exhaustive()
  }
}
