//! Request/response handler: fetch → parse → normalize → select → respond.
//!
//! One call to [`FeedHandler::handle`] is one invocation. The pipeline runs
//! as a unit; any failure replaces the whole payload with an error code and
//! text, never a partial item list.

use chrono::FixedOffset;
use feed_rs::parser::ParseFeedError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::{
    build_client, fetch_feed, normalize, parse_feed, FetchError, FetchSettings, NormalizedItem,
};
use crate::selection::{
    configure_selection, configure_selection_in, select, ContinuationArgs, SelectionEcho,
    SelectionQuery, SelectionState,
};

/// Code reported when a failure carries no HTTP status of its own.
pub const GENERIC_ERROR_CODE: u16 = 500;

// ============================================================================
// Request / Response Envelope
// ============================================================================

/// Incoming request envelope: `{"Query": {...}, "Data": {"args": {...}}}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedRequest {
    #[serde(rename = "Query", default)]
    pub query: SelectionQuery,
    #[serde(rename = "Data", default)]
    pub data: Option<RequestData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestData {
    #[serde(default)]
    pub args: Option<ContinuationArgs>,
}

impl FeedRequest {
    pub fn continuation(&self) -> Option<&ContinuationArgs> {
        self.data.as_ref().and_then(|d| d.args.as_ref())
    }
}

/// Outgoing response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    #[serde(rename = "ErrorCode")]
    pub error_code: Option<u16>,
    #[serde(rename = "Data")]
    pub data: ResponseData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Items {
        #[serde(flatten)]
        selection: SelectionEcho,
        items: Vec<NormalizedItem>,
    },
    Error {
        #[serde(rename = "ErrorText")]
        error_text: String,
    },
}

impl FeedResponse {
    pub fn success(state: &SelectionState, items: Vec<NormalizedItem>) -> Self {
        Self {
            error_code: None,
            data: ResponseData::Items {
                selection: state.echo(),
                items,
            },
        }
    }

    pub fn from_error(err: &HandlerError) -> Self {
        Self {
            error_code: Some(err.status_code()),
            data: ResponseData::Error {
                error_text: err.error_text(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Failure classes surfaced to the host.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Fetching the feed document failed
    #[error(transparent)]
    Transport(#[from] FetchError),
    /// The document is not a parseable RSS/Atom feed
    #[error("Feed parse error: {0}")]
    Parse(#[from] ParseFeedError),
    /// Anything else
    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl HandlerError {
    /// The transport's HTTP status when it has one, else
    /// [`GENERIC_ERROR_CODE`].
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::Transport(e) => e.status_code().unwrap_or(GENERIC_ERROR_CODE),
            _ => GENERIC_ERROR_CODE,
        }
    }

    /// Error message followed by its chain of underlying causes.
    pub fn error_text(&self) -> String {
        let message = self.to_string();

        let mut causes: Vec<String> = Vec::new();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if !message.contains(&text) && !causes.contains(&text) {
                causes.push(text);
            }
            source = err.source();
        }

        if causes.is_empty() {
            message
        } else {
            format!("{message}: {}", causes.join(": "))
        }
    }
}

// ============================================================================
// Handler
// ============================================================================

/// Runs feed invocations with a shared HTTP client.
///
/// Holds no per-request state, so one handler may serve concurrent
/// invocations.
#[derive(Debug)]
pub struct FeedHandler {
    client: reqwest::Client,
    settings: FetchSettings,
    date_offset: Option<FixedOffset>,
}

impl FeedHandler {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(&settings)?,
            settings,
            date_offset: None,
        })
    }

    /// Interpret `YYYYMMDD` bounds at midnight in a fixed offset instead of
    /// the process-local timezone.
    pub fn with_date_offset(mut self, offset: FixedOffset) -> Self {
        self.date_offset = Some(offset);
        self
    }

    /// Runs one invocation and assembles the response envelope.
    pub async fn handle(&self, feed_url: &str, request: &FeedRequest) -> FeedResponse {
        match self.run(feed_url, request).await {
            Ok((state, items)) => FeedResponse::success(&state, items),
            Err(e) => {
                tracing::warn!(
                    feed = %feed_url,
                    code = e.status_code(),
                    error = %e,
                    "Feed invocation failed"
                );
                FeedResponse::from_error(&e)
            }
        }
    }

    /// The pipeline without response assembly.
    pub async fn run(
        &self,
        feed_url: &str,
        request: &FeedRequest,
    ) -> Result<(SelectionState, Vec<NormalizedItem>), HandlerError> {
        let bytes = fetch_feed(&self.client, &self.settings, feed_url).await?;
        let entries = parse_feed(&bytes)?;
        let total = entries.len();

        let items: Vec<NormalizedItem> = entries.into_iter().map(normalize).collect();
        let state = self.configure(request);
        let selected = select(items, &state);

        tracing::info!(
            feed = %feed_url,
            entries = total,
            kept = selected.len(),
            action = state.paging.action().unwrap_or("none"),
            date_mode = state.is_date_mode(),
            "Feed invocation complete"
        );

        Ok((state, selected))
    }

    fn configure(&self, request: &FeedRequest) -> SelectionState {
        match &self.date_offset {
            Some(offset) => configure_selection_in(&request.query, request.continuation(), offset),
            None => configure_selection(&request.query, request.continuation()),
        }
    }
}
