//! Job-start requests and the external collaborators that act on them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Options forwarded to the remote start call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOptions {
    /// Memory to allocate for the run, in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mbytes: Option<u32>,
    /// Run timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Build tag or number to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

impl StartOptions {
    /// Set the memory allocation.
    #[must_use]
    pub const fn with_memory_mbytes(mut self, memory_mbytes: u32) -> Self {
        self.memory_mbytes = Some(memory_mbytes);
        self
    }

    /// Set the run timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set the build to run.
    #[must_use]
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }
}

/// A request to start the job named `job_name`.
///
/// The job name is the deduplication key: concurrent requests for the same
/// name share one start attempt and its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest<I> {
    /// Unique job name.
    pub job_name: String,
    /// Input handed to the job.
    pub input: I,
    /// Start options.
    #[serde(default)]
    pub options: StartOptions,
}

impl<I> StartRequest<I> {
    /// Create a request with default options.
    pub fn new(job_name: impl Into<String>, input: I) -> Self {
        Self {
            job_name: job_name.into(),
            input,
            options: StartOptions::default(),
        }
    }

    /// Replace the start options.
    #[must_use]
    pub fn with_options(mut self, options: StartOptions) -> Self {
        self.options = options;
        self
    }
}

/// Issues the actual remote job start.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_start_scheduler::core::{JobStarter, StartOptions};
///
/// struct HttpStarter { client: reqwest::Client }
///
/// #[async_trait]
/// impl JobStarter<serde_json::Value, String, reqwest::Error> for HttpStarter {
///     async fn start(&self, input: &serde_json::Value, options: &StartOptions) -> Result<String, reqwest::Error> {
///         let run = self.client.post("https://jobs.example/runs").json(input).send().await?;
///         run.text().await
///     }
/// }
/// ```
#[async_trait]
pub trait JobStarter<I, T, E>: Send + Sync + 'static {
    /// Start the job. Expected to be long-latency and network-bound.
    async fn start(&self, input: &I, options: &StartOptions) -> Result<T, E>;
}

/// Classification of a failed start attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass<F> {
    /// Caused by a temporary capacity shortfall; eligible for retry.
    TransientResource(F),
    /// Any other failure; surfaced immediately.
    Other(F),
}

impl<F> ErrorClass<F> {
    /// Whether this failure may be retried.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientResource(_))
    }

    /// The classified failure value.
    pub fn into_inner(self) -> F {
        match self {
            Self::TransientResource(failure) | Self::Other(failure) => failure,
        }
    }
}

/// Maps a raw start error to a classified failure.
///
/// Asynchronous because classification may need a follow-up query.
#[async_trait]
pub trait ErrorClassifier<E, F>: Send + Sync + 'static {
    /// Classify `error`.
    async fn classify(&self, error: E) -> ErrorClass<F>;
}
