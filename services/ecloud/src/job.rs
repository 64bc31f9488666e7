// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Job polling.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use http::HeaderMap;
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tokio::time::{sleep, Instant};

use crate::client::from_document;
use crate::Client;
use cloudapi_core::Result;

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// `QUEUED`
    Queued,
    /// `RUNNING`
    Running,
    /// `COMPLETE`
    Complete,
    /// `CANCELED`
    Canceled,
    /// `CANCELING`
    Canceling,
    /// `FAILED`
    Failed,
    /// Any other status, kept verbatim.
    Other(String),
}

impl JobStatus {
    /// Returns true if the job will not change anymore.
    ///
    /// `CANCELING` counts as terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Complete | JobStatus::Canceled | JobStatus::Canceling | JobStatus::Failed
        )
    }

    /// The status as sent by the service.
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Complete => "COMPLETE",
            JobStatus::Canceled => "CANCELED",
            JobStatus::Canceling => "CANCELING",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(s) => s,
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "QUEUED" => JobStatus::Queued,
            "RUNNING" => JobStatus::Running,
            "COMPLETE" => JobStatus::Complete,
            "CANCELED" => JobStatus::Canceled,
            "CANCELING" => JobStatus::Canceling,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(s) => s,
            status => status.as_str().to_string(),
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job document returned by the job resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Job id, numbers are kept as their decimal string.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Job name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current status.
    pub status: JobStatus,
    /// Progress in percent.
    ///
    /// Numeric strings are accepted, anything else that is not a number is `None`.
    #[serde(
        default,
        deserialize_with = "deserialize_progress",
        skip_serializing_if = "Option::is_none"
    )]
    pub progress: Option<f64>,
    /// Href of the job itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// All other fields of the document.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        v => Err(serde::de::Error::custom(format!(
            "job id must be a string or a number, got {v}"
        ))),
    }
}

fn deserialize_progress<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    })
}

impl Client {
    /// Poll jobs until all of them are terminal or `timeout` has passed.
    ///
    /// Each sweep GETs every outstanding job once, then sleeps `interval` if any job
    /// is still running. The timeout is checked before each sweep and never
    /// interrupts one. Returns the last seen document of every polled href; jobs cut
    /// off by the timeout keep their non-terminal status.
    ///
    /// Duplicated hrefs are polled once. A failed GET aborts polling.
    pub async fn poll_jobs<I>(
        &mut self,
        hrefs: I,
        interval: Duration,
        timeout: Duration,
    ) -> Result<HashMap<String, Job>>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut running: Vec<String> = Vec::new();
        for href in hrefs {
            let href = href.into();
            if !running.contains(&href) {
                running.push(href);
            }
        }
        info!("poll jobs every {interval:?} for at most {timeout:?}: {running:?}");

        let mut result = HashMap::with_capacity(running.len());
        let start = Instant::now();
        let mut sweeps = 0;

        while !running.is_empty() && start.elapsed() < timeout {
            if let Some(max) = self.config.max_poll_sweeps {
                if sweeps >= max {
                    warn!("stop polling after {max} sweeps, still running: {running:?}");
                    break;
                }
            }
            sweeps += 1;

            let mut outstanding = Vec::with_capacity(running.len());
            for href in running {
                let job: Job = from_document(self.get(&href, HeaderMap::new()).await?, "job")?;
                info!(
                    "job id: {} name: {} status: {} progress: {}%",
                    job.id,
                    job.name.as_deref().unwrap_or_default(),
                    job.status,
                    job.progress.unwrap_or_default()
                );

                if !job.status.is_terminal() {
                    outstanding.push(href.clone());
                }
                result.insert(href, job);
            }
            running = outstanding;

            if !running.is_empty() {
                sleep(interval).await;
            }
        }

        Ok(result)
    }

    /// Poll a single job, see [`Client::poll_jobs`].
    ///
    /// Returns `None` only if the timeout is zero.
    pub async fn poll_job(
        &mut self,
        href: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Option<Job>> {
        let mut jobs = self.poll_jobs([href], interval, timeout).await?;
        Ok(jobs.remove(href))
    }
}
