//! Backend API client.
//!
//! Two calls per submission cycle: a GET for a fresh job identity and a POST
//! of the form field set. Both are marked programmatic with the
//! `X-Requested-With` header so the backend answers JSON instead of HTML.

use crate::model::{Job, ResultPayload, SubmitConfig};
use anyhow::{anyhow, Context, Result};
use futures::future::BoxFuture;

const REQUESTED_WITH: &str = "X-Requested-With";
const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Seam between the orchestrator and the network.
///
/// A failed identity fetch is logged and mapped to `None` so it can never
/// abort a submission; a failed submission surfaces its body text for the
/// inline error message.
pub trait Backend: Send + Sync + 'static {
    fn create_job(&self) -> BoxFuture<'_, Option<Job>>;
    fn submit(&self, fields: Vec<(String, String)>) -> BoxFuture<'_, Result<ResultPayload>>;
}

pub struct HttpBackend {
    http: reqwest::Client,
    create_url: String,
    submit_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &SubmitConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            create_url: join_url(&cfg.base_url, &cfg.create_path),
            submit_url: join_url(&cfg.base_url, &cfg.submit_path),
        })
    }

    async fn try_create_job(&self) -> Result<Job> {
        let res = self
            .http
            .get(&self.create_url)
            .header(REQUESTED_WITH, REQUESTED_WITH_VALUE)
            .send()
            .await
            .context("job creation request failed")?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_else(|_| status.to_string());
            return Err(anyhow!("job endpoint returned {status}: {}", body.trim()));
        }
        let job: Job = res
            .json()
            .await
            .context("job endpoint returned a malformed body")?;
        if job.job_id.is_empty() || job.short_id.is_empty() {
            return Err(anyhow!("job endpoint returned an incomplete identity"));
        }
        Ok(job)
    }

    async fn try_submit(&self, fields: &[(String, String)]) -> Result<ResultPayload> {
        let res = self
            .http
            .post(&self.submit_url)
            .header(REQUESTED_WITH, REQUESTED_WITH_VALUE)
            .form(fields)
            .send()
            .await
            .context("submission request failed")?;
        let status = res.status();
        if !status.is_success() {
            // The body carries the backend's human-readable reason; fall back
            // to the bare status when there is none.
            let body = res.text().await.unwrap_or_default();
            let body = body.trim();
            if body.is_empty() {
                return Err(anyhow!("submission returned {status}"));
            }
            return Err(anyhow!("{body}"));
        }
        res.json::<ResultPayload>()
            .await
            .context("submission returned a malformed result body")
    }
}

impl Backend for HttpBackend {
    fn create_job(&self) -> BoxFuture<'_, Option<Job>> {
        Box::pin(async move {
            match self.try_create_job().await {
                Ok(job) => {
                    log::info!("job created: {}", job.short_id);
                    Some(job)
                }
                Err(e) => {
                    log::error!("job creation failed: {e:#}");
                    None
                }
            }
        })
    }

    fn submit(&self, fields: Vec<(String, String)>) -> BoxFuture<'_, Result<ResultPayload>> {
        Box::pin(async move { self.try_submit(&fields).await })
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url("http://x:8000/", "/api/jobs/create/"),
            "http://x:8000/api/jobs/create/"
        );
        assert_eq!(join_url("http://x:8000", "mme_form/"), "http://x:8000/mme_form/");
    }

    #[test]
    fn job_body_requires_both_identities() {
        assert!(serde_json::from_str::<Job>(r#"{"job_id": "u"}"#).is_err());
        assert!(serde_json::from_str::<Job>(r#"{"short_id": "s"}"#).is_err());
        let job: Job =
            serde_json::from_str(r#"{"job_id": "u", "short_id": "s", "status": "queued"}"#)
                .unwrap();
        assert_eq!(job.short_id, "s");
    }
}
