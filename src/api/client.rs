use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::backend::Backend;
use super::error::ApiError;
use super::types::{
    AppConfig, Job, JobQuery, NotesUpdate, SearchAck, SearchRequest, SearchStatus, Stats,
    StatusUpdate, StatusUpdated,
};
use crate::lifecycle::Status;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// HTTP client for the tracker backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = ensure_success(request.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Turns a non-2xx reply into [`ApiError::Status`] carrying the body verbatim.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

impl Backend for ApiClient {
    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, ApiError> {
        debug!(?query, "GET /api/jobs");
        self.fetch(self.client.get(self.url("/api/jobs")).query(query))
            .await
    }

    async fn get_job(&self, id: i64) -> Result<Job, ApiError> {
        debug!(id, "GET /api/jobs/{{id}}");
        self.fetch(self.client.get(self.url(&format!("/api/jobs/{id}"))))
            .await
    }

    async fn set_status(&self, id: i64, update: &StatusUpdate) -> Result<Option<Job>, ApiError> {
        debug!(id, status = %update.status, "POST /api/jobs/{{id}}/status");
        let reply: StatusUpdated = self
            .fetch(
                self.client
                    .post(self.url(&format!("/api/jobs/{id}/status")))
                    .json(update),
            )
            .await?;
        if reply.job.is_some() {
            return Ok(reply.job);
        }
        // The change is already saved; a failed read-back must not report it as failed.
        match self.get_job(id).await {
            Ok(job) => Ok(Some(job)),
            Err(err) => {
                warn!(job_id = id, error = %err, "status saved but job could not be re-fetched");
                Ok(None)
            }
        }
    }

    async fn update_notes(&self, id: i64, notes: &str) -> Result<Job, ApiError> {
        debug!(id, len = notes.len(), "PATCH /api/jobs/{{id}}/notes");
        let body = NotesUpdate {
            notes: notes.to_string(),
        };
        let reply: serde_json::Value = self
            .fetch(
                self.client
                    .patch(self.url(&format!("/api/jobs/{id}/notes")))
                    .json(&body),
            )
            .await?;

        // Some backends only acknowledge; fetch the record in that case.
        if reply.get("id").is_some() {
            Ok(serde_json::from_value(reply)?)
        } else {
            self.get_job(id).await
        }
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        debug!("GET /api/stats");
        self.fetch(self.client.get(self.url("/api/stats"))).await
    }

    async fn applications(&self, status: Option<Status>) -> Result<Vec<Job>, ApiError> {
        debug!(?status, "GET /api/applications");
        let mut request = self.client.get(self.url("/api/applications"));
        if let Some(status) = status {
            request = request.query(&[("status", status.key())]);
        }
        self.fetch(request).await
    }

    async fn config(&self) -> Result<AppConfig, ApiError> {
        debug!("GET /api/config");
        self.fetch(self.client.get(self.url("/api/config"))).await
    }

    async fn start_search(&self, role: Option<&str>) -> Result<SearchAck, ApiError> {
        debug!(?role, "POST /api/search");
        let body = SearchRequest {
            role: role.map(str::to_string),
        };
        self.fetch(self.client.post(self.url("/api/search")).json(&body))
            .await
    }

    async fn search_status(&self) -> Result<SearchStatus, ApiError> {
        debug!("GET /api/search/status");
        self.fetch(self.client.get(self.url("/api/search/status")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::SortKey;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn job_json(id: i64, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Product Designer",
            "company": "Acme",
            "score": 30,
            "is_remote": 1,
            "app_status": status,
            "app_notes": "",
            "applied_at": "2026-03-01T10:00:00"
        })
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://tracker.local:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://tracker.local:5000");
        assert_eq!(client.url("/api/stats"), "http://tracker.local:5000/api/stats");
    }

    #[tokio::test]
    async fn list_jobs_sends_filters_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .and(query_param("status", "applied"))
            .and(query_param("is_remote", "1"))
            .and(query_param("sort", "company"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([job_json(1, "applied")])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let query = JobQuery {
            status: Some(Status::Applied),
            is_remote: true,
            sort: Some(SortKey::Company),
            ..Default::default()
        };
        let jobs = client.list_jobs(&query).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].status.as_ref().unwrap().is(Status::Applied));
    }

    #[tokio::test]
    async fn set_status_posts_body_and_adopts_returned_job() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/5/status"))
            .and(body_json(json!({"status": "applied", "notes": "sent portfolio"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "status": "applied", "job": job_json(5, "applied")})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let job = client
            .set_status(
                5,
                &StatusUpdate {
                    status: Status::Applied,
                    notes: "sent portfolio".into(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.id, 5);
        assert!(job.status.unwrap().is(Status::Applied));
        assert_eq!(job.applied_at.as_deref(), Some("2026-03-01T10:00:00"));
    }

    #[tokio::test]
    async fn set_status_without_job_refetches_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/8/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "job": null})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_json(8, "offer")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let job = client
            .set_status(
                8,
                &StatusUpdate {
                    status: Status::Offer,
                    notes: String::new(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(job.status.unwrap().is(Status::Offer));
    }

    #[tokio::test]
    async fn saved_status_survives_failed_read_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/8/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/8"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reply = client
            .set_status(
                8,
                &StatusUpdate {
                    status: Status::Offer,
                    notes: String::new(),
                },
            )
            .await
            .unwrap();
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn non_success_body_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/2/status"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .set_status(
                2,
                &StatusUpdate {
                    status: Status::Rejected,
                    notes: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.to_string(), "db locked");
    }

    #[tokio::test]
    async fn empty_error_body_falls_back_to_reason_phrase() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stats"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.stats().await.unwrap_err();
        assert_eq!(err.to_string(), "Service Unavailable");
    }

    #[tokio::test]
    async fn update_notes_ack_falls_back_to_get() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/jobs/4/notes"))
            .and(body_json(json!({"notes": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        let mut stored = job_json(4, "applied");
        stored["app_notes"] = json!("hello");
        Mock::given(method("GET"))
            .and(path("/api/jobs/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let job = client.update_notes(4, "hello").await.unwrap();
        assert_eq!(job.notes_text(), "hello");
    }

    #[tokio::test]
    async fn update_notes_adopts_job_body() {
        let server = MockServer::start().await;
        let mut stored = job_json(6, "saved");
        stored["app_notes"] = json!("call back");
        Mock::given(method("PATCH"))
            .and(path("/api/jobs/6/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let job = client.update_notes(6, "call back").await.unwrap();
        assert_eq!(job.notes_text(), "call back");
    }

    #[tokio::test]
    async fn applications_filter_by_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/applications"))
            .and(query_param("status", "interview"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "title": "UX Lead", "company": "Initech", "status": "interview"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let apps = client.applications(Some(Status::Interview)).await.unwrap();
        assert_eq!(apps.len(), 1);
        assert!(apps[0].is_tracked());
    }

    #[tokio::test]
    async fn search_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(body_json(json!({"role": "UX Designer"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": true, "message": "Search started"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/search/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "running": true, "progress": "Searching 1 role(s)...", "added": 0, "found": 0
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let ack = client.start_search(Some("UX Designer")).await.unwrap();
        assert!(ack.ok);
        let status = client.search_status().await.unwrap();
        assert!(status.running);
        assert_eq!(status.progress, "Searching 1 role(s)...");
    }

    #[tokio::test]
    async fn search_conflict_is_reported_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(
                ResponseTemplate::new(409).set_body_string(r#"{"error": "Search already running"}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.start_search(None).await.unwrap_err();
        assert!(err.to_string().contains("Search already running"));
    }

    #[tokio::test]
    async fn config_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sources": ["Jobicy", "Remotive"],
                "target_roles": ["Product Designer"],
                "statuses": ["saved", "applied"]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let config = client.config().await.unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.target_roles, vec!["Product Designer".to_string()]);
    }
}
