//! Report submission and alert subscription.

use chrono::Utc;

use crate::models::{ApiAck, ReportSubmission, SubscriptionRequest};
use crate::{ClientError, DisasterClient, preview};

/// Path of the report endpoint.
pub const REPORT_PATH: &str = "/api/report";

/// Path of the subscription endpoint.
pub const SUBSCRIBE_PATH: &str = "/api/subscribe";

impl DisasterClient {
    /// Submits a disaster report, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invalid`] if the report fails client-side
    /// checks, [`ClientError::Rejected`] if the backend refuses it, or a
    /// transport error.
    pub async fn submit_report(&self, report: &ReportSubmission) -> Result<ApiAck, ClientError> {
        report.validate()?;
        let fields = report.form_fields(Utc::now());
        self.post_form(REPORT_PATH, &fields, "There was an error submitting your report.")
            .await
    }

    /// Subscribes to alerts for one disaster.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invalid`] if the request fails client-side
    /// checks, [`ClientError::Rejected`] if the backend refuses it, or a
    /// transport error.
    pub async fn subscribe(&self, request: &SubscriptionRequest) -> Result<ApiAck, ClientError> {
        request.validate()?;
        let fields = request.form_fields();
        self.post_form(
            SUBSCRIBE_PATH,
            &fields,
            "There was an error processing your subscription.",
        )
        .await
    }

    async fn post_form(
        &self,
        path: &str,
        fields: &[(&'static str, String)],
        rejected_message: &str,
    ) -> Result<ApiAck, ClientError> {
        let url = self.url(path);
        log::debug!("POST {url} ({} field(s))", fields.len());

        let response = self.http().post(&url).form(fields).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let ack = interpret_ack(status, &url, &text, rejected_message)?;
        log::info!("POST {url} accepted");
        Ok(ack)
    }
}

/// Maps a form POST reply onto a result.
///
/// A parseable `{success: false}` body is a rejection regardless of the
/// status code, so the backend's message reaches the user.
fn interpret_ack(
    status: reqwest::StatusCode,
    url: &str,
    body: &str,
    rejected_message: &str,
) -> Result<ApiAck, ClientError> {
    match serde_json::from_str::<ApiAck>(body) {
        Ok(ack) if !ack.success => {
            let message = ack
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| rejected_message.to_string());
            log::warn!("POST {url} rejected: {message}");
            Err(ClientError::Rejected { message })
        }
        Ok(ack) if status.is_success() => Ok(ack),
        Ok(_) => Err(status_error(status, url)),
        Err(_) if !status.is_success() => Err(status_error(status, url)),
        Err(e) => Err(ClientError::MalformedResponse {
            message: format!("invalid acknowledgement ({e}): {}", preview(body)),
        }),
    }
}

fn status_error(status: reqwest::StatusCode, url: &str) -> ClientError {
    log::error!("POST {url} failed: HTTP {status}");
    ClientError::Status {
        status,
        url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    const URL: &str = "http://localhost/api/report";

    #[test]
    fn accepts_success_ack() {
        let ack = interpret_ack(StatusCode::OK, URL, r#"{"success": true}"#, "fail").unwrap();
        assert!(ack.success);
    }

    #[test]
    fn rejection_carries_backend_message() {
        let err = interpret_ack(
            StatusCode::BAD_REQUEST,
            URL,
            r#"{"success": false, "message": "Title is required."}"#,
            "fail",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Rejected { ref message } if message == "Title is required."
        ));
    }

    #[test]
    fn rejection_without_message_uses_default() {
        let err = interpret_ack(StatusCode::OK, URL, r#"{"success": false}"#, "fail").unwrap_err();
        assert!(matches!(err, ClientError::Rejected { ref message } if message == "fail"));
    }

    #[test]
    fn server_error_without_ack_is_status_error() {
        let err = interpret_ack(StatusCode::INTERNAL_SERVER_ERROR, URL, "<html>", "fail")
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(err.is_transport());
    }

    #[test]
    fn garbage_with_ok_status_is_malformed() {
        let err = interpret_ack(StatusCode::OK, URL, "ok!", "fail").unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse { .. }));
    }
}
