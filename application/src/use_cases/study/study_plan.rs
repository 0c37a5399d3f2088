//! Study plan generation and export.
//!
//! A plan takes two calls: the syllabus is uploaded and analysed first,
//! then the analysis is sent back with the date range to get a calendar.

use super::{StudyError, with_progress};
use crate::config::Endpoint;
use crate::ports::medbot_gateway::{GatewayError, MedbotGateway, MultipartUpload, decode_response};
use crate::ports::progress::ProgressNotifier;
use chrono::NaiveDate;
use medbot_domain::study::calendar::DATE_FORMAT;
use medbot_domain::{DomainError, StudyCalendar};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Multipart field the syllabus file is sent in.
pub const SYLLABUS_FIELD: &str = "syllabus";

/// Everything needed to build a plan from a syllabus.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub syllabus_name: String,
    pub syllabus: Vec<u8>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub study_hours: u32,
    /// Continue even when the server doubts the file is a syllabus.
    pub force: bool,
}

impl PlanRequest {
    fn validate(&self) -> Result<(), StudyError> {
        if !self.syllabus_name.to_lowercase().ends_with(".pdf") {
            return Err(StudyError::InvalidUpload(
                "Please upload a PDF syllabus".to_string(),
            ));
        }
        if self.syllabus.is_empty() {
            return Err(StudyError::InvalidUpload(format!(
                "{} is empty",
                self.syllabus_name
            )));
        }
        if self.start_date > self.end_date {
            return Err(DomainError::InvalidDateRange {
                start: self.start_date.format(DATE_FORMAT).to_string(),
                end: self.end_date.format(DATE_FORMAT).to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Result of asking to export a plan to the user's calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The plan was added; `events` entries were created.
    Exported { events: usize },
    /// The user has to authorize calendar access at `url` first.
    AuthorizationRequired { url: String },
}

#[derive(Debug, Deserialize)]
struct PlanResponse {
    #[serde(alias = "plan")]
    calendar: StudyCalendar,
}

#[derive(Debug, Deserialize)]
struct AuthStatus {
    #[serde(default)]
    authenticated: bool,
}

#[derive(Debug, Deserialize)]
struct CalendarUrl {
    #[serde(alias = "embed_url", alias = "auth_url", alias = "authorization_url")]
    url: String,
}

#[derive(Debug, Deserialize)]
struct ExportResponse {
    #[serde(default)]
    results: Option<Vec<Value>>,
}

/// Use case for building and exporting study plans.
#[derive(Clone)]
pub struct StudyPlanUseCase {
    gateway: Arc<dyn MedbotGateway>,
}

impl StudyPlanUseCase {
    pub fn new(gateway: Arc<dyn MedbotGateway>) -> Self {
        Self { gateway }
    }

    pub async fn generate(
        &self,
        request: PlanRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<StudyCalendar, StudyError> {
        request.validate()?;
        let start = request.start_date.format(DATE_FORMAT).to_string();
        let end = request.end_date.format(DATE_FORMAT).to_string();
        info!(
            "Building study plan from {} ({} to {}, {} h/day)",
            request.syllabus_name, start, end, request.study_hours
        );

        let upload = MultipartUpload {
            file_field: SYLLABUS_FIELD.to_string(),
            file_name: request.syllabus_name.clone(),
            mime_type: "application/pdf".to_string(),
            bytes: request.syllabus,
            fields: vec![
                ("start_date".to_string(), start.clone()),
                ("end_date".to_string(), end.clone()),
                ("study_hours".to_string(), request.study_hours.to_string()),
            ],
        };
        let extracted = with_progress(progress, "Reading syllabus", async {
            Ok(self
                .gateway
                .post_multipart(Endpoint::ProcessSyllabus, upload)
                .await?)
        })
        .await?;

        if let Some(warning) = extracted.get("warning").and_then(Value::as_str) {
            if !request.force {
                return Err(StudyError::NotASyllabus(warning.to_string()));
            }
            warn!("Continuing despite syllabus warning: {}", warning);
        }

        let body = json!({
            "start_date": start,
            "end_date": end,
            "study_hours": request.study_hours,
            "extracted_data": extracted,
        });
        let response: PlanResponse = with_progress(progress, "Generating study plan", async {
            let value = self.gateway.post_json(Endpoint::GeneratePlan, body).await?;
            Ok(decode_response(value)?)
        })
        .await?;

        debug!(
            "Study plan has {} tasks over {} days",
            response.calendar.task_count(),
            response.calendar.day_count()
        );
        Ok(response.calendar)
    }

    /// Add the plan to the user's Google Calendar, or report where to
    /// authorize first.
    pub async fn export(&self, calendar: &StudyCalendar) -> Result<ExportOutcome, StudyError> {
        let status: AuthStatus =
            decode_response(self.gateway.get_json(Endpoint::CheckAuth).await?)?;
        if !status.authenticated {
            let link: CalendarUrl =
                decode_response(self.gateway.get_json(Endpoint::CalendarUrl).await?)?;
            info!("Calendar export needs authorization");
            return Ok(ExportOutcome::AuthorizationRequired {
                url: self.gateway.resolve_url(&link.url),
            });
        }

        let body = json!({ "calendar": calendar });
        let response: ExportResponse =
            decode_response(self.gateway.post_json(Endpoint::AddToCalendar, body).await?)?;
        let events = response
            .results
            .map(|r| r.len())
            .unwrap_or_else(|| calendar.task_count());
        info!("Exported {} events to calendar", events);
        Ok(ExportOutcome::Exported { events })
    }

    /// Render the plan as a PDF on the server.
    pub async fn download_pdf(&self, calendar: &StudyCalendar) -> Result<Vec<u8>, StudyError> {
        let body = json!({ "calendar": calendar });
        let bytes = self
            .gateway
            .post_for_bytes(Endpoint::DownloadPdf, body)
            .await?;
        if !bytes.starts_with(b"%PDF") {
            return Err(GatewayError::InvalidResponse("response is not a PDF".to_string()).into());
        }
        Ok(bytes)
    }
}
