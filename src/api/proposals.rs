use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentAdvisor, CurrentPerson, CurrentStudent};
use crate::api::pagination::{default_limit, PaginatedResponse};
use crate::api::validation::{sanitized_filename, validate_document_upload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Person, Proposal};
use crate::db::types::ReportSlot;
use crate::repositories;
use crate::schemas::chapter::ChapterResponse;
use crate::schemas::completion::{ArchiveResponse, ArchiveStatusUpdate, CardResponse, CompletionStatus};
use crate::schemas::message::{MessageCreate, MessageResponse};
use crate::schemas::notification::ActivityResponse;
use crate::schemas::proposal::{
    AdvisorAssignment, ProposalResponse, ProposalReview, ProposalSubmit,
};
use crate::schemas::report::ReportResponse;
use crate::services::dispatch::{self, TransitionRecord};
use crate::services::storage;
use crate::services::supervision;
use crate::services::workflow::finalize;
use crate::services::workflow::{chapters, proposal as proposal_ops, report as report_ops};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_proposal))
        .route("/me", get(my_proposal).put(revise_proposal))
        .route("/supervised", get(supervised_proposals))
        .route("/:proposal_id", get(get_proposal))
        .route("/:proposal_id/review", post(review_proposal))
        .route("/:proposal_id/advisors", post(assign_advisors))
        .route("/:proposal_id/chapters", get(list_chapters).post(upload_chapter))
        .route("/:proposal_id/chapters/:chapter_number/view-url", get(chapter_view_url))
        .route("/:proposal_id/report", get(get_report))
        .route("/:proposal_id/report/:slot", post(upload_report_file))
        .route("/:proposal_id/report/:slot/view-url", get(report_file_view_url))
        .route("/:proposal_id/completion", get(completion_status))
        .route("/:proposal_id/card", get(get_card).post(generate_card))
        .route(
            "/:proposal_id/archive",
            get(get_archive).post(create_archive).patch(correct_archive),
        )
        .route("/:proposal_id/messages", get(list_messages).post(send_message))
        .route("/:proposal_id/activity", get(list_activity))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

async fn submit_proposal(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<ProposalSubmit>,
) -> Result<(StatusCode, Json<ProposalResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (proposal, record) =
        proposal_ops::submit_proposal(state.db(), &student, &payload.title, &payload.topic)
            .await?;
    dispatch::emit(&state, record).await;

    Ok((StatusCode::CREATED, Json(ProposalResponse::from_db(proposal))))
}

async fn my_proposal(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let proposal = repositories::proposals::find_by_student(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load proposal"))?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".to_string()))?;

    Ok(Json(ProposalResponse::from_db(proposal)))
}

async fn revise_proposal(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<ProposalSubmit>,
) -> Result<Json<ProposalResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (proposal, record) =
        proposal_ops::revise_proposal(state.db(), &student, &payload.title, &payload.topic)
            .await?;
    dispatch::emit(&state, record).await;

    Ok(Json(ProposalResponse::from_db(proposal)))
}

async fn supervised_proposals(
    CurrentAdvisor(advisor): CurrentAdvisor,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ProposalResponse>>, ApiError> {
    let limit = query.limit.clamp(1, 500);
    let skip = query.skip.max(0);

    let proposals =
        repositories::proposals::list_supervised_by(state.db(), &advisor.id, skip, limit)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list supervised proposals"))?;

    let total_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM proposals WHERE primary_advisor_id = $1 OR secondary_advisor_id = $1",
    )
    .bind(&advisor.id)
    .fetch_one(state.db())
    .await
    .map_err(|e| ApiError::internal(e, "Failed to count supervised proposals"))?;

    Ok(Json(PaginatedResponse {
        items: proposals.into_iter().map(ProposalResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn get_proposal(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;
    Ok(Json(ProposalResponse::from_db(proposal)))
}

async fn review_proposal(
    CurrentAdvisor(advisor): CurrentAdvisor,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    Json(payload): Json<ProposalReview>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let (proposal, record) = proposal_ops::review_proposal(
        state.db(),
        &advisor,
        &proposal_id,
        payload.decision,
        payload.reason.as_deref(),
    )
    .await?;
    dispatch::emit(&state, record).await;

    Ok(Json(ProposalResponse::from_db(proposal)))
}

async fn assign_advisors(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    Json(payload): Json<AdvisorAssignment>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let (proposal, record) = proposal_ops::assign_advisors(
        state.db(),
        &admin,
        &proposal_id,
        &payload.primary_advisor_id,
        payload.secondary_advisor_id.as_deref(),
    )
    .await?;
    dispatch::emit(&state, record).await;

    Ok(Json(ProposalResponse::from_db(proposal)))
}

#[derive(Debug, Deserialize)]
struct ChapterUploadQuery {
    #[serde(alias = "chapterNumber")]
    chapter_number: i32,
}

async fn upload_chapter(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    Query(query): Query<ChapterUploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ChapterResponse>), ApiError> {
    if !(chapters::FIRST_CHAPTER..=chapters::LAST_CHAPTER).contains(&query.chapter_number) {
        return Err(ApiError::BadRequest(format!(
            "chapterNumber must be between {} and {}",
            chapters::FIRST_CHAPTER,
            chapters::LAST_CHAPTER
        )));
    }

    let document = read_document(&state, multipart).await?;
    let key = storage::chapter_key(
        &proposal_id,
        query.chapter_number,
        &sanitized_filename(&document.filename),
    );
    store_document(&state, &key, document).await?;

    let (chapter, record) = chapters::upload_chapter(
        state.db(),
        &student,
        &proposal_id,
        query.chapter_number,
        &key,
    )
    .await?;
    dispatch::emit(&state, record).await;

    Ok((StatusCode::CREATED, Json(ChapterResponse::from_db(chapter))))
}

async fn list_chapters(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<Json<Vec<ChapterResponse>>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;

    let chapters = repositories::chapters::list_by_proposal(state.db(), &proposal.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list chapters"))?;

    Ok(Json(chapters.into_iter().map(ChapterResponse::from_db).collect()))
}

#[derive(Debug, serde::Serialize)]
struct ViewUrlResponse {
    url: String,
    expires_in_seconds: u64,
}

async fn chapter_view_url(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path((proposal_id, chapter_number)): Path<(String, i32)>,
) -> Result<Json<ViewUrlResponse>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;

    let chapter =
        repositories::chapters::find_by_number(state.db(), &proposal.id, chapter_number)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load chapter"))?
            .ok_or_else(|| ApiError::NotFound("Chapter not found".to_string()))?;

    presign_view_url(&state, &chapter.file_ref).await.map(Json)
}

async fn report_file_view_url(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path((proposal_id, slot)): Path<(String, String)>,
) -> Result<Json<ViewUrlResponse>, ApiError> {
    let slot = ReportSlot::parse(&slot)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown report file slot '{slot}'")))?;

    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;

    let report = repositories::reports::find_by_proposal(state.db(), &proposal.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load final report"))?
        .ok_or_else(|| ApiError::NotFound("Final report not found".to_string()))?;
    let file_ref = report
        .slot_ref(slot)
        .ok_or_else(|| ApiError::NotFound("Report file not uploaded".to_string()))?;

    presign_view_url(&state, file_ref).await.map(Json)
}

async fn presign_view_url(state: &AppState, key: &str) -> Result<ViewUrlResponse, ApiError> {
    let storage = state
        .storage()
        .ok_or_else(|| ApiError::BadRequest("S3 storage is not configured".to_string()))?;

    let expires_in_seconds = state.settings().storage().presigned_url_expire_minutes * 60;
    let url = storage
        .presign_get(key, std::time::Duration::from_secs(expires_in_seconds))
        .await
        .map_err(|e| ApiError::internal(e, "Failed to presign file URL"))?;

    Ok(ViewUrlResponse { url, expires_in_seconds })
}

async fn upload_report_file(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Path((proposal_id, slot)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Json<ReportResponse>, ApiError> {
    let slot = ReportSlot::parse(&slot)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown report file slot '{slot}'")))?;

    let document = read_document(&state, multipart).await?;
    let key = storage::report_key(&proposal_id, slot, &sanitized_filename(&document.filename));
    store_document(&state, &key, document).await?;

    let (report, record) =
        report_ops::upload_report_file(state.db(), &student, &proposal_id, slot, &key).await?;
    dispatch::emit(&state, record).await;

    Ok(Json(ReportResponse::from_db(report)))
}

async fn get_report(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<Json<ReportResponse>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;

    let report = repositories::reports::find_by_proposal(state.db(), &proposal.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load final report"))?
        .ok_or_else(|| ApiError::NotFound("Final report not found".to_string()))?;

    Ok(Json(ReportResponse::from_db(report)))
}

async fn completion_status(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<Json<CompletionStatus>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;

    let accepted_chapters = repositories::chapters::count_accepted(state.db(), &proposal.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count accepted chapters"))?;
    let report_accepted = repositories::reports::accepted_exists(state.db(), &proposal.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check final report"))?;

    Ok(Json(CompletionStatus {
        accepted_chapters,
        required_chapters: finalize::REQUIRED_CHAPTERS,
        report_accepted,
        can_finalize: accepted_chapters >= finalize::REQUIRED_CHAPTERS && report_accepted,
    }))
}

async fn generate_card(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<Json<CardResponse>, ApiError> {
    let (card, record) =
        finalize::generate_supervision_card(state.db(), &person, &proposal_id).await?;
    if let Some(record) = record {
        dispatch::emit(&state, record).await;
    }

    Ok(Json(CardResponse::from_db(card)))
}

async fn get_card(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<Json<CardResponse>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;

    let card = repositories::cards::find_by_proposal(state.db(), &proposal.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load supervision card"))?
        .ok_or_else(|| ApiError::NotFound("Supervision card not found".to_string()))?;

    Ok(Json(CardResponse::from_db(card)))
}

async fn create_archive(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<(StatusCode, Json<ArchiveResponse>), ApiError> {
    let (archive, record) =
        finalize::create_archive_record(state.db(), &person, &proposal_id).await?;
    dispatch::emit(&state, record).await;

    Ok((StatusCode::CREATED, Json(ArchiveResponse::from_db(archive))))
}

async fn get_archive(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<Json<ArchiveResponse>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;

    let archive = repositories::archives::find_by_proposal(state.db(), &proposal.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load archive record"))?
        .ok_or_else(|| ApiError::NotFound("Archive record not found".to_string()))?;

    Ok(Json(ArchiveResponse::from_db(archive)))
}

async fn correct_archive(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    Json(payload): Json<ArchiveStatusUpdate>,
) -> Result<Json<ArchiveResponse>, ApiError> {
    let (archive, record) =
        finalize::correct_archive_status(state.db(), &admin, &proposal_id, payload.status).await?;
    dispatch::emit(&state, record).await;

    Ok(Json(ArchiveResponse::from_db(archive)))
}

async fn list_messages(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<MessageResponse>>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;
    let limit = query.limit.clamp(1, 500);
    let skip = query.skip.max(0);

    let messages = repositories::messages::list_by_proposal(state.db(), &proposal.id, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list messages"))?;
    let total_count = repositories::messages::count_by_proposal(state.db(), &proposal.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count messages"))?;

    Ok(Json(PaginatedResponse {
        items: messages.into_iter().map(MessageResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn send_message(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    Json(payload): Json<MessageCreate>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;

    let message = repositories::messages::insert(
        state.db(),
        &Uuid::new_v4().to_string(),
        &proposal.id,
        &person.id,
        payload.body.trim(),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store message"))?;

    dispatch::publish_message(&state, &message).await;

    let mut record = TransitionRecord::new(
        &person.id,
        Some(&proposal.id),
        format!("{} sent a supervision message", person.full_name),
    );
    for recipient in message_recipients(&proposal, &person.id) {
        record = record.notify(
            recipient,
            "New supervision message",
            format!("{} wrote a message about \"{}\".", person.full_name, proposal.title),
        );
    }
    dispatch::emit(&state, record).await;

    Ok((StatusCode::CREATED, Json(MessageResponse::from_db(message))))
}

async fn list_activity(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ActivityResponse>>, ApiError> {
    let proposal = fetch_proposal_for(&state, &proposal_id, &person).await?;
    let limit = query.limit.clamp(1, 500);
    let skip = query.skip.max(0);

    let entries = repositories::activity::list_by_proposal(state.db(), &proposal.id, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list activity"))?;

    Ok(Json(entries.into_iter().map(ActivityResponse::from_db).collect()))
}

/// Loads the proposal and checks that `person` may see it.
async fn fetch_proposal_for(
    state: &AppState,
    proposal_id: &str,
    person: &Person,
) -> Result<Proposal, ApiError> {
    let proposal = repositories::proposals::find_by_id(state.db(), proposal_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load proposal"))?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".to_string()))?;

    supervision::require_participant(&proposal, person)?;
    Ok(proposal)
}

fn message_recipients<'a>(proposal: &'a Proposal, sender_id: &str) -> Vec<&'a str> {
    let mut recipients = proposal.advisor_ids();
    recipients.push(proposal.student_id.as_str());
    recipients.retain(|id| *id != sender_id);
    recipients
}

struct UploadedDocument {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Pulls the single `file` field out of a multipart body, enforcing the
/// configured size limit while streaming.
async fn read_document(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadedDocument, ApiError> {
    let max_bytes = state.settings().storage().max_upload_size_mb * 1024 * 1024;

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            content_type = field.content_type().map(|s| s.to_string());
            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
            {
                let next_size = bytes.len() as u64 + chunk.len() as u64;
                if next_size > max_bytes {
                    return Err(ApiError::BadRequest(format!(
                        "File size exceeds {}MB limit",
                        state.settings().storage().max_upload_size_mb
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }
            file_bytes = Some(bytes);
        }
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;
    let filename = filename.ok_or_else(|| ApiError::BadRequest("Filename is required".to_string()))?;
    let content_type =
        content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    validate_document_upload(
        &filename,
        &content_type,
        &state.settings().storage().allowed_document_extensions,
    )?;

    Ok(UploadedDocument { filename, content_type, bytes })
}

async fn store_document(
    state: &AppState,
    key: &str,
    document: UploadedDocument,
) -> Result<(), ApiError> {
    let storage = state.storage().ok_or_else(|| {
        ApiError::BadRequest("S3 storage is not configured".to_string())
    })?;

    storage
        .upload_bytes(key, &document.content_type, document.bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to upload file to S3"))?;
    Ok(())
}
