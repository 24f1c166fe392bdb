use sqlx::{query, query_as, query_scalar, PgPool, Postgres, Transaction};

use crate::actix_web::http::StatusCode;
use crate::actix_web::web::{Data, Json, Path, Query};
use crate::actix_web::HttpResponse;
use crate::context::VolunteerInfo;
use crate::error::Error;
use crate::models::project::Project;
use crate::models::request::{RequestStatus, VolunteerRequest};
use crate::models::volunteer::Volunteer;
use crate::request::Pagination;
use crate::response::List;
use crate::serde::Deserialize;

static REQUEST_NOT_FOUND: &str = "request could not be found";
static PROJECT_NOT_FOUND: &str = "requested project could not be found";

#[derive(Debug, Deserialize)]
pub struct CreateParams {
    #[serde(rename = "projectId")]
    pub project_id: i32,
}

/// Any volunteer may request to join any project. The receiver is
/// pinned to the project's owner as of now.
pub async fn create(me: VolunteerInfo, Query(CreateParams { project_id }): Query<CreateParams>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let mut tx = db.begin().await?;
    let owner_id: i32 = query_scalar("SELECT owner_id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or_else(|| Error::NotFound(PROJECT_NOT_FOUND.into()))?;
    let created: VolunteerRequest = query_as(
        "INSERT INTO requests (sender_id, receiver_id, project_id, status) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(me.id)
    .bind(owner_id)
    .bind(project_id)
    .bind(RequestStatus::Pending)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(created))
}

pub async fn list(Query(Pagination { page, size }): Query<Pagination>, db: Data<PgPool>) -> Result<Json<List<VolunteerRequest>>, Error> {
    let mut conn = db.acquire().await?;
    let (total,): (i64,) = query_as("SELECT COUNT(*) FROM requests")
        .fetch_one(&mut conn)
        .await?;
    let requests = query_as(
        "SELECT * FROM requests ORDER BY id LIMIT $1 OFFSET $2",
    )
    .bind(size)
    .bind((page - 1) * size)
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(List::new(requests, total)))
}

pub async fn detail(request_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<VolunteerRequest>, Error> {
    let request_id = request_id.into_inner().0;
    let found: VolunteerRequest = query_as("SELECT * FROM requests WHERE id = $1")
        .bind(request_id)
        .fetch_optional(&mut db.acquire().await?)
        .await?
        .ok_or_else(|| Error::NotFound(REQUEST_NOT_FOUND.into()))?;
    Ok(Json(found))
}

/// Emergency removal for administrators, any status, no cascade.
pub async fn delete_request(me: VolunteerInfo, request_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<VolunteerRequest>, Error> {
    let request_id = request_id.into_inner().0;
    let mut tx = db.begin().await?;
    let is_admin: bool = query_scalar("SELECT is_admin FROM volunteers WHERE id = $1")
        .bind(me.id)
        .fetch_one(&mut tx)
        .await?;
    if !is_admin {
        return Err(Error::NotAuthorized("you are not permitted to perform this operation".into()));
    }
    let deleted: VolunteerRequest = query_as("DELETE FROM requests WHERE id = $1 RETURNING *")
        .bind(request_id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or_else(|| Error::NotFound(REQUEST_NOT_FOUND.into()))?;
    tx.commit().await?;
    Ok(Json(deleted))
}

pub async fn sender(request_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Volunteer>, Error> {
    let request_id = request_id.into_inner().0;
    let found: Volunteer = query_as(
        "SELECT v.id, v.name, v.surname, v.birth_date, v.contact, v.reputation
        FROM volunteers AS v
        JOIN requests AS r ON v.id = r.sender_id
        WHERE r.id = $1",
    )
    .bind(request_id)
    .fetch_optional(&mut db.acquire().await?)
    .await?
    .ok_or_else(|| Error::NotFound(REQUEST_NOT_FOUND.into()))?;
    Ok(Json(found))
}

pub async fn receiver(request_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Volunteer>, Error> {
    let request_id = request_id.into_inner().0;
    let found: Volunteer = query_as(
        "SELECT v.id, v.name, v.surname, v.birth_date, v.contact, v.reputation
        FROM volunteers AS v
        JOIN requests AS r ON v.id = r.receiver_id
        WHERE r.id = $1",
    )
    .bind(request_id)
    .fetch_optional(&mut db.acquire().await?)
    .await?
    .ok_or_else(|| Error::NotFound(REQUEST_NOT_FOUND.into()))?;
    Ok(Json(found))
}

pub async fn project(request_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Project>, Error> {
    let request_id = request_id.into_inner().0;
    let found: Project = query_as(
        "SELECT p.* FROM projects AS p JOIN requests AS r ON p.id = r.project_id WHERE r.id = $1",
    )
    .bind(request_id)
    .fetch_optional(&mut db.acquire().await?)
    .await?
    .ok_or_else(|| Error::NotFound(REQUEST_NOT_FOUND.into()))?;
    Ok(Json(found))
}

// Locks the request row so concurrent resolutions of the same request
// serialize on the database.
async fn fetch_for_update(tx: &mut Transaction<'_, Postgres>, request_id: i32) -> Result<VolunteerRequest, Error> {
    query_as("SELECT * FROM requests WHERE id = $1 FOR UPDATE")
        .bind(request_id)
        .fetch_optional(tx)
        .await?
        .ok_or_else(|| Error::NotFound(REQUEST_NOT_FOUND.into()))
}

/// Accepting a pending request adds the sender to the project roster
/// and marks the request accepted, both in one transaction.
pub async fn accept(me: VolunteerInfo, request_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<VolunteerRequest>, Error> {
    let request_id = request_id.into_inner().0;
    let mut tx = db.begin().await?;
    let found = fetch_for_update(&mut tx, request_id).await?;
    let owner_id: i32 = query_scalar("SELECT owner_id FROM projects WHERE id = $1")
        .bind(found.project_id)
        .fetch_one(&mut tx)
        .await?;
    found.ensure_resolvable_by(me.id, owner_id)?;
    query("INSERT INTO project_members (project_id, volunteer_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(found.project_id)
        .bind(found.sender_id)
        .execute(&mut tx)
        .await?;
    let updated: VolunteerRequest = query_as("UPDATE requests SET status = $1 WHERE id = $2 RETURNING *")
        .bind(RequestStatus::Accepted)
        .bind(request_id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(Json(updated))
}

/// Declining only flips the status, the roster is untouched.
pub async fn decline(me: VolunteerInfo, request_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<VolunteerRequest>, Error> {
    let request_id = request_id.into_inner().0;
    let mut tx = db.begin().await?;
    let found = fetch_for_update(&mut tx, request_id).await?;
    let owner_id: i32 = query_scalar("SELECT owner_id FROM projects WHERE id = $1")
        .bind(found.project_id)
        .fetch_one(&mut tx)
        .await?;
    found.ensure_resolvable_by(me.id, owner_id)?;
    let updated: VolunteerRequest = query_as("UPDATE requests SET status = $1 WHERE id = $2 RETURNING *")
        .bind(RequestStatus::Declined)
        .bind(request_id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(Json(updated))
}
