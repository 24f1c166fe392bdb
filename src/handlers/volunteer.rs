use sqlx::{query, query_as, query_scalar, PgPool, QueryBuilder};

use crate::actix_web::web::{Data, Json, Path, Query};
use crate::context::VolunteerInfo;
use crate::error::Error;
use crate::models::project::Project;
use crate::models::volunteer::{Volunteer, VolunteerUpdate};
use crate::request::Pagination;
use crate::response::{List, UpdateResponse};

static VOLUNTEER_NOT_FOUND: &str = "volunteer could not be found";

pub async fn list(Query(Pagination { page, size }): Query<Pagination>, db: Data<PgPool>) -> Result<Json<List<Volunteer>>, Error> {
    let mut conn = db.acquire().await?;
    let (total,): (i64,) = query_as("SELECT COUNT(*) FROM volunteers")
        .fetch_one(&mut conn)
        .await?;
    let volunteers = query_as(
        "SELECT id, name, surname, birth_date, contact, reputation
        FROM volunteers
        ORDER BY id
        LIMIT $1
        OFFSET $2",
    )
    .bind(size)
    .bind((page - 1) * size)
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(List::new(volunteers, total)))
}

pub async fn detail(volunteer_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Volunteer>, Error> {
    let volunteer_id = volunteer_id.into_inner().0;
    let found: Volunteer = query_as(
        "SELECT id, name, surname, birth_date, contact, reputation FROM volunteers WHERE id = $1",
    )
    .bind(volunteer_id)
    .fetch_optional(&mut db.acquire().await?)
    .await?
    .ok_or_else(|| Error::NotFound(VOLUNTEER_NOT_FOUND.into()))?;
    Ok(Json(found))
}

async fn string_collection(db: &PgPool, volunteer_id: i32, sql: &str) -> Result<Vec<String>, Error> {
    let mut conn = db.acquire().await?;
    let exists: bool = query_scalar("SELECT EXISTS(SELECT id FROM volunteers WHERE id = $1)")
        .bind(volunteer_id)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        return Err(Error::NotFound(VOLUNTEER_NOT_FOUND.into()));
    }
    let items = query_scalar(sql).bind(volunteer_id).fetch_all(&mut conn).await?;
    Ok(items)
}

pub async fn skills(volunteer_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Vec<String>>, Error> {
    let volunteer_id = volunteer_id.into_inner().0;
    let skills = string_collection(&db, volunteer_id, "SELECT skill FROM volunteer_skills WHERE volunteer_id = $1 ORDER BY skill").await?;
    Ok(Json(skills))
}

pub async fn interests(volunteer_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Vec<String>>, Error> {
    let volunteer_id = volunteer_id.into_inner().0;
    let interests = string_collection(&db, volunteer_id, "SELECT interest FROM volunteer_interests WHERE volunteer_id = $1 ORDER BY interest").await?;
    Ok(Json(interests))
}

// projects the volunteer participates in through the roster
pub async fn projects(volunteer_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Vec<Project>>, Error> {
    let volunteer_id = volunteer_id.into_inner().0;
    let mut conn = db.acquire().await?;
    let exists: bool = query_scalar("SELECT EXISTS(SELECT id FROM volunteers WHERE id = $1)")
        .bind(volunteer_id)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        return Err(Error::NotFound(VOLUNTEER_NOT_FOUND.into()));
    }
    let projects = query_as(
        "SELECT p.*
        FROM projects AS p
        JOIN project_members AS pm ON p.id = pm.project_id
        WHERE pm.volunteer_id = $1
        ORDER BY p.id",
    )
    .bind(volunteer_id)
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(projects))
}

/// Profile update, volunteers may only edit themselves. Skill and
/// interest lists are replaced wholesale.
pub async fn update(me: VolunteerInfo, volunteer_id: Path<(i32,)>, Json(data): Json<VolunteerUpdate>, db: Data<PgPool>) -> Result<Json<UpdateResponse>, Error> {
    let volunteer_id = volunteer_id.into_inner().0;
    if me.id != volunteer_id {
        return Err(Error::NotAuthorized("you are not permitted to perform this operation".into()));
    }
    let mut tx = db.begin().await?;
    let updated = query("UPDATE volunteers SET name = $1, surname = $2, birth_date = $3, contact = $4 WHERE id = $5")
        .bind(&data.name)
        .bind(&data.surname)
        .bind(data.birth_date)
        .bind(&data.contact)
        .bind(volunteer_id)
        .execute(&mut tx)
        .await?
        .rows_affected();
    if updated == 0 {
        return Err(Error::NotFound(VOLUNTEER_NOT_FOUND.into()));
    }
    query("DELETE FROM volunteer_skills WHERE volunteer_id = $1")
        .bind(volunteer_id)
        .execute(&mut tx)
        .await?;
    if !data.skills.is_empty() {
        QueryBuilder::new("INSERT INTO volunteer_skills (volunteer_id, skill)")
            .push_values(data.skills.iter(), |mut b, s| {
                b.push_bind(volunteer_id);
                b.push_bind(s);
            })
            .build()
            .execute(&mut tx)
            .await?;
    }
    query("DELETE FROM volunteer_interests WHERE volunteer_id = $1")
        .bind(volunteer_id)
        .execute(&mut tx)
        .await?;
    if !data.interests.is_empty() {
        QueryBuilder::new("INSERT INTO volunteer_interests (volunteer_id, interest)")
            .push_values(data.interests.iter(), |mut b, s| {
                b.push_bind(volunteer_id);
                b.push_bind(s);
            })
            .build()
            .execute(&mut tx)
            .await?;
    }
    tx.commit().await?;
    Ok(Json(UpdateResponse::new(updated as usize)))
}
