use sqlx::{query, query_as, query_scalar, PgPool, QueryBuilder};

use crate::actix_web::http::StatusCode;
use crate::actix_web::web::{Data, Json, Path, Query};
use crate::actix_web::HttpResponse;
use crate::context::VolunteerInfo;
use crate::error::Error;
use crate::models::category::Category;
use crate::models::project::{Project, ProjectCreation};
use crate::models::volunteer::Volunteer;
use crate::request::Pagination;
use crate::response::{DeleteResponse, List, UpdateResponse};

static PROJECT_NOT_FOUND: &str = "project could not be found";
static NOT_OWNER: &str = "you are not the owner of this project";

/// The creator becomes the owner and the first member of the roster.
pub async fn create(me: VolunteerInfo, Json(ProjectCreation { name, description }): Json<ProjectCreation>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    if name.is_empty() {
        return Err(Error::Validation("project name must not be empty".into()));
    }
    let mut tx = db.begin().await?;
    let created: Project = query_as("INSERT INTO projects (name, description, owner_id) VALUES ($1, $2, $3) RETURNING *")
        .bind(name)
        .bind(description)
        .bind(me.id)
        .fetch_one(&mut tx)
        .await?;
    query("INSERT INTO project_members (project_id, volunteer_id) VALUES ($1, $2)")
        .bind(created.id)
        .bind(me.id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(created))
}

pub async fn list(Query(Pagination { page, size }): Query<Pagination>, db: Data<PgPool>) -> Result<Json<List<Project>>, Error> {
    let mut conn = db.acquire().await?;
    let (total,): (i64,) = query_as("SELECT COUNT(*) FROM projects")
        .fetch_one(&mut conn)
        .await?;
    let projects = query_as("SELECT * FROM projects ORDER BY id LIMIT $1 OFFSET $2")
        .bind(size)
        .bind((page - 1) * size)
        .fetch_all(&mut conn)
        .await?;
    Ok(Json(List::new(projects, total)))
}

pub async fn detail(project_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Project>, Error> {
    let project_id = project_id.into_inner().0;
    let found: Project = query_as("SELECT * FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(&mut db.acquire().await?)
        .await?
        .ok_or_else(|| Error::NotFound(PROJECT_NOT_FOUND.into()))?;
    Ok(Json(found))
}

// the roster
pub async fn volunteers(project_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Vec<Volunteer>>, Error> {
    let project_id = project_id.into_inner().0;
    let mut conn = db.acquire().await?;
    let exists: bool = query_scalar("SELECT EXISTS(SELECT id FROM projects WHERE id = $1)")
        .bind(project_id)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        return Err(Error::NotFound(PROJECT_NOT_FOUND.into()));
    }
    let members = query_as(
        "SELECT v.id, v.name, v.surname, v.birth_date, v.contact, v.reputation
        FROM volunteers AS v
        JOIN project_members AS pm ON v.id = pm.volunteer_id
        WHERE pm.project_id = $1
        ORDER BY v.id",
    )
    .bind(project_id)
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(members))
}

pub async fn categories(project_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Vec<Category>>, Error> {
    let project_id = project_id.into_inner().0;
    let mut conn = db.acquire().await?;
    let exists: bool = query_scalar("SELECT EXISTS(SELECT id FROM projects WHERE id = $1)")
        .bind(project_id)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        return Err(Error::NotFound(PROJECT_NOT_FOUND.into()));
    }
    let categories = query_as(
        "SELECT c.*
        FROM categories AS c
        JOIN projects_categories AS pc ON c.id = pc.category_id
        WHERE pc.project_id = $1
        ORDER BY c.id",
    )
    .bind(project_id)
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(categories))
}

async fn ensure_owner(db: &PgPool, project_id: i32, volunteer_id: i32) -> Result<(), Error> {
    let owner_id: i32 = query_scalar("SELECT owner_id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(&mut db.acquire().await?)
        .await?
        .ok_or_else(|| Error::NotFound(PROJECT_NOT_FOUND.into()))?;
    if owner_id != volunteer_id {
        return Err(Error::NotAuthorized(NOT_OWNER.into()));
    }
    Ok(())
}

pub async fn update(me: VolunteerInfo, project_id: Path<(i32,)>, Json(ProjectCreation { name, description }): Json<ProjectCreation>, db: Data<PgPool>) -> Result<Json<UpdateResponse>, Error> {
    let project_id = project_id.into_inner().0;
    ensure_owner(&db, project_id, me.id).await?;
    let updated = query("UPDATE projects SET name = $1, description = $2 WHERE id = $3")
        .bind(name)
        .bind(description)
        .bind(project_id)
        .execute(&mut db.acquire().await?)
        .await?
        .rows_affected();
    Ok(Json(UpdateResponse::new(updated as usize)))
}

/// Replaces the project's category tags, owner only.
pub async fn set_categories(me: VolunteerInfo, project_id: Path<(i32,)>, Json(category_ids): Json<Vec<i32>>, db: Data<PgPool>) -> Result<Json<UpdateResponse>, Error> {
    let project_id = project_id.into_inner().0;
    ensure_owner(&db, project_id, me.id).await?;
    let mut tx = db.begin().await?;
    query("DELETE FROM projects_categories WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut tx)
        .await?;
    if !category_ids.is_empty() {
        QueryBuilder::new("INSERT INTO projects_categories (project_id, category_id)")
            .push_values(category_ids.iter(), |mut b, c| {
                b.push_bind(project_id);
                b.push_bind(c);
            })
            .build()
            .execute(&mut tx)
            .await?;
    }
    tx.commit().await?;
    Ok(Json(UpdateResponse::new(category_ids.len())))
}

pub async fn delete_project(me: VolunteerInfo, project_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<DeleteResponse>, Error> {
    let project_id = project_id.into_inner().0;
    ensure_owner(&db, project_id, me.id).await?;
    let mut tx = db.begin().await?;
    query("DELETE FROM project_members WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut tx)
        .await?;
    query("DELETE FROM projects_categories WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut tx)
        .await?;
    query("DELETE FROM requests WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut tx)
        .await?;
    let deleted = query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(&mut tx)
        .await?
        .rows_affected();
    tx.commit().await?;
    Ok(Json(DeleteResponse::new(deleted as usize)))
}
