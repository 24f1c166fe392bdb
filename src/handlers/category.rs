use sqlx::{query_as, query_scalar, PgPool};

use crate::actix_web::http::StatusCode;
use crate::actix_web::web::{Data, Json, Path, Query};
use crate::actix_web::HttpResponse;
use crate::context::VolunteerInfo;
use crate::error::Error;
use crate::models::category::{Category, CategoryCreation};
use crate::request::Pagination;
use crate::response::List;

static CATEGORY_NOT_FOUND: &str = "category could not be found";

async fn ensure_admin(db: &PgPool, volunteer_id: i32) -> Result<(), Error> {
    let is_admin: bool = query_scalar("SELECT is_admin FROM volunteers WHERE id = $1")
        .bind(volunteer_id)
        .fetch_one(&mut db.acquire().await?)
        .await?;
    if !is_admin {
        return Err(Error::NotAuthorized("you are not permitted to perform this operation".into()));
    }
    Ok(())
}

pub async fn create(me: VolunteerInfo, Json(CategoryCreation { name, description }): Json<CategoryCreation>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    ensure_admin(&db, me.id).await?;
    if name.is_empty() {
        return Err(Error::Validation("category name must not be empty".into()));
    }
    let created: Category = query_as("INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING *")
        .bind(name)
        .bind(description)
        .fetch_one(&mut db.acquire().await?)
        .await?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(created))
}

pub async fn list(Query(Pagination { page, size }): Query<Pagination>, db: Data<PgPool>) -> Result<Json<List<Category>>, Error> {
    let mut conn = db.acquire().await?;
    let (total,): (i64,) = query_as("SELECT COUNT(*) FROM categories")
        .fetch_one(&mut conn)
        .await?;
    let categories = query_as("SELECT * FROM categories ORDER BY id LIMIT $1 OFFSET $2")
        .bind(size)
        .bind((page - 1) * size)
        .fetch_all(&mut conn)
        .await?;
    Ok(Json(List::new(categories, total)))
}

pub async fn detail(category_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Category>, Error> {
    let category_id = category_id.into_inner().0;
    let found: Category = query_as("SELECT * FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&mut db.acquire().await?)
        .await?
        .ok_or_else(|| Error::NotFound(CATEGORY_NOT_FOUND.into()))?;
    Ok(Json(found))
}

pub async fn delete_category(me: VolunteerInfo, category_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<Category>, Error> {
    ensure_admin(&db, me.id).await?;
    let category_id = category_id.into_inner().0;
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM projects_categories WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut tx)
        .await?;
    let deleted: Category = query_as("DELETE FROM categories WHERE id = $1 RETURNING *")
        .bind(category_id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or_else(|| Error::NotFound(CATEGORY_NOT_FOUND.into()))?;
    tx.commit().await?;
    Ok(Json(deleted))
}
