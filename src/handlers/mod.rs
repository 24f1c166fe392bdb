pub mod category;
pub mod project;
pub mod request;
pub mod volunteer;

use sqlx::{query, query_as, PgPool};
use std::ops::Add;

use crate::actix_web::{
    http::StatusCode,
    web::{Data, Json},
    HttpResponse,
};
use crate::dotenv;
use crate::error::Error;
use crate::hex::ToHex;
use crate::middlewares::jwt::{Claim, JWT_SECRET};
use crate::models::volunteer::Account;
use crate::rand::{thread_rng, Rng};
use crate::serde::{Deserialize, Serialize};
use crate::sha2::{Digest, Sha256};
use crate::tokener::{Tokener, JWT};

fn hash_password(pass: &str, slt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(slt);
    hasher.finalize().encode_hex()
}

fn random_salt() -> String {
    let chars = vec![
        '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
        'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    ];
    let mut slt = String::new();
    let mut rng = thread_rng();
    for _ in 0..32 {
        let i = rng.gen_range(0..chars.len());
        slt.push(chars[i]);
    }
    slt
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthenticationResponse {
    pub token: String,
}

pub async fn login(Json(Login { email, password }): Json<Login>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let mut conn = db.acquire().await?;
    if let Some(account) = query_as::<_, Account>("SELECT id, email, password, salt, is_admin FROM volunteers WHERE email = $1")
        .bind(&email)
        .fetch_optional(&mut conn)
        .await?
    {
        if hash_password(&password, &account.salt) != account.password {
            return Ok(HttpResponse::build(StatusCode::FORBIDDEN).finish());
        }
        let claim = Claim {
            user: account.id.to_string(),
            exp: chrono::Utc::now().add(chrono::Duration::days(30)).timestamp(),
        };
        let secret = dotenv::var(JWT_SECRET)?;
        let tokener = JWT::new(secret.as_bytes().to_owned());
        let token = tokener.gen_token(&claim)?;
        return Ok(HttpResponse::build(StatusCode::OK).json(AuthenticationResponse { token }));
    }
    Err(Error::NotAuthorized("invalid email or password".into()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    name: String,
    surname: String,
    email: String,
    password: String,
}

pub async fn signup(
    Json(Signup {
        name,
        surname,
        email,
        password,
    }): Json<Signup>,
    db: Data<PgPool>,
) -> Result<HttpResponse, Error> {
    if email.is_empty() || password.is_empty() {
        return Err(Error::Validation("email and password must not be empty".into()));
    }
    let mut conn = db.acquire().await?;
    let slt = random_salt();
    query("INSERT INTO volunteers (name, surname, email, password, salt) VALUES ($1, $2, $3, $4, $5)")
        .bind(name)
        .bind(surname)
        .bind(email)
        .bind(hash_password(&password, &slt))
        .bind(slt)
        .execute(&mut conn)
        .await?;
    Ok(HttpResponse::build(StatusCode::OK).finish())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hash_password_is_deterministic_per_salt() {
        let a = hash_password("secret", "salt1");
        let b = hash_password("secret", "salt1");
        assert_eq!(a, b);
        let c = hash_password("secret", "salt2");
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_salt_length_and_charset() {
        let slt = random_salt();
        assert_eq!(slt.len(), 32);
        assert!(slt.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
