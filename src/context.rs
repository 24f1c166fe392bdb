use crate::actix_web::FromRequest;
use crate::actix_web::{self, Error, HttpMessage};
use std::future::{ready, Ready};

/// Identity of the authenticated volunteer, inserted into request
/// extensions by the JWT middleware.
#[derive(Debug, Clone)]
pub struct VolunteerInfo {
    pub id: i32,
}

impl FromRequest for VolunteerInfo {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &actix_web::HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(volunteer) = req.extensions().get::<Self>() {
            ready(Ok(volunteer.clone()))
        } else {
            ready(Err(actix_web::error::ErrorUnauthorized("")))
        }
    }
}
