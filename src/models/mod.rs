pub mod category;
pub mod project;
pub mod request;
pub mod volunteer;
