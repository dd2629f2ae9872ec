pub mod oauth2;
pub mod envelope;
pub mod export;
pub mod reqwest;
