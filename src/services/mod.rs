pub mod cloudinary;
pub mod error;
pub mod json_store;
pub mod media;
pub mod repository;
pub mod videos;

#[cfg(test)]
pub mod testing;
