pub mod dashboard;
pub mod home;
pub mod landing;
pub mod not_found;
