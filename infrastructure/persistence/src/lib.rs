pub mod db;
pub mod image {
    pub mod entity;
    pub mod repository;
}
