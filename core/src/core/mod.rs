pub mod album_service;
pub mod storage;
