pub mod app;
pub mod config;
pub mod error;
pub mod publisher;
pub mod state;

pub mod api {
    pub mod errors;
    pub mod health;
    pub mod news;
    pub mod persons;
    pub mod search;
    pub mod settings;
    pub mod soon;
    pub mod upload;
    pub mod users;
    pub mod visitors;
    pub mod works;
}

pub mod auth {
    pub mod login;
    pub mod middleware;
    pub mod models;
    pub mod password;
    pub mod token;
}

pub mod db {
    pub mod models;
    pub mod news_repository;
    pub mod person_repository;
    pub mod pool;
    pub mod publication_repository;
    pub mod settings_repository;
    pub mod soon_repository;
    pub mod user_repository;
    pub mod visitor_repository;
}

pub mod models {
    pub mod search;
}

pub mod search {
    pub mod assemble;
    pub mod filter;
    pub mod pagination;
    pub mod predicate;
    pub mod service;
    pub mod store;
    pub mod tables;
}

pub mod storage {
    pub mod client;
}
