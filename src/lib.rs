pub mod auth {
    pub mod identity;
    pub mod keyring;
    pub mod session_store;
}

pub mod cli {
    pub mod commands;
    pub mod display;
    pub mod parser;
    pub mod prompts;
    pub mod runtime_config;
    pub mod table;
}

pub mod core {
    pub mod client;
    pub mod errors;
    pub mod models;
    pub mod password_policy;
    pub mod paths;
    pub mod service;
}

pub mod storage {
    pub mod app;
    pub mod memory;
    pub mod mongo;
    pub mod postgres;
    pub mod sqlite;
    pub mod r#trait;
}
