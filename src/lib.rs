pub mod api;
pub mod chrono_util;
pub mod commands;
pub mod config;
pub mod fs_json_util;
pub mod prompt;
pub mod rebase;
pub mod render;
pub mod report;
pub mod schema;
pub mod setting;
