pub mod compat;
pub mod config;
pub mod content;
pub mod error;
pub mod listing;
pub mod model;
pub mod page;
pub mod post;
pub mod render;
pub mod routes;
pub mod search;
pub mod seo;
pub mod templates;
pub mod text;
pub mod toc;
