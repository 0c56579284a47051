mod assets;
mod routes;

pub use routes::{AppState, LinksResponse, build_router, serve};
