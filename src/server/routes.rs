use super::assets::INDEX_HTML;
use crate::fs::{FileSystem, RealFs};
use crate::index::{DiagramNode, find_by_id, id_of, nodes_of};
use crate::links::{Edge, View};
use crate::loader::Loader;
use crate::model::TreeNode;
use crate::panel::{DetailPanel, PanelSubject};
use crate::render::{self, ArcDiagram, Dimensions, Renderer};
use crate::style;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const LOAD_FAILED: &str = "Failed to load codebase structure";
const NOT_FOUND: &str = "File not found";

/// Application state shared across handlers. Holds locations only; every
/// request re-reads the document, so no tree is shared between requests.
pub struct AppState {
    pub fs: Arc<dyn FileSystem>,
    pub structure: PathBuf,
    pub source_root: PathBuf,
    pub dims: Dimensions,
}

impl AppState {
    pub fn new(structure: &Path, source_root: &Path) -> Self {
        Self::with_fs(Arc::new(RealFs), structure, source_root)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, structure: &Path, source_root: &Path) -> Self {
        Self {
            fs,
            structure: structure.to_path_buf(),
            source_root: source_root.to_path_buf(),
            dims: Dimensions::default(),
        }
    }

    pub fn with_dimensions(mut self, dims: Dimensions) -> Self {
        self.dims = dims;
        self
    }

    fn loader(&self) -> Loader<'_> {
        Loader::new(self.fs.as_ref(), &self.structure, &self.source_root)
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/codebase", get(codebase_handler))
        .route("/api/source-code", get(source_code_handler))
        .route("/api/links", get(links_handler))
        .route("/api/details", get(details_handler))
        .route("/api/svg/{renderer}", get(svg_handler))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Start the HTTP server for the code map
pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
    open_browser: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let structure = state.structure.clone();
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let url = format!("http://{}", addr);

    style::header("codemap");
    style::status(&format!("Serving {}", style::path(&structure)));
    style::status(&format!("Open in browser: {}", style::url(&url)));
    style::hint("Press Ctrl+C to stop");

    if open_browser {
        if let Err(e) = open::that(&url) {
            style::warning(&format!("Could not open browser: {}", e));
        }
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `includeSource` is on only for the literal `true`.
fn flag(value: &Option<String>) -> bool {
    value.as_deref() == Some("true")
}

/// Load (and optionally hydrate) the tree off the async runtime.
async fn load_tree(state: Arc<AppState>, include_source: bool) -> Option<TreeNode> {
    tokio::task::spawn_blocking(move || {
        let loader = state.loader();
        let tree = loader.load();
        if include_source {
            loader.hydrate(tree)
        } else {
            tree
        }
    })
    .await
    .ok()
}

fn load_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": LOAD_FAILED })),
    )
        .into_response()
}

async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}

#[derive(Debug, Deserialize)]
struct CodebaseQuery {
    #[serde(rename = "includeSource")]
    include_source: Option<String>,
}

async fn codebase_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CodebaseQuery>,
) -> Response {
    let Some(tree) = load_tree(state, flag(&query.include_source)).await else {
        return load_failed();
    };
    match serde_json::to_value(&tree) {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            style::error(&format!("Error serializing codebase structure: {}", e));
            load_failed()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SourceQuery {
    path: Option<String>,
}

async fn source_code_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Response {
    let Some(path) = query.path else {
        return (StatusCode::NOT_FOUND, NOT_FOUND).into_response();
    };
    match state.loader().read_source(&path) {
        Ok(source) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            source,
        )
            .into_response(),
        Err(e) => {
            style::warning(&format!("Error reading source file: {}", e));
            (StatusCode::NOT_FOUND, NOT_FOUND).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct LinksQuery {
    view: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinksResponse {
    pub view: String,
    pub links: Vec<Edge>,
    pub nodes: Vec<DiagramNode>,
}

async fn links_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LinksQuery>,
) -> Response {
    let Some(tree) = load_tree(state, false).await else {
        return load_failed();
    };
    let name = query.view.unwrap_or_else(|| View::default().to_string());
    let links = crate::links::extract_named(&name, &tree);
    let nodes = nodes_of(&links);
    Json(LinksResponse {
        view: name,
        links,
        nodes,
    })
    .into_response()
}

/// Tree and treemap clicks send the node's pre-order `id`; the arc diagram
/// only knows a `name`, which resolves to its first occurrence.
#[derive(Debug, Deserialize)]
struct DetailsQuery {
    id: Option<usize>,
    name: Option<String>,
    #[serde(rename = "includeSource")]
    include_source: Option<String>,
}

async fn details_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetailsQuery>,
) -> Response {
    let include_source = flag(&query.include_source);
    let panel = tokio::task::spawn_blocking(move || {
        let loader = state.loader();
        let tree = loader.load();
        let id = match (query.id, query.name.as_deref()) {
            (Some(id), _) => id,
            (None, Some(name)) => match id_of(&tree, name) {
                Some(id) => id,
                None => {
                    return DetailPanel::build(PanelSubject::Minimal(&DiagramNode::new(name)));
                }
            },
            (None, None) => return DetailPanel::empty(),
        };
        // Only the selected file is read, never the whole tree.
        let node = if include_source {
            loader.hydrate_one(&tree, id)
        } else {
            find_by_id(&tree, id).cloned()
        };
        match node {
            Some(node) => DetailPanel::build(PanelSubject::Full(&node)),
            None => DetailPanel::empty(),
        }
    })
    .await;

    match panel {
        Ok(panel) => Json(panel).into_response(),
        Err(_) => load_failed(),
    }
}

#[derive(Debug, Deserialize)]
struct SvgQuery {
    links: Option<String>,
}

async fn svg_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(renderer): UrlPath<String>,
    Query(query): Query<SvgQuery>,
) -> Response {
    let Ok(renderer) = renderer.parse::<Renderer>() else {
        return (StatusCode::NOT_FOUND, format!("Unknown renderer: {}", renderer)).into_response();
    };
    let dims = state.dims;
    let Some(tree) = load_tree(state, false).await else {
        return load_failed();
    };

    let svg = match (renderer, query.links.as_deref()) {
        (Renderer::Arc, Some(view)) => {
            let mut diagram = ArcDiagram::new(&tree, dims);
            diagram.select(view);
            diagram.to_svg()
        }
        _ => render::render(renderer, &tree, dims, View::default()),
    };
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}
