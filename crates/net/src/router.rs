use axum::routing::MethodRouter;
use axum::Router;
use tracing::debug;

/// A path together with the router that serves it.
pub type Component<S> = (String, Router<S>);


/// Registers `path` once with every method `methods` answers. Methods not in
/// `methods` get a 405 from axum.
pub fn route_builder<S>(path: &str, methods: MethodRouter<S>) -> Component<S>
where
    S: Clone + Send + Sync + 'static,
{
    (path.to_string(), Router::new().route(path, methods))
}


pub fn main_router<S>(components: Vec<Component<S>>, state: S) -> Router
where
    S: Clone + Send + Sync + 'static,
{
    components
        .into_iter()
        .fold(Router::new(), |app, (path, router)| {
            debug!(%path, "Route registered");
            app.merge(router)
        })
        .with_state(state)
}
