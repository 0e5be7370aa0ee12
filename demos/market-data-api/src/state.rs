/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Async projector. Dispatches the blocking download and simulation work
    /// to a thread pool internally.
    pub projector: price_projector::AsyncPriceProjector,
}
