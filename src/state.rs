//! Base trait for state held by a [`Store`](crate::store::Store).

use crate::domain::ApplicationState;

/// Marker trait for store state.
///
/// States should be:
/// - Cheap to clone (large parts shared behind `Arc`)
/// - Self-contained (everything needed to render a page)
/// - Defaultable (the server-safe placeholder)
pub trait StoreState: Clone + Default + Send + Sync + 'static {}

impl StoreState for ApplicationState {}
