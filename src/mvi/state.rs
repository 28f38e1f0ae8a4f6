//! Base trait for observable state.

/// Marker trait for state objects.
///
/// States are replaced wholesale on every transition, never merged, so they
/// must be cheap to clone and comparable for change detection.
pub trait State: Clone + PartialEq + Default + Send + Sync + 'static {}
