//! # Component Types
//!
//! Components are plain data records. The only requirement is that a fresh
//! value can be default-constructed, since [`ComponentPool::add`] creates
//! the record before handing it back for the caller to fill in.
//!
//! [`ComponentPool::add`]: super::ComponentPool::add

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Default`: `add` default-constructs the new record
/// - `Send + Sync`: a registry can be moved behind an external lock
/// - `'static`: pools are stored type-erased and recovered by downcast
///
/// Implemented automatically for every type meeting these bounds.
///
/// # Example
///
/// ```rust
/// #[derive(Default)]
/// struct Health {
///     current: u32,
///     max: u32,
/// }
///
/// fn assert_component<T: strata_core::Component>() {}
/// assert_component::<Health>();
/// ```
pub trait Component: Default + Send + Sync + 'static {}

impl<T: Default + Send + Sync + 'static> Component for T {}

/// Human-readable name of a component type, for error messages only.
#[inline]
#[must_use]
pub(crate) fn component_name<C: Component>() -> &'static str {
    std::any::type_name::<C>()
}
