//! The factories every engine appends after the user's own.
//!
//! Container factories dispatch on the [`typebind_core::Def`] a type
//! declares through its [`typebind_core::TypeOps`], and bind the adapters of
//! their element, value or field types once, when the container adapter is
//! created.

use std::sync::Arc;

use typebind_core::Instantiator;

use crate::{AdapterFactory, ToNumberStrategy, ValueCodecFactory};

mod scalars;
pub use scalars::ScalarFactory;

mod collections;
pub use collections::{ListFactory, MapFactory};

mod option;
pub use option::OptionFactory;

mod pointer;
pub use pointer::ArcFactory;

mod reflective;
pub use reflective::ReflectiveFactory;

/// The built-in chain, in order: the top-type codec, scalars, shared
/// pointers, options, lists, maps and finally reflected structs.
pub fn builtin_factories(
    numbers: Arc<dyn ToNumberStrategy>,
    instantiator: Instantiator,
) -> Vec<Arc<dyn AdapterFactory>> {
    vec![
        Arc::new(ValueCodecFactory::new(Arc::clone(&numbers))),
        Arc::new(ScalarFactory::new(numbers)),
        Arc::new(ArcFactory),
        Arc::new(OptionFactory),
        Arc::new(ListFactory),
        Arc::new(MapFactory),
        Arc::new(ReflectiveFactory::new(instantiator)),
    ]
}
