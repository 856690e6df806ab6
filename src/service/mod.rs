// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer: providers, their shared cache and the factory creating them.

pub mod cache;
pub mod composite;
pub mod delegating;
pub mod factory;
pub mod leaf;
pub mod refresh;

pub use cache::CachedValue;
pub use composite::{CompositeProvider, ProviderLookup};
pub use delegating::DelegatingProvider;
pub use factory::{
    CompositeBuilder, ConfigProviderFactory, ConfigProviderFactoryBuilder, LeafBuilder,
};
pub use leaf::LeafProvider;
pub use refresh::RefreshTrigger;
