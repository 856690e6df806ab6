// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider wrapper forwarding to another provider.

use crate::domain::Result;
use crate::ports::ConfigProvider;
use std::sync::Arc;

/// Forwards every operation to a wrapped provider.
///
/// Lets an application give a provider its own named type, for example to
/// register it in a dependency container, while the factory still builds it.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::StaticAccessor;
/// use livecfg::ports::ConfigProvider;
/// use livecfg::service::{ConfigProviderFactory, DelegatingProvider};
/// use serde::Deserialize;
/// use std::sync::Arc;
///
/// #[derive(Debug, Deserialize)]
/// struct RawServer {
///     port: u16,
/// }
///
/// pub struct ServerPort(DelegatingProvider<u16>);
///
/// # fn main() -> livecfg::domain::Result<()> {
/// let factory = ConfigProviderFactory::builder()
///     .with_accessor(Arc::new(StaticAccessor::from_yaml("port: 8080")?))
///     .build()?;
/// let port = ServerPort(DelegatingProvider::new(
///     factory.leaf::<RawServer>().build(|raw| raw.port),
/// ));
/// assert_eq!(*port.0.get_data()?, 8080);
/// # Ok(())
/// # }
/// ```
pub struct DelegatingProvider<T> {
    delegate: Arc<dyn ConfigProvider<T>>,
}

impl<T> DelegatingProvider<T> {
    /// Wraps `delegate`.
    pub fn new<P>(delegate: Arc<P>) -> Self
    where
        P: ConfigProvider<T> + 'static,
    {
        Self { delegate }
    }

    /// Wraps an already type-erased provider.
    pub fn from_dyn(delegate: Arc<dyn ConfigProvider<T>>) -> Self {
        Self { delegate }
    }

    /// The wrapped provider.
    pub fn delegate(&self) -> &Arc<dyn ConfigProvider<T>> {
        &self.delegate
    }
}

impl<T> Clone for DelegatingProvider<T> {
    fn clone(&self) -> Self {
        Self {
            delegate: Arc::clone(&self.delegate),
        }
    }
}

impl<T> ConfigProvider<T> for DelegatingProvider<T> {
    fn get_data(&self) -> Result<Arc<T>> {
        self.delegate.get_data()
    }

    fn probe(&self) -> Result<T> {
        self.delegate.probe()
    }

    fn refresh(&self) -> Result<bool> {
        self.delegate.refresh()
    }
}
