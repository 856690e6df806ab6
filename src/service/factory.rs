// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider factory wiring accessors, prefixes and the event manager together.

use crate::adapters::{InMemoryEventBus, PrefixRegistry, PropertyAccessor};
use crate::domain::{ConfigError, Result, ShapeId};
use crate::ports::{
    ConfigAccessor, ConfigChangeAware, ConfigEventManager, ConfigSource, DependencyProvider,
    PrefixResolver, PublicConfig,
};
use crate::service::{CompositeProvider, LeafProvider, ProviderLookup, RefreshTrigger};
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Creates providers that share one accessor, prefix resolver and event manager.
///
/// Every provider the factory builds is subscribed to the event manager, so it
/// takes part in change cascades and refresh broadcasts as soon as it exists.
/// The event manager only keeps weak references: a provider that the
/// application drops is unsubscribed automatically.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::StaticAccessor;
/// use livecfg::ports::ConfigProvider;
/// use livecfg::service::ConfigProviderFactory;
/// use serde::Deserialize;
/// use std::sync::Arc;
///
/// #[derive(Debug, Deserialize)]
/// struct RawDatabase {
///     host: String,
///     port: u16,
/// }
///
/// # fn main() -> livecfg::domain::Result<()> {
/// let accessor = Arc::new(StaticAccessor::from_yaml("database:\n  host: db\n  port: 5432\n")?);
/// let factory = ConfigProviderFactory::builder()
///     .with_accessor(accessor.clone())
///     .with_prefix::<RawDatabase>("database")
///     .build()?;
///
/// let url = factory
///     .leaf::<RawDatabase>()
///     .build(|raw| format!("postgres://{}:{}", raw.host, raw.port));
/// assert_eq!(*url.get_data()?, "postgres://db:5432");
///
/// accessor.set_yaml("database:\n  host: db2\n  port: 5432\n")?;
/// factory.refresh_all();
/// assert_eq!(*url.get_data()?, "postgres://db2:5432");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConfigProviderFactory {
    accessor: Arc<dyn ConfigAccessor>,
    prefixes: Arc<dyn PrefixResolver>,
    events: Arc<dyn ConfigEventManager>,
    properties: Option<Arc<PropertyAccessor>>,
}

impl ConfigProviderFactory {
    /// Creates a factory from its three collaborators.
    pub fn new(
        accessor: Arc<dyn ConfigAccessor>,
        prefixes: Arc<dyn PrefixResolver>,
        events: Arc<dyn ConfigEventManager>,
    ) -> Self {
        Self {
            accessor,
            prefixes,
            events,
            properties: None,
        }
    }

    /// Returns a builder for a factory.
    pub fn builder() -> ConfigProviderFactoryBuilder {
        ConfigProviderFactoryBuilder::new()
    }

    /// Creates a factory reading environment variables and, when present,
    /// `config.yaml` from the application's platform configuration directory.
    ///
    /// ```rust,no_run
    /// use livecfg::service::ConfigProviderFactory;
    ///
    /// # fn main() -> livecfg::domain::Result<()> {
    /// let factory = ConfigProviderFactory::with_defaults("myapp", "com.example")?;
    /// # Ok(())
    /// # }
    /// ```
    #[allow(unused_variables)]
    pub fn with_defaults(app_name: &str, qualifier: &str) -> Result<Self> {
        #[allow(unused_mut)]
        let mut builder = Self::builder();

        #[cfg(feature = "env")]
        {
            builder = builder.with_env_vars();
        }

        #[cfg(feature = "yaml")]
        {
            use crate::adapters::YamlFileAdapter;
            match YamlFileAdapter::from_default_location(app_name, qualifier) {
                Ok(adapter) => builder = builder.with_source(Box::new(adapter)),
                Err(e) => tracing::debug!("No default configuration file for '{}': {}", app_name, e),
            }
        }

        builder.build()
    }

    /// The accessor shared by every leaf provider.
    pub fn accessor(&self) -> &Arc<dyn ConfigAccessor> {
        &self.accessor
    }

    /// The event manager every provider is subscribed to.
    pub fn event_manager(&self) -> &Arc<dyn ConfigEventManager> {
        &self.events
    }

    /// The property accessor, when the factory was built from property sources.
    pub fn property_accessor(&self) -> Option<&Arc<PropertyAccessor>> {
        self.properties.as_ref()
    }

    /// Creates a provider whose public value is the raw shape `R` itself.
    ///
    /// Its raw and public shape are both `ShapeId::of::<R>()`, so every leaf
    /// reading `R` refreshes when it publishes a change.
    pub fn raw<R>(&self) -> Arc<LeafProvider<R>>
    where
        R: DeserializeOwned + PublicConfig,
    {
        self.leaf::<R>().build(|raw| raw)
    }

    /// Starts building a provider that reads the raw shape `R`.
    pub fn leaf<R>(&self) -> LeafBuilder<'_, R>
    where
        R: DeserializeOwned + 'static,
    {
        LeafBuilder {
            factory: self,
            raw_shape: ShapeId::of::<R>(),
            prefix: PrefixChoice::Registered,
            shape: None,
            _raw: PhantomData,
        }
    }

    /// Starts building a provider composed from other providers.
    pub fn composite(&self) -> CompositeBuilder<'_> {
        CompositeBuilder {
            factory: self,
            members: Vec::new(),
            shape: None,
        }
    }

    /// Broadcasts one refresh signal to every live provider.
    pub fn refresh_all(&self) {
        RefreshTrigger::new(Arc::clone(&self.events)).trigger();
    }

    /// Returns a trigger that reloads the property sources (if any) and then
    /// broadcasts a refresh signal. Hand its callback to a watcher.
    pub fn refresh_trigger(&self) -> RefreshTrigger {
        let trigger = RefreshTrigger::new(Arc::clone(&self.events));
        match &self.properties {
            Some(properties) => trigger.with_reloadable(Arc::clone(properties)),
            None => trigger,
        }
    }

    fn subscribe<P>(&self, provider: P) -> Arc<P>
    where
        P: ConfigChangeAware + 'static,
    {
        let provider = Arc::new(provider);
        let subscriber: Arc<dyn ConfigChangeAware> = provider.clone();
        self.events.subscribe(subscriber);
        provider
    }
}

impl fmt::Debug for ConfigProviderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigProviderFactory")
            .field("accessor", &self.accessor.name())
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// Maps a builder's own error type into [`ConfigError`].
///
/// A builder that already fails with a `ConfigError` (typically a lookup
/// error inside a composite) keeps it as is.
fn builder_error(shape: &ShapeId, err: impl Into<BoxError>) -> ConfigError {
    match err.into().downcast::<ConfigError>() {
        Ok(config_error) => *config_error,
        Err(other) => ConfigError::builder_failure(shape.as_str(), other),
    }
}

enum PrefixChoice {
    Registered,
    Explicit(String),
    Root,
}

/// Options for a new [`LeafProvider`], returned by [`ConfigProviderFactory::leaf`].
#[must_use = "a provider is only created by `build` or `try_build`"]
pub struct LeafBuilder<'f, R> {
    factory: &'f ConfigProviderFactory,
    raw_shape: ShapeId,
    prefix: PrefixChoice,
    shape: Option<ShapeId>,
    _raw: PhantomData<fn() -> R>,
}

impl<'f, R> LeafBuilder<'f, R>
where
    R: DeserializeOwned + 'static,
{
    /// Reads the raw shape under `prefix` instead of the registered one.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = PrefixChoice::Explicit(prefix.into());
        self
    }

    /// Reads the raw shape from the root of the store, ignoring the registry.
    pub fn no_prefix(mut self) -> Self {
        self.prefix = PrefixChoice::Root;
        self
    }

    /// Overrides the raw shape id (default `ShapeId::of::<R>()`).
    pub fn raw_shape(mut self, shape: impl Into<ShapeId>) -> Self {
        self.raw_shape = shape.into();
        self
    }

    /// Overrides the public shape id (default `ShapeId::of::<T>()`).
    pub fn shape(mut self, shape: impl Into<ShapeId>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Creates the provider with an infallible builder.
    pub fn build<T, F>(self, builder: F) -> Arc<LeafProvider<T>>
    where
        T: PublicConfig,
        F: Fn(R) -> T + Send + Sync + 'static,
    {
        self.finish(move |raw| Ok(builder(raw)))
    }

    /// Creates the provider with a fallible builder.
    ///
    /// Builder errors surface from `get_data`, `probe` and `refresh` as
    /// [`ConfigError::BuilderFailure`], unless they already are a `ConfigError`.
    pub fn try_build<T, E, F>(self, builder: F) -> Arc<LeafProvider<T>>
    where
        T: PublicConfig,
        E: Into<BoxError>,
        F: Fn(R) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        let shape = self.public_shape::<T>();
        self.finish(move |raw| builder(raw).map_err(|e| builder_error(&shape, e)))
    }

    fn public_shape<T: 'static>(&self) -> ShapeId {
        self.shape.clone().unwrap_or_else(ShapeId::of::<T>)
    }

    fn finish<T, F>(self, builder: F) -> Arc<LeafProvider<T>>
    where
        T: PublicConfig,
        F: Fn(R) -> Result<T> + Send + Sync + 'static,
    {
        let shape = self.public_shape::<T>();
        let prefix = match self.prefix {
            PrefixChoice::Registered => self.factory.prefixes.resolve_prefix(&self.raw_shape),
            PrefixChoice::Explicit(prefix) => Some(prefix),
            PrefixChoice::Root => None,
        };

        let provider = LeafProvider::new::<R, F>(
            Arc::clone(&self.factory.accessor),
            Arc::clone(&self.factory.events),
            self.raw_shape,
            prefix,
            shape,
            builder,
        );
        tracing::debug!(
            "Created {} for '{}' from raw '{}' (prefix {:?})",
            provider.id(),
            provider.shape(),
            provider.raw_shape(),
            provider.prefix()
        );
        self.factory.subscribe(provider)
    }
}

/// Options for a new [`CompositeProvider`], returned by
/// [`ConfigProviderFactory::composite`].
#[must_use = "a provider is only created by `build` or `try_build`"]
pub struct CompositeBuilder<'f> {
    factory: &'f ConfigProviderFactory,
    members: Vec<Arc<dyn DependencyProvider>>,
    shape: Option<ShapeId>,
}

impl<'f> CompositeBuilder<'f> {
    /// Adds a member. Lookups match members in the order they were added.
    pub fn member<P>(mut self, provider: &Arc<P>) -> Self
    where
        P: DependencyProvider + 'static,
    {
        let member: Arc<dyn DependencyProvider> = provider.clone();
        self.members.push(member);
        self
    }

    /// Adds already type-erased members.
    pub fn members<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DependencyProvider>>,
    {
        self.members.extend(providers);
        self
    }

    /// Overrides the public shape id (default `ShapeId::of::<T>()`).
    pub fn shape(mut self, shape: impl Into<ShapeId>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Creates the composite.
    ///
    /// Every [`ProviderLookup::get`] is fallible, so the builder returns this
    /// crate's [`Result`] and lookup errors propagate with `?`, unchanged.
    /// Use [`CompositeBuilder::try_build`] when the builder has errors of its
    /// own type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livecfg::prelude::*;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct RawServer {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// # fn main() -> Result<()> {
    /// let factory = ConfigProviderFactory::builder()
    ///     .with_cli_args(vec!["--server.host=db", "--server.port=5432"])
    ///     .with_prefix::<RawServer>("server")
    ///     .build()?;
    /// let host = factory.leaf::<RawServer>().shape("host").build(|raw| raw.host);
    /// let port = factory.leaf::<RawServer>().shape("port").build(|raw| raw.port);
    ///
    /// let address = factory
    ///     .composite()
    ///     .member(&host)
    ///     .member(&port)
    ///     .build(|lookup| {
    ///         let host: String = lookup.get_shape(&ShapeId::new("host"))?;
    ///         let port: u16 = lookup.get_shape(&ShapeId::new("port"))?;
    ///         Ok(format!("{}:{}", host, port))
    ///     });
    /// assert_eq!(*address.get_data()?, "db:5432");
    /// # Ok(())
    /// # }
    /// ```
    pub fn build<T, F>(self, builder: F) -> Arc<CompositeProvider<T>>
    where
        T: PublicConfig,
        F: Fn(&ProviderLookup<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.finish(builder)
    }

    /// Creates the composite with a fallible builder.
    ///
    /// Errors from lookups (`?` on [`ProviderLookup::get`]) come back unchanged;
    /// other errors become [`ConfigError::BuilderFailure`].
    pub fn try_build<T, E, F>(self, builder: F) -> Arc<CompositeProvider<T>>
    where
        T: PublicConfig,
        E: Into<BoxError>,
        F: Fn(&ProviderLookup<'_>) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        let shape = self.public_shape::<T>();
        self.finish(move |lookup| builder(lookup).map_err(|e| builder_error(&shape, e)))
    }

    fn public_shape<T: 'static>(&self) -> ShapeId {
        self.shape.clone().unwrap_or_else(ShapeId::of::<T>)
    }

    fn finish<T, F>(self, compose: F) -> Arc<CompositeProvider<T>>
    where
        T: PublicConfig,
        F: Fn(&ProviderLookup<'_>) -> Result<T> + Send + Sync + 'static,
    {
        let shape = self.public_shape::<T>();
        let provider = CompositeProvider::new(
            self.members,
            Arc::clone(&self.factory.events),
            shape,
            compose,
        );
        tracing::debug!(
            "Created composite {} for '{}' over {:?}",
            provider.id(),
            provider.shape(),
            provider.member_ids()
        );
        self.factory.subscribe(provider)
    }
}

/// Builder for a [`ConfigProviderFactory`].
///
/// Without [`with_accessor`](Self::with_accessor) the factory reads from a
/// [`PropertyAccessor`] over the sources added here. The event manager defaults
/// to an [`InMemoryEventBus`] and prefixes to the registrations made with
/// [`with_prefix`](Self::with_prefix).
///
/// # Examples
///
/// ```rust
/// use livecfg::service::ConfigProviderFactory;
///
/// # fn main() -> livecfg::domain::Result<()> {
/// let factory = ConfigProviderFactory::builder()
///     .with_env_prefix("MYAPP_")
///     .with_cli_args(vec!["--server.port=8080"])
///     .build()?;
/// assert_eq!(
///     factory.property_accessor().unwrap().source_names(),
///     vec!["cli", "env"]
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ConfigProviderFactoryBuilder {
    accessor: Option<Arc<dyn ConfigAccessor>>,
    sources: Vec<Box<dyn ConfigSource>>,
    registry: PrefixRegistry,
    resolver: Option<Arc<dyn PrefixResolver>>,
    events: Option<Arc<dyn ConfigEventManager>>,
}

impl ConfigProviderFactoryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `accessor` for every raw lookup. Property sources added to the
    /// builder are then ignored.
    pub fn with_accessor(mut self, accessor: Arc<dyn ConfigAccessor>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Adds a property source.
    pub fn with_source(mut self, source: Box<dyn ConfigSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds every process environment variable as a property source.
    #[cfg(feature = "env")]
    pub fn with_env_vars(self) -> Self {
        use crate::adapters::EnvVarAdapter;
        self.with_source(Box::new(EnvVarAdapter::new()))
    }

    /// Adds the environment variables starting with `prefix` as a property source.
    #[cfg(feature = "env")]
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        use crate::adapters::EnvVarAdapter;
        self.with_source(Box::new(EnvVarAdapter::with_prefix(prefix)))
    }

    /// Adds command-line arguments as a property source.
    #[cfg(feature = "cli")]
    pub fn with_cli_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        use crate::adapters::CommandLineAdapter;
        self.with_source(Box::new(CommandLineAdapter::from_args(args)))
    }

    /// Adds a YAML file as a property source.
    #[cfg(feature = "yaml")]
    pub fn with_yaml_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        use crate::adapters::YamlFileAdapter;
        let adapter = YamlFileAdapter::from_file(path)?;
        Ok(self.with_source(Box::new(adapter)))
    }

    /// Registers the namespace prefix for raw shape `R`.
    pub fn with_prefix<R: 'static>(mut self, prefix: impl Into<String>) -> Self {
        self.registry = self.registry.register::<R>(prefix);
        self
    }

    /// Registers the namespace prefix for an explicit raw shape id.
    pub fn with_shape_prefix(mut self, shape: impl Into<ShapeId>, prefix: impl Into<String>) -> Self {
        self.registry = self.registry.register_shape(shape, prefix);
        self
    }

    /// Uses a custom prefix resolver. Prefixes registered on the builder are
    /// then ignored.
    pub fn with_prefix_resolver(mut self, resolver: Arc<dyn PrefixResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Uses a custom event manager.
    pub fn with_event_manager(mut self, events: Arc<dyn ConfigEventManager>) -> Self {
        self.events = Some(events);
        self
    }

    /// Builds the factory.
    pub fn build(self) -> Result<ConfigProviderFactory> {
        let (accessor, properties) = match self.accessor {
            Some(accessor) => {
                if !self.sources.is_empty() {
                    tracing::warn!(
                        "Ignoring {} property source(s): an explicit accessor '{}' was given",
                        self.sources.len(),
                        accessor.name()
                    );
                }
                (accessor, None)
            }
            None => {
                let properties = Arc::new(PropertyAccessor::new());
                for source in self.sources {
                    properties.add_source(source);
                }
                let accessor: Arc<dyn ConfigAccessor> = properties.clone();
                (accessor, Some(properties))
            }
        };

        if self.resolver.is_some() && !self.registry.is_empty() {
            tracing::warn!(
                "Ignoring {} registered prefix(es): a custom prefix resolver was given",
                self.registry.len()
            );
        }
        let prefixes: Arc<dyn PrefixResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(self.registry),
        };
        let events: Arc<dyn ConfigEventManager> = match self.events {
            Some(events) => events,
            None => Arc::new(InMemoryEventBus::new()),
        };

        tracing::debug!("Built provider factory over accessor '{}'", accessor.name());
        Ok(ConfigProviderFactory {
            accessor,
            prefixes,
            events,
            properties,
        })
    }
}
