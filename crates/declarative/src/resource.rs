//! Resource trait for declarative lifecycle management
//!
//! A Resource is a remote object type that the engine can create, refresh,
//! update, delete, and import. State and plans are exchanged as typed
//! models; [`DynResource`] erases the model type so heterogeneous resources
//! can live in one [`Registry`].

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Result of refreshing one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<M> {
    /// The object exists; this is its refreshed state
    Present(M),
    /// The object is gone and should be dropped from state
    Gone,
}

impl<M> ReadOutcome<M> {
    /// Convert to an `Option`, mapping `Gone` to `None`.
    pub fn into_option(self) -> Option<M> {
        match self {
            Self::Present(model) => Some(model),
            Self::Gone => None,
        }
    }
}

/// Core trait for declarative resources
///
/// `C` is the provider context handed to every operation (typically the
/// configured API client).
///
/// # Example
///
/// ```ignore
/// use declarative::{ReadOutcome, Resource};
///
/// struct FlagResource;
///
/// impl Resource<ApiClient> for FlagResource {
///     type Model = FlagModel;
///
///     fn type_name(&self) -> &'static str { "shoehorn_feature_flag" }
///     fn replace_fields(&self) -> &'static [&'static str] { &["key"] }
///
///     fn create(&self, client: &ApiClient, plan: &FlagModel) -> anyhow::Result<FlagModel> {
///         client.create_flag(plan)
///     }
///     // ...
/// }
/// ```
pub trait Resource<C: ?Sized>: Send + Sync {
    /// Persisted shape of one instance
    type Model: Serialize + DeserializeOwned + Clone + fmt::Debug;

    /// Resource type name, e.g. `shoehorn_team`
    fn type_name(&self) -> &'static str;

    /// Attributes that cannot be changed in place
    ///
    /// Changing any of these plans a destroy-then-recreate.
    fn replace_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Create the object described by `plan` and return its state
    fn create(&self, ctx: &C, plan: &Self::Model) -> Result<Self::Model>;

    /// Refresh `state` from the remote side
    fn read(&self, ctx: &C, state: &Self::Model) -> Result<ReadOutcome<Self::Model>>;

    /// Converge `prior` to `plan` in place
    fn update(&self, ctx: &C, plan: &Self::Model, prior: &Self::Model) -> Result<Self::Model>;

    /// Remove the object (or detach it from state)
    fn delete(&self, ctx: &C, state: &Self::Model) -> Result<()>;

    /// Build the minimal state that identifies `id`
    ///
    /// The default rejects import. Implementations that support it parse
    /// the identifier into the fields [`Resource::read`] needs.
    fn import_seed(&self, id: &str) -> Result<Self::Model> {
        bail!(
            "{} does not support import (id {id:?})",
            Resource::<C>::type_name(self)
        )
    }

    /// Import an existing object by identifier
    fn import(&self, ctx: &C, id: &str) -> Result<Self::Model> {
        let seed = self.import_seed(id)?;
        match self.read(ctx, &seed)? {
            ReadOutcome::Present(model) => Ok(model),
            ReadOutcome::Gone => bail!("Cannot import non-existent remote object {id:?}"),
        }
    }
}

/// Object-safe view of a [`Resource`] exchanging JSON values
///
/// Implemented for every `Resource` by a blanket impl.
pub trait DynResource<C: ?Sized>: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn replace_fields(&self) -> &'static [&'static str];
    fn create_value(&self, ctx: &C, plan: &Value) -> Result<Value>;
    /// `None` means the instance should leave state
    fn read_value(&self, ctx: &C, state: &Value) -> Result<Option<Value>>;
    fn update_value(&self, ctx: &C, plan: &Value, prior: &Value) -> Result<Value>;
    fn delete_value(&self, ctx: &C, state: &Value) -> Result<()>;
    fn import_value(&self, ctx: &C, id: &str) -> Result<Value>;
}

fn from_value<R, C>(resource: &R, value: &Value, what: &str) -> Result<R::Model>
where
    R: Resource<C> + ?Sized,
    C: ?Sized,
{
    serde_json::from_value(value.clone())
        .with_context(|| format!("Invalid {what} for {}", Resource::<C>::type_name(resource)))
}

fn to_value<M: Serialize>(model: &M) -> Result<Value> {
    serde_json::to_value(model).context("Failed to serialize resource state")
}

impl<C: ?Sized, R: Resource<C>> DynResource<C> for R {
    fn type_name(&self) -> &'static str {
        <Self as Resource<C>>::type_name(self)
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        <Self as Resource<C>>::replace_fields(self)
    }

    fn create_value(&self, ctx: &C, plan: &Value) -> Result<Value> {
        let plan = from_value::<Self, C>(self, plan, "plan")?;
        to_value(&self.create(ctx, &plan)?)
    }

    fn read_value(&self, ctx: &C, state: &Value) -> Result<Option<Value>> {
        let state = from_value::<Self, C>(self, state, "state")?;
        self.read(ctx, &state)?
            .into_option()
            .map(|model| to_value(&model))
            .transpose()
    }

    fn update_value(&self, ctx: &C, plan: &Value, prior: &Value) -> Result<Value> {
        let plan = from_value::<Self, C>(self, plan, "plan")?;
        let prior = from_value::<Self, C>(self, prior, "state")?;
        to_value(&self.update(ctx, &plan, &prior)?)
    }

    fn delete_value(&self, ctx: &C, state: &Value) -> Result<()> {
        let state = from_value::<Self, C>(self, state, "state")?;
        self.delete(ctx, &state)
    }

    fn import_value(&self, ctx: &C, id: &str) -> Result<Value> {
        to_value(&self.import(ctx, id)?)
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource<C> = Box<dyn DynResource<C>>;

/// Resource types known to an engine, looked up by type name.
pub struct Registry<C: ?Sized> {
    resources: Vec<BoxedResource<C>>,
}

impl<C: ?Sized> Registry<C> {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Register a resource type. A later registration with the same name
    /// shadows the earlier one.
    pub fn register(&mut self, resource: BoxedResource<C>) {
        log::trace!("Registering resource type {}", resource.type_name());
        self.resources
            .retain(|r| r.type_name() != resource.type_name());
        self.resources.push(resource);
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn DynResource<C>> {
        self.resources
            .iter()
            .find(|r| r.type_name() == type_name)
            .map(Box::as_ref)
    }

    /// Look up a type, failing with a readable message.
    pub fn require(&self, type_name: &str) -> Result<&dyn DynResource<C>> {
        self.get(type_name)
            .with_context(|| format!("Unknown resource type: {type_name}"))
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.resources.iter().map(|r| r.type_name()).collect()
    }
}

impl<C: ?Sized> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}
