//! Generational handle registry for applications and windows.
//!
//! # Responsibility
//! - Allocate fresh handles for newly constructed resources.
//! - Resolve handles with kind checking.
//! - Invalidate handles and hand ownership of the resource back to the caller.
//!
//! # Invariants
//! - A resolved handle always refers to a resource of the handle's kind.
//! - An invalidated handle never resolves again, even after its slot is reused.
//! - Invalidation does not tear anything down; the caller owns the returned
//!   resource and decides what destruction means.

use super::{ApplicationHandle, ResourceKey, ResourceKind, TypedHandle, WindowHandle};
use crate::error::{CoreError, CoreResult};
use crate::model::application::Application;
use crate::model::window::Window;
use slotmap::SlotMap;

/// Registry entry. One arena holds both kinds so handle values never collide.
#[derive(Debug)]
pub enum Resource {
    Application(Application),
    Window(Window),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Application(_) => ResourceKind::Application,
            Self::Window(_) => ResourceKind::Window,
        }
    }
}

/// A resource type that can live in the registry under a typed handle.
pub trait Registered: Sized {
    type Handle: TypedHandle;

    fn into_resource(self) -> Resource;
    fn from_resource(resource: &Resource) -> Option<&Self>;
    fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self>;
    fn from_owned(resource: Resource) -> Option<Self>;
}

impl Registered for Application {
    type Handle = ApplicationHandle;

    fn into_resource(self) -> Resource {
        Resource::Application(self)
    }

    fn from_resource(resource: &Resource) -> Option<&Self> {
        match resource {
            Resource::Application(app) => Some(app),
            Resource::Window(_) => None,
        }
    }

    fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self> {
        match resource {
            Resource::Application(app) => Some(app),
            Resource::Window(_) => None,
        }
    }

    fn from_owned(resource: Resource) -> Option<Self> {
        match resource {
            Resource::Application(app) => Some(app),
            Resource::Window(_) => None,
        }
    }
}

impl Registered for Window {
    type Handle = WindowHandle;

    fn into_resource(self) -> Resource {
        Resource::Window(self)
    }

    fn from_resource(resource: &Resource) -> Option<&Self> {
        match resource {
            Resource::Window(window) => Some(window),
            Resource::Application(_) => None,
        }
    }

    fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self> {
        match resource {
            Resource::Window(window) => Some(window),
            Resource::Application(_) => None,
        }
    }

    fn from_owned(resource: Resource) -> Option<Self> {
        match resource {
            Resource::Window(window) => Some(window),
            Resource::Application(_) => None,
        }
    }
}

/// Process-wide table of live resources.
///
/// Not synchronized itself; owners wrap it in a lock when shared.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    slots: SlotMap<ResourceKey, Resource>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live handles of either kind.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registers a resource and returns its fresh handle.
    pub fn allocate<T: Registered>(&mut self, value: T) -> T::Handle {
        <T::Handle as TypedHandle>::from_key(self.slots.insert(value.into_resource()))
    }

    /// Resolves an untyped key against an expected kind.
    ///
    /// # Errors
    /// - `InvalidHandle` when the key is dead or belongs to the other kind.
    pub fn resolve(&self, key: ResourceKey, kind: ResourceKind) -> CoreResult<&Resource> {
        match self.slots.get(key) {
            Some(resource) if resource.kind() == kind => Ok(resource),
            _ => Err(CoreError::InvalidHandle { expected: kind }),
        }
    }

    /// Typed shared access.
    pub fn get<T: Registered>(&self, handle: T::Handle) -> CoreResult<&T> {
        self.slots
            .get(handle.key())
            .and_then(T::from_resource)
            .ok_or(CoreError::InvalidHandle {
                expected: <T::Handle as TypedHandle>::KIND,
            })
    }

    /// Typed exclusive access.
    pub fn get_mut<T: Registered>(&mut self, handle: T::Handle) -> CoreResult<&mut T> {
        self.slots
            .get_mut(handle.key())
            .and_then(T::from_resource_mut)
            .ok_or(CoreError::InvalidHandle {
                expected: <T::Handle as TypedHandle>::KIND,
            })
    }

    /// Kills the handle and returns the resource it referred to.
    ///
    /// # Errors
    /// - `InvalidHandle` when the handle is dead or of the other kind; the
    ///   registry is left untouched in that case.
    pub fn invalidate<T: Registered>(&mut self, handle: T::Handle) -> CoreResult<T> {
        let kind = <T::Handle as TypedHandle>::KIND;
        self.resolve(handle.key(), kind)?;
        self.slots
            .remove(handle.key())
            .and_then(T::from_owned)
            .ok_or(CoreError::InvalidHandle { expected: kind })
    }

    /// Iterates live applications with their handles.
    pub fn applications(&self) -> impl Iterator<Item = (ApplicationHandle, &Application)> {
        self.slots.iter().filter_map(|(key, resource)| {
            Application::from_resource(resource).map(|app| (ApplicationHandle::from_key(key), app))
        })
    }
}
