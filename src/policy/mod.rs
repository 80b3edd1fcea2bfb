//! Ownership-chain authorization.
//!
//! Each resource has one [`Policy`] implementation. A policy is a set of pure
//! predicates over the acting user and the ancestor chain resolved from the
//! route; handlers call [`authorize`] after every ancestor has been looked up.

mod collection;
mod key;
mod key_value;
mod project;

pub use collection::CollectionPolicy;
pub use key::KeyPolicy;
pub use key_value::KeyValuePolicy;
pub use project::ProjectPolicy;

use crate::database::models::{Collection, Key, KeyValue, Project, ProjectMember, User};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

/// Entities resolved from the route, outermost first. `membership` is the
/// acting user's `project_users` row for `project`, if any.
#[derive(Debug, Clone, Copy)]
pub struct Chain<'a> {
    pub project: &'a Project,
    pub membership: Option<&'a ProjectMember>,
    pub collection: Option<&'a Collection>,
    pub key: Option<&'a Key>,
    pub value: Option<&'a KeyValue>,
}

impl<'a> Chain<'a> {
    pub fn new(project: &'a Project, membership: Option<&'a ProjectMember>) -> Self {
        Self { project, membership, collection: None, key: None, value: None }
    }

    pub fn collection(mut self, collection: &'a Collection) -> Self {
        self.collection = Some(collection);
        self
    }

    pub fn key(mut self, key: &'a Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn value(mut self, value: &'a KeyValue) -> Self {
        self.value = Some(value);
        self
    }

    /// The membership row must be this user's and this project's.
    pub fn is_member(&self, user: &User) -> bool {
        self.membership
            .is_some_and(|m| m.project_id == self.project.id && m.user_id == user.id)
    }
}

pub trait Policy {
    const RESOURCE: &'static str;

    fn view(user: &User, chain: &Chain) -> bool;

    /// Only project membership; the new record has no ancestors to cross-check yet.
    fn create(user: &User, chain: &Chain) -> bool {
        chain.is_member(user)
    }

    fn update(user: &User, chain: &Chain) -> bool {
        Self::view(user, chain)
    }

    fn delete(user: &User, chain: &Chain) -> bool {
        Self::view(user, chain)
    }

    fn allows(user: &User, action: Action, chain: &Chain) -> bool {
        match action {
            Action::View => Self::view(user, chain),
            Action::Create => Self::create(user, chain),
            Action::Update => Self::update(user, chain),
            Action::Delete => Self::delete(user, chain),
        }
    }
}

pub fn authorize<P: Policy>(user: &User, action: Action, chain: &Chain) -> Result<(), ApiError> {
    if P::allows(user, action, chain) {
        Ok(())
    } else {
        tracing::warn!(
            "Denied {:?} on {} for user {} in project {}",
            action,
            P::RESOURCE,
            user.id,
            chain.project.id
        );
        Err(ApiError::permission_denied())
    }
}
