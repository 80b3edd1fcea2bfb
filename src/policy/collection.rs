use super::{Chain, Policy};
use crate::database::models::User;

pub struct CollectionPolicy;

impl Policy for CollectionPolicy {
    const RESOURCE: &'static str = "collection";

    /// Member of the project, and the collection belongs to that project.
    fn view(user: &User, chain: &Chain) -> bool {
        chain.is_member(user) && chain.collection.is_some_and(|c| c.project_id == chain.project.id)
    }
}
