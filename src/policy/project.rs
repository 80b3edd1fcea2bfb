use super::{Chain, Policy};
use crate::database::models::User;

pub struct ProjectPolicy;

impl Policy for ProjectPolicy {
    const RESOURCE: &'static str = "project";

    fn view(user: &User, chain: &Chain) -> bool {
        chain.is_member(user)
    }

    /// Creator only, regardless of membership.
    fn delete(user: &User, chain: &Chain) -> bool {
        user.id == chain.project.created_by_user_id
    }
}
