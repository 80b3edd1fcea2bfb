use super::{Chain, CollectionPolicy, Policy};
use crate::database::models::User;

pub struct KeyPolicy;

impl Policy for KeyPolicy {
    const RESOURCE: &'static str = "key";

    fn view(user: &User, chain: &Chain) -> bool {
        CollectionPolicy::view(user, chain)
            && match (chain.collection, chain.key) {
                (Some(collection), Some(key)) => key.collection_id == collection.id,
                _ => false,
            }
    }
}
