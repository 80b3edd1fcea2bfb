use super::{Chain, KeyPolicy, Policy};
use crate::database::models::User;

pub struct KeyValuePolicy;

impl Policy for KeyValuePolicy {
    const RESOURCE: &'static str = "key value";

    fn view(user: &User, chain: &Chain) -> bool {
        KeyPolicy::view(user, chain)
            && match (chain.key, chain.value) {
                (Some(key), Some(value)) => value.key_id == key.id,
                _ => false,
            }
    }
}
