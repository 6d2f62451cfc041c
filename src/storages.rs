use crate::coordinator::Coordinator;
use serenity::prelude::TypeMapKey;
use std::sync::Arc;

pub struct CoordinatorKey;
impl TypeMapKey for CoordinatorKey {
    type Value = Arc<Coordinator>;
}
