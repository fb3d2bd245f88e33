use common::model::role::{Quota, Role};

/// Who is calling, and how many signatures they may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub quota: Quota,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>, quota: Quota) -> Self {
        Self {
            user_id: user_id.into(),
            quota,
        }
    }

    pub fn for_role(user_id: impl Into<String>, role: Role, constrained_limit: usize) -> Self {
        Self::new(user_id, Quota::for_role(role, constrained_limit))
    }
}
