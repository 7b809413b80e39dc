/// Per-owner settings. At most one row exists for each owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub owner: i64,
    pub default_friend: String,
}

impl Preference {
    pub fn new(owner: i64, default_friend: String) -> Self {
        Self {
            owner,
            default_friend,
        }
    }
}
