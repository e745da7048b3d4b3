use super::{id::UserId, role::Role};

/// 認証済みのリクエスト主体。
/// ハンドラからリポジトリのイベントまで明示的に受け渡す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn can_manage_catalog(&self) -> bool {
        self.role.can_manage_catalog()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
