use strum::{AsRefStr, EnumString};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Agent,
    Admin,
}

impl Role {
    // 商品管理と返却確定は agent 以上に許可する
    pub fn can_manage_catalog(self) -> bool {
        matches!(self, Role::Agent | Role::Admin)
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}
