use garde::Validate;
use kernel::model::{
    id::UserId,
    role::Role,
    user::{event::RegisterUser, Registration, User},
};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

#[derive(Debug, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RoleName {
    Admin,
    User,
}

impl From<Role> for RoleName {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => Self::Admin,
            Role::User => Self::User,
        }
    }
}

impl From<RoleName> for Role {
    fn from(value: RoleName) -> Self {
        match value {
            RoleName::Admin => Self::Admin,
            RoleName::User => Self::User,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub external_id: i64,
    pub balance: i64,
    pub referrer_id: Option<UserId>,
    pub role: RoleName,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            external_id,
            balance,
            referrer_id,
            role,
            ..
        } = value;
        Self {
            user_id,
            external_id,
            balance,
            referrer_id,
            role: RoleName::from(role),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[garde(range(min = 1))]
    pub external_id: i64,
    #[garde(range(min = 1))]
    pub referrer_external_id: Option<i64>,
}

impl From<RegisterUserRequest> for RegisterUser {
    fn from(value: RegisterUserRequest) -> Self {
        let RegisterUserRequest {
            external_id,
            referrer_external_id,
        } = value;
        RegisterUser::new(external_id, referrer_external_id)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserResponse {
    pub created: bool,
    pub user: UserResponse,
}

impl From<Registration> for RegisterUserResponse {
    fn from(value: Registration) -> Self {
        let created = value.is_new();
        Self {
            created,
            user: value.into_user().into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleRequest {
    pub role: RoleName,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user_id: UserId,
    pub balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn role_names_are_kebab_case() {
        assert_eq!(RoleName::VARIANTS, &["admin", "user"]);
        let req: UpdateUserRoleRequest = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert_eq!(Role::from(req.role), Role::Admin);
    }

    #[rstest]
    #[case(r#"{"externalId":12}"#, true)]
    #[case(r#"{"externalId":12,"referrerExternalId":5}"#, true)]
    #[case(r#"{"externalId":0}"#, false)]
    #[case(r#"{"externalId":12,"referrerExternalId":0}"#, false)]
    fn register_request_requires_positive_ids(#[case] body: &str, #[case] valid: bool) {
        let req: RegisterUserRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.validate(&()).is_ok(), valid);
    }
}
