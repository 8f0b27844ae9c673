//! `IdentityStore` implementation over `user.openshift.io/v1`

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, GroupVersionKind, ListParams};
use kube::Client;
use tracing::{debug, info, instrument, warn};

use osluc_core::{IdentityRef, IdentityStore, OslucError, Result, User};

const USER_GROUP: &str = "user.openshift.io";
const USER_VERSION: &str = "v1";

/// Users fetched per list request
pub const DEFAULT_PAGE_SIZE: u32 = 500;

fn api_resource(kind: &str, plural: &str) -> ApiResource {
    let gvk = GroupVersionKind::gvk(USER_GROUP, USER_VERSION, kind);
    ApiResource::from_gvk_with_plural(&gvk, plural)
}

/// OpenShift users and identities, both cluster scoped
pub struct OpenShiftStore {
    users: Api<DynamicObject>,
    identities: Api<DynamicObject>,
    page_size: u32,
}

impl OpenShiftStore {
    pub fn new(client: Client) -> Self {
        Self {
            users: Api::all_with(client.clone(), &api_resource("User", "users")),
            identities: Api::all_with(client, &api_resource("Identity", "identities")),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

#[async_trait]
impl IdentityStore for OpenShiftStore {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users = Vec::new();
        let mut continue_token: Option<String> = None;

        loop {
            let mut params = ListParams::default().limit(self.page_size);
            if let Some(token) = &continue_token {
                params = params.continue_token(token);
            }

            let page = self
                .users
                .list(&params)
                .await
                .map_err(|e| OslucError::store(format!("Unable to list users: {}", e)))?;

            for object in &page.items {
                match user_from_object(object) {
                    Ok(user) => users.push(user),
                    Err(e) => warn!(error = %e, "Ignoring malformed user object"),
                }
            }

            continue_token = page.metadata.continue_.filter(|token| !token.is_empty());
            if continue_token.is_none() {
                break;
            }
            debug!(fetched = users.len(), "Fetching next page of users");
        }

        info!(total = users.len(), "Found users");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn delete_identity(&self, name: &str) -> Result<()> {
        self.identities
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| {
                OslucError::store(format!("Unable to delete identity {}: {}", name, e))
            })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, name: &str) -> Result<()> {
        self.users
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| OslucError::store(format!("Unable to delete user {}: {}", name, e)))?;
        Ok(())
    }
}

/// Convert a `User` object. `identities` is a top-level field and may be absent.
pub fn user_from_object(object: &DynamicObject) -> Result<User> {
    let name = object
        .metadata
        .name
        .clone()
        .ok_or_else(|| OslucError::store("user object has no name"))?;

    let identities = match object.data.get("identities") {
        None | Some(serde_json::Value::Null) => vec![],
        Some(value) => serde_json::from_value::<Vec<String>>(value.clone()).map_err(|e| {
            OslucError::store(format!("user {} has malformed identities: {}", name, e))
        })?,
    };

    Ok(User {
        name,
        identities: identities.into_iter().map(IdentityRef::new).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn user_object(name: &str, data: serde_json::Value) -> DynamicObject {
        DynamicObject::new(name, &api_resource("User", "users")).data(data)
    }

    #[test]
    fn test_user_from_object() {
        let object = user_object(
            "alice",
            json!({ "fullName": "Alice", "identities": ["corp_ldap:alice"], "groups": null }),
        );

        let user = user_from_object(&object).unwrap();
        assert_eq!(user, User::new("alice", vec!["corp_ldap:alice".into()]));
    }

    #[test]
    fn test_user_without_identities() {
        let absent = user_object("bob", json!({}));
        let null = user_object("carol", json!({ "identities": null }));

        assert!(user_from_object(&absent).unwrap().identities.is_empty());
        assert!(user_from_object(&null).unwrap().identities.is_empty());
    }

    #[test]
    fn test_user_identity_order_preserved() {
        let object = user_object("dave", json!({ "identities": ["b:dave", "a:dave"] }));
        let user = user_from_object(&object).unwrap();
        assert_eq!(
            user.identities,
            vec![IdentityRef::new("b:dave"), IdentityRef::new("a:dave")]
        );
    }

    #[test]
    fn test_malformed_identities_rejected() {
        let object = user_object("eve", json!({ "identities": "ldap:eve" }));
        let err = user_from_object(&object).unwrap_err();
        assert!(matches!(err, OslucError::Store { .. }));
    }

    #[test]
    fn test_nameless_object_rejected() {
        let object = DynamicObject {
            types: None,
            metadata: ObjectMeta::default(),
            data: json!({ "identities": [] }),
        };
        assert!(user_from_object(&object).is_err());
    }

    #[test]
    fn test_api_resource_paths() {
        let users = api_resource("User", "users");
        assert_eq!(users.api_version, "user.openshift.io/v1");
        assert_eq!(users.plural, "users");

        let identities = api_resource("Identity", "identities");
        assert_eq!(identities.kind, "Identity");
        assert_eq!(identities.plural, "identities");
    }
}
