//! User administration.

use std::sync::Arc;

use tracing::{info, warn};

use shipdesk_auth::permissions::catalog;
use shipdesk_auth::{
    can_create_user_type, CreateUserPayload, UpdateUserPayload, User, UserType, ValidationStatus,
};
use shipdesk_client::{UserClient, ValidateAccountPayload};
use shipdesk_core::UserId;

use crate::error::{StoreError, StoreResult};
use crate::forms::{validate_form, FormErrors};
use crate::resource::{ResourcePermissions, ResourceStore};
use crate::session::SessionStore;

/// Service errors that belong to a form field.
const FIELD_BY_STATUS: &[(u16, &str)] = &[(409, "email")];

pub struct UserStore {
    resources: ResourceStore<User, UserClient>,
}

impl UserStore {
    pub fn new(api: Arc<UserClient>, session: Arc<SessionStore>) -> Self {
        let permissions = ResourcePermissions {
            read: Some(catalog::USERS_READ),
            create: Some(catalog::USERS_CREATE),
            update: Some(catalog::USERS_UPDATE),
            delete: Some(catalog::USERS_DELETE),
        };
        Self {
            resources: ResourceStore::new("Utilisateur", api, session, permissions),
        }
    }

    pub fn resources(&self) -> &ResourceStore<User, UserClient> {
        &self.resources
    }

    /// Account types the signed-in user may create.
    pub async fn creatable_user_types(&self) -> Vec<UserType> {
        match self.resources.session().current().await {
            Some(session) => session.user.user_type.creatable_user_types().to_vec(),
            None => Vec::new(),
        }
    }

    pub async fn create(&self, payload: &CreateUserPayload) -> StoreResult<User> {
        validate_form(payload).map_err(StoreError::Form)?;

        let actor = self
            .resources
            .session()
            .current()
            .await
            .map(|s| s.user.user_type)
            .ok_or(StoreError::NotAuthenticated)?;
        if !can_create_user_type(actor, payload.user_type) {
            warn!(?actor, target = ?payload.user_type, "user type not creatable");
            self.resources.notifier().error(&format!(
                "Vous ne pouvez pas créer un compte « {} »",
                payload.user_type.label()
            ));
            return Err(StoreError::PermissionDenied(format!(
                "{actor:?} cannot create {:?}",
                payload.user_type
            )));
        }

        self.resources.create(payload).await.map_err(into_form_error)
    }

    pub async fn update(&self, id: &UserId, payload: &UpdateUserPayload) -> StoreResult<User> {
        validate_form(payload).map_err(StoreError::Form)?;
        self.resources.update(id, payload).await.map_err(into_form_error)
    }

    /// Approve or reject a pending account.
    pub async fn validate_account(
        &self,
        id: &UserId,
        status: ValidationStatus,
        reason: Option<String>,
    ) -> StoreResult<User> {
        let ctx = self.resources.context_for(Some(&catalog::USERS_UPDATE)).await?;
        let payload = ValidateAccountPayload { status, reason };
        match self.resources.api().validate_account(&ctx, id, &payload).await.into_result() {
            Ok(user) => {
                info!(%id, ?status, "account validation recorded");
                self.resources.apply_confirmed_update(user.clone()).await;
                let message = match status {
                    ValidationStatus::Validated => "Compte validé",
                    ValidationStatus::Rejected => "Compte rejeté",
                    ValidationStatus::Pending => "Compte remis en attente",
                };
                self.resources.notifier().success(message);
                Ok(user)
            }
            Err(e) => Err(self.resources.record_failure("validate_account", e).await),
        }
    }
}

fn into_form_error(err: StoreError) -> StoreError {
    match err {
        StoreError::Api(e) if FIELD_BY_STATUS.iter().any(|(s, _)| e.is_status(*s)) => {
            StoreError::Form(FormErrors::from_api(&e, FIELD_BY_STATUS))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{RecordingNotifier, ToastLevel};
    use crate::testing::{page_meta, session_store};
    use serde_json::{json, Value};
    use shipdesk_auth::UserFilters;
    use shipdesk_client::HttpClient;
    use shipdesk_core::PageRequest;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user(id: &str, validation: &str) -> Value {
        json!({
            "id": id,
            "email": format!("{id}@example.com"),
            "firstName": "Sara",
            "lastName": "Idrissi",
            "userType": "SELLER",
            "validationStatus": validation
        })
    }

    fn payload(user_type: UserType) -> CreateUserPayload {
        CreateUserPayload {
            email: "sara@example.com".into(),
            first_name: "Sara".into(),
            last_name: "Idrissi".into(),
            password: "motdepasse".into(),
            phone: None,
            user_type,
            role: None,
        }
    }

    async fn store(server: &MockServer) -> (UserStore, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let session = session_store(&server.uri(), &["*"], notifier.clone()).await;
        let api = Arc::new(UserClient::new(HttpClient::new(server.uri())));
        (UserStore::new(api, session), notifier)
    }

    #[tokio::test]
    async fn admin_cannot_create_super_admin() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let (store, notifier) = store(&server).await;

        let err = store.create(&payload(UserType::SuperAdmin)).await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));
        assert_eq!(notifier.of_level(ToastLevel::Error).len(), 1);
        assert!(!store.creatable_user_types().await.contains(&UserType::SuperAdmin));
    }

    #[tokio::test]
    async fn conflict_lands_on_email_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users"))
            .and(body_partial_json(json!({ "userType": "SELLER" })))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({ "message": "Cet email est déjà utilisé" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        let (store, _) = store(&server).await;

        let err = store.create(&payload(UserType::Seller)).await.unwrap_err();
        let form = err.form().unwrap();
        assert_eq!(form.field("email").unwrap(), ["Cet email est déjà utilisé".to_string()]);
        assert!(form.root.is_none());
    }

    #[tokio::test]
    async fn invalid_email_is_refused_before_sending() {
        let server = MockServer::start().await;
        let (store, _) = store(&server).await;
        let mut p = payload(UserType::Seller);
        p.email = "pas-un-email".into();

        let err = store.create(&p).await.unwrap_err();
        assert!(err.form().unwrap().field("email").is_some());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn validation_replaces_cached_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [user("u-9", "PENDING")],
                "meta": page_meta(1),
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/users/u-9/validate"))
            .and(body_partial_json(json!({ "status": "VALIDATED" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(user("u-9", "VALIDATED")))
            .expect(1)
            .mount(&server)
            .await;
        let (store, notifier) = store(&server).await;
        store
            .resources()
            .fetch(&UserFilters::default(), PageRequest::default())
            .await
            .unwrap();

        let id = UserId::new("u-9");
        store
            .validate_account(&id, ValidationStatus::Validated, None)
            .await
            .unwrap();

        let cached = store.resources().find(&id).await.unwrap();
        assert_eq!(cached.validation_status, ValidationStatus::Validated);
        assert_eq!(notifier.of_level(ToastLevel::Success)[0].message, "Compte validé");
    }
}
