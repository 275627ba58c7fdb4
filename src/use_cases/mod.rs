/// Use Cases - Application-specific business rules
/// Uses domain entities and port interfaces

use crate::adapters::documents::{
    check_for_error, end_user_document, parse_activation_url, parse_end_user_response,
    parse_search_response, username_document, DocumentSettings, EndUserResponse,
};
use crate::domain::{
    fill_first_name, plus_tagged_email, split_full_name, ActivationResult, CreatedUser, CustomerId,
    DomainError, HostedUser, InviteMessage, InviteNotifier, IpassService, NotificationError,
    PersonName, ProvisioningApi, ProvisioningError, UsernameDomain, DEFAULT_FULL_NAME,
};
use std::sync::Arc;
use thiserror::Error;

/// Search paging used for single user lookups
const SEARCH_PAGE: u32 = 1;
const SEARCH_LIMIT: u32 = 2;

/// Use case for creating a hosted user and inviting them
pub struct CreateHostedUserUseCase<A: ProvisioningApi + ?Sized, N: InviteNotifier + ?Sized> {
    api: Arc<A>,
    notifier: Arc<N>,
    settings: DocumentSettings,
}

impl<A: ProvisioningApi + ?Sized, N: InviteNotifier + ?Sized> CreateHostedUserUseCase<A, N> {
    pub fn new(api: Arc<A>, notifier: Arc<N>, settings: DocumentSettings) -> Self {
        Self { api, notifier, settings }
    }

    /// Create the user at iPass, returning its `endUserId` and activation url.
    /// A duplicate email is retried once with the email plus-tagged with the username.
    pub async fn execute(
        &self,
        customer: CustomerId,
        user: &HostedUser,
        send_invite: bool,
    ) -> Result<CreatedUser, UseCaseError> {
        user.validate()?;

        let mut user = user.clone();
        if user.full_name.trim().is_empty() {
            user.full_name = DEFAULT_FULL_NAME.to_string();
        }
        let name = fill_first_name(split_full_name(&user.full_name));

        let response = match self.post(customer, &user, &name).await {
            Err(e) if e.is_duplicate_email() => {
                let tagged = plus_tagged_email(&user.email, &user.username).ok_or(e)?;
                tracing::warn!(
                    "Email {} already registered at iPass, retrying {} with {}",
                    user.email,
                    user.username_domain(),
                    tagged
                );
                user.email = tagged;
                user.validate()?;
                self.post(customer, &user, &name).await?
            }
            other => other?,
        };

        let activation_url = response
            .activation_url
            .ok_or(ProvisioningError::MissingElement("selfServiceActivationUrl"))?;

        tracing::info!(
            "Created hosted user {} ({}) for customer {}",
            user.username_domain(),
            response.end_user_id,
            customer
        );

        // The account exists at this point, a failed invite must not lose it
        let mut invite_sent = false;
        if send_invite {
            let invite = InviteMessage::new(user.email.clone(), activation_url.clone());
            match self.notifier.notify(std::slice::from_ref(&invite)).await {
                Ok(()) => invite_sent = true,
                Err(e) => tracing::warn!(
                    "Created {} but the invite to {} failed: {}",
                    user.username_domain(),
                    invite.email,
                    e
                ),
            }
        }

        Ok(CreatedUser {
            hosted_user_id: response.end_user_id,
            activation_url,
            email: user.email,
            invite_sent,
        })
    }

    async fn post(
        &self,
        customer: CustomerId,
        user: &HostedUser,
        name: &PersonName,
    ) -> Result<EndUserResponse, ProvisioningError> {
        let document = end_user_document(user, name, &self.settings)?;
        let response = self
            .api
            .post_document(customer, IpassService::Create, document)
            .await?;
        parse_end_user_response(&response)
    }
}

/// Use case for updating an existing hosted user
pub struct UpdateHostedUserUseCase<A: ProvisioningApi + ?Sized> {
    api: Arc<A>,
    settings: DocumentSettings,
}

impl<A: ProvisioningApi + ?Sized> UpdateHostedUserUseCase<A> {
    pub fn new(api: Arc<A>, settings: DocumentSettings) -> Self {
        Self { api, settings }
    }

    /// Returns the `endUserId` of the updated user
    pub async fn execute(&self, customer: CustomerId, user: &HostedUser) -> Result<String, UseCaseError> {
        user.validate()?;

        let name = fill_first_name(split_full_name(&user.full_name));
        let document = end_user_document(user, &name, &self.settings)?;
        let response = self
            .api
            .post_document(customer, IpassService::Update, document)
            .await?;
        let parsed = parse_end_user_response(&response)?;

        tracing::info!("Updated hosted user {} for customer {}", user.username_domain(), customer);
        Ok(parsed.end_user_id)
    }
}

/// Use case for looking up hosted users
pub struct SearchHostedUserUseCase<A: ProvisioningApi + ?Sized> {
    api: Arc<A>,
}

impl<A: ProvisioningApi + ?Sized> SearchHostedUserUseCase<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Raw search response for a login
    pub async fn execute(&self, customer: CustomerId, login: &UsernameDomain) -> Result<String, UseCaseError> {
        let response = self
            .api
            .search(customer, login.as_str(), SEARCH_PAGE, SEARCH_LIMIT)
            .await?;
        check_for_error(&response)?;
        Ok(response)
    }

    /// Search and return the user whose login matches exactly
    pub async fn find(
        &self,
        customer: CustomerId,
        login: &UsernameDomain,
    ) -> Result<Option<HostedUser>, UseCaseError> {
        let response = self.execute(customer, login).await?;
        let users = parse_search_response(&response)?;

        Ok(users
            .into_iter()
            .find(|user| user.username_domain() == login.as_str()))
    }
}

/// Use case for the username-only services: suspend, delete and activate
pub struct ChangeHostedUserStateUseCase<A: ProvisioningApi + ?Sized> {
    api: Arc<A>,
}

impl<A: ProvisioningApi + ?Sized> ChangeHostedUserStateUseCase<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn suspend(&self, customer: CustomerId, login: &UsernameDomain) -> Result<String, UseCaseError> {
        let response = self.post(customer, IpassService::Suspend, login).await?;
        tracing::info!("Suspended hosted user {} for customer {}", login, customer);
        Ok(response)
    }

    pub async fn delete(&self, customer: CustomerId, login: &UsernameDomain) -> Result<String, UseCaseError> {
        let response = self.post(customer, IpassService::Delete, login).await?;
        tracing::info!("Deleted hosted user {} for customer {}", login, customer);
        Ok(response)
    }

    pub async fn activate(
        &self,
        customer: CustomerId,
        login: &UsernameDomain,
    ) -> Result<ActivationResult, UseCaseError> {
        let raw = self.post(customer, IpassService::Activate, login).await?;
        let activation_url = parse_activation_url(&raw)?;
        tracing::info!("Activated hosted user {} for customer {}", login, customer);
        Ok(ActivationResult { raw, activation_url })
    }

    /// Suspending and activating the user makes iPass issue a new activation url
    pub async fn refresh_activation_url(
        &self,
        customer: CustomerId,
        login: &UsernameDomain,
    ) -> Result<String, UseCaseError> {
        self.suspend(customer, login).await?;
        let activation = self.activate(customer, login).await?;
        activation
            .activation_url
            .ok_or_else(|| ProvisioningError::MissingElement("selfServiceActivationUrl").into())
    }

    async fn post(
        &self,
        customer: CustomerId,
        service: IpassService,
        login: &UsernameDomain,
    ) -> Result<String, UseCaseError> {
        let document = username_document(login.as_str())?;
        let response = self.api.post_document(customer, service, document).await?;
        check_for_error(&response)?;
        Ok(response)
    }
}

/// Use case for relaying invitations
pub struct SendInvitesUseCase<N: InviteNotifier + ?Sized> {
    notifier: Arc<N>,
}

impl<N: InviteNotifier + ?Sized> SendInvitesUseCase<N> {
    pub fn new(notifier: Arc<N>) -> Self {
        Self { notifier }
    }

    pub async fn execute(&self, invites: &[InviteMessage]) -> Result<(), UseCaseError> {
        self.notifier.notify(invites).await?;
        Ok(())
    }

    pub async fn send_one(&self, invite: InviteMessage) -> Result<(), UseCaseError> {
        self.execute(std::slice::from_ref(&invite)).await
    }
}

/// Use case errors
#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("Invalid user: {0}")]
    Domain(#[from] DomainError),

    #[error("Provisioning failed: {0}")]
    Provisioning(#[from] ProvisioningError),

    #[error("Invite failed: {0}")]
    Notification(#[from] NotificationError),
}
