use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::SdkError;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    /// The provider refused the operation (bad code, duplicate account, weak
    /// password). The message is safe to show to the client.
    #[error("{0}")]
    Rejected(String),

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Profile attributes the identity collaborator returns for a resolved token.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub external_id: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i32,
}

/// Hosted identity service owning the whole credential lifecycle. The
/// application never sees passwords after the call returns and performs no
/// local token validation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the external account id assigned by the provider.
    async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<String, IdentityError>;

    async fn confirm(&self, email: &str, code: &str) -> Result<(), IdentityError>;

    async fn login(&self, email: &str, password: &str) -> Result<IssuedTokens, IdentityError>;

    /// Validate a bearer token and return the profile it belongs to.
    async fn resolve_token(&self, access_token: &str) -> Result<AccountProfile, IdentityError>;

    async fn forgot_password(&self, email: &str) -> Result<(), IdentityError>;

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError>;
}

/// AWS Cognito user-pool implementation.
pub struct CognitoIdentityProvider {
    client: Client,
    client_id: String,
}

impl CognitoIdentityProvider {
    pub fn new(client: Client, client_id: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
        }
    }
}

fn attribute(name: &str, value: &str) -> Result<AttributeType, IdentityError> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| IdentityError::Unavailable(e.to_string()))
}

/// Prefer the service-level message over transport detail when available.
fn error_detail<E, R>(err: &SdkError<E, R>) -> String
where
    E: std::error::Error,
{
    match err.as_service_error() {
        Some(service_err) => service_err.to_string(),
        None => err.to_string(),
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<String, IdentityError> {
        let response = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(email)
            .password(password)
            .user_attributes(attribute("email", email)?)
            .user_attributes(attribute("given_name", first_name)?)
            .user_attributes(attribute("family_name", last_name)?)
            .send()
            .await
            .map_err(|e| IdentityError::Rejected(error_detail(&e)))?;

        Ok(response.user_sub().to_string())
    }

    async fn confirm(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        self.client
            .confirm_sign_up()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .send()
            .await
            .map_err(|e| IdentityError::Rejected(error_detail(&e)))?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<IssuedTokens, IdentityError> {
        let response = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|e| {
                debug!("authentication rejected: {}", error_detail(&e));
                IdentityError::InvalidCredentials
            })?;

        let result = response
            .authentication_result()
            .ok_or(IdentityError::InvalidCredentials)?;

        Ok(IssuedTokens {
            id_token: result.id_token().unwrap_or_default().to_string(),
            access_token: result
                .access_token()
                .ok_or(IdentityError::InvalidCredentials)?
                .to_string(),
            refresh_token: result.refresh_token().map(str::to_string),
            expires_in: result.expires_in(),
        })
    }

    async fn resolve_token(&self, access_token: &str) -> Result<AccountProfile, IdentityError> {
        let response = self
            .client
            .get_user()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| {
                debug!("token resolution failed: {}", error_detail(&e));
                IdentityError::InvalidToken
            })?;

        let mut profile = AccountProfile {
            external_id: response.username().to_string(),
            email: String::new(),
            given_name: None,
            family_name: None,
        };

        for attr in response.user_attributes() {
            match attr.name() {
                "email" => {
                    profile.email = attr.value().unwrap_or_default().to_string();
                }
                "given_name" => {
                    profile.given_name = attr.value().map(str::to_string);
                }
                "family_name" => {
                    profile.family_name = attr.value().map(str::to_string);
                }
                _ => {}
            }
        }

        // A pool account without an email attribute cannot be mapped to a
        // local user row.
        if profile.email.is_empty() {
            return Err(IdentityError::InvalidToken);
        }

        Ok(profile)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), IdentityError> {
        self.client
            .forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .send()
            .await
            .map_err(|e| IdentityError::Rejected(error_detail(&e)))?;
        Ok(())
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        self.client
            .confirm_forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .password(new_password)
            .send()
            .await
            .map_err(|e| IdentityError::Rejected(error_detail(&e)))?;
        Ok(())
    }
}
