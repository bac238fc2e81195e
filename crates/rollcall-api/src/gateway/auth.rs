// Authentication and user gateway
//
// Login is a two-step protocol: exchange credentials for a token and
// persist it, then fetch `/auth/me` and persist the identity. The session
// only counts as authenticated once the second step succeeds. Logout
// always clears the local session, whatever the backend says.

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use super::GatewayContext;
use crate::error::Error;
use crate::models::{
    LoginRequest, MessageAck, PasswordChange, Registration, Token, User, UserId, UserUpdate,
};
use crate::outcome::Outcome;
use crate::session::Identity;

#[derive(Clone)]
pub struct AuthGateway {
    ctx: GatewayContext,
}

impl AuthGateway {
    pub(crate) fn new(ctx: GatewayContext) -> Self {
        Self { ctx }
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Sign in with email and password.
    ///
    /// If the token exchange succeeds but the identity fetch fails, the
    /// result is `Error`. The credential stays saved so
    /// [`refresh_identity`](Self::refresh_identity) can finish the login,
    /// but [`is_logged_in`](Self::is_logged_in) stays `false` until then.
    pub async fn login(&self, email: &str, password: &SecretString) -> Outcome<User> {
        if email.trim().is_empty() || password.expose_secret().is_empty() {
            return self
                .ctx
                .invalid("login", "Please enter both email and password");
        }
        let result = self.exchange_and_identify(email.trim(), password).await;
        self.ctx.settle("login", result)
    }

    async fn exchange_and_identify(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<User, Error> {
        let token: Token = self
            .ctx
            .pipeline
            .post(
                "auth/login",
                &LoginRequest {
                    email,
                    password: password.expose_secret(),
                },
            )
            .await?;

        self.ctx
            .pipeline
            .session()
            .save_credential(&SecretString::from(token.access_token), &token.token_type)?;
        info!("credential issued, fetching identity");

        self.fetch_identity().await
    }

    async fn fetch_identity(&self) -> Result<User, Error> {
        let user: User = self.ctx.pipeline.get("auth/me").await?;
        self.ctx
            .pipeline
            .session()
            .save_identity(Identity::from(&user))?;
        info!(user_id = user.id, "signed in");
        Ok(user)
    }

    /// Fetch the signed-in user and refresh the cached identity.
    pub async fn current_user(&self) -> Outcome<User> {
        let result = self.fetch_identity().await;
        self.ctx.settle("current_user", result)
    }

    /// Finish a login whose identity step failed, or refresh a stale identity.
    pub async fn refresh_identity(&self) -> Outcome<Identity> {
        self.current_user().await.map(|user| Identity::from(&user))
    }

    /// End the session.
    ///
    /// The local session is cleared even when the remote call fails; that
    /// case degrades to a success carrying the policy's logout message.
    pub async fn logout(&self) -> Outcome<MessageAck> {
        let remote: Result<MessageAck, Error> = self.ctx.pipeline.post_empty("auth/logout").await;
        let cleared = self.ctx.pipeline.session().clear_all();

        match (remote, cleared) {
            (_, Err(err)) => self.ctx.settle("logout", Err(err)),
            (Ok(ack), Ok(())) => Outcome::success(ack),
            (Err(err), Ok(())) => {
                warn!(error = %err, "remote logout failed, session cleared locally");
                Outcome::success(MessageAck::new(&self.ctx.policy.logout_message))
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.ctx.pipeline.session().is_authenticated()
    }

    pub fn cached_identity(&self) -> Identity {
        self.ctx.pipeline.session().identity()
    }

    // ── Accounts ─────────────────────────────────────────────────────

    pub async fn register(&self, registration: &Registration) -> Outcome<User> {
        if registration.email.trim().is_empty()
            || registration.password.is_empty()
            || registration.full_name.trim().is_empty()
        {
            return self
                .ctx
                .invalid("register", "Please fill in all fields");
        }
        let result = self.ctx.pipeline.post("auth/register", registration).await;
        self.ctx.settle("register", result)
    }

    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> Outcome<MessageAck> {
        if new.expose_secret().is_empty() {
            return self
                .ctx
                .invalid("change_password", "New password must not be empty");
        }
        let body = PasswordChange {
            current_password: current.expose_secret(),
            new_password: new.expose_secret(),
        };
        let result = self.ctx.pipeline.put("auth/password", &body).await;
        self.ctx.settle("change_password", result)
    }

    pub async fn list_users(&self) -> Outcome<Vec<User>> {
        let result = self.ctx.pipeline.get("users").await;
        self.ctx.settle("list_users", result)
    }

    pub async fn get_user(&self, user_id: UserId) -> Outcome<User> {
        let result = self.ctx.pipeline.get(&format!("users/{user_id}")).await;
        self.ctx.settle("get_user", result)
    }

    /// Update a user. Updating the signed-in user also refreshes the
    /// cached identity.
    pub async fn update_user(&self, user_id: UserId, update: &UserUpdate) -> Outcome<User> {
        let result = self.update_and_sync(user_id, update).await;
        self.ctx.settle("update_user", result)
    }

    async fn update_and_sync(&self, user_id: UserId, update: &UserUpdate) -> Result<User, Error> {
        let user: User = self
            .ctx
            .pipeline
            .put(&format!("users/{user_id}"), update)
            .await?;
        let session = self.ctx.pipeline.session();
        if session.identity().user_id == Some(user.id) {
            session.save_identity(Identity::from(&user))?;
        }
        Ok(user)
    }
}
