//! Sign-in flow context.
//!
//! Holds the transient state of the email sign-in screens (the address
//! being signed in and whether a verification mail went out). A flow is
//! created when the user enters the sign-in screens and handed to each
//! view; it is cleared when the flow completes or is cancelled.

use tracing::{debug, info};

use tascboard_common::{Error, Result};

/// Stage of a sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInStage {
    /// Email entered, verification not yet requested.
    EmailEntered { email: String },
    /// Verification mail sent, waiting for the user to follow it.
    AwaitingVerification { email: String },
    /// Signed in. Transient state has been cleared.
    Completed,
    /// Abandoned. Transient state has been cleared.
    Cancelled,
}

/// Explicit context object for one sign-in attempt.
#[derive(Debug, Clone)]
pub struct SignInFlow {
    stage: SignInStage,
}

fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    let valid_domain = |domain: &str| {
        domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
    };
    match email.rsplit_once('@') {
        Some((local, domain))
            if !local.is_empty() && !local.contains('@') && valid_domain(domain) =>
        {
            Ok(email.to_ascii_lowercase())
        }
        _ => Err(Error::InvalidInput(format!(
            "Not an email address: {:?}",
            email
        ))),
    }
}

impl SignInFlow {
    /// Enter the sign-in flow with an email address.
    ///
    /// # Errors
    /// - Email address is malformed
    pub fn begin(email: &str) -> Result<Self> {
        let email = validate_email(email)?;
        debug!("Sign-in flow started");
        Ok(Self {
            stage: SignInStage::EmailEntered { email },
        })
    }

    /// Current stage.
    pub fn stage(&self) -> &SignInStage {
        &self.stage
    }

    /// Email in progress, while the flow is active.
    pub fn email(&self) -> Option<&str> {
        match &self.stage {
            SignInStage::EmailEntered { email } | SignInStage::AwaitingVerification { email } => {
                Some(email)
            }
            SignInStage::Completed | SignInStage::Cancelled => None,
        }
    }

    /// Whether a verification mail is outstanding.
    pub fn is_awaiting_verification(&self) -> bool {
        matches!(self.stage, SignInStage::AwaitingVerification { .. })
    }

    /// Whether the flow is finished (completed or cancelled).
    pub fn is_finished(&self) -> bool {
        matches!(self.stage, SignInStage::Completed | SignInStage::Cancelled)
    }

    /// Record that a verification mail was sent.
    ///
    /// Sending again while awaiting verification is allowed (resend).
    pub fn verification_sent(&mut self) -> Result<()> {
        match &self.stage {
            SignInStage::EmailEntered { email } | SignInStage::AwaitingVerification { email } => {
                self.stage = SignInStage::AwaitingVerification {
                    email: email.clone(),
                };
                Ok(())
            }
            _ => Err(self.finished_error("send verification")),
        }
    }

    /// Go back and use a different address.
    pub fn change_email(&mut self, email: &str) -> Result<()> {
        if self.is_finished() {
            return Err(self.finished_error("change email"));
        }
        self.stage = SignInStage::EmailEntered {
            email: validate_email(email)?,
        };
        Ok(())
    }

    /// Finish the flow after verification. Returns the verified address.
    ///
    /// # Errors
    /// - No verification mail was sent
    /// - Flow already finished
    pub fn complete(&mut self) -> Result<String> {
        match std::mem::replace(&mut self.stage, SignInStage::Completed) {
            SignInStage::AwaitingVerification { email } => {
                info!("Sign-in verified");
                Ok(email)
            }
            previous => {
                let err = match &previous {
                    SignInStage::EmailEntered { .. } => {
                        Error::InvalidInput("Verification has not been sent".to_string())
                    }
                    _ => Error::InvalidInput("Sign-in flow already finished".to_string()),
                };
                self.stage = previous;
                Err(err)
            }
        }
    }

    /// Abandon the flow, clearing the email in progress.
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            debug!("Sign-in flow cancelled");
            self.stage = SignInStage::Cancelled;
        }
    }

    fn finished_error(&self, action: &str) -> Error {
        Error::InvalidInput(format!("Cannot {}: sign-in flow already finished", action))
    }
}
