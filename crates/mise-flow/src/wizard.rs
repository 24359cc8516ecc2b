use mise_client::AccountBackend;
use mise_types::{Credentials, Profile, ProfileUpdateRequest, SetupStep, TokenResponse};

use crate::error::{ValidationError, WizardError};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Multi-step signup: account creation followed by profile questions
#[derive(Debug, Clone, Default)]
pub struct SignupWizard {
    step: SetupStep,
}

impl SignupWizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume where a saved profile left off
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            step: profile.setup_step,
        }
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.step.is_done()
    }

    pub fn next(&mut self) -> SetupStep {
        if let Some(step) = self.step.next() {
            self.step = step;
        }
        self.step
    }

    pub fn previous(&mut self) -> SetupStep {
        if let Some(step) = self.step.previous() {
            self.step = step;
        }
        self.step
    }

    /// Check the fields a step requires; diet and allergies may be empty
    pub fn validate(step: SetupStep, update: &ProfileUpdateRequest) -> Result<(), ValidationError> {
        match step {
            SetupStep::Profile => {
                let named = update.name.as_deref().is_some_and(|n| !n.trim().is_empty());
                if !named {
                    return Err(ValidationError::MissingName);
                }
            }
            SetupStep::Skill if update.skill.is_none() => return Err(ValidationError::MissingSkill),
            SetupStep::Cuisines if update.cuisines.is_empty() => {
                return Err(ValidationError::NoCuisines)
            }
            SetupStep::Equipment if update.equipment.is_empty() => {
                return Err(ValidationError::NoEquipment)
            }
            _ => {}
        }
        Ok(())
    }

    pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationError> {
        let valid_email = credentials
            .email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid_email {
            return Err(ValidationError::InvalidEmail);
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }

    /// Validate and create the account; the backend stores the session token
    pub async fn signup(
        &self,
        backend: &dyn AccountBackend,
        credentials: &Credentials,
    ) -> Result<TokenResponse, WizardError> {
        Self::validate_credentials(credentials)?;
        let token = backend.signup(credentials).await?;
        tracing::info!(email = %credentials.email, "Account created");
        Ok(token)
    }

    /// Validate the current step, save it, and move to the next one
    pub async fn advance(
        &mut self,
        backend: &dyn AccountBackend,
        mut update: ProfileUpdateRequest,
    ) -> Result<Profile, WizardError> {
        let next = self.step.next().ok_or(WizardError::Finished)?;
        Self::validate(self.step, &update)?;

        update.setup_step = next;
        let profile = backend.save_profile(&update).await?;
        tracing::debug!(from = self.step.as_str(), to = next.as_str(), "Signup step saved");
        self.step = next;
        Ok(profile)
    }
}
