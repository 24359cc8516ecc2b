use serde::{Deserialize, Serialize};

/// Signup progress stored on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SetupStep {
    #[default]
    Profile,
    Skill,
    Cuisines,
    Diet,
    Equipment,
    Allergies,
    Done,
}

impl SetupStep {
    pub const ALL: [SetupStep; 7] = [
        SetupStep::Profile,
        SetupStep::Skill,
        SetupStep::Cuisines,
        SetupStep::Diet,
        SetupStep::Equipment,
        SetupStep::Allergies,
        SetupStep::Done,
    ];

    /// Zero-based position in the wizard
    pub fn position(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<SetupStep> {
        Self::ALL.get(self.position() + 1).copied()
    }

    pub fn previous(&self) -> Option<SetupStep> {
        self.position().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn is_done(&self) -> bool {
        matches!(self, SetupStep::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SetupStep::Profile => "profile",
            SetupStep::Skill => "skill",
            SetupStep::Cuisines => "cuisines",
            SetupStep::Diet => "diet",
            SetupStep::Equipment => "equipment",
            SetupStep::Allergies => "allergies",
            SetupStep::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Beginner,
    Intermediate,
    Advanced,
    Chef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Profile {
    pub setup_step: SetupStep,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skill: Option<Skill>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

/// Partial profile update; empty fields are left out of the request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProfileUpdateRequest {
    pub setup_step: SetupStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<Skill>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cuisines: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allergies: Vec<String>,
}

impl ProfileUpdateRequest {
    pub fn new(setup_step: SetupStep) -> Self {
        Self {
            setup_step,
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn skill(mut self, skill: Skill) -> Self {
        self.skill = Some(skill);
        self
    }

    pub fn cuisines(mut self, cuisines: Vec<String>) -> Self {
        self.cuisines = cuisines;
        self
    }

    pub fn diets(mut self, diets: Vec<String>) -> Self {
        self.diets = diets;
        self
    }

    pub fn equipment(mut self, equipment: Vec<String>) -> Self {
        self.equipment = equipment;
        self
    }

    pub fn allergies(mut self, allergies: Vec<String>) -> Self {
        self.allergies = allergies;
        self
    }
}

/// Email/password pair used by both signup and login
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
