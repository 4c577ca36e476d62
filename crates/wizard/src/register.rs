use serde::{Deserialize, Serialize};

use crate::machine::StepDef;

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 8;

/// The accumulated registration form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterDraft {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    #[serde(default)]
    pub name: Option<String>,
}

fn validate_email(d: &RegisterDraft) -> Result<(), String> {
    let email = d.email.trim();
    if email.is_empty() {
        return Err("Enter your email address".to_string());
    }
    if !email.contains('@') {
        return Err("That doesn't look like an email address".to_string());
    }
    Ok(())
}

fn validate_credentials(d: &RegisterDraft) -> Result<(), String> {
    if d.username.trim().chars().count() < MIN_USERNAME_CHARS {
        return Err(format!(
            "Username must be at least {MIN_USERNAME_CHARS} characters"
        ));
    }
    if d.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        ));
    }
    if d.password != d.password_confirmation {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

/// Step sequence for the registration wizard.
pub fn register_steps() -> Vec<StepDef<RegisterDraft>> {
    vec![
        StepDef::new("email", validate_email),
        StepDef::new("credentials", validate_credentials),
        StepDef::open("profile"),
    ]
}
