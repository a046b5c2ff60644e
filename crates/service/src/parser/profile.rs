use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};


/// User document, keyed by `email` in the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,   // public object-storage URL
}

impl UserProfile {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            avatar: None,
        }
    }
}


#[derive(Clone, Debug, Deserialize, Validate)]
pub struct UpdateNameDto {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
}

impl UpdateNameDto {
    /// Validates and hands back the name exactly as submitted.
    pub fn into_name(self) -> Result<String, ValidationErrors> {
        self.validate()?;
        Ok(self.name)
    }
}

fn not_blank(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("name must not be blank".into()));
    }
    Ok(())
}
