use super::model::{AuthenticatedUser, UserRole};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

/// Access token claims issued by the helpdesk identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway.as_secs();
        validation.validate_aud = false;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let claims = token_data.claims;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))?;

        Ok(AuthenticatedUser {
            id,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::Duration;

    const SECRET: &str = "test-secret";

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            issuer: issuer.map(String::from),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(sub: String, role: UserRole) -> Claims {
        Claims {
            sub,
            username: "joao".to_string(),
            email: "joao@example.com".to_string(),
            role,
            exp: (chrono::Utc::now().timestamp() + 3600) as u64,
            iss: Some("helpdesk".to_string()),
        }
    }

    #[test]
    fn test_validate_token_success() {
        let id = Uuid::new_v4();
        let validator = JwtValidator::new(&config(Some("helpdesk")));
        let user = validator
            .validate_token(&token(&claims(id.to_string(), UserRole::Admin), SECRET))
            .unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.username, "joao");
        assert!(user.is_admin());
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let validator = JwtValidator::new(&config(None));
        let result = validator.validate_token(&token(
            &claims(Uuid::new_v4().to_string(), UserRole::User),
            "other-secret",
        ));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_validate_token_wrong_issuer() {
        let validator = JwtValidator::new(&config(Some("someone-else")));
        let result = validator.validate_token(&token(
            &claims(Uuid::new_v4().to_string(), UserRole::User),
            SECRET,
        ));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_validate_token_expired() {
        let validator = JwtValidator::new(&config(None));
        let mut expired = claims(Uuid::new_v4().to_string(), UserRole::User);
        expired.exp = (chrono::Utc::now().timestamp() - 3600) as u64;
        let result = validator.validate_token(&token(&expired, SECRET));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_validate_token_rejects_non_uuid_subject() {
        let validator = JwtValidator::new(&config(None));
        let result = validator.validate_token(&token(
            &claims("not-a-uuid".to_string(), UserRole::User),
            SECRET,
        ));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
