use anyhow::{Context, Result};
use file_manager::aws_config::AwsConfig;
use serde::Serialize;
use sha1::{Digest, Sha1};

/// The assume-role call a profile results in, as far as it identifies the issued credentials.
/// Fields are declared in key order so the serialized form is sorted.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AssumeRoleParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub role_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_session_name: Option<String>,
    #[serde(rename = "SerialNumber", skip_serializing_if = "Option::is_none")]
    pub mfa_serial: Option<String>,
}

impl AssumeRoleParameters {
    pub fn from_config(config: &AwsConfig) -> Option<Self> {
        if !config.assumes_role() {
            return None;
        }

        Some(Self {
            duration_seconds: config.duration_seconds,
            external_id: config.external_id.clone(),
            role_arn: config.role_arn.clone()?,
            role_session_name: config.role_session_name.clone(),
            mfa_serial: config.mfa_serial.clone(),
        })
    }

    pub fn cache_key(&self) -> Result<String> {
        let arguments =
            serde_json::to_string(self).context("Unable to serialize role parameters")?;
        Ok(hex::encode(Sha1::digest(arguments.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/admin";

    #[test]
    fn profiles_without_role_are_not_cached() {
        let config = AwsConfig {
            region: Some("us-east-1".to_string()),
            ..Default::default()
        };
        assert_eq!(AssumeRoleParameters::from_config(&config), None);

        let blank = AwsConfig {
            role_arn: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(AssumeRoleParameters::from_config(&blank), None);
    }

    #[test]
    fn key_covers_only_present_parameters() {
        let config = AwsConfig {
            role_arn: Some(ROLE_ARN.to_string()),
            source_profile: Some("default".to_string()),
            region: Some("eu-west-1".to_string()),
            ..Default::default()
        };
        let parameters = AssumeRoleParameters::from_config(&config).unwrap();

        assert_eq!(
            serde_json::to_string(&parameters).unwrap(),
            format!(r#"{{"RoleArn":"{}"}}"#, ROLE_ARN)
        );
        assert_eq!(
            parameters.cache_key().unwrap(),
            "9d3c7ef2b3bc813444063eb85da8fe5de0738a04"
        );
    }

    #[test]
    fn key_is_sorted_and_changes_with_parameters() {
        let config = AwsConfig {
            role_arn: Some(ROLE_ARN.to_string()),
            role_session_name: Some("ci".to_string()),
            external_id: Some("abc".to_string()),
            mfa_serial: Some("arn:aws:iam::123456789012:mfa/user".to_string()),
            duration_seconds: Some(3600),
            ..Default::default()
        };
        let parameters = AssumeRoleParameters::from_config(&config).unwrap();

        assert_eq!(
            parameters.cache_key().unwrap(),
            "e143206705ce30c3ecd94864f35939d11d6b2c5b"
        );
    }
}
