//! Subscriber identity and PLMN configuration

use nfstress_core::{IdentifierRange, TemplateParams};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::error::ConfigResult;
use crate::validation::{validate_digits, validate_hex, validate_positive, Validatable};

/// IMSI range plus the PLMN, slice and AMF identifiers used in payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// First IMSI of the provisioned range
    pub imsi_start: u64,

    /// Last IMSI of the provisioned range (inclusive)
    pub imsi_end: u64,

    /// Rendered IMSI width, zero padded
    pub imsi_width: usize,

    pub mcc: String,
    pub mnc: String,

    /// Slice/service type
    pub sst: u8,

    /// Slice differentiator, 6 hex digits
    pub sd: String,

    pub amf_region_id: u8,
    pub amf_set_id: u16,
    pub amf_pointer: u8,
    pub tac: u32,

    /// Address advertised in synthesized NF profiles
    pub nf_ipv4: String,

    pub sbi_port: u16,

    /// NRF heartbeat timer advertised on registration, in seconds
    pub heartbeat_timer: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        let params = TemplateParams::default();
        Self {
            imsi_start: 208_950_000_000_031,
            imsi_end: 208_950_000_000_131,
            imsi_width: 15,
            mcc: params.mcc,
            mnc: params.mnc,
            sst: params.sst,
            sd: params.sd,
            amf_region_id: params.amf_region_id,
            amf_set_id: params.amf_set_id,
            amf_pointer: params.amf_pointer,
            tac: params.tac,
            nf_ipv4: params.nf_ipv4,
            sbi_port: params.sbi_port,
            heartbeat_timer: params.heartbeat_timer,
        }
    }
}

impl IdentityConfig {
    /// The validated IMSI range
    pub fn identifier_range(&self) -> ConfigResult<IdentifierRange> {
        Ok(IdentifierRange::new(
            self.imsi_start,
            self.imsi_end,
            self.imsi_width,
        )?)
    }

    /// Template parameters for the payload synthesizer
    pub fn template_params(&self) -> TemplateParams {
        TemplateParams {
            mcc: self.mcc.clone(),
            mnc: self.mnc.clone(),
            sst: self.sst,
            sd: self.sd.to_uppercase(),
            amf_region_id: self.amf_region_id,
            amf_set_id: self.amf_set_id,
            amf_pointer: self.amf_pointer,
            tac: self.tac,
            nf_ipv4: self.nf_ipv4.clone(),
            sbi_port: self.sbi_port,
            heartbeat_timer: self.heartbeat_timer,
        }
    }
}

impl Validatable for IdentityConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.identifier_range()?;

        validate_digits(&self.mcc, 3, 3, "mcc", self.domain_name())?;
        validate_digits(&self.mnc, 2, 3, "mnc", self.domain_name())?;
        validate_hex(&self.sd, 6, "sd", self.domain_name())?;

        // AMF Set ID is 10 bits, AMF Pointer 6 bits
        if self.amf_set_id > 0x3FF {
            return Err(self.validation_error(format!(
                "amf_set_id must fit in 10 bits, got {}",
                self.amf_set_id
            )));
        }
        if self.amf_pointer > 0x3F {
            return Err(self.validation_error(format!(
                "amf_pointer must fit in 6 bits, got {}",
                self.amf_pointer
            )));
        }
        if self.tac > 0xFF_FFFF {
            return Err(self.validation_error(format!(
                "tac must fit in 24 bits, got {}",
                self.tac
            )));
        }

        self.nf_ipv4.parse::<Ipv4Addr>().map_err(|_| {
            self.validation_error(format!("nf_ipv4 '{}' is not an IPv4 address", self.nf_ipv4))
        })?;

        validate_positive(self.sbi_port, "sbi_port", self.domain_name())?;
        validate_positive(self.heartbeat_timer, "heartbeat_timer", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_identity_defaults_validate() {
        let config = IdentityConfig::default();
        assert!(config.validate().is_ok());

        let range = config.identifier_range().unwrap();
        assert_eq!(range.start(), 208_950_000_000_031);
        assert_eq!(range.width(), 15);
    }

    #[test]
    fn test_inverted_range_is_config_error() {
        let config = IdentityConfig {
            imsi_start: 208_950_000_000_100,
            imsi_end: 208_950_000_000_033,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Core(_))));
    }

    #[test]
    fn test_width_too_small_rejected() {
        let config = IdentityConfig {
            imsi_width: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_plmn_validation() {
        let bad_mcc = IdentityConfig {
            mcc: "20".to_string(),
            ..Default::default()
        };
        assert!(bad_mcc.validate().is_err());

        let bad_sd = IdentityConfig {
            sd: "XYZ123".to_string(),
            ..Default::default()
        };
        assert!(bad_sd.validate().is_err());

        let bad_ip = IdentityConfig {
            nf_ipv4: "oai-amf".to_string(),
            ..Default::default()
        };
        assert!(bad_ip.validate().is_err());
    }

    #[test]
    fn test_template_params_mapping() {
        let config = IdentityConfig {
            mcc: "001".to_string(),
            mnc: "01".to_string(),
            sd: "00000a".to_string(),
            ..Default::default()
        };
        let params = config.template_params();
        assert_eq!(params.mcc, "001");
        assert_eq!(params.mnc, "01");
        assert_eq!(params.sd, "00000A");
    }
}
