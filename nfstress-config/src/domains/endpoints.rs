//! NF base URLs

use nfstress_core::{EndpointMap, NfKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigResult;
use crate::validation::{validate_url, Validatable};

/// Base URL per NF kind
///
/// Defaults follow the container naming of the reference docker-compose
/// deployment (`http://oai-nrf`, `http://oai-udm`, ...), which resolve from
/// inside any NF container on the core network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub nrf: String,
    pub amf: String,
    pub smf: String,
    pub udm: String,
    pub udr: String,
    pub ausf: String,
    pub pcf: String,
    pub nssf: String,
    pub upf: String,

    /// Bases for NF types without a dedicated field, keyed by type name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<String, String>,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        let base = |kind: NfKind| format!("http://{}", kind.container_name());
        Self {
            nrf: base(NfKind::Nrf),
            amf: base(NfKind::Amf),
            smf: base(NfKind::Smf),
            udm: base(NfKind::Udm),
            udr: base(NfKind::Udr),
            ausf: base(NfKind::Ausf),
            pcf: base(NfKind::Pcf),
            nssf: base(NfKind::Nssf),
            upf: base(NfKind::Upf),
            other: BTreeMap::new(),
        }
    }
}

impl EndpointsConfig {
    /// Mutable access to the base for a known kind
    pub fn base_mut(&mut self, kind: &NfKind) -> Option<&mut String> {
        match kind {
            NfKind::Nrf => Some(&mut self.nrf),
            NfKind::Amf => Some(&mut self.amf),
            NfKind::Smf => Some(&mut self.smf),
            NfKind::Udm => Some(&mut self.udm),
            NfKind::Udr => Some(&mut self.udr),
            NfKind::Ausf => Some(&mut self.ausf),
            NfKind::Pcf => Some(&mut self.pcf),
            NfKind::Nssf => Some(&mut self.nssf),
            NfKind::Upf => Some(&mut self.upf),
            NfKind::Other(_) => None,
        }
    }

    fn entries(&self) -> Vec<(NfKind, &str)> {
        let mut entries = vec![
            (NfKind::Nrf, self.nrf.as_str()),
            (NfKind::Amf, self.amf.as_str()),
            (NfKind::Smf, self.smf.as_str()),
            (NfKind::Udm, self.udm.as_str()),
            (NfKind::Udr, self.udr.as_str()),
            (NfKind::Ausf, self.ausf.as_str()),
            (NfKind::Pcf, self.pcf.as_str()),
            (NfKind::Nssf, self.nssf.as_str()),
            (NfKind::Upf, self.upf.as_str()),
        ];
        // Known kinds always come from their dedicated field
        for (name, base) in &self.other {
            if let Ok(kind) = name.parse::<NfKind>() {
                if !kind.is_known() {
                    entries.push((kind, base.as_str()));
                }
            }
        }
        entries
    }

    /// Build the lookup table the payload synthesizer uses
    pub fn to_endpoint_map(&self) -> EndpointMap {
        let mut map = EndpointMap::new();
        for (kind, base) in self.entries() {
            map.insert(kind, base);
        }
        map
    }
}

impl Validatable for EndpointsConfig {
    fn validate(&self) -> ConfigResult<()> {
        for name in self.other.keys() {
            if let Ok(kind) = name.parse::<NfKind>() {
                if kind.is_known() {
                    return Err(self.validation_error(format!(
                        "other.{} shadows the dedicated `{}` field",
                        name,
                        kind.as_str().to_lowercase()
                    )));
                }
            }
        }
        for (kind, base) in self.entries() {
            validate_url(base, &kind.as_str().to_lowercase(), self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "endpoints"
    }
}
