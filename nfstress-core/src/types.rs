//! Core type definitions for nfstress

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// HTTP methods used by the synthesized control-plane requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
}

impl HttpMethod {
    /// Get the string representation of the HTTP method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            _ => Err(ParseError::InvalidHttpMethod(s.to_string())),
        }
    }
}

/// Network function kinds of the 5G core
///
/// `Other` keeps the dispatcher usable against partially-known deployments:
/// an unrecognised kind still gets a (service-less) request shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NfKind {
    Amf,
    Smf,
    Udm,
    Udr,
    Ausf,
    Upf,
    Pcf,
    Nrf,
    Nssf,
    Other(String),
}

impl NfKind {
    /// Canonical upper-case NF type name, as used on the SBI
    pub fn as_str(&self) -> &str {
        match self {
            NfKind::Amf => "AMF",
            NfKind::Smf => "SMF",
            NfKind::Udm => "UDM",
            NfKind::Udr => "UDR",
            NfKind::Ausf => "AUSF",
            NfKind::Upf => "UPF",
            NfKind::Pcf => "PCF",
            NfKind::Nrf => "NRF",
            NfKind::Nssf => "NSSF",
            NfKind::Other(name) => name,
        }
    }

    /// All kinds this crate has request templates for
    pub fn known() -> &'static [NfKind] {
        &[
            NfKind::Amf,
            NfKind::Smf,
            NfKind::Udm,
            NfKind::Udr,
            NfKind::Ausf,
            NfKind::Upf,
            NfKind::Pcf,
            NfKind::Nrf,
            NfKind::Nssf,
        ]
    }

    /// SBI service names advertised by this kind when it registers
    pub fn service_names(&self) -> &'static [&'static str] {
        match self {
            NfKind::Amf => &["namf-comm", "namf-evts", "namf-mt", "namf-loc"],
            NfKind::Smf => &["nsmf-pdusession", "nsmf-event-exposure"],
            NfKind::Udm => &["nudm-sdm", "nudm-uecm", "nudm-ueau"],
            NfKind::Udr => &["nudr-dr"],
            NfKind::Ausf => &["nausf-auth"],
            NfKind::Pcf => &["npcf-am-policy-control", "npcf-smpolicycontrol"],
            NfKind::Nrf => &["nnrf-nfm", "nnrf-disc"],
            NfKind::Nssf => &["nnssf-nsselection"],
            NfKind::Upf | NfKind::Other(_) => &[],
        }
    }

    /// Conventional container name for this kind (`oai-amf`, `oai-udm`, ...)
    pub fn container_name(&self) -> String {
        format!("oai-{}", self.as_str().to_lowercase())
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NfKind::Other(_))
    }
}

impl fmt::Display for NfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NfKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_uppercase();
        if name.is_empty() {
            return Err(ParseError::EmptyNfKind);
        }

        Ok(match name.as_str() {
            "AMF" => NfKind::Amf,
            "SMF" => NfKind::Smf,
            "UDM" => NfKind::Udm,
            "UDR" => NfKind::Udr,
            "AUSF" => NfKind::Ausf,
            "UPF" => NfKind::Upf,
            "PCF" => NfKind::Pcf,
            "NRF" => NfKind::Nrf,
            "NSSF" => NfKind::Nssf,
            _ => NfKind::Other(name),
        })
    }
}

impl TryFrom<String> for NfKind {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NfKind> for String {
    fn from(kind: NfKind) -> Self {
        kind.as_str().to_string()
    }
}

/// The stress scenarios the harness knows how to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Authentication vector generation (UDM ueau / AUSF)
    AuthVectors,
    /// NRF service discovery
    Discovery,
    /// NRF NF registration
    Registration,
    /// Subscriber data queries (UDR / UDM sdm)
    SubscriberQuery,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::AuthVectors => "auth-vectors",
            Scenario::Discovery => "discovery",
            Scenario::Registration => "register",
            Scenario::SubscriberQuery => "subscriber-query",
        }
    }

    /// Whether each job draws a subscriber identifier from the range
    pub fn uses_subscriber_ids(&self) -> bool {
        matches!(self, Scenario::AuthVectors | Scenario::SubscriberQuery)
    }

    /// Whether each job also picks a requester kind
    pub fn uses_requester(&self) -> bool {
        matches!(self, Scenario::Discovery)
    }

    /// Target kinds used when none are given on the command line
    pub fn default_targets(&self) -> Vec<NfKind> {
        match self {
            Scenario::AuthVectors => vec![NfKind::Udm],
            Scenario::Discovery | Scenario::Registration => vec![
                NfKind::Amf,
                NfKind::Smf,
                NfKind::Udm,
                NfKind::Udr,
                NfKind::Ausf,
                NfKind::Pcf,
            ],
            Scenario::SubscriberQuery => vec![NfKind::Udr],
        }
    }

    /// Requester kinds for discovery
    pub fn default_requesters(&self) -> Vec<NfKind> {
        match self {
            Scenario::Discovery => vec![
                NfKind::Amf,
                NfKind::Smf,
                NfKind::Ausf,
                NfKind::Udm,
                NfKind::Pcf,
            ],
            _ => Vec::new(),
        }
    }

    /// Execution contexts (container names) tried when none are given
    pub fn default_senders(&self) -> Vec<String> {
        let kinds: &[NfKind] = match self {
            Scenario::AuthVectors => &[NfKind::Ausf],
            Scenario::Discovery => &[NfKind::Amf, NfKind::Smf, NfKind::Ausf, NfKind::Udm],
            Scenario::Registration => &[NfKind::Amf, NfKind::Smf, NfKind::Udm, NfKind::Ausf],
            Scenario::SubscriberQuery => &[NfKind::Udm],
        };
        kinds.iter().map(NfKind::container_name).collect()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the dispatcher schedules jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RunMode {
    /// One job at a time, in index order, paced
    #[default]
    #[serde(rename = "seq", alias = "sequential")]
    Sequential,
    /// Up to `concurrency` jobs outstanding
    #[serde(rename = "par", alias = "parallel")]
    Parallel,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Sequential => "seq",
            RunMode::Parallel => "par",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "seq" | "sequential" => Ok(RunMode::Sequential),
            "par" | "parallel" => Ok(RunMode::Parallel),
            _ => Err(ParseError::InvalidRunMode(s.to_string())),
        }
    }
}

/// Errors that can occur when parsing types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid HTTP method: '{0}'. Supported methods are: GET, POST, PUT")]
    InvalidHttpMethod(String),

    #[error("Invalid mode: '{0}'. Supported modes are: seq, par")]
    InvalidRunMode(String),

    #[error("NF kind cannot be empty")]
    EmptyNfKind,
}
