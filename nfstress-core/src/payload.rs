//! Request synthesis for each scenario and NF kind

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::target::Selection;
use crate::types::{HttpMethod, NfKind, Scenario};

/// A fully-built request, consumed once by a remote executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPayload {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl RequestPayload {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            url: url.into(),
            method,
            headers,
            body: None,
        }
    }

    pub fn with_json(mut self, body: JsonValue) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(body.to_string());
        self
    }
}

/// Values substituted into request templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub mcc: String,
    pub mnc: String,
    pub sst: u8,
    pub sd: String,
    pub amf_region_id: u8,
    pub amf_set_id: u16,
    pub amf_pointer: u8,
    pub tac: u32,
    pub nf_ipv4: String,
    pub sbi_port: u16,
    pub heartbeat_timer: u32,
}

impl Default for TemplateParams {
    fn default() -> Self {
        Self {
            mcc: "208".to_string(),
            mnc: "95".to_string(),
            sst: 1,
            sd: "FFFFFF".to_string(),
            amf_region_id: 0x80,
            amf_set_id: 1,
            amf_pointer: 1,
            tac: 1,
            nf_ipv4: "192.168.70.200".to_string(),
            sbi_port: 80,
            heartbeat_timer: 50,
        }
    }
}

impl TemplateParams {
    /// `5G:mncXXX.mccYYY.3gppnetwork.org`
    pub fn serving_network_name(&self) -> String {
        format!(
            "5G:mnc{:0>3}.mcc{}.3gppnetwork.org",
            self.mnc, self.mcc
        )
    }

    /// AMF identifier: region (8 bits), set (10 bits), pointer (6 bits)
    pub fn amf_id(&self) -> String {
        let value = (u32::from(self.amf_region_id) << 16)
            | (u32::from(self.amf_set_id & 0x3ff) << 6)
            | u32::from(self.amf_pointer & 0x3f);
        format!("{:06x}", value)
    }

    fn plmn(&self) -> JsonValue {
        json!({ "mcc": self.mcc, "mnc": self.mnc })
    }
}

/// Base URL per NF kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointMap {
    bases: BTreeMap<NfKind, String>,
}

impl EndpointMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: NfKind, base: impl Into<String>) -> Self {
        self.insert(kind, base);
        self
    }

    pub fn insert(&mut self, kind: NfKind, base: impl Into<String>) {
        let base = base.into();
        self.bases
            .insert(kind, base.trim_end_matches('/').to_string());
    }

    /// Configured base, or `http://oai-<kind>` for unconfigured kinds
    pub fn base_for(&self, kind: &NfKind) -> String {
        self.bases
            .get(kind)
            .cloned()
            .unwrap_or_else(|| format!("http://{}", kind.container_name()))
    }
}

/// Everything drawn for one job before its request is built
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraw {
    pub identifier: Option<String>,
    pub sender: String,
    pub target: NfKind,
    pub requester: Option<NfKind>,
}

impl JobDraw {
    pub fn new(selection: Selection, identifier: Option<String>) -> Self {
        Self {
            identifier,
            sender: selection.sender,
            target: selection.target,
            requester: selection.requester,
        }
    }

    /// Report labels, in the order they are printed
    pub fn labels(&self, scenario: Scenario) -> Vec<(String, String)> {
        let mut labels = Vec::with_capacity(4);
        if let Some(ref id) = self.identifier {
            let key = match scenario {
                Scenario::Registration => "nf_instance",
                _ => "supi",
            };
            labels.push((key.to_string(), id.clone()));
        }
        labels.push(("sender".to_string(), self.sender.clone()));
        if let Some(ref requester) = self.requester {
            labels.push(("requester".to_string(), requester.to_string()));
        }
        labels.push(("target".to_string(), self.target.to_string()));
        labels
    }
}

/// Builds request payloads from templates
#[derive(Debug, Clone)]
pub struct PayloadSynthesizer {
    endpoints: EndpointMap,
    params: TemplateParams,
}

impl PayloadSynthesizer {
    pub fn new(endpoints: EndpointMap, params: TemplateParams) -> Self {
        Self { endpoints, params }
    }

    pub fn params(&self) -> &TemplateParams {
        &self.params
    }

    /// Build the request for one job. The RNG only feeds embedded UUIDs.
    pub fn build<R: Rng + ?Sized>(
        &self,
        scenario: Scenario,
        draw: &JobDraw,
        rng: &mut R,
    ) -> RequestPayload {
        match scenario {
            Scenario::AuthVectors => self.auth_vectors(draw, rng),
            Scenario::Discovery => self.discovery(draw),
            Scenario::Registration => self.registration(draw, rng),
            Scenario::SubscriberQuery => self.subscriber_query(draw),
        }
    }

    fn supi(draw: &JobDraw) -> String {
        format!("imsi-{}", draw.identifier.as_deref().unwrap_or_default())
    }

    fn auth_vectors<R: Rng + ?Sized>(&self, draw: &JobDraw, rng: &mut R) -> RequestPayload {
        let base = self.endpoints.base_for(&draw.target);
        let supi = Self::supi(draw);

        match draw.target {
            NfKind::Ausf => RequestPayload::new(
                HttpMethod::Post,
                format!("{}/nausf-auth/v1/ue-authentications", base),
            )
            .with_json(json!({
                "supiOrSuci": supi,
                "servingNetworkName": self.params.serving_network_name(),
            })),
            _ => RequestPayload::new(
                HttpMethod::Post,
                format!(
                    "{}/nudm-ueau/v1/{}/security-information/generate-auth-data",
                    base, supi
                ),
            )
            .with_json(json!({
                "servingNetworkName": self.params.serving_network_name(),
                "ausfInstanceId": random_uuid(rng).to_string(),
            })),
        }
    }

    fn discovery(&self, draw: &JobDraw) -> RequestPayload {
        let base = self.endpoints.base_for(&NfKind::Nrf);
        let mut url = format!(
            "{}/nnrf-disc/v1/nf-instances?target-nf-type={}",
            base, draw.target
        );
        if let Some(ref requester) = draw.requester {
            url.push_str(&format!("&requester-nf-type={}", requester));
        }
        RequestPayload::new(HttpMethod::Get, url)
    }

    fn registration<R: Rng + ?Sized>(&self, draw: &JobDraw, rng: &mut R) -> RequestPayload {
        let base = self.endpoints.base_for(&NfKind::Nrf);
        let instance_id = draw
            .identifier
            .clone()
            .unwrap_or_else(|| random_uuid(rng).to_string());

        let body = self.nf_profile(&draw.target, &instance_id, rng);
        RequestPayload::new(
            HttpMethod::Put,
            format!("{}/nnrf-nfm/v1/nf-instances/{}", base, instance_id),
        )
        .with_json(body)
    }

    /// NF profile for registration; only AMF carries slice and GUAMI data
    pub fn nf_profile<R: Rng + ?Sized>(
        &self,
        kind: &NfKind,
        instance_id: &str,
        rng: &mut R,
    ) -> JsonValue {
        let p = &self.params;
        let services: Vec<JsonValue> = kind
            .service_names()
            .iter()
            .map(|name| {
                json!({
                    "serviceInstanceId": random_uuid(rng).to_string(),
                    "serviceName": name,
                    "versions": [{ "apiVersionInUri": "v1", "apiFullVersion": "1.0.0" }],
                    "scheme": "http",
                    "nfServiceStatus": "REGISTERED",
                    "ipEndPoints": [{
                        "ipv4Address": p.nf_ipv4,
                        "transport": "TCP",
                        "port": p.sbi_port,
                    }],
                })
            })
            .collect();

        let mut profile = json!({
            "nfInstanceId": instance_id,
            "nfType": kind.as_str(),
            "nfStatus": "REGISTERED",
            "heartBeatTimer": p.heartbeat_timer,
            "plmnList": [p.plmn()],
            "ipv4Addresses": [p.nf_ipv4],
            "nfServices": services,
        });

        if *kind == NfKind::Amf {
            profile["sNssais"] = json!([{ "sst": p.sst, "sd": p.sd }]);
            profile["amfInfo"] = json!({
                "amfRegionId": format!("{:02x}", p.amf_region_id),
                "amfSetId": format!("{:03x}", p.amf_set_id & 0x3ff),
                "guamiList": [{ "plmnId": p.plmn(), "amfId": p.amf_id() }],
                "taiList": [{ "plmnId": p.plmn(), "tac": format!("{:06x}", p.tac) }],
            });
        }

        profile
    }

    fn subscriber_query(&self, draw: &JobDraw) -> RequestPayload {
        let base = self.endpoints.base_for(&draw.target);
        let supi = Self::supi(draw);

        let url = match draw.target {
            NfKind::Udm => {
                let plmn: String =
                    url::form_urlencoded::byte_serialize(self.params.plmn().to_string().as_bytes())
                        .collect();
                format!("{}/nudm-sdm/v2/{}/am-data?plmn-id={}", base, supi, plmn)
            }
            _ => format!(
                "{}/nudr-dr/v1/subscription-data/{}/authentication-data/authentication-subscription",
                base, supi
            ),
        };
        RequestPayload::new(HttpMethod::Get, url)
    }
}

/// A v4 UUID drawn from the caller's RNG, so seeded runs stay reproducible
pub fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn synthesizer() -> PayloadSynthesizer {
        let endpoints = EndpointMap::new()
            .with(NfKind::Nrf, "http://nrf.test:8080/")
            .with(NfKind::Udm, "http://udm.test")
            .with(NfKind::Udr, "http://udr.test")
            .with(NfKind::Ausf, "http://ausf.test");
        PayloadSynthesizer::new(endpoints, TemplateParams::default())
    }

    fn draw(target: NfKind, identifier: Option<&str>) -> JobDraw {
        JobDraw {
            identifier: identifier.map(str::to_string),
            sender: "oai-ausf".to_string(),
            target,
            requester: None,
        }
    }

    fn body(payload: &RequestPayload) -> JsonValue {
        serde_json::from_str(payload.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn test_auth_vectors_against_udm() {
        let mut rng = StdRng::seed_from_u64(1);
        let payload = synthesizer().build(
            Scenario::AuthVectors,
            &draw(NfKind::Udm, Some("208950000000042")),
            &mut rng,
        );

        assert_eq!(payload.method, HttpMethod::Post);
        assert_eq!(
            payload.url,
            "http://udm.test/nudm-ueau/v1/imsi-208950000000042/security-information/generate-auth-data"
        );
        assert_eq!(payload.headers["Content-Type"], "application/json");
        let body = body(&payload);
        assert_eq!(
            body["servingNetworkName"],
            "5G:mnc095.mcc208.3gppnetwork.org"
        );
        assert!(Uuid::parse_str(body["ausfInstanceId"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_auth_vectors_against_ausf() {
        let mut rng = StdRng::seed_from_u64(1);
        let payload = synthesizer().build(
            Scenario::AuthVectors,
            &draw(NfKind::Ausf, Some("208950000000042")),
            &mut rng,
        );
        assert_eq!(payload.url, "http://ausf.test/nausf-auth/v1/ue-authentications");
        assert_eq!(body(&payload)["supiOrSuci"], "imsi-208950000000042");
    }

    #[test]
    fn test_discovery_query() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut d = draw(NfKind::Smf, None);
        d.requester = Some(NfKind::Amf);

        let payload = synthesizer().build(Scenario::Discovery, &d, &mut rng);
        assert_eq!(payload.method, HttpMethod::Get);
        assert_eq!(
            payload.url,
            "http://nrf.test:8080/nnrf-disc/v1/nf-instances?target-nf-type=SMF&requester-nf-type=AMF"
        );
        assert!(payload.body.is_none());
        assert!(!payload.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_amf_registration_carries_guami_and_slices() {
        let mut rng = StdRng::seed_from_u64(9);
        let id = random_uuid(&mut rng).to_string();
        let payload =
            synthesizer().build(Scenario::Registration, &draw(NfKind::Amf, Some(&id)), &mut rng);

        assert_eq!(payload.method, HttpMethod::Put);
        assert_eq!(
            payload.url,
            format!("http://nrf.test:8080/nnrf-nfm/v1/nf-instances/{}", id)
        );
        let body = body(&payload);
        assert_eq!(body["nfType"], "AMF");
        assert_eq!(body["nfInstanceId"], id.as_str());
        assert_eq!(body["nfServices"].as_array().unwrap().len(), 4);
        assert_eq!(body["sNssais"][0]["sst"], 1);
        assert_eq!(body["amfInfo"]["amfRegionId"], "80");
        assert_eq!(body["amfInfo"]["amfSetId"], "001");
        assert_eq!(body["amfInfo"]["guamiList"][0]["amfId"], "800041");
    }

    #[test]
    fn test_non_amf_registration_omits_amf_fields() {
        let mut rng = StdRng::seed_from_u64(9);
        let payload =
            synthesizer().build(Scenario::Registration, &draw(NfKind::Smf, None), &mut rng);
        let body = body(&payload);

        assert_eq!(body["nfType"], "SMF");
        assert!(body.get("amfInfo").is_none());
        assert!(body.get("sNssais").is_none());
        assert_eq!(
            body["nfServices"][0]["serviceName"],
            "nsmf-pdusession"
        );
    }

    #[test]
    fn test_unknown_kind_registers_without_services() {
        let mut rng = StdRng::seed_from_u64(9);
        let payload = synthesizer().build(
            Scenario::Registration,
            &draw(NfKind::Other("NWDAF".into()), None),
            &mut rng,
        );
        let body = body(&payload);
        assert_eq!(body["nfType"], "NWDAF");
        assert_eq!(body["nfServices"], json!([]));
    }

    #[test]
    fn test_subscriber_query_shapes() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = synthesizer();

        let udr = s.build(
            Scenario::SubscriberQuery,
            &draw(NfKind::Udr, Some("208950000000033")),
            &mut rng,
        );
        assert_eq!(
            udr.url,
            "http://udr.test/nudr-dr/v1/subscription-data/imsi-208950000000033/authentication-data/authentication-subscription"
        );

        let udm = s.build(
            Scenario::SubscriberQuery,
            &draw(NfKind::Udm, Some("208950000000033")),
            &mut rng,
        );
        assert!(udm
            .url
            .starts_with("http://udm.test/nudm-sdm/v2/imsi-208950000000033/am-data?plmn-id="));
        assert!(udm.url.contains("%22mcc%22"));
    }

    #[test]
    fn test_same_seed_same_payload() {
        let s = synthesizer();
        let d = draw(NfKind::Amf, None);
        let a = s.build(Scenario::Registration, &d, &mut StdRng::seed_from_u64(3));
        let b = s.build(Scenario::Registration, &d, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_unconfigured_endpoint_falls_back_to_container_name() {
        let endpoints = EndpointMap::new();
        assert_eq!(endpoints.base_for(&NfKind::Pcf), "http://oai-pcf");
    }

    #[test]
    fn test_labels_follow_scenario() {
        let mut d = draw(NfKind::Udm, Some("001"));
        d.requester = Some(NfKind::Amf);
        let labels = d.labels(Scenario::AuthVectors);
        let keys: Vec<&str> = labels.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["supi", "sender", "requester", "target"]);

        let labels = d.labels(Scenario::Registration);
        assert_eq!(labels[0].0, "nf_instance");
    }
}
