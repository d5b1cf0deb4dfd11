//! Integration tests for nfstress-config

use nfstress_config::*;
use nfstress_core::{NfKind, RunMode};
use std::io::Write;
use std::time::Duration;
use temp_env::with_vars;

#[test]
fn test_default_config_validation() {
    let config = StressConfig::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("NFSTRESS_NRF_URL", Some("http://192.168.70.130:8080")),
        ("NFSTRESS_UDM_URL", Some("http://192.168.70.137")),
        ("NFSTRESS_IMSI_START", Some("208950000000033")),
        ("NFSTRESS_IMSI_END", Some("208950000000100")),
        ("NFSTRESS_IMSI_WIDTH", Some("15")),
        ("NFSTRESS_AUTO_PROVISION", Some("1")),
        ("NFSTRESS_EXECUTOR", Some("http")),
        ("NFSTRESS_REQUEST_TIMEOUT", Some("10")),
        ("NFSTRESS_LOG_LEVEL", Some("debug")),
        ("NFSTRESS_LOG_FORMAT", Some("json")),
    ];

    with_vars(vars, || {
        let loader = ConfigLoader::new();
        let config = loader.from_env().unwrap();

        assert_eq!(config.endpoints.nrf, "http://192.168.70.130:8080");
        assert_eq!(config.endpoints.udm, "http://192.168.70.137");
        assert_eq!(config.identity.imsi_start, 208_950_000_000_033);
        assert_eq!(config.identity.imsi_end, 208_950_000_000_100);
        assert!(config.executor.auto_provision);
        assert_eq!(config.executor.backend, ExecutorBackend::Http);
        assert_eq!(config.executor.request_timeout, Duration::from_secs(10));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);

        let map = config.endpoints.to_endpoint_map();
        assert_eq!(map.base_for(&NfKind::Nrf), "http://192.168.70.130:8080");
    });
}

#[test]
fn test_invalid_env_value_is_reported() {
    with_vars(vec![("NFSTRESS_IMSI_START", Some("abc"))], || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
        assert!(err.to_string().contains("IMSI_START"));
    });

    with_vars(vec![("NFSTRESS_AUTO_PROVISION", Some("sometimes"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });
}

#[test]
fn test_inverted_env_range_fails_validation() {
    let vars = vec![
        ("NFSTRESS_IMSI_START", Some("208950000000100")),
        ("NFSTRESS_IMSI_END", Some("208950000000033")),
    ];
    with_vars(vars, || {
        assert!(ConfigLoader::new().from_env().is_err());
    });
}

#[test]
fn test_custom_prefix() {
    with_vars(vec![("LOADGEN_CONCURRENCY", Some("16"))], || {
        let config = ConfigLoader::with_prefix("LOADGEN").from_env().unwrap();
        assert_eq!(config.run.concurrency, 16);
    });
}

#[test]
fn test_yaml_config_serialization() {
    let config = StressConfig::default();
    let yaml = config.to_yaml().unwrap();

    // Parse it back
    let parsed: StressConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
    assert_eq!(parsed, config);
}

#[test]
fn test_comprehensive_config_file() {
    let yaml = r#"
run:
  mode: par
  concurrency: 8
  pacing: 250
  seed: 42
  report_format: json

identity:
  imsi_start: 1010000000001
  imsi_end: 1010000000999
  imsi_width: 15
  mcc: "001"
  mnc: "01"
  sd: "000001"

endpoints:
  nrf: "http://nrf.core:8080"
  other:
    nef: "http://oai-nef"

executor:
  backend: http
  request_timeout: 3
  http2_prior_knowledge: true

logging:
  level: warn
  format: compact
"#;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    with_vars(vec![("NFSTRESS_CONCURRENCY", None::<&str>)], || {
        let config = ConfigLoader::new().from_file(file.path()).unwrap();

        assert_eq!(config.run.mode, RunMode::Parallel);
        assert_eq!(config.run.concurrency, 8);
        assert_eq!(config.run.pacing, Duration::from_millis(250));
        assert_eq!(config.run.seed, Some(42));
        assert_eq!(config.run.report_format, ReportFormat::Json);

        let range = config.identity.identifier_range().unwrap();
        assert_eq!(range.render(1_010_000_000_001), "001010000000001");

        assert_eq!(config.endpoints.nrf, "http://nrf.core:8080");
        // Unset fields keep their defaults
        assert_eq!(config.endpoints.udr, "http://oai-udr");

        assert_eq!(config.executor.backend, ExecutorBackend::Http);
        assert!(config.executor.http2_prior_knowledge);
        assert_eq!(config.logging.format, LogFormat::Compact);
    });
}

#[test]
fn test_env_overrides_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "run:\n  concurrency: 2").unwrap();

    with_vars(vec![("NFSTRESS_CONCURRENCY", Some("6"))], || {
        let config = ConfigLoader::new().load(Some(file.path())).unwrap();
        assert_eq!(config.run.concurrency, 6);
    });
}

#[test]
fn test_invalid_file_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "endpoints:\n  nrf: \"nrf without scheme\"").unwrap();

    with_vars(vec![("NFSTRESS_NRF_URL", None::<&str>)], || {
        let err = ConfigLoader::new().from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DomainError { .. }));

        let missing = ConfigLoader::new().from_file("/nonexistent/nfstress.yaml");
        assert!(matches!(missing, Err(ConfigError::FileReadError(_))));
    });
}

#[test]
fn test_run_config_from_defaults() {
    let defaults = RunDefaults {
        mode: RunMode::Parallel,
        concurrency: 4,
        ..Default::default()
    };

    let run = RunConfig::new(20, &defaults).unwrap();
    assert_eq!(run.total_requests, 20);
    assert_eq!(run.effective_concurrency(), 4);

    assert!(RunConfig::new(0, &defaults).is_err());
}
