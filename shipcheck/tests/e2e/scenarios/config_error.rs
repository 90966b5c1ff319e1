//! 설정 계열 에러는 실행 전에 exit code 2로 끝남

use std::io::Write;

use shipcheck::error::CliError;
use shipcheck_core::config::ShipcheckConfig;
use shipcheck_core::plan::PlanSet;

fn plan_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

async fn load_exit_code(content: &str) -> u8 {
    let file = plan_file(content);
    let err = PlanSet::load(file.path()).await.unwrap_err();
    CliError::from(err).exit_code()
}

#[tokio::test]
async fn missing_plan_file_is_config_error() {
    let err = PlanSet::load("/nonexistent/shipcheck/plans.yaml")
        .await
        .unwrap_err();
    assert_eq!(CliError::from(err).exit_code(), 2);
}

#[tokio::test]
async fn non_utf8_plan_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"plans:\n  - name: \xff\xfe\n").unwrap();

    let err = PlanSet::load(file.path()).await.unwrap_err();
    assert!(err.is_config(), "{err}");
    assert!(err.to_string().contains("cannot read"), "{err}");
    assert_eq!(CliError::from(err).exit_code(), 2);
}

#[tokio::test]
async fn directory_as_plan_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = PlanSet::load(dir.path()).await.unwrap_err();
    assert!(err.is_config(), "{err}");
    assert_eq!(CliError::from(err).exit_code(), 2);
}

#[tokio::test]
async fn directory_as_config_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = ShipcheckConfig::load(dir.path()).await.unwrap_err();
    assert_eq!(CliError::from(err).exit_code(), 2);
}

#[tokio::test]
async fn unparseable_plan_file_is_config_error() {
    assert_eq!(load_exit_code("plans: [unclosed").await, 2);
}

#[tokio::test]
async fn invalid_plan_is_config_error() {
    let yaml = r#"
plans:
  - name: ""
    tests:
      - wait-url-ready:
          url: http://app
          expected-status-code: 200
"#;
    assert_eq!(load_exit_code(yaml).await, 2);
}

#[tokio::test]
async fn out_of_range_status_code_is_config_error() {
    let yaml = r#"
plans:
  - name: app
    tests:
      - wait-url-ready:
          url: http://app
          expected-status-code: 42
"#;
    assert_eq!(load_exit_code(yaml).await, 2);
}

#[tokio::test]
async fn valid_plan_file_loads() {
    let yaml = r#"
plans:
  - name: app
    install:
      helm:
        chart: ./charts/app
        release-name: app
        namespace: ci
        set:
          replicaCount: 1
    tests:
      - wait-url-ready:
          url: http://app-1.ci.svc
          retries: 10
          expected-status-code: 200
"#;
    let file = plan_file(yaml);
    let plans = PlanSet::load(file.path()).await.unwrap();
    assert_eq!(plans.plans.len(), 1);
}

#[tokio::test]
async fn missing_config_file_is_config_error() {
    let err = ShipcheckConfig::load("/nonexistent/shipcheck.toml")
        .await
        .unwrap_err();
    assert_eq!(CliError::from(err).exit_code(), 2);
}
