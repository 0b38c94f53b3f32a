mod common;

use bingads::{Client, Config, Environment, ServiceKind, TypeModel};
use std::fs;
use std::sync::Arc;
use std::thread;

const MAIN_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" elementFormDefault="qualified" targetNamespace="urn:customers">
  <xs:include schemaLocation="types.xsd"/>
  <xs:element name="SignupCustomerRequest">
    <xs:complexType><xs:sequence><xs:element name="Customer" type="Customer"/></xs:sequence></xs:complexType>
  </xs:element>
</xs:schema>"#;

const TYPES_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" elementFormDefault="qualified" targetNamespace="urn:customers">
  <xs:complexType name="Customer">
    <xs:sequence>
      <xs:element name="Name" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#;

#[test]
fn test_client_from_config_directory() {
    let config_dir = tempfile::tempdir().unwrap();
    let wsdl_dir = common::wsdl_dir();
    let xsd_dir = config_dir.path().join("xsd");
    fs::create_dir(&xsd_dir).unwrap();
    fs::write(xsd_dir.join("main.xsd"), MAIN_XSD).unwrap();
    fs::write(xsd_dir.join("types.xsd"), TYPES_XSD).unwrap();

    fs::write(
        config_dir.path().join("config.yaml"),
        format!(
            "api:\n  environment: production\n  developer_token: dev\n  customer_id: 12\nschema:\n  wsdl_dir: {}\n  xsd_file: xsd/main.xsd\n",
            wsdl_dir.path().display()
        ),
    )
    .unwrap();

    let config = Config::load_config(config_dir.path().to_str().unwrap()).unwrap();
    let client = Client::from_config(&config).unwrap();

    assert_eq!(client.environment(), Environment::Production);
    assert!(client.schema().complex_type("Customer").is_some());
    assert_eq!(client.header().get("CustomerId"), Some("12"));

    let service = client.service(ServiceKind::CampaignManagement).unwrap();
    // Le schéma XSD et les types du WSDL sont réunis
    assert!(service.types().complex_type("Customer").is_some());
    assert!(service.types().element("GetCampaignsByIdsRequest").is_some());
}

#[test]
fn test_schema_is_shared_between_services() {
    let wsdl_dir = common::wsdl_dir();
    let client = Client::builder()
        .wsdl_dir(wsdl_dir.path())
        .schema(TypeModel::new())
        .build()
        .unwrap();

    let first = client.service(ServiceKind::CampaignManagement).unwrap();
    let second = client.service(ServiceKind::CampaignManagement).unwrap();
    assert_eq!(first.operations(), second.operations());
    assert!(Arc::ptr_eq(client.schema(), client.clone().schema()));
}

#[test]
fn test_services_are_usable_from_threads() {
    let wsdl_dir = common::wsdl_dir();
    let client = Client::builder().wsdl_dir(wsdl_dir.path()).build().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                client.set_header("CustomerId", i.to_string());
                let service = client.service(ServiceKind::CampaignManagement).unwrap();
                service
                    .build_request("get_campaigns_by_ids", &serde_json::json!({"account_id": i}))
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        let request = handle.join().unwrap();
        assert!(request.contains("<ns0:AccountId>"));
    }
    assert!(client.header().get("CustomerId").is_some());
}

#[test]
fn test_missing_service_wsdl() {
    let wsdl_dir = common::wsdl_dir();
    let client = Client::builder()
        .wsdl_dir(wsdl_dir.path())
        .environment(Environment::Sandbox)
        .build()
        .unwrap();
    assert!(client.service(ServiceKind::CampaignManagement).is_err());
}
