//! Service description shared by unit tests.

pub(crate) const WSDL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/" xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/" xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:tns="urn:campaigns" targetNamespace="urn:campaigns">
  <wsdl:types>
    <xs:schema elementFormDefault="qualified" targetNamespace="urn:arrays">
      <xs:complexType name="ArrayOflong">
        <xs:sequence>
          <xs:element minOccurs="0" maxOccurs="unbounded" name="long" type="xs:long"/>
        </xs:sequence>
      </xs:complexType>
    </xs:schema>
    <xs:schema elementFormDefault="qualified" targetNamespace="urn:campaigns">
      <xs:complexType name="Campaign">
        <xs:sequence>
          <xs:element minOccurs="0" name="Id" nillable="true" type="xs:long"/>
          <xs:element minOccurs="0" name="Name" nillable="true" type="xs:string"/>
        </xs:sequence>
      </xs:complexType>
      <xs:complexType name="ArrayOfCampaign">
        <xs:sequence>
          <xs:element minOccurs="0" maxOccurs="unbounded" name="Campaign" nillable="true" type="tns:Campaign"/>
        </xs:sequence>
      </xs:complexType>
      <xs:element name="GetCampaignsByIdsRequest">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="AccountId" type="xs:long"/>
            <xs:element name="CampaignIds" nillable="true" type="q1:ArrayOflong" xmlns:q1="urn:arrays"/>
            <xs:element minOccurs="0" name="CampaignType" type="xs:string"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
      <xs:element name="GetCampaignsByIdsResponse">
        <xs:complexType>
          <xs:sequence>
            <xs:element minOccurs="0" name="Campaigns" nillable="true" type="tns:ArrayOfCampaign"/>
            <xs:element minOccurs="0" name="PartialErrors" nillable="true" type="xs:string"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
      <xs:element name="DeveloperToken" nillable="true" type="xs:string"/>
    </xs:schema>
  </wsdl:types>
  <wsdl:message name="GetCampaignsByIdsRequest">
    <wsdl:part name="parameters" element="tns:GetCampaignsByIdsRequest"/>
  </wsdl:message>
  <wsdl:message name="GetCampaignsByIdsRequest_Headers">
    <wsdl:part name="DeveloperToken" element="tns:DeveloperToken"/>
  </wsdl:message>
  <wsdl:message name="GetCampaignsByIdsResponse">
    <wsdl:part name="parameters" element="tns:GetCampaignsByIdsResponse"/>
  </wsdl:message>
  <wsdl:portType name="ICampaignManagementService">
    <wsdl:operation name="GetCampaignsByIds">
      <wsdl:input name="GetCampaignsByIdsRequest" message="tns:GetCampaignsByIdsRequest"/>
      <wsdl:output name="GetCampaignsByIdsResponse" message="tns:GetCampaignsByIdsResponse"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="BasicHttpBinding_ICampaignManagementService" type="tns:ICampaignManagementService">
    <soap:binding transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="GetCampaignsByIds">
      <soap:operation soapAction="GetCampaignsByIds" style="document"/>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="CampaignManagementService">
    <wsdl:port name="BasicHttpBinding_ICampaignManagementService" binding="tns:BasicHttpBinding_ICampaignManagementService">
      <soap:address location="https://campaign.api.bingads.microsoft.com/Api/Advertiser/CampaignManagement/v13/CampaignManagementService.svc"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#;
