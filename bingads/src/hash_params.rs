//! Request body construction: JSON tree to XML elements.

use crate::hooks::{Callbacks, FieldRecord};
use crate::wsdl::TypeModel;
use bingsoap::EnvelopeBuilder;
use bingsoap::namespaces::XSI_PREFIX;
use serde_json::{Map, Value};
use xmltree::{Element, XMLNode};

/// Object key selecting a derived type, emitted as `i:type`
pub const XSI_TYPE_KEY: &str = "xsi:type";

/// Turns caller values into request elements, level by level.
///
/// At each complex level the object entries become [`FieldRecord`]s, go
/// through the `before_build` hooks with the element names declared by the
/// level's type, then become elements in the resulting order.
pub struct HashParams<'a> {
    model: &'a TypeModel,
    callbacks: &'a Callbacks,
    envelope: &'a mut EnvelopeBuilder,
}

impl<'a> HashParams<'a> {
    pub fn new(
        model: &'a TypeModel,
        callbacks: &'a Callbacks,
        envelope: &'a mut EnvelopeBuilder,
    ) -> Self {
        Self {
            model,
            callbacks,
            envelope,
        }
    }

    /// Builds the top level element `element_name` from `value`.
    ///
    /// `default_namespace` qualifies the element when the schema does not
    /// declare it.
    pub fn build(
        &mut self,
        element_name: &str,
        value: &Value,
        default_namespace: Option<&str>,
    ) -> Element {
        let decl = self.model.element(element_name);
        let namespace = decl
            .and_then(|d| d.namespace.as_deref())
            .or(default_namespace)
            .map(str::to_string);
        let type_name = decl.and_then(|d| d.type_name.clone());

        self.value_element(element_name, namespace.as_deref(), type_name.as_deref(), value)
    }

    fn qualified_name(&mut self, namespace: Option<&str>, name: &str) -> String {
        match namespace {
            Some(ns) => format!("{}:{}", self.envelope.prefix_for(ns), name),
            None => name.to_string(),
        }
    }

    fn value_element(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        type_name: Option<&str>,
        value: &Value,
    ) -> Element {
        let mut elem = Element::new(&self.qualified_name(namespace, name));

        match value {
            Value::Null => {
                elem.attributes
                    .insert(format!("{XSI_PREFIX}:nil"), "true".to_string());
            }
            Value::Bool(b) => elem.children.push(XMLNode::Text(b.to_string())),
            Value::Number(n) => elem.children.push(XMLNode::Text(n.to_string())),
            Value::String(s) => elem.children.push(XMLNode::Text(s.clone())),
            // Un tableau imbriqué n'a pas de nom propre : ses valeurs sont
            // aplaties par `push_values`
            Value::Array(_) => {}
            Value::Object(map) => {
                let derived = map.get(XSI_TYPE_KEY).and_then(Value::as_str);
                let type_name = match derived {
                    Some(derived) => {
                        let attr = self.type_attribute(derived);
                        elem.attributes.insert(format!("{XSI_PREFIX}:type"), attr);
                        Some(bingsoap::local_name(derived))
                    }
                    None => type_name,
                };
                self.children(&mut elem, map, type_name, namespace);
            }
        }

        elem
    }

    fn type_attribute(&mut self, type_name: &str) -> String {
        let local = bingsoap::local_name(type_name);
        let namespace = self
            .model
            .complex_type(local)
            .and_then(|ty| ty.namespace.clone());
        self.qualified_name(namespace.as_deref(), local)
    }

    fn children(
        &mut self,
        parent: &mut Element,
        map: &Map<String, Value>,
        type_name: Option<&str>,
        parent_namespace: Option<&str>,
    ) {
        let declared = type_name
            .map(|t| self.model.element_names(t))
            .unwrap_or_default();

        let mut records: Vec<FieldRecord> = map
            .iter()
            .filter(|(key, _)| key.as_str() != XSI_TYPE_KEY)
            .map(|(key, value)| FieldRecord::from_entry(key, value))
            .collect();

        self.callbacks.before_build(&mut records, &declared);

        for record in records {
            let decl = type_name.and_then(|t| self.model.find_element(t, &record.name));
            let namespace = match decl {
                Some(d) => d.namespace.clone(),
                None => parent_namespace.map(str::to_string),
            };
            let child_type = decl.and_then(|d| d.type_name.clone());

            self.push_values(
                parent,
                &record.name,
                namespace.as_deref(),
                child_type.as_deref(),
                &record.args,
            );
        }
    }

    fn push_values(
        &mut self,
        parent: &mut Element,
        name: &str,
        namespace: Option<&str>,
        type_name: Option<&str>,
        values: &[Value],
    ) {
        for value in values {
            match value {
                Value::Array(items) => self.push_values(parent, name, namespace, type_name, items),
                _ => {
                    let elem = self.value_element(name, namespace, type_name, value);
                    parent.children.push(XMLNode::Element(elem));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::WSDL;
    use crate::wsdl::Wsdl;
    use serde_json::json;

    fn build(callbacks: &Callbacks, value: &Value) -> (Element, EnvelopeBuilder) {
        let wsdl = Wsdl::parse(WSDL.as_bytes()).unwrap();
        let mut envelope = EnvelopeBuilder::new();
        let elem = HashParams::new(&wsdl.types, callbacks, &mut envelope).build(
            "GetCampaignsByIdsRequest",
            value,
            Some("urn:campaigns"),
        );
        (elem, envelope)
    }

    fn child_names(elem: &Element) -> Vec<&str> {
        elem.children
            .iter()
            .filter_map(XMLNode::as_element)
            .map(|e| e.name.as_str())
            .collect()
    }

    #[test]
    fn renames_and_orders_children() {
        let body = json!({
            "campaign_type": "Search",
            "campaign_ids": {"long": [1, 2]},
            "account_id": 42
        });
        let (elem, _) = build(&Callbacks::default(), &body);

        assert_eq!(elem.name, "ns0:GetCampaignsByIdsRequest");
        assert_eq!(
            child_names(&elem),
            ["ns0:AccountId", "ns0:CampaignIds", "ns0:CampaignType"]
        );

        let ids = elem.get_child("ns0:CampaignIds").unwrap();
        // ArrayOflong est déclaré dans un autre namespace
        assert_eq!(child_names(ids), ["ns1:long", "ns1:long"]);
        let values: Vec<String> = ids
            .children
            .iter()
            .filter_map(XMLNode::as_element)
            .filter_map(|e| e.get_text().map(|t| t.into_owned()))
            .collect();
        assert_eq!(values, ["1", "2"]);
    }

    #[test]
    fn null_values_are_marked_nil() {
        let (elem, _) = build(&Callbacks::default(), &json!({"CampaignIds": null}));
        let ids = elem.get_child("ns0:CampaignIds").unwrap();
        assert_eq!(ids.attributes.get("i:nil").map(String::as_str), Some("true"));
        assert!(ids.children.is_empty());
    }

    #[test]
    fn without_hooks_names_are_kept() {
        let (elem, _) = build(&Callbacks::empty(), &json!({"account_id": 1}));
        assert_eq!(child_names(&elem), ["ns0:account_id"]);
    }

    #[test]
    fn unknown_fields_use_parent_namespace_and_go_last() {
        let (elem, _) = build(
            &Callbacks::default(),
            &json!({"extra_field": true, "account_id": 1}),
        );
        assert_eq!(child_names(&elem), ["ns0:AccountId", "ns0:extra_field"]);
    }

    #[test]
    fn xsi_type_selects_derived_type() {
        let wsdl = Wsdl::parse(WSDL.as_bytes()).unwrap();
        let mut envelope = EnvelopeBuilder::new();
        let callbacks = Callbacks::default();
        let elem = HashParams::new(&wsdl.types, &callbacks, &mut envelope).build(
            "Holder",
            &json!({"xsi:type": "Campaign", "name": "n", "id": 1}),
            Some("urn:campaigns"),
        );

        assert_eq!(
            elem.attributes.get("i:type").map(String::as_str),
            Some("ns0:Campaign")
        );
        assert_eq!(child_names(&elem), ["ns0:Id", "ns0:Name"]);
    }
}
