//! Response decoding: XML elements to JSON tree.

use crate::hooks::Callbacks;
use crate::wsdl::{TypeModel, attribute};
use bingsoap::local_name;
use serde_json::{Map, Value};
use xmltree::{Element, XMLNode};

/// Decodes response elements bottom-up, running the `after_children_hash`
/// hooks on every map once its children are decoded.
pub struct HashBuilder<'a> {
    model: &'a TypeModel,
    callbacks: &'a Callbacks,
}

impl<'a> HashBuilder<'a> {
    pub fn new(model: &'a TypeModel, callbacks: &'a Callbacks) -> Self {
        Self { model, callbacks }
    }

    /// Decodes the content of a response element.
    ///
    /// The result is always an object: an empty response element gives an
    /// empty map.
    pub fn build_response(&self, elem: &Element, type_name: Option<&str>) -> Map<String, Value> {
        match self.build(elem, type_name) {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Text leaf -> string, empty leaf -> `""`, `nil="true"` -> null,
    /// element with children -> object.
    pub fn build(&self, elem: &Element, type_name: Option<&str>) -> Value {
        if attribute(elem, "nil") == Some("true") {
            return Value::Null;
        }

        let children: Vec<&Element> = elem
            .children
            .iter()
            .filter_map(XMLNode::as_element)
            .collect();

        if children.is_empty() {
            let text = elem.get_text().map(|t| t.into_owned()).unwrap_or_default();
            return Value::String(text);
        }

        let mut hash = Map::new();
        for child in children {
            let name = local_name(&child.name);
            let decl = type_name.and_then(|t| self.model.find_element(t, name));
            let child_type = attribute(child, "type")
                .map(local_name)
                .or_else(|| decl.and_then(|d| d.type_name.as_deref()));
            let value = self.build(child, child_type);

            match hash.get_mut(name) {
                // Les enfants ne sont jamais des listes : celle-ci vient de cette boucle
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None if decl.is_some_and(|d| d.is_repeated()) => {
                    hash.insert(name.to_string(), Value::Array(vec![value]));
                }
                None => {
                    hash.insert(name.to_string(), value);
                }
            }
        }

        Value::Object(self.callbacks.after_children_hash(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::WSDL;
    use crate::wsdl::Wsdl;
    use serde_json::json;

    fn decode(xml: &str, callbacks: &Callbacks) -> Map<String, Value> {
        let wsdl = Wsdl::parse(WSDL.as_bytes()).unwrap();
        let elem = Element::parse(xml.as_bytes()).unwrap();
        HashBuilder::new(&wsdl.types, callbacks)
            .build_response(&elem, Some("GetCampaignsByIdsResponse"))
    }

    #[test]
    fn decodes_and_normalizes_response() {
        let xml = r#"<GetCampaignsByIdsResponse xmlns="urn:campaigns" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
  <Campaigns>
    <Campaign><Id>1</Id><Name>First</Name></Campaign>
  </Campaigns>
  <PartialErrors i:nil="true"/>
</GetCampaignsByIdsResponse>"#;

        let out = decode(xml, &Callbacks::default());
        assert_eq!(
            Value::Object(out),
            json!({
                "campaigns": {"campaign": [{"id": "1", "name": "First"}]},
                "partial_errors": null
            })
        );
    }

    #[test]
    fn repeated_undeclared_elements_become_lists() {
        let xml = r#"<Holder><Item>a</Item><Item>b</Item><Item>c</Item><Other/></Holder>"#;
        let wsdl = Wsdl::parse(WSDL.as_bytes()).unwrap();
        let callbacks = Callbacks::empty();
        let elem = Element::parse(xml.as_bytes()).unwrap();
        let out = HashBuilder::new(&wsdl.types, &callbacks).build(&elem, None);
        assert_eq!(out, json!({"Item": ["a", "b", "c"], "Other": ""}));
    }

    #[test]
    fn single_declared_element_repeated_three_times_stays_flat() {
        let xml = r#"<GetCampaignsByIdsResponse xmlns="urn:campaigns"><PartialErrors>a</PartialErrors><PartialErrors>b</PartialErrors><PartialErrors>c</PartialErrors></GetCampaignsByIdsResponse>"#;
        let out = decode(xml, &Callbacks::empty());
        assert_eq!(
            Value::Object(out),
            json!({"PartialErrors": ["a", "b", "c"]})
        );
    }

    #[test]
    fn long_wrappers_are_collapsed_bottom_up() {
        let xml = r#"<Holder><CampaignIds><long>10</long><long>20</long></CampaignIds></Holder>"#;
        let wsdl = Wsdl::parse(WSDL.as_bytes()).unwrap();
        let callbacks = Callbacks::default();
        let elem = Element::parse(xml.as_bytes()).unwrap();
        let out = HashBuilder::new(&wsdl.types, &callbacks).build(&elem, None);
        assert_eq!(out, json!({"campaign_ids": [10, 20]}));
    }

    #[test]
    fn declared_arrays_stay_lists_with_one_item() {
        let xml = r#"<Holder xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><CampaignIds i:type="ArrayOflong"><long>7</long></CampaignIds></Holder>"#;
        let wsdl = Wsdl::parse(WSDL.as_bytes()).unwrap();
        let callbacks = Callbacks::default();
        let elem = Element::parse(xml.as_bytes()).unwrap();
        let out = HashBuilder::new(&wsdl.types, &callbacks).build(&elem, None);
        assert_eq!(out, json!({"campaign_ids": [7]}));
    }

    #[test]
    fn empty_response_is_an_empty_map() {
        let out = decode("<GetCampaignsByIdsResponse/>", &Callbacks::default());
        assert!(out.is_empty());
    }
}
