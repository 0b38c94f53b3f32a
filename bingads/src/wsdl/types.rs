//! Type model read from XML Schema documents.
//!
//! Only what the SDK needs is kept: for each complex type, the ordered
//! element declarations with their occurrence bounds, and for each simple
//! type its base type and enumeration facets. Types are looked up by local
//! name.

use bingsoap::local_name;
use std::collections::{HashMap, HashSet};
use xmltree::{Element, XMLNode};

/// Declaration of one element inside a sequence, or at schema top level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDecl {
    pub name: String,
    /// Local name of the declared type, `None` for untyped elements
    pub type_name: Option<String>,
    /// Namespace the element is qualified with, `None` when unqualified
    pub namespace: Option<String>,
    pub min_occurs: u32,
    /// `None` when unbounded
    pub max_occurs: Option<u32>,
    pub nillable: bool,
}

impl ElementDecl {
    pub fn is_required(&self) -> bool {
        self.min_occurs > 0
    }

    /// Whether the element may occur more than once
    pub fn is_repeated(&self) -> bool {
        self.max_occurs.is_none_or(|max| max > 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexType {
    pub name: String,
    pub namespace: Option<String>,
    /// Base type of a `complexContent/extension`
    pub base: Option<String>,
    /// Elements declared by this type itself, base elements excluded
    pub elements: Vec<ElementDecl>,
    /// Content is an `xs:all` group, children may come in any order
    pub unordered: bool,
}

/// `xs:simpleType` restricting a built-in or another simple type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleType {
    /// Empty for anonymous types
    pub name: String,
    pub base: Option<String>,
    /// Allowed values, empty when the type has no enumeration facet
    pub enumeration: Vec<String>,
    /// Item type of an `xs:list`
    pub item: Option<Box<SimpleType>>,
}

/// Complex types and top level elements of a set of schemas
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    types: HashMap<String, ComplexType>,
    simple_types: HashMap<String, SimpleType>,
    elements: HashMap<String, ElementDecl>,
}

/// XML Schema built-in types, plus the `guid` and `char` types of the
/// serialization namespace
const BUILTIN_TYPES: &[&str] = &[
    "anyType", "anyURI", "base64Binary", "boolean", "byte", "char", "date", "dateTime",
    "decimal", "double", "duration", "float", "guid", "hexBinary", "int", "integer", "long",
    "QName", "short", "string", "time", "unsignedByte", "unsignedInt", "unsignedLong",
    "unsignedShort",
];

// Garde-fou contre les hiérarchies cycliques
const MAX_INHERITANCE_DEPTH: usize = 32;

impl TypeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.elements.is_empty()
    }

    /// Adds the declarations of an `xs:schema` element.
    ///
    /// `xs:import` and `xs:include` are not followed here, see
    /// [`schema_locations`].
    pub fn add_schema(&mut self, schema: &Element) {
        let target_namespace = schema.attributes.get("targetNamespace").cloned();
        let qualified = schema
            .attributes
            .get("elementFormDefault")
            .is_some_and(|form| form == "qualified");

        let mut parser = SchemaParser {
            model: self,
            target_namespace,
            qualified,
        };

        for child in elements(schema) {
            match local_name(&child.name) {
                "element" => parser.top_level_element(child),
                "complexType" => {
                    if let Some(name) = child.attributes.get("name") {
                        let ty = parser.complex_type(name, child);
                        parser.model.types.insert(name.clone(), ty);
                    }
                }
                "simpleType" => {
                    if let Some(name) = child.attributes.get("name") {
                        let ty = simple_type(name, child);
                        parser.model.simple_types.insert(name.clone(), ty);
                    }
                }
                _ => {}
            }
        }
    }

    /// Adds everything from `other`; `other` wins on name clashes
    pub fn merge(&mut self, other: TypeModel) {
        self.types.extend(other.types);
        self.simple_types.extend(other.simple_types);
        self.elements.extend(other.elements);
    }

    pub fn insert_type(&mut self, ty: ComplexType) {
        self.types.insert(ty.name.clone(), ty);
    }

    pub fn insert_element(&mut self, element: ElementDecl) {
        self.elements.insert(element.name.clone(), element);
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.types.get(local_name(name))
    }

    /// Whether `name` is a declared simple type or an XML Schema built-in
    pub fn is_simple_type(&self, name: &str) -> bool {
        let name = local_name(name);
        self.simple_types.contains_key(name) || BUILTIN_TYPES.contains(&name)
    }

    /// Declared simple type, `None` for built-ins
    pub fn simple_type(&self, name: &str) -> Option<&SimpleType> {
        self.simple_types.get(local_name(name))
    }

    pub fn insert_simple_type(&mut self, ty: SimpleType) {
        self.simple_types.insert(ty.name.clone(), ty);
    }

    /// Top level element declaration
    pub fn element(&self, name: &str) -> Option<&ElementDecl> {
        self.elements.get(local_name(name))
    }

    /// Complex type of an element, `None` for simple or unknown types
    pub fn type_of(&self, element: &ElementDecl) -> Option<&ComplexType> {
        element
            .type_name
            .as_deref()
            .and_then(|name| self.complex_type(name))
    }

    /// Element declarations of a type, inherited ones first
    pub fn element_decls(&self, type_name: &str) -> Vec<&ElementDecl> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.complex_type(type_name);

        while let Some(ty) = current {
            if !seen.insert(ty.name.as_str()) || chain.len() >= MAX_INHERITANCE_DEPTH {
                break;
            }
            chain.push(ty);
            current = ty.base.as_deref().and_then(|base| self.complex_type(base));
        }

        chain
            .into_iter()
            .rev()
            .flat_map(|ty| ty.elements.iter())
            .collect()
    }

    /// Declared element names of a type, in schema order
    pub fn element_names(&self, type_name: &str) -> Vec<String> {
        self.element_decls(type_name)
            .into_iter()
            .map(|decl| decl.name.clone())
            .collect()
    }

    /// Declaration of the child `name` of `type_name`
    pub fn find_element(&self, type_name: &str, name: &str) -> Option<&ElementDecl> {
        self.element_decls(type_name)
            .into_iter()
            .find(|decl| decl.name == name)
    }
}

/// `schemaLocation` of every `xs:import` and `xs:include` in a schema
pub fn schema_locations(schema: &Element) -> Vec<String> {
    elements(schema)
        .filter(|e| matches!(local_name(&e.name), "import" | "include"))
        .filter_map(|e| e.attributes.get("schemaLocation").cloned())
        .collect()
}

pub(crate) fn elements(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(XMLNode::as_element)
}

struct SchemaParser<'a> {
    model: &'a mut TypeModel,
    target_namespace: Option<String>,
    qualified: bool,
}

impl SchemaParser<'_> {
    fn top_level_element(&mut self, elem: &Element) {
        let Some(name) = elem.attributes.get("name") else {
            return;
        };
        // Les éléments globaux sont toujours qualifiés
        let mut decl = self.element_decl(elem, name, true);
        if decl.type_name.is_none() {
            self.inline_type(elem, name, &mut decl);
        }
        self.model.elements.insert(name.clone(), decl);
    }

    fn complex_type(&mut self, name: &str, elem: &Element) -> ComplexType {
        let mut ty = ComplexType {
            name: name.to_string(),
            namespace: self.target_namespace.clone(),
            base: None,
            elements: Vec::new(),
            unordered: false,
        };

        for child in elements(elem) {
            match local_name(&child.name) {
                "sequence" => self.particles(child, false, &mut ty.elements),
                "all" => {
                    ty.unordered = true;
                    self.particles(child, false, &mut ty.elements);
                }
                "choice" => self.particles(child, true, &mut ty.elements),
                "complexContent" => {
                    for derivation in elements(child) {
                        if local_name(&derivation.name) == "extension" {
                            ty.base = derivation
                                .attributes
                                .get("base")
                                .map(|base| local_name(base).to_string());
                        }
                        for group in elements(derivation) {
                            match local_name(&group.name) {
                                "sequence" => self.particles(group, false, &mut ty.elements),
                                "all" => {
                                    ty.unordered = true;
                                    self.particles(group, false, &mut ty.elements);
                                }
                                "choice" => self.particles(group, true, &mut ty.elements),
                                _ => {}
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        ty
    }

    fn particles(&mut self, group: &Element, optional: bool, out: &mut Vec<ElementDecl>) {
        for child in elements(group) {
            match local_name(&child.name) {
                "element" => {
                    if let Some(mut decl) = self.local_element(child) {
                        if optional {
                            decl.min_occurs = 0;
                        }
                        out.push(decl);
                    }
                }
                "sequence" => self.particles(child, optional, out),
                "choice" => self.particles(child, true, out),
                _ => {}
            }
        }
    }

    fn local_element(&mut self, elem: &Element) -> Option<ElementDecl> {
        if let Some(reference) = elem.attributes.get("ref") {
            let name = local_name(reference).to_string();
            let referenced = self.model.elements.get(&name);
            let type_name = referenced
                .and_then(|decl| decl.type_name.clone())
                .or_else(|| Some(name.clone()));
            let namespace = referenced.map(|decl| decl.namespace.clone());
            let mut decl = self.element_decl(elem, &name, true);
            decl.type_name = type_name;
            if let Some(namespace) = namespace {
                decl.namespace = namespace;
            }
            return Some(decl);
        }

        let name = elem.attributes.get("name")?.clone();
        let qualified = match elem.attributes.get("form").map(String::as_str) {
            Some("qualified") => true,
            Some("unqualified") => false,
            _ => self.qualified,
        };
        let mut decl = self.element_decl(elem, &name, qualified);
        if decl.type_name.is_none() {
            self.inline_type(elem, &name, &mut decl);
        }
        Some(decl)
    }

    /// Registers an anonymous type under the name of its element
    fn inline_type(&mut self, elem: &Element, name: &str, decl: &mut ElementDecl) {
        if let Some(inline) = child_named(elem, "complexType") {
            let ty = self.complex_type(name, inline);
            self.model.types.entry(name.to_string()).or_insert(ty);
            decl.type_name = Some(name.to_string());
        } else if let Some(inline) = child_named(elem, "simpleType") {
            let ty = simple_type(name, inline);
            self.model.simple_types.entry(name.to_string()).or_insert(ty);
            decl.type_name = Some(name.to_string());
        }
    }

    fn element_decl(&self, elem: &Element, name: &str, qualified: bool) -> ElementDecl {
        let attr = |key: &str| elem.attributes.get(key).map(String::as_str);

        ElementDecl {
            name: name.to_string(),
            type_name: attr("type").map(|t| local_name(t).to_string()),
            namespace: if qualified {
                self.target_namespace.clone()
            } else {
                None
            },
            min_occurs: attr("minOccurs")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            max_occurs: match attr("maxOccurs") {
                Some("unbounded") => None,
                Some(v) => Some(v.parse().unwrap_or(1)),
                None => Some(1),
            },
            nillable: attr("nillable") == Some("true"),
        }
    }
}

fn child_named<'a>(elem: &'a Element, name: &str) -> Option<&'a Element> {
    elements(elem).find(|e| local_name(&e.name) == name)
}

fn simple_type(name: &str, elem: &Element) -> SimpleType {
    let mut ty = SimpleType {
        name: name.to_string(),
        ..Default::default()
    };

    for child in elements(elem) {
        match local_name(&child.name) {
            "restriction" => {
                ty.base = child
                    .attributes
                    .get("base")
                    .map(|base| local_name(base).to_string());
                ty.enumeration = elements(child)
                    .filter(|facet| local_name(&facet.name) == "enumeration")
                    .filter_map(|facet| facet.attributes.get("value").cloned())
                    .collect();
            }
            "list" => {
                let item = match child.attributes.get("itemType") {
                    Some(item_type) => SimpleType {
                        base: Some(local_name(item_type).to_string()),
                        ..Default::default()
                    },
                    None => child_named(child, "simpleType")
                        .map(|inline| simple_type("", inline))
                        .unwrap_or_default(),
                };
                ty.item = Some(Box::new(item));
            }
            // Les unions ne sont pas vérifiées
            _ => {}
        }
    }

    ty
}
