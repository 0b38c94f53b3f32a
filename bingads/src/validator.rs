//! Request validation against the XML schema.
//!
//! The request envelope is serialized first, then its body element is parsed
//! back and checked against the [`TypeModel`]. Diagnostics are split into
//! warnings, which are only logged, and errors, which abort the call.

use crate::errors::BingAdsError;
use crate::wsdl::{ElementDecl, SimpleType, TypeModel, attribute};
use bingsoap::{extract_body_element, local_name};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use xmltree::{Element, XMLNode};

/// Request types never validated by default
pub const DEFAULT_BYPASS: &[&str] = &["SignupCustomerRequest"];

const MAX_TYPE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Slash separated element path, from the body element
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn warning(path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "{level}: {}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub warnings: Vec<Diagnostic>,
    pub errors: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl FromIterator<Diagnostic> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = iter
            .into_iter()
            .partition(|d| d.severity == Severity::Error);
        Self { warnings, errors }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in self.errors.iter().chain(&self.warnings) {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

/// Checks a request body element
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, body: &Element) -> Vec<Diagnostic>;
}

/// Structural validation from the parsed XSD types
#[derive(Debug, Clone)]
pub struct XsdValidator {
    model: Arc<TypeModel>,
}

impl XsdValidator {
    pub fn new(model: Arc<TypeModel>) -> Self {
        Self { model }
    }

    fn check_element(
        &self,
        elem: &Element,
        decl: &ElementDecl,
        path: &str,
        out: &mut Vec<Diagnostic>,
    ) {
        if attribute(elem, "nil") == Some("true") {
            if !decl.nillable {
                out.push(Diagnostic::error(path, "element is not nillable"));
            }
            return;
        }

        let type_name = attribute(elem, "type")
            .map(local_name)
            .or(decl.type_name.as_deref());
        let Some(type_name) = type_name else {
            return;
        };

        if self.model.complex_type(type_name).is_some() {
            self.check_children(elem, type_name, path, out);
        } else if self.model.is_simple_type(type_name) {
            if child_elements(elem).next().is_some() {
                out.push(Diagnostic::error(
                    path,
                    format!("element of simple type '{type_name}' cannot have child elements"),
                ));
            } else {
                let text = elem.get_text().unwrap_or_default();
                if let Some(message) = self.value_error(type_name, &text, 0) {
                    out.push(Diagnostic::error(path, message));
                }
            }
        } else {
            out.push(Diagnostic::warning(
                path,
                format!("type '{type_name}' is not declared, content not checked"),
            ));
        }
    }

    /// Checks the text of a simple typed element, `None` when valid
    fn value_error(&self, type_name: &str, value: &str, depth: usize) -> Option<String> {
        if depth > MAX_TYPE_DEPTH {
            return None;
        }
        match self.model.simple_type(type_name) {
            Some(ty) => self.facet_error(ty, value, depth),
            None => builtin_value_error(local_name(type_name), value),
        }
    }

    fn facet_error(&self, ty: &SimpleType, value: &str, depth: usize) -> Option<String> {
        if let Some(item) = &ty.item {
            return value
                .split_whitespace()
                .find_map(|token| self.facet_error(item, token, depth + 1));
        }
        if !ty.enumeration.is_empty() && !ty.enumeration.iter().any(|allowed| allowed == value) {
            return Some(format!(
                "value '{value}' is not one of [{}]",
                ty.enumeration.join(", ")
            ));
        }
        ty.base
            .as_deref()
            .and_then(|base| self.value_error(base, value, depth + 1))
    }

    fn check_children(
        &self,
        elem: &Element,
        type_name: &str,
        path: &str,
        out: &mut Vec<Diagnostic>,
    ) {
        let decls = self.model.element_decls(type_name);
        let ordered = self
            .model
            .complex_type(type_name)
            .is_none_or(|ty| !ty.unordered);
        let mut counts = vec![0u32; decls.len()];
        let mut cursor = 0;

        for child in child_elements(elem) {
            let name = local_name(&child.name);
            let child_path = format!("{path}/{name}");
            let namespace = child.namespace.as_deref().filter(|ns| !ns.is_empty());

            let Some(index) = decls
                .iter()
                .position(|d| d.name == name && d.namespace.as_deref() == namespace)
            else {
                let message = match decls.iter().find(|d| d.name == name) {
                    Some(decl) => format!(
                        "element is expected in namespace '{}'",
                        decl.namespace.as_deref().unwrap_or_default()
                    ),
                    None => format!("element is not expected in '{type_name}'"),
                };
                out.push(Diagnostic::error(&child_path, message));
                continue;
            };

            if ordered && index < cursor {
                out.push(Diagnostic::error(
                    &child_path,
                    format!(
                        "element is out of order, expected after '{}'",
                        decls[cursor].name
                    ),
                ));
            } else {
                cursor = index;
            }

            counts[index] += 1;
            let decl = decls[index];
            if let Some(max) = decl.max_occurs.filter(|max| counts[index] == max + 1) {
                out.push(Diagnostic::error(
                    &child_path,
                    format!("element occurs more than {max} time(s)"),
                ));
            }

            self.check_element(child, decl, &child_path, out);
        }

        for (decl, count) in decls.iter().zip(counts) {
            if count < decl.min_occurs {
                out.push(Diagnostic::error(
                    path,
                    format!("missing required element '{}'", decl.name),
                ));
            }
        }
    }
}

impl SchemaValidator for XsdValidator {
    fn validate(&self, body: &Element) -> Vec<Diagnostic> {
        let name = local_name(&body.name);
        let path = format!("/{name}");
        let mut out = Vec::new();

        match self.model.element(name) {
            Some(decl) => self.check_element(body, decl, &path, &mut out),
            None => out.push(Diagnostic::error(&path, "element is not declared")),
        }
        out
    }
}

/// Validates serialized requests, skipping the bypassed request types
#[derive(Clone)]
pub struct Validator {
    schema: Arc<dyn SchemaValidator>,
    bypass: Vec<String>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("bypass", &self.bypass)
            .finish_non_exhaustive()
    }
}

impl Validator {
    pub fn new(schema: Arc<dyn SchemaValidator>, bypass: Vec<String>) -> Self {
        Self { schema, bypass }
    }

    pub fn is_bypassed(&self, element_name: &str) -> bool {
        let name = local_name(element_name);
        self.bypass.iter().any(|b| b == name)
    }

    /// Validates the body element of a serialized envelope.
    ///
    /// Returns the warnings on success, `BingAdsError::Validation` as soon
    /// as one error is found.
    pub fn validate(&self, envelope_xml: &str) -> Result<ValidationResult, BingAdsError> {
        let body = extract_body_element(envelope_xml.as_bytes())?;
        let name = local_name(&body.name);
        if self.is_bypassed(name) {
            debug!(request = %name, "Schema validation bypassed");
            return Ok(ValidationResult::default());
        }

        let result: ValidationResult = self.schema.validate(&body).into_iter().collect();
        if !result.warnings.is_empty() {
            debug!(request = %name, "[XSD Validations] Warnings:\n{}", result);
        }
        if !result.is_valid() {
            return Err(BingAdsError::Validation(result));
        }
        Ok(result)
    }
}

fn child_elements(elem: &Element) -> impl Iterator<Item = &Element> {
    elem.children.iter().filter_map(XMLNode::as_element)
}

/// Lexical check of the XML Schema built-in types; other built-ins accept
/// any text
fn builtin_value_error(type_name: &str, value: &str) -> Option<String> {
    let v = value.trim();
    let valid = match type_name {
        "boolean" => matches!(v, "true" | "false" | "1" | "0"),
        "byte" => v.parse::<i8>().is_ok(),
        "short" => v.parse::<i16>().is_ok(),
        "int" => v.parse::<i32>().is_ok(),
        "long" => v.parse::<i64>().is_ok(),
        "integer" => is_integer(v),
        "unsignedByte" => v.parse::<u8>().is_ok(),
        "unsignedShort" => v.parse::<u16>().is_ok(),
        "unsignedInt" => v.parse::<u32>().is_ok(),
        "unsignedLong" => v.parse::<u64>().is_ok(),
        "decimal" => is_decimal(v),
        "float" | "double" => {
            matches!(v, "INF" | "-INF" | "NaN")
                || (v.bytes().all(|b| b.is_ascii_digit() || b"+-.eE".contains(&b))
                    && v.parse::<f64>().is_ok())
        }
        "date" => NaiveDate::parse_from_str(without_timezone(v), "%Y-%m-%d").is_ok(),
        "dateTime" => {
            NaiveDateTime::parse_from_str(without_timezone(v), "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        }
        "time" => NaiveTime::parse_from_str(without_timezone(v), "%H:%M:%S%.f").is_ok(),
        "guid" => uuid::Uuid::try_parse(v).is_ok(),
        "hexBinary" => v.len() % 2 == 0 && v.bytes().all(|b| b.is_ascii_hexdigit()),
        _ => true,
    };
    (!valid).then(|| format!("'{value}' is not a valid value of type '{type_name}'"))
}

fn is_integer(v: &str) -> bool {
    let digits = v.strip_prefix(['+', '-']).unwrap_or(v);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(v: &str) -> bool {
    let unsigned = v.strip_prefix(['+', '-']).unwrap_or(v);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    !(int.is_empty() && frac.is_empty())
        && int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit())
}

/// Strips a `Z` or `+hh:mm` suffix
fn without_timezone(v: &str) -> &str {
    if let Some(stripped) = v.strip_suffix('Z') {
        return stripped;
    }
    let bytes = v.as_bytes();
    let n = bytes.len();
    if n > 6 && matches!(bytes[n - 6], b'+' | b'-') && bytes[n - 3] == b':' {
        &v[..n - 6]
    } else {
        v
    }
}
