use roxmltree::Node;
use wftrace_common::error::TraceError;

/// Namespaced lookups and typed attribute access on a parsed XML element.
pub trait NodeExt<'a, 'input: 'a>: Sized {
    /// Direct children with the given namespaced tag.
    fn children_named(self, namespace: &'a str, tag: &'a str)
        -> impl Iterator<Item = Node<'a, 'input>>;

    fn required_attr(&self, attribute: &'static str) -> Result<&'a str, TraceError>;

    fn required_f64(&self, attribute: &'static str) -> Result<f64, TraceError>;

    fn required_u64(&self, attribute: &'static str) -> Result<u64, TraceError>;

    fn optional_u64(&self, attribute: &'static str) -> Result<Option<u64>, TraceError>;

    fn optional_f64(&self, attribute: &'static str) -> Result<Option<f64>, TraceError>;
}

impl<'a, 'input: 'a> NodeExt<'a, 'input> for Node<'a, 'input> {
    fn children_named(
        self,
        namespace: &'a str,
        tag: &'a str,
    ) -> impl Iterator<Item = Node<'a, 'input>> {
        self.children()
            .filter(move |child| child.has_tag_name((namespace, tag)))
    }

    fn required_attr(&self, attribute: &'static str) -> Result<&'a str, TraceError> {
        self.attribute(attribute)
            .ok_or_else(|| TraceError::MissingAttribute {
                element: self.tag_name().name().to_string(),
                attribute,
            })
    }

    fn required_f64(&self, attribute: &'static str) -> Result<f64, TraceError> {
        parse_f64(attribute, self.required_attr(attribute)?)
    }

    fn required_u64(&self, attribute: &'static str) -> Result<u64, TraceError> {
        parse_u64(attribute, self.required_attr(attribute)?)
    }

    fn optional_u64(&self, attribute: &'static str) -> Result<Option<u64>, TraceError> {
        self.attribute(attribute)
            .map(|value| parse_u64(attribute, value))
            .transpose()
    }

    fn optional_f64(&self, attribute: &'static str) -> Result<Option<f64>, TraceError> {
        self.attribute(attribute)
            .map(|value| parse_f64(attribute, value))
            .transpose()
    }
}

fn parse_f64(attribute: &str, value: &str) -> Result<f64, TraceError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| TraceError::InvalidNumber {
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}

/// Integer attributes occasionally come out of kickstart as `12.0`.
fn parse_u64(attribute: &str, value: &str) -> Result<u64, TraceError> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<u64>() {
        return Ok(parsed);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(parsed.round() as u64),
        _ => Err(TraceError::InvalidNumber {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }),
    }
}
